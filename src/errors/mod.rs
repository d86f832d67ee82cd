//! Error types and error handling for the lexer.
//!
//! This module defines the errors that can surface around a scan. It includes:
//!
//! - Error structures with source position information
//! - Variants for rule table construction and option parsing
//! - The `UnmatchedInput` diagnostic reported by strict checking
//! - Helpful error messages and suggestions

pub mod errors;
