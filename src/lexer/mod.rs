//! Lexical analysis for Sophia source.
//!
//! The lexer is split into data and mechanism:
//!
//! - `rules` compiles declarative state definitions into a `RuleTable`,
//!   flattening includes once
//! - `lexer` interprets any `RuleTable` as a lazy token stream
//! - `sophia` holds the Sophia grammar and its registration metadata
//! - `options` preprocesses input the way highlighting hosts expect
//! - `tokens` defines the token taxonomy

pub mod lexer;
pub mod options;
pub mod rules;
pub mod sophia;
pub mod tokens;

#[cfg(test)]
mod tests;
