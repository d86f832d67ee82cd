//! Utility macros for the lexer.
//!
//! - `MK_TOKEN!` - Creates a Token instance
//! - `MK_RULE!` - Creates a rule definition for a state's rule list
//!
//! These macros keep the rule table and the scanning loop short.

/// Creates a Token instance.
///
/// # Example
///
/// ```ignore
/// let token = MK_TOKEN!(TokenKind::NumberHex, "0xFF".to_string(), span);
/// ```
#[macro_export]
macro_rules! MK_TOKEN {
    ($kind:expr, $value:expr, $span:expr) => {
        $crate::lexer::tokens::Token {
            kind: $kind,
            value: $value,
            span: $span,
        }
    };
}

/// Creates a single-kind rule definition, optionally with a state directive.
///
/// # Example
///
/// ```ignore
/// MK_RULE!(r"[0-9]+", TokenKind::NumberInteger)
/// MK_RULE!(r"[{(\[;,]", TokenKind::Punctuation, Directive::Push("slashstartsregex"))
/// ```
#[macro_export]
macro_rules! MK_RULE {
    ($pattern:expr, $kind:expr) => {
        $crate::lexer::rules::RuleDef::new($pattern, $kind)
    };
    ($pattern:expr, $kind:expr, $directive:expr) => {
        $crate::lexer::rules::RuleDef::new($pattern, $kind).then($directive)
    };
}
