use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnmatchedInput { .. } => "UnmatchedInput",
            ErrorImpl::UnknownState { .. } => "UnknownState",
            ErrorImpl::DuplicateState { .. } => "DuplicateState",
            ErrorImpl::IncludeCycle { .. } => "IncludeCycle",
            ErrorImpl::InvalidPattern { .. } => "InvalidPattern",
            ErrorImpl::InvalidOption { .. } => "InvalidOption",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnmatchedInput { text } => {
                ErrorTip::Suggestion(format!("No rule matches `{}` here", text.escape_debug()))
            }
            ErrorImpl::UnknownState { state } => {
                ErrorTip::Suggestion(format!("State `{}` is referenced but never defined", state))
            }
            ErrorImpl::DuplicateState { .. } => ErrorTip::None,
            ErrorImpl::IncludeCycle { state } => ErrorTip::Suggestion(format!(
                "State `{}` includes itself, directly or through another state",
                state
            )),
            ErrorImpl::InvalidPattern { .. } => ErrorTip::None,
            ErrorImpl::InvalidOption { name, expected, .. } => {
                ErrorTip::Suggestion(format!("Option `{}` expects {}", name, expected))
            }
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.position == Position::null() {
            return write!(f, "{}", self.internal_error);
        }
        write!(f, "{} at {}:{}", self.internal_error, self.position.1, self.position.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.internal_error)
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unmatched input: {text:?}")]
    UnmatchedInput { text: String },
    #[error("unknown state {state:?}")]
    UnknownState { state: String },
    #[error("state {state:?} defined more than once")]
    DuplicateState { state: String },
    #[error("include cycle through state {state:?}")]
    IncludeCycle { state: String },
    #[error("invalid pattern {pattern:?} in state {state:?}: {message}")]
    InvalidPattern {
        state: String,
        pattern: String,
        message: String,
    },
    #[error("invalid value {value:?} for option {name:?}")]
    InvalidOption {
        name: String,
        value: String,
        expected: String,
    },
}
