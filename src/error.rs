use thiserror::Error;

pub type Result<T> = std::result::Result<T, FuzzyError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FuzzyError {
    #[error("syntax error at position {position}: {message}")]
    SyntaxError { position: usize, message: String },

    #[error("semantic error: {0}")]
    SemanticError(String),

    #[error("missing operator: {0}")]
    MissingOperator(String),

    #[error("domain error: {message}")]
    DomainError { message: String },

    #[error("state error: {message}")]
    StateError { message: String },
}

/// Convenience macros for creating errors, one per family, following the
/// teacher's `<family>_error!` convention.
#[macro_export]
macro_rules! syntax_error {
    ($position:expr, $msg:expr) => {
        $crate::error::FuzzyError::SyntaxError {
            position: $position,
            message: $msg.to_string(),
        }
    };
}

#[macro_export]
macro_rules! semantic_error {
    ($msg:expr) => {
        $crate::error::FuzzyError::SemanticError($msg.to_string())
    };
}

#[macro_export]
macro_rules! missing_operator {
    ($msg:expr) => {
        $crate::error::FuzzyError::MissingOperator($msg.to_string())
    };
}

#[macro_export]
macro_rules! state_error {
    ($msg:expr) => {
        $crate::error::FuzzyError::StateError {
            message: $msg.to_string(),
        }
    };
}
