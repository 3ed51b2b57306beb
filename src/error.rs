//! Error types for the rule engine

use thiserror::Error;

/// Main error type for the rule engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    /// Malformed rule text: empty input, unbalanced parentheses,
    /// missing operator or an incomplete operand.
    #[error("Syntax error: {0}")]
    Syntax(String),

    /// Malformed stored AST (bad packed operand, unknown symbol) or a
    /// field the record does not contain.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Cannot compare field '{field}' ({left}) with literal ({right})")]
    ComparisonType {
        field: String,
        left: &'static str,
        right: &'static str,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Plain-data document that cannot be turned into a tree at all.
    #[error("Invalid document: {0}")]
    Document(String),
}

impl From<serde_json::Error> for RuleError {
    fn from(err: serde_json::Error) -> Self {
        RuleError::Document(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<RuleError> for pyo3::PyErr {
    fn from(err: RuleError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyRuntimeError, PyTypeError, PyValueError};

        match err {
            RuleError::Syntax(_) | RuleError::InvalidArgument(_) | RuleError::Document(_) => {
                PyValueError::new_err(err.to_string())
            }
            RuleError::Evaluation(_) => PyRuntimeError::new_err(err.to_string()),
            RuleError::ComparisonType { .. } => PyTypeError::new_err(err.to_string()),
        }
    }
}

/// Result type alias for the rule engine
pub type Result<T> = std::result::Result<T, RuleError>;
