//! Error types for query execution

use panelkit_common::{ErrorSeverity, Severity};
use thiserror::Error;

/// Result type for query operations
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors raised by record stores
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query targets a different storage model than the store serves
    #[error("store '{store}' cannot execute a query on '{source_name}'")]
    SourceMismatch { store: String, source_name: String },

    /// A sort direction string was neither `asc` nor `desc`
    #[error("invalid sort direction: {value}")]
    InvalidDirection { value: String },

    /// Backend failure reported by a store implementation
    #[error("store error: {message}")]
    Store { message: String },
}

impl QueryError {
    /// Create a store backend error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}

impl Severity for QueryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            QueryError::InvalidDirection { .. } => ErrorSeverity::Warning,
            QueryError::SourceMismatch { .. } => ErrorSeverity::Error,
            QueryError::Store { .. } => ErrorSeverity::Critical,
        }
    }
}
