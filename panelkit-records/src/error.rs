//! Error types for record operations

use panelkit_common::{ErrorSeverity, Severity};
use panelkit_fields::FieldsError;
use panelkit_query::QueryError;
use thiserror::Error;

/// Result type for record operations
pub type Result<T> = std::result::Result<T, RecordsError>;

#[derive(Debug, Error)]
pub enum RecordsError {
    /// Definition lookup or persistence failed
    #[error(transparent)]
    Fields(#[from] FieldsError),

    /// A record store failed
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Export was run without a module
    #[error("no module selected for export")]
    NoModule,

    /// Related list id not defined on any module
    #[error("related list not found: {id}")]
    RelatedListNotFound { id: u64 },

    /// CSV serialisation failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Severity for RecordsError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RecordsError::Fields(e) => e.severity(),
            RecordsError::Query(e) => e.severity(),
            RecordsError::NoModule | RecordsError::RelatedListNotFound { .. } => {
                ErrorSeverity::Error
            }
            RecordsError::Csv(_) | RecordsError::Io(_) | RecordsError::Yaml(_) => {
                ErrorSeverity::Critical
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_delegated() {
        let err: RecordsError = QueryError::store("down").into();
        assert!(err.is_critical());
        let err: RecordsError = FieldsError::ModuleNotFound {
            name: "x".into(),
        }
        .into();
        assert_eq!(err.severity(), ErrorSeverity::Error);
    }
}
