//! Error types for view catalogs and translations

use panelkit_common::{ErrorSeverity, Severity};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for view operations
pub type Result<T> = std::result::Result<T, ViewsError>;

#[derive(Debug, Error)]
pub enum ViewsError {
    /// Failed to read a translation or template file
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Translation file is not valid YAML
    #[error("invalid translations in {path}: {source}")]
    Translations {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    /// Translation document is not a mapping
    #[error("translations must be a mapping of keys to strings")]
    NotAMapping,

    /// YAML error on in-memory input
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ViewsError {
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }
}

impl Severity for ViewsError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            ViewsError::NotAMapping => ErrorSeverity::Error,
            ViewsError::FileRead { .. }
            | ViewsError::Translations { .. }
            | ViewsError::Yaml(_) => ErrorSeverity::Critical,
        }
    }
}
