//! Error types for module and field definitions

use panelkit_common::{ErrorSeverity, Severity};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for fields operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Errors that can occur in definition operations
#[derive(Debug, Error)]
pub enum FieldsError {
    /// Module not found by name
    #[error("module not found: {name}")]
    ModuleNotFound { name: String },

    /// Module not found by numeric id
    #[error("module not found by id: {id}")]
    ModuleNotFoundById { id: u64 },

    /// Two fields of one module share a name
    #[error("duplicate field name '{name}' in module '{module}'")]
    DuplicateFieldName { module: String, name: String },

    /// Two modules share a numeric id
    #[error("module id {id} is used by both '{existing}' and '{incoming}'")]
    DuplicateModuleId {
        id: u64,
        existing: String,
        incoming: String,
    },

    /// Another module already uses the name
    #[error("module name '{name}' is already used by module {existing_id}")]
    DuplicateModuleName { name: String, existing_id: u64 },

    /// View context name is not one of create/edit/detail/list/everywhere
    #[error("invalid view context: {name}")]
    InvalidViewContext { name: String },

    /// Definitions directory missing
    #[error("definitions directory not found: {path}")]
    NotInitialized { path: PathBuf },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl FieldsError {
    /// Create a duplicate field name error
    pub fn duplicate_field(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateFieldName {
            module: module.into(),
            name: name.into(),
        }
    }
}

impl Severity for FieldsError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            FieldsError::ModuleNotFound { .. }
            | FieldsError::ModuleNotFoundById { .. }
            | FieldsError::InvalidViewContext { .. } => ErrorSeverity::Error,
            FieldsError::DuplicateFieldName { .. }
            | FieldsError::DuplicateModuleId { .. }
            | FieldsError::DuplicateModuleName { .. } => ErrorSeverity::Critical,
            FieldsError::NotInitialized { .. }
            | FieldsError::Io(_)
            | FieldsError::Yaml(_) => ErrorSeverity::Critical,
        }
    }
}
