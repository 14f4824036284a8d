//! # panelkit Common
//!
//! Small foundational pieces shared by every panelkit crate:
//!
//! - [`error`] - severity classification implemented by each crate's error enum
//! - [`logging`] - the [`Pretty`] wrapper for logging definitions as YAML

pub mod error;
pub mod logging;

pub use error::{ErrorSeverity, Severity};
pub use logging::Pretty;
