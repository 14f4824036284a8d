//! Severity classification for panelkit errors
//!
//! Every panelkit crate defines its own `thiserror` enum. Those enums
//! implement [`Severity`] so callers can decide how loudly to report a
//! failure without matching on every variant of every crate.

/// Severity levels for error classification
///
/// - **Warning**: the operation degraded but produced a usable result
///   (a misconfigured definition was skipped, a lookup fell back).
/// - **Error**: the operation failed; the surrounding request can continue.
/// - **Critical**: the definitions or storage backing the panel are unusable.
///
/// ```rust
/// use panelkit_common::ErrorSeverity;
///
/// let skipped_definition = ErrorSeverity::Warning;
/// assert!(skipped_definition < ErrorSeverity::Critical);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Potential issue but operation can proceed
    Warning,
    /// Operation failed but the request can continue
    Error,
    /// Definitions or storage are unusable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Trait for error types that have severity levels
///
/// ```rust
/// use panelkit_common::{ErrorSeverity, Severity};
///
/// #[derive(Debug)]
/// enum LoadError {
///     Corrupt,
///     Missing,
/// }
///
/// impl Severity for LoadError {
///     fn severity(&self) -> ErrorSeverity {
///         match self {
///             LoadError::Corrupt => ErrorSeverity::Critical,
///             LoadError::Missing => ErrorSeverity::Error,
///         }
///     }
/// }
///
/// assert_eq!(LoadError::Missing.severity(), ErrorSeverity::Error);
/// ```
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;

    /// True when the failure should be surfaced to operators rather than
    /// just logged.
    fn is_critical(&self) -> bool {
        self.severity() == ErrorSeverity::Critical
    }
}
