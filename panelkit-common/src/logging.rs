//! Logging utilities for panelkit
//!
//! Module and field definitions are nested structures; logging them with
//! `{:?}` produces a single unreadable line. [`Pretty`] renders them as YAML.

use serde::Serialize;
use std::fmt::Debug;

/// Wrapper for pretty-printing types in logs as YAML
///
/// ```ignore
/// use panelkit_common::Pretty;
/// use tracing::debug;
///
/// debug!("loaded module {}", Pretty(&module));
/// ```
///
/// Outputs YAML with a leading newline. Debug is used as a fallback if YAML
/// serialization fails.
pub struct Pretty<T>(pub T);

impl<T: Serialize + Debug> std::fmt::Display for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_yaml::to_string(&self.0) {
            Ok(yaml) => write!(f, "\n{}", yaml),
            Err(_) => write!(f, "\n{:#?}", self.0),
        }
    }
}

impl<T: Serialize + Debug> std::fmt::Debug for Pretty<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Serialize)]
    struct Column {
        name: String,
        visible: bool,
    }

    #[test]
    fn test_pretty_renders_yaml() {
        let column = Column {
            name: "email".into(),
            visible: true,
        };
        let out = format!("{}", Pretty(&column));
        assert!(out.starts_with('\n'));
        assert!(out.contains("name: email"));
        assert!(out.contains("visible: true"));
    }

    #[test]
    fn test_pretty_debug_matches_display() {
        let value = serde_json::json!({"a": 1});
        assert_eq!(format!("{:?}", Pretty(&value)), format!("{}", Pretty(&value)));
    }
}
