//! Label translation chain
//!
//! `trans(key, module)` tries, in order: `{module}.{key}`,
//! `{package}::{module}.{key}` when the module belongs to a package,
//! `default.{key}`, `{framework}::default.{key}`, then gives back the bare
//! key.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use panelkit_fields::ModuleDef;
use serde_yaml::Value;
use tracing::{debug, trace};

use crate::error::{Result, ViewsError};

/// Source of translated strings.
pub trait Translations: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

/// Translations held in memory.
///
/// Nested YAML mappings are flattened into dotted keys, so
/// `contact: {field: {name: Name}}` loaded for package `crm` provides
/// `crm::contact.field.name`.
#[derive(Debug, Clone, Default)]
pub struct MemoryTranslations {
    entries: HashMap<String, String>,
}

impl MemoryTranslations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Merge a YAML document. Keys are prefixed with `{package}::` when a
    /// package is given. Later loads override earlier ones.
    pub fn load_yaml(&mut self, package: Option<&str>, yaml: &str) -> Result<usize> {
        let doc: Value = serde_yaml::from_str(yaml)?;
        let Value::Mapping(map) = doc else {
            return Err(ViewsError::NotAMapping);
        };
        let prefix = package.map(|p| format!("{p}::")).unwrap_or_default();
        let before = self.entries.len();
        for (key, value) in map {
            if let Some(key) = scalar_text(&key) {
                self.flatten(&format!("{prefix}{key}"), value);
            }
        }
        Ok(self.entries.len() - before)
    }

    /// Merge a YAML file from disk.
    pub fn load_file(&mut self, package: Option<&str>, path: &Path) -> Result<usize> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ViewsError::file_read(path, e))?;
        let added = self.load_yaml(package, &content).map_err(|e| match e {
            ViewsError::Yaml(source) => ViewsError::Translations {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        debug!(path = %path.display(), added, "translations loaded");
        Ok(added)
    }

    fn flatten(&mut self, key: &str, value: Value) {
        match value {
            Value::Mapping(map) => {
                for (child, value) in map {
                    if let Some(child) = scalar_text(&child) {
                        self.flatten(&format!("{key}.{child}"), value);
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(&other) {
                    self.entries.insert(key.to_string(), text);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

impl Translations for MemoryTranslations {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

#[derive(Clone)]
pub struct Translator {
    translations: Arc<dyn Translations>,
    framework_package: String,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("framework_package", &self.framework_package)
            .finish_non_exhaustive()
    }
}

impl Translator {
    pub fn new(translations: Arc<dyn Translations>, framework_package: impl Into<String>) -> Self {
        Self {
            translations,
            framework_package: framework_package.into(),
        }
    }

    /// Candidate keys in priority order.
    pub fn candidates(&self, key: &str, module: Option<&ModuleDef>) -> Vec<String> {
        let mut out = Vec::with_capacity(4);
        if let Some(module) = module {
            out.push(format!("{}.{key}", module.name));
            if let Some(package) = module.package.as_deref().filter(|p| !p.is_empty()) {
                out.push(format!("{package}::{}.{key}", module.name));
            }
        }
        out.push(format!("default.{key}"));
        out.push(format!("{}::default.{key}", self.framework_package));
        out
    }

    /// Translate `key` in the context of `module`. Untranslated keys come
    /// back unchanged.
    pub fn trans(&self, key: &str, module: Option<&ModuleDef>) -> String {
        for candidate in self.candidates(key, module) {
            if let Some(text) = self.translations.get(&candidate) {
                trace!(key, %candidate, "translated");
                return text;
            }
        }
        key.to_string()
    }
}
