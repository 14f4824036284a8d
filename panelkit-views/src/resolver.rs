//! View resolution chain
//!
//! A view name is resolved against six candidates, most specific first:
//!
//! 1. `{app}.modules.{module}.{view}`
//! 2. `{app}.modules.default.{view}`
//! 3. `{package}::modules.{module}.{view}`
//! 4. `{package}::modules.default.{view}`
//! 5. `{framework}::modules.{module}.{view}`
//! 6. `{framework}::modules.default.{view}`
//!
//! The first candidate the catalog knows wins; otherwise the fallback.

use std::sync::Arc;

use panelkit_config::PanelConfig;
use tracing::trace;

use crate::catalog::ViewCatalog;

#[derive(Clone)]
pub struct ViewResolver {
    catalog: Arc<dyn ViewCatalog>,
    app_namespace: String,
    framework_package: String,
}

impl std::fmt::Debug for ViewResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewResolver")
            .field("app_namespace", &self.app_namespace)
            .field("framework_package", &self.framework_package)
            .finish_non_exhaustive()
    }
}

impl ViewResolver {
    pub fn new(
        catalog: Arc<dyn ViewCatalog>,
        app_namespace: impl Into<String>,
        framework_package: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            app_namespace: app_namespace.into(),
            framework_package: framework_package.into(),
        }
    }

    /// Resolver using the namespaces configured in `config`.
    pub fn from_config(catalog: Arc<dyn ViewCatalog>, config: &PanelConfig) -> Self {
        Self::new(
            catalog,
            config.app_view_namespace.clone(),
            config.framework_package.clone(),
        )
    }

    pub fn framework_package(&self) -> &str {
        &self.framework_package
    }

    /// Candidate identifiers in priority order. Package candidates are
    /// omitted when `package` is empty.
    pub fn candidates(&self, package: &str, module: &str, view: &str) -> Vec<String> {
        let app = &self.app_namespace;
        let framework = &self.framework_package;
        let mut out = vec![
            format!("{app}.modules.{module}.{view}"),
            format!("{app}.modules.default.{view}"),
        ];
        if !package.is_empty() {
            out.push(format!("{package}::modules.{module}.{view}"));
            out.push(format!("{package}::modules.default.{view}"));
        }
        out.push(format!("{framework}::modules.{module}.{view}"));
        out.push(format!("{framework}::modules.default.{view}"));
        out
    }

    /// First existing candidate, else `fallback`.
    pub fn resolve(
        &self,
        package: &str,
        module: &str,
        view: &str,
        fallback: Option<&str>,
    ) -> Option<String> {
        let found = self
            .candidates(package, module, view)
            .into_iter()
            .find(|candidate| self.catalog.exists(candidate));
        trace!(package, module, view, resolved = ?found, "view resolution");
        found.or_else(|| fallback.map(String::from))
    }
}
