//! Typed configuration values

use serde::{Deserialize, Serialize};

/// Operator-tunable settings for list, export and view resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Page length used when a request does not ask for one.
    pub items_per_page: usize,
    /// Hard ceiling on page length. Larger requests are truncated.
    pub max_items_per_page: usize,
    /// When false every request runs against a single implicit domain.
    pub multi_domains: bool,
    /// Namespace of the framework-level views and translations.
    pub framework_package: String,
    /// Namespace prefix of app-level view overrides.
    pub app_view_namespace: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            items_per_page: 15,
            max_items_per_page: 100,
            multi_domains: true,
            framework_package: "panelkit".into(),
            app_view_namespace: "panelkit".into(),
        }
    }
}

impl PanelConfig {
    /// Resolve the page length for a request.
    ///
    /// A missing or zero length uses `items_per_page`; anything above
    /// `max_items_per_page` is silently truncated to it.
    pub fn clamp_page_length(&self, requested: Option<usize>) -> usize {
        match requested {
            None | Some(0) => self.items_per_page.min(self.max_items_per_page),
            Some(length) => length.min(self.max_items_per_page),
        }
    }
}
