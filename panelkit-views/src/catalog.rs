//! View catalogs
//!
//! A catalog answers one question: does a template with this identifier
//! exist? Identifiers are dotted paths, optionally namespaced by a package
//! (`crm::modules.contact.list`).

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Existence oracle for view identifiers.
pub trait ViewCatalog: Send + Sync {
    fn exists(&self, identifier: &str) -> bool;
}

impl<T: ViewCatalog + ?Sized> ViewCatalog for std::sync::Arc<T> {
    fn exists(&self, identifier: &str) -> bool {
        (**self).exists(identifier)
    }
}

/// Fixed set of identifiers.
#[derive(Debug, Clone, Default)]
pub struct MemoryViewCatalog {
    views: HashSet<String>,
}

impl MemoryViewCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_view(mut self, identifier: impl Into<String>) -> Self {
        self.views.insert(identifier.into());
        self
    }

    pub fn add(&mut self, identifier: impl Into<String>) {
        self.views.insert(identifier.into());
    }
}

impl<S: Into<String>> FromIterator<S> for MemoryViewCatalog {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            views: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl ViewCatalog for MemoryViewCatalog {
    fn exists(&self, identifier: &str) -> bool {
        self.views.contains(identifier)
    }
}

/// Template files on disk.
///
/// Un-namespaced identifiers live under the app root, `pkg::` identifiers
/// under that package's root. `a.b.c` maps to `a/b/c.<ext>` for any of the
/// configured extensions.
#[derive(Debug, Clone)]
pub struct DirectoryViewCatalog {
    app_root: Option<PathBuf>,
    package_roots: HashMap<String, PathBuf>,
    extensions: Vec<String>,
}

impl Default for DirectoryViewCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryViewCatalog {
    pub fn new() -> Self {
        Self {
            app_root: None,
            package_roots: HashMap::new(),
            extensions: vec!["html".into(), "html.tera".into(), "hbs".into()],
        }
    }

    pub fn with_app_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.app_root = Some(root.into());
        self
    }

    pub fn with_package_root(mut self, package: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.package_roots.insert(package.into(), root.into());
        self
    }

    /// Replace the template file extensions, without leading dots.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Root directory and relative dotted path of an identifier.
    fn locate<'a>(&self, identifier: &'a str) -> Option<(&Path, &'a str)> {
        match identifier.split_once("::") {
            Some((package, path)) => self
                .package_roots
                .get(package)
                .map(|root| (root.as_path(), path)),
            None => self.app_root.as_deref().map(|root| (root, identifier)),
        }
    }

    /// Candidate files for an identifier. Empty for identifiers that could
    /// escape their root.
    fn candidate_files(&self, identifier: &str) -> Vec<PathBuf> {
        let Some((root, path)) = self.locate(identifier) else {
            return Vec::new();
        };
        let segments: Vec<&str> = path.split('.').collect();
        if segments
            .iter()
            .any(|s| s.is_empty() || s.contains(['/', '\\', '~']))
        {
            debug!(identifier, "rejecting unsafe view identifier");
            return Vec::new();
        }
        let relative: PathBuf = segments.iter().collect();
        self.extensions
            .iter()
            .map(|ext| {
                let mut file = root.join(&relative).into_os_string();
                file.push(".");
                file.push(ext);
                PathBuf::from(file)
            })
            .collect()
    }

    /// Every identifier available on disk, sorted. Used for diagnostics.
    pub fn list(&self) -> Vec<String> {
        let mut found = BTreeSet::new();
        let roots = self
            .app_root
            .iter()
            .map(|root| (None, root))
            .chain(self.package_roots.iter().map(|(pkg, root)| (Some(pkg), root)));
        for (package, root) in roots {
            for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(root) else {
                    continue;
                };
                let Some(dotted) = self.identifier_for(relative) else {
                    continue;
                };
                found.insert(match package {
                    Some(pkg) => format!("{pkg}::{dotted}"),
                    None => dotted,
                });
            }
        }
        found.into_iter().collect()
    }

    fn identifier_for(&self, relative: &Path) -> Option<String> {
        let text = relative.to_str()?;
        let stem = self
            .extensions
            .iter()
            .find_map(|ext| text.strip_suffix(&format!(".{ext}")))?;
        Some(
            Path::new(stem)
                .components()
                .filter_map(|c| c.as_os_str().to_str())
                .collect::<Vec<_>>()
                .join("."),
        )
    }
}

impl ViewCatalog for DirectoryViewCatalog {
    fn exists(&self, identifier: &str) -> bool {
        let candidates = self.candidate_files(identifier);
        match candidates.iter().find(|path| path.is_file()) {
            Some(path) => {
                debug!(identifier, path = %path.display(), "view found");
                true
            }
            None => {
                if candidates.is_empty() && identifier.contains("::") {
                    warn!(identifier, "no template root registered for package");
                }
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: PathBuf) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<div></div>").unwrap();
    }

    #[test]
    fn memory_catalog_membership() {
        let catalog: MemoryViewCatalog = ["panelkit::modules.default.list"].into_iter().collect();
        assert!(catalog.exists("panelkit::modules.default.list"));
        assert!(!catalog.exists("panelkit::modules.default.edit"));
    }

    #[test]
    fn package_identifier_maps_to_package_root() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path().join("crm/modules/contact/list.html"));
        let catalog = DirectoryViewCatalog::new().with_package_root("crm", tmp.path().join("crm"));
        assert!(catalog.exists("crm::modules.contact.list"));
        assert!(!catalog.exists("crm::modules.contact.edit"));
        assert!(!catalog.exists("billing::modules.contact.list"));
    }

    #[test]
    fn app_identifier_maps_to_app_root() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path().join("panelkit/modules/default/detail.hbs"));
        let catalog = DirectoryViewCatalog::new().with_app_root(tmp.path());
        assert!(catalog.exists("panelkit.modules.default.detail"));
    }

    #[test]
    fn unsafe_identifiers_never_exist() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path().join("secret.html"));
        let catalog = DirectoryViewCatalog::new().with_app_root(tmp.path().join("views"));
        assert!(!catalog.exists("..secret"));
        assert!(!catalog.exists("a./etc/passwd"));
    }

    #[test]
    fn list_reports_identifiers() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path().join("app/panelkit/modules/contact/list.html"));
        touch(tmp.path().join("fw/modules/default/list.html.tera"));
        touch(tmp.path().join("fw/modules/default/README.md"));
        let catalog = DirectoryViewCatalog::new()
            .with_app_root(tmp.path().join("app"))
            .with_package_root("panelkit", tmp.path().join("fw"));
        assert_eq!(
            catalog.list(),
            vec![
                "panelkit.modules.contact.list".to_string(),
                "panelkit::modules.default.list".to_string(),
            ]
        );
    }
}
