//! ModulesContext - module definitions on disk.
//!
//! Module definitions live as one YAML file per module under a `modules/`
//! directory. The context keeps them in memory with indexes by name and by
//! numeric id.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use panelkit_common::Pretty;
use tokio::fs;
use tracing::{debug, trace, warn};
use ulid::Ulid;

use crate::error::{FieldsError, Result};
use crate::types::ModuleDef;

/// Module definitions seeded on open.
///
/// Defaults are matched by id: a module whose id already exists on disk is
/// left alone, even if it was renamed.
#[derive(Debug, Default)]
pub struct ModuleDefaults {
    modules: Vec<ModuleDef>,
}

impl ModuleDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a default module definition.
    pub fn module(mut self, def: ModuleDef) -> Self {
        self.modules.push(def);
        self
    }

    pub fn modules(&self) -> &[ModuleDef] {
        &self.modules
    }
}

/// Builder for `ModulesContext`. Created by `ModulesContext::open()`.
pub struct ModulesContextBuilder {
    root: PathBuf,
    defaults: Option<ModuleDefaults>,
}

impl ModulesContextBuilder {
    pub fn with_defaults(mut self, defaults: ModuleDefaults) -> Self {
        self.defaults = Some(defaults);
        self
    }

    /// Create the directory, seed defaults, load from disk.
    pub async fn build(self) -> Result<ModulesContext> {
        let root = self.root;
        fs::create_dir_all(root.join("modules")).await?;

        if let Some(defaults) = self.defaults {
            seed_defaults(&root, &defaults).await?;
        }

        let mut ctx = ModulesContext {
            root,
            modules: Vec::new(),
            name_index: HashMap::new(),
            id_index: HashMap::new(),
        };
        ctx.load_modules().await?;

        debug!(modules = ctx.modules.len(), "modules context opened");
        Ok(ctx)
    }
}

async fn seed_defaults(root: &Path, defaults: &ModuleDefaults) -> Result<()> {
    let dir = root.join("modules");
    let existing = collect_existing_ids(&dir).await?;

    for def in defaults.modules() {
        if existing.contains(&def.id) {
            continue;
        }
        def.validate()?;
        let yaml = serde_yaml::to_string(def)?;
        atomic_write(&dir.join(format!("{}.yaml", def.name)), yaml.as_bytes()).await?;
        debug!(name = %def.name, id = def.id, "seeded default module");
    }
    Ok(())
}

async fn collect_existing_ids(dir: &Path) -> Result<Vec<u64>> {
    let mut ids = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !is_yaml(&path) {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path).await {
            if let Ok(def) = serde_yaml::from_str::<ModuleDef>(&content) {
                ids.push(def.id);
            }
        }
    }
    Ok(ids)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Module definitions backed by a directory:
/// ```text
/// <root>/
///   modules/    ← one .yaml per module
/// ```
#[derive(Debug)]
pub struct ModulesContext {
    root: PathBuf,
    modules: Vec<ModuleDef>,
    name_index: HashMap<String, usize>,
    id_index: HashMap<u64, usize>,
}

impl ModulesContext {
    /// Open or create a definitions directory.
    ///
    /// ```rust,ignore
    /// let ctx = ModulesContext::open(path)
    ///     .with_defaults(crm_modules())
    ///     .build()
    ///     .await?;
    /// ```
    pub fn open(root: impl Into<PathBuf>) -> ModulesContextBuilder {
        ModulesContextBuilder {
            root: root.into(),
            defaults: None,
        }
    }

    pub fn get_module_by_name(&self, name: &str) -> Option<&ModuleDef> {
        self.name_index.get(name).map(|&i| &self.modules[i])
    }

    pub fn get_module_by_id(&self, id: u64) -> Option<&ModuleDef> {
        self.id_index.get(&id).map(|&i| &self.modules[i])
    }

    /// Look up by name, or by id when `key` is numeric.
    pub fn get_module(&self, key: &str) -> Option<&ModuleDef> {
        match key.parse::<u64>() {
            Ok(id) => self.get_module_by_id(id),
            Err(_) => self.get_module_by_name(key),
        }
    }

    pub fn all_modules(&self) -> &[ModuleDef] {
        &self.modules
    }

    /// Create or update a module. Persists to YAML immediately; a rename
    /// removes the old file.
    pub async fn write_module(&mut self, def: &ModuleDef) -> Result<()> {
        def.validate()?;
        if let Some(&idx) = self.name_index.get(&def.name) {
            let existing = &self.modules[idx];
            if existing.id != def.id {
                return Err(FieldsError::DuplicateModuleName {
                    name: def.name.clone(),
                    existing_id: existing.id,
                });
            }
        }

        let yaml = serde_yaml::to_string(def)?;
        atomic_write(&self.module_path(&def.name), yaml.as_bytes()).await?;

        if let Some(&idx) = self.id_index.get(&def.id) {
            let old_name = self.modules[idx].name.clone();
            if old_name != def.name {
                self.name_index.remove(&old_name);
                let _ = fs::remove_file(self.module_path(&old_name)).await;
            }
            self.modules[idx] = def.clone();
            self.name_index.insert(def.name.clone(), idx);
        } else {
            let idx = self.modules.len();
            self.modules.push(def.clone());
            self.name_index.insert(def.name.clone(), idx);
            self.id_index.insert(def.id, idx);
        }
        debug!(name = %def.name, id = def.id, "module written");
        trace!("module definition {}", Pretty(def));
        Ok(())
    }

    /// Delete a module by id.
    pub async fn delete_module(&mut self, id: u64) -> Result<()> {
        let idx = self
            .id_index
            .get(&id)
            .copied()
            .ok_or(FieldsError::ModuleNotFoundById { id })?;

        let name = self.modules[idx].name.clone();
        let _ = fs::remove_file(self.module_path(&name)).await;
        self.name_index.remove(&name);
        self.id_index.remove(&id);

        self.modules.swap_remove(idx);
        if idx < self.modules.len() {
            let moved = &self.modules[idx];
            self.name_index.insert(moved.name.clone(), idx);
            self.id_index.insert(moved.id, idx);
        }
        debug!(%name, id, "module deleted");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn module_path(&self, name: &str) -> PathBuf {
        self.root.join("modules").join(format!("{name}.yaml"))
    }

    async fn load_modules(&mut self) -> Result<()> {
        let dir = self.root.join("modules");
        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if is_yaml(&path) {
                paths.push(path);
            }
        }
        // Directory order is unspecified; load in a stable order.
        paths.sort();

        for path in paths {
            let content = fs::read_to_string(&path).await?;
            let def = match serde_yaml::from_str::<ModuleDef>(&content) {
                Ok(def) => def,
                Err(e) => {
                    warn!(?path, %e, "skipping invalid module definition");
                    continue;
                }
            };
            def.validate()?;
            if let Some(&idx) = self.id_index.get(&def.id) {
                return Err(FieldsError::DuplicateModuleId {
                    id: def.id,
                    existing: self.modules[idx].name.clone(),
                    incoming: def.name,
                });
            }
            let idx = self.modules.len();
            self.name_index.insert(def.name.clone(), idx);
            self.id_index.insert(def.id, idx);
            self.modules.push(def);
        }
        Ok(())
    }
}

/// Write to a temp file then rename for atomic persistence.
pub async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no parent dir"))?;
    let tmp = dir.join(format!(".tmp_{}", Ulid::new()));
    fs::write(&tmp, data).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldDef;
    use tempfile::TempDir;

    fn contact() -> ModuleDef {
        ModuleDef::new(10, "contact")
            .with_model("contacts")
            .field(FieldDef::new("name", "text"))
            .field(FieldDef::new("email", "email"))
    }

    fn sample_defaults() -> ModuleDefaults {
        ModuleDefaults::new()
            .module(contact())
            .module(ModuleDef::new(11, "account").field(FieldDef::new("name", "text")))
    }

    #[tokio::test]
    async fn open_creates_directories() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("defs");
        let ctx = ModulesContext::open(&root).build().await.unwrap();
        assert!(root.join("modules").is_dir());
        assert!(ctx.all_modules().is_empty());
    }

    #[tokio::test]
    async fn defaults_are_seeded() {
        let tmp = TempDir::new().unwrap();
        let ctx = ModulesContext::open(tmp.path())
            .with_defaults(sample_defaults())
            .build()
            .await
            .unwrap();
        assert_eq!(ctx.all_modules().len(), 2);
        assert_eq!(ctx.get_module("contact").unwrap().id, 10);
        assert_eq!(ctx.get_module("11").unwrap().name, "account");
        assert!(tmp.path().join("modules/contact.yaml").exists());
    }

    #[tokio::test]
    async fn seeding_preserves_customizations() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = ModulesContext::open(tmp.path())
            .with_defaults(sample_defaults())
            .build()
            .await
            .unwrap();

        let mut customized = contact();
        customized.name = "person".into();
        customized.icon = Some("face".into());
        ctx.write_module(&customized).await.unwrap();
        drop(ctx);

        let ctx = ModulesContext::open(tmp.path())
            .with_defaults(sample_defaults())
            .build()
            .await
            .unwrap();
        assert!(ctx.get_module_by_name("contact").is_none());
        assert_eq!(ctx.get_module_by_id(10).unwrap().icon.as_deref(), Some("face"));
    }

    #[tokio::test]
    async fn write_module_rename_removes_old_file() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = ModulesContext::open(tmp.path()).build().await.unwrap();
        let mut def = contact();
        ctx.write_module(&def).await.unwrap();
        def.name = "person".into();
        ctx.write_module(&def).await.unwrap();

        assert_eq!(ctx.all_modules().len(), 1);
        assert!(!tmp.path().join("modules/contact.yaml").exists());
        assert!(tmp.path().join("modules/person.yaml").exists());
    }

    #[tokio::test]
    async fn write_rejects_duplicate_fields() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = ModulesContext::open(tmp.path()).build().await.unwrap();
        let def = contact().field(FieldDef::new("email", "text"));
        let err = ctx.write_module(&def).await.unwrap_err();
        assert!(matches!(err, FieldsError::DuplicateFieldName { .. }));
        assert!(ctx.all_modules().is_empty());
    }

    #[tokio::test]
    async fn write_rejects_name_taken_by_other_module() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = ModulesContext::open(tmp.path())
            .with_defaults(sample_defaults())
            .build()
            .await
            .unwrap();
        let clash = ModuleDef::new(12, "contact");
        let err = ctx.write_module(&clash).await.unwrap_err();
        assert!(matches!(err, FieldsError::DuplicateModuleName { existing_id: 10, .. }));
    }

    #[tokio::test]
    async fn load_fails_on_duplicate_fields() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("modules");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("broken.yaml"),
            "id: 3\nname: broken\nfields:\n  - name: a\n    uitype: text\n  - name: a\n    uitype: text\n",
        )
        .unwrap();
        let err = ModulesContext::open(tmp.path()).build().await.unwrap_err();
        assert!(matches!(err, FieldsError::DuplicateFieldName { .. }));
    }

    #[tokio::test]
    async fn invalid_yaml_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("modules");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("junk.yaml"), "{{ not yaml").unwrap();
        let ctx = ModulesContext::open(tmp.path()).build().await.unwrap();
        assert!(ctx.all_modules().is_empty());
    }

    #[tokio::test]
    async fn delete_module_fixes_indexes() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = ModulesContext::open(tmp.path())
            .with_defaults(sample_defaults())
            .build()
            .await
            .unwrap();
        ctx.delete_module(10).await.unwrap();
        assert!(ctx.get_module_by_id(10).is_none());
        assert_eq!(ctx.get_module_by_name("account").unwrap().id, 11);
        assert!(matches!(
            ctx.delete_module(10).await.unwrap_err(),
            FieldsError::ModuleNotFoundById { id: 10 }
        ));
    }
}
