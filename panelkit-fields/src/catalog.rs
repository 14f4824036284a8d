//! Catalog - cached lookups over every kind of definition.
//!
//! Modules come from a [`ModulesContext`]; uitypes, display types and
//! capabilities are registered at boot. Every lookup goes through the
//! [`LookupCache`]. Module changes made through the catalog drop the module
//! bucket so the next lookup reads the new definition.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use crate::cache::{Cached, EntityKind, LookupCache};
use crate::context::ModulesContext;
use crate::error::{FieldsError, Result};
use crate::registry::UiTypeRegistry;
use crate::types::{Capability, DisplayType, FieldDef, ModuleDef, ViewContext, DEFAULT_DISPLAYTYPE};
use crate::uitype::UiType;

fn find_by_key<'a, T>(
    items: &'a [T],
    key: &str,
    id: impl Fn(&T) -> u64,
    name: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    match key.parse::<u64>() {
        Ok(wanted) => items.iter().find(|item| id(item) == wanted),
        Err(_) => items.iter().find(|item| name(item) == key),
    }
}

#[derive(Debug)]
pub struct Catalog {
    modules: RwLock<ModulesContext>,
    uitypes: UiTypeRegistry,
    displaytypes: Vec<DisplayType>,
    capabilities: Vec<Capability>,
    default_displaytype: Arc<DisplayType>,
    cache: LookupCache,
}

impl Catalog {
    /// Catalog over `modules` with the built-in uitypes, display types and
    /// capabilities.
    pub fn new(modules: ModulesContext) -> Self {
        let displaytypes = DisplayType::builtin();
        let default_displaytype = displaytypes
            .iter()
            .find(|d| d.name == DEFAULT_DISPLAYTYPE)
            .cloned()
            .unwrap_or(DisplayType {
                id: 0,
                name: DEFAULT_DISPLAYTYPE.to_string(),
                listable: true,
                detailable: true,
                createable: true,
                editable: true,
            });
        Self {
            modules: RwLock::new(modules),
            uitypes: UiTypeRegistry::with_builtins(),
            displaytypes,
            capabilities: Capability::builtin(),
            default_displaytype: Arc::new(default_displaytype),
            cache: LookupCache::new(),
        }
    }

    /// Replace the uitype registry, e.g. one extended by packages.
    pub fn with_uitypes(mut self, uitypes: UiTypeRegistry) -> Self {
        self.uitypes = uitypes;
        self.cache.invalidate(EntityKind::UiType);
        self
    }

    pub fn uitypes(&self) -> &UiTypeRegistry {
        &self.uitypes
    }

    pub fn cache(&self) -> &LookupCache {
        &self.cache
    }

    // --- Modules ---

    /// Module by name, or by id when `key` is numeric.
    pub async fn module(&self, key: &str) -> Option<Arc<ModuleDef>> {
        if let Some(Cached::Module(hit)) = self.cache.get(EntityKind::Module, key) {
            return Some(hit);
        }
        // Filled under the read guard; writers invalidate under the write guard.
        let modules = self.modules.read().await;
        let found = Arc::new(modules.get_module(key).cloned()?);
        self.cache
            .insert(EntityKind::Module, key, Cached::Module(Arc::clone(&found)));
        drop(modules);
        Some(found)
    }

    /// Like [`module`](Self::module) but missing modules are an error.
    pub async fn require_module(&self, key: &str) -> Result<Arc<ModuleDef>> {
        self.module(key).await.ok_or_else(|| match key.parse::<u64>() {
            Ok(id) => FieldsError::ModuleNotFoundById { id },
            Err(_) => FieldsError::ModuleNotFound {
                name: key.to_string(),
            },
        })
    }

    /// Snapshot of every module, uncached.
    pub async fn modules(&self) -> Vec<ModuleDef> {
        self.modules.read().await.all_modules().to_vec()
    }

    pub async fn write_module(&self, def: &ModuleDef) -> Result<()> {
        let mut modules = self.modules.write().await;
        modules.write_module(def).await?;
        self.cache.invalidate(EntityKind::Module);
        Ok(())
    }

    pub async fn delete_module(&self, id: u64) -> Result<()> {
        let mut modules = self.modules.write().await;
        modules.delete_module(id).await?;
        self.cache.invalidate(EntityKind::Module);
        Ok(())
    }

    // --- Uitypes ---

    pub fn uitype(&self, key: &str) -> Option<Arc<dyn UiType>> {
        match self
            .cache
            .get_or_load(EntityKind::UiType, key, || self.uitypes.get(key).map(Cached::UiType))
        {
            Some(Cached::UiType(uitype)) => Some(uitype),
            _ => None,
        }
    }

    /// Strategy for `field`. Unknown references fall back to `text`.
    pub fn uitype_for(&self, field: &FieldDef) -> Arc<dyn UiType> {
        self.uitype(&field.uitype).unwrap_or_else(|| {
            warn!(field = %field.name, uitype = %field.uitype, "unknown uitype, using text");
            self.uitypes.fallback()
        })
    }

    // --- Display types ---

    pub fn displaytype(&self, key: &str) -> Option<Arc<DisplayType>> {
        let loaded = self.cache.get_or_load(EntityKind::DisplayType, key, || {
            find_by_key(&self.displaytypes, key, |d| d.id, |d| d.name.as_str())
                .map(|d| Cached::DisplayType(Arc::new(d.clone())))
        });
        match loaded {
            Some(Cached::DisplayType(d)) => Some(d),
            _ => None,
        }
    }

    /// Display type of `field`. Unknown references fall back to `everywhere`.
    pub fn displaytype_for(&self, field: &FieldDef) -> Arc<DisplayType> {
        self.displaytype(field.displaytype_name()).unwrap_or_else(|| {
            warn!(field = %field.name, displaytype = %field.displaytype_name(), "unknown displaytype");
            Arc::clone(&self.default_displaytype)
        })
    }

    pub fn is_field_visible(&self, field: &FieldDef, context: ViewContext) -> bool {
        field.is_visible(context, &self.displaytype_for(field))
    }

    /// Fields of `module` visible in `context`, in definition order.
    pub fn visible_fields<'a>(&self, module: &'a ModuleDef, context: ViewContext) -> Vec<&'a FieldDef> {
        module
            .fields
            .iter()
            .filter(|f| self.is_field_visible(f, context))
            .collect()
    }

    // --- Capabilities ---

    pub fn capability(&self, key: &str) -> Option<Arc<Capability>> {
        let loaded = self.cache.get_or_load(EntityKind::Capability, key, || {
            find_by_key(&self.capabilities, key, |c| c.id, |c| c.name.as_str())
                .map(|c| Cached::Capability(Arc::new(c.clone())))
        });
        match loaded {
            Some(Cached::Capability(c)) => Some(c),
            _ => None,
        }
    }

    pub fn invalidate(&self, kind: EntityKind) {
        self.cache.invalidate(kind);
    }

    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}
