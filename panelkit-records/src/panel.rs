//! Shared request-independent state.

use std::sync::Arc;

use panelkit_config::PanelConfig;
use panelkit_fields::{Catalog, ModuleDef};
use panelkit_query::{RecordStore, StoreRegistry};
use panelkit_views::{Translator, ViewResolver};

use crate::related::{RelatedRecords, RelationRegistry};

/// Everything the record services read: configuration, definitions,
/// storage, relation providers, views and translations.
#[derive(Clone)]
pub struct Panel {
    pub config: PanelConfig,
    pub catalog: Arc<Catalog>,
    pub stores: StoreRegistry,
    pub relations: RelationRegistry,
    pub views: ViewResolver,
    pub translator: Translator,
}

impl std::fmt::Debug for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Panel")
            .field("config", &self.config)
            .field("stores", &self.stores)
            .field("relations", &self.relations)
            .finish_non_exhaustive()
    }
}

impl Panel {
    pub fn new(
        config: PanelConfig,
        catalog: Arc<Catalog>,
        views: ViewResolver,
        translator: Translator,
    ) -> Self {
        Self {
            config,
            catalog,
            stores: StoreRegistry::new(),
            relations: RelationRegistry::new(),
            views,
            translator,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.stores.register(store);
        self
    }

    pub fn with_relation(mut self, method: impl Into<String>, provider: Arc<dyn RelatedRecords>) -> Self {
        self.relations.register(method, provider);
        self
    }

    /// Storage model name of a module: its `model`, else its name.
    pub fn source_of<'a>(&self, module: &'a ModuleDef) -> &'a str {
        module.model.as_deref().unwrap_or(&module.name)
    }

    /// Store backing a module, if one is registered.
    pub fn store_for(&self, module: &ModuleDef) -> Option<Arc<dyn RecordStore>> {
        self.stores.get(self.source_of(module))
    }
}
