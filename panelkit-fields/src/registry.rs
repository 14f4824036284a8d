//! Uitype registry
//!
//! Built once at boot. Every strategy gets a numeric id in registration
//! order; built-ins take ids 1-14 in the order listed by
//! [`UiTypeRegistry::with_builtins`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;

use crate::uitype::{
    Boolean, Color, Date, DateTime, Email, Entity, Integer, Number, Password, Phone, Select,
    Text, Textarea, UiType, Url,
};

/// Uitypes by id and by name.
#[derive(Debug, Clone)]
pub struct UiTypeRegistry {
    by_id: BTreeMap<u64, Arc<dyn UiType>>,
    by_name: HashMap<String, u64>,
    fallback: Arc<dyn UiType>,
}

impl Default for UiTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UiTypeRegistry {
    /// Empty registry. Unknown lookups still fall back to `text`.
    pub fn new() -> Self {
        Self {
            by_id: BTreeMap::new(),
            by_name: HashMap::new(),
            fallback: Arc::new(Text),
        }
    }

    /// Registry holding the built-in uitypes.
    pub fn with_builtins() -> Self {
        let builtins: Vec<Arc<dyn UiType>> = vec![
            Arc::new(Text),
            Arc::new(Textarea),
            Arc::new(Email),
            Arc::new(Url),
            Arc::new(Phone),
            Arc::new(Password),
            Arc::new(Integer),
            Arc::new(Number),
            Arc::new(Boolean),
            Arc::new(Date),
            Arc::new(DateTime),
            Arc::new(Select),
            Arc::new(Entity),
            Arc::new(Color),
        ];
        let mut registry = Self::new();
        for uitype in builtins {
            registry.register(uitype);
        }
        registry
    }

    /// Register a strategy and return its id. Registering a name again
    /// replaces the strategy and keeps the id.
    pub fn register(&mut self, uitype: Arc<dyn UiType>) -> u64 {
        let name = uitype.name().to_string();
        let id = match self.by_name.get(&name) {
            Some(&id) => id,
            None => self.by_id.keys().next_back().map_or(1, |last| last + 1),
        };
        debug!(uitype = %name, package = %uitype.package(), id, "registered uitype");
        self.by_id.insert(id, uitype);
        self.by_name.insert(name, id);
        id
    }

    pub fn get_by_id(&self, id: u64) -> Option<Arc<dyn UiType>> {
        self.by_id.get(&id).cloned()
    }

    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn UiType>> {
        self.by_name.get(name).and_then(|id| self.get_by_id(*id))
    }

    /// Look up by name, or by id when `key` is numeric.
    pub fn get(&self, key: &str) -> Option<Arc<dyn UiType>> {
        match key.parse::<u64>() {
            Ok(id) => self.get_by_id(id),
            Err(_) => self.get_by_name(key),
        }
    }

    pub fn id_of(&self, name: &str) -> Option<u64> {
        self.by_name.get(name).copied()
    }

    /// Strategy used when a reference resolves to nothing.
    pub fn fallback(&self) -> Arc<dyn UiType> {
        Arc::clone(&self.fallback)
    }

    /// Registered names in id order.
    pub fn names(&self) -> Vec<&str> {
        self.by_id.values().map(|u| u.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
