//! Typed read-through lookup cache
//!
//! One process-wide map keyed by `(EntityKind, LookupMode, key)`. Entries are
//! filled on first miss and dropped a whole kind at a time.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::types::{Capability, DisplayType, ModuleDef};
use crate::uitype::UiType;

/// Kind of cached definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Module,
    UiType,
    DisplayType,
    Capability,
}

/// How a key is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupMode {
    ById,
    ByName,
}

impl LookupMode {
    /// Numeric keys are ids, everything else a name.
    pub fn for_key(key: &str) -> Self {
        if key.parse::<u64>().is_ok() {
            LookupMode::ById
        } else {
            LookupMode::ByName
        }
    }
}

/// A cached definition.
#[derive(Clone)]
pub enum Cached {
    Module(Arc<ModuleDef>),
    UiType(Arc<dyn UiType>),
    DisplayType(Arc<DisplayType>),
    Capability(Arc<Capability>),
}

impl Cached {
    pub fn kind(&self) -> EntityKind {
        match self {
            Cached::Module(_) => EntityKind::Module,
            Cached::UiType(_) => EntityKind::UiType,
            Cached::DisplayType(_) => EntityKind::DisplayType,
            Cached::Capability(_) => EntityKind::Capability,
        }
    }
}

impl fmt::Debug for Cached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cached::Module(m) => write!(f, "Module({})", m.name),
            Cached::UiType(u) => write!(f, "UiType({})", u.name()),
            Cached::DisplayType(d) => write!(f, "DisplayType({})", d.name),
            Cached::Capability(c) => write!(f, "Capability({})", c.name),
        }
    }
}

type CacheKey = (EntityKind, LookupMode, String);

#[derive(Debug, Default)]
pub struct LookupCache {
    entries: DashMap<CacheKey, Cached>,
}

impl LookupCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(kind: EntityKind, key: &str) -> CacheKey {
        (kind, LookupMode::for_key(key), key.to_string())
    }

    pub fn get(&self, kind: EntityKind, key: &str) -> Option<Cached> {
        self.entries
            .get(&Self::key(kind, key))
            .map(|entry| entry.value().clone())
    }

    /// Return the cached entry, or run `load` and remember a hit. Misses
    /// are not remembered.
    pub fn get_or_load(
        &self,
        kind: EntityKind,
        key: &str,
        load: impl FnOnce() -> Option<Cached>,
    ) -> Option<Cached> {
        if let Some(hit) = self.get(kind, key) {
            return Some(hit);
        }
        let loaded = load()?;
        trace!(?kind, key, "lookup cache fill");
        self.insert(kind, key, loaded.clone());
        Some(loaded)
    }

    pub fn insert(&self, kind: EntityKind, key: &str, value: Cached) {
        self.entries.insert(Self::key(kind, key), value);
    }

    /// Drop every entry of `kind`.
    pub fn invalidate(&self, kind: EntityKind) {
        self.entries.retain(|(k, _, _), _| *k != kind);
        trace!(?kind, "lookup cache invalidated");
    }

    pub fn invalidate_all(&self) {
        self.entries.clear();
    }

    /// Number of cached entries of `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entries.iter().filter(|e| e.key().0 == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uitype::Text;

    #[test]
    fn numeric_keys_are_ids() {
        assert_eq!(LookupMode::for_key("12"), LookupMode::ById);
        assert_eq!(LookupMode::for_key("contact"), LookupMode::ByName);
    }

    #[test]
    fn read_through_fills_once() {
        let cache = LookupCache::new();
        let mut loads = 0;
        for _ in 0..3 {
            let hit = cache.get_or_load(EntityKind::UiType, "text", || {
                loads += 1;
                Some(Cached::UiType(Arc::new(Text)))
            });
            assert!(hit.is_some());
        }
        assert_eq!(loads, 1);
    }

    #[test]
    fn misses_are_not_cached() {
        let cache = LookupCache::new();
        assert!(cache.get_or_load(EntityKind::Module, "ghost", || None).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_is_per_kind() {
        let cache = LookupCache::new();
        cache.insert(
            EntityKind::Module,
            "contact",
            Cached::Module(Arc::new(ModuleDef::new(1, "contact"))),
        );
        cache.insert(EntityKind::UiType, "text", Cached::UiType(Arc::new(Text)));
        cache.invalidate(EntityKind::Module);
        assert_eq!(cache.count(EntityKind::Module), 0);
        assert_eq!(cache.count(EntityKind::UiType), 1);
        cache.invalidate_all();
        assert!(cache.is_empty());
    }
}
