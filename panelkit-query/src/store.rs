//! Record stores
//!
//! [`RecordStore`] is the storage collaborator: it executes a [`Query`]
//! against one storage model. [`MemoryStore`] evaluates queries in process
//! and backs the tests of every crate above this one. [`StoreRegistry`] maps
//! storage model names to stores so a module's `model` reference can be
//! resolved at request time.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::{QueryError, Result};
use crate::eval::compare_records;
use crate::query::Query;
use crate::record::{Record, RecordId};

/// Executes queries for one storage model.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Name of the storage model served by this store.
    fn source(&self) -> &str;

    /// Records matching the query, ordered and windowed.
    async fn fetch(&self, query: &Query) -> Result<Vec<Record>>;

    /// Number of records matching the query's predicates. The window is
    /// ignored.
    async fn count(&self, query: &Query) -> Result<usize>;

    /// Look up one record by primary key.
    async fn find(&self, id: RecordId) -> Result<Option<Record>> {
        let query = Query::new(self.source()).where_eq("id", id).take(1);
        Ok(self.fetch(&query).await?.into_iter().next())
    }
}

/// In-process store evaluating predicates against a vector of records.
#[derive(Debug)]
pub struct MemoryStore {
    source: String,
    records: RwLock<Vec<Record>>,
}

impl MemoryStore {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            records: RwLock::new(Vec::new()),
        }
    }

    /// Create a store pre-populated with `records`.
    pub fn with_records(source: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            source: source.into(),
            records: RwLock::new(records),
        }
    }

    /// Insert or replace a record by primary key.
    pub async fn insert(&self, record: Record) {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
    }

    /// Remove a record. Returns whether it existed.
    pub async fn remove(&self, id: RecordId) -> bool {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        records.len() != before
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn check_source(&self, query: &Query) -> Result<()> {
        if query.source() != self.source {
            return Err(QueryError::SourceMismatch {
                store: self.source.clone(),
                source_name: query.source().to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    fn source(&self) -> &str {
        &self.source
    }

    async fn fetch(&self, query: &Query) -> Result<Vec<Record>> {
        self.check_source(query)?;
        let records = self.records.read().await;

        let mut matched: Vec<Record> = records
            .iter()
            .filter(|r| query.predicates().iter().all(|p| p.matches(r)))
            .cloned()
            .collect();
        // Stable sort keeps insertion order for ties.
        matched.sort_by(|a, b| compare_records(query.order(), a, b));

        let window = matched.into_iter().skip(query.offset());
        let page: Vec<Record> = match query.limit() {
            Some(limit) => window.take(limit).collect(),
            None => window.collect(),
        };
        trace!(source = %self.source, returned = page.len(), "memory store fetch");
        Ok(page)
    }

    async fn count(&self, query: &Query) -> Result<usize> {
        self.check_source(query)?;
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|r| query.predicates().iter().all(|p| p.matches(r)))
            .count())
    }
}

/// Storage model name → store.
#[derive(Clone, Default)]
pub struct StoreRegistry {
    stores: HashMap<String, Arc<dyn RecordStore>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a store under its own source name.
    pub fn register(&mut self, store: Arc<dyn RecordStore>) {
        self.stores.insert(store.source().to_string(), store);
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.register(store);
        self
    }

    pub fn get(&self, model: &str) -> Option<Arc<dyn RecordStore>> {
        self.stores.get(model).cloned()
    }

    pub fn contains(&self, model: &str) -> bool {
        self.stores.contains_key(model)
    }
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.stores.keys().collect();
        names.sort();
        f.debug_struct("StoreRegistry").field("stores", &names).finish()
    }
}
