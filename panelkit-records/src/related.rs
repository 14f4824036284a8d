//! Related lists
//!
//! A related list shows records of one module on the detail view of a
//! record of another. How the two are linked is up to a relation provider
//! registered under the list's `method`. `n-1` lists without a provider
//! filter the related module by its foreign key field.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use panelkit_fields::{RelatedListDef, RelationType};
use panelkit_query::{Predicate, Query, Record, RecordId, RecordStore};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{RecordsError, Result};
use crate::panel::Panel;

/// Placeholder the list renderer replaces with each row's id.
pub const RECORD_ID_PLACEHOLDER: &str = "RECORD_ID";

/// Resolves the records linked to a source record.
#[async_trait]
pub trait RelatedRecords: Send + Sync {
    /// One window of related records. `query` already carries the related
    /// module's search conditions and order.
    async fn fetch(
        &self,
        list: &RelatedListDef,
        source_id: RecordId,
        query: Query,
        offset: usize,
        length: usize,
    ) -> Result<Vec<Record>>;

    /// Number of related records.
    async fn count(&self, list: &RelatedListDef, source_id: RecordId) -> Result<usize>;

    /// Ids of every related record.
    async fn record_ids(&self, list: &RelatedListDef, source_id: RecordId)
        -> Result<BTreeSet<RecordId>>;
}

/// Relation providers by method name.
#[derive(Clone, Default)]
pub struct RelationRegistry {
    providers: HashMap<String, Arc<dyn RelatedRecords>>,
}

impl RelationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, method: impl Into<String>, provider: Arc<dyn RelatedRecords>) {
        self.providers.insert(method.into(), provider);
    }

    pub fn get(&self, method: &str) -> Option<Arc<dyn RelatedRecords>> {
        self.providers.get(method).cloned()
    }
}

impl std::fmt::Debug for RelationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut methods: Vec<&String> = self.providers.keys().collect();
        methods.sort();
        f.debug_struct("RelationRegistry")
            .field("methods", &methods)
            .finish()
    }
}

/// `1-n`: related records hold the source id in a foreign key column.
pub struct ForeignKeyRelation {
    store: Arc<dyn RecordStore>,
    column: String,
}

impl ForeignKeyRelation {
    pub fn new(store: Arc<dyn RecordStore>, column: impl Into<String>) -> Self {
        Self {
            store,
            column: column.into(),
        }
    }

    fn linked(&self, query: Query, source_id: RecordId) -> Query {
        query.filter(Predicate::eq(self.column.clone(), source_id))
    }
}

#[async_trait]
impl RelatedRecords for ForeignKeyRelation {
    async fn fetch(
        &self,
        _list: &RelatedListDef,
        source_id: RecordId,
        query: Query,
        offset: usize,
        length: usize,
    ) -> Result<Vec<Record>> {
        let query = self.linked(query, source_id).skip(offset).take(length);
        Ok(self.store.fetch(&query).await?)
    }

    async fn count(&self, _list: &RelatedListDef, source_id: RecordId) -> Result<usize> {
        let query = self.linked(Query::new(self.store.source()), source_id);
        Ok(self.store.count(&query).await?)
    }

    async fn record_ids(
        &self,
        _list: &RelatedListDef,
        source_id: RecordId,
    ) -> Result<BTreeSet<RecordId>> {
        let query = self.linked(Query::new(self.store.source()), source_id);
        let records = self.store.fetch(&query).await?;
        Ok(records.into_iter().map(|r| r.id).collect())
    }
}

/// `n-n`: links live in a pivot store with one row per pair.
pub struct PivotRelation {
    pivot: Arc<dyn RecordStore>,
    related: Arc<dyn RecordStore>,
    source_column: String,
    related_column: String,
}

impl PivotRelation {
    pub fn new(
        pivot: Arc<dyn RecordStore>,
        related: Arc<dyn RecordStore>,
        source_column: impl Into<String>,
        related_column: impl Into<String>,
    ) -> Self {
        Self {
            pivot,
            related,
            source_column: source_column.into(),
            related_column: related_column.into(),
        }
    }

    async fn linked_ids(&self, source_id: RecordId) -> Result<BTreeSet<RecordId>> {
        let query = Query::new(self.pivot.source()).where_eq(self.source_column.clone(), source_id);
        let rows = self.pivot.fetch(&query).await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.get(&self.related_column).and_then(Value::as_i64))
            .collect())
    }
}

#[async_trait]
impl RelatedRecords for PivotRelation {
    async fn fetch(
        &self,
        _list: &RelatedListDef,
        source_id: RecordId,
        query: Query,
        offset: usize,
        length: usize,
    ) -> Result<Vec<Record>> {
        let ids = self.linked_ids(source_id).await?;
        let ids = ids.into_iter().map(Value::from).collect();
        let query = query.filter(Predicate::in_("id", ids)).skip(offset).take(length);
        Ok(self.related.fetch(&query).await?)
    }

    async fn count(&self, _list: &RelatedListDef, source_id: RecordId) -> Result<usize> {
        Ok(self.linked_ids(source_id).await?.len())
    }

    async fn record_ids(
        &self,
        _list: &RelatedListDef,
        source_id: RecordId,
    ) -> Result<BTreeSet<RecordId>> {
        self.linked_ids(source_id).await
    }
}

/// One window of related records plus the total they were cut from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelatedPage {
    pub records: Vec<Record>,
    pub total: usize,
}

/// How a related list gets its records.
enum Strategy {
    Provider(Arc<dyn RelatedRecords>),
    ForeignKey { store: Arc<dyn RecordStore>, column: String },
    Unavailable,
}

#[derive(Debug, Clone, Copy)]
pub struct RelatedListAdapter<'a> {
    panel: &'a Panel,
}

impl<'a> RelatedListAdapter<'a> {
    pub fn new(panel: &'a Panel) -> Self {
        Self { panel }
    }

    /// Find a related list by id across every module.
    pub async fn find(&self, id: u64) -> Result<RelatedListDef> {
        self.panel
            .catalog
            .modules()
            .await
            .into_iter()
            .find_map(|m| m.get_related_list(id).cloned())
            .ok_or(RecordsError::RelatedListNotFound { id })
    }

    async fn strategy(&self, list: &RelatedListDef) -> Strategy {
        if let Some(method) = list.method.as_deref() {
            return match self.panel.relations.get(method) {
                Some(provider) => Strategy::Provider(provider),
                None => {
                    warn!(list = list.id, method, "no relation provider registered");
                    Strategy::Unavailable
                }
            };
        }
        if list.relation != RelationType::ManyToOne {
            warn!(list = list.id, "related list has no method");
            return Strategy::Unavailable;
        }
        let Some(related) = self.panel.catalog.module(&list.related_module).await else {
            warn!(list = list.id, module = %list.related_module, "related module not found");
            return Strategy::Unavailable;
        };
        let column = list
            .related_field
            .as_deref()
            .and_then(|name| related.get_field(name))
            .map(|f| f.column().to_string());
        match (self.panel.store_for(&related), column) {
            (Some(store), Some(column)) => Strategy::ForeignKey { store, column },
            _ => {
                warn!(list = list.id, "n-1 related list without store or related field");
                Strategy::Unavailable
            }
        }
    }

    /// Related records of `source_id`, windowed, with their total.
    pub async fn paginate(
        &self,
        list: &RelatedListDef,
        source_id: RecordId,
        base_query: Query,
        offset: usize,
        length: usize,
    ) -> Result<RelatedPage> {
        match self.strategy(list).await {
            Strategy::Provider(provider) => {
                let records = provider
                    .fetch(list, source_id, base_query, offset, length)
                    .await?;
                let total = provider.count(list, source_id).await?;
                Ok(RelatedPage { records, total })
            }
            Strategy::ForeignKey { store, column } => {
                let query = base_query.filter(Predicate::eq(column, source_id));
                let total = store.count(&query).await?;
                let records = store.fetch(&query.skip(offset).take(length)).await?;
                Ok(RelatedPage { records, total })
            }
            Strategy::Unavailable => Ok(RelatedPage::default()),
        }
    }

    /// Ids already linked to `source_id`. A reflexive list also excludes
    /// the source record itself.
    pub async fn selectable_ids(
        &self,
        list: &RelatedListDef,
        source_id: RecordId,
    ) -> Result<BTreeSet<RecordId>> {
        let mut ids = match self.strategy(list).await {
            Strategy::Provider(provider) => provider.record_ids(list, source_id).await?,
            Strategy::ForeignKey { store, column } => {
                let query = Query::new(store.source()).filter(Predicate::eq(column, source_id));
                store.fetch(&query).await?.into_iter().map(|r| r.id).collect()
            }
            Strategy::Unavailable => BTreeSet::new(),
        };
        if list.is_reflexive() {
            ids.insert(source_id);
        }
        debug!(list = list.id, source_id, excluded = ids.len(), "selection exclusions");
        Ok(ids)
    }

    /// Candidates for linking to `source_id`: records of `base_query` not
    /// already linked. The total is counted with the same exclusion.
    pub async fn paginate_selectable(
        &self,
        store: &dyn RecordStore,
        list: &RelatedListDef,
        source_id: RecordId,
        base_query: Query,
        offset: usize,
        length: usize,
    ) -> Result<RelatedPage> {
        let excluded = self.selectable_ids(list, source_id).await?;
        let query = base_query.where_not_in_ids("id", excluded);
        let total = store.count(&query).await?;
        let records = store.fetch(&query.skip(offset).take(length)).await?;
        Ok(RelatedPage { records, total })
    }

    /// Parameters of the "add" link. `n-1` lists pre-fill the linked field
    /// and its display text.
    pub fn add_params(
        &self,
        list: &RelatedListDef,
        source_id: RecordId,
        source_label: Option<&str>,
    ) -> IndexMap<String, String> {
        let mut params = IndexMap::new();
        params.insert("relatedlist".into(), list.id.to_string());
        params.insert("src_id".into(), source_id.to_string());
        if list.relation == RelationType::ManyToOne {
            if let Some(field) = &list.related_field {
                let display = source_label.map_or_else(|| source_id.to_string(), String::from);
                params.insert(field.clone(), source_id.to_string());
                params.insert(format!("{field}_display"), display);
            }
        }
        if let Some(tab) = list.tab {
            params.insert("tab".into(), tab.to_string());
        }
        params
    }

    /// Parameters of each row's "edit" link.
    pub fn edit_params(&self, list: &RelatedListDef, source_id: RecordId) -> IndexMap<String, String> {
        let mut params = IndexMap::new();
        params.insert("id".into(), RECORD_ID_PLACEHOLDER.into());
        params.insert("relatedlist".into(), list.id.to_string());
        params.insert("src_id".into(), source_id.to_string());
        if let Some(tab) = list.tab {
            params.insert("tab".into(), tab.to_string());
        }
        params
    }

    /// Parameters of each row's "remove relation" link.
    pub fn delete_params(
        &self,
        list: &RelatedListDef,
        source_id: RecordId,
    ) -> IndexMap<String, String> {
        let mut params = IndexMap::new();
        params.insert("id".into(), source_id.to_string());
        params.insert("relatedlist".into(), list.id.to_string());
        params.insert("related_id".into(), RECORD_ID_PLACEHOLDER.into());
        if let Some(tab) = list.tab {
            params.insert("tab".into(), tab.to_string());
        }
        params
    }
}
