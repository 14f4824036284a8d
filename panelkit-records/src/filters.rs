//! Saved filters
//!
//! A filter remembers which columns a list shows, its search conditions,
//! its order and its page length. Filters are stored as one YAML file per
//! filter under `filters/`, named by ULID.

use std::path::{Path, PathBuf};

use panelkit_common::Pretty;
use panelkit_fields::atomic_write;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, trace, warn};
use ulid::Ulid;

use crate::error::Result;
use crate::search::{Conditions, DomainId, OrderSpec};

/// Filter type of a module's main list.
pub const LIST_FILTER: &str = "list";

/// Filter type of a related list.
pub const RELATED_LIST_FILTER: &str = "related-list";

/// Identifier of the user owning a filter.
pub type UserId = i64;

fn default_filter_type() -> String {
    LIST_FILTER.to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readonly: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub id: Ulid,
    pub module: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserId>,
    pub name: String,
    #[serde(rename = "type", default = "default_filter_type")]
    pub filter_type: String,
    /// Visible field names, in display order.
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default)]
    pub order: OrderSpec,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub data: FilterData,
}

impl Filter {
    pub fn is_readonly(&self) -> bool {
        self.data.readonly.unwrap_or(false)
    }

    /// Whether `user` may use this filter: its owner, or anyone when public
    /// or unowned.
    pub fn is_visible_to(&self, user: Option<UserId>) -> bool {
        self.is_public || self.user.is_none() || self.user == user
    }

    fn matches_key(&self, request: &SaveFilter) -> bool {
        self.domain == request.domain
            && self.module == request.module
            && self.user == request.user
            && self.name == request.name
            && self.filter_type == request.filter_type
    }
}

/// Create-or-update request. Filters are identified by domain, module,
/// user, name and type.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveFilter {
    pub module: String,
    pub domain: Option<DomainId>,
    pub user: Option<UserId>,
    pub name: String,
    pub filter_type: String,
    pub columns: Vec<String>,
    pub conditions: Conditions,
    pub order: OrderSpec,
    pub is_default: bool,
    pub is_public: bool,
    pub length: Option<usize>,
}

impl SaveFilter {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            domain: None,
            user: None,
            name: name.into(),
            filter_type: default_filter_type(),
            columns: Vec::new(),
            conditions: Conditions::new(),
            order: OrderSpec::new(),
            is_default: false,
            is_public: false,
            length: None,
        }
    }

    pub fn for_domain(mut self, domain: DomainId) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn for_user(mut self, user: UserId) -> Self {
        self.user = Some(user);
        self
    }

    pub fn of_type(mut self, filter_type: impl Into<String>) -> Self {
        self.filter_type = filter_type.into();
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn with_order(mut self, order: OrderSpec) -> Self {
        self.order = order;
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }
}

/// Result of [`FilterStore::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    ReadOnly,
    NotFound,
}

impl DeleteOutcome {
    /// Translation key of the message shown to the user.
    pub fn message_key(&self) -> &'static str {
        match self {
            DeleteOutcome::Deleted => "success.filter.deleted",
            DeleteOutcome::ReadOnly => "error.filter.read.only",
            DeleteOutcome::NotFound => "error.filter.not.found",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DeleteOutcome::Deleted)
    }
}

/// Saved filters on disk.
#[derive(Debug)]
pub struct FilterStore {
    dir: PathBuf,
    filters: Vec<Filter>,
}

impl FilterStore {
    /// Create `root/filters` if needed and load every filter in it.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let dir = root.as_ref().join("filters");
        fs::create_dir_all(&dir).await?;

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut filters = Vec::with_capacity(paths.len());
        for path in paths {
            let content = fs::read_to_string(&path).await?;
            match serde_yaml::from_str::<Filter>(&content) {
                Ok(filter) => filters.push(filter),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping invalid filter"),
            }
        }
        debug!(filters = filters.len(), "loaded filters");
        Ok(Self { dir, filters })
    }

    fn path_of(&self, id: Ulid) -> PathBuf {
        self.dir.join(format!("{id}.yaml"))
    }

    async fn persist(&self, filter: &Filter) -> Result<()> {
        let yaml = serde_yaml::to_string(filter)?;
        atomic_write(&self.path_of(filter.id), yaml.as_bytes()).await?;
        Ok(())
    }

    /// Save a filter, updating the one with the same key if it exists.
    ///
    /// Saving a default filter clears the default flag on the other filters
    /// sharing its domain, module, user and type. Memory only changes once
    /// the corresponding file is written, so a failed save leaves the store
    /// as it was.
    pub async fn save(&mut self, request: SaveFilter) -> Result<Filter> {
        let existing = self.filters.iter().position(|f| f.matches_key(&request));
        let mut saved = match existing {
            Some(idx) => self.filters[idx].clone(),
            None => Filter {
                id: Ulid::new(),
                module: request.module.clone(),
                domain: request.domain,
                user: request.user,
                name: request.name.clone(),
                filter_type: request.filter_type.clone(),
                columns: Vec::new(),
                conditions: Conditions::new(),
                order: OrderSpec::new(),
                is_default: false,
                is_public: false,
                data: FilterData::default(),
            },
        };
        saved.columns = request.columns;
        saved.conditions = request.conditions;
        saved.order = request.order;
        saved.is_default = request.is_default;
        saved.is_public = request.is_public;
        saved.data.length = request.length;

        self.persist(&saved).await?;
        match existing {
            Some(idx) => self.filters[idx] = saved.clone(),
            None => self.filters.push(saved.clone()),
        }
        debug!(id = %saved.id, module = %saved.module, name = %saved.name, "saved filter");
        trace!("filter {}", Pretty(&saved));

        if saved.is_default {
            let demoted: Vec<usize> = self
                .filters
                .iter()
                .enumerate()
                .filter(|(_, other)| {
                    other.id != saved.id
                        && other.is_default
                        && other.domain == saved.domain
                        && other.module == saved.module
                        && other.user == saved.user
                        && other.filter_type == saved.filter_type
                })
                .map(|(idx, _)| idx)
                .collect();
            for idx in demoted {
                let mut other = self.filters[idx].clone();
                other.is_default = false;
                self.persist(&other).await?;
                debug!(id = %other.id, "demoted default filter");
                self.filters[idx] = other;
            }
        }
        Ok(saved)
    }

    /// Delete a filter unless it is read only.
    pub async fn delete(&mut self, id: Ulid) -> Result<DeleteOutcome> {
        let Some(idx) = self.filters.iter().position(|f| f.id == id) else {
            return Ok(DeleteOutcome::NotFound);
        };
        if self.filters[idx].is_readonly() {
            return Ok(DeleteOutcome::ReadOnly);
        }

        let path = self.path_of(id);
        if fs::try_exists(&path).await? {
            fs::remove_file(&path).await?;
        }
        self.filters.remove(idx);
        debug!(%id, "deleted filter");
        Ok(DeleteOutcome::Deleted)
    }

    pub fn get(&self, id: Ulid) -> Option<&Filter> {
        self.filters.iter().find(|f| f.id == id)
    }

    pub fn all(&self) -> &[Filter] {
        &self.filters
    }

    /// Filters of one module and type visible to `user`.
    pub fn for_module(
        &self,
        module: &str,
        filter_type: &str,
        user: Option<UserId>,
    ) -> Vec<&Filter> {
        self.filters
            .iter()
            .filter(|f| f.module == module && f.filter_type == filter_type)
            .filter(|f| f.is_visible_to(user))
            .collect()
    }

    /// Default filter of a module for a filter type as seen by `user`,
    /// falling back to the module's list filter.
    ///
    /// Only filters visible to `user` qualify. The user's own default wins,
    /// then a public or unowned default, then the first visible filter of
    /// the type.
    pub fn default_for(
        &self,
        module: &str,
        filter_type: &str,
        user: Option<UserId>,
    ) -> Option<&Filter> {
        let find = |kind: &str| {
            let visible: Vec<&Filter> = self
                .filters
                .iter()
                .filter(|f| f.module == module && f.filter_type == kind)
                .filter(|f| f.is_visible_to(user))
                .collect();
            visible
                .iter()
                .find(|f| f.is_default && user.is_some() && f.user == user)
                .or_else(|| visible.iter().find(|f| f.is_default))
                .or_else(|| visible.first())
                .copied()
        };
        find(filter_type).or_else(|| {
            if filter_type == LIST_FILTER {
                None
            } else {
                find(LIST_FILTER)
            }
        })
    }

    /// The requested filter when it exists, belongs to `module` and is
    /// visible to `user`, else the module's default for `user`.
    pub fn resolve(
        &self,
        id: Option<Ulid>,
        module: &str,
        filter_type: &str,
        user: Option<UserId>,
    ) -> Option<&Filter> {
        id.and_then(|id| self.get(id))
            .filter(|f| f.module == module && f.is_visible_to(user))
            .or_else(|| self.default_for(module, filter_type, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelkit_query::SortDirection;
    use tempfile::TempDir;

    #[tokio::test]
    async fn save_is_first_or_new() {
        let tmp = TempDir::new().unwrap();
        let mut store = FilterStore::open(tmp.path()).await.unwrap();

        let first = store
            .save(SaveFilter::new("contact", "mine").with_columns(["name"]))
            .await
            .unwrap();
        let second = store
            .save(SaveFilter::new("contact", "mine").with_columns(["name", "email"]))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.all().len(), 1);
        assert_eq!(second.columns, vec!["name", "email"]);

        let other = store
            .save(SaveFilter::new("contact", "mine").for_user(7))
            .await
            .unwrap();
        assert_ne!(other.id, first.id);
    }

    #[tokio::test]
    async fn filters_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let mut order = OrderSpec::new();
        order.insert("name".into(), SortDirection::Desc);
        let mut conditions = Conditions::new();
        conditions.insert("status".into(), "open".into());

        let saved = {
            let mut store = FilterStore::open(tmp.path()).await.unwrap();
            store
                .save(
                    SaveFilter::new("deal", "open deals")
                        .with_order(order)
                        .with_conditions(conditions)
                        .with_length(50),
                )
                .await
                .unwrap()
        };

        let store = FilterStore::open(tmp.path()).await.unwrap();
        assert_eq!(store.get(saved.id), Some(&saved));
    }

    #[tokio::test]
    async fn invalid_files_are_skipped() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("filters")).unwrap();
        std::fs::write(tmp.path().join("filters/broken.yaml"), "id: [").unwrap();
        let store = FilterStore::open(tmp.path()).await.unwrap();
        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn delete_refuses_readonly() {
        let tmp = TempDir::new().unwrap();
        let mut store = FilterStore::open(tmp.path()).await.unwrap();
        let filter = store.save(SaveFilter::new("contact", "all")).await.unwrap();
        store.filters[0].data.readonly = Some(true);

        let outcome = store.delete(filter.id).await.unwrap();
        assert_eq!(outcome, DeleteOutcome::ReadOnly);
        assert_eq!(outcome.message_key(), "error.filter.read.only");

        store.filters[0].data.readonly = None;
        assert_eq!(store.delete(filter.id).await.unwrap(), DeleteOutcome::Deleted);
        assert_eq!(store.delete(filter.id).await.unwrap(), DeleteOutcome::NotFound);
        assert!(!tmp.path().join(format!("filters/{}.yaml", filter.id)).exists());
    }

    #[tokio::test]
    async fn default_falls_back_to_list() {
        let tmp = TempDir::new().unwrap();
        let mut store = FilterStore::open(tmp.path()).await.unwrap();
        let list = store
            .save(SaveFilter::new("contact", "all").as_default())
            .await
            .unwrap();

        let found = store.default_for("contact", RELATED_LIST_FILTER, None).unwrap();
        assert_eq!(found.id, list.id);
        assert!(store.default_for("deal", LIST_FILTER, None).is_none());
    }

    #[tokio::test]
    async fn new_default_demotes_previous() {
        let tmp = TempDir::new().unwrap();
        let mut store = FilterStore::open(tmp.path()).await.unwrap();
        let a = store.save(SaveFilter::new("contact", "a").as_default()).await.unwrap();
        let b = store.save(SaveFilter::new("contact", "b").as_default()).await.unwrap();

        assert!(!store.get(a.id).unwrap().is_default);
        assert_eq!(store.default_for("contact", LIST_FILTER, None).unwrap().id, b.id);
    }

    #[tokio::test]
    async fn resolve_ignores_foreign_filter() {
        let tmp = TempDir::new().unwrap();
        let mut store = FilterStore::open(tmp.path()).await.unwrap();
        let deal = store.save(SaveFilter::new("deal", "x")).await.unwrap();
        let default = store
            .save(SaveFilter::new("contact", "all").as_default())
            .await
            .unwrap();

        let resolved = store.resolve(Some(deal.id), "contact", LIST_FILTER, None).unwrap();
        assert_eq!(resolved.id, default.id);
        assert!(store.resolve(Some(Ulid::new()), "tag", LIST_FILTER, None).is_none());
    }

    #[tokio::test]
    async fn private_filters_are_hidden_from_others() {
        let tmp = TempDir::new().unwrap();
        let mut store = FilterStore::open(tmp.path()).await.unwrap();
        store.save(SaveFilter::new("contact", "mine").for_user(1)).await.unwrap();
        store
            .save(SaveFilter::new("contact", "shared").for_user(1).public())
            .await
            .unwrap();

        assert_eq!(store.for_module("contact", LIST_FILTER, Some(1)).len(), 2);
        let others = store.for_module("contact", LIST_FILTER, Some(2));
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].name, "shared");
    }

    #[tokio::test]
    async fn defaults_are_per_user() {
        let tmp = TempDir::new().unwrap();
        let mut store = FilterStore::open(tmp.path()).await.unwrap();
        let shared = store
            .save(SaveFilter::new("contact", "everyone").as_default())
            .await
            .unwrap();
        let private = store
            .save(SaveFilter::new("contact", "mine").for_user(1).as_default())
            .await
            .unwrap();

        assert!(store.get(shared.id).unwrap().is_default);
        assert_eq!(store.default_for("contact", LIST_FILTER, Some(1)).unwrap().id, private.id);
        assert_eq!(store.default_for("contact", LIST_FILTER, Some(2)).unwrap().id, shared.id);
        assert_eq!(store.default_for("contact", LIST_FILTER, None).unwrap().id, shared.id);

        let resolved = store
            .resolve(Some(private.id), "contact", LIST_FILTER, Some(2))
            .unwrap();
        assert_eq!(resolved.id, shared.id);
    }

    #[tokio::test]
    async fn private_default_alone_is_not_offered_to_others() {
        let tmp = TempDir::new().unwrap();
        let mut store = FilterStore::open(tmp.path()).await.unwrap();
        store
            .save(SaveFilter::new("contact", "mine").for_user(1).as_default())
            .await
            .unwrap();

        assert!(store.default_for("contact", LIST_FILTER, Some(1)).is_some());
        assert!(store.default_for("contact", LIST_FILTER, Some(2)).is_none());
        assert!(store.default_for("contact", RELATED_LIST_FILTER, Some(2)).is_none());
    }

    #[tokio::test]
    async fn failed_save_leaves_store_unchanged() {
        let tmp = TempDir::new().unwrap();
        let mut store = FilterStore::open(tmp.path()).await.unwrap();
        let first = store
            .save(SaveFilter::new("contact", "a").as_default())
            .await
            .unwrap();

        let dir = tmp.path().join("filters");
        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::write(&dir, "not a directory").unwrap();

        assert!(store
            .save(SaveFilter::new("contact", "b").as_default())
            .await
            .is_err());
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.all()[0], first);
        assert!(store.get(first.id).unwrap().is_default);

        assert!(store
            .save(SaveFilter::new("contact", "a").with_columns(["name"]))
            .await
            .is_err());
        assert_eq!(store.all()[0], first);
    }
}
