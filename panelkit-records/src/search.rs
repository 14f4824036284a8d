//! Search query builder
//!
//! Turns a module, an optional domain scope, per-field search values and an
//! ordered sort spec into an unexecuted [`Query`]. Building is pure: the same
//! inputs always give the same query.

use indexmap::IndexMap;
use panelkit_fields::{Catalog, ModuleDef, SearchValue};
use panelkit_query::{Query, SortDirection};
use tracing::debug;

/// Identifier of a tenant domain.
pub type DomainId = i64;

/// Column holding the owning domain of domain-scoped records.
pub const DOMAIN_COLUMN: &str = "domain_id";

/// Field name → raw search value, in request order.
pub type Conditions = IndexMap<String, SearchValue>;

/// Field name or column → direction, in precedence order.
pub type OrderSpec = IndexMap<String, SortDirection>;

/// A built query plus the condition names that matched no field.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub query: Query,
    pub ignored: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchQueryBuilder<'a> {
    catalog: &'a Catalog,
    multi_domains: bool,
}

impl<'a> SearchQueryBuilder<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            multi_domains: true,
        }
    }

    /// With multi-domain support off, domain scopes are not applied.
    pub fn with_multi_domains(mut self, enabled: bool) -> Self {
        self.multi_domains = enabled;
        self
    }

    /// Every record of the module, scoped to `domain` when the module is
    /// domain scoped.
    pub fn base_query(&self, module: &ModuleDef, domain: Option<DomainId>) -> Query {
        let source = module.model.as_deref().unwrap_or(&module.name);
        let query = Query::new(source);
        match domain {
            Some(domain) if module.domain_scoped && self.multi_domains => {
                query.where_eq(DOMAIN_COLUMN, domain)
            }
            _ => query,
        }
    }

    /// Narrow `query` with one condition per known, non-empty search value.
    /// Returns the names that matched no field.
    pub fn apply_conditions(
        &self,
        module: &ModuleDef,
        mut query: Query,
        conditions: &Conditions,
    ) -> (Query, Vec<String>) {
        let mut ignored = Vec::new();
        for (name, value) in conditions {
            if !value.is_present() {
                continue;
            }
            let Some(field) = module.get_field(name) else {
                debug!(module = %module.name, field = %name, "ignoring search on unknown field");
                ignored.push(name.clone());
                continue;
            };
            let uitype = self.catalog.uitype_for(field);
            query = uitype.add_condition_to_search_query(query, field, value);
        }
        (query, ignored)
    }

    /// Append sort keys in order. Keys naming a field sort by its column.
    pub fn apply_order(&self, module: &ModuleDef, mut query: Query, order: &OrderSpec) -> Query {
        for (key, direction) in order {
            let column = module.get_field(key).map_or(key.as_str(), |f| f.column());
            query = query.order_by(column, *direction);
        }
        query
    }

    pub fn build(
        &self,
        module: &ModuleDef,
        domain: Option<DomainId>,
        conditions: &Conditions,
        order: &OrderSpec,
    ) -> SearchQuery {
        let base = self.base_query(module, domain);
        let (query, ignored) = self.apply_conditions(module, base, conditions);
        let query = self.apply_order(module, query, order);
        SearchQuery { query, ignored }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelkit_fields::{FieldDef, ModulesContext};
    use panelkit_query::Predicate;
    use tempfile::TempDir;

    async fn catalog() -> (TempDir, Catalog) {
        let tmp = TempDir::new().unwrap();
        let ctx = ModulesContext::open(tmp.path()).build().await.unwrap();
        (tmp, Catalog::new(ctx))
    }

    fn contact() -> ModuleDef {
        ModuleDef::new(1, "contact")
            .with_model("contacts")
            .domain_scoped()
            .field(FieldDef::new("name", "text"))
            .field(FieldDef::new("last_name", "text").with_column("lastname"))
            .field(FieldDef::new("age", "integer"))
    }

    #[tokio::test]
    async fn unknown_condition_is_skipped_and_reported() {
        let (_tmp, catalog) = catalog().await;
        let mut conditions = Conditions::new();
        conditions.insert("unknown".into(), "x".into());
        conditions.insert("name".into(), "ann".into());
        let built = SearchQueryBuilder::new(&catalog).build(
            &contact(),
            None,
            &conditions,
            &OrderSpec::new(),
        );
        assert_eq!(built.query.predicates(), &[Predicate::contains("name", "ann")]);
        assert_eq!(built.ignored, vec!["unknown".to_string()]);
    }

    #[tokio::test]
    async fn empty_values_are_not_conditions() {
        let (_tmp, catalog) = catalog().await;
        let mut conditions = Conditions::new();
        conditions.insert("name".into(), "  ".into());
        conditions.insert("age".into(), SearchValue::List(vec![]));
        let built = SearchQueryBuilder::new(&catalog).build(
            &contact(),
            None,
            &conditions,
            &OrderSpec::new(),
        );
        assert!(built.query.predicates().is_empty());
        assert!(built.ignored.is_empty());
    }

    #[tokio::test]
    async fn domain_scope_only_for_scoped_modules() {
        let (_tmp, catalog) = catalog().await;
        let builder = SearchQueryBuilder::new(&catalog);
        let scoped = builder.base_query(&contact(), Some(4));
        assert_eq!(scoped.predicates(), &[Predicate::eq(DOMAIN_COLUMN, 4)]);

        let unscoped = ModuleDef::new(2, "tag");
        assert!(builder.base_query(&unscoped, Some(4)).predicates().is_empty());
        assert_eq!(builder.base_query(&unscoped, None).source(), "tag");

        let single = builder.with_multi_domains(false);
        assert!(single.base_query(&contact(), Some(4)).predicates().is_empty());
    }

    #[tokio::test]
    async fn order_maps_fields_to_columns() {
        let (_tmp, catalog) = catalog().await;
        let mut order = OrderSpec::new();
        order.insert("last_name".into(), SortDirection::Asc);
        order.insert("created_at".into(), SortDirection::Desc);
        let built =
            SearchQueryBuilder::new(&catalog).build(&contact(), None, &Conditions::new(), &order);
        let columns: Vec<_> = built.query.order().iter().map(|o| o.column.as_str()).collect();
        assert_eq!(columns, vec!["lastname", "created_at"]);
    }

    #[tokio::test]
    async fn building_is_pure() {
        let (_tmp, catalog) = catalog().await;
        let builder = SearchQueryBuilder::new(&catalog);
        let mut conditions = Conditions::new();
        conditions.insert("age".into(), "20,30".into());
        let a = builder.build(&contact(), Some(1), &conditions, &OrderSpec::new());
        let b = builder.build(&contact(), Some(1), &conditions, &OrderSpec::new());
        assert_eq!(a, b);
    }
}
