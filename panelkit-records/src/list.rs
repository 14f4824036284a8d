//! List pages
//!
//! [`ListService::datatable`] answers the datatable widget: totals before
//! and after searching, one window of rows, and the related-list variants
//! (records linked to a source record, or candidates for linking).
//! [`ListService::content`] serves plain paginated lists.

use panelkit_fields::{ModuleDef, SearchValue};
use panelkit_query::{Query, Record, RecordId, SortDirection};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::panel::Panel;
use crate::projection::Row;
use crate::related::{RelatedListAdapter, RelatedPage};
use crate::search::{Conditions, DomainId, OrderSpec, SearchQueryBuilder};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSearch {
    #[serde(default)]
    pub value: Option<SearchValue>,
}

/// One column of a datatable request. `data` is the field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatatableColumnRequest {
    pub data: String,
    #[serde(default)]
    pub search: ColumnSearch,
}

impl DatatableColumnRequest {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            search: ColumnSearch::default(),
        }
    }

    pub fn searching(mut self, value: impl Into<SearchValue>) -> Self {
        self.search.value = Some(value.into());
        self
    }
}

/// Sort by the request column at index `column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatatableOrder {
    pub column: usize,
    #[serde(default)]
    pub dir: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListAction {
    /// List candidates for linking instead of linked records.
    Select,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatatableRequest {
    #[serde(default)]
    pub draw: u64,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub length: Option<usize>,
    #[serde(default)]
    pub columns: Vec<DatatableColumnRequest>,
    #[serde(default)]
    pub order: Vec<DatatableOrder>,
    /// Source record of a related list.
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub relatedlist: Option<u64>,
    #[serde(default)]
    pub action: Option<ListAction>,
    #[serde(default)]
    pub domain: Option<DomainId>,
}

impl DatatableRequest {
    fn conditions(&self) -> Conditions {
        self.columns
            .iter()
            .filter_map(|c| c.search.value.clone().map(|v| (c.data.clone(), v)))
            .collect()
    }

    fn order_spec(&self) -> OrderSpec {
        self.order
            .iter()
            .filter_map(|o| self.columns.get(o.column).map(|c| (c.data.clone(), o.dir)))
            .collect()
    }
}

/// A record id plus its list-rendered field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatatableRow {
    pub id: RecordId,
    #[serde(flatten)]
    pub values: Row,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatatablePage {
    pub draw: u64,
    pub records_total: usize,
    pub records_filtered: usize,
    pub data: Vec<DatatableRow>,
}

/// Plain list request. `page` starts at 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub length: Option<usize>,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default)]
    pub order: OrderSpec,
    #[serde(default)]
    pub domain: Option<DomainId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContentPage {
    pub data: Vec<DatatableRow>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub last_page: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ListService<'a> {
    panel: &'a Panel,
}

impl<'a> ListService<'a> {
    pub fn new(panel: &'a Panel) -> Self {
        Self { panel }
    }

    fn builder(&self) -> SearchQueryBuilder<'a> {
        SearchQueryBuilder::new(&self.panel.catalog)
            .with_multi_domains(self.panel.config.multi_domains)
    }

    /// List-rendered values of every field of `module` on `record`.
    pub fn row(&self, module: &ModuleDef, record: &Record) -> DatatableRow {
        let values = module
            .fields
            .iter()
            .map(|field| {
                let uitype = self.panel.catalog.uitype_for(field);
                let mut shown = uitype.render_for_list(field, record);
                if uitype.formats_as_translation_key(field) {
                    shown = self.panel.translator.trans(&shown, Some(module));
                }
                (field.name.clone(), shown)
            })
            .collect();
        DatatableRow {
            id: record.id,
            values,
        }
    }

    pub async fn datatable(&self, module: &str, request: &DatatableRequest) -> Result<DatatablePage> {
        let module = self.panel.catalog.require_module(module).await?;
        let mut page = DatatablePage {
            draw: request.draw,
            ..Default::default()
        };
        let Some(store) = self.panel.store_for(&module) else {
            warn!(module = %module.name, "no record store for module");
            return Ok(page);
        };

        let builder = self.builder();
        let base = builder.base_query(&module, request.domain);
        page.records_total = store.count(&base).await?;

        let (query, ignored) = builder.apply_conditions(&module, base, &request.conditions());
        if !ignored.is_empty() {
            debug!(module = %module.name, ignored = ?ignored, "datatable search ignored");
        }
        let query = builder.apply_order(&module, query, &request.order_spec());
        page.records_filtered = store.count(&query).await?;

        let length = self.panel.config.clamp_page_length(request.length);
        let related = match (request.relatedlist, request.id) {
            (Some(list_id), Some(source_id)) => Some((list_id, source_id)),
            _ => None,
        };

        let records = match related {
            None => store.fetch(&query.skip(request.start).take(length)).await?,
            Some((list_id, source_id)) => {
                let adapter = RelatedListAdapter::new(self.panel);
                let list = adapter.find(list_id).await?;
                let RelatedPage { records, total } = match request.action {
                    Some(ListAction::Select) => {
                        adapter
                            .paginate_selectable(
                                store.as_ref(),
                                &list,
                                source_id,
                                query,
                                request.start,
                                length,
                            )
                            .await?
                    }
                    None => {
                        adapter
                            .paginate(&list, source_id, query, request.start, length)
                            .await?
                    }
                };
                page.records_total = total;
                page.records_filtered = total;
                records
            }
        };

        page.data = records.iter().map(|r| self.row(&module, r)).collect();
        debug!(
            module = %module.name,
            total = page.records_total,
            filtered = page.records_filtered,
            returned = page.data.len(),
            "datatable page"
        );
        Ok(page)
    }

    /// One page of a plain list.
    pub async fn content(&self, module: &str, request: &ContentRequest) -> Result<ContentPage> {
        let module = self.panel.catalog.require_module(module).await?;
        let per_page = self.panel.config.clamp_page_length(request.length);
        let page_number = request.page.unwrap_or(1).max(1);
        let mut page = ContentPage {
            page: page_number,
            per_page,
            last_page: 1,
            ..Default::default()
        };
        let Some(store) = self.panel.store_for(&module) else {
            warn!(module = %module.name, "no record store for module");
            return Ok(page);
        };

        let built = self
            .builder()
            .build(&module, request.domain, &request.conditions, &request.order);
        page.total = store.count(&built.query).await?;
        page.last_page = page.total.div_ceil(per_page).max(1);

        let offset = page_number.saturating_sub(1).saturating_mul(per_page);
        let window: Query = built.query.skip(offset).take(per_page);
        let records = store.fetch(&window).await?;
        page.data = records.iter().map(|r| self.row(&module, r)).collect();
        Ok(page)
    }
}
