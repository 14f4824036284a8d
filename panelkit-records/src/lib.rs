//! Record services
//!
//! Everything here reads module definitions from a [`Panel`] and works on
//! records through the [`RecordStore`](panelkit_query::RecordStore) trait:
//!
//! - [`SearchQueryBuilder`]: module + domain + conditions + order → query
//! - [`Projector`] and [`RecordsExport`]: records → aligned display rows
//! - [`RelatedListAdapter`]: records linked to a source record, and
//!   candidates for linking
//! - [`FilterStore`]: saved list filters on disk
//! - [`ListService`] and [`datatable_columns`]: datatable pages and columns
//! - [`EditFormBuilder`]: form widget descriptions

pub mod columns;
pub mod error;
pub mod export;
pub mod filters;
pub mod form;
pub mod list;
pub mod panel;
pub mod projection;
pub mod related;
pub mod search;

pub use columns::{datatable_columns, list_view, DatatableColumn};
pub use error::{RecordsError, Result};
pub use export::{ExportTable, RecordsExport};
pub use filters::{
    DeleteOutcome, Filter, FilterData, FilterStore, SaveFilter, UserId, LIST_FILTER,
    RELATED_LIST_FILTER,
};
pub use form::EditFormBuilder;
pub use list::{
    ColumnSearch, ContentPage, ContentRequest, DatatableColumnRequest, DatatableOrder,
    DatatablePage, DatatableRequest, DatatableRow, ListAction, ListService,
};
pub use panel::Panel;
pub use projection::{ProjectionOptions, Projector, Row};
pub use related::{
    ForeignKeyRelation, PivotRelation, RelatedListAdapter, RelatedPage, RelatedRecords,
    RelationRegistry, RECORD_ID_PLACEHOLDER,
};
pub use search::{
    Conditions, DomainId, OrderSpec, SearchQuery, SearchQueryBuilder, DOMAIN_COLUMN,
};
