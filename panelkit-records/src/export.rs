//! Record export
//!
//! [`RecordsExport`] is a builder describing what to export; [`run`]
//! executes it against the module's record store and returns an
//! [`ExportTable`].
//!
//! [`run`]: RecordsExport::run

use panelkit_fields::ModuleDef;
use panelkit_query::Query;
use tracing::{debug, warn};

use crate::error::{RecordsError, Result};
use crate::panel::Panel;
use crate::projection::{ProjectionOptions, Projector, Row};
use crate::search::{Conditions, DomainId, OrderSpec, SearchQueryBuilder};

/// Headings plus rows, keys aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    pub headings: Row,
    pub rows: Vec<Row>,
}

impl ExportTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialise as CSV: one heading line, then one line per row.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.headings.values())?;
        for row in &self.rows {
            let cells = self
                .headings
                .keys()
                .map(|key| row.get(key).map(String::as_str).unwrap_or(""));
            writer.write_record(cells)?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[derive(Debug, Clone)]
pub struct RecordsExport<'a> {
    panel: &'a Panel,
    module: Option<String>,
    domain: Option<DomainId>,
    options: ProjectionOptions,
    conditions: Conditions,
    order: OrderSpec,
}

impl<'a> RecordsExport<'a> {
    pub fn new(panel: &'a Panel) -> Self {
        Self {
            panel,
            module: None,
            domain: None,
            options: ProjectionOptions::default(),
            conditions: Conditions::new(),
            order: OrderSpec::new(),
        }
    }

    /// Module to export, by name or id.
    pub fn for_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn for_domain(mut self, domain: DomainId) -> Self {
        self.domain = Some(domain);
        self
    }

    pub fn with_id(mut self) -> Self {
        self.options.add_id = true;
        self
    }

    pub fn with_timestamps(mut self) -> Self {
        self.options.add_timestamps = true;
        self
    }

    /// Export only these fields.
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.only_columns = columns.into_iter().map(Into::into).collect();
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

    /// Query selecting the exported records.
    pub fn query(&self, module: &ModuleDef) -> Query {
        let built = SearchQueryBuilder::new(&self.panel.catalog)
            .with_multi_domains(self.panel.config.multi_domains)
            .build(module, self.domain, &self.conditions, &self.order);
        if !built.ignored.is_empty() {
            debug!(module = %module.name, ignored = ?built.ignored, "export conditions ignored");
        }
        built.query
    }

    pub fn headings(&self, module: &ModuleDef) -> Row {
        self.projector().headings(module, &self.options)
    }

    fn projector(&self) -> Projector<'_> {
        Projector::new(&self.panel.catalog, &self.panel.translator)
    }

    pub async fn run(&self) -> Result<ExportTable> {
        let key = self.module.as_deref().ok_or(RecordsError::NoModule)?;
        let module = self.panel.catalog.require_module(key).await?;
        let headings = self.headings(&module);

        let Some(store) = self.panel.store_for(&module) else {
            warn!(module = %module.name, "no record store for module, exporting nothing");
            return Ok(ExportTable {
                headings,
                rows: Vec::new(),
            });
        };

        let records = store.fetch(&self.query(&module)).await?;
        let rows = self.projector().project(&module, &records, &self.options);
        debug!(module = %module.name, rows = rows.len(), "export complete");
        Ok(ExportTable { headings, rows })
    }
}
