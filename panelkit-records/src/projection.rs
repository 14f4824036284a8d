//! Record projection
//!
//! Rows and headings share one key order: `id`, the module's fields,
//! `created_at`, `updated_at`. Row N therefore lines up positionally with
//! the heading row, which is what tabular writers rely on.

use indexmap::IndexMap;
use panelkit_fields::{Catalog, FieldDef, ModuleDef};
use panelkit_query::Record;
use panelkit_views::Translator;

/// Column key → display text, in output order.
pub type Row = IndexMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionOptions {
    pub add_id: bool,
    pub add_timestamps: bool,
    /// When non-empty, only these fields are projected.
    pub only_columns: Vec<String>,
}

impl ProjectionOptions {
    fn includes(&self, field: &FieldDef) -> bool {
        self.only_columns.is_empty() || self.only_columns.contains(&field.name)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Projector<'a> {
    catalog: &'a Catalog,
    translator: &'a Translator,
}

impl<'a> Projector<'a> {
    pub fn new(catalog: &'a Catalog, translator: &'a Translator) -> Self {
        Self {
            catalog,
            translator,
        }
    }

    /// Translated heading row.
    pub fn headings(&self, module: &ModuleDef, options: &ProjectionOptions) -> Row {
        let label = |key: &str| self.translator.trans(key, Some(module));
        let mut row = Row::new();
        if options.add_id {
            row.insert("id".into(), label("field.id"));
        }
        for field in module.fields.iter().filter(|f| options.includes(f)) {
            row.insert(field.name.clone(), label(&field.label_key()));
        }
        if options.add_timestamps {
            row.insert("created_at".into(), label("field.created_at"));
            row.insert("updated_at".into(), label("field.updated_at"));
        }
        row
    }

    /// One display row. Field values are formatted by their uitype.
    pub fn project_record(
        &self,
        module: &ModuleDef,
        record: &Record,
        options: &ProjectionOptions,
    ) -> Row {
        let mut row = Row::new();
        if options.add_id {
            row.insert("id".into(), record.id.to_string());
        }
        for field in module.fields.iter().filter(|f| options.includes(f)) {
            let uitype = self.catalog.uitype_for(field);
            let mut shown = uitype.formatted_value(field, record);
            if uitype.formats_as_translation_key(field) {
                shown = self.translator.trans(&shown, Some(module));
            }
            row.insert(field.name.clone(), shown);
        }
        if options.add_timestamps {
            row.insert("created_at".into(), record.created_at_display());
            row.insert("updated_at".into(), record.updated_at_display());
        }
        row
    }

    pub fn project(
        &self,
        module: &ModuleDef,
        records: &[Record],
        options: &ProjectionOptions,
    ) -> Vec<Row> {
        records
            .iter()
            .map(|record| self.project_record(module, record, options))
            .collect()
    }
}
