//! Reference to a record of another module.

use panelkit_query::{Predicate, Query, Record};
use serde_json::Value;

use super::{value_text, FieldDef, SearchValue, UiType};

#[derive(Debug, Default, Clone, Copy)]
pub struct Entity;

fn id_value(raw: &str) -> Value {
    raw.parse::<i64>().map(Value::from).unwrap_or_else(|_| Value::from(raw))
}

impl UiType for Entity {
    fn name(&self) -> &str {
        "entity"
    }

    fn form_type(&self, _field: &FieldDef) -> &str {
        "entity"
    }

    fn default_icon(&self, _field: &FieldDef) -> Option<&str> {
        Some("search")
    }

    fn add_condition_to_search_query(
        &self,
        query: Query,
        field: &FieldDef,
        value: &SearchValue,
    ) -> Query {
        let parts = value.parts();
        match parts.as_slice() {
            [] => query,
            [single] => query.filter(Predicate::eq(field.column(), id_value(single))),
            many => query.filter(Predicate::in_(
                field.column(),
                many.iter().map(|p| id_value(p)).collect(),
            )),
        }
    }

    /// The `display_field` path resolved on the record, else the stored id.
    fn formatted_value(&self, field: &FieldDef, record: &Record) -> String {
        if let Some(path) = &field.data.display_field {
            if let Some(value) = record.attribute_path(path) {
                return value_text(value);
            }
        }
        record
            .column_value(field.column())
            .map(|v| value_text(&v))
            .unwrap_or_default()
    }
}
