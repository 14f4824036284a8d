//! Fixed-choice uitype.

use panelkit_query::{Predicate, Query, Record};
use serde_json::Value;

use super::{value_text, FieldDef, SearchValue, UiType};

#[derive(Debug, Default, Clone, Copy)]
pub struct Select;

impl UiType for Select {
    fn name(&self) -> &str {
        "select"
    }

    fn form_type(&self, _field: &FieldDef) -> &str {
        "select"
    }

    fn add_condition_to_search_query(
        &self,
        query: Query,
        field: &FieldDef,
        value: &SearchValue,
    ) -> Query {
        let mut parts = value.parts();
        match parts.len() {
            0 => query,
            1 => query.filter(Predicate::eq(field.column(), parts.remove(0))),
            _ => query.filter(Predicate::in_(
                field.column(),
                parts.into_iter().map(Value::from).collect(),
            )),
        }
    }

    /// Label of the stored choice, or the raw value when it matches none.
    fn formatted_value(&self, field: &FieldDef, record: &Record) -> String {
        let Some(value) = record.column_value(field.column()) else {
            return String::new();
        };
        let raw = value_text(&value);
        field
            .data
            .choices
            .iter()
            .find(|c| c.value == raw)
            .map(|c| c.display().to_string())
            .unwrap_or(raw)
    }
}
