//! Checkbox uitype.
//!
//! Stored values may be booleans, numbers or tokens such as `"on"`; display
//! and search read them the same way through [`panelkit_query::is_truthy`].

use panelkit_query::{Predicate, Query, Record};
use serde_json::Value;

use super::{FieldDef, SearchValue, UiType};

/// True for the tokens a checkbox or search box sends for "checked".
pub fn is_truthy(raw: &str) -> bool {
    panelkit_query::is_truthy(&Value::from(raw))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Boolean;

impl UiType for Boolean {
    fn name(&self) -> &str {
        "boolean"
    }

    fn form_type(&self, _field: &FieldDef) -> &str {
        "checkbox"
    }

    /// Checked matches every truthy stored shape; anything else matches the
    /// rest, missing values included, as they display as `no`.
    fn add_condition_to_search_query(
        &self,
        query: Query,
        field: &FieldDef,
        value: &SearchValue,
    ) -> Query {
        let checked = Predicate::truthy(field.column());
        if is_truthy(&value.joined()) {
            query.filter(checked)
        } else {
            query.filter(Predicate::not(checked))
        }
    }

    fn formats_as_translation_key(&self, _field: &FieldDef) -> bool {
        true
    }

    /// `yes` or `no`, as translation keys.
    fn formatted_value(&self, field: &FieldDef, record: &Record) -> String {
        let checked = record
            .column_value(field.column())
            .is_some_and(|value| panelkit_query::is_truthy(&value));
        let key = if checked { "yes" } else { "no" };
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthy_tokens() {
        for token in ["1", "true", "YES", " on "] {
            assert!(is_truthy(token), "{token}");
        }
        for token in ["0", "false", "no", "maybe", ""] {
            assert!(!is_truthy(token), "{token}");
        }
    }

    #[test]
    fn search_maps_to_truthiness() {
        let field = FieldDef::new("active", "boolean");
        let query =
            Boolean.add_condition_to_search_query(Query::new("users"), &field, &"yes".into());
        assert_eq!(query.predicates(), &[Predicate::truthy("active")]);
        let query =
            Boolean.add_condition_to_search_query(Query::new("users"), &field, &"nope".into());
        assert_eq!(query.predicates(), &[Predicate::not(Predicate::truthy("active"))]);
    }

    #[test]
    fn formatted_as_yes_no_keys() {
        let field = FieldDef::new("active", "boolean");
        assert_eq!(Boolean.formatted_value(&field, &Record::new(1).with("active", true)), "yes");
        assert_eq!(Boolean.formatted_value(&field, &Record::new(2).with("active", 0)), "no");
        assert_eq!(Boolean.formatted_value(&field, &Record::new(3)), "no");
        assert!(Boolean.formats_as_translation_key(&field));
    }

    #[test]
    fn searching_the_displayed_key_finds_the_record() {
        let field = FieldDef::new("active", "boolean");
        let stored = [
            json!(true),
            json!(1),
            json!("1"),
            json!("on"),
            json!("Yes"),
            json!(false),
            json!(0),
            json!("off"),
        ];
        let mut records: Vec<Record> = stored
            .iter()
            .enumerate()
            .map(|(i, value)| Record::new(i as i64 + 1).with("active", value.clone()))
            .collect();
        records.push(Record::new(99));

        for record in &records {
            let shown = Boolean.formatted_value(&field, record);
            let query = Boolean.add_condition_to_search_query(
                Query::new("users"),
                &field,
                &SearchValue::from(shown.as_str()),
            );
            assert!(query.predicates()[0].matches(record), "{shown} missed {record:?}");
        }
    }
}
