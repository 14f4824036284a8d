//! Text-like uitypes: substring search, raw display.

use panelkit_query::{Predicate, Query, Record};
use serde_json::Value;

use super::{FieldDef, FormContext, FormWidget, SearchValue, UiType};

macro_rules! text_like {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $form:literal, $icon:expr) => {
        $(#[$doc])*
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $ty;

        impl UiType for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn form_type(&self, _field: &FieldDef) -> &str {
                $form
            }

            fn default_icon(&self, _field: &FieldDef) -> Option<&str> {
                $icon
            }
        }
    };
}

text_like!(
    /// Single-line text. Also the fallback for unknown uitypes.
    Text, "text", "text", None
);
text_like!(Textarea, "textarea", "textarea", Some("subject"));
text_like!(Email, "email", "email", Some("email"));
text_like!(Url, "url", "url", Some("link"));
text_like!(Phone, "phone", "tel", Some("phone"));

/// Text shown in place of a stored password.
pub const PASSWORD_MASK: &str = "••••••••";

/// Never searchable, never echoed back.
#[derive(Debug, Default, Clone, Copy)]
pub struct Password;

impl UiType for Password {
    fn name(&self) -> &str {
        "password"
    }

    fn form_type(&self, _field: &FieldDef) -> &str {
        "password"
    }

    fn default_icon(&self, _field: &FieldDef) -> Option<&str> {
        Some("lock")
    }

    fn render_for_edit(
        &self,
        field: &FieldDef,
        _value: Option<&Value>,
        ctx: &FormContext,
    ) -> FormWidget {
        FormWidget {
            name: field.name.clone(),
            form_type: "password".into(),
            label: ctx.label.clone(),
            rules: field.data.rules.clone(),
            default_value: None,
            value: None,
            required: field.required,
            icon: field.data.icon.clone().or_else(|| Some("lock".into())),
            choices: Vec::new(),
            confirmation: None,
        }
    }

    fn add_condition_to_search_query(
        &self,
        query: Query,
        _field: &FieldDef,
        _value: &SearchValue,
    ) -> Query {
        query
    }

    fn formatted_value(&self, field: &FieldDef, record: &Record) -> String {
        match record.column_value(field.column()).as_deref() {
            Some(Value::String(s)) if !s.is_empty() => PASSWORD_MASK.to_string(),
            Some(Value::Null) | Some(Value::String(_)) | None => String::new(),
            Some(_) => PASSWORD_MASK.to_string(),
        }
    }
}

/// Hex colour. Searched case-insensitively, with or without the leading `#`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Color;

impl UiType for Color {
    fn name(&self) -> &str {
        "color"
    }

    fn form_type(&self, _field: &FieldDef) -> &str {
        "color"
    }

    fn default_icon(&self, _field: &FieldDef) -> Option<&str> {
        Some("palette")
    }

    fn add_condition_to_search_query(
        &self,
        query: Query,
        field: &FieldDef,
        value: &SearchValue,
    ) -> Query {
        let joined = value.joined();
        let hex = joined.trim().trim_start_matches('#');
        query.filter(Predicate::or(vec![
            Predicate::eq_ignore_case(field.column(), format!("#{hex}")),
            Predicate::eq_ignore_case(field.column(), hex),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_search_is_substring() {
        let field = FieldDef::new("name", "text");
        let query = Text.add_condition_to_search_query(
            Query::new("contacts"),
            &field,
            &SearchValue::from(" acme "),
        );
        assert_eq!(query.predicates(), &[Predicate::contains("name", "acme")]);
    }

    #[test]
    fn presentation_hints() {
        let field = FieldDef::new("site", "url");
        assert_eq!(Url.form_type(&field), "url");
        assert_eq!(Url.default_icon(&field), Some("link"));
        assert_eq!(Email.form_type(&field), "email");
        assert_eq!(Phone.form_type(&field), "tel");
    }

    #[test]
    fn password_is_masked_and_not_searchable() {
        let field = FieldDef::new("secret", "password");
        let record = Record::new(1).with("secret", "hunter2");
        assert_eq!(Password.formatted_value(&field, &record), PASSWORD_MASK);
        assert_eq!(Password.formatted_value(&field, &Record::new(2)), "");

        let query = Password.add_condition_to_search_query(
            Query::new("users"),
            &field,
            &SearchValue::from("hunter2"),
        );
        assert!(query.predicates().is_empty());
    }

    #[test]
    fn password_widget_never_binds_value() {
        let field = FieldDef::new("secret", "password");
        let ctx = FormContext {
            mode: crate::uitype::FormMode::Edit,
            label: "Secret".into(),
        };
        let widget = Password.render_for_edit(&field, Some(&Value::from("hunter2")), &ctx);
        assert_eq!(widget.value, None);
        assert_eq!(widget.form_type, "password");
    }

    #[test]
    fn color_search_ignores_case_and_hash() {
        let field = FieldDef::new("tint", "color");
        let query = Color.add_condition_to_search_query(
            Query::new("labels"),
            &field,
            &SearchValue::from("FF00AA"),
        );
        let pred = &query.predicates()[0];
        for stored in ["#ff00aa", "#FF00AA", "#Ff00aA", "ff00aa"] {
            assert!(pred.matches(&Record::new(1).with("tint", stored)), "{stored}");
        }
        assert!(!pred.matches(&Record::new(2).with("tint", "#00ff00")));
    }
}
