//! Uitype strategies
//!
//! A uitype decides how one field is edited, displayed and searched. The
//! trait is open: packages register their own strategies in the
//! [`UiTypeRegistry`](crate::UiTypeRegistry) next to the built-ins defined
//! here. Every method except [`UiType::name`] has a default that behaves
//! like a plain text field.

mod boolean;
mod date;
mod entity;
mod number;
mod select;
mod text;

pub use boolean::Boolean;
pub use date::{Date, DateTime};
pub use entity::Entity;
pub use number::{Integer, Number};
pub use select::Select;
pub use text::{Color, Email, Password, Phone, Text, Textarea, Url};

use std::fmt;

use panelkit_query::{Predicate, Query, Record};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{FieldDef, SelectChoice, ViewContext};

/// Package owning the built-in uitypes.
pub const BUILTIN_PACKAGE: &str = "panelkit";

/// Raw search input for one field: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SearchValue {
    Text(String),
    List(Vec<String>),
}

impl SearchValue {
    /// The value as one string. Lists are joined with `,`.
    pub fn joined(&self) -> String {
        match self {
            SearchValue::Text(s) => s.trim().to_string(),
            SearchValue::List(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// True when the value is non-empty after trimming.
    pub fn is_present(&self) -> bool {
        !self.joined().is_empty()
    }

    /// Comma-separated parts, trimmed, empties dropped.
    pub fn parts(&self) -> Vec<String> {
        self.joined()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// `low,high` split of a range value. `None` when the value holds no
    /// comma; empty sides become `None`.
    pub fn range(&self) -> Option<(Option<String>, Option<String>)> {
        let joined = self.joined();
        let (low, high) = joined.split_once(',')?;
        let side = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Some((side(low), side(high)))
    }
}

impl From<&str> for SearchValue {
    fn from(value: &str) -> Self {
        SearchValue::Text(value.to_string())
    }
}

impl From<String> for SearchValue {
    fn from(value: String) -> Self {
        SearchValue::Text(value)
    }
}

impl From<Vec<String>> for SearchValue {
    fn from(value: Vec<String>) -> Self {
        SearchValue::List(value)
    }
}

/// Form being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    Create,
    Edit,
}

impl From<FormMode> for ViewContext {
    fn from(mode: FormMode) -> Self {
        match mode {
            FormMode::Create => ViewContext::Create,
            FormMode::Edit => ViewContext::Edit,
        }
    }
}

/// What a uitype needs to know about the surrounding form.
#[derive(Debug, Clone)]
pub struct FormContext {
    pub mode: FormMode,
    /// Already translated label.
    pub label: String,
}

/// Description of one form input, handed to the form renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormWidget {
    pub name: String,
    pub form_type: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<SelectChoice>,
    /// Confirmation input of a repeated field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<Box<FormWidget>>,
}

/// A pluggable field strategy.
pub trait UiType: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn package(&self) -> &str {
        BUILTIN_PACKAGE
    }

    /// Input type used by the form renderer.
    fn form_type(&self, _field: &FieldDef) -> &str {
        "text"
    }

    fn default_icon(&self, _field: &FieldDef) -> Option<&str> {
        None
    }

    fn render_for_edit(
        &self,
        field: &FieldDef,
        value: Option<&Value>,
        ctx: &FormContext,
    ) -> FormWidget {
        let icon = field
            .data
            .icon
            .clone()
            .or_else(|| self.default_icon(field).map(String::from));
        FormWidget {
            name: field.name.clone(),
            form_type: self.form_type(field).to_string(),
            label: ctx.label.clone(),
            rules: field.data.rules.clone(),
            default_value: field.data.default.clone(),
            value: value.cloned(),
            required: field.required,
            icon,
            choices: field.data.choices.clone(),
            confirmation: None,
        }
    }

    /// True when [`formatted_value`](Self::formatted_value) yields a
    /// translation key rather than display text.
    fn formats_as_translation_key(&self, _field: &FieldDef) -> bool {
        false
    }

    fn render_for_detail(&self, field: &FieldDef, record: &Record) -> String {
        self.formatted_value(field, record)
    }

    fn render_for_list(&self, field: &FieldDef, record: &Record) -> String {
        self.formatted_value(field, record)
    }

    /// Narrow `query` with this field's search semantics. Substring match
    /// by default.
    fn add_condition_to_search_query(
        &self,
        query: Query,
        field: &FieldDef,
        value: &SearchValue,
    ) -> Query {
        query.filter(Predicate::contains(field.column(), value.joined()))
    }

    /// Display text of the field's value on `record`, used by detail views
    /// and exports.
    fn formatted_value(&self, field: &FieldDef, record: &Record) -> String {
        record
            .column_value(field.column())
            .map(|v| value_text(&v))
            .unwrap_or_default()
    }
}

/// Plain text of a JSON value. Null is empty, strings are unquoted.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
