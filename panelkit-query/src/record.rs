//! Persisted records
//!
//! A record is whatever the storage backend hands back for one row of a
//! module: a primary key, a bag of JSON attributes and the two bookkeeping
//! timestamps. Related rows may be embedded as nested objects, which is how
//! dotted attribute paths such as `domain.parent.name` resolve.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// Primary key of a record.
pub type RecordId = i64;

/// Format used whenever a timestamp is rendered as text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One persisted row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            attributes: Map::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Set an attribute.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(column.into(), value.into());
        self
    }

    /// Set both timestamps.
    pub fn with_timestamps(mut self, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self.updated_at = Some(updated_at);
        self
    }

    /// Raw attribute stored under `column`.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.attributes.get(column)
    }

    /// Value of a column as seen by predicates and ordering.
    ///
    /// `id`, `created_at` and `updated_at` resolve to the record's own
    /// bookkeeping unless an attribute of the same name shadows them.
    pub fn column_value(&self, column: &str) -> Option<Cow<'_, Value>> {
        if let Some(value) = self.attributes.get(column) {
            return Some(Cow::Borrowed(value));
        }
        match column {
            "id" => Some(Cow::Owned(Value::from(self.id))),
            "created_at" => self.created_at.map(|ts| Cow::Owned(timestamp_value(ts))),
            "updated_at" => self.updated_at.map(|ts| Cow::Owned(timestamp_value(ts))),
            _ => None,
        }
    }

    /// Follow a dotted path through nested objects (`author.domain.name`).
    ///
    /// A missing segment, or a segment that is not an object, yields `None`.
    pub fn attribute_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.attributes.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// `created_at` formatted with [`TIMESTAMP_FORMAT`], or empty.
    pub fn created_at_display(&self) -> String {
        format_timestamp(self.created_at)
    }

    /// `updated_at` formatted with [`TIMESTAMP_FORMAT`], or empty.
    pub fn updated_at_display(&self) -> String {
        format_timestamp(self.updated_at)
    }
}

fn timestamp_value(ts: DateTime<Utc>) -> Value {
    Value::String(ts.format(TIMESTAMP_FORMAT).to_string())
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}
