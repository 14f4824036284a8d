//! Date and date-time uitypes.
//!
//! Stored values may be `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339.
//! Display and search both read them through [`stored_datetime`], so a
//! search for the text a cell shows always finds that cell. A date-only
//! upper bound covers the whole day; a date-time bound covers its second.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use panelkit_query::{stored_datetime, Predicate, Query, Record, TIMESTAMP_FORMAT};
use tracing::debug;

use super::{FieldDef, SearchValue, UiType};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_INPUTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// A parsed search bound.
enum Bound {
    Day(NaiveDate),
    Instant(NaiveDateTime),
}

impl Bound {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(day) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            return Some(Bound::Day(day));
        }
        DATETIME_INPUTS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(Bound::Instant)
    }

    fn start(&self) -> NaiveDateTime {
        match self {
            Bound::Day(day) => day.and_time(NaiveTime::MIN),
            Bound::Instant(at) => *at,
        }
    }

    fn end(&self) -> NaiveDateTime {
        let last_nano = TimeDelta::nanoseconds(999_999_999);
        match self {
            Bound::Day(day) => {
                day.and_hms_opt(23, 59, 59)
                    .unwrap_or(day.and_time(NaiveTime::MIN))
                    + last_nano
            }
            Bound::Instant(at) => *at + last_nano,
        }
    }
}

fn temporal_condition(query: Query, field: &FieldDef, value: &SearchValue) -> Query {
    let (low, high) = match value.range() {
        Some((low, high)) => (
            low.as_deref().and_then(Bound::parse),
            high.as_deref().and_then(Bound::parse),
        ),
        None => match Bound::parse(&value.joined()) {
            Some(bound) => {
                let (from, to) = (bound.start(), bound.end());
                return query.filter(Predicate::date_range(field.column(), Some(from), Some(to)));
            }
            None => (None, None),
        },
    };
    if low.is_none() && high.is_none() {
        debug!(field = %field.name, value = %value.joined(), "ignoring unparseable date search");
        return query;
    }
    query.filter(Predicate::date_range(
        field.column(),
        low.map(|b| b.start()),
        high.map(|b| b.end()),
    ))
}

fn formatted(field: &FieldDef, record: &Record, format: &str) -> String {
    let Some(value) = record.column_value(field.column()) else {
        return String::new();
    };
    match stored_datetime(&value) {
        Some(at) => at.format(format).to_string(),
        None => super::value_text(&value),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Date;

impl UiType for Date {
    fn name(&self) -> &str {
        "date"
    }

    fn form_type(&self, _field: &FieldDef) -> &str {
        "date"
    }

    fn default_icon(&self, _field: &FieldDef) -> Option<&str> {
        Some("event")
    }

    fn add_condition_to_search_query(
        &self,
        query: Query,
        field: &FieldDef,
        value: &SearchValue,
    ) -> Query {
        temporal_condition(query, field, value)
    }

    fn formatted_value(&self, field: &FieldDef, record: &Record) -> String {
        formatted(field, record, DATE_FORMAT)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DateTime;

impl UiType for DateTime {
    fn name(&self) -> &str {
        "datetime"
    }

    fn form_type(&self, _field: &FieldDef) -> &str {
        "datetime-local"
    }

    fn default_icon(&self, _field: &FieldDef) -> Option<&str> {
        Some("schedule")
    }

    fn add_condition_to_search_query(
        &self,
        query: Query,
        field: &FieldDef,
        value: &SearchValue,
    ) -> Query {
        temporal_condition(query, field, value)
    }

    fn formatted_value(&self, field: &FieldDef, record: &Record) -> String {
        formatted(field, record, TIMESTAMP_FORMAT)
    }
}
