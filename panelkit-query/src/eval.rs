//! In-process predicate evaluation and ordering
//!
//! Comparison is loose in one direction only: a string that parses as a
//! number compares numerically against a number, because search input
//! always arrives as text. A missing or null column never satisfies a
//! comparison, mirroring SQL's treatment of NULL.
//!
//! Dates and checkboxes are stored in more than one shape. [`stored_datetime`]
//! and [`is_truthy`] are the single reading of those shapes, shared by the
//! typed predicates here and by the uitypes that display the same values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;
use std::cmp::Ordering;

use crate::predicate::{CompareOp, Predicate};
use crate::query::{OrderBy, SortDirection};
use crate::record::Record;

impl Predicate {
    /// True when `record` satisfies this predicate.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::And(preds) => preds.iter().all(|p| p.matches(record)),
            Predicate::Or(preds) => preds.iter().any(|p| p.matches(record)),
            Predicate::Not(pred) => !pred.matches(record),
            Predicate::IsNull { column } => record
                .column_value(column)
                .map_or(true, |value| value.is_null()),
            Predicate::Contains { column, needle } => {
                let Some(value) = record.column_value(column) else {
                    return false;
                };
                let needle = needle.to_lowercase();
                let hit = scalars(&value).any(|v| text_of(v).to_lowercase().contains(&needle));
                hit
            }
            Predicate::EqIgnoreCase { column, value: wanted } => {
                let Some(value) = record.column_value(column) else {
                    return false;
                };
                let wanted = wanted.to_lowercase();
                let hit = scalars(&value).any(|v| !v.is_null() && text_of(v).to_lowercase() == wanted);
                hit
            }
            Predicate::DateRange { column, from, to } => {
                let Some(at) = record.column_value(column).as_deref().and_then(stored_datetime)
                else {
                    return false;
                };
                from.map_or(true, |from| at >= from) && to.map_or(true, |to| at <= to)
            }
            Predicate::Truthy { column } => record
                .column_value(column)
                .as_deref()
                .is_some_and(is_truthy),
            Predicate::Compare { column, op, value } => {
                let Some(actual) = record.column_value(column) else {
                    return false;
                };
                if actual.is_null() {
                    return false;
                }
                compare_op(&actual, *op, value)
            }
        }
    }
}

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];
const TRUTHY_TOKENS: [&str; 4] = ["1", "true", "yes", "on"];

/// Instant held by a stored date or date-time value.
///
/// Accepts RFC 3339 (converted to UTC), `YYYY-MM-DD HH:MM[:SS[.f]]`, the same
/// with a `T` separator, and a bare `YYYY-MM-DD` (midnight).
pub fn stored_datetime(value: &Value) -> Option<NaiveDateTime> {
    let raw = value.as_str()?.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.naive_utc());
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(day.and_time(NaiveTime::MIN));
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// True for a checked checkbox value: `true`, a non-zero number, or one of
/// `1`, `true`, `yes`, `on` in any case.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => {
            let token = s.trim().to_ascii_lowercase();
            TRUTHY_TOKENS.contains(&token.as_str())
        }
        _ => false,
    }
}

fn compare_op(actual: &Value, op: CompareOp, expected: &Value) -> bool {
    match op {
        CompareOp::In => in_list(actual, expected),
        CompareOp::NotIn => !in_list(actual, expected),
        CompareOp::Eq => scalars(actual).any(|a| loose_eq(a, expected)),
        CompareOp::Ne => !scalars(actual).any(|a| loose_eq(a, expected)),
        CompareOp::Lt => ordering_is(actual, expected, |o| o == Ordering::Less),
        CompareOp::Lte => ordering_is(actual, expected, |o| o != Ordering::Greater),
        CompareOp::Gt => ordering_is(actual, expected, |o| o == Ordering::Greater),
        CompareOp::Gte => ordering_is(actual, expected, |o| o != Ordering::Less),
    }
}

fn in_list(actual: &Value, list: &Value) -> bool {
    let candidates: Vec<&Value> = match list {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    scalars(actual).any(|a| candidates.iter().any(|c| loose_eq(a, c)))
}

fn ordering_is(actual: &Value, expected: &Value, test: impl Fn(Ordering) -> bool) -> bool {
    compare_values(actual, expected).is_some_and(test)
}

/// Scalars of a value: the elements of an array, or the value itself.
fn scalars(value: &Value) -> Box<dyn Iterator<Item = &Value> + '_> {
    match value {
        Value::Array(items) => Box::new(items.iter()),
        other => Box::new(std::iter::once(other)),
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) if a.is_number() || b.is_number() => x == y,
        _ => match (a, b) {
            (Value::String(x), Value::String(y)) => x == y,
            (Value::Bool(x), Value::Bool(y)) => x == y,
            _ => a == b,
        },
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Total-enough ordering of two JSON values.
///
/// Numbers (and numeric strings facing a number) compare numerically,
/// strings lexicographically, booleans false-first. Values of unrelated
/// kinds are not comparable.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_number() || b.is_number() {
        let (x, y) = (as_number(a)?, as_number(b)?);
        return x.partial_cmp(&y);
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Compare two records under a multi-column order. Missing values sort
/// first in ascending order.
pub(crate) fn compare_records(order: &[OrderBy], a: &Record, b: &Record) -> Ordering {
    for key in order {
        let left = a.column_value(&key.column);
        let right = b.column_value(&key.column);
        let ordering = match (left.as_deref(), right.as_deref()) {
            (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
            (None | Some(Value::Null), Some(_)) => Ordering::Less,
            (Some(_), None | Some(Value::Null)) => Ordering::Greater,
            (Some(x), Some(y)) => compare_values(x, y)
                .unwrap_or_else(|| text_of(x).cmp(&text_of(y))),
        };
        let ordering = match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contact() -> Record {
        Record::new(7)
            .with("name", "Ann Lee")
            .with("age", 34)
            .with("tags", json!(["vip", "lead"]))
            .with("note", Value::Null)
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        assert!(Predicate::contains("name", "ann").matches(&contact()));
        assert!(Predicate::contains("name", "LEE").matches(&contact()));
        assert!(!Predicate::contains("name", "bob").matches(&contact()));
    }

    #[test]
    fn test_eq_ignore_case_matches_whole_value() {
        assert!(Predicate::eq_ignore_case("name", "ann lee").matches(&contact()));
        assert!(Predicate::eq_ignore_case("tags", "VIP").matches(&contact()));
        assert!(!Predicate::eq_ignore_case("name", "ann").matches(&contact()));
        assert!(!Predicate::eq_ignore_case("note", "").matches(&contact()));
    }

    #[test]
    fn test_numeric_string_compares_numerically() {
        assert!(Predicate::eq("age", "34").matches(&contact()));
        assert!(Predicate::gte("age", "30").matches(&contact()));
        assert!(!Predicate::gt("age", "34").matches(&contact()));
    }

    #[test]
    fn test_in_list_over_array_attribute() {
        let pred = Predicate::in_("tags", vec![json!("lead"), json!("partner")]);
        assert!(pred.matches(&contact()));
        let pred = Predicate::in_("tags", vec![json!("partner")]);
        assert!(!pred.matches(&contact()));
    }

    #[test]
    fn test_not_in_on_primary_key() {
        assert!(!Predicate::not_in("id", vec![json!(7)]).matches(&contact()));
        assert!(Predicate::not_in("id", vec![json!(8)]).matches(&contact()));
    }

    #[test]
    fn test_null_never_satisfies_comparison() {
        assert!(!Predicate::eq("note", "x").matches(&contact()));
        assert!(!Predicate::ne("missing", "x").matches(&contact()));
        assert!(Predicate::is_null("note").matches(&contact()));
        assert!(Predicate::is_null("missing").matches(&contact()));
    }

    #[test]
    fn test_date_range_reads_every_stored_shape() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let pred = Predicate::date_range(
            "due",
            Some(day.and_time(NaiveTime::MIN)),
            day.and_hms_opt(23, 59, 59),
        );
        for stored in [
            "2024-03-09",
            "2024-03-09 23:59:59",
            "2024-03-09T14:05:00Z",
            "2024-03-09T16:05:00+02:00",
            "2024-03-09 08:30",
        ] {
            assert!(pred.matches(&Record::new(1).with("due", stored)), "{stored}");
        }
        for stored in ["2024-03-10 00:00:00", "2024-03-10T01:00:00+02:00", "soon"] {
            assert!(!pred.matches(&Record::new(1).with("due", stored)), "{stored}");
        }
        assert!(!pred.matches(&Record::new(1)));
    }

    #[test]
    fn test_truthy_accepts_stored_shapes() {
        let pred = Predicate::truthy("active");
        for stored in [json!(true), json!(1), json!(2), json!("1"), json!("Yes"), json!("on")] {
            assert!(pred.matches(&Record::new(1).with("active", stored.clone())), "{stored}");
        }
        for stored in [json!(false), json!(0), json!("no"), json!(""), Value::Null] {
            assert!(!pred.matches(&Record::new(1).with("active", stored.clone())), "{stored}");
        }
        assert!(!pred.matches(&Record::new(1)));
    }

    #[test]
    fn test_empty_and_matches_everything() {
        assert!(Predicate::and(vec![]).matches(&contact()));
        assert!(!Predicate::or(vec![]).matches(&contact()));
    }

    #[test]
    fn test_compare_records_multi_column() {
        let order = vec![
            OrderBy {
                column: "last".into(),
                direction: SortDirection::Asc,
            },
            OrderBy {
                column: "first".into(),
                direction: SortDirection::Desc,
            },
        ];
        let a = Record::new(1).with("last", "Lee").with("first", "Ann");
        let b = Record::new(2).with("last", "Lee").with("first", "Zoe");
        let c = Record::new(3).with("last", "Kim").with("first", "Bo");
        assert_eq!(compare_records(&order, &c, &a), Ordering::Less);
        assert_eq!(compare_records(&order, &b, &a), Ordering::Less);
    }

    #[test]
    fn test_missing_values_sort_first() {
        let order = vec![OrderBy {
            column: "due".into(),
            direction: SortDirection::Asc,
        }];
        let with = Record::new(1).with("due", "2024-01-01");
        let without = Record::new(2);
        assert_eq!(compare_records(&order, &without, &with), Ordering::Less);
    }
}
