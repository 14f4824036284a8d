//! Numeric uitypes: exact match or inclusive `min,max` range.

use panelkit_query::{Predicate, Query};
use serde_json::{Number as JsonNumber, Value};
use tracing::debug;

use super::{FieldDef, SearchValue, UiType};

fn parse_integer(raw: &str) -> Option<Value> {
    raw.trim().parse::<i64>().ok().map(Value::from)
}

fn parse_number(raw: &str) -> Option<Value> {
    let n = raw.trim().parse::<f64>().ok()?;
    JsonNumber::from_f64(n).map(Value::Number)
}

fn numeric_condition(
    query: Query,
    field: &FieldDef,
    value: &SearchValue,
    parse: fn(&str) -> Option<Value>,
) -> Query {
    let column = field.column();
    match value.range() {
        Some((low, high)) => {
            let low = low.as_deref().and_then(parse);
            let high = high.as_deref().and_then(parse);
            if low.is_none() && high.is_none() {
                debug!(field = %field.name, "numeric range without usable bounds");
                return query;
            }
            query.filter(Predicate::between(column, low, high))
        }
        None => match parse(&value.joined()) {
            Some(n) => query.filter(Predicate::eq(column, n)),
            None => {
                debug!(field = %field.name, value = %value.joined(), "ignoring non-numeric search value");
                query
            }
        },
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Integer;

impl UiType for Integer {
    fn name(&self) -> &str {
        "integer"
    }

    fn form_type(&self, _field: &FieldDef) -> &str {
        "number"
    }

    fn add_condition_to_search_query(
        &self,
        query: Query,
        field: &FieldDef,
        value: &SearchValue,
    ) -> Query {
        numeric_condition(query, field, value, parse_integer)
    }
}

/// Decimal number.
#[derive(Debug, Default, Clone, Copy)]
pub struct Number;

impl UiType for Number {
    fn name(&self) -> &str {
        "number"
    }

    fn form_type(&self, _field: &FieldDef) -> &str {
        "number"
    }

    fn add_condition_to_search_query(
        &self,
        query: Query,
        field: &FieldDef,
        value: &SearchValue,
    ) -> Query {
        numeric_condition(query, field, value, parse_number)
    }
}
