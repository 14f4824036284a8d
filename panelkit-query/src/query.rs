//! Unexecuted queries
//!
//! A [`Query`] is a plain value: the storage model it targets, a conjunction
//! of predicates, an ordered list of sort keys and an optional window.
//! Every builder method consumes and returns the query, so a base query can
//! be cloned and narrowed without affecting the original.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::QueryError;
use crate::predicate::Predicate;
use crate::record::RecordId;

/// Sort direction of one order key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(QueryError::InvalidDirection {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

/// An unexecuted query against one storage model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    source: String,
    predicates: Vec<Predicate>,
    order: Vec<OrderBy>,
    offset: usize,
    limit: Option<usize>,
}

impl Query {
    /// Base query selecting every record of `source`.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            predicates: Vec::new(),
            order: Vec::new(),
            offset: 0,
            limit: None,
        }
    }

    /// Add a predicate. Predicates are combined with AND.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Shorthand for `filter(Predicate::eq(..))`.
    #[must_use]
    pub fn where_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Predicate::eq(column, value))
    }

    /// Exclude records whose `column` holds one of `ids`.
    #[must_use]
    pub fn where_not_in_ids<I>(self, column: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = RecordId>,
    {
        let values = ids.into_iter().map(Value::from).collect();
        self.filter(Predicate::not_in(column, values))
    }

    /// Append a sort key. Earlier keys take precedence; later keys break ties.
    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order.push(OrderBy {
            column: column.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn skip(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    #[must_use]
    pub fn take(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Same filters and order with the window removed, as used for counting.
    #[must_use]
    pub fn unbounded(&self) -> Self {
        Self {
            offset: 0,
            limit: None,
            ..self.clone()
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn order(&self) -> &[OrderBy] {
        &self.order
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_does_not_mutate_clone() {
        let base = Query::new("contacts").where_eq("domain_id", 1);
        let narrowed = base.clone().filter(Predicate::contains("name", "ann"));
        assert_eq!(base.predicates().len(), 1);
        assert_eq!(narrowed.predicates().len(), 2);
    }

    #[test]
    fn test_order_keeps_supplied_sequence() {
        let query = Query::new("contacts")
            .order_by("last_name", SortDirection::Asc)
            .order_by("first_name", SortDirection::Desc);
        let columns: Vec<_> = query.order().iter().map(|o| o.column.as_str()).collect();
        assert_eq!(columns, vec!["last_name", "first_name"]);
    }

    #[test]
    fn test_unbounded_drops_window_only() {
        let query = Query::new("contacts")
            .where_eq("active", true)
            .order_by("name", SortDirection::Asc)
            .skip(30)
            .take(15);
        let unbounded = query.unbounded();
        assert_eq!(unbounded.offset(), 0);
        assert_eq!(unbounded.limit(), None);
        assert_eq!(unbounded.predicates(), query.predicates());
        assert_eq!(unbounded.order(), query.order());
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert_eq!(" asc ".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
