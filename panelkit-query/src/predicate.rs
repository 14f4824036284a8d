use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

///
/// Predicate AST
///
/// Pure, schema-agnostic representation of a search filter. Columns are
/// storage column names, values are JSON. Uitypes decide which shape to
/// emit; stores decide how to execute it.
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    NotIn,
}

impl CompareOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::In => "in",
            Self::NotIn => "not in",
        }
    }
}

///
/// Predicate
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    /// Case-insensitive whole-value match.
    EqIgnoreCase { column: String, value: String },
    /// Case-insensitive substring match (SQL `LIKE '%needle%'`).
    Contains { column: String, needle: String },
    IsNull { column: String },
    /// Inclusive range over the instant a stored date value denotes,
    /// whatever shape it is stored in.
    DateRange {
        column: String,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    },
    /// Checked checkbox, whatever shape the value is stored in.
    Truthy { column: String },
}

impl Predicate {
    #[must_use]
    pub const fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub const fn or(preds: Vec<Self>) -> Self {
        Self::Or(preds)
    }

    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(pred: Self) -> Self {
        Self::Not(Box::new(pred))
    }

    fn compare(column: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    #[must_use]
    pub fn ne(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Ne, value)
    }

    #[must_use]
    pub fn lt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Lte, value)
    }

    #[must_use]
    pub fn gt(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(column, CompareOp::Gte, value)
    }

    #[must_use]
    pub fn in_(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self::compare(column, CompareOp::In, Value::Array(values))
    }

    #[must_use]
    pub fn not_in(column: impl Into<String>, values: Vec<Value>) -> Self {
        Self::compare(column, CompareOp::NotIn, Value::Array(values))
    }

    /// Inclusive range. An open bound is omitted; with both bounds open the
    /// result is an empty conjunction, which matches everything.
    #[must_use]
    pub fn between(column: impl Into<String>, low: Option<Value>, high: Option<Value>) -> Self {
        let column = column.into();
        let mut bounds = Vec::with_capacity(2);
        if let Some(low) = low {
            bounds.push(Self::gte(column.clone(), low));
        }
        if let Some(high) = high {
            bounds.push(Self::lte(column, high));
        }
        if bounds.len() == 1 {
            return bounds.remove(0);
        }
        Self::And(bounds)
    }

    #[must_use]
    pub fn contains(column: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Contains {
            column: column.into(),
            needle: needle.into(),
        }
    }

    #[must_use]
    pub fn eq_ignore_case(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::EqIgnoreCase {
            column: column.into(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull {
            column: column.into(),
        }
    }

    #[must_use]
    pub fn date_range(
        column: impl Into<String>,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Self {
        Self::DateRange {
            column: column.into(),
            from,
            to,
        }
    }

    #[must_use]
    pub fn truthy(column: impl Into<String>) -> Self {
        Self::Truthy {
            column: column.into(),
        }
    }

    /// Columns referenced anywhere in this predicate, in visit order.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::And(preds) | Self::Or(preds) => {
                for pred in preds {
                    pred.collect_columns(out);
                }
            }
            Self::Not(pred) => pred.collect_columns(out),
            Self::Compare { column, .. }
            | Self::Contains { column, .. }
            | Self::EqIgnoreCase { column, .. }
            | Self::IsNull { column }
            | Self::DateRange { column, .. }
            | Self::Truthy { column } => out.push(column),
        }
    }
}
