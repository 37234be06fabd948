use crate::Comparison;
use serde::Serialize;
use std::fmt;

/// A single `column <op> value` comparison produced by a [`FilterConfig`](crate::FilterConfig).
///
/// Values stay opaque strings; typing them is the job of whatever executes
/// the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Predicate {
    /// Backing-store column name
    pub column: String,
    pub operator: Comparison,
    pub value: String,
}

impl Predicate {
    pub fn new(column: impl Into<String>, operator: Comparison, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.column, self.operator, self.value)
    }
}
