//! Render filter predicates into a parameterised PostgreSQL `WHERE` clause
//!
//! Filter values arrive as text. Each column declares the SQL type its
//! values are cast to, so Postgres does the parsing and rejects malformed
//! input with `invalid input syntax` instead of comparing text to a number.

use query_filter::Predicate;
use sea_orm::Value;

/// How a filterable column compares against a bound text value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    /// Compared through `lower()` on both sides
    CaseInsensitiveText,
    BigInt,
    TimestampTz,
    Boolean,
}

impl ColumnType {
    fn cast(self) -> Option<&'static str> {
        match self {
            ColumnType::Text | ColumnType::CaseInsensitiveText => None,
            ColumnType::BigInt => Some("bigint"),
            ColumnType::TimestampTz => Some("timestamptz"),
            ColumnType::Boolean => Some("boolean"),
        }
    }
}

/// SQL fragment plus the values bound to its placeholders, in order
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    /// `WHERE ...` including the keyword, or empty when there are no predicates
    pub sql: String,
    pub values: Vec<Value>,
}

impl WhereClause {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Placeholder index following the last one used here.
    pub fn next_placeholder(&self, first_placeholder: usize) -> usize {
        first_placeholder + self.values.len()
    }
}

/// Quote an identifier for PostgreSQL, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Build a conjunctive `WHERE` clause from `predicates`.
///
/// Placeholders start at `$first_placeholder`. `column_type` returns the
/// type of each column; `None` treats the column as plain text.
pub fn where_clause<F>(predicates: &[Predicate], first_placeholder: usize, column_type: F) -> WhereClause
where
    F: Fn(&str) -> Option<ColumnType>,
{
    if predicates.is_empty() {
        return WhereClause {
            sql: String::new(),
            values: Vec::new(),
        };
    }

    let mut conditions = Vec::with_capacity(predicates.len());
    let mut values = Vec::with_capacity(predicates.len());

    for (offset, predicate) in predicates.iter().enumerate() {
        let placeholder = first_placeholder + offset;
        let column = quote_ident(&predicate.column);
        let op = predicate.operator.as_sql();
        let kind = column_type(&predicate.column).unwrap_or(ColumnType::Text);

        let condition = match (kind, kind.cast()) {
            (ColumnType::CaseInsensitiveText, _) => {
                format!("lower({column}) {op} lower(${placeholder})")
            }
            (_, Some(cast)) => format!("{column} {op} ${placeholder}::{cast}"),
            (_, None) => format!("{column} {op} ${placeholder}"),
        };

        conditions.push(condition);
        values.push(Value::from(predicate.value.clone()));
    }

    WhereClause {
        sql: format!("WHERE {}", conditions.join(" AND ")),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_filter::Comparison;

    fn types(column: &str) -> Option<ColumnType> {
        match column {
            "email" => Some(ColumnType::CaseInsensitiveText),
            "current_team_id" => Some(ColumnType::BigInt),
            "email_verified_at" => Some(ColumnType::TimestampTz),
            _ => None,
        }
    }

    #[test]
    fn test_empty_predicates_render_nothing() {
        let clause = where_clause(&[], 1, types);
        assert!(clause.is_empty());
        assert_eq!(clause.sql, "");
    }

    #[test]
    fn test_single_text_predicate() {
        let clause = where_clause(&[Predicate::new("name", Comparison::Eq, "Ann")], 1, types);
        assert_eq!(clause.sql, r#"WHERE "name" = $1"#);
        assert_eq!(clause.values, vec![Value::from("Ann".to_string())]);
    }

    #[test]
    fn test_placeholders_start_at_offset_and_cast_per_column() {
        let predicates = vec![
            Predicate::new("current_team_id", Comparison::Gte, "3"),
            Predicate::new("email_verified_at", Comparison::Lt, "2024-01-01T00:00:00Z"),
            Predicate::new("email", Comparison::Eq, "A@B.com"),
        ];

        let clause = where_clause(&predicates, 3, types);

        assert_eq!(
            clause.sql,
            r#"WHERE "current_team_id" >= $3::bigint AND "email_verified_at" < $4::timestamptz AND lower("email") = lower($5)"#
        );
        assert_eq!(clause.values.len(), 3);
        assert_eq!(clause.next_placeholder(3), 6);
    }

    #[test]
    fn test_identifiers_are_quoted() {
        assert_eq!(quote_ident("fb_id"), r#""fb_id""#);
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
    }

    #[test]
    fn test_values_are_bound_not_inlined() {
        let clause = where_clause(
            &[Predicate::new("name", Comparison::Eq, "x' OR '1'='1")],
            1,
            types,
        );
        assert!(!clause.sql.contains("OR"));
        assert_eq!(clause.values, vec![Value::from("x' OR '1'='1".to_string())]);
    }
}
