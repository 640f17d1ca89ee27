//! SQL dialects for Postgres and `SQLite`.
//!
//! Each dialect handles the placeholder and pattern-matching differences
//! between the two databases. Column arguments arrive already quoted.

use pagekit::Value;

/// SQL dialect trait for database-specific syntax.
pub trait Dialect: Clone + Copy {
    /// Format a parameter placeholder (e.g., `$1` for Postgres, `?1` for `SQLite`).
    fn param(&self, idx: usize) -> String;

    /// Format an IN clause with multiple values.
    /// Returns the SQL fragment and the parameters it binds.
    fn in_clause(&self, column: &str, values: &[Value], start_idx: usize) -> (String, Vec<Value>);

    /// Case-insensitive LIKE operator.
    fn like_op(&self) -> &'static str;

    /// Format a substring match against an escaped pattern parameter.
    fn contains_clause(&self, column: &str, idx: usize) -> String {
        format!(
            "{column} {} '%' || {} || '%' ESCAPE '\\'",
            self.like_op(),
            self.param(idx)
        )
    }
}

/// Postgres dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Postgres;

impl Dialect for Postgres {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("${idx}")
    }

    fn in_clause(&self, column: &str, values: &[Value], start_idx: usize) -> (String, Vec<Value>) {
        // Postgres: column = ANY($1) with array parameter
        let sql = format!("{column} = ANY(${start_idx})");
        (sql, vec![Value::Array(values.to_vec())])
    }

    #[inline]
    fn like_op(&self) -> &'static str {
        "ILIKE"
    }
}

/// `SQLite` dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sqlite;

impl Dialect for Sqlite {
    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("?{idx}")
    }

    fn in_clause(&self, column: &str, values: &[Value], start_idx: usize) -> (String, Vec<Value>) {
        if values.is_empty() {
            return ("1=0".to_string(), Vec::new());
        }
        // SQLite: column IN (?1, ?2, ?3) with expanded parameters
        let placeholders: Vec<String> = (0..values.len())
            .map(|i| format!("?{}", start_idx + i))
            .collect();
        let sql = format!("{column} IN ({})", placeholders.join(", "));
        (sql, values.to_vec())
    }

    #[inline]
    fn like_op(&self) -> &'static str {
        // SQLite LIKE is case-insensitive for ASCII by default
        "LIKE"
    }
}
