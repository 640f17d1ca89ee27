// =============================================================================
// CRATE-LEVEL QUALITY LINTS
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Quoted identifiers in docs
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // TableSpec builder
#![allow(clippy::format_push_string)] // String building style preference

//! # pagekit-sql - SQL Rendering for pagekit Queries
//!
//! Turns a [`pagekit::QueryDescriptor`] into a parameterized statement for
//! Postgres or `SQLite`. Values always travel as parameters; identifiers
//! are validated and double-quoted, so camelCase columns work unchanged.
//!
//! ```
//! use pagekit::{KeyKind, Predicate, QueryDescriptor, SortDir, SortKey};
//! use pagekit_sql::{Relation, Sqlite, TableSpec, render_count, render_select};
//!
//! let posts = TableSpec::new("posts", "id")
//!     .relation(Relation::new("tags", "post_tags", "postId"));
//!
//! let query = QueryDescriptor {
//!     predicate: Predicate::membership("tags", "tagId", vec![3, 8]),
//!     order_by: SortKey::by("id", KeyKind::Int, SortDir::Desc),
//!     take: 11,
//!     skip: 0,
//!     seek: None,
//! };
//!
//! let select = render_select(Sqlite, &posts, &query).unwrap();
//! assert!(select.sql.contains(r#""post_tags"."tagId" IN (?1, ?2)"#));
//! assert!(select.sql.ends_with(r#"ORDER BY "id" DESC LIMIT 11"#));
//!
//! let count = render_count(Sqlite, &posts, &query.predicate).unwrap();
//! assert!(count.sql.starts_with(r#"SELECT COUNT(*) FROM "posts""#));
//! ```
//!
//! ## Keyset Seek
//!
//! A descriptor with a [`pagekit::Seek`] gets a row-value comparison
//! against the cursor position, expanded field by field so that mixed sort
//! directions work on both databases. The final comparison is strict when
//! the seek skips its boundary row and inclusive otherwise.

mod dialect;
mod render;
mod validate;

pub use dialect::{Dialect, Postgres, Sqlite};
pub use render::{Relation, TableSpec, render_count, render_select};
pub use validate::is_valid_identifier;

use pagekit::Value;

/// A rendered statement and the parameters it binds, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "SqlQuery must be used to execute the query"]
pub struct SqlQuery {
    /// Statement text.
    pub sql: String,
    /// Bound values; `$n` / `?n` refers to `params[n - 1]`.
    pub params: Vec<Value>,
}

/// A descriptor that cannot be rendered against a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum RenderError {
    /// A table, column or relation name that is not a plain identifier.
    #[error("invalid SQL identifier `{0}`")]
    InvalidIdentifier(String),

    /// A membership predicate naming a relation the table does not have.
    #[error("unknown relation `{0}`")]
    UnknownRelation(String),

    /// The seek position lacks a value for a sort-key field.
    #[error("seek position has no value for `{0}`")]
    MissingSeekValue(String),

    /// An operator given a value it cannot compare with.
    #[error("`{field}` cannot be matched against a {found}")]
    UnsupportedOperand {
        /// Field of the offending condition.
        field: String,
        /// Type of the value supplied.
        found: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            RenderError::InvalidIdentifier("a b".into()).to_string(),
            "invalid SQL identifier `a b`"
        );
        assert_eq!(
            RenderError::UnsupportedOperand {
                field: "status".into(),
                found: "string"
            }
            .to_string(),
            "`status` cannot be matched against a string"
        );
    }
}
