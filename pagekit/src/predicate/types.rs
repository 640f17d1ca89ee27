//! Core types for filter predicates.

use std::fmt;

use crate::Value;

/// Escape character used by [`Operator::Contains`] patterns.
///
/// A `Contains` value is a pattern produced by
/// [`escape_like`](crate::sanitize::escape_like): `%`, `_` and the escape
/// character itself are preceded by it and must be matched literally.
pub const LIKE_ESCAPE: char = '\\';

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equal; `Eq` with `Value::Null` means `IS NULL`.
    Eq,
    /// Not equal; `Ne` with `Value::Null` means `IS NOT NULL`.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Field value is one of an array of values.
    In,
    /// Case-insensitive literal substring match against an escaped pattern.
    Contains,
}

impl Operator {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::In => " in ",
            Self::Contains => "~",
        }
    }
}

/// A single field comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Field name.
    pub field: String,
    /// Comparison operator.
    pub op: Operator,
    /// Right-hand value.
    pub value: Value,
}

/// "The row has at least one associated row in `relation` whose `field` is
/// one of `ids`."
///
/// Multiple ids are OR-ed: a post tagged with any listed tag qualifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    /// Relation name, e.g. `tags`.
    pub relation: String,
    /// Field of the related row, e.g. `tagId`.
    pub field: String,
    /// Accepted identifiers.
    pub ids: Vec<i64>,
}

/// A boolean filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches every row (no filter).
    All,
    /// A single field comparison.
    Condition(Condition),
    /// A relation membership test.
    Membership(Membership),
    /// All children must match. An empty group matches everything.
    And(Vec<Predicate>),
    /// At least one child must match. An empty group matches nothing.
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Build a single comparison.
    pub fn condition(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self::Condition(Condition {
            field: field.into(),
            op,
            value: value.into(),
        })
    }

    /// `field = value`.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::condition(field, Operator::Eq, value)
    }

    /// `field IS NULL`.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::condition(field, Operator::Eq, Value::Null)
    }

    /// Substring match; `pattern` must already be escaped.
    pub fn contains(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::condition(field, Operator::Contains, Value::String(pattern.into()))
    }

    /// Relation membership over `ids`.
    pub fn membership(relation: impl Into<String>, field: impl Into<String>, ids: Vec<i64>) -> Self {
        Self::Membership(Membership {
            relation: relation.into(),
            field: field.into(),
            ids,
        })
    }

    /// Whether this is the match-everything predicate.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Nesting depth; leaves have depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::All | Self::Condition(_) | Self::Membership(_) => 1,
            Self::And(children) | Self::Or(children) => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            },
        }
    }

    /// Visit every leaf of the tree.
    pub fn for_each_leaf<'a>(&'a self, f: &mut impl FnMut(&'a Self)) {
        match self {
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.for_each_leaf(f);
                }
            },
            leaf => f(leaf),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn group(f: &mut fmt::Formatter<'_>, name: &str, children: &[Predicate]) -> fmt::Result {
            write!(f, "{name}(")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{child}")?;
            }
            f.write_str(")")
        }

        match self {
            Self::All => f.write_str("ALL"),
            Self::Condition(Condition {
                field,
                op: Operator::Eq,
                value: Value::Null,
            }) => write!(f, "{field} IS NULL"),
            Self::Condition(Condition {
                field,
                op: Operator::Ne,
                value: Value::Null,
            }) => write!(f, "{field} IS NOT NULL"),
            Self::Condition(c) => write!(f, "{}{}{}", c.field, c.op.symbol(), c.value),
            Self::Membership(m) => write!(
                f,
                "{}.{} in {}",
                m.relation,
                m.field,
                Value::from(m.ids.clone())
            ),
            Self::And(children) => group(f, "AND", children),
            Self::Or(children) => group(f, "OR", children),
        }
    }
}
