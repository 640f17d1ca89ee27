//! In-memory [`Repository`] for tests, fixtures and prototypes.
//!
//! Rows live in a `Vec` behind an `RwLock`. Every call takes a fresh
//! snapshot, so rows inserted or removed between two page requests behave
//! as they would against a real store: cursors keep working, offsets shift.

use std::cmp::Ordering;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::cursor::{KeyKind, SortDir, SortKey};
use crate::error::RepositoryError;
use crate::predicate::{Condition, LIKE_ESCAPE, Operator, Predicate};
use crate::query::{QueryDescriptor, Repository};
use crate::{Row, Value};

/// A repository over rows held in memory.
///
/// Membership predicates are answered through [`Row::related_ids`] for the
/// predicate's relation; the membership field name is not consulted.
#[derive(Debug, Default)]
pub struct MemoryRepository<T> {
    rows: RwLock<Vec<T>>,
}

impl<T> MemoryRepository<T> {
    /// Create a repository holding `rows`.
    pub const fn new(rows: Vec<T>) -> Self {
        Self {
            rows: RwLock::new(rows),
        }
    }

    /// Add a row.
    pub fn insert(&self, row: T) {
        self.rows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(row);
    }

    /// Number of rows held.
    pub fn len(&self) -> usize {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether no rows are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Row> MemoryRepository<T> {
    /// Remove every row matching `predicate`; returns how many were removed.
    pub fn remove(&self, predicate: &Predicate) -> usize {
        let mut rows = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        let before = rows.len();
        rows.retain(|row| !matches(row, predicate));
        before - rows.len()
    }
}

#[async_trait]
impl<T> Repository for MemoryRepository<T>
where
    T: Row + Clone + Send + Sync,
{
    type Row = T;

    async fn find_many(&self, query: &QueryDescriptor) -> Result<Vec<T>, RepositoryError> {
        let mut rows: Vec<T> = {
            let guard = self.rows.read().unwrap_or_else(PoisonError::into_inner);
            guard
                .iter()
                .filter(|row| matches(*row, &query.predicate))
                .cloned()
                .collect()
        };
        let key = &query.order_by;
        rows.sort_by(|a, b| compare_keys(&key_values(a, key), &key_values(b, key), key));

        if let Some(seek) = &query.seek {
            let position: Vec<Value> = key
                .fields()
                .iter()
                .map(|f| seek.position.get(&f.name).cloned().unwrap_or(Value::Null))
                .collect();
            let mut skipped = 0;
            rows.retain(|row| {
                let ord = compare_keys(&key_values(row, key), &position, key);
                if ord == Ordering::Less {
                    return false;
                }
                if ord == Ordering::Equal && skipped < seek.skip {
                    skipped += 1;
                    return false;
                }
                true
            });
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(skip)
            .take(query.take as usize)
            .collect())
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64, RepositoryError> {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        Ok(rows.iter().filter(|row| matches(*row, predicate)).count() as u64)
    }
}

/// Evaluate `predicate` against one row.
pub(crate) fn matches<R: Row + ?Sized>(row: &R, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::All => true,
        Predicate::And(children) => children.iter().all(|p| matches(row, p)),
        Predicate::Or(children) => children.iter().any(|p| matches(row, p)),
        Predicate::Membership(m) => row
            .related_ids(&m.relation)
            .iter()
            .any(|id| m.ids.contains(id)),
        Predicate::Condition(c) => condition_matches(row.field(&c.field), c),
    }
}

fn condition_matches(actual: Option<Value>, condition: &Condition) -> bool {
    let actual = actual.unwrap_or(Value::Null);
    let expected = &condition.value;
    match condition.op {
        Operator::Eq if expected.is_null() => actual.is_null(),
        Operator::Ne if expected.is_null() => !actual.is_null(),
        _ if actual.is_null() => false,
        Operator::Eq => actual.compare(expected) == Some(Ordering::Equal),
        Operator::Ne => actual.compare(expected) != Some(Ordering::Equal),
        Operator::Gt => actual.compare(expected) == Some(Ordering::Greater),
        Operator::Gte => matches!(
            actual.compare(expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Lt => actual.compare(expected) == Some(Ordering::Less),
        Operator::Lte => matches!(
            actual.compare(expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::In => match expected {
            Value::Array(items) => items
                .iter()
                .any(|item| actual.compare(item) == Some(Ordering::Equal)),
            _ => false,
        },
        Operator::Contains => match (actual.as_str(), expected.as_str()) {
            (Some(haystack), Some(pattern)) => haystack
                .to_lowercase()
                .contains(&unescape(pattern).to_lowercase()),
            _ => false,
        },
    }
}

/// Undo pattern escaping: every escaped character stands for itself.
fn unescape(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == LIKE_ESCAPE {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn key_values<R: Row + ?Sized>(row: &R, key: &SortKey) -> Vec<Value> {
    key.fields()
        .iter()
        .map(|f| row.field(&f.name).unwrap_or(Value::Null))
        .collect()
}

fn compare_keys(a: &[Value], b: &[Value], key: &SortKey) -> Ordering {
    for ((x, y), field) in a.iter().zip(b).zip(key.fields()) {
        let ord = compare_field(field.kind, x, y);
        let ord = match field.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn compare_field(kind: KeyKind, a: &Value, b: &Value) -> Ordering {
    if kind == KeyKind::Timestamp {
        let parse = |v: &Value| {
            v.as_str()
                .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
        };
        if let (Some(x), Some(y)) = (parse(a), parse(b)) {
            return x.cmp(&y);
        }
    }
    a.compare(b).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::CursorPosition;
    use crate::query::Seek;
    use serde_json::json;

    fn repo() -> MemoryRepository<serde_json::Value> {
        MemoryRepository::new(vec![
            json!({"id": 1, "title": "Intro to Rust", "createdAt": "2024-01-01T00:00:00Z", "tags": [1]}),
            json!({"id": 2, "title": "100% coverage", "createdAt": "2024-01-02T00:00:00Z", "tags": [2]}),
            json!({"id": 3, "title": "JavaScript tips", "createdAt": "2024-01-02T00:00:00Z", "tags": [1, 2]}),
            json!({"id": 4, "title": "No tags", "createdAt": "2024-01-03T00:00:00+02:00", "tags": []}),
        ])
    }

    fn newest_first() -> SortKey {
        SortKey::by("createdAt", KeyKind::Timestamp, SortDir::Desc).with_tie_breaker("id", KeyKind::Int)
    }

    fn query(predicate: Predicate) -> QueryDescriptor {
        QueryDescriptor {
            predicate,
            order_by: newest_first(),
            take: 10,
            skip: 0,
            seek: None,
        }
    }

    fn ids(rows: &[serde_json::Value]) -> Vec<i64> {
        rows.iter().filter_map(|r| r["id"].as_i64()).collect()
    }

    #[tokio::test]
    async fn test_orders_by_key_with_tie_breaker() {
        let rows = repo().find_many(&query(Predicate::All)).await.unwrap();
        assert_eq!(ids(&rows), vec![4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn test_contains_is_case_insensitive_and_literal() {
        let repo = repo();
        let rows = repo
            .find_many(&query(Predicate::contains("title", "javascript")))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![3]);

        // An escaped `%` only matches a literal percent sign.
        let rows = repo
            .find_many(&query(Predicate::contains("title", r"\%")))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![2]);
    }

    #[tokio::test]
    async fn test_membership() {
        let rows = repo()
            .find_many(&query(Predicate::membership("tags", "tagId", vec![2])))
            .await
            .unwrap();
        assert_eq!(ids(&rows), vec![3, 2]);
    }

    #[tokio::test]
    async fn test_seek_skips_boundary_row() {
        let mut q = query(Predicate::All);
        q.seek = Some(Seek {
            position: CursorPosition::new(vec![
                ("createdAt".into(), Value::from("2024-01-02T00:00:00Z")),
                ("id".into(), Value::Int(3)),
            ]),
            skip: 1,
        });
        let rows = repo().find_many(&q).await.unwrap();
        assert_eq!(ids(&rows), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_seek_after_deleted_row() {
        let repo = repo();
        assert_eq!(repo.remove(&Predicate::eq("id", 3)), 1);
        let mut q = query(Predicate::All);
        q.seek = Some(Seek {
            position: CursorPosition::new(vec![
                ("createdAt".into(), Value::from("2024-01-02T00:00:00Z")),
                ("id".into(), Value::Int(3)),
            ]),
            skip: 1,
        });
        let rows = repo.find_many(&q).await.unwrap();
        assert_eq!(ids(&rows), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_count_and_exists() {
        let repo = repo();
        assert_eq!(repo.count(&Predicate::All).await.unwrap(), 4);
        assert!(repo.exists(&Predicate::eq("id", 4)).await.unwrap());
        assert!(!repo.exists(&Predicate::eq("id", 99)).await.unwrap());
    }

    #[tokio::test]
    async fn test_null_conditions() {
        let repo = MemoryRepository::new(vec![
            json!({"id": 1, "postId": 5, "commentId": null}),
            json!({"id": 2, "postId": null, "commentId": "c"}),
        ]);
        assert_eq!(repo.count(&Predicate::is_null("commentId")).await.unwrap(), 1);
        assert_eq!(repo.count(&Predicate::eq("postId", 5)).await.unwrap(), 1);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"50\%\_a\\b"), r"50%_a\b");
    }
}
