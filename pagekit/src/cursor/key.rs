//! Sort keys: the fields a collection is ordered by.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    /// Smallest first.
    Asc,
    /// Largest first.
    Desc,
}

impl SortDir {
    /// SQL keyword for this direction.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// The type of value a key field holds.
///
/// Decoding a cursor checks every value against its field's kind, so a
/// token minted for an integer-keyed collection cannot be replayed
/// against a UUID-keyed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyKind {
    /// Positive 64-bit integer (serial primary keys, tag ids).
    Int,
    /// Hyphenated or simple UUID string.
    Uuid,
    /// RFC 3339 timestamp string.
    Timestamp,
    /// Any non-empty string.
    Text,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "integer",
            Self::Uuid => "uuid",
            Self::Timestamp => "timestamp",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

/// One field of a sort key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyField {
    /// Column name.
    pub name: String,
    /// Value kind, used to decode cursor tokens.
    pub kind: KeyKind,
    /// Sort direction.
    pub dir: SortDir,
}

impl KeyField {
    /// Create a key field.
    pub fn new(name: impl Into<String>, kind: KeyKind, dir: SortDir) -> Self {
        Self {
            name: name.into(),
            kind,
            dir,
        }
    }
}

/// Ordered list of fields establishing a collection's total order.
///
/// Cursor pagination only works without gaps or repeats when the key is
/// unique per row. Build keys over non-unique fields with
/// [`with_tie_breaker`](Self::with_tie_breaker) so the primary key settles
/// ties.
///
/// ```
/// use pagekit::{KeyKind, SortDir, SortKey};
///
/// let key = SortKey::by("createdAt", KeyKind::Timestamp, SortDir::Desc)
///     .with_tie_breaker("id", KeyKind::Uuid);
/// assert_eq!(key.fields().len(), 2);
/// assert_eq!(key.fields()[1].dir, SortDir::Desc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    fields: Vec<KeyField>,
}

impl SortKey {
    /// Key on a single field that is already unique.
    pub fn by(name: impl Into<String>, kind: KeyKind, dir: SortDir) -> Self {
        Self {
            fields: vec![KeyField::new(name, kind, dir)],
        }
    }

    /// Append another ordering field.
    pub fn then(mut self, name: impl Into<String>, kind: KeyKind, dir: SortDir) -> Self {
        self.fields.push(KeyField::new(name, kind, dir));
        self
    }

    /// Append the unique tie-breaker, following the primary field's direction.
    ///
    /// A no-op when the field is already part of the key.
    pub fn with_tie_breaker(mut self, name: impl Into<String>, kind: KeyKind) -> Self {
        let name = name.into();
        if self.fields.iter().any(|f| f.name == name) {
            return self;
        }
        let dir = self.fields.first().map_or(SortDir::Asc, |f| f.dir);
        self.fields.push(KeyField::new(name, kind, dir));
        self
    }

    /// Fields in sort order, tie-breaker last.
    #[must_use]
    pub fn fields(&self) -> &[KeyField] {
        &self.fields
    }

    /// Whether the token for this key is the bare value of one field.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.fields.len() == 1
    }

    /// Names of the key fields, in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}
