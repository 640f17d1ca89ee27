//! Cursor encoding/decoding for pagination.
//!
//! A cursor is the sort-key value of the last row on a page. Keys with a
//! single field encode as that field's bare value (`42`,
//! `"0b6f1c1e-..."`), which is what clients of the post and comment feeds
//! already receive. Composite keys (`createdAt` plus an `id` tie-breaker)
//! encode as a base64url JSON object.
//!
//! # Security Note
//!
//! Cursors are **not encrypted**; the content is easily decoded by
//! clients. They are opaque pagination tokens, not security mechanisms, so
//! only sort-key values belong in them.

mod key;

pub use key::{KeyField, KeyKind, SortDir, SortKey};

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Serialize;

use crate::{Row, Value};

/// Maximum allowed cursor size in bytes (4KB).
const MAX_CURSOR_SIZE: usize = 4 * 1024;

/// Maximum number of fields allowed in a composite cursor.
const MAX_CURSOR_FIELDS: usize = 16;

/// Opaque token handed to clients as `nextCursor`.
///
/// Serializes as a JSON number for single integer keys and as a string
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum CursorToken {
    /// Bare integer key value.
    Int(i64),
    /// Any other key value, or an encoded composite cursor.
    Text(String),
}

impl fmt::Display for CursorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A decoded cursor: one value per sort-key field, in key order.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorPosition {
    values: Vec<(String, Value)>,
}

impl CursorPosition {
    /// Build a position directly from key values.
    #[must_use]
    pub const fn new(values: Vec<(String, Value)>) -> Self {
        Self { values }
    }

    /// Key values in sort-key order.
    #[must_use]
    pub fn values(&self) -> &[(String, Value)] {
        &self.values
    }

    /// Value recorded for a key field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, v)| v)
    }
}

/// Errors that can occur when encoding or decoding a cursor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CursorError {
    /// The token is empty.
    #[error("cursor is empty")]
    Empty,
    /// The token exceeds the maximum allowed size.
    #[error("cursor exceeds maximum size ({max} bytes)")]
    TooLarge {
        /// Maximum token size in bytes.
        max: usize,
    },
    /// The base64 encoding is invalid.
    #[error("invalid base64 encoding in cursor")]
    InvalidBase64,
    /// The decoded payload is not a JSON object.
    #[error("invalid cursor format (expected JSON object)")]
    InvalidFormat,
    /// The cursor has too many fields.
    #[error("cursor has too many fields (max {max})")]
    TooManyFields {
        /// Maximum field count.
        max: usize,
    },
    /// A sort-key field is missing from the cursor.
    #[error("cursor is missing key field `{field}`")]
    MissingField {
        /// The missing field.
        field: String,
    },
    /// A value does not match the kind of its key field.
    #[error("cursor value for `{field}` is not a valid {expected}: `{found}`")]
    InvalidValue {
        /// The key field.
        field: String,
        /// Kind the field is declared with.
        expected: KeyKind,
        /// The value found in the token.
        found: String,
    },
    /// The row being encoded has no usable value for a key field.
    #[error("row has no {expected} value for key field `{field}`")]
    MissingKeyValue {
        /// The key field.
        field: String,
        /// Kind the field is declared with.
        expected: KeyKind,
    },
}

impl CursorError {
    /// Returns `true` if this is an encoding/format error.
    #[must_use]
    pub const fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidBase64 | Self::InvalidFormat | Self::InvalidValue { .. }
        )
    }

    /// Returns `true` if this is a size/limit error.
    #[must_use]
    pub const fn is_limit_error(&self) -> bool {
        matches!(self, Self::TooLarge { .. } | Self::TooManyFields { .. })
    }
}

/// Encode the key of `item` (normally the last row kept on a page).
pub fn encode<R: Row + ?Sized>(item: &R, key: &SortKey) -> Result<CursorToken, CursorError> {
    let mut values = Vec::with_capacity(key.fields().len());
    for field in key.fields() {
        let value = item
            .field(&field.name)
            .filter(|v| matches_kind(v, field.kind))
            .ok_or_else(|| CursorError::MissingKeyValue {
                field: field.name.clone(),
                expected: field.kind,
            })?;
        values.push((field.name.as_str(), value));
    }

    if let [(_, value)] = values.as_slice() {
        return Ok(match value {
            Value::Int(i) => CursorToken::Int(*i),
            other => CursorToken::Text(other.to_string()),
        });
    }

    let mut object = serde_json::Map::with_capacity(values.len());
    for (name, value) in values {
        let json = match value {
            Value::Int(i) => serde_json::Value::from(i),
            other => serde_json::Value::String(other.to_string()),
        };
        object.insert(name.to_string(), json);
    }
    let json = serde_json::Value::Object(object).to_string();
    Ok(CursorToken::Text(URL_SAFE_NO_PAD.encode(json)))
}

/// Decode a token minted by [`encode`] for the same key.
///
/// Fields in a composite cursor that are not part of `key` are ignored.
pub fn decode(token: &str, key: &SortKey) -> Result<CursorPosition, CursorError> {
    if token.trim().is_empty() {
        return Err(CursorError::Empty);
    }
    if token.len() > MAX_CURSOR_SIZE {
        return Err(CursorError::TooLarge {
            max: MAX_CURSOR_SIZE,
        });
    }

    if let [field] = key.fields() {
        let value = parse_scalar(&field.name, field.kind, token)?;
        return Ok(CursorPosition::new(vec![(field.name.clone(), value)]));
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| CursorError::InvalidBase64)?;
    let object: serde_json::Map<String, serde_json::Value> =
        serde_json::from_slice(&bytes).map_err(|_| CursorError::InvalidFormat)?;
    if object.len() > MAX_CURSOR_FIELDS {
        return Err(CursorError::TooManyFields {
            max: MAX_CURSOR_FIELDS,
        });
    }

    let mut values = Vec::with_capacity(key.fields().len());
    for field in key.fields() {
        let raw = object
            .get(&field.name)
            .ok_or_else(|| CursorError::MissingField {
                field: field.name.clone(),
            })?;
        let value = match (field.kind, raw) {
            (KeyKind::Int, serde_json::Value::Number(n)) => {
                n.as_i64().map(Value::Int).ok_or_else(|| CursorError::InvalidValue {
                    field: field.name.clone(),
                    expected: field.kind,
                    found: n.to_string(),
                })?
            },
            (_, serde_json::Value::String(s)) => parse_scalar(&field.name, field.kind, s)?,
            (_, other) => {
                return Err(CursorError::InvalidValue {
                    field: field.name.clone(),
                    expected: field.kind,
                    found: other.to_string(),
                });
            },
        };
        values.push((field.name.clone(), value));
    }

    Ok(CursorPosition::new(values))
}

fn matches_kind(value: &Value, kind: KeyKind) -> bool {
    match kind {
        KeyKind::Int => matches!(value, Value::Int(_)),
        // A blank token reads as "no cursor", so blank keys cannot be minted.
        KeyKind::Uuid | KeyKind::Timestamp | KeyKind::Text => {
            matches!(value, Value::String(s) if !s.trim().is_empty())
        },
    }
}

pub(crate) fn parse_scalar(field: &str, kind: KeyKind, raw: &str) -> Result<Value, CursorError> {
    let invalid = || CursorError::InvalidValue {
        field: field.to_string(),
        expected: kind,
        found: raw.to_string(),
    };
    match kind {
        KeyKind::Int => raw.parse::<i64>().map(Value::Int).map_err(|_| invalid()),
        KeyKind::Uuid => uuid::Uuid::parse_str(raw)
            .map(|_| Value::String(raw.to_string()))
            .map_err(|_| invalid()),
        KeyKind::Timestamp => chrono::DateTime::parse_from_rfc3339(raw)
            .map(|_| Value::String(raw.to_string()))
            .map_err(|_| invalid()),
        KeyKind::Text if raw.trim().is_empty() => Err(invalid()),
        KeyKind::Text => Ok(Value::String(raw.to_string())),
    }
}
