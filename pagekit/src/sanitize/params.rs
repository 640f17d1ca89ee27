//! Scalar query parameters: integers, identifiers and enumerated choices.

use serde_json::Value as Json;

use crate::cursor::{KeyKind, parse_scalar};
use crate::{ValidationError, Value};

/// Parse an optional integer parameter such as `limit` or `page`.
///
/// Accepts JSON integers and strings holding one (surrounding whitespace
/// ignored). Absent, null and blank values are `None`.
pub fn parse_int(field: &str, raw: Option<&Json>) -> Result<Option<i64>, ValidationError> {
    let not_an_integer = |value: String| ValidationError::NotAnInteger {
        field: field.to_string(),
        value,
    };
    match raw {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Json::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| not_an_integer(s.clone())),
        Some(Json::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| not_an_integer(n.to_string())),
        Some(other) => Err(not_an_integer(other.to_string())),
    }
}

/// Validate an optional resource identifier against the collection's key
/// kind. Integer identifiers must be positive.
///
/// ```
/// use pagekit::KeyKind;
/// use pagekit::sanitize::sanitize_identifier;
/// use serde_json::json;
///
/// let id = sanitize_identifier("postId", Some(&json!("42")), KeyKind::Int).unwrap();
/// assert_eq!(id, Some(pagekit::Value::Int(42)));
/// assert!(sanitize_identifier("postId", Some(&json!("0")), KeyKind::Int).is_err());
/// ```
pub fn sanitize_identifier(
    field: &str,
    raw: Option<&Json>,
    kind: KeyKind,
) -> Result<Option<Value>, ValidationError> {
    let invalid = |value: String| ValidationError::InvalidIdentifier {
        field: field.to_string(),
        value,
        expected: kind,
    };

    if kind == KeyKind::Int {
        return match parse_int(field, raw) {
            Ok(Some(id)) if id > 0 => Ok(Some(Value::Int(id))),
            Ok(Some(id)) => Err(invalid(id.to_string())),
            Ok(None) => Ok(None),
            Err(ValidationError::NotAnInteger { value, .. }) => Err(invalid(value)),
            Err(err) => Err(err),
        };
    }

    match raw {
        None | Some(Json::Null) => Ok(None),
        Some(Json::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Json::String(s)) => parse_scalar(field, kind, s.trim())
            .map(Some)
            .map_err(|_| invalid(s.clone())),
        Some(other) => Err(invalid(other.to_string())),
    }
}

/// Validate an optional value against an enumerated set.
///
/// Matching ignores ASCII case; the canonical spelling from `allowed` is
/// returned.
///
/// ```
/// use pagekit::sanitize::sanitize_choice;
/// use serde_json::json;
///
/// const STATUSES: &[&str] = &["PENDING", "RESOLVED"];
/// let status = sanitize_choice("status", Some(&json!("pending")), STATUSES).unwrap();
/// assert_eq!(status, Some("PENDING"));
/// assert!(sanitize_choice("status", Some(&json!("LOST")), STATUSES).is_err());
/// ```
pub fn sanitize_choice<'a>(
    field: &str,
    raw: Option<&Json>,
    allowed: &[&'a str],
) -> Result<Option<&'a str>, ValidationError> {
    let value = match raw {
        None | Some(Json::Null) => return Ok(None),
        Some(Json::String(s)) if s.trim().is_empty() => return Ok(None),
        Some(Json::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string(),
    };
    allowed
        .iter()
        .find(|choice| choice.eq_ignore_ascii_case(&value))
        .map(|choice| Some(*choice))
        .ok_or_else(|| ValidationError::NotAllowed {
            field: field.to_string(),
            value,
            allowed: allowed.iter().map(|s| (*s).to_string()).collect(),
        })
}
