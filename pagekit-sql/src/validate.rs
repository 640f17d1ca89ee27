//! Identifier validation and quoting.

use crate::RenderError;

/// Maximum length for SQL identifiers (`PostgreSQL` limit is 63).
const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Whether `s` is a safe SQL identifier.
///
/// A valid identifier starts with an ASCII letter or underscore, continues
/// with letters, digits or underscores, and is 1-63 bytes long. Case is
/// kept, so `createdAt` is accepted and later quoted as `"createdAt"`.
///
/// ```
/// use pagekit_sql::is_valid_identifier;
///
/// assert!(is_valid_identifier("posts"));
/// assert!(is_valid_identifier("createdAt"));
/// assert!(is_valid_identifier("_private"));
///
/// assert!(!is_valid_identifier(""));
/// assert!(!is_valid_identifier("123abc"));
/// assert!(!is_valid_identifier("user.id"));
/// assert!(!is_valid_identifier("x\"; DROP"));
/// ```
#[inline]
#[must_use]
pub fn is_valid_identifier(s: &str) -> bool {
    if s.is_empty() || s.len() > MAX_IDENTIFIER_LENGTH {
        return false;
    }

    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {},
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate `name` and wrap it in double quotes.
pub(crate) fn quote(name: &str) -> Result<String, RenderError> {
    if is_valid_identifier(name) {
        Ok(format!("\"{name}\""))
    } else {
        Err(RenderError::InvalidIdentifier(name.to_string()))
    }
}

/// `"table"."column"`, both parts validated.
pub(crate) fn qualified(table: &str, column: &str) -> Result<String, RenderError> {
    Ok(format!("{}.{}", quote(table)?, quote(column)?))
}
