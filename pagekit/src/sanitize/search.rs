//! Free-text search terms.

use serde_json::Value as Json;

use super::json_type;
use crate::ValidationError;
use crate::predicate::LIKE_ESCAPE;

/// A trimmed, non-empty search term.
///
/// Keeps both the literal text (echoed back in search metadata) and the
/// escaped pattern used by [`Operator::Contains`](crate::Operator::Contains).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    text: String,
    pattern: String,
}

impl SearchTerm {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            pattern: escape_like(text),
        }
    }

    /// The trimmed term as the user typed it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The term with pattern metacharacters escaped.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Whether a listing can run without a search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPolicy {
    /// An absent term simply means "no text filter".
    Optional,
    /// A term is required unless some other filter narrows the listing.
    Required {
        /// Whether another filter (e.g. tags) is present.
        other_filters: bool,
    },
}

/// Escape `%`, `_` and the escape character so the text matches literally.
///
/// ```
/// use pagekit::sanitize::escape_like;
///
/// assert_eq!(escape_like("50%_off"), r"50\%\_off");
/// ```
#[must_use]
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

/// Clean the raw `search` parameter.
///
/// Surrounding whitespace is removed; a term that is empty afterwards counts
/// as absent. Absent terms are fine under [`SearchPolicy::Optional`] and
/// under `Required` when another filter is present.
pub fn sanitize_search_term(
    raw: Option<&Json>,
    policy: SearchPolicy,
    max_chars: usize,
) -> Result<Option<SearchTerm>, ValidationError> {
    let text = match raw {
        None | Some(Json::Null) => "",
        Some(Json::String(s)) => s.trim(),
        Some(other) => {
            return Err(ValidationError::SearchTermNotString {
                found: json_type(other),
            });
        },
    };

    if text.is_empty() {
        return match policy {
            SearchPolicy::Required {
                other_filters: false,
            } => Err(ValidationError::MissingSearchCriteria),
            _ => Ok(None),
        };
    }

    let len = text.chars().count();
    if len > max_chars {
        return Err(ValidationError::SearchTermTooLong {
            max: max_chars,
            len,
        });
    }
    Ok(Some(SearchTerm::new(text)))
}
