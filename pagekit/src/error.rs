//! Error types for pagination and filtering.
//!
//! Every rejection of untrusted input is a [`ValidationError`], raised
//! before a repository is touched. [`Error`] adds the two other kinds a
//! listing can fail with, and [`Error::kind`] is what the HTTP layer maps
//! to a status code.

use std::fmt;

use crate::cursor::{CursorError, KeyKind};
use crate::predicate::Operator;

/// Rejected pagination or filter input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// The `cursor` parameter could not be decoded for the listing's key.
    #[error("invalid cursor: {0}")]
    InvalidCursor(#[from] CursorError),

    /// `limit` outside the listing's allowed range.
    #[error("limit must be between {min} and {max}, got {value}")]
    Limit {
        /// The requested limit.
        value: i64,
        /// Smallest accepted limit.
        min: u32,
        /// Largest accepted limit.
        max: u32,
    },

    /// `page` below 1 or above `u32::MAX`.
    #[error("page must be between 1 and {}, got {value}", u32::MAX)]
    Page {
        /// The requested page.
        value: i64,
    },

    /// A parameter that must be an integer was something else.
    #[error("`{field}` must be an integer, got `{value}`")]
    NotAnInteger {
        /// The parameter.
        field: String,
        /// The raw value received.
        value: String,
    },

    /// An identifier that does not match the collection's key kind.
    #[error("`{field}` must be a valid {expected} identifier, got `{value}`")]
    InvalidIdentifier {
        /// The parameter.
        field: String,
        /// The raw value received.
        value: String,
        /// Kind of identifier the collection uses.
        expected: KeyKind,
    },

    /// More tag ids supplied than the listing accepts.
    #[error("at most {max} tag ids are allowed, got {supplied}")]
    TooManyTagIds {
        /// Maximum number of tag ids.
        max: usize,
        /// Number of tokens supplied.
        supplied: usize,
    },

    /// `tagIds` was neither a comma-separated string nor a list.
    #[error("`tagIds` must be a comma-separated list, got {found}")]
    TagIdsNotList {
        /// JSON type received.
        found: &'static str,
    },

    /// `search` was present but not a string.
    #[error("`search` must be a string, got {found}")]
    SearchTermNotString {
        /// JSON type received.
        found: &'static str,
    },

    /// `search` longer than allowed.
    #[error("`search` must be at most {max} characters, got {len}")]
    SearchTermTooLong {
        /// Maximum length in characters.
        max: usize,
        /// Length of the trimmed term.
        len: usize,
    },

    /// A search request with neither a term nor any other filter.
    #[error("a search term or at least one other filter is required")]
    MissingSearchCriteria,

    /// Both members of a mutually exclusive pair were supplied.
    #[error("only one of `{first}` or `{second}` may be provided")]
    ExclusiveBoth {
        /// First member of the pair.
        first: String,
        /// Second member of the pair.
        second: String,
    },

    /// Neither member of a mutually exclusive pair was supplied.
    #[error("one of `{first}` or `{second}` is required")]
    ExclusiveNeither {
        /// First member of the pair.
        first: String,
        /// Second member of the pair.
        second: String,
    },

    /// A resource identifier of one kind combined with the other kind's
    /// discriminator, e.g. `type=comment&postId=…`.
    #[error("`{field}` cannot be combined with `{discriminator}={kind}`")]
    ScopeConflict {
        /// The identifier parameter.
        field: String,
        /// The discriminator parameter.
        discriminator: String,
        /// Resource kind named by the discriminator.
        kind: String,
    },

    /// A value outside an enumerated set (e.g. report status).
    #[error("`{field}` must be one of {}, got `{value}`", allowed.join(", "))]
    NotAllowed {
        /// The parameter.
        field: String,
        /// The raw value received.
        value: String,
        /// Accepted values, canonical spelling.
        allowed: Vec<String>,
    },

    /// A composed predicate touches a field the listing does not expose.
    #[error("field `{field}` is not filterable, allowed fields: {}", allowed.join(", "))]
    FieldNotAllowed {
        /// The field that was not allowed.
        field: String,
        /// The list of allowed fields.
        allowed: Vec<String>,
    },

    /// A composed predicate uses an operator the listing denies.
    #[error("operator `{operator:?}` is denied for field `{field}`")]
    OperatorDenied {
        /// The operator that was denied.
        operator: Operator,
        /// The field the operator was used on.
        field: String,
    },

    /// Predicate nesting depth exceeds maximum.
    #[error("filter nesting depth {actual} exceeds maximum {max}")]
    NestingTooDeep {
        /// The maximum allowed nesting depth.
        max: usize,
        /// The actual nesting depth encountered.
        actual: usize,
    },

    /// Too many value nodes in a predicate.
    #[error("filter contains too many value nodes (max {max})")]
    TooManyNodes {
        /// The maximum allowed node count.
        max: usize,
    },
}

impl ValidationError {
    /// Name of the request parameter at fault, when there is a single one.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidCursor(_) => Some("cursor"),
            Self::Limit { .. } => Some("limit"),
            Self::Page { .. } => Some("page"),
            Self::TooManyTagIds { .. } | Self::TagIdsNotList { .. } => Some("tagIds"),
            Self::SearchTermNotString { .. } | Self::SearchTermTooLong { .. } => Some("search"),
            Self::NotAnInteger { field, .. }
            | Self::InvalidIdentifier { field, .. }
            | Self::ScopeConflict { field, .. }
            | Self::NotAllowed { field, .. }
            | Self::FieldNotAllowed { field, .. }
            | Self::OperatorDenied { field, .. } => Some(field),
            Self::MissingSearchCriteria
            | Self::ExclusiveBoth { .. }
            | Self::ExclusiveNeither { .. }
            | Self::NestingTooDeep { .. }
            | Self::TooManyNodes { .. } => None,
        }
    }
}

/// Opaque failure reported by a repository.
///
/// Never interpreted by this crate; it reaches the caller unchanged.
#[derive(Debug)]
pub struct RepositoryError(Box<dyn std::error::Error + Send + Sync + 'static>);

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for RepositoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl RepositoryError {
    /// Wrap a storage error.
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self(source.into())
    }

    /// The wrapped error.
    #[must_use]
    pub fn into_inner(self) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self.0
    }
}

/// Error returned by listing operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Rejected input.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The parent of a scoped listing does not exist.
    #[error("{resource} `{id}` not found")]
    NotFound {
        /// Kind of the missing resource.
        resource: &'static str,
        /// Identifier as supplied.
        id: String,
    },

    /// Failure reported by the repository, passed through.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// A row returned by the repository has no usable value for a sort-key
    /// field, so no cursor can be minted for it.
    #[error("cannot build next cursor: {0}")]
    Cursor(#[source] CursorError),
}

impl From<CursorError> for Error {
    fn from(err: CursorError) -> Self {
        Self::Validation(ValidationError::InvalidCursor(err))
    }
}

/// Coarse classification used to pick an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input (400).
    Validation,
    /// Missing parent resource (404).
    NotFound,
    /// Storage or internal failure (500).
    Upstream,
}

impl Error {
    /// Classification for status mapping.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Repository(_) | Self::Cursor(_) => ErrorKind::Upstream,
        }
    }

    /// The validation error, if this is one.
    #[must_use]
    pub const fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

/// Result alias for listing operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let validation = Error::from(ValidationError::Page { value: 0 });
        assert_eq!(validation.kind(), ErrorKind::Validation);

        let missing = Error::NotFound {
            resource: "comment",
            id: "42".into(),
        };
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert_eq!(missing.to_string(), "comment `42` not found");

        let upstream = Error::from(RepositoryError::new("connection reset"));
        assert_eq!(upstream.kind(), ErrorKind::Upstream);
        assert_eq!(upstream.to_string(), "connection reset");
    }

    #[test]
    fn test_cursor_error_is_validation() {
        let err = Error::from(CursorError::InvalidBase64);
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.as_validation().and_then(ValidationError::field), Some("cursor"));
    }

    #[test]
    fn test_messages() {
        let err = ValidationError::TooManyTagIds {
            max: 10,
            supplied: 11,
        };
        assert_eq!(err.to_string(), "at most 10 tag ids are allowed, got 11");

        let err = ValidationError::NotAllowed {
            field: "status".into(),
            value: "LOST".into(),
            allowed: vec!["PENDING".into(), "RESOLVED".into()],
        };
        assert_eq!(
            err.to_string(),
            "`status` must be one of PENDING, RESOLVED, got `LOST`"
        );
        assert_eq!(err.field(), Some("status"));
    }
}
