//! Mutually exclusive parameter pairs.

use crate::ValidationError;

/// Which member of an exclusive pair was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusivePair<T> {
    /// Only the first parameter was present.
    First(T),
    /// Only the second parameter was present.
    Second(T),
}

impl<T> ExclusivePair<T> {
    /// The supplied value, whichever side it came from.
    pub fn into_inner(self) -> T {
        match self {
            Self::First(v) | Self::Second(v) => v,
        }
    }
}

/// Require exactly one of two parameters.
///
/// ```
/// use pagekit::sanitize::{ExclusivePair, sanitize_exclusive_pair};
///
/// let pair = sanitize_exclusive_pair(("postId", Some(4)), ("commentId", None)).unwrap();
/// assert_eq!(pair, ExclusivePair::First(4));
/// assert!(sanitize_exclusive_pair::<i64>(("postId", None), ("commentId", None)).is_err());
/// ```
pub fn sanitize_exclusive_pair<T>(
    first: (&str, Option<T>),
    second: (&str, Option<T>),
) -> Result<ExclusivePair<T>, ValidationError> {
    let (first_name, first) = first;
    let (second_name, second) = second;
    match (first, second) {
        (Some(v), None) => Ok(ExclusivePair::First(v)),
        (None, Some(v)) => Ok(ExclusivePair::Second(v)),
        (Some(_), Some(_)) => Err(ValidationError::ExclusiveBoth {
            first: first_name.to_string(),
            second: second_name.to_string(),
        }),
        (None, None) => Err(ValidationError::ExclusiveNeither {
            first: first_name.to_string(),
            second: second_name.to_string(),
        }),
    }
}
