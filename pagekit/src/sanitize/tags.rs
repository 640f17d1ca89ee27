//! Tag id lists.

use serde_json::Value as Json;

use super::json_type;
use crate::ValidationError;

/// Clean the raw `tagIds` parameter.
///
/// Accepts a comma-separated string (`"1,2,3"`) or a list whose items are
/// numbers or such strings (repeated query keys). Tokens that are not
/// positive integers are dropped silently, as are duplicates; the first
/// occurrence wins and order is preserved.
///
/// The cap is checked twice: against the raw token count before any
/// filtering, and against the surviving ids.
///
/// ```
/// use pagekit::sanitize::sanitize_tag_ids;
/// use serde_json::json;
///
/// let ids = sanitize_tag_ids(Some(&json!("1,-2,0,3,3")), 10).unwrap();
/// assert_eq!(ids, vec![1, 3]);
/// ```
pub fn sanitize_tag_ids(raw: Option<&Json>, max: usize) -> Result<Vec<i64>, ValidationError> {
    let tokens = tokens(raw)?;
    if tokens.len() > max {
        return Err(ValidationError::TooManyTagIds {
            max,
            supplied: tokens.len(),
        });
    }

    let mut ids: Vec<i64> = Vec::with_capacity(tokens.len());
    for token in &tokens {
        let Ok(id) = token.parse::<i64>() else {
            continue;
        };
        if id > 0 && !ids.contains(&id) {
            ids.push(id);
        }
    }

    if ids.len() > max {
        return Err(ValidationError::TooManyTagIds {
            max,
            supplied: ids.len(),
        });
    }
    Ok(ids)
}

fn tokens(raw: Option<&Json>) -> Result<Vec<String>, ValidationError> {
    fn split(s: &str, out: &mut Vec<String>) {
        if s.trim().is_empty() {
            return;
        }
        out.extend(s.split(',').map(|t| t.trim().to_string()));
    }

    let mut out = Vec::new();
    match raw {
        None | Some(Json::Null) => {},
        Some(Json::String(s)) => split(s, &mut out),
        Some(Json::Number(n)) => out.push(n.to_string()),
        Some(Json::Array(items)) => {
            for item in items {
                match item {
                    Json::String(s) => split(s, &mut out),
                    Json::Number(n) => out.push(n.to_string()),
                    // Counted toward the cap, then dropped as unparsable.
                    other => out.push(other.to_string()),
                }
            }
        },
        Some(other) => {
            return Err(ValidationError::TagIdsNotList {
                found: json_type(other),
            });
        },
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_or_blank() {
        assert_eq!(sanitize_tag_ids(None, 10), Ok(vec![]));
        assert_eq!(sanitize_tag_ids(Some(&json!("")), 10), Ok(vec![]));
        assert_eq!(sanitize_tag_ids(Some(&json!(null)), 10), Ok(vec![]));
    }

    #[test]
    fn test_drops_invalid_tokens() {
        let ids = sanitize_tag_ids(Some(&json!("4, abc, 1.5, ,7, -1")), 10).unwrap();
        assert_eq!(ids, vec![4, 7]);
    }

    #[test]
    fn test_list_input() {
        let ids = sanitize_tag_ids(Some(&json!([3, "5", "5,6", true])), 10).unwrap();
        assert_eq!(ids, vec![3, 5, 6]);
    }

    #[test]
    fn test_raw_count_checked_before_filtering() {
        // Eleven tokens, only one of them valid.
        let raw = json!("1,x,x,x,x,x,x,x,x,x,x");
        assert_eq!(
            sanitize_tag_ids(Some(&raw), 10),
            Err(ValidationError::TooManyTagIds {
                max: 10,
                supplied: 11
            })
        );
    }

    #[test]
    fn test_exactly_at_cap() {
        let raw = json!("1,2,3,4,5,6,7,8,9,10");
        assert_eq!(sanitize_tag_ids(Some(&raw), 10).unwrap().len(), 10);
    }

    #[test]
    fn test_rejects_objects() {
        assert_eq!(
            sanitize_tag_ids(Some(&json!({"a": 1})), 10),
            Err(ValidationError::TagIdsNotList { found: "object" })
        );
    }
}
