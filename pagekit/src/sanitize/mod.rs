//! Sanitizers for untrusted listing parameters.
//!
//! Each function takes the raw JSON value of one query parameter (as
//! deserialized into [`ListQuery`](crate::ListQuery)) and returns a typed,
//! normalized value or a [`ValidationError`](crate::ValidationError).
//! Nothing here touches a repository.
//!
//! | Parameter      | Sanitizer                   |
//! |----------------|-----------------------------|
//! | `search`       | [`sanitize_search_term`]    |
//! | `tagIds`       | [`sanitize_tag_ids`]        |
//! | `postId` etc.  | [`sanitize_identifier`]     |
//! | `status`       | [`sanitize_choice`]         |
//! | `limit`/`page` | [`parse_int`]               |

mod exclusive;
mod params;
mod search;
mod tags;

pub use exclusive::{ExclusivePair, sanitize_exclusive_pair};
pub use params::{parse_int, sanitize_choice, sanitize_identifier};
pub use search::{SearchPolicy, SearchTerm, escape_like, sanitize_search_term};
pub use tags::sanitize_tag_ids;

use serde_json::Value as Json;

pub(crate) const fn json_type(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
