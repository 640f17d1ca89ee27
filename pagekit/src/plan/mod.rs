//! Page planning.
//!
//! A listing fixes its [`PageMode`], [`PageLimits`] and [`SortKey`]; the
//! client supplies a [`PaginationRequest`]. [`PagePlan::new`] validates the
//! request and yields everything needed to query a repository and to shape
//! the response metadata.

mod cursor;
mod envelope;
mod offset;

pub use cursor::{CursorPlan, CursorState};
pub use envelope::{CursorEnvelope, OffsetEnvelope, PaginationEnvelope};
pub use offset::OffsetPlan;

use serde_json::Value as Json;

use crate::config::PageLimits;
use crate::cursor::{CursorError, SortKey};
use crate::predicate::Predicate;
use crate::query::QueryDescriptor;
use crate::sanitize::parse_int;
use crate::ValidationError;

/// How a listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageMode {
    /// Keyset pagination with opaque cursors; no totals.
    Cursor,
    /// Page numbers with total counts.
    Offset,
}

/// The client's pagination parameters, parsed but not yet validated
/// against a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationRequest {
    /// Requested page size.
    pub limit: Option<i64>,
    /// Cursor from a previous page (cursor mode).
    pub cursor: Option<String>,
    /// Requested page number (offset mode).
    pub page: Option<i64>,
}

impl PaginationRequest {
    /// Parse the raw `limit`, `cursor` and `page` parameters.
    ///
    /// Numeric cursors (bare integer keys sent as JSON numbers) are
    /// accepted as their decimal text.
    pub fn parse(
        limit: Option<&Json>,
        cursor: Option<&Json>,
        page: Option<&Json>,
    ) -> Result<Self, ValidationError> {
        let cursor = match cursor {
            None | Some(Json::Null) => None,
            Some(Json::String(s)) => Some(s.clone()),
            Some(Json::Number(n)) => Some(n.to_string()),
            Some(_) => return Err(CursorError::InvalidFormat.into()),
        };
        Ok(Self {
            limit: parse_int("limit", limit)?,
            cursor,
            page: parse_int("page", page)?,
        })
    }
}

/// A validated page request, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum PagePlan {
    /// Cursor-mode plan.
    Cursor(CursorPlan),
    /// Offset-mode plan.
    Offset(OffsetPlan),
}

impl PagePlan {
    /// Validate `request` for a listing.
    ///
    /// Parameters belonging to the other mode (a `page` on a cursor listing,
    /// a `cursor` on an offset listing) are ignored.
    ///
    /// ```
    /// use pagekit::{KeyKind, PageLimits, PageMode, PagePlan, PaginationRequest, SortDir, SortKey};
    ///
    /// let key = SortKey::by("id", KeyKind::Int, SortDir::Desc);
    /// let request = PaginationRequest { limit: Some(5), ..Default::default() };
    /// let plan = PagePlan::new(PageMode::Cursor, &request, &PageLimits::FEED, key).unwrap();
    /// assert_eq!(plan.limit(), 5);
    /// ```
    pub fn new(
        mode: PageMode,
        request: &PaginationRequest,
        limits: &PageLimits,
        key: SortKey,
    ) -> Result<Self, ValidationError> {
        match mode {
            PageMode::Cursor => {
                if request.page.is_some() {
                    tracing::debug!(page = ?request.page, "ignoring page on cursor listing");
                }
                CursorPlan::new(key, limits, request.limit, request.cursor.as_deref())
                    .map(Self::Cursor)
            },
            PageMode::Offset => {
                if request.cursor.is_some() {
                    tracing::debug!("ignoring cursor on offset listing");
                }
                OffsetPlan::new(key, limits, request.limit, request.page).map(Self::Offset)
            },
        }
    }

    /// The plan's mode.
    #[must_use]
    pub const fn mode(&self) -> PageMode {
        match self {
            Self::Cursor(_) => PageMode::Cursor,
            Self::Offset(_) => PageMode::Offset,
        }
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        match self {
            Self::Cursor(plan) => plan.limit(),
            Self::Offset(plan) => plan.limit(),
        }
    }

    /// Build the repository query for `predicate`.
    #[must_use]
    pub fn query(&self, predicate: Predicate) -> QueryDescriptor {
        match self {
            Self::Cursor(plan) => plan.query(predicate),
            Self::Offset(plan) => plan.query(predicate),
        }
    }
}
