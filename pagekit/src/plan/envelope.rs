//! Pagination metadata returned alongside a page.

use serde::Serialize;

use crate::CursorToken;

/// Cursor-mode pagination metadata.
///
/// `nextCursor` is `null` on the last page and present otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorEnvelope {
    /// Whether another page exists.
    pub has_more: bool,
    /// Token for the next page, `None` on the last page.
    pub next_cursor: Option<CursorToken>,
}

/// Offset-mode pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OffsetEnvelope {
    /// Rows matching the filter across all pages.
    pub total: u64,
    /// Requested page, 1-based.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// `ceil(total / limit)`; 0 when nothing matches.
    pub total_pages: u64,
    /// `page < total_pages`.
    pub has_next: bool,
    /// `page > 1`.
    pub has_previous: bool,
}

/// Either kind of pagination metadata, serialized without a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum PaginationEnvelope {
    /// Cursor listing.
    Cursor(CursorEnvelope),
    /// Offset listing.
    Offset(OffsetEnvelope),
}

impl PaginationEnvelope {
    /// Whether another page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        match self {
            Self::Cursor(c) => c.has_more,
            Self::Offset(o) => o.has_next,
        }
    }

    /// The cursor form, if this is one.
    #[must_use]
    pub const fn as_cursor(&self) -> Option<&CursorEnvelope> {
        match self {
            Self::Cursor(c) => Some(c),
            Self::Offset(_) => None,
        }
    }

    /// The offset form, if this is one.
    #[must_use]
    pub const fn as_offset(&self) -> Option<&OffsetEnvelope> {
        match self {
            Self::Offset(o) => Some(o),
            Self::Cursor(_) => None,
        }
    }
}

impl From<CursorEnvelope> for PaginationEnvelope {
    fn from(envelope: CursorEnvelope) -> Self {
        Self::Cursor(envelope)
    }
}

impl From<OffsetEnvelope> for PaginationEnvelope {
    fn from(envelope: OffsetEnvelope) -> Self {
        Self::Offset(envelope)
    }
}
