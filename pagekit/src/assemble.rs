//! Page results as returned to clients.

use serde::Serialize;

use crate::plan::PaginationEnvelope;
use crate::sanitize::SearchTerm;

/// Summary of the filters applied to a search, for client display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
    /// The sanitized term, `None` for tag-only searches.
    pub search_term: Option<String>,
    /// Items on this page.
    pub results_found: usize,
    /// Requested page size.
    pub current_page_size: u32,
}

/// One page of items plus its pagination metadata.
///
/// Serializes as `{ data, pagination, meta? }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageResult<T> {
    /// Items on this page, in listing order.
    pub data: Vec<T>,
    /// Cursor or offset metadata.
    pub pagination: PaginationEnvelope,
    /// Search summary, present on search listings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<SearchMeta>,
}

impl<T> PageResult<T> {
    /// A page without search metadata.
    pub const fn new(data: Vec<T>, pagination: PaginationEnvelope) -> Self {
        Self {
            data,
            pagination,
            meta: None,
        }
    }

    /// Attach search metadata describing this page.
    #[must_use]
    pub fn with_search_meta(mut self, term: Option<&SearchTerm>, page_size: u32) -> Self {
        self.meta = Some(SearchMeta {
            search_term: term.map(|t| t.as_str().to_string()),
            results_found: self.data.len(),
            current_page_size: page_size,
        });
        self
    }

    /// Convert every item, keeping the metadata.
    ///
    /// ```
    /// use pagekit::{CursorEnvelope, PageResult};
    ///
    /// let page = PageResult::new(vec![1, 2], CursorEnvelope { has_more: false, next_cursor: None }.into());
    /// let page = page.map(|n| n * 10);
    /// assert_eq!(page.data, vec![10, 20]);
    /// ```
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
            meta: self.meta,
        }
    }

    /// Number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
