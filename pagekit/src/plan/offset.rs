//! Offset-mode (page number) page plans.

use super::envelope::OffsetEnvelope;
use crate::config::{Overflow, PageLimits};
use crate::cursor::SortKey;
use crate::predicate::Predicate;
use crate::query::QueryDescriptor;
use crate::ValidationError;

/// A planned offset page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetPlan {
    key: SortKey,
    page: u32,
    limit: u32,
}

impl OffsetPlan {
    /// Plan a page from the client's `limit` and `page`.
    ///
    /// Out-of-range limits are always rejected here, whatever the listing's
    /// overflow policy; a missing page means page 1, and a page outside
    /// `1..=u32::MAX` is rejected.
    pub fn new(
        key: SortKey,
        limits: &PageLimits,
        limit: Option<i64>,
        page: Option<i64>,
    ) -> Result<Self, ValidationError> {
        let strict = PageLimits {
            overflow: Overflow::Reject,
            ..*limits
        };
        let limit = strict.resolve(limit)?;
        let page = match page {
            None => 1,
            Some(value) => u32::try_from(value)
                .ok()
                .filter(|p| *p >= 1)
                .ok_or(ValidationError::Page { value })?,
        };
        Ok(Self { key, page, limit })
    }

    /// Requested page, 1-based.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Ordering.
    #[must_use]
    pub const fn key(&self) -> &SortKey {
        &self.key
    }

    /// Rows before this page: `(page - 1) * limit`.
    #[must_use]
    pub fn skip(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Build the repository query for `predicate`.
    #[must_use]
    pub fn query(&self, predicate: Predicate) -> QueryDescriptor {
        QueryDescriptor {
            predicate,
            order_by: self.key.clone(),
            take: self.limit,
            skip: self.skip(),
            seek: None,
        }
    }

    /// Pagination metadata for `total` matching rows.
    #[must_use]
    pub fn envelope(&self, total: u64) -> OffsetEnvelope {
        let total_pages = total.div_ceil(u64::from(self.limit));
        OffsetEnvelope {
            total,
            page: self.page,
            limit: self.limit,
            total_pages,
            has_next: u64::from(self.page) < total_pages,
            has_previous: self.page > 1,
        }
    }

    /// Cap the fetched rows at the page size and build the metadata.
    pub fn finish<T>(&self, mut rows: Vec<T>, total: u64) -> (Vec<T>, OffsetEnvelope) {
        rows.truncate(self.limit as usize);
        (rows, self.envelope(total))
    }
}
