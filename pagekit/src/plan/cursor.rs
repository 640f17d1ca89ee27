//! Cursor-mode (keyset) page plans.

use super::envelope::CursorEnvelope;
use crate::config::PageLimits;
use crate::cursor::{self, CursorError, CursorPosition, SortKey};
use crate::predicate::Predicate;
use crate::query::{QueryDescriptor, Seek};
use crate::{Row, ValidationError};

/// Where a cursor listing starts.
#[derive(Debug, Clone, PartialEq)]
pub enum CursorState {
    /// No cursor: start at the top of the ordering.
    FirstPage,
    /// Resume after the row the cursor was minted from.
    SubsequentPage(CursorPosition),
}

/// A planned cursor page.
///
/// One extra row is always requested; its presence is how the next page is
/// detected, so no count query is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorPlan {
    key: SortKey,
    limit: u32,
    state: CursorState,
}

impl CursorPlan {
    /// Plan a page from the client's `limit` and `cursor`.
    ///
    /// A blank cursor means the first page. Any other cursor must decode
    /// for `key`.
    pub fn new(
        key: SortKey,
        limits: &PageLimits,
        limit: Option<i64>,
        cursor: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let limit = limits.resolve(limit)?;
        let state = match cursor {
            Some(token) if !token.trim().is_empty() => {
                CursorState::SubsequentPage(cursor::decode(token, &key)?)
            },
            _ => CursorState::FirstPage,
        };
        Ok(Self { key, limit, state })
    }

    /// Page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to request from the repository.
    #[must_use]
    pub const fn fetch_size(&self) -> u32 {
        self.limit.saturating_add(1)
    }

    /// Ordering, tie-breaker included.
    #[must_use]
    pub const fn key(&self) -> &SortKey {
        &self.key
    }

    /// Start state.
    #[must_use]
    pub const fn state(&self) -> &CursorState {
        &self.state
    }

    /// Whether this plan starts at the top of the ordering.
    #[must_use]
    pub const fn is_first_page(&self) -> bool {
        matches!(self.state, CursorState::FirstPage)
    }

    /// Build the repository query for `predicate`.
    #[must_use]
    pub fn query(&self, predicate: Predicate) -> QueryDescriptor {
        QueryDescriptor {
            predicate,
            order_by: self.key.clone(),
            take: self.fetch_size(),
            skip: 0,
            seek: match &self.state {
                CursorState::FirstPage => None,
                CursorState::SubsequentPage(position) => Some(Seek {
                    position: position.clone(),
                    skip: 1,
                }),
            },
        }
    }

    /// Trim the fetched rows to the page size and mint the next cursor from
    /// the last row kept.
    pub fn finish<T: Row>(&self, mut rows: Vec<T>) -> Result<(Vec<T>, CursorEnvelope), CursorError> {
        let limit = self.limit as usize;
        let has_more = rows.len() > limit;
        rows.truncate(limit);
        let next_cursor = if has_more {
            rows.last()
                .map(|row| cursor::encode(row, &self.key))
                .transpose()?
        } else {
            None
        };
        Ok((
            rows,
            CursorEnvelope {
                has_more,
                next_cursor,
            },
        ))
    }
}
