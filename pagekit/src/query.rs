//! The storage-facing side of a listing.
//!
//! A planned page becomes a [`QueryDescriptor`]; a [`Repository`] turns it
//! into rows. [`paginate`] runs the whole round trip for one plan.

use async_trait::async_trait;

use crate::assemble::PageResult;
use crate::cursor::{CursorPosition, SortKey};
use crate::error::{RepositoryError, Result};
use crate::plan::PagePlan;
use crate::predicate::Predicate;
use crate::Row;

/// Keyset start position for cursor listings.
///
/// Rows sort at or after `position` under the query's order; then up to
/// `skip` rows whose key equals `position` exactly are dropped. With
/// `skip = 1` this resumes right after the row the cursor was minted from,
/// and still works when that row has since been deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct Seek {
    /// Key values of the last row already delivered.
    pub position: CursorPosition,
    /// Rows equal to `position` to drop.
    pub skip: u32,
}

/// Everything a repository needs to fetch one page.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    /// Row filter.
    pub predicate: Predicate,
    /// Ordering; always ends in a unique field.
    pub order_by: SortKey,
    /// Maximum rows to return.
    pub take: u32,
    /// Rows to skip before taking (offset listings).
    pub skip: u64,
    /// Keyset start (cursor listings after the first page).
    pub seek: Option<Seek>,
}

/// Data access used by listings.
///
/// Implementations must apply `predicate`, `order_by`, `seek`, `skip` and
/// `take` in that order. Errors are passed through untouched.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Row type returned by [`find_many`](Repository::find_many).
    type Row: Row + Send;

    /// Fetch one page of rows.
    async fn find_many(&self, query: &QueryDescriptor) -> Result<Vec<Self::Row>, RepositoryError>;

    /// Count every row matching `predicate`.
    async fn count(&self, predicate: &Predicate) -> Result<u64, RepositoryError>;

    /// Whether any row matches `predicate`.
    async fn exists(&self, predicate: &Predicate) -> Result<bool, RepositoryError> {
        Ok(self.count(predicate).await? > 0)
    }
}

/// Execute `plan` against `repo` and assemble the page.
///
/// Offset plans issue the row fetch and the count concurrently.
pub async fn paginate<R: Repository>(
    repo: &R,
    plan: &PagePlan,
    predicate: Predicate,
) -> Result<PageResult<R::Row>> {
    match plan {
        PagePlan::Cursor(cursor) => {
            let query = cursor.query(predicate);
            let rows = repo.find_many(&query).await?;
            tracing::debug!(
                fetched = rows.len(),
                limit = cursor.limit(),
                first_page = cursor.is_first_page(),
                "cursor page fetched"
            );
            let (data, envelope) = cursor.finish(rows).map_err(crate::Error::Cursor)?;
            Ok(PageResult::new(data, envelope.into()))
        },
        PagePlan::Offset(offset) => {
            let query = offset.query(predicate);
            let (rows, total) =
                futures::try_join!(repo.find_many(&query), repo.count(&query.predicate))?;
            tracing::debug!(
                fetched = rows.len(),
                total,
                page = offset.page(),
                limit = offset.limit(),
                "offset page fetched"
            );
            let (data, envelope) = offset.finish(rows, total);
            Ok(PageResult::new(data, envelope.into()))
        },
    }
}
