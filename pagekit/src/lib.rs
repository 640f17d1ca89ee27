// =============================================================================
// CRATE-LEVEL QUALITY LINTS
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Field names in docs
#![allow(clippy::module_name_repetitions)] // CursorError in cursor, etc.
#![allow(clippy::return_self_not_must_use)] // Composer builder methods
#![allow(clippy::cast_possible_truncation)] // u32 page sizes into usize
#![allow(clippy::cast_precision_loss)] // Int/Float comparisons in Value

//! # pagekit - Cursor and Offset Pagination with Composable Filters
//!
//! The paging layer of a forum backend: it turns untrusted query
//! parameters into a validated filter predicate and page plan, hands both to
//! a [`Repository`], and shapes the rows into a [`PageResult`].
//!
//! ```text
//! ListQuery ──► sanitize ──► Composer ──► PredicateGuard ─┐
//!     │                                                   ├─► QueryDescriptor ──► Repository
//!     └──────► PaginationRequest ──► PagePlan ────────────┘                           │
//!                                       ▲                                             │
//!                                       └──── finish (cursor / envelope) ◄──── rows ──┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use pagekit::prelude::*;
//! use serde_json::json;
//!
//! let repo = MemoryRepository::new(
//!     (1..=6)
//!         .map(|id| json!({ "id": id, "title": format!("post {id}") }))
//!         .collect(),
//! );
//!
//! let key = SortKey::by("id", KeyKind::Int, SortDir::Desc);
//! let request = PaginationRequest { limit: Some(5), ..Default::default() };
//! let plan = PagePlan::new(PageMode::Cursor, &request, &PageLimits::FEED, key).unwrap();
//!
//! let page = futures::executor::block_on(paginate(&repo, &plan, Predicate::All)).unwrap();
//! assert_eq!(page.data.len(), 5);
//! let envelope = page.pagination.as_cursor().unwrap();
//! assert!(envelope.has_more);
//! assert_eq!(envelope.next_cursor, Some(CursorToken::Int(2)));
//! ```
//!
//! ## Cursor Tokens
//!
//! Single-field keys produce the bare value as the token (`42`); composite
//! keys such as `createdAt` plus an `id` tie-breaker produce a base64url
//! JSON object. Either way the token only carries key values, so a page
//! can resume after the boundary row has been deleted.
//!
//! ## Configuration
//!
//! Limits are per listing ([`PageLimits`]) and grouped in a
//! [`PagingConfig`], loadable from TOML; see [`config`].

pub mod config;
pub mod cursor;
pub mod listing;
pub mod plan;
pub mod predicate;
pub mod sanitize;

mod assemble;
mod error;
mod memory;
mod query;
mod row;
mod value;

pub use assemble::{PageResult, SearchMeta};
pub use config::{ConfigError, Overflow, PageLimits, PagingConfig};
pub use cursor::{CursorError, CursorPosition, CursorToken, KeyField, KeyKind, SortDir, SortKey};
pub use error::{Error, ErrorKind, RepositoryError, Result, ValidationError};
pub use listing::{ListQuery, list_posts, list_replies, list_reports, search_posts};
pub use memory::MemoryRepository;
pub use plan::{
    CursorEnvelope, CursorPlan, CursorState, OffsetEnvelope, OffsetPlan, PageMode, PagePlan,
    PaginationEnvelope, PaginationRequest,
};
pub use predicate::{
    Composer, Condition, Membership, Operator, Predicate, PredicateGuard, ResourceKind,
    ResourceScope, ScopeFields, TagRelation,
};
pub use query::{QueryDescriptor, Repository, Seek, paginate};
pub use row::Row;
pub use value::Value;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        Composer, CursorEnvelope, CursorToken, Error, ErrorKind, KeyKind, ListQuery,
        MemoryRepository, OffsetEnvelope, PageLimits, PageMode, PagePlan, PageResult,
        PaginationEnvelope, PaginationRequest, PagingConfig, Predicate, QueryDescriptor,
        Repository, Row, SortDir, SortKey, ValidationError, Value, list_posts, list_replies,
        list_reports, paginate, search_posts,
    };
}

// ============================================================================
// API Contract Tests (compile-time assertions)
// ============================================================================
