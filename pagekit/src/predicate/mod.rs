//! Filter predicates.
//!
//! A [`Predicate`] is a small boolean tree over field conditions and
//! relation membership tests. It is storage-agnostic: `pagekit-sql` renders
//! it to SQL and [`MemoryRepository`](crate::MemoryRepository) evaluates it
//! directly.

mod compose;
mod guard;
mod types;

pub use compose::{
    Composer, ResourceKind, ResourceScope, ScopeFields, TagRelation, tag_predicate, text_predicate,
};
pub use guard::PredicateGuard;
pub use types::{Condition, LIKE_ESCAPE, Membership, Operator, Predicate};
