//! The forum's listings: post feed, post search, comment replies and the
//! admin report queue.
//!
//! Each listing validates every parameter before touching the repository,
//! composes one predicate, checks it against the listing's
//! [`PredicateGuard`], plans the page and hands off to [`paginate`].
//!
//! | Listing          | Mode   | Order                  |
//! |------------------|--------|------------------------|
//! | [`list_posts`]   | cursor | `createdAt`, `id` desc |
//! | [`search_posts`] | cursor | `createdAt`, `id` desc |
//! | [`list_replies`] | cursor | `createdAt`, `id` asc  |
//! | [`list_reports`] | offset | `createdAt`, `id` desc |

use serde::Deserialize;
use serde_json::Value as Json;
use tracing::Span;

use crate::assemble::PageResult;
use crate::config::PagingConfig;
use crate::cursor::{KeyKind, SortDir, SortKey};
use crate::error::{Error, Result, ValidationError};
use crate::plan::{PageMode, PagePlan, PaginationRequest};
use crate::predicate::{
    Composer, Predicate, PredicateGuard, ResourceKind, ResourceScope, ScopeFields, TagRelation,
};
use crate::query::{Repository, paginate};
use crate::sanitize::{
    ExclusivePair, SearchPolicy, sanitize_choice, sanitize_exclusive_pair, sanitize_identifier,
    sanitize_search_term, sanitize_tag_ids,
};

/// Post fields searched by free text.
pub const POST_SEARCH_FIELDS: &[&str] = &["title", "content"];

/// Relation linking posts to tags.
pub const POST_TAGS: TagRelation<'static> = TagRelation {
    relation: "tags",
    field: "tagId",
};

/// Field linking a reply to its parent comment.
pub const REPLY_PARENT_FIELD: &str = "parentId";

/// Report statuses accepted by `status`.
pub const REPORT_STATUSES: &[&str] = &["PENDING", "REVIEWED", "RESOLVED", "DISMISSED"];

/// Report fields naming the reported resource.
pub const REPORT_SCOPE: ScopeFields<'static> = ScopeFields {
    post: "postId",
    comment: "commentId",
};

const REPORT_KINDS: &[&str] = &["post", "comment"];

/// Raw query parameters of a listing request.
///
/// Values are kept as JSON so that a structurally wrong parameter (a list
/// where a string belongs) can be told apart from an absent one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListQuery {
    /// Page size.
    pub limit: Option<Json>,
    /// Cursor from a previous page.
    pub cursor: Option<Json>,
    /// Page number.
    pub page: Option<Json>,
    /// Free-text search.
    pub search: Option<Json>,
    /// Comma-separated tag ids.
    pub tag_ids: Option<Json>,
    /// Report status.
    pub status: Option<Json>,
    /// Report resource kind, `post` or `comment`.
    #[serde(rename = "type")]
    pub kind: Option<Json>,
    /// Reported post.
    pub post_id: Option<Json>,
    /// Reported comment.
    pub comment_id: Option<Json>,
}

impl ListQuery {
    /// The pagination parameters.
    pub fn pagination(&self) -> Result<PaginationRequest, ValidationError> {
        PaginationRequest::parse(self.limit.as_ref(), self.cursor.as_ref(), self.page.as_ref())
    }
}

/// Newest posts first.
#[must_use]
pub fn post_order() -> SortKey {
    SortKey::by("createdAt", KeyKind::Timestamp, SortDir::Desc).with_tie_breaker("id", KeyKind::Int)
}

/// Oldest replies first.
#[must_use]
pub fn reply_order() -> SortKey {
    SortKey::by("createdAt", KeyKind::Timestamp, SortDir::Asc).with_tie_breaker("id", KeyKind::Uuid)
}

/// Newest reports first.
#[must_use]
pub fn report_order() -> SortKey {
    SortKey::by("createdAt", KeyKind::Timestamp, SortDir::Desc).with_tie_breaker("id", KeyKind::Int)
}

fn post_guard() -> PredicateGuard {
    PredicateGuard::new().allow_fields(&["title", "content", "tags"])
}

fn rejected(err: ValidationError) -> Error {
    tracing::warn!(error = %err, field = err.field(), "rejected listing request");
    Error::Validation(err)
}

/// The general post feed, optionally narrowed by search term and tags.
#[tracing::instrument(
    skip_all,
    fields(listing = "posts", mode = "cursor", limit = tracing::field::Empty)
)]
pub async fn list_posts<R: Repository>(
    repo: &R,
    config: &PagingConfig,
    query: &ListQuery,
) -> Result<PageResult<R::Row>> {
    let search = sanitize_search_term(
        query.search.as_ref(),
        SearchPolicy::Optional,
        config.max_search_chars,
    )
    .map_err(rejected)?;
    let tags = sanitize_tag_ids(query.tag_ids.as_ref(), config.max_tag_ids).map_err(rejected)?;
    let predicate = Composer::new()
        .text(search.as_ref(), POST_SEARCH_FIELDS)
        .tags(&tags, POST_TAGS)
        .build_checked(&post_guard())
        .map_err(rejected)?;

    let request = query.pagination().map_err(rejected)?;
    let plan =
        PagePlan::new(PageMode::Cursor, &request, &config.posts, post_order()).map_err(rejected)?;
    Span::current().record("limit", plan.limit());
    tracing::debug!(%predicate, ?plan, "planned post feed");

    paginate(repo, &plan, predicate).await
}

/// Post search: a term is required unless tags are given, and the response
/// echoes the applied search in `meta`.
#[tracing::instrument(
    skip_all,
    fields(listing = "search", mode = "cursor", limit = tracing::field::Empty)
)]
pub async fn search_posts<R: Repository>(
    repo: &R,
    config: &PagingConfig,
    query: &ListQuery,
) -> Result<PageResult<R::Row>> {
    let tags = sanitize_tag_ids(query.tag_ids.as_ref(), config.max_tag_ids).map_err(rejected)?;
    let search = sanitize_search_term(
        query.search.as_ref(),
        SearchPolicy::Required {
            other_filters: !tags.is_empty(),
        },
        config.max_search_chars,
    )
    .map_err(rejected)?;
    let predicate = Composer::new()
        .text(search.as_ref(), POST_SEARCH_FIELDS)
        .tags(&tags, POST_TAGS)
        .build_checked(&post_guard())
        .map_err(rejected)?;

    let request = query.pagination().map_err(rejected)?;
    let plan = PagePlan::new(PageMode::Cursor, &request, &config.search, post_order())
        .map_err(rejected)?;
    Span::current().record("limit", plan.limit());
    tracing::debug!(%predicate, ?plan, "planned post search");

    let page = paginate(repo, &plan, predicate).await?;
    Ok(page.with_search_meta(search.as_ref(), plan.limit()))
}

/// Replies to one comment, oldest first.
///
/// Replies and their parent live in the same repository; a parent that does
/// not exist is [`Error::NotFound`], not an empty page.
#[tracing::instrument(
    skip_all,
    fields(listing = "replies", mode = "cursor", limit = tracing::field::Empty)
)]
pub async fn list_replies<R: Repository>(
    repo: &R,
    config: &PagingConfig,
    parent_id: &str,
    query: &ListQuery,
) -> Result<PageResult<R::Row>> {
    let raw = Json::String(parent_id.to_string());
    let parent = sanitize_identifier(REPLY_PARENT_FIELD, Some(&raw), KeyKind::Uuid)
        .and_then(|id| {
            id.ok_or_else(|| ValidationError::InvalidIdentifier {
                field: REPLY_PARENT_FIELD.to_string(),
                value: parent_id.to_string(),
                expected: KeyKind::Uuid,
            })
        })
        .map_err(rejected)?;
    let predicate = Composer::new()
        .with(Predicate::eq(REPLY_PARENT_FIELD, parent.clone()))
        .build_checked(&PredicateGuard::new().allow_fields(&[REPLY_PARENT_FIELD]))
        .map_err(rejected)?;

    let request = query.pagination().map_err(rejected)?;
    let plan = PagePlan::new(PageMode::Cursor, &request, &config.replies, reply_order())
        .map_err(rejected)?;
    Span::current().record("limit", plan.limit());

    if !repo.exists(&Predicate::eq("id", parent)).await? {
        tracing::debug!(parent_id, "parent comment not found");
        return Err(Error::NotFound {
            resource: "comment",
            id: parent_id.to_string(),
        });
    }
    tracing::debug!(%predicate, ?plan, "planned replies");

    paginate(repo, &plan, predicate).await
}

/// The admin report queue, with page numbers and totals.
///
/// `type` restricts reports to one resource kind (the other kind's id is
/// required to be null); `postId` and `commentId` are mutually exclusive and
/// must agree with `type` when both are given.
#[tracing::instrument(
    skip_all,
    fields(listing = "reports", mode = "offset", limit = tracing::field::Empty)
)]
pub async fn list_reports<R: Repository>(
    repo: &R,
    config: &PagingConfig,
    query: &ListQuery,
) -> Result<PageResult<R::Row>> {
    let status =
        sanitize_choice("status", query.status.as_ref(), REPORT_STATUSES).map_err(rejected)?;
    let scope = report_scope(query).map_err(rejected)?;
    let predicate = Composer::new()
        .status("status", status)
        .scope(scope.as_ref(), REPORT_SCOPE)
        .build_checked(&PredicateGuard::new().allow_fields(&[
            "status",
            REPORT_SCOPE.post,
            REPORT_SCOPE.comment,
        ]))
        .map_err(rejected)?;

    let request = query.pagination().map_err(rejected)?;
    let plan = PagePlan::new(PageMode::Offset, &request, &config.reports, report_order())
        .map_err(rejected)?;
    Span::current().record("limit", plan.limit());
    tracing::debug!(%predicate, ?plan, "planned report listing");

    paginate(repo, &plan, predicate).await
}

fn report_scope(query: &ListQuery) -> Result<Option<ResourceScope>, ValidationError> {
    let kind = sanitize_choice("type", query.kind.as_ref(), REPORT_KINDS)?
        .and_then(ResourceKind::parse);
    let post_id = sanitize_identifier(REPORT_SCOPE.post, query.post_id.as_ref(), KeyKind::Int)?;
    let comment_id =
        sanitize_identifier(REPORT_SCOPE.comment, query.comment_id.as_ref(), KeyKind::Uuid)?;

    let target = if post_id.is_some() || comment_id.is_some() {
        Some(sanitize_exclusive_pair(
            (REPORT_SCOPE.post, post_id),
            (REPORT_SCOPE.comment, comment_id),
        )?)
    } else {
        None
    };

    let (target_kind, id, field) = match target {
        None => {
            return Ok(kind.map(|kind| ResourceScope { kind, id: None }));
        },
        Some(ExclusivePair::First(id)) => (ResourceKind::Post, id, REPORT_SCOPE.post),
        Some(ExclusivePair::Second(id)) => (ResourceKind::Comment, id, REPORT_SCOPE.comment),
    };
    match kind {
        Some(kind) if kind != target_kind => Err(ValidationError::ScopeConflict {
            field: field.to_string(),
            discriminator: "type".to_string(),
            kind: kind.as_str().to_string(),
        }),
        _ => Ok(Some(ResourceScope {
            kind: target_kind,
            id: Some(id),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use serde_json::json;

    fn query(value: Json) -> ListQuery {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_list_query_field_names() {
        let q = query(json!({"tagIds": "1,2", "type": "post", "postId": "3", "limit": 5}));
        assert_eq!(q.tag_ids, Some(json!("1,2")));
        assert_eq!(q.kind, Some(json!("post")));
        assert_eq!(q.post_id, Some(json!("3")));
        assert_eq!(q.pagination().unwrap().limit, Some(5));
    }

    #[test]
    fn test_report_scope_from_type_only() {
        let scope = report_scope(&query(json!({"type": "comment"}))).unwrap();
        assert_eq!(
            scope,
            Some(ResourceScope {
                kind: ResourceKind::Comment,
                id: None
            })
        );
    }

    #[test]
    fn test_report_scope_from_id_only() {
        let scope = report_scope(&query(json!({"postId": "7"}))).unwrap();
        assert_eq!(
            scope,
            Some(ResourceScope {
                kind: ResourceKind::Post,
                id: Some(Value::Int(7))
            })
        );
    }

    #[test]
    fn test_report_scope_conflict() {
        let err = report_scope(&query(json!({"type": "comment", "postId": "7"}))).unwrap_err();
        assert_eq!(
            err,
            ValidationError::ScopeConflict {
                field: "postId".into(),
                discriminator: "type".into(),
                kind: "comment".into()
            }
        );
    }

    #[test]
    fn test_report_scope_both_ids() {
        let err = report_scope(&query(json!({
            "postId": "7",
            "commentId": "0b6f1c1e-8d2a-4c53-9e7b-3f1a2b4c5d6e"
        })))
        .unwrap_err();
        assert!(matches!(err, ValidationError::ExclusiveBoth { .. }));
    }

    #[test]
    fn test_report_scope_absent() {
        assert_eq!(report_scope(&ListQuery::default()), Ok(None));
    }

    #[test]
    fn test_orders_end_in_id() {
        for key in [post_order(), reply_order(), report_order()] {
            assert_eq!(key.field_names().last(), Some("id"));
        }
    }
}
