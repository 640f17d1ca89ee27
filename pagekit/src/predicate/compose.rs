//! Composing sanitized filter inputs into one predicate.

use super::{Predicate, PredicateGuard};
use crate::ValidationError;
use crate::sanitize::SearchTerm;
use crate::Value;

/// Relation used for tag membership, e.g. `tags.tagId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagRelation<'a> {
    /// Relation from the listed row to its tag links.
    pub relation: &'a str,
    /// Field holding the tag id on each link.
    pub field: &'a str,
}

/// The kind of resource a report is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// A post.
    Post,
    /// A comment.
    Comment,
}

impl ResourceKind {
    /// Parse the `type` discriminator (`post` / `comment`).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "post" => Some(Self::Post),
            "comment" => Some(Self::Comment),
            _ => None,
        }
    }

    /// The discriminator spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Comment => "comment",
        }
    }
}

/// Restrict a listing to one resource kind, optionally one resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceScope {
    /// Kind of resource.
    pub kind: ResourceKind,
    /// Specific resource id, if any.
    pub id: Option<Value>,
}

/// Field names carrying the two resource identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeFields<'a> {
    /// Column holding a post id.
    pub post: &'a str,
    /// Column holding a comment id.
    pub comment: &'a str,
}

impl ResourceScope {
    fn to_predicate(&self, fields: ScopeFields<'_>) -> Predicate {
        let (own, other) = match self.kind {
            ResourceKind::Post => (fields.post, fields.comment),
            ResourceKind::Comment => (fields.comment, fields.post),
        };
        match &self.id {
            Some(id) => Predicate::And(vec![
                Predicate::eq(own, id.clone()),
                Predicate::is_null(other),
            ]),
            None => Predicate::is_null(other),
        }
    }
}

/// One `contains` leaf per searchable field, OR-ed together.
///
/// ```
/// use pagekit::predicate::text_predicate;
/// use pagekit::sanitize::{SearchPolicy, sanitize_search_term};
///
/// let raw = serde_json::json!("foo");
/// let term = sanitize_search_term(Some(&raw), SearchPolicy::Optional, 200).unwrap().unwrap();
/// let p = text_predicate(&term, &["title", "content"]);
/// assert_eq!(p.to_string(), "OR(title~foo, content~foo)");
/// ```
#[must_use]
pub fn text_predicate(term: &SearchTerm, fields: &[&str]) -> Predicate {
    Predicate::Or(
        fields
            .iter()
            .map(|f| Predicate::contains(*f, term.pattern()))
            .collect(),
    )
}

/// Membership in any of `ids` through `relation`.
#[must_use]
pub fn tag_predicate(ids: &[i64], relation: TagRelation<'_>) -> Predicate {
    Predicate::membership(relation.relation, relation.field, ids.to_vec())
}

/// Combines independent filter dimensions into one predicate.
///
/// Every dimension that is present adds one child to a top-level AND
/// group; absent or empty dimensions add nothing. With no dimensions the
/// result is [`Predicate::All`].
///
/// ```
/// use pagekit::{Composer, Predicate, TagRelation};
///
/// const TAGS: TagRelation<'static> = TagRelation { relation: "tags", field: "tagId" };
///
/// assert_eq!(Composer::new().build(), Predicate::All);
///
/// let p = Composer::new().tags(&[1, 2], TAGS).build();
/// assert_eq!(p.to_string(), "AND(tags.tagId in [1,2])");
/// ```
#[derive(Debug, Default)]
pub struct Composer {
    group: Vec<Predicate>,
}

impl Composer {
    /// Start with no dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text search: the term must occur in at least one of `fields`.
    pub fn text(mut self, term: Option<&SearchTerm>, fields: &[&str]) -> Self {
        if let Some(term) = term
            && !fields.is_empty()
        {
            self.group.push(text_predicate(term, fields));
        }
        self
    }

    /// Tag membership: the row carries at least one of `ids`.
    pub fn tags(mut self, ids: &[i64], relation: TagRelation<'_>) -> Self {
        if !ids.is_empty() {
            self.group.push(tag_predicate(ids, relation));
        }
        self
    }

    /// Exact match on a status field.
    pub fn status(mut self, field: &str, status: Option<&str>) -> Self {
        if let Some(status) = status {
            self.group.push(Predicate::eq(field, status));
        }
        self
    }

    /// Resource scope: the row's own id field matches (when given) and the
    /// other kind's field is null.
    pub fn scope(mut self, scope: Option<&ResourceScope>, fields: ScopeFields<'_>) -> Self {
        if let Some(scope) = scope {
            self.group.push(scope.to_predicate(fields));
        }
        self
    }

    /// Any other fixed condition, e.g. a parent id.
    pub fn with(mut self, predicate: Predicate) -> Self {
        if !predicate.is_all() {
            self.group.push(predicate);
        }
        self
    }

    /// Finish composition.
    #[must_use]
    pub fn build(self) -> Predicate {
        if self.group.is_empty() {
            Predicate::All
        } else {
            Predicate::And(self.group)
        }
    }

    /// Finish composition and check the result against `guard`.
    pub fn build_checked(self, guard: &PredicateGuard) -> Result<Predicate, ValidationError> {
        let predicate = self.build();
        guard.check(&predicate)?;
        Ok(predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize::{SearchPolicy, sanitize_search_term};
    use serde_json::json;

    const TAGS: TagRelation<'static> = TagRelation {
        relation: "tags",
        field: "tagId",
    };
    const SCOPE: ScopeFields<'static> = ScopeFields {
        post: "postId",
        comment: "commentId",
    };

    fn term(s: &str) -> SearchTerm {
        sanitize_search_term(Some(&json!(s)), SearchPolicy::Optional, 200)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_empty_is_all() {
        let p = Composer::new()
            .text(None, &["title"])
            .tags(&[], TAGS)
            .status("status", None)
            .scope(None, SCOPE)
            .build();
        assert_eq!(p, Predicate::All);
    }

    #[test]
    fn test_text_and_tags() {
        let t = term("foo");
        let p = Composer::new()
            .text(Some(&t), &["title", "content"])
            .tags(&[1, 2], TAGS)
            .build();
        assert_eq!(
            p,
            Predicate::And(vec![
                Predicate::Or(vec![
                    Predicate::contains("title", "foo"),
                    Predicate::contains("content", "foo"),
                ]),
                Predicate::membership("tags", "tagId", vec![1, 2]),
            ])
        );
    }

    #[test]
    fn test_post_scope_with_id() {
        let scope = ResourceScope {
            kind: ResourceKind::Post,
            id: Some(Value::Int(4)),
        };
        let p = Composer::new()
            .status("status", Some("PENDING"))
            .scope(Some(&scope), SCOPE)
            .build();
        assert_eq!(
            p.to_string(),
            "AND(status=PENDING, AND(postId=4, commentId IS NULL))"
        );
    }

    #[test]
    fn test_comment_scope_without_id() {
        let scope = ResourceScope {
            kind: ResourceKind::Comment,
            id: None,
        };
        let p = Composer::new().scope(Some(&scope), SCOPE).build();
        assert_eq!(p, Predicate::And(vec![Predicate::is_null("postId")]));
    }

    #[test]
    fn test_resource_kind_parse() {
        assert_eq!(ResourceKind::parse("post"), Some(ResourceKind::Post));
        assert_eq!(ResourceKind::parse("Post"), None);
        assert_eq!(ResourceKind::Comment.as_str(), "comment");
    }
}
