//! The external post shape, as handed over by the social protocol client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{attribute::Attribute, PostTag};

/// The author of a post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Protocol identifier of the profile.
    pub id: String,
    /// Human readable handle.
    pub handle: String,
    /// Wallet address that controls the profile.
    pub owned_by: String,
}

impl Profile {
    /// Whether `id` has the protocol's profile id shape: `0x` followed by
    /// hex digits.
    #[must_use]
    pub fn is_valid_id(id: &str) -> bool {
        id.strip_prefix("0x").is_some_and(|digits| {
            !digits.is_empty() && digits.chars().all(|c| c.is_ascii_hexdigit())
        })
    }
}

/// An immutable post as stored by the social protocol.
///
/// The codec itself only reads [`Post::tags`] and [`Post::attributes`];
/// the remaining fields are used by the timeline projection and queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Protocol identifier of this post.
    pub id: String,
    /// Who published it.
    pub profile: Profile,
    /// When it was published.
    pub created_at: DateTime<Utc>,
    /// Hidden posts are the protocol's version of deletion.
    #[serde(default)]
    pub is_hidden: bool,
    /// Free-form tag strings.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Metadata attributes.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// For comments (bookmarks), the post being commented on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_on: Option<String>,
}

impl Post {
    /// Whether the post carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: PostTag) -> bool {
        self.tags.iter().any(|t| t == tag.as_str())
    }

    /// The recognized tags on this post, in the order they appear.
    pub fn known_tags(&self) -> impl Iterator<Item = PostTag> + '_ {
        self.tags.iter().filter_map(|t| t.parse().ok())
    }
}

/// Whether `post` is tagged as `tag`.
///
/// Classification is decided by tags alone; attribute shape is never
/// consulted. Total: unknown posts simply return `false`.
#[must_use]
pub fn is_recognized(post: &Post, tag: PostTag) -> bool {
    post.has_tag(tag)
}

/// Whether `post` is a published cause.
#[must_use]
pub fn is_cause(post: &Post) -> bool {
    is_recognized(post, PostTag::OrgPublishCause)
}

/// Whether `post` is a draft cause.
#[must_use]
pub fn is_cause_draft(post: &Post) -> bool {
    is_recognized(post, PostTag::OrgPublishCauseDraft)
}

/// Whether `post` is a published volunteer opportunity.
#[must_use]
pub fn is_opportunity(post: &Post) -> bool {
    is_recognized(post, PostTag::OrgPublishOpportunity)
}

/// Whether `post` is a draft volunteer opportunity.
#[must_use]
pub fn is_opportunity_draft(post: &Post) -> bool {
    is_recognized(post, PostTag::OrgPublishOpportunityDraft)
}

/// Whether `post` is a goal.
#[must_use]
pub fn is_goal(post: &Post) -> bool {
    is_recognized(post, PostTag::OrgPublishGoal)
}

/// Whether `post` is a VHR log request.
#[must_use]
pub fn is_vhr_log(post: &Post) -> bool {
    is_recognized(post, PostTag::VhrRequestOpportunity)
}

/// Whether `post` bookmarks a cause or an opportunity.
#[must_use]
pub fn is_bookmark(post: &Post) -> bool {
    post.comment_on.is_some()
        && (is_recognized(post, PostTag::BookmarkCause)
            || is_recognized(post, PostTag::BookmarkOpportunity))
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::TimeZone;
    use test_case::test_case;

    use super::*;

    pub(crate) fn profile() -> Profile {
        Profile {
            id: "0x01".to_string(),
            handle: "redcross.lens".to_string(),
            owned_by: "0x3A5bd000000000000000000000000000000005e3".to_string(),
        }
    }

    pub(crate) fn post_with(tags: &[&str], attributes: Vec<Attribute>) -> Post {
        Post {
            id: "0x01-0x01".to_string(),
            profile: profile(),
            created_at: Utc.with_ymd_and_hms(2023, 7, 1, 12, 0, 0).unwrap(),
            is_hidden: false,
            tags: tags.iter().map(ToString::to_string).collect(),
            attributes,
            comment_on: None,
        }
    }

    type Guard = fn(&Post) -> bool;

    const GUARDS: [(PostTag, Guard); 6] = [
        (PostTag::OrgPublishCause, is_cause),
        (PostTag::OrgPublishCauseDraft, is_cause_draft),
        (PostTag::OrgPublishOpportunity, is_opportunity),
        (PostTag::OrgPublishOpportunityDraft, is_opportunity_draft),
        (PostTag::OrgPublishGoal, is_goal),
        (PostTag::VhrRequestOpportunity, is_vhr_log),
    ];

    #[test]
    fn each_tag_passes_only_its_own_guard() {
        for a in PostTag::ALL {
            let post = post_with(&[a.as_str()], Vec::new());
            for b in PostTag::ALL {
                assert_eq!(is_recognized(&post, b), a == b, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn per_kind_guards_are_exclusive() {
        for (tag, _) in GUARDS {
            let post = post_with(&[tag.as_str()], Vec::new());
            for (other, guard) in GUARDS {
                assert_eq!(guard(&post), tag == other, "{tag} vs {other}");
            }
        }
    }

    #[test]
    fn unknown_and_empty_tags_are_not_recognized() {
        let post = post_with(&["SOMETHING_ELSE"], Vec::new());
        assert!(PostTag::ALL.iter().all(|&t| !is_recognized(&post, t)));
        let post = post_with(&[], Vec::new());
        assert!(!is_cause(&post));
        assert_eq!(post.known_tags().count(), 0);
    }

    #[test_case("0x01", true; "short")]
    #[test_case("0x01a4F", true; "mixed case")]
    #[test_case("0x", false; "no digits")]
    #[test_case("01", false; "no prefix")]
    #[test_case("0x01/../x", false; "path separator")]
    #[test_case("..", false; "parent directory")]
    fn profile_ids(id: &str, expected: bool) {
        assert_eq!(Profile::is_valid_id(id), expected);
    }

    #[test]
    fn bookmark_requires_a_target() {
        let mut post = post_with(&[PostTag::BookmarkOpportunity.as_str()], Vec::new());
        assert!(!is_bookmark(&post));
        post.comment_on = Some("0x02-0x01".to_string());
        assert!(is_bookmark(&post));
    }

    #[test]
    fn post_deserializes_from_protocol_json() {
        let json = r#"{
            "id": "0x01-0x0a",
            "profile": {"id": "0x01", "handle": "org.lens", "ownedBy": "0xabc"},
            "createdAt": "2023-07-01T12:00:00Z",
            "tags": ["ORG_PUBLISH_GOAL"],
            "attributes": [{"traitType": "goal", "displayType": "number", "value": "100"}]
        }"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert!(is_goal(&post));
        assert!(!post.is_hidden);
        assert_eq!(post.attributes[0].value, "100");
    }
}
