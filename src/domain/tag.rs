//! Post tag constants.
//!
//! Every domain record is published as a post carrying exactly one of these
//! tags, and the same constant is written into the record's `type`
//! attribute. Classification is done on tags alone.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// The closed set of tags recognized on posts.
///
/// Published and draft variants of the same record share an attribute
/// schema but are distinct tags, so a draft never passes the guard for its
/// published counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PostTag {
    /// A cause published by an organization.
    OrgPublishCause,
    /// A cause saved by an organization but not yet published.
    OrgPublishCauseDraft,
    /// A volunteer opportunity published by an organization.
    OrgPublishOpportunity,
    /// A volunteer opportunity saved but not yet published.
    OrgPublishOpportunityDraft,
    /// A VHR goal set by an organization.
    OrgPublishGoal,
    /// A volunteer's request to have logged hours verified.
    VhrRequestOpportunity,
    /// A comment bookmarking a cause.
    BookmarkCause,
    /// A comment bookmarking a volunteer opportunity.
    BookmarkOpportunity,
}

/// The kinds of domain record a post can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    /// [`crate::CauseMetadata`]
    Cause,
    /// [`crate::OpportunityMetadata`]
    Opportunity,
    /// [`crate::GoalMetadata`]
    Goal,
    /// [`crate::VhrLogMetadata`]
    VhrLog,
}

/// Whether a cause or opportunity is live or still a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Publication {
    /// Visible to volunteers.
    #[default]
    Published,
    /// Only visible to the publishing organization.
    Draft,
}

impl PostTag {
    /// All known tags.
    pub const ALL: [Self; 8] = [
        Self::OrgPublishCause,
        Self::OrgPublishCauseDraft,
        Self::OrgPublishOpportunity,
        Self::OrgPublishOpportunityDraft,
        Self::OrgPublishGoal,
        Self::VhrRequestOpportunity,
        Self::BookmarkCause,
        Self::BookmarkOpportunity,
    ];

    /// The wire constant for this tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OrgPublishCause => "ORG_PUBLISH_CAUSE",
            Self::OrgPublishCauseDraft => "ORG_PUBLISH_CAUSE_DRAFT",
            Self::OrgPublishOpportunity => "ORG_PUBLISH_OPPORTUNITY",
            Self::OrgPublishOpportunityDraft => "ORG_PUBLISH_OPPORTUNITY_DRAFT",
            Self::OrgPublishGoal => "ORG_PUBLISH_GOAL",
            Self::VhrRequestOpportunity => "VHR_REQUEST_OPPORTUNITY",
            Self::BookmarkCause => "BOOKMARK_CAUSE",
            Self::BookmarkOpportunity => "BOOKMARK_OPPORTUNITY",
        }
    }

    /// The record kind whose attributes a post with this tag carries.
    ///
    /// Bookmarks carry no record of their own (they point at another post),
    /// so they return `None`.
    #[must_use]
    pub const fn payload(self) -> Option<RecordKind> {
        match self {
            Self::OrgPublishCause | Self::OrgPublishCauseDraft => Some(RecordKind::Cause),
            Self::OrgPublishOpportunity | Self::OrgPublishOpportunityDraft => {
                Some(RecordKind::Opportunity)
            }
            Self::OrgPublishGoal => Some(RecordKind::Goal),
            Self::VhrRequestOpportunity => Some(RecordKind::VhrLog),
            Self::BookmarkCause | Self::BookmarkOpportunity => None,
        }
    }

    /// The kind of record a bookmark tag points at.
    #[must_use]
    pub const fn bookmarked(self) -> Option<RecordKind> {
        match self {
            Self::BookmarkCause => Some(RecordKind::Cause),
            Self::BookmarkOpportunity => Some(RecordKind::Opportunity),
            _ => None,
        }
    }

    /// Whether this tag marks an unpublished draft.
    #[must_use]
    pub const fn is_draft(self) -> bool {
        matches!(
            self,
            Self::OrgPublishCauseDraft | Self::OrgPublishOpportunityDraft
        )
    }
}

impl Publication {
    /// Whether this is [`Publication::Draft`].
    #[must_use]
    pub const fn is_draft(self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl RecordKind {
    /// All record kinds.
    pub const ALL: [Self; 4] = [Self::Cause, Self::Opportunity, Self::Goal, Self::VhrLog];

    /// The tag a record of this kind is published under.
    #[must_use]
    pub const fn tag(self, publication: Publication) -> PostTag {
        match (self, publication) {
            (Self::Cause, Publication::Published) => PostTag::OrgPublishCause,
            (Self::Cause, Publication::Draft) => PostTag::OrgPublishCauseDraft,
            (Self::Opportunity, Publication::Published) => PostTag::OrgPublishOpportunity,
            (Self::Opportunity, Publication::Draft) => PostTag::OrgPublishOpportunityDraft,
            (Self::Goal, _) => PostTag::OrgPublishGoal,
            (Self::VhrLog, _) => PostTag::VhrRequestOpportunity,
        }
    }

    /// The tag used to bookmark a record of this kind, if it can be
    /// bookmarked.
    #[must_use]
    pub const fn bookmark_tag(self) -> Option<PostTag> {
        match self {
            Self::Cause => Some(PostTag::BookmarkCause),
            Self::Opportunity => Some(PostTag::BookmarkOpportunity),
            Self::Goal | Self::VhrLog => None,
        }
    }

    /// Lowercase name used in messages and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cause => "cause",
            Self::Opportunity => "opportunity",
            Self::Goal => "goal",
            Self::VhrLog => "vhr log",
        }
    }
}

impl fmt::Display for PostTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown tag constant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown post tag '{0}'")]
pub struct UnknownTag(pub String);

impl FromStr for PostTag {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownTag(s.to_string()))
    }
}

impl TryFrom<String> for PostTag {
    type Error = UnknownTag;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PostTag> for String {
    fn from(tag: PostTag) -> Self {
        tag.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn every_tag_round_trips_through_its_constant() {
        for tag in PostTag::ALL {
            assert_eq!(tag.as_str().parse::<PostTag>().unwrap(), tag);
        }
    }

    #[test]
    fn tag_constants_are_distinct() {
        let mut constants: Vec<_> = PostTag::ALL.iter().map(|t| t.as_str()).collect();
        constants.sort_unstable();
        constants.dedup();
        assert_eq!(constants.len(), PostTag::ALL.len());
    }

    #[test]
    fn unknown_constant_is_rejected() {
        assert_eq!(
            "ORG_PUBLISH_OPPORTUNTIY".parse::<PostTag>(),
            Err(UnknownTag("ORG_PUBLISH_OPPORTUNTIY".to_string()))
        );
    }

    #[test_case(RecordKind::Cause, Publication::Published, PostTag::OrgPublishCause)]
    #[test_case(RecordKind::Cause, Publication::Draft, PostTag::OrgPublishCauseDraft)]
    #[test_case(RecordKind::Opportunity, Publication::Published, PostTag::OrgPublishOpportunity)]
    #[test_case(RecordKind::Opportunity, Publication::Draft, PostTag::OrgPublishOpportunityDraft)]
    #[test_case(RecordKind::Goal, Publication::Draft, PostTag::OrgPublishGoal)]
    #[test_case(RecordKind::VhrLog, Publication::Published, PostTag::VhrRequestOpportunity)]
    fn kind_and_publication_select_tag(kind: RecordKind, publication: Publication, tag: PostTag) {
        assert_eq!(kind.tag(publication), tag);
        assert_eq!(tag.payload(), Some(kind));
    }

    #[test]
    fn bookmarks_carry_no_payload() {
        assert_eq!(PostTag::BookmarkCause.payload(), None);
        assert_eq!(PostTag::BookmarkOpportunity.payload(), None);
        assert_eq!(
            PostTag::BookmarkOpportunity.bookmarked(),
            Some(RecordKind::Opportunity)
        );
    }

    #[test]
    fn serde_uses_wire_constant() {
        let json = serde_json::to_string(&PostTag::OrgPublishGoal).unwrap();
        assert_eq!(json, "\"ORG_PUBLISH_GOAL\"");
        let tag: PostTag = serde_json::from_str("\"BOOKMARK_CAUSE\"").unwrap();
        assert_eq!(tag, PostTag::BookmarkCause);
    }
}
