//! An append-only view over decoded posts.
//!
//! Posts are never edited in place: editing publishes a new post with the
//! same logical id, and deleting hides every post of that id. The
//! [`Timeline`] keeps every revision and projects the current state from
//! them.
//!
//! A record belongs to the author of its first revision. Posts by other
//! profiles that reuse the logical id are never part of that record.

use std::{collections::HashMap, ops::Deref};

use chrono::{DateTime, Utc};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use uuid::Uuid;

use crate::domain::{
    is_bookmark, CauseMetadata, DomainRecord, GoalMetadata, InvalidMetadata, OpportunityMetadata,
    Post, Profile, VhrLogMetadata,
};

/// One decoded post.
#[derive(Debug, Clone, PartialEq)]
pub struct Revision {
    /// Protocol identifier of the post.
    pub post_id: String,
    /// The author.
    pub profile: Profile,
    /// When the post was published.
    pub created_at: DateTime<Utc>,
    /// Whether the post has been hidden.
    pub is_hidden: bool,
    /// The record the post holds.
    pub record: DomainRecord,
}

/// A post that looked like one of ours but did not decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// Protocol identifier of the post.
    pub post_id: String,
    /// Why it was skipped.
    pub error: InvalidMetadata,
}

/// A typed view of a [`Revision`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry<'a, T> {
    /// The revision holding the record.
    pub revision: &'a Revision,
    /// The record.
    pub record: &'a T,
}

impl<T> Deref for Entry<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.record
    }
}

/// Every revision of every record, in the order the posts were given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    revisions: Vec<Revision>,
    bookmarks: Vec<Post>,
    skipped: Vec<Skipped>,
}

impl Timeline {
    /// Decode `posts` into a timeline.
    ///
    /// Posts carrying one of the record tags but failing to decode are kept
    /// in [`Timeline::skipped`]. Bookmarks are kept as posts. Anything else
    /// is ignored.
    pub fn from_posts(posts: impl IntoIterator<Item = Post>) -> Self {
        let posts: Vec<Post> = posts.into_iter().collect();

        let decoded: Vec<Option<Result<DomainRecord, InvalidMetadata>>> = posts
            .par_iter()
            .map(|post| {
                post.known_tags()
                    .any(|tag| tag.payload().is_some())
                    .then(|| DomainRecord::decode(post))
            })
            .collect();

        let mut timeline = Self::default();
        for (post, decoded) in posts.into_iter().zip(decoded) {
            match decoded {
                Some(Ok(record)) => timeline.revisions.push(Revision {
                    post_id: post.id,
                    profile: post.profile,
                    created_at: post.created_at,
                    is_hidden: post.is_hidden,
                    record,
                }),
                Some(Err(error)) => {
                    tracing::warn!(post_id = %post.id, "skipping invalid post: {error}");
                    timeline.skipped.push(Skipped {
                        post_id: post.id,
                        error,
                    });
                }
                None if is_bookmark(&post) => timeline.bookmarks.push(post),
                None => tracing::trace!(post_id = %post.id, "ignoring unrelated post"),
            }
        }
        timeline
    }

    /// Every revision, hidden ones included.
    #[must_use]
    pub fn revisions(&self) -> &[Revision] {
        &self.revisions
    }

    /// Posts that failed to decode.
    #[must_use]
    pub fn skipped(&self) -> &[Skipped] {
        &self.skipped
    }

    /// The latest visible revision of every record.
    ///
    /// "Latest" is by publication time, ties broken by position. Records
    /// whose every revision is hidden are absent, as are revisions by anyone
    /// but the record's owner.
    #[must_use]
    pub fn current(&self) -> Vec<&Revision> {
        let owners = self.owners();
        let mut latest: HashMap<Uuid, usize> = HashMap::new();
        for (index, revision) in self.revisions.iter().enumerate() {
            if revision.is_hidden || !self.is_owned(&owners, revision) {
                continue;
            }
            latest
                .entry(revision.record.id())
                .and_modify(|best| {
                    if revision.created_at >= self.revisions[*best].created_at {
                        *best = index;
                    }
                })
                .or_insert(index);
        }

        let mut indices: Vec<usize> = latest.into_values().collect();
        indices.sort_unstable();
        indices.into_iter().map(|i| &self.revisions[i]).collect()
    }

    /// The current revision of the record `id`.
    #[must_use]
    pub fn find(&self, id: Uuid) -> Option<&Revision> {
        self.history(id).into_iter().rev().find(|r| !r.is_hidden)
    }

    /// The author of the first revision of the record `id`.
    #[must_use]
    pub fn owner(&self, id: Uuid) -> Option<&Profile> {
        self.history(id).into_iter().next().map(|revision| &revision.profile)
    }

    /// Every revision of the record `id` by its owner, oldest first.
    #[must_use]
    pub fn history(&self, id: Uuid) -> Vec<&Revision> {
        let mut revisions: Vec<&Revision> = self
            .revisions
            .iter()
            .filter(|revision| revision.record.id() == id)
            .collect();
        revisions.sort_by_key(|revision| revision.created_at);

        if let Some(owner) = revisions.first().map(|&first| first.profile.id.as_str()) {
            revisions.retain(|revision| revision.profile.id == owner);
        }
        revisions
    }

    /// The post ids of every revision of the record `id`.
    #[must_use]
    pub fn posts_for(&self, id: Uuid) -> Vec<&str> {
        self.history(id)
            .into_iter()
            .map(|revision| revision.post_id.as_str())
            .collect()
    }

    /// Current causes, drafts included.
    #[must_use]
    pub fn causes(&self) -> Vec<Entry<'_, CauseMetadata>> {
        self.current_of(|record| match record {
            DomainRecord::Cause(cause) => Some(cause),
            _ => None,
        })
    }

    /// Current opportunities, drafts included.
    #[must_use]
    pub fn opportunities(&self) -> Vec<Entry<'_, OpportunityMetadata>> {
        self.current_of(|record| match record {
            DomainRecord::Opportunity(opportunity) => Some(opportunity),
            _ => None,
        })
    }

    /// Current goals.
    #[must_use]
    pub fn goals(&self) -> Vec<Entry<'_, GoalMetadata>> {
        self.current_of(|record| match record {
            DomainRecord::Goal(goal) => Some(goal),
            _ => None,
        })
    }

    /// Current VHR log requests.
    #[must_use]
    pub fn vhr_logs(&self) -> Vec<Entry<'_, VhrLogMetadata>> {
        self.current_of(|record| match record {
            DomainRecord::VhrLog(log) => Some(log),
            _ => None,
        })
    }

    /// The most recently published goal of a profile.
    #[must_use]
    pub fn latest_goal(&self, profile_id: &str) -> Option<Entry<'_, GoalMetadata>> {
        self.goals()
            .into_iter()
            .filter(|entry| entry.revision.profile.id == profile_id)
            .max_by_key(|entry| entry.revision.created_at)
    }

    /// Visible bookmarks made by a profile.
    #[must_use]
    pub fn bookmarks(&self, profile_id: &str) -> Vec<&Post> {
        self.bookmarks
            .iter()
            .filter(|post| !post.is_hidden && post.profile.id == profile_id)
            .collect()
    }

    /// Index of the first revision of every logical id.
    fn owners(&self) -> HashMap<Uuid, usize> {
        let mut owners: HashMap<Uuid, usize> = HashMap::new();
        for (index, revision) in self.revisions.iter().enumerate() {
            owners
                .entry(revision.record.id())
                .and_modify(|first| {
                    if revision.created_at < self.revisions[*first].created_at {
                        *first = index;
                    }
                })
                .or_insert(index);
        }
        owners
    }

    fn is_owned(&self, owners: &HashMap<Uuid, usize>, revision: &Revision) -> bool {
        owners
            .get(&revision.record.id())
            .is_some_and(|&first| self.revisions[first].profile.id == revision.profile.id)
    }

    fn current_of<'a, T>(
        &'a self,
        select: impl Fn(&'a DomainRecord) -> Option<&'a T>,
    ) -> Vec<Entry<'a, T>> {
        self.current()
            .into_iter()
            .filter_map(|revision| {
                select(&revision.record).map(|record| Entry { revision, record })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::domain::{
        post::tests::post_with,
        record::tests::{cause, goal, opportunity, post_from, vhr_log},
        CauseVersion, OpportunityVersion, PostTag,
    };

    fn revision(record: DomainRecord, minutes: i64, post_id: &str) -> Post {
        let mut post = post_from(&record);
        post.created_at += Duration::minutes(minutes);
        post.id = post_id.to_string();
        post
    }

    #[test]
    fn current_picks_latest_revision() {
        let first = cause(CauseVersion::V1_0_0);
        let mut second = cause(CauseVersion::V1_0_1);
        second.name = "Renamed".to_string();

        let timeline = Timeline::from_posts([
            revision(second.clone().into(), 10, "0x01-0x02"),
            revision(first.clone().into(), 0, "0x01-0x01"),
        ]);

        let causes = timeline.causes();
        assert_eq!(causes.len(), 1);
        assert_eq!(causes[0].name, "Renamed");
        assert_eq!(timeline.posts_for(first.id), ["0x01-0x01", "0x01-0x02"]);
    }

    #[test]
    fn equal_timestamps_prefer_later_position() {
        let first = cause(CauseVersion::V1_0_1);
        let mut second = first.clone();
        second.goal = 1.0;

        let timeline = Timeline::from_posts([
            revision(first.into(), 0, "0x01-0x01"),
            revision(second.clone().into(), 0, "0x01-0x02"),
        ]);
        assert_eq!(timeline.causes()[0].record, &second);
    }

    #[test]
    fn hidden_revisions_are_not_current() {
        let record = cause(CauseVersion::V1_0_1);
        let mut hidden = revision(record.clone().into(), 0, "0x01-0x01");
        hidden.is_hidden = true;

        let timeline = Timeline::from_posts([hidden]);
        assert!(timeline.current().is_empty());
        assert!(timeline.find(record.id).is_none());
        assert_eq!(timeline.history(record.id).len(), 1);
    }

    #[test]
    fn revisions_by_other_profiles_are_ignored() {
        let original = cause(CauseVersion::V1_0_1);
        let mut copy = original.clone();
        copy.recipient = "0x000000000000000000000000000000000000bad0".to_string();

        let mut impostor = revision(copy.into(), 1, "0x02-0x01");
        impostor.profile = Profile {
            id: "0x02".to_string(),
            handle: "mallory.lens".to_string(),
            owned_by: "0x000000000000000000000000000000000000bad0".to_string(),
        };

        let timeline = Timeline::from_posts([
            revision(original.clone().into(), 0, "0x01-0x01"),
            impostor,
        ]);

        let causes = timeline.causes();
        assert_eq!(causes.len(), 1);
        assert_eq!(causes[0].revision.profile.handle, "redcross.lens");
        assert_eq!(causes[0].recipient, original.recipient);
        assert_eq!(timeline.find(original.id).unwrap().post_id, "0x01-0x01");
        assert_eq!(timeline.owner(original.id).unwrap().handle, "redcross.lens");
        assert_eq!(timeline.posts_for(original.id), ["0x01-0x01"]);
    }

    #[test]
    fn owner_keeps_record_after_deleting_it() {
        let original = cause(CauseVersion::V1_0_1);
        let mut deleted = revision(original.clone().into(), 0, "0x01-0x01");
        deleted.is_hidden = true;
        let mut impostor = revision(original.clone().into(), 1, "0x02-0x01");
        impostor.profile.id = "0x02".to_string();

        let timeline = Timeline::from_posts([deleted, impostor]);
        assert!(timeline.causes().is_empty());
        assert!(timeline.find(original.id).is_none());
        assert_eq!(timeline.owner(original.id).unwrap().id, "0x01");
    }

    #[test]
    fn invalid_posts_are_skipped_not_fatal() {
        let mut broken = post_from(&goal().into());
        broken.attributes.retain(|a| a.trait_type != "goalDate");

        let timeline = Timeline::from_posts([
            broken,
            post_from(&opportunity(OpportunityVersion::V1_0_1).into()),
            post_with(&["UNRELATED"], Vec::new()),
        ]);

        assert_eq!(timeline.opportunities().len(), 1);
        assert_eq!(timeline.skipped().len(), 1);
        assert!(matches!(
            timeline.skipped()[0].error,
            InvalidMetadata::MissingAttribute { .. }
        ));
    }

    #[test]
    fn typed_views_partition_current() {
        let timeline = Timeline::from_posts([
            revision(cause(CauseVersion::V1_0_1).into(), 0, "0x01-0x01"),
            revision(opportunity(OpportunityVersion::V1_0_1).into(), 1, "0x01-0x02"),
            revision(goal().into(), 2, "0x01-0x03"),
            revision(vhr_log().into(), 3, "0x01-0x04"),
        ]);
        assert_eq!(timeline.current().len(), 4);
        assert_eq!(timeline.causes().len(), 1);
        assert_eq!(timeline.opportunities().len(), 1);
        assert_eq!(timeline.goals().len(), 1);
        assert_eq!(timeline.vhr_logs().len(), 1);
    }

    #[test]
    fn latest_goal_is_per_profile() {
        let mut newer = goal();
        newer.id = Uuid::from_u128(99);
        newer.goal = 800.0;

        let timeline = Timeline::from_posts([
            revision(goal().into(), 0, "0x01-0x01"),
            revision(newer.into(), 5, "0x01-0x02"),
        ]);
        let latest = timeline.latest_goal("0x01").unwrap();
        assert!((latest.goal - 800.0).abs() < f64::EPSILON);
        assert!(timeline.latest_goal("0x02").is_none());
    }

    #[test]
    fn bookmarks_are_kept_per_profile() {
        let mut bookmark = post_with(&[PostTag::BookmarkCause.as_str()], Vec::new());
        bookmark.comment_on = Some("0x02-0x01".to_string());
        let timeline = Timeline::from_posts([bookmark]);

        assert_eq!(timeline.bookmarks("0x01").len(), 1);
        assert!(timeline.bookmarks("0x02").is_empty());
        assert!(timeline.skipped().is_empty());
    }
}
