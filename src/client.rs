//! The social protocol collaborators and the publishing flows built on them.
//!
//! The crate never talks to a network itself. Posting, fetching, hiding and
//! uploading go through the [`PostClient`], [`WalletAuth`] and [`FileUpload`]
//! traits; [`Publisher`] composes them into the publish, modify, delete and
//! bookmark flows.

use std::fmt;

use nonempty::NonEmpty;
use uuid::Uuid;

use crate::domain::{
    Attribute, Config, DomainRecord, Post, PostTag, Profile, Publication, RecordKind, Session,
};

/// Protocol identifier of a post.
pub type PostId = String;

/// An opaque failure reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ClientError {
    message: String,
}

impl ClientError {
    /// Wrap a collaborator's error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The collaborator's message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// A post about to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    /// The author.
    pub profile: Profile,
    /// Post body shown by generic clients.
    pub content: String,
    /// Post title shown by generic clients.
    pub name: String,
    /// Tags, always exactly one of ours.
    pub tags: Vec<String>,
    /// Locale stamped on the post.
    pub locale: String,
    /// Application identifier stamped on the post.
    pub app_id: String,
    /// Encoded record.
    pub attributes: Vec<Attribute>,
    /// For comments, the post being commented on.
    pub comment_on: Option<PostId>,
}

impl PostRequest {
    fn new(profile: &Profile, tag: PostTag, config: &PublisherConfig) -> Self {
        Self {
            profile: profile.clone(),
            content: format!("#{tag}"),
            name: format!("{tag} by {}", profile.handle),
            tags: vec![tag.to_string()],
            locale: config.locale.clone(),
            app_id: config.app_id.clone(),
            attributes: Vec::new(),
            comment_on: None,
        }
    }
}

/// Which posts to fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    /// Only posts by this profile id.
    pub profile_id: Option<String>,
    /// Only posts carrying one of these tags; empty means any.
    pub tags: Vec<PostTag>,
    /// Whether hidden posts are returned.
    pub include_hidden: bool,
}

impl PostFilter {
    /// Posts by `profile_id`.
    #[must_use]
    pub fn by(profile_id: impl Into<String>) -> Self {
        Self {
            profile_id: Some(profile_id.into()),
            ..Self::default()
        }
    }

    /// Posts carrying one of `tags`.
    #[must_use]
    pub fn tagged(mut self, tags: impl IntoIterator<Item = PostTag>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    /// Whether `post` passes this filter.
    #[must_use]
    pub fn matches(&self, post: &Post) -> bool {
        (self.include_hidden || !post.is_hidden)
            && self
                .profile_id
                .as_ref()
                .is_none_or(|id| *id == post.profile.id)
            && (self.tags.is_empty() || self.tags.iter().any(|&tag| post.has_tag(tag)))
    }
}

/// Creates, fetches and hides posts.
pub trait PostClient {
    /// Publish a new post.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's failure unchanged.
    fn create_post(&mut self, request: PostRequest) -> Result<PostId, ClientError>;

    /// Fetch the posts matching `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's failure unchanged.
    fn fetch_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, ClientError>;

    /// Hide a post. Hiding is how the protocol deletes.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's failure unchanged.
    fn hide_post(&mut self, post_id: &str) -> Result<(), ClientError>;
}

/// Checks that the connected wallet may act for a profile.
pub trait WalletAuth {
    /// Succeeds when the wallet at `address` is authenticated.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's failure unchanged.
    fn check_auth(&self, address: &str) -> Result<(), ClientError>;
}

/// Content-addressed blob storage for images.
pub trait FileUpload {
    /// Store `bytes`, returning their URL.
    ///
    /// # Errors
    ///
    /// Returns the collaborator's failure unchanged.
    fn upload(&self, bytes: &[u8]) -> Result<String, ClientError>;
}

/// [`WalletAuth`] backed by the signed-in [`Session`].
///
/// A wallet may act when it owns the session's profile.
#[derive(Debug, Clone)]
pub struct SessionAuth {
    session: Option<Session>,
}

impl SessionAuth {
    /// Authenticate against `session`, or reject everything without one.
    #[must_use]
    pub const fn new(session: Option<Session>) -> Self {
        Self { session }
    }
}

impl WalletAuth for SessionAuth {
    fn check_auth(&self, address: &str) -> Result<(), ClientError> {
        match &self.session {
            None => Err(ClientError::new("not signed in")),
            Some(session) if session.profile.owned_by.eq_ignore_ascii_case(address) => Ok(()),
            Some(session) => Err(ClientError::new(format!(
                "wallet {address} does not own profile {}",
                session.profile.handle
            ))),
        }
    }
}

/// Errors from the publishing flows.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The wallet is not allowed to act for the profile.
    #[error("not authorized: {0}")]
    Unauthorized(ClientError),

    /// The collaborator failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A modification changed the logical id.
    #[error("cannot modify record {expected} into record {found}")]
    IdMismatch {
        /// Logical id of the previous revision.
        expected: Uuid,
        /// Logical id of the new revision.
        found: Uuid,
    },

    /// No visible post of the author holds the logical id.
    #[error("no record with id {0}")]
    NotFound(Uuid),

    /// Only causes and opportunities can be bookmarked.
    #[error("post {0} is neither a cause nor an opportunity")]
    NotBookmarkable(PostId),

    /// The post has been hidden.
    #[error("post {0} has been deleted")]
    Deleted(PostId),

    /// Some revisions could not be hidden.
    #[error(transparent)]
    Hide(#[from] HideError),
}

/// Revisions that failed to hide while deleting a record.
#[derive(Debug, thiserror::Error)]
pub struct HideError {
    failures: NonEmpty<(PostId, ClientError)>,
}

impl HideError {
    /// The posts that stayed visible, with why.
    #[must_use]
    pub const fn failures(&self) -> &NonEmpty<(PostId, ClientError)> {
        &self.failures
    }
}

impl fmt::Display for HideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_DISPLAY: usize = 5;

        write!(f, "failed to hide posts: ")?;

        let total = self.failures.len();
        let displayed: Vec<String> = self
            .failures
            .iter()
            .take(MAX_DISPLAY)
            .map(|(id, e)| format!("{id} ({e})"))
            .collect();
        let msg = displayed.join(", ");

        if total <= MAX_DISPLAY {
            write!(f, "{msg}")
        } else {
            write!(f, "{msg}... (and {} more)", total - MAX_DISPLAY)
        }
    }
}

/// Outcome of [`Publisher::modify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modified {
    /// A new revision was published.
    Published(PostId),
    /// The record encodes identically to the previous revision.
    Unchanged,
}

#[derive(Debug, Clone)]
struct PublisherConfig {
    app_id: String,
    locale: String,
}

/// Publishes records on behalf of a profile.
#[derive(Debug)]
pub struct Publisher<C, A> {
    client: C,
    auth: A,
    config: PublisherConfig,
}

impl<C, A> Publisher<C, A>
where
    C: PostClient,
    A: WalletAuth,
{
    /// Publish through `client`, authorizing with `auth`.
    pub fn new(client: C, auth: A, config: &Config) -> Self {
        Self {
            client,
            auth,
            config: PublisherConfig {
                app_id: config.app_id().to_string(),
                locale: config.locale().to_string(),
            },
        }
    }

    /// The underlying client.
    pub const fn client(&self) -> &C {
        &self.client
    }

    /// Consume the publisher, returning the client.
    pub fn into_client(self) -> C {
        self.client
    }

    fn authorize(&self, profile: &Profile) -> Result<(), PublishError> {
        self.auth
            .check_auth(&profile.owned_by)
            .map_err(PublishError::Unauthorized)
    }

    /// Publish `record` as a new post by `profile`.
    ///
    /// # Errors
    ///
    /// Fails if the wallet is not authorized or the post cannot be created.
    #[tracing::instrument(
        level = "debug",
        skip(self, profile),
        fields(profile = %profile.handle, id = %record.id())
    )]
    pub fn publish(
        &mut self,
        profile: &Profile,
        record: &DomainRecord,
    ) -> Result<PostId, PublishError> {
        self.authorize(profile)?;

        let mut request = PostRequest::new(profile, record.tag(), &self.config);
        request.attributes = record.to_attributes();

        let post_id = self.client.create_post(request)?;
        tracing::info!(%post_id, tag = %record.tag(), "published");
        Ok(post_id)
    }

    /// Publish `record` as a new revision of `previous`.
    ///
    /// Nothing is published when both encode identically.
    ///
    /// # Errors
    ///
    /// Fails if the logical ids differ, the wallet is not authorized, or the
    /// post cannot be created.
    pub fn modify(
        &mut self,
        profile: &Profile,
        record: &DomainRecord,
        previous: &DomainRecord,
    ) -> Result<Modified, PublishError> {
        if record.id() != previous.id() {
            return Err(PublishError::IdMismatch {
                expected: previous.id(),
                found: record.id(),
            });
        }
        if record.fingerprint() == previous.fingerprint() {
            tracing::debug!(id = %record.id(), "record unchanged, not publishing");
            return Ok(Modified::Unchanged);
        }
        self.publish(profile, record).map(Modified::Published)
    }

    /// The visible posts of `profile` holding the record `id`, with the
    /// record's kind.
    ///
    /// These are exactly the posts [`Publisher::delete`] hides. Posts of the
    /// author that do not decode are ignored.
    ///
    /// # Errors
    ///
    /// Fails if the posts cannot be fetched.
    pub fn revisions_of(
        &self,
        profile: &Profile,
        id: Uuid,
    ) -> Result<Vec<(PostId, RecordKind)>, PublishError> {
        let filter = PostFilter::by(&profile.id).tagged(
            RecordKind::ALL
                .into_iter()
                .flat_map(|kind| [kind.tag(Publication::Published), kind.tag(Publication::Draft)]),
        );
        Ok(self
            .client
            .fetch_posts(&filter)?
            .into_iter()
            .filter_map(|post| {
                DomainRecord::decode(&post)
                    .ok()
                    .filter(|record| record.id() == id)
                    .map(|record| (post.id, record.kind()))
            })
            .collect())
    }

    /// Hide every visible revision of the record `id` published by
    /// `profile`.
    ///
    /// Returns how many posts were hidden.
    ///
    /// # Errors
    ///
    /// Fails if the wallet is not authorized, the posts cannot be fetched,
    /// no post holds `id`, or any revision fails to hide.
    pub fn delete(&mut self, profile: &Profile, id: Uuid) -> Result<usize, PublishError> {
        self.authorize(profile)?;

        let revisions = self.revisions_of(profile, id)?;
        if revisions.is_empty() {
            return Err(PublishError::NotFound(id));
        }

        let mut failures = Vec::new();
        for (post_id, _) in &revisions {
            if let Err(e) = self.client.hide_post(post_id) {
                tracing::warn!(%post_id, "failed to hide post: {e}");
                failures.push((post_id.clone(), e));
            }
        }

        match NonEmpty::from_vec(failures) {
            Some(failures) => Err(HideError { failures }.into()),
            None => Ok(revisions.len()),
        }
    }

    /// Bookmark a cause or opportunity post for `profile`.
    ///
    /// # Errors
    ///
    /// Fails if `target` is hidden or is not a published cause or
    /// opportunity, the wallet is not authorized, or the comment cannot be
    /// created.
    pub fn bookmark(&mut self, profile: &Profile, target: &Post) -> Result<PostId, PublishError> {
        if target.is_hidden {
            return Err(PublishError::Deleted(target.id.clone()));
        }
        let tag = target
            .known_tags()
            .filter(|tag| !tag.is_draft())
            .find_map(|tag| tag.payload().and_then(RecordKind::bookmark_tag))
            .ok_or_else(|| PublishError::NotBookmarkable(target.id.clone()))?;
        self.authorize(profile)?;

        let mut request = PostRequest::new(profile, tag, &self.config);
        request.comment_on = Some(target.id.clone());

        let post_id = self.client.create_post(request)?;
        tracing::info!(%post_id, target = %target.id, "bookmarked");
        Ok(post_id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::domain::{
        post::tests::profile,
        record::tests::{cause, opportunity},
        CauseVersion, OpportunityVersion,
    };

    /// In-memory [`PostClient`] for flow tests.
    #[derive(Debug, Default)]
    pub(crate) struct MemoryClient {
        pub(crate) posts: Vec<Post>,
        pub(crate) requests: Vec<PostRequest>,
        pub(crate) fail_hide: Vec<PostId>,
    }

    impl PostClient for MemoryClient {
        fn create_post(&mut self, request: PostRequest) -> Result<PostId, ClientError> {
            let id = format!("{}-0x{:02x}", request.profile.id, self.posts.len() + 1);
            let created_at = Utc.with_ymd_and_hms(2023, 7, 1, 12, 0, 0).unwrap()
                + Duration::minutes(i64::try_from(self.posts.len()).unwrap());
            self.posts.push(Post {
                id: id.clone(),
                profile: request.profile.clone(),
                created_at,
                is_hidden: false,
                tags: request.tags.clone(),
                attributes: request.attributes.clone(),
                comment_on: request.comment_on.clone(),
            });
            self.requests.push(request);
            Ok(id)
        }

        fn fetch_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, ClientError> {
            Ok(self
                .posts
                .iter()
                .filter(|post| filter.matches(post))
                .cloned()
                .collect())
        }

        fn hide_post(&mut self, post_id: &str) -> Result<(), ClientError> {
            if self.fail_hide.iter().any(|id| id == post_id) {
                return Err(ClientError::new("rpc timeout"));
            }
            let post = self
                .posts
                .iter_mut()
                .find(|post| post.id == post_id)
                .ok_or_else(|| ClientError::new("no such post"))?;
            post.is_hidden = true;
            Ok(())
        }
    }

    struct AllowAll;

    impl WalletAuth for AllowAll {
        fn check_auth(&self, _address: &str) -> Result<(), ClientError> {
            Ok(())
        }
    }

    fn publisher() -> Publisher<MemoryClient, AllowAll> {
        Publisher::new(MemoryClient::default(), AllowAll, &Config::default())
    }

    #[test]
    fn publish_builds_request_from_record() {
        let mut publisher = publisher();
        let record: DomainRecord = cause(CauseVersion::V1_0_1).into();
        publisher.publish(&profile(), &record).unwrap();

        let request = &publisher.client().requests[0];
        assert_eq!(request.tags, vec!["ORG_PUBLISH_CAUSE".to_string()]);
        assert_eq!(request.content, "#ORG_PUBLISH_CAUSE");
        assert_eq!(request.name, "ORG_PUBLISH_CAUSE by redcross.lens");
        assert_eq!(request.app_id, "BCharity");
        assert_eq!(request.locale, "en");
        assert_eq!(request.attributes, record.to_attributes());
    }

    #[test]
    fn unchanged_modification_is_skipped() {
        let mut publisher = publisher();
        let record: DomainRecord = cause(CauseVersion::V1_0_1).into();
        let outcome = publisher.modify(&profile(), &record, &record).unwrap();
        assert_eq!(outcome, Modified::Unchanged);
        assert!(publisher.client().posts.is_empty());
    }

    #[test]
    fn modification_must_keep_the_id() {
        let mut publisher = publisher();
        let previous: DomainRecord = cause(CauseVersion::V1_0_1).into();
        let record: DomainRecord = opportunity(OpportunityVersion::V1_0_1).into();
        assert!(matches!(
            publisher.modify(&profile(), &record, &previous),
            Err(PublishError::IdMismatch { .. })
        ));
    }

    #[test]
    fn delete_hides_every_revision() {
        let mut publisher = publisher();
        let first = cause(CauseVersion::V1_0_0);
        let mut second = cause(CauseVersion::V1_0_1);
        second.goal = 500.0;
        let other: DomainRecord = opportunity(OpportunityVersion::V1_0_1).into();

        publisher.publish(&profile(), &first.clone().into()).unwrap();
        publisher.publish(&profile(), &second.into()).unwrap();
        publisher.publish(&profile(), &other).unwrap();

        assert_eq!(publisher.delete(&profile(), first.id).unwrap(), 2);
        let posts = &publisher.client().posts;
        assert!(posts[0].is_hidden && posts[1].is_hidden);
        assert!(!posts[2].is_hidden);

        assert!(matches!(
            publisher.delete(&profile(), first.id),
            Err(PublishError::NotFound(_))
        ));
    }

    #[test]
    fn revisions_of_lists_only_visible_posts_of_the_author() {
        let mut publisher = publisher();
        let first = cause(CauseVersion::V1_0_0);
        let mut second = cause(CauseVersion::V1_0_1);
        second.goal = 500.0;

        let hidden = publisher.publish(&profile(), &first.clone().into()).unwrap();
        let visible = publisher.publish(&profile(), &second.clone().into()).unwrap();
        publisher.client.hide_post(&hidden).unwrap();

        let mut other = profile();
        other.id = "0x02".to_string();
        publisher.publish(&other, &second.into()).unwrap();

        assert_eq!(
            publisher.revisions_of(&profile(), first.id).unwrap(),
            vec![(visible, RecordKind::Cause)]
        );
        assert_eq!(publisher.delete(&profile(), first.id).unwrap(), 1);
        assert!(!publisher.client().posts[2].is_hidden);
    }

    #[test]
    fn delete_collects_hide_failures() {
        let mut publisher = publisher();
        let record = cause(CauseVersion::V1_0_1);
        let post_id = publisher.publish(&profile(), &record.clone().into()).unwrap();
        publisher.client.fail_hide.push(post_id.clone());

        let Err(PublishError::Hide(error)) = publisher.delete(&profile(), record.id) else {
            panic!("expected hide failure");
        };
        assert_eq!(error.failures().first().0, post_id);
    }

    #[test]
    fn bookmark_points_at_target() {
        let mut publisher = publisher();
        let target_id = publisher
            .publish(&profile(), &opportunity(OpportunityVersion::V1_0_1).into())
            .unwrap();
        let target = publisher.client().posts[0].clone();

        publisher.bookmark(&profile(), &target).unwrap();
        let bookmark = &publisher.client().posts[1];
        assert!(crate::is_bookmark(bookmark));
        assert_eq!(bookmark.comment_on.as_deref(), Some(target_id.as_str()));
        assert!(bookmark.has_tag(PostTag::BookmarkOpportunity));
    }

    #[test]
    fn deleted_posts_cannot_be_bookmarked() {
        let mut publisher = publisher();
        let record = cause(CauseVersion::V1_0_1);
        publisher.publish(&profile(), &record.clone().into()).unwrap();
        publisher.delete(&profile(), record.id).unwrap();
        let target = publisher.client().posts[0].clone();

        assert!(matches!(
            publisher.bookmark(&profile(), &target),
            Err(PublishError::Deleted(_))
        ));
        assert_eq!(publisher.client().posts.len(), 1);
    }

    #[test]
    fn drafts_cannot_be_bookmarked() {
        let mut publisher = publisher();
        let mut draft = cause(CauseVersion::V1_0_1);
        draft.publication = Publication::Draft;
        publisher.publish(&profile(), &draft.into()).unwrap();
        let target = publisher.client().posts[0].clone();
        assert!(matches!(
            publisher.bookmark(&profile(), &target),
            Err(PublishError::NotBookmarkable(_))
        ));
    }

    #[test]
    fn goals_cannot_be_bookmarked() {
        let mut publisher = publisher();
        publisher
            .publish(&profile(), &crate::domain::record::tests::goal().into())
            .unwrap();
        let target = publisher.client().posts[0].clone();
        assert!(matches!(
            publisher.bookmark(&profile(), &target),
            Err(PublishError::NotBookmarkable(_))
        ));
    }

    #[test]
    fn session_auth_compares_owner_address() {
        let auth = SessionAuth::new(Some(Session::new(profile())));
        assert!(
            auth.check_auth("0x3a5bd000000000000000000000000000000005e3")
                .is_ok()
        );
        assert!(auth.check_auth("0x0000000000000000000000000000000000000000").is_err());
        assert!(SessionAuth::new(None).check_auth("0x00").is_err());
    }

    #[test]
    fn unauthorized_publish_creates_nothing() {
        let mut publisher = Publisher::new(
            MemoryClient::default(),
            SessionAuth::new(None),
            &Config::default(),
        );
        let record: DomainRecord = cause(CauseVersion::V1_0_1).into();
        assert!(matches!(
            publisher.publish(&profile(), &record),
            Err(PublishError::Unauthorized(_))
        ));
        assert!(publisher.client().posts.is_empty());
    }
}
