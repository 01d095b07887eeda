//! Domain records and their attribute encoding.
//!
//! A record is encoded as an ordered attribute list: `type`, `version`,
//! `id`, then the fields the version declares, in declaration order.
//! Decoding reads the same list back, dispatching on the `type` tag and
//! then on the literal `version` string.

use borsh::BorshSerialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::{
    attribute::{Attribute, AttributeMap},
    error::InvalidMetadata,
    post::Post,
    PostTag, Publication, RecordKind,
};

mod cause;
pub use cause::CauseMetadata;

mod opportunity;
pub use opportunity::OpportunityMetadata;

mod goal;
pub use goal::GoalMetadata;

mod vhr_log;
pub use vhr_log::VhrLogMetadata;

/// Key of the record type discriminator attribute.
pub const TYPE_KEY: &str = "type";
/// Key of the schema version attribute.
pub const VERSION_KEY: &str = "version";
/// Key of the logical identifier attribute.
pub const ID_KEY: &str = "id";
/// Key of the optional image attribute on causes and opportunities.
pub const IMAGE_URL_KEY: &str = "imageUrl";

/// Any record this crate knows how to encode and decode.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainRecord {
    /// A fundraising cause.
    Cause(CauseMetadata),
    /// A volunteer opportunity.
    Opportunity(OpportunityMetadata),
    /// An organization's VHR goal.
    Goal(GoalMetadata),
    /// A volunteer's request to verify hours.
    VhrLog(VhrLogMetadata),
}

impl DomainRecord {
    /// The kind of this record.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Cause(_) => RecordKind::Cause,
            Self::Opportunity(_) => RecordKind::Opportunity,
            Self::Goal(_) => RecordKind::Goal,
            Self::VhrLog(_) => RecordKind::VhrLog,
        }
    }

    /// The tag this record is published under, also its `type` attribute.
    #[must_use]
    pub const fn tag(&self) -> PostTag {
        match self {
            Self::Cause(cause) => cause.tag(),
            Self::Opportunity(opportunity) => opportunity.tag(),
            Self::Goal(_) => PostTag::OrgPublishGoal,
            Self::VhrLog(_) => PostTag::VhrRequestOpportunity,
        }
    }

    /// The schema version string.
    #[must_use]
    pub const fn version(&self) -> &'static str {
        match self {
            Self::Cause(cause) => cause.version.as_str(),
            Self::Opportunity(opportunity) => opportunity.version.as_str(),
            Self::Goal(goal) => goal.version.as_str(),
            Self::VhrLog(log) => log.version.as_str(),
        }
    }

    /// The logical identifier shared by every version of this record.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::Cause(cause) => cause.id,
            Self::Opportunity(opportunity) => opportunity.id,
            Self::Goal(goal) => goal.id,
            Self::VhrLog(log) => log.id,
        }
    }

    /// Whether this record is an unpublished draft.
    #[must_use]
    pub const fn is_draft(&self) -> bool {
        self.tag().is_draft()
    }

    /// Encode the record as an ordered attribute list.
    ///
    /// Encoding is pure and deterministic: equal records always produce
    /// identical lists.
    #[must_use]
    pub fn to_attributes(&self) -> Vec<Attribute> {
        match self {
            Self::Cause(cause) => cause.to_attributes(),
            Self::Opportunity(opportunity) => opportunity.to_attributes(),
            Self::Goal(goal) => goal.to_attributes(),
            Self::VhrLog(log) => log.to_attributes(),
        }
    }

    /// A stable hash of the encoded record.
    ///
    /// Two records with the same fingerprint would be published as
    /// identical attribute lists.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.to_attributes())
    }

    /// Decode the record held by `post`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMetadata`] if the post's `type` is not a recognized
    /// record tag (or is not among the post's tags), a required attribute is
    /// missing or malformed, or the version is not known.
    pub fn decode(post: &Post) -> Result<Self, InvalidMetadata> {
        Self::try_from(post)
    }
}

impl TryFrom<&Post> for DomainRecord {
    type Error = InvalidMetadata;

    fn try_from(post: &Post) -> Result<Self, Self::Error> {
        let header = Header::read(post)?;
        let kind = header
            .tag
            .payload()
            .ok_or_else(|| InvalidMetadata::UnrecognizedTag(header.tag.to_string()))?;

        match kind {
            RecordKind::Cause => CauseMetadata::extract(&header).map(Self::Cause),
            RecordKind::Opportunity => {
                OpportunityMetadata::extract(&header).map(Self::Opportunity)
            }
            RecordKind::Goal => GoalMetadata::extract(&header).map(Self::Goal),
            RecordKind::VhrLog => VhrLogMetadata::extract(&header).map(Self::VhrLog),
        }
    }
}

impl From<CauseMetadata> for DomainRecord {
    fn from(cause: CauseMetadata) -> Self {
        Self::Cause(cause)
    }
}

impl From<OpportunityMetadata> for DomainRecord {
    fn from(opportunity: OpportunityMetadata) -> Self {
        Self::Opportunity(opportunity)
    }
}

impl From<GoalMetadata> for DomainRecord {
    fn from(goal: GoalMetadata) -> Self {
        Self::Goal(goal)
    }
}

impl From<VhrLogMetadata> for DomainRecord {
    fn from(log: VhrLogMetadata) -> Self {
        Self::VhrLog(log)
    }
}

/// Encode a record as an ordered attribute list.
#[must_use]
pub fn encode(record: &DomainRecord) -> Vec<Attribute> {
    record.to_attributes()
}

/// Decode the record held by `post`.
///
/// # Errors
///
/// See [`DomainRecord::decode`].
pub fn decode(post: &Post) -> Result<DomainRecord, InvalidMetadata> {
    DomainRecord::try_from(post)
}

/// SHA-256 of the borsh-encoded attribute list, as lowercase hex.
#[must_use]
pub fn fingerprint(attributes: &[Attribute]) -> String {
    #[derive(BorshSerialize)]
    struct FingerprintData<'a> {
        attributes: &'a [Attribute],
    }

    let encoded =
        borsh::to_vec(&FingerprintData { attributes }).expect("this should never fail");
    format!("{:x}", Sha256::digest(encoded))
}

/// The parts of a post every extractor reads first.
#[derive(Debug)]
pub(crate) struct Header<'a> {
    pub(crate) attributes: AttributeMap<'a>,
    pub(crate) tag: PostTag,
    pub(crate) version: &'a str,
}

impl<'a> Header<'a> {
    fn read(post: &'a Post) -> Result<Self, InvalidMetadata> {
        let attributes = AttributeMap::new(&post.attributes)?;

        let declared = attributes.require(TYPE_KEY)?;
        let tag: PostTag = declared
            .parse()
            .map_err(|_| InvalidMetadata::UnrecognizedTag(declared.to_string()))?;

        if !post.has_tag(tag) {
            return Err(InvalidMetadata::TagMismatch {
                declared: tag,
                tags: post.tags.clone(),
            });
        }

        let version = attributes.require(VERSION_KEY)?;

        Ok(Self {
            attributes,
            tag,
            version,
        })
    }

    /// Read the header of a post expected to hold a record of `kind`.
    pub(crate) fn read_as(post: &'a Post, kind: RecordKind) -> Result<Self, InvalidMetadata> {
        let header = Self::read(post)?;
        match header.tag.payload() {
            Some(found) if found == kind => Ok(header),
            Some(_) => Err(InvalidMetadata::WrongKind {
                expected: kind,
                found: header.tag,
            }),
            None => Err(InvalidMetadata::UnrecognizedTag(header.tag.to_string())),
        }
    }

    pub(crate) const fn publication(&self) -> Publication {
        if self.tag.is_draft() {
            Publication::Draft
        } else {
            Publication::Published
        }
    }

    pub(crate) fn id(&self) -> Result<Uuid, InvalidMetadata> {
        self.attributes.uuid(ID_KEY)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{
        post::tests::post_with,
        version::{CauseVersion, GoalVersion, OpportunityVersion, VhrLogVersion},
    };

    /// Wraps encoded attributes into the external post shape.
    pub(crate) fn post_from(record: &DomainRecord) -> Post {
        post_with(&[record.tag().as_str()], record.to_attributes())
    }

    fn id(n: u128) -> Uuid {
        Uuid::from_u128(n)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn cause(version: CauseVersion) -> CauseMetadata {
        CauseMetadata {
            publication: Publication::Published,
            version,
            id: id(1),
            name: "Medical Internship".to_string(),
            category: "Healthcare".to_string(),
            currency: "WMATIC".to_string(),
            contribution: 5.0,
            goal: 420.0,
            recipient: "0x3A5bd000000000000000000000000000000005e3".to_string(),
            description: "desc".to_string(),
            location: match version {
                CauseVersion::V1_0_0 => String::new(),
                CauseVersion::V1_0_1 => "Canada-Alberta-Calgary".to_string(),
            },
            image_url: String::new(),
        }
    }

    pub(crate) fn opportunity(version: OpportunityVersion) -> OpportunityMetadata {
        OpportunityMetadata {
            publication: Publication::Published,
            version,
            id: id(2),
            name: "Food bank shifts".to_string(),
            start_date: date(2023, 7, 1),
            end_date: date(2023, 8, 31),
            hours_per_week: 4.5,
            category: "Community".to_string(),
            website: "https://example.org".to_string(),
            description: "Sort and pack donations".to_string(),
            image_url: "ipfs://bafy".to_string(),
            application_required: match version {
                OpportunityVersion::V1_0_0 => false,
                OpportunityVersion::V1_0_1 => true,
            },
        }
    }

    pub(crate) fn goal() -> GoalMetadata {
        GoalMetadata {
            version: GoalVersion::V1_0_0,
            id: id(3),
            goal: 600.0,
            goal_date: date(2023, 12, 31),
        }
    }

    pub(crate) fn vhr_log() -> VhrLogMetadata {
        VhrLogMetadata {
            version: VhrLogVersion::V1_0_0,
            id: id(4),
            opportunity_id: id(2),
            hours_to_verify: 12.5,
            comments: "Two weekends at the warehouse".to_string(),
        }
    }

    /// One record per supported `(kind, version)` pair, drafts included.
    pub(crate) fn every_record() -> Vec<DomainRecord> {
        let mut records: Vec<DomainRecord> = Vec::new();
        for version in CauseVersion::ALL {
            records.push(cause(version).into());
            let mut draft = cause(version);
            draft.publication = Publication::Draft;
            records.push(draft.into());
        }
        for version in OpportunityVersion::ALL {
            records.push(opportunity(version).into());
            let mut draft = opportunity(version);
            draft.publication = Publication::Draft;
            records.push(draft.into());
        }
        records.push(goal().into());
        records.push(vhr_log().into());
        records
    }

    #[test]
    fn round_trip_every_kind_and_version() {
        for record in every_record() {
            let decoded = decode(&post_from(&record)).unwrap();
            assert_eq!(decoded, record);
        }
    }

    #[test]
    fn encode_is_idempotent() {
        for record in every_record() {
            assert_eq!(encode(&record), encode(&record.clone()));
            assert_eq!(record.fingerprint(), record.clone().fingerprint());
        }
    }

    #[test]
    fn encoding_starts_with_type_version_id() {
        for record in every_record() {
            let attributes = record.to_attributes();
            let keys: Vec<_> = attributes.iter().map(|a| a.trait_type.as_str()).collect();
            assert_eq!(&keys[..3], [TYPE_KEY, VERSION_KEY, ID_KEY]);
            assert_eq!(attributes[0].value, record.tag().as_str());
            assert_eq!(attributes[1].value, record.version());
            assert_eq!(attributes[2].value, record.id().to_string());
        }
    }

    #[test]
    fn removing_any_required_attribute_fails() {
        for record in every_record() {
            let attributes = record.to_attributes();
            for index in 0..attributes.len() {
                if attributes[index].trait_type == IMAGE_URL_KEY {
                    continue;
                }
                let mut post = post_from(&record);
                let removed = post.attributes.remove(index);
                let err = decode(&post).unwrap_err();
                assert_eq!(
                    err,
                    InvalidMetadata::MissingAttribute {
                        trait_type: removed.trait_type.clone()
                    },
                    "removing {} from {:?}",
                    removed.trait_type,
                    record.kind()
                );
            }
        }
    }

    #[test]
    fn unknown_version_fails_even_when_well_formed() {
        for record in every_record() {
            let mut post = post_from(&record);
            post.attributes[1].value = "9.9.9".to_string();
            assert_eq!(
                decode(&post),
                Err(InvalidMetadata::UnknownVersion {
                    kind: record.kind(),
                    version: "9.9.9".to_string()
                })
            );
        }
    }

    #[test]
    fn decoded_cause_keeps_category_and_location() {
        let post = post_from(&cause(CauseVersion::V1_0_1).into());
        let DomainRecord::Cause(decoded) = decode(&post).unwrap() else {
            panic!("expected a cause");
        };
        assert_eq!(decoded.category, "Healthcare");
        assert_eq!(decoded.location, "Canada-Alberta-Calgary");
    }

    #[test]
    fn type_must_be_among_post_tags() {
        let record: DomainRecord = goal().into();
        let post = post_with(&[PostTag::OrgPublishCause.as_str()], record.to_attributes());
        assert!(matches!(
            decode(&post),
            Err(InvalidMetadata::TagMismatch {
                declared: PostTag::OrgPublishGoal,
                ..
            })
        ));
    }

    #[test]
    fn unknown_type_is_unrecognized() {
        let record: DomainRecord = goal().into();
        let mut post = post_from(&record);
        post.attributes[0].value = "ORG_PUBLISH_NEWSLETTER".to_string();
        assert_eq!(
            decode(&post),
            Err(InvalidMetadata::UnrecognizedTag(
                "ORG_PUBLISH_NEWSLETTER".to_string()
            ))
        );
    }

    #[test]
    fn bookmark_tag_holds_no_record() {
        let post = post_with(
            &[PostTag::BookmarkCause.as_str()],
            vec![
                Attribute::new(TYPE_KEY, crate::DisplayType::String, "BOOKMARK_CAUSE"),
                Attribute::new(VERSION_KEY, crate::DisplayType::String, "1.0.0"),
            ],
        );
        assert!(matches!(
            decode(&post),
            Err(InvalidMetadata::UnrecognizedTag(_))
        ));
    }

    #[test]
    fn duplicate_type_attribute_fails() {
        let record: DomainRecord = vhr_log().into();
        let mut post = post_from(&record);
        let first = post.attributes[0].clone();
        post.attributes.push(first);
        assert!(matches!(
            decode(&post),
            Err(InvalidMetadata::DuplicateAttribute { .. })
        ));
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let a: DomainRecord = cause(CauseVersion::V1_0_1).into();
        let mut changed = cause(CauseVersion::V1_0_1);
        changed.goal = 421.0;
        let b: DomainRecord = changed.into();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
