use uuid::Uuid;

use super::{Header, ID_KEY, TYPE_KEY, VERSION_KEY};
use crate::domain::{
    attribute::{Attribute, AttributeWriter},
    error::InvalidMetadata,
    post::Post,
    version::VhrLogVersion,
    PostTag, RecordKind,
};

/// A volunteer's request for an organization to verify logged hours.
///
/// The volunteer is the author of the post; the opportunity is referenced
/// by its logical id so the request survives edits of the opportunity.
#[derive(Debug, Clone, PartialEq)]
pub struct VhrLogMetadata {
    /// Schema version the record is encoded with.
    pub version: VhrLogVersion,
    /// Logical identifier of this request.
    pub id: Uuid,
    /// Logical identifier of the opportunity the hours were spent on.
    pub opportunity_id: Uuid,
    /// Number of hours to verify.
    pub hours_to_verify: f64,
    /// Free text from the volunteer; may be empty.
    pub comments: String,
}

impl VhrLogMetadata {
    /// Encode as an ordered attribute list.
    #[must_use]
    pub fn to_attributes(&self) -> Vec<Attribute> {
        let mut writer = AttributeWriter::with_capacity(6);
        writer
            .string(TYPE_KEY, PostTag::VhrRequestOpportunity.as_str())
            .string(VERSION_KEY, self.version.as_str())
            .uuid(ID_KEY, self.id);

        match self.version {
            VhrLogVersion::V1_0_0 => {
                writer
                    .uuid("opportunityId", self.opportunity_id)
                    .number("hoursToVerify", self.hours_to_verify)
                    .string("comments", &self.comments);
            }
        }

        writer.finish()
    }

    pub(super) fn extract(header: &Header<'_>) -> Result<Self, InvalidMetadata> {
        let version = VhrLogVersion::parse(header.version)?;
        let attributes = &header.attributes;

        match version {
            VhrLogVersion::V1_0_0 => Ok(Self {
                version,
                id: header.id()?,
                opportunity_id: attributes.uuid("opportunityId")?,
                hours_to_verify: attributes.number("hoursToVerify")?,
                comments: attributes.string("comments")?,
            }),
        }
    }
}

impl TryFrom<&Post> for VhrLogMetadata {
    type Error = InvalidMetadata;

    fn try_from(post: &Post) -> Result<Self, Self::Error> {
        Self::extract(&Header::read_as(post, RecordKind::VhrLog)?)
    }
}
