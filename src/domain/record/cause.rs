use uuid::Uuid;

use super::{Header, ID_KEY, IMAGE_URL_KEY, TYPE_KEY, VERSION_KEY};
use crate::domain::{
    attribute::{Attribute, AttributeWriter},
    error::InvalidMetadata,
    post::Post,
    version::CauseVersion,
    PostTag, Publication, RecordKind,
};

/// A fundraising cause published by an organization.
///
/// Contributions are collected in `currency` and forwarded to `recipient`.
#[derive(Debug, Clone, PartialEq)]
pub struct CauseMetadata {
    /// Published or draft.
    pub publication: Publication,
    /// Schema version the record is encoded with.
    pub version: CauseVersion,
    /// Logical identifier shared by every edit of this cause.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Free-form category used for filtering.
    pub category: String,
    /// Address of the token contributions are made in.
    pub currency: String,
    /// Suggested contribution amount.
    pub contribution: f64,
    /// Fundraising target.
    pub goal: f64,
    /// Wallet address receiving the funds.
    pub recipient: String,
    /// Long description.
    pub description: String,
    /// `country-province-city`; empty before version 1.0.1.
    pub location: String,
    /// Image URL; empty when there is none.
    pub image_url: String,
}

impl CauseMetadata {
    /// The tag this cause is published under.
    #[must_use]
    pub const fn tag(&self) -> PostTag {
        RecordKind::Cause.tag(self.publication)
    }

    /// Encode as an ordered attribute list.
    #[must_use]
    pub fn to_attributes(&self) -> Vec<Attribute> {
        let mut writer = AttributeWriter::with_capacity(12);
        writer
            .string(TYPE_KEY, self.tag().as_str())
            .string(VERSION_KEY, self.version.as_str())
            .uuid(ID_KEY, self.id)
            .string("name", &self.name)
            .string("category", &self.category)
            .string("currency", &self.currency)
            .number("contribution", self.contribution)
            .number("goal", self.goal)
            .string("recipient", &self.recipient)
            .string("description", &self.description);

        match self.version {
            CauseVersion::V1_0_0 => {}
            CauseVersion::V1_0_1 => {
                writer.string("location", &self.location);
            }
        }

        writer.optional_string(IMAGE_URL_KEY, &self.image_url);
        writer.finish()
    }

    pub(super) fn extract(header: &Header<'_>) -> Result<Self, InvalidMetadata> {
        let version = CauseVersion::parse(header.version)?;
        let attributes = &header.attributes;

        let location = match version {
            CauseVersion::V1_0_0 => String::new(),
            CauseVersion::V1_0_1 => attributes.string("location")?,
        };

        Ok(Self {
            publication: header.publication(),
            version,
            id: header.id()?,
            name: attributes.string("name")?,
            category: attributes.string("category")?,
            currency: attributes.string("currency")?,
            contribution: attributes.number("contribution")?,
            goal: attributes.number("goal")?,
            recipient: attributes.string("recipient")?,
            description: attributes.string("description")?,
            location,
            image_url: attributes.optional(IMAGE_URL_KEY).to_string(),
        })
    }
}

impl TryFrom<&Post> for CauseMetadata {
    type Error = InvalidMetadata;

    fn try_from(post: &Post) -> Result<Self, Self::Error> {
        Self::extract(&Header::read_as(post, RecordKind::Cause)?)
    }
}
