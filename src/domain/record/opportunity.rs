use chrono::NaiveDate;
use uuid::Uuid;

use super::{Header, ID_KEY, IMAGE_URL_KEY, TYPE_KEY, VERSION_KEY};
use crate::domain::{
    attribute::{Attribute, AttributeWriter},
    error::InvalidMetadata,
    post::Post,
    version::OpportunityVersion,
    PostTag, Publication, RecordKind,
};

/// A volunteer opportunity published by an organization.
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityMetadata {
    /// Published or draft.
    pub publication: Publication,
    /// Schema version the record is encoded with.
    pub version: OpportunityVersion,
    /// Logical identifier shared by every edit of this opportunity.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// First day of the opportunity.
    pub start_date: NaiveDate,
    /// Last day of the opportunity.
    pub end_date: NaiveDate,
    /// Expected commitment in hours per week.
    pub hours_per_week: f64,
    /// Free-form category used for filtering.
    pub category: String,
    /// Where to find out more.
    pub website: String,
    /// Long description.
    pub description: String,
    /// Image URL; empty when there is none.
    pub image_url: String,
    /// Whether volunteers must apply first; `false` before version 1.0.1.
    pub application_required: bool,
}

impl OpportunityMetadata {
    /// The tag this opportunity is published under.
    #[must_use]
    pub const fn tag(&self) -> PostTag {
        RecordKind::Opportunity.tag(self.publication)
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
            .date("startDate", self.start_date)
            .date("endDate", self.end_date)
            .number("hoursPerWeek", self.hours_per_week)
            .string("category", &self.category)
            .string("website", &self.website)
            .string("description", &self.description)
            .optional_string(IMAGE_URL_KEY, &self.image_url);

        match self.version {
            OpportunityVersion::V1_0_0 => {}
            OpportunityVersion::V1_0_1 => {
                writer.boolean("applicationRequired", self.application_required);
            }
        }

        writer.finish()
    }

    pub(super) fn extract(header: &Header<'_>) -> Result<Self, InvalidMetadata> {
        let version = OpportunityVersion::parse(header.version)?;
        let attributes = &header.attributes;
        let id = header.id()?;

        let application_required = match version {
            OpportunityVersion::V1_0_0 => false,
            OpportunityVersion::V1_0_1 => attributes.boolean("applicationRequired")?,
        };

        Ok(Self {
            publication: header.publication(),
            version,
            id,
            name: attributes.string("name")?,
            start_date: attributes.date("startDate")?,
            end_date: attributes.date("endDate")?,
            hours_per_week: attributes.number("hoursPerWeek")?,
            category: attributes.string("category")?,
            website: attributes.string("website")?,
            description: attributes.string("description")?,
            image_url: attributes.optional(IMAGE_URL_KEY).to_string(),
            application_required,
        })
    }
}

impl TryFrom<&Post> for OpportunityMetadata {
    type Error = InvalidMetadata;

    fn try_from(post: &Post) -> Result<Self, Self::Error> {
        Self::extract(&Header::read_as(post, RecordKind::Opportunity)?)
    }
}
