use chrono::NaiveDate;
use uuid::Uuid;

use super::{Header, ID_KEY, TYPE_KEY, VERSION_KEY};
use crate::domain::{
    attribute::{Attribute, AttributeWriter},
    error::InvalidMetadata,
    post::Post,
    version::GoalVersion,
    PostTag, RecordKind,
};

/// A VHR goal an organization sets for itself.
///
/// Only the most recent goal post of a profile is meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalMetadata {
    /// Schema version the record is encoded with.
    pub version: GoalVersion,
    /// Logical identifier.
    pub id: Uuid,
    /// Target number of volunteer hours.
    pub goal: f64,
    /// Date by which the goal should be reached.
    pub goal_date: NaiveDate,
}

impl GoalMetadata {
    /// Encode as an ordered attribute list.
    #[must_use]
    pub fn to_attributes(&self) -> Vec<Attribute> {
        let mut writer = AttributeWriter::with_capacity(5);
        writer
            .string(TYPE_KEY, PostTag::OrgPublishGoal.as_str())
            .string(VERSION_KEY, self.version.as_str())
            .uuid(ID_KEY, self.id);

        match self.version {
            GoalVersion::V1_0_0 => {
                writer
                    .number("goal", self.goal)
                    .date("goalDate", self.goal_date);
            }
        }

        writer.finish()
    }

    pub(super) fn extract(header: &Header<'_>) -> Result<Self, InvalidMetadata> {
        let version = GoalVersion::parse(header.version)?;
        let attributes = &header.attributes;

        match version {
            GoalVersion::V1_0_0 => Ok(Self {
                version,
                id: header.id()?,
                goal: attributes.number("goal")?,
                goal_date: attributes.date("goalDate")?,
            }),
        }
    }
}

impl TryFrom<&Post> for GoalMetadata {
    type Error = InvalidMetadata;

    fn try_from(post: &Post) -> Result<Self, Self::Error> {
        Self::extract(&Header::read_as(post, RecordKind::Goal)?)
    }
}
