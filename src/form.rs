//! Raw form input and its validation into records.
//!
//! Encoding trusts its input, so everything a user types goes through one
//! of these forms first. Forms always produce records at the latest schema
//! version.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use uuid::Uuid;

use crate::domain::{
    attribute::DATE_FORMAT,
    location::{Location, LocationError},
    record::{CauseMetadata, GoalMetadata, OpportunityMetadata, VhrLogMetadata},
    version::{CauseVersion, GoalVersion, OpportunityVersion, VhrLogVersion},
    Publication,
};

/// Longest accepted name for causes and opportunities.
pub const MAX_NAME_LENGTH: usize = 100;

/// Largest accepted contribution or fundraising goal.
pub const MAX_AMOUNT: f64 = 100_000.0;

static ADDRESS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid regex"));

/// A form field that failed validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FormError {
    /// A required field was left empty.
    #[error("{0} is required")]
    Required(&'static str),

    /// A field is longer than allowed.
    #[error("{field} must be at most {max} characters")]
    TooLong {
        /// The field.
        field: &'static str,
        /// The maximum length.
        max: usize,
    },

    /// A numeric field does not hold a number.
    #[error("{field} must be a number, got '{value}'")]
    NotANumber {
        /// The field.
        field: &'static str,
        /// What was entered.
        value: String,
    },

    /// A numeric field is outside its accepted range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        /// The field.
        field: &'static str,
        /// Smallest accepted value.
        min: f64,
        /// Largest accepted value.
        max: f64,
    },

    /// A date field is not `YYYY-MM-DD`.
    #[error("{field} must be a date formatted as YYYY-MM-DD, got '{value}'")]
    InvalidDate {
        /// The field.
        field: &'static str,
        /// What was entered.
        value: String,
    },

    /// The end date is before the start date.
    #[error("end date must not be before start date")]
    EndBeforeStart,

    /// The recipient is not a wallet address.
    #[error("'{0}' is not a wallet address")]
    InvalidAddress(String),

    /// The location parts do not form a location.
    #[error(transparent)]
    Location(#[from] LocationError),
}

/// Input of the publish/modify cause forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CauseForm {
    /// Cause name.
    pub name: String,
    /// Category.
    pub category: String,
    /// Token address contributions are made in.
    pub currency: String,
    /// Suggested contribution.
    pub contribution: String,
    /// Fundraising goal.
    pub goal: String,
    /// Receiving wallet address.
    pub recipient: String,
    /// Description.
    pub description: String,
    /// Country name.
    pub country: String,
    /// Province or state name.
    pub province: String,
    /// City name.
    pub city: String,
    /// Image URL, possibly empty.
    pub image_url: String,
}

impl CauseForm {
    /// Validate the form into a cause with logical id `id`.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] found.
    pub fn into_record(
        self,
        id: Uuid,
        publication: Publication,
    ) -> Result<CauseMetadata, FormError> {
        let name = name(self.name)?;
        let category = required("category", self.category)?;
        let currency = required("currency", self.currency)?;
        let contribution = amount("contribution", &self.contribution, 0.0, MAX_AMOUNT)?;
        let goal = amount("goal", &self.goal, 0.0, MAX_AMOUNT)?;
        let recipient = required("recipient", self.recipient)?;
        if !ADDRESS.is_match(&recipient) {
            return Err(FormError::InvalidAddress(recipient));
        }
        let description = required("description", self.description)?;
        let location = Location::new(&self.country, &self.province, &self.city)?;

        Ok(CauseMetadata {
            publication,
            version: CauseVersion::LATEST,
            id,
            name,
            category,
            currency,
            contribution,
            goal,
            recipient,
            description,
            location: location.to_string(),
            image_url: self.image_url.trim().to_string(),
        })
    }
}

impl From<&CauseMetadata> for CauseForm {
    fn from(cause: &CauseMetadata) -> Self {
        let location = cause.location.parse::<Location>().ok();
        let part = |f: fn(&Location) -> &str| {
            location.as_ref().map(f).unwrap_or_default().to_string()
        };
        Self {
            name: cause.name.clone(),
            category: cause.category.clone(),
            currency: cause.currency.clone(),
            contribution: cause.contribution.to_string(),
            goal: cause.goal.to_string(),
            recipient: cause.recipient.clone(),
            description: cause.description.clone(),
            country: part(Location::country),
            province: part(Location::province),
            city: part(Location::city),
            image_url: cause.image_url.clone(),
        }
    }
}

/// Input of the publish/modify opportunity forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpportunityForm {
    /// Opportunity name.
    pub name: String,
    /// First day, `YYYY-MM-DD`.
    pub start_date: String,
    /// Last day, `YYYY-MM-DD`.
    pub end_date: String,
    /// Expected hours per week.
    pub hours_per_week: String,
    /// Category.
    pub category: String,
    /// Website.
    pub website: String,
    /// Description.
    pub description: String,
    /// Image URL, possibly empty.
    pub image_url: String,
    /// Whether volunteers must apply first.
    pub application_required: bool,
}

impl OpportunityForm {
    /// Validate the form into an opportunity with logical id `id`.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] found.
    pub fn into_record(
        self,
        id: Uuid,
        publication: Publication,
    ) -> Result<OpportunityMetadata, FormError> {
        let name = name(self.name)?;
        let start_date = date("start date", &self.start_date)?;
        let end_date = date("end date", &self.end_date)?;
        if end_date < start_date {
            return Err(FormError::EndBeforeStart);
        }
        let hours_per_week = amount("hours per week", &self.hours_per_week, 0.1, 168.0)?;

        Ok(OpportunityMetadata {
            publication,
            version: OpportunityVersion::LATEST,
            id,
            name,
            start_date,
            end_date,
            hours_per_week,
            category: required("category", self.category)?,
            website: required("website", self.website)?,
            description: required("description", self.description)?,
            image_url: self.image_url.trim().to_string(),
            application_required: self.application_required,
        })
    }
}

impl From<&OpportunityMetadata> for OpportunityForm {
    fn from(opportunity: &OpportunityMetadata) -> Self {
        Self {
            name: opportunity.name.clone(),
            start_date: opportunity.start_date.format(DATE_FORMAT).to_string(),
            end_date: opportunity.end_date.format(DATE_FORMAT).to_string(),
            hours_per_week: opportunity.hours_per_week.to_string(),
            category: opportunity.category.clone(),
            website: opportunity.website.clone(),
            description: opportunity.description.clone(),
            image_url: opportunity.image_url.clone(),
            application_required: opportunity.application_required,
        }
    }
}

/// Input of the goal form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalForm {
    /// Target hours.
    pub goal: String,
    /// Target date, `YYYY-MM-DD`.
    pub goal_date: String,
}

impl GoalForm {
    /// Validate the form into a goal with logical id `id`.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] found.
    pub fn into_record(self, id: Uuid) -> Result<GoalMetadata, FormError> {
        Ok(GoalMetadata {
            version: GoalVersion::LATEST,
            id,
            goal: amount("goal", &self.goal, 0.1, f64::MAX)?,
            goal_date: date("goal date", &self.goal_date)?,
        })
    }
}

/// Input of the log-hours form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VhrLogForm {
    /// The opportunity the hours were spent on.
    pub opportunity_id: Uuid,
    /// Hours to verify.
    pub hours: String,
    /// Free text for the organization.
    pub comments: String,
}

impl VhrLogForm {
    /// Validate the form into a VHR log request with logical id `id`.
    ///
    /// # Errors
    ///
    /// Returns the first [`FormError`] found.
    pub fn into_record(self, id: Uuid) -> Result<VhrLogMetadata, FormError> {
        Ok(VhrLogMetadata {
            version: VhrLogVersion::LATEST,
            id,
            opportunity_id: self.opportunity_id,
            hours_to_verify: amount("hours", &self.hours, 0.1, f64::MAX)?,
            comments: self.comments.trim().to_string(),
        })
    }
}

fn required(field: &'static str, value: String) -> Result<String, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(FormError::Required(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn name(value: String) -> Result<String, FormError> {
    let name = required("name", value)?;
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(FormError::TooLong {
            field: "name",
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(name)
}

fn amount(field: &'static str, value: &str, min: f64, max: f64) -> Result<f64, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::Required(field));
    }
    let number = trimmed
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| FormError::NotANumber {
            field,
            value: trimmed.to_string(),
        })?;
    if number < min || number > max {
        return Err(FormError::OutOfRange { field, min, max });
    }
    Ok(number)
}

fn date(field: &'static str, value: &str) -> Result<NaiveDate, FormError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FormError::Required(field));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| FormError::InvalidDate {
        field,
        value: trimmed.to_string(),
    })
}
