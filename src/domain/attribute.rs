//! Typed key/value attributes, the serialization unit of post metadata.

use std::{collections::HashMap, fmt, str::FromStr};

use borsh::BorshSerialize;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::error::InvalidMetadata;

/// Format used for date-typed attributes.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How a post's attribute value should be interpreted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DisplayType {
    /// Free text.
    #[default]
    String,
    /// A decimal number.
    Number,
    /// A calendar date (`YYYY-MM-DD`).
    Date,
    /// `true` or `false`.
    Boolean,
}

/// A single `(traitType, displayType, value)` attribute attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, BorshSerialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// The key of the attribute.
    pub trait_type: String,
    /// How the value is meant to be read.
    #[serde(default)]
    pub display_type: DisplayType,
    /// The value, always carried as a string.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute.
    pub fn new(
        trait_type: impl Into<String>,
        display_type: DisplayType,
        value: impl Into<String>,
    ) -> Self {
        Self {
            trait_type: trait_type.into(),
            display_type,
            value: value.into(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.trait_type, self.value)
    }
}

/// Accumulates attributes in declaration order.
#[derive(Debug, Default)]
pub(crate) struct AttributeWriter {
    attributes: Vec<Attribute>,
}

impl AttributeWriter {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            attributes: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn string(&mut self, key: &str, value: &str) -> &mut Self {
        self.attributes
            .push(Attribute::new(key, DisplayType::String, value));
        self
    }

    /// Optional values equal to the empty sentinel are left out entirely.
    pub(crate) fn optional_string(&mut self, key: &str, value: &str) -> &mut Self {
        if !value.is_empty() {
            self.string(key, value);
        }
        self
    }

    pub(crate) fn number(&mut self, key: &str, value: f64) -> &mut Self {
        self.attributes
            .push(Attribute::new(key, DisplayType::Number, value.to_string()));
        self
    }

    pub(crate) fn date(&mut self, key: &str, value: NaiveDate) -> &mut Self {
        self.attributes.push(Attribute::new(
            key,
            DisplayType::Date,
            value.format(DATE_FORMAT).to_string(),
        ));
        self
    }

    pub(crate) fn boolean(&mut self, key: &str, value: bool) -> &mut Self {
        self.attributes
            .push(Attribute::new(key, DisplayType::Boolean, value.to_string()));
        self
    }

    pub(crate) fn uuid(&mut self, key: &str, value: Uuid) -> &mut Self {
        self.string(key, &value.to_string())
    }

    pub(crate) fn finish(self) -> Vec<Attribute> {
        self.attributes
    }
}

/// Attributes of a single post indexed by trait type.
///
/// Construction fails if any trait type appears more than once; after that,
/// each accessor either returns the coerced value or the reason it could
/// not.
#[derive(Debug)]
pub(crate) struct AttributeMap<'a> {
    values: HashMap<&'a str, &'a str>,
}

impl<'a> AttributeMap<'a> {
    pub(crate) fn new(attributes: &'a [Attribute]) -> Result<Self, InvalidMetadata> {
        let mut values = HashMap::with_capacity(attributes.len());
        for attribute in attributes {
            if values
                .insert(attribute.trait_type.as_str(), attribute.value.as_str())
                .is_some()
            {
                return Err(InvalidMetadata::DuplicateAttribute {
                    trait_type: attribute.trait_type.clone(),
                });
            }
        }
        Ok(Self { values })
    }

    pub(crate) fn require(&self, key: &str) -> Result<&'a str, InvalidMetadata> {
        self.values
            .get(key)
            .copied()
            .ok_or_else(|| InvalidMetadata::MissingAttribute {
                trait_type: key.to_string(),
            })
    }

    /// Returns the empty sentinel when the attribute is absent.
    pub(crate) fn optional(&self, key: &str) -> &'a str {
        self.values.get(key).copied().unwrap_or_default()
    }

    pub(crate) fn string(&self, key: &str) -> Result<String, InvalidMetadata> {
        self.require(key).map(str::to_string)
    }

    pub(crate) fn number(&self, key: &str) -> Result<f64, InvalidMetadata> {
        let raw = self.require(key)?;
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| invalid(key, raw, "a finite number"))
    }

    pub(crate) fn date(&self, key: &str) -> Result<NaiveDate, InvalidMetadata> {
        let raw = self.require(key)?;
        NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
            .map_err(|_| invalid(key, raw, "a date formatted as YYYY-MM-DD"))
    }

    pub(crate) fn boolean(&self, key: &str) -> Result<bool, InvalidMetadata> {
        let raw = self.require(key)?;
        bool::from_str(raw.trim()).map_err(|_| invalid(key, raw, "'true' or 'false'"))
    }

    pub(crate) fn uuid(&self, key: &str) -> Result<Uuid, InvalidMetadata> {
        let raw = self.require(key)?;
        Uuid::parse_str(raw.trim()).map_err(|_| invalid(key, raw, "a UUID"))
    }
}

fn invalid(key: &str, raw: &str, expected: &'static str) -> InvalidMetadata {
    InvalidMetadata::InvalidValue {
        trait_type: key.to_string(),
        value: raw.to_string(),
        expected,
    }
}
