//! Known metadata schema versions, per record kind.
//!
//! Each kind keeps a closed, ordered list of versions. Decoding dispatches on
//! the literal version string; a string missing from the list is a hard
//! failure, so a future schema is never read as the current one. Adding a
//! version means adding a variant here, which the compiler then forces
//! through every extractor `match`.

use std::fmt;

use crate::domain::{error::InvalidMetadata, RecordKind};

/// Schema versions of cause metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CauseVersion {
    /// Name, category, currency, contribution, goal, recipient,
    /// description and an optional image.
    V1_0_0,
    /// Adds the `country-province-city` location.
    V1_0_1,
}

/// Schema versions of volunteer opportunity metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OpportunityVersion {
    /// Name, dates, weekly hours, category, website, description and an
    /// optional image.
    V1_0_0,
    /// Adds the `applicationRequired` flag.
    V1_0_1,
}

/// Schema versions of goal metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GoalVersion {
    /// Goal amount and target date.
    V1_0_0,
}

/// Schema versions of VHR log request metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VhrLogVersion {
    /// Opportunity reference, hours to verify and free-text comments.
    V1_0_0,
}

impl CauseVersion {
    /// Known versions, oldest first.
    pub const ALL: [Self; 2] = [Self::V1_0_0, Self::V1_0_1];
    /// The version new records are written with.
    pub const LATEST: Self = Self::V1_0_1;

    /// The version string written to the `version` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_0_0 => "1.0.0",
            Self::V1_0_1 => "1.0.1",
        }
    }

    /// Look up a version string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMetadata::UnknownVersion`] if the string is not a
    /// known cause version.
    pub fn parse(version: &str) -> Result<Self, InvalidMetadata> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == version)
            .ok_or_else(|| unknown(RecordKind::Cause, version))
    }
}

impl OpportunityVersion {
    /// Known versions, oldest first.
    pub const ALL: [Self; 2] = [Self::V1_0_0, Self::V1_0_1];
    /// The version new records are written with.
    pub const LATEST: Self = Self::V1_0_1;

    /// The version string written to the `version` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_0_0 => "1.0.0",
            Self::V1_0_1 => "1.0.1",
        }
    }

    /// Look up a version string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMetadata::UnknownVersion`] if the string is not a
    /// known opportunity version.
    pub fn parse(version: &str) -> Result<Self, InvalidMetadata> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == version)
            .ok_or_else(|| unknown(RecordKind::Opportunity, version))
    }
}

impl GoalVersion {
    /// Known versions, oldest first.
    pub const ALL: [Self; 1] = [Self::V1_0_0];
    /// The version new records are written with.
    pub const LATEST: Self = Self::V1_0_0;

    /// The version string written to the `version` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_0_0 => "1.0.0",
        }
    }

    /// Look up a version string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMetadata::UnknownVersion`] if the string is not a
    /// known goal version.
    pub fn parse(version: &str) -> Result<Self, InvalidMetadata> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == version)
            .ok_or_else(|| unknown(RecordKind::Goal, version))
    }
}

impl VhrLogVersion {
    /// Known versions, oldest first.
    pub const ALL: [Self; 1] = [Self::V1_0_0];
    /// The version new records are written with.
    pub const LATEST: Self = Self::V1_0_0;

    /// The version string written to the `version` attribute.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1_0_0 => "1.0.0",
        }
    }

    /// Look up a version string.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidMetadata::UnknownVersion`] if the string is not a
    /// known VHR log version.
    pub fn parse(version: &str) -> Result<Self, InvalidMetadata> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == version)
            .ok_or_else(|| unknown(RecordKind::VhrLog, version))
    }
}

fn unknown(kind: RecordKind, version: &str) -> InvalidMetadata {
    InvalidMetadata::UnknownVersion {
        kind,
        version: version.to_string(),
    }
}

impl fmt::Display for CauseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for OpportunityVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for GoalVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for VhrLogVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
