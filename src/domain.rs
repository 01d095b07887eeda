//! Domain models for volunteer-platform metadata.
//!
//! This module contains the post tags, the attribute codec, the versioned
//! record types and the local session and configuration.

mod tag;
pub use tag::{PostTag, Publication, RecordKind, UnknownTag};

pub mod attribute;
pub use attribute::{Attribute, DisplayType};

/// Decoding errors.
pub mod error;
pub use error::InvalidMetadata;

pub mod version;
pub use version::{CauseVersion, GoalVersion, OpportunityVersion, VhrLogVersion};

pub mod post;
pub use post::{
    is_bookmark, is_cause, is_cause_draft, is_goal, is_opportunity, is_opportunity_draft,
    is_recognized, is_vhr_log, Post, Profile,
};

pub mod record;
pub use record::{
    decode, encode, fingerprint, CauseMetadata, DomainRecord, GoalMetadata, OpportunityMetadata,
    VhrLogMetadata,
};

/// Structured `country-province-city` locations.
pub mod location;
pub use location::{Location, LocationError};

pub mod session;
pub use session::{Session, SessionError, SessionStore};

mod config;
pub use config::{Config, DEFAULT_CURRENCY};
