//! Volunteer-platform metadata over a social protocol
//!
//! Causes, volunteer opportunities, VHR goals and VHR log requests are
//! published as immutable posts whose metadata is a list of typed
//! attributes. This crate encodes records into those attributes, recognizes
//! and decodes them again, and builds the publishing flows, timeline and
//! queries on top.

pub mod domain;
pub use domain::{
    decode, encode, fingerprint, is_bookmark, is_cause, is_cause_draft, is_goal, is_opportunity,
    is_opportunity_draft, is_recognized, is_vhr_log, Attribute, CauseMetadata, Config,
    DisplayType, DomainRecord, GoalMetadata, InvalidMetadata, OpportunityMetadata, Post, PostTag,
    Profile, Publication, RecordKind, VhrLogMetadata,
};

pub mod form;
pub use form::{CauseForm, FormError, GoalForm, OpportunityForm, VhrLogForm};

pub mod client;
pub use client::{FileUpload, PostClient, Publisher, WalletAuth};

/// Filesystem storage and the timeline projection.
pub mod storage;
pub use storage::{Directory, Timeline};

pub mod query;
