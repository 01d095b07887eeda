use crate::domain::{PostTag, RecordKind};

/// Reasons a post does not hold a valid domain record.
///
/// Decoding never guesses: any of these means the post is not one of ours
/// (or not one this build understands). Callers scanning a list skip the
/// post; callers looking up a single record treat it as not found.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMetadata {
    /// The `type` attribute is not a known tag, or names a tag that carries
    /// no record.
    #[error("unrecognized record type '{0}'")]
    UnrecognizedTag(String),

    /// The `type` attribute names a tag the post is not tagged with.
    #[error("record type {declared} does not match post tags [{}]", .tags.join(", "))]
    TagMismatch {
        /// Tag named by the `type` attribute.
        declared: PostTag,
        /// Tags actually on the post.
        tags: Vec<String>,
    },

    /// The post holds a valid record of a different kind.
    #[error("expected a {expected} record, found {found}")]
    WrongKind {
        /// The kind being decoded.
        expected: RecordKind,
        /// The tag found on the post.
        found: PostTag,
    },

    /// A required attribute is absent.
    #[error("missing required attribute '{trait_type}'")]
    MissingAttribute {
        /// Key of the absent attribute.
        trait_type: String,
    },

    /// An attribute key appears more than once.
    #[error("attribute '{trait_type}' appears more than once")]
    DuplicateAttribute {
        /// Key of the repeated attribute.
        trait_type: String,
    },

    /// The `version` attribute is not one this decoder can interpret.
    #[error("unknown {kind} metadata version '{version}'")]
    UnknownVersion {
        /// The kind whose version table was consulted.
        kind: RecordKind,
        /// The version string found.
        version: String,
    },

    /// An attribute is present but cannot be coerced to its declared type.
    #[error("attribute '{trait_type}' has value '{value}', expected {expected}")]
    InvalidValue {
        /// Key of the attribute.
        trait_type: String,
        /// The raw value found.
        value: String,
        /// Human readable description of the accepted values.
        expected: &'static str,
    },
}
