//! Error types for DraftForge.

use thiserror::Error;

/// Main error type for draft-authoring operations.
///
/// Every variant is a local, recoverable error returned to the caller;
/// the same input always produces the same outcome, so there is nothing
/// to retry inside the core.
#[derive(Error, Debug)]
pub enum DraftError {
    #[error("malformed duration: {0}")]
    MalformedDuration(String),

    #[error("invalid time range: {0}")]
    InvalidRange(String),

    #[error("unknown material: {0}")]
    UnknownMaterial(String),

    #[error("segment [{start}, {end}) overlaps an existing segment on the track")]
    OverlappingSegment { start: i64, end: i64 },

    #[error("content of kind {segment} cannot go on a {track} track")]
    KindMismatch { segment: String, track: String },

    #[error("keyframe already exists at {0} microseconds")]
    DuplicateKeyframeTime(i64),

    #[error("unknown catalog key: {0}")]
    UnknownCatalogKey(String),

    #[error("effect of category {0} is already attached to this segment")]
    ConflictingEffect(String),

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("segment has no right neighbor to absorb the duration change")]
    NoNeighborToAbsorb,

    #[error("invalid template edit: {0}")]
    InvalidTemplateEdit(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for draft-authoring operations.
pub type Result<T> = std::result::Result<T, DraftError>;
