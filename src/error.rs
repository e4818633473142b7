//! Error types for the unscan library.

use thiserror::Error;

/// Result type alias for unscan operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during layout reconstruction.
#[derive(Error, Debug)]
pub enum Error {
    /// A structural invariant was violated: content was created, duplicated
    /// or lost by a step that must only regroup existing lines. Fatal for
    /// the affected page; no partial output is produced.
    #[error("structural invariant violated in {region_id}: {detail}")]
    StructuralViolation {
        /// Id of the region whose reconstruction failed
        region_id: String,
        /// What diverged
        detail: String,
    },

    /// A configuration value is out of its valid range.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The serialized input tree could not be deserialized.
    #[error("malformed input tree: {0}")]
    MalformedInput(#[from] serde_json::Error),

    /// A node in the input tree has no usable geometry.
    #[error("region {0} has no coordinates")]
    MissingCoordinates(String),
}

impl Error {
    /// Build a structural violation for the given region.
    pub fn structural(region_id: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::StructuralViolation {
            region_id: region_id.into(),
            detail: detail.into(),
        }
    }
}
