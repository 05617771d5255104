//! Error types for the AI core.

use thiserror::Error;

use crate::host::{FeatureId, UnitId};

/// Result type alias using [`AiError`].
pub type Result<T> = std::result::Result<T, AiError>;

/// Top-level error type for all AI errors.
///
/// Finding no reclaim target or no build site is not an error; those
/// outcomes are reported as `Ok(None)`.
#[derive(Debug, Error)]
pub enum AiError {
    /// A host callback failed. Carried through unchanged.
    #[error("Host query failed: {0}")]
    Host(String),

    /// The host does not know this unit.
    #[error("Unknown unit ID: {0}")]
    UnknownUnit(UnitId),

    /// The host does not know this feature.
    #[error("Unknown feature ID: {0}")]
    UnknownFeature(FeatureId),

    /// No unit definition with this name was reported by the host.
    #[error("Unknown unit definition: {0}")]
    UnknownUnitDef(String),

    /// Failed to read a configuration file.
    #[error("Failed to read config file: {0}")]
    ConfigRead(#[from] std::io::Error),

    /// Failed to parse a configuration file.
    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// Invalid AI state.
    #[error("Invalid AI state: {0}")]
    InvalidState(String),
}
