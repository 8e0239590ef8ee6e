//! Error taxonomy for the serving pipeline
//!
//! Validation and preprocessing failures are caller-attributable and carry
//! messages safe to return to clients. Artifact errors only occur at
//! startup and put the service into degraded mode.

use std::path::PathBuf;
use thiserror::Error;

/// Input rejected by the schema validator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Input batch is empty")]
    EmptyBatch,

    /// Reports every missing feature, not just the first one found
    #[error("Missing features: {0:?}")]
    MissingFeatures(Vec<String>),

    #[error("Feature '{0}' must be numeric")]
    NotNumeric(String),

    #[error("Feature '{0}' cannot be negative")]
    Negative(String),

    #[error("Feature '{feature}' has invalid value(s) {values:?}, allowed values: {allowed:?}")]
    InvalidCategory {
        feature: String,
        values: Vec<String>,
        allowed: Vec<String>,
    },
}

/// Validated input rejected by the fitted encoder
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreprocessingError {
    /// The value passed schema validation but the encoder was fitted
    /// without it. Caller-attributable.
    #[error("Feature '{feature}' has value '{value}' the encoder was not fitted on")]
    UnseenCategory { feature: String, value: String },

    /// Artifact inconsistency, not a caller mistake
    #[error("Encoder expected feature '{0}' absent from the validated batch")]
    MissingColumn(String),

    /// Artifact inconsistency, not a caller mistake
    #[error("No fitted category levels for feature '{0}'")]
    NotFitted(String),
}

impl PreprocessingError {
    /// True when the failure stems from caller input rather than a broken
    /// artifact. Drives the 400-vs-500 split at the request boundary.
    pub fn is_client_fault(&self) -> bool {
        matches!(self, PreprocessingError::UnseenCategory { .. })
    }
}

/// Model artifact could not be loaded at startup
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read model artifact at {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse model artifact at {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Model artifact is inconsistent: {0}")]
    Inconsistent(String),
}

/// Failure anywhere in the validate -> encode -> classify pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),
}

impl PredictError {
    /// True when the error should surface as a 400 with its message intact
    pub fn is_client_fault(&self) -> bool {
        match self {
            PredictError::Validation(_) => true,
            PredictError::Preprocessing(e) => e.is_client_fault(),
        }
    }
}
