//! Serving library for the loan prediction API
//!
//! This crate provides the core functionality for:
//! - Schema validation of prediction input
//! - Preprocessing with the fitted encoder from the model artifact
//! - Classifier abstraction and inference
//! - Prediction formatting
//! - Auth token registry, health reporting, and observability

pub mod artifact;
pub mod auth;
pub mod classifier;
pub mod encode;
pub mod error;
pub mod observability;
pub mod predict;
pub mod schema;
pub mod validate;

pub use artifact::ModelArtifact;
pub use auth::{bearer_token, TokenAccess, TokenRegistry};
pub use classifier::{Classifier, LinearClassifier};
pub use encode::{FittedEncoder, ScaleParams};
pub use error::{ArtifactError, PredictError, PreprocessingError, ValidationError};
pub use observability::{ApiMetrics, StructuredLogger};
pub use predict::{format_predictions, predict_batch, score, PredictionOutcome, PredictionOutput};
pub use schema::{FeatureKind, FeatureSpec, Schema};
pub use validate::{validate, CellValue, PredictInput, ValidatedBatch};
