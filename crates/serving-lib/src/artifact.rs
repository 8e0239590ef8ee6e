//! Model artifact: the persisted bundle the service loads at startup
//!
//! One JSON file carrying the classifier coefficients, the fitted encoder,
//! the input schema, the ordered target-class list, and the recorded
//! training accuracy. Loaded once, shared read-only for the process
//! lifetime, never written by the service.

use crate::classifier::LinearClassifier;
use crate::encode::FittedEncoder;
use crate::error::ArtifactError;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_type: String,
    /// Accuracy recorded on the held-out set at training time
    pub accuracy: f64,
    /// Column order the classifier was trained on
    pub feature_names: Vec<String>,
    /// Ordered target classes; a class index maps to its label here
    pub target_names: Vec<String>,
    pub schema: Schema,
    #[serde(default)]
    pub encoder: FittedEncoder,
    pub classifier: LinearClassifier,
}

impl ModelArtifact {
    /// Load and cross-check an artifact from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ArtifactError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: ModelArtifact =
            serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        artifact.check_consistency()?;

        info!(
            path = %path.display(),
            model_type = %artifact.model_type,
            accuracy = artifact.accuracy,
            n_features = artifact.feature_names.len(),
            n_classes = artifact.target_names.len(),
            "Model artifact loaded"
        );
        Ok(artifact)
    }

    /// Reject artifacts whose parts disagree before any request sees them
    fn check_consistency(&self) -> Result<(), ArtifactError> {
        if self.target_names.is_empty() {
            return Err(ArtifactError::Inconsistent(
                "target_names is empty".to_string(),
            ));
        }
        if self.classifier.n_classes() != self.target_names.len() {
            return Err(ArtifactError::Inconsistent(format!(
                "classifier has {} classes but {} target names",
                self.classifier.n_classes(),
                self.target_names.len()
            )));
        }
        if self.classifier.intercepts.len() != self.classifier.n_classes() {
            return Err(ArtifactError::Inconsistent(format!(
                "classifier has {} weight rows but {} intercepts",
                self.classifier.n_classes(),
                self.classifier.intercepts.len()
            )));
        }
        if self.classifier.n_features() != self.feature_names.len() {
            return Err(ArtifactError::Inconsistent(format!(
                "classifier expects {} features but feature_names has {}",
                self.classifier.n_features(),
                self.feature_names.len()
            )));
        }
        for name in &self.feature_names {
            if self.schema.get(name).is_none() {
                return Err(ArtifactError::Inconsistent(format!(
                    "feature '{name}' is not declared in the schema"
                )));
            }
        }
        Ok(())
    }
}
