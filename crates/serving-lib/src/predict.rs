//! Prediction formatting and the serving pipeline
//!
//! `format_predictions` is a pure reshape of raw classifier outputs:
//! class index to label, confidence as the row's maximum probability, and
//! an ordered label-to-probability map. A one-row batch comes back as a
//! single unwrapped result; callers rely on that asymmetry.

use crate::artifact::ModelArtifact;
use crate::classifier::Classifier;
use crate::error::PredictError;
use crate::validate::{validate, PredictInput};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One prediction: label, id, confidence, and the full probability map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub class: String,
    pub class_id: usize,
    pub confidence: f64,
    pub probabilities: BTreeMap<String, f64>,
}

/// Result of one predict call: a single record yields a single outcome,
/// a batch yields one outcome per row in input order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutput {
    Single(PredictionOutcome),
    Batch(Vec<PredictionOutcome>),
}

impl PredictionOutput {
    pub fn outcomes(&self) -> Vec<&PredictionOutcome> {
        match self {
            PredictionOutput::Single(outcome) => vec![outcome],
            PredictionOutput::Batch(outcomes) => outcomes.iter().collect(),
        }
    }
}

/// Shape raw classifier outputs into prediction results. Pure transform,
/// no side effects.
pub fn format_predictions(
    class_ids: &[usize],
    probability_rows: &[Vec<f64>],
    target_names: &[String],
) -> PredictionOutput {
    let mut outcomes: Vec<PredictionOutcome> = class_ids
        .iter()
        .zip(probability_rows)
        .map(|(&class_id, probabilities)| {
            let confidence = probabilities
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max);
            PredictionOutcome {
                class: target_names
                    .get(class_id)
                    .cloned()
                    .unwrap_or_else(|| class_id.to_string()),
                class_id,
                confidence,
                probabilities: target_names
                    .iter()
                    .cloned()
                    .zip(probabilities.iter().copied())
                    .collect(),
            }
        })
        .collect();

    if outcomes.len() == 1 {
        PredictionOutput::Single(outcomes.remove(0))
    } else {
        PredictionOutput::Batch(outcomes)
    }
}

/// Run a classifier over an encoded matrix and format the results
pub fn score(
    classifier: &dyn Classifier,
    matrix: &[Vec<f64>],
    target_names: &[String],
) -> PredictionOutput {
    let class_ids = classifier.classify(matrix);
    let probability_rows = classifier.class_probabilities(matrix);
    format_predictions(&class_ids, &probability_rows, target_names)
}

/// Full serving pipeline: validate, transform, classify, format
pub fn predict_batch(
    artifact: &ModelArtifact,
    input: &PredictInput,
) -> Result<PredictionOutput, PredictError> {
    let batch = validate(input, &artifact.schema)?;
    let matrix = artifact.encoder.transform(&batch, &artifact.feature_names)?;
    Ok(score(&artifact.classifier, &matrix, &artifact.target_names))
}
