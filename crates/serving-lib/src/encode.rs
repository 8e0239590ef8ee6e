//! Fitted preprocessing encoder bundled with the model artifact
//!
//! Maps a validated batch into the numeric matrix the classifier expects:
//! ordinal encoding of categorical features against fitted levels, optional
//! mean/std scaling of numeric features. Output column order must match the
//! artifact's `feature_names` exactly.

use crate::error::PreprocessingError;
use crate::validate::{CellValue, ValidatedBatch};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Standardization parameters fitted offline for one numeric feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleParams {
    pub mean: f64,
    pub std: f64,
}

impl ScaleParams {
    fn apply(&self, value: f64) -> f64 {
        // A constant training column fits std = 0; centering alone then.
        if self.std > 0.0 {
            (value - self.mean) / self.std
        } else {
            value - self.mean
        }
    }
}

/// Encoder state fitted during training and carried in the artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FittedEncoder {
    /// Ordinal levels per categorical feature; a value encodes to its index
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
    /// Optional standardization per numeric feature
    #[serde(default)]
    pub scaling: BTreeMap<String, ScaleParams>,
}

impl FittedEncoder {
    /// Transform a validated batch into the classifier's input matrix,
    /// columns in `feature_names` order.
    pub fn transform(
        &self,
        batch: &ValidatedBatch,
        feature_names: &[String],
    ) -> Result<Vec<Vec<f64>>, PreprocessingError> {
        let column_indices: Vec<usize> = feature_names
            .iter()
            .map(|name| {
                batch
                    .column_index(name)
                    .ok_or_else(|| PreprocessingError::MissingColumn(name.clone()))
            })
            .collect::<Result<_, _>>()?;

        let mut matrix = Vec::with_capacity(batch.n_rows());
        for row in &batch.rows {
            let mut encoded = Vec::with_capacity(feature_names.len());
            for (name, &idx) in feature_names.iter().zip(&column_indices) {
                let value = match &row[idx] {
                    CellValue::Number(n) => match self.scaling.get(name) {
                        Some(params) => params.apply(*n),
                        None => *n,
                    },
                    CellValue::Text(s) => self.encode_category(name, s)?,
                };
                encoded.push(value);
            }
            matrix.push(encoded);
        }
        Ok(matrix)
    }

    fn encode_category(&self, feature: &str, value: &str) -> Result<f64, PreprocessingError> {
        let levels = self
            .categories
            .get(feature)
            .ok_or_else(|| PreprocessingError::NotFitted(feature.to_string()))?;
        levels
            .iter()
            .position(|level| level == value)
            .map(|idx| idx as f64)
            .ok_or_else(|| PreprocessingError::UnseenCategory {
                feature: feature.to_string(),
                value: value.to_string(),
            })
    }
}
