//! Classifier abstraction and the shipped linear implementation
//!
//! The model is consumed through a trait so any compatible classifier can
//! be substituted, mocks included. The shipped implementation is a
//! multinomial logistic regression whose coefficients travel inside the
//! model artifact. Inference is a pure function of its input.

use serde::{Deserialize, Serialize};

/// Capability contract the serving pipeline consumes
pub trait Classifier: Send + Sync {
    /// Predicted class index per input row
    fn classify(&self, matrix: &[Vec<f64>]) -> Vec<usize>;

    /// Full per-class probability vector per input row; each vector sums
    /// to 1 up to floating point error
    fn class_probabilities(&self, matrix: &[Vec<f64>]) -> Vec<Vec<f64>>;
}

/// Multinomial logistic regression: one weight row and intercept per
/// target class, softmax over the linear scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearClassifier {
    pub weights: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl LinearClassifier {
    pub fn n_classes(&self) -> usize {
        self.weights.len()
    }

    pub fn n_features(&self) -> usize {
        self.weights.first().map(|w| w.len()).unwrap_or(0)
    }

    fn scores(&self, row: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.intercepts)
            .map(|(w, b)| w.iter().zip(row).map(|(wi, xi)| wi * xi).sum::<f64>() + b)
            .collect()
    }

    fn softmax(scores: &[f64]) -> Vec<f64> {
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        exps.iter().map(|e| e / total).collect()
    }

    fn argmax(probabilities: &[f64]) -> usize {
        let mut best = 0;
        for (idx, p) in probabilities.iter().enumerate() {
            if *p > probabilities[best] {
                best = idx;
            }
        }
        best
    }
}

impl Classifier for LinearClassifier {
    fn classify(&self, matrix: &[Vec<f64>]) -> Vec<usize> {
        matrix
            .iter()
            .map(|row| Self::argmax(&Self::softmax(&self.scores(row))))
            .collect()
    }

    fn class_probabilities(&self, matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
        matrix
            .iter()
            .map(|row| Self::softmax(&self.scores(row)))
            .collect()
    }
}
