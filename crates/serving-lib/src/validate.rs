//! Schema validation of raw prediction input
//!
//! Checks run column-wise across the whole batch: a single bad row fails
//! the entire batch. A lone record is normalized to a one-row batch so
//! single and bulk prediction share one code path. Fields the schema does
//! not declare are silently dropped, a deliberate compatibility policy.

use crate::error::ValidationError;
use crate::schema::{FeatureKind, Schema};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Raw request payload: one record or an ordered batch of records
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictInput {
    Single(Map<String, Value>),
    Batch(Vec<Map<String, Value>>),
}

impl PredictInput {
    /// True when the caller sent a single record rather than an array.
    /// The response shape mirrors this asymmetry.
    pub fn is_single(&self) -> bool {
        matches!(self, PredictInput::Single(_))
    }

    fn records(&self) -> Vec<&Map<String, Value>> {
        match self {
            PredictInput::Single(record) => vec![record],
            PredictInput::Batch(records) => records.iter().collect(),
        }
    }
}

/// One typed cell of a validated batch
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

/// Tabular input guaranteed to satisfy the schema. Column order is schema
/// declaration order; row order is input order.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ValidatedBatch {
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Validate raw input against the schema, producing a typed batch or the
/// first violation found. Missing features are checked first and reported
/// all at once.
pub fn validate(input: &PredictInput, schema: &Schema) -> Result<ValidatedBatch, ValidationError> {
    let records = input.records();
    if records.is_empty() {
        return Err(ValidationError::EmptyBatch);
    }

    let missing: Vec<String> = schema
        .iter()
        .filter(|spec| records.iter().any(|r| !r.contains_key(&spec.name)))
        .map(|spec| spec.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFeatures(missing));
    }

    let null = Value::Null;
    let mut rows: Vec<Vec<CellValue>> = vec![Vec::with_capacity(schema.len()); records.len()];

    for spec in schema.iter() {
        match &spec.kind {
            FeatureKind::Numeric => {
                let mut min = f64::INFINITY;
                for (row, record) in rows.iter_mut().zip(&records) {
                    let value = record.get(&spec.name).unwrap_or(&null);
                    match value.as_f64() {
                        Some(n) => {
                            min = min.min(n);
                            row.push(CellValue::Number(n));
                        }
                        None => return Err(ValidationError::NotNumeric(spec.name.clone())),
                    }
                }
                if min < 0.0 {
                    return Err(ValidationError::Negative(spec.name.clone()));
                }
            }
            FeatureKind::Categorical { allowed } => {
                let mut offending: Vec<String> = Vec::new();
                for (row, record) in rows.iter_mut().zip(&records) {
                    let value = record.get(&spec.name).unwrap_or(&null);
                    match value.as_str() {
                        Some(s) if allowed.iter().any(|a| a == s) => {
                            row.push(CellValue::Text(s.to_string()));
                        }
                        Some(s) => {
                            if !offending.iter().any(|v| v.as_str() == s) {
                                offending.push(s.to_string());
                            }
                        }
                        // Non-string values are reported in their JSON form
                        None => {
                            let rendered = value.to_string();
                            if !offending.contains(&rendered) {
                                offending.push(rendered);
                            }
                        }
                    }
                }
                if !offending.is_empty() {
                    return Err(ValidationError::InvalidCategory {
                        feature: spec.name.clone(),
                        values: offending,
                        allowed: allowed.clone(),
                    });
                }
            }
        }
    }

    Ok(ValidatedBatch {
        columns: schema.feature_names(),
        rows,
    })
}
