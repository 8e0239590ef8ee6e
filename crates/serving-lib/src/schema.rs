//! Input schema declared by the model artifact
//!
//! The schema is an ordered list of feature declarations loaded once at
//! startup and never mutated. Column order everywhere downstream follows
//! declaration order.

use serde::{Deserialize, Serialize};

/// Declared kind of a single feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    /// JSON number, non-negative by domain rule (counts and amounts)
    Numeric,
    /// String drawn from a fixed allowed set
    Categorical { allowed: Vec<String> },
}

/// One feature declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    #[serde(flatten)]
    pub kind: FeatureKind,
}

impl FeatureSpec {
    pub fn numeric(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Numeric,
        }
    }

    pub fn categorical(name: impl Into<String>, allowed: &[&str]) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Categorical {
                allowed: allowed.iter().map(|s| s.to_string()).collect(),
            },
        }
    }
}

/// Ordered feature declarations for one model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Schema {
    features: Vec<FeatureSpec>,
}

impl Schema {
    pub fn new(features: Vec<FeatureSpec>) -> Self {
        Self { features }
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureSpec> {
        self.features.iter()
    }

    pub fn get(&self, name: &str) -> Option<&FeatureSpec> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features.iter().map(|f| f.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
