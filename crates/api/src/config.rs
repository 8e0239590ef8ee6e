//! Service configuration

use anyhow::Result;
use serde::Deserialize;

/// Service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Service name reported in metadata and logs
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// HTTP listen port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the model artifact JSON bundle
    #[serde(default = "default_model_path")]
    pub model_path: String,

    /// Gate POST /predict behind the bearer-token allow-list
    #[serde(default)]
    pub auth_enabled: bool,
}

fn default_service_name() -> String {
    "loan-prediction-api".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_path() -> String {
    "model/loan_model.json".to_string()
}

impl ApiConfig {
    /// Load configuration from the environment (`API_` prefix)
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_else(|_| ApiConfig {
            service_name: default_service_name(),
            port: default_port(),
            model_path: default_model_path(),
            auth_enabled: false,
        }))
    }
}
