//! Service configuration from environment variables.
//!
//! Every component takes its configuration (or a client built from it)
//! explicitly through its constructor; there is no process-wide singleton.

use std::env;

use thiserror::Error;

/// Default Google Vision annotate endpoint.
pub const DEFAULT_VISION_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

/// Endpoint and key configuration for the external services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Label-detection endpoint (annotate URL without the key query).
    pub vision_endpoint: String,
    /// API key appended to the vision endpoint.
    pub vision_api_key: String,
    /// Base URL of the text-generation service (routes are appended).
    pub generation_url: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `SKILLET_VISION_API_KEY`: key for the label-detection service
    /// - `SKILLET_GENERATION_URL`: base URL of the generation service
    ///
    /// Optional:
    /// - `SKILLET_VISION_ENDPOINT`: annotate endpoint
    ///   (default: the public Google Vision URL)
    pub fn from_env() -> Result<Self, ConfigError> {
        let vision_api_key = env::var("SKILLET_VISION_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("SKILLET_VISION_API_KEY".to_string()))?;

        let generation_url = env::var("SKILLET_GENERATION_URL")
            .map_err(|_| ConfigError::MissingEnvVar("SKILLET_GENERATION_URL".to_string()))?;

        let vision_endpoint = env::var("SKILLET_VISION_ENDPOINT")
            .unwrap_or_else(|_| DEFAULT_VISION_ENDPOINT.to_string());

        Ok(Self {
            vision_endpoint,
            vision_api_key,
            generation_url,
        })
    }
}
