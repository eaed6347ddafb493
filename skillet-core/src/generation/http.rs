//! HTTP client for the text-generation service.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::{GenerationClient, GenerationRoute};
use crate::config::ServiceConfig;
use crate::error::UpstreamError;

/// Production generation client posting JSON to the service routes.
pub struct HttpGenerationClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGenerationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(&config.generation_url)
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn post(
        &self,
        route: GenerationRoute,
        payload: JsonValue,
    ) -> Result<JsonValue, UpstreamError> {
        let url = format!("{}{}", self.base_url, route.path());

        tracing::debug!(url = %url, "calling generation service");
        let response = self.client.post(&url).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::MalformedResponse(e.to_string()))
    }
}
