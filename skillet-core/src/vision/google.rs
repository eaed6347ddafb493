//! Google Vision label-detection client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{LabelAnnotation, VisionClient};
use crate::config::ServiceConfig;
use crate::error::UpstreamError;

/// Client for the Google Vision `images:annotate` endpoint.
pub struct GoogleVisionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GoogleVisionClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(&config.vision_endpoint, &config.vision_api_key)
    }
}

/// Annotate request format.
#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateEntry>,
}

#[derive(Debug, Serialize)]
struct AnnotateEntry {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
    #[serde(rename = "maxResults")]
    max_results: u32,
}

/// Annotate response format.
#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct AnnotateResult {
    #[serde(rename = "labelAnnotations", default)]
    label_annotations: Vec<LabelAnnotation>,
    #[serde(default)]
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    message: String,
}

#[async_trait]
impl VisionClient for GoogleVisionClient {
    async fn detect_labels(
        &self,
        image_base64: &str,
        max_results: u32,
    ) -> Result<Vec<LabelAnnotation>, UpstreamError> {
        let request = AnnotateRequest {
            requests: vec![AnnotateEntry {
                image: ImageContent {
                    content: image_base64.to_string(),
                },
                features: vec![Feature {
                    feature_type: "LABEL_DETECTION",
                    max_results,
                }],
            }],
        };

        let url = format!("{}?key={}", self.endpoint, self.api_key);

        tracing::debug!(endpoint = %self.endpoint, "requesting label detection");
        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::MalformedResponse(e.to_string()))?;

        // The service reports errors either at the top level or per-image.
        if let Some(error) = body.error {
            return Err(UpstreamError::Service(error.message));
        }

        let result = body.responses.into_iter().next().ok_or_else(|| {
            UpstreamError::MalformedResponse("annotate response had no entries".to_string())
        })?;

        if let Some(error) = result.error {
            return Err(UpstreamError::Service(error.message));
        }

        Ok(result.label_annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotate_request_wire_shape() {
        let request = AnnotateRequest {
            requests: vec![AnnotateEntry {
                image: ImageContent {
                    content: "aGk=".to_string(),
                },
                features: vec![Feature {
                    feature_type: "LABEL_DETECTION",
                    max_results: 10,
                }],
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["requests"][0]["image"]["content"], "aGk=");
        assert_eq!(value["requests"][0]["features"][0]["type"], "LABEL_DETECTION");
        assert_eq!(value["requests"][0]["features"][0]["maxResults"], 10);
    }

    #[test]
    fn test_annotate_response_parses_labels() {
        let body = r#"{"responses":[{"labelAnnotations":[
            {"description":"egg","score":0.92},
            {"description":"bowl","score":0.41}
        ]}]}"#;
        let parsed: AnnotateResponse = serde_json::from_str(body).unwrap();
        let labels = &parsed.responses[0].label_annotations;
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].description, "egg");
    }

    #[test]
    fn test_annotate_response_parses_error_payload() {
        let body = r#"{"error":{"message":"API key not valid"}}"#;
        let parsed: AnnotateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.unwrap().message, "API key not valid");
    }
}
