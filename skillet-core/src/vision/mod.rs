//! Label detection over ingredient photos.
//!
//! [`VisionClient`] is the seam to the external label-detection service;
//! [`VisionLabelExtractor`] owns the filtering policy on top of it.

mod fake;
mod google;

pub use fake::FakeVisionClient;
pub use google::GoogleVisionClient;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::UpstreamError;
use crate::media::encode_base64;

/// Maximum number of labels requested per image.
pub const MAX_LABEL_RESULTS: u32 = 10;

/// Labels below this confidence are discarded.
pub const MIN_LABEL_CONFIDENCE: f32 = 0.75;

/// One detected label with its confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelAnnotation {
    pub description: String,
    pub score: f32,
}

/// Trait for label-detection clients.
#[async_trait]
pub trait VisionClient: Send + Sync {
    /// Detect labels in a base64-encoded image.
    async fn detect_labels(
        &self,
        image_base64: &str,
        max_results: u32,
    ) -> Result<Vec<LabelAnnotation>, UpstreamError>;
}

/// Turns an ingredient photo into a flat, comma-joined label string.
pub struct VisionLabelExtractor {
    client: Arc<dyn VisionClient>,
}

impl VisionLabelExtractor {
    pub fn new(client: Arc<dyn VisionClient>) -> Self {
        Self { client }
    }

    /// Detect labels for the image and join the confident ones with `", "`.
    ///
    /// An empty result is valid: no label cleared the confidence threshold.
    pub async fn extract(&self, image: &[u8]) -> Result<String, UpstreamError> {
        let payload = encode_base64(image);
        let annotations = self
            .client
            .detect_labels(&payload, MAX_LABEL_RESULTS)
            .await?;

        let descriptions: Vec<String> = annotations
            .into_iter()
            .filter(|a| a.score >= MIN_LABEL_CONFIDENCE)
            .map(|a| a.description)
            .collect();

        let joined = descriptions.join(", ");
        if joined.is_empty() {
            tracing::debug!("no label cleared the confidence threshold");
        }
        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(description: &str, score: f32) -> LabelAnnotation {
        LabelAnnotation {
            description: description.to_string(),
            score,
        }
    }

    #[tokio::test]
    async fn test_extract_filters_by_confidence() {
        let client = Arc::new(FakeVisionClient::with_labels(vec![
            label("egg", 0.9),
            label("bowl", 0.5),
        ]));
        let extractor = VisionLabelExtractor::new(client);

        let result = extractor.extract(b"fake-image").await.unwrap();
        assert_eq!(result, "egg");
    }

    #[tokio::test]
    async fn test_extract_joins_with_comma_space() {
        let client = Arc::new(FakeVisionClient::with_labels(vec![
            label("egg", 0.9),
            label("milk", 0.8),
            label("flour", 0.75),
        ]));
        let extractor = VisionLabelExtractor::new(client);

        let result = extractor.extract(b"fake-image").await.unwrap();
        assert_eq!(result, "egg, milk, flour");
    }

    #[tokio::test]
    async fn test_extract_empty_result_is_not_an_error() {
        let client = Arc::new(FakeVisionClient::with_labels(vec![label("blur", 0.2)]));
        let extractor = VisionLabelExtractor::new(client);

        let result = extractor.extract(b"fake-image").await.unwrap();
        assert_eq!(result, "");
    }

    #[tokio::test]
    async fn test_extract_propagates_service_error() {
        let client = Arc::new(FakeVisionClient::failing("quota exceeded"));
        let extractor = VisionLabelExtractor::new(client);

        let err = extractor.extract(b"fake-image").await.unwrap_err();
        assert!(matches!(err, UpstreamError::Service(_)));
    }
}
