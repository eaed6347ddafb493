//! Fake vision client for testing.

use async_trait::async_trait;

use super::{LabelAnnotation, VisionClient};
use crate::error::UpstreamError;

/// A fake label-detection client returning canned annotations.
///
/// Lets pipeline and extractor tests run without network access. Configure
/// it either with the labels to return or with an error message to fail
/// every call with.
#[derive(Debug, Default)]
pub struct FakeVisionClient {
    labels: Vec<LabelAnnotation>,
    failure: Option<String>,
}

impl FakeVisionClient {
    /// Succeed every call with the given annotations.
    pub fn with_labels(labels: Vec<LabelAnnotation>) -> Self {
        Self {
            labels,
            failure: None,
        }
    }

    /// Fail every call with a service-reported error.
    pub fn failing(message: &str) -> Self {
        Self {
            labels: Vec::new(),
            failure: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl VisionClient for FakeVisionClient {
    async fn detect_labels(
        &self,
        _image_base64: &str,
        max_results: u32,
    ) -> Result<Vec<LabelAnnotation>, UpstreamError> {
        if let Some(message) = &self.failure {
            return Err(UpstreamError::Service(message.clone()));
        }
        Ok(self
            .labels
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }
}
