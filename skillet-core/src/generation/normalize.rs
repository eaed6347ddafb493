//! Ingredient normalization: joined vision labels to a canonical tag set.

use std::sync::Arc;

use serde_json::json;

use super::{GenerationClient, GenerationRoute};
use crate::error::UpstreamError;
use crate::types::TagSet;

/// Label token the generation service prefixes its ingredient list with.
const TAG_LIST_PREFIX: &str = "食材名: ";

/// Produces a canonical, comma-separated ingredient list from the raw
/// label string.
pub struct IngredientNormalizer {
    client: Arc<dyn GenerationClient>,
}

impl IngredientNormalizer {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self { client }
    }

    /// Send the joined label string to the generation service and split the
    /// reply into a tag set.
    ///
    /// A reply whose `generatedText` is missing or not textual degrades to
    /// an empty tag set rather than aborting the pipeline; the malformed
    /// reply is logged so it stays distinguishable from a genuinely empty
    /// label string. Transport and status failures still fail the call.
    pub async fn normalize(&self, label_string: &str) -> Result<TagSet, UpstreamError> {
        let reply = self
            .client
            .post(
                GenerationRoute::AnalyzeImageResult,
                json!({ "value": label_string }),
            )
            .await?;

        let Some(text) = reply.get("generatedText").and_then(|v| v.as_str()) else {
            tracing::warn!(
                reply = %reply,
                "generatedText missing or not a string; continuing with no tags"
            );
            return Ok(TagSet::new());
        };

        let stripped = text.strip_prefix(TAG_LIST_PREFIX).unwrap_or(text);
        Ok(TagSet::from_comma_separated(stripped))
    }
}
