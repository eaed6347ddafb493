//! Recipe generation from the confirmed tag set and user constraints.

use std::sync::Arc;

use serde_json::json;

use super::{GenerationClient, GenerationRoute};
use crate::error::UpstreamError;
use crate::types::{RecipeConstraints, TagSet};

/// Requests recipe text for a tag set under the user's constraints.
pub struct RecipeGenerator {
    client: Arc<dyn GenerationClient>,
}

impl RecipeGenerator {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self { client }
    }

    /// Generate recipe text.
    ///
    /// An empty tag set is valid ("no ingredient constraint"). The cuisine
    /// label is always sent, including the `unspecified` sentinel. Unlike
    /// normalization, a reply without textual `generatedText` is fatal
    /// here: there is nothing to cook from.
    pub async fn generate(
        &self,
        tags: &TagSet,
        constraints: &RecipeConstraints,
    ) -> Result<String, UpstreamError> {
        let payload = json!({
            "value": tags.as_slice(),
            "useOnlyFoodstuff": constraints.exclusivity.wire_code(),
            "cuisines": constraints.cuisine.as_str(),
        });

        let reply = self
            .client
            .post(GenerationRoute::GenerateRecipe, payload)
            .await?;

        reply
            .get("generatedText")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                UpstreamError::MalformedResponse(
                    "generatedText missing or not a string in recipe reply".to_string(),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::FakeGenerationClient;
    use crate::types::{Cuisine, Exclusivity};

    /// Fake that records the payload it was sent.
    struct RecordingClient {
        reply: serde_json::Value,
        seen: std::sync::Mutex<Option<serde_json::Value>>,
    }

    #[async_trait::async_trait]
    impl GenerationClient for RecordingClient {
        async fn post(
            &self,
            _route: GenerationRoute,
            payload: serde_json::Value,
        ) -> Result<serde_json::Value, UpstreamError> {
            *self.seen.lock().unwrap() = Some(payload);
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn test_generate_payload_encoding() {
        let client = Arc::new(RecordingClient {
            reply: json!({ "generatedText": "Plain omelette" }),
            seen: std::sync::Mutex::new(None),
        });
        let generator = RecipeGenerator::new(client.clone());

        let tags = TagSet::from(vec!["egg".to_string(), "milk".to_string()]);
        let constraints = RecipeConstraints {
            cuisine: Cuisine::Japanese,
            exclusivity: Exclusivity::OnlyListedIngredients,
        };

        let text = generator.generate(&tags, &constraints).await.unwrap();
        assert_eq!(text, "Plain omelette");

        let payload = client.seen.lock().unwrap().clone().unwrap();
        assert_eq!(payload["value"], json!(["egg", "milk"]));
        assert_eq!(payload["useOnlyFoodstuff"], 0);
        assert_eq!(payload["cuisines"], "japanese");
    }

    #[tokio::test]
    async fn test_generate_empty_tags_unspecified_cuisine() {
        let client = Arc::new(RecordingClient {
            reply: json!({ "generatedText": "Chef's choice stir fry" }),
            seen: std::sync::Mutex::new(None),
        });
        let generator = RecipeGenerator::new(client.clone());

        let constraints = RecipeConstraints {
            cuisine: Cuisine::Unspecified,
            exclusivity: Exclusivity::AllowOtherIngredients,
        };

        let text = generator
            .generate(&TagSet::new(), &constraints)
            .await
            .unwrap();
        assert_eq!(text, "Chef's choice stir fry");

        // The sentinel passes through unchanged and the flag encodes as 1.
        let payload = client.seen.lock().unwrap().clone().unwrap();
        assert_eq!(payload["cuisines"], "unspecified");
        assert_eq!(payload["useOnlyFoodstuff"], 1);
        assert_eq!(payload["value"], json!([]));
    }

    #[tokio::test]
    async fn test_generate_malformed_reply_is_fatal() {
        let client = Arc::new(
            FakeGenerationClient::new()
                .with_reply(GenerationRoute::GenerateRecipe, json!({ "unrelated": true })),
        );
        let generator = RecipeGenerator::new(client);

        let err = generator
            .generate(&TagSet::new(), &RecipeConstraints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::MalformedResponse(_)));
    }
}
