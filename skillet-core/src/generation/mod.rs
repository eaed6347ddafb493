//! Text-generation service clients and the stages built on them.
//!
//! Both generation stages (ingredient normalization and recipe generation)
//! speak to the same service through [`GenerationClient`]; the stages own
//! their payload shapes and response policies.

mod fake;
mod http;
mod normalize;
mod recipe;

pub use fake::FakeGenerationClient;
pub use http::HttpGenerationClient;
pub use normalize::IngredientNormalizer;
pub use recipe::RecipeGenerator;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::UpstreamError;

/// Routes exposed by the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerationRoute {
    /// Turn a joined label string into a canonical ingredient list.
    AnalyzeImageResult,
    /// Generate recipe text from tags and constraints.
    GenerateRecipe,
}

impl GenerationRoute {
    pub fn path(self) -> &'static str {
        match self {
            GenerationRoute::AnalyzeImageResult => "/api/analyze-image-result",
            GenerationRoute::GenerateRecipe => "/api/generate-recipe",
        }
    }
}

/// Trait for text-generation service clients.
///
/// Returns the raw JSON reply; each stage extracts `generatedText` itself
/// because they disagree on how to treat a malformed reply.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn post(
        &self,
        route: GenerationRoute,
        payload: JsonValue,
    ) -> Result<JsonValue, UpstreamError>;
}
