//! Sequences the extraction, normalization, and generation stages.

use std::io::ErrorKind;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info_span, Instrument};

use super::{PipelineState, Stage};
use crate::error::{PipelineError, UpstreamError};
use crate::generation::{GenerationClient, IngredientNormalizer, RecipeGenerator};
use crate::media::ImageSource;
use crate::types::{RecipeConstraints, TagSet};
use crate::vision::{VisionClient, VisionLabelExtractor};

/// Runs the three generation stages strictly in sequence and owns the
/// transient run state.
///
/// A run is single-shot: it cannot be restarted mid-flight, and invoking
/// `run` again starts a fresh run from `Idle`. On any stage failure the
/// state becomes `Failed(stage)` and the error carries the stage name; the
/// orchestrator never retries on its own.
pub struct PipelineOrchestrator {
    extractor: VisionLabelExtractor,
    normalizer: IngredientNormalizer,
    generator: RecipeGenerator,
    state: watch::Sender<PipelineState>,
}

impl PipelineOrchestrator {
    pub fn new(vision: Arc<dyn VisionClient>, generation: Arc<dyn GenerationClient>) -> Self {
        let (state, _) = watch::channel(PipelineState::Idle);
        Self {
            extractor: VisionLabelExtractor::new(vision),
            normalizer: IngredientNormalizer::new(generation.clone()),
            generator: RecipeGenerator::new(generation),
            state,
        }
    }

    /// Watch the run state. Each transition is published before the
    /// stage's network call is issued.
    pub fn state(&self) -> watch::Receiver<PipelineState> {
        self.state.subscribe()
    }

    /// Run the full pipeline without touching the derived tag set.
    pub async fn run(
        &self,
        image: &ImageSource,
        constraints: RecipeConstraints,
    ) -> Result<String, PipelineError> {
        self.run_with_review(image, constraints, |tags| tags).await
    }

    /// Run the full pipeline, letting the caller adjust the tag set between
    /// normalization and generation (the user edits their ingredient list
    /// before asking for a recipe).
    pub async fn run_with_review<F>(
        &self,
        image: &ImageSource,
        constraints: RecipeConstraints,
        review: F,
    ) -> Result<String, PipelineError>
    where
        F: FnOnce(TagSet) -> TagSet + Send,
    {
        self.state.send_replace(PipelineState::Idle);

        // Acquire the image before the pipeline starts; a refused media
        // read must surface without ever leaving Idle.
        let image_bytes = match image.read().await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                tracing::error!(error = %e, "media library access denied");
                return Err(PipelineError::PermissionDenied);
            }
            Err(e) => return Err(PipelineError::ImageRead(e)),
        };

        // TODO: add per-stage request deadlines so a hung upstream cannot
        // wedge a run indefinitely.
        let labels = self
            .stage(Stage::ExtractingLabels, self.extractor.extract(&image_bytes))
            .await?;
        tracing::debug!(labels = %labels, "labels extracted");

        let tags = self
            .stage(
                Stage::NormalizingIngredients,
                self.normalizer.normalize(&labels),
            )
            .await?;

        let tags = review(tags);
        tracing::debug!(tag_count = tags.len(), "tag set confirmed");

        let recipe = self
            .stage(
                Stage::GeneratingRecipe,
                self.generator.generate(&tags, &constraints),
            )
            .await?;

        self.state.send_replace(PipelineState::Done);
        Ok(recipe)
    }

    /// Enter a stage, await it to completion, and capture a failure as the
    /// terminal state for this run.
    async fn stage<T>(
        &self,
        stage: Stage,
        fut: impl std::future::Future<Output = Result<T, UpstreamError>>,
    ) -> Result<T, PipelineError> {
        self.state.send_replace(PipelineState::Running(stage));

        match fut
            .instrument(info_span!("pipeline_stage", stage = %stage))
            .await
        {
            Ok(value) => Ok(value),
            Err(source) => {
                tracing::error!(stage = %stage, error = %source, "pipeline stage failed");
                self.state.send_replace(PipelineState::Failed(stage));
                Err(PipelineError::Stage { stage, source })
            }
        }
    }
}
