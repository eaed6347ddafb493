//! Fake generation client for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::{GenerationClient, GenerationRoute};
use crate::error::UpstreamError;

/// A fake generation client returning canned replies per route.
///
/// Routes without a registered reply fail the call; routes can also be
/// registered to fail explicitly. Call counts are recorded so tests can
/// assert a stage was (or was never) invoked.
#[derive(Debug)]
pub struct FakeGenerationClient {
    replies: RwLock<HashMap<GenerationRoute, Result<JsonValue, String>>>,
    calls: HashMap<GenerationRoute, AtomicUsize>,
}

impl FakeGenerationClient {
    pub fn new() -> Self {
        let mut calls = HashMap::new();
        calls.insert(GenerationRoute::AnalyzeImageResult, AtomicUsize::new(0));
        calls.insert(GenerationRoute::GenerateRecipe, AtomicUsize::new(0));
        Self {
            replies: RwLock::new(HashMap::new()),
            calls,
        }
    }

    /// Register a successful JSON reply for a route.
    pub fn with_reply(self, route: GenerationRoute, reply: JsonValue) -> Self {
        self.replies.write().unwrap().insert(route, Ok(reply));
        self
    }

    /// Register a `generatedText` reply for a route.
    pub fn with_generated_text(self, route: GenerationRoute, text: &str) -> Self {
        self.with_reply(route, serde_json::json!({ "generatedText": text }))
    }

    /// Register a service failure for a route.
    pub fn with_failure(self, route: GenerationRoute, message: &str) -> Self {
        self.replies
            .write()
            .unwrap()
            .insert(route, Err(message.to_string()));
        self
    }

    /// Number of calls made to a route.
    pub fn calls(&self, route: GenerationRoute) -> usize {
        self.calls
            .get(&route)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }
}

#[async_trait]
impl GenerationClient for FakeGenerationClient {
    async fn post(
        &self,
        route: GenerationRoute,
        _payload: JsonValue,
    ) -> Result<JsonValue, UpstreamError> {
        if let Some(counter) = self.calls.get(&route) {
            counter.fetch_add(1, Ordering::SeqCst);
        }

        match self.replies.read().unwrap().get(&route) {
            Some(Ok(reply)) => Ok(reply.clone()),
            Some(Err(message)) => Err(UpstreamError::Service(message.clone())),
            None => Err(UpstreamError::Service(format!(
                "no fake reply registered for {:?}",
                route
            ))),
        }
    }
}
