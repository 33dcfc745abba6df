//! Retry-then-fallback orchestration.
//!
//! ```text
//! Attempting(0) ──fail──► sleep 1s ──► Attempting(1) ──fail──► sleep 2s ──► Attempting(2)
//!      │                                    │                                   │
//!      └──ok──► Succeeded                   └──ok──► Succeeded                  ├──ok──► Succeeded
//!                                                                               └──fail──► FallenBack
//! ```
//!
//! The attempt count and delays come from [`RetryConfig`]; the diagram shows
//! the defaults. A failure is either a client error or an extraction error;
//! neither reaches the caller.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{
    ArtifactBundle, BundleSource, FallbackCatalog, Generation, GenerationClient,
    GenerationRequest, PromptBuilder, ResponseExtractor,
};
use crate::api::retry::RetryConfig;
use crate::error::GenerationFailure;

/// Builds the prompt, calls the model with bounded retries, and falls back
/// to the catalog when every attempt fails.
pub struct SiteGenerator<C> {
    client: C,
    catalog: Arc<FallbackCatalog>,
    prompts: PromptBuilder,
    extractor: ResponseExtractor,
    retry: RetryConfig,
}

impl<C: GenerationClient> SiteGenerator<C> {
    pub fn new(client: C, catalog: Arc<FallbackCatalog>) -> Self {
        Self {
            client,
            catalog,
            prompts: PromptBuilder::new(),
            extractor: ResponseExtractor::default(),
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_extractor(mut self, extractor: ResponseExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn catalog(&self) -> &FallbackCatalog {
        &self.catalog
    }

    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Generate a bundle. Never fails; may return a fallback.
    pub async fn generate(&self, request: GenerationRequest) -> ArtifactBundle {
        self.generate_with_report(request).await.bundle
    }

    /// Like [`generate`](Self::generate), but also reports where the bundle
    /// came from and why earlier attempts failed.
    pub async fn generate_with_report(&self, request: GenerationRequest) -> Generation {
        let prompt = self.prompts.build(&request);
        let attempts = self.retry.attempts();
        let mut failures = Vec::new();

        for attempt in 0..attempts {
            info!(
                "Generating site with {} (attempt {}/{})...",
                self.client.model(),
                attempt + 1,
                attempts
            );
            match self.attempt(&prompt).await {
                Ok(bundle) => {
                    return Generation {
                        bundle,
                        source: BundleSource::Model {
                            attempts: attempt + 1,
                        },
                    };
                }
                Err(failure) => {
                    warn!("Attempt {}/{} failed: {failure}", attempt + 1, attempts);
                    failures.push(failure);
                    if attempt + 1 < attempts {
                        let delay = self.retry.delay_for_attempt(attempt);
                        debug!("Retrying in {delay:?}");
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        let category = self.catalog.resolve(request.category()).to_string();
        warn!("Using fallback template '{category}' after {attempts} failed attempt(s)");
        Generation {
            bundle: self.catalog.get(request.category()).clone(),
            source: BundleSource::Fallback { category, failures },
        }
    }

    async fn attempt(&self, prompt: &str) -> Result<ArtifactBundle, GenerationFailure> {
        let raw = self.client.generate(prompt).await?;
        self.extractor
            .extract(&raw)
            .map_err(GenerationFailure::from)
    }
}
