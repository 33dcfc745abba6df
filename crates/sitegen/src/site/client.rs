//! The single-shot remote call seam.

use std::future::Future;
use std::pin::Pin;

use crate::OpenRouterClient;
use crate::error::RemoteError;

/// Boxed future returned by [`GenerationClient::generate`].
pub type ClientFuture<'a> = Pin<Box<dyn Future<Output = Result<String, RemoteError>> + Send + 'a>>;

/// Produces raw model output for a rendered prompt.
///
/// One call is one outbound request. Implementations must not retry;
/// [`SiteGenerator`](super::SiteGenerator) owns the retry policy.
///
/// Uses a boxed future so that the trait is dyn-compatible.
pub trait GenerationClient: Send + Sync {
    fn generate(&self, prompt: &str) -> ClientFuture<'_>;

    /// Model identifier, for logs.
    fn model(&self) -> &str {
        "unknown"
    }
}

impl GenerationClient for OpenRouterClient {
    fn generate(&self, prompt: &str) -> ClientFuture<'_> {
        let prompt = prompt.to_string();
        Box::pin(async move { self.complete(&prompt).await })
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

impl<C: GenerationClient + ?Sized> GenerationClient for std::sync::Arc<C> {
    fn generate(&self, prompt: &str) -> ClientFuture<'_> {
        (**self).generate(prompt)
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}
