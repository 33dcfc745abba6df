//! Generator configuration with sensible defaults.
//!
//! [`GeneratorConfig`] gathers the client settings, retry schedule, JS
//! policy and template location, and turns them into a ready
//! [`SiteGenerator`] via [`build_generator`](GeneratorConfig::build_generator).
//! The API key is never part of the config; it is passed in separately.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::api::retry::RetryConfig;
use crate::error::ConfigError;
use crate::site::{FallbackCatalog, JsPolicy, ResponseExtractor, SiteGenerator};
use crate::{ClientSettings, OpenRouterClient};

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const MODEL_VAR: &str = "SITEGEN_MODEL";
pub const TEMPLATES_DIR_VAR: &str = "SITEGEN_TEMPLATES_DIR";

/// Configuration for a site generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Model, sampling and endpoint settings.
    pub client: ClientSettings,
    /// Attempt bound and backoff. Default: 3 attempts, 1s then 2s.
    pub retry: RetryConfig,
    /// Handling of dangerous JS. Default: [`JsPolicy::Neutralize`].
    pub js_policy: JsPolicy,
    /// Directory of fallback templates. Default: `"./templates"`.
    pub templates_dir: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            client: ClientSettings::default(),
            retry: RetryConfig::default(),
            js_policy: JsPolicy::default(),
            templates_dir: PathBuf::from("./templates"),
        }
    }
}

impl GeneratorConfig {
    /// Defaults overridden by `SITEGEN_MODEL` and `SITEGEN_TEMPLATES_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(model) = lookup(MODEL_VAR).filter(|v| !v.trim().is_empty()) {
            config.client.model = model.trim().to_string();
        }
        if let Some(dir) = lookup(TEMPLATES_DIR_VAR).filter(|v| !v.trim().is_empty()) {
            config.templates_dir = PathBuf::from(dir.trim());
        }
        config
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.client.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.client.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.client.max_tokens = max_tokens;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.client.base_url = base_url.into();
        self
    }

    /// Sent as `HTTP-Referer` for OpenRouter app attribution.
    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.client.referer = referer.into();
        self
    }

    /// Sent as `X-Title`.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.client.title = title.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.retry.max_attempts = attempts;
        self
    }

    pub fn with_js_policy(mut self, js_policy: JsPolicy) -> Self {
        self.js_policy = js_policy;
        self
    }

    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates_dir = dir.into();
        self
    }

    /// Build the HTTP client.
    pub fn build_client(&self, api_key: impl Into<String>) -> Result<OpenRouterClient, ConfigError> {
        OpenRouterClient::with_settings(api_key, self.client.clone())
    }

    /// Load the fallback catalog from [`templates_dir`](Self::templates_dir).
    pub fn load_catalog(&self) -> FallbackCatalog {
        FallbackCatalog::load(&self.templates_dir)
    }

    /// Build a generator backed by OpenRouter and the on-disk catalog.
    pub fn build_generator(
        &self,
        api_key: impl Into<String>,
    ) -> Result<SiteGenerator<OpenRouterClient>, ConfigError> {
        let client = self.build_client(api_key)?;
        Ok(self.build_generator_with(client, Arc::new(self.load_catalog())))
    }

    /// Build a generator around any client and catalog.
    pub fn build_generator_with<C: crate::site::GenerationClient>(
        &self,
        client: C,
        catalog: Arc<FallbackCatalog>,
    ) -> SiteGenerator<C> {
        SiteGenerator::new(client, catalog)
            .with_retry(self.retry.clone())
            .with_extractor(ResponseExtractor::new(self.js_policy))
    }
}

/// Read the API key from `OPENROUTER_API_KEY`.
pub fn api_key_from_env() -> Result<String, ConfigError> {
    std::env::var(API_KEY_VAR)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey)
}
