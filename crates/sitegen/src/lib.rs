//! Prompt-driven static site generation on top of the
//! [OpenRouter](https://openrouter.ai/) chat completions API.
//!
//! `sitegen` turns a natural-language description of a website into an
//! [`ArtifactBundle`](site::ArtifactBundle) of HTML, CSS and JS. Generation
//! is delegated to a remote model; when the model is unreachable or keeps
//! returning unusable output, a deterministic template from the
//! [`FallbackCatalog`](site::FallbackCatalog) is substituted. Callers always
//! get a structurally valid bundle back.
//!
//! # Getting started
//!
//! ```ignore
//! use sitegen::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = GeneratorConfig::from_env();
//!     let generator = config.build_generator(api_key_from_env()?)?;
//!
//!     let request = GenerationRequest::new("A bakery in Lisbon", Some("landing-page"))?;
//!     let bundle = generator.generate(request).await;
//!     println!("{}", bundle.html);
//!     Ok(())
//! }
//! ```
//!
//! # Where to find things
//!
//! - **Prompt text:** [`PromptBuilder`](site::PromptBuilder) and the
//!   [`Preset`](site::Preset) archetypes.
//! - **The remote call:** [`OpenRouterClient`] and the
//!   [`GenerationClient`](site::GenerationClient) seam.
//! - **Turning model output into files:** [`ResponseExtractor`](site::ResponseExtractor)
//!   and the sanitizers in [`site::sanitize`].
//! - **Retry, backoff and fallback:** [`SiteGenerator`](site::SiteGenerator)
//!   with [`RetryConfig`](api::RetryConfig).
//! - **Settings:** [`GeneratorConfig`](config::GeneratorConfig).

pub mod api;
pub mod config;
pub mod error;
pub mod prelude;
pub mod site;

use error::{ConfigError, RemoteError};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

// ── Constants ──────────────────────────────────────────────────────

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model for site generation.
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Model ids reported when the `/models` endpoint cannot be reached.
pub const FALLBACK_MODELS: &[&str] = &[
    "openai/gpt-4",
    "openai/gpt-3.5-turbo",
    "anthropic/claude-2",
    "meta-llama/llama-2-70b-chat",
    "google/palm-2-chat-bison",
];

/// Longest slice of a raw error body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 200;

// ── Request types ──────────────────────────────────────────────────

/// Chat completion request body.
#[derive(Serialize, Debug, Default)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub max_tokens: u32,
    pub temperature: f32,
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}

/// Role of a message in the conversation. Generation sends a single user turn.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
}

/// A message in the conversation.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

// ── Response types ─────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorBody>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: Option<RawResponseMessage>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    message: Option<String>,
    code: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize, Debug)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize, Debug)]
struct ModelEntry {
    id: String,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

// ── Client ─────────────────────────────────────────────────────────

/// Per-client request settings. The credential is passed separately.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// API root, without the `/chat/completions` suffix.
    pub base_url: String,
    pub referer: String,
    pub title: String,
    pub timeout: Duration,
    /// Honor `HTTP_PROXY` / `HTTPS_PROXY` from the environment.
    pub system_proxy: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            base_url: OPENROUTER_BASE_URL.to_string(),
            referer: "https://github.com/prompt-driven-ssg".to_string(),
            title: "Prompt-Driven SSG".to_string(),
            timeout: Duration::from_secs(120),
            system_proxy: true,
        }
    }
}

/// Async HTTP client for the OpenRouter chat completions API.
///
/// Each call is a single request; retries belong to the caller.
pub struct OpenRouterClient {
    pub(crate) client: reqwest::Client,
    pub(crate) api_key: String,
    pub(crate) settings: ClientSettings,
}

impl OpenRouterClient {
    /// Create a new client with the given API key and default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Self::with_settings(api_key, ClientSettings::default())
    }

    /// Create a new client with explicit settings.
    pub fn with_settings(
        api_key: impl Into<String>,
        settings: ClientSettings,
    ) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("sitegen/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout);
        if !settings.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::Http(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            settings,
        })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.settings.base_url.trim_end_matches('/'))
    }

    /// Send `prompt` as the sole user message and return the model's text.
    pub async fn complete(&self, prompt: &str) -> Result<String, RemoteError> {
        let body = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![Message::user(prompt)],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };
        self.chat(&body).await
    }

    /// Send a chat completion request and return the first choice's content.
    pub async fn chat(&self, body: &ChatRequest) -> Result<String, RemoteError> {
        debug!(
            "LLM request: model={}, messages={}, max_tokens={}, temp={}",
            body.model,
            body.messages.len(),
            body.max_tokens,
            body.temperature,
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(self.endpoint("chat/completions"))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.settings.referer)
            .header("X-Title", &self.settings.title)
            .json(body)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(describe_transport(&e)))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| RemoteError::Transport(format!("failed to read response: {e}")))?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }

        let parsed: RawChatResponse = serde_json::from_str(&text)
            .map_err(|e| RemoteError::EmptyResponse(format!("unreadable body: {e}")))?;

        if let Some(err) = parsed.error {
            let code = err.code.as_ref().and_then(error_code).unwrap_or(status.as_u16());
            return Err(RemoteError::Api {
                status: code,
                message: err.message.unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens.unwrap_or(0),
                usage.completion_tokens.unwrap_or(0),
                usage.total_tokens.unwrap_or(0),
            );
        }

        let Some(choice) = parsed.choices.and_then(|c| c.into_iter().next()) else {
            return Err(RemoteError::EmptyResponse("no choices".to_string()));
        };
        if choice.finish_reason.as_deref() == Some("length") {
            warn!("LLM output was truncated at max_tokens={}", body.max_tokens);
        }

        match choice.message.and_then(|m| m.content) {
            Some(content) if !content.trim().is_empty() => {
                debug!("LLM output: {} chars", content.len());
                Ok(content)
            }
            _ => Err(RemoteError::EmptyResponse("empty message content".to_string())),
        }
    }

    /// List model ids available on the endpoint.
    ///
    /// Never fails: on any error a warning is logged and [`FALLBACK_MODELS`]
    /// is returned.
    pub async fn list_models(&self) -> Vec<String> {
        match self.fetch_models().await {
            Ok(models) if !models.is_empty() => models,
            Ok(_) => {
                warn!("Model list was empty; using built-in list");
                fallback_models()
            }
            Err(e) => {
                warn!("Could not fetch available models: {e}");
                fallback_models()
            }
        }
    }

    async fn fetch_models(&self) -> Result<Vec<String>, RemoteError> {
        let resp = self
            .client
            .get(self.endpoint("models"))
            .send()
            .await
            .map_err(|e| RemoteError::Transport(describe_transport(&e)))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| RemoteError::Transport(format!("failed to read response: {e}")))?;
        if !status.is_success() {
            return Err(RemoteError::Api {
                status: status.as_u16(),
                message: api_error_message(&text),
            });
        }
        let list: ModelList = serde_json::from_str(&text)
            .map_err(|e| RemoteError::EmptyResponse(format!("unreadable model list: {e}")))?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

fn fallback_models() -> Vec<String> {
    FALLBACK_MODELS.iter().map(|m| (*m).to_string()).collect()
}

fn describe_transport(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        format!("request timed out: {e}")
    } else if e.is_connect() {
        format!("connection failed: {e}")
    } else {
        format!("request failed: {e}")
    }
}

/// Pull `error.message` out of an error body, or fall back to the raw text.
fn api_error_message(body: &str) -> String {
    let structured = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|env| env.error)
        .and_then(|err| err.message);
    match structured {
        Some(message) => message,
        None if body.trim().is_empty() => "Unknown error".to_string(),
        None => body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
    }
}

fn error_code(code: &serde_json::Value) -> Option<u16> {
    match code {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
