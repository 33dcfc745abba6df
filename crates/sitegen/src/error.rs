//! Error types for the generation pipeline.
//!
//! Client and extractor errors are recovered inside
//! [`SiteGenerator`](crate::site::SiteGenerator) and never reach the caller
//! of `generate`. The remaining types surface at construction time.

use thiserror::Error;

/// Failure of a single remote generation call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// No response reached us: DNS, connect, timeout, or body read failure.
    #[error("OpenRouter transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status or an error object.
    #[error("OpenRouter API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Success status but no usable content.
    #[error("OpenRouter returned no usable content: {0}")]
    EmptyResponse(String),
}

/// Failure to recover an artifact bundle from raw model output.
///
/// `Validation` is the narrower case of a payload that parsed but is
/// unusable; both variants count as parse failures for retry purposes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("failed to parse model response: {0}")]
    Parse(String),

    #[error("invalid `{field}` in model response: {reason}")]
    Validation { field: &'static str, reason: String },
}

impl ExtractError {
    /// Whether the payload parsed but failed validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, ExtractError::Validation { .. })
    }
}

/// Why one attempt of the orchestrator failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationFailure {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Fatal catalog misconfiguration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("fallback catalog has no `{0}` entry")]
    MissingDefault(&'static str),

    #[error("fallback entry `{0}` has an empty html, css or js part")]
    IncompleteEntry(String),
}

/// Invalid generation request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("site description must not be empty")]
    EmptyPrompt,
}

/// Client or generator construction failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENROUTER_API_KEY is not set")]
    MissingApiKey,

    #[error("failed to build HTTP client: {0}")]
    Http(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_message_keeps_status_and_text() {
        let err = RemoteError::Api {
            status: 429,
            message: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "OpenRouter API error: 429 - rate limited");
    }

    #[test]
    fn validation_is_a_parse_failure_kind() {
        let err = ExtractError::Validation {
            field: "js",
            reason: "missing or empty".into(),
        };
        assert!(err.is_validation());
        assert!(!ExtractError::Parse("nope".into()).is_validation());
    }

    #[test]
    fn generation_failure_is_transparent() {
        let failure: GenerationFailure = RemoteError::Transport("timed out".into()).into();
        assert_eq!(
            failure.to_string(),
            "OpenRouter transport error: timed out"
        );
    }
}
