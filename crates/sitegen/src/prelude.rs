//! Convenience re-exports for common `sitegen` types.
//!
//! ```ignore
//! use sitegen::prelude::*;
//! ```

// ── Client ──────────────────────────────────────────────────────────
pub use crate::{ClientSettings, Message, OpenRouterClient};

// ── Configuration ───────────────────────────────────────────────────
pub use crate::api::RetryConfig;
pub use crate::config::{GeneratorConfig, api_key_from_env};

// ── Errors ──────────────────────────────────────────────────────────
pub use crate::error::{
    CatalogError, ConfigError, ExtractError, GenerationFailure, RemoteError, RequestError,
};

// ── Pipeline ────────────────────────────────────────────────────────
pub use crate::site::{
    ArtifactBundle, BundleSource, FallbackCatalog, Generation, GenerationClient,
    GenerationRequest, JsPolicy, Preset, PromptBuilder, ResponseExtractor, SiteGenerator,
    write_site,
};
