//! The generation pipeline.
//!
//! Data flows one way:
//!
//! ```text
//! GenerationRequest ─► PromptBuilder ─► GenerationClient (1..=N attempts)
//!                                            │
//!                                            ├─► ResponseExtractor ─► ArtifactBundle
//!                                            └─► FallbackCatalog   ─► ArtifactBundle
//! ```
//!
//! [`SiteGenerator`] is the only piece with control flow across stages.

pub mod client;
pub mod extract;
pub mod fallback;
pub mod generator;
pub mod preset;
pub mod prompt;
pub mod sanitize;
pub mod scaffold;

pub use client::{ClientFuture, GenerationClient};
pub use extract::ResponseExtractor;
pub use fallback::{DEFAULT_CATEGORY, FallbackCatalog};
pub use generator::SiteGenerator;
pub use preset::Preset;
pub use prompt::PromptBuilder;
pub use sanitize::JsPolicy;
pub use scaffold::{SiteFiles, write_site};

use serde::{Deserialize, Serialize};

use crate::error::{GenerationFailure, RequestError};

/// The three generated site files.
///
/// Every bundle handed out by the pipeline has non-empty `html`, `css`
/// and `js`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ArtifactBundle {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl ArtifactBundle {
    pub fn new(html: impl Into<String>, css: impl Into<String>, js: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
            js: js.into(),
        }
    }

    /// True when all three parts contain something besides whitespace.
    pub fn is_complete(&self) -> bool {
        [&self.html, &self.css, &self.js]
            .iter()
            .all(|part| !part.trim().is_empty())
    }
}

/// What the user asked for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    category: Option<String>,
}

impl GenerationRequest {
    /// Build a request. The description must contain non-whitespace text;
    /// a blank category is treated as none, and a preset name in any case
    /// is stored as its canonical key.
    pub fn new(
        prompt: impl Into<String>,
        category: Option<impl Into<String>>,
    ) -> Result<Self, RequestError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(RequestError::EmptyPrompt);
        }
        let category = category
            .map(|c| {
                let c: String = c.into();
                match Preset::parse(&c) {
                    Some(preset) => preset.key().to_string(),
                    None => c.trim().to_string(),
                }
            })
            .filter(|c| !c.is_empty());
        Ok(Self { prompt, category })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// The known preset this request's category names, if any.
    pub fn preset(&self) -> Option<Preset> {
        self.category.as_deref().and_then(Preset::parse)
    }
}

/// Where a bundle came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BundleSource {
    /// The model produced a usable bundle on attempt `attempts` (1-based).
    Model { attempts: u32 },
    /// Every attempt failed and a catalog entry was substituted.
    Fallback {
        category: String,
        failures: Vec<GenerationFailure>,
    },
}

/// A bundle plus its provenance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
    pub bundle: ArtifactBundle,
    pub source: BundleSource,
}

impl Generation {
    pub fn is_fallback(&self) -> bool {
        matches!(self.source, BundleSource::Fallback { .. })
    }
}
