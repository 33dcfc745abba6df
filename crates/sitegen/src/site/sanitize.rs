//! Best-effort scrubbing of model-generated code.
//!
//! This is a mitigation against a model echoing hostile snippets verbatim,
//! not a sandbox. All passes are idempotent.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::ArtifactBundle;

static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("script block pattern")
});

static EVENT_HANDLER_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bon(?:error|load)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
        .expect("event handler pattern")
});

// Group 1 marks a call site that is already commented out.
static DANGEROUS_JS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(// )?(\beval\s*\(|\bnew\s+Function\s*\(|document\.cookie|localStorage\.|sessionStorage\.)",
    )
    .expect("dangerous js pattern")
});

/// What to do with JS that touches dynamic evaluation or browser storage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JsPolicy {
    /// Comment out each offending call site and keep the bundle.
    #[default]
    Neutralize,
    /// Refuse the whole bundle.
    Reject,
}

impl FromStr for JsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neutralize" => Ok(JsPolicy::Neutralize),
            "reject" => Ok(JsPolicy::Reject),
            other => Err(format!(
                "unknown js policy '{other}' (expected 'neutralize' or 'reject')"
            )),
        }
    }
}

impl fmt::Display for JsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsPolicy::Neutralize => f.write_str("neutralize"),
            JsPolicy::Reject => f.write_str("reject"),
        }
    }
}

/// Remove `<script>` blocks and `onerror`/`onload` attributes.
///
/// Repeats until nothing changes, so removals cannot splice a new match
/// together.
pub fn sanitize_html(html: &str) -> String {
    let mut current = html.to_string();
    loop {
        let without_scripts = SCRIPT_BLOCK.replace_all(&current, "");
        let next = EVENT_HANDLER_ATTR
            .replace_all(&without_scripts, "")
            .into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// CSS has no scrubbing pass; returned as-is.
pub fn sanitize_css(css: &str) -> String {
    css.to_string()
}

/// Comment out dynamic evaluation and storage/cookie access.
///
/// A call site split across lines (`new\nFunction(`) is joined onto the
/// commented line so no part of it stays live.
pub fn sanitize_js(js: &str) -> String {
    DANGEROUS_JS
        .replace_all(js, |caps: &Captures<'_>| {
            if caps.get(1).is_some() {
                caps[0].to_string()
            } else {
                let site: Vec<&str> = caps[2].split_whitespace().collect();
                format!("// {}", site.join(" "))
            }
        })
        .into_owned()
}

/// First live (not yet commented out) dangerous call site, if any.
pub fn find_dangerous_js(js: &str) -> Option<String> {
    DANGEROUS_JS
        .captures_iter(js)
        .find(|caps| caps.get(1).is_none())
        .map(|caps| caps[2].to_string())
}

pub fn contains_dangerous_js(js: &str) -> bool {
    find_dangerous_js(js).is_some()
}

impl ArtifactBundle {
    /// Apply every sanitizer, neutralizing JS.
    pub fn sanitized(&self) -> ArtifactBundle {
        ArtifactBundle {
            html: sanitize_html(&self.html),
            css: sanitize_css(&self.css),
            js: sanitize_js(&self.js),
        }
    }
}
