//! Writing a generated bundle to disk.
//!
//! Produces `index.html`, `style.css`, `script.js` and a `generation.json`
//! report that records whether the model or a fallback template produced
//! the site.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info};

use super::fallback::{CSS_FILE, HTML_FILE, JS_FILE};
use super::{BundleSource, Generation};

pub const REPORT_FILE: &str = "generation.json";

static HEAD_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head\s*>").expect("head pattern"));
static BODY_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</body\s*>").expect("body pattern"));
static CSS_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*["']?(?:\./)?style\.css\b"#).expect("stylesheet pattern")
});
static JS_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bsrc\s*=\s*["']?(?:\./)?script\.js\b"#).expect("script pattern")
});

/// Paths of the files written by [`write_site`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFiles {
    pub dir: PathBuf,
    pub html: PathBuf,
    pub css: PathBuf,
    pub js: PathBuf,
    pub report: PathBuf,
}

#[derive(Serialize)]
struct Report<'a> {
    source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
    failures: Vec<String>,
    generated_at: String,
}

impl<'a> Report<'a> {
    fn from_generation(generation: &'a Generation) -> Self {
        let generated_at = chrono::Utc::now().to_rfc3339();
        match &generation.source {
            BundleSource::Model { attempts } => Report {
                source: "model",
                attempts: Some(*attempts),
                category: None,
                failures: Vec::new(),
                generated_at,
            },
            BundleSource::Fallback { category, failures } => Report {
                source: "fallback",
                attempts: None,
                category: Some(category.as_str()),
                failures: failures.iter().map(ToString::to_string).collect(),
                generated_at,
            },
        }
    }
}

/// Create `dir` if needed and write the bundle and report into it.
pub fn write_site(dir: &Path, generation: &Generation) -> io::Result<SiteFiles> {
    fs::create_dir_all(dir)?;

    let files = SiteFiles {
        dir: dir.to_path_buf(),
        html: dir.join(HTML_FILE),
        css: dir.join(CSS_FILE),
        js: dir.join(JS_FILE),
        report: dir.join(REPORT_FILE),
    };

    let bundle = &generation.bundle;
    fs::write(&files.html, link_assets(&bundle.html))?;
    fs::write(&files.css, &bundle.css)?;
    fs::write(&files.js, &bundle.js)?;

    let report = serde_json::to_string_pretty(&Report::from_generation(generation))
        .map_err(io::Error::other)?;
    fs::write(&files.report, report)?;

    info!("Files generated in {}", dir.display());
    Ok(files)
}

/// Make sure the page references the stylesheet and script it ships with.
///
/// Sanitization strips every `<script>` element, including the model's own
/// `<script src="script.js">`, so the reference is restored here.
pub fn link_assets(html: &str) -> String {
    let mut html = html.to_string();

    if !CSS_REF.is_match(&html) {
        let link = format!("<link rel=\"stylesheet\" href=\"{CSS_FILE}\">");
        html = insert_before(&HEAD_CLOSE, &html, &link, false);
        debug!("Linked {CSS_FILE} into {HTML_FILE}");
    }
    if !JS_REF.is_match(&html) {
        let script = format!("<script src=\"{JS_FILE}\"></script>");
        html = insert_before(&BODY_CLOSE, &html, &script, true);
        debug!("Linked {JS_FILE} into {HTML_FILE}");
    }
    html
}

/// Insert `tag` before the first match of `anchor`, or at the start/end of
/// the document when there is no such tag.
fn insert_before(anchor: &Regex, html: &str, tag: &str, at_end: bool) -> String {
    match anchor.find(html) {
        Some(m) => format!(
            "{}  {tag}\n{}",
            html.get(..m.start()).unwrap_or_default(),
            html.get(m.start()..).unwrap_or_default()
        ),
        None if at_end => format!("{html}\n{tag}\n"),
        None => format!("{tag}\n{html}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GenerationFailure, RemoteError};
    use crate::site::ArtifactBundle;

    fn model_generation() -> Generation {
        Generation {
            bundle: ArtifactBundle::new(
                "<html><head><title>x</title></head><body><p>hi</p></body></html>",
                "p { color: red; }",
                "console.log('hi');",
            ),
            source: BundleSource::Model { attempts: 2 },
        }
    }

    #[test]
    fn writes_three_files_and_report() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("site");
        let files = write_site(&out, &model_generation()).unwrap();

        assert_eq!(fs::read_to_string(&files.css).unwrap(), "p { color: red; }");
        assert_eq!(fs::read_to_string(&files.js).unwrap(), "console.log('hi');");
        let html = fs::read_to_string(&files.html).unwrap();
        assert!(html.contains("<p>hi</p>"));

        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&files.report).unwrap()).unwrap();
        assert_eq!(report["source"], "model");
        assert_eq!(report["attempts"], 2);
        assert!(report.get("category").is_none());
    }

    #[test]
    fn report_discloses_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        let generation = Generation {
            bundle: ArtifactBundle::new("<p>a</p>", "p{}", "a()"),
            source: BundleSource::Fallback {
                category: "basic".into(),
                failures: vec![GenerationFailure::Remote(RemoteError::Transport(
                    "timed out".into(),
                ))],
            },
        };
        let files = write_site(tmp.path(), &generation).unwrap();
        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&files.report).unwrap()).unwrap();
        assert_eq!(report["source"], "fallback");
        assert_eq!(report["category"], "basic");
        assert_eq!(
            report["failures"][0],
            "OpenRouter transport error: timed out"
        );
    }

    #[test]
    fn links_are_inserted_before_closing_tags() {
        let html = "<html><head><title>x</title></HEAD><body><p>hi</p></body></html>";
        let linked = link_assets(html);
        let link = linked.find("href=\"style.css\"").unwrap();
        assert!(link < linked.find("</HEAD>").unwrap());
        let script = linked.find("src=\"script.js\"").unwrap();
        assert!(script < linked.find("</body>").unwrap());
    }

    #[test]
    fn existing_links_are_left_alone() {
        let html = "<head><link rel=\"stylesheet\" href=\"style.css\"></head>\
                    <body><script src=\"script.js\"></script></body>";
        assert_eq!(link_assets(html), html);
    }

    #[test]
    fn single_quoted_and_unquoted_links_are_recognized() {
        let html = "<head><link rel='stylesheet' href='style.css'></head>\
                    <body><script src=./script.js></script></body>";
        assert_eq!(link_assets(html), html);

        let spaced = "<head><LINK REL=stylesheet HREF = \"style.css\"></head><body></body>";
        assert_eq!(link_assets(spaced).matches("style.css").count(), 1);
    }

    #[test]
    fn fragment_without_document_tags_still_gets_links() {
        let linked = link_assets("<p>a</p>");
        assert!(linked.starts_with("<link rel=\"stylesheet\" href=\"style.css\">"));
        assert!(linked.trim_end().ends_with("<script src=\"script.js\"></script>"));
    }
}
