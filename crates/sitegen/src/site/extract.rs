//! Recovering an [`ArtifactBundle`] from noisy model output.
//!
//! Models are told to answer with a bare JSON object but frequently wrap it
//! in prose or markdown fences. Extraction runs as fixed stages, each with
//! its own failure:
//!
//! 1. strip fence markers,
//! 2. cut the span from the first `{` to the last `}`,
//! 3. parse it as a JSON object ([`ExtractError::Parse`]),
//! 4. require non-empty string `html`, `css` and `js`
//!    ([`ExtractError::Validation`]),
//! 5. sanitize, then re-check that nothing became empty.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

use super::ArtifactBundle;
use super::sanitize::{self, JsPolicy};
use crate::error::ExtractError;

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```(?:json)?").expect("fence pattern"));

const FIELDS: [&str; 3] = ["html", "css", "js"];

/// Turns raw model output into a validated, sanitized bundle.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseExtractor {
    js_policy: JsPolicy,
}

impl ResponseExtractor {
    pub fn new(js_policy: JsPolicy) -> Self {
        Self { js_policy }
    }

    pub fn js_policy(&self) -> JsPolicy {
        self.js_policy
    }

    pub fn extract(&self, raw: &str) -> Result<ArtifactBundle, ExtractError> {
        let unfenced = strip_fences(raw);
        let candidate = json_candidate(&unfenced)?;
        let object = parse_object(candidate)?;
        let bundle = ArtifactBundle {
            html: required_field(&object, "html")?,
            css: required_field(&object, "css")?,
            js: required_field(&object, "js")?,
        };
        if object.len() > FIELDS.len() {
            debug!(
                "Ignoring extra keys in model response: {:?}",
                object
                    .keys()
                    .filter(|k| !FIELDS.contains(&k.as_str()))
                    .collect::<Vec<_>>()
            );
        }
        self.sanitize(bundle)
    }

    fn sanitize(&self, bundle: ArtifactBundle) -> Result<ArtifactBundle, ExtractError> {
        if self.js_policy == JsPolicy::Reject {
            if let Some(site) = sanitize::find_dangerous_js(&bundle.js) {
                return Err(ExtractError::Validation {
                    field: "js",
                    reason: format!("contains forbidden call `{site}`"),
                });
            }
        }

        let clean = bundle.sanitized();
        for (field, value) in [("html", &clean.html), ("css", &clean.css), ("js", &clean.js)] {
            if value.trim().is_empty() {
                return Err(ExtractError::Validation {
                    field,
                    reason: "empty after sanitization".to_string(),
                });
            }
        }
        Ok(clean)
    }
}

/// Remove every ```` ``` ```` / ```` ```json ```` marker.
fn strip_fences(raw: &str) -> String {
    FENCE.replace_all(raw, "").trim().to_string()
}

/// The closed span from the first `{` to the last `}`.
fn json_candidate(text: &str) -> Result<&str, ExtractError> {
    let start = text.find('{');
    let end = text.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => text
            .get(start..=end)
            .ok_or_else(|| ExtractError::Parse("invalid JSON span".to_string())),
        _ => Err(ExtractError::Parse(
            "no JSON object found in response".to_string(),
        )),
    }
}

fn parse_object(candidate: &str) -> Result<Map<String, Value>, ExtractError> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ExtractError::Parse("response is not a JSON object".to_string())),
        Err(e) => Err(ExtractError::Parse(e.to_string())),
    }
}

/// Empty and whitespace-only strings count as missing.
fn required_field(object: &Map<String, Value>, field: &'static str) -> Result<String, ExtractError> {
    match object.get(field) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(ExtractError::Validation {
            field,
            reason: "empty".to_string(),
        }),
        Some(other) => Err(ExtractError::Validation {
            field,
            reason: format!("expected a string, got {}", json_kind(other)),
        }),
        None => Err(ExtractError::Validation {
            field,
            reason: "missing".to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(raw: &str) -> Result<ArtifactBundle, ExtractError> {
        ResponseExtractor::default().extract(raw)
    }

    #[test]
    fn bare_json_is_accepted() {
        let bundle = extract(r#"{"html":"<p>a</p>","css":"p{}","js":"go()"}"#).unwrap();
        assert_eq!(bundle, ArtifactBundle::new("<p>a</p>", "p{}", "go()"));
    }

    #[test]
    fn fenced_json_with_prose_is_accepted() {
        let raw = "Sure! Here is your site:\n```json\n{\"html\":\"<p>a</p>\",\"css\":\"p{}\",\"js\":\"go()\"}\n```\nEnjoy!";
        let bundle = extract(raw).unwrap();
        assert_eq!(bundle, ArtifactBundle::new("<p>a</p>", "p{}", "go()"));
    }

    #[test]
    fn empty_js_is_a_validation_error() {
        let raw = "Sure! ```json\n{\"html\":\"<p>a</p>\",\"css\":\"p{}\",\"js\":\"\"}\n```";
        let err = extract(raw).unwrap_err();
        assert!(err.is_validation());
        assert!(matches!(err, ExtractError::Validation { field: "js", .. }));
    }

    #[test]
    fn no_json_is_a_parse_error() {
        let err = extract("<html>no json here</html>").unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn truncated_json_is_a_parse_error() {
        let err = extract(r#"{"html":"<p>a</p>","css":"p{}","js":"go()""#).unwrap_err();
        assert!(matches!(err, ExtractError::Parse(_)));
    }

    #[test]
    fn reversed_braces_are_a_parse_error() {
        assert!(matches!(extract("} nothing {"), Err(ExtractError::Parse(_))));
    }

    #[test]
    fn missing_and_mistyped_fields_are_validation_errors() {
        let missing = extract(r#"{"html":"<p>a</p>","js":"go()"}"#).unwrap_err();
        assert!(matches!(missing, ExtractError::Validation { field: "css", .. }));

        let mistyped = extract(r#"{"html":"<p>a</p>","css":42,"js":"go()"}"#).unwrap_err();
        assert_eq!(
            mistyped,
            ExtractError::Validation {
                field: "css",
                reason: "expected a string, got a number".into()
            }
        );
    }

    #[test]
    fn output_is_sanitized() {
        let raw = r#"{"html":"<main>hi</main><script>alert(1)</script>","css":"p{}","js":"eval(x)"}"#;
        let bundle = extract(raw).unwrap();
        assert_eq!(bundle.html, "<main>hi</main>");
        assert_eq!(bundle.js, "// eval(x)");
    }

    #[test]
    fn script_only_html_is_rejected() {
        let raw = r#"{"html":"<script>alert(1)</script>","css":"p{}","js":"go()"}"#;
        let err = extract(raw).unwrap_err();
        assert!(matches!(err, ExtractError::Validation { field: "html", .. }));
    }

    #[test]
    fn reject_policy_refuses_dangerous_js() {
        let extractor = ResponseExtractor::new(JsPolicy::Reject);
        let raw = r#"{"html":"<p>a</p>","css":"p{}","js":"localStorage.setItem('a','b')"}"#;
        let err = extractor.extract(raw).unwrap_err();
        assert!(matches!(err, ExtractError::Validation { field: "js", .. }));

        let ok = r#"{"html":"<p>a</p>","css":"p{}","js":"console.log(1)"}"#;
        assert!(extractor.extract(ok).is_ok());
    }

    #[test]
    fn extracting_sanitized_output_changes_nothing() {
        let raw = r#"{"html":"<p onload='x()'>a</p>","css":"p{}","js":"document.cookie = 1"}"#;
        let first = extract(raw).unwrap();
        let again = extract(&serde_json::to_string(&first).unwrap()).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn span_runs_from_first_to_last_brace() {
        let raw = "Note: {draft}\n{\"html\":\"<p>{}</p>\",\"css\":\"a { b: c }\",\"js\":\"f({})\"}";
        // A brace in leading prose starts the span early.
        assert!(matches!(extract(raw), Err(ExtractError::Parse(_))));

        let clean = "{\"html\":\"<p>{}</p>\",\"css\":\"a { b: c }\",\"js\":\"f({})\"} trailing";
        assert_eq!(extract(clean).unwrap().css, "a { b: c }");
    }
}
