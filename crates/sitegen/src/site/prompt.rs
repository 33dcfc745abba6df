//! Prompt text sent to the model.

use super::GenerationRequest;

/// Closing directive appended to every prompt. The extractor still copes
/// with models that ignore it.
pub const JSON_ONLY_DIRECTIVE: &str = "Remember to respond with ONLY a JSON object with exactly the keys \
\"html\", \"css\" and \"js\". No additional text, explanations, or markdown code fences.";

/// Renders a [`GenerationRequest`] into the text of the single user message.
///
/// Pure and deterministic: the same request always yields the same bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, request: &GenerationRequest) -> String {
        let body = match request.preset() {
            Some(preset) => format!(
                "{}\n\n{}\n\nAdditional requirements: {}",
                preset.instructions(),
                output_contract(),
                request.prompt().trim()
            ),
            None => generic_prompt(request.prompt().trim()),
        };
        format!("{body}\n\n{JSON_ONLY_DIRECTIVE}")
    }
}

fn output_contract() -> &'static str {
    "\
Return the website as a JSON object with exactly these three keys:
- \"html\": Full HTML5 markup
- \"css\": CSS styles
- \"js\": JavaScript code"
}

fn generic_prompt(description: &str) -> String {
    format!(
        "\
You are an expert web developer. Generate a complete static website based on: \"{description}\".

CRITICAL: You MUST return ONLY a valid JSON object with exactly these three keys:
- \"html\": Full HTML5 markup
- \"css\": CSS styles
- \"js\": JavaScript code

Do NOT include any other text, explanations, or markdown formatting. Only the raw JSON.

Example of the exact format required:
{{
  \"html\": \"<!DOCTYPE html><html>...</html>\",
  \"css\": \"body {{ color: black; }}\",
  \"js\": \"console.log('hello');\"
}}

Requirements:
1. HTML must be complete with doctype, html, head, and body tags
2. CSS must be responsive and modern
3. JS must be vanilla ES6+ without external dependencies
4. All code must be production-ready and follow best practices"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::Preset;

    fn request(prompt: &str, category: Option<&str>) -> GenerationRequest {
        GenerationRequest::new(prompt, category).unwrap()
    }

    #[test]
    fn identical_requests_render_identically() {
        let builder = PromptBuilder::new();
        let a = builder.build(&request("A bakery site", Some("blog")));
        let b = builder.build(&request("A bakery site", Some("blog")));
        assert_eq!(a, b);
    }

    #[test]
    fn preset_block_comes_before_user_text() {
        let prompt = PromptBuilder::new().build(&request("Sell handmade soap", Some("ecommerce")));
        assert!(prompt.starts_with(Preset::Ecommerce.instructions()));
        let block = prompt.find("Product image gallery").unwrap();
        let extra = prompt
            .find("Additional requirements: Sell handmade soap")
            .unwrap();
        assert!(block < extra);
    }

    #[test]
    fn unknown_category_uses_generic_block() {
        let prompt = PromptBuilder::new().build(&request("A cat shelter", Some("corporate")));
        assert!(prompt.starts_with("You are an expert web developer."));
        assert!(prompt.contains("based on: \"A cat shelter\""));
        assert!(!prompt.contains("Additional requirements"));
    }

    #[test]
    fn every_prompt_ends_with_json_directive() {
        let builder = PromptBuilder::new();
        for category in [None, Some("portfolio"), Some("nope")] {
            let prompt = builder.build(&request("x", category));
            assert!(prompt.ends_with(JSON_ONLY_DIRECTIVE));
            assert!(prompt.contains("\"html\""));
            assert!(prompt.contains("\"css\""));
            assert!(prompt.contains("\"js\""));
        }
    }

    #[test]
    fn generic_example_braces_are_literal() {
        let prompt = PromptBuilder::new().build(&request("x", None));
        assert!(prompt.contains("\"css\": \"body { color: black; }\""));
    }
}
