//! Generate a static website from a prompt using OpenRouter.
//!
//! Reads the API key from the `OPENROUTER_API_KEY` environment variable
//! (a `.env` file in the working directory is honored).
//!
//! # Examples
//!
//! ```sh
//! # Landing page (default preset) into ./generated-site
//! sitegen generate "A landing page for a Lisbon bakery"
//!
//! # Portfolio with a different model and output directory
//! sitegen generate "Portfolio for a wildlife photographer" \
//!   --preset portfolio --model anthropic/claude-sonnet-4 --output site
//!
//! # Refuse bundles with eval/storage access instead of commenting them out
//! sitegen generate "Docs for a CLI tool" --preset documentation --js-policy reject
//!
//! # List presets and available models
//! sitegen presets
//! sitegen models
//! ```

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sitegen::config::{GeneratorConfig, MODEL_VAR, TEMPLATES_DIR_VAR, api_key_from_env};
use sitegen::site::{
    BundleSource, FallbackCatalog, Generation, GenerationRequest, JsPolicy, Preset, write_site,
};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Generate a static website from a prompt using OpenRouter.
#[derive(Parser)]
#[command(name = "sitegen", version)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a site from a description
    Generate(GenerateArgs),
    /// List the built-in presets
    Presets,
    /// List models available on OpenRouter
    Models,
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Description of the site to generate
    prompt: String,

    // ── Output ─────────────────────────────────────────────────
    /// Preset (landing-page, portfolio, blog, ecommerce, documentation)
    /// or any fallback template name
    #[arg(short, long, default_value = "landing-page")]
    preset: String,

    /// Output directory
    #[arg(short, long, default_value = "generated-site")]
    output: PathBuf,

    // ── Model ──────────────────────────────────────────────────
    /// Model to use
    #[arg(long, env = MODEL_VAR, default_value = sitegen::DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature
    #[arg(long, default_value_t = sitegen::DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Maximum tokens in the response
    #[arg(long, default_value_t = sitegen::DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    /// API key (defaults to OPENROUTER_API_KEY)
    #[arg(long, hide = true)]
    api_key: Option<String>,

    // ── Resilience ─────────────────────────────────────────────
    /// Attempts before falling back to a template (1-10)
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(1..=10))]
    attempts: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 120)]
    request_timeout: u64,

    /// Overall deadline in seconds; on expiry the fallback template is used
    #[arg(long)]
    timeout: Option<u64>,

    /// Directory of fallback templates
    #[arg(long, env = TEMPLATES_DIR_VAR, default_value = "./templates")]
    templates: PathBuf,

    /// What to do with eval/cookie/storage access in generated JS
    #[arg(long, default_value_t = JsPolicy::Neutralize)]
    js_policy: JsPolicy,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match cli.command {
        Command::Generate(args) => generate(args).await,
        Command::Presets => {
            print_presets();
            Ok(())
        }
        Command::Models => list_models().await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let config = GeneratorConfig::default()
        .with_model(args.model)
        .with_temperature(args.temperature)
        .with_max_tokens(args.max_tokens)
        .with_timeout(Duration::from_secs(args.request_timeout))
        .with_attempts(args.attempts)
        .with_js_policy(args.js_policy)
        .with_templates_dir(args.templates);

    let api_key = match args.api_key {
        Some(key) => key,
        None => api_key_from_env()?,
    };
    let catalog = Arc::new(config.load_catalog());
    let client = config.build_client(api_key)?;
    let generator = config.build_generator_with(client, catalog.clone());

    let request = GenerationRequest::new(args.prompt, Some(args.preset))?;
    if request.preset().is_none() {
        warn!(
            "'{}' is not a built-in preset; using the generic prompt",
            request.category().unwrap_or_default()
        );
    }

    println!("Generating site...");
    println!("  Prompt: {}", request.prompt());
    println!("  Preset: {}", request.category().unwrap_or("none"));
    println!("  Output: {}", args.output.display());

    let generation = match args.timeout {
        Some(secs) => {
            let category = request.category().map(str::to_string);
            match tokio::time::timeout(
                Duration::from_secs(secs),
                generator.generate_with_report(request),
            )
            .await
            {
                Ok(generation) => generation,
                Err(_) => {
                    warn!("Generation exceeded {secs}s deadline; using fallback template");
                    deadline_fallback(&catalog, category.as_deref())
                }
            }
        }
        None => generator.generate_with_report(request).await,
    };

    let files = write_site(&args.output, &generation)
        .with_context(|| format!("failed to write site to {}", args.output.display()))?;

    match &generation.source {
        BundleSource::Model { attempts } => {
            println!("Site generated by the model (attempt {attempts}).");
        }
        BundleSource::Fallback { category, failures } if failures.is_empty() => {
            eprintln!("Note: deadline reached; used the '{category}' fallback template.");
        }
        BundleSource::Fallback { category, failures } => {
            eprintln!(
                "Note: the model did not produce a usable site after {} attempt(s); \
                 used the '{category}' fallback template.",
                failures.len()
            );
        }
    }
    for path in [&files.html, &files.css, &files.js, &files.report] {
        println!("  {}", path.display());
    }
    Ok(())
}

fn deadline_fallback(catalog: &FallbackCatalog, category: Option<&str>) -> Generation {
    Generation {
        bundle: catalog.get(category).clone(),
        source: BundleSource::Fallback {
            category: catalog.resolve(category).to_string(),
            failures: Vec::new(),
        },
    }
}

fn print_presets() {
    for preset in Preset::ALL {
        println!("{:<15} {}", preset.key(), preset.summary());
    }
}

async fn list_models() -> anyhow::Result<()> {
    // The model list is public; the key only satisfies the client builder.
    let api_key = api_key_from_env().unwrap_or_else(|_| "anonymous".to_string());
    let config = GeneratorConfig::from_env();
    let client = config.build_client(api_key)?;
    for model in client.list_models().await {
        println!("{model}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempts_outside_range_are_refused() {
        for value in ["0", "11", "4294967295"] {
            let parsed = Cli::try_parse_from(["sitegen", "generate", "a site", "--attempts", value]);
            assert!(parsed.is_err(), "--attempts {value} was accepted");
        }
    }

    #[test]
    fn attempts_default_to_three() {
        let cli = Cli::try_parse_from(["sitegen", "generate", "a site"]).unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.attempts, 3);
        assert_eq!(args.js_policy, JsPolicy::Neutralize);
    }
}
