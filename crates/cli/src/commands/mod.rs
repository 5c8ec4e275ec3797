//! Subcommand implementations and the wiring they share.

pub mod ask;
pub mod chat;
pub mod extract;
pub mod onboard;
pub mod summarize;

use std::path::PathBuf;
use std::sync::Arc;

use docchat_chat::{ChatResponder, ContextAssembler, Session, UploadOutcome};
use docchat_config::{AppConfig, ConfigError};
use docchat_core::document::Document;
use docchat_core::error::Error;
use docchat_extract::Extractor;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Providers that run locally and accept requests without a key.
const KEYLESS_PROVIDERS: &[&str] = &["ollama", "vllm", "llamacpp", "llama.cpp"];

pub fn load_config() -> CliResult<AppConfig> {
    let config = AppConfig::load().map_err(config_error)?;
    config.validate().map_err(config_error)?;
    Ok(config)
}

fn config_error(e: ConfigError) -> Error {
    Error::Config {
        message: e.to_string(),
    }
}

/// Read every path into an in-memory document, in argument order.
pub fn read_documents(paths: &[PathBuf]) -> CliResult<Vec<Document>> {
    let mut documents = Vec::with_capacity(paths.len());
    for path in paths {
        let document = Document::from_path(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        documents.push(document);
    }
    Ok(documents)
}

pub fn assembler(config: &AppConfig) -> ContextAssembler {
    ContextAssembler::new(
        Extractor::new().with_excel_preview_rows(config.extraction.excel_preview_rows),
    )
}

/// Check for an API key early and give a clear error.
pub fn require_api_key(config: &AppConfig) -> CliResult {
    if config.has_api_key() || KEYLESS_PROVIDERS.contains(&config.default_provider.as_str()) {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No API key configured for '{}'!", config.default_provider);
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    export OPENAI_API_KEY='sk-...'");
    eprintln!("    export DOCCHAT_API_KEY='sk-...'   (takes precedence)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_path().display());
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}

/// Wire a session to the configured provider.
pub fn build_session(config: &AppConfig) -> CliResult<Session> {
    require_api_key(config)?;

    let router = docchat_providers::router::build_from_config(config);
    let provider = router.default().ok_or("No default provider configured")?;
    let model = docchat_providers::router::model_for(config, &config.default_provider);

    let responder = ChatResponder::new(
        provider,
        model,
        config.chat.clone(),
        config.summary.clone(),
    );
    Ok(Session::new(Arc::new(assembler(config)), Arc::new(responder)))
}

/// Load `paths` into `session` and report what happened.
pub fn load_into(session: &mut Session, paths: &[PathBuf]) -> CliResult {
    let documents = read_documents(paths)?;
    let outcome = session.load_documents(documents)?;
    print_outcome(&outcome);
    Ok(())
}

pub fn print_outcome(outcome: &UploadOutcome) {
    match outcome {
        UploadOutcome::Empty => eprintln!("  No files given."),
        UploadOutcome::Unchanged => eprintln!("  Documents already loaded."),
        UploadOutcome::Loaded(report) => {
            for (name, error) in &report.failures {
                eprintln!("  [Skipped] {name}: {error}");
            }
            eprintln!(
                "  Loaded {} document(s), {} characters: {}",
                report.processed.len(),
                report.context_chars,
                report.processed.join(", ")
            );
        }
    }
}
