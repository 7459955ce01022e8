//! Command-line interface for clauselens.
//!
//! Provides commands for preprocessing and analysing contracts, extracting
//! text from documents, fraud screening, and inspecting configuration.
//! Analysis commands print the same JSON envelope the API returns.

use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use crate::adapters::{extractor_for, ForensicsClient};
use crate::api::{self, ApiReply};
use crate::config::Settings;
use crate::core::Pipeline;

/// clauselens - clause-level risk analysis for legal documents
#[derive(Parser, Debug)]
#[command(name = "clauselens")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: discovered .clauselens/config.yaml)
    #[arg(long, global = true, env = "CLAUSELENS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable model capabilities (patterns and extractive summaries only)
    #[arg(long, global = true)]
    pub offline: bool,

    /// Print single-line JSON
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Normalize, segment and classify a document
    Preprocess {
        /// Document to read (stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Full semantic analysis of a document or of preprocessed chunks
    Analyze {
        /// Document to read (stdin if neither this nor --chunks is given)
        #[arg(short, long, conflicts_with = "chunks")]
        input: Option<PathBuf>,

        /// JSON file with a chunks array (or a saved preprocess response)
        #[arg(long)]
        chunks: Option<PathBuf>,
    },

    /// Extract plain text from a PDF, image or text file
    Extract {
        file: PathBuf,
    },

    /// Screen documents for signs of fraud or tampering
    Screen {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let settings = Settings::load(self.config.as_deref())?;

        match self.command {
            Commands::Preprocess { input } => {
                let pipeline = Pipeline::from_settings(&settings, self.offline);
                let reply = match read_document(input.as_deref(), &settings).await? {
                    Ok(text) => api::handle_preprocess(&pipeline, &json!({ "text": text })).await,
                    Err(reply) => reply,
                };
                emit(&reply, self.compact)
            }
            Commands::Analyze { input, chunks } => {
                let pipeline = Pipeline::from_settings(&settings, self.offline);
                let reply = match chunks {
                    Some(path) => {
                        let body = read_chunks_file(&path)?;
                        api::handle_analyze(&pipeline, &body).await
                    }
                    None => match read_document(input.as_deref(), &settings).await? {
                        Ok(text) => api::handle_analyze(&pipeline, &json!({ "text": text })).await,
                        Err(reply) => reply,
                    },
                };
                emit(&reply, self.compact)
            }
            Commands::Extract { file } => {
                let extractor = extractor_for(&file, &settings.extraction);
                let reply = api::handle_extract(extractor.as_ref(), &file).await;
                emit(&reply, self.compact)
            }
            Commands::Screen { files } => screen(&settings, &files, self.compact).await,
            Commands::Config => show_config(&settings),
        }
    }
}

/// Document text from a file or stdin.
///
/// Extraction failures come back as a ready-made error reply.
async fn read_document(
    input: Option<&Path>,
    settings: &Settings,
) -> Result<std::result::Result<String, ApiReply>> {
    let Some(path) = input else {
        return read_stdin().map(Ok);
    };

    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let extractor = extractor_for(path, &settings.extraction);
    match api::extract_document(extractor.as_ref(), path).await {
        Ok(text) => Ok(Ok(text)),
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Text extraction failed");
            Ok(Err(ApiReply::failure(
                e.status_code(),
                "External service unavailable",
                &e.to_string(),
            )))
        }
    }
}

fn read_stdin() -> Result<String> {
    if io::stdin().is_terminal() {
        anyhow::bail!("No input provided. Use --input <file> or pipe to stdin");
    }
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(buffer)
}

/// Request body for `analyze` from a chunks file
fn read_chunks_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read chunks file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse chunks file: {}", path.display()))?;
    Ok(chunks_body(value))
}

/// Accepts a bare array, `{ "chunks": [...] }`, or a saved preprocess reply
fn chunks_body(value: Value) -> Value {
    if value.is_array() {
        return json!({ "chunks": value });
    }
    if value.get("chunks").is_none() {
        if let Some(chunks) = value.get("data").and_then(|data| data.get("chunks")) {
            return json!({ "chunks": chunks });
        }
    }
    value
}

fn print_json(value: &Value, compact: bool) -> Result<()> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", rendered);
    Ok(())
}

/// Print a reply; a failed reply becomes a non-zero exit
fn emit(reply: &ApiReply, compact: bool) -> Result<()> {
    print_json(&reply.body, compact)?;
    if !reply.is_success() {
        anyhow::bail!("Request failed with status {}", reply.status);
    }
    Ok(())
}

async fn screen(settings: &Settings, files: &[PathBuf], compact: bool) -> Result<()> {
    let client = ForensicsClient::new(&settings.forensics)?;

    match client.screen(files).await {
        Ok(report) => {
            eprintln!("[Screening accepted on attempt {}]", report.attempt);
            print_json(&report.body, compact)
        }
        Err(e) => {
            let reply = ApiReply::failure(e.status_code(), "Fraud screening failed", &e.to_string());
            emit(&reply, compact)
        }
    }
}

fn show_config(settings: &Settings) -> Result<()> {
    let redact = |secret: &Option<String>| secret.as_ref().map(|_| "(set)").unwrap_or("(not set)");

    println!("clauselens configuration");
    println!();
    println!(
        "Config file: {}",
        settings
            .config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Analysis:");
    println!("  Max tokens per chunk: {}", settings.analysis.max_tokens_per_chunk);
    println!("  Max input size:       {} bytes", settings.analysis.max_input_bytes);
    println!("  Max concurrency:      {}", settings.analysis.max_concurrency);
    println!();
    println!("Inference:");
    println!("  Endpoint:            {}", settings.inference.base_url);
    println!("  Token:               {}", redact(&settings.inference.api_token));
    println!("  Zero-shot model:     {}", settings.inference.zero_shot_model);
    println!("  Summarization model: {}", settings.inference.summarization_model);
    println!("  Timeout:             {}s", settings.inference.timeout.as_secs());
    println!();
    println!("Extraction:");
    println!(
        "  Service: {}",
        settings.extraction.url.as_deref().unwrap_or("(local text files only)")
    );
    println!("  Timeout: {}s", settings.extraction.timeout.as_secs());
    println!();
    println!("Forensics:");
    println!(
        "  Service: {}",
        settings.forensics.url.as_deref().unwrap_or("(not set)")
    );
    println!("  API key: {}", redact(&settings.forensics.api_key));
    println!("  Account: {}", settings.forensics.account_name);
    println!("  Timeout: {}s", settings.forensics.timeout.as_secs());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::parse_from(["clauselens", "analyze", "--chunks", "c.json", "--offline"]);
        assert!(cli.offline);
        assert!(matches!(
            cli.command,
            Commands::Analyze { chunks: Some(_), input: None }
        ));
    }

    #[test]
    fn test_screen_requires_files() {
        assert!(Cli::try_parse_from(["clauselens", "screen"]).is_err());
    }

    #[test]
    fn test_chunks_body_shapes() {
        let chunks = json!([{"text": "a"}]);
        assert_eq!(chunks_body(chunks.clone()), json!({"chunks": chunks}));

        let wrapped = json!({"chunks": [{"text": "a"}]});
        assert_eq!(chunks_body(wrapped.clone()), wrapped);

        let saved = json!({"success": true, "data": {"chunks": [{"text": "a"}]}});
        assert_eq!(chunks_body(saved), json!({"chunks": [{"text": "a"}]}));
    }
}
