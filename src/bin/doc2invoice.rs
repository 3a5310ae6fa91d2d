//! CLI binary for doc2invoice.
//!
//! A thin shim over the library crate: `serve` runs the HTTP API, `extract`
//! runs one document through the pipeline and prints the response envelope.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc2invoice::{server, DocumentKind, Extractor, ExtractorConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "doc2invoice",
    version,
    about = "Extract structured invoice data from images and PDFs using vision LLMs",
    after_help = "\
EXAMPLES:
    # Extract one invoice and print the result as JSON
    doc2invoice extract invoice.jpg

    # Run the HTTP API on port 3000
    doc2invoice serve --port 3000

ENVIRONMENT:
    DOC2INVOICE_API_KEY     API key for the completion endpoint
    DOC2INVOICE_BASE_URL    OpenAI-compatible base URL (e.g. https://api.openai.com/v1)
    DOC2INVOICE_MODEL       Model identifier (default: gpt-4o-mini)
    OPENAI_API_KEY          Fallback key; implies the OpenAI base URL
    RUST_LOG                Log filter (e.g. doc2invoice=debug)"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP extraction service
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(long, short, default_value_t = 3000)]
        port: u16,
    },

    /// Extract a single invoice document and print the envelope JSON
    Extract {
        /// Path to the invoice image or PDF
        file: PathBuf,

        /// Override the model from the environment
        #[arg(long)]
        model: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("doc2invoice=info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { host, port } => serve(host, port).await,
        Command::Extract { file, model } => extract_one(&file, model).await,
    }
}

async fn serve(host: String, port: u16) -> Result<()> {
    let config = ExtractorConfig::from_env();
    let extractor = Extractor::new(&config).context("failed to initialise the extractor")?;

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, model = %config.model, "doc2invoice listening");
    axum::serve(listener, server::app(Arc::new(extractor)))
        .await
        .context("server error")?;
    Ok(())
}

async fn extract_one(file: &Path, model: Option<String>) -> Result<()> {
    let mut config = ExtractorConfig::from_env();
    if let Some(model) = model {
        config.model = model;
    }
    let extractor = Extractor::new(&config).context("failed to initialise the extractor")?;

    let bytes = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let kind = sniff_kind(file, &bytes);
    tracing::info!(file = %file.display(), kind = kind.noun(), "extracting");

    let (_, envelope) = extractor.extract_to_envelope(bytes, kind).await;
    println!("{}", serde_json::to_string_pretty(&envelope)?);

    if !envelope.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

/// Decide the document kind from content first, extension second.
fn sniff_kind(file: &Path, bytes: &[u8]) -> DocumentKind {
    if bytes.starts_with(b"%PDF") {
        return DocumentKind::Pdf;
    }
    match file.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => DocumentKind::Pdf,
        _ => DocumentKind::Image,
    }
}
