//! Encode a file of documents (one per line), run one query, print the
//! ranked results as JSON lines, then clear the encodings.
//!
//! Usage: latesearch <documents-file> <query> [k]
//!
//! Configuration comes from the TOML file named by `LATESEARCH_CONFIG`, or
//! from `LATESEARCH_*` variables (and `.env`) when it is unset.

use anyhow::{bail, Context, Result};
use latesearch_lib::{Retriever, RetrieverConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_K: usize = 10;

fn load_config() -> Result<RetrieverConfig> {
    match std::env::var("LATESEARCH_CONFIG") {
        Ok(path) => RetrieverConfig::from_file(&path)
            .with_context(|| format!("loading config from {}", path)),
        Err(_) => RetrieverConfig::from_env().context("loading config from environment"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(path), Some(query)) = (args.next(), args.next()) else {
        bail!("usage: latesearch <documents-file> <query> [k]");
    };
    let k = match args.next() {
        Some(raw) => raw
            .parse::<usize>()
            .with_context(|| format!("k must be a positive integer, got {:?}", raw))?,
        None => DEFAULT_K,
    };

    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
    let documents: Vec<String> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    let retriever = Retriever::new(load_config()?)?;
    let summary = retriever.encode(documents, None).await?;
    tracing::info!(added = summary.added, max_tokens = summary.max_tokens, "Ready to search");

    for result in retriever.search_encoded_docs(&query, k).await? {
        println!("{}", serde_json::to_string(&result)?);
    }

    retriever.clear_encoded_docs(true).await;
    Ok(())
}
