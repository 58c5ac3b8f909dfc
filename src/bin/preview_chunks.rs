//! Preview chunks binary - shows how a document would be split for translation
//!
//! Usage:
//!   cargo run --bin preview-chunks -- posts/my-post.md
//!   cargo run --bin preview-chunks -- posts/my-post.md 600
//!
//! The optional second argument overrides MAX_CHUNK_LENGTH (defaults to 1800).
//! The body is prepared the way it is for a non-source language: front matter
//! cut off and markers stripped. Nothing is sent to the model.

use anyhow::{bail, Context, Result};
use auto_translator::chunker;
use auto_translator::settings::Markers;
use auto_translator::translator;
use std::fs;
use tracing::info;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("preview_chunks=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: preview-chunks <file> [max_chunk_length]");
    };
    let max_len: usize = match args.next() {
        Some(arg) => arg.parse().context("max_chunk_length must be a number")?,
        None => std::env::var("MAX_CHUNK_LENGTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1800),
    };
    if max_len == 0 {
        bail!("max_chunk_length must be greater than zero");
    }

    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path))?;

    let prepared = translator::prepare(&content, &path, &Markers::default(), false);
    if let Some(front_matter) = &prepared.front_matter {
        info!(
            "Front matter with {} keys (sent separately)",
            front_matter.entries().len()
        );
    }

    let chunks = chunker::chunk(&prepared.body, max_len);
    info!("{} chunks at max {} chars", chunks.len(), max_len);

    for (i, chunk) in chunks.iter().enumerate() {
        let len = chunk.chars().count();
        let note = if len > max_len { " (single oversized paragraph)" } else { "" };
        println!("===== chunk {}/{}: {} chars{} =====", i + 1, chunks.len(), len, note);
        println!("{}", chunk);
    }

    Ok(())
}
