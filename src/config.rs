use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // OpenAI
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_api_url: String,
    pub openai_temperature: f32,
    pub openai_max_tokens: u32,

    // Paths
    pub source_dir: PathBuf,
    pub output_root: PathBuf,
    pub ledger_path: PathBuf,

    // Chunking
    pub max_chunk_length: usize,

    // Log the plan without calling the model or touching the ledger
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // OpenAI
            openai_api_key: std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?,
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            openai_temperature: std::env::var("OPENAI_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.3),
            openai_max_tokens: std::env::var("OPENAI_MAX_TOKENS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4096),

            // Paths
            source_dir: std::env::var("SOURCE_DIR")
                .unwrap_or_else(|_| "testdir/to-translate".to_string())
                .into(),
            output_root: std::env::var("OUTPUT_ROOT")
                .unwrap_or_else(|_| "testdir/docs".to_string())
                .into(),
            ledger_path: std::env::var("LEDGER_PATH")
                .unwrap_or_else(|_| "processed_list.txt".to_string())
                .into(),

            // Chunking
            max_chunk_length: std::env::var("MAX_CHUNK_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&v: &usize| v > 0)
                .unwrap_or(1800),

            dry_run: std::env::var("DRY_RUN")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }
}
