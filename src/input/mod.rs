pub mod csv;
pub mod json;

pub use csv::parse_csv;
pub use json::parse_json;

use std::path::PathBuf;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;
use crate::core::RawFlashRecord;

/// Input format detection result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
    Unknown,
}

/// Detect the format of flash data by looking at its first bytes
pub fn detect_format(data: &[u8]) -> InputFormat {
    if is_json(data) {
        return InputFormat::Json;
    }

    if is_csv(data) {
        return InputFormat::Csv;
    }

    InputFormat::Unknown
}

fn is_json(data: &[u8]) -> bool {
    data.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'[')
}

fn is_csv(data: &[u8]) -> bool {
    if data.len() < 10 {
        return false;
    }

    let sample = std::str::from_utf8(&data[..data.len().min(500)]);
    match sample {
        // A cut in the middle of a multi-byte char still leaves a usable prefix
        Ok(text) => looks_like_csv(text),
        Err(e) => std::str::from_utf8(&data[..e.valid_up_to()]).is_ok_and(looks_like_csv),
    }
}

fn looks_like_csv(text: &str) -> bool {
    text.lines().take(5).any(|line| line.chars().filter(|&c| c == ',').count() >= 2)
}

/// Parse flash records, auto-detecting the format
pub fn parse_records(data: &[u8]) -> Result<Vec<RawFlashRecord>> {
    match detect_format(data) {
        InputFormat::Json => parse_json(data),
        InputFormat::Csv => parse_csv(data),
        InputFormat::Unknown => anyhow::bail!("Unknown input format"),
    }
}

/// Source of raw flash records
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Name shown in logs
    fn source_name(&self) -> &str;

    /// Fetch every record
    async fn fetch(&self) -> Result<Vec<RawFlashRecord>>;
}

/// Reads flash records from a CSV or JSON file on disk
pub struct FileProvider {
    path: PathBuf,
    name: String,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl DataProvider for FileProvider {
    fn source_name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Vec<RawFlashRecord>> {
        let data = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {:?}", self.path))?;
        let records = parse_records(&data)
            .with_context(|| format!("Failed to load flash data from {}", self.name))?;
        info!("Loaded {} flash records from {}", records.len(), self.name);
        Ok(records)
    }
}
