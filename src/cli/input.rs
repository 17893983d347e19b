//! JSON-lines input shared by the streaming commands

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tokio::io::AsyncBufRead;
use tracing::warn;

/// Open `path`, or stdin when absent
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead + Send>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Async counterpart of [`open_input`] for commands that also drive timers
pub async fn open_async_input(path: Option<&Path>) -> Result<Box<dyn AsyncBufRead + Send + Unpin>> {
    match path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Ok(Box::new(tokio::io::BufReader::new(file)))
        }
        None => Ok(Box::new(tokio::io::BufReader::new(tokio::io::stdin()))),
    }
}

/// Parse one JSON line; blank lines and bad records are skipped with a warning
pub fn parse_line<T: DeserializeOwned>(line_no: usize, line: &str) -> Option<T> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str(trimmed) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(line = line_no, error = %e, "Skipping invalid record");
            None
        }
    }
}
