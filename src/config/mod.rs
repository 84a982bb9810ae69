// SPDX-License-Identifier: MIT

//! Configuration loading
//!
//! The config file is a flat `key = value` text file (`tcg.cfg` by default).
//! Only `api_key` is mandatory; everything else has a default. Lines starting
//! with `#` and blank lines are ignored.

use std::collections::HashMap;
use std::path::Path;

use crate::{RenamerError, Result};

/// Runtime configuration for the recognition back-ends
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the vision-model endpoint
    pub api_key: String,

    /// Chat-completions endpoint for vision requests
    pub endpoint: String,

    /// Vision model name
    pub model: String,

    /// Base URL of the card database used by the OCR path
    pub lookup_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_model() -> String {
    "gpt-4o".to_string()
}
fn default_lookup_url() -> String {
    "https://api.scryfall.com".to_string()
}
fn default_timeout() -> u64 {
    120
}

impl Config {
    /// Load configuration from a `key = value` file.
    ///
    /// A missing file or a missing `api_key` entry is a configuration error;
    /// the caller treats it as fatal.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RenamerError::Config(format!(
                "Configuration file {:?} not found",
                path
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let entries = parse_key_values(&content);

        let api_key = entries
            .get("api_key")
            .filter(|v| !v.is_empty())
            .cloned()
            .ok_or_else(|| {
                RenamerError::Config(format!("API key not found in {:?}", path))
            })?;

        let timeout_secs = match entries.get("timeout_secs") {
            Some(raw) => raw.parse().map_err(|_| {
                RenamerError::Config(format!("Invalid timeout_secs value: {raw}"))
            })?,
            None => default_timeout(),
        };

        Ok(Self {
            api_key,
            endpoint: entries
                .get("endpoint")
                .cloned()
                .unwrap_or_else(default_endpoint),
            model: entries.get("model").cloned().unwrap_or_else(default_model),
            lookup_url: entries
                .get("lookup_url")
                .cloned()
                .unwrap_or_else(default_lookup_url),
            timeout_secs,
        })
    }
}

fn parse_key_values(content: &str) -> HashMap<String, String> {
    let mut entries = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            entries.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    entries
}
