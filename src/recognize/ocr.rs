// SPDX-License-Identifier: MIT

//! OCR-plus-lookup recognition adapter
//!
//! Text extraction is owned by an external collaborator behind the
//! [`TextExtractor`] trait; this adapter resolves the extracted line against
//! a card database using a fuzzy name lookup. The series is never known on
//! this path.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{CardIdentity, Recognition, RecognitionAdapter};
use crate::{Config, Result};

/// Collaborator that extracts the most confident line of printed text from
/// an image.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_top_line(&self, path: &Path) -> Result<Option<String>>;
}

/// OCR-plus-lookup recognition adapter
pub struct OcrAdapter {
    extractor: Box<dyn TextExtractor>,
    client: Client,
    lookup_url: String,
}

/// Card record returned by the fuzzy lookup endpoint
#[derive(Deserialize)]
struct NamedCard {
    name: String,
}

impl OcrAdapter {
    pub fn new(extractor: Box<dyn TextExtractor>, config: &Config) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            extractor,
            client,
            lookup_url: config.lookup_url.clone(),
        }
    }

    /// Resolve extracted text to a canonical card name via the database's
    /// fuzzy lookup. Any miss (non-success status or unexpected body) is
    /// `None`.
    async fn lookup(&self, text: &str) -> Result<Option<String>> {
        let url = format!("{}/cards/named", self.lookup_url);

        let response = self
            .client
            .get(&url)
            .query(&[("fuzzy", text)])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Card not found for text: {}", text);
            return Ok(None);
        }

        match response.json::<NamedCard>().await {
            Ok(card) => Ok(Some(card.name)),
            Err(e) => {
                warn!("Unexpected lookup response for '{}': {}", text, e);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl RecognitionAdapter for OcrAdapter {
    fn name(&self) -> &'static str {
        "ocr"
    }

    async fn identify(&self, path: &Path) -> Result<Recognition> {
        let text = match self.extractor.extract_top_line(path).await? {
            Some(text) => text,
            None => {
                warn!("No text extracted from {:?}", path);
                return Ok(Recognition::Unidentified);
            }
        };

        debug!("Extracted text from {:?}: {}", path, text);

        match self.lookup(&text).await? {
            Some(name) => {
                info!("Identified card '{}' for image {:?}", name, path);
                Ok(Recognition::Identified(CardIdentity {
                    name,
                    series: None,
                }))
            }
            None => Ok(Recognition::Unidentified),
        }
    }
}
