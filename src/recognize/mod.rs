// SPDX-License-Identifier: MIT

//! Card recognition back-ends
//!
//! Recognition is delegated to external services behind the
//! [`RecognitionAdapter`] trait. Two adapters exist: OCR-plus-lookup
//! (extract the printed name, resolve it against a card database) and a
//! vision model (submit the image, decode a structured JSON reply).

pub mod ocr;
pub mod vision;

use async_trait::async_trait;
use std::path::Path;

use crate::Result;

/// A recognized card: the canonical name plus, for vision back-ends, the
/// series it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardIdentity {
    pub name: String,
    pub series: Option<String>,
}

/// Outcome of one recognition attempt.
///
/// Transport or image-read failures surface as errors instead; the driver
/// routes both `Unidentified` and errors to the `Error` folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    Identified(CardIdentity),
    Unidentified,
}

/// Trait for card recognition back-ends
#[async_trait]
pub trait RecognitionAdapter: Send + Sync {
    /// Name of this adapter, for logs
    fn name(&self) -> &'static str;

    /// Attempt to identify the card pictured in `path`
    async fn identify(&self, path: &Path) -> Result<Recognition>;
}
