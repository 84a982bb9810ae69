// SPDX-License-Identifier: MIT

//! TCG Renamer: trading-card scan identifier and sorter
//!
//! Walks per-game folders of card scans, identifies each card through an
//! OCR-plus-lookup or vision-model back-end, and files the image under
//! `Processed` (renamed after the card) or `Error` (untouched).

pub mod config;
pub mod error;
pub mod pipeline;
pub mod placer;
pub mod recognize;
pub mod sanitize;

pub use config::Config;
pub use error::{RenamerError, Result};
