// SPDX-License-Identifier: MIT

//! Error types for the renamer

use thiserror::Error;

/// Result type alias for renamer operations
pub type Result<T> = std::result::Result<T, RenamerError>;

/// Renamer error types
#[derive(Error, Debug)]
pub enum RenamerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Recognition error: {0}")]
    Recognition(String),
}
