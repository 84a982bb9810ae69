// SPDX-License-Identifier: MIT

//! Vision-model recognition adapter
//!
//! Submits the card image to a chat-completions endpoint as a base64 data
//! URL and expects a JSON object with `name` and `series` fields back,
//! possibly wrapped in a Markdown code fence. Decoding is strict and kept
//! separate from the transport: a non-success status, a malformed reply, or
//! a missing field all map to [`Recognition::Unidentified`].

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CardIdentity, Recognition, RecognitionAdapter};
use crate::{Config, Result};

/// Vision-model recognition adapter
pub struct VisionAdapter {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    system_prompt: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<serde_json::Value>,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Reply schema expected from the model
#[derive(Deserialize)]
struct CardReply {
    #[serde(default)]
    name: String,
    #[serde(default)]
    series: String,
}

impl VisionAdapter {
    /// Create an adapter whose system prompt presents the model as an
    /// `expertise` (e.g. "Pokemon trading card game expert").
    pub fn new(config: &Config, expertise: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            system_prompt: format!("You are a {expertise} that responds in JSON."),
        }
    }

    async fn submit(&self, user_text: &str, image_base64: &str) -> Result<Option<String>> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                serde_json::json!({"role": "system", "content": self.system_prompt}),
                serde_json::json!({
                    "role": "user",
                    "content": [
                        {"type": "text", "text": user_text},
                        {
                            "type": "image_url",
                            "image_url": {
                                "url": format!("data:image/jpeg;base64,{image_base64}")
                            }
                        }
                    ]
                }),
            ],
            max_tokens: 300,
        };

        debug!("Sending vision request: model={}", self.model);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("Vision request failed with status {}", response.status());
            return Ok(None);
        }

        match response.json::<ChatResponse>().await {
            Ok(reply) => Ok(reply.choices.into_iter().next().map(|c| c.message.content)),
            Err(e) => {
                warn!("Unexpected vision response format: {}", e);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl RecognitionAdapter for VisionAdapter {
    fn name(&self) -> &'static str {
        "vision"
    }

    async fn identify(&self, path: &Path) -> Result<Recognition> {
        let image_base64 = encode_image_jpeg(path)?;

        tracing::info!("Submitting picture for review...");

        let content = match self
            .submit(
                "Please identify this card. Only return the name of the card, \
                 and the series it's from.",
                &image_base64,
            )
            .await?
        {
            Some(content) => content,
            None => return Ok(Recognition::Unidentified),
        };

        match parse_card_reply(&content) {
            Some(identity) => Ok(Recognition::Identified(identity)),
            None => {
                warn!("Failed to parse the response for {:?}", path);
                Ok(Recognition::Unidentified)
            }
        }
    }
}

/// Text extraction backed by the same vision endpoint, for the OCR path.
pub struct VisionTextExtractor {
    adapter: VisionAdapter,
}

impl VisionTextExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            adapter: VisionAdapter::new(config, "card transcription assistant"),
        }
    }
}

#[async_trait]
impl super::ocr::TextExtractor for VisionTextExtractor {
    async fn extract_top_line(&self, path: &Path) -> Result<Option<String>> {
        let image_base64 = encode_image_jpeg(path)?;

        let content = self
            .adapter
            .submit(
                "Transcribe the most prominent line of printed text on this \
                 card. Return ONLY that text, nothing else.",
                &image_base64,
            )
            .await?;

        Ok(content
            .map(|c| c.trim().trim_matches('"').to_string())
            .filter(|c| !c.is_empty()))
    }
}

/// Decode the image and re-encode it as JPEG (resized to at most 1024px on
/// the longest side), then base64 it for the data URL. An undecodable image
/// surfaces as an error and is routed like any other adapter failure.
pub fn encode_image_jpeg(path: &Path) -> Result<String> {
    let img = image::open(path)?;

    let img = if img.width() > 1024 || img.height() > 1024 {
        img.resize(1024, 1024, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    img.write_to(&mut cursor, image::ImageFormat::Jpeg)?;

    Ok(general_purpose::STANDARD.encode(&buffer))
}

/// Strict decode of the model reply into a card identity.
///
/// Requires a JSON object with non-empty `name` and `series` strings;
/// anything else is `None`. Tolerates a ```json code fence around the body.
pub fn parse_card_reply(content: &str) -> Option<CardIdentity> {
    let body = strip_code_fence(content);

    let reply: CardReply = serde_json::from_str(body).ok()?;
    if reply.name.is_empty() || reply.series.is_empty() {
        return None;
    }

    Some(CardIdentity {
        name: reply.name,
        series: Some(reply.series),
    })
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_reply() {
        let identity = parse_card_reply(r#"{"name": "Pikachu", "series": "Base Set"}"#).unwrap();
        assert_eq!(identity.name, "Pikachu");
        assert_eq!(identity.series.as_deref(), Some("Base Set"));
    }

    #[test]
    fn test_parse_fenced_reply() {
        let content = "```json\n{\"name\": \"Elsa\", \"series\": \"The First Chapter\"}\n```";
        let identity = parse_card_reply(content).unwrap();
        assert_eq!(identity.name, "Elsa");
    }

    #[test]
    fn test_parse_bare_fence() {
        let content = "```\n{\"name\": \"Elsa\", \"series\": \"Rise of the Floodborn\"}\n```";
        assert!(parse_card_reply(content).is_some());
    }

    #[test]
    fn test_missing_series_is_rejected() {
        assert!(parse_card_reply(r#"{"name": "Pikachu"}"#).is_none());
        assert!(parse_card_reply(r#"{"name": "Pikachu", "series": ""}"#).is_none());
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(parse_card_reply("I think this is Pikachu from Base Set.").is_none());
        assert!(parse_card_reply("").is_none());
        assert!(parse_card_reply("```json\nnot json\n```").is_none());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("{}"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
    }
}
