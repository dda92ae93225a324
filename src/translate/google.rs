//! Translation through the keyless Google Translate web endpoint.

use crate::error::{Result, SubcardsError};
use crate::translate::Translator;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://translate.googleapis.com";

/// Translator backed by Google Translate's public `gtx` client endpoint.
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at another host (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

impl Default for GoogleTranslator {
    fn default() -> Self {
        Self::new()
    }
}

/// The response is a nested array whose first element lists
/// `[translated, original, ...]` pieces, one per sentence. `None` when no
/// piece carries translated text.
fn parse_response(body: &Value) -> Option<String> {
    let pieces: Vec<&str> = body
        .get(0)?
        .as_array()?
        .iter()
        .filter_map(|piece| piece.get(0).and_then(Value::as_str))
        .collect();
    if pieces.is_empty() {
        return None;
    }
    Some(pieces.concat())
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, source_lang: &str, target_lang: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        debug!("Translating {:?} ({} -> {})", text, source_lang, target_lang);

        let url = format!("{}/translate_a/single", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| SubcardsError::Translation(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SubcardsError::Translation(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(SubcardsError::Translation(format!(
                "Translate API error ({}): {}",
                status, body
            )));
        }

        let value: Value = serde_json::from_str(&body)?;
        parse_response(&value)
            .map(|t| t.trim().to_string())
            .ok_or_else(|| {
                SubcardsError::Translation(format!("Unexpected response shape: {}", body))
            })
    }

    fn name(&self) -> &'static str {
        "google"
    }
}
