//! services/api/src/adapters/model.rs
//!
//! This module contains the adapter for the generative model. It implements
//! the `ReportModel` port from the `core` crate over the Gemini
//! `generateContent` REST API, attaching the source document as an inline
//! base64 part.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use doc_insight_core::ports::{PortError, PortResult, ReportModel};
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ReportModel` using the Gemini REST API.
#[derive(Clone)]
pub struct GeminiModel {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiModel {
    /// Creates a new `GeminiModel`.
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL; used to point the adapter at a stub server.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

//=========================================================================================
// `ReportModel` Trait Implementation
//=========================================================================================

#[async_trait]
impl ReportModel for GeminiModel {
    async fn generate_report(
        &self,
        prompt: &str,
        document: &[u8],
        mime_type: &str,
    ) -> PortResult<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": prompt },
                    {
                        "inline_data": {
                            "mime_type": mime_type,
                            "data": BASE64.encode(document),
                        }
                    },
                ],
            }],
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PortError::Unexpected(format!(
                "Model API returned {}: {}",
                status, body
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Concatenate the text parts of the first candidate.
        let text = body
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.pointer("/content/parts"))
            .and_then(|parts| parts.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                PortError::Unexpected("Model response contained no text content".to_string())
            })?;

        Ok(text)
    }
}
