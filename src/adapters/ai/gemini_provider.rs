//! Gemini Provider - Implementation of AnswerGenerator for the Gemini API.
//!
//! Calls `POST {base_url}/models/{model}:generateContent` with a single user
//! turn and reads the answer from `candidates[0].content.parts[0].text`. The key
//! travels in the `x-goog-api-key` header so it never shows up in a URL.
//!
//! # Configuration
//!
//! ```ignore
//! let provider = GeminiProvider::from_config(&config.gemini)?;
//! let answer = provider.generate("Jelaskan pecahan").await?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::ports::{AIError, AnswerGenerator};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini `generateContent` client.
pub struct GeminiProvider {
    api_key: Option<Secret<String>>,
    model: String,
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl GeminiProvider {
    /// Builds a provider from configuration.
    ///
    /// A missing API key is not an error here; every call then fails with
    /// `AIError::NotConfigured` so the webhook keeps serving menus.
    pub fn from_config(config: &GeminiConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
            client,
        })
    }

    /// Builds the generateContent endpoint URL.
    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn generate_request(&self, api_key: &str, prompt: &str) -> RequestBuilder {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        self.client
            .post(self.generate_url())
            .header(API_KEY_HEADER, api_key)
            .json(&body)
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .filter(|k| !k.is_empty())
    }

    // reqwest errors print the request URL; strip it before the error is logged.
    fn map_send_error(&self, e: reqwest::Error) -> AIError {
        let e = e.without_url();
        if e.is_timeout() {
            AIError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else if e.is_connect() {
            AIError::Network(format!("Connection failed: {}", e))
        } else {
            AIError::Network(e.to_string())
        }
    }

    fn map_decode_error(&self, e: reqwest::Error) -> AIError {
        let e = e.without_url();
        if e.is_timeout() {
            AIError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            AIError::Parse(format!("Failed to parse response: {}", e))
        }
    }

    /// Maps a non-success status to an error carrying the upstream message.
    async fn handle_response_status(&self, response: Response) -> Result<Response, AIError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<GeminiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or(body);

        Err(AIError::Upstream {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl AnswerGenerator for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, AIError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(AIError::EmptyPrompt);
        }
        let api_key = self.api_key().ok_or(AIError::NotConfigured)?;

        let response = self
            .generate_request(api_key, prompt)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let response = self.handle_response_status(response).await?;
        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| self.map_decode_error(e))?;

        extract_text(body)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Pulls `candidates[0].content.parts[0].text` out of a response.
fn extract_text(body: GenerateContentResponse) -> Result<String, AIError> {
    let text = body
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AIError::Parse("No candidates in response".to_string()))?
        .content
        .ok_or_else(|| AIError::Parse("Candidate has no content".to_string()))?
        .parts
        .into_iter()
        .next()
        .ok_or_else(|| AIError::Parse("Content has no parts".to_string()))?
        .text;

    let text = text.trim();
    if text.is_empty() {
        return Err(AIError::Parse("Empty answer text".to_string()));
    }
    Ok(text.to_string())
}

// Gemini wire types

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}
