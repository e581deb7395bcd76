//! Text model client
//!
//! This module holds the narrow contract the rest of the crate uses to talk
//! to a hosted language model:
//! - `TextModel` - the async trait the safety filter and listing assistant depend on
//! - `GenerateRequest` - one prompt, optionally asking for a JSON response
//! - `GeminiClient` - HTTP implementation against a `generateContent` endpoint
//!
//! Callers receive the raw model text. Interpreting it (and deciding what a
//! failure means) is up to the caller.

use crate::{storage::Settings, Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the model API key
pub const API_KEY_ENV: &str = "CAMPUSTRADE_API_KEY";

/// Fallback environment variable for the API key
pub const API_KEY_ENV_FALLBACK: &str = "API_KEY";

/// A single generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Full prompt text
    pub prompt: String,
    /// Ask the model to respond with `application/json`
    pub expect_json: bool,
}

impl GenerateRequest {
    /// Plain text request
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            expect_json: false,
        }
    }

    /// Request that expects a JSON document back
    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            expect_json: true,
        }
    }
}

/// Abstraction over a hosted text model
///
/// Implementations return the model's raw text output. An empty string is a
/// valid (if useless) response; transport and API failures are errors.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Run one generation request
    async fn generate(&self, request: GenerateRequest) -> Result<String>;
}

/// Read the API key from the environment
///
/// Checks `CAMPUSTRADE_API_KEY` first, then `API_KEY`. Blank values count as unset.
pub fn api_key_from_env() -> Option<String> {
    [API_KEY_ENV, API_KEY_ENV_FALLBACK]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<OutgoingPart<'a>>,
}

#[derive(Debug, Serialize)]
struct OutgoingPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<IncomingPart>,
}

#[derive(Debug, Default, Deserialize)]
struct IncomingPart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// HTTP client for a Gemini-style `generateContent` API
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. `https://generativelanguage.googleapis.com`
    /// * `model` - Model name, e.g. `gemini-2.5-flash`
    /// * `api_key` - API key sent in the `x-goog-api-key` header
    /// * `timeout` - Per-request timeout applied by the HTTP client
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Build a client from settings and the environment
    ///
    /// Returns `Ok(None)` when no API key is configured, which callers treat
    /// as "no remote model available".
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        let Some(api_key) = api_key_from_env() else {
            return Ok(None);
        };

        Self::new(
            settings.classifier_base_url.clone(),
            settings.classifier_model.clone(),
            api_key,
            settings.classifier_timeout(),
        )
        .map(Some)
    }

    /// Endpoint URL for the configured model
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let body = GenerateContentBody {
            contents: vec![Content {
                parts: vec![OutgoingPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: request.expect_json.then_some(GenerationConfig {
                response_mime_type: "application/json",
            }),
        };

        debug!("POST {} (json: {})", self.endpoint(), request.expect_json);

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Classifier(format!(
                "model endpoint returned HTTP {}",
                status
            )));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        Ok(parsed.text())
    }
}
