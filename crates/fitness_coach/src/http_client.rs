//! Gemini `generateContent` over reqwest.
//!
//! Implements [`GenerativeClient`](crate::GenerativeClient). One request per
//! call; timeouts and non-2xx statuses are mapped to [`CoachError`] and never
//! retried.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::prompt::PromptRequest;
use crate::{CoachError, GenerativeClient};

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct WireGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// First part text of the first candidate, if there is one.
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Gemini client backed by reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestGeminiClient {
    base_url: String,
    model: String,
    api_key: SecretString,
    timeout: Duration,
    client: reqwest::Client,
}

impl ReqwestGeminiClient {
    /// # Arguments
    /// * `base_url` - API root, e.g. `https://generativelanguage.googleapis.com`
    /// * `model` - model id, e.g. `gemini-2.5-flash`
    /// * `api_key` - sent as the `key` query parameter
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.base_url,
            config.model.clone(),
            config.api_key.clone(),
            config.timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Turn a failed response into the matching error variant.
    async fn error_from_response(&self, resp: reqwest::Response) -> CoachError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(status, body = %body.chars().take(256).collect::<String>(), "gemini request failed");
        CoachError::from_status(status, body)
    }
}

#[async_trait]
impl GenerativeClient for ReqwestGeminiClient {
    async fn generate(&self, request: &PromptRequest) -> Result<String, CoachError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: &request.text,
                }],
            }],
            generation_config: WireGenerationConfig {
                temperature: request.generation.temperature,
                max_output_tokens: request.generation.max_output_tokens,
            },
        };

        tracing::debug!(model = %self.model, "sending generateContent request");
        let resp = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.expose_secret())])
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        tracing::debug!(status = status.as_u16(), "gemini response status");
        if !status.is_success() {
            return Err(self.error_from_response(resp).await);
        }

        let text = resp.text().await?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| CoachError::Decode(e.to_string()))?;
        parsed.into_text().ok_or(CoachError::NoResponse)
    }
}
