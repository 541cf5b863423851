//! Gemini API client for structured extraction.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::error::{ExtractionError, Result};
use super::schema::{build_prompt, response_schema, DEFAULT_MODEL, TEMPERATURE};
use super::FieldExtractor;
use crate::record::ProfileFields;

/// Default connect timeout for HTTP requests (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout (2 minutes). Extraction calls routinely take
/// tens of seconds on dense sheets.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Maximum length for sanitized error bodies to prevent log flooding.
const MAX_ERROR_BODY_LENGTH: usize = 200;

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Extraction client backed by the Gemini `generateContent` endpoint.
///
/// The API key travels in the `x-goog-api-key` header, never in the URL,
/// so request errors and logs cannot leak it.
pub struct GeminiExtractor {
    client: Client,
    api_key: SecretString,
    model: String,
    base_url: String,
}

impl GeminiExtractor {
    /// Creates an extractor using the default model.
    pub fn new(api_key: SecretString) -> Result<Self> {
        Ok(Self {
            client: create_http_client()?,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Selects a different generation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Overrides the API base URL. Intended for tests and proxies.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sends one generation request and returns the reply text.
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                response_mime_type: "application/json",
                response_schema: response_schema(),
            },
        };

        debug!("Requesting extraction from model {}", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Api {
                status,
                body: sanitize_error_body(&body),
            });
        }

        let response: GenerateContentResponse = response.json().await?;
        let text = response_text(&response);
        if text.is_empty() {
            return Err(ExtractionError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl FieldExtractor for GeminiExtractor {
    async fn extract(&self, csv_data: &str) -> Result<ProfileFields> {
        let prompt = build_prompt(csv_data);
        let text = self.generate(&prompt).await?;
        let fields: ProfileFields = serde_json::from_str(&clean_json(&text))?;
        Ok(fields)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
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
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Creates an HTTP client with extraction-appropriate timeouts.
fn create_http_client() -> Result<Client> {
    let client = Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()?;
    Ok(client)
}

/// Concatenates the text parts of the first candidate.
fn response_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
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

/// Strips Markdown code fences that models sometimes wrap around JSON.
fn clean_json(text: &str) -> String {
    text.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Truncates an error body to a loggable length without splitting a
/// character.
fn sanitize_error_body(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY_LENGTH) {
        Some((byte_index, _)) => format!("{}... (truncated)", &body[..byte_index]),
        None => body.to_string(),
    }
}
