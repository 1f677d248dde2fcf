use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::prompt::PersonaPrompt;
use super::{CompletionError, CompletionProvider};
use crate::config::GeminiConfig;

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: [RequestContent<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
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
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate.
    fn into_reply(self) -> Result<String, CompletionError> {
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or(CompletionError::MissingText)?;

        if text.is_empty() {
            return Err(CompletionError::EmptyReply);
        }
        Ok(text)
    }
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    prompt: PersonaPrompt,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, config: &GeminiConfig, timeout: Duration) -> Self {
        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );
        Self {
            http,
            endpoint,
            api_key: config.api_key.clone(),
            prompt: config.prompt.clone(),
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn redact(error: reqwest::Error) -> CompletionError {
    CompletionError::Request(error.without_url())
}

#[async_trait]
impl CompletionProvider for GeminiClient {
    async fn complete(&self, user_sentence: &str) -> Result<String, CompletionError> {
        let prompt = self.prompt.render(user_sentence);
        let body = GenerateContentRequest {
            contents: [RequestContent {
                parts: [RequestPart { text: &prompt }],
            }],
        };

        tracing::debug!("Asking Gemini ({} prompt chars)", prompt.len());

        let response = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(redact)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!("Gemini returned {}: {}", status, detail);
            return Err(CompletionError::Status(status));
        }

        let bytes = response.bytes().await.map_err(redact)?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&bytes)
            .map_err(|e| CompletionError::Decode(e.to_string()))?;

        let reply = parsed.into_reply()?;
        tracing::debug!("Gemini replied with {} chars", reply.len());
        Ok(reply)
    }
}
