//! REST client for the narrative generation service.
//!
//! The generation service turns a resolved round (the chapter so far plus
//! the winning action) into the next chapter's prose and preset choices.
//! Generation happens over HTTP and is the slow, fallible step of round
//! resolution, so the client is kept behind the [`ContinuationGenerator`]
//! trait and swapped for a stub in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Generation requests are bounded; a hung service must not stall the
/// resolution loop indefinitely.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything the generation service needs to continue the story.
#[derive(Debug, Clone, Serialize)]
pub struct ContinuationRequest {
    /// Title of the story being continued.
    pub story_title: String,
    /// Prose of the chapter the winning action concluded.
    pub previous_content: String,
    /// The community's winning action text.
    pub winning_action: String,
    /// Number the generated chapter will carry.
    pub next_chapter_number: i32,
}

/// A generated chapter: prose plus the preset choices for the next round.
#[derive(Debug, Clone, Deserialize)]
pub struct Continuation {
    pub title: String,
    pub content: String,
    pub choices: Vec<String>,
}

/// Errors from the narrative service client.
#[derive(Debug, thiserror::Error)]
pub enum NarrativeError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("narrative service error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered 2xx but the payload is unusable.
    #[error("invalid continuation: {0}")]
    InvalidContinuation(String),
}

/// Source of generated chapters. Production uses [`NarrativeApi`]; tests
/// substitute a canned implementation.
#[async_trait]
pub trait ContinuationGenerator: Send + Sync {
    async fn generate(&self, request: &ContinuationRequest)
        -> Result<Continuation, NarrativeError>;
}

/// HTTP client for the narrative generation service.
pub struct NarrativeApi {
    client: reqwest::Client,
    api_url: String,
}

impl NarrativeApi {
    /// Create a client for the service at `api_url` (base HTTP URL, e.g.
    /// `http://narrative:9090`).
    pub fn new(api_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { client, api_url }
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String) -> Self {
        Self { client, api_url }
    }

    /// Request a continuation via `POST /v1/continuations`.
    pub async fn generate_continuation(
        &self,
        request: &ContinuationRequest,
    ) -> Result<Continuation, NarrativeError> {
        let response = self
            .client
            .post(format!("{}/v1/continuations", self.api_url))
            .json(request)
            .send()
            .await?;

        let continuation: Continuation = Self::parse_response(response).await?;
        validate(&continuation)?;
        Ok(continuation)
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, capturing the body
    /// text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, NarrativeError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(NarrativeError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, NarrativeError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl ContinuationGenerator for NarrativeApi {
    async fn generate(
        &self,
        request: &ContinuationRequest,
    ) -> Result<Continuation, NarrativeError> {
        self.generate_continuation(request).await
    }
}

/// A continuation must carry prose and at least one preset choice, or the
/// next round would open with nothing to vote on.
fn validate(continuation: &Continuation) -> Result<(), NarrativeError> {
    if continuation.content.trim().is_empty() {
        return Err(NarrativeError::InvalidContinuation(
            "empty chapter content".to_string(),
        ));
    }
    if continuation.choices.iter().all(|c| c.trim().is_empty()) {
        return Err(NarrativeError::InvalidContinuation(
            "no usable preset choices".to_string(),
        ));
    }
    Ok(())
}
