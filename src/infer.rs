//! Inference collaborator abstraction and the Ollama client.
//!
//! The extraction contract talks to the model through the
//! [`InferenceClient`] trait: prompt in, completion text out. The
//! production implementation posts to an Ollama `/api/generate` endpoint.
//!
//! # Retry strategy
//!
//! Transient failures are retried with exponential backoff, capped by
//! `model.max_retries`:
//! - HTTP 429 and 5xx → retry
//! - other HTTP 4xx → fail immediately
//! - network errors and per-attempt timeouts → retry
//! - Backoff: 1s, 2s, 4s, 8s, ... (exponent capped at 2^5)

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ModelConfig;

/// Inference failure, classified so callers can tell retryable conditions
/// from hard endpoint errors.
#[derive(Debug, Error)]
pub enum InferError {
    #[error("inference request timed out after {0}s")]
    Timeout(u64),
    #[error("inference endpoint error {status}: {body}")]
    Endpoint { status: u16, body: String },
    #[error("inference transport error: {0}")]
    Transport(String),
    #[error("malformed inference response: {0}")]
    Malformed(String),
    #[error("inference failed after {0} attempts")]
    RetriesExhausted(u32),
}

/// The external model endpoint: synchronous request/response, no
/// streaming, no structured contract on the wire.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, InferError>;
}

/// Client for a local Ollama server.
pub struct OllamaClient {
    endpoint: String,
    model: String,
    timeout_secs: u64,
    max_retries: u32,
    http: reqwest::Client,
}

impl OllamaClient {
    pub fn new(config: &ModelConfig) -> Result<Self, InferError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InferError::Transport(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
            http,
        })
    }

    async fn attempt(&self, prompt: &str) -> Result<String, InferError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let resp = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(classify_reqwest_error(self.timeout_secs))?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(InferError::Endpoint {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| InferError::Malformed(e.to_string()))?;
        json.get("response")
            .and_then(|r| r.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| InferError::Malformed("missing 'response' field".to_string()))
    }
}

fn classify_reqwest_error(timeout_secs: u64) -> impl Fn(reqwest::Error) -> InferError {
    move |e| {
        if e.is_timeout() {
            InferError::Timeout(timeout_secs)
        } else {
            InferError::Transport(e.to_string())
        }
    }
}

/// Retryable: transient conditions worth another attempt.
fn is_retryable(err: &InferError) -> bool {
    match err {
        InferError::Timeout(_) | InferError::Transport(_) => true,
        InferError::Endpoint { status, .. } => *status == 429 || *status >= 500,
        InferError::Malformed(_) | InferError::RetriesExhausted(_) => false,
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    async fn complete(&self, prompt: &str) -> Result<String, InferError> {
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            match self.attempt(prompt).await {
                Ok(text) => return Ok(text),
                Err(err) if is_retryable(&err) => {
                    tracing::warn!(attempt, error = %err, "inference attempt failed");
                    last_err = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_err.unwrap_or(InferError::RetriesExhausted(self.max_retries)))
    }
}
