//! Embedding client — the single point of entry for all embedding calls.
//!
//! ARCHITECTURAL RULE: no other module may call the HuggingFace API directly.
//! All embedding interactions MUST go through this module.
//!
//! Model: sentence-transformers/all-MiniLM-L6-v2 (hardcoded — do not make
//! configurable, rankings are only comparable within a single model)

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const FEATURE_EXTRACTION_URL: &str = "https://router.huggingface.co/hf-inference/models/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction";
/// The embedding model used for all similarity scoring.
pub const MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
/// Inputs are cut at this many characters before submission. The tail of a
/// long resume is not sent to the provider.
const MAX_INPUT_CHARS: usize = 5000;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unexpected embedding format")]
    UnexpectedFormat,
}

#[derive(Debug, Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a str,
    options: RequestOptions,
}

#[derive(Debug, Serialize)]
struct RequestOptions {
    wait_for_model: bool,
    use_cache: bool,
}

/// The two response shapes the provider is known to return: a batch of one
/// vector (nested) or the vector itself (flat). Anything else is a format
/// fault, never silently coerced.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureExtractionResponse {
    Nested(Vec<Vec<f32>>),
    Flat(Vec<f32>),
}

/// Anything that can turn text into a fixed-length vector.
///
/// The pipeline depends on this trait rather than on `EmbeddingClient` so
/// tests can substitute a deterministic stub with no network access.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// HTTP client for the HuggingFace feature-extraction endpoint.
///
/// Issues exactly one request per call: `wait_for_model` makes the remote
/// side absorb cold starts, so there is no local retry loop.
#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    api_key: String,
}

impl EmbeddingClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// Embeds `text`, truncated to the first 5000 characters.
    pub async fn get_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let truncated = truncate_chars(text, MAX_INPUT_CHARS);

        let request_body = FeatureExtractionRequest {
            inputs: truncated,
            options: RequestOptions {
                wait_for_model: true,
                use_cache: false,
            },
        };

        let response = self
            .client
            .post(FEATURE_EXTRACTION_URL)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!("HuggingFace API returned {status}: {body}");
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let payload: Value = serde_json::from_str(&response.text().await?)?;
        let vector = parse_embedding(payload)?;

        debug!(
            "Embedding generated: {} dimensions from {} input chars",
            vector.len(),
            truncated.chars().count()
        );

        Ok(vector)
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.get_embedding(text).await
    }
}

/// Cuts `text` at `max_chars` characters, respecting UTF-8 boundaries.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Maps a decoded provider payload onto exactly one of the two accepted
/// shapes. A nested sequence yields its first inner vector (batch of one);
/// a flat sequence is the vector itself.
fn parse_embedding(payload: Value) -> Result<Vec<f32>, EmbeddingError> {
    match serde_json::from_value::<FeatureExtractionResponse>(payload) {
        Ok(FeatureExtractionResponse::Nested(mut batch)) => {
            if batch.is_empty() {
                return Err(EmbeddingError::UnexpectedFormat);
            }
            Ok(batch.swap_remove(0))
        }
        Ok(FeatureExtractionResponse::Flat(vector)) => Ok(vector),
        Err(_) => Err(EmbeddingError::UnexpectedFormat),
    }
}
