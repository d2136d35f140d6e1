//! Clients for an Ollama-compatible HTTP inference server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use lodestar_core::{EmbeddingModel, GenerationModel, GenerationParams, ModelError, Result};

/// Connection settings for an Ollama-compatible server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Server base URL, e.g. `http://localhost:11434`.
    pub base_url: String,
    /// Model name as known to the server, e.g. `mistral:7b-instruct-q4_0`.
    pub model: String,
}

impl OllamaConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), model: model.into() }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: i64,
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

/// Classify an HTTP error body: out-of-memory failures get their own
/// variant so the pipeline can suggest a shorter query.
fn classify_server_error(status: reqwest::StatusCode, body: String) -> ModelError {
    let lowered = body.to_lowercase();
    if lowered.contains("out of memory") || lowered.contains("oom") {
        ModelError::ResourceExhausted(body)
    } else {
        ModelError::Inference(format!("server returned {status}: {body}"))
    }
}

/// Text-generation client for an Ollama-compatible server.
///
/// Implements [`GenerationModel`] with single-shot (non-streaming) calls to
/// `/api/generate`. Token-level scoring is not exposed by this protocol and
/// keeps the trait's unsupported default.
pub struct OllamaGenerator {
    client: reqwest::Client,
    config: OllamaConfig,
}

impl OllamaGenerator {
    /// Create a client and verify the server is reachable.
    ///
    /// # Errors
    ///
    /// [`ModelError::Load`] if the server cannot be reached; this is a
    /// construction-time failure, surfaced before any query is accepted.
    pub async fn connect(config: OllamaConfig) -> Result<Self> {
        let client = reqwest::Client::new();
        let url = format!("{}/api/tags", config.base_url);
        client
            .get(&url)
            .send()
            .await
            .map_err(|e| ModelError::Load(format!("cannot reach {}: {e}", config.base_url)))?;
        info!(model = %config.model, base_url = %config.base_url, "generation backend ready");
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }
}

#[async_trait]
impl GenerationModel for OllamaGenerator {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: params.max_new_tokens as i64,
                // Greedy decoding is temperature zero on this protocol.
                temperature: if params.sample { params.temperature } else { 0.0 },
                top_p: params.top_p,
                repeat_penalty: params.repeat_penalty,
            },
        };

        debug!(model = %self.config.model, prompt_chars = prompt.len(), "generate request");

        let url = format!("{}/api/generate", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ModelError::Inference(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_server_error(status, body));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::Inference(format!("malformed response: {e}")))?;
        Ok(body.response)
    }
}

/// Embedding client for an Ollama-compatible server.
///
/// The vector dimensionality is probed once at construction so the index
/// loader can verify it against the persisted artifact before any query
/// runs.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    config: OllamaConfig,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create a client and probe the embedding dimensionality.
    ///
    /// # Errors
    ///
    /// [`ModelError::Load`] if the server is unreachable or the probe
    /// returns an empty vector.
    pub async fn connect(config: OllamaConfig) -> Result<Self> {
        let client = reqwest::Client::new();
        let probe = request_embedding(&client, &config, "dimension probe")
            .await
            .map_err(|e| ModelError::Load(format!("embedding probe failed: {e}")))?;
        if probe.is_empty() {
            return Err(ModelError::Load(format!(
                "embedding model '{}' returned an empty vector",
                config.model
            )));
        }
        info!(model = %config.model, dimensions = probe.len(), "embedding backend ready");
        Ok(Self { client, dimensions: probe.len(), config })
    }
}

async fn request_embedding(
    client: &reqwest::Client,
    config: &OllamaConfig,
    text: &str,
) -> Result<Vec<f32>> {
    let url = format!("{}/api/embeddings", config.base_url);
    let request = EmbeddingsRequest { model: &config.model, prompt: text };
    let response = client
        .post(&url)
        .json(&request)
        .send()
        .await
        .map_err(|e| ModelError::Inference(format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify_server_error(status, body));
    }

    let body: EmbeddingsResponse = response
        .json()
        .await
        .map_err(|e| ModelError::Inference(format!("malformed response: {e}")))?;
    Ok(body.embedding)
}

#[async_trait]
impl EmbeddingModel for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        request_embedding(&self.client, &self.config, text).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oom_bodies_are_classified_as_resource_exhausted() {
        let err = classify_server_error(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR,
            "model runner: CUDA out of memory".to_string(),
        );
        assert!(matches!(err, ModelError::ResourceExhausted(_)));
    }

    #[test]
    fn other_bodies_are_classified_as_inference_errors() {
        let err = classify_server_error(
            reqwest::StatusCode::NOT_FOUND,
            "model 'nope' not found".to_string(),
        );
        assert!(matches!(err, ModelError::Inference(_)));
    }

    #[test]
    fn generate_request_serializes_decoding_options() {
        let request = GenerateRequest {
            model: "m",
            prompt: "p",
            stream: false,
            options: GenerateOptions {
                num_predict: 512,
                temperature: 0.7,
                top_p: 0.9,
                repeat_penalty: 1.1,
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["options"]["num_predict"], 512);
        assert_eq!(value["stream"], false);
    }
}
