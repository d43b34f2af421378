//! Ollama-backed embedder and answer generator
//!
//! Both providers share one HTTP client and acquire their model lazily on
//! first use: a memoized capability probe against the Ollama server that
//! fails with a capability-unavailable error, distinct from inference
//! failures, when the server or model is missing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tokio::time::sleep;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::types::StoredRecord;

use super::embedding::{l2_normalize, Embedder};
use super::llm::{Generator, PromptBuilder};

/// Ollama API client with bounded retry
pub struct OllamaClient {
    client: Client,
    base_url: String,
    max_retries: u32,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
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
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaClient {
    /// Create a new client
    pub fn new(config: &LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        }
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "Ollama request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            self.max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::llm("Unknown error")))
    }

    /// Verify the server is reachable and the given model is installed.
    /// Failures here are capability errors, not inference errors.
    pub async fn ensure_model(&self, model: &str) -> Result<()> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            Error::capability(format!("Ollama unreachable at {}: {}", self.base_url, e))
        })?;

        if !response.status().is_success() {
            return Err(Error::capability(format!(
                "Ollama at {} returned HTTP {}",
                self.base_url,
                response.status()
            )));
        }

        let tags: TagsResponse = response.json().await.map_err(|e| {
            Error::capability(format!("Failed to parse Ollama model list: {}", e))
        })?;

        let installed = tags
            .models
            .iter()
            .any(|m| m.name == model || m.name.starts_with(&format!("{}:", model)));
        if !installed {
            return Err(Error::capability(format!(
                "Model '{}' is not installed; run `ollama pull {}`",
                model, model
            )));
        }

        Ok(())
    }

    /// Generate an embedding
    pub async fn embed(&self, model: &str, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let model = model.to_string();
        let text = text.to_string();
        let client = self.client.clone();

        self.retry_request(|| {
            let url = url.clone();
            let model = model.clone();
            let text = text.clone();
            let client = client.clone();

            async move {
                let request = EmbedRequest {
                    model: &model,
                    prompt: &text,
                };

                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

                if !response.status().is_success() {
                    return Err(Error::embedding(format!(
                        "Embedding failed: HTTP {}",
                        response.status()
                    )));
                }

                let embed_response: EmbedResponse = response.json().await.map_err(|e| {
                    Error::embedding(format!("Failed to parse embedding response: {}", e))
                })?;

                Ok(embed_response.embedding)
            }
        })
        .await
    }

    /// Generate a completion
    pub async fn generate(&self, model: &str, prompt: &str, temperature: f32) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let model = model.to_string();
        let prompt = prompt.to_string();
        let client = self.client.clone();

        self.retry_request(|| {
            let url = url.clone();
            let model = model.clone();
            let prompt = prompt.clone();
            let client = client.clone();

            async move {
                let request = GenerateRequest {
                    model: &model,
                    prompt: &prompt,
                    stream: false,
                    options: GenerateOptions { temperature },
                };

                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::llm(format!("Generation request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::llm(format!(
                        "Generation failed: HTTP {} - {}",
                        status, body
                    )));
                }

                let generate_response: GenerateResponse = response.json().await.map_err(|e| {
                    Error::llm(format!("Failed to parse generation response: {}", e))
                })?;

                Ok(generate_response.response)
            }
        })
        .await
    }
}

/// Embedding provider backed by an Ollama model
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    model: String,
    dimensions: usize,
    ready: OnceCell<()>,
}

impl OllamaEmbedder {
    /// Create a new embedder; the model is acquired on first use
    pub fn new(client: Arc<OllamaClient>, config: &EmbeddingConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            dimensions: config.dimensions,
            ready: OnceCell::new(),
        }
    }

    async fn acquire(&self) -> Result<()> {
        self.client.ensure_model(&self.model).await?;
        tracing::info!("Embedding model '{}' acquired", self.model);
        Ok(())
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.ready.get_or_try_init(|| self.acquire()).await?;

        let mut vector = self.client.embed(&self.model, text).await?;
        if vector.len() != self.dimensions {
            return Err(Error::embedding(format!(
                "Model '{}' returned {} dimensions, expected {}",
                self.model,
                vector.len(),
                self.dimensions
            )));
        }

        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Answer generator backed by an Ollama model, prompted to stay grounded
/// in the retrieved sources and sampled at low temperature so answers are
/// reproducible across runs.
pub struct OllamaGenerator {
    client: Arc<OllamaClient>,
    model: String,
    display_name: String,
    temperature: f32,
    ready: OnceCell<()>,
}

impl OllamaGenerator {
    /// Create a new generator; the model is acquired on first use
    pub fn new(client: Arc<OllamaClient>, config: &LlmConfig) -> Self {
        Self {
            client,
            model: config.generate_model.clone(),
            display_name: format!("ollama:{}", config.generate_model),
            temperature: config.temperature,
            ready: OnceCell::new(),
        }
    }

    async fn acquire(&self) -> Result<()> {
        self.client.ensure_model(&self.model).await?;
        tracing::info!("Generation model '{}' acquired", self.model);
        Ok(())
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, query: &str, contexts: &[StoredRecord]) -> Result<String> {
        self.ready.get_or_try_init(|| self.acquire()).await?;

        let prompt = PromptBuilder::build_grounded_prompt(query, contexts);
        self.client.generate(&self.model, &prompt, self.temperature).await
    }

    fn model_name(&self) -> &str {
        &self.display_name
    }
}
