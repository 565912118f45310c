use crate::config::EmbeddingSettings;
use crate::http::read_body;
use domain::models::{Chunk, Embedding};
use domain::providers::EmbeddingModel;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::error::{AssistantError, Result};
use tracing::debug;

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Client for an Ollama-compatible `/api/embeddings` endpoint.
#[derive(Clone)]
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(client: Client, settings: &EmbeddingSettings) -> Self {
        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
        }
    }
}

impl EmbeddingModel for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(AssistantError::transport)?;
        let body = read_body(response).await?;
        let parsed: EmbeddingResponse = serde_json::from_str(&body).map_err(|e| {
            AssistantError::Provider {
                status: 200,
                message: format!("malformed embedding response: {}", e),
            }
        })?;
        Ok(parsed.embedding)
    }
}

/// Embeds chunks in batches, a bounded number of requests in flight, preserving order.
pub struct Embedder<M> {
    model: M,
}

impl<M: EmbeddingModel> Embedder<M> {
    const BATCH_SIZE: usize = 32;
    const IN_FLIGHT: usize = 8;

    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.model.embed(text).await
    }

    pub async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(Self::BATCH_SIZE) {
            debug!("generating embeddings for {} chunks", batch.len());
            let vectors: Vec<Result<Vec<f32>>> = stream::iter(batch)
                .map(|chunk| self.model.embed(&chunk.text))
                .buffered(Self::IN_FLIGHT)
                .collect()
                .await;
            for (chunk, vector) in batch.iter().zip(vectors) {
                embeddings.push(Embedding {
                    id: chunk.id.clone(),
                    vector: vector?,
                    text: chunk.text.clone(),
                });
            }
        }
        Ok(embeddings)
    }
}
