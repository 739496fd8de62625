//! HTTP-backed embedding client, exposed to `rating-core` through the
//! synchronous [`rating_core::capability::Embedder`] trait.
//!
//! `rating-core` cannot depend on an async runtime, so [`HttpEmbedder`]
//! bridges the gap by blocking on the async call via a captured
//! [`tokio::runtime::Handle`] — safe as long as `encode` is only ever
//! invoked from a blocking context (e.g. inside `spawn_blocking`), which
//! is how the scoring pipeline calls it.

use std::time::Duration;

use rating_core::capability::Embedder;
use serde::Deserialize;
use tracing::warn;

use crate::retry::with_retry;

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Talks to an Ollama-compatible `/api/embeddings` endpoint.
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    handle: tokio::runtime::Handle,
    max_retry_attempts: u32,
    retry_base_delay: Duration,
}

impl HttpEmbedder {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        handle: tokio::runtime::Handle,
        max_retry_attempts: u32,
        retry_base_delay: Duration,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            handle,
            max_retry_attempts,
            retry_base_delay,
        }
    }

    async fn embed_async(&self, text: &str) -> Result<Vec<f32>, String> {
        let url = format!("{}/api/embeddings", self.base_url.trim_end_matches('/'));

        // Transport errors (timeouts, connection failures) are retried;
        // a non-2xx response is a protocol error and is surfaced as-is.
        let response = with_retry(self.max_retry_attempts, self.retry_base_delay, || async {
            self.client
                .post(&url)
                .json(&serde_json::json!({ "model": self.model, "prompt": text }))
                .send()
                .await
                .map_err(|e| e.to_string())
        })
        .await?;

        if !response.status().is_success() {
            return Err(format!("embedding service returned {}", response.status()));
        }

        response
            .json::<EmbeddingResponse>()
            .await
            .map(|body| body.embedding)
            .map_err(|e| e.to_string())
    }
}

impl Embedder for HttpEmbedder {
    fn encode(&self, text: &str) -> Vec<f32> {
        match self.handle.block_on(self.embed_async(text)) {
            Ok(embedding) => embedding,
            Err(err) => {
                warn!(%err, "embedding request failed, falling back to empty vector");
                Vec::new()
            }
        }
    }
}
