//! LLM-backed scene rewriting, exposed to `rating-core` through the
//! synchronous [`rating_core::capability::Rewriter`] trait, the same
//! block-on-a-handle bridge used by [`crate::embeddings::HttpEmbedder`].

use std::time::Duration;

use rating_core::capability::Rewriter;
use rating_core::error::{Error, Result};
use serde::Deserialize;

use crate::retry::with_retry;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Talks to an Ollama-compatible `/api/generate` endpoint with streaming
/// disabled, collecting the full rewritten text in one response.
pub struct LlmRewriter {
    client: reqwest::Client,
    base_url: String,
    model: String,
    handle: tokio::runtime::Handle,
    max_retry_attempts: u32,
    retry_base_delay: Duration,
}

impl LlmRewriter {
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

    async fn rewrite_async(&self, scene_text: &str, instructions: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let prompt = format!(
            "Rewrite the following screenplay scene per these instructions: {instructions}\n\n\
             Keep it in screenplay format and preserve character names.\n\n---\n{scene_text}\n---"
        );

        // Transport errors (timeouts, connection failures) are retried;
        // a non-2xx response is a protocol error and is surfaced without
        // retry, per §7's error taxonomy.
        let response = with_retry(self.max_retry_attempts, self.retry_base_delay, || async {
            self.client
                .post(&url)
                .json(&serde_json::json!({ "model": self.model, "prompt": prompt, "stream": false }))
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        Error::MLTimeout(e.to_string())
                    } else {
                        Error::MLUnavailable(e.to_string())
                    }
                })
        })
        .await?;

        if !response.status().is_success() {
            return Err(Error::MLProtocolError(format!("llm service returned {}", response.status())));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| Error::External(e.to_string()))?;

        Ok(body.response)
    }
}

impl Rewriter for LlmRewriter {
    fn rewrite(&self, scene_text: &str, instructions: &str) -> Result<String> {
        self.handle.block_on(self.rewrite_async(scene_text, instructions))
    }
}
