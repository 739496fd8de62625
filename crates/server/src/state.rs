//! Shared application state, built once at startup and cloned (cheaply,
//! via `Arc`) into every request handler.

use std::sync::Arc;

use rating_core::aggregate::AggregatorConfig;
use rating_core::capability::{Embedder, EntityExtractor, NullEmbedder, Rewriter, SceneClassifier};

use crate::config::AppConfig;
use crate::entity::{EmbeddingSceneClassifier, RegexEntityExtractor};
use crate::job_coordinator::JobCoordinator;
use crate::job_queue::InMemoryJobQueue;
use crate::store::{ScriptStore, SqliteScriptStore};

/// Default aggregation strategy for new rating runs.
pub mod constants {
    use rating_core::aggregate::AggregatorConfig;

    pub const DEFAULT_AGGREGATOR: AggregatorConfig = AggregatorConfig::Hybrid;
    pub const MAX_JOB_HISTORY: usize = 500;
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ScriptStore>,
    pub jobs: Arc<JobCoordinator>,
    pub embedder: Arc<dyn Embedder>,
    pub rewriter: Option<Arc<dyn Rewriter>>,
    pub entity_extractor: Arc<dyn EntityExtractor>,
    pub scene_classifier: Arc<dyn SceneClassifier>,
    pub aggregator: AggregatorConfig,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let handle = tokio::runtime::Handle::current();

        let retry_base_delay = std::time::Duration::from_millis(config.retry_base_delay_ms);

        let embedder: Arc<dyn Embedder> = match &config.embedding_base_url {
            Some(url) => Arc::new(crate::embeddings::HttpEmbedder::new(
                url.clone(),
                config.embedding_model.clone(),
                handle.clone(),
                config.max_retry_attempts,
                retry_base_delay,
            )),
            None => Arc::new(NullEmbedder),
        };

        let rewriter: Option<Arc<dyn Rewriter>> = config.llm_base_url.as_ref().map(|url| {
            Arc::new(crate::llm::LlmRewriter::new(
                url.clone(),
                config.llm_model.clone(),
                handle.clone(),
                config.max_retry_attempts,
                retry_base_delay,
            )) as Arc<dyn Rewriter>
        });

        let db_path = config.data_dir.join("scripts.db");
        let store: Arc<dyn ScriptStore> = SqliteScriptStore::open(&db_path).expect("failed to open script store");

        Self {
            config: Arc::new(config),
            store,
            jobs: JobCoordinator::new(InMemoryJobQueue::new()),
            scene_classifier: Arc::new(EmbeddingSceneClassifier::new(embedder.clone())),
            embedder,
            rewriter,
            entity_extractor: Arc::new(RegexEntityExtractor),
            aggregator: constants::DEFAULT_AGGREGATOR,
        }
    }
}
