pub mod chat;
pub mod compose;
pub mod conversation;
pub mod filter;
pub mod index;
pub mod retrieval;

mod error;

pub use chat::{ChatRequest, ChatResponse, ChatTurn, ResetRequest, ResetResponse};
pub use conversation::{ConversationSession, InMemorySessionStore, SessionStore, SharedSession};
pub use error::{Error, Result};
pub use index::{CatalogImportReport, CatalogLoadReport, EmbeddingRecord, SearchHit, VectorIndex};
pub use retrieval::{FallbackReason, PoolKind, RetrievalCandidate, RetrievalOutcome};

use std::{
	future::Future,
	pin::Pin,
	sync::{Arc, RwLock},
	time::Duration,
};

use serde_json::Value;

use deco_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use deco_domain::conversation::{FollowUpPolicy, KeywordFollowUp};
use deco_providers::{chat as provider_chat, embedding};
use deco_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

/// Chat-completions collaborator. Used both for filter generation and for composing replies.
pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub query_generator: Arc<dyn ChatProvider>,
	pub composer: Arc<dyn ChatProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		query_generator: Arc<dyn ChatProvider>,
		composer: Arc<dyn ChatProvider>,
	) -> Self {
		Self { embedding, query_generator, composer }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), query_generator: provider.clone(), composer: provider }
	}
}

pub struct DecoService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
	pub sessions: Arc<dyn SessionStore>,
	pub follow_up: Arc<dyn FollowUpPolicy>,
	catalog: RwLock<Arc<VectorIndex>>,
}
impl DecoService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self::with_providers(cfg, db, Providers::default())
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		let sessions = Arc::new(InMemorySessionStore::new(
			cfg.conversation.max_sessions as usize,
			Duration::from_secs(cfg.conversation.session_ttl_secs),
		));
		let follow_up = Arc::new(KeywordFollowUp::new(
			&cfg.conversation.reset_keywords,
			&cfg.conversation.follow_up_marker,
		));

		Self {
			cfg,
			db,
			providers,
			sessions,
			follow_up,
			catalog: RwLock::new(Arc::new(VectorIndex::empty())),
		}
	}

	pub fn with_follow_up_policy(mut self, policy: Arc<dyn FollowUpPolicy>) -> Self {
		self.follow_up = policy;

		self
	}

	pub fn with_session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
		self.sessions = sessions;

		self
	}

	/// The full-catalog index currently served. Replaced wholesale by `load_catalog`.
	pub fn catalog_index(&self) -> Arc<VectorIndex> {
		self.catalog.read().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub(crate) fn swap_catalog_index(&self, index: VectorIndex) {
		*self.catalog.write().unwrap_or_else(|err| err.into_inner()) = Arc::new(index);
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}
impl ChatProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(async move { Ok(provider_chat::complete(cfg, messages).await?) })
	}
}

pub(crate) fn embedding_version(cfg: &Config) -> String {
	format!(
		"{}:{}:{}",
		cfg.providers.embedding.provider_id,
		cfg.providers.embedding.model,
		cfg.providers.embedding.dimensions
	)
}

pub(crate) async fn with_timeout<T, F>(label: &str, timeout_ms: u64, fut: F) -> Result<T>
where
	F: Future<Output = Result<T>>,
{
	match tokio::time::timeout(Duration::from_millis(timeout_ms), fut).await {
		Ok(result) => result,
		Err(_) =>
			Err(Error::Timeout { message: format!("{label} timed out after {timeout_ms} ms.") }),
	}
}
