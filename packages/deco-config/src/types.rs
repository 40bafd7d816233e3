use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub catalog: Catalog,
	pub providers: Providers,
	#[serde(default)]
	pub retrieval: Retrieval,
	#[serde(default)]
	pub conversation: Conversation,
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub sqlite: Sqlite,
}

#[derive(Debug, Deserialize)]
pub struct Sqlite {
	/// SQLite connection string, e.g. "sqlite://furniture.db?mode=rwc" or "sqlite::memory:".
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Catalog {
	/// Optional. When set, the catalog table is replaced with this CSV on startup.
	pub csv_path: Option<PathBuf>,
	#[serde(default = "default_description_template")]
	pub description_template: String,
	#[serde(default = "default_embed_batch_size")]
	pub embed_batch_size: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub query_generator: LlmProviderConfig,
	pub composer: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub top_k: u32,
	/// A filter that matches zero rows is treated like a failed filter and the whole catalog is
	/// searched instead.
	pub fallback_on_empty: bool,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self { top_k: 5, fallback_on_empty: true }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Conversation {
	pub history_turns: u32,
	pub reset_keywords: Vec<String>,
	pub follow_up_marker: String,
	pub default_session_id: String,
	pub max_sessions: u32,
	pub session_ttl_secs: u64,
}
impl Default for Conversation {
	fn default() -> Self {
		Self {
			history_turns: 6,
			reset_keywords: vec!["new".to_string(), "reset".to_string(), "start over".to_string()],
			follow_up_marker: "follow-up".to_string(),
			default_session_id: "default".to_string(),
			max_sessions: 10_000,
			session_ttl_secs: 86_400,
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Security {
	pub bind_localhost_only: bool,
	pub max_message_chars: u32,
}

fn default_description_template() -> String {
	"compact".to_string()
}

fn default_embed_batch_size() -> u32 {
	64
}
