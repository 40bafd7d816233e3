mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Catalog, Config, Conversation, EmbeddingProviderConfig, LlmProviderConfig, Providers,
	Retrieval, Security, Service, Sqlite, Storage,
};

use std::{fs, path::Path};

pub const DESCRIPTION_TEMPLATES: [&str; 2] = ["compact", "detailed"];

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } =>
			Error::ParseConfig { path: Some(path.to_path_buf()), source },
		other => other,
	})
}

pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: None, source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn is_in_memory_dsn(dsn: &str) -> bool {
	dsn.contains(":memory:") || dsn.contains("mode=memory")
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.sqlite.dsn.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.sqlite.dsn must be non-empty.".to_string(),
		});
	}
	if cfg.storage.sqlite.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.sqlite.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if is_in_memory_dsn(&cfg.storage.sqlite.dsn) && cfg.storage.sqlite.pool_max_conns > 1 {
		return Err(Error::Validation {
			message: "storage.sqlite.pool_max_conns must be 1 for an in-memory database."
				.to_string(),
		});
	}
	if !DESCRIPTION_TEMPLATES.contains(&cfg.catalog.description_template.as_str()) {
		return Err(Error::Validation {
			message: "catalog.description_template must be one of compact or detailed."
				.to_string(),
		});
	}
	if cfg.catalog.embed_batch_size == 0 {
		return Err(Error::Validation {
			message: "catalog.embed_batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}

	for (label, timeout_ms) in [
		("embedding", cfg.providers.embedding.timeout_ms),
		("query_generator", cfg.providers.query_generator.timeout_ms),
		("composer", cfg.providers.composer.timeout_ms),
	] {
		if timeout_ms == 0 {
			return Err(Error::Validation {
				message: format!("Provider {label} timeout_ms must be greater than zero."),
			});
		}
	}
	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("query_generator", &cfg.providers.query_generator.api_key),
		("composer", &cfg.providers.composer.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}
	for (label, temperature) in [
		("query_generator", cfg.providers.query_generator.temperature),
		("composer", cfg.providers.composer.temperature),
	] {
		if !temperature.is_finite() || temperature < 0.0 {
			return Err(Error::Validation {
				message: format!("Provider {label} temperature must be a finite number >= 0."),
			});
		}
	}

	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.conversation.history_turns == 0 {
		return Err(Error::Validation {
			message: "conversation.history_turns must be greater than zero.".to_string(),
		});
	}
	if cfg.conversation.max_sessions == 0 {
		return Err(Error::Validation {
			message: "conversation.max_sessions must be greater than zero.".to_string(),
		});
	}
	if cfg.conversation.session_ttl_secs == 0 {
		return Err(Error::Validation {
			message: "conversation.session_ttl_secs must be greater than zero.".to_string(),
		});
	}
	if cfg.conversation.default_session_id.trim().is_empty() {
		return Err(Error::Validation {
			message: "conversation.default_session_id must be non-empty.".to_string(),
		});
	}
	if cfg.conversation.follow_up_marker.is_empty() {
		return Err(Error::Validation {
			message: "conversation.follow_up_marker must be non-empty.".to_string(),
		});
	}
	if cfg.conversation.reset_keywords.iter().any(|keyword| keyword.trim().is_empty()) {
		return Err(Error::Validation {
			message: "conversation.reset_keywords must not contain empty entries.".to_string(),
		});
	}
	if cfg.security.max_message_chars == 0 {
		return Err(Error::Validation {
			message: "security.max_message_chars must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.catalog.csv_path.as_deref().map(|path| path.as_os_str().is_empty()).unwrap_or(false) {
		cfg.catalog.csv_path = None;
	}

	cfg.catalog.description_template = cfg.catalog.description_template.trim().to_lowercase();
	cfg.conversation.follow_up_marker = cfg.conversation.follow_up_marker.trim().to_lowercase();

	for keyword in &mut cfg.conversation.reset_keywords {
		*keyword = keyword.trim().to_lowercase();
	}
}
