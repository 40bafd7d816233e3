//! Hybrid retrieval: generated SQL filter first, vector similarity over whatever pool survives.
//!
//! The filter stage never fails a turn. Any problem with it (generator error or timeout,
//! unusable SQL, execution error, zero rows) sends the search to the full catalog instead.

use serde::Serialize;

use deco_domain::catalog::ItemAttributes;
use deco_storage::queries;

use crate::{DecoService, Error, Result, VectorIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
	Filtered,
	FullCatalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
	GeneratorFailed,
	GeneratorTimeout,
	FilterFailed,
	EmptyResult,
	NotIndexed,
}
impl FallbackReason {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::GeneratorFailed => "generator_failed",
			Self::GeneratorTimeout => "generator_timeout",
			Self::FilterFailed => "filter_failed",
			Self::EmptyResult => "empty_result",
			Self::NotIndexed => "not_indexed",
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalCandidate {
	pub description: String,
	pub attributes: ItemAttributes,
	pub score: f32,
}

/// Candidates plus how the pool they came from was chosen.
#[derive(Debug, Clone, Serialize)]
pub struct RetrievalOutcome {
	pub candidates: Vec<RetrievalCandidate>,
	pub pool: PoolKind,
	pub pool_size: usize,
	pub filter_sql: Option<String>,
	pub fallback: Option<FallbackReason>,
	pub fallback_detail: Option<String>,
}

enum FilterStage {
	Filtered { sql: String, item_ids: Vec<i64> },
	Fallback { sql: Option<String>, reason: FallbackReason, detail: String },
}

impl DecoService {
	/// Returns at most `top_k` candidates for `enriched_query`, most similar first.
	///
	/// Only a query embedding or index search failure is returned as an error.
	pub async fn retrieve(&self, enriched_query: &str, top_k: usize) -> Result<RetrievalOutcome> {
		let full = self.catalog_index();
		let (scoped, pool_kind, filter_sql, fallback, fallback_detail) =
			match self.filter_stage(enriched_query).await {
				FilterStage::Filtered { sql, item_ids } => {
					let scoped = full.scoped(&item_ids);

					if scoped.is_empty() && !item_ids.is_empty() {
						let n = item_ids.len();
						let detail = format!("{n} filtered items are missing from the index.");

						(
							None,
							PoolKind::FullCatalog,
							Some(sql),
							Some(FallbackReason::NotIndexed),
							Some(detail),
						)
					} else {
						(Some(scoped), PoolKind::Filtered, Some(sql), None, None)
					}
				},
				FilterStage::Fallback { sql, reason, detail } =>
					(None, PoolKind::FullCatalog, sql, Some(reason), Some(detail)),
			};
		let pool: &VectorIndex = scoped.as_ref().unwrap_or(full.as_ref());

		if let Some(reason) = fallback {
			tracing::warn!(
				reason = reason.as_str(),
				detail = fallback_detail.as_deref().unwrap_or_default(),
				filter_sql = filter_sql.as_deref().unwrap_or_default(),
				"Filter stage fell back to the full catalog."
			);
		}

		let candidates = if pool.is_empty() {
			Vec::new()
		} else {
			let query_vec = self
				.embed_texts(&[enriched_query.to_string()])
				.await?
				.into_iter()
				.next()
				.ok_or_else(|| Error::Provider {
					message: "Embedding provider returned no query vector.".to_string(),
				})?;

			pool.search(&query_vec, top_k)?
				.into_iter()
				.map(|hit| RetrievalCandidate {
					description: hit.record.description.clone(),
					attributes: hit.record.attributes.clone(),
					score: hit.score,
				})
				.collect()
		};

		tracing::info!(
			pool = ?pool_kind,
			pool_size = pool.len(),
			candidates = candidates.len(),
			"Retrieval finished."
		);

		Ok(RetrievalOutcome {
			candidates,
			pool: pool_kind,
			pool_size: pool.len(),
			filter_sql,
			fallback,
			fallback_detail,
		})
	}

	async fn filter_stage(&self, enriched_query: &str) -> FilterStage {
		let sql = match self.generate_filter(enriched_query).await {
			Ok(sql) => sql,
			Err(Error::Timeout { message }) =>
				return FilterStage::Fallback {
					sql: None,
					reason: FallbackReason::GeneratorTimeout,
					detail: message,
				},
			Err(err) =>
				return FilterStage::Fallback {
					sql: None,
					reason: FallbackReason::GeneratorFailed,
					detail: err.to_string(),
				},
		};

		tracing::debug!(filter_sql = %sql, "Filter generated.");

		match queries::execute_filter(&self.db, &sql).await {
			Err(err) => FilterStage::Fallback {
				sql: Some(sql),
				reason: FallbackReason::FilterFailed,
				detail: err.to_string(),
			},
			Ok(item_ids) if item_ids.is_empty() && self.cfg.retrieval.fallback_on_empty =>
				FilterStage::Fallback {
					sql: Some(sql),
					reason: FallbackReason::EmptyResult,
					detail: "Filter matched no rows.".to_string(),
				},
			Ok(item_ids) => FilterStage::Filtered { sql, item_ids },
		}
	}
}
