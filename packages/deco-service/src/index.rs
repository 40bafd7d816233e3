use std::{
	collections::{HashMap, HashSet},
	path::Path,
	sync::Arc,
};

use deco_domain::catalog::{CatalogItem, DescriptionTemplate, ItemAttributes};
use deco_storage::{import, models::ItemEmbedding, queries};

use crate::{DecoService, Error, Result};

/// One indexed catalog item: its vector plus what a search hit needs to report.
#[derive(Debug, Clone)]
pub struct EmbeddingRecord {
	pub item_id: i64,
	pub vector: Vec<f32>,
	pub description: String,
	pub attributes: ItemAttributes,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
	pub record: Arc<EmbeddingRecord>,
	pub score: f32,
}

/// Immutable cosine-similarity index. Built once, never mutated; narrower pools are new values
/// sharing the same records.
#[derive(Debug, Default)]
pub struct VectorIndex {
	records: Vec<Arc<EmbeddingRecord>>,
	dimensions: usize,
}
impl VectorIndex {
	pub fn empty() -> Self {
		Self::default()
	}

	pub fn build(records: Vec<EmbeddingRecord>) -> Result<Self> {
		let dimensions = records.first().map(|record| record.vector.len()).unwrap_or(0);

		if let Some(bad) = records.iter().find(|record| record.vector.len() != dimensions) {
			return Err(Error::Index {
				message: format!(
					"Item {} has a {}-dimension vector; expected {dimensions}.",
					bad.item_id,
					bad.vector.len()
				),
			});
		}

		Ok(Self { records: records.into_iter().map(Arc::new).collect(), dimensions })
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn dimensions(&self) -> usize {
		self.dimensions
	}

	pub fn item_ids(&self) -> Vec<i64> {
		self.records.iter().map(|record| record.item_id).collect()
	}

	/// Index over the records whose ids are in `item_ids`, in this index's order.
	pub fn scoped(&self, item_ids: &[i64]) -> Self {
		let wanted: HashSet<i64> = item_ids.iter().copied().collect();
		let records =
			self.records
				.iter()
				.filter(|record| wanted.contains(&record.item_id))
				.cloned()
				.collect();

		Self { records, dimensions: self.dimensions }
	}

	/// Top `k` records by cosine similarity, best first. Equal scores keep insertion order.
	pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
		if self.records.is_empty() || k == 0 {
			return Ok(Vec::new());
		}
		if query.len() != self.dimensions {
			return Err(Error::Index {
				message: format!(
					"Query vector has {} dimensions; index has {}.",
					query.len(),
					self.dimensions
				),
			});
		}

		let mut scored: Vec<(usize, f32)> = self
			.records
			.iter()
			.enumerate()
			.map(|(pos, record)| (pos, cosine_similarity(query, &record.vector).unwrap_or(0.0)))
			.collect();

		scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
		scored.truncate(k);

		Ok(scored
			.into_iter()
			.map(|(pos, score)| SearchHit { record: self.records[pos].clone(), score })
			.collect())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogLoadReport {
	pub items: usize,
	pub embedded: usize,
	pub reused: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogImportReport {
	pub imported: usize,
	pub skipped: usize,
}

impl DecoService {
	/// Replaces the catalog table with the rows of a CSV file.
	pub async fn import_catalog_csv(&self, path: &Path) -> Result<CatalogImportReport> {
		let template =
			DescriptionTemplate::parse(&self.cfg.catalog.description_template).ok_or_else(|| {
				Error::InvalidRequest {
					message: format!(
						"Unknown description template {}.",
						self.cfg.catalog.description_template
					),
				}
			})?;
		let report = import::read_catalog_csv(path, template)?;

		queries::replace_catalog(&self.db, &report.items).await?;

		tracing::info!(
			path = %path.display(),
			imported = report.items.len(),
			skipped = report.skipped,
			"Catalog imported."
		);

		Ok(CatalogImportReport { imported: report.items.len(), skipped: report.skipped })
	}

	/// Embeds the current catalog (reusing cached vectors) and swaps in a new full-catalog index.
	pub async fn load_catalog(&self) -> Result<CatalogLoadReport> {
		let items = queries::fetch_catalog(&self.db).await?;
		let version = crate::embedding_version(&self.cfg);
		let dims = self.cfg.providers.embedding.dimensions;
		let cached: HashMap<i64, ItemEmbedding> =
			queries::load_item_embeddings(&self.db, &version, dims)
				.await?
				.into_iter()
				.map(|embedding| (embedding.item_id, embedding))
				.collect();
		let mut vectors: HashMap<i64, Vec<f32>> = HashMap::with_capacity(items.len());
		let mut missing: Vec<&CatalogItem> = Vec::new();

		for item in &items {
			let hash = text_hash(&item.description);

			match cached.get(&item.item_id) {
				Some(embedding) if embedding.text_hash == hash => {
					vectors.insert(item.item_id, embedding.vec.clone());
				},
				_ => missing.push(item),
			}
		}

		let reused = vectors.len();
		let batch_size = (self.cfg.catalog.embed_batch_size as usize).max(1);

		for batch in missing.chunks(batch_size) {
			let texts: Vec<String> = batch.iter().map(|item| item.description.clone()).collect();
			let embedded = self.embed_texts(&texts).await?;
			let rows: Vec<ItemEmbedding> = batch
				.iter()
				.zip(embedded)
				.map(|(item, vec)| ItemEmbedding {
					item_id: item.item_id,
					text_hash: text_hash(&item.description),
					vec,
				})
				.collect();

			queries::upsert_item_embeddings(&self.db, &version, &rows).await?;

			for row in rows {
				vectors.insert(row.item_id, row.vec);
			}
		}

		let mut records = Vec::with_capacity(items.len());

		for item in &items {
			let Some(vector) = vectors.remove(&item.item_id) else {
				return Err(Error::Index {
					message: format!("Item {} has no embedding.", item.item_id),
				});
			};

			records.push(EmbeddingRecord {
				item_id: item.item_id,
				vector,
				description: item.description.clone(),
				attributes: ItemAttributes::sanitized(item),
			});
		}

		let index = VectorIndex::build(records)?;
		let report =
			CatalogLoadReport { items: index.len(), embedded: items.len() - reused, reused };

		self.swap_catalog_index(index);

		tracing::info!(
			items = report.items,
			embedded = report.embedded,
			reused = report.reused,
			embedding_version = %version,
			"Catalog index built."
		);

		Ok(report)
	}

	pub(crate) async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		let cfg = &self.cfg.providers.embedding;
		let vectors = crate::with_timeout(
			"Embedding provider",
			cfg.timeout_ms,
			self.providers.embedding.embed(cfg, texts),
		)
		.await
		.map_err(|err| match err {
			Error::Timeout { message } => Error::Provider { message },
			other => other,
		})?;

		if vectors.len() != texts.len() {
			return Err(Error::Provider {
				message: format!(
					"Embedding provider returned {} vectors for {} texts.",
					vectors.len(),
					texts.len()
				),
			});
		}
		if let Some(bad) = vectors.iter().find(|vec| vec.len() != cfg.dimensions as usize) {
			return Err(Error::Provider {
				message: format!(
					"Embedding dimension mismatch: expected {}, got {}.",
					cfg.dimensions,
					bad.len()
				),
			});
		}

		Ok(vectors)
	}
}

pub fn cosine_similarity(lhs: &[f32], rhs: &[f32]) -> Option<f32> {
	if lhs.is_empty() || lhs.len() != rhs.len() {
		return None;
	}

	let (dot, lhs_sq, rhs_sq) =
		lhs.iter().zip(rhs).fold((0.0_f32, 0.0_f32, 0.0_f32), |(dot, lhs_sq, rhs_sq), (l, r)| {
			(dot + l * r, lhs_sq + l * l, rhs_sq + r * r)
		});
	let denom = (lhs_sq * rhs_sq).sqrt();

	// A zero vector has no direction to compare against.
	(denom > f32::EPSILON).then(|| (dot / denom).clamp(-1.0, 1.0))
}

fn text_hash(text: &str) -> String {
	blake3::hash(text.as_bytes()).to_hex().to_string()
}
