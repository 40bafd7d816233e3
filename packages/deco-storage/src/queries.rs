use std::collections::HashSet;

use deco_domain::{
	catalog::CatalogItem,
	filter_sql::{self, FilterSqlError},
};

use crate::{
	Error, Result,
	db::Db,
	models::{FurnitureRow, ItemEmbedding, ItemEmbeddingRow},
};

/// Replaces every catalog row and drops cached embeddings of items that no longer exist.
pub async fn replace_catalog(db: &Db, items: &[CatalogItem]) -> Result<u64> {
	let mut tx = db.pool.begin().await?;

	sqlx::query("DELETE FROM furniture").execute(&mut *tx).await?;

	for item in items {
		sqlx::query(
			"\
INSERT INTO furniture (
	item_id,
	name,
	category,
	price,
	old_price,
	sellable_online,
	link,
	other_colors,
	short_description,
	designer,
	depth,
	height,
	width,
	description
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
		)
		.bind(item.item_id)
		.bind(item.name.as_str())
		.bind(item.category.as_str())
		.bind(item.price)
		.bind(item.old_price)
		.bind(item.sellable_online)
		.bind(item.link.as_deref())
		.bind(item.other_colors)
		.bind(item.short_description.as_str())
		.bind(item.designer.as_deref())
		.bind(item.depth)
		.bind(item.height)
		.bind(item.width)
		.bind(item.description.as_str())
		.execute(&mut *tx)
		.await?;
	}

	sqlx::query("DELETE FROM item_embeddings WHERE item_id NOT IN (SELECT item_id FROM furniture)")
		.execute(&mut *tx)
		.await?;

	tx.commit().await?;

	Ok(items.len() as u64)
}

/// Returns the whole catalog in ascending `item_id` order.
pub async fn fetch_catalog(db: &Db) -> Result<Vec<CatalogItem>> {
	let rows = sqlx::query_as::<_, FurnitureRow>(
		"\
SELECT
	item_id,
	name,
	category,
	price,
	old_price,
	sellable_online,
	link,
	other_colors,
	short_description,
	designer,
	depth,
	height,
	width,
	description
FROM furniture
ORDER BY item_id ASC",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows.into_iter().map(CatalogItem::from).collect())
}

pub async fn count_catalog(db: &Db) -> Result<i64> {
	let count = sqlx::query_scalar::<_, i64>("SELECT count(*) FROM furniture")
		.fetch_one(&db.pool)
		.await?;

	Ok(count)
}

/// Runs a generated filter and returns the distinct matching item ids in result order.
///
/// Only a single statement is accepted. It runs as a subquery on the filter pool, whose
/// connections cannot write, so catalog data is never changed.
pub async fn execute_filter(db: &Db, raw_sql: &str) -> Result<Vec<i64>> {
	let statement = filter_sql::normalize_filter_sql(raw_sql).map_err(|err| {
		Error::InvalidFilter(
			match err {
				FilterSqlError::Empty => "Filter is empty.",
				FilterSqlError::NotAQuery => "Filter is not a SELECT statement.",
				FilterSqlError::MultipleStatements => "Filter contains more than one statement.",
				FilterSqlError::UnbalancedDelimiters =>
					"Filter has unbalanced parentheses or quotes.",
			}
			.to_string(),
		)
	})?;
	// Newlines keep a trailing line comment from swallowing the closing parenthesis.
	let wrapped = format!("SELECT item_id FROM (\n{statement}\n)");
	let ids = sqlx::query_scalar::<_, i64>(&wrapped)
		.fetch_all(&db.filter_pool)
		.await
		.map_err(|err| Error::InvalidFilter(err.to_string()))?;
	let mut seen = HashSet::with_capacity(ids.len());

	Ok(ids.into_iter().filter(|id| seen.insert(*id)).collect())
}

pub async fn load_item_embeddings(
	db: &Db,
	embedding_version: &str,
	embedding_dim: u32,
) -> Result<Vec<ItemEmbedding>> {
	let rows = sqlx::query_as::<_, ItemEmbeddingRow>(
		"\
SELECT item_id, text_hash, vec
FROM item_embeddings
WHERE embedding_version = ? AND embedding_dim = ?
ORDER BY item_id ASC",
	)
	.bind(embedding_version)
	.bind(i64::from(embedding_dim))
	.fetch_all(&db.pool)
	.await?;
	let mut out = Vec::with_capacity(rows.len());

	for row in rows {
		out.push(ItemEmbedding {
			item_id: row.item_id,
			text_hash: row.text_hash,
			vec: parse_vector_text(&row.vec)?,
		});
	}

	Ok(out)
}

pub async fn upsert_item_embeddings(
	db: &Db,
	embedding_version: &str,
	embeddings: &[ItemEmbedding],
) -> Result<()> {
	let mut tx = db.pool.begin().await?;

	for embedding in embeddings {
		sqlx::query(
			"\
INSERT INTO item_embeddings (item_id, embedding_version, text_hash, embedding_dim, vec)
VALUES (?, ?, ?, ?, ?)
ON CONFLICT (item_id, embedding_version) DO UPDATE
SET
	text_hash = excluded.text_hash,
	embedding_dim = excluded.embedding_dim,
	vec = excluded.vec",
		)
		.bind(embedding.item_id)
		.bind(embedding_version)
		.bind(embedding.text_hash.as_str())
		.bind(embedding.vec.len() as i64)
		.bind(vector_to_text(&embedding.vec))
		.execute(&mut *tx)
		.await?;
	}

	tx.commit().await?;

	Ok(())
}

pub fn vector_to_text(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

pub fn parse_vector_text(text: &str) -> Result<Vec<f32>> {
	let trimmed = text.trim();
	let without_brackets = trimmed
		.strip_prefix('[')
		.and_then(|s| s.strip_suffix(']'))
		.ok_or_else(|| Error::InvalidArgument("Vector text is not bracketed.".to_string()))?;

	if without_brackets.trim().is_empty() {
		return Ok(Vec::new());
	}

	let mut vec = Vec::new();

	for part in without_brackets.split(',') {
		let value: f32 = part.trim().parse().map_err(|_| {
			Error::InvalidArgument("Vector text contains a non-numeric value.".to_string())
		})?;

		vec.push(value);
	}

	Ok(vec)
}
