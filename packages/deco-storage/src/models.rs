use deco_domain::catalog::CatalogItem;

#[derive(Debug, sqlx::FromRow)]
pub struct FurnitureRow {
	pub item_id: i64,
	pub name: String,
	pub category: String,
	pub price: Option<f64>,
	pub old_price: Option<f64>,
	pub sellable_online: bool,
	pub link: Option<String>,
	pub other_colors: bool,
	pub short_description: String,
	pub designer: Option<String>,
	pub depth: Option<f64>,
	pub height: Option<f64>,
	pub width: Option<f64>,
	pub description: String,
}
impl From<FurnitureRow> for CatalogItem {
	fn from(row: FurnitureRow) -> Self {
		Self {
			item_id: row.item_id,
			name: row.name,
			category: row.category,
			price: row.price,
			old_price: row.old_price,
			sellable_online: row.sellable_online,
			link: row.link,
			other_colors: row.other_colors,
			short_description: row.short_description,
			designer: row.designer,
			depth: row.depth,
			height: row.height,
			width: row.width,
			description: row.description,
		}
	}
}

/// Cached embedding of one item description.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEmbedding {
	pub item_id: i64,
	/// blake3 hex of the description the vector was computed from.
	pub text_hash: String,
	pub vec: Vec<f32>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ItemEmbeddingRow {
	pub item_id: i64,
	pub text_hash: String,
	pub vec: String,
}
