//! Catalog and embedding cache tables.
//!
//! `furniture` column names are part of the prompt given to the filter generator; renaming one
//! breaks generated filters.

pub const FURNITURE_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS furniture (
	item_id INTEGER PRIMARY KEY,
	name TEXT NOT NULL,
	category TEXT NOT NULL,
	price REAL,
	old_price REAL,
	sellable_online BOOLEAN NOT NULL DEFAULT 0,
	link TEXT,
	other_colors BOOLEAN NOT NULL DEFAULT 0,
	short_description TEXT NOT NULL DEFAULT '',
	designer TEXT,
	depth REAL,
	height REAL,
	width REAL,
	description TEXT NOT NULL
)";

pub const FURNITURE_CATEGORY_INDEX: &str =
	"CREATE INDEX IF NOT EXISTS idx_furniture_category ON furniture (category)";

pub const ITEM_EMBEDDINGS_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS item_embeddings (
	item_id INTEGER NOT NULL,
	embedding_version TEXT NOT NULL,
	text_hash TEXT NOT NULL,
	embedding_dim INTEGER NOT NULL,
	vec TEXT NOT NULL,
	PRIMARY KEY (item_id, embedding_version)
)";

pub fn render_schema() -> Vec<&'static str> {
	vec![FURNITURE_TABLE, FURNITURE_CATEGORY_INDEX, ITEM_EMBEDDINGS_TABLE]
}
