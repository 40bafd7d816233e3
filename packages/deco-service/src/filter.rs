use deco_providers::chat;

use crate::{DecoService, Result};

pub const FILTER_SYSTEM_PROMPT: &str = "\
You are a SQL query generator for an IKEA furniture database.
The SQLite table `furniture` has the following columns:
- item_id: unique identifier
- name: product name
- category: furniture category (e.g., 'Bar furniture', 'Sofas & armchairs', 'Tables & desks')
- price: product price
- old_price: previous price if on sale
- sellable_online: boolean indicating if the item can be bought online
- link: product URL
- other_colors: boolean indicating if other colors are available
- short_description: brief product description
- designer: product designer
- depth: product depth in cm
- height: product height in cm
- width: product width in cm
- description: combined searchable description

Generate one SQL query that:
1. Filters based on the user's preferences and requirements
2. Considers price ranges, categories, and dimensions
3. Handles both specific and vague queries
4. Uses LIKE for text searches to handle partial matches
5. Always selects item_id (SELECT * is fine)

Example queries:
- For a budget sofa: SELECT * FROM furniture WHERE category LIKE '%Sofa%' AND price <= 500
- For a specific size table: SELECT * FROM furniture WHERE category LIKE '%Table%' AND width >= 100 AND width <= 150
- For a designer piece: SELECT * FROM furniture WHERE designer LIKE '%Hansen%'

Reply with the SQL query only, without explanations or markdown.";

impl DecoService {
	/// Asks the query generator for a filter over the catalog table. The text is returned as
	/// produced; normalization happens at execution time.
	pub async fn generate_filter(&self, enriched_query: &str) -> Result<String> {
		let cfg = &self.cfg.providers.query_generator;
		let messages =
			vec![chat::system_message(FILTER_SYSTEM_PROMPT), chat::user_message(enriched_query)];

		crate::with_timeout(
			"Query generator",
			cfg.timeout_ms,
			self.providers.query_generator.complete(cfg, &messages),
		)
		.await
	}
}
