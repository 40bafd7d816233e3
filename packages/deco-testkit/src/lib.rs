mod error;

pub use error::{Error, Result};

use deco_config::Config;
use deco_domain::catalog::{self, CatalogItem, DescriptionFields, DescriptionTemplate};

/// Embedding width used by every fixture provider.
pub const TEST_DIMENSIONS: u32 = 16;

pub const TEST_CONFIG_TOML: &str = r#"
[service]
http_bind = "127.0.0.1:0"
log_level = "warn"

[storage.sqlite]
dsn            = "sqlite::memory:"
pool_max_conns = 1

[catalog]
description_template = "compact"
embed_batch_size     = 4

[providers.embedding]
provider_id = "test"
api_base    = "http://127.0.0.1:9"
api_key     = "test-key"
path        = "/embeddings"
model       = "hash-embed"
dimensions  = 16
timeout_ms  = 1000

[providers.query_generator]
provider_id = "test"
api_base    = "http://127.0.0.1:9"
api_key     = "test-key"
path        = "/chat/completions"
model       = "sql-gen"
temperature = 0.0
timeout_ms  = 200

[providers.composer]
provider_id = "test"
api_base    = "http://127.0.0.1:9"
api_key     = "test-key"
path        = "/chat/completions"
model       = "composer"
temperature = 0.0
timeout_ms  = 200

[security]
bind_localhost_only = true
max_message_chars   = 2000
"#;

/// A small catalog in the IKEA scrape layout, with a junk leading column and gaps.
pub const FIXTURE_CSV: &str = "\
,item_id,name,category,price,old_price,sellable_online,link,other_colors,short_description,designer,depth,height,width
0,90420332,FREKVENS,Bar furniture,265.0,No old price,True,https://www.ikea.com/sa/en/p/frekvens-bar-table-in-outdoor-black-90420332/,No,\"Bar table, in/outdoor, 51x51 cm\",Nicholai Wiig Hansen,,99.0,51.0
1,60155602,KLIPPAN,Sofas & armchairs,\"SR 1,295\",\"SR 1,495\",True,https://www.ikea.com/sa/en/p/klippan-2-seat-sofa-60155602/,Yes,2-seat sofa,IKEA of Sweden,88.0,66.0,180.0
2,,MISSING,Chairs,99,,True,,No,Chair without id,,,,
3,60155602,KLIPPAN DUPLICATE,Sofas & armchairs,100,,True,,No,Duplicate id,,,,
4,80395704,LACK,Tables & desks,,,False,,No,,,,,
";

pub fn test_config() -> Result<Config> {
	Ok(deco_config::parse(TEST_CONFIG_TOML)?)
}

pub fn memory_sqlite() -> deco_config::Sqlite {
	deco_config::Sqlite { dsn: "sqlite::memory:".to_string(), pool_max_conns: 1 }
}

/// Ten items over five categories, in ascending id order.
pub fn fixture_items() -> Vec<CatalogItem> {
	vec![
		item(101, "KLIPPAN", "Sofas & armchairs", "2-seat sofa, comfortable cover", Some(795.0), None, Some((88.0, 66.0, 180.0))),
		item(102, "EKTORP", "Sofas & armchairs", "3-seat sofa with soft cushions", Some(2_495.0), Some(2_995.0), Some((88.0, 88.0, 218.0))),
		item(103, "VIMLE", "Sofas & armchairs", "Corner sofa for the living room", Some(4_995.0), None, None),
		item(104, "POÄNG", "Chairs", "Armchair with bent wood frame", Some(f64::NAN), None, Some((82.0, 100.0, 68.0))),
		item(105, "INGOLF", "Chairs", "Dining chair in solid wood", Some(345.0), None, Some((52.0, 91.0, 43.0))),
		item(106, "LACK", "Tables & desks", "Side table, small and light", Some(45.0), None, Some((55.0, 45.0, 55.0))),
		item(107, "LINNMON", "Tables & desks", "Desk for the home office", Some(295.0), None, Some((60.0, 74.0, 120.0))),
		item(108, "MALM", "Beds", "Bed frame with storage boxes", Some(1_395.0), None, Some((209.0, 38.0, 156.0))),
		item(109, "BILLY", "Bookcases & shelving units", "Bookcase with adjustable shelves", Some(250.0), None, Some((28.0, 202.0, 80.0))),
		item(110, "KALLAX", "Bookcases & shelving units", "Shelving unit for storage", Some(395.0), None, None),
	]
}

pub fn fixture_item(item_id: i64) -> Result<CatalogItem> {
	fixture_items()
		.into_iter()
		.find(|item| item.item_id == item_id)
		.ok_or_else(|| Error::Message(format!("No fixture item with id {item_id}.")))
}

fn item(
	item_id: i64,
	name: &str,
	category: &str,
	short_description: &str,
	price: Option<f64>,
	old_price: Option<f64>,
	dimensions: Option<(f64, f64, f64)>,
) -> CatalogItem {
	let (depth, height, width) = match dimensions {
		Some((depth, height, width)) => (Some(depth), Some(height), Some(width)),
		None => (None, None, None),
	};
	let description = catalog::derive_description(
		&DescriptionFields {
			name,
			category,
			short_description,
			price,
			old_price,
			sellable_online: true,
			other_colors: false,
			designer: None,
			depth,
			height,
			width,
		},
		DescriptionTemplate::Compact,
	);

	CatalogItem {
		item_id,
		name: name.to_string(),
		category: category.to_string(),
		price,
		old_price,
		sellable_online: true,
		link: Some(format!("https://www.ikea.com/p/{}-{item_id}/", name.to_lowercase())),
		other_colors: false,
		short_description: short_description.to_string(),
		designer: None,
		depth,
		height,
		width,
		description,
	}
}
