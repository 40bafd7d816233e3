use serde::{Deserialize, Serialize};

/// One product row of the furniture catalog.
///
/// `description` is derived from the other fields at import time and is the text that gets
/// embedded and shown to the response composer. It is never null; missing source fields render
/// as empty strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
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

/// Structured attributes returned alongside a retrieval candidate.
///
/// Every key is always serialized. Missing, NaN and infinite numbers become `null`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemAttributes {
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
}
impl ItemAttributes {
	pub fn sanitized(item: &CatalogItem) -> Self {
		Self {
			item_id: item.item_id,
			name: item.name.clone(),
			category: item.category.clone(),
			price: finite(item.price),
			old_price: finite(item.old_price),
			sellable_online: item.sellable_online,
			link: item.link.clone(),
			other_colors: item.other_colors,
			short_description: item.short_description.clone(),
			designer: item.designer.clone(),
			depth: finite(item.depth),
			height: finite(item.height),
			width: finite(item.width),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DescriptionTemplate {
	/// `name - short description - category`.
	Compact,
	/// Multi-line card with price, dimensions, availability and designer.
	Detailed,
}
impl DescriptionTemplate {
	pub fn parse(label: &str) -> Option<Self> {
		match label.trim().to_ascii_lowercase().as_str() {
			"compact" => Some(Self::Compact),
			"detailed" => Some(Self::Detailed),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Compact => "compact",
			Self::Detailed => "detailed",
		}
	}
}

/// Source fields of a catalog row before the description is derived.
pub struct DescriptionFields<'a> {
	pub name: &'a str,
	pub category: &'a str,
	pub short_description: &'a str,
	pub price: Option<f64>,
	pub old_price: Option<f64>,
	pub sellable_online: bool,
	pub other_colors: bool,
	pub designer: Option<&'a str>,
	pub depth: Option<f64>,
	pub height: Option<f64>,
	pub width: Option<f64>,
}

pub fn derive_description(fields: &DescriptionFields<'_>, template: DescriptionTemplate) -> String {
	match template {
		DescriptionTemplate::Compact => format!(
			"{} - {} - {}",
			fields.name.trim(),
			fields.short_description.trim(),
			fields.category.trim()
		),
		DescriptionTemplate::Detailed => detailed_description(fields),
	}
}

pub fn finite(value: Option<f64>) -> Option<f64> {
	value.filter(|number| number.is_finite())
}

fn detailed_description(fields: &DescriptionFields<'_>) -> String {
	let price_info = match finite(fields.price) {
		None => "Price not available".to_string(),
		Some(price) => match finite(fields.old_price) {
			Some(old_price) => format!("Price: ${price} (Was ${old_price})"),
			None => format!("Price: ${price}"),
		},
	};
	let sizes = [("Depth", fields.depth), ("Height", fields.height), ("Width", fields.width)];
	let dimensions: Vec<String> = sizes
		.into_iter()
		.filter_map(|(label, value)| finite(value).map(|value| format!("{label}: {value}cm")))
		.collect();
	let dimensions = if dimensions.is_empty() {
		"Dimensions not specified".to_string()
	} else {
		dimensions.join(" | ")
	};
	let mut availability = if fields.sellable_online {
		"Available online".to_string()
	} else {
		"Not available online".to_string()
	};

	if fields.other_colors {
		availability.push_str(" | Available in other colors");
	}

	let designer = fields
		.designer
		.map(str::trim)
		.filter(|designer| !designer.is_empty())
		.map(|designer| format!("Designed by {designer}"))
		.unwrap_or_default();
	let description = format!(
		"{} - {}\n{}\n{}\n{}\n{}\n{}",
		fields.name.trim(),
		fields.category.trim(),
		fields.short_description.trim(),
		price_info,
		dimensions,
		availability,
		designer
	);

	description.trim().to_string()
}
