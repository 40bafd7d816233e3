//! CSV catalog import in the IKEA scrape layout.

use std::{collections::HashSet, io::Read, path::Path};

use serde::Deserialize;

use deco_domain::catalog::{self, CatalogItem, DescriptionFields, DescriptionTemplate};

use crate::Result;

pub struct ImportReport {
	pub items: Vec<CatalogItem>,
	/// Rows without a usable `item_id`, or repeating one already seen.
	pub skipped: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
	item_id: Option<String>,
	name: Option<String>,
	category: Option<String>,
	price: Option<String>,
	old_price: Option<String>,
	sellable_online: Option<String>,
	link: Option<String>,
	other_colors: Option<String>,
	short_description: Option<String>,
	designer: Option<String>,
	depth: Option<String>,
	height: Option<String>,
	width: Option<String>,
}

pub fn read_catalog_csv(path: &Path, template: DescriptionTemplate) -> Result<ImportReport> {
	let reader = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_path(path)?;

	collect_rows(reader, template)
}

pub fn parse_catalog_csv<R>(input: R, template: DescriptionTemplate) -> Result<ImportReport>
where
	R: Read,
{
	let reader = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(input);

	collect_rows(reader, template)
}

/// Parses a numeric cell, tolerating currency prefixes and thousands separators.
pub fn parse_lenient_number(raw: &str) -> Option<f64> {
	let start = raw.find(|ch: char| ch.is_ascii_digit() || ch == '-' || ch == '.')?;
	let cleaned: String =
		raw[start..].chars().filter(|ch| !matches!(ch, ',' | '_' | ' ' | '\u{a0}')).collect();
	let cleaned = cleaned.trim_end_matches(|ch: char| !ch.is_ascii_digit() && ch != '.');

	cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn parse_flag(raw: Option<&str>) -> bool {
	matches!(
		raw.map(|value| value.trim().to_ascii_lowercase()).as_deref(),
		Some("true" | "yes" | "1" | "t" | "y")
	)
}

fn collect_rows<R>(
	mut reader: csv::Reader<R>,
	template: DescriptionTemplate,
) -> Result<ImportReport>
where
	R: Read,
{
	let mut items = Vec::new();
	let mut seen = HashSet::new();
	let mut skipped = 0;

	for record in reader.deserialize::<CsvRow>() {
		let row = record?;
		let Some(item_id) = row.item_id.as_deref().and_then(parse_item_id) else {
			skipped += 1;

			continue;
		};

		if !seen.insert(item_id) {
			skipped += 1;

			continue;
		}

		items.push(row_to_item(item_id, row, template));
	}

	Ok(ImportReport { items, skipped })
}

fn parse_item_id(raw: &str) -> Option<i64> {
	let trimmed = raw.trim();

	trimmed.parse::<i64>().ok().or_else(|| {
		// Spreadsheet exports sometimes write ids as floats.
		trimmed
			.parse::<f64>()
			.ok()
			.filter(|value| value.is_finite() && value.fract() == 0.0)
			.map(|value| value as i64)
	})
}

fn row_to_item(item_id: i64, row: CsvRow, template: DescriptionTemplate) -> CatalogItem {
	let name = row.name.unwrap_or_default();
	let category = row.category.unwrap_or_default();
	let short_description = row.short_description.unwrap_or_default();
	let designer = row.designer.filter(|value| !value.trim().is_empty());
	let price = row.price.as_deref().and_then(parse_lenient_number);
	let old_price = row.old_price.as_deref().and_then(parse_lenient_number);
	let depth = row.depth.as_deref().and_then(parse_lenient_number);
	let height = row.height.as_deref().and_then(parse_lenient_number);
	let width = row.width.as_deref().and_then(parse_lenient_number);
	let sellable_online = parse_flag(row.sellable_online.as_deref());
	let other_colors = parse_flag(row.other_colors.as_deref());
	let description = catalog::derive_description(
		&DescriptionFields {
			name: &name,
			category: &category,
			short_description: &short_description,
			price,
			old_price,
			sellable_online,
			other_colors,
			designer: designer.as_deref(),
			depth,
			height,
			width,
		},
		template,
	);

	CatalogItem {
		item_id,
		name,
		category,
		price,
		old_price,
		sellable_online,
		link: row.link.filter(|value| !value.trim().is_empty()),
		other_colors,
		short_description,
		designer,
		depth,
		height,
		width,
		description,
	}
}
