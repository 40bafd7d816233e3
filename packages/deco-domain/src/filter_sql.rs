use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSqlError {
	Empty,
	NotAQuery,
	MultipleStatements,
	UnbalancedDelimiters,
}

/// Extracts the single query statement from generator output.
///
/// Markdown fences and any prose before the first `SELECT` (or a `WITH name AS (` clause) are
/// dropped, as are trailing semicolons. Anything left that could end the statement early (a
/// semicolon, or a closing parenthesis or quote without its opener) is rejected. The result is
/// still untrusted and must only be executed read-only.
pub fn normalize_filter_sql(raw: &str) -> Result<String, FilterSqlError> {
	let unfenced = strip_code_fence(raw);
	let trimmed = unfenced.trim();

	if trimmed.is_empty() {
		return Err(FilterSqlError::Empty);
	}

	let start = [
		r"(?i)\bselect\b",
		r"(?i)\bwith\s+(?:recursive\s+)?\w+\s*(?:\([^)]*\))?\s+as\s*\(",
	]
	.into_iter()
	.filter_map(|pattern| Regex::new(pattern).ok()?.find(trimmed).map(|found| found.start()))
	.min()
	.ok_or(FilterSqlError::NotAQuery)?;
	let statement = trimmed[start..].trim_end().trim_end_matches(';').trim_end();

	if statement.is_empty() {
		return Err(FilterSqlError::Empty);
	}

	check_single_statement(statement)?;

	Ok(statement.to_string())
}

fn check_single_statement(statement: &str) -> Result<(), FilterSqlError> {
	let mut depth = 0_usize;
	let mut quote: Option<char> = None;

	for ch in statement.chars() {
		if let Some(open) = quote {
			if ch == open {
				quote = None;
			}

			continue;
		}

		match ch {
			'\'' | '"' | '`' => quote = Some(ch),
			'(' => depth += 1,
			')' => depth = depth.checked_sub(1).ok_or(FilterSqlError::UnbalancedDelimiters)?,
			';' => return Err(FilterSqlError::MultipleStatements),
			_ => {},
		}
	}

	if quote.is_some() || depth != 0 {
		return Err(FilterSqlError::UnbalancedDelimiters);
	}

	Ok(())
}

fn strip_code_fence(raw: &str) -> String {
	Regex::new(r"(?s)```[A-Za-z0-9_-]*\s*(.*?)```")
		.ok()
		.and_then(|re| re.captures(raw)?.get(1).map(|m| m.as_str().to_string()))
		.unwrap_or_else(|| raw.replace("```", ""))
}
