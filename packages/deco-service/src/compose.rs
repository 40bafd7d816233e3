use deco_providers::chat;

use crate::{DecoService, Error, Result, RetrievalCandidate};

pub const COMPOSER_SYSTEM_PROMPT: &str = "\
You are a helpful furniture recommendation assistant. \
Your goal is to help users find the perfect furniture based on their needs and preferences. \
Engage in a conversational manner, keeping track of the user's queries and your responses within the current session. \
You can ask follow-up questions about their space, style preferences, budget, and specific needs to provide better recommendations. \
When answering follow-up questions, refer to previous exchanges to provide relevant context. \
In your responses, focus on the most relevant furniture items and explain why they might be a good fit. \
If a new question is unrelated to previous conversations, disregard previous context. \
Always be clear and concise in your responses, and format your recommendations in a bullet point format. \
Include key details like price, dimensions, and materials when relevant.";

const NO_MATCHES: &str = "No matching items were found in the catalog.";

/// Renders candidates as `1. <description>` lines.
pub fn format_candidates(candidates: &[RetrievalCandidate]) -> String {
	if candidates.is_empty() {
		return NO_MATCHES.to_string();
	}

	candidates
		.iter()
		.enumerate()
		.map(|(idx, candidate)| format!("{}. {}", idx + 1, candidate.description))
		.collect::<Vec<_>>()
		.join("\n")
}

pub fn composer_user_prompt(enriched_query: &str, candidates: &[RetrievalCandidate]) -> String {
	format!(
		"User query: '{enriched_query}'.\nRelevant matches from the database:\n{}\nUse the matches to provide a conversational and context-aware response to the user.",
		format_candidates(candidates)
	)
}

impl DecoService {
	pub async fn compose(
		&self,
		enriched_query: &str,
		candidates: &[RetrievalCandidate],
	) -> Result<String> {
		let cfg = &self.cfg.providers.composer;
		let messages = vec![
			chat::system_message(COMPOSER_SYSTEM_PROMPT),
			chat::user_message(&composer_user_prompt(enriched_query, candidates)),
		];

		crate::with_timeout("Composer", cfg.timeout_ms, self.providers.composer.complete(cfg, &messages))
			.await
			.map_err(|err| match err {
				Error::Timeout { message } => Error::Provider { message },
				other => other,
			})
	}
}
