use serde::{Deserialize, Serialize};

/// One completed exchange. The query and the response are always stored together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
	pub query: String,
	pub response: String,
}

/// Decides whether a message continues the current conversation.
pub trait FollowUpPolicy
where
	Self: Send + Sync,
{
	fn is_follow_up(&self, history: &[ConversationTurn], message: &str) -> bool;
}

/// Keyword heuristic: a message carrying the marker is always a follow-up; otherwise any message
/// with prior history is one unless it starts with a reset keyword.
#[derive(Clone, Debug)]
pub struct KeywordFollowUp {
	reset_keywords: Vec<String>,
	marker: String,
}
impl KeywordFollowUp {
	pub fn new(reset_keywords: &[String], marker: &str) -> Self {
		Self {
			reset_keywords: reset_keywords.iter().map(|keyword| keyword.to_lowercase()).collect(),
			marker: marker.to_lowercase(),
		}
	}
}
impl Default for KeywordFollowUp {
	fn default() -> Self {
		Self {
			reset_keywords: vec!["new".to_string(), "reset".to_string(), "start over".to_string()],
			marker: "follow-up".to_string(),
		}
	}
}
impl FollowUpPolicy for KeywordFollowUp {
	fn is_follow_up(&self, history: &[ConversationTurn], message: &str) -> bool {
		let lowered = message.to_lowercase();

		if lowered.contains(&self.marker) {
			return true;
		}
		if history.is_empty() {
			return false;
		}

		!self.reset_keywords.iter().any(|keyword| lowered.starts_with(keyword.as_str()))
	}
}

/// Prefixes the message with the last `window` turns, oldest first.
pub fn enrich(history: &[ConversationTurn], message: &str, window: usize) -> String {
	let start = history.len().saturating_sub(window);
	let context = history[start..]
		.iter()
		.map(|turn| format!("User: {}\nAssistant: {}", turn.query, turn.response))
		.collect::<Vec<_>>()
		.join("\n");

	format!("{context}\nUser: {message}")
}
