use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use deco_domain::{
	catalog::ItemAttributes,
	conversation::{self, ConversationTurn},
	message_gate,
};

use crate::{DecoService, Error, Result, RetrievalOutcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
	pub message: String,
	#[serde(default)]
	pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
	pub response: String,
	pub metadata: Vec<ItemAttributes>,
}

/// Everything one turn decided, for callers that need more than the reply.
#[derive(Debug, Clone)]
pub struct ChatTurn {
	pub session_id: String,
	pub is_follow_up: bool,
	pub enriched_query: String,
	pub retrieval: RetrievalOutcome,
	pub response: ChatResponse,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResetRequest {
	#[serde(default)]
	pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
	pub status: String,
}

impl DecoService {
	pub async fn chat(&self, req: ChatRequest) -> Result<ChatResponse> {
		Ok(self.chat_turn(req).await?.response)
	}

	/// Runs one conversational turn.
	///
	/// History is read under the session lock and the lock is released before retrieval and
	/// composition; the completed pair is appended afterwards in one step. A failed turn leaves
	/// the history untouched.
	pub async fn chat_turn(&self, req: ChatRequest) -> Result<ChatTurn> {
		let message = req.message.trim();

		message_gate::message_gate(message, self.cfg.security.max_message_chars)
			.map_err(|code| Error::InvalidRequest { message: code.message().to_string() })?;

		let session_id = self.resolve_session_id(req.session_id.as_deref());
		let now = OffsetDateTime::now_utc();
		let evicted = self.sessions.evict_expired(now);

		if evicted > 0 {
			tracing::debug!(evicted, "Expired sessions evicted.");
		}

		let session = self.sessions.get_or_create(&session_id, now);
		let history: Vec<ConversationTurn> =
			session.lock().unwrap_or_else(|err| err.into_inner()).turns().to_vec();
		let is_follow_up = self.follow_up.is_follow_up(&history, message);
		let enriched_query = if is_follow_up {
			conversation::enrich(&history, message, self.cfg.conversation.history_turns as usize)
		} else {
			message.to_string()
		};

		tracing::info!(
			session_id = %session_id,
			history_turns = history.len(),
			is_follow_up,
			"Chat turn started."
		);

		let retrieval = self.retrieve(&enriched_query, self.cfg.retrieval.top_k as usize).await?;
		let reply = self.compose(&enriched_query, &retrieval.candidates).await?;

		session.lock().unwrap_or_else(|err| err.into_inner()).append(
			message.to_string(),
			reply.clone(),
			OffsetDateTime::now_utc(),
		);

		let metadata =
			retrieval.candidates.iter().map(|candidate| candidate.attributes.clone()).collect();

		Ok(ChatTurn {
			session_id,
			is_follow_up,
			enriched_query,
			retrieval,
			response: ChatResponse { response: reply, metadata },
		})
	}

	/// Forgets a session. Resetting an unknown session is not an error.
	pub fn reset(&self, req: ResetRequest) -> ResetResponse {
		let session_id = self.resolve_session_id(req.session_id.as_deref());
		let removed = self.sessions.remove(&session_id);

		tracing::info!(session_id = %session_id, removed, "Session reset.");

		ResetResponse { status: "success".to_string() }
	}

	/// Turns recorded for a session, oldest first. Empty for unknown or expired sessions.
	pub fn history(&self, session_id: Option<&str>) -> Vec<ConversationTurn> {
		let session_id = self.resolve_session_id(session_id);

		self.sessions
			.get(&session_id, OffsetDateTime::now_utc())
			.map(|session| session.lock().unwrap_or_else(|err| err.into_inner()).turns().to_vec())
			.unwrap_or_default()
	}

	fn resolve_session_id(&self, session_id: Option<&str>) -> String {
		session_id
			.map(str::trim)
			.filter(|id| !id.is_empty())
			.unwrap_or(self.cfg.conversation.default_session_id.as_str())
			.to_string()
	}
}
