//! Per-session conversation logs and the store that owns their lifetime.

use std::{
	num::NonZeroUsize,
	sync::{Arc, Mutex},
	time::Duration,
};

use lru::LruCache;
use time::OffsetDateTime;

use deco_domain::conversation::ConversationTurn;

pub type SharedSession = Arc<Mutex<ConversationSession>>;

#[derive(Debug, Clone)]
pub struct ConversationSession {
	pub session_id: String,
	turns: Vec<ConversationTurn>,
	last_access: OffsetDateTime,
}
impl ConversationSession {
	pub fn new(session_id: &str, now: OffsetDateTime) -> Self {
		Self { session_id: session_id.to_string(), turns: Vec::new(), last_access: now }
	}

	pub fn turns(&self) -> &[ConversationTurn] {
		&self.turns
	}

	pub fn last_access(&self) -> OffsetDateTime {
		self.last_access
	}

	pub fn touch(&mut self, now: OffsetDateTime) {
		if now > self.last_access {
			self.last_access = now;
		}
	}

	/// Appends a completed exchange. Query and response land together or not at all.
	pub fn append(&mut self, query: String, response: String, now: OffsetDateTime) {
		self.turns.push(ConversationTurn { query, response });
		self.touch(now);
	}
}

/// Owns conversation sessions and decides when they go away.
///
/// Expired sessions behave as absent on every access path.
pub trait SessionStore
where
	Self: Send + Sync,
{
	fn get_or_create(&self, session_id: &str, now: OffsetDateTime) -> SharedSession;

	fn get(&self, session_id: &str, now: OffsetDateTime) -> Option<SharedSession>;

	/// Returns whether a session was removed.
	fn remove(&self, session_id: &str) -> bool;

	fn list_expired(&self, now: OffsetDateTime) -> Vec<String>;

	fn evict_expired(&self, now: OffsetDateTime) -> usize;

	fn len(&self) -> usize;

	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// In-process store with a session-count cap (least recently used goes first) and an idle TTL.
pub struct InMemorySessionStore {
	sessions: Mutex<LruCache<String, SharedSession>>,
	ttl: Duration,
}
impl InMemorySessionStore {
	pub fn new(max_sessions: usize, ttl: Duration) -> Self {
		let capacity = NonZeroUsize::new(max_sessions).unwrap_or(NonZeroUsize::MIN);

		Self { sessions: Mutex::new(LruCache::new(capacity)), ttl }
	}

	fn is_expired(&self, session: &SharedSession, now: OffsetDateTime) -> bool {
		let last_access = session.lock().unwrap_or_else(|err| err.into_inner()).last_access();

		now - last_access > self.ttl
	}
}
impl SessionStore for InMemorySessionStore {
	fn get_or_create(&self, session_id: &str, now: OffsetDateTime) -> SharedSession {
		let mut sessions = self.sessions.lock().unwrap_or_else(|err| err.into_inner());

		if let Some(session) = sessions.get(session_id).cloned() {
			if !self.is_expired(&session, now) {
				session.lock().unwrap_or_else(|err| err.into_inner()).touch(now);

				return session;
			}

			tracing::debug!(session_id, "Session expired; starting a new one.");
		}

		let session = Arc::new(Mutex::new(ConversationSession::new(session_id, now)));

		if let Some((evicted, _)) = sessions.push(session_id.to_string(), session.clone())
			&& evicted != session_id
		{
			tracing::debug!(session_id = %evicted, "Session evicted at capacity.");
		}

		session
	}

	fn get(&self, session_id: &str, now: OffsetDateTime) -> Option<SharedSession> {
		let mut sessions = self.sessions.lock().unwrap_or_else(|err| err.into_inner());
		let session = sessions.get(session_id).cloned()?;

		if self.is_expired(&session, now) {
			sessions.pop(session_id);

			return None;
		}

		Some(session)
	}

	fn remove(&self, session_id: &str) -> bool {
		self.sessions.lock().unwrap_or_else(|err| err.into_inner()).pop(session_id).is_some()
	}

	fn list_expired(&self, now: OffsetDateTime) -> Vec<String> {
		let sessions = self.sessions.lock().unwrap_or_else(|err| err.into_inner());

		sessions
			.iter()
			.filter(|(_, session)| self.is_expired(session, now))
			.map(|(session_id, _)| session_id.clone())
			.collect()
	}

	fn evict_expired(&self, now: OffsetDateTime) -> usize {
		let mut sessions = self.sessions.lock().unwrap_or_else(|err| err.into_inner());
		let expired: Vec<String> = sessions
			.iter()
			.filter(|(_, session)| self.is_expired(session, now))
			.map(|(session_id, _)| session_id.clone())
			.collect();

		for session_id in &expired {
			sessions.pop(session_id);
		}

		expired.len()
	}

	fn len(&self) -> usize {
		self.sessions.lock().unwrap_or_else(|err| err.into_inner()).len()
	}
}
