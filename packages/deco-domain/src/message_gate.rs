#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectCode {
	RejectEmpty,
	RejectTooLong,
	RejectControlChar,
}
impl RejectCode {
	pub fn message(self) -> &'static str {
		match self {
			Self::RejectEmpty => "Message must be non-empty.",
			Self::RejectTooLong => "Message exceeds the maximum length.",
			Self::RejectControlChar => "Message contains unsupported control characters.",
		}
	}
}

/// Gate applied to inbound chat messages before any downstream call.
pub fn message_gate(message: &str, max_chars: u32) -> Result<(), RejectCode> {
	if message.trim().is_empty() {
		return Err(RejectCode::RejectEmpty);
	}
	if message.chars().count() as u64 > u64::from(max_chars) {
		return Err(RejectCode::RejectTooLong);
	}
	if message.chars().any(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t')) {
		return Err(RejectCode::RejectControlChar);
	}

	Ok(())
}
