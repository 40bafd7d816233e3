pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Index error: {message}")]
	Index { message: String },
	#[error("Timeout: {message}")]
	Timeout { message: String },
}
impl From<deco_storage::Error> for Error {
	fn from(err: deco_storage::Error) -> Self {
		match err {
			deco_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			other => Self::Storage { message: other.to_string() },
		}
	}
}

impl From<deco_providers::Error> for Error {
	fn from(err: deco_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
