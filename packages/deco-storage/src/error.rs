#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error(transparent)]
	Csv(#[from] csv::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Invalid filter: {0}")]
	InvalidFilter(String),
}
