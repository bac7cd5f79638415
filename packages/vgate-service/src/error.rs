pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Qdrant error: {message}")]
	Qdrant { message: String },
	#[error("Secret error: {message}")]
	Secret { message: String },
	#[error("{stage} timed out after {timeout_ms} ms.")]
	Timeout { stage: &'static str, timeout_ms: u64 },
}
impl From<vgate_storage::Error> for Error {
	fn from(err: vgate_storage::Error) -> Self {
		match err {
			vgate_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			vgate_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			vgate_storage::Error::InvalidRow(message) => Self::Storage { message },
			vgate_storage::Error::Qdrant(inner) => Self::Qdrant { message: inner.to_string() },
		}
	}
}

impl From<vgate_providers::Error> for Error {
	fn from(err: vgate_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<argon2::password_hash::Error> for Error {
	fn from(err: argon2::password_hash::Error) -> Self {
		Self::Secret { message: err.to_string() }
	}
}
