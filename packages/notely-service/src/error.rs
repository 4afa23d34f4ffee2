pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Update failed: {message}")]
	UpdateFailed { message: String },
	#[error("Delete failed: {message}")]
	DeleteFailed { message: String },
	#[error("Conflict: {message}")]
	Conflict { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	pub(crate) fn invalid(message: impl Into<String>) -> Self {
		Self::InvalidRequest { message: message.into() }
	}
}

impl From<notely_storage::Error> for Error {
	fn from(err: notely_storage::Error) -> Self {
		match err {
			notely_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			notely_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			notely_storage::Error::NotFound(message) => Self::NotFound { message },
			notely_storage::Error::UpdateFailed(message) => Self::UpdateFailed { message },
			notely_storage::Error::DeleteFailed(message) => Self::DeleteFailed { message },
			notely_storage::Error::Conflict(message) => Self::Conflict { message },
		}
	}
}

impl From<notely_providers::Error> for Error {
	fn from(err: notely_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
