pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Transport(#[from] reqwest::Error),
	#[error("Request failed with status {status}: {message}")]
	Status { status: u16, message: String },
	#[error("Failed to decode response: {message}")]
	Decode { message: String },
}
