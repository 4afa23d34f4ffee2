#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(#[from] sqlx::Error),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Not found: {0}")]
	NotFound(String),
	#[error("Update failed: {0}")]
	UpdateFailed(String),
	#[error("Delete failed: {0}")]
	DeleteFailed(String),
	#[error("Conflict: {0}")]
	Conflict(String),
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
	err.as_database_error().and_then(|db_err| db_err.code()).is_some_and(|code| code == "23505")
}
