use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, Result,
	db::Db,
	error,
	models::{NewUser, User},
};

pub async fn list_users(db: &Db) -> Result<Vec<User>> {
	let users = sqlx::query_as::<_, User>(
		"SELECT id, name, email, created_at, updated_at FROM users ORDER BY created_at, id",
	)
	.fetch_all(&db.pool)
	.await
	.inspect_err(|err| tracing::error!(error = %err, "Failed to fetch users."))?;

	Ok(users)
}

pub async fn get_user(db: &Db, user_id: Uuid) -> Result<User> {
	sqlx::query_as::<_, User>(
		"SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1",
	)
	.bind(user_id)
	.fetch_optional(&db.pool)
	.await
	.inspect_err(|err| tracing::error!(error = %err, %user_id, "Failed to fetch user."))?
	.ok_or_else(|| Error::NotFound(format!("User with ID {user_id} not found.")))
}

pub async fn create_user(db: &Db, user: &NewUser) -> Result<User> {
	sqlx::query_as::<_, User>(
		"\
INSERT INTO users (name, email)
VALUES ($1, $2)
RETURNING id, name, email, created_at, updated_at",
	)
	.bind(user.name.as_str())
	.bind(user.email.as_str())
	.fetch_one(&db.pool)
	.await
	.map_err(|err| map_write_error(err, &user.email))
}

pub async fn update_user(
	db: &Db,
	user_id: Uuid,
	user: &NewUser,
	now: OffsetDateTime,
) -> Result<User> {
	sqlx::query_as::<_, User>(
		"\
UPDATE users
SET name = $1, email = $2, updated_at = $3
WHERE id = $4
RETURNING id, name, email, created_at, updated_at",
	)
	.bind(user.name.as_str())
	.bind(user.email.as_str())
	.bind(now)
	.bind(user_id)
	.fetch_optional(&db.pool)
	.await
	.map_err(|err| map_write_error(err, &user.email))?
	.ok_or_else(|| Error::UpdateFailed(format!("Failed to update user with ID {user_id}.")))
}

pub async fn delete_user(db: &Db, user_id: Uuid) -> Result<User> {
	sqlx::query_as::<_, User>(
		"DELETE FROM users WHERE id = $1 RETURNING id, name, email, created_at, updated_at",
	)
	.bind(user_id)
	.fetch_optional(&db.pool)
	.await
	.inspect_err(|err| tracing::error!(error = %err, %user_id, "Failed to delete user."))?
	.ok_or_else(|| Error::DeleteFailed(format!("Failed to delete user with ID {user_id}.")))
}

fn map_write_error(err: sqlx::Error, email: &str) -> Error {
	if error::is_unique_violation(&err) {
		return Error::Conflict(format!("A user with email {email:?} already exists."));
	}

	tracing::error!(error = %err, "Failed to write user.");

	Error::from(err)
}
