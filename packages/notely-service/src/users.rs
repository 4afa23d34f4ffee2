use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use notely_storage::models::{NewUser, User};

use crate::{Error, NotelyService, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserRequest {
	pub name: String,
	pub email: String,
}
impl UserRequest {
	fn into_new_user(self) -> Result<NewUser> {
		let name = self.name.trim().to_string();
		let email = self.email.trim().to_string();

		if name.is_empty() {
			return Err(Error::invalid("name must be non-empty."));
		}

		match email.split_once('@') {
			Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {},
			_ => return Err(Error::invalid("email must be a valid address.")),
		}

		Ok(NewUser { name, email })
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
	pub id: Uuid,
	pub name: String,
	pub email: String,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl From<User> for UserResponse {
	fn from(user: User) -> Self {
		Self {
			id: user.id,
			name: user.name,
			email: user.email,
			created_at: user.created_at,
			updated_at: user.updated_at,
		}
	}
}

impl NotelyService {
	pub async fn list_users(&self) -> Result<Vec<UserResponse>> {
		let users = notely_storage::users::list_users(&self.db).await?;

		Ok(users.into_iter().map(UserResponse::from).collect())
	}

	pub async fn get_user(&self, user_id: Uuid) -> Result<UserResponse> {
		Ok(notely_storage::users::get_user(&self.db, user_id).await?.into())
	}

	pub async fn create_user(&self, req: UserRequest) -> Result<UserResponse> {
		let new_user = req.into_new_user()?;
		let user = notely_storage::users::create_user(&self.db, &new_user)
			.await
			.inspect_err(|err| tracing::warn!(error = %err, "User create failed."))?;

		tracing::info!(user_id = %user.id, "User created.");

		Ok(user.into())
	}

	pub async fn update_user(&self, user_id: Uuid, req: UserRequest) -> Result<UserResponse> {
		let new_user = req.into_new_user()?;
		let user = notely_storage::users::update_user(
			&self.db,
			user_id,
			&new_user,
			OffsetDateTime::now_utc(),
		)
		.await
		.inspect_err(|err| tracing::warn!(error = %err, %user_id, "User update failed."))?;

		tracing::info!(%user_id, "User updated.");

		Ok(user.into())
	}

	pub async fn delete_user(&self, user_id: Uuid) -> Result<UserResponse> {
		let user = notely_storage::users::delete_user(&self.db, user_id)
			.await
			.inspect_err(|err| tracing::warn!(error = %err, %user_id, "User delete failed."))?;

		tracing::info!(%user_id, "User deleted.");

		Ok(user.into())
	}
}
