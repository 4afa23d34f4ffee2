use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use notely_storage::models::{Note, NoteFilter, NoteMetadata};

use crate::{NotelyService, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoteResponse {
	pub id: Uuid,
	pub title: String,
	pub content: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub embedding: Option<Vec<f32>>,
	pub metadata: NoteMetadata,
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
	pub created_by: String,
	pub updated_by: Option<String>,
}
impl TryFrom<Note> for NoteResponse {
	type Error = crate::Error;

	fn try_from(note: Note) -> Result<Self> {
		let embedding = note.embedding_vec()?;

		Ok(Self {
			id: note.id,
			title: note.title,
			content: note.content,
			embedding,
			metadata: note.metadata.0,
			created_at: note.created_at,
			updated_at: note.updated_at,
			created_by: note.created_by,
			updated_by: note.updated_by,
		})
	}
}

impl NotelyService {
	/// Every note across owners, optionally narrowed by the trash and archive flags.
	pub async fn list_notes(&self, filter: NoteFilter) -> Result<Vec<NoteResponse>> {
		let notes = notely_storage::notes::list_notes(&self.db, filter).await?;

		tracing::debug!(%filter, count = notes.len(), "Listed notes.");

		notes.into_iter().map(NoteResponse::try_from).collect()
	}

	pub async fn get_note(&self, user_id: &str, note_id: Uuid) -> Result<NoteResponse> {
		let user_id = crate::require_user_id(user_id)?;
		let note = notely_storage::notes::get_note_by_id(&self.db, note_id, user_id)
			.await
			.inspect_err(|err| tracing::warn!(error = %err, %note_id, "Note lookup failed."))?;

		NoteResponse::try_from(note)
	}
}
