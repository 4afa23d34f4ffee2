use uuid::Uuid;

use crate::{NoteResponse, NotelyService, Result};

impl NotelyService {
	/// Removes an owned note together with its chunks.
	pub async fn delete_note(&self, user_id: &str, note_id: Uuid) -> Result<NoteResponse> {
		let user_id = crate::require_user_id(user_id)?;
		let note = notely_storage::notes::delete_owned_note(&self.db, note_id, user_id)
			.await
			.inspect_err(|err| tracing::warn!(error = %err, %note_id, "Note delete failed."))?;

		tracing::info!(%note_id, "Note deleted.");

		NoteResponse::try_from(note)
	}

	/// Removes any note regardless of owner. Only the admin router reaches this.
	pub async fn admin_delete_note(&self, note_id: Uuid) -> Result<NoteResponse> {
		let note = notely_storage::notes::delete_note_by_id(&self.db, note_id)
			.await
			.inspect_err(|err| tracing::warn!(error = %err, %note_id, "Admin note delete failed."))?;

		tracing::info!(%note_id, owner = %note.created_by, "Note deleted by admin.");

		NoteResponse::try_from(note)
	}
}
