use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use notely_storage::models::{ChunkInput, NoteFlagsPatch, NoteMetadata, NoteUpdate};

use crate::{Error, NoteResponse, NotelyService, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
	pub title: String,
	#[serde(default)]
	pub content: String,
	/// Replaces the stored metadata. The stored value is kept when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub metadata: Option<NoteMetadata>,
	/// Replaces the stored chunk set when present.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chunks: Option<Vec<ChunkInput>>,
}

impl NotelyService {
	pub async fn update_note(
		&self,
		user_id: &str,
		note_id: Uuid,
		req: UpdateNoteRequest,
	) -> Result<NoteResponse> {
		let user_id = crate::require_user_id(user_id)?;
		let UpdateNoteRequest { title, content, metadata, chunks } = req;

		self.validate_note_text(&title, &content)?;

		if let Some(chunks) = chunks.as_deref() {
			self.validate_chunks(chunks)?;
		}

		let current = notely_storage::notes::get_note_by_id(&self.db, note_id, user_id)
			.await
			.map_err(|err| match err {
				notely_storage::Error::NotFound(_) => {
					tracing::warn!(%note_id, "Update target not found for this owner.");

					Error::UpdateFailed { message: format!("Failed to update note with ID {note_id}.") }
				},
				other => Error::from(other),
			})?;
		let chunks = match chunks {
			Some(chunks) => Some(chunks),
			None if self.cfg.chunking.rechunk_on_update && current.content != content =>
				Some(self.derive_chunks(&content).await?),
			None => None,
		};
		let update = NoteUpdate {
			title,
			content,
			metadata: metadata.unwrap_or(current.metadata.0),
			updated_at: OffsetDateTime::now_utc(),
			updated_by: user_id.to_string(),
		};
		let note = notely_storage::notes::update_note(
			&self.db,
			note_id,
			&update,
			user_id,
			chunks.as_deref(),
		)
		.await?;

		tracing::info!(
			%note_id,
			replaced_chunks = chunks.as_ref().map(Vec::len),
			"Note updated."
		);

		NoteResponse::try_from(note)
	}

	/// Merges trash and archive flags into an owned note's metadata.
	pub async fn set_note_flags(
		&self,
		user_id: &str,
		note_id: Uuid,
		patch: NoteFlagsPatch,
	) -> Result<NoteResponse> {
		let user_id = crate::require_user_id(user_id)?;

		if patch.is_empty() {
			return Err(Error::invalid("At least one of is_in_trash or is_in_archive is required."));
		}

		let note = notely_storage::notes::update_note_flags(
			&self.db,
			note_id,
			&patch,
			user_id,
			OffsetDateTime::now_utc(),
		)
		.await
		.inspect_err(|err| tracing::warn!(error = %err, %note_id, "Flag update failed."))?;

		tracing::info!(
			%note_id,
			is_in_trash = note.metadata.is_in_trash,
			is_in_archive = note.metadata.is_in_archive,
			"Note flags updated."
		);

		NoteResponse::try_from(note)
	}
}
