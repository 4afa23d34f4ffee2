use serde::{Deserialize, Serialize};

use notely_storage::models::{ChunkInput, NewNote, NoteMetadata};

use crate::{Error, NoteResponse, NotelyService, Result};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreateNoteRequest {
	pub title: String,
	#[serde(default)]
	pub content: String,
	#[serde(default)]
	pub metadata: NoteMetadata,
	/// Whole-note embedding, stored as-is when present.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub embedding: Option<Vec<f32>>,
	/// Chunk payload. When absent, chunks are derived from `content` through the embedding
	/// provider.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub chunks: Option<Vec<ChunkInput>>,
}

impl NotelyService {
	pub async fn create_note(&self, user_id: &str, req: CreateNoteRequest) -> Result<NoteResponse> {
		let user_id = crate::require_user_id(user_id)?;
		let CreateNoteRequest { title, content, mut metadata, embedding, chunks } = req;

		self.validate_note_text(&title, &content)?;

		if let Some(vec) = embedding.as_deref() {
			self.validate_embedding(vec, "embedding")?;
		}

		let chunks = match chunks.or(take_metadata_chunks(&mut metadata)?) {
			Some(chunks) => chunks,
			None => self.derive_chunks(&content).await?,
		};

		self.validate_chunks(&chunks)?;
		metadata.strip_transient();

		let new_note =
			NewNote { title, content, embedding, metadata, created_by: user_id.to_string() };
		let note = notely_storage::notes::create_note(&self.db, &new_note, &chunks).await?;

		tracing::info!(note_id = %note.id, chunks = chunks.len(), "Note created.");

		NoteResponse::try_from(note)
	}
}

/// Reads a chunk payload that older clients send inside `metadata.chunks`.
fn take_metadata_chunks(metadata: &mut NoteMetadata) -> Result<Option<Vec<ChunkInput>>> {
	let Some(raw) = metadata.extra.remove("chunks") else {
		return Ok(None);
	};

	serde_json::from_value(raw)
		.map(Some)
		.map_err(|err| Error::invalid(format!("metadata.chunks is not a valid chunk list: {err}.")))
}
