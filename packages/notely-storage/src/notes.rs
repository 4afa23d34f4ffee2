use sqlx::{Executor, Postgres, Transaction, types::Json};
use uuid::Uuid;

use crate::{
	Error, Result,
	db::Db,
	error,
	models::{
		Chunk, ChunkInput, NOTE_COLUMNS, NewNote, Note, NoteFilter, NoteFlagsPatch, NoteUpdate,
	},
	vector,
};

pub async fn get_all_notes(db: &Db) -> Result<Vec<Note>> {
	list_notes(db, NoteFilter::All).await
}

pub async fn list_notes(db: &Db, filter: NoteFilter) -> Result<Vec<Note>> {
	let mut sql = format!("SELECT {NOTE_COLUMNS} FROM notes");

	if let Some(predicate) = filter.predicate() {
		sql.push_str(" WHERE ");
		sql.push_str(predicate);
	}

	sql.push_str(" ORDER BY updated_at DESC, id");

	sqlx::query_as::<_, Note>(&sql).fetch_all(&db.pool).await.map_err(|err| {
		tracing::error!(error = %err, %filter, "Failed to fetch notes.");

		Error::from(err)
	})
}

pub async fn get_note_by_id(db: &Db, note_id: Uuid, user_id: &str) -> Result<Note> {
	let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND created_by = $2");
	let note = sqlx::query_as::<_, Note>(&sql)
		.bind(note_id)
		.bind(user_id)
		.fetch_optional(&db.pool)
		.await
		.inspect_err(|err| tracing::error!(error = %err, %note_id, "Failed to fetch note."))?;

	note.ok_or_else(|| Error::NotFound(format!("Note with ID {note_id} not found.")))
}

/// Inserts the note row and its chunk rows in one transaction. Any chunk failure rolls back the
/// note insert.
pub async fn create_note(db: &Db, note: &NewNote, chunks: &[ChunkInput]) -> Result<Note> {
	let mut tx = db.pool.begin().await?;
	let created = insert_note_tx(&mut tx, note).await?;

	insert_chunks_tx(&mut tx, created.id, chunks).await?;

	tx.commit().await?;

	tracing::debug!(note_id = %created.id, chunks = chunks.len(), "Note created.");

	Ok(created)
}

/// Overwrites title, content, and metadata of an owned note. When `chunks` is present the chunk set
/// is replaced inside the same transaction.
pub async fn update_note(
	db: &Db,
	note_id: Uuid,
	update: &NoteUpdate,
	user_id: &str,
	chunks: Option<&[ChunkInput]>,
) -> Result<Note> {
	let metadata = update.metadata.persistable();
	let sql = format!(
		"\
UPDATE notes
SET
	title = $1,
	content = $2,
	metadata = $3,
	updated_at = $4,
	updated_by = $5
WHERE id = $6 AND created_by = $7
RETURNING {NOTE_COLUMNS}"
	);
	let mut tx = db.pool.begin().await?;
	let updated = sqlx::query_as::<_, Note>(&sql)
		.bind(update.title.as_str())
		.bind(update.content.as_str())
		.bind(Json(&metadata))
		.bind(update.updated_at)
		.bind(update.updated_by.as_str())
		.bind(note_id)
		.bind(user_id)
		.fetch_optional(&mut *tx)
		.await
		.inspect_err(|err| tracing::error!(error = %err, %note_id, "Failed to update note."))?;
	let Some(updated) = updated else {
		tracing::warn!(%note_id, "Update matched no note for this owner.");

		return Err(Error::UpdateFailed(format!("Failed to update note with ID {note_id}.")));
	};

	if let Some(chunks) = chunks {
		delete_note_chunks_tx(&mut tx, note_id).await?;
		insert_chunks_tx(&mut tx, note_id, chunks).await?;
	}

	tx.commit().await?;

	Ok(updated)
}

/// Merges flag changes into the stored metadata of an owned note.
pub async fn update_note_flags(
	db: &Db,
	note_id: Uuid,
	patch: &NoteFlagsPatch,
	user_id: &str,
	now: time::OffsetDateTime,
) -> Result<Note> {
	let sql = format!(
		"\
UPDATE notes
SET
	metadata = metadata || $1,
	updated_at = $2,
	updated_by = $3
WHERE id = $4 AND created_by = $3
RETURNING {NOTE_COLUMNS}"
	);
	let updated = sqlx::query_as::<_, Note>(&sql)
		.bind(Json(patch))
		.bind(now)
		.bind(user_id)
		.bind(note_id)
		.fetch_optional(&db.pool)
		.await
		.inspect_err(|err| tracing::error!(error = %err, %note_id, "Failed to update flags."))?;

	updated.ok_or_else(|| Error::UpdateFailed(format!("Failed to update note with ID {note_id}.")))
}

/// Deletes a note and its chunks without checking ownership.
pub async fn delete_note_by_id(db: &Db, note_id: Uuid) -> Result<Note> {
	delete_note(db, note_id, None).await
}

pub async fn delete_owned_note(db: &Db, note_id: Uuid, user_id: &str) -> Result<Note> {
	delete_note(db, note_id, Some(user_id)).await
}

pub async fn list_note_chunks(db: &Db, note_id: Uuid) -> Result<Vec<Chunk>> {
	let chunks = sqlx::query_as::<_, Chunk>(
		"\
SELECT note_id, chunk_index, text, embedding::text AS embedding
FROM chunks
WHERE note_id = $1
ORDER BY chunk_index",
	)
	.bind(note_id)
	.fetch_all(&db.pool)
	.await?;

	Ok(chunks)
}

pub async fn insert_note_tx(tx: &mut Transaction<'_, Postgres>, note: &NewNote) -> Result<Note> {
	let metadata = note.metadata.persistable();
	let embedding = note.embedding.as_deref().map(vector::vector_to_pg);
	let sql = format!(
		"\
INSERT INTO notes (title, content, embedding, metadata, created_by, updated_by)
VALUES ($1, $2, $3::text::vector, $4, $5, $5)
RETURNING {NOTE_COLUMNS}"
	);

	sqlx::query_as::<_, Note>(&sql)
		.bind(note.title.as_str())
		.bind(note.content.as_str())
		.bind(embedding)
		.bind(Json(&metadata))
		.bind(note.created_by.as_str())
		.fetch_one(&mut **tx)
		.await
		.map_err(|err| {
			tracing::error!(error = %err, "Failed to insert note.");

			Error::from(err)
		})
}

pub async fn insert_chunks_tx(
	tx: &mut Transaction<'_, Postgres>,
	note_id: Uuid,
	chunks: &[ChunkInput],
) -> Result<()> {
	for chunk in chunks {
		insert_chunk_exec(&mut **tx, note_id, chunk).await?;
	}

	Ok(())
}

pub async fn delete_note_chunks_tx(
	tx: &mut Transaction<'_, Postgres>,
	note_id: Uuid,
) -> Result<u64> {
	delete_note_chunks_exec(&mut **tx, note_id).await
}

async fn delete_note(db: &Db, note_id: Uuid, owner: Option<&str>) -> Result<Note> {
	let sql = format!(
		"\
SELECT {NOTE_COLUMNS}
FROM notes
WHERE id = $1 AND ($2::text IS NULL OR created_by = $2)
FOR UPDATE"
	);
	let mut tx = db.pool.begin().await?;
	let note = sqlx::query_as::<_, Note>(&sql)
		.bind(note_id)
		.bind(owner)
		.fetch_optional(&mut *tx)
		.await
		.inspect_err(|err| tracing::error!(error = %err, %note_id, "Failed to load note."))?
		.ok_or_else(|| Error::NotFound(format!("Note with ID {note_id} not found.")))?;
	let removed_chunks = delete_note_chunks_exec(&mut *tx, note_id).await?;
	let deleted = sqlx::query("DELETE FROM notes WHERE id = $1")
		.bind(note_id)
		.execute(&mut *tx)
		.await
		.inspect_err(|err| tracing::error!(error = %err, %note_id, "Failed to delete note."))?;

	if deleted.rows_affected() == 0 {
		return Err(Error::DeleteFailed(format!("Failed to delete note with ID {note_id}.")));
	}

	tx.commit().await?;

	tracing::debug!(%note_id, removed_chunks, "Note deleted.");

	Ok(note)
}

async fn insert_chunk_exec<'e, E>(executor: E, note_id: Uuid, chunk: &ChunkInput) -> Result<()>
where
	E: Executor<'e, Database = Postgres>,
{
	let vec_text = vector::vector_to_pg(&chunk.embedding);

	sqlx::query(
		"\
INSERT INTO chunks (note_id, chunk_index, text, embedding)
VALUES ($1, $2, $3, $4::text::vector)",
	)
	.bind(note_id)
	.bind(chunk.index)
	.bind(chunk.text.as_str())
	.bind(vec_text.as_str())
	.execute(executor)
	.await
	.map_err(|err| {
		tracing::error!(error = %err, %note_id, chunk_index = chunk.index, "Failed to insert chunk.");

		if error::is_unique_violation(&err) {
			Error::InvalidArgument(format!("Duplicate chunk index {}.", chunk.index))
		} else {
			Error::from(err)
		}
	})?;

	Ok(())
}

async fn delete_note_chunks_exec<'e, E>(executor: E, note_id: Uuid) -> Result<u64>
where
	E: Executor<'e, Database = Postgres>,
{
	let result = sqlx::query("DELETE FROM chunks WHERE note_id = $1")
		.bind(note_id)
		.execute(executor)
		.await
		.inspect_err(|err| tracing::error!(error = %err, %note_id, "Failed to delete chunks."))?;

	Ok(result.rows_affected())
}
