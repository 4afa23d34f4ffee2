use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::types::Json;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, Result, vector};

/// Column list for note reads. `embedding` is read back as pgvector text.
pub(crate) const NOTE_COLUMNS: &str = "\
id, title, content, embedding::text AS embedding, metadata, created_at, updated_at, created_by, \
updated_by";

/// Metadata keys that belong to a creation request and are never persisted.
const TRANSIENT_METADATA_KEYS: [&str; 1] = ["chunks"];

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Note {
	pub id: Uuid,
	pub title: String,
	pub content: String,
	pub embedding: Option<String>,
	pub metadata: Json<NoteMetadata>,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
	pub created_by: String,
	pub updated_by: Option<String>,
}
impl Note {
	pub fn embedding_vec(&self) -> Result<Option<Vec<f32>>> {
		self.embedding.as_deref().map(vector::parse_pg_vector).transpose()
	}
}

/// Note metadata. The trash and archive flags are typed; everything else is kept verbatim.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteMetadata {
	#[serde(default)]
	pub is_in_trash: bool,
	#[serde(default)]
	pub is_in_archive: bool,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}
impl NoteMetadata {
	pub fn strip_transient(&mut self) {
		for key in TRANSIENT_METADATA_KEYS {
			self.extra.remove(key);
		}
	}

	pub fn persistable(&self) -> Self {
		let mut metadata = self.clone();

		metadata.strip_transient();

		metadata
	}
}

/// Partial flag update. Absent flags are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFlagsPatch {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_in_trash: Option<bool>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub is_in_archive: Option<bool>,
}
impl NoteFlagsPatch {
	pub fn is_empty(&self) -> bool {
		self.is_in_trash.is_none() && self.is_in_archive.is_none()
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteFilter {
	#[default]
	All,
	Active,
	Archived,
	Trash,
}
impl NoteFilter {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::All => "all",
			Self::Active => "active",
			Self::Archived => "archived",
			Self::Trash => "trash",
		}
	}

	pub(crate) fn predicate(self) -> Option<&'static str> {
		match self {
			Self::All => None,
			Self::Active => Some(
				"NOT COALESCE((metadata->>'is_in_trash')::boolean, false) \
				 AND NOT COALESCE((metadata->>'is_in_archive')::boolean, false)",
			),
			Self::Archived => Some(
				"COALESCE((metadata->>'is_in_archive')::boolean, false) \
				 AND NOT COALESCE((metadata->>'is_in_trash')::boolean, false)",
			),
			Self::Trash => Some("COALESCE((metadata->>'is_in_trash')::boolean, false)"),
		}
	}
}
impl FromStr for NoteFilter {
	type Err = Error;

	fn from_str(raw: &str) -> Result<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"" | "all" => Ok(Self::All),
			"active" => Ok(Self::Active),
			"archived" | "archive" => Ok(Self::Archived),
			"trash" | "trashed" => Ok(Self::Trash),
			other => Err(Error::InvalidArgument(format!(
				"Unknown note filter {other:?}. Expected one of all, active, archived, or trash."
			))),
		}
	}
}
impl fmt::Display for NoteFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Debug)]
pub struct NewNote {
	pub title: String,
	pub content: String,
	pub embedding: Option<Vec<f32>>,
	pub metadata: NoteMetadata,
	pub created_by: String,
}

#[derive(Clone, Debug)]
pub struct NoteUpdate {
	pub title: String,
	pub content: String,
	pub metadata: NoteMetadata,
	pub updated_at: OffsetDateTime,
	pub updated_by: String,
}

/// One entry of a chunk creation payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkInput {
	pub text: String,
	pub embedding: Vec<f32>,
	pub index: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Chunk {
	pub note_id: Uuid,
	pub chunk_index: i32,
	pub text: String,
	pub embedding: String,
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ChunkMatch {
	pub note_id: Uuid,
	pub chunk_index: i32,
	pub title: String,
	pub text: String,
	pub similarity: f64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
	pub id: Uuid,
	pub name: String,
	pub email: String,
	pub created_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug)]
pub struct NewUser {
	pub name: String,
	pub email: String,
}
