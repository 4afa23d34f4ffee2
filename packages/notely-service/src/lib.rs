pub mod create;
pub mod delete;
pub mod notes;
pub mod search;
pub mod update;
pub mod users;

mod error;

pub use create::CreateNoteRequest;
pub use error::{Error, Result};
pub use notes::NoteResponse;
pub use search::{SearchItem, SearchRequest, SearchResponse};
pub use update::UpdateNoteRequest;
pub use users::{UserRequest, UserResponse};

pub use notely_storage::models::{ChunkInput, NoteFilter, NoteFlagsPatch, NoteMetadata};

use std::{collections::HashSet, future::Future, pin::Pin, sync::Arc};

use notely_config::{Config, EmbeddingProviderConfig};
use notely_providers::embedding;
use notely_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}
}
impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders) }
	}
}

pub struct NotelyService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}
impl NotelyService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}

	/// Embeds `texts` and checks every vector against the configured dimension.
	pub(crate) async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		if texts.is_empty() {
			return Ok(Vec::new());
		}

		let vectors = self.providers.embedding.embed(&self.cfg.providers.embedding, texts).await?;

		if vectors.len() != texts.len() {
			return Err(Error::Provider {
				message: "Embedding provider returned a different number of vectors.".to_string(),
			});
		}
		if vectors.iter().any(|vec| vec.len() != self.cfg.storage.vector_dim as usize) {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		for vec in &vectors {
			notely_storage::vector::validate_embedding(vec, "Provider embedding")
				.map_err(|err| Error::Provider { message: err.to_string() })?;
		}

		Ok(vectors)
	}

	/// Splits content into chunks and embeds each of them.
	pub(crate) async fn derive_chunks(&self, content: &str) -> Result<Vec<ChunkInput>> {
		let cfg = notely_chunking::ChunkingConfig {
			max_chars: self.cfg.chunking.max_chars,
			overlap_chars: self.cfg.chunking.overlap_chars,
		};
		let pieces = notely_chunking::split_text(content, &cfg);
		let texts = pieces.iter().map(|piece| piece.text.clone()).collect::<Vec<_>>();
		let vectors = self.embed_texts(&texts).await?;

		tracing::debug!(chunks = pieces.len(), "Derived chunks from note content.");

		Ok(pieces
			.into_iter()
			.zip(vectors)
			.map(|(piece, embedding)| ChunkInput {
				text: piece.text,
				embedding,
				index: piece.chunk_index,
			})
			.collect())
	}

	pub(crate) fn validate_chunks(&self, chunks: &[ChunkInput]) -> Result<()> {
		let dim = self.cfg.storage.vector_dim as usize;
		let mut seen = HashSet::with_capacity(chunks.len());

		for (position, chunk) in chunks.iter().enumerate() {
			if chunk.index < 0 {
				return Err(Error::invalid(format!("chunks[{position}].index must be zero or greater.")));
			}
			if !seen.insert(chunk.index) {
				return Err(Error::invalid(format!("Duplicate chunk index {}.", chunk.index)));
			}

			self.validate_embedding(&chunk.embedding, &format!("chunks[{position}].embedding"))?;
		}

		Ok(())
	}

	pub(crate) fn validate_embedding(&self, vec: &[f32], label: &str) -> Result<()> {
		notely_storage::vector::validate_embedding(vec, label)?;

		if vec.len() != self.cfg.storage.vector_dim as usize {
			return Err(Error::invalid(format!(
				"{label} must have {} dimensions, got {}.",
				self.cfg.storage.vector_dim,
				vec.len()
			)));
		}

		Ok(())
	}

	pub(crate) fn validate_note_text(&self, title: &str, content: &str) -> Result<()> {
		if title.trim().is_empty() {
			return Err(Error::invalid("title must be non-empty."));
		}
		if title.chars().count() > self.cfg.notes.max_title_chars as usize {
			return Err(Error::invalid(format!(
				"title must be {} characters or fewer.",
				self.cfg.notes.max_title_chars
			)));
		}
		if content.chars().count() > self.cfg.notes.max_content_chars as usize {
			return Err(Error::invalid(format!(
				"content must be {} characters or fewer.",
				self.cfg.notes.max_content_chars
			)));
		}

		Ok(())
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, Result<Vec<Vec<f32>>>> {
		Box::pin(async move { Ok(embedding::embed(cfg, texts).await?) })
	}
}

pub(crate) fn require_user_id(user_id: &str) -> Result<&str> {
	let trimmed = user_id.trim();

	if trimmed.is_empty() {
		return Err(Error::invalid("user_id is required."));
	}

	Ok(trimmed)
}
