use serde::{Deserialize, Serialize};
use uuid::Uuid;

use notely_storage::models::ChunkMatch;

use crate::{Error, NotelyService, Result};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SearchRequest {
	/// Free text, embedded through the provider before matching.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub query: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub embedding: Option<Vec<f32>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub match_threshold: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub match_count: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchItem {
	pub note_id: Uuid,
	pub chunk_index: i32,
	pub title: String,
	pub text: String,
	pub similarity: f64,
}
impl From<ChunkMatch> for SearchItem {
	fn from(row: ChunkMatch) -> Self {
		Self {
			note_id: row.note_id,
			chunk_index: row.chunk_index,
			title: row.title,
			text: row.text,
			similarity: row.similarity,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
	pub match_threshold: f64,
	pub match_count: u32,
	pub items: Vec<SearchItem>,
}

impl NotelyService {
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let match_threshold =
			req.match_threshold.unwrap_or(self.cfg.search.default_match_threshold);
		let match_count = req.match_count.unwrap_or(self.cfg.search.default_match_count);

		if !match_threshold.is_finite() || !(-1.0..=1.0).contains(&match_threshold) {
			return Err(Error::invalid("match_threshold must be a finite number in the range -1.0-1.0."));
		}
		if match_count == 0 || match_count > self.cfg.search.max_match_count {
			return Err(Error::invalid(format!(
				"match_count must be between 1 and {}.",
				self.cfg.search.max_match_count
			)));
		}

		let limit = i32::try_from(match_count)
			.map_err(|_| Error::invalid(format!("match_count must be {} or less.", i32::MAX)))?;
		let embedding = self.resolve_query_embedding(req.query, req.embedding).await?;
		let rows =
			notely_storage::search::search_by_embedding(&self.db, &embedding, match_threshold, limit)
				.await?;

		tracing::debug!(match_threshold, match_count, matches = rows.len(), "Search finished.");

		Ok(SearchResponse {
			match_threshold,
			match_count,
			items: rows.into_iter().map(SearchItem::from).collect(),
		})
	}

	async fn resolve_query_embedding(
		&self,
		query: Option<String>,
		embedding: Option<Vec<f32>>,
	) -> Result<Vec<f32>> {
		let query = query.filter(|query| !query.trim().is_empty());

		match (query, embedding) {
			(Some(_), Some(_)) =>
				Err(Error::invalid("Provide either query or embedding, not both.")),
			(None, None) => Err(Error::invalid("One of query or embedding is required.")),
			(None, Some(embedding)) => {
				self.validate_embedding(&embedding, "embedding")?;

				Ok(embedding)
			},
			(Some(query), None) => {
				let mut vectors = self.embed_texts(&[query]).await?;

				vectors.pop().ok_or_else(|| Error::Provider {
					message: "Embedding provider returned no vector for the query.".to_string(),
				})
			},
		}
	}
}
