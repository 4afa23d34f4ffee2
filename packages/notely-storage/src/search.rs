use crate::{Error, Result, db::Db, models::ChunkMatch, vector};

/// Forwards a similarity query to the store-side `match_chunks` function. Ranking, distance metric,
/// and index use are the database's concern.
pub async fn search_by_embedding(
	db: &Db,
	query_embedding: &[f32],
	match_threshold: f64,
	match_count: i32,
) -> Result<Vec<ChunkMatch>> {
	vector::validate_embedding(query_embedding, "query_embedding")?;

	if !match_threshold.is_finite() || !(-1.0..=1.0).contains(&match_threshold) {
		return Err(Error::InvalidArgument(
			"match_threshold must be a finite number in the range -1.0-1.0.".to_string(),
		));
	}
	if match_count <= 0 {
		return Err(Error::InvalidArgument("match_count must be greater than zero.".to_string()));
	}

	let vec_text = vector::vector_to_pg(query_embedding);
	let rows = sqlx::query_as::<_, ChunkMatch>(
		"\
SELECT note_id, chunk_index, title, text, similarity
FROM match_chunks($1::text::vector, $2, $3)",
	)
	.bind(vec_text.as_str())
	.bind(match_threshold)
	.bind(match_count)
	.fetch_all(&db.pool)
	.await
	.inspect_err(|err| tracing::error!(error = %err, "Similarity search failed."))?;

	tracing::debug!(match_threshold, match_count, matches = rows.len(), "Similarity search done.");

	Ok(rows)
}
