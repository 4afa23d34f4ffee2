//! pgvector text marshaling. Vectors travel as `'[a,b,c]'::text::vector` so no driver-level vector
//! type is needed.

use crate::{Error, Result};

pub fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

pub fn parse_pg_vector(text: &str) -> Result<Vec<f32>> {
	let trimmed = text.trim();
	let without_brackets = trimmed
		.strip_prefix('[')
		.and_then(|s| s.strip_suffix(']'))
		.ok_or_else(|| Error::InvalidArgument("Vector text is not bracketed.".to_string()))?;

	if without_brackets.trim().is_empty() {
		return Ok(Vec::new());
	}

	let mut vec = Vec::new();

	for part in without_brackets.split(',') {
		let value: f32 = part.trim().parse().map_err(|_| {
			Error::InvalidArgument("Vector text contains a non-numeric value.".to_string())
		})?;

		vec.push(value);
	}

	Ok(vec)
}

/// Rejects vectors that pgvector would refuse or that would make cosine distance undefined.
pub fn validate_embedding(vec: &[f32], label: &str) -> Result<()> {
	if vec.is_empty() {
		return Err(Error::InvalidArgument(format!("{label} must be non-empty.")));
	}
	if vec.iter().any(|value| !value.is_finite()) {
		return Err(Error::InvalidArgument(format!("{label} must contain only finite numbers.")));
	}
	if vec.iter().all(|value| *value == 0.0) {
		return Err(Error::InvalidArgument(format!("{label} must have a non-zero norm.")));
	}

	Ok(())
}
