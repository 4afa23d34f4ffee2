//! Sentence-bounded text chunking.
//!
//! Sizes are measured in Unicode scalar values (`char`s). Cuts always fall on grapheme cluster
//! boundaries, so a single grapheme wider than `max_chars` becomes a chunk of its own that exceeds
//! the limit.

use unicode_segmentation::UnicodeSegmentation;

#[derive(Clone, Debug)]
pub struct ChunkingConfig {
	pub max_chars: u32,
	pub overlap_chars: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chunk {
	pub chunk_index: i32,
	/// Byte offset of the first byte of `text` in the source.
	pub start_offset: usize,
	/// Byte offset one past the last byte of `text` in the source.
	pub end_offset: usize,
	pub text: String,
}

pub fn split_text(text: &str, cfg: &ChunkingConfig) -> Vec<Chunk> {
	if text.trim().is_empty() {
		return Vec::new();
	}

	let max_chars = cfg.max_chars.max(1) as usize;
	let overlap_chars = (cfg.overlap_chars as usize).min(max_chars.saturating_sub(1));
	let mut chunks = Vec::new();
	// Byte range of the chunk under construction.
	let mut start = 0_usize;
	let mut end = 0_usize;
	let mut len_chars = 0_usize;

	for (idx, sentence) in sentence_pieces(text, max_chars) {
		let sentence_chars = sentence.chars().count();

		if len_chars > 0 && len_chars + sentence_chars > max_chars {
			push_chunk(&mut chunks, text, start, end);

			let room_chars = max_chars.saturating_sub(sentence_chars);

			start = overlap_start(text, start, end, overlap_chars, room_chars);
			len_chars = text[start..end].chars().count();
		}
		if len_chars == 0 {
			start = idx;
		}

		end = idx + sentence.len();
		len_chars += sentence_chars;
	}

	if len_chars > 0 {
		push_chunk(&mut chunks, text, start, end);
	}

	tracing::trace!(chunks = chunks.len(), max_chars, overlap_chars, "Split text into chunks.");

	chunks
}

/// Sentences with their byte offsets. Sentences longer than `max_chars` are cut on grapheme
/// boundaries so every piece fits in a chunk on its own.
fn sentence_pieces(text: &str, max_chars: usize) -> Vec<(usize, &str)> {
	let mut pieces = Vec::new();

	for (idx, sentence) in text.split_sentence_bound_indices() {
		if sentence.chars().count() <= max_chars {
			pieces.push((idx, sentence));

			continue;
		}

		let mut piece_start = 0_usize;
		let mut piece_chars = 0_usize;

		for (offset, grapheme) in sentence.grapheme_indices(true) {
			let grapheme_chars = grapheme.chars().count();

			if piece_chars > 0 && piece_chars + grapheme_chars > max_chars {
				pieces.push((idx + piece_start, &sentence[piece_start..offset]));

				piece_start = offset;
				piece_chars = 0;
			}

			piece_chars += grapheme_chars;
		}

		if piece_chars > 0 {
			pieces.push((idx + piece_start, &sentence[piece_start..]));
		}
	}

	pieces
}

/// Start of the next chunk: the tail of the previous chunk holding at most `overlap_chars`
/// characters and leaving room for `room_chars` more.
fn overlap_start(
	text: &str,
	start: usize,
	end: usize,
	overlap_chars: usize,
	room_chars: usize,
) -> usize {
	let budget = overlap_chars.min(room_chars);

	if budget == 0 {
		return end;
	}

	let mut taken = 0_usize;
	let mut next_start = end;

	for (offset, grapheme) in text[start..end].grapheme_indices(true).rev() {
		let grapheme_chars = grapheme.chars().count();

		if taken + grapheme_chars > budget {
			break;
		}

		taken += grapheme_chars;
		next_start = start + offset;
	}

	next_start
}

fn push_chunk(chunks: &mut Vec<Chunk>, text: &str, start: usize, end: usize) {
	let chunk_text = &text[start..end];

	if chunk_text.trim().is_empty() {
		return;
	}

	chunks.push(Chunk {
		chunk_index: chunks.len() as i32,
		start_offset: start,
		end_offset: end,
		text: chunk_text.to_string(),
	});
}
