//! Component F: the Text Chunker.
//!
//! Splits prompt/response/plan text into overlapping, word-boundary
//! preferring windows before they're embedded and indexed. Grounded on the
//! original chunker, with one correction: the original's loop-termination
//! guard compares an integer cursor against the previous chunk's *text*,
//! which can never be true and so never prevents a non-advancing loop.
//! This port replaces it with the guard's evident intent: advance the
//! cursor to the end of the current window whenever the overlap step
//! wouldn't move it forward, which is what actually guarantees
//! termination.

/// One chunk of text plus its byte offset into the original string, used to
/// let a future UI highlight which part of a long prompt/response a search
/// hit came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
    pub start: usize,
}

/// Splits `text` into chunks of roughly `chunk_size` characters, each
/// overlapping the previous by `overlap` characters. Text shorter than
/// `chunk_size` passes through as a single chunk.
///
/// Boundaries prefer the nearest preceding whitespace to `chunk_size` so
/// words aren't split mid-token; if no whitespace is found in range, the
/// window is cut exactly at `chunk_size`.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }
    if text.len() <= chunk_size {
        return vec![Chunk {
            text: text.to_string(),
            start: 0,
        }];
    }

    let bytes = text.as_bytes();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < text.len() {
        let mut end = (start + chunk_size).min(text.len());
        if end < text.len() {
            if let Some(boundary) = find_preceding_whitespace(bytes, start, end) {
                end = boundary;
            }
        }
        // `end` must make progress past `start`, or a chunk_size smaller
        // than a single word would loop forever looking for whitespace.
        if end <= start {
            end = (start + chunk_size).min(text.len());
        }

        chunks.push(Chunk {
            text: text[start..end].to_string(),
            start,
        });

        if end >= text.len() {
            break;
        }

        let next_start = end.saturating_sub(overlap);
        // If the overlap step doesn't move the cursor forward (overlap >=
        // the window just produced), jump straight to `end` instead of
        // reprocessing the same window forever.
        start = if next_start > start { next_start } else { end };
    }

    chunks
}

fn find_preceding_whitespace(bytes: &[u8], start: usize, end: usize) -> Option<usize> {
    (start + 1..end).rev().find(|&i| bytes[i].is_ascii_whitespace())
}
