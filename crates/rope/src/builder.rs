use crate::chunk::{Chunk, MAX_CHUNK_SIZE};
use crate::{Rope, TARGET_CHUNK_SIZE};

/// Incrementally assembles a [`Rope`] from streamed text, splitting into
/// chunks as it goes rather than re-chunking the whole accumulated text at
/// the end.
///
/// `Rope::from` uses this internally; it is also useful to callers
/// assembling a large initial buffer piece by piece.
pub struct RopeBuilder {
    chunks: Vec<Chunk>,
    pending: String,
}

impl RopeBuilder {
    pub fn new() -> Self {
        RopeBuilder {
            chunks: Vec::new(),
            pending: String::new(),
        }
    }

    pub fn push(&mut self, text: &str) -> &mut Self {
        self.pending.push_str(text);
        while self.pending.len() > MAX_CHUNK_SIZE {
            let split_at = Self::split_point(&self.pending);
            let chunk_text = self.pending[..split_at].to_string();
            self.pending.replace_range(..split_at, "");
            self.chunks.push(Chunk::new(&chunk_text));
        }
        self
    }

    /// Picks a byte offset at which to end the next chunk: the newline
    /// closest to (but not past) the target size if one exists in the
    /// search window, otherwise the nearest char boundary at or before the
    /// target.
    fn split_point(pending: &str) -> usize {
        let search_end = TARGET_CHUNK_SIZE.min(pending.len());
        if let Some(idx) = pending[..search_end].rfind('\n') {
            return idx + 1;
        }
        let mut idx = TARGET_CHUNK_SIZE.min(pending.len());
        while idx > 0 && !pending.is_char_boundary(idx) {
            idx -= 1;
        }
        if idx == 0 {
            // No boundary found below target (a single codepoint wider than
            // the target): take the first char regardless of size.
            idx = pending
                .char_indices()
                .nth(1)
                .map(|(i, _)| i)
                .unwrap_or(pending.len());
        }
        idx
    }

    pub fn finish(mut self) -> Rope {
        if !self.pending.is_empty() || self.chunks.is_empty() {
            let text = std::mem::take(&mut self.pending);
            self.chunks.push(Chunk::new(&text));
        }
        Rope::from_chunks(self.chunks)
    }
}

impl Default for RopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
