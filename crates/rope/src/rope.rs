//! A chunked, immutable text container with prefix-sum indexes for
//! logarithmic position lookup and structural-sharing updates.
//!
//! A [`Rope`] never mutates in place: every edit returns a new `Rope`.
//! Chunks untouched by an edit are shared by reference (`Arc`) between the
//! old and new rope rather than copied.

mod builder;
mod chunk;
mod point;

pub use builder::RopeBuilder;
pub use point::Point;

use chunk::Chunk;
use std::fmt;
use std::sync::Arc;

/// Target chunk size in bytes (spec: "≈1 KiB"). Chunks may grow up to twice
/// this during construction before the builder forces a split.
pub const TARGET_CHUNK_SIZE: usize = 1024;

#[derive(Clone, Eq, PartialEq)]
pub struct Rope {
    chunks: Vec<Arc<Chunk>>,
    /// `chunk_offsets[i]` is the byte offset of the start of `chunks[i]`;
    /// `chunk_offsets[chunks.len()]` is the total length.
    chunk_offsets: Vec<usize>,
    /// `chunk_newline_prefixes[i]` is the number of newlines in
    /// `chunks[0..i]`; the final entry is the total newline count.
    chunk_newline_prefixes: Vec<usize>,
}

impl Rope {
    pub fn new() -> Self {
        Rope {
            chunks: Vec::new(),
            chunk_offsets: vec![0],
            chunk_newline_prefixes: vec![0],
        }
    }

    pub fn from(text: &str) -> Self {
        let mut builder = RopeBuilder::new();
        builder.push(text);
        builder.finish()
    }

    pub(crate) fn from_chunks(chunks: Vec<chunk::Chunk>) -> Self {
        Self::from_chunks_arc(chunks.into_iter().map(Arc::new).collect())
    }

    fn from_chunks_arc(chunks: Vec<Arc<Chunk>>) -> Self {
        let mut chunk_offsets = Vec::with_capacity(chunks.len() + 1);
        let mut chunk_newline_prefixes = Vec::with_capacity(chunks.len() + 1);
        chunk_offsets.push(0);
        chunk_newline_prefixes.push(0);
        for chunk in &chunks {
            chunk_offsets.push(chunk_offsets.last().unwrap() + chunk.len());
            chunk_newline_prefixes.push(chunk_newline_prefixes.last().unwrap() + chunk.newlines());
        }
        Rope {
            chunks,
            chunk_offsets,
            chunk_newline_prefixes,
        }
    }

    pub fn len(&self) -> usize {
        *self.chunk_offsets.last().unwrap()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `newline_count + 1`: an empty rope has one (empty) line.
    pub fn line_count(&self) -> usize {
        self.chunk_newline_prefixes.last().unwrap() + 1
    }

    pub fn text(&self) -> String {
        self.slice(0, self.len())
    }

    fn clamp_offset(&self, offset: usize) -> usize {
        offset.min(self.len())
    }

    fn clamp_row(&self, row: u32) -> u32 {
        (row as usize).min(self.line_count() - 1) as u32
    }

    /// Index `i` such that `chunk_offsets[i] <= offset <= chunk_offsets[i+1]`.
    fn chunk_index_for_offset(&self, offset: usize) -> usize {
        if self.chunks.is_empty() {
            return 0;
        }
        let idx = self.chunk_offsets.partition_point(|&o| o <= offset);
        idx.saturating_sub(1).min(self.chunks.len() - 1)
    }

    /// The byte offset just past the `n`-th newline (1-indexed), i.e. the
    /// start of the line that follows it. `None` if the rope has fewer than
    /// `n` newlines.
    fn offset_after_nth_newline(&self, n: usize) -> Option<usize> {
        if n == 0 {
            return Some(0);
        }
        let idx = self
            .chunk_newline_prefixes
            .partition_point(|&c| c < n)
            .checked_sub(1)?;
        if idx >= self.chunks.len() {
            return None;
        }
        let already = self.chunk_newline_prefixes[idx];
        let chunk = &self.chunks[idx];
        let local = chunk
            .as_str()
            .match_indices('\n')
            .nth(n - already - 1)?
            .0;
        Some(self.chunk_offsets[idx] + local + 1)
    }

    /// Byte offset of the first code unit of `row` (0-indexed), clamped to
    /// `len()` if `row` is out of range.
    fn start_of_row(&self, row: u32) -> usize {
        if row == 0 {
            0
        } else {
            self.offset_after_nth_newline(row as usize)
                .unwrap_or(self.len())
        }
    }

    /// Length of `row`'s content, excluding its terminating newline.
    fn row_len(&self, row: u32) -> usize {
        let start = self.start_of_row(row);
        let end = if (row as usize) + 1 < self.line_count() {
            self.start_of_row(row + 1) - 1
        } else {
            self.len()
        };
        end.saturating_sub(start)
    }

    /// Length of `row`'s content in code units, excluding its terminating
    /// newline. Out-of-range rows clamp to the last line.
    pub fn line_len(&self, row: u32) -> usize {
        self.row_len(self.clamp_row(row))
    }

    pub fn line(&self, row: u32) -> String {
        if row as usize >= self.line_count() {
            return String::new();
        }
        let start = self.start_of_row(row);
        let end = start + self.row_len(row);
        self.slice(start, end)
    }

    pub fn lines(&self, start_row: u32, end_row: u32) -> Vec<String> {
        let end_row = end_row.min(self.line_count() as u32);
        if start_row >= end_row {
            return Vec::new();
        }
        (start_row..end_row).map(|row| self.line(row)).collect()
    }

    pub fn slice(&self, start: usize, end: usize) -> String {
        let start = self.clamp_offset(start);
        let end = self.clamp_offset(end).max(start);
        if start == end || self.chunks.is_empty() {
            return String::new();
        }
        let mut result = String::with_capacity(end - start);
        let mut idx = self.chunk_index_for_offset(start);
        while idx < self.chunks.len() && self.chunk_offsets[idx] < end {
            let chunk_start = self.chunk_offsets[idx];
            let chunk_end = self.chunk_offsets[idx + 1];
            let local_start = start.saturating_sub(chunk_start);
            let local_end = end.min(chunk_end) - chunk_start;
            result.push_str(&self.chunks[idx].as_str()[local_start..local_end]);
            idx += 1;
        }
        result
    }

    pub fn offset_to_point(&self, offset: usize) -> Point {
        let offset = self.clamp_offset(offset);
        if self.chunks.is_empty() {
            return Point::zero();
        }
        let idx = self.chunk_index_for_offset(offset);
        let row = self.chunk_newline_prefixes[idx]
            + self.chunks[idx].as_str()[..offset - self.chunk_offsets[idx]]
                .matches('\n')
                .count();
        let row_start = self.start_of_row(row as u32);
        Point::new(row as u32, (offset - row_start) as u32)
    }

    pub fn point_to_offset(&self, point: Point) -> usize {
        let row = self.clamp_row(point.row);
        let line_len = self.row_len(row);
        let column = point.column.min(line_len as u32);
        self.start_of_row(row) + column as usize
    }

    pub fn insert(&self, offset: usize, text: &str) -> Rope {
        self.replace(offset, offset, text)
    }

    pub fn delete(&self, start: usize, end: usize) -> Rope {
        self.replace(start, end, "")
    }

    pub fn replace(&self, start: usize, end: usize, text: &str) -> Rope {
        let start = self.clamp_offset(start);
        let end = self.clamp_offset(end).max(start);
        if self.chunks.is_empty() {
            return Rope::from(text);
        }

        let start_idx = self.chunk_index_for_offset(start);
        let end_idx = self.chunk_index_for_offset(end);

        let mut chunks: Vec<Arc<Chunk>> = Vec::with_capacity(self.chunks.len());
        chunks.extend(self.chunks[..start_idx].iter().cloned());

        let region_start = self.chunk_offsets[start_idx];
        let region_end = self.chunk_offsets[end_idx + 1];
        let mut spliced = String::with_capacity(region_end - region_start + text.len());
        spliced.push_str(&self.slice(region_start, start));
        spliced.push_str(text);
        spliced.push_str(&self.slice(end, region_end));

        if !spliced.is_empty() {
            let mut builder = RopeBuilder::new();
            builder.push(&spliced);
            let rebuilt = builder.finish();
            chunks.extend(rebuilt.chunks);
        }

        chunks.extend(self.chunks[end_idx + 1..].iter().cloned());

        if chunks.is_empty() {
            Rope::new()
        } else {
            Rope::from_chunks_arc(chunks)
        }
    }
}

impl Default for Rope {
    fn default() -> Self {
        Rope::new()
    }
}

impl fmt::Debug for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rope")
            .field("len", &self.len())
            .field("line_count", &self.line_count())
            .field("chunks", &self.chunks.len())
            .finish()
    }
}

impl fmt::Display for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::prelude::*;

    #[ctor::ctor]
    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn empty_rope_has_one_line() {
        let rope = Rope::from("");
        assert_eq!(rope.line_count(), 1);
        assert_eq!(rope.line(0), "");
        assert_eq!(rope.len(), 0);
    }

    #[test]
    fn basic_line_access() {
        let rope = Rope::from("Hello\nWorld\nExtra");
        assert_eq!(rope.line_count(), 3);
        assert_eq!(rope.line(0), "Hello");
        assert_eq!(rope.line(1), "World");
        assert_eq!(rope.line(2), "Extra");
        assert_eq!(rope.line(3), "");
    }

    #[test]
    fn insert_in_the_middle() {
        let rope = Rope::from("Hello World");
        let rope = rope.insert(5, " Beautiful");
        assert_eq!(rope.text(), "Hello Beautiful World");
    }

    #[test]
    fn insert_newline_grows_line_count() {
        let rope = Rope::from("HelloWorld\nExtra");
        let rope = rope.insert(5, "\n");
        assert_eq!(rope.line_count(), 3);
        assert_eq!(rope.lines(0, 3), vec!["Hello", "World", "Extra"]);
    }

    #[test]
    fn delete_across_line_joins_lines() {
        let rope = Rope::from("Hello\nWorld");
        let rope = rope.delete(5, 6);
        assert_eq!(rope.line(0), "HelloWorld");
    }

    #[test]
    fn slice_spans_multiple_chunks() {
        let big = "x".repeat(TARGET_CHUNK_SIZE * 3);
        let rope = Rope::from(&big);
        assert!(rope.chunks.len() > 1);
        assert_eq!(rope.slice(0, big.len()), big);
        let mid = big.len() / 2;
        assert_eq!(rope.slice(mid - 5, mid + 5), &big[mid - 5..mid + 5]);
    }

    #[test]
    fn line_spanning_multiple_chunks() {
        let mut text = "a".repeat(TARGET_CHUNK_SIZE * 2);
        text.push('\n');
        text.push_str("short");
        let rope = Rope::from(&text);
        assert!(rope.chunks.len() > 1);
        assert_eq!(rope.line(0).len(), TARGET_CHUNK_SIZE * 2);
        assert_eq!(rope.line(1), "short");
    }

    #[test]
    fn offset_point_roundtrip() {
        let rope = Rope::from("abc\ndef\nghij");
        for offset in 0..=rope.len() {
            let point = rope.offset_to_point(offset);
            assert_eq!(rope.point_to_offset(point), offset, "offset {offset}");
        }
    }

    #[test]
    fn out_of_range_clamps() {
        let rope = Rope::from("abc\ndef");
        assert_eq!(rope.line(50), "");
        assert_eq!(rope.slice(0, 1000), "abc\ndef");
        assert_eq!(rope.point_to_offset(Point::new(50, 0)), rope.len());
        assert_eq!(rope.point_to_offset(Point::new(0, 50)), 3);
    }

    #[test]
    fn unrelated_chunks_are_shared_across_edits() {
        let big = "line\n".repeat(2000);
        let rope = Rope::from(&big);
        assert!(rope.chunks.len() > 4);
        let edited = rope.insert(rope.len() / 2, "X");
        // The first chunk, untouched by an edit in the middle, is the same
        // allocation in both ropes.
        assert!(Arc::ptr_eq(&rope.chunks[0], &edited.chunks[0]));
    }

    #[test]
    fn randomized_edits_preserve_invariants() {
        let mut rng = StdRng::seed_from_u64(1234);
        let mut text = String::new();
        let mut rope = Rope::new();
        for _ in 0..200 {
            let choice: u8 = rng.gen_range(0..3);
            match choice {
                0 => {
                    let offset = rng.gen_range(0..=text.len());
                    let offset = floor_char_boundary(&text, offset);
                    let insertion: String = (0..rng.gen_range(1..8))
                        .map(|_| if rng.gen_bool(0.2) { '\n' } else { 'a' })
                        .collect();
                    rope = rope.insert(offset, &insertion);
                    text.insert_str(offset, &insertion);
                }
                1 => {
                    if !text.is_empty() {
                        let a = floor_char_boundary(&text, rng.gen_range(0..text.len()));
                        let b = floor_char_boundary(&text, rng.gen_range(0..text.len()));
                        let (start, end) = (a.min(b), a.max(b));
                        rope = rope.delete(start, end);
                        text.replace_range(start..end, "");
                    }
                }
                _ => {
                    rope = rope.replace(0, 0, "");
                }
            }
            assert_eq!(rope.text(), text);
            assert_eq!(rope.line_count(), text.matches('\n').count() + 1);
        }
    }

    fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
        while idx > 0 && !text.is_char_boundary(idx) {
            idx -= 1;
        }
        idx
    }
}
