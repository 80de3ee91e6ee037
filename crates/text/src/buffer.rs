use crate::anchor::Bias;
use crate::coordinates::{BufferOffset, BufferPoint, BufferRow};
use crate::edit::EditEntry;
use rope::Rope;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque, unique per buffer, stable for the buffer's lifetime.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BufferId(u64);

impl BufferId {
    pub fn new() -> Self {
        BufferId(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for BufferId {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate stats over a buffer's current text.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TextSummary {
    pub lines: u32,
    pub bytes: usize,
    pub last_line_len: u32,
    pub chars: usize,
}

impl TextSummary {
    fn compute(rope: &Rope) -> Self {
        let lines = rope.line_count() as u32;
        TextSummary {
            lines,
            bytes: rope.len(),
            last_line_len: rope.line_len(lines - 1) as u32,
            chars: rope.text().chars().count(),
        }
    }
}

/// A mutable text holder: wraps a rope, records an append-only edit log,
/// mints immutable snapshots.
pub struct Buffer {
    id: BufferId,
    rope: Rope,
    summary: TextSummary,
    edits: Vec<EditEntry>,
}

impl Buffer {
    pub fn new(text: &str) -> Self {
        let rope = Rope::from(text);
        let summary = TextSummary::compute(&rope);
        Buffer {
            id: BufferId::new(),
            rope,
            summary,
            edits: Vec::new(),
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Length of the edit log, i.e. the buffer's current version.
    pub fn version(&self) -> u32 {
        self.edits.len() as u32
    }

    pub fn snapshot(&self) -> BufferSnapshot {
        BufferSnapshot {
            id: self.id,
            rope: self.rope.clone(),
            summary: self.summary,
            version: self.version(),
        }
    }

    pub fn insert(&mut self, offset: usize, text: &str) {
        self.replace(offset, offset, text)
    }

    pub fn delete(&mut self, start: usize, end: usize) {
        self.replace(start, end, "")
    }

    pub fn replace(&mut self, start: usize, end: usize, text: &str) {
        let len = self.rope.len();
        let start = start.min(len);
        let end = end.min(len).max(start);
        self.rope = self.rope.replace(start, end, text);
        self.summary = TextSummary::compute(&self.rope);
        self.edits.push(EditEntry::new(start, end - start, text.len()));
        log::trace!(
            "buffer {:?} edit at {}..{} (version now {})",
            self.id,
            start,
            end,
            self.version()
        );
    }

    /// Edits appended since `version`, in chronological order.
    pub fn edits_since(&self, version: u32) -> &[EditEntry] {
        let start = (version as usize).min(self.edits.len());
        &self.edits[start..]
    }
}

/// An immutable view of a buffer: shares the rope by reference with the
/// buffer at snapshot time and freezes the version number.
#[derive(Clone)]
pub struct BufferSnapshot {
    id: BufferId,
    rope: Rope,
    summary: TextSummary,
    version: u32,
}

impl BufferSnapshot {
    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn summary(&self) -> TextSummary {
        self.summary
    }

    pub fn len(&self) -> usize {
        self.rope.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.rope.line_count()
    }

    pub fn text(&self) -> String {
        self.rope.text()
    }

    pub fn line(&self, row: BufferRow) -> String {
        self.rope.line(row.0)
    }

    pub fn line_len(&self, row: BufferRow) -> u32 {
        self.rope.line_len(row.0) as u32
    }

    pub fn lines(&self, start_row: BufferRow, end_row: BufferRow) -> Vec<String> {
        self.rope.lines(start_row.0, end_row.0)
    }

    pub fn point_to_offset(&self, point: BufferPoint) -> BufferOffset {
        BufferOffset(self.rope.point_to_offset(point.to_rope_point()))
    }

    pub fn offset_to_point(&self, offset: BufferOffset) -> BufferPoint {
        BufferPoint::from_rope_point(self.rope.offset_to_point(offset.0))
    }

    /// Clamps `point` into range. The current implementation does not
    /// differentiate `bias` when the only invalid dimension is overflow
    /// (spec §4.3) — both sides collapse to the same boundary.
    pub fn clip_point(&self, point: BufferPoint, _bias: Bias) -> BufferPoint {
        let row = point.row.0.min(self.rope.line_count() as u32 - 1);
        let column = point.column.min(self.rope.line_len(row) as u32);
        BufferPoint::new(row, column)
    }

    pub fn clip_offset(&self, offset: BufferOffset, _bias: Bias) -> BufferOffset {
        BufferOffset(offset.0.min(self.rope.len()))
    }
}
