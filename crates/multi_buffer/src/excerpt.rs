use slotmap::new_key_type;
use text::{BufferId, BufferRow, BufferSnapshot};

new_key_type! {
    /// Minted by the multibuffer's slot map when an excerpt is added; a
    /// `(index, generation)` pair that is detectably stale once its slot
    /// has been reused at a higher generation.
    pub struct ExcerptId;
}

/// A half-open `[start, end)` row range within a single buffer.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExcerptBufferRange {
    pub start: BufferRow,
    pub end: BufferRow,
}

impl ExcerptBufferRange {
    pub fn new(start: u32, end: u32) -> Self {
        ExcerptBufferRange {
            start: BufferRow(start),
            end: BufferRow(end),
        }
    }

    pub fn line_count(&self) -> u32 {
        self.end.0.saturating_sub(self.start.0)
    }
}

/// `context` is the visible line span; `primary` is a highlighted
/// sub-range, entirely within `context`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExcerptRange {
    pub context: ExcerptBufferRange,
    pub primary: ExcerptBufferRange,
}

#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum ExcerptError {
    #[error(
        "excerpt context end row {end} exceeds the buffer's line count {line_count}"
    )]
    RangeExceedsBufferLineCount { end: u32, line_count: u32 },
}

/// A view over a buffer snapshot defined by a line range, with an optional
/// synthetic trailing newline row.
#[derive(Clone)]
pub struct Excerpt {
    pub id: ExcerptId,
    pub buffer_id: BufferId,
    pub buffer_snapshot: BufferSnapshot,
    pub range: ExcerptRange,
    pub has_trailing_newline: bool,
}

impl Excerpt {
    pub fn new(
        id: ExcerptId,
        buffer_snapshot: BufferSnapshot,
        range: ExcerptRange,
        has_trailing_newline: bool,
    ) -> Result<Self, ExcerptError> {
        let line_count = buffer_snapshot.line_count() as u32;
        if range.context.end.0 > line_count {
            return Err(ExcerptError::RangeExceedsBufferLineCount {
                end: range.context.end.0,
                line_count,
            });
        }
        Ok(Excerpt {
            id,
            buffer_id: buffer_snapshot.id(),
            buffer_snapshot,
            range,
            has_trailing_newline,
        })
    }

    /// A value that can briefly occupy a freshly-allocated slot before the
    /// real excerpt (which needs to know its own id) overwrites it.
    pub(crate) fn placeholder(buffer_snapshot: BufferSnapshot) -> Self {
        Excerpt {
            id: ExcerptId::default(),
            buffer_id: buffer_snapshot.id(),
            buffer_snapshot,
            range: ExcerptRange::default(),
            has_trailing_newline: false,
        }
    }

    /// Rows contributed to the unified view: the context span, plus one if
    /// a synthetic trailing newline row is present.
    pub fn row_count(&self) -> u32 {
        self.range.context.line_count() + if self.has_trailing_newline { 1 } else { 0 }
    }
}

/// A cached, denormalized summary of a live [`Excerpt`], carrying its
/// cumulative position in the unified row space.
#[derive(Clone, Debug)]
pub struct ExcerptInfo {
    pub id: ExcerptId,
    pub buffer_id: BufferId,
    pub range: ExcerptRange,
    pub start_row: crate::coordinates::MultiBufferRow,
    pub end_row: crate::coordinates::MultiBufferRow,
    pub has_trailing_newline: bool,
}
