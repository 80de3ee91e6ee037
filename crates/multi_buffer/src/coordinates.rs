//! Unified (multibuffer) coordinate types.
//!
//! Deliberately has no `From`/`Into` bridging to `text::BufferRow` /
//! `BufferPoint` / `BufferOffset` — translating between the two coordinate
//! spaces always goes through an explicit, named function
//! (`MultiBufferSnapshot::to_buffer_point`, `to_multi_buffer_point`, ...).

use std::fmt;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MultiBufferRow(pub u32);

impl fmt::Display for MultiBufferRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MultiBufferPoint {
    pub row: MultiBufferRow,
    pub column: u32,
}

impl MultiBufferPoint {
    pub fn new(row: u32, column: u32) -> Self {
        MultiBufferPoint {
            row: MultiBufferRow(row),
            column,
        }
    }
}

impl fmt::Display for MultiBufferPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MultiBufferOffset(pub usize);
