//! Buffer-local coordinate types.
//!
//! These are branded so that a buffer-space row/point/offset cannot be
//! passed where a unified (multibuffer) one is expected without going
//! through an explicit, named translation function — see
//! `multi_buffer::MultiBufferRow`/`MultiBufferPoint`/`MultiBufferOffset`,
//! which intentionally have no `From`/`Into` bridging these types.

use std::fmt;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BufferRow(pub u32);

impl fmt::Display for BufferRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BufferPoint {
    pub row: BufferRow,
    pub column: u32,
}

impl BufferPoint {
    pub fn new(row: u32, column: u32) -> Self {
        BufferPoint {
            row: BufferRow(row),
            column,
        }
    }

    pub fn to_rope_point(self) -> rope::Point {
        rope::Point::new(self.row.0, self.column)
    }

    pub fn from_rope_point(point: rope::Point) -> Self {
        BufferPoint::new(point.row, point.column)
    }
}

impl fmt::Display for BufferPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.column)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BufferOffset(pub usize);

impl fmt::Display for BufferOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
