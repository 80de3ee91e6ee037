//! Mutable text holders: a [`Buffer`] wraps an immutable [`rope::Rope`],
//! records an append-only edit log, and mints [`BufferSnapshot`]s. Also
//! hosts the buffer-local [`Anchor`](TextAnchor) primitive and the pure
//! [`adjust_offset`] kernel that anchor resolution is built on.

mod anchor;
mod buffer;
mod coordinates;
mod edit;

pub use anchor::{adjust_offset, adjust_offset_through, Bias, TextAnchor};
pub use buffer::{Buffer, BufferId, BufferSnapshot, TextSummary};
pub use coordinates::{BufferOffset, BufferPoint, BufferRow};
pub use edit::EditEntry;

pub use rope::Point;
