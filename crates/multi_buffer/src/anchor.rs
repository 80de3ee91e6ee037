use crate::coordinates::{MultiBufferPoint, MultiBufferRow};
use crate::excerpt::{ExcerptId, ExcerptInfo};
use crate::snapshot::MultiBufferSnapshot;
use text::{adjust_offset_through, BufferOffset, BufferPoint, TextAnchor};

/// Bounds replacement-chain traversal so a corrupted or cyclic
/// `replaced_excerpts` map cannot loop forever (spec requires a fixed
/// limit of at least 100).
const MAX_CHAIN_DEPTH: usize = 128;

/// A stable position reference: which excerpt it was created against, and
/// a buffer-local anchor within that excerpt's buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Anchor {
    pub excerpt_id: ExcerptId,
    pub text_anchor: TextAnchor,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct AnchorRange {
    pub start: Anchor,
    pub end: Anchor,
}

/// Which end of an `AnchorRange` carries the cursor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SelectionHead {
    Start,
    End,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Selection {
    pub range: AnchorRange,
    pub head: SelectionHead,
}

impl MultiBufferSnapshot {
    /// Resolves an anchor to a current unified point, or `None` if its
    /// excerpt-replacement chain leads nowhere.
    ///
    /// 1. Follow `replaced_excerpts` from `anchor.excerpt_id` to a
    ///    terminal excerpt still present in this snapshot.
    /// 2. Replay edits appended to the live buffer since the anchor's
    ///    version (or, if the buffer is no longer live, fall back to the
    ///    anchor's original offset against the excerpt's frozen snapshot).
    /// 3. Prefer the terminal excerpt if it contains the resulting buffer
    ///    point; otherwise scan other excerpts over the same buffer for
    ///    one that does; otherwise keep the terminal excerpt and clamp.
    /// 4. Map into unified coordinates via the chosen excerpt's
    ///    `start_row`.
    pub fn resolve_anchor(&self, anchor: Anchor) -> Option<MultiBufferPoint> {
        let terminal_id = self.resolve_replacement_chain(anchor.excerpt_id)?;
        let terminal_idx = self.index_of_excerpt(terminal_id)?;
        let terminal_info = &self.cache[terminal_idx];

        let buffer_point = if let Some(live_buffer) = self.buffers.get(&terminal_info.buffer_id) {
            let live = live_buffer.lock();
            let edits = live.edits_since(anchor.text_anchor.version);
            let offset = adjust_offset_through(
                anchor.text_anchor.offset,
                anchor.text_anchor.bias,
                edits,
            );
            let live_snapshot = live.snapshot();
            let clipped =
                live_snapshot.clip_offset(BufferOffset(offset), anchor.text_anchor.bias);
            live_snapshot.offset_to_point(clipped)
        } else {
            let terminal_excerpt = &self.excerpts[terminal_idx];
            terminal_excerpt
                .buffer_snapshot
                .offset_to_point(BufferOffset(anchor.text_anchor.offset))
        };

        let chosen_idx = if Self::excerpt_contains(terminal_info, buffer_point) {
            terminal_idx
        } else {
            self.cache
                .iter()
                .position(|candidate| {
                    candidate.buffer_id == terminal_info.buffer_id
                        && Self::excerpt_contains(candidate, buffer_point)
                })
                .unwrap_or(terminal_idx)
        };
        let chosen = &self.cache[chosen_idx];

        Some(Self::map_into_unified(chosen, buffer_point))
    }

    fn excerpt_contains(info: &ExcerptInfo, point: BufferPoint) -> bool {
        point.row.0 >= info.range.context.start.0 && point.row.0 < info.range.context.end.0
    }

    /// Maps a buffer point into `info`'s unified row space, clamping to the
    /// nearest boundary (with `column = 0`) if the point lies outside the
    /// excerpt's buffer row range.
    fn map_into_unified(info: &ExcerptInfo, point: BufferPoint) -> MultiBufferPoint {
        if point.row.0 < info.range.context.start.0 {
            return MultiBufferPoint {
                row: info.start_row,
                column: 0,
            };
        }
        if point.row.0 >= info.range.context.end.0 {
            return MultiBufferPoint {
                row: MultiBufferRow(info.end_row.0.saturating_sub(1)),
                column: 0,
            };
        }
        let row = info.start_row.0 + (point.row.0 - info.range.context.start.0);
        MultiBufferPoint {
            row: MultiBufferRow(row),
            column: point.column,
        }
    }

    fn resolve_replacement_chain(&self, mut id: ExcerptId) -> Option<ExcerptId> {
        let mut depth = 0;
        loop {
            if self.index_of_excerpt(id).is_some() {
                return Some(id);
            }
            let next = *self.replaced_excerpts.get(&id)?;
            id = next;
            depth += 1;
            if depth > MAX_CHAIN_DEPTH {
                log::warn!(
                    "excerpt replacement chain exceeded {MAX_CHAIN_DEPTH} hops; treating anchor as unresolved"
                );
                return None;
            }
        }
    }
}
