//! The ordered composition of excerpts over one or more buffers, presented
//! as a single editable document: three-layer coordinate translation
//! (unified row → excerpt → buffer row), an editing proxy, and snapshots.

mod anchor;
mod coordinates;
mod excerpt;
mod snapshot;

pub use anchor::{Anchor, AnchorRange, Selection, SelectionHead};
pub use coordinates::{MultiBufferOffset, MultiBufferPoint, MultiBufferRow};
pub use excerpt::{Excerpt, ExcerptBufferRange, ExcerptError, ExcerptId, ExcerptInfo, ExcerptRange};
pub use snapshot::{BufferLocation, ExcerptBoundary, MultiBufferSnapshot};

use collections::HashMap;
use parking_lot::Mutex;
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::sync::Arc;
use text::{Buffer, BufferId};

/// One excerpt to add when replacing all of a buffer's excerpts in one
/// call (see [`MultiBuffer::set_excerpts_for_buffer`]).
#[derive(Clone, Copy, Debug)]
pub struct NewExcerpt {
    pub range: ExcerptRange,
    pub has_trailing_newline: bool,
}

/// Owns a slot map of live excerpts, their display order, a cache of
/// [`ExcerptInfo`] with cumulative unified-row positions, the buffers the
/// excerpts draw from, and the excerpt-replacement map anchors chase
/// through after `setExcerptsForBuffer`.
pub struct MultiBuffer {
    excerpts: SlotMap<ExcerptId, Excerpt>,
    order: Vec<ExcerptId>,
    cache: Vec<ExcerptInfo>,
    line_count: usize,
    buffers: HashMap<BufferId, Arc<Mutex<Buffer>>>,
    replaced_excerpts: HashMap<ExcerptId, ExcerptId>,
}

impl MultiBuffer {
    pub fn new() -> Self {
        MultiBuffer {
            excerpts: SlotMap::with_key(),
            order: Vec::new(),
            cache: Vec::new(),
            line_count: 0,
            buffers: HashMap::default(),
            replaced_excerpts: HashMap::default(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn excerpt_ids(&self) -> &[ExcerptId] {
        &self.order
    }

    pub fn add_excerpt(
        &mut self,
        buffer: Arc<Mutex<Buffer>>,
        range: ExcerptRange,
        has_trailing_newline: bool,
    ) -> Result<ExcerptId, ExcerptError> {
        let buffer_snapshot = buffer.lock().snapshot();
        let buffer_id = buffer_snapshot.id();
        let placeholder_id = self.excerpts.insert(Excerpt::placeholder(buffer_snapshot.clone()));
        match Excerpt::new(placeholder_id, buffer_snapshot, range, has_trailing_newline) {
            Ok(excerpt) => {
                self.excerpts[placeholder_id] = excerpt;
                self.order.push(placeholder_id);
                self.buffers.insert(buffer_id, buffer);
                self.rebuild_cache();
                log::debug!("added excerpt {placeholder_id:?} over buffer {buffer_id:?}");
                Ok(placeholder_id)
            }
            Err(err) => {
                self.excerpts.remove(placeholder_id);
                Err(err)
            }
        }
    }

    pub fn remove_excerpt(&mut self, id: ExcerptId) {
        if self.excerpts.remove(id).is_some() {
            self.order.retain(|&existing| existing != id);
            self.rebuild_cache();
            log::debug!("removed excerpt {id:?}");
        }
    }

    /// Atomically replaces every excerpt currently drawn from `buffer`
    /// with fresh ones built from `new_excerpts`, preserving their
    /// position in display order. When `new_excerpts` is non-empty, each
    /// displaced excerpt's id is recorded in the replacement map, pointing
    /// at the first of the new ids — anchors targeting a displaced excerpt
    /// resolve by following that chain. When `new_excerpts` is empty, the
    /// displaced ids get no successor and anchors against them become
    /// unresolvable.
    pub fn set_excerpts_for_buffer(
        &mut self,
        buffer: Arc<Mutex<Buffer>>,
        new_excerpts: Vec<NewExcerpt>,
    ) -> Result<Vec<ExcerptId>, ExcerptError> {
        let buffer_snapshot = buffer.lock().snapshot();
        let buffer_id = buffer_snapshot.id();
        let line_count = buffer_snapshot.line_count() as u32;
        for new_excerpt in &new_excerpts {
            if new_excerpt.range.context.end.0 > line_count {
                return Err(ExcerptError::RangeExceedsBufferLineCount {
                    end: new_excerpt.range.context.end.0,
                    line_count,
                });
            }
        }

        let old_ids: SmallVec<[ExcerptId; 4]> = self
            .order
            .iter()
            .copied()
            .filter(|id| {
                self.excerpts
                    .get(*id)
                    .map(|excerpt| excerpt.buffer_id == buffer_id)
                    .unwrap_or(false)
            })
            .collect();
        let insertion_index = old_ids
            .first()
            .and_then(|id| self.order.iter().position(|existing| existing == id))
            .unwrap_or(self.order.len());

        for id in &old_ids {
            self.excerpts.remove(*id);
        }
        self.order.retain(|id| !old_ids.contains(id));

        let mut new_ids = Vec::with_capacity(new_excerpts.len());
        for new_excerpt in &new_excerpts {
            let placeholder_id = self
                .excerpts
                .insert(Excerpt::placeholder(buffer_snapshot.clone()));
            let excerpt = Excerpt::new(
                placeholder_id,
                buffer_snapshot.clone(),
                new_excerpt.range,
                new_excerpt.has_trailing_newline,
            )
            .expect("range was validated against the buffer's line count above");
            self.excerpts[placeholder_id] = excerpt;
            new_ids.push(placeholder_id);
        }
        for (offset, id) in new_ids.iter().enumerate() {
            self.order.insert(insertion_index + offset, *id);
        }

        if let Some(&first_new_id) = new_ids.first() {
            for old_id in &old_ids {
                self.replaced_excerpts.insert(*old_id, first_new_id);
            }
        }

        self.buffers.insert(buffer_id, buffer);
        self.rebuild_cache();
        log::debug!(
            "replaced {} excerpt(s) over buffer {buffer_id:?} with {}",
            old_ids.len(),
            new_ids.len()
        );
        Ok(new_ids)
    }

    /// Recomputes `id`'s context as
    /// `[max(0, start - lines_before), min(line_count, end + lines_after))`
    /// against the buffer's current snapshot, keeping the same id.
    pub fn expand_excerpt(&mut self, id: ExcerptId, lines_before: u32, lines_after: u32) -> bool {
        let Some(excerpt) = self.excerpts.get(id) else {
            return false;
        };
        let Some(buffer) = self.buffers.get(&excerpt.buffer_id) else {
            return false;
        };
        let snapshot = buffer.lock().snapshot();
        let line_count = snapshot.line_count() as u32;

        let new_start = excerpt.range.context.start.0.saturating_sub(lines_before);
        let new_end = (excerpt.range.context.end.0 + lines_after).min(line_count);
        let mut range = excerpt.range;
        range.context = ExcerptBufferRange::new(new_start, new_end.max(new_start));
        let has_trailing_newline = excerpt.has_trailing_newline;

        let expanded = Excerpt::new(id, snapshot, range, has_trailing_newline)
            .expect("clamped range is always within the buffer's line count");
        self.excerpts[id] = expanded;
        self.rebuild_cache();
        true
    }

    pub fn create_anchor(&self, point: MultiBufferPoint, bias: text::Bias) -> Option<Anchor> {
        self.snapshot().create_anchor(point, bias)
    }

    /// Resolves both endpoints via the current snapshot, aborting silently
    /// (returning `false`, leaving state unchanged) if either is out of
    /// range or if they resolve to different excerpts — including two
    /// excerpts over the same buffer, which this editing proxy does not
    /// support.
    pub fn edit(&mut self, start: MultiBufferPoint, end: MultiBufferPoint, text: &str) -> bool {
        let snapshot = self.snapshot();
        let Some(start_loc) = snapshot.to_buffer_point(start) else {
            return false;
        };
        let Some(end_loc) = snapshot.to_buffer_point(end) else {
            return false;
        };
        if start_loc.excerpt_id != end_loc.excerpt_id {
            return false;
        }

        let buffer_id = start_loc.buffer_id;
        let Some(buffer) = self.buffers.get(&buffer_id).cloned() else {
            return false;
        };
        let edit_start_row = start_loc.point.row.0.min(end_loc.point.row.0);
        let line_delta;
        {
            let mut buffer = buffer.lock();
            let live_snapshot = buffer.snapshot();
            let old_line_count = live_snapshot.line_count() as i64;
            let start_offset = live_snapshot.point_to_offset(start_loc.point).0;
            let end_offset = live_snapshot.point_to_offset(end_loc.point).0;
            let (start_offset, end_offset) = (start_offset.min(end_offset), start_offset.max(end_offset));
            buffer.replace(start_offset, end_offset, text);
            line_delta = buffer.snapshot().line_count() as i64 - old_line_count;
        }
        self.refresh_excerpts_for_buffer(buffer_id, edit_start_row, line_delta);
        true
    }

    /// Rows at or before `edit_start_row` (the buffer row the triggering
    /// edit started on) are left alone; rows after it are shifted by
    /// `line_delta`, the signed change in the buffer's line count produced
    /// by that edit. A plain `min(line_count)` clamp is not enough here: it
    /// only ever shrinks a range, so an edit that *grows* the buffer (e.g.
    /// splitting a line in two) would leave an excerpt's `context.end`
    /// stuck at its pre-edit row and silently drop the newly revealed
    /// lines from view, and any other same-buffer excerpt positioned after
    /// the edit would keep pointing at rows that no longer mean what they
    /// used to.
    fn refresh_excerpts_for_buffer(&mut self, buffer_id: BufferId, edit_start_row: u32, line_delta: i64) {
        let Some(buffer) = self.buffers.get(&buffer_id) else {
            return;
        };
        let snapshot = buffer.lock().snapshot();
        let line_count = snapshot.line_count() as u32;
        let shift_row = |row: u32| -> u32 {
            if row > edit_start_row {
                (row as i64 + line_delta).max(0) as u32
            } else {
                row
            }
        };
        let ids: SmallVec<[ExcerptId; 4]> = self
            .excerpts
            .iter()
            .filter(|(_, excerpt)| excerpt.buffer_id == buffer_id)
            .map(|(id, _)| id)
            .collect();
        for id in ids {
            let excerpt = &self.excerpts[id];
            let mut range = excerpt.range;
            let new_start = shift_row(range.context.start.0).min(line_count);
            let new_end = shift_row(range.context.end.0).min(line_count).max(new_start);
            range.context = ExcerptBufferRange::new(new_start, new_end);
            range.primary.start.0 = shift_row(range.primary.start.0).clamp(new_start, new_end);
            range.primary.end.0 = shift_row(range.primary.end.0).clamp(new_start, new_end);
            let has_trailing_newline = excerpt.has_trailing_newline;
            let refreshed = Excerpt::new(id, snapshot.clone(), range, has_trailing_newline)
                .expect("clamped range is always within the buffer's line count");
            self.excerpts[id] = refreshed;
        }
        self.rebuild_cache();
        log::trace!(
            "refreshed excerpts over buffer {buffer_id:?} after an edit (line_delta={line_delta})"
        );
    }

    pub fn snapshot(&self) -> MultiBufferSnapshot {
        let excerpts: Vec<Excerpt> = self.order.iter().map(|id| self.excerpts[*id].clone()).collect();
        let index_by_id = self
            .order
            .iter()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();
        MultiBufferSnapshot {
            cache: self.cache.clone(),
            excerpts,
            index_by_id,
            line_count: self.line_count,
            buffers: self.buffers.clone(),
            replaced_excerpts: self.replaced_excerpts.clone(),
        }
    }

    /// Walks the display order, assigning each live excerpt a cumulative
    /// `start_row`/`end_row` in the unified row space.
    fn rebuild_cache(&mut self) {
        let mut cache = Vec::with_capacity(self.order.len());
        let mut row = 0u32;
        for &id in &self.order {
            let excerpt = &self.excerpts[id];
            let start_row = MultiBufferRow(row);
            row += excerpt.row_count();
            cache.push(ExcerptInfo {
                id,
                buffer_id: excerpt.buffer_id,
                range: excerpt.range,
                start_row,
                end_row: MultiBufferRow(row),
                has_trailing_newline: excerpt.has_trailing_newline,
            });
        }
        self.line_count = row as usize;
        self.cache = cache;
    }
}

impl Default for MultiBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests;
