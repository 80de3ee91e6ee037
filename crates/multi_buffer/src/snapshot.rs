use crate::coordinates::{MultiBufferPoint, MultiBufferRow};
use crate::excerpt::{Excerpt, ExcerptId, ExcerptInfo};
use collections::HashMap;
use itertools::Itertools;
use parking_lot::Mutex;
use std::sync::Arc;
use text::{Bias, Buffer, BufferId, BufferPoint};

use crate::anchor::Anchor;

/// Where a unified point lands: which excerpt, which buffer, and the
/// corresponding buffer-local point.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BufferLocation {
    pub excerpt_id: ExcerptId,
    pub buffer_id: BufferId,
    pub point: BufferPoint,
}

/// Each entry is a row at which an excerpt begins, with its predecessor (if
/// any) and the excerpt that starts there.
#[derive(Clone, Debug)]
pub struct ExcerptBoundary {
    pub row: MultiBufferRow,
    pub prev: Option<ExcerptInfo>,
    pub next: ExcerptInfo,
}

/// An immutable snapshot of a [`crate::MultiBuffer`]: a frozen excerpt
/// list, frozen excerpt payloads, a live (Arc-shared) buffer map used only
/// to replay edits during anchor resolution, and a frozen replacement map.
#[derive(Clone)]
pub struct MultiBufferSnapshot {
    pub(crate) cache: Vec<ExcerptInfo>,
    pub(crate) excerpts: Vec<Excerpt>,
    pub(crate) index_by_id: HashMap<ExcerptId, usize>,
    pub(crate) line_count: usize,
    pub(crate) buffers: HashMap<BufferId, Arc<Mutex<Buffer>>>,
    pub(crate) replaced_excerpts: HashMap<ExcerptId, ExcerptId>,
}

impl MultiBufferSnapshot {
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    pub fn excerpts(&self) -> &[ExcerptInfo] {
        &self.cache
    }

    pub(crate) fn index_of_excerpt(&self, id: ExcerptId) -> Option<usize> {
        self.index_by_id.get(&id).copied()
    }

    /// Binary search over `cache` (ordered by `start_row`) for the excerpt
    /// whose `[start_row, end_row)` contains `row`.
    pub(crate) fn excerpt_index_at(&self, row: MultiBufferRow) -> Option<usize> {
        if self.cache.is_empty() {
            return None;
        }
        let idx = self.cache.partition_point(|info| info.start_row.0 <= row.0);
        if idx == 0 {
            return None;
        }
        let idx = idx - 1;
        if row.0 < self.cache[idx].end_row.0 {
            Some(idx)
        } else {
            None
        }
    }

    pub fn excerpt_at(&self, row: MultiBufferRow) -> Option<(&ExcerptInfo, &Excerpt)> {
        let idx = self.excerpt_index_at(row)?;
        Some((&self.cache[idx], &self.excerpts[idx]))
    }

    /// Locates the excerpt (and buffer) a unified point falls in, and the
    /// corresponding buffer-local point.
    ///
    /// Note: when `row` is an excerpt's synthetic trailing-newline row, the
    /// returned buffer point's row is one past the excerpt's last real
    /// line — which, if another excerpt over the same buffer begins there,
    /// is literally that excerpt's first line. This is intentional and not
    /// specially cased: it falls out of the plain translation arithmetic.
    pub fn to_buffer_point(&self, point: MultiBufferPoint) -> Option<BufferLocation> {
        let idx = self.excerpt_index_at(point.row)?;
        let info = &self.cache[idx];
        let buffer_row = info.range.context.start.0 + (point.row.0 - info.start_row.0);
        Some(BufferLocation {
            excerpt_id: info.id,
            buffer_id: info.buffer_id,
            point: BufferPoint::new(buffer_row, point.column),
        })
    }

    /// Inverse of [`Self::to_buffer_point`] for a specific excerpt. `None`
    /// if `point` falls outside that excerpt's buffer row range.
    pub fn to_multi_buffer_point(
        &self,
        excerpt_id: ExcerptId,
        point: BufferPoint,
    ) -> Option<MultiBufferPoint> {
        let idx = self.index_of_excerpt(excerpt_id)?;
        let info = &self.cache[idx];
        if point.row.0 < info.range.context.start.0 || point.row.0 >= info.range.context.end.0 {
            return None;
        }
        let row = info.start_row.0 + (point.row.0 - info.range.context.start.0);
        Some(MultiBufferPoint {
            row: MultiBufferRow(row),
            column: point.column,
        })
    }

    pub fn lines(&self, start_row: MultiBufferRow, end_row: MultiBufferRow) -> Vec<String> {
        let end_row = MultiBufferRow((end_row.0 as usize).min(self.line_count) as u32);
        if start_row.0 >= end_row.0 {
            return Vec::new();
        }
        let mut result = Vec::with_capacity((end_row.0 - start_row.0) as usize);
        let Some(mut idx) = self.excerpt_index_at(start_row) else {
            return result;
        };
        let mut row = start_row.0;
        while row < end_row.0 && idx < self.cache.len() {
            let info = &self.cache[idx];
            let excerpt = &self.excerpts[idx];
            let chunk_end = end_row.0.min(info.end_row.0);
            for r in row..chunk_end {
                if excerpt.has_trailing_newline && r == info.end_row.0 - 1 {
                    result.push(String::new());
                } else {
                    let buffer_row = info.range.context.start.0 + (r - info.start_row.0);
                    result.push(excerpt.buffer_snapshot.line(text::BufferRow(buffer_row)));
                }
            }
            row = chunk_end;
            idx += 1;
        }
        result
    }

    /// For `row >= line_count`, clamps to the last excerpt's last line's
    /// length; for the empty document, clamps to `(0, 0)`; otherwise clips
    /// the column through the owning excerpt's buffer snapshot.
    pub fn clip_point(&self, point: MultiBufferPoint, bias: Bias) -> MultiBufferPoint {
        if self.cache.is_empty() || self.line_count == 0 {
            return MultiBufferPoint::default();
        }
        if point.row.0 as usize >= self.line_count {
            let last_idx = self.cache.len() - 1;
            let info = &self.cache[last_idx];
            let excerpt = &self.excerpts[last_idx];
            let last_buffer_row = info.range.context.end.0.saturating_sub(1);
            let column = excerpt.buffer_snapshot.line_len(text::BufferRow(last_buffer_row));
            return MultiBufferPoint {
                row: MultiBufferRow((self.line_count - 1) as u32),
                column,
            };
        }
        let idx = self.excerpt_index_at(point.row).unwrap();
        let info = &self.cache[idx];
        let excerpt = &self.excerpts[idx];
        let buffer_row = (info.range.context.start.0 + (point.row.0 - info.start_row.0))
            .min(info.range.context.end.0.saturating_sub(1));
        let clipped = excerpt
            .buffer_snapshot
            .clip_point(BufferPoint::new(buffer_row, point.column), bias);
        MultiBufferPoint {
            row: point.row,
            column: clipped.column,
        }
    }

    pub fn excerpt_boundaries(
        &self,
        start_row: MultiBufferRow,
        end_row: MultiBufferRow,
    ) -> Vec<ExcerptBoundary> {
        std::iter::once(None)
            .chain(self.cache.iter().map(Some))
            .tuple_windows()
            .filter_map(|(prev, next)| {
                let next = next?;
                (next.start_row.0 >= start_row.0 && next.start_row.0 < end_row.0).then(|| {
                    ExcerptBoundary {
                        row: next.start_row,
                        prev: prev.cloned(),
                        next: next.clone(),
                    }
                })
            })
            .collect()
    }

    /// Translates `point` to a buffer point and records an anchor there, or
    /// `None` if `point` is out of range.
    pub fn create_anchor(&self, point: MultiBufferPoint, bias: Bias) -> Option<Anchor> {
        let location = self.to_buffer_point(point)?;
        let buffer = self.buffers.get(&location.buffer_id)?;
        let buffer = buffer.lock();
        let version = buffer.version();
        let offset = buffer.snapshot().point_to_offset(location.point);
        Some(Anchor {
            excerpt_id: location.excerpt_id,
            text_anchor: text::TextAnchor::new(offset.0, bias, version),
        })
    }
}
