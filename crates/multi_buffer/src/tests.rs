use super::*;
use pretty_assertions::assert_eq;
use rand::prelude::*;
use std::sync::Arc;
use text::Bias;

#[ctor::ctor]
fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn buffer(text: &str) -> Arc<Mutex<Buffer>> {
    Arc::new(Mutex::new(Buffer::new(text)))
}

fn excerpt_range(start: u32, end: u32) -> ExcerptRange {
    ExcerptRange {
        context: ExcerptBufferRange::new(start, end),
        primary: ExcerptBufferRange::new(start, end),
    }
}

#[test]
fn line_counts_add_up_across_excerpts() {
    let mut multi = MultiBuffer::new();
    let a = buffer("a\nb\nc\nd\n");
    let b = buffer("1\n2\n3\n");
    multi.add_excerpt(a, excerpt_range(0, 2), false).unwrap();
    multi.add_excerpt(b, excerpt_range(0, 3), false).unwrap();
    assert_eq!(multi.line_count(), 5);
}

#[test]
fn excerpts_are_contiguous_in_unified_rows() {
    let mut multi = MultiBuffer::new();
    let a = buffer("a\nb\nc\nd\n");
    multi.add_excerpt(a.clone(), excerpt_range(0, 2), false).unwrap();
    multi.add_excerpt(a, excerpt_range(2, 4), false).unwrap();
    let snapshot = multi.snapshot();
    let infos = snapshot.excerpts();
    assert_eq!(infos[0].start_row, MultiBufferRow(0));
    assert_eq!(infos[0].end_row, MultiBufferRow(2));
    assert_eq!(infos[1].start_row, MultiBufferRow(2));
    assert_eq!(infos[1].end_row, MultiBufferRow(4));
}

#[test]
fn to_buffer_point_and_back_roundtrips_within_an_excerpt() {
    let mut multi = MultiBuffer::new();
    let a = buffer("alpha\nbeta\ngamma\n");
    let id = multi.add_excerpt(a, excerpt_range(0, 3), false).unwrap();
    let snapshot = multi.snapshot();

    let point = MultiBufferPoint::new(1, 2);
    let location = snapshot.to_buffer_point(point).unwrap();
    assert_eq!(location.excerpt_id, id);
    assert_eq!(location.point, text::BufferPoint::new(1, 2));

    let back = snapshot.to_multi_buffer_point(id, location.point).unwrap();
    assert_eq!(back, point);
}

#[test]
fn synthetic_trailing_newline_row_maps_into_the_next_same_buffer_excerpt() {
    // This reproduces a documented, intentional asymmetry: the synthetic
    // row falls out of plain arithmetic landing on the next excerpt's
    // first buffer row, rather than being special-cased back to `None`.
    let mut multi = MultiBuffer::new();
    let a = buffer("one\ntwo\nthree\nfour\n");
    let first = multi.add_excerpt(a.clone(), excerpt_range(0, 2), true).unwrap();
    multi.add_excerpt(a, excerpt_range(2, 4), false).unwrap();
    let snapshot = multi.snapshot();

    let first_info = snapshot.excerpts()[0].clone();
    let synthetic_row = MultiBufferRow(first_info.end_row.0 - 1);
    let location = snapshot.to_buffer_point(MultiBufferPoint { row: synthetic_row, column: 0 }).unwrap();
    assert_eq!(location.excerpt_id, first);
    assert_eq!(location.point.row, text::BufferRow(2));

    // The inverse does NOT hold for this row: that buffer row resolves
    // against the *second* excerpt, not the first.
    assert!(snapshot
        .to_multi_buffer_point(first, location.point)
        .is_none());
    assert_eq!(
        snapshot
            .to_multi_buffer_point(multi.excerpt_ids()[1], location.point)
            .unwrap()
            .row,
        MultiBufferRow(first_info.end_row.0)
    );
}

#[test]
fn anchor_resolves_through_edits_in_the_underlying_buffer() {
    let mut multi = MultiBuffer::new();
    let a = buffer("hello world\n");
    multi.add_excerpt(a.clone(), excerpt_range(0, 1), false).unwrap();

    let anchor = multi
        .create_anchor(MultiBufferPoint::new(0, 6), Bias::Right)
        .unwrap();
    a.lock().insert(0, "say ");
    multi.refresh_excerpts_for_buffer(a.lock().id(), 0, 0);

    let resolved = multi.snapshot().resolve_anchor(anchor).unwrap();
    assert_eq!(resolved, MultiBufferPoint::new(0, 10));
}

#[test]
fn anchor_survives_set_excerpts_for_buffer_replacement() {
    let mut multi = MultiBuffer::new();
    let a = buffer("alpha\nbeta\ngamma\n");
    multi.add_excerpt(a.clone(), excerpt_range(0, 3), false).unwrap();

    let anchor = multi
        .create_anchor(MultiBufferPoint::new(1, 2), Bias::Left)
        .unwrap();

    let new_ids = multi
        .set_excerpts_for_buffer(
            a,
            vec![NewExcerpt {
                range: excerpt_range(0, 3),
                has_trailing_newline: false,
            }],
        )
        .unwrap();
    assert_eq!(new_ids.len(), 1);

    let resolved = multi.snapshot().resolve_anchor(anchor).unwrap();
    assert_eq!(resolved, MultiBufferPoint::new(1, 2));
}

#[test]
fn anchor_becomes_unresolvable_once_its_buffer_loses_all_excerpts() {
    let mut multi = MultiBuffer::new();
    let a = buffer("alpha\nbeta\n");
    multi.add_excerpt(a.clone(), excerpt_range(0, 2), false).unwrap();
    let anchor = multi
        .create_anchor(MultiBufferPoint::new(0, 1), Bias::Left)
        .unwrap();

    multi.set_excerpts_for_buffer(a, Vec::new()).unwrap();

    assert!(multi.snapshot().resolve_anchor(anchor).is_none());
}

#[test]
fn anchor_at_delete_end_clamps_to_delete_start_for_both_biases() {
    let mut multi = MultiBuffer::new();
    let a = buffer("0123456789\n");
    multi.add_excerpt(a.clone(), excerpt_range(0, 1), false).unwrap();

    let left = multi
        .create_anchor(MultiBufferPoint::new(0, 10), Bias::Left)
        .unwrap();
    let right = multi
        .create_anchor(MultiBufferPoint::new(0, 10), Bias::Right)
        .unwrap();

    a.lock().delete(2, 10);
    multi.refresh_excerpts_for_buffer(a.lock().id(), 0, 0);

    let snapshot = multi.snapshot();
    assert_eq!(
        snapshot.resolve_anchor(left).unwrap(),
        snapshot.resolve_anchor(right).unwrap()
    );
    assert_eq!(snapshot.resolve_anchor(left).unwrap(), MultiBufferPoint::new(0, 2));
}

#[test]
fn expand_excerpt_clamps_to_buffer_bounds() {
    let mut multi = MultiBuffer::new();
    let a = buffer("a\nb\nc\nd\ne\n");
    let id = multi.add_excerpt(a, excerpt_range(2, 3), false).unwrap();
    assert!(multi.expand_excerpt(id, 10, 10));
    let snapshot = multi.snapshot();
    let info = &snapshot.excerpts()[0];
    assert_eq!(info.range.context.start, text::BufferRow(0));
    assert_eq!(info.range.context.end, text::BufferRow(5));
}

#[test]
fn removing_an_excerpt_shrinks_the_unified_line_count() {
    let mut multi = MultiBuffer::new();
    let a = buffer("a\nb\n");
    let b = buffer("x\ny\nz\n");
    multi.add_excerpt(a, excerpt_range(0, 2), false).unwrap();
    let id_b = multi.add_excerpt(b, excerpt_range(0, 3), false).unwrap();
    assert_eq!(multi.line_count(), 5);
    multi.remove_excerpt(id_b);
    assert_eq!(multi.line_count(), 2);
}

#[test]
fn edit_through_the_multi_buffer_rewrites_the_underlying_buffer() {
    let mut multi = MultiBuffer::new();
    let a = buffer("hello world\n");
    multi.add_excerpt(a.clone(), excerpt_range(0, 1), false).unwrap();

    let edited = multi.edit(
        MultiBufferPoint::new(0, 6),
        MultiBufferPoint::new(0, 11),
        "rust",
    );
    assert!(edited);
    assert_eq!(a.lock().snapshot().text(), "hello rust\n");
}

#[test]
fn insert_newline_through_multi_buffer_grows_the_excerpt() {
    let mut multi = MultiBuffer::new();
    let a = buffer("HelloWorld\nExtra");
    multi.add_excerpt(a.clone(), excerpt_range(0, 2), false).unwrap();

    let edited = multi.edit(MultiBufferPoint::new(0, 5), MultiBufferPoint::new(0, 5), "\n");
    assert!(edited);

    assert_eq!(multi.line_count(), 3);
    let snapshot = multi.snapshot();
    assert_eq!(
        snapshot.lines(MultiBufferRow(0), MultiBufferRow(3)),
        vec!["Hello".to_string(), "World".to_string(), "Extra".to_string()]
    );
}

#[test]
fn growing_one_excerpt_shifts_a_later_same_buffer_excerpt() {
    let mut multi = MultiBuffer::new();
    let a = buffer("a\nb\nc\nd\n");
    multi.add_excerpt(a.clone(), excerpt_range(0, 1), false).unwrap();
    let second = multi.add_excerpt(a, excerpt_range(1, 4), false).unwrap();

    // Splits row 0 ("a") into two rows ("a", "x"); every buffer row at or
    // after row 1 shifts down by one.
    let edited = multi.edit(MultiBufferPoint::new(0, 1), MultiBufferPoint::new(0, 1), "\nx");
    assert!(edited);

    let snapshot = multi.snapshot();
    let second_info = snapshot
        .excerpts()
        .iter()
        .find(|info| info.id == second)
        .unwrap();
    assert_eq!(second_info.range.context.start, text::BufferRow(2));
    assert_eq!(second_info.range.context.end, text::BufferRow(5));
    assert_eq!(multi.line_count(), 5);
}

#[test]
fn randomized_edits_through_multi_buffer_preserve_invariants() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut multi = MultiBuffer::new();
    let a = buffer("line one\nline two\nline three\n");
    multi.add_excerpt(a.clone(), excerpt_range(0, 3), false).unwrap();

    for _ in 0..200 {
        let line_count = multi.line_count() as u32;
        let choice: u8 = rng.gen_range(0..3);
        let edited = match choice {
            0 => {
                // Insert a short, possibly multi-line snippet at a random
                // row/col — exercises both growing and non-growing edits.
                let row = rng.gen_range(0..line_count);
                let col = multi
                    .snapshot()
                    .lines(MultiBufferRow(row), MultiBufferRow(row + 1))
                    .first()
                    .map(|line| line.len() as u32)
                    .unwrap_or(0);
                let col = if col == 0 { 0 } else { rng.gen_range(0..=col) };
                let point = MultiBufferPoint::new(row, col);
                let insertion: String = (0..rng.gen_range(1..5))
                    .map(|_| if rng.gen_bool(0.3) { '\n' } else { 'x' })
                    .collect();
                multi.edit(point, point, &insertion)
            }
            1 => {
                // Delete a short run of whole rows, shrinking the excerpt.
                let start = rng.gen_range(0..line_count);
                let end = (start + rng.gen_range(0..3)).min(line_count.saturating_sub(1));
                multi.edit(
                    MultiBufferPoint::new(start, 0),
                    MultiBufferPoint::new(end, 0),
                    "",
                )
            }
            _ => multi.edit(MultiBufferPoint::new(0, 0), MultiBufferPoint::new(0, 0), ""),
        };
        assert!(edited, "every edit in this test targets the buffer's single excerpt");

        let snapshot = multi.snapshot();
        let infos = snapshot.excerpts();
        let summed: u32 = infos.iter().map(|info| info.end_row.0 - info.start_row.0).sum();
        assert_eq!(summed as usize, multi.line_count());
        for pair in infos.windows(2) {
            assert_eq!(pair[0].end_row, pair[1].start_row);
        }
        assert_eq!(infos[0].start_row, MultiBufferRow(0));
        assert_eq!(
            infos[0].range.context.end.0 - infos[0].range.context.start.0,
            a.lock().snapshot().line_count() as u32,
            "the single excerpt spanning the whole buffer must always track its line count"
        );
    }
}

#[test]
fn edit_spanning_two_excerpts_is_rejected() {
    let mut multi = MultiBuffer::new();
    let a = buffer("alpha\nbeta\n");
    multi.add_excerpt(a.clone(), excerpt_range(0, 1), false).unwrap();
    multi.add_excerpt(a, excerpt_range(1, 2), false).unwrap();

    let edited = multi.edit(
        MultiBufferPoint::new(0, 0),
        MultiBufferPoint::new(1, 0),
        "x",
    );
    assert!(!edited);
}

#[test]
fn stale_excerpt_id_is_rejected_after_removal_and_reinsertion() {
    let mut multi = MultiBuffer::new();
    let a = buffer("a\nb\n");
    let id = multi.add_excerpt(a.clone(), excerpt_range(0, 2), false).unwrap();
    multi.remove_excerpt(id);
    let new_id = multi.add_excerpt(a, excerpt_range(0, 2), false).unwrap();

    assert_ne!(id, new_id);
    assert!(multi.snapshot().excerpt_at(MultiBufferRow(0)).is_some());
    assert_eq!(
        multi.snapshot().index_of_excerpt(id),
        None,
        "a removed excerpt's id must not resolve even if its slot was reused"
    );
}
