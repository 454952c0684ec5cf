// Block count law, grid layout and the two field buffers.

use magnitude_core::constants::{BLOCKS_PER_SIDE, GRID_SIDE};
use magnitude_core::{
    block_count, DualField, FieldBuffer, FieldLayout, MagnitudeLevel, RippleField, RippleParams,
    Side, SlotId, TierBudget,
};
use glam::Vec2;

fn lvl(k: i64) -> MagnitudeLevel {
    MagnitudeLevel::new(k).unwrap()
}

#[test]
fn block_count_examples() {
    assert_eq!(block_count(lvl(4), 5500.0), 5500);
    assert_eq!(block_count(lvl(8), 55_000_000.0), 5500);
    assert_eq!(block_count(lvl(0), 0.7), 0);
    assert_eq!(block_count(lvl(1), -9.9), 9);
    assert_eq!(block_count(lvl(4), 10_000.0), 10_000);
    assert_eq!(block_count(lvl(5), 99_999.0), 9_999);
    assert_eq!(block_count(lvl(2), f64::NAN), 0);
    assert_eq!(block_count(lvl(16), -1.0e16), 10_000);
}

#[test]
fn block_count_law_holds_across_levels() {
    for k in 0..=16 {
        let level = lvl(k);
        let unit = 10f64.powi((k - 4).max(0) as i32);
        for frac in [0.0, 1e-9, 0.013, 0.5, 0.731, 1.0] {
            for sign in [-1.0, 1.0] {
                let v = sign * frac * level.half_range();
                let expected = ((v.trunc().abs() / unit).floor()).clamp(0.0, 10_000.0) as u32;
                assert_eq!(block_count(level, v), expected, "k={k} v={v}");
            }
        }
    }
}

#[test]
fn four_levels_fill_one_grid() {
    // a full range at level k is exactly one full grid once k >= 4
    for k in 4..=16 {
        let level = lvl(k);
        assert_eq!(block_count(level, level.half_range()), BLOCKS_PER_SIDE as u32);
    }
}

#[test]
fn layout_is_row_major_away_from_zero() {
    let layout = FieldLayout::build(1000, 700);
    assert_eq!(layout.blocks.len(), 2 * BLOCKS_PER_SIDE);
    for side in Side::BOTH {
        let base = side.base_index();
        let first = layout.blocks[base].local;
        let second = layout.blocks[base + 1].local;
        let next_row = layout.blocks[base + GRID_SIDE].local;
        assert_eq!(first.x.signum(), side.sign());
        assert!(second.x.abs() > first.x.abs());
        assert_eq!(second.y, first.y);
        assert_eq!(next_row.x, first.x);
        assert!(next_row.y > first.y);
    }
    // 11 vertical and 11 horizontal chunk lines per side
    assert_eq!(layout.chunk_lines.len(), 44);
}

#[test]
fn layout_fits_inside_the_viewport() {
    for (w, h) in [(320, 480), (1000, 700), (3840, 1200)] {
        let layout = FieldLayout::build(w, h);
        for b in &layout.blocks {
            let p = layout.center + b.local;
            assert!(p.x > 0.0 && p.x < w as f32, "{w}x{h} {p:?}");
            assert!(p.y > 0.0 && p.y < h as f32, "{w}x{h} {p:?}");
        }
    }
}

#[test]
fn ensure_layout_is_idempotent() {
    let mut buf = FieldBuffer::new(lvl(0), 800, 600);
    let rev = buf.revision();
    assert!(!buf.ensure_layout(800, 600));
    assert_eq!(buf.revision(), rev);
    assert!(buf.ensure_layout(1024, 768));
    assert_eq!(buf.revision(), rev + 1);
    assert!(!buf.ensure_layout(1024, 768));
    assert_eq!(buf.layout().width, 1024);
}

#[test]
fn incoming_slot_starts_from_what_is_shown() {
    let mut fields = DualField::new(lvl(2), 800, 600);
    let a = fields.active();
    fields.buffer_mut(a).set_target([3, 40]);
    fields.buffer_mut(a).snap();

    let b = fields.begin_incoming(lvl(3), [0, 4]);
    assert_eq!(b, a.other());
    assert_eq!(fields.incoming(), Some(b));
    assert_eq!(fields.buffer(b).shown(), [3.0, 40.0]);
    assert_eq!(fields.buffer(b).level(), lvl(3));

    fields.buffer_mut(b).interpolate(0.5);
    assert_eq!(fields.buffer(b).shown(), [1.5, 22.0]);

    fields.complete();
    assert_eq!(fields.active(), b);
    assert_eq!(fields.incoming(), None);
    assert_eq!(fields.buffer(b).shown(), [0.0, 4.0]);
}

#[test]
fn replacing_a_transition_promotes_the_incoming_slot() {
    let mut fields = DualField::new(lvl(0), 800, 600);
    let first = fields.begin_incoming(lvl(1), [0, 5]);
    fields.buffer_mut(first).interpolate(0.4);
    let second = fields.begin_incoming(lvl(2), [0, 0]);
    assert_eq!(fields.active(), first);
    assert_eq!(second, first.other());
    assert_eq!(fields.buffer(second).shown(), [0.0, 2.0]);
    assert_eq!(SlotId::A.other().other(), SlotId::A);
}

#[test]
fn ripple_deformation_is_bounded_and_resets() {
    let mut buf = FieldBuffer::new(lvl(3), 1000, 700);
    let params = RippleParams::default();
    let (lo, hi) = params.scale_bounds();
    let mut ripples = RippleField::new(params);
    let center = buf.layout().center;
    ripples.spawn_mirrored(center + Vec2::new(-150.0, 30.0), center.x, 0.0);

    let budget = TierBudget::default();
    let mut deformed_any = false;
    for i in 0..40 {
        let t = i as f64 * 0.025;
        buf.apply_ripples(&ripples, t, 1.0, &budget);
        deformed_any |= buf.is_deformed();
        for (inst, block) in buf.instances().iter().zip(&buf.layout().blocks) {
            assert!(inst.scale > 0.0);
            assert!(inst.scale >= block.base_scale * lo - 1e-6);
            assert!(inst.scale <= block.base_scale * hi + 1e-6);
        }
    }
    assert!(deformed_any);

    buf.apply_ripples(&RippleField::new(params), 1.0, 1.0, &budget);
    assert!(!buf.is_deformed());
    for (inst, block) in buf.instances().iter().zip(&buf.layout().blocks) {
        assert_eq!(inst.scale, block.base_scale);
    }
}

#[test]
fn reset_deformation_restores_resting_scale() {
    let mut buf = FieldBuffer::new(lvl(3), 1000, 700);
    let mut ripples = RippleField::new(RippleParams::default());
    let center = buf.layout().center;
    ripples.spawn_mirrored(center, center.x, 0.0);
    buf.apply_ripples(&ripples, 0.2, 1.0, &TierBudget::default());
    assert!(buf.is_deformed());
    let rev = buf.revision();
    buf.reset_deformation();
    assert!(!buf.is_deformed());
    assert!(buf.revision() > rev);
    assert!(buf
        .instances()
        .iter()
        .zip(&buf.layout().blocks)
        .all(|(i, b)| i.scale == b.base_scale));
}
