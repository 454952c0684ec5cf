// Host-side tests for pure input functions.
// The main crate is wasm-only, so we include the pure-Rust modules directly.

#![allow(dead_code)]
mod constants {
    include!("../src/constants.rs");
}
mod input {
    include!("../src/input.rs");
}

use constants::*;
use glam::Vec2;
use input::*;
use magnitude_core::Marker;

#[test]
fn css_to_backing_scales_by_device_ratio() {
    let px = css_to_backing(Vec2::new(50.0, 20.0), Vec2::new(200.0, 100.0), Vec2::new(400.0, 200.0));
    assert_eq!(px, Some(Vec2::new(100.0, 40.0)));
}

#[test]
fn css_to_backing_rejects_empty_rect() {
    assert!(css_to_backing(Vec2::ONE, Vec2::new(0.0, 100.0), Vec2::splat(100.0)).is_none());
    assert!(css_to_backing(Vec2::ONE, Vec2::new(100.0, -1.0), Vec2::splat(100.0)).is_none());
}

#[test]
fn inside_rect_includes_edges() {
    let size = Vec2::new(300.0, 150.0);
    assert!(inside_rect(Vec2::ZERO, size));
    assert!(inside_rect(size, size));
    assert!(!inside_rect(Vec2::new(-0.1, 10.0), size));
    assert!(!inside_rect(Vec2::new(10.0, 150.1), size));
}

#[test]
fn press_and_release_in_place_is_a_tap() {
    let mut g = PointerGesture::default();
    g.down(Vec2::new(10.0, 10.0), Marker::A);
    assert!(g.is_pressed());
    // jitter below the drag threshold
    assert_eq!(g.moved(Vec2::new(11.0, 10.0), Vec2::new(22.0, 20.0)), GestureAction::None);
    let up = g.up(Vec2::new(22.0, 20.0));
    assert_eq!(up, GestureAction::Tap { at: Vec2::new(22.0, 20.0) });
    assert!(!g.is_pressed());
}

#[test]
fn drag_moves_the_pressed_marker_and_spaces_ripples() {
    let mut g = PointerGesture::default();
    g.down(Vec2::ZERO, Marker::B);

    let first = g.moved(Vec2::new(DRAG_THRESHOLD_PX, 0.0), Vec2::new(100.0, 50.0));
    assert_eq!(
        first,
        GestureAction::Drag {
            marker: Marker::B,
            x: 100.0,
            ripple: Some(Vec2::new(100.0, 50.0)),
        }
    );

    // close to the last ripple: drag continues without a new one
    let near = g.moved(Vec2::new(10.0, 0.0), Vec2::new(110.0, 50.0));
    assert_eq!(
        near,
        GestureAction::Drag {
            marker: Marker::B,
            x: 110.0,
            ripple: None,
        }
    );

    let far_x = 100.0 + DRAG_RIPPLE_SPACING_PX + 1.0;
    match g.moved(Vec2::new(40.0, 0.0), Vec2::new(far_x, 50.0)) {
        GestureAction::Drag { ripple, .. } => assert_eq!(ripple, Some(Vec2::new(far_x, 50.0))),
        other => panic!("expected drag, got {:?}", other),
    }

    // releasing after a drag is not a tap
    assert_eq!(g.up(Vec2::new(far_x, 50.0)), GestureAction::None);
}

#[test]
fn moves_without_a_press_do_nothing() {
    let mut g = PointerGesture::default();
    assert_eq!(g.moved(Vec2::splat(50.0), Vec2::splat(50.0)), GestureAction::None);
    assert_eq!(g.up(Vec2::splat(50.0)), GestureAction::None);
}

#[test]
fn cancel_drops_the_press() {
    let mut g = PointerGesture::default();
    g.down(Vec2::ZERO, Marker::A);
    g.cancel();
    assert_eq!(g.up(Vec2::ZERO), GestureAction::None);
}

#[test]
fn wheel_delta_modes_convert_to_pixels() {
    assert_eq!(wheel_delta_px(3.0, 0), 3.0);
    assert_eq!(wheel_delta_px(3.0, 1), 3.0 * WHEEL_LINE_PX);
    assert_eq!(wheel_delta_px(-1.0, 2), -WHEEL_PAGE_PX);
}

#[test]
fn wheel_accumulates_to_whole_steps() {
    let mut acc = WheelAccumulator::default();
    let small = WHEEL_STEP_PX * 0.4;
    assert_eq!(acc.push(small), 0);
    assert_eq!(acc.push(small), 0);
    assert_eq!(acc.push(small), 1);
    assert_eq!(acc.push(WHEEL_STEP_PX * 2.0), 2);
    assert_eq!(acc.push(f64::NAN), 0);
}

#[test]
fn wheel_direction_change_drops_leftover() {
    let mut acc = WheelAccumulator::default();
    assert_eq!(acc.push(WHEEL_STEP_PX * 0.9), 0);
    // without the reset this would need 1.9 steps to register
    assert_eq!(acc.push(-WHEEL_STEP_PX), -1);
}
