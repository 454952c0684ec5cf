// Ripple mirroring, pruning and boundedness.

use glam::Vec2;
use magnitude_core::{RippleField, RippleParams};

#[test]
fn spawns_a_mirrored_pair() {
    let mut f = RippleField::new(RippleParams::default());
    f.spawn_mirrored(Vec2::new(100.0, 50.0), 400.0, 1.0);
    let xs: Vec<f32> = f.ripples().iter().map(|r| r.origin.x).collect();
    assert_eq!(xs, vec![100.0, 700.0]);
    assert!(f.ripples().iter().all(|r| r.origin.y == 50.0 && r.start_sec == 1.0));
}

#[test]
fn a_ripple_on_the_zero_line_is_not_doubled() {
    let mut f = RippleField::new(RippleParams::default());
    f.spawn_mirrored(Vec2::new(400.3, 10.0), 400.0, 0.0);
    assert_eq!(f.ripples().len(), 1);
}

#[test]
fn live_list_is_bounded_and_drops_oldest() {
    let params = RippleParams::default();
    let mut f = RippleField::new(params);
    for i in 0..20 {
        f.spawn_mirrored(Vec2::new(10.0 * i as f32, 0.0), 500.0, i as f64);
        assert!(f.ripples().len() <= params.max_live);
    }
    assert_eq!(f.ripples().last().map(|r| r.start_sec), Some(19.0));
}

#[test]
fn prune_drops_old_ripples() {
    let params = RippleParams::default();
    let mut f = RippleField::new(params);
    f.spawn_mirrored(Vec2::new(100.0, 100.0), 300.0, 0.0);
    f.prune(0.1);
    assert!(f.is_live());
    f.prune(params.max_age_sec as f64 + 0.1);
    assert!(!f.is_live());
}

#[test]
fn wave_is_zero_away_from_the_wavefront() {
    let mut f = RippleField::new(RippleParams::default());
    f.spawn_mirrored(Vec2::ZERO, 0.0, 0.0);
    // far outside the band at t = 0.1
    assert_eq!(f.wave_at(Vec2::new(2000.0, 0.0), 0.1), 0.0);
    let r = f.wavefront_radius(&f.ripples()[0], 0.5);
    let (inner, outer) = f.band(&f.ripples()[0], 0.5);
    assert!(inner < r && r < outer);
    assert!(f.wave_at(Vec2::new(r, 0.0), 0.5).abs() > 0.0);
}

#[test]
fn wave_and_scale_stay_bounded() {
    let params = RippleParams::default();
    let (lo, hi) = params.scale_bounds();
    assert!(lo > 0.0 && hi < 2.0);
    let mut f = RippleField::new(params);
    // stack several ripples on nearly the same spot
    for i in 0..4 {
        f.spawn_mirrored(Vec2::new(200.0 + i as f32, 300.0), 500.0, 0.0);
    }
    for ti in 0..30 {
        let t = ti as f64 * 0.05;
        for xi in 0..50 {
            for yi in 0..10 {
                let p = Vec2::new(xi as f32 * 20.0, yi as f32 * 60.0);
                let w = f.wave_at(p, t);
                assert!((-1.0..=1.0).contains(&w), "wave {w} at {p:?} t={t}");
                let s = f.scale_factor(w);
                assert!(s >= lo && s <= hi && s > 0.0);
            }
        }
    }
}

#[test]
fn excessive_gain_is_capped() {
    let params = RippleParams {
        scale_gain: 5.0,
        ..RippleParams::default()
    };
    let f = RippleField::new(params);
    assert!(f.scale_factor(-1.0) > 0.0);
    assert!(f.scale_factor(1.0) < 2.0);
}

#[test]
fn non_finite_points_spawn_nothing() {
    let mut f = RippleField::new(RippleParams::default());
    for p in [
        Vec2::new(f32::NAN, 10.0),
        Vec2::new(10.0, f32::NAN),
        Vec2::new(f32::INFINITY, 10.0),
        Vec2::new(10.0, f32::NEG_INFINITY),
    ] {
        f.spawn_mirrored(p, 400.0, 0.0);
    }
    f.spawn_mirrored(Vec2::new(10.0, 10.0), 400.0, f64::NAN);
    assert!(!f.is_live());

    // a broken mirror axis still keeps the real ripple
    f.spawn_mirrored(Vec2::new(10.0, 10.0), f32::NAN, 0.0);
    assert_eq!(f.ripples().len(), 1);
    assert_eq!(f.scale_factor(f32::NAN), 1.0);
}
