// Marker clamping and symmetric mode.

use magnitude_core::{MagnitudeLevel, Marker, MarkerSet};

fn lvl(k: i64) -> MagnitudeLevel {
    MagnitudeLevel::new(k).unwrap()
}

const RAW: [f64; 9] = [
    0.0,
    0.7,
    -3.2,
    9.99,
    123.0,
    -1.0e30,
    f64::INFINITY,
    f64::NEG_INFINITY,
    f64::NAN,
];

#[test]
fn values_are_clamped_to_the_level_range() {
    for k in 0..=16 {
        let level = lvl(k);
        let r = level.half_range();
        for raw in RAW {
            for which in [Marker::A, Marker::B] {
                let mut m = MarkerSet::new(true, false);
                m.set(which, raw, level);
                let v = match which {
                    Marker::A => m.a(),
                    Marker::B => m.b().unwrap(),
                };
                assert!(v.abs() <= r, "k={k} raw={raw} v={v}");
                assert!(!v.is_nan());
            }
        }
    }
}

#[test]
fn non_finite_values_follow_documented_rules() {
    let level = lvl(2);
    let mut m = MarkerSet::new(true, false);
    m.set(Marker::A, f64::NAN, level);
    assert_eq!(m.a(), 0.0);
    m.set(Marker::A, f64::INFINITY, level);
    assert_eq!(m.a(), 100.0);
    m.set(Marker::B, f64::NEG_INFINITY, level);
    assert_eq!(m.b(), Some(-100.0));
}

#[test]
fn symmetric_mode_mirrors_after_every_mutation() {
    let level = lvl(3);
    let mut m = MarkerSet::new(true, true);
    for raw in RAW {
        m.set(Marker::A, raw, level);
        assert_eq!(m.b(), Some(-m.a()));
        m.set(Marker::B, raw, level);
        assert_eq!(m.a(), -m.b().unwrap());
        m.clamp_to(lvl(1));
        assert_eq!(m.b(), Some(-m.a()));
    }
}

#[test]
fn enabling_symmetry_derives_b_from_a() {
    let level = lvl(1);
    let mut m = MarkerSet::new(true, false);
    m.set(Marker::A, 4.0, level);
    m.set(Marker::B, 7.0, level);
    m.set_symmetric(true);
    assert_eq!(m.b(), Some(-4.0));
}

#[test]
fn hiding_b_leaves_symmetric_mode() {
    let mut m = MarkerSet::new(true, true);
    m.enable_second(false);
    assert_eq!(m.b(), None);
    assert!(!m.symmetric());
    m.enable_second(true);
    assert_eq!(m.b(), Some(0.0));
}

#[test]
fn side_counts_use_the_extreme_markers() {
    let level = lvl(4);
    let mut m = MarkerSet::new(true, false);
    m.set(Marker::A, 5500.0, level);
    m.set(Marker::B, 1200.0, level);
    // both positive: the negative side is empty
    assert_eq!(m.side_counts(level), [0, 5500]);
    m.set(Marker::B, -42.9, level);
    assert_eq!(m.side_counts(level), [42, 5500]);
}

#[test]
fn nearest_marker_picks_closest_value() {
    let level = lvl(1);
    let mut m = MarkerSet::new(true, false);
    m.set(Marker::A, 5.0, level);
    m.set(Marker::B, -5.0, level);
    assert_eq!(m.nearest(4.0), Marker::A);
    assert_eq!(m.nearest(-6.0), Marker::B);
    let single = MarkerSet::new(false, false);
    assert_eq!(single.nearest(-9.0), Marker::A);
}
