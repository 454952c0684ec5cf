// Whole-engine behavior driven through frames at synthetic timestamps.

use magnitude_core::{
    BackendKind, CapabilityTier, CoreError, EngineConfig, FieldEngine, Marker, Palette, SlotId,
};

const DT: f64 = 1.0 / 60.0;

fn engine() -> FieldEngine {
    FieldEngine::new(EngineConfig::default(), 1000, 700, CapabilityTier::Full).unwrap()
}

fn engine_with(config: EngineConfig) -> FieldEngine {
    FieldEngine::new(config, 1000, 700, CapabilityTier::Full).unwrap()
}

/// Run frames until nothing is animating; leaves `now` at the last frame.
fn settle(e: &mut FieldEngine, now: &mut f64) {
    for _ in 0..10_000 {
        e.frame(*now);
        if !e.is_animating() {
            return;
        }
        *now += DT;
    }
    panic!("engine never settled");
}

fn assert_markers_in_range(e: &FieldEngine) {
    let r = e.level().half_range();
    assert!(e.markers().a().abs() <= r, "a {} outside ±{r}", e.markers().a());
    if let Some(b) = e.markers().b() {
        assert!(b.abs() <= r, "b {b} outside ±{r}");
    }
}

#[test]
fn zoom_out_from_level_zero() {
    let mut e = engine();
    assert!(e.frame(0.0));
    e.set_value(Marker::A, 0.7);
    assert_eq!(e.markers().b(), Some(-0.7));

    e.bump_level(1);
    assert!(e.frame(0.1));
    let t = e.transition().expect("transition started");
    assert_eq!((t.from_level.get(), t.to_level.get()), (0, 1));
    assert_eq!(e.level().get(), 1);
    assert_eq!(e.mapping().range(), (-10.0, 10.0));
    assert_eq!(e.markers().a(), 0.7);
    assert_eq!(e.markers().b(), Some(-0.7));
    assert_eq!(e.plan().layers.len(), 2);

    assert!(e.frame(0.1 + 0.42 + 0.01));
    assert!(e.transition().is_none());
    let layers = &e.plan().layers;
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].scale, 1.0);
    assert_eq!(layers[0].alpha, 1.0);
    assert_eq!(layers[0].shown, [0.0, 0.0]);
    assert!(!e.is_animating());
    assert!(!e.frame(0.6));
}

#[test]
fn layers_stay_one_order_of_magnitude_apart() {
    for (initial, delta, ratio) in [(0u8, 1i64, 10.0f32), (3, -1, 0.1)] {
        let mut e = engine_with(EngineConfig {
            initial_level: initial,
            ..EngineConfig::default()
        });
        e.bump_level(delta);
        assert!(e.frame(0.0));
        let layers = e.plan().layers.clone();
        assert!((layers[0].scale - 1.0).abs() < 1e-6);
        assert!((layers[1].scale - ratio).abs() < 1e-5 * ratio.max(1.0));

        for t in [0.05, 0.1, 0.2, 0.3, 0.4] {
            assert!(e.frame(t));
            let layers = &e.plan().layers;
            assert_eq!(layers.len(), 2, "t={t}");
            let got = layers[1].scale / layers[0].scale;
            assert!((got - ratio).abs() < 1e-4 * ratio.max(1.0), "t={t} ratio {got}");
            assert!((layers[0].alpha + layers[1].alpha - 1.0).abs() < 1e-6);
        }
    }
}

#[test]
fn replaced_transitions_continue_from_the_drawn_state() {
    let mut e = engine();
    let mut now = 0.0;
    e.frame(now);
    e.set_target_level(3);

    let mut prev: Vec<(SlotId, u8, f32, f32)> = Vec::new();
    let mut replaced = 0;
    for _ in 0..10_000 {
        now += DT;
        e.frame(now);
        if e.transition().is_some_and(|t| t.from_scale != 1.0) {
            replaced += 1;
        }
        let layers = &e.plan().layers;
        if layers.len() == 2 {
            let got = layers[1].scale / layers[0].scale;
            assert!((got - 10.0).abs() < 1e-2, "t={now} ratio {got}");
        }
        let cur: Vec<(SlotId, u8, f32, f32)> = layers
            .iter()
            .map(|l| (l.slot, e.fields().buffer(l.slot).level().get(), l.scale, l.alpha))
            .collect();
        for &(slot, level, scale, alpha) in &cur {
            // a reused slot shows new content, so only same-level buffers must be continuous
            let Some(&(_, _, ps, pa)) = prev.iter().find(|p| p.0 == slot && p.1 == level) else {
                continue;
            };
            let jump = (scale / ps).max(ps / scale);
            assert!(jump <= 1.5, "t={now} {slot:?} scale {ps} -> {scale}");
            assert!((alpha - pa).abs() <= 0.25, "t={now} {slot:?} alpha {pa} -> {alpha}");
        }
        prev = cur;
        if !e.is_animating() {
            break;
        }
    }
    assert!(replaced > 0);
    assert_eq!(e.level().get(), 3);
    assert!(e.transition().is_none());
}

#[test]
fn non_finite_ripple_points_are_ignored() {
    let mut e = engine();
    let mut now = 0.0;
    settle(&mut e, &mut now);

    e.notify_ripple(f32::NAN, 100.0, now);
    e.notify_ripple(200.0, f32::INFINITY, now);
    assert!(!e.ripples().is_live());
    now += 0.1;
    e.frame(now);
    for layer in &e.plan().layers {
        for inst in e.fields().buffer(layer.slot).instances() {
            assert!(inst.scale.is_finite());
        }
    }
}

#[test]
fn markers_follow_the_range_down() {
    let mut e = engine();
    let mut now = 0.0;
    e.set_target_level(5);
    settle(&mut e, &mut now);
    assert_eq!(e.level().get(), 5);

    e.set_value(Marker::A, 54_321.0);
    assert_eq!(e.markers().b(), Some(-54_321.0));

    e.set_target_level(2);
    for _ in 0..10_000 {
        now += DT;
        e.frame(now);
        assert_markers_in_range(&e);
        if !e.is_animating() {
            break;
        }
    }
    assert_eq!(e.level().get(), 2);
    assert_eq!(e.markers().a(), 100.0);
    assert_eq!(e.markers().b(), Some(-100.0));
    let active = e.fields().active();
    assert_eq!(e.fields().buffer(active).target(), [100, 100]);
}

#[test]
fn every_intermediate_level_is_visited() {
    let mut e = engine_with(EngineConfig {
        step_mode: false,
        ..EngineConfig::default()
    });
    e.set_target_level(3);
    let mut seen = Vec::new();
    let mut now = 0.0;
    for _ in 0..3 {
        assert!(e.frame(now));
        seen.push(e.level().get());
        let t = e.transition().expect("transition in flight");
        assert_eq!(t.to_level, e.level());
        assert_eq!(t.start_sec, now);
        now += DT;
    }
    assert_eq!(seen, vec![1, 2, 3]);

    settle(&mut e, &mut now);
    assert!(e.transition().is_none());
    assert_eq!(e.plan().layers.len(), 1);
    assert_eq!(e.plan().layers[0].scale, 1.0);
}

#[test]
fn level_requests_respect_configured_bounds() {
    let mut e = engine_with(EngineConfig {
        initial_level: 3,
        min_level: 2,
        max_level: 6,
        ..EngineConfig::default()
    });
    e.set_target_level(100);
    assert_eq!(e.target_level().get(), 6);
    e.set_target_level(-5);
    assert_eq!(e.target_level().get(), 2);
    e.bump_level(-1);
    assert_eq!(e.target_level().get(), 2);
    e.bump_level(7);
    assert_eq!(e.target_level().get(), 3);
}

#[test]
fn invalid_setup_is_rejected() {
    let bad_bounds = EngineConfig {
        min_level: 5,
        max_level: 3,
        initial_level: 4,
        ..EngineConfig::default()
    };
    assert!(matches!(
        FieldEngine::new(bad_bounds, 800, 600, CapabilityTier::Full),
        Err(CoreError::InvalidConfig(_))
    ));
    let too_high = EngineConfig {
        max_level: 20,
        ..EngineConfig::default()
    };
    assert!(FieldEngine::new(too_high, 800, 600, CapabilityTier::Full).is_err());
    assert!(matches!(
        FieldEngine::new(EngineConfig::default(), 0, 600, CapabilityTier::Full),
        Err(CoreError::InvalidViewport(_))
    ));
}

#[test]
fn layout_waits_for_the_transition() {
    let mut e = engine();
    let mut now = 0.0;
    e.bump_level(1);
    e.frame(now);
    assert!(e.transition().is_some());

    e.resize(1200, 800);
    assert_eq!(e.viewport(), (1200, 800));
    assert_eq!(e.mapping().viewport_width, 1200.0);
    now += 0.05;
    e.frame(now);
    assert!(e.transition().is_some());
    let active = e.fields().active();
    assert_eq!(e.fields().buffer(active).layout().width, 1000);

    settle(&mut e, &mut now);
    for slot in [active, active.other()] {
        assert_eq!(e.fields().buffer(slot).layout().width, 1200);
        assert_eq!(e.fields().buffer(slot).layout().height, 800);
    }

    e.resize(0, 300);
    assert_eq!(e.viewport(), (1200, 800));
}

#[test]
fn ripples_are_mirrored_and_die_out() {
    for tier in [CapabilityTier::Full, CapabilityTier::Constrained] {
        let mut e = FieldEngine::new(EngineConfig::default(), 1000, 700, tier).unwrap();
        let mut now = 0.0;
        settle(&mut e, &mut now);

        e.notify_ripple(300.0, 200.0, now);
        let xs: Vec<f32> = e.ripples().ripples().iter().map(|r| r.origin.x).collect();
        assert_eq!(xs, vec![300.0, 700.0]);
        assert!(e.frame(now));
        assert!(e.is_animating());

        settle(&mut e, &mut now);
        assert!(!e.ripples().is_live());
        assert!(!e.fields().is_deformed());
    }
}

#[test]
fn overlay_places_markers_and_ticks() {
    let mut e = engine();
    e.set_value(Marker::A, 0.5);
    e.frame(0.0);
    let palette = Palette::default();
    let overlay = &e.plan().overlay;
    let marker_x = |color: [f32; 4]| {
        overlay
            .iter()
            .find(|q| q.color == color)
            .map(|q| q.center[0])
    };
    assert_eq!(marker_x(palette.marker_a), Some(750.0));
    assert_eq!(marker_x(palette.marker_b), Some(250.0));
    assert_eq!(overlay.iter().filter(|q| q.color == palette.tick).count(), 21);
}

#[test]
fn readout_is_taken_once_per_change() {
    let mut e = engine();
    let first = e.take_readout().expect("initial readout");
    assert_eq!(first.level.get(), 0);
    assert_eq!(first.range, (-1.0, 1.0));
    assert_eq!(first.backend, None);
    assert!(e.take_readout().is_none());

    e.set_value(Marker::A, 0.25);
    let r = e.take_readout().expect("value changed");
    assert_eq!(r.value_a, 0.25);
    assert_eq!(r.value_b, Some(-0.25));
    assert!(r.symmetric);

    e.set_backend(BackendKind::Canvas2d);
    assert_eq!(e.take_readout().and_then(|r| r.backend), Some(BackendKind::Canvas2d));
    e.set_backend(BackendKind::Canvas2d);
    assert!(e.take_readout().is_none());
}

#[test]
fn render_requests_coalesce_into_one_callback() {
    let mut e = engine();
    assert!(e.claim_callback());
    e.request_render();
    e.set_value(Marker::A, 0.1);
    assert!(!e.claim_callback());

    assert!(e.frame(0.0));
    assert!(!e.claim_callback());
    assert!(!e.frame(0.1));

    e.request_render();
    assert!(e.claim_callback());
    assert!(!e.claim_callback());
}

#[test]
fn pointer_helpers_use_the_current_mapping() {
    let mut e = engine();
    assert_eq!(e.value_at(750.0), 0.5);
    assert_eq!(e.value_at(-1.0e6), -1.0);
    e.set_value(Marker::A, 0.5);
    assert_eq!(e.marker_near(740.0), Marker::A);
    assert_eq!(e.marker_near(260.0), Marker::B);
    e.set_value_at(Marker::A, 1000.0);
    assert_eq!(e.markers().a(), 1.0);
    assert_eq!(e.markers().b(), Some(-1.0));
}
