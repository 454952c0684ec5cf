//! Expanding ring waves spawned by user interaction.
//!
//! Each ripple contributes `cos(2π·x/λ) · exp(-x²/2σ²) · exp(-decay·age)`
//! where `x` is the signed distance from its wavefront. The summed wave is
//! clamped to `[-1, 1]` so the resulting scale factor stays within
//! `[1 - gain, 1 + gain]`.

use crate::constants::*;
use glam::Vec2;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleParams {
    pub speed_px_per_sec: f32,
    pub wavelength_px: f32,
    pub envelope_px: f32,
    pub decay_per_sec: f32,
    pub amplitude: f32,
    pub scale_gain: f32,
    pub max_live: usize,
    pub max_age_sec: f32,
    pub max_radius_px: f32,
}

impl Default for RippleParams {
    fn default() -> Self {
        Self {
            speed_px_per_sec: RIPPLE_SPEED_PX_PER_SEC,
            wavelength_px: RIPPLE_WAVELENGTH_PX,
            envelope_px: RIPPLE_ENVELOPE_PX,
            decay_per_sec: RIPPLE_DECAY_PER_SEC,
            amplitude: RIPPLE_AMPLITUDE,
            scale_gain: RIPPLE_SCALE_GAIN,
            max_live: RIPPLE_MAX_LIVE,
            max_age_sec: RIPPLE_MAX_AGE_SEC,
            max_radius_px: RIPPLE_MAX_RADIUS_PX,
        }
    }
}

impl RippleParams {
    /// Smallest and largest draw-scale multiplier a ripple can produce.
    pub fn scale_bounds(&self) -> (f32, f32) {
        let g = self.scale_gain.clamp(0.0, 0.95);
        (1.0 - g, 1.0 + g)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ripple {
    pub origin: Vec2,
    pub start_sec: f64,
}

impl Ripple {
    #[inline]
    fn age(&self, now_sec: f64) -> f32 {
        (now_sec - self.start_sec).max(0.0) as f32
    }
}

#[derive(Clone, Debug, Default)]
pub struct RippleField {
    params: RippleParams,
    ripples: SmallVec<[Ripple; RIPPLE_MAX_LIVE]>,
}

impl RippleField {
    pub fn new(params: RippleParams) -> Self {
        Self {
            params,
            ripples: SmallVec::new(),
        }
    }

    pub fn params(&self) -> &RippleParams {
        &self.params
    }

    pub fn ripples(&self) -> &[Ripple] {
        &self.ripples
    }

    #[inline]
    pub fn is_live(&self) -> bool {
        !self.ripples.is_empty()
    }

    /// Spawn a ripple at `point` plus its reflection about `center_x`.
    /// Non-finite points or times are ignored.
    pub fn spawn_mirrored(&mut self, point: Vec2, center_x: f32, now_sec: f64) {
        if !point.is_finite() || !now_sec.is_finite() {
            log::trace!("[ripple] ignoring non-finite origin {point:?}");
            return;
        }
        self.push(Ripple {
            origin: point,
            start_sec: now_sec,
        });
        let mirrored_x = 2.0 * center_x - point.x;
        if mirrored_x.is_finite() && (mirrored_x - point.x).abs() > RIPPLE_MIRROR_EPSILON_PX {
            self.push(Ripple {
                origin: Vec2::new(mirrored_x, point.y),
                start_sec: now_sec,
            });
        }
    }

    fn push(&mut self, ripple: Ripple) {
        if self.ripples.len() >= self.params.max_live.max(1) {
            self.ripples.remove(0);
        }
        self.ripples.push(ripple);
    }

    /// Drop ripples whose wavefront left the field or whose amplitude faded.
    pub fn prune(&mut self, now_sec: f64) {
        let p = self.params;
        self.ripples.retain(|r| {
            let age = r.age(now_sec);
            let inner = p.speed_px_per_sec * age - RIPPLE_BAND_SIGMAS * p.envelope_px;
            let faded = p.amplitude * (-p.decay_per_sec * age).exp() < 1e-3;
            age <= p.max_age_sec && inner <= p.max_radius_px && !faded
        });
    }

    #[inline]
    pub fn wavefront_radius(&self, ripple: &Ripple, now_sec: f64) -> f32 {
        self.params.speed_px_per_sec * ripple.age(now_sec)
    }

    /// Annulus `(inner, outer)` around the wavefront where blocks are touched.
    pub fn band(&self, ripple: &Ripple, now_sec: f64) -> (f32, f32) {
        let r = self.wavefront_radius(ripple, now_sec);
        let reach = RIPPLE_BAND_SIGMAS * self.params.envelope_px;
        ((r - reach).max(0.0), r + reach)
    }

    /// Contribution of one ripple at distance `d` from its origin.
    fn ripple_wave(&self, ripple: &Ripple, d: f32, now_sec: f64) -> f32 {
        let p = &self.params;
        let age = ripple.age(now_sec);
        let x = d - p.speed_px_per_sec * age;
        let sigma = p.envelope_px.max(1e-3);
        let envelope = (-(x * x) / (2.0 * sigma * sigma)).exp();
        let spatial = (std::f32::consts::TAU * x / p.wavelength_px.max(1e-3)).cos();
        let decay = (-p.decay_per_sec * age).exp();
        p.amplitude * spatial * envelope * decay
    }

    /// Summed wave at `point`, clamped to `[-1, 1]`.
    pub fn wave_at(&self, point: Vec2, now_sec: f64) -> f32 {
        let mut sum = 0.0;
        for r in &self.ripples {
            let d = point.distance(r.origin);
            let (inner, outer) = self.band(r, now_sec);
            if d < inner || d > outer {
                continue;
            }
            sum += self.ripple_wave(r, d, now_sec);
        }
        sum.clamp(-1.0, 1.0)
    }

    /// Draw-scale multiplier for a wave value.
    #[inline]
    pub fn scale_factor(&self, wave: f32) -> f32 {
        if wave.is_nan() {
            return 1.0;
        }
        let (lo, hi) = self.params.scale_bounds();
        (1.0 + self.params.scale_gain * wave.clamp(-1.0, 1.0)).clamp(lo, hi)
    }
}
