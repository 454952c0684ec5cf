//! The animated interval bridging two adjacent magnitude levels.

use crate::level::MagnitudeLevel;
use crate::mapping::{blended_position, CoordinateMapping};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    EaseOutCubic,
    #[default]
    EaseInOutCubic,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Transition {
    pub from_level: MagnitudeLevel,
    pub to_level: MagnitudeLevel,
    pub start_sec: f64,
    pub duration: Duration,
    pub from_mapping: CoordinateMapping,
    pub to_mapping: CoordinateMapping,
    pub easing: Easing,
    /// Drawn scale of the outgoing field at `start_sec`; 1 unless this
    /// transition replaced one still in flight.
    pub from_scale: f64,
    /// Drawn alpha of the outgoing field at `start_sec`.
    pub from_alpha: f64,
}

impl Transition {
    /// +1 when the range grows (zoom out), -1 when it shrinks.
    #[inline]
    pub fn direction(&self) -> f64 {
        if self.to_level > self.from_level {
            1.0
        } else {
            -1.0
        }
    }

    pub fn progress(&self, now_sec: f64) -> f64 {
        let d = self.duration.as_secs_f64();
        if d <= 0.0 {
            return 1.0;
        }
        ((now_sec - self.start_sec) / d).clamp(0.0, 1.0)
    }

    #[inline]
    pub fn eased(&self, now_sec: f64) -> f64 {
        self.easing.apply(self.progress(now_sec))
    }

    #[inline]
    pub fn is_complete(&self, now_sec: f64) -> bool {
        now_sec - self.start_sec >= self.duration.as_secs_f64()
    }

    /// Scale of the outgoing field, eased in log space from `from_scale`
    /// to `10^(-dir)`. With `from_scale == 1` this is `10^(-dir * e)`.
    #[inline]
    pub fn outgoing_scale(&self, eased: f64) -> f64 {
        let start = self.from_scale.max(f64::MIN_POSITIVE).log10();
        10f64.powf(start + (-self.direction() - start) * eased)
    }

    /// Scale of the incoming field; always `10^dir` times the outgoing one
    /// so it lands on 1 when `e` reaches 1.
    #[inline]
    pub fn incoming_scale(&self, eased: f64) -> f64 {
        10f64.powf(self.direction()) * self.outgoing_scale(eased)
    }

    #[inline]
    pub fn outgoing_alpha(&self, eased: f64) -> f64 {
        self.from_alpha * (1.0 - eased)
    }

    #[inline]
    pub fn incoming_alpha(&self, eased: f64) -> f64 {
        eased
    }

    pub fn position_for(&self, value: f64, eased: f64) -> f64 {
        blended_position(&self.from_mapping, &self.to_mapping, value, eased)
    }

    /// The mapping drawn at `eased`, as a single affine transform.
    pub fn mapping_at(&self, eased: f64) -> CoordinateMapping {
        let (from, to) = (&self.from_mapping, &self.to_mapping);
        let lerp = |a: f64, b: f64| a + (b - a) * eased;
        let slope = lerp(
            from.unit_length / from.unit_value,
            to.unit_length / to.unit_value,
        );
        CoordinateMapping {
            unit_length: slope * to.unit_value,
            displacement: lerp(from.displacement, to.displacement),
            ..*to
        }
    }
}
