//! Value <-> pixel mapping for one magnitude level and viewport width.
//!
//! The mapping is a plain affine transform built so that `[-10^k, 10^k]`
//! spans exactly `[0, viewport_width]` with zero at the horizontal center.
//! Nothing here clamps; callers clamp values to the level's range.

use crate::constants::UNITS_PER_HALF;
use crate::error::CoreError;
use crate::level::MagnitudeLevel;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapping {
    pub level: MagnitudeLevel,
    pub viewport_width: f64,
    /// Value represented by one layout unit (one tick interval).
    pub unit_value: f64,
    /// Pixels per layout unit.
    pub unit_length: f64,
    /// Pixel position of value zero.
    pub displacement: f64,
}

impl CoordinateMapping {
    pub fn new(level: MagnitudeLevel, viewport_width: f64) -> Result<Self, CoreError> {
        if !viewport_width.is_finite() || viewport_width <= 0.0 {
            return Err(CoreError::InvalidViewport(viewport_width));
        }
        let half_width = viewport_width / 2.0;
        Ok(Self {
            level,
            viewport_width,
            unit_value: level.half_range() / UNITS_PER_HALF,
            unit_length: half_width / UNITS_PER_HALF,
            displacement: half_width,
        })
    }

    /// Build from an unvalidated level; negative or fractional levels fail.
    pub fn from_raw_level(level: f64, viewport_width: f64) -> Result<Self, CoreError> {
        Self::new(MagnitudeLevel::try_from(level)?, viewport_width)
    }

    #[inline]
    pub fn position_for(&self, value: f64) -> f64 {
        self.displacement + value / self.unit_value * self.unit_length
    }

    #[inline]
    pub fn value_at(&self, x: f64) -> f64 {
        (x - self.displacement) / self.unit_length * self.unit_value
    }

    #[inline]
    pub fn range(&self) -> (f64, f64) {
        let r = self.level.half_range();
        (-r, r)
    }

    /// Pixel positions of every tick from the left edge to the right edge.
    pub fn tick_positions(&self) -> impl Iterator<Item = f64> + '_ {
        let n = UNITS_PER_HALF as i64;
        (-n..=n).map(move |i| self.displacement + i as f64 * self.unit_length)
    }
}

/// Interpolated pixel position of `value` part way between two mappings.
#[inline]
pub fn blended_position(
    from: &CoordinateMapping,
    to: &CoordinateMapping,
    value: f64,
    t: f64,
) -> f64 {
    let a = from.position_for(value);
    let b = to.position_for(value);
    a + (b - a) * t
}
