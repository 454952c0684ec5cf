use crate::constants::{K_MAX, K_MIN, TIER_LEVELS};
use crate::error::CoreError;

/// Integer exponent `k` defining the visible range `[-10^k, 10^k]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MagnitudeLevel(u8);

impl MagnitudeLevel {
    pub const MIN: MagnitudeLevel = MagnitudeLevel(K_MIN);
    pub const MAX: MagnitudeLevel = MagnitudeLevel(K_MAX);

    /// Strict constructor for code paths where a bad level is a caller bug.
    pub fn new(k: i64) -> Result<Self, CoreError> {
        if k < K_MIN as i64 || k > K_MAX as i64 {
            return Err(CoreError::LevelOutOfRange {
                level: k,
                min: K_MIN,
                max: K_MAX,
            });
        }
        Ok(Self(k as u8))
    }

    /// Clamping constructor for user requests.
    pub fn from_request(k: i64) -> Self {
        Self(k.clamp(K_MIN as i64, K_MAX as i64) as u8)
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// `10^k`, the positive edge of the visible range.
    #[inline]
    pub fn half_range(self) -> f64 {
        10f64.powi(self.0 as i32)
    }

    /// Value one block stands for: `10^max(0, k-4)`.
    #[inline]
    pub fn block_unit(self) -> f64 {
        10f64.powi(self.0.saturating_sub(TIER_LEVELS) as i32)
    }

    /// Clamp a raw value into this level's range. NaN collapses to zero.
    #[inline]
    pub fn clamp_value(self, v: f64) -> f64 {
        if v.is_nan() {
            return 0.0;
        }
        let r = self.half_range();
        v.clamp(-r, r)
    }

    /// `k + delta`, saturating at the global bounds.
    pub fn saturating_step(self, delta: i32) -> MagnitudeLevel {
        Self::from_request(self.0 as i64 + delta as i64)
    }

    /// One level toward `target`, or `self` when already there.
    pub fn toward(self, target: MagnitudeLevel) -> MagnitudeLevel {
        match self.0.cmp(&target.0) {
            std::cmp::Ordering::Less => MagnitudeLevel(self.0 + 1),
            std::cmp::Ordering::Greater => MagnitudeLevel(self.0 - 1),
            std::cmp::Ordering::Equal => self,
        }
    }
}

impl TryFrom<f64> for MagnitudeLevel {
    type Error = CoreError;

    fn try_from(k: f64) -> Result<Self, Self::Error> {
        if !k.is_finite() || k < 0.0 || k.fract() != 0.0 {
            return Err(CoreError::InvalidLevel(k));
        }
        Self::new(k as i64)
    }
}

impl TryFrom<i64> for MagnitudeLevel {
    type Error = CoreError;

    fn try_from(k: i64) -> Result<Self, Self::Error> {
        Self::new(k)
    }
}

impl std::fmt::Display for MagnitudeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "k={}", self.0)
    }
}
