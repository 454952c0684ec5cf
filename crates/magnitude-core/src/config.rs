use crate::constants::*;
use crate::error::CoreError;
use crate::level::MagnitudeLevel;
use crate::ripple::RippleParams;
use crate::transition::Easing;
use std::time::Duration;

/// Engine tuning. `Default` matches the reference behavior.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub initial_level: u8,
    pub min_level: u8,
    pub max_level: u8,
    pub step_mode: bool,
    pub step_interval: Duration,
    pub transition_duration: Duration,
    pub easing: Easing,
    pub symmetric: bool,
    pub dual_markers: bool,
    pub ripple: RippleParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_level: K_MIN,
            min_level: K_MIN,
            max_level: K_MAX,
            step_mode: true,
            step_interval: Duration::from_millis(DEFAULT_STEP_INTERVAL_MS),
            transition_duration: Duration::from_millis(DEFAULT_TRANSITION_MS),
            easing: Easing::default(),
            symmetric: true,
            dual_markers: true,
            ripple: RippleParams::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.min_level > self.max_level {
            return Err(CoreError::InvalidConfig("min_level above max_level"));
        }
        MagnitudeLevel::new(self.max_level as i64)?;
        if self.initial_level < self.min_level || self.initial_level > self.max_level {
            return Err(CoreError::InvalidConfig("initial_level outside level bounds"));
        }
        let r = &self.ripple;
        if !(r.speed_px_per_sec > 0.0 && r.wavelength_px > 0.0 && r.envelope_px > 0.0) {
            return Err(CoreError::InvalidConfig("ripple speed, wavelength and envelope must be positive"));
        }
        if !(0.0..1.0).contains(&r.scale_gain) {
            return Err(CoreError::InvalidConfig("ripple scale_gain must be in [0, 1)"));
        }
        if r.max_live == 0 {
            return Err(CoreError::InvalidConfig("ripple max_live must be at least 1"));
        }
        Ok(())
    }

    /// Clamp a requested level into the configured bounds.
    pub fn clamp_level(&self, k: i64) -> MagnitudeLevel {
        MagnitudeLevel::from_request(k.clamp(self.min_level as i64, self.max_level as i64))
    }

    pub fn initial(&self) -> MagnitudeLevel {
        self.clamp_level(self.initial_level as i64)
    }
}
