//! Advances the current magnitude level toward a requested target, one
//! integer step per tick, never skipping an intermediate level.

use crate::level::MagnitudeLevel;
use std::time::Duration;

/// One announced single-step advance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelStep {
    pub from: MagnitudeLevel,
    pub to: MagnitudeLevel,
}

impl LevelStep {
    /// +1 when zooming out (range grows), -1 when zooming in.
    #[inline]
    pub fn direction(&self) -> i32 {
        self.to.get() as i32 - self.from.get() as i32
    }
}

#[derive(Clone, Debug)]
pub struct MagnitudeStepper {
    current: MagnitudeLevel,
    target: MagnitudeLevel,
    step_interval: Duration,
    step_mode: bool,
    /// Kept across idle periods so repeated requests cannot outpace the interval.
    last_step_sec: Option<f64>,
}

impl MagnitudeStepper {
    pub fn new(initial: MagnitudeLevel, step_interval: Duration, step_mode: bool) -> Self {
        Self {
            current: initial,
            target: initial,
            step_interval,
            step_mode,
            last_step_sec: None,
        }
    }

    #[inline]
    pub fn current(&self) -> MagnitudeLevel {
        self.current
    }

    #[inline]
    pub fn target(&self) -> MagnitudeLevel {
        self.target
    }

    #[inline]
    pub fn is_stepping(&self) -> bool {
        self.current != self.target
    }

    pub fn step_mode(&self) -> bool {
        self.step_mode
    }

    pub fn set_step_mode(&mut self, on: bool) {
        self.step_mode = on;
    }

    /// Effective interval between steps; zero when step mode is off.
    pub fn interval(&self) -> Duration {
        if self.step_mode {
            self.step_interval
        } else {
            Duration::ZERO
        }
    }

    /// Update the target in place. The in-flight step timer is kept.
    pub fn set_target(&mut self, target: MagnitudeLevel) {
        self.target = target;
    }

    /// Advance at most one level if the interval has elapsed, announcing the
    /// step to `on_step`. Returns the step that happened, if any.
    pub fn tick(
        &mut self,
        now_sec: f64,
        mut on_step: impl FnMut(LevelStep),
    ) -> Option<LevelStep> {
        if !self.is_stepping() {
            return None;
        }
        let due = match self.last_step_sec {
            None => true,
            Some(last) => now_sec - last >= self.interval().as_secs_f64(),
        };
        if !due {
            return None;
        }
        let step = LevelStep {
            from: self.current,
            to: self.current.toward(self.target),
        };
        self.current = step.to;
        self.last_step_sec = Some(now_sec);
        log::debug!("[stepper] {} -> {} (target {})", step.from, step.to, self.target);
        on_step(step);
        Some(step)
    }

    /// Seconds until the next step is due, for scheduling.
    pub fn time_until_due(&self, now_sec: f64) -> Option<f64> {
        if !self.is_stepping() {
            return None;
        }
        Some(match self.last_step_sec {
            None => 0.0,
            Some(last) => (self.interval().as_secs_f64() - (now_sec - last)).max(0.0),
        })
    }
}
