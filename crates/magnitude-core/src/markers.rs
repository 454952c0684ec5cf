//! One or two signed marker values and the symmetric (`B = -A`) mode.

use crate::field::block_count;
use crate::level::MagnitudeLevel;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker {
    A,
    B,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarkerSet {
    a: f64,
    b: Option<f64>,
    symmetric: bool,
}

impl MarkerSet {
    pub fn new(dual: bool, symmetric: bool) -> Self {
        let b = (dual || symmetric).then_some(0.0);
        Self { a: 0.0, b, symmetric }
    }

    #[inline]
    pub fn a(&self) -> f64 {
        self.a
    }

    #[inline]
    pub fn b(&self) -> Option<f64> {
        self.b
    }

    #[inline]
    pub fn symmetric(&self) -> bool {
        self.symmetric
    }

    /// Assign a marker, clamped to the level's range. In symmetric mode the
    /// other marker follows as the negation.
    pub fn set(&mut self, which: Marker, raw: f64, level: MagnitudeLevel) {
        let v = level.clamp_value(raw);
        match which {
            Marker::A => {
                self.a = v;
                if self.symmetric {
                    self.b = Some(-v);
                }
            }
            Marker::B => {
                self.b = Some(v);
                if self.symmetric {
                    self.a = -v;
                }
            }
        }
    }

    pub fn set_symmetric(&mut self, on: bool) {
        self.symmetric = on;
        if on {
            self.b = Some(-self.a);
        }
    }

    /// Show or hide marker B. Hiding it also leaves symmetric mode.
    pub fn enable_second(&mut self, on: bool) {
        if on {
            if self.b.is_none() {
                self.b = Some(if self.symmetric { -self.a } else { 0.0 });
            }
        } else {
            self.b = None;
            self.symmetric = false;
        }
    }

    pub fn clamp_to(&mut self, level: MagnitudeLevel) {
        self.a = level.clamp_value(self.a);
        self.b = self.b.map(|b| level.clamp_value(b));
    }

    /// Most negative and most positive marker values (0 when none).
    pub fn extremes(&self) -> (f64, f64) {
        let mut lo = 0.0f64;
        let mut hi = 0.0f64;
        for v in std::iter::once(self.a).chain(self.b) {
            lo = lo.min(v);
            hi = hi.max(v);
        }
        (lo, hi)
    }

    /// Active blocks on the negative and positive side at `level`.
    pub fn side_counts(&self, level: MagnitudeLevel) -> [u32; 2] {
        let (lo, hi) = self.extremes();
        [block_count(level, lo), block_count(level, hi)]
    }

    /// The marker nearest to `value`, for picking a drag target.
    pub fn nearest(&self, value: f64) -> Marker {
        match self.b {
            Some(b) if (b - value).abs() < (self.a - value).abs() => Marker::B,
            _ => Marker::A,
        }
    }
}
