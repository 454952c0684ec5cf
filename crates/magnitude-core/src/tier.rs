//! Device capability tiers. A lower tier trades ripple fidelity and pixel
//! density for frame time; block counts and positions never change.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CapabilityTier {
    #[default]
    Full,
    Constrained,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TierBudget {
    pub max_pixel_ratio: f64,
    /// Ripple waves are sampled on every Nth row/column and shared by the patch.
    pub ripple_sample_stride: usize,
    /// Ripple deformation is recomputed on every Nth frame.
    pub ripple_update_every: u32,
    /// Fraction of the ripple radius limit that still deforms blocks.
    pub ripple_radius_scale: f32,
}

impl CapabilityTier {
    pub fn budget(self) -> TierBudget {
        match self {
            CapabilityTier::Full => TierBudget {
                max_pixel_ratio: 2.0,
                ripple_sample_stride: 1,
                ripple_update_every: 1,
                ripple_radius_scale: 1.0,
            },
            CapabilityTier::Constrained => TierBudget {
                max_pixel_ratio: 1.25,
                ripple_sample_stride: 2,
                ripple_update_every: 2,
                ripple_radius_scale: 0.5,
            },
        }
    }

    /// Classify from what the browser reports about the device.
    pub fn classify(hardware_concurrency: u32, max_touch_points: i32, mobile_agent: bool) -> Self {
        let few_cores = hardware_concurrency > 0 && hardware_concurrency <= 4;
        let touch_first = max_touch_points > 0 && mobile_agent;
        if touch_first || (mobile_agent && few_cores) {
            CapabilityTier::Constrained
        } else {
            CapabilityTier::Full
        }
    }
}

impl Default for TierBudget {
    fn default() -> Self {
        CapabilityTier::Full.budget()
    }
}
