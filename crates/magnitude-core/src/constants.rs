// Shared magnitude/field tuning constants used by the engine and both backends.

// Magnitude levels
pub const K_MIN: u8 = 0;
pub const K_MAX: u8 = 16;

// Levels per grid cycle: once k exceeds this, one block stands for a whole filled field
pub const TIER_LEVELS: u8 = 4;

// Field grid
pub const GRID_SIDE: usize = 100; // slots per row/column on each side
pub const BLOCKS_PER_SIDE: usize = GRID_SIDE * GRID_SIDE;
pub const CHUNK_SLOTS: usize = 10; // thicker boundary every N slots
pub const FIELD_SIDES: usize = 2; // negative, positive

// Layout proportions (fractions of the slot pitch)
pub const BLOCK_FILL: f32 = 0.78; // block edge relative to pitch
pub const ZERO_GAP_SLOTS: f32 = 0.5; // gap between the zero line and the first column
pub const FIELD_MARGIN_PX: f32 = 12.0;
pub const NUMBER_LINE_BAND_PX: f32 = 44.0; // reserved under the field for the axis

// Number line
pub const UNITS_PER_HALF: f64 = 10.0; // ticks between zero and each range edge

// Stepping and transitions
pub const DEFAULT_STEP_INTERVAL_MS: u64 = 180;
pub const DEFAULT_TRANSITION_MS: u64 = 420;

// Ripples
pub const RIPPLE_MAX_LIVE: usize = 8;
pub const RIPPLE_SPEED_PX_PER_SEC: f32 = 520.0;
pub const RIPPLE_WAVELENGTH_PX: f32 = 42.0;
pub const RIPPLE_ENVELOPE_PX: f32 = 36.0; // gaussian sigma around the wavefront
pub const RIPPLE_DECAY_PER_SEC: f32 = 1.9;
pub const RIPPLE_AMPLITUDE: f32 = 1.0;
pub const RIPPLE_SCALE_GAIN: f32 = 0.45; // draw scale = base * (1 + gain * wave)
pub const RIPPLE_MAX_AGE_SEC: f32 = 2.6;
pub const RIPPLE_MAX_RADIUS_PX: f32 = 2400.0;
pub const RIPPLE_BAND_SIGMAS: f32 = 3.0; // only blocks within this many sigmas are touched
pub const RIPPLE_MIRROR_EPSILON_PX: f32 = 1.0;

// Backend health probe
pub const PROBE_AFTER_FRAMES: u32 = 3;
pub const PROBE_BLACK_THRESHOLD: u16 = 6; // r+g+b at or below counts as black
