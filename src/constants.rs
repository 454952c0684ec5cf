/// Front-end wiring and interaction tuning constants.
///
/// Engine tuning lives in `magnitude_core::constants`; these only shape how
/// browser input is turned into engine calls.
// Element ids looked up at startup
pub const CANVAS_ID: &str = "app-canvas";
pub const READOUT_ID: &str = "readout";
pub const ZOOM_IN_ID: &str = "zoom-in";
pub const ZOOM_OUT_ID: &str = "zoom-out";

// Pointer travel (CSS px) before a press becomes a drag instead of a tap
pub const DRAG_THRESHOLD_PX: f32 = 4.0;

// Minimum travel (backing px) between ripples spawned along a drag
pub const DRAG_RIPPLE_SPACING_PX: f32 = 48.0;

// Accumulated wheel delta (pixel mode) per level step
pub const WHEEL_STEP_PX: f64 = 100.0;
// WheelEvent.deltaMode line/page multipliers into pixels
pub const WHEEL_LINE_PX: f64 = 16.0;
pub const WHEEL_PAGE_PX: f64 = 400.0;

// Side length of the offscreen canvas used to read back a presented pixel
pub const PROBE_CANVAS_PX: u32 = 1;
// Backing-pixel inset of the probed point from the top-left corner
pub const PROBE_INSET_PX: f64 = 2.0;

// Upper bound for per-draw uniform slots (two layers of four batches + overlay)
pub const MAX_DRAW_SLOTS: usize = 16;
