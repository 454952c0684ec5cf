use crate::constants::{
    DRAG_RIPPLE_SPACING_PX, DRAG_THRESHOLD_PX, WHEEL_LINE_PX, WHEEL_PAGE_PX, WHEEL_STEP_PX,
};
use glam::Vec2;
use magnitude_core::Marker;

// ---------------- Coordinates ----------------

/// CSS client offset inside the canvas rect → backing-store pixels.
/// `None` when the rect has no area.
#[inline]
pub fn css_to_backing(css: Vec2, rect_size: Vec2, backing: Vec2) -> Option<Vec2> {
    if rect_size.x <= 0.0 || rect_size.y <= 0.0 {
        return None;
    }
    Some(css / rect_size * backing)
}

#[inline]
pub fn inside_rect(css: Vec2, rect_size: Vec2) -> bool {
    css.x >= 0.0 && css.y >= 0.0 && css.x <= rect_size.x && css.y <= rect_size.y
}

// ---------------- Pointer gesture ----------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureAction {
    None,
    /// Move `marker` to backing x; optionally spawn a ripple at `ripple`.
    Drag {
        marker: Marker,
        x: f32,
        ripple: Option<Vec2>,
    },
    /// A press released without dragging.
    Tap { at: Vec2 },
}

#[derive(Clone, Copy, Debug)]
struct Press {
    start_css: Vec2,
    marker: Marker,
    dragging: bool,
    last_ripple: Option<Vec2>,
}

/// Tap-versus-drag state for the primary pointer.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerGesture {
    press: Option<Press>,
}

impl PointerGesture {
    pub fn down(&mut self, css: Vec2, marker: Marker) {
        self.press = Some(Press {
            start_css: css,
            marker,
            dragging: false,
            last_ripple: None,
        });
    }

    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn moved(&mut self, css: Vec2, px: Vec2) -> GestureAction {
        let Some(p) = &mut self.press else {
            return GestureAction::None;
        };
        if !p.dragging && css.distance(p.start_css) >= DRAG_THRESHOLD_PX {
            p.dragging = true;
        }
        if !p.dragging {
            return GestureAction::None;
        }
        let ripple = match p.last_ripple {
            Some(last) if last.distance(px) < DRAG_RIPPLE_SPACING_PX => None,
            _ => {
                p.last_ripple = Some(px);
                Some(px)
            }
        };
        GestureAction::Drag {
            marker: p.marker,
            x: px.x,
            ripple,
        }
    }

    pub fn up(&mut self, px: Vec2) -> GestureAction {
        match self.press.take() {
            Some(p) if !p.dragging => GestureAction::Tap { at: px },
            _ => GestureAction::None,
        }
    }

    pub fn cancel(&mut self) {
        self.press = None;
    }
}

// ---------------- Wheel ----------------

/// `WheelEvent.deltaY` in pixels for any `deltaMode`.
#[inline]
pub fn wheel_delta_px(delta: f64, delta_mode: u32) -> f64 {
    match delta_mode {
        1 => delta * WHEEL_LINE_PX,
        2 => delta * WHEEL_PAGE_PX,
        _ => delta,
    }
}

/// Turns a stream of wheel deltas into whole level steps. Scrolling down
/// (positive delta) widens the range.
#[derive(Clone, Copy, Debug, Default)]
pub struct WheelAccumulator {
    acc: f64,
}

impl WheelAccumulator {
    pub fn push(&mut self, delta_px: f64) -> i32 {
        if !delta_px.is_finite() {
            return 0;
        }
        // a direction change drops the leftover
        if self.acc * delta_px < 0.0 {
            self.acc = 0.0;
        }
        self.acc += delta_px;
        let steps = (self.acc / WHEEL_STEP_PX).trunc();
        self.acc -= steps * WHEEL_STEP_PX;
        steps as i32
    }
}

// ---------------- Keyboard ----------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    BumpLevel(i64),
    TargetLevel(i64),
    ToggleSymmetric,
    ToggleStepMode,
    ToggleSecondMarker,
}

#[inline]
pub fn key_command(key: &str) -> Option<KeyCommand> {
    match key {
        "+" | "=" | "ArrowUp" | "ArrowRight" => Some(KeyCommand::BumpLevel(1)),
        "-" | "_" | "ArrowDown" | "ArrowLeft" => Some(KeyCommand::BumpLevel(-1)),
        "s" | "S" => Some(KeyCommand::ToggleSymmetric),
        "m" | "M" => Some(KeyCommand::ToggleStepMode),
        "b" | "B" => Some(KeyCommand::ToggleSecondMarker),
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c.to_digit(10).map(|d| KeyCommand::TargetLevel(d as i64)),
                _ => None,
            }
        }
    }
}
