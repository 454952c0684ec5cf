use crate::frame::{CanvasSlot, Runner};
use crate::input::{PointerGesture, WheelAccumulator};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;

mod keyboard;
mod pointer;

pub use keyboard::wire_global_keydown;

#[derive(Clone)]
pub struct InputWiring {
    pub runner: Runner,
    pub canvas: CanvasSlot,
    pub epoch: Instant,
    pub gesture: Rc<RefCell<PointerGesture>>,
    pub wheel: Rc<RefCell<WheelAccumulator>>,
}

impl InputWiring {
    #[inline]
    pub fn now_sec(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

pub fn wire_input_handlers(w: InputWiring) {
    pointer::wire_pointerdown(&w);
    pointer::wire_pointermove(&w);
    pointer::wire_pointerup(&w);
    pointer::wire_wheel(&w);
}
