use crate::overlay;
use instant::Instant;
use magnitude_core::{FieldEngine, Presenter};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// The element currently drawn into. The CPU fallback may swap it.
pub type CanvasSlot = Rc<RefCell<web::HtmlCanvasElement>>;

type TickClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

pub struct FrameContext {
    pub engine: Rc<RefCell<FieldEngine>>,
    pub presenter: Presenter,
    pub canvas: CanvasSlot,
    pub document: web::Document,
    pub epoch: Instant,
    pub size: (u32, u32),
}

impl FrameContext {
    pub fn frame(&mut self) {
        let backing = {
            let c = self.canvas.borrow();
            (c.width(), c.height())
        };
        let mut engine = self.engine.borrow_mut();
        if backing != self.size && backing.0 > 0 && backing.1 > 0 {
            self.size = backing;
            engine.resize(backing.0, backing.1);
            self.presenter.resize(backing.0, backing.1);
        }

        let now = self.epoch.elapsed().as_secs_f64();
        if !engine.frame(now) {
            return;
        }
        if let Err(e) = self.presenter.present(&engine.view()) {
            log::error!("[backend] present failed: {e}");
        }
        engine.set_backend(self.presenter.kind());
        if let Some(r) = engine.take_readout() {
            overlay::update_readout(&self.document, &r);
        }
    }
}

/// Handle for asking the loop for another frame. Cheap to clone.
#[derive(Clone)]
pub struct Runner {
    engine: Rc<RefCell<FieldEngine>>,
    tick: TickClosure,
}

impl Runner {
    /// Build the refresh callback. Nothing runs until [`Runner::kick`].
    pub fn new(frame_ctx: Rc<RefCell<FrameContext>>) -> Self {
        let engine = frame_ctx.borrow().engine.clone();
        let tick: TickClosure = Rc::new(RefCell::new(None));
        let runner = Self {
            engine,
            tick: tick.clone(),
        };
        let again = runner.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
            frame_ctx.borrow_mut().frame();
            again.kick();
        }) as Box<dyn FnMut()>));
        runner
    }

    /// Schedule one refresh callback if a render is pending and none is
    /// already scheduled.
    pub fn kick(&self) {
        if !self.engine.borrow_mut().claim_callback() {
            return;
        }
        if let (Some(w), Some(cb)) = (web::window(), self.tick.borrow().as_ref()) {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }

    pub fn inspect<R>(&self, f: impl FnOnce(&FieldEngine) -> R) -> R {
        f(&self.engine.borrow())
    }

    /// Mutate the engine, then make sure a frame follows.
    pub fn with_engine(&self, f: impl FnOnce(&mut FieldEngine)) {
        f(&mut self.engine.borrow_mut());
        self.kick();
    }
}
