#![cfg(target_arch = "wasm32")]
use crate::constants::{CANVAS_ID, ZOOM_IN_ID, ZOOM_OUT_ID};
use crate::frame::{CanvasSlot, FrameContext, Runner};
use instant::Instant;
use magnitude_core::{EngineConfig, FieldEngine, Presenter};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod constants;
mod dom;
mod events;
mod frame;
mod input;
mod overlay;
mod readout;
mod render;
mod tier;

fn wire_canvas_resize(canvas: CanvasSlot, max_dpr: f64, runner: Runner) {
    let closure = Closure::wrap(Box::new(move || {
        let c = canvas.borrow().clone();
        dom::sync_canvas_backing_size(&c, max_dpr);
        // the frame picks up the new backing size
        runner.with_engine(|e| e.request_render());
    }) as Box<dyn FnMut()>);
    if let Some(window) = web::window() {
        _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

fn wire_zoom_buttons(document: &web::Document, runner: &Runner) {
    let zoom_in = runner.clone();
    dom::add_click_listener(document, ZOOM_IN_ID, move || {
        zoom_in.with_engine(|e| e.bump_level(-1));
    });
    let zoom_out = runner.clone();
    dom::add_click_listener(document, ZOOM_OUT_ID, move || {
        zoom_out.with_engine(|e| e.bump_level(1));
    });
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("magnitude-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("missing #{}", CANVAS_ID))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("{:?}", e)))?;

    let tier = tier::detect(&window);
    let max_dpr = tier.budget().max_pixel_ratio;
    let (width, height) = dom::sync_canvas_backing_size(&canvas, max_dpr);

    let engine = Rc::new(RefCell::new(FieldEngine::new(
        EngineConfig::default(),
        width,
        height,
        tier,
    )?));
    log::info!("[engine] ready at {}x{}", width, height);

    let canvas_slot: CanvasSlot = Rc::new(RefCell::new(canvas.clone()));
    let primary = render::create_gpu_backend(&canvas).await;
    let presenter = Presenter::new(
        primary,
        render::canvas_fallback(canvas_slot.clone()),
        (width, height),
    )?;
    log::info!("[backend] presenting with {:?}", presenter.kind());

    let epoch = Instant::now();
    let frame_ctx = Rc::new(RefCell::new(FrameContext {
        engine: engine.clone(),
        presenter,
        canvas: canvas_slot.clone(),
        document: document.clone(),
        epoch,
        size: (width, height),
    }));
    let runner = Runner::new(frame_ctx);

    events::wire_input_handlers(events::InputWiring {
        runner: runner.clone(),
        canvas: canvas_slot.clone(),
        epoch,
        gesture: Rc::new(RefCell::new(input::PointerGesture::default())),
        wheel: Rc::new(RefCell::new(input::WheelAccumulator::default())),
    });
    events::wire_global_keydown(runner.clone());
    wire_zoom_buttons(&document, &runner);
    wire_canvas_resize(canvas_slot, max_dpr, runner.clone());

    runner.kick();
    Ok(())
}
