use crate::frame::Runner;
use crate::input::{key_command, KeyCommand};
use magnitude_core::FieldEngine;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

fn apply(engine: &mut FieldEngine, cmd: KeyCommand) {
    match cmd {
        KeyCommand::BumpLevel(d) => engine.bump_level(d),
        KeyCommand::TargetLevel(k) => engine.set_target_level(k),
        KeyCommand::ToggleSymmetric => {
            let on = !engine.markers().symmetric();
            engine.set_symmetric_mode(on);
            log::info!("[keys] symmetric={}", on);
        }
        KeyCommand::ToggleStepMode => {
            let on = !engine.step_mode();
            engine.set_step_mode(on);
            log::info!("[keys] step_mode={}", on);
        }
        KeyCommand::ToggleSecondMarker => {
            let on = engine.markers().b().is_none();
            engine.set_second_marker(on);
            log::info!("[keys] second_marker={}", on);
        }
    }
}

pub fn handle_global_keydown(ev: &web::KeyboardEvent, runner: &Runner) {
    if ev.ctrl_key() || ev.meta_key() || ev.alt_key() {
        return;
    }
    let Some(cmd) = key_command(&ev.key()) else {
        return;
    };
    if matches!(cmd, KeyCommand::BumpLevel(_)) {
        // arrows would otherwise scroll the page
        ev.prevent_default();
    }
    runner.with_engine(|e| apply(e, cmd));
}

pub fn wire_global_keydown(runner: Runner) {
    let closure = Closure::wrap(Box::new(move |ev: web::KeyboardEvent| {
        handle_global_keydown(&ev, &runner);
    }) as Box<dyn FnMut(_)>);
    if let Some(w) = web::window() {
        _ = w.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
