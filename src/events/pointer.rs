use super::InputWiring;
use crate::input::{self, GestureAction};
use glam::Vec2;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// (CSS offset inside the canvas, canvas CSS size, backing-pixel point).
fn canvas_point(ev: &web::MouseEvent, canvas: &web::HtmlCanvasElement) -> Option<(Vec2, Vec2, Vec2)> {
    let rect = canvas.get_bounding_client_rect();
    let css = Vec2::new(
        ev.client_x() as f32 - rect.left() as f32,
        ev.client_y() as f32 - rect.top() as f32,
    );
    let size = Vec2::new(rect.width() as f32, rect.height() as f32);
    let backing = Vec2::new(canvas.width() as f32, canvas.height() as f32);
    let px = input::css_to_backing(css, size, backing)?;
    Some((css, size, px))
}

fn listen(event: &str, handler: impl FnMut(web::PointerEvent) + 'static) {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(_)>);
    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
    }
    closure.forget();
}

pub(super) fn wire_pointerdown(w: &InputWiring) {
    let w = w.clone();
    listen("pointerdown", move |ev: web::PointerEvent| {
        if !ev.is_primary() {
            return;
        }
        let canvas = w.canvas.borrow().clone();
        let Some((css, size, px)) = canvas_point(&ev, &canvas) else {
            return;
        };
        if !input::inside_rect(css, size) {
            return;
        }
        let marker = w.runner.inspect(|e| e.marker_near(px.x as f64));
        w.gesture.borrow_mut().down(css, marker);
        log::debug!("[input] press near {:?}", marker);
    });
}

pub(super) fn wire_pointermove(w: &InputWiring) {
    let w = w.clone();
    listen("pointermove", move |ev: web::PointerEvent| {
        if !ev.is_primary() || !w.gesture.borrow().is_pressed() {
            return;
        }
        let canvas = w.canvas.borrow().clone();
        let Some((css, _, px)) = canvas_point(&ev, &canvas) else {
            return;
        };
        let action = w.gesture.borrow_mut().moved(css, px);
        if let GestureAction::Drag { marker, x, ripple } = action {
            let now = w.now_sec();
            w.runner.with_engine(|e| {
                e.set_value_at(marker, x as f64);
                if let Some(p) = ripple {
                    e.notify_ripple(p.x, p.y, now);
                }
            });
        }
    });
}

pub(super) fn wire_pointerup(w: &InputWiring) {
    {
        let w = w.clone();
        listen("pointerup", move |ev: web::PointerEvent| {
            if !ev.is_primary() {
                return;
            }
            let canvas = w.canvas.borrow().clone();
            let Some((_, _, px)) = canvas_point(&ev, &canvas) else {
                w.gesture.borrow_mut().cancel();
                return;
            };
            let action = w.gesture.borrow_mut().up(px);
            if let GestureAction::Tap { at } = action {
                let now = w.now_sec();
                w.runner.with_engine(|e| e.notify_ripple(at.x, at.y, now));
            }
        });
    }
    let w = w.clone();
    listen("pointercancel", move |_ev: web::PointerEvent| {
        w.gesture.borrow_mut().cancel();
    });
}

pub(super) fn wire_wheel(w: &InputWiring) {
    let w = w.clone();
    let closure = Closure::wrap(Box::new(move |ev: web::WheelEvent| {
        let canvas = w.canvas.borrow().clone();
        let Some((css, size, _)) = canvas_point(&ev, &canvas) else {
            return;
        };
        if !input::inside_rect(css, size) {
            return;
        }
        let delta = input::wheel_delta_px(ev.delta_y(), ev.delta_mode());
        let steps = w.wheel.borrow_mut().push(delta);
        if steps != 0 {
            w.runner.with_engine(|e| {
                for _ in 0..steps.unsigned_abs() {
                    e.bump_level(steps.signum() as i64);
                }
            });
        }
    }) as Box<dyn FnMut(_)>);
    if let Some(wnd) = web::window() {
        _ = wnd.add_event_listener_with_callback("wheel", closure.as_ref().unchecked_ref());
    }
    closure.forget();
}
