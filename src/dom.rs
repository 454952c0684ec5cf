use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn add_click_listener(
    document: &web::Document,
    element_id: &str,
    mut handler: impl FnMut() + 'static,
) {
    if let Some(el) = document.get_element_by_id(element_id) {
        let closure =
            wasm_bindgen::closure::Closure::wrap(Box::new(move || handler()) as Box<dyn FnMut()>);
        _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// Match the canvas backing store to its CSS size times the device pixel
/// ratio, capped at `max_dpr`. Returns the new backing size.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement, max_dpr: f64) -> (u32, u32) {
    let dpr = web::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .min(max_dpr)
        .max(0.5);
    let rect = canvas.get_bounding_client_rect();
    let w_px = ((rect.width() * dpr) as u32).max(1);
    let h_px = ((rect.height() * dpr) as u32).max(1);
    if canvas.width() != w_px {
        canvas.set_width(w_px);
    }
    if canvas.height() != h_px {
        canvas.set_height(h_px);
    }
    (w_px, h_px)
}

/// Swap `old` for a fresh canvas with the same id, classes, style and
/// backing size. A canvas that handed out a GPU context can never give a 2D
/// one.
pub fn replace_canvas(old: &web::HtmlCanvasElement) -> anyhow::Result<web::HtmlCanvasElement> {
    let document = old
        .owner_document()
        .ok_or_else(|| anyhow::anyhow!("canvas has no document"))?;
    let fresh: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    fresh.set_id(&old.id());
    fresh.set_class_name(&old.class_name());
    if let Some(style) = old.get_attribute("style") {
        _ = fresh.set_attribute("style", &style);
    }
    fresh.set_width(old.width());
    fresh.set_height(old.height());
    old.replace_with_with_node_1(&fresh)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(fresh)
}

pub fn context_2d(
    canvas: &web::HtmlCanvasElement,
) -> anyhow::Result<web::CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
        .dyn_into::<web::CanvasRenderingContext2d>()
        .map_err(|e| anyhow::anyhow!("{:?}", e))
}
