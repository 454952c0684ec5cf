use crate::dom;
use crate::frame::CanvasSlot;
use magnitude_core::{BackendError, BackendFactory, RenderBackend};
use web_sys as web;

mod canvas;
mod gpu;
mod pipeline;

pub use canvas::CanvasBackend;
pub use gpu::GpuBackend;

/// The instanced GPU path, or `None` when no adapter/device is available.
pub async fn create_gpu_backend(
    canvas: &web::HtmlCanvasElement,
) -> Option<Box<dyn RenderBackend>> {
    match GpuBackend::new(canvas.clone()).await {
        Ok(g) => Some(Box::new(g)),
        Err(e) => {
            log::warn!("[backend] GPU init failed: {:?}", e);
            None
        }
    }
}

/// Factory for the CPU path. Draws into the current canvas when it can still
/// hand out a 2D context, otherwise into a replacement element.
pub fn canvas_fallback(slot: CanvasSlot) -> BackendFactory {
    Box::new(move || {
        let current = slot.borrow().clone();
        let (canvas, ctx) = match dom::context_2d(&current) {
            Ok(ctx) => (current, ctx),
            Err(_) => {
                let fresh = dom::replace_canvas(&current)
                    .map_err(|e| BackendError::Unavailable(e.to_string()))?;
                let ctx = dom::context_2d(&fresh)
                    .map_err(|e| BackendError::Unavailable(e.to_string()))?;
                log::info!("[backend] replaced canvas for 2D rendering");
                *slot.borrow_mut() = fresh.clone();
                (fresh, ctx)
            }
        };
        Ok(Box::new(CanvasBackend::new(canvas, ctx)) as Box<dyn RenderBackend>)
    })
}
