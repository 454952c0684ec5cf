use magnitude_core::{BackendError, BackendKind, FrameView, RenderBackend};
use web_sys as web;

fn css_rgb(c: [f32; 4]) -> String {
    let ch = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("rgb({},{},{})", ch(c[0]), ch(c[1]), ch(c[2]))
}

/// CPU path: the same plan and instance arrays, drawn with `fillRect`.
pub struct CanvasBackend {
    canvas: web::HtmlCanvasElement,
    ctx: web::CanvasRenderingContext2d,
    alpha: f64,
}

impl CanvasBackend {
    pub fn new(canvas: web::HtmlCanvasElement, ctx: web::CanvasRenderingContext2d) -> Self {
        Self {
            canvas,
            ctx,
            alpha: 1.0,
        }
    }

    #[inline]
    fn set_alpha(&mut self, a: f64) {
        if (a - self.alpha).abs() > 1e-3 {
            self.ctx.set_global_alpha(a);
            self.alpha = a;
        }
    }
}

impl RenderBackend for CanvasBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Canvas2d
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if self.canvas.width() != width {
            self.canvas.set_width(width);
        }
        if self.canvas.height() != height {
            self.canvas.set_height(height);
        }
        // resizing resets context state
        self.alpha = 1.0;
    }

    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), BackendError> {
        let plan = frame.plan;
        let [w, h] = plan.viewport;
        let [cx, cy] = plan.center;

        self.set_alpha(1.0);
        self.ctx.set_fill_style_str(&css_rgb(plan.background));
        self.ctx.fill_rect(0.0, 0.0, w as f64, h as f64);

        for layer in &plan.layers {
            let instances = frame.instances(layer);
            for batch in layer.category_batches() {
                let color = batch.category.color(frame.palette);
                let base_alpha = color[3] * layer.alpha;
                if base_alpha <= 0.0 {
                    continue;
                }
                self.ctx.set_fill_style_str(&css_rgb(color));
                let side_base = batch.side.base_index() as u32;
                for i in batch.range.clone() {
                    let Some(inst) = instances.get(i as usize) else {
                        return Err(BackendError::Draw(format!("instance {i} out of range")));
                    };
                    let alpha = if batch.category.is_active() {
                        base_alpha * layer.partial_alpha(batch.side, i - side_base)
                    } else {
                        base_alpha
                    };
                    if alpha <= 0.0 {
                        continue;
                    }
                    self.set_alpha(alpha as f64);
                    let half = inst.scale * 0.5 * layer.scale;
                    let x = cx + inst.local[0] * layer.scale - half;
                    let y = cy + inst.local[1] * layer.scale - half;
                    self.ctx
                        .fill_rect(x as f64, y as f64, (half * 2.0) as f64, (half * 2.0) as f64);
                }
            }
        }

        for q in &plan.overlay {
            if q.color[3] <= 0.0 {
                continue;
            }
            self.set_alpha(q.color[3] as f64);
            self.ctx.set_fill_style_str(&css_rgb(q.color));
            self.ctx.fill_rect(
                (q.center[0] - q.half[0]) as f64,
                (q.center[1] - q.half[1]) as f64,
                (q.half[0] * 2.0) as f64,
                (q.half[1] * 2.0) as f64,
            );
        }
        self.set_alpha(1.0);
        Ok(())
    }
}
