use super::pipeline::{create_block_pipelines, BlockPipelines, DrawUniforms};
use crate::constants::{MAX_DRAW_SLOTS, PROBE_CANVAS_PX, PROBE_INSET_PX};
use magnitude_core::constants::{BLOCKS_PER_SIDE, FIELD_SIDES};
use magnitude_core::{
    BackendError, BackendKind, FrameView, InstanceRaw, QuadInstance, RenderBackend, SlotId,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

// Base batches draw every block fully opaque.
const FULLY_SHOWN: f32 = 1.0e9;

struct SlotBuffer {
    buffer: wgpu::Buffer,
    revision: Option<u64>,
}

struct DrawCall {
    slot: SlotId,
    uniform: u32,
    range: std::ops::Range<u32>,
}

/// Reads back one presented pixel through a tiny 2D canvas.
struct PixelProbe {
    ctx: web::CanvasRenderingContext2d,
}

impl PixelProbe {
    fn new(document: &web::Document) -> Option<Self> {
        let el: web::HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
        el.set_width(PROBE_CANVAS_PX);
        el.set_height(PROBE_CANVAS_PX);
        let ctx = crate::dom::context_2d(&el).ok()?;
        Some(Self { ctx })
    }

    fn sample(&self, source: &web::HtmlCanvasElement) -> Option<[u8; 4]> {
        let px = PROBE_CANVAS_PX as f64;
        self.ctx.clear_rect(0.0, 0.0, px, px);
        self.ctx
            .draw_image_with_html_canvas_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                source,
                PROBE_INSET_PX,
                PROBE_INSET_PX,
                1.0,
                1.0,
                0.0,
                0.0,
                px,
                px,
            )
            .ok()?;
        let data = self.ctx.get_image_data(0.0, 0.0, 1.0, 1.0).ok()?.data().0;
        match data.as_slice() {
            [r, g, b, a, ..] => Some([*r, *g, *b, *a]),
            _ => None,
        }
    }
}

pub struct GpuBackend {
    canvas: web::HtmlCanvasElement,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipelines: BlockPipelines,
    slots: [SlotBuffer; 2],
    overlay: wgpu::Buffer,
    overlay_capacity: usize,
    uniform_bytes: Vec<u8>,
    draws: Vec<DrawCall>,
    lost: Arc<AtomicBool>,
    probe: Option<PixelProbe>,
}

impl GpuBackend {
    pub async fn new(canvas: web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let info = adapter.get_info();
        log::info!("[backend] adapter {:?} ({})", info.backend, info.name);
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: Some("magnitude-device"),
                },
                None,
            )
            .await
            .map_err(|e| anyhow::anyhow!(format!("request_device error: {:?}", e)))?;

        let lost = Arc::new(AtomicBool::new(false));
        {
            let lost = lost.clone();
            device.set_device_lost_callback(move |reason, msg| {
                log::warn!("[backend] device lost ({:?}): {}", reason, msg);
                lost.store(true, Ordering::SeqCst);
            });
        }
        {
            let lost = lost.clone();
            let closure = Closure::wrap(Box::new(move |_ev: web::Event| {
                log::warn!("[backend] webglcontextlost");
                lost.store(true, Ordering::SeqCst);
            }) as Box<dyn FnMut(_)>);
            _ = canvas.add_event_listener_with_callback(
                "webglcontextlost",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Rgba8Unorm
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("surface reports no formats"))?;
        let alpha_mode = if caps.alpha_modes.contains(&wgpu::CompositeAlphaMode::Opaque) {
            wgpu::CompositeAlphaMode::Opaque
        } else {
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let pipelines = create_block_pipelines(&device, format, MAX_DRAW_SLOTS);
        let slot_bytes = (BLOCKS_PER_SIDE * FIELD_SIDES * std::mem::size_of::<InstanceRaw>()) as u64;
        let make_slot = |label: &str| SlotBuffer {
            buffer: device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: slot_bytes,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }),
            revision: None,
        };
        let slots = [make_slot("field_a"), make_slot("field_b")];
        let overlay_capacity = 256;
        let overlay = create_overlay_buffer(&device, overlay_capacity);
        let probe = canvas.owner_document().and_then(|d| PixelProbe::new(&d));

        Ok(Self {
            canvas,
            surface,
            device,
            queue,
            config,
            pipelines,
            slots,
            overlay,
            overlay_capacity,
            uniform_bytes: Vec::new(),
            draws: Vec::new(),
            lost,
            probe,
        })
    }

    fn upload_fields(&mut self, frame: &FrameView<'_>) {
        for layer in &frame.plan.layers {
            let revision = frame.revision(layer);
            let slot = &mut self.slots[layer.slot.index()];
            if slot.revision == Some(revision) {
                continue;
            }
            let data = frame.instances(layer);
            self.queue
                .write_buffer(&slot.buffer, 0, bytemuck::cast_slice(data));
            slot.revision = Some(revision);
        }
    }

    fn upload_overlay(&mut self, quads: &[QuadInstance]) {
        if quads.len() > self.overlay_capacity {
            self.overlay_capacity = quads.len().next_power_of_two();
            self.overlay = create_overlay_buffer(&self.device, self.overlay_capacity);
        }
        if !quads.is_empty() {
            self.queue
                .write_buffer(&self.overlay, 0, bytemuck::cast_slice(quads));
        }
    }

    /// Pack one uniform slot per category batch plus one for the overlay.
    /// Returns the overlay slot index.
    fn build_draws(&mut self, frame: &FrameView<'_>) -> u32 {
        let plan = frame.plan;
        let stride = self.pipelines.stride as usize;
        self.uniform_bytes.clear();
        self.draws.clear();
        let push = |bytes: &mut Vec<u8>, u: DrawUniforms| -> u32 {
            let index = (bytes.len() / stride) as u32;
            bytes.extend_from_slice(bytemuck::bytes_of(&u));
            bytes.resize((index as usize + 1) * stride, 0);
            index
        };
        for layer in &plan.layers {
            for batch in layer.category_batches() {
                if self.draws.len() + 1 >= MAX_DRAW_SLOTS {
                    break;
                }
                let base = batch.side.base_index() as u32;
                let u = DrawUniforms {
                    viewport: plan.viewport,
                    center: plan.center,
                    color: batch.category.color(frame.palette),
                    side_shown: if batch.category.is_active() {
                        layer.shown[batch.side.index()]
                    } else {
                        FULLY_SHOWN
                    },
                    layer_scale: layer.scale,
                    layer_alpha: layer.alpha,
                    first_in_side: (batch.range.start - base) as f32,
                };
                let uniform = push(&mut self.uniform_bytes, u);
                self.draws.push(DrawCall {
                    slot: layer.slot,
                    uniform,
                    range: batch.range.clone(),
                });
            }
        }
        let overlay = DrawUniforms {
            viewport: plan.viewport,
            center: plan.center,
            color: [1.0; 4],
            side_shown: FULLY_SHOWN,
            layer_scale: 1.0,
            layer_alpha: 1.0,
            first_in_side: 0.0,
        };
        push(&mut self.uniform_bytes, overlay)
    }
}

fn create_overlay_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("overlay_quads"),
        size: (capacity.max(1) * std::mem::size_of::<QuadInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl RenderBackend for GpuBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Gpu
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width != self.config.width || height != self.config.height {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn draw(&mut self, frame: &FrameView<'_>) -> Result<(), BackendError> {
        if self.is_context_lost() {
            return Err(BackendError::ContextLost);
        }
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .map_err(|e| BackendError::Surface(e.to_string()))?
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(BackendError::Surface(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.upload_fields(frame);
        self.upload_overlay(&frame.plan.overlay);
        let overlay_uniform = self.build_draws(frame);
        self.queue
            .write_buffer(&self.pipelines.uniform_buffer, 0, &self.uniform_bytes);

        let stride = self.pipelines.stride;
        let quad_count = frame.plan.overlay.len() as u32;
        let bg = frame.plan.background;
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("field_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg[0] as f64,
                            g: bg[1] as f64,
                            b: bg[2] as f64,
                            a: bg[3] as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            let item = std::mem::size_of::<InstanceRaw>() as u64;
            rpass.set_pipeline(&self.pipelines.blocks);
            for d in &self.draws {
                if d.range.is_empty() {
                    continue;
                }
                let buf = &self.slots[d.slot.index()].buffer;
                let offset = (d.uniform as u64 * stride) as u32;
                rpass.set_bind_group(0, &self.pipelines.bind_group, &[offset]);
                rpass.set_vertex_buffer(
                    0,
                    buf.slice(d.range.start as u64 * item..d.range.end as u64 * item),
                );
                rpass.draw(0..6, 0..d.range.len() as u32);
            }
            if quad_count > 0 {
                let offset = (overlay_uniform as u64 * stride) as u32;
                let bytes = quad_count as u64 * std::mem::size_of::<QuadInstance>() as u64;
                rpass.set_pipeline(&self.pipelines.quads);
                rpass.set_bind_group(0, &self.pipelines.bind_group, &[offset]);
                rpass.set_vertex_buffer(0, self.overlay.slice(0..bytes));
                rpass.draw(0..6, 0..quad_count);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }

    fn is_context_lost(&self) -> bool {
        self.lost.load(Ordering::SeqCst)
    }

    fn sample_pixel(&mut self) -> Option<[u8; 4]> {
        self.probe.as_ref()?.sample(&self.canvas)
    }
}
