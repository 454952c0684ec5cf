use magnitude_core::{InstanceRaw, QuadInstance};
use std::num::NonZeroU64;

/// Per-draw uniforms; one slot per draw call at a dynamic offset.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct DrawUniforms {
    pub(crate) viewport: [f32; 2],
    pub(crate) center: [f32; 2],
    pub(crate) color: [f32; 4],
    pub(crate) side_shown: f32,
    pub(crate) layer_scale: f32,
    pub(crate) layer_alpha: f32,
    pub(crate) first_in_side: f32,
}

pub(crate) struct BlockPipelines {
    pub(crate) blocks: wgpu::RenderPipeline,
    pub(crate) quads: wgpu::RenderPipeline,
    pub(crate) uniform_buffer: wgpu::Buffer,
    pub(crate) bind_group: wgpu::BindGroup,
    /// Byte distance between uniform slots.
    pub(crate) stride: u64,
}

fn block_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32,
                offset: 8,
                shader_location: 1,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32,
                offset: 12,
                shader_location: 2,
            },
        ],
    }
}

fn quad_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 0,
                shader_location: 0,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: 8,
                shader_location: 1,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x4,
                offset: 16,
                shader_location: 2,
            },
        ],
    }
}

pub(crate) fn create_block_pipelines(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    max_slots: usize,
) -> BlockPipelines {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("blocks_shader"),
        source: wgpu::ShaderSource::Wgsl(magnitude_core::BLOCKS_WGSL.into()),
    });
    let uniform_size = std::mem::size_of::<DrawUniforms>() as u64;
    let align = device.limits().min_uniform_buffer_offset_alignment.max(1) as u64;
    let stride = uniform_size.div_ceil(align) * align;

    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("blocks_bgl"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: true,
                min_binding_size: NonZeroU64::new(uniform_size),
            },
            count: None,
        }],
    });
    let pl = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("blocks_pl"),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });
    let make = |label: &str, vs: &str, layout: wgpu::VertexBufferLayout<'static>| {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pl),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(vs),
                buffers: &[layout],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            cache: None,
            multiview: None,
        })
    };
    let blocks = make("blocks_pipeline", "vs_block", block_layout());
    let quads = make("quads_pipeline", "vs_quad", quad_layout());

    let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("draw_uniforms"),
        size: stride * max_slots as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("blocks_bg"),
        layout: &bgl,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &uniform_buffer,
                offset: 0,
                size: NonZeroU64::new(uniform_size),
            }),
        }],
    });

    BlockPipelines {
        blocks,
        quads,
        uniform_buffer,
        bind_group,
        stride,
    }
}
