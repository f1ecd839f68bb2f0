use super::helpers::{self, ADDITIVE};
use crate::geometry::MeshVertex;
use std::num::NonZeroU64;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct Globals {
    pub(crate) view_proj: [[f32; 4]; 4],
    pub(crate) camera_pos: [f32; 4],
    pub(crate) camera_right: [f32; 4],
    pub(crate) camera_up: [f32; 4],
    pub(crate) ambient: [f32; 4],
    pub(crate) light_pos: [[f32; 4]; 2],
    pub(crate) light_color: [[f32; 4]; 2],
    pub(crate) fog: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct ItemUniform {
    pub(crate) model: [[f32; 4]; 4],
    pub(crate) color: [f32; 4],
    pub(crate) emissive: [f32; 4],
    pub(crate) params: [f32; 4],
}

/// Stride between per-item uniform blocks; the WebGPU minimum for dynamic
/// offsets.
pub(crate) const ITEM_STRIDE: u64 = 256;

/// Bind group layouts and pipelines for one surface format.
pub(crate) struct ScenePipelines {
    pub(crate) globals_bgl: wgpu::BindGroupLayout, // globals uniform
    pub(crate) item_bgl: wgpu::BindGroupLayout,    // per-item uniform, dynamic offset
    pub(crate) background_bgl: wgpu::BindGroupLayout, // tex+sampler
    pub(crate) lit: wgpu::RenderPipeline,
    pub(crate) glow: wgpu::RenderPipeline,
    pub(crate) lines: wgpu::RenderPipeline,
    pub(crate) sprites: wgpu::RenderPipeline,
    pub(crate) background: wgpu::RenderPipeline,
}

fn uniform_entry(dynamic: bool, size: u64) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: dynamic,
            min_binding_size: NonZeroU64::new(size),
        },
        count: None,
    }
}

const MESH_ATTRS: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];
const LINE_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const CORNER_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];
const CENTER_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];

#[allow(clippy::too_many_arguments)]
fn make_pipeline(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    vs: &str,
    fs: &str,
    buffers: &[wgpu::VertexBufferLayout<'_>],
    topology: wgpu::PrimitiveTopology,
    format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
    depth: wgpu::DepthStencilState,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some(vs),
            buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(depth),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some(fs),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}

pub(crate) fn create_scene_pipelines(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
) -> ScenePipelines {
    let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: wgpu::ShaderSource::Wgsl(crate::SCENE_WGSL.into()),
    });
    let background_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("background_shader"),
        source: wgpu::ShaderSource::Wgsl(crate::BACKGROUND_WGSL.into()),
    });

    let globals_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("globals_bgl"),
        entries: &[uniform_entry(
            false,
            std::mem::size_of::<Globals>() as u64,
        )],
    });
    let item_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("item_bgl"),
        entries: &[uniform_entry(
            true,
            std::mem::size_of::<ItemUniform>() as u64,
        )],
    });
    let background_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("background_bgl"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pl_scene"),
        bind_group_layouts: &[&globals_bgl, &item_bgl],
        push_constant_ranges: &[],
    });
    let background_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pl_background"),
        bind_group_layouts: &[&background_bgl],
        push_constant_ranges: &[],
    });

    let mesh_buffers = [wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &MESH_ATTRS,
    }];
    let line_buffers = [wgpu::VertexBufferLayout {
        array_stride: (std::mem::size_of::<f32>() * 3) as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &LINE_ATTRS,
    }];
    let sprite_buffers = [
        // slot 0: quad corners
        wgpu::VertexBufferLayout {
            array_stride: (std::mem::size_of::<f32>() * 2) as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &CORNER_ATTRS,
        },
        // slot 1: sprite centres
        wgpu::VertexBufferLayout {
            array_stride: (std::mem::size_of::<f32>() * 3) as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &CENTER_ATTRS,
        },
    ];

    use wgpu::CompareFunction::{Always, Less};
    use wgpu::PrimitiveTopology::{LineList, TriangleList};

    let lit = make_pipeline(
        device,
        "lit_pipeline",
        &scene_layout,
        &scene_shader,
        "vs_mesh",
        "fs_lit",
        &mesh_buffers,
        TriangleList,
        format,
        wgpu::BlendState::ALPHA_BLENDING,
        helpers::depth_state(true, Less),
    );
    let glow = make_pipeline(
        device,
        "glow_pipeline",
        &scene_layout,
        &scene_shader,
        "vs_mesh",
        "fs_glow",
        &mesh_buffers,
        TriangleList,
        format,
        ADDITIVE,
        helpers::depth_state(false, Less),
    );
    let lines = make_pipeline(
        device,
        "line_pipeline",
        &scene_layout,
        &scene_shader,
        "vs_line",
        "fs_glow",
        &line_buffers,
        LineList,
        format,
        ADDITIVE,
        helpers::depth_state(false, Less),
    );
    let sprites = make_pipeline(
        device,
        "sprite_pipeline",
        &scene_layout,
        &scene_shader,
        "vs_sprite",
        "fs_sprite",
        &sprite_buffers,
        TriangleList,
        format,
        ADDITIVE,
        helpers::depth_state(false, Less),
    );
    let background = make_pipeline(
        device,
        "background_pipeline",
        &background_layout,
        &background_shader,
        "vs_main",
        "fs_main",
        &[],
        TriangleList,
        format,
        wgpu::BlendState::REPLACE,
        helpers::depth_state(false, Always),
    );

    ScenePipelines {
        globals_bgl,
        item_bgl,
        background_bgl,
        lit,
        glow,
        lines,
        sprites,
        background,
    }
}
