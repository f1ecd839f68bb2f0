//! wgpu implementation of [`RenderBackend`], shared by the web and native
//! front-ends.

use super::{Frame, GeometryData, RenderBackend, ResourceId, Shading};
use crate::error::BiomeError;
use crate::theme::Rgb;
use fnv::FnvHashMap;
use wgpu::util::DeviceExt;

mod helpers;
mod pipelines;
use pipelines::{Globals, ItemUniform, ScenePipelines, ITEM_STRIDE};

/// Decoded 8-bit RGBA pixels, rows top to bottom.
#[derive(Clone, Debug, PartialEq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Where background images come from.
///
/// Synchronous sources answer [`ImageSource::request`] directly; asynchronous
/// ones return `None` and deliver the result through [`ImageSource::poll`].
pub trait ImageSource {
    fn request(&mut self, url: &str) -> Result<Option<RgbaImage>, BiomeError>;

    /// Loads that finished since the last call, keyed by url.
    fn poll(&mut self) -> Vec<(String, Result<RgbaImage, BiomeError>)>;
}

enum GpuResource {
    Mesh {
        vertices: wgpu::Buffer,
        indices: wgpu::Buffer,
        index_count: u32,
        vertex_count: usize,
    },
    Lines {
        vertices: wgpu::Buffer,
        vertex_count: usize,
    },
    Points {
        centers: wgpu::Buffer,
        count: usize,
    },
    /// `bind_group` stays empty until the image arrives.
    Texture {
        url: String,
        bind_group: Option<wgpu::BindGroup>,
    },
}

impl GpuResource {
    fn kind(&self) -> &'static str {
        match self {
            GpuResource::Mesh { .. } => "mesh",
            GpuResource::Lines { .. } => "lines",
            GpuResource::Points { .. } => "points",
            GpuResource::Texture { .. } => "texture",
        }
    }
}

#[inline]
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[inline]
fn linear(c: Rgb) -> Rgb {
    [srgb_to_linear(c[0]), srgb_to_linear(c[1]), srgb_to_linear(c[2])]
}

pub struct GpuBackend<S: ImageSource> {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipelines: ScenePipelines,
    depth_tex: wgpu::Texture,
    depth_view: wgpu::TextureView,
    globals_buffer: wgpu::Buffer,
    globals_bg: wgpu::BindGroup,
    item_buffer: wgpu::Buffer,
    item_bg: wgpu::BindGroup,
    item_capacity: usize,
    item_staging: Vec<u8>,
    quad_vb: wgpu::Buffer,
    sampler: wgpu::Sampler,
    resources: FnvHashMap<ResourceId, GpuResource>,
    next_id: u32,
    images: S,
}

const INITIAL_ITEM_CAPACITY: usize = 128;

fn create_item_binding(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("item_uniforms"),
        size: capacity as u64 * ITEM_STRIDE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("item_bg"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: std::num::NonZeroU64::new(std::mem::size_of::<ItemUniform>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

impl<S: ImageSource> GpuBackend<S> {
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
        images: S,
    ) -> Result<Self, BiomeError> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| BiomeError::acquisition("no GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await
            .map_err(|e| BiomeError::acquisition(format!("request_device error: {e:?}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| {
                matches!(
                    f,
                    wgpu::TextureFormat::Bgra8UnormSrgb | wgpu::TextureFormat::Rgba8UnormSrgb
                )
            })
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| BiomeError::acquisition("surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!("[gpu] surface {}x{} {:?}", config.width, config.height, format);

        let pipelines = pipelines::create_scene_pipelines(&device, format);
        let (depth_tex, depth_view) =
            helpers::create_depth_target(&device, config.width, config.height);

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &pipelines.globals_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });
        let (item_buffer, item_bg) =
            create_item_binding(&device, &pipelines.item_bgl, INITIAL_ITEM_CAPACITY);

        // Two triangles, corners at ±0.5
        let quad: [f32; 12] = [
            -0.5, -0.5, 0.5, -0.5, 0.5, 0.5, -0.5, -0.5, 0.5, 0.5, -0.5, 0.5,
        ];
        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vb"),
            contents: bytemuck::cast_slice(&quad),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("linear_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            pipelines,
            depth_tex,
            depth_view,
            globals_buffer,
            globals_bg,
            item_buffer,
            item_bg,
            item_capacity: INITIAL_ITEM_CAPACITY,
            item_staging: Vec::new(),
            quad_vb,
            sampler,
            resources: FnvHashMap::default(),
            next_id: 0,
            images,
        })
    }

    pub fn images_mut(&mut self) -> &mut S {
        &mut self.images
    }

    fn insert(&mut self, resource: GpuResource) -> ResourceId {
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        self.resources.insert(id, resource);
        id
    }

    fn upload_image(&self, url: &str, image: &RgbaImage) -> Result<wgpu::BindGroup, BiomeError> {
        let expected = image.width as usize * image.height as usize * 4;
        if image.width == 0 || image.height == 0 || image.pixels.len() != expected {
            return Err(BiomeError::asset(url, "malformed image data"));
        }
        let (texture, view) = helpers::create_texture(
            &self.device,
            url,
            image.width,
            image.height,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        );
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * image.width),
                rows_per_image: Some(image.height),
            },
            wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("background_bg"),
            layout: &self.pipelines.background_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }))
    }

    /// Attach images that finished loading to the textures waiting on them.
    fn poll_images(&mut self) {
        for (url, result) in self.images.poll() {
            let image = match result {
                Ok(image) => image,
                Err(e) => {
                    log::warn!("[gpu] {e}; background stays solid");
                    continue;
                }
            };
            let waiting: Vec<ResourceId> = self
                .resources
                .iter()
                .filter_map(|(id, r)| match r {
                    GpuResource::Texture {
                        url: u,
                        bind_group: None,
                    } if *u == url => Some(*id),
                    _ => None,
                })
                .collect();
            for id in waiting {
                match self.upload_image(&url, &image) {
                    Ok(bg) => {
                        if let Some(GpuResource::Texture { bind_group, .. }) =
                            self.resources.get_mut(&id)
                        {
                            *bind_group = Some(bg);
                        }
                        log::info!("[gpu] background {url} ready");
                    }
                    Err(e) => log::warn!("[gpu] {e}; background stays solid"),
                }
            }
        }
    }

    fn ensure_item_capacity(&mut self, count: usize) {
        if count <= self.item_capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        let (buffer, bg) = create_item_binding(&self.device, &self.pipelines.item_bgl, capacity);
        self.item_buffer = buffer;
        self.item_bg = bg;
        self.item_capacity = capacity;
        log::debug!("[gpu] item uniform capacity now {capacity}");
    }

    fn write_uniforms(&mut self, frame: &Frame<'_>) {
        let inv_view = frame.view.inverse();
        let l = &frame.lighting;
        let ambient = linear(l.ambient_color);
        let light = |i: usize| {
            let p = &l.points[i];
            let c = linear(p.color);
            (
                p.position.extend(p.range).to_array(),
                [
                    c[0] * p.intensity,
                    c[1] * p.intensity,
                    c[2] * p.intensity,
                    1.0,
                ],
            )
        };
        let (key_pos, key_color) = light(0);
        let (fill_pos, fill_color) = light(1);
        let fog = linear(frame.fog.color);
        let globals = Globals {
            view_proj: (frame.projection * frame.view).to_cols_array_2d(),
            camera_pos: frame.camera_position.extend(1.0).to_array(),
            camera_right: inv_view.x_axis.to_array(),
            camera_up: inv_view.y_axis.to_array(),
            ambient: [
                ambient[0] * l.ambient_intensity,
                ambient[1] * l.ambient_intensity,
                ambient[2] * l.ambient_intensity,
                1.0,
            ],
            light_pos: [key_pos, fill_pos],
            light_color: [key_color, fill_color],
            fog: [fog[0], fog[1], fog[2], frame.fog.density],
        };
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let count = frame.items.len();
        self.ensure_item_capacity(count);
        let stride = ITEM_STRIDE as usize;
        self.item_staging.clear();
        self.item_staging.resize(count * stride, 0);
        for (i, item) in frame.items.iter().enumerate() {
            let c = linear([item.color[0], item.color[1], item.color[2]]);
            let e = linear(item.emissive);
            let u = ItemUniform {
                model: item.model.to_cols_array_2d(),
                color: [c[0], c[1], c[2], item.color[3]],
                emissive: [e[0], e[1], e[2], 0.0],
                params: [item.point_size, 0.0, 0.0, 0.0],
            };
            let bytes = bytemuck::bytes_of(&u);
            self.item_staging[i * stride..i * stride + bytes.len()].copy_from_slice(bytes);
        }
        if count > 0 {
            self.queue
                .write_buffer(&self.item_buffer, 0, &self.item_staging);
        }
    }
}

impl<S: ImageSource> RenderBackend for GpuBackend<S> {
    fn create_geometry(
        &mut self,
        label: &str,
        data: GeometryData<'_>,
    ) -> Result<ResourceId, BiomeError> {
        if data.vertex_count() == 0 {
            return Err(BiomeError::acquisition(format!("{label}: empty geometry")));
        }
        let resource = match data {
            GeometryData::Triangles(mesh) => GpuResource::Mesh {
                vertices: self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents: bytemuck::cast_slice(&mesh.vertices),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    }),
                indices: self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents: bytemuck::cast_slice(&mesh.indices),
                        usage: wgpu::BufferUsages::INDEX,
                    }),
                index_count: mesh.indices.len() as u32,
                vertex_count: mesh.vertices.len(),
            },
            GeometryData::Lines(points) => GpuResource::Lines {
                vertices: self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents: bytemuck::cast_slice(points),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    }),
                vertex_count: points.len(),
            },
            GeometryData::Points(points) => GpuResource::Points {
                centers: self
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some(label),
                        contents: bytemuck::cast_slice(points),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    }),
                count: points.len(),
            },
        };
        Ok(self.insert(resource))
    }

    fn update_geometry(&mut self, id: ResourceId, data: GeometryData<'_>) -> Result<(), BiomeError> {
        let resource = self
            .resources
            .get(&id)
            .ok_or_else(|| BiomeError::acquisition(format!("update of unknown geometry {id:?}")))?;
        match (resource, data) {
            (GpuResource::Mesh { vertices, vertex_count, .. }, GeometryData::Triangles(mesh))
                if *vertex_count == mesh.vertices.len() =>
            {
                self.queue
                    .write_buffer(vertices, 0, bytemuck::cast_slice(&mesh.vertices));
            }
            (GpuResource::Lines { vertices, vertex_count }, GeometryData::Lines(points))
                if *vertex_count == points.len() =>
            {
                self.queue
                    .write_buffer(vertices, 0, bytemuck::cast_slice(points));
            }
            (GpuResource::Points { centers, count }, GeometryData::Points(points))
                if *count == points.len() =>
            {
                self.queue
                    .write_buffer(centers, 0, bytemuck::cast_slice(points));
            }
            (r, _) => {
                return Err(BiomeError::acquisition(format!(
                    "{} {id:?} changed shape on update",
                    r.kind()
                )))
            }
        }
        Ok(())
    }

    fn load_texture(&mut self, url: &str) -> Result<ResourceId, BiomeError> {
        let bind_group = match self.images.request(url)? {
            Some(image) => Some(self.upload_image(url, &image)?),
            None => None,
        };
        Ok(self.insert(GpuResource::Texture {
            url: url.to_string(),
            bind_group,
        }))
    }

    fn release(&mut self, id: ResourceId) {
        match self.resources.remove(&id) {
            Some(GpuResource::Mesh {
                vertices, indices, ..
            }) => {
                vertices.destroy();
                indices.destroy();
            }
            Some(GpuResource::Lines { vertices, .. }) => vertices.destroy(),
            Some(GpuResource::Points { centers, .. }) => centers.destroy(),
            Some(GpuResource::Texture { .. }) | None => {}
        }
    }

    fn live_resources(&self) -> usize {
        self.resources.len()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if width == self.config.width && height == self.config.height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        (self.depth_tex, self.depth_view) = helpers::create_depth_target(&self.device, width, height);
    }

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), BiomeError> {
        if let Some(missing) = frame
            .items
            .iter()
            .find(|item| !self.resources.contains_key(&item.geometry))
        {
            return Err(BiomeError::acquisition(format!(
                "draw references released geometry {:?}",
                missing.geometry
            )));
        }
        self.poll_images();

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => return Ok(()),
            Err(e) => return Err(BiomeError::acquisition(format!("surface: {e}"))),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.write_uniforms(frame);

        let clear = linear(frame.clear_color);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear[0] as f64,
                            g: clear[1] as f64,
                            b: clear[2] as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let background = frame.background.and_then(|id| match self.resources.get(&id) {
                Some(GpuResource::Texture {
                    bind_group: Some(bg),
                    ..
                }) => Some(bg),
                _ => None,
            });
            if let Some(bg) = background {
                rpass.set_pipeline(&self.pipelines.background);
                rpass.set_bind_group(0, bg, &[]);
                rpass.draw(0..3, 0..1);
            }

            rpass.set_bind_group(0, &self.globals_bg, &[]);
            for (i, item) in frame.items.iter().enumerate() {
                let offset = (i as u64 * ITEM_STRIDE) as u32;
                let Some(resource) = self.resources.get(&item.geometry) else {
                    continue;
                };
                match resource {
                    GpuResource::Mesh {
                        vertices,
                        indices,
                        index_count,
                        ..
                    } => {
                        rpass.set_pipeline(match item.shading {
                            Shading::Lit => &self.pipelines.lit,
                            Shading::Glow => &self.pipelines.glow,
                        });
                        rpass.set_bind_group(1, &self.item_bg, &[offset]);
                        rpass.set_vertex_buffer(0, vertices.slice(..));
                        rpass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                        rpass.draw_indexed(0..*index_count, 0, 0..1);
                    }
                    GpuResource::Lines {
                        vertices,
                        vertex_count,
                    } => {
                        rpass.set_pipeline(&self.pipelines.lines);
                        rpass.set_bind_group(1, &self.item_bg, &[offset]);
                        rpass.set_vertex_buffer(0, vertices.slice(..));
                        rpass.draw(0..*vertex_count as u32, 0..1);
                    }
                    GpuResource::Points { centers, count } => {
                        rpass.set_pipeline(&self.pipelines.sprites);
                        rpass.set_bind_group(1, &self.item_bg, &[offset]);
                        rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
                        rpass.set_vertex_buffer(1, centers.slice(..));
                        rpass.draw(0..6, 0..*count as u32);
                    }
                    GpuResource::Texture { .. } => {}
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
        output.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_endpoints_are_fixed() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!(srgb_to_linear(0.5) < 0.5);
    }

    #[test]
    fn uniform_blocks_fit_the_item_stride() {
        assert!(std::mem::size_of::<ItemUniform>() as u64 <= ITEM_STRIDE);
        assert_eq!(std::mem::size_of::<Globals>() % 16, 0);
    }
}
