//! The seam between the scene engine and whatever draws it.

use crate::error::BiomeError;
use crate::geometry::Mesh;
use crate::theme::Rgb;
use glam::{Mat4, Vec3};

mod headless;
pub use headless::{FrameStats, HeadlessBackend, HeadlessResource, ResourceKind};

#[cfg(feature = "gpu")]
pub mod gpu;

/// Opaque handle to a backend-owned resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub u32);

/// Geometry uploaded to the backend.
#[derive(Clone, Copy, Debug)]
pub enum GeometryData<'a> {
    /// Indexed triangles.
    Triangles(&'a Mesh),
    /// Line list: every two points form one segment.
    Lines(&'a [Vec3]),
    /// Point cloud drawn as camera-facing sprites.
    Points(&'a [Vec3]),
}

impl GeometryData<'_> {
    /// Number of vertices (or sprites) the geometry occupies.
    pub fn vertex_count(&self) -> usize {
        match self {
            GeometryData::Triangles(m) => m.vertices.len(),
            GeometryData::Lines(p) | GeometryData::Points(p) => p.len(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shading {
    /// Lit by the ambient and point lights, alpha blended, writes depth.
    Lit,
    /// Unlit additive glow, depth tested but not written.
    Glow,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawItem {
    pub geometry: ResourceId,
    pub model: Mat4,
    pub color: [f32; 4],
    /// Added after lighting on lit items; glows ignore it.
    pub emissive: Rgb,
    pub shading: Shading,
    /// Sprite size in world units, used by point geometry only.
    pub point_size: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Rgb,
    pub intensity: f32,
    pub range: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
    pub ambient_color: Rgb,
    pub ambient_intensity: f32,
    pub points: [PointLight; 2],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fog {
    pub color: Rgb,
    pub density: f32,
}

/// Everything the backend needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub clear_color: Rgb,
    /// Background image drawn behind everything when loaded.
    pub background: Option<ResourceId>,
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub lighting: Lighting,
    pub fog: Fog,
    pub items: &'a [DrawItem],
}

/// Resource acquisition and frame submission.
///
/// Every `create_*`/`load_texture` success must eventually be matched by a
/// `release`; [`RenderBackend::live_resources`] reports how many are
/// outstanding.
pub trait RenderBackend {
    fn create_geometry(
        &mut self,
        label: &str,
        data: GeometryData<'_>,
    ) -> Result<ResourceId, BiomeError>;

    /// Overwrite an existing geometry. The vertex count must match the
    /// original upload.
    fn update_geometry(&mut self, id: ResourceId, data: GeometryData<'_>)
        -> Result<(), BiomeError>;

    /// Start loading an image texture. Backends that load asynchronously may
    /// return a handle that stays blank until the image arrives; failures
    /// reported here are [`BiomeError::AssetLoadFailure`].
    fn load_texture(&mut self, url: &str) -> Result<ResourceId, BiomeError>;

    /// Release a resource. Unknown or already released ids are ignored.
    fn release(&mut self, id: ResourceId);

    fn live_resources(&self) -> usize;

    /// Output surface size changed.
    fn resize(&mut self, width: u32, height: u32);

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), BiomeError>;
}
