use super::{Frame, GeometryData, RenderBackend, ResourceId};
use crate::error::BiomeError;
use fnv::FnvHashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKind {
    Triangles,
    Lines,
    Points,
    Texture,
}

#[derive(Clone, Debug)]
pub struct HeadlessResource {
    pub label: String,
    pub kind: ResourceKind,
    pub vertex_count: usize,
    pub updates: u32,
}

/// Summary of the most recent [`RenderBackend::render`] call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub item_count: usize,
    pub clear_color: [f32; 3],
    pub background: Option<ResourceId>,
    pub key_light_intensity: f32,
}

/// Bookkeeping backend with no GPU behind it.
///
/// Tracks every live resource so tests can check acquisition and release, and
/// can be configured to fail texture loads or to run out of resources.
#[derive(Default)]
pub struct HeadlessBackend {
    resources: FnvHashMap<ResourceId, HeadlessResource>,
    next_id: u32,
    fail_textures: bool,
    capacity: Option<usize>,
    frames: u64,
    last_frame: Option<FrameStats>,
    size: (u32, u32),
}

impl HeadlessBackend {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ..Default::default()
        }
    }

    /// Every `load_texture` call fails with an asset error.
    pub fn with_failing_textures(mut self) -> Self {
        self.fail_textures = true;
        self
    }

    /// Acquisition fails once `capacity` resources are live.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn last_frame(&self) -> Option<&FrameStats> {
        self.last_frame.as_ref()
    }

    pub fn resource(&self, id: ResourceId) -> Option<&HeadlessResource> {
        self.resources.get(&id)
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    fn acquire(&mut self, label: &str, kind: ResourceKind, vertex_count: usize) -> Result<ResourceId, BiomeError> {
        if let Some(cap) = self.capacity {
            if self.resources.len() >= cap {
                return Err(BiomeError::acquisition(format!(
                    "out of resources creating {label}"
                )));
            }
        }
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        self.resources.insert(
            id,
            HeadlessResource {
                label: label.to_string(),
                kind,
                vertex_count,
                updates: 0,
            },
        );
        Ok(id)
    }
}

fn kind_of(data: &GeometryData<'_>) -> ResourceKind {
    match data {
        GeometryData::Triangles(_) => ResourceKind::Triangles,
        GeometryData::Lines(_) => ResourceKind::Lines,
        GeometryData::Points(_) => ResourceKind::Points,
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_geometry(
        &mut self,
        label: &str,
        data: GeometryData<'_>,
    ) -> Result<ResourceId, BiomeError> {
        self.acquire(label, kind_of(&data), data.vertex_count())
    }

    fn update_geometry(&mut self, id: ResourceId, data: GeometryData<'_>) -> Result<(), BiomeError> {
        let res = self
            .resources
            .get_mut(&id)
            .ok_or_else(|| BiomeError::acquisition(format!("update of unknown geometry {id:?}")))?;
        if res.kind != kind_of(&data) || res.vertex_count != data.vertex_count() {
            return Err(BiomeError::acquisition(format!(
                "geometry {} changed shape on update",
                res.label
            )));
        }
        res.updates += 1;
        Ok(())
    }

    fn load_texture(&mut self, url: &str) -> Result<ResourceId, BiomeError> {
        if self.fail_textures {
            return Err(BiomeError::asset(url, "texture loading disabled"));
        }
        self.acquire(url, ResourceKind::Texture, 0)
    }

    fn release(&mut self, id: ResourceId) {
        self.resources.remove(&id);
    }

    fn live_resources(&self) -> usize {
        self.resources.len()
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn render(&mut self, frame: &Frame<'_>) -> Result<(), BiomeError> {
        for item in frame.items {
            if !self.resources.contains_key(&item.geometry) {
                return Err(BiomeError::acquisition(format!(
                    "draw references released geometry {:?}",
                    item.geometry
                )));
            }
        }
        self.frames += 1;
        self.last_frame = Some(FrameStats {
            item_count: frame.items.len(),
            clear_color: frame.clear_color,
            background: frame.background,
            key_light_intensity: frame.lighting.points[0].intensity,
        });
        Ok(())
    }
}
