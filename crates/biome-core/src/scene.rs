//! Scene construction and the live scene graph.
//!
//! [`SceneBuilder::build`] turns a theme and a layout policy into nodes, edges,
//! a particle field and lights, acquiring backend resources along the way.
//! [`SceneGraph::teardown`] gives every one of them back.

use crate::backend::{
    DrawItem, Fog, Frame, GeometryData, Lighting, PointLight, RenderBackend, ResourceId, Shading,
};
use crate::camera::CameraState;
use crate::constants::*;
use crate::error::BiomeError;
use crate::geometry::{self, CatmullRom, Mesh};
use crate::layout::{self, LayoutPolicy, FIXED_LINKS, FIXED_NODES};
use crate::theme::{NodeShape, Rgb, Theme};
use glam::{Mat4, Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use std::f32::consts::TAU;

/// Runtime build options.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SceneConfig {
    pub policy: LayoutPolicy,
    /// Fixed seed for reproducible layouts; `None` draws from entropy.
    pub seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerKind {
    Core,
    InnerGlow,
    OuterGlow,
    Halo,
}

/// One nested shape of a node. All layers share the node's transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeLayer {
    pub kind: LayerKind,
    pub scale: f32,
    pub color: Rgb,
    pub opacity: f32,
    /// Light the layer gives off regardless of the scene lights.
    pub emissive: Rgb,
}

impl NodeLayer {
    pub fn pulses(&self) -> bool {
        self.kind != LayerKind::Core
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub index: usize,
    pub anchor: Vec3,
    pub position: Vec3,
    pub size: f32,
    pub phase: f32,
    pub speed: f32,
    /// Current glow-layer pulse multiplier.
    pub glow_scale: f32,
    pub layers: SmallVec<[NodeLayer; 4]>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ribbon {
    pub index: usize,
    pub accent: bool,
    pub color: Rgb,
    /// Offset of the curve midpoint from the chord centre, fixed at creation.
    pub midpoint_offset: Vec3,
    pub outer: ResourceId,
    pub inner: ResourceId,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EdgeKind {
    /// Segment between the two live node positions.
    Straight { endpoints: [Vec3; 2] },
    Ribbon(Ribbon),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub a: usize,
    pub b: usize,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn ribbon(&self) -> Option<&Ribbon> {
        match &self.kind {
            EdgeKind::Ribbon(r) => Some(r),
            EdgeKind::Straight { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleField {
    pub points: Vec<Vec3>,
    pub color: Rgb,
    /// `(x, y)` rotation of the whole field in radians.
    pub rotation: Vec2,
    pub geometry: ResourceId,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneBackground {
    pub color: Rgb,
    /// Present only when the backend accepted the image request.
    pub texture: Option<ResourceId>,
}

pub struct SceneGraph {
    theme: &'static Theme,
    policy: LayoutPolicy,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub particles: ParticleField,
    pub lighting: Lighting,
    pub fog: Fog,
    pub background: SceneBackground,
    /// Rotation of the node group.
    pub root_rotation: Vec2,
    /// Rotation of the sibling edge group, kept locked to the node group.
    pub edge_rotation: Vec2,
    node_mesh: ResourceId,
    glow_mesh: ResourceId,
    edge_lines: Option<ResourceId>,
    line_scratch: Vec<Vec3>,
    acquired: Vec<ResourceId>,
}

pub struct SceneBuilder;

impl SceneBuilder {
    /// Build a scene for `theme`, acquiring its resources from `backend`.
    ///
    /// A failed background image falls back to the solid color. Any other
    /// failure releases what was already acquired and is returned.
    pub fn build<B: RenderBackend + ?Sized>(
        theme: &'static Theme,
        config: &SceneConfig,
        backend: &mut B,
    ) -> Result<SceneGraph, BiomeError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut acquired = Vec::new();
        match build_parts(theme, config.policy, &mut rng, backend, &mut acquired) {
            Ok(mut scene) => {
                scene.acquired = acquired;
                log::info!(
                    "[scene] built {} ({}): nodes={} edges={} particles={} resources={}",
                    theme.name,
                    config.policy.name(),
                    scene.nodes.len(),
                    scene.edges.len(),
                    scene.particles.points.len(),
                    scene.acquired.len()
                );
                Ok(scene)
            }
            Err(e) => {
                for id in acquired {
                    backend.release(id);
                }
                log::error!("[scene] build of {} failed: {e}", theme.name);
                Err(e)
            }
        }
    }
}

fn acquire<B: RenderBackend + ?Sized>(
    backend: &mut B,
    acquired: &mut Vec<ResourceId>,
    label: &str,
    data: GeometryData<'_>,
) -> Result<ResourceId, BiomeError> {
    let id = backend.create_geometry(label, data)?;
    acquired.push(id);
    Ok(id)
}

fn node_layers(theme: &Theme, with_halo: bool) -> SmallVec<[NodeLayer; 4]> {
    let mut layers = SmallVec::new();
    layers.push(NodeLayer {
        kind: LayerKind::Core,
        scale: 1.0,
        color: theme.node_core,
        opacity: CORE_OPACITY,
        emissive: theme.node_glow.map(|c| c * CORE_EMISSIVE_INTENSITY),
    });
    layers.push(NodeLayer {
        kind: LayerKind::InnerGlow,
        scale: INNER_GLOW_SCALE,
        color: theme.node_glow,
        opacity: INNER_GLOW_OPACITY,
        emissive: NO_EMISSION,
    });
    layers.push(NodeLayer {
        kind: LayerKind::OuterGlow,
        scale: OUTER_GLOW_SCALE,
        color: theme.node_outer,
        opacity: OUTER_GLOW_OPACITY,
        emissive: NO_EMISSION,
    });
    if with_halo {
        layers.push(NodeLayer {
            kind: LayerKind::Halo,
            scale: HALO_SCALE,
            color: theme.node_glow,
            opacity: HALO_OPACITY,
            emissive: NO_EMISSION,
        });
    }
    layers
}

fn make_node<R: Rng>(rng: &mut R, index: usize, anchor: Vec3, size: f32, layers: SmallVec<[NodeLayer; 4]>) -> Node {
    Node {
        index,
        anchor,
        position: anchor,
        size,
        phase: rng.gen_range(0.0..TAU),
        speed: rng.gen_range(FLOAT_SPEED_MIN..FLOAT_SPEED_MAX),
        glow_scale: 1.0,
        layers,
    }
}

fn ribbon_meshes(a: Vec3, b: Vec3, midpoint_offset: Vec3) -> (Mesh, Mesh) {
    let mid = (a + b) * 0.5 + midpoint_offset;
    let curve = CatmullRom::new(vec![a, mid, b]);
    (
        geometry::tube(
            &curve,
            RIBBON_TUBULAR_SEGMENTS,
            RIBBON_OUTER_RADIUS,
            RIBBON_RADIAL_SEGMENTS,
        ),
        geometry::tube(
            &curve,
            RIBBON_TUBULAR_SEGMENTS,
            RIBBON_INNER_RADIUS,
            RIBBON_RADIAL_SEGMENTS,
        ),
    )
}

fn lighting_for(theme: &Theme) -> Lighting {
    Lighting {
        ambient_color: [1.0, 1.0, 1.0],
        ambient_intensity: AMBIENT_INTENSITY,
        points: [
            PointLight {
                position: KEY_LIGHT_POSITION,
                color: theme.node_glow,
                intensity: KEY_LIGHT_INTENSITY,
                range: LIGHT_RANGE,
            },
            PointLight {
                position: FILL_LIGHT_POSITION,
                color: theme.node_glow,
                intensity: FILL_LIGHT_INTENSITY,
                range: LIGHT_RANGE,
            },
        ],
    }
}

fn build_parts<B: RenderBackend + ?Sized>(
    theme: &'static Theme,
    policy: LayoutPolicy,
    rng: &mut StdRng,
    backend: &mut B,
    acquired: &mut Vec<ResourceId>,
) -> Result<SceneGraph, BiomeError> {
    let node_mesh_data = match theme.node_shape {
        NodeShape::Sphere => geometry::uv_sphere(SPHERE_SEGMENTS, SPHERE_RINGS),
        NodeShape::Octahedron => geometry::octahedron(),
    };
    let node_mesh = acquire(
        backend,
        acquired,
        "node_mesh",
        GeometryData::Triangles(&node_mesh_data),
    )?;
    // glow shells stay round whatever the core shape
    let glow_mesh = match theme.node_shape {
        NodeShape::Sphere => node_mesh,
        NodeShape::Octahedron => acquire(
            backend,
            acquired,
            "glow_mesh",
            GeometryData::Triangles(&geometry::uv_sphere(SPHERE_SEGMENTS, SPHERE_RINGS)),
        )?,
    };

    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut edge_lines = None;
    let mut line_scratch = Vec::new();

    match policy {
        LayoutPolicy::Procedural {
            node_count,
            threshold,
        } => {
            for i in 0..node_count {
                let size = rng.gen_range(NODE_SIZE_MIN..NODE_SIZE_MAX);
                let anchor = layout::sample_in_ellipsoid(rng, NODE_VOLUME_SEMI_AXES);
                nodes.push(make_node(rng, i, anchor, size, node_layers(theme, false)));
            }
            let anchors: Vec<Vec3> = nodes.iter().map(|n| n.anchor).collect();
            for (a, b) in layout::edges_within_threshold(&anchors, threshold) {
                let endpoints = [anchors[a], anchors[b]];
                line_scratch.extend_from_slice(&endpoints);
                edges.push(Edge {
                    a,
                    b,
                    kind: EdgeKind::Straight { endpoints },
                });
            }
            if !line_scratch.is_empty() {
                edge_lines = Some(acquire(
                    backend,
                    acquired,
                    "edge_lines",
                    GeometryData::Lines(&line_scratch),
                )?);
            }
        }
        LayoutPolicy::Fixed => {
            for (i, fixed) in FIXED_NODES.iter().enumerate() {
                let anchor = Vec3::from(fixed.anchor);
                nodes.push(make_node(rng, i, anchor, fixed.size, node_layers(theme, true)));
            }
            for (index, &(a, b)) in FIXED_LINKS.iter().enumerate() {
                let accent = layout::is_accent(index);
                let j = RIBBON_MIDPOINT_JITTER;
                let midpoint_offset = Vec3::new(
                    rng.gen_range(-j..=j),
                    rng.gen_range(-j..=j),
                    rng.gen_range(-j..=j),
                );
                let (outer_mesh, inner_mesh) =
                    ribbon_meshes(nodes[a].anchor, nodes[b].anchor, midpoint_offset);
                let outer = acquire(
                    backend,
                    acquired,
                    &format!("ribbon_{index}_outer"),
                    GeometryData::Triangles(&outer_mesh),
                )?;
                let inner = acquire(
                    backend,
                    acquired,
                    &format!("ribbon_{index}_inner"),
                    GeometryData::Triangles(&inner_mesh),
                )?;
                edges.push(Edge {
                    a,
                    b,
                    kind: EdgeKind::Ribbon(Ribbon {
                        index,
                        accent,
                        color: theme.ribbon_color(accent),
                        midpoint_offset,
                        outer,
                        inner,
                    }),
                });
            }
        }
    }

    let points: Vec<Vec3> = (0..PARTICLE_COUNT)
        .map(|_| layout::sample_in_cube(rng, PARTICLE_VOLUME_SIDE))
        .collect();
    let particle_geometry = acquire(
        backend,
        acquired,
        "particles",
        GeometryData::Points(&points),
    )?;

    let texture = match theme.background.image_url {
        Some(url) => match backend.load_texture(url) {
            Ok(id) => {
                acquired.push(id);
                Some(id)
            }
            Err(BiomeError::AssetLoadFailure { url, reason }) => {
                log::warn!("[scene] background {url} unavailable ({reason}); using solid color");
                None
            }
            Err(e) => return Err(e),
        },
        None => None,
    };

    Ok(SceneGraph {
        theme,
        policy,
        nodes,
        edges,
        particles: ParticleField {
            points,
            color: theme.particle,
            rotation: Vec2::ZERO,
            geometry: particle_geometry,
        },
        lighting: lighting_for(theme),
        fog: Fog {
            color: theme.fog_color,
            density: theme.fog_density,
        },
        background: SceneBackground {
            color: theme.background.color,
            texture,
        },
        root_rotation: Vec2::ZERO,
        edge_rotation: Vec2::ZERO,
        node_mesh,
        glow_mesh,
        edge_lines,
        line_scratch,
        acquired: Vec::new(),
    })
}

const NO_EMISSION: Rgb = [0.0; 3];

#[inline]
fn rotation_matrix(r: Vec2) -> Mat4 {
    Mat4::from_rotation_x(r.x) * Mat4::from_rotation_y(r.y)
}

#[inline]
fn rgba(c: Rgb, a: f32) -> [f32; 4] {
    [c[0], c[1], c[2], a]
}

impl SceneGraph {
    pub fn theme(&self) -> &'static Theme {
        self.theme
    }

    /// The layout policy this scene was built with.
    pub fn policy(&self) -> LayoutPolicy {
        self.policy
    }

    pub fn ribbon_count(&self) -> usize {
        self.edges.iter().filter(|e| e.ribbon().is_some()).count()
    }

    /// Resources still held by this scene.
    pub fn resource_count(&self) -> usize {
        self.acquired.len()
    }

    pub fn is_torn_down(&self) -> bool {
        self.acquired.is_empty()
    }

    /// Release every backend resource the scene acquired. Safe to call again.
    pub fn teardown<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) {
        if self.acquired.is_empty() {
            return;
        }
        let n = self.acquired.len();
        for id in self.acquired.drain(..) {
            backend.release(id);
        }
        self.edge_lines = None;
        self.background.texture = None;
        log::info!("[scene] released {n} resources for {}", self.theme.name);
    }

    /// Re-point edge geometry at the current node positions.
    pub fn sync_edges<B: RenderBackend + ?Sized>(&mut self, backend: &mut B) -> Result<(), BiomeError> {
        if self.is_torn_down() {
            return Ok(());
        }
        self.line_scratch.clear();
        for edge in &mut self.edges {
            let pa = self.nodes[edge.a].position;
            let pb = self.nodes[edge.b].position;
            match &mut edge.kind {
                EdgeKind::Straight { endpoints } => {
                    *endpoints = [pa, pb];
                    self.line_scratch.extend_from_slice(endpoints);
                }
                EdgeKind::Ribbon(r) => {
                    let (outer, inner) = ribbon_meshes(pa, pb, r.midpoint_offset);
                    backend.update_geometry(r.outer, GeometryData::Triangles(&outer))?;
                    backend.update_geometry(r.inner, GeometryData::Triangles(&inner))?;
                }
            }
        }
        if let Some(lines) = self.edge_lines {
            backend.update_geometry(lines, GeometryData::Lines(&self.line_scratch))?;
        }
        Ok(())
    }

    /// Append this frame's draw list to `out`: lit node cores first, then
    /// glows, edges and particles.
    pub fn fill_draw_items(&self, out: &mut Vec<DrawItem>) {
        let root = rotation_matrix(self.root_rotation);
        let edge_root = rotation_matrix(self.edge_rotation);

        for node in &self.nodes {
            let base = root * Mat4::from_translation(node.position);
            for layer in node.layers.iter().filter(|l| !l.pulses()) {
                out.push(DrawItem {
                    geometry: self.node_mesh,
                    model: base * Mat4::from_scale(Vec3::splat(node.size * layer.scale)),
                    color: rgba(layer.color, layer.opacity),
                    emissive: layer.emissive,
                    shading: Shading::Lit,
                    point_size: 0.0,
                });
            }
        }
        for node in &self.nodes {
            let base = root * Mat4::from_translation(node.position);
            for layer in node.layers.iter().filter(|l| l.pulses()) {
                let s = node.size * layer.scale * node.glow_scale;
                out.push(DrawItem {
                    geometry: self.glow_mesh,
                    model: base * Mat4::from_scale(Vec3::splat(s)),
                    color: rgba(layer.color, layer.opacity),
                    emissive: layer.emissive,
                    shading: Shading::Glow,
                    point_size: 0.0,
                });
            }
        }

        if let Some(lines) = self.edge_lines {
            out.push(DrawItem {
                geometry: lines,
                model: edge_root,
                color: rgba(self.theme.edge, EDGE_OPACITY),
                emissive: NO_EMISSION,
                shading: Shading::Glow,
                point_size: 0.0,
            });
        }
        for ribbon in self.edges.iter().filter_map(Edge::ribbon) {
            out.push(DrawItem {
                geometry: ribbon.outer,
                model: edge_root,
                color: rgba(ribbon.color, RIBBON_OUTER_OPACITY),
                emissive: NO_EMISSION,
                shading: Shading::Glow,
                point_size: 0.0,
            });
            out.push(DrawItem {
                geometry: ribbon.inner,
                model: edge_root,
                color: rgba(ribbon.color, RIBBON_INNER_OPACITY),
                emissive: NO_EMISSION,
                shading: Shading::Glow,
                point_size: 0.0,
            });
        }

        out.push(DrawItem {
            geometry: self.particles.geometry,
            model: rotation_matrix(self.particles.rotation),
            color: rgba(self.particles.color, PARTICLE_OPACITY),
            emissive: NO_EMISSION,
            shading: Shading::Glow,
            point_size: PARTICLE_SIZE,
        });
    }

    pub fn frame<'a>(&self, camera: &CameraState, items: &'a [DrawItem]) -> Frame<'a> {
        Frame {
            clear_color: self.background.color,
            background: self.background.texture,
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            camera_position: camera.eye(),
            lighting: self.lighting,
            fog: self.fog,
            items,
        }
    }
}
