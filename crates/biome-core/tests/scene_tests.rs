use biome_core::backend::{HeadlessBackend, RenderBackend, ResourceKind};
use biome_core::layout::{edges_within_threshold, FIXED_LINKS};
use biome_core::scene::{EdgeKind, LayerKind};
use biome_core::*;
use glam::Vec3;

fn fixed(seed: u64) -> SceneConfig {
    SceneConfig {
        policy: LayoutPolicy::Fixed,
        seed: Some(seed),
    }
}

fn procedural(seed: u64) -> SceneConfig {
    SceneConfig {
        policy: LayoutPolicy::procedural(),
        seed: Some(seed),
    }
}

#[test]
fn fixed_layout_builds_hub_and_ribbons() {
    let mut backend = HeadlessBackend::new(800, 600);
    let theme = get_theme("cosmic").unwrap();
    let scene = SceneBuilder::build(theme, &fixed(1), &mut backend).unwrap();

    assert_eq!(scene.nodes.len(), 14);
    assert_eq!(scene.ribbon_count(), FIXED_LINKS.len());
    for node in &scene.nodes {
        assert_eq!(node.layers.len(), 4);
        assert_eq!(node.layers[0].kind, LayerKind::Core);
        assert_eq!(node.layers[3].kind, LayerKind::Halo);
    }
    for (i, edge) in scene.edges.iter().enumerate() {
        let ribbon = edge.ribbon().expect("fixed layout only makes ribbons");
        assert_eq!(ribbon.index, i);
        assert_eq!(ribbon.accent, i % ACCENT_EVERY == 0);
        let expected = if ribbon.accent {
            theme.accent.unwrap()
        } else {
            theme.edge
        };
        assert_eq!(ribbon.color, expected);
        assert!(ribbon.midpoint_offset.abs().max_element() <= RIBBON_MIDPOINT_JITTER);
    }
    // node mesh + two tubes per ribbon + particles + background
    assert_eq!(scene.resource_count(), 1 + 2 * 24 + 1 + 1);
    assert_eq!(backend.live_resources(), scene.resource_count());
}

#[test]
fn procedural_layout_joins_close_pairs_only() {
    let mut backend = HeadlessBackend::new(800, 600);
    let theme = get_theme("infernal").unwrap();
    let scene = SceneBuilder::build(theme, &procedural(9), &mut backend).unwrap();

    assert_eq!(scene.nodes.len(), PROCEDURAL_NODE_COUNT);
    let anchors: Vec<Vec3> = scene.nodes.iter().map(|n| n.anchor).collect();
    let expected = edges_within_threshold(&anchors, EDGE_DISTANCE_THRESHOLD);
    let actual: Vec<(usize, usize)> = scene.edges.iter().map(|e| (e.a, e.b)).collect();
    assert_eq!(actual, expected);

    for node in &scene.nodes {
        assert_eq!(node.layers.len(), 3);
        assert!(node.size >= NODE_SIZE_MIN && node.size < NODE_SIZE_MAX);
        let a = node.anchor / NODE_VOLUME_SEMI_AXES;
        assert!(a.length_squared() <= 1.0 + 1e-5);
        assert!(node.speed >= FLOAT_SPEED_MIN && node.speed < FLOAT_SPEED_MAX);
        assert!(node.phase >= 0.0 && node.phase < std::f32::consts::TAU);
    }
    assert!(scene
        .edges
        .iter()
        .all(|e| matches!(e.kind, EdgeKind::Straight { .. })));
}

#[test]
fn threshold_is_strict_distance() {
    let near = [Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0)];
    let far = [Vec3::ZERO, Vec3::new(30.0, 0.0, 0.0)];
    assert_eq!(edges_within_threshold(&near, 25.0), vec![(0, 1)]);
    assert!(edges_within_threshold(&far, 25.0).is_empty());
}

#[test]
fn seeded_builds_repeat_exactly() {
    let theme = get_theme("ethereal").unwrap();
    let mut a = HeadlessBackend::new(10, 10);
    let mut b = HeadlessBackend::new(10, 10);
    let sa = SceneBuilder::build(theme, &procedural(42), &mut a).unwrap();
    let sb = SceneBuilder::build(theme, &procedural(42), &mut b).unwrap();
    assert_eq!(sa.nodes, sb.nodes);
    assert_eq!(sa.edges, sb.edges);
    assert_eq!(sa.particles.points, sb.particles.points);
}

#[test]
fn particles_fill_the_cube() {
    let mut backend = HeadlessBackend::new(10, 10);
    let scene = SceneBuilder::build(get_theme("diamond").unwrap(), &fixed(3), &mut backend).unwrap();
    assert_eq!(scene.particles.points.len(), PARTICLE_COUNT);
    let half = PARTICLE_VOLUME_SIDE / 2.0;
    assert!(scene
        .particles
        .points
        .iter()
        .all(|p| p.abs().max_element() <= half));
    let res = backend.resource(scene.particles.geometry).unwrap();
    assert_eq!(res.kind, ResourceKind::Points);
}

#[test]
fn teardown_releases_everything_and_is_idempotent() {
    let mut backend = HeadlessBackend::new(10, 10);
    let mut scene =
        SceneBuilder::build(get_theme("cosmic").unwrap(), &fixed(5), &mut backend).unwrap();
    assert!(backend.live_resources() > 0);
    scene.teardown(&mut backend);
    assert_eq!(backend.live_resources(), 0);
    assert!(scene.is_torn_down());
    scene.teardown(&mut backend);
    assert_eq!(backend.live_resources(), 0);
}

#[test]
fn missing_background_falls_back_to_solid_color() {
    let mut backend = HeadlessBackend::new(10, 10).with_failing_textures();
    let theme = get_theme("cosmic").unwrap();
    let scene = SceneBuilder::build(theme, &fixed(2), &mut backend).unwrap();
    assert_eq!(scene.background.texture, None);
    assert_eq!(scene.background.color, theme.background.color);
    assert_eq!(backend.live_resources(), scene.resource_count());
}

#[test]
fn themes_without_images_request_no_texture() {
    let mut backend = HeadlessBackend::new(10, 10);
    let scene =
        SceneBuilder::build(get_theme("infernal").unwrap(), &fixed(2), &mut backend).unwrap();
    assert_eq!(scene.background.texture, None);
}

#[test]
fn failed_acquisition_leaks_nothing() {
    let mut backend = HeadlessBackend::new(10, 10).with_capacity(10);
    let err = SceneBuilder::build(get_theme("cosmic").unwrap(), &fixed(4), &mut backend)
        .err()
        .expect("capacity is too small for a fixed scene");
    assert!(matches!(err, BiomeError::ResourceAcquisitionFailure(_)));
    assert_eq!(backend.live_resources(), 0);
}

#[test]
fn diamond_uses_octahedra_and_plain_ribbons() {
    let mut backend = HeadlessBackend::new(10, 10);
    let theme = get_theme("diamond").unwrap();
    let scene = SceneBuilder::build(theme, &fixed(8), &mut backend).unwrap();
    assert!(scene
        .edges
        .iter()
        .filter_map(|e| e.ribbon())
        .all(|r| r.color == theme.edge));

    let mut items = Vec::new();
    scene.fill_draw_items(&mut items);
    let node_mesh = backend.resource(items[0].geometry).unwrap();
    assert_eq!(node_mesh.vertex_count, geometry::octahedron().vertices.len());

    let glow = items
        .iter()
        .find(|i| i.shading == backend::Shading::Glow)
        .unwrap();
    assert_ne!(glow.geometry, items[0].geometry);
    let glow_mesh = backend.resource(glow.geometry).unwrap();
    assert_eq!(
        glow_mesh.vertex_count,
        geometry::uv_sphere(SPHERE_SEGMENTS, SPHERE_RINGS).vertices.len()
    );
    // octahedron + sphere glow + two tubes per ribbon + particles, no image
    assert_eq!(scene.resource_count(), 2 + 2 * 24 + 1);
    assert_eq!(backend.live_resources(), scene.resource_count());
}

#[test]
fn sphere_biomes_share_one_node_mesh() {
    let mut backend = HeadlessBackend::new(10, 10);
    let scene =
        SceneBuilder::build(get_theme("infernal").unwrap(), &fixed(8), &mut backend).unwrap();
    let mut items = Vec::new();
    scene.fill_draw_items(&mut items);
    let node_items = scene.nodes.len() * 4;
    assert!(items[..node_items]
        .iter()
        .all(|i| i.geometry == items[0].geometry));
}

#[test]
fn cores_glow_on_their_own() {
    let mut backend = HeadlessBackend::new(10, 10);
    let theme = get_theme("ethereal").unwrap();
    let scene = SceneBuilder::build(theme, &procedural(12), &mut backend).unwrap();
    let mut items = Vec::new();
    scene.fill_draw_items(&mut items);

    let expected = theme.node_glow.map(|c| c * CORE_EMISSIVE_INTENSITY);
    assert!(expected.iter().any(|&c| c > 0.0));
    for item in &items {
        match item.shading {
            backend::Shading::Lit => assert_eq!(item.emissive, expected),
            backend::Shading::Glow => assert_eq!(item.emissive, [0.0; 3]),
        }
    }
}

#[test]
fn draw_list_puts_lit_cores_first() {
    let mut backend = HeadlessBackend::new(10, 10);
    let scene = SceneBuilder::build(get_theme("cosmic").unwrap(), &fixed(6), &mut backend).unwrap();
    let mut items = Vec::new();
    scene.fill_draw_items(&mut items);

    let lit = items
        .iter()
        .take_while(|i| i.shading == backend::Shading::Lit)
        .count();
    assert_eq!(lit, scene.nodes.len());
    // cores, three glow layers per node, two tubes per ribbon, particles
    assert_eq!(items.len(), 14 + 14 * 3 + 24 * 2 + 1);
    assert_eq!(items.last().unwrap().point_size, PARTICLE_SIZE);
}
