use biome_core::backend::HeadlessBackend;
use biome_core::scene::EdgeKind;
use biome_core::*;

const FRAME: f64 = 1.0 / 60.0;

fn mount(key: &str, policy: LayoutPolicy) -> Stage<HeadlessBackend> {
    let config = SceneConfig {
        policy,
        seed: Some(11),
    };
    Stage::mount(HeadlessBackend::new(800, 600), key, config, 800, 600).unwrap()
}

fn run(stage: &mut Stage<HeadlessBackend>, from: f64, frames: usize) {
    for i in 0..frames {
        stage.frame(from + i as f64 * FRAME).unwrap();
    }
}

#[test]
fn unknown_key_is_rejected_at_mount() {
    let res = Stage::mount(
        HeadlessBackend::new(10, 10),
        "volcanic",
        SceneConfig::default(),
        10,
        10,
    );
    assert!(matches!(res, Err(BiomeError::UnknownThemeKey(k)) if k == "volcanic"));
}

#[test]
fn every_frame_submits_one_render() {
    let mut stage = mount("cosmic", LayoutPolicy::Fixed);
    run(&mut stage, 0.0, 5);
    assert_eq!(stage.backend().frames_rendered(), 5);
    let last = stage.backend().last_frame().unwrap();
    assert_eq!(last.clear_color, stage.theme().background.color);
    assert!(last.background.is_some());
}

#[test]
fn nodes_float_within_their_envelope() {
    let mut stage = mount("ethereal", LayoutPolicy::procedural());
    let env = float_envelope();
    for i in 0..200 {
        stage.frame(i as f64 * 0.13).unwrap();
        for node in &stage.scene().unwrap().nodes {
            assert!(node.position.distance(node.anchor) <= env + 1e-4);
            assert_eq!(node.position.z, node.anchor.z);
        }
    }
}

#[test]
fn straight_edges_follow_live_nodes() {
    let mut stage = mount("infernal", LayoutPolicy::procedural());
    run(&mut stage, 3.0, 10);
    let scene = stage.scene().unwrap();
    for edge in &scene.edges {
        let EdgeKind::Straight { endpoints } = edge.kind else {
            panic!("procedural layout makes straight edges");
        };
        assert_eq!(endpoints[0], scene.nodes[edge.a].position);
        assert_eq!(endpoints[1], scene.nodes[edge.b].position);
    }
}

#[test]
fn ribbons_are_retessellated_each_frame() {
    let mut stage = mount("cosmic", LayoutPolicy::Fixed);
    run(&mut stage, 0.0, 3);
    let scene = stage.scene().unwrap();
    let ribbon = scene.edges[0].ribbon().unwrap();
    let outer = stage.backend().resource(ribbon.outer).unwrap();
    assert_eq!(outer.updates, 3);
}

#[test]
fn key_light_breathes() {
    let mut stage = mount("diamond", LayoutPolicy::Fixed);
    stage.frame(100.0).unwrap();
    assert_eq!(
        stage.backend().last_frame().unwrap().key_light_intensity,
        KEY_LIGHT_INTENSITY
    );
    stage.frame(100.0 + std::f64::consts::PI / 4.0).unwrap();
    let k = stage.backend().last_frame().unwrap().key_light_intensity;
    assert!((k - (KEY_LIGHT_INTENSITY + LIGHT_BREATH_AMPLITUDE)).abs() < 1e-4);
}

#[test]
fn auto_rotate_advances_target_each_frame() {
    let mut stage = mount("cosmic", LayoutPolicy::Fixed);
    assert!(stage.is_rotating());
    run(&mut stage, 0.0, 10);
    let target = stage.interaction().target;
    assert!((target.y - 10.0 * AUTO_ROTATE_STEP).abs() < 1e-6);
    assert_eq!(target.x, 0.0);
}

#[test]
fn rotation_eases_toward_drag_target() {
    let mut stage = mount("cosmic", LayoutPolicy::Fixed);
    stage.set_rotating(false);
    stage.handle_input(PointerInput::Down { x: 0.0, y: 0.0 });
    stage.handle_input(PointerInput::Move { x: 200.0, y: -100.0 });
    stage.handle_input(PointerInput::Up);

    let target = stage.interaction().target;
    assert!((target.y - 200.0 * DRAG_SENSITIVITY).abs() < 1e-6);
    assert!((target.x + 100.0 * DRAG_SENSITIVITY).abs() < 1e-6);

    let mut gap = (target - stage.interaction().current).length();
    for i in 0..100 {
        stage.frame(i as f64 * FRAME).unwrap();
        let next = (target - stage.interaction().current).length();
        assert!(next < gap);
        gap = next;
    }
    assert!(gap < 0.01 * target.length());
    assert_eq!(stage.scene().unwrap().root_rotation, stage.interaction().current);
}

#[test]
fn dragging_suspends_auto_rotate() {
    let mut stage = mount("cosmic", LayoutPolicy::Fixed);
    stage.handle_input(PointerInput::TouchStart { x: 5.0, y: 5.0 });
    run(&mut stage, 0.0, 10);
    assert_eq!(stage.interaction().target.y, 0.0);
    stage.handle_input(PointerInput::TouchEnd);
    run(&mut stage, 1.0, 1);
    assert_eq!(stage.interaction().target.y, AUTO_ROTATE_STEP);
}

#[test]
fn wheel_zoom_clamps() {
    let mut stage = mount("cosmic", LayoutPolicy::Fixed);
    stage.handle_input(PointerInput::Wheel { delta_y: 100.0 });
    assert_eq!(
        stage.camera().distance(),
        CAMERA_START_DISTANCE + 100.0 * WHEEL_ZOOM_SENSITIVITY
    );
    stage.handle_input(PointerInput::Wheel { delta_y: 1.0e6 });
    assert_eq!(stage.camera().distance(), CAMERA_MAX_DISTANCE);
    stage.handle_input(PointerInput::Wheel { delta_y: -1.0e6 });
    assert_eq!(stage.camera().distance(), CAMERA_MIN_DISTANCE);
}

#[test]
fn theme_change_keeps_rotation_and_zoom() {
    let mut stage = mount("cosmic", LayoutPolicy::Fixed);
    stage.handle_input(PointerInput::Down { x: 0.0, y: 0.0 });
    stage.handle_input(PointerInput::Move { x: 80.0, y: 40.0 });
    stage.handle_input(PointerInput::Up);
    stage.handle_input(PointerInput::Wheel { delta_y: -200.0 });
    run(&mut stage, 0.0, 20);

    let rotation = *stage.interaction();
    let distance = stage.camera().distance();
    let before = stage.backend().live_resources();

    stage.set_theme("diamond").unwrap();
    assert_eq!(stage.theme().key, ThemeKey::Diamond);
    assert_eq!(*stage.interaction(), rotation);
    assert_eq!(stage.camera().distance(), distance);
    // diamond drops the background image but adds a round glow mesh
    assert_eq!(stage.backend().live_resources(), before);
    assert_eq!(
        stage.backend().live_resources(),
        stage.scene().unwrap().resource_count()
    );
}

#[test]
fn unknown_theme_change_leaves_scene_intact() {
    let mut stage = mount("cosmic", LayoutPolicy::Fixed);
    let live = stage.backend().live_resources();
    let err = stage.set_theme("nope").unwrap_err();
    assert_eq!(err, BiomeError::UnknownThemeKey("nope".into()));
    assert_eq!(stage.theme().key, ThemeKey::Cosmic);
    assert_eq!(stage.backend().live_resources(), live);
    run(&mut stage, 0.0, 1);
    assert_eq!(stage.backend().frames_rendered(), 1);
}

#[test]
fn switching_layout_rebuilds_in_place() {
    let mut stage = mount("cosmic", LayoutPolicy::Fixed);
    stage.set_layout(LayoutPolicy::procedural()).unwrap();
    let scene = stage.scene().unwrap();
    assert_eq!(scene.nodes.len(), PROCEDURAL_NODE_COUNT);
    assert_eq!(scene.ribbon_count(), 0);
    assert_eq!(stage.backend().live_resources(), scene.resource_count());
}

#[test]
fn resize_updates_camera_once() {
    let mut stage = mount("cosmic", LayoutPolicy::Fixed);
    stage.resize(1000, 500);
    assert_eq!(stage.camera().aspect, 2.0);
    assert_eq!(stage.backend().size(), (1000, 500));
    stage.resize(1000, 500);
    assert_eq!(stage.size(), (1000, 500));
}

#[test]
fn teardown_stops_frames_and_frees_everything() {
    let mut stage = mount("ethereal", LayoutPolicy::Fixed);
    run(&mut stage, 0.0, 2);
    stage.teardown();
    assert!(stage.is_disposed());
    assert_eq!(stage.backend().live_resources(), 0);

    run(&mut stage, 1.0, 5);
    assert_eq!(stage.backend().frames_rendered(), 2);

    stage.teardown();
    assert_eq!(stage.backend().live_resources(), 0);
    stage.set_theme("cosmic").unwrap();
    assert_eq!(stage.backend().live_resources(), 0);
}
