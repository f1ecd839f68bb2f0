use glam::Vec3;

// Shared scene/interaction tuning constants used by both web and native frontends.

// Camera
pub const CAMERA_FOV_DEGREES: f32 = 60.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_START_DISTANCE: f32 = 50.0;
pub const CAMERA_MIN_DISTANCE: f32 = 20.0;
pub const CAMERA_MAX_DISTANCE: f32 = 100.0;

// Interaction
pub const DRAG_SENSITIVITY: f32 = 0.005; // radians per pixel of pointer travel
pub const WHEEL_ZOOM_SENSITIVITY: f32 = 0.05; // world units per wheel pixel
pub const AUTO_ROTATE_STEP: f32 = 0.002; // radians added to the Y target per tick
pub const ROTATION_EASING: f32 = 0.05; // fraction of the remaining gap closed per tick

// Procedural layout
pub const PROCEDURAL_NODE_COUNT: usize = 25;
pub const NODE_VOLUME_SEMI_AXES: Vec3 = Vec3::new(30.0, 20.0, 20.0);
pub const NODE_SIZE_MIN: f32 = 0.5;
pub const NODE_SIZE_MAX: f32 = 2.0;
pub const EDGE_DISTANCE_THRESHOLD: f32 = 25.0;

// Node float and pulse
pub const FLOAT_AMPLITUDE_X: f32 = 0.3;
pub const FLOAT_AMPLITUDE_Y: f32 = 0.5;
pub const FLOAT_X_SPEED_RATIO: f32 = 0.7; // x axis cycles slower than y
pub const FLOAT_SPEED_MIN: f32 = 0.5;
pub const FLOAT_SPEED_MAX: f32 = 1.0;
pub const GLOW_PULSE_RATE: f32 = 2.0;
pub const GLOW_PULSE_AMPLITUDE: f32 = 0.08;

// Node layers: scale relative to the node size, and opacity
pub const CORE_OPACITY: f32 = 1.0;
pub const CORE_EMISSIVE_INTENSITY: f32 = 0.5; // share of the glow color the core emits unlit
pub const INNER_GLOW_SCALE: f32 = 1.5;
pub const INNER_GLOW_OPACITY: f32 = 0.15;
pub const OUTER_GLOW_SCALE: f32 = 2.2;
pub const OUTER_GLOW_OPACITY: f32 = 0.07;
pub const HALO_SCALE: f32 = 3.2;
pub const HALO_OPACITY: f32 = 0.035;

// Edges and ribbons
pub const EDGE_OPACITY: f32 = 0.4;
pub const ACCENT_EVERY: usize = 4; // ribbon i is an accent when i % ACCENT_EVERY == 0
pub const RIBBON_MIDPOINT_JITTER: f32 = 3.0; // max offset of the curve midpoint per axis
pub const RIBBON_TUBULAR_SEGMENTS: usize = 40;
pub const RIBBON_RADIAL_SEGMENTS: usize = 8;
pub const RIBBON_OUTER_RADIUS: f32 = 0.35;
pub const RIBBON_OUTER_OPACITY: f32 = 0.18;
pub const RIBBON_INNER_RADIUS: f32 = 0.08;
pub const RIBBON_INNER_OPACITY: f32 = 0.85;

// Particle field
pub const PARTICLE_COUNT: usize = 200;
pub const PARTICLE_VOLUME_SIDE: f32 = 100.0;
pub const PARTICLE_SIZE: f32 = 0.15;
pub const PARTICLE_OPACITY: f32 = 0.6;
pub const PARTICLE_SPIN_Y: f32 = 0.02; // radians per second
pub const PARTICLE_SPIN_X: f32 = 0.01;

// Lights
pub const AMBIENT_INTENSITY: f32 = 0.3;
pub const KEY_LIGHT_POSITION: Vec3 = Vec3::new(20.0, 20.0, 20.0);
pub const KEY_LIGHT_INTENSITY: f32 = 2.0;
pub const FILL_LIGHT_POSITION: Vec3 = Vec3::new(-20.0, -20.0, -20.0);
pub const FILL_LIGHT_INTENSITY: f32 = 1.0;
pub const LIGHT_RANGE: f32 = 100.0;
pub const LIGHT_BREATH_RATE: f32 = 2.0;
pub const LIGHT_BREATH_AMPLITUDE: f32 = 0.5;

// Node meshes
pub const SPHERE_SEGMENTS: u32 = 24;
pub const SPHERE_RINGS: u32 = 16;

// Display
pub const MAX_PIXEL_RATIO: f64 = 2.0;

/// Largest distance a node can float away from its anchor.
#[inline]
pub fn float_envelope() -> f32 {
    (FLOAT_AMPLITUDE_X * FLOAT_AMPLITUDE_X + FLOAT_AMPLITUDE_Y * FLOAT_AMPLITUDE_Y).sqrt()
}
