//! Per-frame update of a built scene.

use crate::backend::{DrawItem, RenderBackend};
use crate::camera::CameraState;
use crate::constants::*;
use crate::error::BiomeError;
use crate::interaction::{ease_toward, InteractionState};
use crate::scene::SceneGraph;
use glam::{Vec2, Vec3};

/// Offset of a floating node from its anchor at time `t`.
#[inline]
pub fn float_offset(t: f32, speed: f32, phase: f32) -> Vec3 {
    Vec3::new(
        (t * speed * FLOAT_X_SPEED_RATIO + phase).cos() * FLOAT_AMPLITUDE_X,
        (t * speed + phase).sin() * FLOAT_AMPLITUDE_Y,
        0.0,
    )
}

#[inline]
pub fn glow_pulse(t: f32, phase: f32) -> f32 {
    1.0 + (t * GLOW_PULSE_RATE + phase).sin() * GLOW_PULSE_AMPLITUDE
}

#[inline]
pub fn key_light_intensity(t: f32) -> f32 {
    KEY_LIGHT_INTENSITY + (t * LIGHT_BREATH_RATE).sin() * LIGHT_BREATH_AMPLITUDE
}

#[inline]
pub fn particle_rotation(t: f32) -> Vec2 {
    Vec2::new(t * PARTICLE_SPIN_X, t * PARTICLE_SPIN_Y)
}

/// Advance the rotation target by auto-rotate and ease the shown rotation
/// toward it.
pub fn step_rotation(state: &mut InteractionState) {
    if state.auto_rotate && !state.is_dragging() {
        state.target.y += AUTO_ROTATE_STEP;
    }
    state.current.x = ease_toward(state.current.x, state.target.x, ROTATION_EASING);
    state.current.y = ease_toward(state.current.y, state.target.y, ROTATION_EASING);
}

/// Drives one scene from frame timestamps.
///
/// Time is measured from the first tick after construction or
/// [`AnimationLoop::restart`].
#[derive(Debug, Default)]
pub struct AnimationLoop {
    origin: Option<f64>,
    ticks: u64,
    items: Vec<DrawItem>,
}

impl AnimationLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the clock again on the next tick.
    pub fn restart(&mut self) {
        self.origin = None;
        self.ticks = 0;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Seconds since the clock started, starting it if needed. Timestamps
    /// that go backwards clamp to zero.
    pub fn elapsed(&mut self, now_secs: f64) -> f32 {
        let origin = *self.origin.get_or_insert(now_secs);
        (now_secs - origin).max(0.0) as f32
    }

    /// Update `scene` for `now_secs` and submit one frame to `backend`.
    pub fn tick<B: RenderBackend + ?Sized>(
        &mut self,
        now_secs: f64,
        scene: &mut SceneGraph,
        interaction: &mut InteractionState,
        camera: &CameraState,
        backend: &mut B,
    ) -> Result<(), BiomeError> {
        if scene.is_torn_down() {
            return Ok(());
        }
        let t = self.elapsed(now_secs);

        step_rotation(interaction);
        scene.root_rotation = interaction.current;
        scene.edge_rotation = interaction.current;

        for node in &mut scene.nodes {
            node.position = node.anchor + float_offset(t, node.speed, node.phase);
            node.glow_scale = glow_pulse(t, node.phase);
        }
        scene.sync_edges(backend)?;

        scene.particles.rotation = particle_rotation(t);
        scene.lighting.points[0].intensity = key_light_intensity(t);

        self.items.clear();
        scene.fill_draw_items(&mut self.items);
        backend.render(&scene.frame(camera, &self.items))?;
        self.ticks += 1;
        Ok(())
    }
}
