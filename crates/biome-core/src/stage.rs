//! One mounted biome view: backend, scene, camera, input and clock together.

use crate::animation::AnimationLoop;
use crate::backend::RenderBackend;
use crate::camera::CameraState;
use crate::error::BiomeError;
use crate::interaction::{InteractionController, InteractionState, PointerInput};
use crate::layout::LayoutPolicy;
use crate::scene::{SceneBuilder, SceneConfig, SceneGraph};
use crate::theme::{get_theme, Theme};

pub struct Stage<B: RenderBackend> {
    backend: B,
    config: SceneConfig,
    theme: &'static Theme,
    scene: Option<SceneGraph>,
    camera: CameraState,
    controller: InteractionController,
    animation: AnimationLoop,
    size: (u32, u32),
    disposed: bool,
}

impl<B: RenderBackend> Stage<B> {
    /// Build the scene for `key` on `backend` and get ready to animate.
    pub fn mount(
        mut backend: B,
        key: &str,
        config: SceneConfig,
        width: u32,
        height: u32,
    ) -> Result<Self, BiomeError> {
        let theme = get_theme(key)?;
        backend.resize(width, height);
        let scene = SceneBuilder::build(theme, &config, &mut backend)?;
        log::info!("[stage] mounted {} at {width}x{height}", theme.name);
        Ok(Self {
            backend,
            config,
            theme,
            scene: Some(scene),
            camera: CameraState::new(width, height),
            controller: InteractionController::default(),
            animation: AnimationLoop::new(),
            size: (width, height),
            disposed: false,
        })
    }

    pub fn theme(&self) -> &'static Theme {
        self.theme
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.scene.as_ref()
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    pub fn interaction(&self) -> &InteractionState {
        self.controller.state()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn layout(&self) -> LayoutPolicy {
        self.config.policy
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Switch to another biome. An unknown key leaves the current scene
    /// untouched. Rotation and zoom carry over; the animation clock restarts.
    pub fn set_theme(&mut self, key: &str) -> Result<(), BiomeError> {
        let theme = get_theme(key)?;
        if self.disposed {
            log::debug!("[stage] ignoring theme change after teardown");
            return Ok(());
        }
        self.theme = theme;
        self.rebuild()
    }

    /// Rebuild the current biome with a different layout policy.
    pub fn set_layout(&mut self, policy: LayoutPolicy) -> Result<(), BiomeError> {
        if self.disposed {
            return Ok(());
        }
        self.config.policy = policy;
        self.rebuild()
    }

    fn rebuild(&mut self) -> Result<(), BiomeError> {
        if let Some(mut old) = self.scene.take() {
            old.teardown(&mut self.backend);
        }
        let scene = SceneBuilder::build(self.theme, &self.config, &mut self.backend)?;
        self.scene = Some(scene);
        self.animation.restart();
        log::info!(
            "[stage] showing {} ({})",
            self.theme.name,
            self.config.policy.name()
        );
        Ok(())
    }

    pub fn set_rotating(&mut self, on: bool) {
        self.controller.set_auto_rotate(on);
    }

    pub fn is_rotating(&self) -> bool {
        self.controller.state().auto_rotate
    }

    pub fn handle_input(&mut self, input: PointerInput) {
        if self.disposed {
            return;
        }
        self.controller.handle(input, &mut self.camera);
    }

    /// Track a new output size. Repeating the current size does nothing.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.disposed || (width, height) == self.size {
            return;
        }
        self.size = (width, height);
        self.camera.resize(width, height);
        self.backend.resize(width, height);
        log::debug!("[stage] resized to {width}x{height}");
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Advance and draw one frame at `now_secs`. Does nothing once torn down
    /// or while no scene is built.
    pub fn frame(&mut self, now_secs: f64) -> Result<(), BiomeError> {
        if self.disposed {
            return Ok(());
        }
        let Some(scene) = self.scene.as_mut() else {
            return Ok(());
        };
        self.animation.tick(
            now_secs,
            scene,
            self.controller.state_mut(),
            &self.camera,
            &mut self.backend,
        )
    }

    /// Release every scene resource. Later calls are no-ops.
    pub fn teardown(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(mut scene) = self.scene.take() {
            scene.teardown(&mut self.backend);
        }
        self.disposed = true;
        log::info!("[stage] torn down");
    }
}
