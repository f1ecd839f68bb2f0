pub mod animation;
pub mod backend;
pub mod camera;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod layout;
pub mod scene;
pub mod stage;
pub mod theme;

#[cfg(feature = "gpu")]
pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
#[cfg(feature = "gpu")]
pub static BACKGROUND_WGSL: &str = include_str!("../shaders/background.wgsl");

pub use animation::AnimationLoop;
pub use backend::{HeadlessBackend, RenderBackend, ResourceId};
pub use camera::CameraState;
pub use constants::*;
pub use error::BiomeError;
pub use interaction::{InteractionController, InteractionState, PointerInput};
pub use layout::LayoutPolicy;
pub use scene::{SceneBuilder, SceneConfig, SceneGraph};
pub use stage::Stage;
pub use theme::{get_theme, Theme, ThemeKey};
