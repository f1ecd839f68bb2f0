use biome_core::backend::gpu::{GpuBackend, ImageSource, RgbaImage};
use biome_core::{BiomeError, LayoutPolicy, PointerInput, SceneConfig, Stage, ThemeKey};
use instant::Instant;
use std::path::PathBuf;
use std::sync::Arc;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

const WHEEL_LINE_PX: f32 = 16.0;

/// Reads background images from disk, relative to `BIOME_ASSETS` (default
/// `assets/`).
struct FileImageSource {
    root: PathBuf,
}

impl FileImageSource {
    fn from_env() -> Self {
        let root = std::env::var_os("BIOME_ASSETS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("assets"));
        log::info!("[assets] loading images from {}", root.display());
        Self { root }
    }
}

impl ImageSource for FileImageSource {
    fn request(&mut self, url: &str) -> Result<Option<RgbaImage>, BiomeError> {
        let path = self.root.join(url);
        let rgba = image::open(&path)
            .map_err(|e| BiomeError::asset(url, e.to_string()))?
            .to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Some(RgbaImage {
            width,
            height,
            pixels: rgba.into_raw(),
        }))
    }

    fn poll(&mut self) -> Vec<(String, Result<RgbaImage, BiomeError>)> {
        Vec::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Action {
    Biome(ThemeKey),
    ToggleRotation,
    ToggleLayout,
}

fn key_action(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Digit1 => Some(Action::Biome(ThemeKey::Cosmic)),
        KeyCode::Digit2 => Some(Action::Biome(ThemeKey::Infernal)),
        KeyCode::Digit3 => Some(Action::Biome(ThemeKey::Diamond)),
        KeyCode::Digit4 => Some(Action::Biome(ThemeKey::Ethereal)),
        KeyCode::Space => Some(Action::ToggleRotation),
        KeyCode::KeyL => Some(Action::ToggleLayout),
        _ => None,
    }
}

/// Wheel delta in browser convention: positive pixels move the camera away.
fn wheel_pixels(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINE_PX,
        MouseScrollDelta::PixelDelta(p) => -p.y as f32,
    }
}

fn touch_input(touch: &Touch) -> PointerInput {
    let (x, y) = (touch.location.x as f32, touch.location.y as f32);
    match touch.phase {
        TouchPhase::Started => PointerInput::TouchStart { x, y },
        TouchPhase::Moved => PointerInput::TouchMove { x, y },
        TouchPhase::Ended | TouchPhase::Cancelled => PointerInput::TouchEnd,
    }
}

fn apply_action<S: ImageSource>(stage: &mut Stage<GpuBackend<S>>, action: Action) {
    let result = match action {
        Action::Biome(key) => stage.set_theme(key.as_str()),
        Action::ToggleRotation => {
            let next = !stage.is_rotating();
            stage.set_rotating(next);
            log::info!("[input] rotation {}", if next { "on" } else { "off" });
            Ok(())
        }
        Action::ToggleLayout => {
            let next = match stage.layout() {
                LayoutPolicy::Fixed => LayoutPolicy::procedural(),
                LayoutPolicy::Procedural { .. } => LayoutPolicy::Fixed,
            };
            stage.set_layout(next)
        }
    };
    if let Err(e) = result {
        log::error!("[stage] {e}");
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let key = std::env::args()
        .nth(1)
        .unwrap_or_else(|| ThemeKey::Cosmic.as_str().to_string());

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Nodal Biomes (native)")
            .with_inner_size(winit::dpi::LogicalSize::new(1280.0, 800.0))
            .build(&event_loop)?,
    );
    let size = window.inner_size();

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(window.clone())?;
    let backend = pollster::block_on(GpuBackend::new(
        &instance,
        surface,
        size.width,
        size.height,
        FileImageSource::from_env(),
    ))?;
    let mut stage = Stage::mount(backend, &key, SceneConfig::default(), size.width, size.height)?;
    log::info!("keys: 1-4 biome, space rotation, L layout");

    let clock = Instant::now();
    let mut cursor = (0.0_f32, 0.0_f32);

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { event, .. } => match event {
            WindowEvent::CloseRequested => {
                stage.teardown();
                elwt.exit();
            }
            WindowEvent::Resized(size) => stage.resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                cursor = (position.x as f32, position.y as f32);
                stage.handle_input(PointerInput::Move {
                    x: cursor.0,
                    y: cursor.1,
                });
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => stage.handle_input(match state {
                ElementState::Pressed => PointerInput::Down {
                    x: cursor.0,
                    y: cursor.1,
                },
                ElementState::Released => PointerInput::Up,
            }),
            WindowEvent::CursorLeft { .. } => stage.handle_input(PointerInput::Leave),
            WindowEvent::MouseWheel { delta, .. } => stage.handle_input(PointerInput::Wheel {
                delta_y: wheel_pixels(delta),
            }),
            WindowEvent::Touch(touch) => stage.handle_input(touch_input(&touch)),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(action) = key_action(code) {
                    apply_action(&mut stage, action);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = stage.frame(clock.elapsed().as_secs_f64()) {
                    log::error!("[stage] frame failed: {e}");
                    elwt.exit();
                }
            }
            _ => {}
        },
        Event::AboutToWait => window.request_redraw(),
        _ => {}
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digit_keys_select_biomes_in_order() {
        let codes = [
            KeyCode::Digit1,
            KeyCode::Digit2,
            KeyCode::Digit3,
            KeyCode::Digit4,
        ];
        for (code, key) in codes.into_iter().zip(ThemeKey::ALL) {
            assert_eq!(key_action(code), Some(Action::Biome(key)));
        }
        assert_eq!(key_action(KeyCode::KeyQ), None);
    }

    #[test]
    fn scrolling_up_zooms_in() {
        assert!(wheel_pixels(MouseScrollDelta::LineDelta(0.0, 1.0)) < 0.0);
        assert_eq!(
            wheel_pixels(MouseScrollDelta::LineDelta(0.0, -2.0)),
            2.0 * WHEEL_LINE_PX
        );
    }

    #[test]
    fn missing_asset_is_an_asset_error() {
        let mut src = FileImageSource {
            root: PathBuf::from("/nonexistent-biome-assets"),
        };
        match src.request("biomes/cosmic.jpg") {
            Err(BiomeError::AssetLoadFailure { url, .. }) => assert_eq!(url, "biomes/cosmic.jpg"),
            other => panic!("expected asset failure, got {other:?}"),
        }
    }
}
