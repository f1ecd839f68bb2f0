#![cfg(target_arch = "wasm32")]
use biome_core::backend::gpu::GpuBackend;
use biome_core::{SceneConfig, Stage};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod constants;
mod dom;
mod events;
mod frame;
mod images;
mod input;
mod ui;

use constants::{CANVAS_ID, DEFAULT_BIOME};
use images::HtmlImageSource;

pub(crate) type WebStage = Stage<GpuBackend<HtmlImageSource>>;
pub(crate) type SharedStage = Rc<RefCell<WebStage>>;

/// Everything one mounted canvas owns. Dropping it stops the frame loop,
/// removes every listener and releases the scene.
struct Mounted {
    stage: SharedStage,
    listeners: events::Subscriptions,
    frame_loop: frame::FrameLoop,
}

impl Mounted {
    async fn new(canvas: web::HtmlCanvasElement, key: &str) -> anyhow::Result<Self> {
        let (width, height) = dom::sync_canvas_backing_size(&canvas);
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
        let backend =
            GpuBackend::new(&instance, surface, width, height, HtmlImageSource::default()).await?;
        let stage = Stage::mount(backend, key, SceneConfig::default(), width, height)?;
        let stage: SharedStage = Rc::new(RefCell::new(stage));

        let listeners = events::pointer::wire_canvas_input(&canvas, &stage);

        let frame_stage = stage.clone();
        let reported = Cell::new(false);
        let frame_loop = frame::start_loop(move |now_secs| {
            if let Err(e) = frame_stage.borrow_mut().frame(now_secs) {
                if !reported.replace(true) {
                    log::error!("[stage] frame failed: {e}");
                }
            }
        });

        Ok(Self {
            stage,
            listeners,
            frame_loop,
        })
    }
}

impl Drop for Mounted {
    fn drop(&mut self) {
        self.frame_loop.cancel();
        self.listeners.clear();
        if let Ok(mut stage) = self.stage.try_borrow_mut() {
            stage.teardown();
        }
    }
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// A biome scene mounted on a canvas element.
#[wasm_bindgen]
pub struct BiomeView {
    mounted: Option<Mounted>,
}

impl BiomeView {
    fn stage(&self) -> Result<&SharedStage, JsValue> {
        self.mounted
            .as_ref()
            .map(|m| &m.stage)
            .ok_or_else(|| js_err("view is disposed"))
    }
}

#[wasm_bindgen]
impl BiomeView {
    /// Mount the biome `key` on the canvas with id `canvas_id`.
    pub async fn mount(canvas_id: String, key: String) -> Result<BiomeView, JsValue> {
        let document = dom::window_document().ok_or_else(|| js_err("no document"))?;
        let canvas = dom::canvas_by_id(&document, &canvas_id).map_err(js_err)?;
        let mounted = Mounted::new(canvas, &key).await.map_err(js_err)?;
        Ok(BiomeView {
            mounted: Some(mounted),
        })
    }

    pub fn set_biome(&self, key: &str) -> Result<(), JsValue> {
        self.stage()?.borrow_mut().set_theme(key).map_err(js_err)
    }

    pub fn set_rotating(&self, on: bool) {
        if let Ok(stage) = self.stage() {
            stage.borrow_mut().set_rotating(on);
        }
    }

    pub fn is_rotating(&self) -> bool {
        self.stage()
            .map(|s| s.borrow().is_rotating())
            .unwrap_or(false)
    }

    /// Stop animating and release everything. Safe to call more than once.
    pub fn dispose(&mut self) {
        if self.mounted.take().is_some() {
            log::info!("[stage] view disposed");
        }
    }
}

thread_local! {
    // The page-level view wired to the built-in controls.
    static PAGE_VIEW: RefCell<Option<(Mounted, events::Subscriptions)>> = const { RefCell::new(None) };
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("biome-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    if document.get_element_by_id(CANVAS_ID).is_none() {
        log::info!("no #{CANVAS_ID} on the page; waiting for BiomeView.mount");
        return Ok(());
    }
    let canvas = dom::canvas_by_id(&document, CANVAS_ID)?;
    let mounted = match Mounted::new(canvas.clone(), DEFAULT_BIOME).await {
        Ok(mounted) => mounted,
        Err(e) => {
            dom::show_mount_failure(&document, &canvas, &e.to_string());
            return Err(e);
        }
    };

    let controls = ui::wire_controls(&document, &mounted.stage);
    ui::highlight_biome(&document, mounted.stage.borrow().theme().key.as_str());
    ui::set_rotation_label(&document, mounted.stage.borrow().is_rotating());

    PAGE_VIEW.with(|slot| *slot.borrow_mut() = Some((mounted, controls)));
    Ok(())
}
