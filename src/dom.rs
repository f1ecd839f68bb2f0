use crate::constants::ERROR_CLASS;
use crate::input;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn canvas_by_id(document: &web::Document, id: &str) -> anyhow::Result<web::HtmlCanvasElement> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| anyhow::anyhow!("missing #{id}"))?
        .dyn_into::<web::HtmlCanvasElement>()
        .map_err(|e| anyhow::anyhow!(format!("#{id} is not a canvas: {:?}", e)))
}

/// Match the canvas backing store to its CSS size times the capped device
/// pixel ratio. Returns the new size in pixels.
pub fn sync_canvas_backing_size(canvas: &web::HtmlCanvasElement) -> (u32, u32) {
    let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    let rect = canvas.get_bounding_client_rect();
    let (w, h) = input::backing_size(rect.width(), rect.height(), dpr);
    if canvas.width() != w {
        canvas.set_width(w);
    }
    if canvas.height() != h {
        canvas.set_height(h);
    }
    (w, h)
}

/// Put a visible notice next to `canvas`, or at the end of the body when the
/// canvas is detached.
pub fn show_mount_failure(document: &web::Document, canvas: &web::HtmlCanvasElement, reason: &str) {
    let Ok(notice) = document.create_element("div") else {
        return;
    };
    notice.set_class_name(ERROR_CLASS);
    notice.set_text_content(Some(&input::mount_failure_text(reason)));
    let parent = canvas
        .parent_node()
        .or_else(|| document.body().map(web::Node::from));
    if let Some(parent) = parent {
        let _ = parent.append_child(&notice);
    }
}

pub fn viewport_height() -> f64 {
    web::window()
        .and_then(|w| w.inner_height().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0)
}
