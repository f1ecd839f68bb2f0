use super::{listen, Subscriptions};
use crate::{dom, input, SharedStage};
use biome_core::PointerInput;
use wasm_bindgen::JsCast;
use web_sys as web;

fn mouse_input(kind: &str, ev: &web::MouseEvent) -> Option<PointerInput> {
    let (x, y) = (ev.client_x() as f32, ev.client_y() as f32);
    match kind {
        "mousedown" => Some(PointerInput::Down { x, y }),
        "mousemove" => Some(PointerInput::Move { x, y }),
        "mouseup" => Some(PointerInput::Up),
        "mouseleave" => Some(PointerInput::Leave),
        _ => None,
    }
}

fn first_touch(ev: &web::TouchEvent) -> Option<(f32, f32)> {
    ev.touches()
        .get(0)
        .map(|t| (t.client_x() as f32, t.client_y() as f32))
}

/// Mouse, touch and wheel on the canvas, plus window resize.
pub fn wire_canvas_input(canvas: &web::HtmlCanvasElement, stage: &SharedStage) -> Subscriptions {
    let mut subs = Subscriptions::default();
    let target: &web::EventTarget = canvas.as_ref();

    for kind in ["mousedown", "mousemove", "mouseup", "mouseleave"] {
        let stage = stage.clone();
        subs.push(listen(target, kind, true, move |ev| {
            let Some(ev) = ev.dyn_ref::<web::MouseEvent>() else {
                return;
            };
            if let Some(input) = mouse_input(kind, ev) {
                stage.borrow_mut().handle_input(input);
            }
        }));
    }

    let touch_stage = stage.clone();
    subs.push(listen(target, "touchstart", true, move |ev| {
        let Some(ev) = ev.dyn_ref::<web::TouchEvent>() else {
            return;
        };
        if let Some((x, y)) = first_touch(ev) {
            touch_stage
                .borrow_mut()
                .handle_input(PointerInput::TouchStart { x, y });
        }
    }));

    let touch_stage = stage.clone();
    subs.push(listen(target, "touchmove", false, move |ev| {
        let Some(tev) = ev.dyn_ref::<web::TouchEvent>() else {
            return;
        };
        ev.prevent_default();
        if let Some((x, y)) = first_touch(tev) {
            touch_stage
                .borrow_mut()
                .handle_input(PointerInput::TouchMove { x, y });
        }
    }));

    for kind in ["touchend", "touchcancel"] {
        let stage = stage.clone();
        subs.push(listen(target, kind, true, move |_| {
            stage.borrow_mut().handle_input(PointerInput::TouchEnd);
        }));
    }

    let wheel_stage = stage.clone();
    subs.push(listen(target, "wheel", false, move |ev| {
        let Some(wev) = ev.dyn_ref::<web::WheelEvent>() else {
            return;
        };
        ev.prevent_default();
        let delta_y =
            input::normalize_wheel_delta(wev.delta_y(), wev.delta_mode(), dom::viewport_height());
        wheel_stage
            .borrow_mut()
            .handle_input(PointerInput::Wheel { delta_y });
    }));

    if let Some(window) = web::window() {
        let canvas = canvas.clone();
        let stage = stage.clone();
        subs.push(listen(window.as_ref(), "resize", true, move |_| {
            let (w, h) = dom::sync_canvas_backing_size(&canvas);
            stage.borrow_mut().resize(w, h);
        }));
    }

    log::debug!("[input] {} canvas listeners attached", subs.len());
    subs
}
