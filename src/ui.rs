use crate::constants::{ACTIVE_CLASS, BIOME_BUTTON_SELECTOR, ROTATION_TOGGLE_ID};
use crate::events::{listen, Subscriptions};
use crate::{input, SharedStage};
use wasm_bindgen::JsCast;
use web_sys as web;

fn biome_buttons(document: &web::Document) -> Vec<web::HtmlElement> {
    let Ok(list) = document.query_selector_all(BIOME_BUTTON_SELECTOR) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<web::HtmlElement>().ok())
        .collect()
}

/// Mark the button for `key` active and clear the rest.
pub fn highlight_biome(document: &web::Document, key: &str) {
    for button in biome_buttons(document) {
        let is_current = button.dataset().get("biome").as_deref() == Some(key);
        let _ = button.class_list().toggle_with_force(ACTIVE_CLASS, is_current);
    }
}

pub fn set_rotation_label(document: &web::Document, rotating: bool) {
    if let Some(el) = document.get_element_by_id(ROTATION_TOGGLE_ID) {
        el.set_text_content(Some(input::rotation_label(rotating)));
    }
}

/// Biome selector buttons and the rotation toggle.
pub fn wire_controls(document: &web::Document, stage: &SharedStage) -> Subscriptions {
    let mut subs = Subscriptions::default();

    for button in biome_buttons(document) {
        let Some(key) = button.dataset().get("biome") else {
            continue;
        };
        let stage = stage.clone();
        let document = document.clone();
        subs.push(listen(button.as_ref(), "click", true, move |_| {
            match stage.borrow_mut().set_theme(&key) {
                Ok(()) => highlight_biome(&document, &key),
                Err(e) => log::error!("[stage] {e}"),
            }
        }));
    }

    if let Some(toggle) = document.get_element_by_id(ROTATION_TOGGLE_ID) {
        let stage = stage.clone();
        let document = document.clone();
        subs.push(listen(toggle.as_ref(), "click", true, move |_| {
            let rotating = {
                let mut stage = stage.borrow_mut();
                let next = !stage.is_rotating();
                stage.set_rotating(next);
                next
            };
            set_rotation_label(&document, rotating);
        }));
    }

    subs
}
