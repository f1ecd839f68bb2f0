//! DOM listeners that unregister themselves when dropped.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

pub mod pointer;

/// A registered event listener. Dropping it removes the listener and frees
/// the closure.
pub struct Subscription {
    target: web::EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web::Event)>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref());
    }
}

/// Listen for `kind` on `target`. With `passive: false` the handler may call
/// `prevent_default`.
pub fn listen(
    target: &web::EventTarget,
    kind: &'static str,
    passive: bool,
    handler: impl FnMut(web::Event) + 'static,
) -> Option<Subscription> {
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(web::Event)>);
    let opts = web::AddEventListenerOptions::new();
    opts.set_passive(passive);
    match target.add_event_listener_with_callback_and_add_event_listener_options(
        kind,
        closure.as_ref().unchecked_ref(),
        &opts,
    ) {
        Ok(()) => Some(Subscription {
            target: target.clone(),
            kind,
            closure,
        }),
        Err(e) => {
            log::warn!("[input] could not listen for {kind}: {:?}", e);
            None
        }
    }
}

/// Owns a group of listeners for one mounted view.
#[derive(Default)]
pub struct Subscriptions(Vec<Subscription>);

impl Subscriptions {
    pub fn push(&mut self, sub: Option<Subscription>) {
        if let Some(sub) = sub {
            self.0.push(sub);
        }
    }

    pub fn extend(&mut self, other: Subscriptions) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Remove every listener now.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}
