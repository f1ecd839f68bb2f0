use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type Tick = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A running `requestAnimationFrame` loop. Cancelled on [`FrameLoop::cancel`]
/// or drop.
pub struct FrameLoop {
    tick: Tick,
    pending: Rc<Cell<Option<i32>>>,
}

fn request(tick: &Tick, pending: &Cell<Option<i32>>) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        match w.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(id) => pending.set(Some(id)),
            Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
        }
    }
}

/// Call `on_frame` with the frame timestamp in seconds, once per display
/// refresh, until the returned loop is cancelled.
pub fn start_loop(mut on_frame: impl FnMut(f64) + 'static) -> FrameLoop {
    let tick: Tick = Rc::new(RefCell::new(None));
    let pending = Rc::new(Cell::new(None));

    let tick_clone = tick.clone();
    let pending_clone = pending.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp_ms: f64| {
        pending_clone.set(None);
        on_frame(timestamp_ms / 1000.0);
        request(&tick_clone, &pending_clone);
    }) as Box<dyn FnMut(f64)>));
    request(&tick, &pending);

    FrameLoop { tick, pending }
}

impl FrameLoop {
    pub fn is_running(&self) -> bool {
        self.tick.borrow().is_some()
    }

    /// Stop the loop. The closure is released, breaking its reference cycle.
    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            if let Some(w) = web::window() {
                let _ = w.cancel_animation_frame(id);
            }
        }
        self.tick.borrow_mut().take();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}
