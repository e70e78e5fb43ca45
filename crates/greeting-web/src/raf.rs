//! `requestAnimationFrame` loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

type RafClosure = Closure<dyn FnMut(f64)>;

struct RafInner {
    /// Registered with `requestAnimationFrame`; re-registers itself each frame.
    closure: RefCell<Option<RafClosure>>,
    callback: RefCell<Box<dyn FnMut(f64)>>,
    running: Cell<bool>,
    raf_id: Cell<i32>,
}

/// Calls `callback` with the frame timestamp (ms) once per animation frame
/// between [`RafLoop::start`] and [`RafLoop::stop`].
pub struct RafLoop {
    inner: Rc<RafInner>,
}

fn request_frame(closure: &RafClosure) -> Option<i32> {
    let window = web_sys::window()?;
    window
        .request_animation_frame(closure.as_ref().unchecked_ref())
        .ok()
}

impl RafLoop {
    pub fn new(callback: impl FnMut(f64) + 'static) -> Self {
        Self {
            inner: Rc::new(RafInner {
                closure: RefCell::new(None),
                callback: RefCell::new(Box::new(callback)),
                running: Cell::new(false),
                raf_id: Cell::new(0),
            }),
        }
    }

    /// No-op if already running.
    pub fn start(&self) {
        if self.inner.running.get() {
            return;
        }
        self.inner.running.set(true);

        let inner = Rc::clone(&self.inner);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            if !inner.running.get() {
                return;
            }
            inner.callback.borrow_mut()(timestamp_ms);

            if inner.running.get() {
                if let Some(closure) = inner.closure.borrow().as_ref() {
                    if let Some(id) = request_frame(closure) {
                        inner.raf_id.set(id);
                    }
                }
            }
        }) as Box<dyn FnMut(f64)>);

        match request_frame(&closure) {
            Some(id) => self.inner.raf_id.set(id),
            None => {
                log::error!("requestAnimationFrame unavailable");
                self.inner.running.set(false);
            }
        }
        *self.inner.closure.borrow_mut() = Some(closure);
    }

    /// Cancel the pending frame. Safe to call from inside the callback.
    pub fn stop(&self) {
        if !self.inner.running.get() {
            return;
        }
        self.inner.running.set(false);
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(self.inner.raf_id.get());
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.get()
    }
}
