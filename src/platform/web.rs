//! Browser frame scheduling via requestAnimationFrame

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::clock::{LoopControl, LoopHandle, OwnedStep};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

/// A running animation-frame loop.
///
/// The next frame is requested only after the current step returns. Cancelling
/// (or dropping) the loop revokes the pending request, so no step runs after
/// teardown. The frame closure holds only weak references back to the loop,
/// so dropping it frees the closure and the step.
pub struct AnimationLoop {
    handle: LoopHandle,
    pending: Rc<Cell<Option<i32>>>,
    /// Sole strong owner of the frame closure
    _callback: FrameCallback,
    /// Sole strong owner of the step
    _step: Box<dyn Any>,
}

impl AnimationLoop {
    /// Start calling `step` with the browser's frame timestamp
    pub fn start<F>(step: F) -> Result<Self, JsValue>
    where
        F: FnMut(f64) -> LoopControl + 'static,
    {
        let step = OwnedStep::new(step);
        let handle = step.handle();
        let pending = Rc::new(Cell::new(None));
        let callback: FrameCallback = Rc::new(RefCell::new(None));

        let frame_step = step.downgrade();
        let reschedule = Rc::downgrade(&callback);
        let loop_pending = pending.clone();

        *callback.borrow_mut() = Some(Closure::new(move |time: f64| {
            loop_pending.set(None);
            if !frame_step.run(time) {
                return;
            }
            let Some(cell) = reschedule.upgrade() else {
                return;
            };
            if let Some(cb) = cell.borrow().as_ref() {
                match request_frame(cb) {
                    Ok(id) => loop_pending.set(Some(id)),
                    Err(e) => log::error!("requestAnimationFrame failed: {:?}", e),
                }
            }
        }));

        if let Some(cb) = callback.borrow().as_ref() {
            pending.set(Some(request_frame(cb)?));
        }

        Ok(Self {
            handle,
            pending,
            _callback: callback,
            _step: Box::new(step),
        })
    }

    /// Handle that cancels this loop from elsewhere (e.g. a step callback)
    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_cancelled()
    }

    /// Stop the loop and revoke the pending frame request
    pub fn cancel(&self) {
        self.handle.cancel();
        if let Some(id) = self.pending.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
        }
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}
