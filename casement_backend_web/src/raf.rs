// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` driver.
//!
//! [`RafLoop`] installs itself as the [`Runtime`]'s frame requester. A frame
//! is only requested while the runtime has work (pending style writes or
//! running animations); an idle page schedules no callbacks. Each callback
//! receives a [`DOMHighResTimeStamp`][mdn] in milliseconds, which is
//! converted to microsecond [`HostTime`] ticks.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use casement_core::runtime::{FrameStats, Runtime};
use casement_core::time::HostTime;

// Direct global bindings instead of `web_sys::Window` methods, so no
// Window/Performance object is fetched on every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

type RafClosure = Closure<dyn FnMut(f64)>;
type FrameHook = Box<dyn FnMut(HostTime, &FrameStats)>;

/// Drives a [`Runtime`] from `requestAnimationFrame`.
///
/// The loop stays attached until it is dropped or [`detach`](Self::detach)
/// is called.
pub struct RafLoop {
    inner: Rc<RafInner>,
}

struct RafInner {
    runtime: Runtime,

    /// The JS closure registered with `requestAnimationFrame`.
    closure: RefCell<Option<RafClosure>>,

    /// Optional hook run after every tick, e.g. to flush throttled drags.
    hook: RefCell<Option<FrameHook>>,

    /// The ID of the outstanding `requestAnimationFrame` call.
    pending: Cell<Option<i32>>,

    frames: Cell<u64>,
}

impl RafInner {
    fn request(&self) {
        if self.pending.get().is_some() {
            return;
        }
        if let Some(closure) = self.closure.borrow().as_ref() {
            let id = request_animation_frame(closure.as_ref().unchecked_ref());
            self.pending.set(Some(id));
        }
    }

    fn on_frame(&self, timestamp_ms: f64) {
        self.pending.set(None);
        let now = HostTime::from_millis_f64(timestamp_ms);
        self.frames.set(self.frames.get() + 1);

        // Re-arming happens inside `tick` through the frame requester.
        let stats = self.runtime.tick(now);
        if let Some(hook) = self.hook.borrow_mut().as_mut() {
            hook(now, &stats);
        }
    }
}

impl RafLoop {
    /// Attaches a loop to `runtime`.
    ///
    /// If the runtime already has work pending, the first frame is
    /// requested immediately.
    #[must_use]
    pub fn new(runtime: &Runtime) -> Self {
        let inner = Rc::new(RafInner {
            runtime: runtime.clone(),
            closure: RefCell::new(None),
            hook: RefCell::new(None),
            pending: Cell::new(None),
            frames: Cell::new(0),
        });

        let weak: Weak<RafInner> = Rc::downgrade(&inner);
        let closure = Closure::wrap(Box::new(move |timestamp_ms: f64| {
            if let Some(inner) = weak.upgrade() {
                inner.on_frame(timestamp_ms);
            }
        }) as Box<dyn FnMut(f64)>);
        *inner.closure.borrow_mut() = Some(closure);

        let weak = Rc::downgrade(&inner);
        runtime.set_frame_requester(move || {
            if let Some(inner) = weak.upgrade() {
                inner.request();
            }
        });
        Self { inner }
    }

    /// Runs `hook` after every tick with the frame time and its stats.
    ///
    /// Replaces any previous hook.
    pub fn set_frame_hook(&self, hook: impl FnMut(HostTime, &FrameStats) + 'static) {
        *self.inner.hook.borrow_mut() = Some(Box::new(hook));
    }

    /// Requests a frame even if the runtime is idle.
    pub fn request_frame(&self) {
        self.inner.request();
    }

    /// Whether a frame callback is outstanding.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.pending.get().is_some()
    }

    /// Number of frames delivered so far.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.inner.frames.get()
    }

    /// Cancels any outstanding callback and stops requesting frames.
    ///
    /// The runtime keeps its pending work; attach a new loop (or tick it
    /// manually) to flush it.
    pub fn detach(&self) {
        self.inner.runtime.clear_frame_requester();
        if let Some(id) = self.inner.pending.take() {
            cancel_animation_frame(id);
        }
    }
}

impl Drop for RafLoop {
    fn drop(&mut self) {
        self.detach();
        // Drop the JS closure so it doesn't leak.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for RafLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafLoop")
            .field("pending", &self.inner.pending.get())
            .field("frames", &self.inner.frames.get())
            .finish_non_exhaustive()
    }
}
