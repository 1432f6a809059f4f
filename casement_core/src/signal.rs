// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single-threaded, multi-awaiter future.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, Waker};

/// A one-shot value shared by any number of awaiters.
///
/// Clones observe the same resolution. The first [`resolve`](Self::resolve)
/// wins; later calls are ignored. Every clone can be awaited, and all of
/// them complete together.
pub struct Signal<T> {
    inner: Rc<RefCell<SignalState<T>>>,
}

struct SignalState<T> {
    value: Option<T>,
    wakers: Vec<Waker>,
}

impl<T: Clone> Signal<T> {
    /// Creates an unresolved signal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalState {
                value: None,
                wakers: Vec::new(),
            })),
        }
    }

    /// Creates a signal that is already resolved with `value`.
    #[must_use]
    pub fn resolved(value: T) -> Self {
        let signal = Self::new();
        signal.resolve(value);
        signal
    }

    /// Resolves the signal and wakes every awaiter.
    ///
    /// Returns `false` if the signal was already resolved.
    pub fn resolve(&self, value: T) -> bool {
        let wakers = {
            let mut state = self.inner.borrow_mut();
            if state.value.is_some() {
                return false;
            }
            state.value = Some(value);
            core::mem::take(&mut state.wakers)
        };
        for waker in wakers {
            waker.wake();
        }
        true
    }

    /// Whether the signal has been resolved.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.inner.borrow().value.is_some()
    }

    /// Returns the resolved value, if any.
    #[must_use]
    pub fn value(&self) -> Option<T> {
        self.inner.borrow().value.clone()
    }

    /// Whether `self` and `other` are clones of the same signal.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Clone> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("Signal")
            .field("value", &state.value)
            .field("waiters", &state.wakers.len())
            .finish()
    }
}

impl<T: Clone> Future for Signal<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        let mut state = self.inner.borrow_mut();
        if let Some(value) = &state.value {
            return Poll::Ready(value.clone());
        }
        if !state.wakers.iter().any(|w| w.will_wake(cx.waker())) {
            state.wakers.push(cx.waker().clone());
        }
        Poll::Pending
    }
}
