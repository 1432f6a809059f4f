// Copyright 2026 the Casement Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Subscriber lists and writable flag stores.
//!
//! Handlers are `Fn(&T)` closures. Notification iterates a snapshot of the
//! list, so a handler may subscribe, unsubscribe or trigger another
//! notification without invalidating the loop.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

type Handler<T> = Rc<dyn Fn(&T)>;

struct SubscriberList<T> {
    next_id: u64,
    handlers: Vec<(u64, Handler<T>)>,
}

/// An ordered list of change handlers.
pub struct Subscribers<T> {
    inner: Rc<RefCell<SubscriberList<T>>>,
}

impl<T: 'static> Subscribers<T> {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SubscriberList {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    /// Appends `handler`. It stays registered until the returned
    /// [`Subscription`] is dropped or [`detach`](Subscription::detach)ed.
    pub fn add(&self, handler: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut list = self.inner.borrow_mut();
            let id = list.next_id;
            list.next_id += 1;
            list.handlers.push((id, Rc::new(handler)));
            id
        };
        let weak: Weak<RefCell<SubscriberList<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().handlers.retain(|(h, _)| *h != id);
            }
        })
    }

    /// Calls every handler with `value`, in subscription order.
    pub fn notify(&self, value: &T) {
        let handlers: Vec<Handler<T>> = self
            .inner
            .borrow()
            .handlers
            .iter()
            .map(|(_, h)| Rc::clone(h))
            .collect();
        for handler in handlers {
            handler(value);
        }
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.borrow().handlers.len()
    }

    /// Whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: 'static> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Subscribers<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.inner.borrow().handlers.len())
            .finish()
    }
}

/// Keeps a handler registered; unsubscribes when dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to cancel.
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    /// Unsubscribes now.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keeps the handler registered for the lifetime of the source.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// A shared value that notifies subscribers when it changes.
pub struct Writable<T> {
    value: Rc<RefCell<T>>,
    subscribers: Subscribers<T>,
}

impl<T: Clone + PartialEq + 'static> Writable<T> {
    /// Creates a store holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value: Rc::new(RefCell::new(value)),
            subscribers: Subscribers::new(),
        }
    }

    /// Returns a copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Replaces the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        if *self.value.borrow() == value {
            return;
        }
        *self.value.borrow_mut() = value.clone();
        self.subscribers.notify(&value);
    }

    /// Subscribes to changes; `handler` is called immediately with the
    /// current value.
    pub fn subscribe(&self, handler: impl Fn(&T) + 'static) -> Subscription {
        handler(&self.get());
        self.subscribers.add(handler)
    }
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            value: Rc::clone(&self.value),
            subscribers: self.subscribers.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Writable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writable")
            .field("value", &*self.value.borrow())
            .field("subscribers", &self.subscribers)
            .finish()
    }
}
