#![forbid(unsafe_code)]

//! Publish/subscribe notification bus.
//!
//! The engine publishes lifecycle notifications on an [`EventBus`] instead
//! of dispatching custom events on a real document; page code subscribes
//! without holding any modal handle. Subscriptions are RAII guards in the
//! style of the reactive bindings this crate family uses elsewhere.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Dropping a [`Subscription`] removes the callback before the next
//!    emit cycle.
//! 3. `emit` snapshots the subscriber list first, so a callback that
//!    subscribes or unsubscribes takes effect from the next emit onward.
//!
//! # Failure Modes
//!
//! - A callback that panics propagates to the emitter (single-threaded,
//!   nothing to poison).
//! - Callbacks must not re-enter the publisher they were invoked from;
//!   the bus itself is re-entrancy safe, but the publishing component's
//!   state generally is not.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

struct Subscriber<E> {
    token: u64,
    callback: Rc<dyn Fn(&E)>,
}

struct Inner<E> {
    next_token: u64,
    subscribers: Vec<Subscriber<E>>,
}

/// A single-threaded broadcast bus for events of type `E`.
///
/// Cloning the bus yields another handle to the same subscriber list.
pub struct EventBus<E> {
    inner: Rc<RefCell<Inner<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<E> EventBus<E> {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                next_token: 1,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Deliver `event` to every current subscriber, in registration order.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Rc<dyn Fn(&E)>> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .map(|s| Rc::clone(&s.callback))
            .collect();
        for callback in snapshot {
            callback(event);
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl<E: 'static> EventBus<E> {
    /// Register a callback; it stays registered while the returned
    /// [`Subscription`] is alive.
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        let token = {
            let mut inner = self.inner.borrow_mut();
            let token = inner.next_token;
            inner.next_token += 1;
            inner.subscribers.push(Subscriber {
                token,
                callback: Rc::new(callback),
            });
            token
        };
        let weak: Weak<RefCell<Inner<E>>> = Rc::downgrade(&self.inner);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.borrow_mut().subscribers.retain(|s| s.token != token);
                }
            })),
        }
    }
}

/// RAII guard for a bus subscription; dropping it unsubscribes.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Leak the subscription so the callback stays registered for the
    /// lifetime of the bus.
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
