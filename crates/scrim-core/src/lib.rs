#![forbid(unsafe_code)]

//! Host-page capabilities for Scrim.
//!
//! The modal engine in the `scrim` crate never touches a real browser
//! document. Instead it is written against the small capability layer in
//! this crate:
//!
//! - [`dom`] — an in-memory element tree with id/attribute lookup,
//!   class lists, raw markup payloads, and measured geometry.
//! - [`event`] — input events as the host dispatches them.
//! - [`geometry`] — viewport metrics (scroll offset and height).
//! - [`time`] — a fire-once deferred-action queue pumped by explicit
//!   `advance` calls.
//! - [`notify`] — a publish/subscribe bus with RAII subscriptions.
//!
//! Everything here is single-threaded and deterministic, so the full
//! lifecycle of a modal can be driven and observed from a test without a
//! host page.

pub mod dom;
pub mod event;
pub mod geometry;
pub mod notify;
pub mod time;

pub use dom::{Document, NodeId};
pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use geometry::Viewport;
pub use notify::{EventBus, Subscription};
pub use time::{DeferredId, DeferredQueue};
