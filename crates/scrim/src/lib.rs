#![forbid(unsafe_code)]

//! Scrim — modal overlay lifecycle and positioning engine.
//!
//! Given content markup, Scrim builds a dialog subtree in the host
//! document, drives its opening → open → closing → closed lifecycle with
//! transition-delayed teardown, positions the dialog vertically against
//! the viewport, and publishes each lifecycle point on a notification bus.
//! The host document is the in-memory capability layer from
//! [`scrim_core`], so everything is drivable headless.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use scrim::{ModalHost, ModalOptions, Viewport};
//!
//! let mut host = ModalHost::new();
//! host.set_viewport(Viewport::new(0, 600));
//!
//! let id = host
//!     .create(
//!         ModalOptions::new()
//!             .content("<p>Saved.</p>")
//!             .transition(Duration::from_millis(200)),
//!     )
//!     .unwrap();
//!
//! // The dialog is open; the `opened` notification lands once the
//! // transition duration has been pumped.
//! host.advance(Duration::from_millis(200));
//!
//! host.close(id);
//! host.advance(Duration::from_millis(200));
//! assert!(host.is_empty());
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod markup;
pub mod position;

pub use config::{ContentSource, ModalConfig, ModalOptions, WidthVariant};
pub use error::ModalError;
pub use host::{BackdropMode, CloseReason, FALLBACK_CONTENT, HostAction, ModalHost, ModalId};
pub use lifecycle::{LifecycleEvent, LifecyclePhase, LifecycleState};
pub use markup::{BackdropSource, DialogHandle};

pub use scrim_core::dom::{Document, NodeId};
pub use scrim_core::event::Event;
pub use scrim_core::geometry::Viewport;
pub use scrim_core::notify::Subscription;
