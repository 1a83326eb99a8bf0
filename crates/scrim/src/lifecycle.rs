#![forbid(unsafe_code)]

//! Lifecycle state machine and notification types.
//!
//! One [`Lifecycle`] per instance drives the only legal transition chain:
//!
//! ```text
//! Uninitialized --begin_open--> Opening --mark_open--> Open
//! Open --begin_close--> Closing --finish_close--> Closed   (terminal)
//! ```
//!
//! Every transition method returns whether it fired; an invalid transition
//! is a no-op returning `false`, which is what makes `close()` idempotent
//! at the call sites. There is no way back out of `Closing` — once a close
//! begins, teardown after the transition delay is unconditional.

use crate::host::ModalId;

/// Lifecycle state of one modal instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    Opening,
    Open,
    Closing,
    Closed,
}

impl LifecycleState {
    /// Value mirrored into the container's `data-modal-state` attribute.
    pub const fn attr_value(self) -> &'static str {
        match self {
            Self::Uninitialized | Self::Closed => "closed",
            Self::Opening => "opening",
            Self::Open => "open",
            Self::Closing => "closing",
        }
    }
}

/// Externally observable lifecycle points, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// The instance started opening.
    Opening,
    /// The open transition finished.
    Opened,
    /// A close began; teardown is now unconditional.
    Closing,
    /// Teardown finished; the subtree is gone.
    Closed,
}

impl LifecyclePhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opening => "opening",
            Self::Opened => "opened",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

/// A lifecycle notification published on the host bus.
///
/// Carries the instance identifier so page code can correlate without
/// holding a handle, the way bubbling custom events are consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub modal: ModalId,
    pub identifier: String,
    pub phase: LifecyclePhase,
}

/// The per-instance state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lifecycle {
    state: LifecycleState,
}

impl Lifecycle {
    pub const fn new() -> Self {
        Self {
            state: LifecycleState::Uninitialized,
        }
    }

    #[inline]
    pub const fn state(self) -> LifecycleState {
        self.state
    }

    /// Uninitialized → Opening.
    pub fn begin_open(&mut self) -> bool {
        self.step(LifecycleState::Uninitialized, LifecycleState::Opening)
    }

    /// Opening → Open, once the position is computed.
    pub fn mark_open(&mut self) -> bool {
        self.step(LifecycleState::Opening, LifecycleState::Open)
    }

    /// Open → Closing. Returns `false` (no-op) from any other state.
    pub fn begin_close(&mut self) -> bool {
        self.step(LifecycleState::Open, LifecycleState::Closing)
    }

    /// Closing → Closed.
    pub fn finish_close(&mut self) -> bool {
        self.step(LifecycleState::Closing, LifecycleState::Closed)
    }

    fn step(&mut self, from: LifecycleState, to: LifecycleState) -> bool {
        if self.state == from {
            self.state = to;
            true
        } else {
            false
        }
    }
}
