#![forbid(unsafe_code)]

//! The modal host: instance registry, input routing, and timer pumping.
//!
//! A [`ModalHost`] owns the document, the deferred-action queue, the
//! notification bus, and every live modal instance. The embedding page
//! drives it with three pumps:
//!
//! - [`ModalHost::handle_event`] for input signals (with the click target
//!   where one exists),
//! - [`ModalHost::advance`] for time,
//! - the explicit operations ([`ModalHost::create`], [`ModalHost::close`],
//!   [`ModalHost::update_content`], …).
//!
//! Input routing consults only live instances; destroying an instance
//! removes it from the registry, which is what guarantees a torn-down
//! modal can never observe another signal.
//!
//! # Invariants
//!
//! - At most one instance per identifier is live at a time.
//! - Only the topmost open instance receives the Escape signal.
//! - In [`BackdropMode::Shared`], at most one instance is `Open` at a
//!   time; opening another closes the previous through the normal timing.
//! - Each lifecycle phase is published at most once per instance, in
//!   opening → opened → closing → closed order.
//!
//! # Failure Modes
//!
//! - Operations on an unknown or already-destroyed [`ModalId`] are no-ops
//!   (the instance is inert, as a torn-down modal must be).
//! - A failed trigger activation is logged and swallowed by
//!   [`ModalHost::handle_event`]; use [`ModalHost::open_trigger`] directly
//!   to observe the error.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use scrim_core::dom::{Document, NodeId};
use scrim_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use scrim_core::geometry::Viewport;
use scrim_core::notify::{EventBus, Subscription};
use scrim_core::time::DeferredQueue;

use crate::config::{ModalConfig, ModalOptions};
use crate::error::ModalError;
use crate::lifecycle::{Lifecycle, LifecycleEvent, LifecyclePhase, LifecycleState};
use crate::markup::{self, BackdropSource, DialogHandle};
use crate::position;

/// Diagnostic markup rendered when a content update produces nothing usable.
pub const FALLBACK_CONTENT: &str =
    "<p class=\"modal_message modal_message--error\">An error occurred. Please try again.</p>";

/// Global counter for unique modal instance ids.
static MODAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a modal instance within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModalId(u64);

impl ModalId {
    fn new() -> Self {
        Self(MODAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw id value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Who owns the backdrop element, fixed at host construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackdropMode {
    /// Each instance owns a backdrop inside its own container.
    #[default]
    PerInstance,
    /// One lazily-created page-level backdrop is shared by all instances;
    /// only one instance is open at a time.
    Shared,
}

/// Why a close began.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Backdrop was clicked.
    Backdrop,
    /// Escape was pressed.
    Escape,
    /// A close control was clicked.
    CloseControl,
    /// `close()` was called.
    Programmatic,
    /// Another modal opened over this one (shared backdrop).
    Superseded,
}

/// What an input signal did, when it did anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    /// A trigger element opened a fresh instance.
    Opened(ModalId),
    /// An instance began closing.
    CloseStarted { id: ModalId, reason: CloseReason },
}

/// Deferred work scheduled on the host queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerAction {
    AnnounceOpened(ModalId),
    FinishClose(ModalId),
}

struct Instance {
    id: ModalId,
    config: ModalConfig,
    handle: DialogHandle,
    lifecycle: Lifecycle,
    trigger: Option<NodeId>,
}

/// Registry and driver for every modal on one page.
pub struct ModalHost {
    doc: Document,
    viewport: Viewport,
    bus: EventBus<LifecycleEvent>,
    timers: DeferredQueue<TimerAction>,
    backdrop_mode: BackdropMode,
    shared_backdrop: Option<NodeId>,
    active: Option<ModalId>,
    instances: Vec<Instance>,
    triggers: Vec<(NodeId, ModalOptions)>,
}

impl Default for ModalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalHost {
    /// Create a host with per-instance backdrops.
    pub fn new() -> Self {
        Self::with_backdrop_mode(BackdropMode::PerInstance)
    }

    /// Create a host with the given backdrop ownership rule.
    pub fn with_backdrop_mode(mode: BackdropMode) -> Self {
        Self {
            doc: Document::new(),
            viewport: Viewport::default(),
            bus: EventBus::new(),
            timers: DeferredQueue::new(),
            backdrop_mode: mode,
            shared_backdrop: None,
            active: None,
            instances: Vec::new(),
            triggers: Vec::new(),
        }
    }

    // --- Context ---

    /// Update the viewport metrics used for positioning.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// The viewport metrics last supplied by the page.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The host document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access to the host document (e.g. to pre-build markup for
    /// by-id adoption, or to record measured heights).
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Subscribe to lifecycle notifications.
    pub fn subscribe(&self, callback: impl Fn(&LifecycleEvent) + 'static) -> Subscription {
        self.bus.subscribe(callback)
    }

    // --- Operations ---

    /// Resolve options, build markup, bind routing, and open.
    pub fn create(&mut self, options: ModalOptions) -> Result<ModalId, ModalError> {
        self.create_inner(options, None)
    }

    /// Begin closing an instance. Same path as user-triggered dismissal.
    ///
    /// Returns `false` (no notification, no timer) unless the instance is
    /// currently `Open`.
    pub fn close(&mut self, id: ModalId) -> bool {
        self.close_internal(id, CloseReason::Programmatic)
    }

    /// Register a page element as a trigger: clicking it opens a fresh
    /// instance resolved from `options`. Replaces any previous options
    /// registered for the same element.
    pub fn register_trigger(&mut self, trigger: NodeId, options: ModalOptions) {
        if let Some(entry) = self.triggers.iter_mut().find(|(n, _)| *n == trigger) {
            entry.1 = options;
        } else {
            self.triggers.push((trigger, options));
        }
    }

    /// Open the modal registered for a trigger element.
    ///
    /// While an instance opened from this trigger is still opening or
    /// open, its id is returned instead of stacking a duplicate.
    pub fn open_trigger(&mut self, trigger: NodeId) -> Result<ModalId, ModalError> {
        let options = match self.triggers.iter().find(|(n, _)| *n == trigger) {
            Some((_, options)) => options.clone(),
            None => {
                let id = self
                    .doc
                    .attr(trigger, "id")
                    .map(str::to_owned)
                    .unwrap_or_else(|| format!("node:{}", trigger.raw()));
                return Err(ModalError::NotFound { id });
            }
        };
        if let Some(existing) = self.instances.iter().find(|i| {
            i.trigger == Some(trigger)
                && matches!(
                    i.lifecycle.state(),
                    LifecycleState::Opening | LifecycleState::Open
                )
        }) {
            return Ok(existing.id);
        }
        self.create_inner(options, Some(trigger))
    }

    /// Replace the panel content of an open instance with late-arriving
    /// markup (the ajax / event-callback sources).
    ///
    /// `None` or blank markup renders [`FALLBACK_CONTENT`] instead and
    /// reports [`ModalError::ContentUpdateFailed`]; the dialog stays open
    /// either way. Close controls are re-collected and the panel is
    /// re-positioned because its height changed. A stale id is a no-op.
    pub fn update_content(
        &mut self,
        id: ModalId,
        content: Option<String>,
    ) -> Result<(), ModalError> {
        let Some(idx) = self.instances.iter().position(|i| i.id == id) else {
            return Ok(());
        };
        let viewport = self.viewport;
        let ModalHost {
            doc, instances, ..
        } = self;
        let inst = &mut instances[idx];
        let panel = inst.handle.panel;

        let usable = content.filter(|c| !c.trim().is_empty());
        let failed = usable.is_none();
        doc.set_markup(panel, usable.unwrap_or_else(|| FALLBACK_CONTENT.to_owned()));
        doc.clear_measured_height(panel);
        inst.handle.close_controls = markup::collect_close_controls(doc, inst.handle.container);

        let height = position::dialog_height(doc, panel);
        let top = position::compute_top(viewport.scroll_offset, viewport.height, height);
        doc.set_top(panel, top);

        if failed {
            tracing::warn!(modal = id.raw(), "content update failed, fallback rendered");
            Err(ModalError::ContentUpdateFailed {
                id: inst.config.identifier.clone(),
            })
        } else {
            tracing::trace!(modal = id.raw(), height, top, "content replaced");
            Ok(())
        }
    }

    // --- Pumps ---

    /// Route an input signal, with the click target where one exists.
    pub fn handle_event(&mut self, event: &Event, target: Option<NodeId>) -> Option<HostAction> {
        match event {
            Event::Key(KeyEvent {
                code: KeyCode::Escape,
                kind: KeyEventKind::Press,
                ..
            }) => {
                let (id, allowed) = self
                    .instances
                    .iter()
                    .rev()
                    .find(|i| i.lifecycle.state() == LifecycleState::Open)
                    .map(|i| (i.id, i.config.allow_escape_close))?;
                if allowed && self.close_internal(id, CloseReason::Escape) {
                    Some(HostAction::CloseStarted {
                        id,
                        reason: CloseReason::Escape,
                    })
                } else {
                    None
                }
            }
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Down(MouseButton::Left),
                ..
            }) => {
                let target = target?;
                if self.triggers.iter().any(|(n, _)| *n == target) {
                    return match self.open_trigger(target) {
                        Ok(id) => Some(HostAction::Opened(id)),
                        Err(error) => {
                            tracing::warn!(%error, "trigger activation failed");
                            None
                        }
                    };
                }
                if let Some(id) = self
                    .instances
                    .iter()
                    .rev()
                    .find(|i| {
                        i.lifecycle.state() == LifecycleState::Open
                            && i.handle.close_controls.contains(&target)
                    })
                    .map(|i| i.id)
                {
                    return if self.close_internal(id, CloseReason::CloseControl) {
                        Some(HostAction::CloseStarted {
                            id,
                            reason: CloseReason::CloseControl,
                        })
                    } else {
                        None
                    };
                }
                let (id, allowed) = self
                    .instances
                    .iter()
                    .rev()
                    .find(|i| {
                        i.lifecycle.state() == LifecycleState::Open
                            && i.handle.backdrop == Some(target)
                    })
                    .map(|i| (i.id, i.config.allow_backdrop_close))?;
                if allowed && self.close_internal(id, CloseReason::Backdrop) {
                    Some(HostAction::CloseStarted {
                        id,
                        reason: CloseReason::Backdrop,
                    })
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Advance time, firing any transition deadlines that came due.
    pub fn advance(&mut self, delta: Duration) {
        for action in self.timers.advance(delta) {
            match action {
                TimerAction::AnnounceOpened(id) => self.announce_opened(id),
                TimerAction::FinishClose(id) => self.finish_close(id),
            }
        }
    }

    // --- Queries ---

    /// Lifecycle state of an instance, `None` once destroyed.
    pub fn state(&self, id: ModalId) -> Option<LifecycleState> {
        self.instances
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.lifecycle.state())
    }

    /// Dialog handle of a live instance.
    pub fn handle(&self, id: ModalId) -> Option<&DialogHandle> {
        self.instances.iter().find(|i| i.id == id).map(|i| &i.handle)
    }

    /// Configured identifier of a live instance.
    pub fn identifier(&self, id: ModalId) -> Option<&str> {
        self.instances
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.config.identifier.as_str())
    }

    /// Whether the instance is still live.
    pub fn contains(&self, id: ModalId) -> bool {
        self.instances.iter().any(|i| i.id == id)
    }

    /// Number of live instances.
    pub fn depth(&self) -> usize {
        self.instances.len()
    }

    /// Whether no instances are live.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// The shared backdrop node, if this host runs in shared mode and has
    /// created it.
    pub fn shared_backdrop(&self) -> Option<NodeId> {
        self.shared_backdrop
    }

    /// Number of deferred actions waiting on the queue.
    pub fn pending_deferred(&self) -> usize {
        self.timers.pending()
    }

    // --- Internals ---

    fn create_inner(
        &mut self,
        options: ModalOptions,
        trigger: Option<NodeId>,
    ) -> Result<ModalId, ModalError> {
        let config = ModalConfig::resolve(options)?;
        if self
            .instances
            .iter()
            .any(|i| i.config.identifier == config.identifier)
        {
            return Err(ModalError::InvalidConfiguration {
                field: "identifier",
                value: config.identifier,
            });
        }
        let backdrop = match self.backdrop_mode {
            BackdropMode::PerInstance => BackdropSource::Owned,
            BackdropMode::Shared => BackdropSource::Existing(self.ensure_shared_backdrop()),
        };
        let handle = markup::build(&mut self.doc, &config, backdrop)?;
        // The previous modal is superseded only once the new build succeeded.
        if self.backdrop_mode == BackdropMode::Shared
            && let Some(previous) = self.active
        {
            self.close_internal(previous, CloseReason::Superseded);
        }
        let id = ModalId::new();
        tracing::debug!(modal = id.raw(), identifier = %config.identifier, "modal created");
        self.instances.push(Instance {
            id,
            config,
            handle,
            lifecycle: Lifecycle::new(),
            trigger,
        });
        let idx = self.instances.len() - 1;
        self.open_instance(idx);
        if self.backdrop_mode == BackdropMode::Shared {
            self.active = Some(id);
            if let Some(node) = self.shared_backdrop {
                self.doc.set_attr(node, markup::STATE_ATTR, "open");
            }
        }
        Ok(id)
    }

    fn open_instance(&mut self, idx: usize) {
        let viewport = self.viewport;
        let ModalHost {
            doc,
            timers,
            bus,
            instances,
            ..
        } = self;
        let inst = &mut instances[idx];

        inst.lifecycle.begin_open();
        doc.set_attr(inst.handle.container, markup::STATE_ATTR, "opening");
        bus.emit(&LifecycleEvent {
            modal: inst.id,
            identifier: inst.config.identifier.clone(),
            phase: LifecyclePhase::Opening,
        });

        // Entry position first, then the computed one, so the dialog
        // transitions downward into place.
        doc.set_top(inst.handle.panel, position::entry_top(viewport.scroll_offset));
        let height = position::dialog_height(doc, inst.handle.panel);
        let top = position::compute_top(viewport.scroll_offset, viewport.height, height);
        doc.set_top(inst.handle.panel, top);

        inst.lifecycle.mark_open();
        doc.set_attr(inst.handle.container, markup::STATE_ATTR, "open");
        timers.defer(
            inst.config.transition,
            TimerAction::AnnounceOpened(inst.id),
        );
        tracing::debug!(modal = inst.id.raw(), top, height, "modal open");
    }

    fn close_internal(&mut self, id: ModalId, reason: CloseReason) -> bool {
        let Some(idx) = self.instances.iter().position(|i| i.id == id) else {
            return false;
        };
        let ModalHost {
            doc,
            timers,
            bus,
            instances,
            ..
        } = self;
        let inst = &mut instances[idx];
        if !inst.lifecycle.begin_close() {
            return false;
        }
        doc.set_attr(inst.handle.container, markup::STATE_ATTR, "closing");
        bus.emit(&LifecycleEvent {
            modal: id,
            identifier: inst.config.identifier.clone(),
            phase: LifecyclePhase::Closing,
        });
        timers.defer(inst.config.transition, TimerAction::FinishClose(id));
        tracing::debug!(modal = id.raw(), ?reason, "modal closing");
        true
    }

    fn announce_opened(&self, id: ModalId) {
        let Some(inst) = self.instances.iter().find(|i| i.id == id) else {
            return;
        };
        // A close that started inside the open-transition window wins; the
        // announcement is skipped so phases stay in order.
        if inst.lifecycle.state() != LifecycleState::Open {
            return;
        }
        self.bus.emit(&LifecycleEvent {
            modal: id,
            identifier: inst.config.identifier.clone(),
            phase: LifecyclePhase::Opened,
        });
    }

    fn finish_close(&mut self, id: ModalId) {
        let Some(idx) = self.instances.iter().position(|i| i.id == id) else {
            return;
        };
        let mut inst = self.instances.remove(idx);
        inst.lifecycle.finish_close();
        // Mirror the state, announce, then tear down, in that order.
        self.doc
            .set_attr(inst.handle.container, markup::STATE_ATTR, "closed");
        self.bus.emit(&LifecycleEvent {
            modal: id,
            identifier: inst.config.identifier.clone(),
            phase: LifecyclePhase::Closed,
        });
        self.doc.remove_subtree(inst.handle.container);
        if self.active == Some(id) {
            self.active = None;
            if let Some(node) = self.shared_backdrop {
                self.doc.set_attr(node, markup::STATE_ATTR, "closed");
            }
        }
        tracing::debug!(modal = id.raw(), identifier = %inst.config.identifier, "modal destroyed");
    }

    fn ensure_shared_backdrop(&mut self) -> NodeId {
        if let Some(node) = self.shared_backdrop
            && self.doc.contains(node)
        {
            return node;
        }
        let node = self.doc.create_element("div");
        self.doc.add_class(node, markup::BACKDROP_CLASS);
        self.doc.set_attr(node, "data-modal-backdrop", "shared");
        self.doc.set_attr(node, markup::STATE_ATTR, "closed");
        let body = self.doc.body();
        self.doc.append_child(body, node);
        self.shared_backdrop = Some(node);
        node
    }
}
