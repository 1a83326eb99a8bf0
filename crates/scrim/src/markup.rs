#![forbid(unsafe_code)]

//! Dialog subtree construction and adoption.
//!
//! For synthesized dialogs the builder creates the canonical structure and
//! appends the container as the last child of the body, so the body is the
//! positioning containing block:
//!
//! ```text
//! section.modal#<identifier> [role=dialog] [data-modal-state=closed]
//! ├── div.modal_dialog.modal_dialog--<width>   (content markup payload)
//! │   └── button.modal_close [data-modal-close=true]   (optional)
//! └── div.modal_backdrop                       (owned mode only)
//! ```
//!
//! For [`ContentSource::ById`] the builder adopts an existing subtree by
//! identifier and creates nothing — a missing element is
//! [`ModalError::NotFound`].
//!
//! Each call produces a fresh subtree; the one exception is a shared
//! backdrop passed in as [`BackdropSource::Existing`], which the host
//! creates at most once per document and reuses.

use scrim_core::dom::{Document, NodeId};

use crate::config::{ContentSource, ModalConfig};
use crate::error::ModalError;

/// Attribute marking an element as a close control.
pub const CLOSE_ATTR: &str = "data-modal-close";

/// Attribute mirroring the lifecycle state on the container.
pub const STATE_ATTR: &str = "data-modal-state";

/// Class carried by every container element.
pub const MODAL_CLASS: &str = "modal";

/// Class carried by the dialog panel.
pub const DIALOG_CLASS: &str = "modal_dialog";

/// Class carried by backdrop elements.
pub const BACKDROP_CLASS: &str = "modal_backdrop";

/// Class carried by the synthesized close control.
pub const CLOSE_CLASS: &str = "modal_close";

/// Panel class enabling inner scrolling.
pub const INNER_SCROLL_CLASS: &str = "modal_dialog--scroll";

/// References into one modal's dialog subtree.
#[derive(Debug, Clone)]
pub struct DialogHandle {
    /// Outermost modal element.
    pub container: NodeId,
    /// Inner dialog panel carrying the content markup.
    pub panel: NodeId,
    /// Backdrop element; `None` only for an adopted subtree without one.
    pub backdrop: Option<NodeId>,
    /// Every close-control element currently in the subtree.
    pub close_controls: Vec<NodeId>,
}

/// Where the backdrop for a build comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropSource {
    /// Create a backdrop owned by this instance, inside its container.
    Owned,
    /// Reuse a page-level backdrop the host already owns.
    Existing(NodeId),
}

/// Build or adopt the dialog subtree for `config`.
pub fn build(
    doc: &mut Document,
    config: &ModalConfig,
    backdrop: BackdropSource,
) -> Result<DialogHandle, ModalError> {
    if config.content_source == ContentSource::ById {
        adopt(doc, config, backdrop)
    } else {
        Ok(synthesize(doc, config, backdrop))
    }
}

/// Re-scan a subtree for close controls.
///
/// Invoked after every content swap so controls carried by the replacement
/// subtree are picked up.
pub fn collect_close_controls(doc: &Document, root: NodeId) -> Vec<NodeId> {
    doc.find_with_attr(root, CLOSE_ATTR, "true")
}

fn synthesize(doc: &mut Document, config: &ModalConfig, backdrop: BackdropSource) -> DialogHandle {
    let container = doc.create_element("section");
    doc.add_class(container, MODAL_CLASS);
    if !config.css_class.is_empty() {
        doc.add_class(container, &config.css_class);
    }
    doc.set_attr(container, "id", &config.identifier);
    doc.set_attr(container, "role", "dialog");
    doc.set_attr(container, STATE_ATTR, "closed");

    let panel = doc.create_element("div");
    doc.add_class(panel, DIALOG_CLASS);
    doc.add_class(
        panel,
        &format!("{DIALOG_CLASS}--{}", config.width.class_suffix()),
    );
    if config.allow_inner_scroll {
        doc.add_class(panel, INNER_SCROLL_CLASS);
    }
    doc.set_markup(panel, &config.content);
    doc.append_child(container, panel);

    let mut close_controls = Vec::new();
    if config.add_close_button {
        let button = doc.create_element("button");
        doc.add_class(button, CLOSE_CLASS);
        doc.set_attr(button, "type", "button");
        doc.set_attr(button, CLOSE_ATTR, "true");
        doc.set_attr(button, "aria-label", "Close");
        doc.set_markup(button, &config.close_button_label);
        doc.append_child(panel, button);
        close_controls.push(button);
    }

    let backdrop_node = match backdrop {
        BackdropSource::Owned => {
            let node = doc.create_element("div");
            doc.add_class(node, BACKDROP_CLASS);
            doc.append_child(container, node);
            Some(node)
        }
        BackdropSource::Existing(node) => Some(node),
    };

    let body = doc.body();
    doc.append_child(body, container);

    DialogHandle {
        container,
        panel,
        backdrop: backdrop_node,
        close_controls,
    }
}

fn adopt(
    doc: &mut Document,
    config: &ModalConfig,
    backdrop: BackdropSource,
) -> Result<DialogHandle, ModalError> {
    let container = doc
        .element_by_id(&config.identifier)
        .ok_or_else(|| ModalError::NotFound {
            id: config.identifier.clone(),
        })?;
    let panel = doc
        .descendants(container)
        .into_iter()
        .find(|n| doc.has_class(*n, DIALOG_CLASS))
        .unwrap_or(container);
    let owned_backdrop = doc
        .descendants(container)
        .into_iter()
        .find(|n| *n != container && doc.has_class(*n, BACKDROP_CLASS));
    let backdrop_node = owned_backdrop.or(match backdrop {
        BackdropSource::Existing(node) => Some(node),
        BackdropSource::Owned => None,
    });
    let close_controls = collect_close_controls(doc, container);
    doc.set_attr(container, STATE_ATTR, "closed");

    Ok(DialogHandle {
        container,
        panel,
        backdrop: backdrop_node,
        close_controls,
    })
}
