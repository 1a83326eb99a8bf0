#![forbid(unsafe_code)]

//! A minimal in-memory element tree standing in for the host document.
//!
//! The tree carries exactly what the modal engine consumes: tags, class
//! lists, attributes, an opaque raw-markup payload per element, an optional
//! host-measured height, and an optional vertical offset style. Content
//! markup is never parsed — it is a payload the engine stores and replaces
//! wholesale.
//!
//! # Invariants
//!
//! - The body node always exists and is never removable.
//! - A node has at most one parent; `append_child` detaches from any
//!   previous parent first.
//! - `remove_subtree` drops the node and every descendant; their ids stop
//!   resolving immediately.
//! - Traversal ([`Document::descendants`], [`Document::element_by_id`]) is
//!   preorder, so "first match" means first in document order.
//!
//! # Failure Modes
//!
//! - Operations on a stale [`NodeId`] never panic: mutators are no-ops,
//!   getters return `None` / empty values.
//! - `append_child` refuses to create a cycle (appending an ancestor under
//!   its own descendant is a no-op).

use ahash::AHashMap;

const EMPTY_CHILDREN: &[NodeId] = &[];

/// Opaque handle to a node in a [`Document`].
///
/// Ids are never reused within one document, so a handle to a removed node
/// simply stops resolving rather than aliasing a newer node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Get the raw id value.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attrs: AHashMap<String, String>,
    markup: String,
    measured_height: Option<i32>,
    top: Option<i32>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_owned(),
            classes: Vec::new(),
            attrs: AHashMap::new(),
            markup: String::new(),
            measured_height: None,
            top: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// The host document: a body node plus whatever the engine builds under it.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: AHashMap<u64, Node>,
    body: NodeId,
    next_key: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document containing only the body node.
    pub fn new() -> Self {
        let mut nodes = AHashMap::new();
        let body = NodeId(0);
        nodes.insert(body.raw(), Node::new("body"));
        Self {
            nodes,
            body,
            next_key: 1,
        }
    }

    /// The body node, the containing block every modal subtree hangs off.
    #[inline]
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element with the given tag.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.next_key);
        self.next_key += 1;
        self.nodes.insert(id.raw(), Node::new(tag));
        id
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent. No-op if either node is stale, if `child` is the
    /// body, or if the append would create a cycle.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if child == self.body
            || !self.nodes.contains_key(&parent.raw())
            || !self.nodes.contains_key(&child.raw())
            || self.is_ancestor(child, parent)
            || parent == child
        {
            return;
        }
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(&parent.raw()) {
            node.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(&child.raw()) {
            node.parent = Some(parent);
        }
    }

    /// Remove a node and its entire subtree from the document.
    ///
    /// The body is never removed. Ids of removed nodes stop resolving.
    pub fn remove_subtree(&mut self, node: NodeId) {
        if node == self.body || !self.nodes.contains_key(&node.raw()) {
            return;
        }
        self.detach(node);
        for id in self.descendants(node) {
            self.nodes.remove(&id.raw());
        }
    }

    /// Whether the node still exists in this document.
    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node.raw())
    }

    /// Tag name of the node, if it exists.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node.raw()).map(|n| n.tag.as_str())
    }

    /// Parent of the node, if it exists and is attached.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node.raw()).and_then(|n| n.parent)
    }

    /// Children of the node in document order; empty for stale ids.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node.raw())
            .map_or(EMPTY_CHILDREN, |n| n.children.as_slice())
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(n) = self.nodes.get_mut(&node.raw()) {
            n.attrs.insert(name.to_owned(), value.into());
        }
    }

    /// Read an attribute value.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(&node.raw())
            .and_then(|n| n.attrs.get(name))
            .map(String::as_str)
    }

    /// Add a class to the node's class list (deduplicated).
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.nodes.get_mut(&node.raw())
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.to_owned());
        }
    }

    /// Whether the node carries the given class.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(&node.raw())
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Replace the node's raw markup payload.
    pub fn set_markup(&mut self, node: NodeId, markup: impl Into<String>) {
        if let Some(n) = self.nodes.get_mut(&node.raw()) {
            n.markup = markup.into();
        }
    }

    /// The node's raw markup payload; empty for stale ids.
    pub fn markup(&self, node: NodeId) -> &str {
        self.nodes
            .get(&node.raw())
            .map_or("", |n| n.markup.as_str())
    }

    /// Record a host-measured height for the node, px.
    pub fn set_measured_height(&mut self, node: NodeId, height: i32) {
        if let Some(n) = self.nodes.get_mut(&node.raw()) {
            n.measured_height = Some(height);
        }
    }

    /// Drop any recorded measurement (e.g. after a content swap).
    pub fn clear_measured_height(&mut self, node: NodeId) {
        if let Some(n) = self.nodes.get_mut(&node.raw()) {
            n.measured_height = None;
        }
    }

    /// Host-measured height, if one was recorded.
    pub fn measured_height(&self, node: NodeId) -> Option<i32> {
        self.nodes.get(&node.raw()).and_then(|n| n.measured_height)
    }

    /// Write the node's vertical offset style, px.
    pub fn set_top(&mut self, node: NodeId, top: i32) {
        if let Some(n) = self.nodes.get_mut(&node.raw()) {
            n.top = Some(top);
        }
    }

    /// The node's vertical offset style, if one was written.
    pub fn top(&self, node: NodeId) -> Option<i32> {
        self.nodes.get(&node.raw()).and_then(|n| n.top)
    }

    /// First element in document order whose `id` attribute equals `id`.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id))
    }

    /// Preorder traversal of the subtree rooted at `root`, root included.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(root) {
            return out;
        }
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            out.push(node);
            for child in self.children(node).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// All nodes in the subtree rooted at `root` whose attribute `name`
    /// equals `value`, in document order.
    pub fn find_with_attr(&self, root: NodeId, name: &str, value: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|n| self.attr(*n, name) == Some(value))
            .collect()
    }

    /// Total number of live nodes, body included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.nodes.get(&node.raw()).and_then(|n| n.parent);
        if let Some(parent) = parent {
            if let Some(p) = self.nodes.get_mut(&parent.raw()) {
                p.children.retain(|c| *c != node);
            }
            if let Some(n) = self.nodes.get_mut(&node.raw()) {
                n.parent = None;
            }
        }
    }

    fn is_ancestor(&self, candidate: NodeId, of: NodeId) -> bool {
        let mut current = self.parent(of);
        while let Some(node) = current {
            if node == candidate {
                return true;
            }
            current = self.parent(node);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_exists_and_is_not_removable() {
        let mut doc = Document::new();
        let body = doc.body();
        doc.remove_subtree(body);
        assert!(doc.contains(body));
        assert_eq!(doc.tag(body), Some("body"));
    }

    #[test]
    fn append_places_child_last() {
        let mut doc = Document::new();
        let body = doc.body();
        let first = doc.create_element("div");
        let second = doc.create_element("div");
        doc.append_child(body, first);
        doc.append_child(body, second);
        assert_eq!(doc.children(body), &[first, second]);
        assert_eq!(doc.parent(second), Some(body));
    }

    #[test]
    fn append_detaches_from_previous_parent() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let child = doc.create_element("span");
        doc.append_child(body, a);
        doc.append_child(body, b);
        doc.append_child(a, child);
        doc.append_child(b, child);
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[child]);
    }

    #[test]
    fn append_refuses_cycles() {
        let mut doc = Document::new();
        let body = doc.body();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        doc.append_child(body, outer);
        doc.append_child(outer, inner);
        doc.append_child(inner, outer);
        assert_eq!(doc.parent(outer), Some(body));
    }

    #[test]
    fn remove_subtree_drops_descendants() {
        let mut doc = Document::new();
        let body = doc.body();
        let container = doc.create_element("section");
        let panel = doc.create_element("div");
        let button = doc.create_element("button");
        doc.append_child(body, container);
        doc.append_child(container, panel);
        doc.append_child(panel, button);

        doc.remove_subtree(container);
        assert!(!doc.contains(container));
        assert!(!doc.contains(panel));
        assert!(!doc.contains(button));
        assert!(doc.children(body).is_empty());
        assert_eq!(doc.node_count(), 1);
    }

    #[test]
    fn stale_ids_are_inert() {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        doc.remove_subtree(node);
        // Detached node was never attached; remove drops it anyway.
        doc.set_attr(node, "id", "ghost");
        doc.set_markup(node, "boo");
        assert_eq!(doc.attr(node, "id"), None);
        assert_eq!(doc.markup(node), "");
        assert_eq!(doc.top(node), None);
    }

    #[test]
    fn element_by_id_finds_first_in_document_order() {
        let mut doc = Document::new();
        let body = doc.body();
        let first = doc.create_element("div");
        let second = doc.create_element("div");
        doc.append_child(body, first);
        doc.append_child(body, second);
        doc.set_attr(first, "id", "dup");
        doc.set_attr(second, "id", "dup");
        assert_eq!(doc.element_by_id("dup"), Some(first));
        assert_eq!(doc.element_by_id("missing"), None);
    }

    #[test]
    fn find_with_attr_scans_whole_subtree() {
        let mut doc = Document::new();
        let body = doc.body();
        let container = doc.create_element("section");
        let panel = doc.create_element("div");
        let a = doc.create_element("button");
        let b = doc.create_element("a");
        doc.append_child(body, container);
        doc.append_child(container, panel);
        doc.append_child(panel, a);
        doc.append_child(container, b);
        doc.set_attr(a, "data-modal-close", "true");
        doc.set_attr(b, "data-modal-close", "true");
        assert_eq!(
            doc.find_with_attr(container, "data-modal-close", "true"),
            vec![a, b]
        );
    }

    #[test]
    fn classes_are_deduplicated() {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        doc.add_class(node, "modal");
        doc.add_class(node, "modal");
        assert!(doc.has_class(node, "modal"));
        assert!(!doc.has_class(node, "backdrop"));
    }

    #[test]
    fn measurement_round_trip() {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        assert_eq!(doc.measured_height(node), None);
        doc.set_measured_height(node, 420);
        assert_eq!(doc.measured_height(node), Some(420));
        doc.clear_measured_height(node);
        assert_eq!(doc.measured_height(node), None);
    }

    #[test]
    fn node_ids_are_never_reused() {
        let mut doc = Document::new();
        let body = doc.body();
        let a = doc.create_element("div");
        doc.append_child(body, a);
        doc.remove_subtree(a);
        let b = doc.create_element("div");
        assert_ne!(a, b);
        assert!(!doc.contains(a));
    }
}
