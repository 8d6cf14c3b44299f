//! Arena document model.
//!
//! A [`Document`] is the in-memory stand-in for the browser DOM that the
//! islands operate on. Nodes live in a slot arena and are addressed by
//! [`NodeId`]; a node is *attached* when its parent chain reaches the root.
//! Subtrees dropped by [`Document::remove_children`] are freed and their
//! slots reused. A `NodeId` carries the generation of its slot, so a stale
//! handle held by an island (for example the element focused before the
//! search dialog opened) never resolves to the node that took its place,
//! and [`Document::is_attached`] reports it as gone.
//!
//! Server fragments swapped in by the partial-update layer are stored as
//! opaque markup nodes: the client core never parses them, it only places
//! them and serialises them back out.

use crate::error::DomError;
use std::collections::BTreeMap;

/// `input` types that do not accept free text.
static NON_TEXT_INPUT_TYPES: phf::Set<&'static str> = phf::phf_set! {
    "button", "checkbox", "color", "file", "hidden", "image", "radio",
    "range", "reset", "submit",
};

/// Elements serialised without a closing tag.
static VOID_ELEMENTS: phf::Set<&'static str> = phf::phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link",
    "meta", "source", "track", "wbr",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Root,
    Element(Element),
    Text(String),
    /// Server-rendered markup inserted verbatim.
    Markup(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    /// Live `value` of form controls; not reflected into `attrs`.
    value: String,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
struct Slot {
    /// Bumped each time the slot is freed.
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    /// Vacant slots, reused before the arena grows.
    free: Vec<usize>,
    active: Option<NodeId>,
    /// Bumped on every mutation of the tree or its attributes.
    revision: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(Node {
                    parent: None,
                    children: Vec::new(),
                    kind: NodeKind::Root,
                }),
            }],
            free: Vec::new(),
            active: None,
            revision: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId {
            index: 0,
            generation: 0,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Live nodes, attached or not.
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Slots allocated so far, live or vacant.
    pub fn arena_len(&self) -> usize {
        self.slots.len()
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Create a detached element. Tag names are lowercased.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element {
            tag: tag.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            value: String::new(),
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    /// Move `child` (with its subtree) to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(parent)?;
        self.node(child)?;
        if child == self.root() || self.contains(child, parent) {
            return Err(DomError::Hierarchy { parent, child });
        }
        if matches!(self.node(parent)?.kind, NodeKind::Text(_) | NodeKind::Markup(_)) {
            return Err(DomError::Hierarchy { parent, child });
        }
        self.detach(child);
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        self.revision += 1;
        Ok(())
    }

    /// Create an element with `attrs` and append it to `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<NodeId, DomError> {
        let el = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attr(el, name, value)?;
        }
        self.adopt(parent, el)?;
        Ok(el)
    }

    pub fn append_text(
        &mut self,
        parent: NodeId,
        text: impl Into<String>,
    ) -> Result<NodeId, DomError> {
        let node = self.create_text(text);
        self.adopt(parent, node)?;
        Ok(node)
    }

    /// Remove and free every child of `node` with its subtree. Handles into
    /// the removed nodes go stale.
    pub fn remove_children(&mut self, node: NodeId) -> Result<(), DomError> {
        let children = std::mem::take(&mut self.node_mut(node)?.children);
        for child in children {
            self.release(child);
        }
        self.revision += 1;
        Ok(())
    }

    /// Replace the contents of `node` with a single opaque markup fragment.
    pub fn set_inner_markup(&mut self, node: NodeId, html: &str) -> Result<(), DomError> {
        self.remove_children(node)?;
        let markup = self.push(NodeKind::Markup(html.to_string()));
        self.adopt(node, markup)
    }

    /// Replace the contents of `node` with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) -> Result<(), DomError> {
        self.remove_children(node)?;
        self.append_text(node, text)?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Attributes and properties
    // -----------------------------------------------------------------------

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|el| el.attrs.get(name))
            .map(String::as_str)
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let el = self.element_mut(node)?;
        el.attrs.insert(name.to_ascii_lowercase(), value.to_string());
        self.revision += 1;
        Ok(())
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let removed = self.element_mut(node)?.attrs.remove(name);
        if removed.is_some() {
            self.revision += 1;
        }
        Ok(removed)
    }

    /// `data-*` attributes as a flat map, keyed the way the browser
    /// `dataset` keys them (`data-search-url` → `searchUrl`).
    pub fn data_attributes(&self, node: NodeId) -> BTreeMap<String, String> {
        let Some(el) = self.element(node) else {
            return BTreeMap::new();
        };
        el.attrs
            .iter()
            .filter_map(|(name, value)| {
                name.strip_prefix("data-")
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (dataset_key(rest), value.clone()))
            })
            .collect()
    }

    /// Live value of a form control (empty for other nodes).
    pub fn value(&self, node: NodeId) -> &str {
        self.element(node).map(|el| el.value.as_str()).unwrap_or("")
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), DomError> {
        self.element_mut(node)?.value = value.to_string();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.get(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// True when the parent chain of `node` reaches the root.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.contains(self.root(), node)
    }

    /// Inclusive ancestry test: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Nearest inclusive ancestor element matching `pred`.
    pub fn closest(&self, node: NodeId, pred: impl Fn(&Self, NodeId) -> bool) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.element(current).is_some() && pred(self, current) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Every node below `node` in document (pre-)order, `node` excluded.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Elements below `scope` whose tag is one of `tags`, in document order.
    pub fn elements_by_tag(&self, scope: NodeId, tags: &[&str]) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| self.tag(n).is_some_and(|t| tags.contains(&t)))
            .collect()
    }

    /// First attached element carrying `id="..."`, in document order.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root())
            .into_iter()
            .find(|&n| self.attr(n, "id") == Some(id))
    }

    /// Concatenated text of all text nodes below `node`. Opaque markup is
    /// not parsed and contributes nothing.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        if let Some(Node { kind: NodeKind::Text(t), .. }) = self.get(node) {
            out.push_str(t);
        }
        for n in self.descendants(node) {
            if let Some(Node { kind: NodeKind::Text(t), .. }) = self.get(n) {
                out.push_str(t);
            }
        }
        out
    }

    /// True when `node` or one of its ancestors has the `hidden` attribute.
    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.closest(node, |doc, n| doc.has_attr(n, "hidden")).is_some()
    }

    // -----------------------------------------------------------------------
    // Focus
    // -----------------------------------------------------------------------

    /// The focused element, if it is still attached.
    pub fn active_element(&self) -> Option<NodeId> {
        self.active.filter(|&n| self.is_attached(n))
    }

    pub fn focus(&mut self, node: NodeId) -> Result<(), DomError> {
        self.element(node).ok_or(DomError::NotAnElement(node))?;
        self.active = Some(node);
        Ok(())
    }

    pub fn blur(&mut self) {
        self.active = None;
    }

    /// True for controls that accept typed text: text-like `input`s,
    /// `textarea`, `select`, and anything inside a `contenteditable` region.
    pub fn is_editable(&self, node: NodeId) -> bool {
        let Some(tag) = self.tag(node) else {
            return false;
        };
        let editable_control = match tag {
            "input" => {
                let ty = self.attr(node, "type").unwrap_or("text").to_ascii_lowercase();
                !NON_TEXT_INPUT_TYPES.contains(ty.as_str())
            }
            "textarea" | "select" => true,
            _ => false,
        };
        if editable_control {
            return !self.has_attr(node, "disabled") && !self.has_attr(node, "readonly");
        }
        self.closest(node, |doc, n| doc.has_attr(n, "contenteditable"))
            .and_then(|n| self.attr(n, "contenteditable"))
            .is_some_and(|v| !v.eq_ignore_ascii_case("false"))
    }

    // -----------------------------------------------------------------------
    // Serialisation
    // -----------------------------------------------------------------------

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_node(node, &mut out);
        out
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.get(node) else {
            return;
        };
        match &n.kind {
            NodeKind::Root => {
                for &child in &n.children {
                    self.write_node(child, out);
                }
            }
            NodeKind::Text(t) => out.push_str(&escape_html(t)),
            NodeKind::Markup(m) => out.push_str(m),
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&escape_html(value));
                        out.push('"');
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(el.tag.as_str()) {
                    return;
                }
                for &child in &n.children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let node = Node {
            parent: None,
            children: Vec::new(),
            kind,
        };
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index: self.slots.len() - 1,
            generation: 0,
        }
    }

    /// Append a freshly created node, freeing it if the append is refused.
    fn adopt(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.append_child(parent, child).inspect_err(|_| self.release(child))
    }

    /// Free `node` and everything below it.
    fn release(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let Some(slot) = self
                .slots
                .get_mut(current.index)
                .filter(|s| s.generation == current.generation)
            else {
                continue;
            };
            if let Some(freed) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                stack.extend(freed.children);
            }
        }
        if self.active.is_some_and(|a| self.get(a).is_none()) {
            self.active = None;
        }
    }

    fn get(&self, node: NodeId) -> Option<&Node> {
        self.slots
            .get(node.index)
            .filter(|s| s.generation == node.generation)
            .and_then(|s| s.node.as_ref())
    }

    fn get_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(node.index)
            .filter(|s| s.generation == node.generation)
            .and_then(|s| s.node.as_mut())
    }

    fn node(&self, node: NodeId) -> Result<&Node, DomError> {
        self.get(node).ok_or(DomError::UnknownNode(node))
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut Node, DomError> {
        self.get_mut(node).ok_or(DomError::UnknownNode(node))
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        match self.get(node).map(|n| &n.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Result<&mut Element, DomError> {
        match self.get_mut(node).map(|n| &mut n.kind) {
            Some(NodeKind::Element(el)) => Ok(el),
            Some(_) => Err(DomError::NotAnElement(node)),
            None => Err(DomError::UnknownNode(node)),
        }
    }

    fn detach(&mut self, node: NodeId) {
        let parent = self.get_mut(node).and_then(|n| n.parent.take());
        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.retain(|&c| c != node);
        }
    }
}

/// `search-url` → `searchUrl`, matching `HTMLElement.dataset`.
fn dataset_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut upper = false;
    for c in raw.chars() {
        if c == '-' {
            upper = true;
        } else if upper && c.is_ascii_lowercase() {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            if upper {
                out.push('-');
            }
            out.push(c);
            upper = false;
        }
    }
    if upper {
        out.push('-');
    }
    out
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
