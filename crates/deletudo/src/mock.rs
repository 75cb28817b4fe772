//! Mock DOM for native testing
//!
//! An arena document with light-DOM children, attachable shadow roots and a
//! log of every query, event and native click it receives. It implements
//! [`Dom`] so the locator, synthesizer and coordinator run unchanged against it.

use std::cell::RefCell;

use crate::dom::Dom;
use crate::event::{BoundingBox, SyntheticEvent};
use crate::result::{DeletudoError, DeletudoResult};
use crate::selector::{AttributeSource, Selector};

/// Handle to a node in a [`MockDocument`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Element data for the mock DOM
#[derive(Debug, Clone, PartialEq)]
pub struct MockElement {
    tag: String,
    attributes: Vec<(String, String)>,
    bounds: BoundingBox,
    native_click: bool,
    throws: bool,
}

impl MockElement {
    /// Create an element with the given tag
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            bounds: BoundingBox::default(),
            native_click: true,
            throws: false,
        }
    }

    /// Set an attribute
    #[must_use]
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        let name = name.to_ascii_lowercase();
        self.attributes.retain(|(n, _)| *n != name);
        self.attributes.push((name, value.to_string()));
        self
    }

    /// Set the on-screen bounding box
    #[must_use]
    pub const fn bounds(mut self, bounds: BoundingBox) -> Self {
        self.bounds = bounds;
        self
    }

    /// Model an element without `HTMLElement.click()` (e.g. SVG)
    #[must_use]
    pub const fn without_native_click(mut self) -> Self {
        self.native_click = false;
        self
    }

    /// Make every dispatch on this element throw
    #[must_use]
    pub const fn throws_on_dispatch(mut self) -> Self {
        self.throws = true;
        self
    }
}

impl AttributeSource for MockElement {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Something the document received from the code under test
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// A synthetic event was dispatched
    Event {
        /// Target element
        target: NodeId,
        /// The event
        event: SyntheticEvent,
    },
    /// `click()` was invoked
    NativeClick {
        /// Target element
        target: NodeId,
    },
}

impl Interaction {
    /// Target element
    #[must_use]
    pub const fn target(&self) -> NodeId {
        match self {
            Self::Event { target, .. } | Self::NativeClick { target } => *target,
        }
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    ShadowRoot,
    Element(MockElement),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
    shadow_root: Option<NodeId>,
    attached: bool,
}

impl Node {
    const fn new(parent: Option<NodeId>, kind: NodeKind) -> Self {
        Self {
            parent,
            children: Vec::new(),
            kind,
            shadow_root: None,
            attached: true,
        }
    }
}

/// Arena-backed mock document
#[derive(Debug)]
pub struct MockDocument {
    nodes: Vec<Node>,
    queries: RefCell<Vec<String>>,
    interactions: RefCell<Vec<Interaction>>,
}

impl Default for MockDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDocument {
    /// Create an empty document
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(None, NodeKind::Document)],
            queries: RefCell::new(Vec::new()),
            interactions: RefCell::new(Vec::new()),
        }
    }

    /// The document node
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn push(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(parent, kind));
        id
    }

    /// Append `element` as the last child of `parent` (document, shadow root
    /// or element)
    pub fn append(&mut self, parent: NodeId, element: MockElement) -> NodeId {
        let id = self.push(Some(parent), NodeKind::Element(element));
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Attach an open shadow root to `host`, returning it; returns the
    /// existing root when one is already attached
    pub fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        if let Some(existing) = self.nodes[host.0].shadow_root {
            return existing;
        }
        let shadow = self.push(Some(host), NodeKind::ShadowRoot);
        self.nodes[host.0].shadow_root = Some(shadow);
        shadow
    }

    /// Point `host`'s shadow root at an existing root. Lets tests build the
    /// malformed cyclic trees a hostile page could expose.
    pub fn share_shadow_root(&mut self, host: NodeId, shadow: NodeId) {
        self.nodes[host.0].shadow_root = Some(shadow);
    }

    /// Remove `node` from its parent and mark its subtree detached
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent {
            self.nodes[parent.0].children.retain(|child| *child != node);
        }
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            self.nodes[id.0].attached = false;
            stack.extend(self.nodes[id.0].children.iter().copied());
        }
    }

    /// Element data for `node`
    #[must_use]
    pub fn element(&self, node: NodeId) -> Option<&MockElement> {
        match &self.nodes.get(node.0)?.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Document | NodeKind::ShadowRoot => None,
        }
    }

    /// Patterns queried so far, in order
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        self.queries.borrow().clone()
    }

    /// Everything dispatched or clicked so far, in order
    #[must_use]
    pub fn interactions(&self) -> Vec<Interaction> {
        self.interactions.borrow().clone()
    }

    /// DOM event types dispatched on `node`, with `"click()"` marking a
    /// native activation
    #[must_use]
    pub fn activity_on(&self, node: NodeId) -> Vec<&'static str> {
        self.interactions
            .borrow()
            .iter()
            .filter(|interaction| interaction.target() == node)
            .map(|interaction| match interaction {
                Interaction::Event { event, .. } => event.dom_type(),
                Interaction::NativeClick { .. } => "click()",
            })
            .collect()
    }

    /// Forget recorded queries and interactions
    pub fn clear_log(&self) {
        self.queries.borrow_mut().clear();
        self.interactions.borrow_mut().clear();
    }

    /// Light-DOM descendants of `root` in document order
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[root.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    fn require_element(&self, node: NodeId) -> DeletudoResult<&MockElement> {
        self.element(node)
            .ok_or_else(|| DeletudoError::js(format!("node {} is not an element", node.0)))
    }
}

impl Dom for MockDocument {
    type Root = NodeId;
    type Element = NodeId;

    fn document(&self) -> DeletudoResult<NodeId> {
        Ok(self.root())
    }

    fn query(&self, root: &NodeId, selector: &Selector) -> DeletudoResult<Option<NodeId>> {
        self.queries.borrow_mut().push(selector.as_str().to_string());
        Ok(self
            .descendants(*root)
            .into_iter()
            .find(|id| self.element(*id).is_some_and(|el| selector.matches(el))))
    }

    fn shadow_roots(&self, root: &NodeId) -> DeletudoResult<Vec<NodeId>> {
        Ok(self
            .descendants(*root)
            .into_iter()
            .filter_map(|id| self.nodes[id.0].shadow_root)
            .collect())
    }

    fn bounding_box(&self, element: &NodeId) -> DeletudoResult<BoundingBox> {
        let el = self.require_element(*element)?;
        if !self.nodes[element.0].attached {
            return Err(DeletudoError::detached(self.describe(element)));
        }
        Ok(el.bounds)
    }

    fn first_element_child(&self, element: &NodeId) -> Option<NodeId> {
        self.nodes
            .get(element.0)?
            .children
            .iter()
            .copied()
            .find(|child| self.element(*child).is_some())
    }

    fn dispatch(&self, element: &NodeId, event: &SyntheticEvent) -> DeletudoResult<bool> {
        if self.require_element(*element)?.throws {
            return Err(DeletudoError::dispatch(event.dom_type(), "host listener threw"));
        }
        if !self.nodes[element.0].attached {
            return Err(DeletudoError::dispatch(
                event.dom_type(),
                format!("{} is detached", self.describe(element)),
            ));
        }
        self.interactions.borrow_mut().push(Interaction::Event {
            target: *element,
            event: *event,
        });
        Ok(true)
    }

    fn native_click(&self, element: &NodeId) -> DeletudoResult<bool> {
        let el = self.require_element(*element)?;
        if !el.native_click {
            return Ok(false);
        }
        if !self.nodes[element.0].attached {
            return Err(DeletudoError::detached(self.describe(element)));
        }
        self.interactions
            .borrow_mut()
            .push(Interaction::NativeClick { target: *element });
        Ok(true)
    }

    fn describe(&self, element: &NodeId) -> String {
        let Some(el) = self.element(*element) else {
            return format!("#node{}", element.0);
        };
        let mut label = el.tag.clone();
        if let Some(id) = el.attribute("id") {
            label.push('#');
            label.push_str(id);
        }
        for class in el.attribute("class").unwrap_or_default().split_whitespace() {
            label.push('.');
            label.push_str(class);
        }
        label
    }
}
