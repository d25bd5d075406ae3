//! A small retained element tree standing in for the host page.
//!
//! Hosts mount rendered [`Element`]s into a [`Document`], hit-test against its
//! nodes, and deliver [`UiEvent`]s whose target is a [`NodeId`]. The document
//! also keeps the registry of document-wide click listeners.

use super::view::{Element, Handler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Body,
    Div,
    Button,
    Paragraph,
    List,
    ListItem,
}

/// Event delivered by the host; `target` is the node it originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiEvent {
    pub target: NodeId,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub tag: Tag,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub text: Option<String>,
    pub handler: Option<Handler>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: Tag) -> Self {
        Self {
            tag,
            id: None,
            classes: Vec::new(),
            text: None,
            handler: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Debug, Clone, Copy)]
struct ClickListener {
    id: ListenerId,
    capture: bool,
}

#[derive(Debug)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    free: Vec<usize>,
    body: NodeId,
    click_listeners: Vec<ClickListener>,
    next_listener: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::new(Tag::Body))],
            free: Vec::new(),
            body: NodeId(0),
            click_listeners: Vec::new(),
            next_listener: 0,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Create a detached node.
    pub fn create(&mut self, tag: Tag) -> NodeId {
        let node = Some(Node::new(tag));
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                NodeId(slot)
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.parent(child) {
            if let Some(node) = self.node_mut(old) {
                node.children.retain(|c| *c != child);
            }
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
    }

    /// Detach `id` and free it together with its subtree.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.body {
            return;
        }
        if let Some(parent) = self.parent(id) {
            if let Some(node) = self.node_mut(parent) {
                node.children.retain(|c| *c != id);
            }
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(next.0).and_then(Option::take) {
                stack.extend(node.children);
                self.free.push(next.0);
            }
        }
    }

    /// Build nodes for `element` and append them under `parent`.
    pub fn mount(&mut self, parent: NodeId, element: &Element) -> NodeId {
        let id = self.create(element.tag);
        if let Some(node) = self.node_mut(id) {
            node.id = element.id.clone();
            node.classes = element.classes.clone();
            node.text = element.text.clone();
            node.handler = element.handler;
        }
        self.append_child(parent, id);
        for child in &element.children {
            self.mount(id, child);
        }
        id
    }

    /// Replace everything under `parent` with a fresh mount of `element`.
    pub fn render_into(&mut self, parent: NodeId, element: &Element) -> NodeId {
        for child in self.children(parent).to_vec() {
            self.remove(child);
        }
        self.mount(parent, element)
    }

    /// The node and its ancestors, nearest first, ending at the top of its tree.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.node(id).map(|_| id),
        }
    }

    /// Whether `node` is `ancestor` or lies in its subtree.
    #[cfg(test)]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|n| n == ancestor)
    }

    /// Find an attached element by its `id` attribute.
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![self.body];
        while let Some(next) = stack.pop() {
            let node = self.node(next)?;
            if node.id.as_deref() == Some(id) {
                return Some(next);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Concatenated text of the node and its descendants, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        self.collect_text(id, &mut text);
        text
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(node) = self.node(id) {
            if let Some(t) = &node.text {
                out.push_str(t);
            }
            for child in &node.children {
                self.collect_text(*child, out);
            }
        }
    }

    pub fn add_click_listener(&mut self, capture: bool) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.click_listeners.push(ClickListener { id, capture });
        id
    }

    /// Returns `false` if the listener was not registered.
    pub fn remove_click_listener(&mut self, id: ListenerId) -> bool {
        let before = self.click_listeners.len();
        self.click_listeners.retain(|l| l.id != id);
        self.click_listeners.len() != before
    }

    #[cfg(test)]
    pub fn has_click_listener(&self, id: ListenerId) -> bool {
        self.click_listeners.iter().any(|l| l.id == id)
    }

    pub fn click_listener_count(&self) -> usize {
        self.click_listeners.len()
    }

    /// Listeners in dispatch order: capturing ones first, then bubbling ones,
    /// each group in registration order.
    pub fn click_listeners(&self) -> Vec<ListenerId> {
        let capturing = self.click_listeners.iter().filter(|l| l.capture);
        let bubbling = self.click_listeners.iter().filter(|l| !l.capture);
        capturing.chain(bubbling).map(|l| l.id).collect()
    }
}

pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId) {
        let mut doc = Document::new();
        let view = Element::div()
            .id("outer")
            .child(Element::button().text("Open ").child(Element::paragraph().text("Sans")))
            .child(Element::div().id("inner"));
        let root = doc.mount(doc.body(), &view);
        (doc, root)
    }

    #[test]
    fn mount_and_lookup() {
        let (doc, root) = sample();
        assert_eq!(doc.element_by_id("outer"), Some(root));
        let inner = doc.element_by_id("inner").unwrap();
        assert_eq!(doc.parent(inner), Some(root));
        assert_eq!(doc.element_by_id("missing"), None);
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let (doc, root) = sample();
        let button = doc.children(root)[0];
        assert_eq!(doc.text_content(button), "Open Sans");
    }

    #[test]
    fn ancestors_include_the_node_and_end_at_body() {
        let (doc, root) = sample();
        let button = doc.children(root)[0];
        let p = doc.children(button)[0];
        let chain: Vec<NodeId> = doc.ancestors(p).collect();
        assert_eq!(chain, vec![p, button, root, doc.body()]);
        assert!(doc.contains(root, p));
        assert!(doc.contains(root, root));
        assert!(!doc.contains(p, root));
    }

    #[test]
    fn render_into_replaces_and_reuses_slots() {
        let (mut doc, root) = sample();
        let slots = doc.nodes.len();
        let replacement = doc.render_into(doc.body(), &Element::div().id("outer"));
        assert!(doc.node(root).is_none() || root == replacement);
        assert_eq!(doc.children(doc.body()), &[replacement]);
        assert_eq!(doc.element_by_id("inner"), None);
        assert_eq!(doc.nodes.len(), slots);
    }

    #[test]
    fn removed_nodes_have_no_ancestors() {
        let (mut doc, root) = sample();
        let inner = doc.element_by_id("inner").unwrap();
        doc.remove(root);
        assert_eq!(doc.ancestors(inner).count(), 0);
        doc.remove(doc.body());
        assert!(doc.node(doc.body()).is_some());
    }

    #[test]
    fn capturing_listeners_dispatch_first() {
        let mut doc = Document::new();
        let bubbling = doc.add_click_listener(false);
        let capturing = doc.add_click_listener(true);
        assert_eq!(doc.click_listeners(), vec![capturing, bubbling]);
        assert!(doc.remove_click_listener(capturing));
        assert!(!doc.remove_click_listener(capturing));
        assert!(!doc.has_click_listener(capturing));
        assert_eq!(doc.click_listener_count(), 1);
    }
}
