//! Arena-backed HTML DOM: parse, query, mutate, serialize.
//!
//! Confluence exports are real-world HTML, so parsing goes through html5ever
//! with browser-grade error recovery. The tree lands in a flat arena — nodes
//! in one `Vec`, parent/child/sibling links as indices — which keeps
//! traversal cheap and mutation simple (detaching a subtree is pointer
//! surgery, no reference counting).
//!
//! The rewrite stage only ever needs a handful of operations: find elements
//! by tag/id/class, read and replace attribute values, detach boilerplate
//! subtrees, splice in a text node, and serialize the result back to HTML.
//! That is exactly the surface this module exposes; it is not a general DOM.

mod serialize;
mod sink;

use std::collections::HashMap;

use html5ever::tendril::TendrilSink;
use html5ever::{LocalName, ParseOpts, QualName, parse_document};

pub use serialize::to_html;
use sink::DomSink;

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Sentinel for "no node".
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

#[derive(Debug, Clone)]
pub enum NodeData {
    /// Document root.
    Document,
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Pre-extracted id attribute for fast lookup.
        id: Option<String>,
    },
    Text(String),
    Comment(String),
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

/// Arena DOM tree.
pub struct Dom {
    nodes: Vec<Node>,
    document: NodeId,
    /// id attribute → node, filled while parsing.
    id_map: HashMap<String, NodeId>,
}

/// Parse an HTML document into a [`Dom`]. Never fails: html5ever recovers
/// from malformed markup the way a browser would.
pub fn parse_html(html: &str) -> Dom {
    let sink = DomSink::new();
    parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

impl Dom {
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
            id_map: HashMap::new(),
        };
        dom.document = dom.alloc(Node::new(NodeData::Document));
        dom
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let id_attr = attrs
            .iter()
            .find(|a| a.name.local.as_ref() == "id")
            .map(|a| a.value.clone());

        let node_id = self.alloc(Node::new(NodeData::Element {
            name,
            attrs,
            id: id_attr.clone(),
        }));

        if let Some(id_str) = id_attr {
            self.id_map.insert(id_str, node_id);
        }

        node_id
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text)))
    }

    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append a child to a parent node.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
        }

        if last_child.is_some()
            && let Some(last_node) = self.get_mut(last_child)
        {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert a node before an attached sibling.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let parent = self.get(sibling).map(|n| n.parent).unwrap_or(NodeId::NONE);
        let prev = self
            .get(sibling)
            .map(|n| n.prev_sibling)
            .unwrap_or(NodeId::NONE);

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text, merging into a trailing text node when possible.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Unlink a node (and its subtree) from its parent. The node stays in the
    /// arena but is no longer reachable from the document, so traversal and
    /// serialization never see it again. Detaching an already-detached node
    /// is a no-op.
    pub fn detach(&mut self, target: NodeId) {
        let (parent, prev, next) = {
            let node = match self.get(target) {
                Some(n) => n,
                None => return,
            };
            (node.parent, node.prev_sibling, node.next_sibling)
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if parent.is_some()
            && let Some(p) = self.get_mut(parent)
        {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if parent.is_some()
            && let Some(p) = self.get_mut(parent)
        {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Replace a node (and its subtree) with a plain text node.
    pub fn replace_with_text(&mut self, target: NodeId, text: &str) {
        if self.get(target).map(|n| n.parent).unwrap_or(NodeId::NONE).is_none() {
            return;
        }
        let text_node = self.create_text(text.to_string());
        self.insert_before(target, text_node);
        self.detach(target);
    }

    /// Reparent all children of `node` under `new_parent`, preserving order.
    pub fn reparent_children(&mut self, node: NodeId, new_parent: NodeId) {
        let children: Vec<_> = self.children(node).collect();

        for child in &children {
            if let Some(c) = self.get_mut(*child) {
                c.parent = NodeId::NONE;
                c.prev_sibling = NodeId::NONE;
                c.next_sibling = NodeId::NONE;
            }
        }
        if let Some(n) = self.get_mut(node) {
            n.first_child = NodeId::NONE;
            n.last_child = NodeId::NONE;
        }

        for child in children {
            self.append(new_parent, child);
        }
    }

    /// Look up a node by id attribute. Resolves against the parse-time id
    /// map; callers detach what they find, so a hit inside an already
    /// detached subtree just makes the detach a no-op.
    pub fn get_by_id(&self, id: &str) -> Option<NodeId> {
        self.id_map.get(id).copied()
    }

    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        ChildrenIter {
            dom: self,
            current: first,
        }
    }

    pub fn parent(&self, id: NodeId) -> NodeId {
        self.get(id).map(|n| n.parent).unwrap_or(NodeId::NONE)
    }

    /// First node matching a predicate, document order.
    pub fn find<F>(&self, predicate: F) -> Option<NodeId>
    where
        F: Fn(&Node) -> bool,
    {
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.get(id) {
                if predicate(node) {
                    return Some(id);
                }
                let mut children: Vec<_> = self.children(id).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        None
    }

    /// All elements with the given tag, document order. Only nodes still
    /// attached to the document are visited.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<NodeId> {
        let mut results = Vec::new();
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if self.element_name(id).is_some_and(|n| n.as_ref() == tag) {
                results.push(id);
            }
            let mut children: Vec<_> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
        }
        results
    }

    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// Set an attribute, replacing an existing value or adding the attribute.
    pub fn set_attr(&mut self, id: NodeId, attr_name: &str, value: &str) {
        if let Some(node) = self.get_mut(id)
            && let NodeData::Element { attrs, .. } = &mut node.data
        {
            if let Some(attr) = attrs.iter_mut().find(|a| a.name.local.as_ref() == attr_name) {
                attr.value = value.to_string();
            } else {
                attrs.push(Attribute {
                    name: QualName::new(None, html5ever::ns!(), LocalName::from(attr_name)),
                    value: value.to_string(),
                });
            }
        }
    }

    /// Whether an element's class attribute contains the given class.
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.get_attr(id, "class")
            .is_some_and(|v| v.split_whitespace().any(|c| c == class))
    }

    /// Concatenated text of a subtree, document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.get(current) {
                if let NodeData::Text(s) = &node.data {
                    out.push_str(s);
                }
                let mut children: Vec<_> = self.children(current).collect();
                children.reverse();
                stack.extend(children);
            }
        }
        out
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over direct children of a node.
pub struct ChildrenIter<'a> {
    dom: &'a Dom,
    current: NodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_finds_elements_by_tag() {
        let dom = parse_html("<html><body><p>Hello</p><p>World</p></body></html>");
        let ps = dom.find_all_by_tag("p");
        assert_eq!(ps.len(), 2);
        assert_eq!(dom.text_content(ps[0]), "Hello");
        assert_eq!(dom.text_content(ps[1]), "World");
    }

    #[test]
    fn parse_registers_ids() {
        let dom = parse_html(r#"<div id="main"><span id="inner">x</span></div>"#);
        let main = dom.get_by_id("main").unwrap();
        assert_eq!(dom.element_name(main).unwrap().as_ref(), "div");
        assert!(dom.get_by_id("inner").is_some());
        assert!(dom.get_by_id("missing").is_none());
    }

    #[test]
    fn detach_removes_subtree_from_traversal() {
        let mut dom = parse_html(r#"<div id="keep">a</div><div id="drop"><p>b</p></div>"#);
        let drop = dom.get_by_id("drop").unwrap();
        dom.detach(drop);

        assert_eq!(dom.find_all_by_tag("p").len(), 0);
        assert!(dom.get_by_id("keep").is_some());
        let html = to_html(&dom);
        assert!(html.contains("keep"));
        assert!(!html.contains("<p>b</p>"));
    }

    #[test]
    fn detach_twice_is_noop() {
        let mut dom = parse_html(r#"<div id="x">content</div>"#);
        let x = dom.get_by_id("x").unwrap();
        dom.detach(x);
        dom.detach(x);
        assert!(!to_html(&dom).contains("content"));
    }

    #[test]
    fn set_attr_replaces_existing() {
        let mut dom = parse_html(r#"<a href="old.html">link</a>"#);
        let a = dom.find_all_by_tag("a")[0];
        dom.set_attr(a, "href", "new/path.docx");
        assert_eq!(dom.get_attr(a, "href"), Some("new/path.docx"));
    }

    #[test]
    fn set_attr_adds_missing() {
        let mut dom = parse_html("<img>");
        let img = dom.find_all_by_tag("img")[0];
        dom.set_attr(img, "alt", "picture");
        assert_eq!(dom.get_attr(img, "alt"), Some("picture"));
    }

    #[test]
    fn has_class_matches_whole_tokens() {
        let dom = parse_html(r#"<div class="expand-container wide">x</div>"#);
        let div = dom.find_all_by_tag("div")[0];
        assert!(dom.has_class(div, "expand-container"));
        assert!(dom.has_class(div, "wide"));
        assert!(!dom.has_class(div, "expand"));
    }

    #[test]
    fn replace_with_text_splices_in_place() {
        let mut dom = parse_html("<p>before <span>middle</span> after</p>");
        let span = dom.find_all_by_tag("span")[0];
        dom.replace_with_text(span, "![img](pic.png)");

        let p = dom.find_all_by_tag("p")[0];
        assert_eq!(dom.text_content(p), "before ![img](pic.png) after");
    }

    #[test]
    fn text_content_concatenates_descendants() {
        let dom = parse_html("<a>Team <em>Space</em> Home</a>");
        let a = dom.find_all_by_tag("a")[0];
        assert_eq!(dom.text_content(a), "Team Space Home");
    }

    #[test]
    fn malformed_markup_still_parses() {
        let dom = parse_html("<div><p>unclosed<div>nested");
        assert!(!dom.find_all_by_tag("div").is_empty());
    }
}
