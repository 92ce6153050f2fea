//! Fragment tree
//!
//! A small arena tree built from a markup fragment, mutable enough to drop
//! nodes and serialize the result back in the same form the truncation
//! machine writes.

use crate::core::attributes::Attribute;
use crate::core::markup::{cdata_tag, closing_tag, comment_tag, is_void_tag, opening_tag};
use crate::sax::{EventSource, SaxEvent};
use std::borrow::Cow;

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// The document node is always the first node in the arena
pub const ROOT: NodeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Fragment root
    Document,
    Element,
    /// Text, kept exactly as written
    Text,
    CData,
    Comment,
}

#[derive(Debug, Clone)]
pub struct Node<'a> {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Element name; empty for other kinds
    pub name: Cow<'a, str>,
    pub attributes: Vec<Attribute<'a>>,
    /// Raw text, comment or CDATA body
    pub content: &'a str,
}

impl<'a> Node<'a> {
    fn new(kind: NodeKind, parent: Option<NodeId>) -> Self {
        Node {
            kind,
            parent,
            children: Vec::new(),
            name: Cow::Borrowed(""),
            attributes: Vec::new(),
            content: "",
        }
    }
}

/// Arena-backed fragment
#[derive(Debug, Clone)]
pub struct Fragment<'a> {
    nodes: Vec<Node<'a>>,
}

impl<'a> Fragment<'a> {
    /// Parse a fragment. Text outside any element hangs off the root.
    pub fn parse(input: &'a str) -> Self {
        let mut fragment = Fragment {
            nodes: vec![Node::new(NodeKind::Document, None)],
        };
        let mut current = ROOT;

        for event in EventSource::new(input, false) {
            match event {
                SaxEvent::StartElement { name, attributes } => {
                    let mut node = Node::new(NodeKind::Element, Some(current));
                    node.name = name;
                    node.attributes = attributes;
                    current = fragment.append(current, node);
                }
                SaxEvent::EndElement { .. } => {
                    current = fragment.nodes[current as usize].parent.unwrap_or(ROOT);
                }
                SaxEvent::Text { raw, .. } => {
                    fragment.append_leaf(current, NodeKind::Text, raw);
                }
                SaxEvent::Comment(body) => fragment.append_leaf(current, NodeKind::Comment, body),
                SaxEvent::CData(body) => fragment.append_leaf(current, NodeKind::CData, body),
                SaxEvent::EndDocument => break,
            }
        }

        fragment
    }

    fn append(&mut self, parent: NodeId, node: Node<'a>) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        self.nodes[parent as usize].children.push(id);
        id
    }

    fn append_leaf(&mut self, parent: NodeId, kind: NodeKind, content: &'a str) {
        let mut node = Node::new(kind, Some(parent));
        node.content = content;
        self.append(parent, node);
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node<'a>> {
        self.nodes.get(id as usize)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element name, None for non-element nodes
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        self.node(id)
            .filter(|node| node.kind == NodeKind::Element)
            .map(|node| &*node.name)
    }

    /// Child elements of `id` with the given name, in document order
    pub fn child_elements(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.element_name(child) == Some(name))
            .collect()
    }

    /// Detach `child` from `parent`. The node stays in the arena, unreachable.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let Some(node) = self.nodes.get_mut(parent as usize) else {
            return false;
        };
        match node.children.iter().position(|&id| id == child) {
            Some(index) => {
                node.children.remove(index);
                true
            }
            None => false,
        }
    }

    /// Pre-order walk of everything reachable below `id` (excluding `id`)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Serialize the reachable tree
    /// Uses iterative approach with explicit stack to avoid stack overflow on deep input
    pub fn serialize(&self) -> String {
        let mut buf = String::with_capacity(256);

        enum StackEntry {
            Enter(NodeId),
            Close(NodeId),
        }

        let mut stack: Vec<StackEntry> = Vec::with_capacity(64);
        stack.push(StackEntry::Enter(ROOT));

        while let Some(entry) = stack.pop() {
            match entry {
                StackEntry::Close(id) => {
                    if let Some(name) = self.element_name(id) {
                        buf.push_str(&closing_tag(name));
                    }
                }
                StackEntry::Enter(id) => {
                    let Some(node) = self.node(id) else { continue };

                    match node.kind {
                        NodeKind::Document => {}
                        NodeKind::Element => {
                            buf.push_str(&opening_tag(&node.name, &node.attributes, &[]));
                            if is_void_tag(&node.name) {
                                continue;
                            }
                            // Non-void elements always get an explicit closing tag
                            stack.push(StackEntry::Close(id));
                        }
                        NodeKind::Text => buf.push_str(node.content),
                        NodeKind::CData => buf.push_str(&cdata_tag(node.content)),
                        NodeKind::Comment => buf.push_str(&comment_tag(node.content)),
                    }

                    for &child in node.children.iter().rev() {
                        stack.push(StackEntry::Enter(child));
                    }
                }
            }
        }

        buf
    }
}
