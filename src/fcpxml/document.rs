//! Owned arena representation of an XML document
//!
//! roxmltree gives a zero-copy DOM that borrows the source text. Resolution
//! results (ancestor chains, extracted markers) need to outlive the parse and
//! refer back to nodes cheaply, so the DOM is copied once into a flat arena and
//! nodes are addressed by `NodeId`. Parents are stored as indices, which keeps
//! ancestor walks O(1) per step without reference cycles.

use serde::{Deserialize, Serialize};

/// Handle of a node inside a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub struct Node {
    pub tag: String,
    /// Attributes in document order
    pub attributes: Vec<(String, String)>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
    /// Concatenated direct text content, if any
    pub text: Option<String>,
}

impl Node {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Copy a parsed roxmltree document into the arena
    pub fn from_xml(xml: &roxmltree::Document) -> Self {
        let mut nodes = Vec::new();
        let root = copy_element(xml.root_element(), None, &mut nodes);
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn tag(&self, id: NodeId) -> &str {
        &self.node(id).tag
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attribute(name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).children.iter().copied()
    }

    /// Children with the given tag
    pub fn children_named<'a>(&'a self, id: NodeId, tag: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id).filter(move |child| self.tag(*child) == tag)
    }

    pub fn first_child_named(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.children_named(id, tag).next()
    }

    /// Literal XML ancestors, nearest first
    pub fn xml_ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |current| self.parent(*current))
    }

    /// All descendants in document order (depth first), excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.node(current).children.iter().rev().copied());
        }
        out
    }

    /// Text of this node and all descendants, concatenated in document order
    pub fn deep_text(&self, id: NodeId) -> String {
        let mut text = self.node(id).text.clone().unwrap_or_default();
        for descendant in self.descendants(id) {
            if let Some(part) = &self.node(descendant).text {
                text.push_str(part);
            }
        }
        text
    }
}

fn copy_element(element: roxmltree::Node, parent: Option<NodeId>, nodes: &mut Vec<Node>) -> NodeId {
    let id = NodeId(nodes.len());

    let text: String = element
        .children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect();

    nodes.push(Node {
        tag: element.tag_name().name().to_string(),
        attributes: element
            .attributes()
            .map(|attr| (attr.name().to_string(), attr.value().to_string()))
            .collect(),
        children: Vec::new(),
        parent,
        text: if text.trim().is_empty() { None } else { Some(text) },
    });

    let children: Vec<NodeId> = element
        .children()
        .filter(|child| child.is_element())
        .map(|child| copy_element(child, Some(id), nodes))
        .collect();
    nodes[id.0].children = children;

    id
}
