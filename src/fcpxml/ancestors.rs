//! Ancestor chains
//!
//! Position composes along the referencing chain rather than literal XML
//! nesting: the root of a resource's internal timeline (the `sequence` inside a
//! compound clip's `media`, or a multicam) is reached from the clip that
//! references it. Each link says which of the two it is, so the resolvers branch
//! on data rather than on per-kind special cases.

use super::document::NodeId;
use super::element::Element;
use super::Fcpxml;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AncestorLink {
    /// Literal XML parent
    Structural(NodeId),
    /// Clip that references the resource whose timeline the walk just left
    ResourceJump { resource: String, referrer: NodeId },
}

impl AncestorLink {
    /// Node the link designates
    pub fn node(&self) -> NodeId {
        match self {
            AncestorLink::Structural(node) => *node,
            AncestorLink::ResourceJump { referrer, .. } => *referrer,
        }
    }

    pub fn is_resource_jump(&self) -> bool {
        matches!(self, AncestorLink::ResourceJump { .. })
    }
}

/// Ancestors ordered nearest → furthest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorChain {
    links: Vec<AncestorLink>,
}

impl AncestorChain {
    pub fn new(links: Vec<AncestorLink>) -> Self {
        Self { links }
    }

    /// Literal XML ancestors of a node
    pub fn from_xml(fcpxml: &Fcpxml, id: NodeId) -> Self {
        Self {
            links: fcpxml
                .document()
                .xml_ancestors(id)
                .map(AncestorLink::Structural)
                .collect(),
        }
    }

    /// Chain of a child of the element whose chain is `self`
    pub fn child_chain(&self, parent: NodeId) -> Self {
        self.prepended(AncestorLink::Structural(parent))
    }

    /// Chain of the timeline root inside a resource referenced by `referrer`
    pub fn jump_chain(&self, resource: &str, referrer: NodeId) -> Self {
        self.prepended(AncestorLink::ResourceJump {
            resource: resource.to_string(),
            referrer,
        })
    }

    fn prepended(&self, link: AncestorLink) -> Self {
        let mut links = Vec::with_capacity(self.links.len() + 1);
        links.push(link);
        links.extend(self.links.iter().cloned());
        Self { links }
    }

    pub fn links(&self) -> &[AncestorLink] {
        &self.links
    }

    pub fn iter(&self) -> impl Iterator<Item = &AncestorLink> {
        self.links.iter()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.links.iter().map(AncestorLink::node)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn nearest(&self) -> Option<&AncestorLink> {
        self.links.first()
    }

    /// Chain of the ancestor at `index` (everything further than it)
    pub fn tail(&self, index: usize) -> Self {
        Self {
            links: self.links.get(index + 1..).map(<[_]>::to_vec).unwrap_or_default(),
        }
    }

    /// Ancestors as wrapped elements; unknown tags are skipped
    pub fn elements<'a>(&'a self, fcpxml: &'a Fcpxml) -> impl Iterator<Item = Element<'a>> + 'a {
        self.nodes().filter_map(move |node| Element::new(fcpxml, node))
    }

    /// Ancestors paired with each one's own further chain, nearest first
    pub fn with_tails<'a>(&'a self, fcpxml: &'a Fcpxml) -> impl Iterator<Item = (Element<'a>, AncestorChain)> + 'a {
        self.links.iter().enumerate().filter_map(move |(index, link)| {
            Element::new(fcpxml, link.node()).map(|element| (element, self.tail(index)))
        })
    }
}
