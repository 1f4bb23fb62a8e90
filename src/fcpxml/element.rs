//! Type-erased element wrapper
//!
//! `Element` pairs a node handle with its classified kind and the document it
//! lives in. Attribute accessors decode FCPXML's string attributes into typed
//! values; the `*_reported` variants push a diagnostic when a value is present
//! but cannot be decoded.

use super::document::{Node, NodeId};
use super::kinds::{classify, AnnotationKind, ElementKind, KindCapabilities, StoryKind, StructureKind};
use super::resources::ResourceDescriptor;
use super::Fcpxml;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::time::{parse_time, Fraction, TimeError};
use chrono::{DateTime, FixedOffset};
use std::fmt;

/// Drop-frame flag carried by `tcFormat`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimecodeFormat {
    DropFrame,
    NonDropFrame,
}

#[derive(Clone, Copy)]
pub struct Element<'a> {
    fcpxml: &'a Fcpxml,
    id: NodeId,
    kind: ElementKind,
}

impl<'a> Element<'a> {
    /// Wrap a node; `None` if its tag is not a known kind
    pub fn new(fcpxml: &'a Fcpxml, id: NodeId) -> Option<Self> {
        let kind = classify(fcpxml.document().get(id)?.tag.as_str())?;
        Some(Self { fcpxml, id, kind })
    }

    /// Document root; its tag is checked when the document is parsed
    pub(crate) fn root(fcpxml: &'a Fcpxml) -> Self {
        Self {
            fcpxml,
            id: fcpxml.document().root(),
            kind: ElementKind::Structure(StructureKind::Root),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn story_kind(&self) -> Option<StoryKind> {
        self.kind.as_story()
    }

    pub fn annotation_kind(&self) -> Option<AnnotationKind> {
        self.kind.as_annotation()
    }

    pub fn fcpxml(&self) -> &'a Fcpxml {
        self.fcpxml
    }

    pub fn node(&self) -> &'a Node {
        self.fcpxml.document().node(self.id)
    }

    pub fn tag(&self) -> &'a str {
        &self.node().tag
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.node().attribute(name)
    }

    /// Display name: `name`, falling back to `value` for annotations
    pub fn name(&self) -> Option<&'a str> {
        self.attribute("name").or_else(|| match self.kind {
            ElementKind::Annotation(_) => self.attribute("value"),
            _ => None,
        })
    }

    /// XML parent, if it is a known kind
    pub fn parent(&self) -> Option<Element<'a>> {
        let parent = self.fcpxml.document().parent(self.id)?;
        Element::new(self.fcpxml, parent)
    }

    /// Children of known kinds, in document order
    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let fcpxml = self.fcpxml;
        fcpxml
            .document()
            .children(self.id)
            .filter_map(move |child| Element::new(fcpxml, child))
    }

    /// Children of known kinds; unknown tags are reported and skipped
    pub fn children_reported(&self, diagnostics: &mut Diagnostics) -> Vec<Element<'a>> {
        let doc = self.fcpxml.document();
        let mut out = Vec::new();
        for child in doc.children(self.id) {
            match Element::new(self.fcpxml, child) {
                Some(element) => out.push(element),
                None => diagnostics.warn(
                    DiagnosticKind::StructuralParse,
                    Some(child),
                    format!("unrecognized element <{}> skipped", doc.tag(child)),
                ),
            }
        }
        out
    }

    /// Story-element children (clips, spines, sequences)
    pub fn story_children(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        self.children().filter(|child| child.story_kind().is_some())
    }

    pub fn annotation_children(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        self.children().filter(|child| child.annotation_kind().is_some())
    }

    // ------------------------------------------------------------------
    // Timing attributes
    // ------------------------------------------------------------------

    /// Decode a time attribute
    pub fn time_attribute(&self, name: &str) -> Result<Option<Fraction>, TimeError> {
        self.attribute(name).map(parse_time).transpose()
    }

    /// Decode a time attribute, reporting an undecodable value as absent
    pub fn time_attribute_reported(&self, name: &str, diagnostics: &mut Diagnostics) -> Option<Fraction> {
        match self.time_attribute(name) {
            Ok(value) => value,
            Err(e) => {
                diagnostics.warn(
                    DiagnosticKind::AttributeDecode,
                    Some(self.id),
                    format!("<{}> {}: {}", self.tag(), name, e),
                );
                None
            }
        }
    }

    /// Name of the attribute holding this kind's local timeline start
    fn start_attribute_name(&self) -> Option<&'static str> {
        match self.kind {
            ElementKind::Story(StoryKind::Sequence) | ElementKind::Story(StoryKind::Multicam) => {
                Some("tcStart")
            }
            kind if kind.start().is_present() => Some("start"),
            _ => None,
        }
    }

    /// `start` (`tcStart` for sequences and multicams), `None` when absent
    pub fn start(&self, diagnostics: &mut Diagnostics) -> Option<Fraction> {
        let name = self.start_attribute_name()?;
        self.time_attribute_reported(name, diagnostics)
    }

    pub fn duration(&self, diagnostics: &mut Diagnostics) -> Option<Fraction> {
        if !self.kind.duration().is_present() {
            return None;
        }
        self.time_attribute_reported("duration", diagnostics)
    }

    pub fn offset(&self, diagnostics: &mut Diagnostics) -> Option<Fraction> {
        if !self.kind.has_offset() {
            return None;
        }
        self.time_attribute_reported("offset", diagnostics)
    }

    /// Anchor lane; 0 (contained) when absent or not applicable
    pub fn lane(&self) -> i32 {
        if !self.kind.has_lane() {
            return 0;
        }
        self.attribute("lane")
            .and_then(|lane| lane.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn lane_reported(&self, diagnostics: &mut Diagnostics) -> i32 {
        if let Some(raw) = self.attribute("lane") {
            if raw.trim().parse::<i32>().is_err() {
                diagnostics.warn(
                    DiagnosticKind::AttributeDecode,
                    Some(self.id),
                    format!("<{}> lane {:?} is not an integer; using 0", self.tag(), raw),
                );
            }
        }
        self.lane()
    }

    pub fn tc_format(&self) -> Option<TimecodeFormat> {
        match self.attribute("tcFormat")? {
            "DF" => Some(TimecodeFormat::DropFrame),
            "NDF" => Some(TimecodeFormat::NonDropFrame),
            _ => None,
        }
    }

    /// `enabled="0"` disables a clip; everything else is enabled
    pub fn is_enabled(&self) -> bool {
        self.attribute("enabled") != Some("0")
    }

    // ------------------------------------------------------------------
    // References and metadata
    // ------------------------------------------------------------------

    /// Resource id this element references (`ref`)
    pub fn ref_id(&self) -> Option<&'a str> {
        self.attribute("ref")
    }

    pub fn format_id(&self) -> Option<&'a str> {
        self.attribute("format")
    }

    /// Referenced resource, reporting a dangling reference
    pub fn referenced_resource(&self, diagnostics: &mut Diagnostics) -> Option<&'a ResourceDescriptor> {
        let id = self.ref_id()?;
        self.fcpxml.resources().resolve(id, self.id, diagnostics)
    }

    /// `modDate` on events, projects and libraries
    pub fn mod_date(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_str(self.attribute("modDate")?, "%Y-%m-%d %H:%M:%S %z").ok()
    }

    /// Nearest XML ancestor of the given kind
    pub fn xml_ancestor_of_kind(&self, kind: ElementKind) -> Option<Element<'a>> {
        let doc = self.fcpxml.document();
        doc.xml_ancestors(self.id)
            .filter_map(|id| Element::new(self.fcpxml, id))
            .find(|element| element.kind == kind)
    }
}

impl fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("name", &self.name())
            .finish()
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.fcpxml, other.fcpxml) && self.id == other.id
    }
}
