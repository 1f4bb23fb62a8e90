//! Resource table: id → descriptor lookup for `<resources>` children
//!
//! Clips reference shared media through resource ids (`ref="r2"`,
//! `format="r1"`). The table is built once when the document is parsed and is
//! read-only afterwards.

use super::document::{Document, NodeId};
use super::kinds::{classify, ElementKind, ResourceKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::time::{parse_time, Fraction};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ResourceDescriptor {
    pub id: String,
    pub kind: ResourceKind,
    pub node: NodeId,
    pub name: Option<String>,
    /// `format` attribute of an asset, or of a media's inner sequence/multicam
    pub format: Option<String>,
    /// `frameDuration` of a format resource; absent for rate-less formats
    pub frame_duration: Option<Fraction>,
    pub has_video: bool,
    pub has_audio: bool,
    /// Root of a media resource's internal timeline (`sequence` or `multicam`)
    pub timeline: Option<NodeId>,
}

impl ResourceDescriptor {
    fn from_node(doc: &Document, node: NodeId, kind: ResourceKind, id: String, diagnostics: &mut Diagnostics) -> Self {
        let attr = |name: &str| doc.attribute(node, name).map(str::to_string);

        let timeline = match kind {
            ResourceKind::Media => doc
                .children(node)
                .find(|child| matches!(doc.tag(*child), "sequence" | "multicam")),
            _ => None,
        };

        let format = match kind {
            ResourceKind::Asset => attr("format"),
            ResourceKind::Media => timeline.and_then(|t| doc.attribute(t, "format").map(str::to_string)),
            _ => None,
        };

        let frame_duration = match (kind, doc.attribute(node, "frameDuration")) {
            (ResourceKind::Format, Some(raw)) => match parse_time(raw) {
                Ok(duration) => Some(duration),
                Err(e) => {
                    diagnostics.warn(
                        DiagnosticKind::AttributeDecode,
                        Some(node),
                        format!("format {}: {}", id, e),
                    );
                    None
                }
            },
            _ => None,
        };

        Self {
            kind,
            node,
            name: attr("name"),
            format,
            frame_duration,
            has_video: doc.attribute(node, "hasVideo") == Some("1"),
            has_audio: doc.attribute(node, "hasAudio") == Some("1"),
            timeline,
            id,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResourceTable {
    by_id: HashMap<String, ResourceDescriptor>,
}

impl ResourceTable {
    /// Collect every resource under the root's `<resources>` element(s)
    pub fn build(doc: &Document, diagnostics: &mut Diagnostics) -> Self {
        let mut by_id = HashMap::new();

        for container in doc.children_named(doc.root(), "resources") {
            for node in doc.children(container) {
                let kind = match classify(doc.tag(node)) {
                    Some(ElementKind::Resource(kind)) => kind,
                    _ => {
                        diagnostics.warn(
                            DiagnosticKind::StructuralParse,
                            Some(node),
                            format!("unrecognized resource <{}> skipped", doc.tag(node)),
                        );
                        continue;
                    }
                };

                let Some(id) = doc.attribute(node, "id") else {
                    diagnostics.warn(
                        DiagnosticKind::AttributeDecode,
                        Some(node),
                        format!("<{}> resource without id skipped", doc.tag(node)),
                    );
                    continue;
                };

                if by_id.contains_key(id) {
                    diagnostics.warn(
                        DiagnosticKind::StructuralParse,
                        Some(node),
                        format!("duplicate resource id {}; keeping the first", id),
                    );
                    continue;
                }

                let descriptor = ResourceDescriptor::from_node(doc, node, kind, id.to_string(), diagnostics);
                by_id.insert(id.to_string(), descriptor);
            }
        }

        log::debug!("resource table built with {} entries", by_id.len());
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&ResourceDescriptor> {
        self.by_id.get(id)
    }

    /// Look up an id, reporting a resolution failure when it is absent
    pub fn resolve(
        &self,
        id: &str,
        referrer: NodeId,
        diagnostics: &mut Diagnostics,
    ) -> Option<&ResourceDescriptor> {
        let found = self.by_id.get(id);
        if found.is_none() {
            diagnostics.warn(
                DiagnosticKind::ResourceResolution,
                Some(referrer),
                format!("resource {} not found", id),
            );
        }
        found
    }

    /// Format resource that defines the video format of `id`
    ///
    /// A format resolves to itself; an asset or media resolves through its
    /// `format` attribute.
    pub fn format_for(
        &self,
        id: &str,
        referrer: NodeId,
        diagnostics: &mut Diagnostics,
    ) -> Option<&ResourceDescriptor> {
        let descriptor = self.resolve(id, referrer, diagnostics)?;
        match descriptor.kind {
            ResourceKind::Format => Some(descriptor),
            ResourceKind::Asset | ResourceKind::Media => {
                let format_id = descriptor.format.as_deref()?;
                let format = self.resolve(format_id, descriptor.node, diagnostics)?;
                (format.kind == ResourceKind::Format).then_some(format)
            }
            ResourceKind::Effect | ResourceKind::Locator | ResourceKind::ObjectTracker => None,
        }
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.by_id.values()
    }
}
