//! Annotation extraction
//!
//! Depth-first walk from any element that collects markers, keywords and
//! captions together with everything a consumer needs to place them: absolute
//! start, timecode, occlusion, inherited roles and the enclosing event and
//! project. The walk follows `ref-clip` and `mc-clip` references into their
//! media timelines through resource-jump links.

pub mod settings;

pub use settings::{AuditionMask, ExtractionSettings, McClipAngleMask};

use super::ancestors::AncestorChain;
use super::annotations::Annotation;
use super::document::NodeId;
use super::element::Element;
use super::kinds::{AuxiliaryKind, ElementKind, StoryKind, StructureKind};
use super::occlusion::{occlusion, Occlusion};
use super::roles::{resolve_roles, ElementRoles};
use super::timing::{resolve_timing_with, FrameRateSource};
use super::Fcpxml;
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::time::{FrameRate, Fraction, Timecode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAnnotation {
    pub node: NodeId,
    pub annotation: Annotation,
    pub absolute_start: Fraction,
    pub duration: Option<Fraction>,
    /// `None` when the start cannot be expressed as a timecode (negative)
    pub timecode: Option<Timecode>,
    pub frame_rate: FrameRate,
    pub frame_rate_source: FrameRateSource,
    pub occlusion: Occlusion,
    pub roles: ElementRoles,
    pub event_name: Option<String>,
    pub project_name: Option<String>,
    /// Nearest named clip containing the annotation
    pub parent_name: Option<String>,
    pub path: AncestorChain,
}

impl ExtractedAnnotation {
    pub fn name(&self) -> String {
        self.annotation.name()
    }

    pub fn absolute_end(&self) -> Option<Fraction> {
        self.duration.map(|duration| self.absolute_start + duration)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub annotations: Vec<ExtractedAnnotation>,
    pub diagnostics: Diagnostics,
}

impl ExtractionResult {
    /// Stable sort by absolute start; document order breaks ties
    pub fn sort_by_start(&mut self) {
        self.annotations.sort_by(|a, b| a.absolute_start.cmp(&b.absolute_start));
    }

    pub fn names(&self) -> Vec<String> {
        self.annotations.iter().map(ExtractedAnnotation::name).collect()
    }
}

/// Extract annotations at or below `from`
pub fn extract(fcpxml: &Fcpxml, from: NodeId, settings: &ExtractionSettings) -> ExtractionResult {
    let mut walker = Walker {
        fcpxml,
        settings,
        diagnostics: Diagnostics::new(),
        annotations: Vec::new(),
        open_resources: Vec::new(),
    };

    match Element::new(fcpxml, from) {
        Some(element) => {
            let chain = AncestorChain::from_xml(fcpxml, from);
            walker.visit(element, &chain);
        }
        None => {
            let tag = fcpxml.document().get(from).map_or("?", |node| node.tag.as_str());
            walker.diagnostics.warn(
                DiagnosticKind::StructuralParse,
                Some(from),
                format!("cannot extract from unrecognized element <{}>", tag),
            );
        }
    }

    log::debug!(
        "extracted {} annotations ({} diagnostics)",
        walker.annotations.len(),
        walker.diagnostics.len()
    );
    ExtractionResult {
        annotations: walker.annotations,
        diagnostics: walker.diagnostics,
    }
}

struct Walker<'a, 's> {
    fcpxml: &'a Fcpxml,
    settings: &'s ExtractionSettings,
    diagnostics: Diagnostics,
    annotations: Vec<ExtractedAnnotation>,
    /// Resource ids currently being walked through, innermost last
    open_resources: Vec<String>,
}

impl<'a> Walker<'a, '_> {
    fn visit(&mut self, element: Element<'a>, chain: &AncestorChain) {
        match element.kind() {
            ElementKind::Structure(
                StructureKind::Root | StructureKind::Library | StructureKind::Event | StructureKind::Project,
            ) => self.visit_children(element, chain),
            // Resource timelines are reached through the clips that reference them
            ElementKind::Structure(_) | ElementKind::Resource(_) | ElementKind::Auxiliary(_) => {}
            ElementKind::Annotation(_) => self.emit(element, chain),
            ElementKind::Story(kind) => self.visit_story(element, kind, chain),
        }
    }

    fn visit_children(&mut self, element: Element<'a>, chain: &AncestorChain) {
        let child_chain = chain.child_chain(element.id());
        for child in element.children_reported(&mut self.diagnostics) {
            self.visit(child, &child_chain);
        }
    }

    fn enters(&self, element: Element<'a>, kind: StoryKind) -> bool {
        if self.settings.excludes(kind) {
            return false;
        }
        element.is_enabled() || self.settings.include_disabled
    }

    fn visit_story(&mut self, element: Element<'a>, kind: StoryKind, chain: &AncestorChain) {
        if !self.enters(element, kind) {
            return;
        }

        let child_chain = chain.child_chain(element.id());
        let mut picks = 0;
        for child in element.children_reported(&mut self.diagnostics) {
            if kind == StoryKind::Audition && child.story_kind().is_some() {
                picks += 1;
                if picks > 1 && self.settings.audition_mask == AuditionMask::ActiveOnly {
                    continue;
                }
            }
            self.visit(child, &child_chain);
        }

        if kind.jumps_into_resource() {
            self.visit_referenced_timeline(element, chain);
        }
    }

    fn visit_referenced_timeline(&mut self, referrer: Element<'a>, chain: &AncestorChain) {
        let Some(resource) = referrer.referenced_resource(&mut self.diagnostics) else {
            return;
        };
        let Some(timeline) = resource.timeline.and_then(|id| Element::new(self.fcpxml, id)) else {
            self.diagnostics.warn(
                DiagnosticKind::ResourceResolution,
                Some(referrer.id()),
                format!("resource {} has no sequence or multicam to descend into", resource.id),
            );
            return;
        };
        if self.open_resources.contains(&resource.id) {
            self.diagnostics.warn(
                DiagnosticKind::StructuralParse,
                Some(referrer.id()),
                format!("resource {} references itself; not descending again", resource.id),
            );
            return;
        }

        let jump_chain = chain.jump_chain(&resource.id, referrer.id());
        self.open_resources.push(resource.id.clone());
        match timeline.story_kind() {
            Some(StoryKind::Multicam) => {
                let angles = self.active_angles(referrer);
                self.visit_multicam(timeline, &jump_chain, angles.as_deref());
            }
            _ => self.visit(timeline, &jump_chain),
        }
        self.open_resources.pop();
    }

    /// Angle ids an `mc-clip` shows, or `None` for every angle
    fn active_angles(&self, mc_clip: Element<'a>) -> Option<Vec<String>> {
        if self.settings.mc_clip_angle_mask == McClipAngleMask::All
            || mc_clip.story_kind() != Some(StoryKind::McClip)
        {
            return None;
        }
        Some(
            mc_clip
                .children()
                .filter(|child| child.kind() == ElementKind::Auxiliary(AuxiliaryKind::McSource))
                .filter(|source| source.attribute("srcEnable") != Some("none"))
                .filter_map(|source| source.attribute("angleID").map(str::to_string))
                .collect(),
        )
    }

    /// Like `visit_story`, restricted to the selected angles. An `mc-clip`
    /// without `mc-source` children shows the first angle.
    fn visit_multicam(&mut self, multicam: Element<'a>, chain: &AncestorChain, angles: Option<&[String]>) {
        if !self.enters(multicam, StoryKind::Multicam) {
            return;
        }

        let child_chain = chain.child_chain(multicam.id());
        let mut angle_index = 0;
        for child in multicam.children_reported(&mut self.diagnostics) {
            if child.story_kind() == Some(StoryKind::McAngle) {
                let selected = match angles {
                    None => true,
                    Some([]) => angle_index == 0,
                    Some(ids) => child
                        .attribute("angleID")
                        .map_or(false, |id| ids.iter().any(|wanted| wanted == id)),
                };
                angle_index += 1;
                if !selected {
                    continue;
                }
            }
            self.visit(child, &child_chain);
        }
    }

    fn emit(&mut self, element: Element<'a>, chain: &AncestorChain) {
        let diagnostics = &mut self.diagnostics;
        let Some(annotation) = Annotation::from_element(element, diagnostics) else {
            return;
        };
        if !self.settings.wants(annotation.annotation_type()) {
            return;
        }
        let Some(timing) = resolve_timing_with(element, chain, self.settings.default_frame_rate, diagnostics) else {
            return;
        };
        let occlusion = occlusion(element, chain, diagnostics);
        if !self.settings.keeps(occlusion) {
            return;
        }

        let timecode = match timing.timecode(self.settings.subframes_base) {
            Ok(timecode) => Some(timecode),
            Err(e) => {
                diagnostics.warn(
                    DiagnosticKind::Range,
                    Some(element.id()),
                    format!("<{}> cannot be expressed as timecode: {}", element.tag(), e),
                );
                None
            }
        };
        let roles = resolve_roles(element, chain, &self.settings.global_roles, diagnostics);

        let fcpxml = self.fcpxml;
        let name_of = |kind: StructureKind| {
            chain
                .elements(fcpxml)
                .find(|ancestor| ancestor.kind() == ElementKind::Structure(kind))
                .and_then(|ancestor| ancestor.name())
                .map(str::to_string)
        };
        let parent_name = chain
            .elements(fcpxml)
            .filter(|ancestor| ancestor.story_kind().map_or(false, StoryKind::is_clip))
            .find_map(|ancestor| ancestor.name())
            .map(str::to_string);

        self.annotations.push(ExtractedAnnotation {
            node: element.id(),
            duration: annotation.duration(),
            annotation,
            absolute_start: timing.absolute_start,
            timecode,
            frame_rate: timing.frame_rate,
            frame_rate_source: timing.frame_rate_source,
            occlusion,
            roles,
            event_name: name_of(StructureKind::Event),
            project_name: name_of(StructureKind::Project),
            parent_name,
            path: chain.clone(),
        });
    }
}
