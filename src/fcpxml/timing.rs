//! Ancestor-aware timing resolution
//!
//! Every timed element maps its children from its own local timeline onto
//! the absolute timeline. The origin of a local timeline is the element's
//! `start` (source in-point) or, for sequences and multicams, `tcStart`. A
//! child sits at `position` within that timeline, where position is the
//! child's `offset` (clips, captions), `start` (markers, keywords) or
//! `tcStart` (a sequence nested in a resource):
//!
//! ```text
//! absolute(child) = absolute(parent) + position(child) - local_start(parent)
//! ```
//!
//! Spines and multicam angles are transparent: they share their owner's
//! absolute start and local timeline, shifted by their own `offset` when
//! anchored. Resource jumps need no special casing here because the jump link
//! designates the referencing clip, whose local timeline is exactly what the
//! resource's sequence is laid out on.

use super::ancestors::AncestorChain;
use super::element::{Element, TimecodeFormat};
use super::kinds::{AnnotationKind, ElementKind, KindCapabilities, StoryKind};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::time::{is_negative, zero, FrameRate, Fraction, SubFramesBase, Timecode, TimecodeError};
use serde::{Deserialize, Serialize};

/// Where an element's effective frame rate came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameRateSource {
    /// `format` resource with this id
    Format(String),
    /// No rate was discoverable; the configured default was used
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTiming {
    /// Position within the parent's local timeline, as written
    pub position: Option<Fraction>,
    /// Origin of this element's own local timeline
    pub local_start: Fraction,
    pub absolute_start: Fraction,
    pub duration: Option<Fraction>,
    pub frame_rate: FrameRate,
    pub frame_rate_source: FrameRateSource,
}

impl ResolvedTiming {
    pub fn absolute_end(&self) -> Option<Fraction> {
        self.duration.map(|duration| self.absolute_start + duration)
    }

    /// `[start, end)`; zero-length when the element has no duration
    pub fn absolute_range(&self) -> (Fraction, Fraction) {
        (
            self.absolute_start,
            self.absolute_end().unwrap_or(self.absolute_start),
        )
    }

    pub fn timecode(&self, subframes_base: SubFramesBase) -> Result<Timecode, TimecodeError> {
        Timecode::from_seconds(self.absolute_start, self.frame_rate, subframes_base)
    }
}

/// Absolute placement of one element while walking down a chain
#[derive(Debug, Clone, Copy)]
struct Placement {
    absolute: Fraction,
    local_start: Fraction,
    position: Option<Fraction>,
}

/// Resolve timing with the crate's default frame rate (30 fps) as fallback
pub fn resolve_timing(
    element: Element,
    chain: &AncestorChain,
    diagnostics: &mut Diagnostics,
) -> Option<ResolvedTiming> {
    resolve_timing_with(element, chain, FrameRate::default(), diagnostics)
}

/// Resolve absolute start, duration and frame rate of `element`.
///
/// Returns `None` only for elements that never sit on a timeline (events,
/// resources, auxiliary children).
pub fn resolve_timing_with(
    element: Element,
    chain: &AncestorChain,
    default_rate: FrameRate,
    diagnostics: &mut Diagnostics,
) -> Option<ResolvedTiming> {
    if !element.kind().is_timed() {
        return None;
    }

    let placement = place_along(element, chain, diagnostics)?;
    let duration = element_duration(element, diagnostics);
    let (frame_rate, frame_rate_source) = resolve_frame_rate(element, chain, default_rate, diagnostics);

    Some(ResolvedTiming {
        position: placement.position,
        local_start: placement.local_start,
        absolute_start: placement.absolute,
        duration,
        frame_rate,
        frame_rate_source,
    })
}

/// Absolute start only
pub fn absolute_start(element: Element, chain: &AncestorChain, diagnostics: &mut Diagnostics) -> Option<Fraction> {
    if !element.kind().is_timed() {
        return None;
    }
    place_along(element, chain, diagnostics).map(|placement| placement.absolute)
}

/// Walk the chain furthest → nearest, then place the element itself
fn place_along(element: Element, chain: &AncestorChain, diagnostics: &mut Diagnostics) -> Option<Placement> {
    let ancestors: Vec<Element> = chain.elements(element.fcpxml()).collect();
    let mut parent: Option<Placement> = None;
    for ancestor in ancestors.iter().rev() {
        parent = place(*ancestor, parent, diagnostics);
    }
    place(element, parent, diagnostics)
}

/// Place one element on the absolute timeline given its parent's placement
fn place(element: Element, parent: Option<Placement>, diagnostics: &mut Diagnostics) -> Option<Placement> {
    let map = |position: Fraction| match parent {
        Some(p) => p.absolute + position - p.local_start,
        None => position,
    };
    let parent_local = parent.map(|p| p.local_start).unwrap_or_else(zero);

    match element.kind() {
        ElementKind::Structure(_) | ElementKind::Resource(_) | ElementKind::Auxiliary(_) => None,

        ElementKind::Story(StoryKind::Sequence) | ElementKind::Story(StoryKind::Multicam) => {
            let tc_start = element.start(diagnostics).unwrap_or_else(zero);
            Some(Placement {
                absolute: map(tc_start),
                local_start: tc_start,
                position: Some(tc_start),
            })
        }

        // Transparent containers share their owner's timeline
        ElementKind::Story(StoryKind::Spine)
        | ElementKind::Story(StoryKind::McAngle)
        | ElementKind::Story(StoryKind::Audition)
        | ElementKind::Story(StoryKind::Transition) => {
            check_lane_offset(element, diagnostics);
            let offset = element.offset(diagnostics);
            let local_start = offset.unwrap_or(parent_local);
            Some(Placement {
                absolute: map(local_start),
                local_start,
                position: offset,
            })
        }

        ElementKind::Story(_) | ElementKind::Annotation(AnnotationKind::Caption) => {
            check_lane_offset(element, diagnostics);
            let offset = element.offset(diagnostics);
            Some(Placement {
                absolute: map(offset.unwrap_or(parent_local)),
                local_start: element.start(diagnostics).unwrap_or_else(zero),
                position: offset,
            })
        }

        ElementKind::Annotation(_) => {
            let start = element.start(diagnostics);
            if start.is_none() {
                diagnostics.warn(
                    DiagnosticKind::AttributeDecode,
                    Some(element.id()),
                    format!("<{}> has no start; placing it at its parent's start", element.tag()),
                );
            }
            let position = start.unwrap_or(parent_local);
            Some(Placement {
                absolute: map(position),
                local_start: position,
                position: start,
            })
        }
    }
}

fn check_lane_offset(element: Element, diagnostics: &mut Diagnostics) {
    if element.lane_reported(diagnostics) != 0 && element.attribute("offset").is_none() {
        diagnostics.warn(
            DiagnosticKind::AttributeDecode,
            Some(element.id()),
            format!("<{}> is anchored on lane {} without an offset", element.tag(), element.lane()),
        );
    }
}

/// Duration of an element; an audition lasts as long as its active pick
pub fn element_duration(element: Element, diagnostics: &mut Diagnostics) -> Option<Fraction> {
    let duration = match element.story_kind() {
        Some(StoryKind::Audition) => element
            .story_children()
            .next()
            .and_then(|active| active.duration(diagnostics)),
        _ => {
            let duration = element.duration(diagnostics);
            if duration.is_none() && element.kind().duration() == super::kinds::Presence::Required {
                diagnostics.warn(
                    DiagnosticKind::AttributeDecode,
                    Some(element.id()),
                    format!("<{}> is missing its required duration", element.tag()),
                );
            }
            duration
        }
    };

    if let Some(value) = duration {
        if is_negative(value) {
            diagnostics.warn(
                DiagnosticKind::Range,
                Some(element.id()),
                format!("<{}> has negative duration {}", element.tag(), crate::time::format_time(value)),
            );
        }
    }
    duration
}

/// Effective frame rate: nearest element in `[element] + chain` whose format
/// (own `format`, or the format of its referenced asset or media) defines a
/// frame duration. Drop frame follows the nearest `tcFormat`.
pub fn resolve_frame_rate(
    element: Element,
    chain: &AncestorChain,
    default_rate: FrameRate,
    diagnostics: &mut Diagnostics,
) -> (FrameRate, FrameRateSource) {
    let fcpxml = element.fcpxml();
    let candidates: Vec<Element> = std::iter::once(element).chain(chain.elements(fcpxml)).collect();

    let drop = candidates
        .iter()
        .find_map(|candidate| candidate.tc_format())
        .map(|format| format == TimecodeFormat::DropFrame)
        .unwrap_or(false);

    for candidate in &candidates {
        let reference = candidate.format_id().or_else(|| match candidate.kind() {
            ElementKind::Story(_) => candidate.ref_id(),
            _ => None,
        });
        let Some(reference) = reference else {
            continue;
        };
        let Some(format) = fcpxml.resources().format_for(reference, candidate.id(), diagnostics) else {
            continue;
        };
        let Some(frame_duration) = format.frame_duration else {
            continue;
        };
        match FrameRate::from_frame_duration(frame_duration, drop) {
            Some(rate) => return (rate, FrameRateSource::Format(format.id.clone())),
            None => diagnostics.warn(
                DiagnosticKind::AttributeDecode,
                Some(format.node),
                format!(
                    "format {} frame duration {} is not a supported video rate",
                    format.id,
                    crate::time::format_time(frame_duration)
                ),
            ),
        }
    }

    diagnostics.warn(
        DiagnosticKind::ResourceResolution,
        Some(element.id()),
        format!("no frame rate found for <{}>; using {}", element.tag(), default_rate),
    );
    (default_rate, FrameRateSource::Default)
}
