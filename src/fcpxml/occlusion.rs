//! Occlusion: how much of an element's range survives its containers
//!
//! Containers crop their contents. Walking outward from the element, each
//! ancestor's absolute range either contains the working range, overlaps it
//! (the working range narrows to the overlap) or misses it entirely, at which
//! point nothing further out can make it visible again.

use super::ancestors::AncestorChain;
use super::element::Element;
use super::kinds::{ElementKind, StoryKind};
use super::timing::{absolute_start, element_duration};
use crate::diagnostics::Diagnostics;
use crate::time::{rounded, Fraction};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Occlusion {
    NotOccluded,
    PartiallyOccluded,
    FullyOccluded,
}

impl Occlusion {
    pub const ALL: [Occlusion; 3] = [
        Occlusion::NotOccluded,
        Occlusion::PartiallyOccluded,
        Occlusion::FullyOccluded,
    ];

    pub fn is_visible(self) -> bool {
        !matches!(self, Occlusion::FullyOccluded)
    }
}

/// Classify `[start, end)` against a container `[container_start, container_end)`.
///
/// Bounds are compared after rounding to 8 decimal places. A range that
/// starts exactly at the container's end is fully occluded, so zero-length
/// annotations at the trailing edge are never reported as visible.
pub fn classify_range(range: (Fraction, Fraction), container: (Fraction, Fraction)) -> Occlusion {
    let (start, end) = (rounded(range.0), rounded(range.1));
    let (container_start, container_end) = (rounded(container.0), rounded(container.1));

    let ends_at_container_start = end == container_start && end > start;
    if start >= container_end || end < container_start || ends_at_container_start {
        return Occlusion::FullyOccluded;
    }
    if start >= container_start && end <= container_end {
        return Occlusion::NotOccluded;
    }
    Occlusion::PartiallyOccluded
}

fn intersection(range: (Fraction, Fraction), container: (Fraction, Fraction)) -> (Fraction, Fraction) {
    (range.0.max(container.0), range.1.min(container.1))
}

/// Whether an ancestor of this kind crops what it contains
fn crops(kind: ElementKind) -> bool {
    match kind {
        ElementKind::Story(StoryKind::Spine) | ElementKind::Story(StoryKind::McAngle) => false,
        ElementKind::Story(_) => true,
        ElementKind::Annotation(_) => true,
        ElementKind::Structure(_) | ElementKind::Resource(_) | ElementKind::Auxiliary(_) => false,
    }
}

/// Occlusion of `element` against its ancestors, nearest first.
///
/// An ancestor only constrains when the link entering it is on lane 0: an
/// anchored element (or an anchored storyline holding it) is composited on its
/// own lane and is not cropped by the clip it is attached to.
pub fn occlusion(element: Element, chain: &AncestorChain, diagnostics: &mut Diagnostics) -> Occlusion {
    let Some(mut working) = absolute_range(element, chain, diagnostics) else {
        return Occlusion::NotOccluded;
    };
    let mut result = Occlusion::NotOccluded;
    let mut entering_lane = element.lane();

    for (ancestor, ancestor_chain) in chain.with_tails(element.fcpxml()) {
        let constrains = entering_lane == 0 && crops(ancestor.kind());
        entering_lane = ancestor.lane();
        if !constrains {
            continue;
        }

        // Containers without a duration (e.g. a sequence without one) do not crop
        if element_duration(ancestor, diagnostics).is_none() {
            continue;
        }
        let Some(container) = absolute_range(ancestor, &ancestor_chain, diagnostics) else {
            continue;
        };

        match classify_range(working, container) {
            Occlusion::NotOccluded => {}
            Occlusion::PartiallyOccluded => {
                working = intersection(working, container);
                result = Occlusion::PartiallyOccluded;
            }
            Occlusion::FullyOccluded => return Occlusion::FullyOccluded,
        }
    }

    result
}

/// `[start, end)` on the absolute timeline; zero-length without a duration
fn absolute_range(
    element: Element,
    chain: &AncestorChain,
    diagnostics: &mut Diagnostics,
) -> Option<(Fraction, Fraction)> {
    let start = absolute_start(element, chain, diagnostics)?;
    let end = element_duration(element, diagnostics).map_or(start, |duration| start + duration);
    Some((start, end))
}
