//! DAW/NLE interchange library
//!
//! Models Final Cut Pro's FCPXML interchange documents and extracts their
//! markers into a shared representation that other DAW format adapters consume.

pub mod diagnostics;
pub mod fcpxml;
pub mod interchange;
pub mod time;

// Re-export commonly used types
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSeverity, Diagnostics};
pub use fcpxml::{
    AncestorChain, Annotation, DocumentError, Element, ElementKind, ExtractedAnnotation, ExtractionResult,
    ExtractionSettings, Fcpxml, NodeId, Occlusion,
};
pub use interchange::{DawMarker, DawMarkerKind, InterchangeError, MarkerTime, MarkerTimeStyle};
pub use time::{FrameRate, Fraction, SubFramesBase, Timecode};
