//! Diagnostics accumulator for document resolution
//!
//! Local failures (an unknown element, a bad attribute, a dangling resource
//! reference) never abort a traversal. They degrade to a documented default and
//! are recorded here instead, so the caller receives the primary result together
//! with everything that had to be papered over to produce it.

use crate::fcpxml::document::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Severity level for a diagnostic
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

/// Category of a local failure
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Unrecognized or malformed element; the element was skipped
    StructuralParse,
    /// Required attribute missing or unparseable; a default was substituted
    AttributeDecode,
    /// Referenced resource id is absent from the resource table
    ResourceResolution,
    /// Negative or inverted time range
    Range,
}

/// A single diagnostic produced while resolving a document
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub kind: DiagnosticKind,
    /// Node the diagnostic refers to, if any
    pub node: Option<NodeId>,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        severity: DiagnosticSeverity,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            kind,
            node: None,
            message: message.into(),
        }
    }

    /// Attach the node this diagnostic refers to
    pub fn at(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }
}

/// Caller-owned collection of diagnostics, serialized as a plain list
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(from = "Vec<Diagnostic>", into = "Vec<Diagnostic>")]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
    seen: HashSet<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded diagnostics in insertion order
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Record a diagnostic and forward it to the `log` facade
    ///
    /// Resolving many elements walks the same ancestors repeatedly; an
    /// identical diagnostic is only recorded once.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        if !self.seen.insert(diagnostic.clone()) {
            return;
        }
        match diagnostic.severity {
            DiagnosticSeverity::Error | DiagnosticSeverity::Warning => {
                log::warn!("{:?}: {}", diagnostic.kind, diagnostic.message)
            }
            DiagnosticSeverity::Info => log::debug!("{:?}: {}", diagnostic.kind, diagnostic.message),
        }
        self.entries.push(diagnostic);
    }

    pub fn warn(&mut self, kind: DiagnosticKind, node: Option<NodeId>, message: impl Into<String>) {
        let mut diagnostic = Diagnostic::new(DiagnosticSeverity::Warning, kind, message);
        diagnostic.node = node;
        self.add(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.add(diagnostic);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Count diagnostics of one kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries.iter().filter(|d| d.kind == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl From<Vec<Diagnostic>> for Diagnostics {
    fn from(entries: Vec<Diagnostic>) -> Self {
        let mut diagnostics = Self::new();
        diagnostics.extend(entries);
        diagnostics
    }
}

impl From<Diagnostics> for Vec<Diagnostic> {
    fn from(diagnostics: Diagnostics) -> Self {
        diagnostics.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_creation() {
        let diagnostic = Diagnostic::new(
            DiagnosticSeverity::Warning,
            DiagnosticKind::ResourceResolution,
            "resource r9 not found",
        )
        .at(NodeId(4));

        assert_eq!(diagnostic.node, Some(NodeId(4)));
        assert_eq!(diagnostic.kind, DiagnosticKind::ResourceResolution);
        assert_eq!(diagnostic.message, "resource r9 not found");
    }

    #[test]
    fn test_diagnostics_has_errors() {
        let mut diags = Diagnostics::new();
        assert!(!diags.has_errors());

        diags.warn(DiagnosticKind::AttributeDecode, None, "bad offset");
        assert!(!diags.has_errors());
        assert_eq!(diags.count(DiagnosticKind::AttributeDecode), 1);

        diags.add(Diagnostic::new(
            DiagnosticSeverity::Error,
            DiagnosticKind::Range,
            "inverted range",
        ));
        assert!(diags.has_errors());
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_identical_diagnostics_are_recorded_once() {
        let mut diags = Diagnostics::new();
        for _ in 0..3 {
            diags.warn(DiagnosticKind::ResourceResolution, Some(NodeId(7)), "resource r9 not found");
        }
        diags.warn(DiagnosticKind::ResourceResolution, Some(NodeId(8)), "resource r9 not found");
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.entries()[1].node, Some(NodeId(8)));
    }

    #[test]
    fn test_serializes_as_a_list() {
        let mut diags = Diagnostics::new();
        diags.warn(DiagnosticKind::Range, None, "negative duration");
        let json = serde_json::to_string(&diags).unwrap();
        assert!(json.starts_with('['));

        let mut restored: Diagnostics = serde_json::from_str(&json).unwrap();
        restored.warn(DiagnosticKind::Range, None, "negative duration");
        assert_eq!(restored.len(), 1);
    }
}
