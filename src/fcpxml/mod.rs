//! FCPXML semantic model
//!
//! [`Fcpxml::parse`] copies the XML into an owned arena, builds the resource
//! table and checks the format version. Everything afterwards (timing, roles,
//! occlusion, extraction) is a pure query over that immutable state plus an
//! ancestor chain.

pub mod ancestors;
pub mod annotations;
pub mod document;
pub mod element;
pub mod errors;
pub mod extraction;
pub mod kinds;
pub mod occlusion;
pub mod resources;
pub mod roles;
pub mod timing;
pub mod version;

pub use ancestors::{AncestorChain, AncestorLink};
pub use annotations::{Annotation, AnnotationType, Caption, Keyword, Marker, MarkerKind};
pub use document::{Document, NodeId};
pub use element::{Element, TimecodeFormat};
pub use errors::DocumentError;
pub use extraction::{
    AuditionMask, ExtractedAnnotation, ExtractionResult, ExtractionSettings, McClipAngleMask,
};
pub use kinds::{
    classify, AnnotationKind, AuxiliaryKind, ElementKind, KindCapabilities, Presence, ResourceKind,
    StoryKind, StructureKind,
};
pub use occlusion::Occlusion;
pub use resources::{ResourceDescriptor, ResourceTable};
pub use roles::{ElementRoles, InterpolatedRole, Role, RoleType};
pub use timing::{FrameRateSource, ResolvedTiming};
pub use version::Version;

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::time::{zero, Fraction};

/// A parsed FCPXML document
#[derive(Debug, Clone)]
pub struct Fcpxml {
    document: Document,
    resources: ResourceTable,
    version: Option<Version>,
    diagnostics: Diagnostics,
}

impl Fcpxml {
    /// Parse an FCPXML string.
    ///
    /// Only malformed XML and a root other than `<fcpxml>` are fatal. A missing
    /// or unsupported `version` is recorded in [`Fcpxml::parse_diagnostics`].
    pub fn parse(xml: &str) -> Result<Self, DocumentError> {
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let dom = roxmltree::Document::parse_with_options(xml, options)?;

        let root_tag = dom.root_element().tag_name().name();
        if root_tag != "fcpxml" {
            return Err(DocumentError::UnexpectedRoot(root_tag.to_string()));
        }

        let document = Document::from_xml(&dom);
        let mut diagnostics = Diagnostics::new();
        let version = read_version(&document, &mut diagnostics);
        let resources = ResourceTable::build(&document, &mut diagnostics);

        log::debug!(
            "parsed FCPXML {} ({} nodes, {} resources)",
            version.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string()),
            document.len(),
            resources.len()
        );

        Ok(Self {
            document,
            resources,
            version,
            diagnostics,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn resources(&self) -> &ResourceTable {
        &self.resources
    }

    pub fn version(&self) -> Option<Version> {
        self.version
    }

    /// Diagnostics recorded while parsing (version, resource table)
    pub fn parse_diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn root(&self) -> Element<'_> {
        Element::root(self)
    }

    pub fn element(&self, id: NodeId) -> Option<Element<'_>> {
        Element::new(self, id)
    }

    /// Every recognized element in document order, root first
    pub fn elements(&self) -> impl Iterator<Item = Element<'_>> {
        let root = self.document.root();
        std::iter::once(root)
            .chain(self.document.descendants(root))
            .filter_map(move |id| Element::new(self, id))
    }

    pub fn find_first(&self, predicate: impl Fn(&Element) -> bool) -> Option<Element<'_>> {
        self.elements().find(|element| predicate(element))
    }

    pub fn find_all(&self, predicate: impl Fn(&Element) -> bool) -> Vec<Element<'_>> {
        self.elements().filter(|element| predicate(element)).collect()
    }

    pub fn events(&self) -> Vec<Element<'_>> {
        self.find_all(|e| e.kind() == ElementKind::Structure(StructureKind::Event))
    }

    pub fn projects(&self) -> Vec<Element<'_>> {
        self.find_all(|e| e.kind() == ElementKind::Structure(StructureKind::Project))
    }

    /// The sequence a project wraps
    pub fn project_sequence<'a>(&'a self, project: Element<'a>) -> Option<Element<'a>> {
        project
            .story_children()
            .find(|child| child.story_kind() == Some(StoryKind::Sequence))
    }

    /// `tcStart` of a project's sequence; zero when absent
    pub fn timeline_start(&self, project: Element, diagnostics: &mut Diagnostics) -> Fraction {
        self.project_sequence(project)
            .and_then(|sequence| sequence.start(diagnostics))
            .unwrap_or_else(zero)
    }

    /// Extract annotations from the whole document
    pub fn extract_annotations(&self, settings: &ExtractionSettings) -> ExtractionResult {
        self.extract_from(self.document.root(), settings)
    }

    /// Extract annotations at or below `id`
    pub fn extract_from(&self, id: NodeId, settings: &ExtractionSettings) -> ExtractionResult {
        extraction::extract(self, id, settings)
    }
}

fn read_version(document: &Document, diagnostics: &mut Diagnostics) -> Option<Version> {
    let root = document.root();
    let Some(raw) = document.attribute(root, "version") else {
        diagnostics.warn(
            DiagnosticKind::AttributeDecode,
            Some(root),
            "fcpxml root has no version attribute",
        );
        return None;
    };

    match Version::parse(raw) {
        Some(version) if version.is_supported() => Some(version),
        Some(version) => {
            diagnostics.warn(
                DiagnosticKind::AttributeDecode,
                Some(root),
                format!(
                    "FCPXML version {} is outside the supported range {}..={}",
                    version,
                    Version::OLDEST_SUPPORTED,
                    Version::NEWEST_SUPPORTED
                ),
            );
            Some(version)
        }
        None => {
            diagnostics.warn(
                DiagnosticKind::AttributeDecode,
                Some(root),
                format!("unparseable FCPXML version {:?}", raw),
            );
            None
        }
    }
}
