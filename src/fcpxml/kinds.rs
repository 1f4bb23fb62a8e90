//! Closed classification of FCPXML element tags
//!
//! Every tag the crate understands maps to exactly one variant of
//! [`ElementKind`], grouped by logical layer. The set is fixed per format
//! version; supporting a new tag means extending the union and every
//! exhaustive `match` over it, which the compiler enforces.

use super::roles::RoleType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Document scaffolding: containers of events, projects and resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    Root,
    Library,
    Event,
    Project,
    Resources,
    CollectionFolder,
    KeywordCollection,
    SmartCollection,
    ImportOptions,
}

/// Shared, id-referenced descriptors under `<resources>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Asset,
    Format,
    Media,
    Effect,
    Locator,
    ObjectTracker,
}

/// Timeline (story) elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoryKind {
    Sequence,
    Spine,
    AssetClip,
    Audio,
    Video,
    Audition,
    Clip,
    Gap,
    McClip,
    RefClip,
    SyncClip,
    Title,
    Transition,
    Multicam,
    McAngle,
    LiveDrawing,
}

/// Annotations attached to story elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    Marker,
    ChapterMarker,
    Keyword,
    Caption,
    Rating,
    AnalysisMarker,
}

/// Known children that carry no timeline semantics of their own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuxiliaryKind {
    MediaRep,
    AudioChannelSource,
    AudioRoleSource,
    McSource,
    Text,
    TextStyle,
    TextStyleDef,
    Metadata,
    MetadataItem,
    Note,
    ConformRate,
    TimeMap,
    TimePoint,
    Param,
    Keyframe,
    KeyframeAnimation,
    FadeIn,
    FadeOut,
    Filter,
    Adjustment,
    Bookmark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Structure(StructureKind),
    Resource(ResourceKind),
    Story(StoryKind),
    Annotation(AnnotationKind),
    Auxiliary(AuxiliaryKind),
}

/// Whether a timing attribute is part of a kind's schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Optional,
    Absent,
}

impl Presence {
    pub fn is_present(self) -> bool {
        !matches!(self, Presence::Absent)
    }
}

/// Timing and role capabilities shared by every layer of the kind union
pub trait KindCapabilities {
    /// `start` (or `tcStart` for sequences and multicams)
    fn start(&self) -> Presence;
    fn duration(&self) -> Presence;
    fn has_offset(&self) -> bool;
    fn has_lane(&self) -> bool;
    /// Role types this kind carries on itself, explicitly or by default
    fn role_types(&self) -> &'static [RoleType];
}

/// Classify a tag name; `None` for tags outside the known set
pub fn classify(tag: &str) -> Option<ElementKind> {
    use AnnotationKind as A;
    use AuxiliaryKind as X;
    use ElementKind::*;
    use ResourceKind as R;
    use StoryKind as S;
    use StructureKind as T;

    let kind = match tag {
        "fcpxml" => Structure(T::Root),
        "library" => Structure(T::Library),
        "event" => Structure(T::Event),
        "project" => Structure(T::Project),
        "resources" => Structure(T::Resources),
        "collection-folder" => Structure(T::CollectionFolder),
        "keyword-collection" => Structure(T::KeywordCollection),
        "smart-collection" => Structure(T::SmartCollection),
        "import-options" => Structure(T::ImportOptions),

        "asset" => Resource(R::Asset),
        "format" => Resource(R::Format),
        "media" => Resource(R::Media),
        "effect" => Resource(R::Effect),
        "locator" => Resource(R::Locator),
        "object-tracker" => Resource(R::ObjectTracker),

        "sequence" => Story(S::Sequence),
        "spine" => Story(S::Spine),
        "asset-clip" => Story(S::AssetClip),
        "audio" => Story(S::Audio),
        "video" => Story(S::Video),
        "audition" => Story(S::Audition),
        "clip" => Story(S::Clip),
        "gap" => Story(S::Gap),
        "mc-clip" => Story(S::McClip),
        "ref-clip" => Story(S::RefClip),
        "sync-clip" => Story(S::SyncClip),
        "title" => Story(S::Title),
        "transition" => Story(S::Transition),
        "multicam" => Story(S::Multicam),
        "mc-angle" => Story(S::McAngle),
        "live-drawing" => Story(S::LiveDrawing),

        "marker" => Annotation(A::Marker),
        "chapter-marker" => Annotation(A::ChapterMarker),
        "keyword" => Annotation(A::Keyword),
        "caption" => Annotation(A::Caption),
        "rating" => Annotation(A::Rating),
        "analysis-marker" => Annotation(A::AnalysisMarker),

        "media-rep" => Auxiliary(X::MediaRep),
        "audio-channel-source" => Auxiliary(X::AudioChannelSource),
        "audio-role-source" => Auxiliary(X::AudioRoleSource),
        "mc-source" => Auxiliary(X::McSource),
        "text" => Auxiliary(X::Text),
        "text-style" => Auxiliary(X::TextStyle),
        "text-style-def" => Auxiliary(X::TextStyleDef),
        "metadata" => Auxiliary(X::Metadata),
        "md" => Auxiliary(X::MetadataItem),
        "note" => Auxiliary(X::Note),
        "conform-rate" => Auxiliary(X::ConformRate),
        "timeMap" => Auxiliary(X::TimeMap),
        "timept" => Auxiliary(X::TimePoint),
        "param" => Auxiliary(X::Param),
        "keyframe" => Auxiliary(X::Keyframe),
        "keyframeAnimation" => Auxiliary(X::KeyframeAnimation),
        "fadeIn" => Auxiliary(X::FadeIn),
        "fadeOut" => Auxiliary(X::FadeOut),
        "bookmark" => Auxiliary(X::Bookmark),
        "filter-video" | "filter-audio" | "filter-video-mask" => Auxiliary(X::Filter),
        other if other.starts_with("adjust-") => Auxiliary(X::Adjustment),
        _ => return None,
    };
    Some(kind)
}

impl StoryKind {
    /// Clip kinds that place content on a timeline (everything except containers
    /// of a timeline such as sequences, spines, multicams and angles)
    pub fn is_clip(self) -> bool {
        !matches!(
            self,
            StoryKind::Sequence | StoryKind::Spine | StoryKind::Multicam | StoryKind::McAngle
        )
    }

    /// Kinds whose children live on the parent's timeline unchanged
    pub fn is_transparent_container(self) -> bool {
        matches!(self, StoryKind::Spine | StoryKind::McAngle)
    }

    /// Kinds that reference a resource with its own internal timeline
    pub fn jumps_into_resource(self) -> bool {
        matches!(self, StoryKind::RefClip | StoryKind::McClip)
    }
}

impl KindCapabilities for StoryKind {
    fn start(&self) -> Presence {
        match self {
            StoryKind::Sequence
            | StoryKind::Multicam
            | StoryKind::AssetClip
            | StoryKind::Audio
            | StoryKind::Video
            | StoryKind::Clip
            | StoryKind::Gap
            | StoryKind::McClip
            | StoryKind::RefClip
            | StoryKind::SyncClip
            | StoryKind::Title
            | StoryKind::LiveDrawing => Presence::Optional,
            StoryKind::Spine | StoryKind::Audition | StoryKind::Transition | StoryKind::McAngle => {
                Presence::Absent
            }
        }
    }

    fn duration(&self) -> Presence {
        match self {
            StoryKind::AssetClip
            | StoryKind::Audio
            | StoryKind::Video
            | StoryKind::Clip
            | StoryKind::Gap
            | StoryKind::McClip
            | StoryKind::RefClip
            | StoryKind::SyncClip
            | StoryKind::Title
            | StoryKind::Transition
            | StoryKind::LiveDrawing => Presence::Required,
            StoryKind::Sequence | StoryKind::Multicam => Presence::Optional,
            StoryKind::Spine | StoryKind::Audition | StoryKind::McAngle => Presence::Absent,
        }
    }

    fn has_offset(&self) -> bool {
        match self {
            StoryKind::Sequence | StoryKind::Multicam | StoryKind::McAngle => false,
            StoryKind::Spine
            | StoryKind::AssetClip
            | StoryKind::Audio
            | StoryKind::Video
            | StoryKind::Audition
            | StoryKind::Clip
            | StoryKind::Gap
            | StoryKind::McClip
            | StoryKind::RefClip
            | StoryKind::SyncClip
            | StoryKind::Title
            | StoryKind::Transition
            | StoryKind::LiveDrawing => true,
        }
    }

    fn has_lane(&self) -> bool {
        match self {
            StoryKind::Sequence
            | StoryKind::Multicam
            | StoryKind::McAngle
            | StoryKind::Gap
            | StoryKind::Transition => false,
            StoryKind::Spine
            | StoryKind::AssetClip
            | StoryKind::Audio
            | StoryKind::Video
            | StoryKind::Audition
            | StoryKind::Clip
            | StoryKind::McClip
            | StoryKind::RefClip
            | StoryKind::SyncClip
            | StoryKind::Title
            | StoryKind::LiveDrawing => true,
        }
    }

    fn role_types(&self) -> &'static [RoleType] {
        match self {
            StoryKind::AssetClip => &[RoleType::Video, RoleType::Audio],
            StoryKind::Audio => &[RoleType::Audio],
            StoryKind::Video | StoryKind::Title | StoryKind::LiveDrawing => &[RoleType::Video],
            StoryKind::Sequence
            | StoryKind::Spine
            | StoryKind::Audition
            | StoryKind::Clip
            | StoryKind::Gap
            | StoryKind::McClip
            | StoryKind::RefClip
            | StoryKind::SyncClip
            | StoryKind::Transition
            | StoryKind::Multicam
            | StoryKind::McAngle => &[],
        }
    }
}

impl KindCapabilities for AnnotationKind {
    fn start(&self) -> Presence {
        match self {
            AnnotationKind::Marker
            | AnnotationKind::ChapterMarker
            | AnnotationKind::Keyword
            | AnnotationKind::Rating
            | AnnotationKind::AnalysisMarker => Presence::Required,
            AnnotationKind::Caption => Presence::Optional,
        }
    }

    fn duration(&self) -> Presence {
        match self {
            AnnotationKind::Caption => Presence::Required,
            AnnotationKind::Marker
            | AnnotationKind::ChapterMarker
            | AnnotationKind::Keyword
            | AnnotationKind::Rating
            | AnnotationKind::AnalysisMarker => Presence::Optional,
        }
    }

    fn has_offset(&self) -> bool {
        matches!(self, AnnotationKind::Caption)
    }

    fn has_lane(&self) -> bool {
        matches!(self, AnnotationKind::Caption)
    }

    fn role_types(&self) -> &'static [RoleType] {
        match self {
            AnnotationKind::Caption => &[RoleType::Caption],
            AnnotationKind::Marker
            | AnnotationKind::ChapterMarker
            | AnnotationKind::Keyword
            | AnnotationKind::Rating
            | AnnotationKind::AnalysisMarker => &[],
        }
    }
}

impl KindCapabilities for ElementKind {
    fn start(&self) -> Presence {
        match self {
            ElementKind::Story(kind) => kind.start(),
            ElementKind::Annotation(kind) => kind.start(),
            ElementKind::Structure(_) | ElementKind::Resource(_) | ElementKind::Auxiliary(_) => {
                Presence::Absent
            }
        }
    }

    fn duration(&self) -> Presence {
        match self {
            ElementKind::Story(kind) => kind.duration(),
            ElementKind::Annotation(kind) => kind.duration(),
            // Assets and media-less resources carry a duration but never sit on a timeline
            ElementKind::Resource(ResourceKind::Asset) => Presence::Optional,
            ElementKind::Structure(_) | ElementKind::Resource(_) | ElementKind::Auxiliary(_) => {
                Presence::Absent
            }
        }
    }

    fn has_offset(&self) -> bool {
        match self {
            ElementKind::Story(kind) => kind.has_offset(),
            ElementKind::Annotation(kind) => kind.has_offset(),
            ElementKind::Structure(_) | ElementKind::Resource(_) | ElementKind::Auxiliary(_) => false,
        }
    }

    fn has_lane(&self) -> bool {
        match self {
            ElementKind::Story(kind) => kind.has_lane(),
            ElementKind::Annotation(kind) => kind.has_lane(),
            ElementKind::Structure(_) | ElementKind::Resource(_) | ElementKind::Auxiliary(_) => false,
        }
    }

    fn role_types(&self) -> &'static [RoleType] {
        match self {
            ElementKind::Story(kind) => kind.role_types(),
            ElementKind::Annotation(kind) => kind.role_types(),
            ElementKind::Structure(_) | ElementKind::Resource(_) | ElementKind::Auxiliary(_) => &[],
        }
    }
}

impl ElementKind {
    pub fn as_story(self) -> Option<StoryKind> {
        match self {
            ElementKind::Story(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn as_annotation(self) -> Option<AnnotationKind> {
        match self {
            ElementKind::Annotation(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn as_resource(self) -> Option<ResourceKind> {
        match self {
            ElementKind::Resource(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn as_structure(self) -> Option<StructureKind> {
        match self {
            ElementKind::Structure(kind) => Some(kind),
            _ => None,
        }
    }

    /// Whether this kind occupies a range on some timeline
    pub fn is_timed(self) -> bool {
        self.start().is_present() || self.duration().is_present() || self.has_offset()
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::Structure(kind) => write!(f, "{:?}", kind),
            ElementKind::Resource(kind) => write!(f, "{:?}", kind),
            ElementKind::Story(kind) => write!(f, "{:?}", kind),
            ElementKind::Annotation(kind) => write!(f, "{:?}", kind),
            ElementKind::Auxiliary(kind) => write!(f, "{:?}", kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_layers() {
        assert_eq!(classify("fcpxml"), Some(ElementKind::Structure(StructureKind::Root)));
        assert_eq!(classify("asset"), Some(ElementKind::Resource(ResourceKind::Asset)));
        assert_eq!(classify("ref-clip"), Some(ElementKind::Story(StoryKind::RefClip)));
        assert_eq!(
            classify("chapter-marker"),
            Some(ElementKind::Annotation(AnnotationKind::ChapterMarker))
        );
        assert_eq!(
            classify("adjust-transform"),
            Some(ElementKind::Auxiliary(AuxiliaryKind::Adjustment))
        );
    }

    #[test]
    fn test_classify_unknown_tag() {
        assert_eq!(classify("hologram-clip"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_capabilities() {
        let clip = ElementKind::Story(StoryKind::AssetClip);
        assert_eq!(clip.duration(), Presence::Required);
        assert!(clip.has_lane());
        assert!(clip.has_offset());

        let spine = ElementKind::Story(StoryKind::Spine);
        assert_eq!(spine.start(), Presence::Absent);
        assert_eq!(spine.duration(), Presence::Absent);

        let marker = ElementKind::Annotation(AnnotationKind::Marker);
        assert_eq!(marker.start(), Presence::Required);
        assert!(!marker.has_lane());

        let event = ElementKind::Structure(StructureKind::Event);
        assert!(!event.is_timed());
    }

    #[test]
    fn test_role_types() {
        assert_eq!(StoryKind::Video.role_types(), &[RoleType::Video]);
        assert_eq!(AnnotationKind::Caption.role_types(), &[RoleType::Caption]);
        assert!(StoryKind::Gap.role_types().is_empty());
    }
}
