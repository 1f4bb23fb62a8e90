//! Extraction configuration

use crate::fcpxml::annotations::AnnotationType;
use crate::fcpxml::kinds::StoryKind;
use crate::fcpxml::occlusion::Occlusion;
use crate::fcpxml::roles::Role;
use crate::time::{FrameRate, SubFramesBase};
use serde::{Deserialize, Serialize};

/// Which audition picks are traversed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuditionMask {
    /// Only the active pick (the first story child)
    #[default]
    ActiveOnly,
    AllCases,
}

/// Which multicam angles an `mc-clip` descends into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum McClipAngleMask {
    /// Angles enabled by the clip's `mc-source` children
    #[default]
    Active,
    All,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionSettings {
    pub audition_mask: AuditionMask,
    pub mc_clip_angle_mask: McClipAngleMask,
    pub annotation_types: Vec<AnnotationType>,
    /// Story kinds that are neither emitted from nor descended into
    pub excluded_kinds: Vec<StoryKind>,
    /// Descend into clips with `enabled="0"`
    pub include_disabled: bool,
    /// Occlusion states to keep
    pub occlusions: Vec<Occlusion>,
    /// Rate used when no format defines one
    pub default_frame_rate: FrameRate,
    pub subframes_base: SubFramesBase,
    /// Roles applied when neither the element nor its ancestors carry one
    pub global_roles: Vec<Role>,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            audition_mask: AuditionMask::default(),
            mc_clip_angle_mask: McClipAngleMask::default(),
            annotation_types: AnnotationType::ALL.to_vec(),
            excluded_kinds: Vec::new(),
            include_disabled: true,
            occlusions: Occlusion::ALL.to_vec(),
            default_frame_rate: FrameRate::default(),
            subframes_base: SubFramesBase::default(),
            global_roles: Vec::new(),
        }
    }
}

impl ExtractionSettings {
    pub fn with_audition_mask(mut self, mask: AuditionMask) -> Self {
        self.audition_mask = mask;
        self
    }

    pub fn with_mc_clip_angle_mask(mut self, mask: McClipAngleMask) -> Self {
        self.mc_clip_angle_mask = mask;
        self
    }

    pub fn with_annotation_types(mut self, types: impl IntoIterator<Item = AnnotationType>) -> Self {
        self.annotation_types = types.into_iter().collect();
        self
    }

    pub fn excluding(mut self, kind: StoryKind) -> Self {
        if !self.excluded_kinds.contains(&kind) {
            self.excluded_kinds.push(kind);
        }
        self
    }

    pub fn with_include_disabled(mut self, include: bool) -> Self {
        self.include_disabled = include;
        self
    }

    pub fn with_occlusions(mut self, occlusions: impl IntoIterator<Item = Occlusion>) -> Self {
        self.occlusions = occlusions.into_iter().collect();
        self
    }

    /// Keep only annotations that remain at least partly visible
    pub fn visible_only(self) -> Self {
        self.with_occlusions([Occlusion::NotOccluded, Occlusion::PartiallyOccluded])
    }

    pub fn with_default_frame_rate(mut self, rate: FrameRate) -> Self {
        self.default_frame_rate = rate;
        self
    }

    pub fn with_subframes_base(mut self, base: SubFramesBase) -> Self {
        self.subframes_base = base;
        self
    }

    pub fn with_global_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.global_roles = roles.into_iter().collect();
        self
    }

    pub fn wants(&self, annotation_type: AnnotationType) -> bool {
        self.annotation_types.contains(&annotation_type)
    }

    pub fn keeps(&self, occlusion: Occlusion) -> bool {
        self.occlusions.contains(&occlusion)
    }

    pub fn excludes(&self, kind: StoryKind) -> bool {
        self.excluded_kinds.contains(&kind)
    }
}
