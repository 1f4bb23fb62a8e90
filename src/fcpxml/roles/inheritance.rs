//! Effective role resolution
//!
//! Each role type is resolved independently:
//!
//! 1. an element that bears a role of the type itself (an explicit attribute
//!    or its kind's default) keeps it;
//! 2. otherwise the ancestors are searched nearest → furthest; the nearest
//!    assigned role wins over any defaulted one, and the nearest defaulted role
//!    is used only when no ancestor assigns one;
//! 3. otherwise the caller's global fallback applies.

use super::{InterpolatedRole, Role, RoleType};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::fcpxml::ancestors::AncestorChain;
use crate::fcpxml::element::Element;
use crate::fcpxml::kinds::{AnnotationKind, AuxiliaryKind, ElementKind, StoryKind};
use serde::{Deserialize, Serialize};

/// Resolved role per role type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRoles {
    pub audio: Option<InterpolatedRole>,
    pub video: Option<InterpolatedRole>,
    pub caption: Option<InterpolatedRole>,
}

impl ElementRoles {
    pub fn get(&self, role_type: RoleType) -> Option<&InterpolatedRole> {
        match role_type {
            RoleType::Audio => self.audio.as_ref(),
            RoleType::Video => self.video.as_ref(),
            RoleType::Caption => self.caption.as_ref(),
        }
    }

    pub fn set(&mut self, role: InterpolatedRole) {
        match role.role_type() {
            RoleType::Audio => self.audio = Some(role),
            RoleType::Video => self.video = Some(role),
            RoleType::Caption => self.caption = Some(role),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &InterpolatedRole> {
        [&self.audio, &self.video, &self.caption]
            .into_iter()
            .filter_map(Option::as_ref)
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Roles an element carries on itself: `Assigned` for explicit attributes,
/// `Defaulted` for its kind's implicit role
pub fn local_roles(element: Element, diagnostics: &mut Diagnostics) -> Vec<InterpolatedRole> {
    roles_within(element, &mut Vec::new(), diagnostics)
}

/// `open` holds the media ids entered through ref-clips/mc-clips so far
fn roles_within(element: Element, open: &mut Vec<String>, diagnostics: &mut Diagnostics) -> Vec<InterpolatedRole> {
    let mut roles = Vec::new();

    match element.kind() {
        ElementKind::Story(StoryKind::AssetClip) => {
            let asset = element.referenced_resource(diagnostics);
            let has_video = asset.map(|a| a.has_video).unwrap_or(true);
            let has_audio = asset.map(|a| a.has_audio).unwrap_or(false);

            match explicit(element, "videoRole", RoleType::Video, diagnostics) {
                Some(role) => roles.push(InterpolatedRole::Assigned(role)),
                None if has_video => roles.push(InterpolatedRole::Defaulted(Role::default_video())),
                None => {}
            }
            match explicit(element, "audioRole", RoleType::Audio, diagnostics)
                .or_else(|| source_audio_role(element, diagnostics))
            {
                Some(role) => roles.push(InterpolatedRole::Assigned(role)),
                None if has_audio => roles.push(InterpolatedRole::Defaulted(Role::default_audio())),
                None => {}
            }
        }

        ElementKind::Story(StoryKind::Audio) => {
            roles.push(own_or_default(element, RoleType::Audio, Role::default_audio(), diagnostics));
        }

        ElementKind::Story(StoryKind::Video) | ElementKind::Story(StoryKind::LiveDrawing) => {
            roles.push(own_or_default(element, RoleType::Video, Role::default_video(), diagnostics));
        }

        ElementKind::Story(StoryKind::Title) => {
            roles.push(own_or_default(element, RoleType::Video, Role::default_titles(), diagnostics));
        }

        ElementKind::Annotation(AnnotationKind::Caption) => {
            roles.push(own_or_default(element, RoleType::Caption, Role::default_caption(), diagnostics));
        }

        // Containers of primary content take the roles of that content
        ElementKind::Story(StoryKind::Clip) | ElementKind::Story(StoryKind::SyncClip) => {
            if let Some(role) = source_audio_role(element, diagnostics) {
                roles.push(InterpolatedRole::Assigned(role));
            }
            let content: Vec<_> = element.story_children().filter(|child| child.lane() == 0).collect();
            merge_content_roles(&mut roles, content, open, diagnostics);
        }

        ElementKind::Story(StoryKind::RefClip) | ElementKind::Story(StoryKind::McClip) => {
            if let Some(role) = source_audio_role(element, diagnostics) {
                roles.push(InterpolatedRole::Assigned(role));
            }
            let Some(resource) = element.referenced_resource(diagnostics) else {
                return roles;
            };
            if open.contains(&resource.id) {
                return roles;
            }
            let Some(timeline) = resource.timeline.and_then(|id| Element::new(element.fcpxml(), id)) else {
                return roles;
            };
            let content = timeline_content(element, timeline);
            open.push(resource.id.clone());
            merge_content_roles(&mut roles, content, open, diagnostics);
            open.pop();
        }

        ElementKind::Story(StoryKind::Sequence)
        | ElementKind::Story(StoryKind::Spine)
        | ElementKind::Story(StoryKind::Audition)
        | ElementKind::Story(StoryKind::Gap)
        | ElementKind::Story(StoryKind::Transition)
        | ElementKind::Story(StoryKind::Multicam)
        | ElementKind::Story(StoryKind::McAngle)
        | ElementKind::Annotation(_)
        | ElementKind::Structure(_)
        | ElementKind::Resource(_)
        | ElementKind::Auxiliary(_) => {}
    }

    roles
}

/// Add the roles of `content` for role types not already present
fn merge_content_roles(
    roles: &mut Vec<InterpolatedRole>,
    content: Vec<Element>,
    open: &mut Vec<String>,
    diagnostics: &mut Diagnostics,
) {
    for child in content {
        for role in roles_within(child, open, diagnostics) {
            if !roles.iter().any(|r| r.role_type() == role.role_type()) {
                roles.push(role);
            }
        }
    }
}

/// Primary content of a media timeline as seen through `referrer`: the
/// lane-0 spine items of a sequence, or those of the angles an `mc-clip`
/// enables (the first angle when it names none)
fn timeline_content<'a>(referrer: Element<'a>, timeline: Element<'a>) -> Vec<Element<'a>> {
    let containers: Vec<Element<'a>> = match timeline.story_kind() {
        Some(StoryKind::Multicam) => {
            let enabled: Vec<&str> = referrer
                .children()
                .filter(|child| child.kind() == ElementKind::Auxiliary(AuxiliaryKind::McSource))
                .filter(|source| source.attribute("srcEnable") != Some("none"))
                .filter_map(|source| source.attribute("angleID"))
                .collect();
            let angles = timeline
                .story_children()
                .filter(|child| child.story_kind() == Some(StoryKind::McAngle));
            if enabled.is_empty() {
                angles.take(1).collect()
            } else {
                angles
                    .filter(|angle| angle.attribute("angleID").map_or(false, |id| enabled.contains(&id)))
                    .collect()
            }
        }
        _ => timeline
            .story_children()
            .filter(|child| child.story_kind() == Some(StoryKind::Spine))
            .collect(),
    };

    containers
        .into_iter()
        .flat_map(|container| container.story_children().filter(|child| child.lane() == 0))
        .collect()
}

/// Resolve effective roles for `element`; `fallback` supplies global defaults
pub fn resolve_roles(
    element: Element,
    chain: &AncestorChain,
    fallback: &[Role],
    diagnostics: &mut Diagnostics,
) -> ElementRoles {
    let own = local_roles(element, diagnostics);
    let ancestors: Vec<Vec<InterpolatedRole>> = chain
        .elements(element.fcpxml())
        .map(|ancestor| local_roles(ancestor, diagnostics))
        .collect();

    let mut resolved = ElementRoles::default();
    for role_type in RoleType::ALL {
        if let Some(role) = own.iter().find(|r| r.role_type() == role_type) {
            resolved.set(role.clone());
            continue;
        }

        let of_type = || ancestors.iter().flatten().filter(move |r| r.role_type() == role_type);
        let inherited = of_type()
            .find(|r| r.is_assigned())
            .or_else(|| of_type().find(|r| r.is_defaulted()));

        if let Some(role) = inherited {
            resolved.set(InterpolatedRole::Inherited(role.role().clone()));
        } else if let Some(role) = fallback.iter().find(|r| r.role_type() == role_type) {
            resolved.set(InterpolatedRole::Defaulted(role.clone()));
        }
    }
    resolved
}

fn own_or_default(
    element: Element,
    role_type: RoleType,
    default: Role,
    diagnostics: &mut Diagnostics,
) -> InterpolatedRole {
    match explicit(element, "role", role_type, diagnostics) {
        Some(role) => InterpolatedRole::Assigned(role),
        None => InterpolatedRole::Defaulted(default),
    }
}

/// Parse an explicit role attribute; an unparseable value counts as absent
fn explicit(element: Element, attribute: &str, role_type: RoleType, diagnostics: &mut Diagnostics) -> Option<Role> {
    let raw = element.attribute(attribute)?;
    match Role::parse(role_type, raw) {
        Ok(role) => Some(role),
        Err(e) => {
            diagnostics.warn(
                DiagnosticKind::AttributeDecode,
                Some(element.id()),
                format!("<{}> {}: {}", element.tag(), attribute, e),
            );
            None
        }
    }
}

/// First active audio role from `audio-channel-source` / `audio-role-source` children
fn source_audio_role(element: Element, diagnostics: &mut Diagnostics) -> Option<Role> {
    element
        .children()
        .filter(|child| {
            matches!(
                child.kind(),
                ElementKind::Auxiliary(AuxiliaryKind::AudioChannelSource)
                    | ElementKind::Auxiliary(AuxiliaryKind::AudioRoleSource)
            )
        })
        .filter(|source| source.attribute("active") != Some("0"))
        .find_map(|source| explicit(source, "role", RoleType::Audio, diagnostics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fcpxml::Fcpxml;

    const XML: &str = r#"<fcpxml version="1.11">
  <resources>
    <format id="r1" frameDuration="1/25s"/>
    <asset id="r2" hasVideo="1" hasAudio="1" format="r1"/>
    <asset id="r3" hasAudio="1"/>
  </resources>
  <library>
    <event name="E">
      <project name="P">
        <sequence format="r1" duration="60s">
          <spine>
            <asset-clip ref="r2" name="Explicit" offset="0s" duration="10s" videoRole="B-Roll.B-Roll-1" audioRole="music"/>
            <asset-clip ref="r2" name="Plain" offset="10s" duration="10s">
              <marker start="1s" value="plain marker"/>
            </asset-clip>
            <asset-clip ref="r3" name="AudioOnly" offset="20s" duration="10s">
              <audio-channel-source srcCh="1, 2" role="effects.effects-1"/>
            </asset-clip>
            <title name="Lower Third" offset="30s" duration="5s"/>
            <clip name="Wrapper" offset="35s" duration="5s">
              <video ref="r2" offset="0s" duration="5s" role="Graphics"/>
              <marker start="1s" value="wrapped marker"/>
            </clip>
          </spine>
        </sequence>
      </project>
    </event>
  </library>
</fcpxml>"#;

    fn roles_of(fcpxml: &Fcpxml, name: &str) -> ElementRoles {
        let element = fcpxml.find_first(|e| e.name() == Some(name)).unwrap();
        let chain = AncestorChain::from_xml(fcpxml, element.id());
        let mut diagnostics = Diagnostics::new();
        resolve_roles(element, &chain, &[], &mut diagnostics)
    }

    #[test]
    fn test_explicit_roles_are_assigned() {
        let fcpxml = Fcpxml::parse(XML).unwrap();
        let roles = roles_of(&fcpxml, "Explicit");
        assert_eq!(roles.video.as_ref().unwrap().role().to_string(), "B-Roll.B-Roll-1");
        assert!(roles.video.as_ref().unwrap().is_assigned());
        assert_eq!(roles.audio.as_ref().unwrap().role().to_string(), "music");
    }

    #[test]
    fn test_defaults_follow_asset_content() {
        let fcpxml = Fcpxml::parse(XML).unwrap();
        let roles = roles_of(&fcpxml, "Plain");
        assert_eq!(roles.video, Some(InterpolatedRole::Defaulted(Role::default_video())));
        assert_eq!(roles.audio, Some(InterpolatedRole::Defaulted(Role::default_audio())));
        assert_eq!(roles.caption, None);
    }

    #[test]
    fn test_channel_source_role_counts_as_assigned() {
        let fcpxml = Fcpxml::parse(XML).unwrap();
        let roles = roles_of(&fcpxml, "AudioOnly");
        assert_eq!(roles.video, None);
        assert_eq!(
            roles.audio.as_ref().unwrap().role().to_string(),
            "effects.effects-1"
        );
        assert!(roles.audio.as_ref().unwrap().is_assigned());
    }

    #[test]
    fn test_title_defaults_to_titles() {
        let fcpxml = Fcpxml::parse(XML).unwrap();
        let roles = roles_of(&fcpxml, "Lower Third");
        assert_eq!(roles.video, Some(InterpolatedRole::Defaulted(Role::default_titles())));
    }

    #[test]
    fn test_marker_inherits_from_clip() {
        let fcpxml = Fcpxml::parse(XML).unwrap();
        let roles = roles_of(&fcpxml, "plain marker");
        assert_eq!(roles.video, Some(InterpolatedRole::Inherited(Role::default_video())));
        assert_eq!(roles.audio, Some(InterpolatedRole::Inherited(Role::default_audio())));
    }

    #[test]
    fn test_clip_takes_roles_of_its_content() {
        let fcpxml = Fcpxml::parse(XML).unwrap();
        let roles = roles_of(&fcpxml, "wrapped marker");
        assert_eq!(roles.video.as_ref().unwrap().role().main(), "Graphics");
        assert!(matches!(roles.video, Some(InterpolatedRole::Inherited(_))));
    }

    #[test]
    fn test_global_fallback() {
        let fcpxml = Fcpxml::parse(XML).unwrap();
        let sequence = fcpxml.find_first(|e| e.tag() == "sequence").unwrap();
        let chain = AncestorChain::from_xml(&fcpxml, sequence.id());
        let mut diagnostics = Diagnostics::new();
        let roles = resolve_roles(sequence, &chain, &[Role::default_caption()], &mut diagnostics);
        assert_eq!(roles.caption, Some(InterpolatedRole::Defaulted(Role::default_caption())));
        assert_eq!(roles.video, None);
    }
}
