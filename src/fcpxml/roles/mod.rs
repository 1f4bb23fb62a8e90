//! Audio, video and caption roles
//!
//! Role strings in FCPXML use `.` to separate a main role from its sub-role
//! (`dialogue.dialogue-1`) and `?` to attach caption parameters
//! (`iTT?captionFormat=ITT.en`). Raw role names therefore never contain
//! either separator.

pub mod inheritance;

pub use inheritance::{local_roles, resolve_roles, ElementRoles};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleType {
    Audio,
    Video,
    Caption,
}

impl RoleType {
    pub const ALL: [RoleType; 3] = [RoleType::Audio, RoleType::Video, RoleType::Caption];
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    #[error("empty role string")]
    Empty,

    #[error("role name {0:?} contains a reserved separator")]
    ReservedCharacter(String),

    #[error("caption role {0:?} has no captionFormat parameter")]
    MissingCaptionFormat(String),
}

/// Main role with an optional sub-role
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MainSubRole {
    pub main: String,
    pub sub: Option<String>,
}

impl MainSubRole {
    pub fn new(main: impl Into<String>, sub: Option<&str>) -> Result<Self, RoleError> {
        let main = main.into();
        validate_name(&main)?;
        if let Some(sub) = sub {
            validate_name(sub)?;
        }
        Ok(Self {
            main,
            sub: sub.map(str::to_string),
        })
    }

    /// Parse `main` or `main.sub`
    pub fn parse(raw: &str) -> Result<Self, RoleError> {
        let raw = raw.trim();
        match raw.split_once('.') {
            Some((main, sub)) => Self::new(main, Some(sub)),
            None => Self::new(raw, None),
        }
    }
}

impl fmt::Display for MainSubRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sub {
            Some(sub) => write!(f, "{}.{}", self.main, sub),
            None => write!(f, "{}", self.main),
        }
    }
}

/// Caption role: main role plus caption format (`ITT.en`, `SRT.en`, `CEA608`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptionRole {
    pub main: String,
    pub caption_format: String,
}

impl CaptionRole {
    /// Parse `main?captionFormat=FORMAT`
    pub fn parse(raw: &str) -> Result<Self, RoleError> {
        let raw = raw.trim();
        let (main, query) = raw
            .split_once('?')
            .ok_or_else(|| RoleError::MissingCaptionFormat(raw.to_string()))?;
        validate_name(main)?;

        let caption_format = query
            .split('&')
            .find_map(|pair| pair.strip_prefix("captionFormat="))
            .filter(|format| !format.is_empty())
            .ok_or_else(|| RoleError::MissingCaptionFormat(raw.to_string()))?;

        Ok(Self {
            main: main.to_string(),
            caption_format: caption_format.to_string(),
        })
    }
}

impl fmt::Display for CaptionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?captionFormat={}", self.main, self.caption_format)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Audio(MainSubRole),
    Video(MainSubRole),
    Caption(CaptionRole),
}

impl Role {
    pub fn parse(role_type: RoleType, raw: &str) -> Result<Self, RoleError> {
        match role_type {
            RoleType::Audio => MainSubRole::parse(raw).map(Role::Audio),
            RoleType::Video => MainSubRole::parse(raw).map(Role::Video),
            RoleType::Caption => CaptionRole::parse(raw).map(Role::Caption),
        }
    }

    pub fn role_type(&self) -> RoleType {
        match self {
            Role::Audio(_) => RoleType::Audio,
            Role::Video(_) => RoleType::Video,
            Role::Caption(_) => RoleType::Caption,
        }
    }

    pub fn main(&self) -> &str {
        match self {
            Role::Audio(role) | Role::Video(role) => &role.main,
            Role::Caption(role) => &role.main,
        }
    }

    /// Built-in role a kind falls back to when no role attribute is present
    pub fn default_video() -> Self {
        Role::Video(MainSubRole { main: "Video".to_string(), sub: None })
    }

    pub fn default_titles() -> Self {
        Role::Video(MainSubRole { main: "Titles".to_string(), sub: None })
    }

    pub fn default_audio() -> Self {
        Role::Audio(MainSubRole { main: "Dialogue".to_string(), sub: None })
    }

    pub fn default_caption() -> Self {
        Role::Caption(CaptionRole {
            main: "iTT".to_string(),
            caption_format: "ITT.en".to_string(),
        })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Audio(role) | Role::Video(role) => write!(f, "{}", role),
            Role::Caption(role) => write!(f, "{}", role),
        }
    }
}

/// A role together with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpolatedRole {
    /// Explicit role attribute on the element
    Assigned(Role),
    /// Implicit default of the element's kind
    Defaulted(Role),
    /// Taken from an ancestor
    Inherited(Role),
}

impl InterpolatedRole {
    pub fn role(&self) -> &Role {
        match self {
            InterpolatedRole::Assigned(role)
            | InterpolatedRole::Defaulted(role)
            | InterpolatedRole::Inherited(role) => role,
        }
    }

    pub fn into_role(self) -> Role {
        match self {
            InterpolatedRole::Assigned(role)
            | InterpolatedRole::Defaulted(role)
            | InterpolatedRole::Inherited(role) => role,
        }
    }

    pub fn is_assigned(&self) -> bool {
        matches!(self, InterpolatedRole::Assigned(_))
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, InterpolatedRole::Defaulted(_))
    }

    pub fn role_type(&self) -> RoleType {
        self.role().role_type()
    }
}

fn validate_name(name: &str) -> Result<(), RoleError> {
    if name.is_empty() {
        return Err(RoleError::Empty);
    }
    if name.contains('.') || name.contains('?') {
        return Err(RoleError::ReservedCharacter(name.to_string()));
    }
    Ok(())
}
