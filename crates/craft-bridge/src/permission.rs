//! Policy for media capture permission prompts.

use serde::Deserialize;

use crate::decision::Decision;

/// What the web view asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Camera only.
    Camera,
    /// Microphone only.
    Microphone,
    /// Camera and microphone together.
    CameraAndMicrophone,
}

impl MediaKind {
    /// Map the toolkit's capture type code (0, 1, 2).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Camera),
            1 => Some(Self::Microphone),
            2 => Some(Self::CameraAndMicrophone),
            _ => None,
        }
    }
}

/// Configured answer for one kind of request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionRule {
    /// Always allow.
    Grant,
    /// Always refuse.
    Deny,
    /// Defer to the system prompt.
    #[default]
    Prompt,
}

impl From<PermissionRule> for Decision {
    fn from(r: PermissionRule) -> Self {
        match r {
            PermissionRule::Grant => Self::Grant,
            PermissionRule::Deny => Self::Deny,
            PermissionRule::Prompt => Self::Prompt,
        }
    }
}

/// Per-kind permission rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PermissionPolicy {
    /// Rule for camera requests.
    pub camera: PermissionRule,
    /// Rule for microphone requests.
    pub microphone: PermissionRule,
    /// Rule for combined requests.
    pub camera_and_microphone: PermissionRule,
}

impl PermissionPolicy {
    /// Decision for a request of `kind`. Unknown kinds are denied.
    pub fn decide(&self, kind: Option<MediaKind>) -> Decision {
        match kind {
            Some(MediaKind::Camera) => self.camera.into(),
            Some(MediaKind::Microphone) => self.microphone.into(),
            Some(MediaKind::CameraAndMicrophone) => self.camera_and_microphone.into(),
            None => Decision::Deny,
        }
    }
}
