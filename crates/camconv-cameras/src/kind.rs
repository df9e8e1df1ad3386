use std::fmt;
use std::str::FromStr;

use camconv_core::CameraError;
use serde::{Deserialize, Serialize};

/// The five supported camera models.
///
/// Serialized with the batch-class names (`"PerspectiveCameras"`, ...);
/// snake-case short names are accepted as aliases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraKind {
    #[serde(rename = "PerspectiveCameras", alias = "perspective")]
    Perspective,
    #[serde(rename = "OrthographicCameras", alias = "orthographic")]
    Orthographic,
    #[serde(rename = "WeakPerspectiveCameras", alias = "weak_perspective")]
    WeakPerspective,
    #[serde(rename = "FoVPerspectiveCameras", alias = "fov_perspective")]
    FoVPerspective,
    #[serde(rename = "FoVOrthographicCameras", alias = "fov_orthographic")]
    FoVOrthographic,
}

impl CameraKind {
    pub const ALL: [CameraKind; 5] = [
        CameraKind::Perspective,
        CameraKind::Orthographic,
        CameraKind::WeakPerspective,
        CameraKind::FoVPerspective,
        CameraKind::FoVOrthographic,
    ];

    /// Whether the intrinsics use the perspective layout (divide by depth).
    pub fn is_perspective(self) -> bool {
        matches!(self, CameraKind::Perspective | CameraKind::FoVPerspective)
    }

    /// Whether cameras of this kind may be expressed in screen space.
    pub fn supports_screen(self) -> bool {
        matches!(self, CameraKind::Perspective | CameraKind::Orthographic)
    }

    pub fn name(self) -> &'static str {
        match self {
            CameraKind::Perspective => "PerspectiveCameras",
            CameraKind::Orthographic => "OrthographicCameras",
            CameraKind::WeakPerspective => "WeakPerspectiveCameras",
            CameraKind::FoVPerspective => "FoVPerspectiveCameras",
            CameraKind::FoVOrthographic => "FoVOrthographicCameras",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            CameraKind::Perspective => "perspective",
            CameraKind::Orthographic => "orthographic",
            CameraKind::WeakPerspective => "weak_perspective",
            CameraKind::FoVPerspective => "fov_perspective",
            CameraKind::FoVOrthographic => "fov_orthographic",
        }
    }
}

impl fmt::Display for CameraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CameraKind {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CameraKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s || kind.short_name() == s)
            .ok_or_else(|| CameraError::InvalidParameter(format!("unknown camera type `{s}`")))
    }
}
