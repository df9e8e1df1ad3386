//! Declarative camera construction from JSON.
//!
//! Unknown keys are rejected. Per-camera values accept either one value,
//! broadcast across the batch, or a list with one entry per camera.

use camconv_core::{
    CameraError, ConventionRegistry, ImageSizes, IntrinsicBatch, Mat3, Real, Result, Vec2, Vec3,
};
use serde::{Deserialize, Serialize};

use crate::{CameraBuilder, CameraKind, Cameras, FoVOrthographicParams, FoVPerspectiveParams};

// ─────────────────────────────────────────────────────────────────────────────
// Value shapes
// ─────────────────────────────────────────────────────────────────────────────

/// A single value or one value per camera.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }
}

/// A focal length: one value for both axes or `(fx, fy)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FocalLength {
    Isotropic(Real),
    Pair([Real; 2]),
}

impl FocalLength {
    fn to_vec2(self) -> Vec2 {
        match self {
            FocalLength::Isotropic(f) => Vec2::new(f, f),
            FocalLength::Pair([fx, fy]) => Vec2::new(fx, fy),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config
// ─────────────────────────────────────────────────────────────────────────────

/// Factory options for one camera batch.
///
/// ```json
/// {
///   "type": "PerspectiveCameras",
///   "focal_length": 1000.0,
///   "principal_point": [500.0, 500.0],
///   "image_size": [1000, 1000],
///   "in_ndc": false
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    #[serde(rename = "type")]
    pub kind: Option<CameraKind>,

    /// `N × 3 × 3` or `N × 4 × 4` intrinsics, row-major.
    #[serde(rename = "K", default, skip_serializing_if = "Option::is_none")]
    pub k: Option<Vec<Vec<Vec<Real>>>>,

    /// `N × 3 × 3` rotations, row-major.
    #[serde(rename = "R", default, skip_serializing_if = "Option::is_none")]
    pub r: Option<Vec<[[Real; 3]; 3]>>,

    #[serde(rename = "T", default, skip_serializing_if = "Option::is_none")]
    pub t: Option<Vec<[Real; 3]>>,

    /// Registered convention name; `opencv` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convention: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_ndc: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<ImageSizes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_length: Option<OneOrMany<FocalLength>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_point: Option<OneOrMany<[Real; 2]>>,

    /// `[scale_x, scale_y, transl_x, transl_y]` for weak-perspective cameras.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pred_cam: Option<OneOrMany<[Real; 4]>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov_perspective: Option<OneOrMany<FoVPerspectiveParams>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov_orthographic: Option<OneOrMany<FoVOrthographicParams>>,
}

impl CameraConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CameraError::Config(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| CameraError::Config(e.to_string()))
    }

    /// Builder carrying every option of this config.
    pub fn to_builder(&self, registry: &ConventionRegistry) -> Result<CameraBuilder> {
        let kind = self
            .kind
            .ok_or_else(|| CameraError::Config("missing camera `type`".to_string()))?;
        let mut builder = CameraBuilder::new(kind);

        if let Some(raw) = &self.k {
            builder = builder.k(IntrinsicBatch::from_nested(raw)?);
        }
        if let Some(r) = &self.r {
            builder = builder.r(r.iter().map(|m| Mat3::from_fn(|i, j| m[i][j])).collect());
        }
        if let Some(t) = &self.t {
            builder = builder.t(t.iter().map(|v| Vec3::from(*v)).collect());
        }
        if let Some(name) = &self.convention {
            builder = builder.convention(registry.get(name)?.clone());
        }
        if let Some(in_ndc) = self.in_ndc {
            builder = builder.in_ndc(in_ndc);
        }
        if let Some(sizes) = &self.image_size {
            builder = builder.image_size(sizes.clone());
        }
        if let Some(focal) = &self.focal_length {
            builder = builder.focal_length(
                focal
                    .clone()
                    .into_vec()
                    .into_iter()
                    .map(FocalLength::to_vec2)
                    .collect(),
            );
        }
        if let Some(pp) = &self.principal_point {
            builder = builder.principal_point(
                pp.clone()
                    .into_vec()
                    .into_iter()
                    .map(Vec2::from)
                    .collect(),
            );
        }
        if let Some(pred_cam) = &self.pred_cam {
            builder = builder.pred_cam(pred_cam.clone().into_vec());
        }
        if let Some(params) = &self.fov_perspective {
            builder = builder.fov_perspective(params.clone().into_vec());
        }
        if let Some(params) = &self.fov_orthographic {
            builder = builder.fov_orthographic(params.clone().into_vec());
        }
        Ok(builder)
    }

    /// Build the cameras, resolving convention names against `registry`.
    pub fn build(&self, registry: &ConventionRegistry) -> Result<Cameras> {
        self.to_builder(registry)?.build_in(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_and_pair_focal_lengths() {
        let cfg = CameraConfig::from_json(r#"{"type": "perspective", "focal_length": 2.0}"#)
            .unwrap();
        assert_eq!(
            cfg.focal_length,
            Some(OneOrMany::One(FocalLength::Isotropic(2.0)))
        );

        let cfg = CameraConfig::from_json(
            r#"{"type": "perspective", "focal_length": [[1.0, 2.0], [3.0, 4.0]]}"#,
        )
        .unwrap();
        let focal: Vec<Vec2> = cfg
            .focal_length
            .unwrap()
            .into_vec()
            .into_iter()
            .map(FocalLength::to_vec2)
            .collect();
        assert_eq!(focal, vec![Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0)]);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = CameraConfig::from_json(r#"{"type": "perspective", "focal": 2.0}"#).unwrap_err();
        assert!(matches!(err, CameraError::Config(_)));
        let err = CameraConfig::from_json(r#"{"type": "pinhole"}"#).unwrap_err();
        assert!(matches!(err, CameraError::Config(_)));
    }

    #[test]
    fn type_is_required_to_build() {
        let cfg = CameraConfig::from_json("{}").unwrap();
        let err = cfg.build(ConventionRegistry::builtin()).unwrap_err();
        assert!(matches!(err, CameraError::Config(_)));
    }

    #[test]
    fn unknown_convention_name() {
        let cfg =
            CameraConfig::from_json(r#"{"type": "perspective", "convention": "blender"}"#).unwrap();
        let err = cfg.build(ConventionRegistry::builtin()).unwrap_err();
        assert_eq!(err, CameraError::UnknownConvention("blender".to_string()));
    }

    #[test]
    fn malformed_k_is_a_shape_error() {
        let cfg = CameraConfig::from_json(
            r#"{"type": "perspective", "K": [[[1.0, 0.0], [0.0, 1.0]]]}"#,
        )
        .unwrap();
        let err = cfg.build(ConventionRegistry::builtin()).unwrap_err();
        assert!(matches!(err, CameraError::ShapeMismatch { .. }));
    }

    #[test]
    fn json_round_trip_keeps_options() {
        let cfg = CameraConfig {
            kind: Some(CameraKind::WeakPerspective),
            pred_cam: Some(OneOrMany::Many(vec![[2.0, 2.0, 0.1, 0.1]])),
            ..Default::default()
        };
        let back = CameraConfig::from_json(&cfg.to_json().unwrap()).unwrap();
        assert_eq!(back, cfg);
    }
}
