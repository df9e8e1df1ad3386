//! Field-of-view cameras, parameterised by frustum planes instead of focal
//! length and principal point. Both kinds are NDC only.

use camconv_core::{deg_to_rad, CameraError, Mat4, Real, Result};
use serde::{Deserialize, Serialize};

use crate::{CameraBatch, CameraKind, CameraModel};

/// Symmetric perspective frustum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FoVPerspectiveParams {
    pub znear: Real,
    pub zfar: Real,
    /// Width over height of the frustum.
    pub aspect_ratio: Real,
    /// Vertical field of view.
    pub fov: Real,
    /// Whether `fov` is in degrees (radians otherwise).
    pub degrees: bool,
}

impl Default for FoVPerspectiveParams {
    fn default() -> Self {
        Self {
            znear: 1.0,
            zfar: 100.0,
            aspect_ratio: 1.0,
            fov: 60.0,
            degrees: true,
        }
    }
}

impl FoVPerspectiveParams {
    /// Projection matrix for a camera looking down +Z.
    ///
    /// Rows 0–1 map to NDC after the divide by row 3 (the depth); row 2
    /// maps `[znear, zfar]` to `[0, 1]`.
    pub fn to_k(&self) -> Result<Mat4> {
        let fov = if self.degrees {
            deg_to_rad(self.fov)
        } else {
            self.fov
        };
        if !(fov > 0.0 && fov < std::f64::consts::PI) {
            return Err(CameraError::InvalidParameter(format!(
                "field of view must lie in (0, 180) degrees, got {}",
                self.fov
            )));
        }
        if self.aspect_ratio <= 0.0 {
            return Err(CameraError::InvalidParameter(format!(
                "aspect ratio must be positive, got {}",
                self.aspect_ratio
            )));
        }
        check_planes(self.znear, self.zfar)?;

        let max_y = (fov / 2.0).tan() * self.znear;
        let max_x = max_y * self.aspect_ratio;
        let (zn, zf) = (self.znear, self.zfar);
        let mut k = Mat4::zeros();
        k[(0, 0)] = 2.0 * zn / (2.0 * max_x);
        k[(1, 1)] = 2.0 * zn / (2.0 * max_y);
        k[(3, 2)] = 1.0;
        k[(2, 2)] = zf / (zf - zn);
        k[(2, 3)] = -(zf * zn) / (zf - zn);
        Ok(k)
    }
}

/// Axis-aligned orthographic frustum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FoVOrthographicParams {
    pub znear: Real,
    pub zfar: Real,
    pub max_y: Real,
    pub min_y: Real,
    pub max_x: Real,
    pub min_x: Real,
    pub scale_xyz: [Real; 3],
}

impl Default for FoVOrthographicParams {
    fn default() -> Self {
        Self {
            znear: 1.0,
            zfar: 100.0,
            max_y: 1.0,
            min_y: -1.0,
            max_x: 1.0,
            min_x: -1.0,
            scale_xyz: [1.0; 3],
        }
    }
}

impl FoVOrthographicParams {
    /// Projection matrix for a camera looking down +Z.
    pub fn to_k(&self) -> Result<Mat4> {
        if self.max_x <= self.min_x || self.max_y <= self.min_y {
            return Err(CameraError::InvalidParameter(format!(
                "empty orthographic frustum x [{}, {}], y [{}, {}]",
                self.min_x, self.max_x, self.min_y, self.max_y
            )));
        }
        check_planes(self.znear, self.zfar)?;

        let [sx, sy, sz] = self.scale_xyz;
        let (w, h) = (self.max_x - self.min_x, self.max_y - self.min_y);
        let (zn, zf) = (self.znear, self.zfar);
        let mut k = Mat4::zeros();
        k[(0, 0)] = 2.0 / w * sx;
        k[(1, 1)] = 2.0 / h * sy;
        k[(0, 3)] = -(self.max_x + self.min_x) / w;
        k[(1, 3)] = -(self.max_y + self.min_y) / h;
        k[(2, 2)] = sz / (zf - zn);
        k[(2, 3)] = -zn / (zf - zn);
        k[(3, 3)] = 1.0;
        Ok(k)
    }
}

fn check_planes(znear: Real, zfar: Real) -> Result<()> {
    if znear == zfar {
        return Err(CameraError::InvalidParameter(format!(
            "znear and zfar coincide at {znear}"
        )));
    }
    Ok(())
}

/// Perspective cameras built from a field of view.
#[derive(Clone, Debug, PartialEq)]
pub struct FoVPerspectiveCameras {
    batch: CameraBatch,
}

impl FoVPerspectiveCameras {
    pub fn from_batch(batch: CameraBatch) -> Self {
        Self { batch }
    }

    pub fn into_batch(self) -> CameraBatch {
        self.batch
    }
}

impl CameraModel for FoVPerspectiveCameras {
    fn kind(&self) -> CameraKind {
        CameraKind::FoVPerspective
    }

    fn batch(&self) -> &CameraBatch {
        &self.batch
    }
}

/// Orthographic cameras built from frustum bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct FoVOrthographicCameras {
    batch: CameraBatch,
}

impl FoVOrthographicCameras {
    pub fn from_batch(batch: CameraBatch) -> Self {
        Self { batch }
    }

    pub fn into_batch(self) -> CameraBatch {
        self.batch
    }
}

impl CameraModel for FoVOrthographicCameras {
    fn kind(&self) -> CameraKind {
        CameraKind::FoVOrthographic
    }

    fn batch(&self) -> &CameraBatch {
        &self.batch
    }
}
