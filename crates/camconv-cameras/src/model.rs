//! The capability interface every camera model implements.

use camconv_core::{
    to_homogeneous, CameraError, ImageSize, Mat2, Mat4, Pt3, Real, Result, Vec2, Vec3,
};

use crate::batch::{map_pairs, pair_count, CameraBatch};
use crate::CameraKind;

/// Project a view-space point with homogeneous intrinsics `k`.
///
/// Perspective layouts divide by the last row; the others use rows 0–1 as is.
pub fn project_view_point(k: &Mat4, x: &Vec3, is_perspective: bool) -> Vec2 {
    let h = k * to_homogeneous(x);
    if is_perspective {
        Vec2::new(h.x / h.w, h.y / h.w)
    } else {
        Vec2::new(h.x, h.y)
    }
}

/// Recover view-space `(x, y)` of a point with output `uv` at view depth `z`.
pub fn unproject_view_point(k: &Mat4, uv: &Vec2, z: Real) -> Result<Vec3> {
    let w = k.fixed_view::<1, 2>(3, 0);
    let a = k.fixed_view::<2, 2>(0, 0) - uv * w;
    let b = uv * (k[(3, 2)] * z + k[(3, 3)])
        - (k.fixed_view::<2, 1>(0, 2) * z + k.fixed_view::<2, 1>(0, 3));
    let a_inv: Mat2 = a.try_inverse().ok_or_else(|| {
        CameraError::InvalidParameter(format!("cannot unproject {uv:?} at depth {z}"))
    })?;
    let xy = a_inv * b;
    Ok(Vec3::new(xy.x, xy.y, z))
}

fn ndc_to_pixel(uv: &Vec2, size: ImageSize, q: &Mat2) -> Vec2 {
    size.center() + q * uv * size.ndc_scale()
}

fn pixel_to_ndc(uv: &Vec2, size: ImageSize, q: &Mat2) -> Vec2 {
    q.transpose() * (uv - size.center()) / size.ndc_scale()
}

fn pair(n_cameras: usize, n_sets: usize, b: usize) -> (usize, usize) {
    (
        if n_cameras == 1 { 0 } else { b },
        if n_sets == 1 { 0 } else { b },
    )
}

/// Output space requested from a projection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Space {
    Native,
    Ndc,
    Screen,
}

fn transform(
    batch: &CameraBatch,
    is_perspective: bool,
    points: &[Vec<Pt3>],
    space: Space,
) -> Result<Vec<Vec<Pt3>>> {
    let (n_cameras, n_sets) = (batch.len(), points.len());
    let n = pair_count(n_cameras, n_sets)?;
    map_pairs(n, |b| {
        let (cam, set) = pair(n_cameras, n_sets, b);
        let k = &batch.k()[cam];
        // Map from the camera's native output to the requested space.
        let frame = match (space, batch.in_ndc()) {
            (Space::Native, _) | (Space::Ndc, true) | (Space::Screen, false) => None,
            _ => Some(batch.pixel_frame(cam)?),
        };
        Ok(points[set]
            .iter()
            .map(|p| {
                let x = batch.world_to_view_point(cam, p);
                let uv = project_view_point(k, &x, is_perspective);
                let uv = match (frame, space) {
                    (Some((size, q)), Space::Screen) => ndc_to_pixel(&uv, size, &q),
                    (Some((size, q)), _) => pixel_to_ndc(&uv, size, &q),
                    (None, _) => uv,
                };
                Pt3::new(uv.x, uv.y, x.z)
            })
            .collect())
    })
}

/// A batch of cameras of one model kind.
///
/// Implementors only expose their kind and shared batch state; projection,
/// depth and unprojection are driven by the intrinsic layout of the kind.
pub trait CameraModel {
    fn kind(&self) -> CameraKind;

    fn batch(&self) -> &CameraBatch;

    fn len(&self) -> usize {
        self.batch().len()
    }

    fn is_empty(&self) -> bool {
        self.batch().is_empty()
    }

    fn is_perspective(&self) -> bool {
        self.kind().is_perspective()
    }

    /// World points in each camera's view space.
    fn world_to_view(&self, points: &[Vec<Pt3>]) -> Result<Vec<Vec<Pt3>>> {
        let batch = self.batch();
        let (n_cameras, n_sets) = (batch.len(), points.len());
        let n = pair_count(n_cameras, n_sets)?;
        map_pairs(n, |b| {
            let (cam, set) = pair(n_cameras, n_sets, b);
            Ok(points[set]
                .iter()
                .map(|p| Pt3::from(batch.world_to_view_point(cam, p)))
                .collect())
        })
    }

    /// View-space Z of every point; independent of the intrinsics.
    fn compute_depth_of_points(&self, points: &[Vec<Pt3>]) -> Result<Vec<Vec<Real>>> {
        Ok(self
            .world_to_view(points)?
            .into_iter()
            .map(|set| set.into_iter().map(|p| p.z).collect())
            .collect())
    }

    /// Project into the camera's own output space (NDC or pixels);
    /// z is the view-space depth.
    fn transform_points(&self, points: &[Vec<Pt3>]) -> Result<Vec<Vec<Pt3>>> {
        transform(self.batch(), self.is_perspective(), points, Space::Native)
    }

    /// Project into NDC; screen cameras need an image size.
    fn transform_points_ndc(&self, points: &[Vec<Pt3>]) -> Result<Vec<Vec<Pt3>>> {
        transform(self.batch(), self.is_perspective(), points, Space::Ndc)
    }

    /// Project into pixels; NDC cameras need an image size.
    fn transform_points_screen(&self, points: &[Vec<Pt3>]) -> Result<Vec<Vec<Pt3>>> {
        transform(self.batch(), self.is_perspective(), points, Space::Screen)
    }

    /// Lift `(x, y, depth)` back to world points.
    ///
    /// `xy` is in pixels, or in NDC when `from_ndc` is set; depth is the
    /// view-space Z returned by the projections.
    fn unproject_points(&self, xy_depth: &[Vec<Pt3>], from_ndc: bool) -> Result<Vec<Vec<Pt3>>> {
        let batch = self.batch();
        let (n_cameras, n_sets) = (batch.len(), xy_depth.len());
        let n = pair_count(n_cameras, n_sets)?;
        map_pairs(n, |b| {
            let (cam, set) = pair(n_cameras, n_sets, b);
            let k = &batch.k()[cam];
            let frame = if from_ndc == batch.in_ndc() {
                None
            } else {
                Some(batch.pixel_frame(cam)?)
            };
            xy_depth[set]
                .iter()
                .map(|p| {
                    let uv = Vec2::new(p.x, p.y);
                    let uv = match frame {
                        Some((size, q)) if from_ndc => ndc_to_pixel(&uv, size, &q),
                        Some((size, q)) => pixel_to_ndc(&uv, size, &q),
                        None => uv,
                    };
                    let x = unproject_view_point(k, &uv, p.z)?;
                    Ok(batch.view_to_world_point(cam, &x))
                })
                .collect()
        })
    }

    fn camera_centers(&self) -> Vec<Pt3> {
        self.batch().camera_centers()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camconv_core::{orthographic_k, perspective_k};

    #[test]
    fn unproject_inverts_both_layouts() {
        let x = Vec3::new(0.4, -0.3, 2.5);
        for (k, persp) in [
            (perspective_k(1.5, 1.4, 0.1, -0.1), true),
            (orthographic_k(0.5, 0.5, 0.1, -0.1), false),
        ] {
            let uv = project_view_point(&k, &x, persp);
            let back = unproject_view_point(&k, &uv, x.z).unwrap();
            assert!((back - x).norm() < 1e-12);
        }
    }

    #[test]
    fn singular_intrinsics_cannot_unproject() {
        let err = unproject_view_point(&Mat4::zeros(), &Vec2::zeros(), 1.0).unwrap_err();
        assert!(matches!(err, CameraError::InvalidParameter(_)));
    }

    #[test]
    fn pixel_and_ndc_helpers_are_inverse() {
        let size = ImageSize::new(300, 400);
        let q = Mat2::new(-1.0, 0.0, 0.0, -1.0);
        let uv = Vec2::new(0.2, -0.7);
        let px = ndc_to_pixel(&uv, size, &q);
        assert!((pixel_to_ndc(&px, size, &q) - uv).norm() < 1e-12);
    }
}
