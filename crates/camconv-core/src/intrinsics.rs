//! Intrinsic matrix formats and the converters between them.
//!
//! Intrinsics are stored in column-vector form. The 4×4 homogeneous form
//! acts on `[x, y, z, 1]` in camera coordinates:
//!
//! ```text
//! perspective                 orthographic
//! [ fx  0  px  0 ]            [ fx  0  0  px ]
//! [  0 fy  py  0 ]            [  0 fy  0  py ]
//! [  0  0   0  1 ]            [  0  0  1   0 ]
//! [  0  0   1  0 ]            [  0  0  0   1 ]
//! ```
//!
//! written for a camera whose +Z looks forward. Conventions that look down
//! −Z negate column 2. The perspective output is divided by its last row
//! (the forward depth); the orthographic output is used as is.
//!
//! The compact 3×3 form keeps rows 0–1 and stores the homogeneous row 3
//! (perspective) or the depth pass-through `[2, 2]` (orthographic) in its
//! last row.

use log::trace;

use crate::{
    batch, pad_mat2, pad_mat3, CameraError, Convention, ImageSize, ImageSizes, Mat2, Mat3, Mat4,
    Real, Result, Vec4,
};

/// A batch of intrinsic matrices, all compact (3×3) or all homogeneous (4×4).
#[derive(Clone, Debug, PartialEq)]
pub enum IntrinsicBatch {
    Compact(Vec<Mat3>),
    Homogeneous(Vec<Mat4>),
}

impl IntrinsicBatch {
    pub fn len(&self) -> usize {
        match self {
            Self::Compact(k) => k.len(),
            Self::Homogeneous(k) => k.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_compact(&self) -> bool {
        matches!(self, Self::Compact(_))
    }

    /// Validate a raw `N × 3 × 3` or `N × 4 × 4` array.
    pub fn from_nested(raw: &[Vec<Vec<Real>>]) -> Result<Self> {
        let dim = raw.first().map_or(4, Vec::len);
        if dim != 3 && dim != 4 {
            return Err(CameraError::shape("K", "3x3 or 4x4 matrices", format!("{dim} rows")));
        }
        let mut flat = Vec::with_capacity(raw.len());
        for (b, m) in raw.iter().enumerate() {
            if m.len() != dim || m.iter().any(|row| row.len() != dim) {
                let cols = m.iter().map(Vec::len).max().unwrap_or(0);
                return Err(CameraError::shape(
                    format!("K[{b}]"),
                    format!("{dim}x{dim}"),
                    format!("{}x{}", m.len(), cols),
                ));
            }
            flat.push(m.iter().flatten().copied().collect::<Vec<_>>());
        }
        Ok(if dim == 3 {
            Self::Compact(flat.iter().map(|v| Mat3::from_row_slice(v)).collect())
        } else {
            Self::Homogeneous(flat.iter().map(|v| Mat4::from_row_slice(v)).collect())
        })
    }

    /// All matrices in homogeneous form.
    pub fn to_homogeneous(&self, is_perspective: bool) -> Vec<Mat4> {
        match self {
            Self::Compact(k) => convert_k_3x3_to_4x4(k, is_perspective),
            Self::Homogeneous(k) => k.clone(),
        }
    }

    /// All matrices in compact form.
    pub fn to_compact(&self, is_perspective: bool) -> Vec<Mat3> {
        match self {
            Self::Compact(k) => k.clone(),
            Self::Homogeneous(k) => convert_k_4x4_to_3x3(k, is_perspective),
        }
    }

    /// Sub-select the matrices at `indices`.
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        Ok(match self {
            Self::Compact(k) => Self::Compact(batch::gather(k, indices)?),
            Self::Homogeneous(k) => Self::Homogeneous(batch::gather(k, indices)?),
        })
    }

    /// Apply `f` to every matrix in homogeneous form, keeping the batch's shape.
    pub fn map_homogeneous<F>(&self, is_perspective: bool, mut f: F) -> Result<Self>
    where
        F: FnMut(usize, &Mat4) -> Result<Mat4>,
    {
        let mapped = self
            .to_homogeneous(is_perspective)
            .iter()
            .enumerate()
            .map(|(i, k)| f(i, k))
            .collect::<Result<Vec<_>>>()?;
        Ok(if self.is_compact() {
            Self::Compact(convert_k_4x4_to_3x3(&mapped, is_perspective))
        } else {
            Self::Homogeneous(mapped)
        })
    }
}

impl From<Vec<Mat3>> for IntrinsicBatch {
    fn from(k: Vec<Mat3>) -> Self {
        Self::Compact(k)
    }
}

impl From<Vec<Mat4>> for IntrinsicBatch {
    fn from(k: Vec<Mat4>) -> Self {
        Self::Homogeneous(k)
    }
}

/// Perspective intrinsics in the reference (Z forward) frame.
pub fn perspective_k(fx: Real, fy: Real, px: Real, py: Real) -> Mat4 {
    Mat4::new(
        fx, 0.0, px, 0.0, //
        0.0, fy, py, 0.0, //
        0.0, 0.0, 0.0, 1.0, //
        0.0, 0.0, 1.0, 0.0,
    )
}

/// Orthographic intrinsics in the reference (Z forward) frame.
pub fn orthographic_k(fx: Real, fy: Real, px: Real, py: Real) -> Mat4 {
    Mat4::new(
        fx, 0.0, 0.0, px, //
        0.0, fy, 0.0, py, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    )
}

/// Re-express an NDC matrix written for a Z-forward camera in `convention`.
///
/// NDC stays measured along the convention's own camera X and Y.
pub fn ndc_k_in_convention(k_ref: &Mat4, convention: &Convention) -> Result<Mat4> {
    let sz = convention.forward_sign()?;
    Ok(k_ref * Mat4::from_diagonal(&Vec4::new(1.0, 1.0, sz, 1.0)))
}

/// Recover the Z-forward reference form of an NDC matrix in `convention`.
pub fn ndc_k_to_reference(k: &Mat4, convention: &Convention) -> Result<Mat4> {
    // The z flip is an involution.
    ndc_k_in_convention(k, convention)
}

/// Re-express a pixel-space matrix written in the (right, down, forward)
/// frame in `convention`, so that projecting yields pixels directly.
pub fn screen_k_in_convention(k_screen: &Mat4, convention: &Convention) -> Mat4 {
    k_screen * pad_mat3(&convention.to_screen_frame())
}

/// Compact 3×3 → homogeneous 4×4.
pub fn k_3x3_to_4x4(k: &Mat3, is_perspective: bool) -> Mat4 {
    let mut out = Mat4::zeros();
    if is_perspective {
        for j in 0..3 {
            out[(0, j)] = k[(0, j)];
            out[(1, j)] = k[(1, j)];
            out[(3, j)] = k[(2, j)];
        }
        out[(2, 3)] = 1.0;
    } else {
        for i in 0..2 {
            out[(i, 0)] = k[(i, 0)];
            out[(i, 1)] = k[(i, 1)];
            out[(i, 3)] = k[(i, 2)];
        }
        for j in 0..3 {
            out[(2, j)] = k[(2, j)];
        }
        out[(3, 3)] = 1.0;
    }
    out
}

/// Homogeneous 4×4 → compact 3×3, the exact inverse of [`k_3x3_to_4x4`].
pub fn k_4x4_to_3x3(k: &Mat4, is_perspective: bool) -> Mat3 {
    let mut out = Mat3::zeros();
    if is_perspective {
        for j in 0..3 {
            out[(0, j)] = k[(0, j)];
            out[(1, j)] = k[(1, j)];
            out[(2, j)] = k[(3, j)];
        }
    } else {
        for i in 0..2 {
            out[(i, 0)] = k[(i, 0)];
            out[(i, 1)] = k[(i, 1)];
            out[(i, 2)] = k[(i, 3)];
        }
        for j in 0..3 {
            out[(2, j)] = k[(2, j)];
        }
    }
    out
}

/// Batch form of [`k_3x3_to_4x4`].
pub fn convert_k_3x3_to_4x4(k: &[Mat3], is_perspective: bool) -> Vec<Mat4> {
    k.iter().map(|k| k_3x3_to_4x4(k, is_perspective)).collect()
}

/// Batch form of [`k_4x4_to_3x3`].
pub fn convert_k_4x4_to_3x3(k: &[Mat4], is_perspective: bool) -> Vec<Mat3> {
    k.iter().map(|k| k_4x4_to_3x3(k, is_perspective)).collect()
}

/// Re-express one NDC matrix in pixels.
///
/// Rows 0–1 become `c ⊗ K[3, :] + s · Q · K[0..2, :]` with `s` the NDC scale
/// and `c` the image center; rows 2–3 are unchanged.
pub fn ndc_to_screen_matrix(k: &Mat4, size: ImageSize, image_axes: &Mat2) -> Mat4 {
    let s = size.ndc_scale();
    let c = size.center();
    let top = c * k.row(3) + image_axes * k.fixed_view::<2, 4>(0, 0) * s;
    let mut out = *k;
    out.fixed_view_mut::<2, 4>(0, 0).copy_from(&top);
    out
}

/// Exact inverse of [`ndc_to_screen_matrix`].
pub fn screen_to_ndc_matrix(k: &Mat4, size: ImageSize, image_axes: &Mat2) -> Mat4 {
    let s = size.ndc_scale();
    let c = size.center();
    let centered = k.fixed_view::<2, 4>(0, 0) - c * k.row(3);
    let top = image_axes.transpose() * centered / s;
    let mut out = *k;
    out.fixed_view_mut::<2, 4>(0, 0).copy_from(&top);
    out
}

fn require_resolution<'a>(
    resolution: Option<&'a ImageSizes>,
    n: usize,
    reason: &str,
) -> Result<&'a ImageSizes> {
    let resolution = resolution.ok_or_else(|| CameraError::missing("resolution", reason))?;
    resolution.check_len(n)?;
    Ok(resolution)
}

/// Convert NDC intrinsics to screen (pixel) intrinsics.
///
/// Compact input is reshaped with `is_perspective` and returned compact.
pub fn convert_ndc_to_screen(
    k: &IntrinsicBatch,
    resolution: Option<&ImageSizes>,
    is_perspective: bool,
    convention: &Convention,
) -> Result<IntrinsicBatch> {
    let resolution = require_resolution(resolution, k.len(), "NDC to screen needs an image size")?;
    let q = convention.image_axes()?;
    trace!("ndc -> screen for {} camera(s) in `{}`", k.len(), convention.name());
    k.map_homogeneous(is_perspective, |i, k| {
        Ok(ndc_to_screen_matrix(k, resolution.get(i)?, &q))
    })
}

/// Convert screen (pixel) intrinsics to NDC intrinsics.
pub fn convert_screen_to_ndc(
    k: &IntrinsicBatch,
    resolution: Option<&ImageSizes>,
    is_perspective: bool,
    convention: &Convention,
) -> Result<IntrinsicBatch> {
    let resolution = require_resolution(resolution, k.len(), "screen to NDC needs an image size")?;
    let q = convention.image_axes()?;
    trace!("screen -> ndc for {} camera(s) in `{}`", k.len(), convention.name());
    k.map_homogeneous(is_perspective, |i, k| {
        Ok(screen_to_ndc_matrix(k, resolution.get(i)?, &q))
    })
}

/// Re-express screen intrinsics for a different image resolution.
pub fn rescale_screen(
    k: &IntrinsicBatch,
    from: &ImageSizes,
    to: &ImageSizes,
    is_perspective: bool,
    convention: &Convention,
) -> Result<IntrinsicBatch> {
    from.check_len(k.len())?;
    to.check_len(k.len())?;
    let q = convention.image_axes()?;
    k.map_homogeneous(is_perspective, |i, k| {
        let ndc = screen_to_ndc_matrix(k, from.get(i)?, &q);
        Ok(ndc_to_screen_matrix(&ndc, to.get(i)?, &q))
    })
}

/// Re-express intrinsics for cameras whose axes follow `dst` instead of `src`.
///
/// `K' = L · K · pad(Mᵀ)` with `M` the change of basis. In NDC, `L`
/// re-orients the output axes so that NDC stays measured along the
/// destination's camera X and Y; pixel outputs need no re-orientation.
pub fn convert_k_axes(
    k: &IntrinsicBatch,
    is_perspective: bool,
    src: &Convention,
    dst: &Convention,
    in_ndc: bool,
) -> Result<IntrinsicBatch> {
    let m = src.change_of_basis_to(dst);
    let right = pad_mat3(&m.transpose());
    let left = if in_ndc {
        pad_mat2(&(dst.image_axes()?.transpose() * src.image_axes()?))
    } else {
        Mat4::identity()
    };
    trace!(
        "intrinsic axes `{}` -> `{}` ({})",
        src.name(),
        dst.name(),
        if in_ndc { "ndc" } else { "screen" }
    );
    k.map_homogeneous(is_perspective, |_, k| Ok(left * k * right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConventionRegistry, Vec3};

    fn project(k: &Mat4, p: Vec3, is_perspective: bool) -> (Real, Real) {
        let h = k * crate::to_homogeneous(&p);
        if is_perspective {
            (h.x / h.w, h.y / h.w)
        } else {
            (h.x, h.y)
        }
    }

    #[test]
    fn compact_roundtrip_is_exact_for_both_layouts() {
        let k3 = Mat3::new(800.0, 0.5, 640.0, 0.0, 780.0, 360.0, 0.0, 0.0, 1.0);
        for is_perspective in [true, false] {
            let k4 = k_3x3_to_4x4(&k3, is_perspective);
            assert_eq!(k_4x4_to_3x3(&k4, is_perspective), k3);
        }

        let persp = perspective_k(2.0, 3.0, 0.1, -0.2);
        assert_eq!(k_3x3_to_4x4(&k_4x4_to_3x3(&persp, true), true), persp);
        let ortho = orthographic_k(2.0, 3.0, 0.1, -0.2);
        assert_eq!(k_3x3_to_4x4(&k_4x4_to_3x3(&ortho, false), false), ortho);
    }

    #[test]
    fn layouts_place_the_homogeneous_one_differently() {
        let k3 = Mat3::new(1.0, 0.0, 0.5, 0.0, 1.0, 0.5, 0.0, 0.0, 1.0);
        let persp = k_3x3_to_4x4(&k3, true);
        let ortho = k_3x3_to_4x4(&k3, false);
        assert_eq!(persp, perspective_k(1.0, 1.0, 0.5, 0.5));
        assert_eq!(ortho, orthographic_k(1.0, 1.0, 0.5, 0.5));
    }

    #[test]
    fn ndc_to_screen_matches_pixel_intrinsics_in_opencv() {
        let cv = ConventionRegistry::builtin().get("opencv").unwrap();
        let size = ImageSize::new(480, 640);
        let ndc = perspective_k(1.5, 1.5, 0.1, -0.2);
        let screen = ndc_to_screen_matrix(&ndc, size, &cv.image_axes().unwrap());
        // s = 240, c = (320, 240)
        assert!((screen[(0, 0)] - 360.0).abs() < 1e-12);
        assert!((screen[(1, 1)] - 360.0).abs() < 1e-12);
        assert!((screen[(0, 2)] - (320.0 + 24.0)).abs() < 1e-12);
        assert!((screen[(1, 2)] - (240.0 - 48.0)).abs() < 1e-12);
    }

    #[test]
    fn pytorch3d_principal_point_flips_sign() {
        let p3d = ConventionRegistry::builtin().get("pytorch3d").unwrap();
        let size = ImageSize::new(100, 100);
        let q = p3d.image_axes().unwrap();
        let screen = ndc_to_screen_matrix(&perspective_k(1.0, 1.0, 0.2, 0.0), size, &q);
        // +X points left, so a positive NDC offset moves the center left.
        assert!((screen[(0, 2)] - 40.0).abs() < 1e-12);
        assert!((screen[(0, 0)] + 50.0).abs() < 1e-12);
    }

    #[test]
    fn ndc_screen_roundtrip_for_every_builtin() {
        let registry = ConventionRegistry::builtin();
        let sizes = ImageSizes::PerCamera(vec![ImageSize::new(480, 640), ImageSize::new(300, 200)]);
        for name in registry.names() {
            let conv = registry.get(name).unwrap();
            let ndc = IntrinsicBatch::Homogeneous(vec![
                ndc_k_in_convention(&perspective_k(1.2, 1.1, 0.05, -0.1), conv).unwrap(),
                ndc_k_in_convention(&perspective_k(2.0, 2.0, 0.0, 0.3), conv).unwrap(),
            ]);
            let screen = convert_ndc_to_screen(&ndc, Some(&sizes), true, conv).unwrap();
            let back = convert_screen_to_ndc(&screen, Some(&sizes), true, conv).unwrap();
            let (IntrinsicBatch::Homogeneous(a), IntrinsicBatch::Homogeneous(b)) = (&ndc, &back)
            else {
                panic!("shape changed");
            };
            for (a, b) in a.iter().zip(b) {
                assert!((a - b).abs().max() < 1e-12, "{name}");
            }
        }
    }

    #[test]
    fn compact_input_stays_compact() {
        let cv = ConventionRegistry::builtin().get("opencv").unwrap();
        let k = IntrinsicBatch::Compact(vec![Mat3::identity()]);
        let size = ImageSizes::Shared(ImageSize::new(200, 200));
        let screen = convert_ndc_to_screen(&k, Some(&size), false, cv).unwrap();
        let IntrinsicBatch::Compact(m) = screen else {
            panic!("expected compact output");
        };
        assert_eq!(m[0], Mat3::new(100.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn missing_resolution_is_reported() {
        let cv = ConventionRegistry::builtin().get("opencv").unwrap();
        let k = IntrinsicBatch::Homogeneous(vec![perspective_k(1.0, 1.0, 0.0, 0.0)]);
        let err = convert_ndc_to_screen(&k, None, true, cv).unwrap_err();
        assert!(matches!(err, CameraError::MissingParameter { name: "resolution", .. }));
        let err = convert_screen_to_ndc(&k, None, true, cv).unwrap_err();
        assert!(matches!(err, CameraError::MissingParameter { name: "resolution", .. }));
    }

    #[test]
    fn screen_and_ndc_projection_agree() {
        let registry = ConventionRegistry::builtin();
        let size = ImageSize::new(480, 640);
        let p_ref = Vec3::new(0.3, -0.2, 4.0);
        for name in registry.names() {
            let conv = registry.get(name).unwrap();
            let q = conv.image_axes().unwrap();
            // Express the same physical point in this convention.
            let to_conv = registry.get("opencv").unwrap().change_of_basis_to(conv);
            let p = to_conv * p_ref;
            for is_perspective in [true, false] {
                let k_ref = if is_perspective {
                    perspective_k(1.3, 1.2, 0.1, 0.05)
                } else {
                    orthographic_k(0.3, 0.3, 0.1, 0.05)
                };
                let ndc = ndc_k_in_convention(&k_ref, conv).unwrap();
                let screen = ndc_to_screen_matrix(&ndc, size, &q);
                let (nx, ny) = project(&ndc, p, is_perspective);
                let expected =
                    size.center() + q * nalgebra::Vector2::new(nx, ny) * size.ndc_scale();
                let (sx, sy) = project(&screen, p, is_perspective);
                assert!((sx - expected.x).abs() < 1e-9, "{name}");
                assert!((sy - expected.y).abs() < 1e-9, "{name}");
            }
        }
    }

    #[test]
    fn axis_conversion_preserves_ndc_up_to_orientation() {
        let registry = ConventionRegistry::builtin();
        let cv = registry.get("opencv").unwrap();
        let gl = registry.get("opengl").unwrap();
        let k = IntrinsicBatch::Homogeneous(vec![perspective_k(1.5, 1.4, 0.1, 0.2)]);
        let converted = convert_k_axes(&k, true, cv, gl, true).unwrap();
        let IntrinsicBatch::Homogeneous(k_gl) = converted else {
            panic!("shape changed");
        };
        let expected = ndc_k_in_convention(&perspective_k(1.5, 1.4, 0.1, -0.2), gl).unwrap();
        assert!((k_gl[0] - expected).abs().max() < 1e-12);
    }

    #[test]
    fn screen_axis_conversion_matches_pixel_construction() {
        let registry = ConventionRegistry::builtin();
        let cv = registry.get("opencv").unwrap();
        let size = ImageSize::new(480, 640);
        let pixel_k = perspective_k(500.0, 500.0, 320.0, 240.0);
        for name in registry.names() {
            let conv = registry.get(name).unwrap();
            let k_cv = IntrinsicBatch::Homogeneous(vec![screen_k_in_convention(&pixel_k, cv)]);
            let converted = convert_k_axes(&k_cv, true, cv, conv, false).unwrap();
            let IntrinsicBatch::Homogeneous(k) = converted else {
                panic!("shape changed");
            };
            let direct = screen_k_in_convention(&pixel_k, conv);
            assert!((k[0] - direct).abs().max() < 1e-12, "{name}");

            // And the NDC construction lands on the same pixel matrix.
            let ndc = screen_to_ndc_matrix(&direct, size, &conv.image_axes().unwrap());
            let again = ndc_to_screen_matrix(&ndc, size, &conv.image_axes().unwrap());
            assert!((again - direct).abs().max() < 1e-9, "{name}");
        }
    }

    #[test]
    fn nested_arrays_are_shape_checked() {
        let k3 = vec![vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]]];
        assert!(IntrinsicBatch::from_nested(&k3).unwrap().is_compact());

        let ragged = vec![vec![vec![1.0, 0.0], vec![0.0, 1.0]]];
        assert!(matches!(
            IntrinsicBatch::from_nested(&ragged),
            Err(CameraError::ShapeMismatch { .. })
        ));

        let mixed = vec![k3[0].clone(), vec![vec![0.0; 4]; 4]];
        assert!(IntrinsicBatch::from_nested(&mixed).is_err());
    }
}
