//! Weak-perspective parameters and the perspective ↔ weak-perspective
//! converters.
//!
//! A weak-perspective camera is an orthographic camera with an isotropic-ish
//! scale standing in for `focal / depth`. Converting from a perspective
//! camera is exact only for points at the reference depth `zmean`; away from
//! it the foreshortening the perspective divide would add is lost.

use serde::{Deserialize, Serialize};

use crate::{
    batch, convert_k_4x4_to_3x3, convert_ndc_to_screen, convert_screen_to_ndc,
    ndc_k_in_convention, ndc_k_to_reference, perspective_k, CameraError, Convention, ImageSize,
    ImageSizes, IntrinsicBatch, Mat4, Pt3, Real, Result, Vec2,
};

/// Scale and translation of a weak-perspective camera.
///
/// Projects view-space points to NDC as `scale * (xy + translation)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeakPerspectiveParams {
    pub scale_x: Real,
    pub scale_y: Real,
    pub translation_x: Real,
    pub translation_y: Real,
}

impl WeakPerspectiveParams {
    /// From a predicted `[scale_x, scale_y, transl_x, transl_y]` vector.
    pub fn from_pred_cam(pred_cam: [Real; 4]) -> Self {
        let [scale_x, scale_y, translation_x, translation_y] = pred_cam;
        Self {
            scale_x,
            scale_y,
            translation_x,
            translation_y,
        }
    }

    /// From a crop camera `[s, tx, ty]` with one shared scale.
    pub fn from_crop_cam(crop_cam: [Real; 3]) -> Self {
        let [s, tx, ty] = crop_cam;
        Self::from_pred_cam([s, s, tx, ty])
    }

    pub fn to_pred_cam(&self) -> [Real; 4] {
        [
            self.scale_x,
            self.scale_y,
            self.translation_x,
            self.translation_y,
        ]
    }

    /// Homogeneous NDC intrinsics in `convention`.
    pub fn to_k(&self, convention: &Convention) -> Result<Mat4> {
        let (sx, sy) = (self.scale_x, self.scale_y);
        let k_ref = Mat4::new(
            sx, 0.0, 0.0, sx * self.translation_x, //
            0.0, sy, 0.0, sy * self.translation_y, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        );
        ndc_k_in_convention(&k_ref, convention)
    }

    /// Read the parameters back from homogeneous NDC intrinsics.
    pub fn from_k(k: &Mat4, convention: &Convention) -> Result<Self> {
        let k_ref = ndc_k_to_reference(k, convention)?;
        let (sx, sy) = (k_ref[(0, 0)], k_ref[(1, 1)]);
        if sx == 0.0 || sy == 0.0 {
            return Err(CameraError::InvalidParameter(
                "weak-perspective scale must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            scale_x: sx,
            scale_y: sy,
            translation_x: k_ref[(0, 3)] / sx,
            translation_y: k_ref[(1, 3)] / sy,
        })
    }
}

/// Re-express a crop camera predicted on a square crop in full-image NDC.
///
/// The crop is the square of side `bbox_size` pixels centered at
/// `bbox_center`. The returned scale is relative to the full image's NDC
/// scale and the translation moves the crop center to its place in the image.
pub fn crop_cam_to_full_image(
    crop: &WeakPerspectiveParams,
    bbox_center: Vec2,
    bbox_size: Real,
    image: ImageSize,
) -> Result<WeakPerspectiveParams> {
    image.validate()?;
    if bbox_size <= 0.0 {
        return Err(CameraError::InvalidParameter(format!(
            "bbox size must be positive, got {bbox_size}"
        )));
    }
    let s_img = image.ndc_scale();
    let ratio = bbox_size / (2.0 * s_img);
    let scale_x = crop.scale_x * ratio;
    let scale_y = crop.scale_y * ratio;
    let offset = bbox_center - image.center();
    Ok(WeakPerspectiveParams {
        scale_x,
        scale_y,
        translation_x: crop.translation_x + offset.x / (s_img * scale_x),
        translation_y: crop.translation_y + offset.y / (s_img * scale_y),
    })
}

/// Weak-perspective projection `scale * (xy + translation)` of one point set.
pub fn weak_perspective_projection(
    points: &[Pt3],
    scale: Real,
    translation: Vec2,
) -> Vec<Vec2> {
    points
        .iter()
        .map(|p| (p.xy().coords + translation) * scale)
        .collect()
}

fn resolve_zmean(zmean: Option<&[Real]>, n: usize) -> Result<Vec<Real>> {
    let zmean = zmean.ok_or_else(|| {
        CameraError::missing("zmean", "weak-perspective conversion needs a reference depth")
    })?;
    if zmean.is_empty() {
        return Err(CameraError::missing("zmean", "no reference depth supplied"));
    }
    if let Some(bad) = zmean.iter().find(|z| !(z.is_finite() && **z > 0.0)) {
        return Err(CameraError::missing(
            "zmean",
            format!("reference depth must be positive, got {bad}"),
        ));
    }
    batch::broadcast("zmean", zmean, n)
}

/// Approximate perspective intrinsics by weak-perspective ones.
///
/// `s = f / zmean` per axis; the principal point becomes the NDC translation.
/// Screen input (`in_ndc == false`) is first re-expressed in NDC, which needs
/// `resolution`. The result is always NDC, in the input's shape (compact
/// input comes back in the orthographic compact layout).
pub fn convert_perspective_to_weakperspective(
    k: &IntrinsicBatch,
    zmean: Option<&[Real]>,
    in_ndc: bool,
    resolution: Option<&ImageSizes>,
    convention: &Convention,
) -> Result<IntrinsicBatch> {
    let zmean = resolve_zmean(zmean, k.len())?;
    let k_ndc = if in_ndc {
        k.clone()
    } else {
        convert_screen_to_ndc(k, resolution, true, convention)?
    };
    let sz = convention.forward_sign()?;

    let weak = k_ndc
        .to_homogeneous(true)
        .iter()
        .zip(&zmean)
        .map(|(k, zm)| {
            let k_ref = ndc_k_to_reference(k, convention)?;
            let w = Mat4::new(
                k_ref[(0, 0)] / zm, k_ref[(0, 1)] / zm, 0.0, k_ref[(0, 2)], //
                0.0, k_ref[(1, 1)] / zm, 0.0, k_ref[(1, 2)], //
                0.0, 0.0, sz, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            );
            Ok(w)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(if k.is_compact() {
        IntrinsicBatch::Compact(convert_k_4x4_to_3x3(&weak, false))
    } else {
        IntrinsicBatch::Homogeneous(weak)
    })
}

/// Approximate inverse of [`convert_perspective_to_weakperspective`].
///
/// `f = s * zmean` per axis; the NDC translation becomes the principal point.
/// The weak input is NDC; the output is NDC, or screen when `in_ndc` is
/// false (which needs `resolution`).
pub fn convert_weakperspective_to_perspective(
    k: &IntrinsicBatch,
    zmean: Option<&[Real]>,
    in_ndc: bool,
    resolution: Option<&ImageSizes>,
    convention: &Convention,
) -> Result<IntrinsicBatch> {
    let zmean = resolve_zmean(zmean, k.len())?;
    if !in_ndc {
        resolution
            .ok_or_else(|| CameraError::missing("resolution", "screen output needs an image size"))?
            .check_len(k.len())?;
    }

    let persp = k
        .to_homogeneous(false)
        .iter()
        .zip(&zmean)
        .map(|(k, zm)| {
            let k_ref = ndc_k_to_reference(k, convention)?;
            let mut p = perspective_k(
                k_ref[(0, 0)] * zm,
                k_ref[(1, 1)] * zm,
                k_ref[(0, 3)],
                k_ref[(1, 3)],
            );
            p[(0, 1)] = k_ref[(0, 1)] * zm;
            ndc_k_in_convention(&p, convention)
        })
        .collect::<Result<Vec<_>>>()?;

    let persp = if k.is_compact() {
        IntrinsicBatch::Compact(convert_k_4x4_to_3x3(&persp, true))
    } else {
        IntrinsicBatch::Homogeneous(persp)
    };
    if in_ndc {
        Ok(persp)
    } else {
        convert_ndc_to_screen(&persp, resolution, true, convention)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{screen_k_in_convention, ConventionRegistry, Vec3, Vec4};

    fn homogeneous(batch: IntrinsicBatch) -> Vec<Mat4> {
        match batch {
            IntrinsicBatch::Homogeneous(k) => k,
            IntrinsicBatch::Compact(_) => panic!("expected homogeneous batch"),
        }
    }

    #[test]
    fn pred_cam_layout() {
        let cv = ConventionRegistry::builtin().get("opencv").unwrap();
        let k = WeakPerspectiveParams::from_pred_cam([2.0, 2.0, 0.1, 0.1])
            .to_k(cv)
            .unwrap();
        assert_eq!(k[(0, 0)], 2.0);
        assert_eq!(k[(1, 1)], 2.0);
        assert!((k[(0, 3)] - 0.2).abs() < 1e-12);
        assert!((k[(1, 3)] - 0.2).abs() < 1e-12);
        assert_eq!(k[(2, 2)], 1.0);
        assert_eq!(k[(3, 3)], 1.0);
    }

    #[test]
    fn params_roundtrip_through_k() {
        let registry = ConventionRegistry::builtin();
        let params = WeakPerspectiveParams::from_pred_cam([1.5, 0.5, -0.2, 0.3]);
        for name in registry.names() {
            let conv = registry.get(name).unwrap();
            let back = WeakPerspectiveParams::from_k(&params.to_k(conv).unwrap(), conv).unwrap();
            assert!((back.translation_x - params.translation_x).abs() < 1e-12, "{name}");
            assert_eq!(back.to_pred_cam()[0], 1.5);
        }
    }

    #[test]
    fn missing_or_bad_zmean_is_reported() {
        let cv = ConventionRegistry::builtin().get("opencv").unwrap();
        let k = IntrinsicBatch::Homogeneous(vec![perspective_k(1.0, 1.0, 0.0, 0.0)]);
        for zmean in [None, Some(&[][..]), Some(&[0.0][..]), Some(&[-2.0][..])] {
            let err =
                convert_perspective_to_weakperspective(&k, zmean, true, None, cv).unwrap_err();
            assert!(matches!(err, CameraError::MissingParameter { name: "zmean", .. }));
        }
    }

    #[test]
    fn weak_matches_perspective_at_reference_depth() {
        let registry = ConventionRegistry::builtin();
        let cv = registry.get("opencv").unwrap();
        for name in registry.names() {
            let conv = registry.get(name).unwrap();
            let m = cv.change_of_basis_to(conv);
            let k = IntrinsicBatch::Homogeneous(vec![ndc_k_in_convention(
                &perspective_k(1.8, 1.6, 0.1, -0.05),
                conv,
            )
            .unwrap()]);
            let weak = homogeneous(
                convert_perspective_to_weakperspective(&k, Some(&[4.0]), true, None, conv).unwrap(),
            );
            let persp = homogeneous(k);

            let p = m * Vec3::new(0.3, -0.4, 4.0);
            let h = Vec4::new(p.x, p.y, p.z, 1.0);
            let a = persp[0] * h;
            let b = weak[0] * h;
            assert!((a.x / a.w - b.x).abs() < 1e-12, "{name}");
            assert!((a.y / a.w - b.y).abs() < 1e-12, "{name}");
        }
    }

    #[test]
    fn weak_to_perspective_inverts_at_same_zmean() {
        let registry = ConventionRegistry::builtin();
        let size = ImageSizes::Shared(ImageSize::new(480, 640));
        for name in registry.names() {
            let conv = registry.get(name).unwrap();
            let pixel = screen_k_in_convention(&perspective_k(600.0, 600.0, 300.0, 250.0), conv);
            let k = IntrinsicBatch::Homogeneous(vec![pixel]);
            let weak =
                convert_perspective_to_weakperspective(&k, Some(&[3.0]), false, Some(&size), conv)
                    .unwrap();
            let back = convert_weakperspective_to_perspective(
                &weak,
                Some(&[3.0]),
                false,
                Some(&size),
                conv,
            )
            .unwrap();
            let back = homogeneous(back);
            assert!((back[0] - pixel).abs().max() < 1e-9, "{name}");
        }
    }

    #[test]
    fn screen_input_requires_resolution() {
        let cv = ConventionRegistry::builtin().get("opencv").unwrap();
        let k = IntrinsicBatch::Homogeneous(vec![perspective_k(500.0, 500.0, 320.0, 240.0)]);
        let err = convert_perspective_to_weakperspective(&k, Some(&[2.0]), false, None, cv)
            .unwrap_err();
        assert!(matches!(err, CameraError::MissingParameter { name: "resolution", .. }));
    }

    #[test]
    fn crop_cam_maps_bbox_to_full_image() {
        let image = ImageSize::new(1000, 1000);
        let crop = WeakPerspectiveParams::from_crop_cam([1.0, 0.0, 0.0]);

        // A crop covering the whole image is the identity.
        let full =
            crop_cam_to_full_image(&crop, Vec2::new(500.0, 500.0), 1000.0, image).unwrap();
        assert_eq!(full, crop);

        // A quarter-size crop in the upper-left quadrant.
        let full = crop_cam_to_full_image(&crop, Vec2::new(250.0, 250.0), 500.0, image).unwrap();
        assert!((full.scale_x - 0.5).abs() < 1e-12);
        let translation = Vec2::new(full.translation_x, full.translation_y);
        let center = weak_perspective_projection(&[Pt3::origin()], full.scale_x, translation);
        // NDC of the crop center in full-image (right, down) screen axes.
        assert!((center[0].x + 0.5).abs() < 1e-12);
        assert!((center[0].y + 0.5).abs() < 1e-12);

        assert!(crop_cam_to_full_image(&crop, Vec2::zeros(), 0.0, image).is_err());
    }

    #[test]
    fn projection_scales_shifted_points() {
        let pts = [Pt3::new(1.0, 2.0, 9.0)];
        let uv = weak_perspective_projection(&pts, 2.0, Vec2::new(0.5, -1.0));
        assert_eq!(uv[0], Vec2::new(3.0, 2.0));
    }
}
