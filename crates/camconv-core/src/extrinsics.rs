//! Extrinsic poses: axis re-expression, world/view inversion and camera
//! placement.
//!
//! Rotations are stored on the side their convention declares. Internally
//! every formula runs on column-vector rotations (`X_view = R · X + T`) and
//! converts back before returning.

use log::debug;

use crate::{batch, CameraError, Convention, Mat3, MatrixSide, Pt3, Real, Result, Vec3};

/// Invert a column-vector pose: `(Rᵀ, −Rᵀ·T)`.
///
/// Converts between "world points in the camera frame" and "camera pose in
/// the world frame". Applying it twice returns the input.
pub fn invert_pose(r: &Mat3, t: &Vec3) -> (Mat3, Vec3) {
    let rt = r.transpose();
    (rt, -(rt * t))
}

/// Batch world↔view inversion for rotations stored on `side`.
pub fn convert_world_view(
    r: &[Mat3],
    t: &[Vec3],
    side: MatrixSide,
) -> Result<(Vec<Mat3>, Vec<Vec3>)> {
    if r.len() != t.len() {
        return Err(CameraError::shape("batch length of T", r.len(), t.len()));
    }
    Ok(r.iter()
        .zip(t)
        .map(|(r, t)| {
            let (r_inv, t_inv) = invert_pose(&side.to_column(r), t);
            (side.from_column(&r_inv), t_inv)
        })
        .unzip())
}

/// Axis re-expression without defaults: absent inputs stay absent.
pub(crate) fn convert_extrinsic_parts(
    r: Option<&[Mat3]>,
    t: Option<&[Vec3]>,
    src: &Convention,
    dst: &Convention,
) -> Result<(Option<Vec<Mat3>>, Option<Vec<Vec3>>)> {
    batch::common_len(&[("R", r.map(<[_]>::len)), ("T", t.map(<[_]>::len))])?;
    let m = src.change_of_basis_to(dst);
    let mt = m.transpose();
    debug!(
        "extrinsics `{}` -> `{}` ({:?} -> {:?})",
        src.name(),
        dst.name(),
        src.side(),
        dst.side()
    );
    let r = r.map(|r| {
        r.iter()
            .map(|r| dst.side().from_column(&(m * src.side().to_column(r) * mt)))
            .collect()
    });
    let t = t.map(|t| t.iter().map(|t| m * t).collect());
    Ok((r, t))
}

/// Re-express extrinsics from `src` axes/side into `dst` axes/side.
///
/// `R' = M·R·Mᵀ`, `T' = M·T` with `M` the change of basis. A missing `R`
/// becomes the identity and a missing `T` becomes zero, one per camera of
/// the common batch length.
pub fn convert_extrinsic(
    r: Option<&[Mat3]>,
    t: Option<&[Vec3]>,
    src: &Convention,
    dst: &Convention,
) -> Result<(Vec<Mat3>, Vec<Vec3>)> {
    let n = batch::common_len(&[("R", r.map(<[_]>::len)), ("T", t.map(<[_]>::len))])?;
    let (r, t) = convert_extrinsic_parts(r, t, src, dst)?;
    Ok((
        r.unwrap_or_else(|| vec![Mat3::identity(); n]),
        t.unwrap_or_else(|| vec![Vec3::zeros(); n]),
    ))
}

/// Re-express scene points from `src` axes into `dst` axes.
pub fn convert_points(points: &[Pt3], src: &Convention, dst: &Convention) -> Vec<Pt3> {
    let m = src.change_of_basis_to(dst);
    points.iter().map(|p| Pt3::from(m * p.coords)).collect()
}

/// Camera center in world coordinates, `−Rᵀ·T` in column form.
pub fn camera_center(r: &Mat3, t: &Vec3, side: MatrixSide) -> Pt3 {
    let (_, center) = invert_pose(&side.to_column(r), t);
    Pt3::from(center)
}

/// World-to-view pose of a camera at `eye` looking at `at`.
///
/// `eye`, `at` and `up` are expressed in the scene frame of `convention`;
/// the returned rotation is stored on the convention's side.
pub fn look_at_view_transform(
    eye: &Pt3,
    at: &Pt3,
    up: &Vec3,
    convention: &Convention,
) -> Result<(Mat3, Vec3)> {
    let backward = eye - at;
    let dist = backward.norm();
    if dist <= Real::EPSILON {
        return Err(CameraError::InvalidParameter(
            "look-at eye and target coincide".to_string(),
        ));
    }
    let backward = backward / dist;

    let up_ortho = up - backward * up.dot(&backward);
    let up_norm = up_ortho.norm();
    if up_norm <= Real::EPSILON {
        return Err(CameraError::InvalidParameter(
            "look-at up vector is parallel to the viewing direction".to_string(),
        ));
    }
    let up_ortho = up_ortho / up_norm;

    let right = if convention.axes().is_right_handed() {
        up_ortho.cross(&backward)
    } else {
        backward.cross(&up_ortho)
    };

    // Rows map a world displacement onto the camera's semantic axes.
    let semantic = Mat3::from_rows(&[
        right.transpose(),
        up_ortho.transpose(),
        backward.transpose(),
    ]);
    let r = convention.basis().transpose() * semantic;
    let t = -(r * eye.coords);
    Ok((convention.side().from_column(&r), t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{synthetic, ConventionRegistry};

    fn max_abs(m: &Mat3) -> Real {
        m.abs().max()
    }

    #[test]
    fn invert_pose_is_self_inverse() {
        let rs = synthetic::random_rotations(8, 7);
        let ts = synthetic::random_translations(8, 11, 3.0);
        for (r, t) in rs.iter().zip(&ts) {
            let (ri, ti) = invert_pose(r, t);
            let (rr, tt) = invert_pose(&ri, &ti);
            assert!(max_abs(&(rr - r)) < 1e-12);
            assert!((tt - t).norm() < 1e-12);
        }
    }

    #[test]
    fn world_view_honours_row_side() {
        let rs = synthetic::random_rotations(3, 1);
        let ts = synthetic::random_translations(3, 2, 1.0);
        let stored: Vec<Mat3> = rs.iter().map(|r| r.transpose()).collect();
        let (inv_r, inv_t) = convert_world_view(&stored, &ts, MatrixSide::Right).unwrap();
        for i in 0..3 {
            let x = Vec3::new(0.3, -1.0, 2.0);
            // Row form: X_view = X·R + T, so the inverse maps back.
            let view = (x.transpose() * stored[i]).transpose() + ts[i];
            let back = (view.transpose() * inv_r[i]).transpose() + inv_t[i];
            assert!((back - x).norm() < 1e-12);
        }
    }

    #[test]
    fn world_view_rejects_length_mismatch() {
        let err = convert_world_view(&[Mat3::identity()], &[], MatrixSide::Left).unwrap_err();
        assert!(matches!(err, CameraError::ShapeMismatch { .. }));
    }

    #[test]
    fn extrinsic_roundtrip_across_builtins() {
        let registry = ConventionRegistry::builtin();
        let rs = synthetic::random_rotations(5, 3);
        let ts = synthetic::random_translations(5, 4, 2.0);
        for a in registry.names() {
            for b in registry.names() {
                let (ca, cb) = (registry.get(a).unwrap(), registry.get(b).unwrap());
                let (r1, t1) = convert_extrinsic(Some(&rs), Some(&ts), ca, cb).unwrap();
                let (r2, t2) = convert_extrinsic(Some(&r1), Some(&t1), cb, ca).unwrap();
                for i in 0..rs.len() {
                    assert!(max_abs(&(r2[i] - rs[i])) < 1e-12, "{a} -> {b}");
                    assert!((t2[i] - ts[i]).norm() < 1e-12, "{a} -> {b}");
                }
            }
        }
    }

    #[test]
    fn view_points_follow_the_scene_change_of_basis() {
        let registry = ConventionRegistry::builtin();
        let cv = registry.get("opencv").unwrap();
        let p3d = registry.get("pytorch3d").unwrap();
        let rs = synthetic::random_rotations(1, 9);
        let ts = synthetic::random_translations(1, 10, 1.0);
        let world = [Pt3::new(0.2, 0.4, 3.0)];

        let (r, t) = convert_extrinsic(Some(&rs), Some(&ts), cv, p3d).unwrap();
        let world_p3d = convert_points(&world, cv, p3d);

        let view_cv = rs[0] * world[0].coords + ts[0];
        let r_col = p3d.side().to_column(&r[0]);
        let view_p3d = r_col * world_p3d[0].coords + t[0];
        let m = cv.change_of_basis_to(p3d);
        assert!((view_p3d - m * view_cv).norm() < 1e-12);
    }

    #[test]
    fn missing_inputs_default_once() {
        let registry = ConventionRegistry::builtin();
        let (cv, gl) = (registry.get("opencv").unwrap(), registry.get("opengl").unwrap());
        let ts = vec![Vec3::new(1.0, 2.0, 3.0); 2];
        let (r, t) = convert_extrinsic(None, Some(&ts), cv, gl).unwrap();
        assert_eq!(r, vec![Mat3::identity(); 2]);
        assert_eq!(t[0], Vec3::new(1.0, -2.0, -3.0));

        let (r, t) = convert_extrinsic(None, None, cv, gl).unwrap();
        assert_eq!((r.len(), t.len()), (1, 1));
        assert_eq!(t[0], Vec3::zeros());
    }

    #[test]
    fn camera_center_inverts_translation() {
        let rs = synthetic::random_rotations(1, 5);
        let center = Pt3::new(1.0, -2.0, 0.5);
        let t = -(rs[0] * center.coords);
        let got = camera_center(&rs[0], &t, MatrixSide::Left);
        assert!((got - center).norm() < 1e-12);
        let got = camera_center(&rs[0].transpose(), &t, MatrixSide::Right);
        assert!((got - center).norm() < 1e-12);
    }

    #[test]
    fn look_at_places_target_in_front() {
        let registry = ConventionRegistry::builtin();
        let eye = Pt3::new(0.0, 0.0, -5.0);
        let at = Pt3::origin();
        let cv = registry.get("opencv").unwrap();
        let (r, t) = look_at_view_transform(&eye, &at, &Vec3::new(0.0, -1.0, 0.0), cv).unwrap();
        assert!(max_abs(&(r - Mat3::identity())) < 1e-12);
        assert!((t - Vec3::new(0.0, 0.0, 5.0)).norm() < 1e-12);

        for name in registry.names() {
            let conv = registry.get(name).unwrap();
            let up = conv.axes().up.to_vector();
            let eye = Pt3::from(conv.axes().backward.to_vector() * 4.0);
            let (r, t) = look_at_view_transform(&eye, &at, &up, conv).unwrap();
            let view = conv.side().to_column(&r) * at.coords + t;
            // The target sits on the optical axis at distance 4.
            let forward = -conv.axes().backward.to_vector();
            assert!((view - forward * 4.0).norm() < 1e-12, "{name}");
            assert!((camera_center(&r, &t, conv.side()) - eye).norm() < 1e-12, "{name}");
        }
    }

    #[test]
    fn look_at_rejects_degenerate_inputs() {
        let cv = ConventionRegistry::builtin().get("opencv").unwrap();
        let p = Pt3::new(1.0, 1.0, 1.0);
        assert!(look_at_view_transform(&p, &p, &Vec3::y(), cv).is_err());
        let err = look_at_view_transform(&Pt3::new(0.0, 2.0, 0.0), &Pt3::origin(), &Vec3::y(), cv)
            .unwrap_err();
        assert!(matches!(err, CameraError::InvalidParameter(_)));
    }
}
