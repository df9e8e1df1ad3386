//! Mathematical utilities and type definitions.
//!
//! This module provides the fundamental fixed-size types used throughout the
//! library together with a few small helpers for homogeneous coordinates.

use nalgebra::{Matrix2, Matrix3, Matrix4, Point3, Vector2, Vector3, Vector4};

/// Scalar type used throughout the library (currently `f64`).
pub type Real = f64;

/// 2D vector with [`Real`] components.
pub type Vec2 = Vector2<Real>;
/// 3D vector with [`Real`] components.
pub type Vec3 = Vector3<Real>;
/// 4D (homogeneous) vector with [`Real`] components.
pub type Vec4 = Vector4<Real>;
/// 3D point with [`Real`] coordinates.
pub type Pt3 = Point3<Real>;
/// 2×2 matrix with [`Real`] entries.
pub type Mat2 = Matrix2<Real>;
/// 3×3 matrix with [`Real`] entries.
pub type Mat3 = Matrix3<Real>;
/// 4×4 matrix with [`Real`] entries.
pub type Mat4 = Matrix4<Real>;

/// Convert a 3D point into homogeneous coordinates `(x, y, z, 1)`.
pub fn to_homogeneous(p: &Vec3) -> Vec4 {
    Vec4::new(p.x, p.y, p.z, 1.0)
}

/// Embed a 3×3 linear map into a 4×4 homogeneous transform with no translation.
pub fn pad_mat3(m: &Mat3) -> Mat4 {
    let mut out = Mat4::identity();
    out.fixed_view_mut::<3, 3>(0, 0).copy_from(m);
    out
}

/// Embed a 2×2 block in the top-left corner of a 4×4 identity.
pub fn pad_mat2(m: &Mat2) -> Mat4 {
    let mut out = Mat4::identity();
    out.fixed_view_mut::<2, 2>(0, 0).copy_from(m);
    out
}

/// Returns true if every row and column holds exactly one `±1` and zeros elsewhere.
pub fn is_signed_permutation<const D: usize>(m: &nalgebra::SMatrix<Real, D, D>) -> bool {
    let row_ok = m.row_iter().all(|row| {
        row.iter().filter(|v| **v != 0.0).count() == 1
            && row.iter().all(|v| *v == 0.0 || v.abs() == 1.0)
    });
    let col_ok = m
        .column_iter()
        .all(|col| col.iter().filter(|v| **v != 0.0).count() == 1);
    row_ok && col_ok
}

/// Convert degrees to radians.
#[inline]
pub fn deg_to_rad(deg: Real) -> Real {
    deg * std::f64::consts::PI / 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_keeps_linear_block() {
        let m = Mat3::new(0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        let p = pad_mat3(&m);
        let v = p * Vec4::new(1.0, 2.0, 3.0, 1.0);
        assert_eq!(v, Vec4::new(2.0, -1.0, 3.0, 1.0));
    }

    #[test]
    fn homogeneous_point_picks_up_translation() {
        let h = to_homogeneous(&Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(h, Vec4::new(1.0, 2.0, 3.0, 1.0));

        let mut shift = Mat4::identity();
        shift[(0, 3)] = 5.0;
        assert_eq!(shift * h, Vec4::new(6.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn signed_permutation_detection() {
        let flip = Mat3::from_diagonal(&Vec3::new(1.0, -1.0, -1.0));
        assert!(is_signed_permutation(&flip));

        let swap = Mat3::new(0.0, -1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        assert!(is_signed_permutation(&swap));

        let repeated = Mat3::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0);
        assert!(!is_signed_permutation(&repeated));

        let scaled = Mat3::from_diagonal(&Vec3::new(2.0, 1.0, 1.0));
        assert!(!is_signed_permutation(&scaled));
    }
}
