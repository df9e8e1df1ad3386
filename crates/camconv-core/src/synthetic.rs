//! Deterministic synthetic data for tests and demos.
//!
//! Everything here is seeded explicitly and avoids `thread_rng`, so generated
//! cameras and point clouds are stable across platforms and releases.

use nalgebra::{Quaternion, UnitQuaternion};

use crate::{Mat3, Pt3, Real, Vec3};

/// Small SplitMix64 stream.
#[derive(Debug, Clone)]
pub struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform sample in `[0, 1)` built from the top 53 bits.
    pub fn next_unit(&mut self) -> Real {
        (self.next_u64() >> 11) as Real * (1.0 / (1u64 << 53) as Real)
    }

    /// Uniform sample in `[lo, hi)`.
    pub fn uniform(&mut self, lo: Real, hi: Real) -> Real {
        lo + (hi - lo) * self.next_unit()
    }
}

/// `n` well-spread rotation matrices.
pub fn random_rotations(n: usize, seed: u64) -> Vec<Mat3> {
    let mut rng = SplitMix64::new(seed);
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let q = Quaternion::new(
            rng.uniform(-1.0, 1.0),
            rng.uniform(-1.0, 1.0),
            rng.uniform(-1.0, 1.0),
            rng.uniform(-1.0, 1.0),
        );
        // Reject near-zero draws so normalisation stays well conditioned.
        if q.norm() < 0.1 {
            continue;
        }
        out.push(UnitQuaternion::from_quaternion(q).to_rotation_matrix().into_inner());
    }
    out
}

/// `n` translations with components in `[-scale, scale)`.
pub fn random_translations(n: usize, seed: u64, scale: Real) -> Vec<Vec3> {
    let mut rng = SplitMix64::new(seed);
    (0..n)
        .map(|_| {
            Vec3::new(
                rng.uniform(-scale, scale),
                rng.uniform(-scale, scale),
                rng.uniform(-scale, scale),
            )
        })
        .collect()
}

/// `n` view-space points with forward depth in `[near, far)` inside a
/// 90° cone, written for a camera whose +Z looks forward.
pub fn points_in_view(n: usize, seed: u64, near: Real, far: Real) -> Vec<Pt3> {
    let mut rng = SplitMix64::new(seed);
    (0..n)
        .map(|_| {
            let z = rng.uniform(near, far);
            Pt3::new(rng.uniform(-0.5, 0.5) * z, rng.uniform(-0.5, 0.5) * z, z)
        })
        .collect()
}

/// Map view-space points back to the world for a column-vector pose.
pub fn view_to_world(points: &[Pt3], r: &Mat3, t: &Vec3) -> Vec<Pt3> {
    points
        .iter()
        .map(|p| Pt3::from(r.transpose() * (p.coords - t)))
        .collect()
}
