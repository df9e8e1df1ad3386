//! Core math for converting cameras between conventions.
//!
//! This crate contains:
//! - linear algebra type aliases (`Real`, `Vec3`, `Mat4`, ...),
//! - the convention registry (`Convention`, [`ConventionRegistry`]),
//! - intrinsic converters (compact ↔ homogeneous, NDC ↔ screen, axis changes),
//! - extrinsic converters (axis changes, world ↔ view, look-at),
//! - perspective ↔ weak-perspective approximations,
//! - [`convert_cameras`], which sequences all of the above.
//!
//! Every function is pure: inputs are borrowed, outputs are new values, and
//! each camera of a batch is processed independently.
//!
//! Conversion pipeline:
//! `(K, R, T)_src → extrinsic axes → K axes → NDC/screen → (K, R, T)_dst`

/// Batch length resolution and gathering.
pub mod batch;
/// Convention descriptors and the registry.
pub mod convention;
/// Orchestration across conventions and spaces.
pub mod convert;
/// Error type.
pub mod error;
/// Extrinsic pose converters.
pub mod extrinsics;
/// Intrinsic matrix layouts and converters.
pub mod intrinsics;
/// Linear algebra type aliases and helpers.
pub mod math;
/// Image resolutions.
pub mod resolution;
/// Deterministic synthetic cameras and points.
pub mod synthetic;
/// Weak-perspective parameters and converters.
pub mod weak_perspective;

pub use convention::*;
pub use convert::*;
pub use error::*;
pub use extrinsics::{
    camera_center, convert_extrinsic, convert_points, convert_world_view, invert_pose,
    look_at_view_transform,
};
pub use intrinsics::*;
pub use math::*;
pub use resolution::*;
pub use weak_perspective::*;
