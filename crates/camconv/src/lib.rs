//! Convert cameras between 3D-library conventions.
//!
//! Libraries disagree on which way the camera looks, which way is up, whether
//! rotations act on column or row vectors and whether intrinsics map to NDC or
//! to pixels. This crate moves `(K, R, T)` between any two registered
//! conventions so that every world point lands on the same pixel.
//!
//! Two levels of API are available.
//!
//! ## Matrix converters
//!
//! Work directly on batches of intrinsics and poses:
//!
//! ```
//! use camconv::core::{
//!     convert_cameras, perspective_k, screen_k_in_convention, ConversionRequest,
//!     ConventionRegistry, ImageSize, ImageSizes, IntrinsicBatch, Mat3, Vec3,
//! };
//!
//! # fn main() -> Result<(), camconv::core::CameraError> {
//! let registry = ConventionRegistry::builtin();
//! let cv = registry.get("opencv")?;
//! let k = IntrinsicBatch::Homogeneous(vec![screen_k_in_convention(
//!     &perspective_k(800.0, 800.0, 320.0, 240.0),
//!     cv,
//! )]);
//! let size = ImageSizes::Shared(ImageSize::new(480, 640));
//!
//! let request = ConversionRequest::from_names(registry, "opencv", "pytorch3d")?
//!     .spaces(false, true)
//!     .resolutions(Some(&size), None);
//! let out = convert_cameras(
//!     Some(&k),
//!     Some(&[Mat3::identity()]),
//!     Some(&[Vec3::zeros()]),
//!     true,
//!     &request,
//! )?;
//! assert_eq!(out.r.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Camera batches
//!
//! Build cameras from model parameters, project points and convert the whole
//! batch:
//!
//! ```
//! use camconv::prelude::*;
//!
//! # fn main() -> Result<(), CameraError> {
//! let cams = CameraBuilder::new(CameraKind::Perspective)
//!     .focal_length(vec![Vec2::new(800.0, 800.0)])
//!     .image_size(ImageSize::new(480, 640))
//!     .in_ndc(false)
//!     .build()?;
//! let gl = ConventionRegistry::builtin().get("opengl")?;
//! let gl_cams = cams.to_convention(gl, true, None)?;
//! assert_eq!(gl_cams.batch().convention().name(), "opengl");
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - **[`core`]**: conventions, matrix converters, error type, synthetic data
//! - **[`cameras`]**: camera models, factory and JSON configuration
//! - **[`prelude`]**: the common subset of both

/// Conventions, intrinsic and extrinsic converters, and orchestration.
pub mod core {
    pub use camconv_core::*;
}

/// Batched camera models and their factory.
pub mod cameras {
    pub use camconv_cameras::*;
}

/// Convenient re-exports for common use cases.
///
/// Import with `use camconv::prelude::*;`.
pub mod prelude {
    pub use crate::core::{
        convert_cameras, convert_points, CameraError, Convention, ConventionRegistry,
        ConversionRequest, ImageSize, ImageSizes, IntrinsicBatch, Mat3, Mat4, MatrixSide, Pt3,
        Real, Vec2, Vec3,
    };

    pub use crate::cameras::{
        CameraBatch, CameraBuilder, CameraConfig, CameraKind, CameraModel, Cameras,
    };
}
