//! Batched camera models on top of `camconv-core`.
//!
//! A camera batch holds N cameras of one kind that share a convention and an
//! output space (NDC or pixels):
//! - [`CameraBatch`] stores `K` (4×4), `R`, `T`, the convention and image sizes,
//! - [`CameraModel`] projects, unprojects and measures depth for any kind,
//! - [`Cameras`] is the closed set of the five kinds,
//! - [`CameraBuilder`] and [`CameraConfig`] derive intrinsics from model
//!   parameters (focal length, `pred_cam`, field of view, ...).
//!
//! ```
//! use camconv_cameras::{CameraBuilder, CameraKind, CameraModel};
//! use camconv_core::{ImageSize, Pt3, Vec2};
//!
//! let cams = CameraBuilder::new(CameraKind::Perspective)
//!     .focal_length(vec![Vec2::new(1000.0, 1000.0)])
//!     .principal_point(vec![Vec2::new(500.0, 500.0)])
//!     .image_size(ImageSize::new(1000, 1000))
//!     .in_ndc(false)
//!     .build()?;
//! let uv = cams.transform_points(&[vec![Pt3::new(0.0, 0.0, 5.0)]])?;
//! assert_eq!((uv[0][0].x, uv[0][0].y), (500.0, 500.0));
//! # Ok::<(), camconv_core::CameraError>(())
//! ```

mod batch;
mod builder;
mod cameras;
mod config;
mod fov;
mod kind;
mod model;
mod orthographic;
mod perspective;
mod weak_perspective;

pub use batch::CameraBatch;
pub use builder::{CameraBuilder, DEFAULT_CONVENTION};
pub use cameras::Cameras;
pub use config::{CameraConfig, FocalLength, OneOrMany};
pub use fov::{
    FoVOrthographicCameras, FoVOrthographicParams, FoVPerspectiveCameras, FoVPerspectiveParams,
};
pub use kind::CameraKind;
pub use model::{project_view_point, unproject_view_point, CameraModel};
pub use orthographic::OrthographicCameras;
pub use perspective::PerspectiveCameras;
pub use weak_perspective::WeakPerspectiveCameras;
