use camconv_core::{convert_perspective_to_weakperspective, IntrinsicBatch, Real, Result};
use log::debug;

use crate::{CameraBatch, CameraKind, CameraModel, WeakPerspectiveCameras};

/// Pinhole cameras: `xy = (K · [x, y, z, 1])[0..2] / depth`.
#[derive(Clone, Debug, PartialEq)]
pub struct PerspectiveCameras {
    batch: CameraBatch,
}

impl PerspectiveCameras {
    pub fn from_batch(batch: CameraBatch) -> Self {
        Self { batch }
    }

    pub fn into_batch(self) -> CameraBatch {
        self.batch
    }

    /// Weak-perspective approximation around the reference depths `zmean`.
    ///
    /// Screen cameras need an image size; the result is always NDC.
    pub fn to_weak_perspective(&self, zmean: &[Real]) -> Result<WeakPerspectiveCameras> {
        let batch = &self.batch;
        let k = IntrinsicBatch::Homogeneous(batch.k().to_vec());
        let weak = convert_perspective_to_weakperspective(
            &k,
            Some(zmean),
            batch.in_ndc(),
            batch.image_size(),
            batch.convention(),
        )?;
        debug!(
            "approximated {} perspective camera(s) by weak perspective",
            batch.len()
        );
        Ok(WeakPerspectiveCameras::from_batch(CameraBatch::new(
            weak.to_homogeneous(false),
            batch.r().to_vec(),
            batch.t().to_vec(),
            batch.convention().clone(),
            true,
            batch.image_size().cloned(),
        )?))
    }
}

impl CameraModel for PerspectiveCameras {
    fn kind(&self) -> CameraKind {
        CameraKind::Perspective
    }

    fn batch(&self) -> &CameraBatch {
        &self.batch
    }
}
