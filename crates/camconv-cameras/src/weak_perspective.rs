use camconv_core::{
    convert_weakperspective_to_perspective, IntrinsicBatch, Real, Result, WeakPerspectiveParams,
};
use log::debug;

use crate::{CameraBatch, CameraKind, CameraModel, PerspectiveCameras};

/// Scaled-orthographic cameras, always in NDC.
///
/// `K = [[sx, 0, 0, sx·tx], [0, sy, 0, sy·ty], [0, 0, 1, 0], [0, 0, 0, 1]]`
/// for a camera looking down +Z.
#[derive(Clone, Debug, PartialEq)]
pub struct WeakPerspectiveCameras {
    batch: CameraBatch,
}

impl WeakPerspectiveCameras {
    pub fn from_batch(batch: CameraBatch) -> Self {
        Self { batch }
    }

    pub fn into_batch(self) -> CameraBatch {
        self.batch
    }

    /// Scale and translation of every camera.
    pub fn params(&self) -> Result<Vec<WeakPerspectiveParams>> {
        let convention = self.batch.convention();
        self.batch
            .k()
            .iter()
            .map(|k| WeakPerspectiveParams::from_k(k, convention))
            .collect()
    }

    /// Perspective cameras that agree with these at the depths `zmean`.
    ///
    /// Screen output (`in_ndc == false`) needs the batch's image size.
    pub fn to_perspective(&self, zmean: &[Real], in_ndc: bool) -> Result<PerspectiveCameras> {
        let batch = &self.batch;
        let k = IntrinsicBatch::Homogeneous(batch.k().to_vec());
        let persp = convert_weakperspective_to_perspective(
            &k,
            Some(zmean),
            in_ndc,
            batch.image_size(),
            batch.convention(),
        )?;
        debug!(
            "lifted {} weak-perspective camera(s) to perspective",
            batch.len()
        );
        Ok(PerspectiveCameras::from_batch(CameraBatch::new(
            persp.to_homogeneous(true),
            batch.r().to_vec(),
            batch.t().to_vec(),
            batch.convention().clone(),
            in_ndc,
            batch.image_size().cloned(),
        )?))
    }
}

impl CameraModel for WeakPerspectiveCameras {
    fn kind(&self) -> CameraKind {
        CameraKind::WeakPerspective
    }

    fn batch(&self) -> &CameraBatch {
        &self.batch
    }
}
