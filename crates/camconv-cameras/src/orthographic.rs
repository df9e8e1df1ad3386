use crate::{CameraBatch, CameraKind, CameraModel};

/// Orthographic cameras: `xy = (K · [x, y, z, 1])[0..2]`, no depth divide.
#[derive(Clone, Debug, PartialEq)]
pub struct OrthographicCameras {
    batch: CameraBatch,
}

impl OrthographicCameras {
    pub fn from_batch(batch: CameraBatch) -> Self {
        Self { batch }
    }

    pub fn into_batch(self) -> CameraBatch {
        self.batch
    }
}

impl CameraModel for OrthographicCameras {
    fn kind(&self) -> CameraKind {
        CameraKind::Orthographic
    }

    fn batch(&self) -> &CameraBatch {
        &self.batch
    }
}
