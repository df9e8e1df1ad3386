use camconv_core::{
    convert_cameras, CameraError, Convention, ConversionRequest, ImageSizes, IntrinsicBatch, Real,
    Result,
};
use log::debug;

use crate::batch::space_name;
use crate::{
    CameraBatch, CameraBuilder, CameraKind, CameraModel, FoVOrthographicCameras,
    FoVPerspectiveCameras, OrthographicCameras, PerspectiveCameras, WeakPerspectiveCameras,
};

/// Any of the five camera models.
#[derive(Clone, Debug, PartialEq)]
pub enum Cameras {
    Perspective(PerspectiveCameras),
    Orthographic(OrthographicCameras),
    WeakPerspective(WeakPerspectiveCameras),
    FoVPerspective(FoVPerspectiveCameras),
    FoVOrthographic(FoVOrthographicCameras),
}

impl CameraModel for Cameras {
    fn kind(&self) -> CameraKind {
        match self {
            Cameras::Perspective(c) => c.kind(),
            Cameras::Orthographic(c) => c.kind(),
            Cameras::WeakPerspective(c) => c.kind(),
            Cameras::FoVPerspective(c) => c.kind(),
            Cameras::FoVOrthographic(c) => c.kind(),
        }
    }

    fn batch(&self) -> &CameraBatch {
        match self {
            Cameras::Perspective(c) => c.batch(),
            Cameras::Orthographic(c) => c.batch(),
            Cameras::WeakPerspective(c) => c.batch(),
            Cameras::FoVPerspective(c) => c.batch(),
            Cameras::FoVOrthographic(c) => c.batch(),
        }
    }
}

impl Cameras {
    pub fn builder(kind: CameraKind) -> CameraBuilder {
        CameraBuilder::new(kind)
    }

    /// Wrap a batch as cameras of `kind`.
    ///
    /// Fails when an NDC-only kind is given a screen-space batch.
    pub fn from_batch(kind: CameraKind, batch: CameraBatch) -> Result<Self> {
        if !batch.in_ndc() && !kind.supports_screen() {
            return Err(CameraError::InvalidParameter(format!(
                "{kind} are defined in NDC only"
            )));
        }
        Ok(match kind {
            CameraKind::Perspective => Cameras::Perspective(PerspectiveCameras::from_batch(batch)),
            CameraKind::Orthographic => {
                Cameras::Orthographic(OrthographicCameras::from_batch(batch))
            }
            CameraKind::WeakPerspective => {
                Cameras::WeakPerspective(WeakPerspectiveCameras::from_batch(batch))
            }
            CameraKind::FoVPerspective => {
                Cameras::FoVPerspective(FoVPerspectiveCameras::from_batch(batch))
            }
            CameraKind::FoVOrthographic => {
                Cameras::FoVOrthographic(FoVOrthographicCameras::from_batch(batch))
            }
        })
    }

    pub fn into_batch(self) -> CameraBatch {
        match self {
            Cameras::Perspective(c) => c.into_batch(),
            Cameras::Orthographic(c) => c.into_batch(),
            Cameras::WeakPerspective(c) => c.into_batch(),
            Cameras::FoVPerspective(c) => c.into_batch(),
            Cameras::FoVOrthographic(c) => c.into_batch(),
        }
    }

    /// Cameras at `indices` (repeats and reordering allowed).
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        Self::from_batch(self.kind(), self.batch().select(indices)?)
    }

    /// Each camera repeated `repeats` times in a row.
    pub fn extend(&self, repeats: usize) -> Result<Self> {
        Self::from_batch(self.kind(), self.batch().extend(repeats)?)
    }

    /// Join two batches of the same kind, convention and space.
    pub fn concat(&self, other: &Cameras) -> Result<Self> {
        if self.kind() != other.kind() {
            return Err(CameraError::InvalidParameter(format!(
                "cannot concatenate {} with {}",
                self.kind(),
                other.kind()
            )));
        }
        Self::from_batch(self.kind(), self.batch().concat(other.batch())?)
    }

    /// The same cameras expressed in another convention and space.
    ///
    /// World points must be re-expressed with
    /// [`camconv_core::convert_points`] to project identically. Moving
    /// between NDC and screen needs an image size, taken from `image_size`
    /// or from the batch.
    pub fn to_convention(
        &self,
        convention: &Convention,
        in_ndc: bool,
        image_size: Option<ImageSizes>,
    ) -> Result<Self> {
        let kind = self.kind();
        if !in_ndc && !kind.supports_screen() {
            return Err(CameraError::InvalidParameter(format!(
                "{kind} are defined in NDC only"
            )));
        }
        let batch = self.batch();
        let k = IntrinsicBatch::Homogeneous(batch.k().to_vec());
        let request = ConversionRequest::new(batch.convention(), convention)
            .spaces(batch.in_ndc(), in_ndc)
            .resolutions(batch.image_size(), image_size.as_ref());
        let out = convert_cameras(
            Some(&k),
            Some(batch.r()),
            Some(batch.t()),
            kind.is_perspective(),
            &request,
        )?;
        debug!(
            "{kind}: `{}` ({}) -> `{}` ({})",
            batch.convention().name(),
            space_name(batch.in_ndc()),
            convention.name(),
            space_name(in_ndc)
        );
        let k = out
            .k
            .map(|k| k.to_homogeneous(kind.is_perspective()))
            .unwrap_or_default();
        let batch = CameraBatch::new(
            k,
            out.r,
            out.t,
            convention.clone(),
            in_ndc,
            image_size.or_else(|| batch.image_size().cloned()),
        )?;
        Self::from_batch(kind, batch)
    }

    /// Weak-perspective approximation of perspective cameras.
    pub fn to_weak_perspective(&self, zmean: &[Real]) -> Result<Self> {
        match self {
            Cameras::Perspective(c) => Ok(Cameras::WeakPerspective(c.to_weak_perspective(zmean)?)),
            other => Err(CameraError::InvalidParameter(format!(
                "weak-perspective approximation needs PerspectiveCameras, got {}",
                other.kind()
            ))),
        }
    }

    /// Perspective cameras matching weak-perspective ones at `zmean`.
    pub fn to_perspective(&self, zmean: &[Real], in_ndc: bool) -> Result<Self> {
        match self {
            Cameras::WeakPerspective(c) => {
                Ok(Cameras::Perspective(c.to_perspective(zmean, in_ndc)?))
            }
            other => Err(CameraError::InvalidParameter(format!(
                "perspective lifting needs WeakPerspectiveCameras, got {}",
                other.kind()
            ))),
        }
    }
}

impl From<PerspectiveCameras> for Cameras {
    fn from(c: PerspectiveCameras) -> Self {
        Cameras::Perspective(c)
    }
}

impl From<OrthographicCameras> for Cameras {
    fn from(c: OrthographicCameras) -> Self {
        Cameras::Orthographic(c)
    }
}

impl From<WeakPerspectiveCameras> for Cameras {
    fn from(c: WeakPerspectiveCameras) -> Self {
        Cameras::WeakPerspective(c)
    }
}

impl From<FoVPerspectiveCameras> for Cameras {
    fn from(c: FoVPerspectiveCameras) -> Self {
        Cameras::FoVPerspective(c)
    }
}

impl From<FoVOrthographicCameras> for Cameras {
    fn from(c: FoVOrthographicCameras) -> Self {
        Cameras::FoVOrthographic(c)
    }
}
