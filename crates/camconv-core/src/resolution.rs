//! Image resolutions attached to cameras and conversions.

use serde::{Deserialize, Serialize};

use crate::{batch, CameraError, Real, Result, Vec2};

/// Image size in pixels, serialized as `[height, width]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct ImageSize {
    pub height: u32,
    pub width: u32,
}

impl ImageSize {
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Pixels per NDC unit: half of the shorter image side.
    ///
    /// NDC is isotropic, so the shorter side spans `[-1, 1]` and the longer
    /// one extends proportionally further.
    pub fn ndc_scale(&self) -> Real {
        Real::from(self.height.min(self.width)) / 2.0
    }

    /// Image center `(W / 2, H / 2)` in pixels.
    pub fn center(&self) -> Vec2 {
        Vec2::new(Real::from(self.width) / 2.0, Real::from(self.height) / 2.0)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.height == 0 || self.width == 0 {
            return Err(CameraError::InvalidParameter(format!(
                "image size must be positive, got {}x{}",
                self.height, self.width
            )));
        }
        Ok(())
    }
}

impl From<[u32; 2]> for ImageSize {
    fn from([height, width]: [u32; 2]) -> Self {
        Self { height, width }
    }
}

impl From<ImageSize> for [u32; 2] {
    fn from(size: ImageSize) -> Self {
        [size.height, size.width]
    }
}

/// Resolution of a camera batch: one size for all cameras or one per camera.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageSizes {
    Shared(ImageSize),
    PerCamera(Vec<ImageSize>),
}

impl ImageSizes {
    /// Size used by camera `index`. A single-entry list is broadcast.
    pub fn get(&self, index: usize) -> Result<ImageSize> {
        match self {
            Self::Shared(size) => Ok(*size),
            Self::PerCamera(sizes) if sizes.len() == 1 => Ok(sizes[0]),
            Self::PerCamera(sizes) => {
                sizes
                    .get(index)
                    .copied()
                    .ok_or(CameraError::IndexOutOfRange {
                        index,
                        len: sizes.len(),
                    })
            }
        }
    }

    /// Validate against a batch of `n` cameras.
    pub fn check_len(&self, n: usize) -> Result<()> {
        match self {
            Self::Shared(size) => size.validate(),
            Self::PerCamera(sizes) => {
                if sizes.is_empty() {
                    return Err(CameraError::shape("image_size", format!("1 or {n}"), 0));
                }
                batch::check_broadcast("image_size", sizes.len(), n)?;
                sizes.iter().try_for_each(ImageSize::validate)
            }
        }
    }

    /// Sub-select the sizes of the cameras at `indices`.
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        match self {
            Self::Shared(size) => Ok(Self::Shared(*size)),
            Self::PerCamera(sizes) if sizes.len() == 1 => Ok(Self::Shared(sizes[0])),
            Self::PerCamera(sizes) => Ok(Self::PerCamera(batch::gather(sizes, indices)?)),
        }
    }

    /// Expand to exactly `n` per-camera sizes.
    pub fn expand(&self, n: usize) -> Result<Vec<ImageSize>> {
        (0..n).map(|i| self.get(i)).collect()
    }
}

impl From<ImageSize> for ImageSizes {
    fn from(size: ImageSize) -> Self {
        Self::Shared(size)
    }
}

impl From<Vec<ImageSize>> for ImageSizes {
    fn from(sizes: Vec<ImageSize>) -> Self {
        Self::PerCamera(sizes)
    }
}
