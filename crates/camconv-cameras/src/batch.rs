//! Batched camera state shared by every camera model.

use camconv_core::{
    batch, camera_center, CameraError, Convention, ImageSize, ImageSizes, Mat2, Mat3, Mat4, Pt3,
    Result, Vec3,
};

/// `N` cameras sharing one convention and one output space.
///
/// `k` is always stored homogeneous (4×4); `r` is stored on the side the
/// convention declares. All three lists have the same length.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraBatch {
    k: Vec<Mat4>,
    r: Vec<Mat3>,
    t: Vec<Vec3>,
    convention: Convention,
    in_ndc: bool,
    image_size: Option<ImageSizes>,
}

impl CameraBatch {
    pub fn new(
        k: Vec<Mat4>,
        r: Vec<Mat3>,
        t: Vec<Vec3>,
        convention: Convention,
        in_ndc: bool,
        image_size: Option<ImageSizes>,
    ) -> Result<Self> {
        let n = batch::common_len(&[
            ("K", Some(k.len())),
            ("R", Some(r.len())),
            ("T", Some(t.len())),
        ])?;
        if let (Some(sizes), true) = (&image_size, n > 0) {
            sizes.check_len(n)?;
        }
        Ok(Self {
            k,
            r,
            t,
            convention,
            in_ndc,
            image_size,
        })
    }

    pub fn len(&self) -> usize {
        self.k.len()
    }

    pub fn is_empty(&self) -> bool {
        self.k.is_empty()
    }

    pub fn k(&self) -> &[Mat4] {
        &self.k
    }

    pub fn r(&self) -> &[Mat3] {
        &self.r
    }

    pub fn t(&self) -> &[Vec3] {
        &self.t
    }

    pub fn convention(&self) -> &Convention {
        &self.convention
    }

    pub fn in_ndc(&self) -> bool {
        self.in_ndc
    }

    pub fn image_size(&self) -> Option<&ImageSizes> {
        self.image_size.as_ref()
    }

    /// Rotation of camera `index` in column-vector form.
    pub fn rotation_column(&self, index: usize) -> Mat3 {
        self.convention.side().to_column(&self.r[index])
    }

    /// World point → view space of camera `index`.
    pub fn world_to_view_point(&self, index: usize, p: &Pt3) -> Vec3 {
        self.rotation_column(index) * p.coords + self.t[index]
    }

    /// View point of camera `index` → world.
    pub fn view_to_world_point(&self, index: usize, x: &Vec3) -> Pt3 {
        Pt3::from(self.rotation_column(index).transpose() * (x - self.t[index]))
    }

    pub fn camera_centers(&self) -> Vec<Pt3> {
        self.r
            .iter()
            .zip(&self.t)
            .map(|(r, t)| camera_center(r, t, self.convention.side()))
            .collect()
    }

    /// Image size and image axes used to move camera `index` between NDC
    /// and pixels.
    pub(crate) fn pixel_frame(&self, index: usize) -> Result<(ImageSize, Mat2)> {
        let sizes = self.image_size.as_ref().ok_or_else(|| {
            CameraError::missing("image_size", "NDC <-> pixel mapping needs an image size")
        })?;
        Ok((sizes.get(index)?, self.convention.image_axes()?))
    }

    /// Cameras at `indices`, which may repeat or reorder.
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        Ok(Self {
            k: batch::gather(&self.k, indices)?,
            r: batch::gather(&self.r, indices)?,
            t: batch::gather(&self.t, indices)?,
            convention: self.convention.clone(),
            in_ndc: self.in_ndc,
            image_size: self
                .image_size
                .as_ref()
                .map(|s| s.select(indices))
                .transpose()?,
        })
    }

    /// Each camera repeated `repeats` times in a row.
    pub fn extend(&self, repeats: usize) -> Result<Self> {
        let indices: Vec<usize> = (0..self.len())
            .flat_map(|i| std::iter::repeat(i).take(repeats))
            .collect();
        self.select(&indices)
    }

    /// Cameras of `self` followed by those of `other`.
    ///
    /// Both batches must share the convention and the output space.
    pub fn concat(&self, other: &CameraBatch) -> Result<Self> {
        if self.convention != other.convention || self.in_ndc != other.in_ndc {
            return Err(CameraError::InvalidParameter(format!(
                "cannot concatenate `{}` ({}) cameras with `{}` ({}) cameras",
                self.convention.name(),
                space_name(self.in_ndc),
                other.convention.name(),
                space_name(other.in_ndc),
            )));
        }
        let image_size = match (&self.image_size, &other.image_size) {
            (None, None) => None,
            (Some(a), Some(b)) if a == b && matches!(a, ImageSizes::Shared(_)) => Some(a.clone()),
            (Some(a), Some(b)) => {
                let mut sizes = a.expand(self.len())?;
                sizes.extend(b.expand(other.len())?);
                Some(ImageSizes::PerCamera(sizes))
            }
            _ => {
                return Err(CameraError::missing(
                    "image_size",
                    "cannot concatenate cameras with and without image sizes",
                ))
            }
        };
        Ok(Self {
            k: [self.k.as_slice(), other.k.as_slice()].concat(),
            r: [self.r.as_slice(), other.r.as_slice()].concat(),
            t: [self.t.as_slice(), other.t.as_slice()].concat(),
            convention: self.convention.clone(),
            in_ndc: self.in_ndc,
            image_size,
        })
    }
}

pub(crate) fn space_name(in_ndc: bool) -> &'static str {
    if in_ndc {
        "ndc"
    } else {
        "screen"
    }
}

/// Number of (camera, point set) pairs for a projection call.
///
/// One camera projects every point set, one point set goes through every
/// camera, otherwise the lengths must match.
pub(crate) fn pair_count(n_cameras: usize, n_sets: usize) -> Result<usize> {
    match (n_cameras, n_sets) {
        (c, s) if c == s => Ok(c),
        (1, s) => Ok(s),
        (c, 1) => Ok(c),
        (c, s) => Err(CameraError::shape(
            "point batch",
            format!("1 or {c} point sets"),
            s,
        )),
    }
}

/// Run `f` for every pair index, on the rayon pool when enabled.
#[cfg(feature = "rayon")]
pub(crate) fn map_pairs<T, F>(n: usize, f: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(usize) -> Result<T> + Sync + Send,
{
    use rayon::prelude::*;
    (0..n).into_par_iter().map(f).collect()
}

/// Run `f` for every pair index.
#[cfg(not(feature = "rayon"))]
pub(crate) fn map_pairs<T, F>(n: usize, f: F) -> Result<Vec<T>>
where
    F: Fn(usize) -> Result<T>,
{
    (0..n).map(f).collect()
}
