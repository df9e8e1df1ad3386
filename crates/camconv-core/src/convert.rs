//! Cross-convention orchestration of intrinsics and extrinsics.

use log::debug;

use crate::{
    batch, convert_k_axes, convert_ndc_to_screen, convert_screen_to_ndc,
    extrinsics::convert_extrinsic_parts, rescale_screen, Convention, ConventionRegistry,
    ImageSizes, IntrinsicBatch, Mat3, Result, Vec3,
};

/// Source and destination of a camera conversion.
#[derive(Clone, Copy, Debug)]
pub struct ConversionRequest<'a> {
    pub src: &'a Convention,
    pub dst: &'a Convention,
    pub in_ndc_src: bool,
    pub in_ndc_dst: bool,
    pub resolution_src: Option<&'a ImageSizes>,
    pub resolution_dst: Option<&'a ImageSizes>,
}

impl<'a> ConversionRequest<'a> {
    /// NDC to NDC between two conventions, no resolutions.
    pub fn new(src: &'a Convention, dst: &'a Convention) -> Self {
        Self {
            src,
            dst,
            in_ndc_src: true,
            in_ndc_dst: true,
            resolution_src: None,
            resolution_dst: None,
        }
    }

    /// Look both conventions up by name.
    pub fn from_names(registry: &'a ConventionRegistry, src: &str, dst: &str) -> Result<Self> {
        Ok(Self::new(registry.get(src)?, registry.get(dst)?))
    }

    pub fn spaces(mut self, in_ndc_src: bool, in_ndc_dst: bool) -> Self {
        self.in_ndc_src = in_ndc_src;
        self.in_ndc_dst = in_ndc_dst;
        self
    }

    pub fn resolutions(
        mut self,
        resolution_src: Option<&'a ImageSizes>,
        resolution_dst: Option<&'a ImageSizes>,
    ) -> Self {
        self.resolution_src = resolution_src;
        self.resolution_dst = resolution_dst;
        self
    }
}

/// Result of [`convert_cameras`].
#[derive(Clone, Debug, PartialEq)]
pub struct ConvertedCameras {
    /// `None` when no intrinsics were supplied.
    pub k: Option<IntrinsicBatch>,
    pub r: Vec<Mat3>,
    pub t: Vec<Vec3>,
}

/// Convert a camera batch between conventions and NDC/screen spaces.
///
/// Runs the extrinsic axis change, then re-expresses K for the destination
/// axes in the source space, then moves K between NDC and screen (or
/// rescales screen intrinsics when both resolutions are known and differ).
/// A missing resolution on one side falls back to the other side's.
///
/// Absent K stays absent; absent R and T become identity and zero once, at
/// the end.
pub fn convert_cameras(
    k: Option<&IntrinsicBatch>,
    r: Option<&[Mat3]>,
    t: Option<&[Vec3]>,
    is_perspective: bool,
    request: &ConversionRequest<'_>,
) -> Result<ConvertedCameras> {
    let n = batch::common_len(&[
        ("K", k.map(IntrinsicBatch::len)),
        ("R", r.map(<[_]>::len)),
        ("T", t.map(<[_]>::len)),
    ])?;
    let (src, dst) = (request.src, request.dst);
    let res_src = request.resolution_src.or(request.resolution_dst);
    let res_dst = request.resolution_dst.or(request.resolution_src);
    debug!(
        "converting {n} camera(s) `{}` ({}) -> `{}` ({})",
        src.name(),
        space_name(request.in_ndc_src),
        dst.name(),
        space_name(request.in_ndc_dst)
    );

    let (r, t) = convert_extrinsic_parts(r, t, src, dst)?;

    let k = match k {
        None => None,
        Some(k) => {
            let k = convert_k_axes(k, is_perspective, src, dst, request.in_ndc_src)?;
            let k = match (request.in_ndc_src, request.in_ndc_dst) {
                (true, true) => k,
                (true, false) => convert_ndc_to_screen(&k, res_dst, is_perspective, dst)?,
                (false, true) => convert_screen_to_ndc(&k, res_src, is_perspective, dst)?,
                (false, false) => match (request.resolution_src, request.resolution_dst) {
                    (Some(from), Some(to)) if from != to => {
                        rescale_screen(&k, from, to, is_perspective, dst)?
                    }
                    _ => k,
                },
            };
            Some(k)
        }
    };

    Ok(ConvertedCameras {
        k,
        r: r.unwrap_or_else(|| vec![Mat3::identity(); n]),
        t: t.unwrap_or_else(|| vec![Vec3::zeros(); n]),
    })
}

fn space_name(in_ndc: bool) -> &'static str {
    if in_ndc {
        "ndc"
    } else {
        "screen"
    }
}
