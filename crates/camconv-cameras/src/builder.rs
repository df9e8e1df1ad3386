//! Camera factory: explicit matrices or model parameters → [`Cameras`].

use camconv_core::{
    batch, ndc_k_in_convention, orthographic_k, perspective_k, screen_k_in_convention,
    CameraError, Convention, ConventionRegistry, ImageSizes, IntrinsicBatch, Mat3, Mat4, Real,
    Result, Vec2, Vec3, WeakPerspectiveParams,
};
use log::debug;

use crate::{CameraBatch, CameraKind, Cameras, FoVOrthographicParams, FoVPerspectiveParams};

/// Name of the convention used when none is given.
pub const DEFAULT_CONVENTION: &str = "opencv";

/// Builds a batch of cameras of one kind.
///
/// Either pass `K` directly or the kind's parameters, never both. Missing
/// `R` and `T` default to identity and zero. Parameter lists of length one
/// are broadcast across the batch.
///
/// Without an explicit convention the batch uses [`DEFAULT_CONVENTION`], looked
/// up in the registry passed to [`CameraBuilder::build_in`]. [`CameraBuilder::build`]
/// looks it up in [`ConventionRegistry::builtin`].
///
/// | kind | NDC (default) | screen |
/// |---|---|---|
/// | Perspective / Orthographic | focal `(1, 1)`, principal point `(0, 0)` by default | focal and image size required, principal point defaults to the image center |
/// | WeakPerspective | `K` or `pred_cam` required | not supported |
/// | FoVPerspective / FoVOrthographic | frustum defaults | not supported |
#[derive(Clone, Debug)]
pub struct CameraBuilder {
    kind: CameraKind,
    k: Option<IntrinsicBatch>,
    r: Option<Vec<Mat3>>,
    t: Option<Vec<Vec3>>,
    convention: Option<Convention>,
    in_ndc: bool,
    image_size: Option<ImageSizes>,
    focal_length: Option<Vec<Vec2>>,
    principal_point: Option<Vec<Vec2>>,
    pred_cam: Option<Vec<[Real; 4]>>,
    fov_perspective: Option<Vec<FoVPerspectiveParams>>,
    fov_orthographic: Option<Vec<FoVOrthographicParams>>,
}

impl CameraBuilder {
    pub fn new(kind: CameraKind) -> Self {
        Self {
            kind,
            k: None,
            r: None,
            t: None,
            convention: None,
            in_ndc: true,
            image_size: None,
            focal_length: None,
            principal_point: None,
            pred_cam: None,
            fov_perspective: None,
            fov_orthographic: None,
        }
    }

    /// Intrinsics, compact or homogeneous, in the layout of the kind.
    pub fn k(mut self, k: impl Into<IntrinsicBatch>) -> Self {
        self.k = Some(k.into());
        self
    }

    /// Rotations, stored on the convention's side.
    pub fn r(mut self, r: Vec<Mat3>) -> Self {
        self.r = Some(r);
        self
    }

    pub fn t(mut self, t: Vec<Vec3>) -> Self {
        self.t = Some(t);
        self
    }

    pub fn convention(mut self, convention: Convention) -> Self {
        self.convention = Some(convention);
        self
    }

    pub fn in_ndc(mut self, in_ndc: bool) -> Self {
        self.in_ndc = in_ndc;
        self
    }

    pub fn image_size(mut self, image_size: impl Into<ImageSizes>) -> Self {
        self.image_size = Some(image_size.into());
        self
    }

    /// `(fx, fy)` per camera, in NDC units or pixels.
    pub fn focal_length(mut self, focal_length: Vec<Vec2>) -> Self {
        self.focal_length = Some(focal_length);
        self
    }

    /// `(px, py)` per camera, in NDC units or pixels.
    pub fn principal_point(mut self, principal_point: Vec<Vec2>) -> Self {
        self.principal_point = Some(principal_point);
        self
    }

    /// `[scale_x, scale_y, transl_x, transl_y]` per camera.
    pub fn pred_cam(mut self, pred_cam: Vec<[Real; 4]>) -> Self {
        self.pred_cam = Some(pred_cam);
        self
    }

    pub fn fov_perspective(mut self, params: Vec<FoVPerspectiveParams>) -> Self {
        self.fov_perspective = Some(params);
        self
    }

    pub fn fov_orthographic(mut self, params: Vec<FoVOrthographicParams>) -> Self {
        self.fov_orthographic = Some(params);
        self
    }

    fn has_model_params(&self) -> bool {
        self.focal_length.is_some()
            || self.principal_point.is_some()
            || self.pred_cam.is_some()
            || self.fov_perspective.is_some()
            || self.fov_orthographic.is_some()
    }

    fn check_params_for_kind(&self) -> Result<()> {
        let kind = self.kind;
        let misplaced = match kind {
            CameraKind::Perspective | CameraKind::Orthographic => self
                .pred_cam
                .as_ref()
                .map(|_| "pred_cam")
                .or(self.fov_perspective.as_ref().map(|_| "fov parameters"))
                .or(self.fov_orthographic.as_ref().map(|_| "fov parameters")),
            CameraKind::WeakPerspective => self
                .focal_length
                .as_ref()
                .map(|_| "focal_length")
                .or(self.principal_point.as_ref().map(|_| "principal_point"))
                .or(self.fov_perspective.as_ref().map(|_| "fov parameters"))
                .or(self.fov_orthographic.as_ref().map(|_| "fov parameters")),
            CameraKind::FoVPerspective => self
                .focal_length
                .as_ref()
                .map(|_| "focal_length")
                .or(self.principal_point.as_ref().map(|_| "principal_point"))
                .or(self.pred_cam.as_ref().map(|_| "pred_cam"))
                .or(self.fov_orthographic.as_ref().map(|_| "orthographic frustum")),
            CameraKind::FoVOrthographic => self
                .focal_length
                .as_ref()
                .map(|_| "focal_length")
                .or(self.principal_point.as_ref().map(|_| "principal_point"))
                .or(self.pred_cam.as_ref().map(|_| "pred_cam"))
                .or(self.fov_perspective.as_ref().map(|_| "perspective frustum")),
        };
        match misplaced {
            Some(name) => Err(CameraError::InvalidParameter(format!(
                "{name} does not apply to {kind}"
            ))),
            None => Ok(()),
        }
    }

    /// Batch length: the exact common length of K, R, T and `pred_cam`,
    /// else the longest broadcastable parameter list.
    fn resolve_len(&self) -> Result<usize> {
        let exact = [
            ("K", self.k.as_ref().map(IntrinsicBatch::len)),
            ("R", self.r.as_ref().map(Vec::len)),
            ("T", self.t.as_ref().map(Vec::len)),
            ("pred_cam", self.pred_cam.as_ref().map(Vec::len)),
        ];
        let broadcast = [
            ("focal_length", self.focal_length.as_ref().map(Vec::len)),
            ("principal_point", self.principal_point.as_ref().map(Vec::len)),
            ("fov parameters", self.fov_perspective.as_ref().map(Vec::len)),
            ("fov parameters", self.fov_orthographic.as_ref().map(Vec::len)),
        ];
        let n = if exact.iter().any(|(_, len)| len.is_some()) {
            batch::common_len(&exact)?
        } else {
            broadcast
                .iter()
                .filter_map(|(_, len)| *len)
                .max()
                .unwrap_or(1)
        };
        for (name, len) in broadcast {
            if let Some(len) = len {
                batch::check_broadcast(name, len, n)?;
            }
        }
        Ok(n)
    }

    fn intrinsics(&self, n: usize, convention: &Convention) -> Result<Vec<Mat4>> {
        let kind = self.kind;
        if let Some(k) = &self.k {
            return Ok(k.to_homogeneous(kind.is_perspective()));
        }
        match kind {
            CameraKind::Perspective | CameraKind::Orthographic => {
                let layout: fn(Real, Real, Real, Real) -> Mat4 = if kind.is_perspective() {
                    perspective_k
                } else {
                    orthographic_k
                };
                if self.in_ndc {
                    let unit_focal = [Vec2::new(1.0, 1.0)];
                    let centered = [Vec2::zeros()];
                    let focal = self.focal_length.as_deref().unwrap_or(&unit_focal);
                    let pp = self.principal_point.as_deref().unwrap_or(&centered);
                    let focal = batch::broadcast("focal_length", focal, n)?;
                    let pp = batch::broadcast("principal_point", pp, n)?;
                    focal
                        .iter()
                        .zip(&pp)
                        .map(|(f, p)| ndc_k_in_convention(&layout(f.x, f.y, p.x, p.y), convention))
                        .collect()
                } else {
                    let focal = self.focal_length.as_deref().ok_or_else(|| {
                        CameraError::InvalidParameter(format!(
                            "screen-space {kind} need K or focal_length"
                        ))
                    })?;
                    let sizes = self.image_size.as_ref().ok_or_else(|| {
                        CameraError::InvalidParameter(format!(
                            "screen-space {kind} need an image_size"
                        ))
                    })?;
                    sizes.check_len(n)?;
                    let focal = batch::broadcast("focal_length", focal, n)?;
                    let pp = match self.principal_point.as_deref() {
                        Some(pp) => batch::broadcast("principal_point", pp, n)?,
                        None => {
                            debug!("principal point defaults to the image center");
                            sizes.expand(n)?.iter().map(|s| s.center()).collect()
                        }
                    };
                    Ok(focal
                        .iter()
                        .zip(&pp)
                        .map(|(f, p)| {
                            screen_k_in_convention(&layout(f.x, f.y, p.x, p.y), convention)
                        })
                        .collect())
                }
            }
            CameraKind::WeakPerspective => {
                let pred_cam = self.pred_cam.as_deref().ok_or_else(|| {
                    CameraError::InvalidParameter(
                        "WeakPerspectiveCameras need K or pred_cam".to_string(),
                    )
                })?;
                pred_cam
                    .iter()
                    .map(|p| WeakPerspectiveParams::from_pred_cam(*p).to_k(convention))
                    .collect()
            }
            CameraKind::FoVPerspective => {
                let defaults = [FoVPerspectiveParams::default()];
                let params = self.fov_perspective.as_deref().unwrap_or(&defaults);
                batch::broadcast("fov parameters", params, n)?
                    .iter()
                    .map(|p| ndc_k_in_convention(&p.to_k()?, convention))
                    .collect()
            }
            CameraKind::FoVOrthographic => {
                let defaults = [FoVOrthographicParams::default()];
                let params = self.fov_orthographic.as_deref().unwrap_or(&defaults);
                batch::broadcast("fov parameters", params, n)?
                    .iter()
                    .map(|p| ndc_k_in_convention(&p.to_k()?, convention))
                    .collect()
            }
        }
    }

    /// Build against the built-in conventions.
    pub fn build(self) -> Result<Cameras> {
        self.build_in(ConventionRegistry::builtin())
    }

    /// Build, taking the default convention from `registry`.
    pub fn build_in(self, registry: &ConventionRegistry) -> Result<Cameras> {
        let kind = self.kind;
        if self.k.is_some() && self.has_model_params() {
            return Err(CameraError::InvalidParameter(format!(
                "{kind}: pass either K or model parameters, not both"
            )));
        }
        if !self.in_ndc && !kind.supports_screen() {
            return Err(CameraError::InvalidParameter(format!(
                "{kind} are defined in NDC only"
            )));
        }
        self.check_params_for_kind()?;
        let n = self.resolve_len()?;

        let convention = match &self.convention {
            Some(c) => c.clone(),
            None => registry.get(DEFAULT_CONVENTION)?.clone(),
        };
        let k = self.intrinsics(n, &convention)?;
        if self.r.is_none() || self.t.is_none() {
            debug!(
                "{kind}: defaulting {}{} for {n} camera(s)",
                if self.r.is_none() { "R = I " } else { "" },
                if self.t.is_none() { "T = 0" } else { "" }
            );
        }
        let r = self.r.unwrap_or_else(|| vec![Mat3::identity(); n]);
        let t = self.t.unwrap_or_else(|| vec![Vec3::zeros(); n]);
        debug!(
            "built {n} {kind} in `{}` ({})",
            convention.name(),
            if self.in_ndc { "ndc" } else { "screen" }
        );
        let batch = CameraBatch::new(k, r, t, convention, self.in_ndc, self.image_size)?;
        Cameras::from_batch(kind, batch)
    }
}
