//! Camera axis conventions and the registry that names them.
//!
//! A convention states, in the camera's own coordinates, which signed axis
//! points **right**, which points **up** and which points **backward** (away
//! from the scene), plus the matrix-multiplication side used for the
//! extrinsic rotation.
//!
//! | name      | right | up | backward | side  |
//! |-----------|-------|----|----------|-------|
//! | opencv    | +X    | −Y | −Z       | left  |
//! | opengl    | +X    | +Y | +Z       | left  |
//! | pytorch3d | −X    | +Y | −Z       | right |
//! | pyrender  | +X    | +Y | +Z       | left  |
//! | open3d    | +X    | −Y | −Z       | left  |
//!
//! From the triplet every other quantity is derived:
//! - the basis `C` whose rows are right/up/backward, so `semantic = C · X`,
//! - the change of basis `M = C_dstᵀ · C_src` with `X_dst = M · X_src`,
//! - the image axes `Q` mapping NDC (camera X, Y) onto screen (right, down),
//! - the forward sign of camera Z used by the intrinsic layouts.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{is_signed_permutation, CameraError, Mat2, Mat3, Real, Result, Vec3};

/// One of the three camera axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// A camera axis with a direction, e.g. `-y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignedAxis {
    pub axis: Axis,
    pub negative: bool,
}

impl SignedAxis {
    pub const POS_X: Self = Self::new(Axis::X, false);
    pub const NEG_X: Self = Self::new(Axis::X, true);
    pub const POS_Y: Self = Self::new(Axis::Y, false);
    pub const NEG_Y: Self = Self::new(Axis::Y, true);
    pub const POS_Z: Self = Self::new(Axis::Z, false);
    pub const NEG_Z: Self = Self::new(Axis::Z, true);

    pub const fn new(axis: Axis, negative: bool) -> Self {
        Self { axis, negative }
    }

    pub fn sign(self) -> Real {
        if self.negative {
            -1.0
        } else {
            1.0
        }
    }

    /// Unit vector of this axis in camera coordinates.
    pub fn to_vector(self) -> Vec3 {
        let mut v = Vec3::zeros();
        v[self.axis.index()] = self.sign();
        v
    }
}

impl fmt::Display for SignedAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axis = match self.axis {
            Axis::X => 'x',
            Axis::Y => 'y',
            Axis::Z => 'z',
        };
        if self.negative {
            write!(f, "-{axis}")
        } else {
            write!(f, "{axis}")
        }
    }
}

/// Signed camera axes pointing right, up and backward.
///
/// Written in notation as three signed axes, `'+'` optional: OpenCV is
/// `"x-y-z"`, OpenGL is `"xyz"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AxisTriplet {
    pub right: SignedAxis,
    pub up: SignedAxis,
    pub backward: SignedAxis,
}

impl AxisTriplet {
    /// Build a triplet; the three axes must be distinct.
    pub fn new(right: SignedAxis, up: SignedAxis, backward: SignedAxis) -> Result<Self> {
        let triplet = Self {
            right,
            up,
            backward,
        };
        if !is_signed_permutation(&triplet.basis()) {
            return Err(CameraError::InvalidParameter(format!(
                "axis triplet `{triplet}` must use each of x, y, z exactly once"
            )));
        }
        Ok(triplet)
    }

    /// Basis `C` with rows right, up, backward: `semantic = C · X_camera`.
    pub fn basis(&self) -> Mat3 {
        Mat3::from_rows(&[
            self.right.to_vector().transpose(),
            self.up.to_vector().transpose(),
            self.backward.to_vector().transpose(),
        ])
    }

    /// Whether the camera frame itself is right-handed.
    pub fn is_right_handed(&self) -> bool {
        self.basis().determinant() > 0.0
    }
}

impl fmt::Display for AxisTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.right, self.up, self.backward)
    }
}

impl FromStr for AxisTriplet {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CameraError::InvalidParameter(format!("invalid axis notation `{s}`"));
        let mut axes = Vec::with_capacity(3);
        let mut negative = false;
        let mut pending_sign = false;
        for c in s.chars().filter(|c| !c.is_whitespace() && *c != ',') {
            match c.to_ascii_lowercase() {
                '+' | '-' if pending_sign => return Err(invalid()),
                '+' => pending_sign = true,
                '-' => {
                    negative = true;
                    pending_sign = true;
                }
                c @ ('x' | 'y' | 'z') => {
                    let axis = match c {
                        'x' => Axis::X,
                        'y' => Axis::Y,
                        _ => Axis::Z,
                    };
                    axes.push(SignedAxis::new(axis, negative));
                    negative = false;
                    pending_sign = false;
                }
                _ => return Err(invalid()),
            }
        }
        match axes.as_slice() {
            [right, up, backward] if !pending_sign => Self::new(*right, *up, *backward),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for AxisTriplet {
    type Error = CameraError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<AxisTriplet> for String {
    fn from(value: AxisTriplet) -> Self {
        value.to_string()
    }
}

/// Matrix-multiplication side of the extrinsic rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixSide {
    /// Column vectors, `X_view = R · X_world + T`.
    #[default]
    Left,
    /// Row vectors, `X_view = X_world · R + T`.
    Right,
}

impl MatrixSide {
    /// Re-express a rotation stored on this side in column-vector form.
    pub fn to_column(self, r: &Mat3) -> Mat3 {
        match self {
            MatrixSide::Left => *r,
            MatrixSide::Right => r.transpose(),
        }
    }

    /// Re-express a column-vector rotation on this side.
    pub fn from_column(self, r: &Mat3) -> Mat3 {
        // A transpose is its own inverse.
        self.to_column(r)
    }
}

/// A named camera convention. Immutable once registered.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Convention {
    name: String,
    axes: AxisTriplet,
    #[serde(default)]
    side: MatrixSide,
}

impl Convention {
    /// Column-vector convention with the given axes.
    pub fn new(name: impl Into<String>, axes: AxisTriplet) -> Self {
        Self {
            name: name.into(),
            axes,
            side: MatrixSide::Left,
        }
    }

    pub fn with_side(mut self, side: MatrixSide) -> Self {
        self.side = side;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn axes(&self) -> AxisTriplet {
        self.axes
    }

    pub fn side(&self) -> MatrixSide {
        self.side
    }

    /// Basis `C` of this convention (see [`AxisTriplet::basis`]).
    pub fn basis(&self) -> Mat3 {
        self.axes.basis()
    }

    /// Change of basis `M` with `X_dst = M · X_self`.
    pub fn change_of_basis_to(&self, dst: &Convention) -> Mat3 {
        dst.basis().transpose() * self.basis()
    }

    /// Matrix mapping camera coordinates to the (right, down, forward) frame
    /// in which pixel-space intrinsics are written.
    pub fn to_screen_frame(&self) -> Mat3 {
        let c = self.basis();
        Mat3::from_rows(&[c.row(0).into_owned(), -c.row(1), -c.row(2)])
    }

    /// Image axes `Q`: maps NDC coordinates, measured along camera X and Y,
    /// onto screen (right, down).
    ///
    /// Fails when camera X or Y lies on the optical axis.
    pub fn image_axes(&self) -> Result<Mat2> {
        let d = self.to_screen_frame();
        let q = d.fixed_view::<2, 2>(0, 0).into_owned();
        if !is_signed_permutation(&q) {
            return Err(CameraError::InvalidParameter(format!(
                "convention `{}` does not keep its image plane on camera X/Y",
                self.name
            )));
        }
        Ok(q)
    }

    /// `+1` if camera +Z looks into the scene, `-1` if it points backward.
    pub fn forward_sign(&self) -> Result<Real> {
        match self.axes.backward.axis {
            Axis::Z => Ok(-self.axes.backward.sign()),
            _ => Err(CameraError::InvalidParameter(format!(
                "convention `{}` does not look along camera Z",
                self.name
            ))),
        }
    }
}

/// Registry of named conventions.
///
/// Populate it during setup, then share it by reference: lookups borrow the
/// registry immutably and registration needs `&mut`, so the borrow checker
/// enforces the single-writer discipline without locks.
#[derive(Clone, Debug, Default)]
pub struct ConventionRegistry {
    entries: Vec<Convention>,
}

impl ConventionRegistry {
    /// A registry with no conventions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding the five built-in conventions.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for convention in builtin_conventions() {
            registry.entries.push(convention);
        }
        registry
    }

    /// Process-wide read-only registry of the built-ins, created on first use.
    pub fn builtin() -> &'static ConventionRegistry {
        static BUILTIN: OnceLock<ConventionRegistry> = OnceLock::new();
        BUILTIN.get_or_init(ConventionRegistry::with_builtins)
    }

    /// Register a column-vector convention under `name`.
    pub fn register(&mut self, name: &str, axes: AxisTriplet) -> Result<&Convention> {
        self.insert(Convention::new(name, axes))
    }

    /// Register a fully specified convention.
    pub fn insert(&mut self, convention: Convention) -> Result<&Convention> {
        if self.contains(convention.name()) {
            return Err(CameraError::DuplicateConvention(convention.name));
        }
        debug!(
            "registering convention `{}` (axes {}, {:?} multiplication)",
            convention.name, convention.axes, convention.side
        );
        self.entries.push(convention);
        let index = self.entries.len() - 1;
        Ok(&self.entries[index])
    }

    /// Look up a convention by name.
    pub fn get(&self, name: &str) -> Result<&Convention> {
        self.entries
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CameraError::UnknownConvention(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|c| c.name == name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|c| c.name.as_str())
    }
}

fn builtin_conventions() -> [Convention; 5] {
    use SignedAxis as A;

    let opencv = AxisTriplet {
        right: A::POS_X,
        up: A::NEG_Y,
        backward: A::NEG_Z,
    };
    let opengl = AxisTriplet {
        right: A::POS_X,
        up: A::POS_Y,
        backward: A::POS_Z,
    };
    let pytorch3d = AxisTriplet {
        right: A::NEG_X,
        up: A::POS_Y,
        backward: A::NEG_Z,
    };

    [
        Convention::new("opengl", opengl),
        Convention::new("opencv", opencv),
        Convention::new("pytorch3d", pytorch3d).with_side(MatrixSide::Right),
        Convention::new("pyrender", opengl),
        Convention::new("open3d", opencv),
    ]
}
