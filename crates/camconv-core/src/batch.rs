//! Batch bookkeeping shared by the converters.
//!
//! Every camera attribute is a batch of `N` independent entries. Attributes
//! that belong to the camera itself (K, R, T) must agree on `N` exactly;
//! auxiliary per-camera values (resolutions, depths, model parameters) may
//! also be given once and broadcast.

use crate::{CameraError, Pt3, Real, Result};

/// Resolve the common batch length of the supplied attributes.
///
/// Absent attributes (`None`) do not participate. When nothing is supplied
/// the batch holds a single camera.
pub fn common_len(parts: &[(&str, Option<usize>)]) -> Result<usize> {
    let mut found: Option<(&str, usize)> = None;
    for (name, len) in parts {
        let Some(len) = *len else {
            continue;
        };
        match found {
            None => found = Some((name, len)),
            Some((first, n)) if n != len => {
                return Err(CameraError::shape(
                    format!("batch length of {name}"),
                    format!("{n} (from {first})"),
                    len,
                ));
            }
            Some(_) => {}
        }
    }
    Ok(found.map_or(1, |(_, n)| n))
}

/// Check that an auxiliary value list can be broadcast to `n` cameras.
pub fn check_broadcast(what: &str, len: usize, n: usize) -> Result<()> {
    if len == 1 || len == n {
        Ok(())
    } else {
        Err(CameraError::shape(what, format!("1 or {n}"), len))
    }
}

/// Broadcast a value list of length 1 or `n` to exactly `n` values.
pub fn broadcast<T: Clone>(what: &str, values: &[T], n: usize) -> Result<Vec<T>> {
    check_broadcast(what, values.len(), n)?;
    if values.len() == n {
        Ok(values.to_vec())
    } else {
        Ok(vec![values[0].clone(); n])
    }
}

/// Gather `values[indices]`, failing on out-of-range indices.
pub fn gather<T: Clone>(values: &[T], indices: &[usize]) -> Result<Vec<T>> {
    indices
        .iter()
        .map(|&index| {
            values.get(index).cloned().ok_or(CameraError::IndexOutOfRange {
                index,
                len: values.len(),
            })
        })
        .collect()
}

/// Validate a raw `N × P × 3` array into typed point sets.
pub fn points_from_nested(raw: &[Vec<Vec<Real>>]) -> Result<Vec<Vec<Pt3>>> {
    raw.iter()
        .enumerate()
        .map(|(b, set)| {
            set.iter()
                .enumerate()
                .map(|(p, xyz)| match xyz.as_slice() {
                    [x, y, z] => Ok(Pt3::new(*x, *y, *z)),
                    other => Err(CameraError::shape(
                        format!("points[{b}][{p}] last dimension"),
                        3,
                        other.len(),
                    )),
                })
                .collect()
        })
        .collect()
}
