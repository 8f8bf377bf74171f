use std::f64::consts::PI;

use crate::error::SnapError;

use super::{UnitQuaternion, UnitVector3, Vector3, TOLERANCE};

/// Angle between two directions in radians: `acos(clamp(â · b̂, -1, 1))`.
///
/// # Errors
///
/// Returns [`SnapError::InvalidAngle`] when either vector is zero-length or the
/// result falls outside `(0, π]`.
pub fn angle_between(a: &Vector3, b: &Vector3) -> Result<f64, SnapError> {
    let (Some(a), Some(b)) = (a.try_normalize(TOLERANCE), b.try_normalize(TOLERANCE)) else {
        return Err(SnapError::InvalidAngle { radians: f64::NAN });
    };
    let radians = a.dot(&b).clamp(-1.0, 1.0).acos();
    if radians <= 0.0 || radians > PI {
        return Err(SnapError::InvalidAngle { radians });
    }
    Ok(radians)
}

/// Rounds `value` to the nearest integer multiple of `step`.
///
/// A non-positive `step` leaves the value untouched.
#[must_use]
pub fn round_to_step(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    (value / step).round() * step
}

/// Rotates `v` about `axis` by `angle` radians (right-handed).
///
/// Returns `None` when the axis is zero-length.
#[must_use]
pub fn rotate_about(v: &Vector3, axis: &Vector3, angle: f64) -> Option<Vector3> {
    let axis = UnitVector3::try_new(*axis, TOLERANCE)?;
    Some(UnitQuaternion::from_axis_angle(&axis, angle) * v)
}
