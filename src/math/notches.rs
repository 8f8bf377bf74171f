use super::{Point3, TOLERANCE};

/// Slack added to a length before counting notches, so exact multiples of the
/// unit are not lost to floating-point error.
pub const NOTCH_EPSILON: f64 = 1e-4;

/// Places ruler notches along the segment `a → b`.
///
/// Produces `floor((length + ε) / unit)` evenly spaced notches, the `i`-th at
/// `i * unit` from `a`.
#[must_use]
pub fn notch_positions(a: &Point3, b: &Point3, unit: f64) -> Vec<Point3> {
    let ab = b - a;
    let length = ab.norm();
    if unit <= 0.0 || length < TOLERANCE {
        return Vec::new();
    }
    let dir = ab / length;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = ((length + NOTCH_EPSILON) / unit).floor() as usize;

    (1..=count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let offset = i as f64 * unit;
            a + dir * offset
        })
        .collect()
}
