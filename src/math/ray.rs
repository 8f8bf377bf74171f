use crate::error::{GeometryError, Result};

use super::{Point3, Vector3, TOLERANCE};

/// A half-infinite ray defined by an origin point and a unit direction.
///
/// The parametric form is: `P(t) = origin + t * direction`, `t >= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Point3,
    direction: Vector3,
}

impl Ray {
    /// Creates a new ray, normalizing `direction`.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vector is zero-length.
    pub fn new(origin: Point3, direction: Vector3) -> Result<Self> {
        let len = direction.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            origin,
            direction: direction / len,
        })
    }

    /// Returns the origin of the ray.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the unit direction of the ray.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }

    /// Evaluates the ray at parameter `t`.
    #[must_use]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }
}

/// Intersects a ray with a sphere.
///
/// Returns the distance along the ray to the first surface crossing, or the
/// exit crossing when the ray starts inside the sphere. `None` when the sphere
/// is missed or lies entirely behind the origin.
#[must_use]
pub fn ray_sphere_intersect(ray: &Ray, center: &Point3, radius: f64) -> Option<f64> {
    let oc = center - ray.origin();
    let tca = oc.dot(ray.direction());
    let d2 = oc.norm_squared() - tca * tca;
    let r2 = radius * radius;
    if d2 > r2 {
        return None;
    }
    let thc = (r2 - d2).sqrt();
    let t0 = tca - thc;
    let t1 = tca + thc;
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        Some(t1)
    } else {
        None
    }
}

/// Closest approach between a ray's supporting line and a segment's line.
#[derive(Debug, Clone, Copy)]
pub struct SegmentApproach {
    /// Parameter along the ray (distance from the ray origin).
    pub ray_param: f64,
    /// Distance from the segment start `a` along `a → b`. Not clamped.
    pub segment_param: f64,
    /// Segment length `|b − a|`.
    pub segment_length: f64,
    /// Closest point on the segment's line.
    pub point: Point3,
    /// Distance between the two closest points.
    pub gap: f64,
}

/// Computes the closest points between the ray line and the line through `a`, `b`.
///
/// Returns `None` for a zero-length segment or when both lines are parallel.
#[must_use]
pub fn ray_segment_closest(ray: &Ray, a: &Point3, b: &Point3) -> Option<SegmentApproach> {
    let ab = b - a;
    let segment_length = ab.norm();
    if segment_length < TOLERANCE {
        return None;
    }
    let u = ab / segment_length;
    let d = ray.direction();

    let w0 = ray.origin() - a;
    let cos = d.dot(&u);
    let denom = 1.0 - cos * cos;
    if denom < TOLERANCE {
        return None;
    }
    let dw = d.dot(&w0);
    let uw = u.dot(&w0);

    let ray_param = (cos * uw - dw) / denom;
    let segment_param = (uw - cos * dw) / denom;

    let point = a + u * segment_param;
    let gap = (ray.at(ray_param) - point).norm();

    Some(SegmentApproach {
        ray_param,
        segment_param,
        segment_length,
        point,
        gap,
    })
}

/// Returns the minimum distance from `point` to the segment `a → b`.
#[must_use]
pub fn distance_to_segment(point: &Point3, a: &Point3, b: &Point3) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return (point - a).norm();
    }
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (point - (a + ab * t)).norm()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    #[test]
    fn zero_direction_is_rejected() {
        assert!(Ray::new(p(0.0, 0.0, 0.0), v(0.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn sphere_in_front_is_hit_at_entry() {
        let ray = Ray::new(p(0.0, 0.0, 0.0), v(0.0, 0.0, 2.0)).unwrap();
        let t = ray_sphere_intersect(&ray, &p(0.0, 0.0, 5.0), 0.5).unwrap();
        assert_relative_eq!(t, 4.5, epsilon = 1e-12);
    }

    #[test]
    fn sphere_behind_is_missed() {
        let ray = Ray::new(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0)).unwrap();
        assert!(ray_sphere_intersect(&ray, &p(0.0, 0.0, -5.0), 0.5).is_none());
    }

    #[test]
    fn sphere_off_axis_is_missed() {
        let ray = Ray::new(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0)).unwrap();
        assert!(ray_sphere_intersect(&ray, &p(0.6, 0.0, 5.0), 0.5).is_none());
    }

    #[test]
    fn origin_inside_sphere_uses_exit() {
        let ray = Ray::new(p(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0)).unwrap();
        let t = ray_sphere_intersect(&ray, &p(0.0, 0.0, 0.0), 1.0).unwrap();
        assert_relative_eq!(t, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn skew_lines_closest_points() {
        // Ray along +Z, segment parallel to X at height y = 0.2, z = 3.
        let ray = Ray::new(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0)).unwrap();
        let approach = ray_segment_closest(&ray, &p(-1.0, 0.2, 3.0), &p(1.0, 0.2, 3.0)).unwrap();
        assert_relative_eq!(approach.ray_param, 3.0, epsilon = 1e-12);
        assert_relative_eq!(approach.segment_param, 1.0, epsilon = 1e-12);
        assert_relative_eq!(approach.segment_length, 2.0, epsilon = 1e-12);
        assert_relative_eq!(approach.gap, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn parallel_segment_has_no_single_approach() {
        let ray = Ray::new(p(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0)).unwrap();
        assert!(ray_segment_closest(&ray, &p(0.0, 1.0, 0.0), &p(4.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn point_segment_distance_clamps_to_endpoints() {
        let a = p(0.0, 0.0, 0.0);
        let b = p(2.0, 0.0, 0.0);
        assert_relative_eq!(distance_to_segment(&p(1.0, 1.0, 0.0), &a, &b), 1.0);
        assert_relative_eq!(distance_to_segment(&p(5.0, 0.0, 0.0), &a, &b), 3.0);
    }
}
