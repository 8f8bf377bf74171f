pub mod angle;
pub mod notches;
pub mod ray;

pub use angle::{angle_between, rotate_about, round_to_step};
pub use notches::notch_positions;
pub use ray::{distance_to_segment, ray_segment_closest, ray_sphere_intersect, Ray, SegmentApproach};

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Unit-length 3D vector.
pub type UnitVector3 = nalgebra::Unit<Vector3>;

/// Unit quaternion used for rotations.
pub type UnitQuaternion = nalgebra::UnitQuaternion<f64>;

/// Rigid transform (rotation + translation) of an external entity.
pub type Isometry3 = nalgebra::Isometry3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;
