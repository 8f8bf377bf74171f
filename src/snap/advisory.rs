use std::fmt;

use crate::math::Vector3;

/// Local axis of an anchored entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityAxis {
    Right,
    Up,
    Backward,
}

/// Where a reference direction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapReference {
    /// The line the fixed endpoint is anchored to.
    AnchorLine,
    /// A third line sharing the fixed endpoint's joint.
    JointLine,
    /// The surface normal at the fixed endpoint.
    SurfaceNormal,
    /// An axis of the entity the fixed endpoint is anchored to.
    EntityAxis(EntityAxis),
    /// Combined natural and artificial gravity.
    Gravity,
}

/// Whether a candidate locks onto a direction or onto the plane orthogonal to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockKind {
    Axis,
    Plane,
}

/// One evaluated reference, locked or not; for on-screen feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapCandidate {
    pub reference: SnapReference,
    pub kind: LockKind,
    /// Direction that would be locked, oriented towards the raw aim.
    pub direction: Vector3,
    /// Cosine between `direction` and the raw aim direction.
    pub cosine: f64,
    /// Whether this candidate took the lock.
    pub locked: bool,
}

/// User-facing note about what a snap did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapAdvisory {
    DirectionLocked(SnapReference),
    PlaneLocked(SnapReference),
    LengthSnapped { meters: f64 },
    AngleSnapped { degrees: f64 },
    /// Angle snap was requested with nothing to measure against.
    NoAngleReference,
    /// Angle snap was abandoned this frame.
    AngleUnavailable,
}

impl fmt::Display for SnapReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnchorLine => f.write_str("anchored line"),
            Self::JointLine => f.write_str("connected line"),
            Self::SurfaceNormal => f.write_str("surface normal"),
            Self::EntityAxis(EntityAxis::Right) => f.write_str("entity right axis"),
            Self::EntityAxis(EntityAxis::Up) => f.write_str("entity up axis"),
            Self::EntityAxis(EntityAxis::Backward) => f.write_str("entity backward axis"),
            Self::Gravity => f.write_str("gravity"),
        }
    }
}

impl fmt::Display for SnapAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DirectionLocked(reference) => write!(f, "Aligned to {reference}"),
            Self::PlaneLocked(reference) => write!(f, "Locked to plane of {reference}"),
            Self::LengthSnapped { meters } => write!(f, "Length snapped to {meters:.2} m"),
            Self::AngleSnapped { degrees } => write!(f, "Angle snapped to {degrees:.0}°"),
            Self::NoAngleReference => {
                f.write_str("Angle snap needs the first point on a line or a plane lock next to a connected line")
            }
            Self::AngleUnavailable => f.write_str("Angle snap unavailable here"),
        }
    }
}
