mod advisory;
mod frame;

pub use advisory::{EntityAxis, LockKind, SnapAdvisory, SnapCandidate, SnapReference};
pub use frame::{Reference, SnapFrame};

use std::f64::consts::FRAC_PI_2;

use tracing::error;

use crate::config::{MeasureSettings, UnitConfig};
use crate::error::{Result, SnapError};
use crate::graph::{MeasureGraph, VertexId};
use crate::math::{angle_between, rotate_about, round_to_step, Point3, Vector3, TOLERANCE};
use crate::world::World;

/// Which snap modifiers are held this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapModifiers {
    /// Lock the direction to a nearby reference axis or plane.
    pub precise_direction: bool,
    /// Round the length to the ruler unit.
    pub snap_length: bool,
    /// Round the angle to the angular increment.
    pub snap_angle: bool,
}

/// Result of one snap evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapOutcome {
    /// Snapped world position of the tentative endpoint.
    pub position: Point3,
    /// Direction taken by a direction or plane lock.
    pub locked_direction: Option<Vector3>,
    /// Normal of the locked plane, for plane locks.
    pub rotation_axis: Option<Vector3>,
    /// Distance from the fixed endpoint along the final direction.
    pub distance: f64,
    pub advisories: Vec<SnapAdvisory>,
    /// Every reference evaluated by the direction snap, in priority order.
    pub candidates: Vec<SnapCandidate>,
}

impl SnapOutcome {
    fn unchanged(position: Point3) -> Self {
        Self {
            position,
            locked_direction: None,
            rotation_axis: None,
            distance: 0.0,
            advisories: Vec::new(),
            candidates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Lock {
    direction: Vector3,
    axis: Option<Vector3>,
}

/// Stateless snapping heuristics.
///
/// For identical graph, world and inputs `apply` always yields the same outcome.
#[derive(Debug, Clone)]
pub struct SnapEngine {
    snap_cosine: f64,
    joint_tolerance: f64,
    gravity_interference: f64,
}

impl SnapEngine {
    #[must_use]
    pub fn new(settings: &MeasureSettings) -> Self {
        Self {
            snap_cosine: settings.snap_cosine,
            joint_tolerance: settings.joint_tolerance,
            gravity_interference: settings.gravity_interference,
        }
    }

    /// Snaps `raw_aim` relative to the fixed endpoint `other`.
    ///
    /// Direction snapping evaluates the references of [`SnapFrame::references`]
    /// in order; the first within the snap cosine locks and later ones are only
    /// reported. Length snapping rounds the distance along the final direction
    /// to the ruler unit. Angle snapping rotates the result onto the nearest
    /// angular increment from a reference line.
    ///
    /// # Errors
    ///
    /// Returns an error if `other` is not in the graph.
    pub fn apply<W>(
        &self,
        graph: &MeasureGraph,
        world: &W,
        other: VertexId,
        raw_aim: Point3,
        modifiers: SnapModifiers,
        units: &UnitConfig,
    ) -> Result<SnapOutcome>
    where
        W: World + ?Sized,
    {
        let frame = SnapFrame::collect(graph, world, other, self.joint_tolerance, self.gravity_interference)?;
        let raw = raw_aim - frame.anchor_point;
        let raw_distance = raw.norm();
        let Some(raw_dir) = raw.try_normalize(TOLERANCE) else {
            return Ok(SnapOutcome::unchanged(raw_aim));
        };

        let mut advisories = Vec::new();
        let mut candidates = Vec::new();

        let lock = if modifiers.precise_direction {
            self.lock_direction(&frame, &raw_dir, &mut candidates, &mut advisories)
        } else {
            None
        };

        let mut direction = lock.map_or(raw_dir, |l| l.direction);
        let mut distance = match lock {
            Some(l) => raw.dot(&l.direction),
            None => raw_distance,
        };

        if modifiers.snap_length {
            distance = round_to_step(distance, units.ruler_unit());
            advisories.push(SnapAdvisory::LengthSnapped { meters: distance });
        }

        if modifiers.snap_angle {
            match snap_angle(&frame, lock.as_ref(), &raw_dir, units.angle_increment()) {
                Ok((snapped, radians)) => {
                    direction = snapped;
                    advisories.push(SnapAdvisory::AngleSnapped {
                        degrees: radians.to_degrees(),
                    });
                }
                Err(SnapError::MissingReference) => advisories.push(SnapAdvisory::NoAngleReference),
                Err(err @ SnapError::InvalidAngle { .. }) => {
                    error!(%err, "angle snap abandoned");
                    advisories.push(SnapAdvisory::AngleUnavailable);
                }
            }
        }

        Ok(SnapOutcome {
            position: frame.anchor_point + direction * distance,
            locked_direction: lock.map(|l| l.direction),
            rotation_axis: lock.and_then(|l| l.axis),
            distance,
            advisories,
            candidates,
        })
    }

    /// Evaluates every reference; the first axis or plane within the snap
    /// cosine takes the lock.
    fn lock_direction(
        &self,
        frame: &SnapFrame,
        raw_dir: &Vector3,
        candidates: &mut Vec<SnapCandidate>,
        advisories: &mut Vec<SnapAdvisory>,
    ) -> Option<Lock> {
        let mut lock: Option<Lock> = None;

        for Reference { reference, axis, plane } in frame.references(raw_dir) {
            let cosine = raw_dir.dot(&axis);
            let oriented = if cosine < 0.0 { -axis } else { axis };
            let locked = lock.is_none() && cosine.abs() >= self.snap_cosine;
            candidates.push(SnapCandidate {
                reference,
                kind: LockKind::Axis,
                direction: oriented,
                cosine: cosine.abs(),
                locked,
            });
            if locked {
                lock = Some(Lock {
                    direction: oriented,
                    axis: None,
                });
                advisories.push(SnapAdvisory::DirectionLocked(reference));
            }

            if !plane {
                continue;
            }
            let Some(horizon) = (raw_dir - axis * cosine).try_normalize(TOLERANCE) else {
                continue;
            };
            let plane_cosine = horizon.dot(raw_dir);
            let locked = lock.is_none() && plane_cosine >= self.snap_cosine;
            candidates.push(SnapCandidate {
                reference,
                kind: LockKind::Plane,
                direction: horizon,
                cosine: plane_cosine,
                locked,
            });
            if locked {
                lock = Some(Lock {
                    direction: horizon,
                    axis: Some(axis),
                });
                advisories.push(SnapAdvisory::PlaneLocked(reference));
            }
        }

        lock
    }
}

/// Picks the angle-snapped direction and the snapped angle in radians.
///
/// With a plane lock next to a connected line, the angle is measured in the
/// locked plane from that line. Without any lock, it is measured from the
/// line the fixed endpoint is anchored to.
fn snap_angle(
    frame: &SnapFrame,
    lock: Option<&Lock>,
    raw_dir: &Vector3,
    increment: f64,
) -> std::result::Result<(Vector3, f64), SnapError> {
    match (lock, frame.joint_line, frame.anchor_line) {
        (Some(Lock { direction, axis: Some(axis) }), Some((_, joint_dir)), _) => {
            let Some(base) = (joint_dir - axis * joint_dir.dot(axis)).try_normalize(TOLERANCE) else {
                return Err(SnapError::MissingReference);
            };
            let angle = angle_between(&base, direction)?;
            let rounded = round_to_step(angle, increment);
            let turn = if axis.dot(&base.cross(direction)) < 0.0 { -axis } else { *axis };
            let snapped = rotate_about(&base, &turn, rounded).ok_or(SnapError::MissingReference)?;
            Ok((snapped, rounded))
        }
        (None, _, Some((_, line_dir))) => {
            let angle = angle_between(&line_dir, raw_dir)?;
            let rounded = round_to_step(angle, increment);
            let snapped = match rotate_about(&line_dir, &line_dir.cross(raw_dir), rounded) {
                Some(dir) => dir,
                None if rounded > FRAC_PI_2 => -line_dir,
                None => line_dir,
            };
            Ok((snapped, rounded))
        }
        _ => Err(SnapError::MissingReference),
    }
}
