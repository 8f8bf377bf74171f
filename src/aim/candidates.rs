use crate::math::{ray_sphere_intersect, Point3, Vector3, TOLERANCE};
use crate::world::{CellCoord, EntityId, EntityShape, World};

use super::{AimQuery, AimResult};

/// A snap point fixed in an entity's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub entity: EntityId,
    pub local: Point3,
    pub local_normal: Option<Vector3>,
}

/// Candidate points along the aim ray, rebuilt every few ticks.
///
/// The list is stored in entity-local coordinates and mapped through each
/// entity's current transform on every query, so moving entities are tracked
/// between rebuilds.
#[derive(Debug, Default)]
pub struct CandidateCache {
    candidates: Vec<Candidate>,
    ticks: u32,
}

impl CandidateCache {
    /// Advances the tick counter, rebuilding the list on every
    /// `rescan_ticks`-th call (including the first).
    pub fn tick<W>(&mut self, world: &W, query: &AimQuery, rescan_ticks: u32)
    where
        W: World + ?Sized,
    {
        if self.ticks % rescan_ticks.max(1) == 0 {
            self.rebuild(world, query);
        }
        self.ticks = self.ticks.wrapping_add(1);
    }

    /// Drops the list so the next tick rebuilds immediately.
    pub fn reset(&mut self) {
        self.candidates.clear();
        self.ticks = 0;
    }

    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    fn rebuild<W>(&mut self, world: &W, query: &AimQuery)
    where
        W: World + ?Sized,
    {
        self.candidates.clear();
        let from = *query.ray.origin();
        let to = query.ray.at(query.max_range);

        for entity in world.overlap_segment(&from, &to) {
            if Some(entity) == query.controlled_entity {
                continue;
            }
            match world.entity_shape(entity) {
                Some(EntityShape::Character { head }) => {
                    self.push(entity, Point3::origin(), None);
                    self.push(entity, head, None);
                }
                Some(EntityShape::Grid { cell_size }) => {
                    let first_occupied = world
                        .ray_cast_cells(entity, &from, &to)
                        .into_iter()
                        .find(|cell| world.cell_occupied(entity, cell));
                    if let Some(cell) = first_occupied {
                        self.push_cell(entity, &cell, cell_size);
                    }
                }
                Some(EntityShape::Other) | None => {}
            }
        }
        tracing::trace!(count = self.candidates.len(), "candidate points rebuilt");
    }

    fn push(&mut self, entity: EntityId, local: Point3, local_normal: Option<Vector3>) {
        self.candidates.push(Candidate {
            entity,
            local,
            local_normal,
        });
    }

    /// Cell center, 8 corners (with outward normals) and 6 face centers.
    fn push_cell(&mut self, entity: EntityId, cell: &CellCoord, cell_size: f64) {
        let center = Point3::from(cell.map(f64::from) * cell_size);
        let half = cell_size / 2.0;
        self.push(entity, center, None);

        for sx in [-1.0, 1.0] {
            for sy in [-1.0, 1.0] {
                for sz in [-1.0, 1.0] {
                    let offset = Vector3::new(sx, sy, sz) * half;
                    self.push(entity, center + offset, offset.try_normalize(TOLERANCE));
                }
            }
        }

        for axis in 0..3 {
            for sign in [-1.0, 1.0] {
                let mut offset = Vector3::zeros();
                offset[axis] = sign * half;
                self.push(entity, center + offset, None);
            }
        }
    }

    /// The closest candidate hit by the ray within range, in world space.
    #[must_use]
    pub fn closest<W>(&self, world: &W, query: &AimQuery, radius: f64) -> AimResult
    where
        W: World + ?Sized,
    {
        let origin = query.ray.origin();
        let mut best: Option<(f64, AimResult)> = None;

        for candidate in &self.candidates {
            let Some(transform) = world.entity_transform(candidate.entity) else {
                continue;
            };
            let position = transform.transform_point(&candidate.local);
            let Some(t) = ray_sphere_intersect(&query.ray, &position, radius) else {
                continue;
            };
            if t > query.max_range {
                continue;
            }
            let score = (position - origin).norm_squared();
            if best.as_ref().is_none_or(|(s, _)| score < *s) {
                best = Some((
                    score,
                    AimResult::Entity {
                        entity: candidate.entity,
                        position,
                        normal: candidate.local_normal.map(|n| transform.transform_vector(&n)),
                    },
                ));
            }
        }

        best.map(|(_, result)| result).unwrap_or_default()
    }
}
