#[cfg(test)]
pub(crate) mod mock;

use crate::math::{Isometry3, Point3, Vector3};

/// Identifier of an external scene entity (character, grid, prop, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Integer coordinate of a cell inside a grid entity.
pub type CellCoord = nalgebra::Vector3<i32>;

/// One hit returned by the world ray-cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: EntityId,
    pub position: Point3,
    pub normal: Vector3,
}

/// Shape information the candidate scan needs about an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityShape {
    /// A character; `head` is the head position in entity-local space.
    Character { head: Point3 },
    /// A block grid with cubic cells of `cell_size` meters, cell `(0, 0, 0)`
    /// centered on the entity origin.
    Grid { cell_size: f64 },
    /// Anything else; contributes no candidate points.
    Other,
}

/// Physics ray-cast service.
pub trait RayCaster {
    /// Casts a ray from `from` to `to`, returning hits ordered by distance.
    fn cast_ray(&self, from: &Point3, to: &Point3, layer_mask: u32) -> Vec<RayHit>;
}

/// Broad-phase spatial queries.
pub trait BroadPhase {
    /// Entities whose bounds overlap the segment `from → to`.
    fn overlap_segment(&self, from: &Point3, to: &Point3) -> Vec<EntityId>;

    /// Shape of an entity, or `None` if it no longer exists.
    fn entity_shape(&self, entity: EntityId) -> Option<EntityShape>;

    /// Grid cells crossed by the world-space segment `from → to`, in order.
    fn ray_cast_cells(&self, entity: EntityId, from: &Point3, to: &Point3) -> Vec<CellCoord>;

    /// Whether a grid cell holds a block.
    fn cell_occupied(&self, entity: EntityId, cell: &CellCoord) -> bool;
}

/// Current placement of movable entities.
pub trait EntityTransforms {
    /// World transform of an entity, or `None` once the entity is removed.
    fn entity_transform(&self, entity: EntityId) -> Option<Isometry3>;
}

/// Gravity queries.
pub trait GravityField {
    /// Natural (planetary) gravity at a world position.
    fn natural_gravity_at(&self, position: &Point3) -> Vector3;

    /// Artificial (generator) gravity at a world position.
    fn artificial_gravity_at(&self, position: &Point3, interference: f64) -> Vector3;
}

/// Everything the measurement core needs from the host scene.
pub trait World: RayCaster + BroadPhase + EntityTransforms + GravityField {}

impl<T> World for T where T: RayCaster + BroadPhase + EntityTransforms + GravityField + ?Sized {}
