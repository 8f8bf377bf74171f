use std::collections::{HashMap, HashSet};

use crate::math::{Isometry3, Point3, Vector3};

use super::{BroadPhase, CellCoord, EntityId, EntityShape, EntityTransforms, GravityField, RayCaster, RayHit};

/// In-memory scene for tests.
#[derive(Debug, Default)]
pub struct MockWorld {
    pub hits: Vec<RayHit>,
    pub entities: HashMap<EntityId, MockEntity>,
    pub overlaps: Vec<EntityId>,
    pub cells: HashMap<EntityId, Vec<CellCoord>>,
    pub occupied: HashSet<(EntityId, CellCoord)>,
    pub natural_gravity: Vector3,
    pub artificial_gravity: Vector3,
}

#[derive(Debug, Clone)]
pub struct MockEntity {
    pub transform: Isometry3,
    pub shape: EntityShape,
}

impl MockWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entity(&mut self, id: EntityId, transform: Isometry3, shape: EntityShape) {
        self.entities.insert(id, MockEntity { transform, shape });
    }

    pub fn move_entity(&mut self, id: EntityId, transform: Isometry3) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.transform = transform;
        }
    }

    pub fn remove_entity(&mut self, id: EntityId) {
        self.entities.remove(&id);
        self.hits.retain(|hit| hit.entity != id);
        self.overlaps.retain(|e| *e != id);
    }
}

impl RayCaster for MockWorld {
    fn cast_ray(&self, from: &Point3, to: &Point3, _layer_mask: u32) -> Vec<RayHit> {
        let seg = to - from;
        let len_sq = seg.norm_squared();
        let mut hits: Vec<RayHit> = self
            .hits
            .iter()
            .filter(|hit| {
                let t = (hit.position - from).dot(&seg) / len_sq;
                (0.0..=1.0).contains(&t)
            })
            .copied()
            .collect();
        hits.sort_by(|a, b| {
            let da = (a.position - from).norm_squared();
            let db = (b.position - from).norm_squared();
            da.total_cmp(&db)
        });
        hits
    }
}

impl BroadPhase for MockWorld {
    fn overlap_segment(&self, _from: &Point3, _to: &Point3) -> Vec<EntityId> {
        self.overlaps.clone()
    }

    fn entity_shape(&self, entity: EntityId) -> Option<EntityShape> {
        self.entities.get(&entity).map(|e| e.shape)
    }

    fn ray_cast_cells(&self, entity: EntityId, _from: &Point3, _to: &Point3) -> Vec<CellCoord> {
        self.cells.get(&entity).cloned().unwrap_or_default()
    }

    fn cell_occupied(&self, entity: EntityId, cell: &CellCoord) -> bool {
        self.occupied.contains(&(entity, *cell))
    }
}

impl EntityTransforms for MockWorld {
    fn entity_transform(&self, entity: EntityId) -> Option<Isometry3> {
        self.entities.get(&entity).map(|e| e.transform)
    }
}

impl GravityField for MockWorld {
    fn natural_gravity_at(&self, _position: &Point3) -> Vector3 {
        self.natural_gravity
    }

    fn artificial_gravity_at(&self, _position: &Point3, _interference: f64) -> Vector3 {
        self.artificial_gravity
    }
}

/// Installs a tracing subscriber for test output; later calls are no-ops.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}
