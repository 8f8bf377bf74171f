mod candidates;

pub use candidates::{Candidate, CandidateCache};

use tracing::trace;

use crate::config::MeasureSettings;
use crate::graph::{LineId, MeasureGraph, VertexId};
use crate::math::{ray_segment_closest, ray_sphere_intersect, round_to_step, Point3, Ray, Vector3};
use crate::world::{EntityId, World};

/// What the aim ray currently points at.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AimResult {
    /// Nothing within range.
    #[default]
    None,
    /// The interior of an existing line.
    Line { line: LineId, position: Point3 },
    /// An endpoint of an existing line.
    Vertex { vertex: VertexId, position: Point3 },
    /// A scene entity (surface hit or candidate point).
    Entity {
        entity: EntityId,
        position: Point3,
        normal: Option<Vector3>,
    },
}

impl AimResult {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Aimed world position, if anything is aimed at.
    #[must_use]
    pub fn position(&self) -> Option<Point3> {
        match self {
            Self::None => None,
            Self::Line { position, .. }
            | Self::Vertex { position, .. }
            | Self::Entity { position, .. } => Some(*position),
        }
    }

    /// Surface normal at the aimed point, if known.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3> {
        match self {
            Self::Entity { normal, .. } => *normal,
            _ => None,
        }
    }

    /// The line under the aim: the hit line itself, or the line hosting the hit vertex.
    #[must_use]
    pub fn targeted_line(&self, graph: &MeasureGraph) -> Option<LineId> {
        match self {
            Self::Line { line, .. } => Some(*line),
            Self::Vertex { vertex, .. } => graph.vertex(*vertex).ok()?.host_line(),
            Self::None | Self::Entity { .. } => None,
        }
    }
}

/// Inputs of one aim resolution.
#[derive(Debug, Clone, Copy)]
pub struct AimQuery {
    /// Camera ray.
    pub ray: Ray,
    /// Maximum aiming distance along the ray.
    pub max_range: f64,
    /// Whether the snap-to-grid modifier is held.
    pub snap_to_grid: bool,
    /// Active ruler unit, used to round line-interior hits when snapping to grid.
    pub ruler_unit: f64,
    /// The user's own entity, never aimed at.
    pub controlled_entity: Option<EntityId>,
}

/// Resolves the aim ray against the graph, then the scene.
///
/// Stateless with respect to the graph; the only state is the candidate cache.
#[derive(Debug)]
pub struct TargetResolver {
    candidates: CandidateCache,
    aimable_radius: f64,
    endpoint_bias: f64,
    layer_mask: u32,
    rescan_ticks: u32,
}

impl TargetResolver {
    #[must_use]
    pub fn new(settings: &MeasureSettings) -> Self {
        Self {
            candidates: CandidateCache::default(),
            aimable_radius: settings.aimable_radius,
            endpoint_bias: settings.endpoint_bias,
            layer_mask: settings.ray_layer_mask,
            rescan_ticks: settings.rescan_ticks,
        }
    }

    /// Candidate points from the last rescan.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        self.candidates.candidates()
    }

    /// Resolves the aim for this tick.
    ///
    /// Existing measurements are tested first. Without grid snapping the world
    /// ray-cast follows; with it, the cached candidate points do.
    pub fn resolve<W>(&mut self, graph: &MeasureGraph, world: &W, query: &AimQuery) -> AimResult
    where
        W: World + ?Sized,
    {
        if let Some(hit) = self.hit_graph(graph, query) {
            trace!(?hit, "aim on graph");
            return hit;
        }

        if query.snap_to_grid {
            self.candidates.tick(world, query, self.rescan_ticks);
            self.candidates.closest(world, query, self.aimable_radius)
        } else {
            self.candidates.reset();
            self.cast_world(world, query)
        }
    }

    /// Hit-tests every line's endpoints and, when no endpoint of a line is
    /// hit, its interior. Endpoint hits are ranked `endpoint_bias` closer
    /// than they are so they win close ties against line interiors.
    fn hit_graph(&self, graph: &MeasureGraph, query: &AimQuery) -> Option<AimResult> {
        let origin = query.ray.origin();
        let mut best: Option<(f64, AimResult)> = None;

        for (line_id, line) in graph.lines() {
            let mut vertex_hit = false;
            for vertex in line.endpoints() {
                let Ok(center) = graph.vertex_position(vertex) else {
                    continue;
                };
                let Some(t) = ray_sphere_intersect(&query.ray, &center, self.aimable_radius) else {
                    continue;
                };
                if t > query.max_range {
                    continue;
                }
                vertex_hit = true;
                let score = (center - origin).norm() - self.endpoint_bias;
                if best.as_ref().is_none_or(|(s, _)| score < *s) {
                    best = Some((
                        score,
                        AimResult::Vertex {
                            vertex,
                            position: center,
                        },
                    ));
                }
            }
            if vertex_hit {
                continue;
            }

            let Some((score, position)) = self.hit_line_interior(graph, line_id, query) else {
                continue;
            };
            if best.as_ref().is_none_or(|(s, _)| score < *s) {
                best = Some((
                    score,
                    AimResult::Line {
                        line: line_id,
                        position,
                    },
                ));
            }
        }

        best.map(|(_, hit)| hit)
    }

    /// Returns `(camera distance, hit position)` for a line-interior hit.
    fn hit_line_interior(
        &self,
        graph: &MeasureGraph,
        line: LineId,
        query: &AimQuery,
    ) -> Option<(f64, Point3)> {
        let (a, b) = graph.line_endpoints(line).ok()?;
        let approach = ray_segment_closest(&query.ray, &a, &b)?;

        let inside = approach.segment_param > 0.0 && approach.segment_param < approach.segment_length;
        let in_range = (0.0..=query.max_range).contains(&approach.ray_param);
        if !inside || !in_range || approach.gap > self.aimable_radius {
            return None;
        }

        let mut length = approach.segment_param;
        if query.snap_to_grid {
            length = round_to_step(length, query.ruler_unit).clamp(0.0, approach.segment_length);
        }
        let position = a + (b - a) * (length / approach.segment_length);
        Some(((approach.point - query.ray.origin()).norm(), position))
    }

    /// First world hit that is not the controlled entity.
    fn cast_world<W>(&self, world: &W, query: &AimQuery) -> AimResult
    where
        W: World + ?Sized,
    {
        let to = query.ray.at(query.max_range);
        world
            .cast_ray(query.ray.origin(), &to, self.layer_mask)
            .into_iter()
            .find(|hit| Some(hit.entity) != query.controlled_entity)
            .map(|hit| AimResult::Entity {
                entity: hit.entity,
                position: hit.position,
                normal: Some(hit.normal),
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::graph::VertexData;
    use crate::math::{Isometry3, Vector3};
    use crate::world::mock::MockWorld;
    use crate::world::{CellCoord, EntityShape, RayHit};

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    fn query(snap_to_grid: bool) -> AimQuery {
        AimQuery {
            ray: Ray::new(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0)).unwrap(),
            max_range: 100.0,
            snap_to_grid,
            ruler_unit: 0.5,
            controlled_entity: Some(EntityId(1)),
        }
    }

    fn resolver() -> TargetResolver {
        TargetResolver::new(&MeasureSettings::default())
    }

    fn free_line(graph: &mut MeasureGraph, a: Point3, b: Point3) -> LineId {
        let a = graph.add_vertex(VertexData::free(a, None)).unwrap();
        let b = graph.add_vertex(VertexData::free(b, None)).unwrap();
        graph.add_line(a, b).unwrap()
    }

    #[test]
    fn empty_scene_resolves_to_none() {
        let graph = MeasureGraph::new();
        let world = MockWorld::new();
        assert!(resolver().resolve(&graph, &world, &query(false)).is_none());
    }

    #[test]
    fn endpoint_is_hit() {
        let mut graph = MeasureGraph::new();
        let line = free_line(&mut graph, p(0.0, 0.05, 5.0), p(0.0, 3.0, 5.0));
        let a = graph.line(line).unwrap().a;
        let hit = resolver().resolve(&graph, &MockWorld::new(), &query(false));
        assert_eq!(
            hit,
            AimResult::Vertex {
                vertex: a,
                position: p(0.0, 0.05, 5.0)
            }
        );
        assert_eq!(hit.targeted_line(&graph), Some(line));
    }

    #[test]
    fn interior_hit_projects_onto_segment() {
        let mut graph = MeasureGraph::new();
        let line = free_line(&mut graph, p(-1.0, 0.05, 3.0), p(1.0, 0.05, 3.0));
        match resolver().resolve(&graph, &MockWorld::new(), &query(false)) {
            AimResult::Line { line: hit, position } => {
                assert_eq!(hit, line);
                assert_relative_eq!(position, p(0.0, 0.05, 3.0), epsilon = 1e-12);
            }
            other => panic!("expected line hit, got {other:?}"),
        }
    }

    #[test]
    fn interior_hit_rounds_to_ruler_when_snapping_to_grid() {
        let mut graph = MeasureGraph::new();
        free_line(&mut graph, p(-1.2, 0.05, 3.0), p(1.0, 0.05, 3.0));
        // Unrounded length from A is 1.2; ruler 0.5 rounds to 1.0.
        let hit = resolver().resolve(&graph, &MockWorld::new(), &query(true));
        assert_relative_eq!(hit.position().unwrap(), p(-0.2, 0.05, 3.0), epsilon = 1e-12);
    }

    #[test]
    fn endpoint_wins_close_tie_against_other_line_interior() {
        let mut graph = MeasureGraph::new();
        // Endpoint about 5 m away, interior of another line about 4.9 m away.
        let far = free_line(&mut graph, p(0.0, 0.02, 5.0), p(0.0, 3.0, 5.0));
        free_line(&mut graph, p(-1.0, 0.05, 4.9), p(1.0, 0.05, 4.9));
        let hit = resolver().resolve(&graph, &MockWorld::new(), &query(false));
        let a = graph.line(far).unwrap().a;
        assert!(matches!(hit, AimResult::Vertex { vertex, .. } if vertex == a), "{hit:?}");
    }

    #[test]
    fn clearly_closer_interior_beats_endpoint() {
        let mut graph = MeasureGraph::new();
        free_line(&mut graph, p(0.0, 0.02, 5.0), p(0.0, 3.0, 5.0));
        let near = free_line(&mut graph, p(-1.0, 0.05, 3.0), p(1.0, 0.05, 3.0));
        let hit = resolver().resolve(&graph, &MockWorld::new(), &query(false));
        assert!(matches!(hit, AimResult::Line { line, .. } if line == near), "{hit:?}");
    }

    #[test]
    fn out_of_range_graph_is_ignored() {
        let mut graph = MeasureGraph::new();
        free_line(&mut graph, p(0.0, 0.0, 150.0), p(0.0, 3.0, 150.0));
        assert!(resolver().resolve(&graph, &MockWorld::new(), &query(false)).is_none());
    }

    #[test]
    fn world_hit_skips_controlled_entity() {
        let graph = MeasureGraph::new();
        let mut world = MockWorld::new();
        world.hits = vec![
            RayHit {
                entity: EntityId(1),
                position: p(0.0, 0.0, 0.5),
                normal: v(0.0, 0.0, -1.0),
            },
            RayHit {
                entity: EntityId(2),
                position: p(0.0, 0.0, 8.0),
                normal: v(0.0, 0.0, -1.0),
            },
        ];
        let hit = resolver().resolve(&graph, &world, &query(false));
        assert_eq!(
            hit,
            AimResult::Entity {
                entity: EntityId(2),
                position: p(0.0, 0.0, 8.0),
                normal: Some(v(0.0, 0.0, -1.0)),
            }
        );
    }

    #[test]
    fn graph_beats_world() {
        let mut graph = MeasureGraph::new();
        free_line(&mut graph, p(-1.0, 0.0, 20.0), p(1.0, 0.0, 20.0));
        let mut world = MockWorld::new();
        world.hits = vec![RayHit {
            entity: EntityId(2),
            position: p(0.0, 0.0, 8.0),
            normal: v(0.0, 0.0, -1.0),
        }];
        let hit = resolver().resolve(&graph, &world, &query(false));
        assert!(matches!(hit, AimResult::Line { .. }));
    }

    fn grid_world() -> MockWorld {
        let mut world = MockWorld::new();
        let grid = EntityId(5);
        world.add_entity(grid, Isometry3::translation(0.0, 0.0, 10.0), EntityShape::Grid { cell_size: 2.0 });
        world.overlaps = vec![grid];
        let empty = CellCoord::new(0, 0, -1);
        let full = CellCoord::new(0, 0, 0);
        world.cells.insert(grid, vec![empty, full]);
        world.occupied.insert((grid, full));
        world
    }

    #[test]
    fn grid_scan_collects_fifteen_points_of_first_occupied_cell() {
        let graph = MeasureGraph::new();
        let world = grid_world();
        let mut resolver = resolver();
        resolver.resolve(&graph, &world, &query(true));
        let candidates = resolver.candidates();
        assert_eq!(candidates.len(), 15);
        assert_eq!(candidates.iter().filter(|c| c.local_normal.is_some()).count(), 8);
        assert_eq!(candidates[0].local, p(0.0, 0.0, 0.0));
    }

    #[test]
    fn grid_snap_hits_face_center_in_world_space() {
        let graph = MeasureGraph::new();
        let world = grid_world();
        // The ray along +Z meets the -Z face center (0, 0, 9) before the cell center.
        let hit = resolver().resolve(&graph, &world, &query(true));
        assert_eq!(
            hit,
            AimResult::Entity {
                entity: EntityId(5),
                position: p(0.0, 0.0, 9.0),
                normal: None,
            }
        );
    }

    #[test]
    fn cached_candidates_follow_moving_entity() {
        let graph = MeasureGraph::new();
        let mut world = grid_world();
        let mut resolver = resolver();
        resolver.resolve(&graph, &world, &query(true));

        // Move the grid so the +X+Y-Z corner lands on the ray; no rescan yet.
        world.move_entity(EntityId(5), Isometry3::translation(-1.0, -1.0, 10.0));
        world.cells.clear();
        let hit = resolver.resolve(&graph, &world, &query(true));
        match hit {
            AimResult::Entity { position, normal, .. } => {
                assert_relative_eq!(position, p(0.0, 0.0, 9.0), epsilon = 1e-12);
                let n = normal.unwrap();
                assert_relative_eq!(n, v(1.0, 1.0, -1.0).normalize(), epsilon = 1e-12);
            }
            other => panic!("expected candidate hit, got {other:?}"),
        }
    }

    #[test]
    fn candidates_rescan_every_sixth_tick() {
        let graph = MeasureGraph::new();
        let mut world = grid_world();
        let mut resolver = resolver();
        resolver.resolve(&graph, &world, &query(true));
        assert_eq!(resolver.candidates().len(), 15);

        world.cells.clear();
        for _ in 1..6 {
            resolver.resolve(&graph, &world, &query(true));
            assert_eq!(resolver.candidates().len(), 15);
        }
        assert_eq!(resolver.resolve(&graph, &world, &query(true)), AimResult::None);
        assert!(resolver.candidates().is_empty());
    }

    #[test]
    fn character_contributes_center_and_head() {
        let graph = MeasureGraph::new();
        let mut world = MockWorld::new();
        let npc = EntityId(9);
        world.add_entity(npc, Isometry3::translation(0.0, -1.7, 6.0), EntityShape::Character { head: p(0.0, 1.7, 0.0) });
        world.overlaps = vec![npc, EntityId(1)];
        let mut resolver = resolver();
        let hit = resolver.resolve(&graph, &world, &query(true));
        assert_eq!(resolver.candidates().len(), 2);
        assert_relative_eq!(hit.position().unwrap(), p(0.0, 0.0, 6.0), epsilon = 1e-12);
    }

    #[test]
    fn grid_mode_skips_world_ray_cast() {
        let graph = MeasureGraph::new();
        let mut world = MockWorld::new();
        world.hits = vec![RayHit {
            entity: EntityId(2),
            position: p(0.0, 0.0, 8.0),
            normal: v(0.0, 0.0, -1.0),
        }];
        assert!(resolver().resolve(&graph, &world, &query(true)).is_none());
    }
}
