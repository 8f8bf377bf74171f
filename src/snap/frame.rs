use crate::error::GraphError;
use crate::graph::{LineId, MeasureGraph, VertexId};
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::world::World;

use super::advisory::{EntityAxis, SnapReference};

/// The reference directions available around the fixed endpoint of a
/// placement in progress.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapFrame {
    /// Position of the fixed endpoint.
    pub anchor_point: Point3,
    /// The line the fixed endpoint is anchored to, with its direction
    /// pointing away from the joint when the joint is one of its endpoints.
    pub anchor_line: Option<(LineId, Vector3)>,
    /// Another line meeting at the same joint, pointing away from it.
    pub joint_line: Option<(LineId, Vector3)>,
    /// Unit surface normal stored at the fixed endpoint.
    pub normal: Option<Vector3>,
    /// World-space right/up/backward axes of the anchored entity.
    pub entity_axes: Option<[Vector3; 3]>,
    /// Unit direction of combined gravity at the fixed endpoint.
    pub gravity: Option<Vector3>,
}

/// A reference direction in priority order, with whether it also offers a
/// plane snap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reference {
    pub reference: SnapReference,
    pub axis: Vector3,
    pub plane: bool,
}

impl SnapFrame {
    /// Gathers the references around `vertex`.
    ///
    /// # Errors
    ///
    /// Returns an error if `vertex` is not in the graph.
    pub fn collect<W>(
        graph: &MeasureGraph,
        world: &W,
        vertex: VertexId,
        joint_tolerance: f64,
        gravity_interference: f64,
    ) -> Result<Self, GraphError>
    where
        W: World + ?Sized,
    {
        let data = graph.vertex(vertex)?;
        let anchor_point = graph.vertex_position(vertex)?;

        let anchor_line = if let Some(line) = data.anchored_line() {
            graph.line_direction(line)?.map(|dir| (line, dir))
        } else if let Some(target) = data.anchored_vertex() {
            joint_direction(graph, target)
        } else {
            None
        };

        let joint_line = data.anchored_vertex().and_then(|_| {
            let mut exclude: Vec<LineId> = anchor_line.iter().map(|(line, _)| *line).collect();
            exclude.extend(data.host_line());
            let (line, endpoint) = graph.line_at_joint(&anchor_point, joint_tolerance, &exclude)?;
            joint_direction(graph, endpoint).map(|(_, dir)| (line, dir))
        });

        let normal = graph
            .vertex_normal(vertex)
            .and_then(|n| n.try_normalize(TOLERANCE));

        let entity_axes = data
            .anchored_entity()
            .and_then(|entity| world.entity_transform(entity))
            .map(|transform| {
                let r = transform.rotation;
                [r * Vector3::x(), r * Vector3::y(), r * Vector3::z()]
            });

        let gravity = (world.natural_gravity_at(&anchor_point)
            + world.artificial_gravity_at(&anchor_point, gravity_interference))
        .try_normalize(TOLERANCE);

        Ok(Self {
            anchor_point,
            anchor_line,
            joint_line,
            normal,
            entity_axes,
            gravity,
        })
    }

    /// Direction references in the order they are allowed to lock.
    ///
    /// Only the entity axis closest to `raw_dir` is offered.
    #[must_use]
    pub fn references(&self, raw_dir: &Vector3) -> Vec<Reference> {
        let mut out = Vec::with_capacity(5);
        if let Some((_, axis)) = self.anchor_line {
            out.push(Reference {
                reference: SnapReference::AnchorLine,
                axis,
                plane: true,
            });
        }
        if let Some((_, axis)) = self.joint_line {
            out.push(Reference {
                reference: SnapReference::JointLine,
                axis,
                plane: false,
            });
        }
        if let Some(axis) = self.normal {
            out.push(Reference {
                reference: SnapReference::SurfaceNormal,
                axis,
                plane: true,
            });
        }
        if let Some(axes) = self.entity_axes {
            let named = [EntityAxis::Right, EntityAxis::Up, EntityAxis::Backward];
            let best = named
                .into_iter()
                .zip(axes)
                .max_by(|(_, a), (_, b)| a.dot(raw_dir).abs().total_cmp(&b.dot(raw_dir).abs()));
            if let Some((name, axis)) = best {
                out.push(Reference {
                    reference: SnapReference::EntityAxis(name),
                    axis,
                    plane: false,
                });
            }
        }
        if let Some(axis) = self.gravity {
            out.push(Reference {
                reference: SnapReference::Gravity,
                axis,
                plane: true,
            });
        }
        out
    }
}

/// The line hosting `joint`, with its direction from `joint` to the far endpoint.
fn joint_direction(graph: &MeasureGraph, joint: VertexId) -> Option<(LineId, Vector3)> {
    let line_id = graph.vertex(joint).ok()?.host_line()?;
    let line = graph.line(line_id).ok()?;
    let far = line.other_endpoint(joint)?;
    let from = graph.vertex_position(joint).ok()?;
    let to = graph.vertex_position(far).ok()?;
    (to - from).try_normalize(TOLERANCE).map(|dir| (line_id, dir))
}
