use crate::aim::AimResult;
use crate::error::GraphError;
use crate::graph::{AngleId, EntityAnchor, LineId, MeasureGraph, VertexData, VertexId};
use crate::math::{distance_to_segment, Point3, Vector3, TOLERANCE};
use crate::world::EntityTransforms;

use super::input::Trigger;

/// Builds the vertex a trigger places at `point`.
///
/// A hold always places a free vertex. A click anchors to whatever is aimed
/// at, falling back to a free vertex when the anchor is unusable.
pub(super) fn build_vertex<W>(
    graph: &MeasureGraph,
    world: &W,
    trigger: Trigger,
    aim: &AimResult,
    point: Point3,
    drift_tolerance: f64,
) -> VertexData
where
    W: EntityTransforms + ?Sized,
{
    let free = VertexData::free(point, aim.normal());
    if trigger == Trigger::Hold {
        return free;
    }

    match *aim {
        AimResult::Line { line, .. } => {
            let Ok((a, b)) = graph.line_endpoints(line) else {
                return free;
            };
            if distance_to_segment(&point, &a, &b) > drift_tolerance {
                return free;
            }
            let length = (b - a)
                .try_normalize(TOLERANCE)
                .map_or(0.0, |dir| (point - a).dot(&dir));
            VertexData::on_line(line, length)
        }
        AimResult::Vertex { vertex, .. } if graph.contains_vertex(vertex) => VertexData::on_vertex(vertex),
        AimResult::Entity { entity, normal, .. } => match world.entity_transform(entity) {
            Some(transform) => VertexData::on_entity(EntityAnchor::new(entity, &transform, point, normal)),
            None => free,
        },
        AimResult::Vertex { .. } | AimResult::None => free,
    }
}

/// Derives the angles a freshly finalized `line` forms at anchored endpoints.
///
/// An endpoint anchored on another line's vertex yields the angle between the
/// two lines' far ends. An endpoint anchored on another line's interior yields
/// the angle towards whichever end of that line is closer in angle.
pub(super) fn derive_angles(graph: &mut MeasureGraph, line: LineId) -> Result<Vec<AngleId>, GraphError> {
    let endpoints = graph.line(line)?.endpoints();
    let mut angles = Vec::new();

    for (joint, far) in [(endpoints[0], endpoints[1]), (endpoints[1], endpoints[0])] {
        let data = graph.vertex(joint)?;
        let found = if let Some(target) = data.anchored_vertex() {
            let host = graph.vertex(target)?.host_line();
            host.filter(|other| *other != line).and_then(|other| {
                let point_b = graph.line(other).ok()?.other_endpoint(target)?;
                Some((other, point_b))
            })
        } else if let Some(other) = data.anchored_line().filter(|other| *other != line) {
            Some((other, closer_end(graph, joint, far, other)?))
        } else {
            None
        };

        if let Some((other, point_b)) = found {
            angles.push(graph.add_angle(joint, far, point_b, [line, other])?);
        }
    }

    Ok(angles)
}

/// The endpoint of `other` whose leg from `joint` makes the smaller angle
/// with the leg towards `far`.
fn closer_end(graph: &MeasureGraph, joint: VertexId, far: VertexId, other: LineId) -> Result<VertexId, GraphError> {
    let line = graph.line(other)?;
    let origin = graph.vertex_position(joint)?;
    let leg = graph.vertex_position(far)? - origin;
    let cosine = |end: VertexId| -> Result<f64, GraphError> {
        let towards: Vector3 = graph.vertex_position(end)? - origin;
        Ok(match (leg.try_normalize(TOLERANCE), towards.try_normalize(TOLERANCE)) {
            (Some(a), Some(b)) => a.dot(&b),
            _ => f64::NEG_INFINITY,
        })
    };
    Ok(if cosine(line.a)? > cosine(line.b)? {
        line.a
    } else {
        line.b
    })
}
