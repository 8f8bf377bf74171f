pub mod angle;
pub mod color;
pub mod line;
pub mod vertex;

pub use angle::{AngleData, AngleId};
pub use color::{palette_color, Color, PALETTE};
pub use line::{LineData, LineId};
pub use vertex::{Anchor, EntityAnchor, VertexData, VertexId, VertexKind};

use slotmap::SlotMap;
use tracing::debug;

use crate::error::{GraphError, MeasureError};
use crate::math::{angle_between, Point3, Vector3, TOLERANCE};
use crate::world::EntityTransforms;

/// One entry of the graph's insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphItem {
    Line(LineId),
    Angle(AngleId),
}

/// What a line removal took with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedLine {
    pub line: LineId,
    /// The two disposed endpoints.
    pub vertices: [VertexId; 2],
    /// Angles removed because they referenced an endpoint.
    pub angles: Vec<AngleId>,
    /// Surviving vertices that lost their anchor and froze.
    pub frozen: Vec<VertexId>,
}

/// Central arena that owns every vertex, line and angle of a session.
///
/// Objects reference each other through generational ids. Hosting (a line
/// owning its endpoints) is tracked by `host_line`; anchoring is tracked by
/// subscriber lists on the anchored-on object so that destroying it can freeze
/// everything that tracked it.
#[derive(Debug, Default)]
pub struct MeasureGraph {
    vertices: SlotMap<VertexId, VertexData>,
    lines: SlotMap<LineId, LineData>,
    angles: SlotMap<AngleId, AngleData>,
    order: Vec<GraphItem>,
    lines_created: usize,
}

impl MeasureGraph {
    /// Creates a new, empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex and subscribes it to its anchor target.
    ///
    /// # Errors
    ///
    /// Returns an error if the anchored-on vertex or line does not exist.
    pub fn add_vertex(&mut self, mut data: VertexData) -> Result<VertexId, GraphError> {
        if let Some(target) = data.anchored_vertex() {
            self.vertex(target)?;
        }
        if let Some(line) = data.anchored_line() {
            self.line(line)?;
        }
        data.host_line = None;
        data.subscribers.clear();

        let target_vertex = data.anchored_vertex();
        let target_line = data.anchored_line();
        let id = self.vertices.insert(data);

        if let Some(target) = target_vertex.and_then(|t| self.vertices.get_mut(t)) {
            target.subscribers.push(id);
        }
        if let Some(line) = target_line.and_then(|l| self.lines.get_mut(l)) {
            line.subscribers.push(id);
        }
        Ok(id)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not in the graph.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, GraphError> {
        self.vertices
            .get(id)
            .ok_or(GraphError::EntityNotFound("vertex"))
    }

    #[must_use]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    /// Current world position of a vertex, following live anchors.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex, or a live anchor target, is missing.
    pub fn vertex_position(&self, id: VertexId) -> Result<Point3, GraphError> {
        match &self.vertex(id)?.kind {
            VertexKind::Free { position, .. } => Ok(*position),
            VertexKind::OnVertex(anchor) => match anchor.frozen() {
                Some(position) => Ok(position),
                None => self.vertex_position(anchor.target()),
            },
            VertexKind::OnLine { anchor, length } => match anchor.frozen() {
                Some(position) => Ok(position),
                None => self.point_on_line(anchor.target(), *length),
            },
            VertexKind::OnEntity(entity) => Ok(entity.position()),
        }
    }

    /// Surface normal stored at a vertex, following live vertex anchors.
    #[must_use]
    pub fn vertex_normal(&self, id: VertexId) -> Option<Vector3> {
        match &self.vertices.get(id)?.kind {
            VertexKind::Free { normal, .. } => *normal,
            VertexKind::OnVertex(anchor) => anchor.live_target().and_then(|t| self.vertex_normal(t)),
            VertexKind::OnLine { .. } => None,
            VertexKind::OnEntity(entity) => entity.normal(),
        }
    }

    /// Whether a vertex no longer tracks anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not in the graph.
    pub fn is_static(&self, id: VertexId) -> Result<bool, GraphError> {
        Ok(self.vertex(id)?.is_static())
    }

    // --- Line operations ---

    /// Creates a line hosting `a` and `b` and appends it to the graph order.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertices are identical, missing, or already hosted.
    pub fn add_line(&mut self, a: VertexId, b: VertexId) -> Result<LineId, GraphError> {
        if a == b {
            return Err(GraphError::SameEndpoints);
        }
        for id in [a, b] {
            if self.vertex(id)?.host_line.is_some() {
                return Err(GraphError::VertexAlreadyHosted);
            }
        }

        let color = palette_color(self.lines_created);
        self.lines_created += 1;
        let line = self.lines.insert(LineData {
            a,
            b,
            color,
            subscribers: Vec::new(),
        });
        for id in [a, b] {
            if let Some(vertex) = self.vertices.get_mut(id) {
                vertex.host_line = Some(line);
            }
        }
        self.order.push(GraphItem::Line(line));
        debug!(?line, ?a, ?b, "line added");
        Ok(line)
    }

    /// Returns a reference to the line data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not in the graph.
    pub fn line(&self, id: LineId) -> Result<&LineData, GraphError> {
        self.lines.get(id).ok_or(GraphError::EntityNotFound("line"))
    }

    /// World positions of both endpoints, A first.
    ///
    /// # Errors
    ///
    /// Returns an error if the line or an endpoint is missing.
    pub fn line_endpoints(&self, id: LineId) -> Result<(Point3, Point3), GraphError> {
        let line = self.line(id)?;
        Ok((self.vertex_position(line.a)?, self.vertex_position(line.b)?))
    }

    /// Current length of a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the line or an endpoint is missing.
    pub fn line_length(&self, id: LineId) -> Result<f64, GraphError> {
        let (a, b) = self.line_endpoints(id)?;
        Ok((b - a).norm())
    }

    /// Unit direction from A to B, `None` while both endpoints coincide.
    ///
    /// # Errors
    ///
    /// Returns an error if the line or an endpoint is missing.
    pub fn line_direction(&self, id: LineId) -> Result<Option<Vector3>, GraphError> {
        let (a, b) = self.line_endpoints(id)?;
        Ok((b - a).try_normalize(TOLERANCE))
    }

    /// The point `length` meters from A towards B.
    ///
    /// # Errors
    ///
    /// Returns an error if the line or an endpoint is missing.
    pub fn point_on_line(&self, id: LineId, length: f64) -> Result<Point3, GraphError> {
        let (a, b) = self.line_endpoints(id)?;
        Ok(match (b - a).try_normalize(TOLERANCE) {
            Some(dir) => a + dir * length,
            None => a,
        })
    }

    /// Finds a line, other than those in `exclude`, with an endpoint within
    /// `tolerance` of `point`. Returns the line and that endpoint.
    #[must_use]
    pub fn line_at_joint(
        &self,
        point: &Point3,
        tolerance: f64,
        exclude: &[LineId],
    ) -> Option<(LineId, VertexId)> {
        self.lines()
            .filter(|(id, _)| !exclude.contains(id))
            .find_map(|(id, line)| {
                line.endpoints().into_iter().find_map(|v| {
                    let position = self.vertex_position(v).ok()?;
                    ((position - point).norm() <= tolerance).then_some((id, v))
                })
            })
    }

    /// Removes a line: first every angle referencing either endpoint, then the
    /// line itself and both endpoints. Vertices anchored on the line or on its
    /// endpoints freeze at their last position.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is not in the graph.
    pub fn remove_line(&mut self, id: LineId) -> Result<RemovedLine, GraphError> {
        let line = self.line(id)?.clone();

        let angles: Vec<AngleId> = self
            .angles
            .iter()
            .filter(|(_, angle)| angle.references(line.a) || angle.references(line.b))
            .map(|(angle_id, _)| angle_id)
            .collect();
        for angle_id in &angles {
            self.angles.remove(*angle_id);
        }

        let captured: Vec<(VertexId, Point3)> = line
            .subscribers
            .iter()
            .filter_map(|sub| Some((*sub, self.vertex_position(*sub).ok()?)))
            .collect();
        let mut frozen = Vec::new();
        for (sub, position) in captured {
            if let Some(vertex) = self.vertices.get_mut(sub) {
                vertex.freeze(position);
                frozen.push(sub);
            }
        }

        self.lines.remove(id);
        for vertex in line.endpoints() {
            frozen.extend(self.dispose_vertex(vertex));
        }

        self.order.retain(|item| match item {
            GraphItem::Line(l) => *l != id,
            GraphItem::Angle(a) => !angles.contains(a),
        });

        debug!(?id, angles = angles.len(), frozen = frozen.len(), "line removed");
        Ok(RemovedLine {
            line: id,
            vertices: line.endpoints(),
            angles,
            frozen,
        })
    }

    // --- Angle operations ---

    /// Records a derived angle at `common` between two lines.
    ///
    /// # Errors
    ///
    /// Returns an error if any vertex or either line is missing.
    pub fn add_angle(
        &mut self,
        common: VertexId,
        point_a: VertexId,
        point_b: VertexId,
        lines: [LineId; 2],
    ) -> Result<AngleId, GraphError> {
        for id in [common, point_a, point_b] {
            self.vertex(id)?;
        }
        let color = self.line(lines[0])?.color.midpoint(self.line(lines[1])?.color);
        let angle = self.angles.insert(AngleData {
            common,
            point_a,
            point_b,
            lines,
            color,
        });
        self.order.push(GraphItem::Angle(angle));
        debug!(?angle, ?common, "angle derived");
        Ok(angle)
    }

    /// Returns a reference to the angle data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the angle is not in the graph.
    pub fn angle(&self, id: AngleId) -> Result<&AngleData, GraphError> {
        self.angles.get(id).ok_or(GraphError::EntityNotFound("angle"))
    }

    /// Current value of an angle in radians.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex is missing or the legs are degenerate.
    pub fn angle_radians(&self, id: AngleId) -> Result<f64, MeasureError> {
        let angle = self.angle(id)?;
        let common = self.vertex_position(angle.common)?;
        let a = self.vertex_position(angle.point_a)?;
        let b = self.vertex_position(angle.point_b)?;
        Ok(angle_between(&(a - common), &(b - common))?)
    }

    /// Current value of an angle in degrees.
    ///
    /// # Errors
    ///
    /// Returns an error if a vertex is missing or the legs are degenerate.
    pub fn angle_degrees(&self, id: AngleId) -> Result<f64, MeasureError> {
        self.angle_radians(id).map(f64::to_degrees)
    }

    // --- Whole graph ---

    /// Lines and angles in insertion order.
    pub fn items(&self) -> impl Iterator<Item = GraphItem> + '_ {
        self.order.iter().copied()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = (LineId, &LineData)> + '_ {
        self.order.iter().filter_map(|item| match item {
            GraphItem::Line(id) => self.lines.get(*id).map(|line| (*id, line)),
            GraphItem::Angle(_) => None,
        })
    }

    /// Angles in insertion order.
    pub fn angles(&self) -> impl Iterator<Item = (AngleId, &AngleData)> + '_ {
        self.order.iter().filter_map(|item| match item {
            GraphItem::Angle(id) => self.angles.get(*id).map(|angle| (*id, angle)),
            GraphItem::Line(_) => None,
        })
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn angle_count(&self) -> usize {
        self.angles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.lines.is_empty() && self.angles.is_empty()
    }

    /// Drops every vertex, line and angle.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.lines.clear();
        self.angles.clear();
        self.order.clear();
        debug!("graph cleared");
    }

    /// Re-evaluates every entity anchor against the entities' current
    /// transforms. Anchors whose entity is gone freeze; returns them.
    pub fn sync_entities<W>(&mut self, world: &W) -> Vec<VertexId>
    where
        W: EntityTransforms + ?Sized,
    {
        let mut frozen = Vec::new();
        for (id, data) in &mut self.vertices {
            let VertexKind::OnEntity(entity) = &mut data.kind else {
                continue;
            };
            let Some(target) = entity.anchor().live_target() else {
                continue;
            };
            let transform = world.entity_transform(target);
            if entity.refresh(transform.as_ref()) {
                debug!(?id, ?target, "entity anchor lost its entity");
                frozen.push(id);
            }
        }
        frozen
    }

    /// Removes a vertex no line hosts (e.g. a cancelled pending point).
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is missing or hosted by a line.
    pub(crate) fn remove_unhosted_vertex(&mut self, id: VertexId) -> Result<Vec<VertexId>, GraphError> {
        if self.vertex(id)?.host_line.is_some() {
            return Err(GraphError::VertexAlreadyHosted);
        }
        Ok(self.dispose_vertex(id))
    }

    /// Removes a vertex, unsubscribes it from its anchor target and freezes
    /// its own subscribers. Returns the frozen subscribers.
    fn dispose_vertex(&mut self, id: VertexId) -> Vec<VertexId> {
        let Ok(position) = self.vertex_position(id) else {
            return Vec::new();
        };
        let Some(data) = self.vertices.remove(id) else {
            return Vec::new();
        };

        match data.kind {
            VertexKind::OnVertex(anchor) => {
                if let Some(target) = anchor.live_target().and_then(|t| self.vertices.get_mut(t)) {
                    target.subscribers.retain(|s| *s != id);
                }
            }
            VertexKind::OnLine { anchor, .. } => {
                if let Some(line) = anchor.live_target().and_then(|l| self.lines.get_mut(l)) {
                    line.subscribers.retain(|s| *s != id);
                }
            }
            VertexKind::Free { .. } | VertexKind::OnEntity(_) => {}
        }

        let mut frozen = Vec::new();
        for sub in data.subscribers {
            if let Some(vertex) = self.vertices.get_mut(sub) {
                vertex.freeze(position);
                frozen.push(sub);
            }
        }
        frozen
    }
}
