use crate::math::{Isometry3, Point3, Vector3};
use crate::world::EntityId;

use super::line::LineId;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in the measurement graph.
    pub struct VertexId;
}

/// A non-owning, live-tracking link to another object.
///
/// Once the target is destroyed the anchor stores the last known position in
/// `frozen` and never tracks again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor<T> {
    target: T,
    frozen: Option<Point3>,
}

impl<T: Copy> Anchor<T> {
    /// Creates a live anchor on `target`.
    #[must_use]
    pub fn new(target: T) -> Self {
        Self {
            target,
            frozen: None,
        }
    }

    /// The object this anchor tracks (or tracked, if frozen).
    #[must_use]
    pub fn target(&self) -> T {
        self.target
    }

    /// The target while it is still alive.
    #[must_use]
    pub fn live_target(&self) -> Option<T> {
        self.frozen.is_none().then_some(self.target)
    }

    /// Position captured when the target was lost.
    #[must_use]
    pub fn frozen(&self) -> Option<Point3> {
        self.frozen
    }

    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// Captures `position` and stops tracking. Freezing twice keeps the first value.
    pub(crate) fn freeze(&mut self, position: Point3) {
        if self.frozen.is_none() {
            self.frozen = Some(position);
        }
    }
}

/// A point attached to an external entity's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityAnchor {
    anchor: Anchor<EntityId>,
    local_offset: Point3,
    local_normal: Option<Vector3>,
    cached: Point3,
    cached_normal: Option<Vector3>,
}

impl EntityAnchor {
    /// Anchors the world-space `position` (and optional `normal`) to `entity`,
    /// whose current world transform is `transform`.
    #[must_use]
    pub fn new(
        entity: EntityId,
        transform: &Isometry3,
        position: Point3,
        normal: Option<Vector3>,
    ) -> Self {
        Self {
            anchor: Anchor::new(entity),
            local_offset: transform.inverse_transform_point(&position),
            local_normal: normal.map(|n| transform.inverse_transform_vector(&n)),
            cached: position,
            cached_normal: normal,
        }
    }

    #[must_use]
    pub fn anchor(&self) -> &Anchor<EntityId> {
        &self.anchor
    }

    /// Offset in the entity's local frame.
    #[must_use]
    pub fn local_offset(&self) -> &Point3 {
        &self.local_offset
    }

    /// Last known world position.
    #[must_use]
    pub fn position(&self) -> Point3 {
        self.anchor.frozen().unwrap_or(self.cached)
    }

    /// Last known world normal.
    #[must_use]
    pub fn normal(&self) -> Option<Vector3> {
        self.cached_normal
    }

    /// Re-evaluates the world position from the entity's current transform.
    ///
    /// `None` means the entity is gone and the anchor freezes. A degenerate
    /// transformed position keeps the previous cache. Returns `true` if this
    /// call froze the anchor.
    pub(crate) fn refresh(&mut self, transform: Option<&Isometry3>) -> bool {
        if self.anchor.is_frozen() {
            return false;
        }
        let Some(transform) = transform else {
            self.anchor.freeze(self.cached);
            return true;
        };
        let position = transform.transform_point(&self.local_offset);
        if is_usable(&position) {
            self.cached = position;
            self.cached_normal = self.local_normal.map(|n| transform.transform_vector(&n));
        }
        false
    }
}

fn is_usable(position: &Point3) -> bool {
    position.coords.iter().all(|c| c.is_finite()) && position.coords.norm_squared() > 0.0
}

/// How a vertex obtains its world position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VertexKind {
    /// Absolute position with an optional surface normal.
    Free {
        position: Point3,
        normal: Option<Vector3>,
    },
    /// Tracks another vertex.
    OnVertex(Anchor<VertexId>),
    /// Tracks a point `length` meters from a line's endpoint A towards B.
    OnLine { anchor: Anchor<LineId>, length: f64 },
    /// Tracks a point fixed in an external entity's frame.
    OnEntity(EntityAnchor),
}

/// Data associated with a vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    pub(crate) kind: VertexKind,
    pub(crate) host_line: Option<LineId>,
    /// Vertices anchored on this one.
    pub(crate) subscribers: Vec<VertexId>,
}

impl VertexData {
    fn with_kind(kind: VertexKind) -> Self {
        Self {
            kind,
            host_line: None,
            subscribers: Vec::new(),
        }
    }

    /// A free-standing vertex.
    #[must_use]
    pub fn free(position: Point3, normal: Option<Vector3>) -> Self {
        Self::with_kind(VertexKind::Free { position, normal })
    }

    /// A vertex tracking `target`.
    #[must_use]
    pub fn on_vertex(target: VertexId) -> Self {
        Self::with_kind(VertexKind::OnVertex(Anchor::new(target)))
    }

    /// A vertex tracking the point `length` meters along `line`.
    #[must_use]
    pub fn on_line(line: LineId, length: f64) -> Self {
        Self::with_kind(VertexKind::OnLine {
            anchor: Anchor::new(line),
            length,
        })
    }

    /// A vertex tracking an external entity.
    #[must_use]
    pub fn on_entity(anchor: EntityAnchor) -> Self {
        Self::with_kind(VertexKind::OnEntity(anchor))
    }

    #[must_use]
    pub fn kind(&self) -> &VertexKind {
        &self.kind
    }

    /// The line owning this vertex as an endpoint, if any.
    #[must_use]
    pub fn host_line(&self) -> Option<LineId> {
        self.host_line
    }

    /// `true` for free vertices and for anchors whose target is gone.
    #[must_use]
    pub fn is_static(&self) -> bool {
        match &self.kind {
            VertexKind::Free { .. } => true,
            VertexKind::OnVertex(anchor) => anchor.is_frozen(),
            VertexKind::OnLine { anchor, .. } => anchor.is_frozen(),
            VertexKind::OnEntity(entity) => entity.anchor().is_frozen(),
        }
    }

    /// The vertex this one is anchored on, while that anchor is live.
    #[must_use]
    pub fn anchored_vertex(&self) -> Option<VertexId> {
        match &self.kind {
            VertexKind::OnVertex(anchor) => anchor.live_target(),
            _ => None,
        }
    }

    /// The line this one is anchored on, while that anchor is live.
    #[must_use]
    pub fn anchored_line(&self) -> Option<LineId> {
        match &self.kind {
            VertexKind::OnLine { anchor, .. } => anchor.live_target(),
            _ => None,
        }
    }

    /// The entity this one is anchored on, while that anchor is live.
    #[must_use]
    pub fn anchored_entity(&self) -> Option<EntityId> {
        match &self.kind {
            VertexKind::OnEntity(entity) => entity.anchor().live_target(),
            _ => None,
        }
    }

    pub(crate) fn freeze(&mut self, position: Point3) {
        match &mut self.kind {
            VertexKind::Free { .. } => {}
            VertexKind::OnVertex(anchor) => anchor.freeze(position),
            VertexKind::OnLine { anchor, .. } => anchor.freeze(position),
            VertexKind::OnEntity(entity) => entity.anchor.freeze(position),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::UnitQuaternion;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn anchor_freezes_once() {
        let mut anchor = Anchor::new(3_u32);
        assert_eq!(anchor.live_target(), Some(3));
        anchor.freeze(p(1.0, 2.0, 3.0));
        anchor.freeze(p(9.0, 9.0, 9.0));
        assert_eq!(anchor.frozen(), Some(p(1.0, 2.0, 3.0)));
        assert_eq!(anchor.live_target(), None);
        assert_eq!(anchor.target(), 3);
    }

    #[test]
    fn entity_anchor_follows_transform() {
        let start = Isometry3::translation(10.0, 0.0, 0.0);
        let mut anchor = EntityAnchor::new(EntityId(1), &start, p(11.0, 0.0, 0.0), None);
        assert_relative_eq!(*anchor.local_offset(), p(1.0, 0.0, 0.0), epsilon = 1e-12);

        let rotated = Isometry3::from_parts(
            nalgebra::Translation3::new(10.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&nalgebra::Vector3::z_axis(), std::f64::consts::FRAC_PI_2),
        );
        anchor.refresh(Some(&rotated));
        assert_relative_eq!(anchor.position(), p(10.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn entity_anchor_keeps_cache_on_degenerate_transform() {
        let start = Isometry3::translation(1.0, 1.0, 1.0);
        let mut anchor = EntityAnchor::new(EntityId(1), &start, p(2.0, 1.0, 1.0), None);
        // Moves the local offset exactly onto the world origin.
        anchor.refresh(Some(&Isometry3::translation(-1.0, 0.0, 0.0)));
        assert_eq!(anchor.position(), p(2.0, 1.0, 1.0));
        assert!(!anchor.anchor().is_frozen());
    }

    #[test]
    fn entity_anchor_freezes_on_removal() {
        let start = Isometry3::translation(0.0, 5.0, 0.0);
        let mut anchor = EntityAnchor::new(EntityId(1), &start, p(0.0, 6.0, 0.0), None);
        assert!(anchor.refresh(None));
        let frozen = anchor.position();
        assert!(!anchor.refresh(Some(&Isometry3::translation(50.0, 0.0, 0.0))));
        assert_eq!(anchor.position().coords, frozen.coords);
    }

    #[test]
    fn free_vertex_is_static() {
        let data = VertexData::free(p(0.0, 0.0, 0.0), None);
        assert!(data.is_static());
        assert!(data.host_line().is_none());
    }
}
