use super::color::Color;
use super::line::LineId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a derived angle in the measurement graph.
    pub struct AngleId;
}

/// An angle at a joint shared by two lines.
///
/// References its vertices without owning them.
#[derive(Debug, Clone)]
pub struct AngleData {
    /// The joint.
    pub common: VertexId,
    /// Far end of the newer line.
    pub point_a: VertexId,
    /// Far end of the older line.
    pub point_b: VertexId,
    /// The two lines meeting at the joint, newer first.
    pub lines: [LineId; 2],
    /// Midpoint blend of both lines' colors.
    pub color: Color,
}

impl AngleData {
    /// Whether this angle references `vertex` in any role.
    #[must_use]
    pub fn references(&self, vertex: VertexId) -> bool {
        self.common == vertex || self.point_a == vertex || self.point_b == vertex
    }
}
