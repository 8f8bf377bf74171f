use super::color::Color;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a line in the measurement graph.
    pub struct LineId;
}

/// Data associated with a line measurement.
///
/// A line owns its two endpoint vertices; disposing the line disposes both.
#[derive(Debug, Clone)]
pub struct LineData {
    /// First endpoint; line anchors measure their length from here.
    pub a: VertexId,
    /// Second endpoint.
    pub b: VertexId,
    /// Display color, assigned at construction.
    pub color: Color,
    /// Vertices anchored on this line.
    pub(crate) subscribers: Vec<VertexId>,
}

impl LineData {
    /// Both endpoints, A first.
    #[must_use]
    pub fn endpoints(&self) -> [VertexId; 2] {
        [self.a, self.b]
    }

    /// The endpoint that is not `vertex`, or `None` if `vertex` is not an endpoint.
    #[must_use]
    pub fn other_endpoint(&self, vertex: VertexId) -> Option<VertexId> {
        if vertex == self.a {
            Some(self.b)
        } else if vertex == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    #[must_use]
    pub fn has_endpoint(&self, vertex: VertexId) -> bool {
        self.a == vertex || self.b == vertex
    }
}
