use tracing::warn;

use crate::aim::AimResult;
use crate::graph::{AngleId, Color, GraphItem, LineId, MeasureGraph};
use crate::math::{notch_positions, Point3};
use crate::session::Notice;
use crate::snap::SnapAdvisory;

/// A finished line with its ruler notches.
#[derive(Debug, Clone, PartialEq)]
pub struct LineView {
    pub line: LineId,
    pub a: Point3,
    pub b: Point3,
    pub color: Color,
    /// Length in meters.
    pub length: f64,
    /// Notch positions, one per ruler unit from `a`.
    pub notches: Vec<Point3>,
}

/// A derived angle with its current value.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleView {
    pub angle: AngleId,
    pub common: Point3,
    pub a: Point3,
    pub b: Point3,
    pub color: Color,
    /// `None` while the legs are degenerate.
    pub degrees: Option<f64>,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameView {
    pub lines: Vec<LineView>,
    pub angles: Vec<AngleView>,
    pub aim: AimResult,
    /// Where the next point would go.
    pub target: Option<Point3>,
    /// Position of the vertex awaiting its second endpoint.
    pub pending: Option<Point3>,
    /// Preview segment from the pending vertex to the target.
    pub preview: Option<[Point3; 2]>,
    pub advisories: Vec<SnapAdvisory>,
    pub notices: Vec<Notice>,
}

impl FrameView {
    /// Builds line and angle views for every measurement in `graph`, in
    /// insertion order.
    #[must_use]
    pub fn measurements(graph: &MeasureGraph, ruler_unit: f64) -> Self {
        let mut view = Self::default();
        for item in graph.items() {
            match item {
                GraphItem::Line(id) => match line_view(graph, id, ruler_unit) {
                    Some(line) => view.lines.push(line),
                    None => warn!(?id, "line skipped in frame"),
                },
                GraphItem::Angle(id) => match angle_view(graph, id) {
                    Some(angle) => view.angles.push(angle),
                    None => warn!(?id, "angle skipped in frame"),
                },
            }
        }
        view
    }

    /// Length of the preview segment, if any.
    #[must_use]
    pub fn preview_length(&self) -> Option<f64> {
        self.preview.map(|[a, b]| (b - a).norm())
    }
}

fn line_view(graph: &MeasureGraph, line: LineId, ruler_unit: f64) -> Option<LineView> {
    let color = graph.line(line).ok()?.color;
    let (a, b) = graph.line_endpoints(line).ok()?;
    Some(LineView {
        line,
        a,
        b,
        color,
        length: (b - a).norm(),
        notches: notch_positions(&a, &b, ruler_unit),
    })
}

fn angle_view(graph: &MeasureGraph, angle: AngleId) -> Option<AngleView> {
    let data = graph.angle(angle).ok()?;
    Some(AngleView {
        angle,
        common: graph.vertex_position(data.common).ok()?,
        a: graph.vertex_position(data.point_a).ok()?,
        b: graph.vertex_position(data.point_b).ok()?,
        color: data.color,
        degrees: graph.angle_degrees(angle).ok(),
    })
}

/// Draws a frame.
pub trait MeasureRenderer {
    fn render(&mut self, frame: &FrameView);
}
