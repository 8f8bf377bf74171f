use thiserror::Error;

/// Top-level error type for the measurement graph.
#[derive(Debug, Error)]
pub enum MeasureError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Snap(#[from] SnapError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to the vertex/line/angle store.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("entity not found: {0}")]
    EntityNotFound(&'static str),

    #[error("vertex is already hosted by another line")]
    VertexAlreadyHosted,

    #[error("a line needs two distinct vertices")]
    SameEndpoints,
}

/// Errors raised while snapping a tentative endpoint.
#[derive(Debug, Error)]
pub enum SnapError {
    #[error("angle {radians} rad is outside (0, pi]")]
    InvalidAngle { radians: f64 },

    #[error("no reference line to snap the angle against")]
    MissingReference,
}

/// Convenience type alias for results using [`MeasureError`].
pub type Result<T> = std::result::Result<T, MeasureError>;
