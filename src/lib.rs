pub mod aim;
pub mod config;
pub mod error;
pub mod graph;
pub mod math;
pub mod render;
pub mod session;
pub mod snap;
pub mod world;

pub use aim::{AimResult, TargetResolver};
pub use config::{MeasureSettings, UnitConfig};
pub use error::{MeasureError, Result};
pub use graph::MeasureGraph;
pub use render::{FrameView, MeasureRenderer};
pub use session::{InputFrame, MeasurementSession, TickReport};
pub use snap::{SnapEngine, SnapModifiers};
pub use world::World;
