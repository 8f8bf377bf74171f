use serde::{Deserialize, Serialize};

/// Ruler length presets used for length snapping, grid rounding and notches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RulerPreset {
    /// Large grid block size (2.5 m).
    #[default]
    LargeGrid,
    /// Small grid block size (0.5 m).
    SmallGrid,
    /// One meter.
    Meter,
}

impl RulerPreset {
    /// Length of one ruler unit in meters.
    #[must_use]
    pub fn meters(self) -> f64 {
        match self {
            Self::LargeGrid => 2.5,
            Self::SmallGrid => 0.5,
            Self::Meter => 1.0,
        }
    }

    /// The preset after this one, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::LargeGrid => Self::SmallGrid,
            Self::SmallGrid => Self::Meter,
            Self::Meter => Self::LargeGrid,
        }
    }
}

/// Angular increment presets; each divides 180° evenly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnglePreset {
    /// 45° steps.
    Coarse,
    /// 15° steps.
    #[default]
    Medium,
    /// 5° steps.
    Fine,
}

impl AnglePreset {
    /// Increment in degrees.
    #[must_use]
    pub fn degrees(self) -> f64 {
        match self {
            Self::Coarse => 45.0,
            Self::Medium => 15.0,
            Self::Fine => 5.0,
        }
    }

    /// Increment in radians.
    #[must_use]
    pub fn radians(self) -> f64 {
        self.degrees().to_radians()
    }

    /// The preset after this one, wrapping around.
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Coarse => Self::Medium,
            Self::Medium => Self::Fine,
            Self::Fine => Self::Coarse,
        }
    }
}

/// The currently active ruler and angle units.
///
/// Cycled by external input; persisted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UnitConfig {
    pub ruler: RulerPreset,
    pub angle: AnglePreset,
}

impl UnitConfig {
    /// Active ruler unit in meters.
    #[must_use]
    pub fn ruler_unit(&self) -> f64 {
        self.ruler.meters()
    }

    /// Active angular increment in radians.
    #[must_use]
    pub fn angle_increment(&self) -> f64 {
        self.angle.radians()
    }

    /// Advances to the next ruler preset.
    pub fn cycle_ruler(&mut self) -> RulerPreset {
        self.ruler = self.ruler.next();
        self.ruler
    }

    /// Advances to the next angle preset.
    pub fn cycle_angle(&mut self) -> AnglePreset {
        self.angle = self.angle.next();
        self.angle
    }
}

/// Fixed thresholds and tolerances of the measurement session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureSettings {
    /// Hit-sphere radius around every aimable point (m).
    pub aimable_radius: f64,

    /// Distance subtracted from a vertex hit's camera distance when it competes
    /// with a line-interior hit (m).
    pub endpoint_bias: f64,

    /// Maximum aiming distance (m).
    pub max_range: f64,

    /// Distance in front of the camera used for points placed in empty space (m).
    pub empty_space_distance: f64,

    /// Ticks the primary control must be held to trigger a hold.
    pub hold_ticks: u32,

    /// Ignored ticks after which the "let go" hint is shown.
    pub release_hint_ticks: u32,

    /// Ticks the delete control must be held to clear everything.
    pub delete_all_ticks: u32,

    /// Ticks between candidate-point rescans.
    pub rescan_ticks: u32,

    /// Minimum distance between a new point and the pending vertex (m).
    pub min_point_distance: f64,

    /// Maximum drift off a line before a line anchor falls back to a free vertex (m).
    pub line_drift_tolerance: f64,

    /// Distance under which two endpoints are considered the same joint (m).
    pub joint_tolerance: f64,

    /// Minimum `|cos|` for a direction or plane snap to engage.
    pub snap_cosine: f64,

    /// Interference factor passed to the artificial gravity query.
    pub gravity_interference: f64,

    /// Collision layer mask passed to the world ray-cast.
    pub ray_layer_mask: u32,
}

impl Default for MeasureSettings {
    fn default() -> Self {
        Self {
            aimable_radius: 0.1,
            endpoint_bias: 0.25,
            max_range: 100.0,
            empty_space_distance: 2.5,
            hold_ticks: 30,
            release_hint_ticks: 60,
            delete_all_ticks: 40,
            rescan_ticks: 6,
            min_point_distance: 0.01,
            line_drift_tolerance: 0.001,
            joint_tolerance: 0.001,
            snap_cosine: 0.9,
            gravity_interference: 1.0,
            ray_layer_mask: u32::MAX,
        }
    }
}
