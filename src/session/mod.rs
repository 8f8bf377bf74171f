mod input;
mod placement;

pub use input::{DeleteTracker, DeleteTrigger, InputFrame, Trigger, TriggerTracker};

use std::fmt;

use tracing::{debug, info, warn};

use crate::aim::{AimQuery, AimResult, TargetResolver};
use crate::config::{MeasureSettings, UnitConfig};
use crate::graph::{AngleId, LineId, MeasureGraph, RemovedLine, VertexId};
use crate::math::{Point3, Ray};
use crate::render::{FrameView, MeasureRenderer};
use crate::snap::{SnapEngine, SnapOutcome};
use crate::world::{EntityId, World};

/// Whether a line is being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementState {
    Idle,
    /// The first endpoint is placed; the next placement finishes the line.
    Pending(VertexId),
}

/// Why a placement trigger was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// A click with nothing under the aim.
    NothingAimed,
    /// The new point is too close to the pending vertex.
    TooClose,
}

/// Something that changed the graph or the placement state during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Placed { vertex: VertexId, trigger: Trigger },
    LineFinalized { line: LineId, angles: Vec<AngleId> },
    LineDeleted(RemovedLine),
    Cleared,
    /// The pending vertex was discarded.
    Cancelled,
    Rejected(RejectReason),
}

/// Transient user-facing hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// The primary control is still held after a placement.
    LetGo,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LetGo => f.write_str("You can let go"),
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub events: Vec<SessionEvent>,
    pub notices: Vec<Notice>,
    /// Entity-anchored vertices that froze because their entity is gone.
    pub frozen: Vec<VertexId>,
}

/// An interactive measurement session over a host scene.
#[derive(Debug)]
pub struct MeasurementSession {
    graph: MeasureGraph,
    pending: Option<VertexId>,
    aim: AimResult,
    target: Option<Point3>,
    snap: Option<SnapOutcome>,
    notices: Vec<Notice>,
    resolver: TargetResolver,
    snap_engine: SnapEngine,
    trigger: TriggerTracker,
    delete: DeleteTracker,
    units: UnitConfig,
    settings: MeasureSettings,
    controlled_entity: Option<EntityId>,
}

impl MeasurementSession {
    #[must_use]
    pub fn new(settings: MeasureSettings, units: UnitConfig) -> Self {
        Self {
            graph: MeasureGraph::new(),
            pending: None,
            aim: AimResult::None,
            target: None,
            snap: None,
            notices: Vec::new(),
            resolver: TargetResolver::new(&settings),
            snap_engine: SnapEngine::new(&settings),
            trigger: TriggerTracker::default(),
            delete: DeleteTracker::default(),
            units,
            settings,
            controlled_entity: None,
        }
    }

    /// Sets the user's own entity, which aiming skips.
    pub fn set_controlled_entity(&mut self, entity: Option<EntityId>) {
        self.controlled_entity = entity;
    }

    #[must_use]
    pub fn graph(&self) -> &MeasureGraph {
        &self.graph
    }

    #[must_use]
    pub fn units(&self) -> &UnitConfig {
        &self.units
    }

    /// Units are cycled by the host between ticks.
    pub fn units_mut(&mut self) -> &mut UnitConfig {
        &mut self.units
    }

    #[must_use]
    pub fn aim(&self) -> &AimResult {
        &self.aim
    }

    /// The snap applied to the current target, while a line is pending.
    #[must_use]
    pub fn snap(&self) -> Option<&SnapOutcome> {
        self.snap.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> PlacementState {
        self.pending.map_or(PlacementState::Idle, PlacementState::Pending)
    }

    /// Advances the session by one tick.
    pub fn tick<W>(&mut self, world: &W, camera: &Ray, input: &InputFrame) -> TickReport
    where
        W: World + ?Sized,
    {
        let mut report = TickReport {
            frozen: self.graph.sync_entities(world),
            ..TickReport::default()
        };
        self.notices.clear();

        if !input.readable {
            return report;
        }

        if !input.primary_held {
            self.update_target(world, camera, input);
        }

        let trigger = self.trigger.update(input.primary_held, self.settings.hold_ticks);
        if self.trigger.ignored_ticks() >= self.settings.release_hint_ticks {
            report.notices.push(Notice::LetGo);
        }
        if trigger != Trigger::None {
            self.place(world, camera, trigger, input.primary_held, &mut report);
        }

        match self.delete.update(input.delete_held, self.settings.delete_all_ticks) {
            DeleteTrigger::ClearAll => {
                self.clear();
                report.events.push(SessionEvent::Cleared);
            }
            DeleteTrigger::Tap => self.delete_tap(&mut report),
            DeleteTrigger::None => {}
        }

        self.notices.clone_from(&report.notices);
        report
    }

    /// Snapshot of everything to draw this frame.
    #[must_use]
    pub fn frame(&self) -> FrameView {
        let mut view = FrameView::measurements(&self.graph, self.units.ruler_unit());
        view.aim = self.aim;
        view.target = self.target;
        view.pending = self.pending.and_then(|id| self.graph.vertex_position(id).ok());
        view.preview = view.pending.zip(self.target).map(|(a, b)| [a, b]);
        view.advisories = self.snap.as_ref().map(|s| s.advisories.clone()).unwrap_or_default();
        view.notices.clone_from(&self.notices);
        view
    }

    /// Builds the current frame and hands it to `renderer`.
    pub fn render<R>(&self, renderer: &mut R)
    where
        R: MeasureRenderer + ?Sized,
    {
        renderer.render(&self.frame());
    }

    /// Removes every measurement and any pending vertex.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.pending = None;
        self.aim = AimResult::None;
        self.snap = None;
        info!("measurements cleared");
    }

    fn update_target<W>(&mut self, world: &W, camera: &Ray, input: &InputFrame)
    where
        W: World + ?Sized,
    {
        let query = AimQuery {
            ray: *camera,
            max_range: self.settings.max_range,
            snap_to_grid: input.snap_to_grid,
            ruler_unit: self.units.ruler_unit(),
            controlled_entity: self.controlled_entity,
        };
        self.aim = self.resolver.resolve(&self.graph, world, &query);

        let raw = self
            .aim
            .position()
            .unwrap_or_else(|| camera.at(self.settings.empty_space_distance));
        self.snap = None;
        self.target = Some(raw);

        let Some(pending) = self.pending else {
            return;
        };
        match self
            .snap_engine
            .apply(&self.graph, world, pending, raw, input.modifiers, &self.units)
        {
            Ok(outcome) => {
                self.target = Some(outcome.position);
                self.snap = Some(outcome);
            }
            Err(err) => warn!(%err, "snap skipped"),
        }
    }

    fn place<W>(&mut self, world: &W, camera: &Ray, trigger: Trigger, held: bool, report: &mut TickReport)
    where
        W: World + ?Sized,
    {
        if trigger == Trigger::Click && self.aim.is_none() {
            report.events.push(SessionEvent::Rejected(RejectReason::NothingAimed));
            return;
        }

        let point = self
            .target
            .unwrap_or_else(|| camera.at(self.settings.empty_space_distance));
        if let Some(pending) = self.pending {
            let too_close = self
                .graph
                .vertex_position(pending)
                .is_ok_and(|p| (point - p).norm() < self.settings.min_point_distance);
            if too_close {
                report.events.push(SessionEvent::Rejected(RejectReason::TooClose));
                return;
            }
        }

        let data = placement::build_vertex(
            &self.graph,
            world,
            trigger,
            &self.aim,
            point,
            self.settings.line_drift_tolerance,
        );
        let vertex = match self.graph.add_vertex(data) {
            Ok(vertex) => vertex,
            Err(err) => {
                warn!(%err, "placement failed");
                return;
            }
        };
        if held {
            self.trigger.ignore_until_release();
        }
        debug!(?vertex, ?trigger, "vertex placed");
        report.events.push(SessionEvent::Placed { vertex, trigger });

        let Some(first) = self.pending.take() else {
            self.pending = Some(vertex);
            return;
        };
        self.snap = None;
        match self.graph.add_line(first, vertex) {
            Ok(line) => {
                let angles = placement::derive_angles(&mut self.graph, line).unwrap_or_else(|err| {
                    warn!(%err, ?line, "angle derivation failed");
                    Vec::new()
                });
                report.events.push(SessionEvent::LineFinalized { line, angles });
            }
            Err(err) => {
                warn!(%err, "line creation failed");
                for orphan in [first, vertex] {
                    if let Err(err) = self.graph.remove_unhosted_vertex(orphan) {
                        warn!(%err, ?orphan, "orphan vertex left behind");
                    }
                }
            }
        }
    }

    /// A short delete press cancels a pending line, or deletes the line under
    /// the aim while idle.
    fn delete_tap(&mut self, report: &mut TickReport) {
        if let Some(pending) = self.pending.take() {
            if let Err(err) = self.graph.remove_unhosted_vertex(pending) {
                warn!(%err, "pending vertex already gone");
            }
            self.snap = None;
            report.events.push(SessionEvent::Cancelled);
            return;
        }

        let Some(line) = self.aim.targeted_line(&self.graph) else {
            return;
        };
        match self.graph.remove_line(line) {
            Ok(removed) => {
                self.aim = AimResult::None;
                report.events.push(SessionEvent::LineDeleted(removed));
            }
            Err(err) => warn!(%err, ?line, "delete failed"),
        }
    }
}
