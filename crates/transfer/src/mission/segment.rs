//! A single leg of a flight plan: one trajectory plus its planning metadata.

use std::fmt;
use std::sync::Arc;

use logistics_orbits::{Body, OrbitError, OrbitalState, Trajectory};

/// How the spacecraft moves during a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryType {
    OrbitPropagation,
    Launch,
    HohmannTransfer,
    Circularize,
    Landing,
    Aerobraking,
}

impl TrajectoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrajectoryType::OrbitPropagation => "orbit_propagation",
            TrajectoryType::Launch => "launch",
            TrajectoryType::HohmannTransfer => "hohmann_transfer",
            TrajectoryType::Circularize => "circularize",
            TrajectoryType::Landing => "landing",
            TrajectoryType::Aerobraking => "aerobraking",
        }
    }
}

impl fmt::Display for TrajectoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event expected to close a segment. Advisory: segments end on their explicit end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCondition {
    TimeElapsed,
    EnterTargetSoi,
    ReachAltitude,
    ApoapsisReached,
    PeriapsisReached,
}

impl ExitCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitCondition::TimeElapsed => "time_elapsed",
            ExitCondition::EnterTargetSoi => "enter_target_soi",
            ExitCondition::ReachAltitude => "reach_altitude",
            ExitCondition::ApoapsisReached => "apoapsis_reached",
            ExitCondition::PeriapsisReached => "periapsis_reached",
        }
    }
}

impl fmt::Display for ExitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trajectory bound to an explicit `[start_time, end_time]` span of the mission.
///
/// The span is authoritative and may differ from the trajectory's own sampling window.
#[derive(Debug, Clone)]
pub struct TrajectorySegment {
    pub phase: String,
    pub trajectory: Arc<dyn Trajectory>,
    pub start_time: f64,
    pub end_time: f64,
    pub kind: TrajectoryType,
    pub exit_condition: ExitCondition,
    /// Body whose SOI is entered at the end of this segment.
    pub next_body: Option<Arc<Body>>,
    /// Altitude above the reference surface for `ReachAltitude` exits (metres).
    pub target_altitude: Option<f64>,
}

impl TrajectorySegment {
    pub fn new(
        phase: impl Into<String>,
        trajectory: Arc<dyn Trajectory>,
        start_time: f64,
        end_time: f64,
        kind: TrajectoryType,
        exit_condition: ExitCondition,
    ) -> Self {
        Self {
            phase: phase.into(),
            trajectory,
            start_time,
            end_time,
            kind,
            exit_condition,
            next_body: None,
            target_altitude: None,
        }
    }

    pub fn with_next_body(mut self, body: Arc<Body>) -> Self {
        self.next_body = Some(body);
        self
    }

    pub fn with_target_altitude(mut self, altitude: f64) -> Self {
        self.target_altitude = Some(altitude);
        self
    }

    pub fn reference_body(&self) -> &Arc<Body> {
        self.trajectory.reference_body()
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn contains(&self, time: f64) -> bool {
        self.start_time <= time && time <= self.end_time
    }

    pub fn evaluate(&self, time: f64) -> Result<OrbitalState, OrbitError> {
        self.trajectory.evaluate(time)
    }
}
