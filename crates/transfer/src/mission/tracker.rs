//! Pull-model tracking of an in-flight mission.
//!
//! A host clock calls [`MissionTracker::update`] with the current simulation time; the
//! tracker reports where the spacecraft is, in which frame, and which phase it is in.

use std::fmt;
use std::sync::Arc;

use logistics_core::vector;
use logistics_orbits::{Body, OrbitalState, Trajectory};

use super::MissionError;
use super::flight_plan::{FlightPlan, PlanError};
use super::segment::{ExitCondition, TrajectorySegment, TrajectoryType};

/// Slack on altitude and SOI-radius comparisons (metres).
const DISTANCE_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionPhase {
    Ready,
    Parking,
    Transfer,
    Approach,
    Captured,
}

impl fmt::Display for MissionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MissionPhase::Ready => "ready",
            MissionPhase::Parking => "parking",
            MissionPhase::Transfer => "transfer",
            MissionPhase::Approach => "approach",
            MissionPhase::Captured => "captured",
        };
        f.write_str(label)
    }
}

/// Result of a single tracker query.
#[derive(Debug, Clone)]
pub struct TrackerUpdate {
    pub state: OrbitalState,
    pub reference_body: Arc<Body>,
    pub phase: MissionPhase,
    pub segment_index: usize,
    /// Whether the reference body differs from the previous query's.
    pub frame_changed: bool,
    /// Whether the active segment's advisory exit condition holds at this state.
    pub exit_condition_met: bool,
}

/// Stateful view over a validated flight plan.
#[derive(Debug, Clone)]
pub struct MissionTracker {
    plan: FlightPlan,
    last_reference: Option<String>,
}

impl MissionTracker {
    pub fn new(plan: FlightPlan) -> Result<Self, MissionError> {
        plan.validate()?;
        Ok(Self {
            plan,
            last_reference: None,
        })
    }

    pub fn plan(&self) -> &FlightPlan {
        &self.plan
    }

    pub fn update(&mut self, time: f64) -> Result<TrackerUpdate, MissionError> {
        let position = self.plan.locate(time)?;
        let segment = &self.plan.segments()[position.index];
        let state = segment
            .evaluate(position.time)
            .map_err(|source| PlanError::Evaluation {
                index: position.index,
                source,
            })?;
        let reference_body = Arc::clone(segment.reference_body());

        let before_start = self.plan.start_time().is_some_and(|start| time < start);
        let phase = if before_start {
            MissionPhase::Ready
        } else {
            self.phase_of(segment)
        };
        let exit_condition_met = exit_condition_met(segment, &state, position.time)?;

        let frame_changed = self
            .last_reference
            .as_deref()
            .is_some_and(|last| last != reference_body.name);
        self.last_reference = Some(reference_body.name.clone());

        Ok(TrackerUpdate {
            state,
            reference_body,
            phase,
            segment_index: position.index,
            frame_changed,
            exit_condition_met,
        })
    }

    fn phase_of(&self, segment: &TrajectorySegment) -> MissionPhase {
        match segment.kind {
            TrajectoryType::Launch => MissionPhase::Parking,
            TrajectoryType::HohmannTransfer => MissionPhase::Transfer,
            TrajectoryType::Aerobraking => MissionPhase::Approach,
            TrajectoryType::Circularize | TrajectoryType::Landing => MissionPhase::Captured,
            TrajectoryType::OrbitPropagation => {
                let origin = self.plan.segments().first().map(|s| &s.reference_body().name);
                if origin == Some(&segment.reference_body().name) {
                    MissionPhase::Parking
                } else {
                    MissionPhase::Approach
                }
            }
        }
    }
}

/// Evaluate a segment's exit condition against the live state.
pub fn exit_condition_met(
    segment: &TrajectorySegment,
    state: &OrbitalState,
    time: f64,
) -> Result<bool, MissionError> {
    let reference = segment.reference_body();
    let met = match segment.exit_condition {
        ExitCondition::TimeElapsed => time >= segment.end_time,
        ExitCondition::EnterTargetSoi => match &segment.next_body {
            Some(next) => {
                let next_state = next.orbit_about(reference)?.evaluate(time)?;
                let distance = vector::norm(&vector::sub(&state.position, &next_state.position));
                distance <= next.soi_radius + DISTANCE_TOLERANCE
            }
            None => false,
        },
        ExitCondition::ReachAltitude => segment
            .target_altitude
            .is_some_and(|target| state.radius() - reference.radius <= target + DISTANCE_TOLERANCE),
        ExitCondition::ApoapsisReached => state.radial_rate() <= radial_slack(state),
        ExitCondition::PeriapsisReached => state.radial_rate() >= -radial_slack(state),
    };
    Ok(met)
}

/// Tolerance on `r·v` so apsis checks survive round-off at the apsis itself.
fn radial_slack(state: &OrbitalState) -> f64 {
    1e-9 * state.radius() * state.speed()
}
