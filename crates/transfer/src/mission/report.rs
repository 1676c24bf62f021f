//! Conversion of flight plans into export records.

use logistics_export::ephemeris::Record;
use logistics_export::summary::{BurnSummary, PlanSummary, SegmentSummary};
use logistics_orbits::trajectory::sample_times;
use logistics_orbits::{CaptureSense, Trajectory};

use super::builder::MoonMission;
use super::flight_plan::{FlightPlan, PlanError};

/// Sample `samples` states per segment across each segment's span.
///
/// Rows borrow phase and body names from `plan`.
pub fn ephemeris_rows(plan: &FlightPlan, samples: usize) -> Result<Vec<Record<'_>>, PlanError> {
    let mut rows = Vec::with_capacity(plan.len() * samples);
    for (index, segment) in plan.segments().iter().enumerate() {
        for time in sample_times(segment.start_time, segment.end_time, samples) {
            let state = segment
                .evaluate(time)
                .map_err(|source| PlanError::Evaluation { index, source })?;
            rows.push(Record {
                time_s: time,
                segment: index,
                phase: &segment.phase,
                reference_body: &segment.reference_body().name,
                position_m: state.position,
                velocity_m_s: state.velocity,
            });
        }
    }
    Ok(rows)
}

pub fn segment_summaries(plan: &FlightPlan) -> Vec<SegmentSummary> {
    plan.segments()
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            let elements = Trajectory::elements(segment.trajectory.as_ref());
            SegmentSummary {
                index,
                phase: segment.phase.clone(),
                kind: segment.kind.to_string(),
                reference_body: segment.reference_body().name.clone(),
                start_time_s: segment.start_time,
                end_time_s: segment.end_time,
                exit_condition: segment.exit_condition.to_string(),
                next_body: segment.next_body.as_ref().map(|b| b.name.clone()),
                semi_major_axis_m: elements.map(|e| e.semi_major_axis),
                eccentricity: elements.map(|e| e.eccentricity),
            }
        })
        .collect()
}

pub fn plan_summary(mission: &MoonMission) -> PlanSummary {
    let capture_sense = match mission.approach.sense {
        CaptureSense::Prograde => "prograde",
        CaptureSense::Retrograde => "retrograde",
    };
    PlanSummary {
        origin: mission.origin.name.clone(),
        destination: mission.destination.name.clone(),
        request_time_s: mission.request_time,
        launch_time_s: mission.launch_time,
        soi_entry_time_s: mission.soi_entry_time,
        periapsis_time_s: mission.periapsis_time,
        end_time_s: mission.plan.end_time().unwrap_or(mission.periapsis_time),
        transfer_apogee_m: mission.transfer_apogee,
        apogee_search_converged: mission.apogee_search.is_some_and(|s| s.converged),
        phase_angle_rad: mission.phase_angle,
        capture_sense: capture_sense.to_string(),
        capture_periapsis_m: mission.approach.periapsis_radius,
        v_infinity_m_s: mission.approach.v_infinity,
        burns: vec![
            BurnSummary {
                name: "injection".to_string(),
                time_s: mission.launch_time,
                delta_v_m_s: mission.injection_delta_v,
            },
            BurnSummary {
                name: "capture".to_string(),
                time_s: mission.periapsis_time,
                delta_v_m_s: mission.capture_delta_v,
            },
        ],
        total_delta_v_m_s: mission.total_delta_v(),
        segments: segment_summaries(&mission.plan),
    }
}
