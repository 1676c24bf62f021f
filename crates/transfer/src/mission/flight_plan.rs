//! Ordered segments forming one queryable mission timeline.

use std::sync::Arc;

use log::warn;
use logistics_orbits::{Body, OrbitError, OrbitalState};
use thiserror::Error;

use super::segment::TrajectorySegment;

/// Slack allowed between the end of one segment and the start of the next.
pub const CONTINUITY_TOLERANCE: f64 = 1e-6;

/// Errors raised while validating or querying a flight plan.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("flight plan has no segments")]
    Empty,
    #[error("query time {0} is not finite")]
    NonFiniteTime(f64),
    #[error("segment {index} ({phase}) ends at {end} s before it starts at {start} s")]
    InvertedSegment {
        index: usize,
        phase: String,
        start: f64,
        end: f64,
    },
    #[error("gap of {gap:.6} s after segment {index}")]
    Gap { index: usize, gap: f64 },
    #[error("segment {index} overlaps its successor by {overlap:.6} s")]
    Overlap { index: usize, overlap: f64 },
    #[error("segment {index} could not be evaluated: {source}")]
    Evaluation {
        index: usize,
        #[source]
        source: OrbitError,
    },
}

/// Where a query time landed in the plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanPosition {
    pub index: usize,
    /// Query time after clamping to the plan's span.
    pub time: f64,
    /// Whether no segment covered the time and the last one was used instead.
    pub fallback: bool,
}

/// Segments in chronological order. Appending does not sort or check adjacency; call
/// [`FlightPlan::validate`] once the plan is complete.
#[derive(Debug, Clone, Default)]
pub struct FlightPlan {
    segments: Vec<TrajectorySegment>,
}

impl FlightPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_segment(&mut self, segment: TrajectorySegment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[TrajectorySegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn start_time(&self) -> Option<f64> {
        self.segments.first().map(|s| s.start_time)
    }

    pub fn end_time(&self) -> Option<f64> {
        self.segments.last().map(|s| s.end_time)
    }

    /// Reject empty plans, inverted segments, and gaps or overlaps between neighbours.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.segments.is_empty() {
            return Err(PlanError::Empty);
        }
        for (index, segment) in self.segments.iter().enumerate() {
            if segment.end_time < segment.start_time {
                return Err(PlanError::InvertedSegment {
                    index,
                    phase: segment.phase.clone(),
                    start: segment.start_time,
                    end: segment.end_time,
                });
            }
        }
        for (index, pair) in self.segments.windows(2).enumerate() {
            let delta = pair[1].start_time - pair[0].end_time;
            if delta > CONTINUITY_TOLERANCE {
                return Err(PlanError::Gap { index, gap: delta });
            }
            if delta < -CONTINUITY_TOLERANCE {
                return Err(PlanError::Overlap {
                    index,
                    overlap: -delta,
                });
            }
        }
        Ok(())
    }

    /// Resolve `time` to a segment: clamp to the plan span, then take the first segment
    /// covering it, falling back to the last segment when none does.
    pub fn locate(&self, time: f64) -> Result<PlanPosition, PlanError> {
        if !time.is_finite() {
            return Err(PlanError::NonFiniteTime(time));
        }
        let (first, last) = match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(PlanError::Empty),
        };
        let last_index = self.segments.len() - 1;

        if time < first.start_time {
            return Ok(PlanPosition {
                index: 0,
                time: first.start_time,
                fallback: false,
            });
        }
        if time > last.end_time {
            return Ok(PlanPosition {
                index: last_index,
                time: last.end_time,
                fallback: false,
            });
        }
        if let Some(index) = self.segments.iter().position(|s| s.contains(time)) {
            return Ok(PlanPosition {
                index,
                time,
                fallback: false,
            });
        }

        warn!("no segment covers t={time} s; falling back to the last segment");
        Ok(PlanPosition {
            index: last_index,
            time,
            fallback: true,
        })
    }

    /// State and reference body at `time`. Callers should re-read the body every query,
    /// since it changes at SOI hand-offs.
    pub fn evaluate(&self, time: f64) -> Result<(OrbitalState, &Arc<Body>), PlanError> {
        let position = self.locate(time)?;
        let segment = &self.segments[position.index];
        let state = segment
            .evaluate(position.time)
            .map_err(|source| PlanError::Evaluation {
                index: position.index,
                source,
            })?;
        Ok((state, segment.reference_body()))
    }
}
