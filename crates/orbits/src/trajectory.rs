use std::fmt;
use std::sync::Arc;

use logistics_core::vector::Vector3;

use crate::body::Body;
use crate::elements::OrbitParameters;
use crate::error::OrbitError;
use crate::state::OrbitalState;

/// Anything that can report a state relative to a reference body at an absolute time.
///
/// `start_time`/`end_time` describe the window used for path sampling only; `evaluate`
/// is expected to extrapolate outside it.
pub trait Trajectory: fmt::Debug + Send + Sync {
    fn reference_body(&self) -> &Arc<Body>;

    fn start_time(&self) -> f64;

    fn end_time(&self) -> f64;

    fn evaluate(&self, time: f64) -> Result<OrbitalState, OrbitError>;

    /// Fixed elements behind the trajectory, when it has any.
    fn elements(&self) -> Option<&OrbitParameters> {
        None
    }

    /// Positions at `resolution` evenly spaced times across the sampling window.
    fn path_points(&self, resolution: usize) -> Result<Vec<Vector3>, OrbitError> {
        sample_times(self.start_time(), self.end_time(), resolution)
            .map(|t| self.evaluate(t).map(|state| state.position))
            .collect()
    }
}

/// `count` evenly spaced instants over `[start, end]`, inclusive of both ends.
/// A single sample lands on `start`.
pub fn sample_times(start: f64, end: f64, count: usize) -> impl Iterator<Item = f64> {
    let step = if count > 1 {
        (end - start) / (count - 1) as f64
    } else {
        0.0
    };
    (0..count).map(move |i| {
        if i + 1 == count && count > 1 {
            end
        } else {
            start + step * i as f64
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_times_hits_both_ends() {
        let times: Vec<f64> = sample_times(10.0, 20.0, 5).collect();
        assert_eq!(times, vec![10.0, 12.5, 15.0, 17.5, 20.0]);
    }

    #[test]
    fn sample_times_degenerate_counts() {
        assert_eq!(sample_times(3.0, 9.0, 0).count(), 0);
        assert_eq!(sample_times(3.0, 9.0, 1).collect::<Vec<_>>(), vec![3.0]);
    }
}
