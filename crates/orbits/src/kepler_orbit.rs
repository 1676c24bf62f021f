//! Closed-form two-body propagation of fixed orbital elements.

use std::sync::Arc;

use logistics_core::vector::Vector3;

use crate::body::Body;
use crate::elements::OrbitParameters;
use crate::error::OrbitError;
use crate::kepler::{
    eccentric_to_true_anomaly, hyperbolic_to_true_anomaly, solve_kepler, solve_kepler_hyperbolic,
};
use crate::state::OrbitalState;
use crate::trajectory::Trajectory;

/// Orbital elements bound to a reference body, an epoch and a sampling window.
#[derive(Debug, Clone)]
pub struct KeplerOrbit {
    body: Arc<Body>,
    params: OrbitParameters,
    epoch: f64,
    start_time: f64,
    end_time: f64,
}

impl KeplerOrbit {
    /// Validate `params` against `body` and bind them. `epoch` is the time at which
    /// `params.mean_anomaly_at_epoch` holds.
    pub fn new(
        body: Arc<Body>,
        params: OrbitParameters,
        epoch: f64,
        start_time: f64,
        end_time: f64,
    ) -> Result<Self, OrbitError> {
        params.validate(body.mu())?;
        if !(epoch.is_finite() && start_time.is_finite() && end_time.is_finite()) {
            return Err(OrbitError::domain("orbit times must be finite"));
        }
        if end_time < start_time {
            return Err(OrbitError::domain(format!(
                "orbit window ends ({end_time}) before it starts ({start_time})"
            )));
        }
        Ok(Self {
            body,
            params,
            epoch,
            start_time,
            end_time,
        })
    }

    pub fn parameters(&self) -> &OrbitParameters {
        &self.params
    }

    pub fn epoch(&self) -> f64 {
        self.epoch
    }

    /// Mean anomaly at `time`; unwrapped.
    pub fn mean_anomaly_at(&self, time: f64) -> f64 {
        self.params.mean_anomaly_at_epoch + self.params.mean_motion * (time - self.epoch)
    }

    /// True anomaly at `time`, solving the appropriate form of Kepler's equation.
    pub fn true_anomaly_at(&self, time: f64) -> Result<f64, OrbitError> {
        let m = self.mean_anomaly_at(time);
        let e = self.params.eccentricity;
        if self.params.is_hyperbolic() {
            hyperbolic_to_true_anomaly(solve_kepler_hyperbolic(m, e)?, e)
        } else {
            eccentric_to_true_anomaly(solve_kepler(m, e)?, e)
        }
    }
}

impl Trajectory for KeplerOrbit {
    fn reference_body(&self) -> &Arc<Body> {
        &self.body
    }

    fn start_time(&self) -> f64 {
        self.start_time
    }

    fn end_time(&self) -> f64 {
        self.end_time
    }

    fn evaluate(&self, time: f64) -> Result<OrbitalState, OrbitError> {
        let nu = self.true_anomaly_at(time)?;
        let e = self.params.eccentricity;
        let p = self.params.semi_latus_rectum();
        let (sin_nu, cos_nu) = nu.sin_cos();

        let r = p / (1.0 + e * cos_nu);
        let k = (self.body.mu() / p).sqrt();

        let position = perifocal_to_frame(&self.params, r * cos_nu, r * sin_nu);
        let velocity = perifocal_to_frame(&self.params, -k * sin_nu, k * (e + cos_nu));
        Ok(OrbitalState::new(position, velocity, time))
    }

    fn elements(&self) -> Option<&OrbitParameters> {
        Some(&self.params)
    }
}

/// Rotate a perifocal vector `(x, y, 0)` into the reference frame through the
/// 3-1-3 sequence Ω, i, ω.
pub fn perifocal_to_frame(params: &OrbitParameters, x: f64, y: f64) -> Vector3 {
    let (sin_o, cos_o) = params.longitude_of_ascending_node.sin_cos();
    let (sin_i, cos_i) = params.inclination.sin_cos();
    let (sin_w, cos_w) = params.argument_of_periapsis.sin_cos();

    let r11 = cos_o * cos_w - sin_o * sin_w * cos_i;
    let r12 = -cos_o * sin_w - sin_o * cos_w * cos_i;
    let r21 = sin_o * cos_w + cos_o * sin_w * cos_i;
    let r22 = -sin_o * sin_w + cos_o * cos_w * cos_i;
    let r31 = sin_w * sin_i;
    let r32 = cos_w * sin_i;

    [r11 * x + r12 * y, r21 * x + r22 * y, r31 * x + r32 * y]
}
