//! Classical orbital elements.

use std::f64::consts::{PI, TAU};

use crate::error::OrbitError;
use crate::kepler::mean_motion;

/// Eccentricities closer to 1 than this are treated as parabolic and rejected.
pub const PARABOLIC_BAND: f64 = 1e-9;
/// Allowed relative mismatch between a stored mean motion and `sqrt(μ/a³)`.
pub const MEAN_MOTION_TOLERANCE: f64 = 1e-6;

/// Keplerian elements of an orbit about a single reference body.
///
/// Lengths are metres, angles radians, mean motion rad/s. `semi_major_axis` is always the
/// positive magnitude; whether the conic is an ellipse or a hyperbola is carried by
/// `eccentricity` alone. The epoch at which `mean_anomaly_at_epoch` applies is owned by
/// whoever propagates the elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitParameters {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub longitude_of_ascending_node: f64,
    pub argument_of_periapsis: f64,
    pub mean_anomaly_at_epoch: f64,
    pub mean_motion: f64,
}

impl OrbitParameters {
    /// Planar (`i = Ω = 0`) elements with the mean motion derived from `mu`.
    pub fn planar(
        mu: f64,
        semi_major_axis: f64,
        eccentricity: f64,
        argument_of_periapsis: f64,
        mean_anomaly_at_epoch: f64,
    ) -> Result<Self, OrbitError> {
        let params = OrbitParameters {
            semi_major_axis,
            eccentricity,
            inclination: 0.0,
            longitude_of_ascending_node: 0.0,
            argument_of_periapsis,
            mean_anomaly_at_epoch,
            mean_motion: mean_motion(mu, semi_major_axis),
        };
        params.validate(mu)?;
        Ok(params)
    }

    /// Circular planar orbit of the given radius. `phase` is the polar angle of the
    /// orbiting point at epoch.
    pub fn circular(mu: f64, radius: f64, phase: f64) -> Result<Self, OrbitError> {
        Self::planar(mu, radius, 0.0, phase, 0.0)
    }

    /// Replace the orientation of the orbital plane.
    pub fn with_orientation(mut self, inclination: f64, longitude_of_ascending_node: f64) -> Self {
        self.inclination = inclination;
        self.longitude_of_ascending_node = longitude_of_ascending_node;
        self
    }

    /// Flip a planar orbit to clockwise motion (`i = π`) while keeping its periapsis at
    /// the polar angle `periapsis_angle`.
    pub fn retrograde_planar(mut self, periapsis_angle: f64) -> Self {
        self.inclination = PI;
        self.longitude_of_ascending_node = 0.0;
        self.argument_of_periapsis = -periapsis_angle;
        self
    }

    /// Whether the elements describe an open (hyperbolic) trajectory.
    pub fn is_hyperbolic(&self) -> bool {
        self.eccentricity > 1.0
    }

    /// Semi-latus rectum `p = a·|1 − e²|`.
    pub fn semi_latus_rectum(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity).abs()
    }

    /// Periapsis radius `a·|1 − e|`.
    pub fn periapsis_radius(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity).abs()
    }

    /// Apoapsis radius, `None` for hyperbolae.
    pub fn apoapsis_radius(&self) -> Option<f64> {
        (!self.is_hyperbolic()).then(|| self.semi_major_axis * (1.0 + self.eccentricity))
    }

    /// Orbital period, `None` for hyperbolae.
    pub fn period(&self) -> Option<f64> {
        (!self.is_hyperbolic()).then(|| TAU / self.mean_motion)
    }

    /// Check the elements against the reference body's gravitational parameter.
    pub fn validate(&self, mu: f64) -> Result<(), OrbitError> {
        if !(mu.is_finite() && mu > 0.0) {
            return Err(OrbitError::domain(format!(
                "gravitational parameter must be positive, got {mu}"
            )));
        }
        if !(self.semi_major_axis.is_finite() && self.semi_major_axis > 0.0) {
            return Err(OrbitError::domain(format!(
                "semi-major axis must be a positive magnitude, got {}",
                self.semi_major_axis
            )));
        }
        if !(self.eccentricity.is_finite() && self.eccentricity >= 0.0) {
            return Err(OrbitError::domain(format!(
                "eccentricity must be non-negative, got {}",
                self.eccentricity
            )));
        }
        if (self.eccentricity - 1.0).abs() <= PARABOLIC_BAND {
            return Err(OrbitError::domain("parabolic orbits (e = 1) are not supported"));
        }
        let angles = [
            self.inclination,
            self.longitude_of_ascending_node,
            self.argument_of_periapsis,
            self.mean_anomaly_at_epoch,
        ];
        if angles.iter().any(|a| !a.is_finite()) {
            return Err(OrbitError::domain("orientation angles must be finite"));
        }

        let expected = mean_motion(mu, self.semi_major_axis);
        if ((self.mean_motion - expected) / expected).abs() > MEAN_MOTION_TOLERANCE {
            return Err(OrbitError::domain(format!(
                "mean motion {} rad/s is inconsistent with mu and a (expected {expected})",
                self.mean_motion
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MU_EARTH: f64 = 3.986e14;

    #[test]
    fn planar_derives_mean_motion() {
        let p = OrbitParameters::planar(MU_EARTH, 7.0e6, 0.1, 0.0, 0.0).unwrap();
        assert_relative_eq!(p.mean_motion, (MU_EARTH / 7.0e6_f64.powi(3)).sqrt());
        assert_relative_eq!(p.period().unwrap(), TAU / p.mean_motion);
        assert_relative_eq!(p.periapsis_radius(), 6.3e6, max_relative = 1e-12);
        assert_relative_eq!(p.apoapsis_radius().unwrap(), 7.7e6, max_relative = 1e-12);
    }

    #[test]
    fn rejects_degenerate_elements() {
        assert!(OrbitParameters::planar(MU_EARTH, 0.0, 0.1, 0.0, 0.0).is_err());
        assert!(OrbitParameters::planar(MU_EARTH, 7.0e6, 1.0, 0.0, 0.0).is_err());
        assert!(OrbitParameters::planar(MU_EARTH, 7.0e6, -0.2, 0.0, 0.0).is_err());
        assert!(OrbitParameters::planar(0.0, 7.0e6, 0.1, 0.0, 0.0).is_err());
        assert!(OrbitParameters::planar(-1.0, 7.0e6, 0.1, 0.0, 0.0).is_err());
    }

    #[test]
    fn rejects_inconsistent_mean_motion() {
        let mut p = OrbitParameters::circular(MU_EARTH, 7.0e6, 0.0).unwrap();
        p.mean_motion *= 1.01;
        assert!(matches!(p.validate(MU_EARTH), Err(OrbitError::Domain(_))));
    }

    #[test]
    fn hyperbola_has_no_period() {
        let p = OrbitParameters::planar(MU_EARTH, 1.0e7, 1.4, 0.0, 0.0).unwrap();
        assert!(p.is_hyperbolic());
        assert!(p.period().is_none());
        assert!(p.apoapsis_radius().is_none());
        assert_relative_eq!(p.periapsis_radius(), 4.0e6, max_relative = 1e-12);
    }
}
