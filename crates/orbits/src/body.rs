use std::sync::Arc;

use logistics_core::constants::G;

use crate::elements::OrbitParameters;
use crate::error::OrbitError;
use crate::kepler::{circular_speed, vis_viva_speed};
use crate::kepler_orbit::KeplerOrbit;

/// A gravitating body as seen by the propagators.
///
/// Bodies are shared read-only through `Arc<Body>`; nothing in the orbital stack mutates
/// them. `orbit` describes the body's own motion about `parent`, with the mean anomaly
/// referenced to `orbit_epoch`.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: String,
    /// Mass in kilograms.
    pub mass: f64,
    /// Mean surface radius in metres.
    pub radius: f64,
    /// Sphere-of-influence radius in metres.
    pub soi_radius: f64,
    pub has_atmosphere: bool,
    pub parent: Option<String>,
    pub orbit: Option<OrbitParameters>,
    pub orbit_epoch: f64,
}

impl Body {
    pub fn new(name: impl Into<String>, mass: f64, radius: f64, soi_radius: f64) -> Self {
        Self {
            name: name.into(),
            mass,
            radius,
            soi_radius,
            has_atmosphere: false,
            parent: None,
            orbit: None,
            orbit_epoch: 0.0,
        }
    }

    pub fn with_atmosphere(mut self, has_atmosphere: bool) -> Self {
        self.has_atmosphere = has_atmosphere;
        self
    }

    pub fn with_orbit(
        mut self,
        parent: impl Into<String>,
        orbit: OrbitParameters,
        orbit_epoch: f64,
    ) -> Self {
        self.parent = Some(parent.into());
        self.orbit = Some(orbit);
        self.orbit_epoch = orbit_epoch;
        self
    }

    /// Gravitational parameter `μ = G·m` in m³/s².
    pub fn mu(&self) -> f64 {
        G * self.mass
    }

    /// Speed of a circular orbit at `altitude` above the surface.
    pub fn circular_speed_at_altitude(&self, altitude: f64) -> f64 {
        circular_speed(self.mu(), self.radius + altitude)
    }

    /// Escape speed at radius `radius` from the body's centre.
    pub fn escape_speed(&self, radius: f64) -> f64 {
        vis_viva_speed(self.mu(), radius, f64::INFINITY)
    }

    /// Whether `other` orbits this body directly.
    pub fn is_parent_of(&self, other: &Body) -> bool {
        other.parent.as_deref() == Some(self.name.as_str())
    }

    /// Propagator for this body's own orbit about `parent`.
    ///
    /// The returned orbit's sampling window is one period from the orbit epoch (or a
    /// single instant for open orbits); evaluation outside it is still valid.
    pub fn orbit_about(&self, parent: &Arc<Body>) -> Result<KeplerOrbit, OrbitError> {
        let params = self.orbit.ok_or_else(|| {
            OrbitError::domain(format!("{} has no orbital elements", self.name))
        })?;
        if !parent.is_parent_of(self) {
            return Err(OrbitError::domain(format!(
                "{} does not orbit {}",
                self.name, parent.name
            )));
        }
        let end = self.orbit_epoch + params.period().unwrap_or(0.0);
        KeplerOrbit::new(
            Arc::clone(parent),
            params,
            self.orbit_epoch,
            self.orbit_epoch,
            end,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::Trajectory;
    use approx::assert_relative_eq;

    fn earth() -> Arc<Body> {
        Arc::new(Body::new("EARTH", 5.972e24, 6.371e6, 9.24e8).with_atmosphere(true))
    }

    fn moon(earth: &Body) -> Body {
        let orbit = OrbitParameters::circular(earth.mu(), 3.844e8, 0.0).unwrap();
        Body::new("MOON", 7.342e22, 1.7374e6, 6.61e7).with_orbit("EARTH", orbit, 0.0)
    }

    #[test]
    fn escape_speed_is_root_two_circular() {
        let earth = earth();
        let r = earth.radius + 2.0e5;
        assert_relative_eq!(
            earth.escape_speed(r),
            2f64.sqrt() * earth.circular_speed_at_altitude(2.0e5),
            max_relative = 1e-12
        );
    }

    #[test]
    fn moon_orbit_about_earth_sits_at_mean_distance() {
        let earth = earth();
        let moon = moon(&earth);
        let orbit = moon.orbit_about(&earth).unwrap();
        let state = orbit.evaluate(12_345.0).unwrap();
        assert_relative_eq!(state.radius(), 3.844e8, max_relative = 1e-9);
        assert_eq!(orbit.reference_body().name, "EARTH");
    }

    #[test]
    fn orbit_about_rejects_wrong_parent() {
        let earth = earth();
        let moon = Arc::new(moon(&earth));
        assert!(earth.orbit_about(&moon).is_err());
        let other = Arc::new(Body::new("MARS", 6.417e23, 3.39e6, 5.77e8));
        assert!(moon.orbit_about(&other).is_err());
    }
}
