use logistics_core::vector::{self, Vector3};

/// Position and velocity of a point relative to its reference body at an absolute time.
///
/// Positions are metres, velocities m/s, time seconds on the simulation clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalState {
    pub position: Vector3,
    pub velocity: Vector3,
    pub time: f64,
}

impl OrbitalState {
    pub fn new(position: Vector3, velocity: Vector3, time: f64) -> Self {
        Self {
            position,
            velocity,
            time,
        }
    }

    /// Distance from the reference body's centre.
    pub fn radius(&self) -> f64 {
        vector::norm(&self.position)
    }

    pub fn speed(&self) -> f64 {
        vector::norm(&self.velocity)
    }

    /// `r·v`; positive while moving away from the reference body.
    pub fn radial_rate(&self) -> f64 {
        vector::dot(&self.position, &self.velocity)
    }

    /// Specific angular momentum `r × v`.
    pub fn angular_momentum(&self) -> Vector3 {
        vector::cross(&self.position, &self.velocity)
    }

    /// Specific orbital energy `v²/2 − μ/r`.
    pub fn specific_energy(&self, mu: f64) -> f64 {
        0.5 * vector::dot(&self.velocity, &self.velocity) - mu / self.radius()
    }

    /// This state expressed relative to `origin` (both must share a frame).
    pub fn relative_to(&self, origin: &OrbitalState) -> OrbitalState {
        OrbitalState {
            position: vector::sub(&self.position, &origin.position),
            velocity: vector::sub(&self.velocity, &origin.velocity),
            time: self.time,
        }
    }
}
