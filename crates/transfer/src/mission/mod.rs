//! Mission planning: segments, flight plans, patched-conic synthesis and tracking.

pub mod builder;
pub mod flight_plan;
pub mod legs;
pub mod report;
pub mod segment;
pub mod tracker;

use logistics_impulsive::TransferError;
use logistics_orbits::OrbitError;

use self::flight_plan::PlanError;
use crate::catalog::CatalogError;

/// Top-level mission planning error.
#[derive(Debug, thiserror::Error)]
pub enum MissionError {
    #[error("{moon} does not orbit {planet}")]
    NotAMoon { planet: String, moon: String },
    #[error("no SOI encounter with {0}: spacecraft is receding at entry")]
    NoEncounter(String),
    #[error("unsupported leg: {0}")]
    UnsupportedLeg(String),
    #[error("invalid mission request: {0}")]
    InvalidRequest(String),
    #[error("orbit computation failed: {0}")]
    Orbit(#[from] OrbitError),
    #[error("transfer planning failed: {0}")]
    Transfer(#[from] TransferError),
    #[error("flight plan rejected: {0}")]
    Plan(#[from] PlanError),
    #[error("catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use logistics_core::constants::G;
    use logistics_orbits::{Body, KeplerOrbit, OrbitParameters};

    use super::segment::{ExitCondition, TrajectorySegment, TrajectoryType};

    pub fn earth() -> Arc<Body> {
        Arc::new(Body::new("EARTH", 5.972e24, 6.371e6, 9.24e8).with_atmosphere(true))
    }

    pub fn moon(earth: &Arc<Body>) -> Arc<Body> {
        let orbit = OrbitParameters::circular(earth.mu(), 3.844e8, 0.0).unwrap();
        Arc::new(Body::new("MOON", 7.342e22, 1.7374e6, 6.61e7).with_orbit("EARTH", orbit, 0.0))
    }

    pub fn circular_segment(
        body: &Arc<Body>,
        radius: f64,
        start: f64,
        end: f64,
    ) -> TrajectorySegment {
        let params = OrbitParameters::circular(G * body.mass, radius, 0.0).unwrap();
        let orbit = KeplerOrbit::new(Arc::clone(body), params, start, start, end).unwrap();
        TrajectorySegment::new(
            "Coast",
            Arc::new(orbit),
            start,
            end,
            TrajectoryType::OrbitPropagation,
            ExitCondition::TimeElapsed,
        )
    }
}
