//! Two-body propagation and patched-conic helpers.
//!
//! The math kernel lives in [`kepler`] and [`patched`]; [`KeplerOrbit`] binds elements to
//! a reference body and implements [`Trajectory`], the query surface used by flight plans.

pub mod body;
pub mod elements;
pub mod error;
pub mod kepler;
pub mod kepler_orbit;
pub mod patched;
pub mod state;
pub mod trajectory;

pub use body::Body;
pub use elements::OrbitParameters;
pub use error::OrbitError;
pub use kepler_orbit::KeplerOrbit;
pub use patched::{
    ApogeeSearch, ApogeeSolution, CaptureSense, HyperbolicApproach, MoonTransferGeometry,
    capture_delta_v, escape_delta_v,
};
pub use state::OrbitalState;
pub use trajectory::Trajectory;
