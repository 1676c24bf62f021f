use logistics_orbits::OrbitError;
use thiserror::Error;

/// Errors raised while building transfers or searching for launch windows.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("invalid transfer input: {0}")]
    InvalidInput(String),
    #[error("{target} does not orbit {origin}")]
    NotSatellite { origin: String, target: String },
    #[error("{0} has no orbital elements")]
    MissingOrbit(String),
    #[error(transparent)]
    Orbit(#[from] OrbitError),
}
