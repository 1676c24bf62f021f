//! Orbital logistics engine: Keplerian propagation, Hohmann transfers and patched-conic
//! planet-to-moon flight plans.
//!
//! Each concern lives in its own workspace crate; this library re-exports them so
//! front-ends (the CLI, a host simulation) depend on a single crate.

pub use logistics_config as config;
pub use logistics_core::{angle, constants, time, units, vector};
pub use logistics_export as export;
pub use logistics_impulsive as impulsive;
pub use logistics_orbits as orbits;
pub use logistics_transfer as transfer;

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
