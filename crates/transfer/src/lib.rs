//! Mission planning façade: flight plans, patched-conic synthesis, tracking and the body
//! catalog, plus the supporting orbit and transfer crates.

pub mod catalog;
pub mod mission;

pub use facade::*;
pub use logistics_impulsive as impulsive;
pub use logistics_orbits as orbits;

mod facade;
