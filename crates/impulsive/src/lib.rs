//! Impulsive transfer utilities: Hohmann analytics, transfer orbits and launch windows.

pub mod calculator;
pub mod error;
pub mod transfers;

pub use calculator::{HohmannTransfer, find_next_launch_window, hohmann_transfer};
pub use error::TransferError;
pub use transfers::{HohmannResult, hohmann};
