//! Re-exported APIs for consumers of the transfer crate.

pub use crate::catalog::{BodyCatalog, CatalogError};
pub use crate::mission::MissionError;
pub use crate::mission::builder::{MissionBuilder, MoonMission, PlannerSettings};
pub use crate::mission::flight_plan::{FlightPlan, PlanError, PlanPosition};
pub use crate::mission::legs::{MissionItinerary, MissionLeg, MissionNode, NodeKind, plan_leg};
pub use crate::mission::report::{ephemeris_rows, plan_summary};
pub use crate::mission::segment::{ExitCondition, TrajectorySegment, TrajectoryType};
pub use crate::mission::tracker::{MissionPhase, MissionTracker, TrackerUpdate};
