//! Coarse per-leg budgets between mission nodes: ascent, landing, orbit changes and
//! planet-to-moon transfers, plus whole-itinerary totals.

use std::sync::Arc;

use log::{debug, info};
use logistics_impulsive::hohmann_transfer;
use logistics_orbits::{Body, KeplerOrbit, OrbitParameters};

use super::MissionError;
use super::builder::{MissionBuilder, PlannerSettings};
use super::segment::{ExitCondition, TrajectorySegment, TrajectoryType};
use crate::catalog::BodyCatalog;

const ASCENT_DURATION: f64 = 500.0;
const ASCENT_TWR: f64 = 1.2;
const ASCENT_GRAVITY_FACTOR: f64 = 1.15;
const ASCENT_ESCAPE_FRACTION: f64 = 0.5;
const ATMOSPHERIC_DRAG_LOSS: f64 = 100.0;

const LANDING_DURATION: f64 = 300.0;
const LANDING_TWR: f64 = 1.1;
const LANDING_ESCAPE_FRACTION: f64 = 0.3;

const ORBIT_CHANGE_TWR: f64 = 0.1;
const MOON_TRANSFER_TWR: f64 = 1.2;

/// Where the spacecraft is relative to a body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeKind {
    Surface,
    /// Circular orbit at `altitude` metres above the surface.
    Orbit { altitude: f64 },
}

#[derive(Debug, Clone)]
pub struct MissionNode {
    pub body: Arc<Body>,
    pub kind: NodeKind,
    /// Seconds spent at the node before the next leg departs.
    pub stay_duration: f64,
}

impl MissionNode {
    pub fn surface(body: Arc<Body>) -> Self {
        Self {
            body,
            kind: NodeKind::Surface,
            stay_duration: 0.0,
        }
    }

    pub fn orbit(body: Arc<Body>, altitude: f64) -> Self {
        Self {
            body,
            kind: NodeKind::Orbit { altitude },
            stay_duration: 0.0,
        }
    }

    pub fn with_stay(mut self, seconds: f64) -> Self {
        self.stay_duration = seconds;
        self
    }
}

/// Segments plus the requirements a vehicle must meet to fly them.
#[derive(Debug, Clone)]
pub struct MissionLeg {
    pub segments: Vec<TrajectorySegment>,
    /// Total delta-v in m/s.
    pub required_delta_v: f64,
    /// Minimum thrust-to-weight ratio.
    pub min_twr: f64,
    /// Seconds from departure until the destination node is reached.
    pub travel_time: f64,
}

/// Nodes visited in order and the legs between them; `legs[i]` joins `nodes[i]` to
/// `nodes[i + 1]`.
#[derive(Debug, Clone)]
pub struct MissionItinerary {
    pub nodes: Vec<MissionNode>,
    pub legs: Vec<MissionLeg>,
    pub start_time: f64,
}

impl MissionItinerary {
    /// Plan every leg in turn. Each leg departs once the previous node's stay is over.
    pub fn plan(
        nodes: Vec<MissionNode>,
        start_time: f64,
        catalog: &BodyCatalog,
        settings: &PlannerSettings,
    ) -> Result<Self, MissionError> {
        if nodes.is_empty() {
            return Err(MissionError::InvalidRequest("itinerary has no nodes".into()));
        }
        if let Some(node) = nodes
            .iter()
            .find(|n| !(n.stay_duration.is_finite() && n.stay_duration >= 0.0))
        {
            return Err(MissionError::InvalidRequest(format!(
                "stay at {} must be a non-negative duration, got {}",
                node.body.name, node.stay_duration
            )));
        }

        let mut time = start_time;
        let mut legs = Vec::with_capacity(nodes.len() - 1);
        for pair in nodes.windows(2) {
            time += pair[0].stay_duration;
            let leg = plan_leg(&pair[0], &pair[1], time, catalog, settings)?;
            time += leg.travel_time;
            legs.push(leg);
        }
        info!(
            "itinerary of {} nodes: {:.1} m/s over {:.0} s",
            nodes.len(),
            legs.iter().map(|l| l.required_delta_v).sum::<f64>(),
            time - start_time
        );
        Ok(Self {
            nodes,
            legs,
            start_time,
        })
    }

    /// Stays at every node plus travel on every leg.
    pub fn total_duration(&self) -> f64 {
        let stays: f64 = self.nodes.iter().map(|n| n.stay_duration).sum();
        let travel: f64 = self.legs.iter().map(|l| l.travel_time).sum();
        stays + travel
    }

    pub fn total_required_delta_v(&self) -> f64 {
        self.legs.iter().map(|l| l.required_delta_v).sum()
    }

    /// Highest thrust-to-weight ratio any leg demands.
    pub fn min_twr(&self) -> f64 {
        self.legs.iter().map(|l| l.min_twr).fold(0.0, f64::max)
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.total_duration()
    }
}

/// Plan a single leg departing at `departure_time`.
pub fn plan_leg(
    from: &MissionNode,
    to: &MissionNode,
    departure_time: f64,
    catalog: &BodyCatalog,
    settings: &PlannerSettings,
) -> Result<MissionLeg, MissionError> {
    if !departure_time.is_finite() {
        return Err(MissionError::InvalidRequest(format!(
            "departure time {departure_time} is not finite"
        )));
    }
    let origin = catalog.get(&from.body.name)?;
    let destination = catalog.get(&to.body.name)?;
    let same_body = origin.name == destination.name;

    let leg = match (from.kind, to.kind) {
        (NodeKind::Surface, NodeKind::Orbit { altitude }) if same_body => {
            ascent(&origin, altitude, departure_time)?
        }
        (NodeKind::Orbit { altitude }, NodeKind::Surface) if same_body => {
            landing(&origin, altitude, departure_time)?
        }
        (NodeKind::Orbit { altitude: low }, NodeKind::Orbit { altitude: high }) if same_body => {
            orbit_change(&origin, low, high, departure_time)?
        }
        (NodeKind::Surface, NodeKind::Surface) if same_body => {
            let up = ascent(&origin, settings.parking_altitude, departure_time)?;
            let down = landing(
                &origin,
                settings.parking_altitude,
                departure_time + up.travel_time,
            )?;
            MissionLeg {
                required_delta_v: up.required_delta_v + down.required_delta_v,
                min_twr: up.min_twr.max(down.min_twr),
                travel_time: up.travel_time + down.travel_time,
                segments: up.segments.into_iter().chain(down.segments).collect(),
            }
        }
        (NodeKind::Orbit { altitude: parking }, NodeKind::Orbit { altitude: capture })
            if catalog
                .parent_of(&destination)?
                .is_some_and(|parent| parent.name == origin.name) =>
        {
            let builder = MissionBuilder::new(PlannerSettings {
                parking_altitude: parking,
                capture_altitude: capture,
                ..*settings
            });
            let mission = builder.plan_planet_to_moon(&origin, &destination, departure_time)?;
            MissionLeg {
                required_delta_v: mission.total_delta_v(),
                min_twr: MOON_TRANSFER_TWR,
                travel_time: mission.periapsis_time - departure_time,
                segments: mission.plan.segments().to_vec(),
            }
        }
        _ => {
            return Err(MissionError::UnsupportedLeg(format!(
                "{} {:?} -> {} {:?}",
                origin.name, from.kind, destination.name, to.kind
            )));
        }
    };

    debug!(
        "leg {} -> {}: dv {:.1} m/s, twr {:.2}, {:.0} s",
        origin.name, destination.name, leg.required_delta_v, leg.min_twr, leg.travel_time
    );
    Ok(leg)
}

fn ascent(body: &Arc<Body>, altitude: f64, start: f64) -> Result<MissionLeg, MissionError> {
    let mut delta_v = ASCENT_GRAVITY_FACTOR * body.circular_speed_at_altitude(altitude)
        + ASCENT_ESCAPE_FRACTION * body.escape_speed(body.radius);
    if body.has_atmosphere {
        delta_v += ATMOSPHERIC_DRAG_LOSS;
    }
    let end = start + ASCENT_DURATION;
    let segment = TrajectorySegment::new(
        "Ascent",
        circular_orbit(body, altitude, start, end)?,
        start,
        end,
        TrajectoryType::Launch,
        ExitCondition::ReachAltitude,
    )
    .with_target_altitude(altitude);
    Ok(MissionLeg {
        segments: vec![segment],
        required_delta_v: delta_v,
        min_twr: ASCENT_TWR,
        travel_time: ASCENT_DURATION,
    })
}

fn landing(body: &Arc<Body>, altitude: f64, start: f64) -> Result<MissionLeg, MissionError> {
    let delta_v = body.circular_speed_at_altitude(altitude)
        + LANDING_ESCAPE_FRACTION * body.escape_speed(body.radius);
    let end = start + LANDING_DURATION;
    let segment = TrajectorySegment::new(
        "Landing",
        circular_orbit(body, altitude, start, end)?,
        start,
        end,
        TrajectoryType::Landing,
        ExitCondition::ReachAltitude,
    )
    .with_target_altitude(0.0);
    Ok(MissionLeg {
        segments: vec![segment],
        required_delta_v: delta_v,
        min_twr: LANDING_TWR,
        travel_time: LANDING_DURATION,
    })
}

fn orbit_change(
    body: &Arc<Body>,
    from_altitude: f64,
    to_altitude: f64,
    start: f64,
) -> Result<MissionLeg, MissionError> {
    let transfer = hohmann_transfer(
        body,
        body.radius + from_altitude,
        body.radius + to_altitude,
        start,
        0.0,
    )?;
    let end = start + transfer.duration;
    let exit = if to_altitude >= from_altitude {
        ExitCondition::ApoapsisReached
    } else {
        ExitCondition::PeriapsisReached
    };
    let segment = TrajectorySegment::new(
        "Orbit change",
        Arc::new(transfer.orbit),
        start,
        end,
        TrajectoryType::HohmannTransfer,
        exit,
    )
    .with_target_altitude(to_altitude);
    Ok(MissionLeg {
        segments: vec![segment],
        required_delta_v: transfer.dv1.abs() + transfer.dv2.abs(),
        min_twr: ORBIT_CHANGE_TWR,
        travel_time: transfer.duration,
    })
}

fn circular_orbit(
    body: &Arc<Body>,
    altitude: f64,
    start: f64,
    end: f64,
) -> Result<Arc<KeplerOrbit>, MissionError> {
    let params = OrbitParameters::circular(body.mu(), body.radius + altitude, 0.0)?;
    Ok(Arc::new(KeplerOrbit::new(
        Arc::clone(body),
        params,
        start,
        start,
        end,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::test_support::{earth, moon};
    use approx::assert_relative_eq;

    fn catalog() -> (BodyCatalog, Arc<Body>, Arc<Body>) {
        let earth = earth();
        let moon = moon(&earth);
        let mut catalog = BodyCatalog::default();
        let earth = catalog.insert((*earth).clone());
        let moon = catalog.insert((*moon).clone());
        (catalog, earth, moon)
    }

    #[test]
    fn ascent_includes_gravity_and_drag_losses() {
        let (catalog, earth, _) = catalog();
        let leg = plan_leg(
            &MissionNode::surface(Arc::clone(&earth)),
            &MissionNode::orbit(Arc::clone(&earth), 200_000.0),
            0.0,
            &catalog,
            &PlannerSettings::default(),
        )
        .unwrap();
        let expected = 1.15 * earth.circular_speed_at_altitude(200_000.0)
            + 0.5 * earth.escape_speed(earth.radius)
            + 100.0;
        assert_relative_eq!(leg.required_delta_v, expected);
        assert_eq!(leg.min_twr, 1.2);
        assert_eq!(leg.travel_time, 500.0);
        assert_eq!(leg.segments[0].kind, TrajectoryType::Launch);
        assert_eq!(leg.segments[0].target_altitude, Some(200_000.0));
    }

    #[test]
    fn airless_landing_skips_drag() {
        let (catalog, _, moon) = catalog();
        let leg = plan_leg(
            &MissionNode::orbit(Arc::clone(&moon), 100_000.0),
            &MissionNode::surface(Arc::clone(&moon)),
            50.0,
            &catalog,
            &PlannerSettings::default(),
        )
        .unwrap();
        let expected =
            moon.circular_speed_at_altitude(100_000.0) + 0.3 * moon.escape_speed(moon.radius);
        assert_relative_eq!(leg.required_delta_v, expected);
        assert_eq!(leg.min_twr, 1.1);
        assert_eq!(leg.segments[0].end_time, 350.0);
    }

    #[test]
    fn surface_hop_chains_ascent_and_landing() {
        let (catalog, _, moon) = catalog();
        let leg = plan_leg(
            &MissionNode::surface(Arc::clone(&moon)),
            &MissionNode::surface(Arc::clone(&moon)),
            0.0,
            &catalog,
            &PlannerSettings::default(),
        )
        .unwrap();
        assert_eq!(leg.segments.len(), 2);
        assert_eq!(leg.segments[0].end_time, leg.segments[1].start_time);
        assert_eq!(leg.travel_time, 800.0);
        assert_eq!(leg.min_twr, 1.2);
    }

    #[test]
    fn orbit_raise_uses_both_hohmann_burns() {
        let (catalog, earth, _) = catalog();
        let leg = plan_leg(
            &MissionNode::orbit(Arc::clone(&earth), 200_000.0),
            &MissionNode::orbit(Arc::clone(&earth), 35_786_000.0),
            0.0,
            &catalog,
            &PlannerSettings::default(),
        )
        .unwrap();
        assert!(leg.required_delta_v > 3_800.0 && leg.required_delta_v < 4_000.0);
        assert_eq!(leg.min_twr, 0.1);
        assert_eq!(leg.segments[0].exit_condition, ExitCondition::ApoapsisReached);
    }

    #[test]
    fn planet_to_moon_leg_sums_injection_and_capture() {
        let (catalog, earth, moon) = catalog();
        let leg = plan_leg(
            &MissionNode::orbit(Arc::clone(&earth), 200_000.0),
            &MissionNode::orbit(Arc::clone(&moon), 500_000.0),
            0.0,
            &catalog,
            &PlannerSettings::default(),
        )
        .unwrap();
        assert_eq!(leg.segments.len(), 4);
        assert!(leg.required_delta_v > 3_500.0);
        let days = leg.travel_time / 86_400.0;
        assert!(days > 3.0 && days < 6.0, "travel {days} days");
    }

    #[test]
    fn itinerary_totals_sum_stays_travel_and_burns() {
        let (catalog, earth, moon) = catalog();
        let nodes = vec![
            MissionNode::surface(Arc::clone(&earth)).with_stay(100.0),
            MissionNode::orbit(Arc::clone(&earth), 200_000.0).with_stay(3_600.0),
            MissionNode::orbit(Arc::clone(&moon), 500_000.0).with_stay(7_200.0),
            MissionNode::surface(Arc::clone(&moon)).with_stay(86_400.0),
        ];
        let itinerary =
            MissionItinerary::plan(nodes, 1_000.0, &catalog, &PlannerSettings::default()).unwrap();

        assert_eq!(itinerary.legs.len(), 3);
        assert_eq!(itinerary.legs[0].segments[0].start_time, 1_100.0);
        assert_eq!(itinerary.legs[1].segments[0].start_time, 1_100.0 + 500.0 + 3_600.0);
        let travel: f64 = itinerary.legs.iter().map(|l| l.travel_time).sum();
        assert_relative_eq!(
            itinerary.total_duration(),
            100.0 + 3_600.0 + 7_200.0 + 86_400.0 + travel
        );
        let burns: f64 = itinerary.legs.iter().map(|l| l.required_delta_v).sum();
        assert_relative_eq!(itinerary.total_required_delta_v(), burns);
        assert_eq!(itinerary.min_twr(), 1.2);
        assert_relative_eq!(itinerary.end_time(), 1_000.0 + itinerary.total_duration());
    }

    #[test]
    fn itinerary_needs_nodes_and_sane_stays() {
        let (catalog, earth, _) = catalog();
        let settings = PlannerSettings::default();
        assert!(matches!(
            MissionItinerary::plan(Vec::new(), 0.0, &catalog, &settings),
            Err(MissionError::InvalidRequest(_))
        ));
        let lone = MissionItinerary::plan(
            vec![MissionNode::surface(Arc::clone(&earth)).with_stay(60.0)],
            0.0,
            &catalog,
            &settings,
        )
        .unwrap();
        assert!(lone.legs.is_empty());
        assert_eq!(lone.total_duration(), 60.0);
        assert_eq!(lone.total_required_delta_v(), 0.0);

        let negative = vec![
            MissionNode::surface(Arc::clone(&earth)).with_stay(-1.0),
            MissionNode::orbit(earth, 200_000.0),
        ];
        assert!(matches!(
            MissionItinerary::plan(negative, 0.0, &catalog, &settings),
            Err(MissionError::InvalidRequest(_))
        ));
    }

    #[test]
    fn unrelated_pairs_are_unsupported() {
        let (catalog, earth, moon) = catalog();
        let result = plan_leg(
            &MissionNode::surface(Arc::clone(&earth)),
            &MissionNode::surface(Arc::clone(&moon)),
            0.0,
            &catalog,
            &PlannerSettings::default(),
        );
        assert!(matches!(result, Err(MissionError::UnsupportedLeg(_))));

        let reversed = plan_leg(
            &MissionNode::orbit(moon, 100_000.0),
            &MissionNode::orbit(earth, 200_000.0),
            0.0,
            &catalog,
            &PlannerSettings::default(),
        );
        assert!(matches!(reversed, Err(MissionError::UnsupportedLeg(_))));
    }
}
