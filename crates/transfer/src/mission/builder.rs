//! Patched-conic synthesis of planet-to-moon flight plans.
//!
//! The plan is four segments: a parking-orbit coast, the transfer ellipse up to SOI entry,
//! the moon-centred approach hyperbola down to periapsis, and a circular capture orbit.

use std::f64::consts::PI;
use std::sync::Arc;

use log::{debug, info, warn};
use logistics_config::{CaptureSenseSetting, PlannerConfig};
use logistics_core::{angle, constants::SECONDS_PER_WEEK, units, vector};
use logistics_impulsive::hohmann_transfer;
use logistics_orbits::patched::{find_apogee_radius, phase_angle};
use logistics_orbits::{
    ApogeeSearch, ApogeeSolution, Body, CaptureSense, HyperbolicApproach, KeplerOrbit,
    MoonTransferGeometry, OrbitError, OrbitParameters, OrbitalState, Trajectory,
    capture_delta_v,
};

use super::MissionError;
use super::flight_plan::FlightPlan;
use super::segment::{ExitCondition, TrajectorySegment, TrajectoryType};

/// Largest moon-orbit inclination (rad) still treated as equatorial.
const PLANAR_TOLERANCE: f64 = 1e-9;
/// SOI entry epochs closer than this (s) end the phasing iteration.
const ENTRY_TIME_TOLERANCE: f64 = 1.0;
const MAX_PHASING_PASSES: usize = 20;

/// Planner tuning in SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerSettings {
    pub parking_altitude: f64,
    pub capture_altitude: f64,
    pub parking_wait: f64,
    pub capture_duration: f64,
    pub search: ApogeeSearch,
    pub capture_sense: CaptureSense,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            parking_altitude: 200_000.0,
            capture_altitude: 500_000.0,
            parking_wait: 600.0,
            capture_duration: SECONDS_PER_WEEK,
            search: ApogeeSearch::default(),
            capture_sense: CaptureSense::Prograde,
        }
    }
}

impl From<&PlannerConfig> for PlannerSettings {
    fn from(config: &PlannerConfig) -> Self {
        Self {
            parking_altitude: units::km_to_m(config.parking_altitude_km),
            capture_altitude: units::km_to_m(config.capture_altitude_km),
            parking_wait: config.parking_wait_s,
            capture_duration: config.capture_duration_s,
            search: ApogeeSearch {
                max_iterations: config.apogee_search_iterations,
                tolerance: config.apogee_search_tolerance_m,
            },
            capture_sense: match config.capture_sense {
                CaptureSenseSetting::Prograde => CaptureSense::Prograde,
                CaptureSenseSetting::Retrograde => CaptureSense::Retrograde,
            },
        }
    }
}

/// A synthesised planet-to-moon mission: the plan plus the numbers that shaped it.
#[derive(Debug, Clone)]
pub struct MoonMission {
    pub plan: FlightPlan,
    pub origin: Arc<Body>,
    pub destination: Arc<Body>,
    pub request_time: f64,
    pub launch_time: f64,
    pub soi_entry_time: f64,
    pub periapsis_time: f64,
    pub transfer_apogee: f64,
    /// `None` when the search failed and the moon's distance at entry was used instead.
    pub apogee_search: Option<ApogeeSolution>,
    /// Angle by which the spacecraft leads the moon at SOI entry, seen from the planet.
    pub phase_angle: f64,
    pub approach: HyperbolicApproach,
    pub injection_delta_v: f64,
    pub capture_delta_v: f64,
}

impl MoonMission {
    pub fn total_delta_v(&self) -> f64 {
        self.injection_delta_v.abs() + self.capture_delta_v.abs()
    }
}

/// Builds flight plans under the patched-conic apogee-rendezvous model.
#[derive(Debug, Clone, Default)]
pub struct MissionBuilder {
    settings: PlannerSettings,
}

impl MissionBuilder {
    pub fn new(settings: PlannerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PlannerSettings {
        &self.settings
    }

    /// Flight plan from a parking orbit about `planet` to a circular orbit about `moon`,
    /// requested at `request_time`.
    pub fn create_planet_to_moon_plan(
        &self,
        planet: &Arc<Body>,
        moon: &Arc<Body>,
        request_time: f64,
    ) -> Result<FlightPlan, MissionError> {
        Ok(self.plan_planet_to_moon(planet, moon, request_time)?.plan)
    }

    /// Same as [`create_planet_to_moon_plan`](Self::create_planet_to_moon_plan) but keeps
    /// the burn budget and key epochs.
    pub fn plan_planet_to_moon(
        &self,
        planet: &Arc<Body>,
        moon: &Arc<Body>,
        request_time: f64,
    ) -> Result<MoonMission, MissionError> {
        if !planet.is_parent_of(moon) {
            return Err(MissionError::NotAMoon {
                planet: planet.name.clone(),
                moon: moon.name.clone(),
            });
        }
        if !request_time.is_finite() {
            return Err(MissionError::InvalidRequest(format!(
                "request time {request_time} is not finite"
            )));
        }
        let settings = &self.settings;
        let moon_orbit = moon.orbit_about(planet)?;
        let inclination = moon_orbit.parameters().inclination;
        if inclination.abs() > PLANAR_TOLERANCE {
            return Err(MissionError::InvalidRequest(format!(
                "{} is inclined {:.3} deg to the equator of {}; only prograde equatorial moons are supported",
                moon.name,
                inclination.to_degrees(),
                planet.name
            )));
        }
        let mu_planet = planet.mu();
        let mu_moon = moon.mu();

        let parking_radius = planet.radius + settings.parking_altitude;
        let capture_radius = moon.radius + settings.capture_altitude;
        if capture_radius >= moon.soi_radius {
            return Err(MissionError::InvalidRequest(format!(
                "capture radius {capture_radius:.0} m does not fit inside the {:.0} m SOI of {}",
                moon.soi_radius, moon.name
            )));
        }

        // The moon's distance at SOI entry depends on the apogee, which depends on that
        // distance; iterate until the entry epoch settles.
        let launch_time = request_time + settings.parking_wait;
        let mut entry_estimate = launch_time
            + half_transfer_period(parking_radius, moon_orbit.parameters().semi_major_axis, mu_planet);
        let mut pass = 0;
        let (transfer_apogee, apogee_search, soi_entry_time) = loop {
            pass += 1;
            let moon_state = moon_orbit.evaluate(entry_estimate)?;
            let geometry = entry_geometry(&moon_state, parking_radius, moon, mu_planet);
            let (apogee, search) = self.search_apogee(moon, capture_radius, &geometry);
            let entry = launch_time + half_transfer_period(parking_radius, apogee, mu_planet);
            let shift = (entry - entry_estimate).abs();
            if shift < ENTRY_TIME_TOLERANCE {
                debug!("SOI entry epoch settled after {pass} passes");
                break (apogee, search, entry);
            }
            if pass >= MAX_PHASING_PASSES {
                warn!(
                    "SOI entry epoch for {} still moving by {shift:.1} s after {pass} passes",
                    moon.name
                );
                break (apogee, search, entry);
            }
            entry_estimate = entry;
        };

        // Phase the transfer against the moon's actual position at SOI entry.
        let moon_at_entry = moon_orbit.evaluate(soi_entry_time)?;
        let moon_angle = vector::angle_xy(&moon_at_entry.position);
        let phase_angle = phase_angle(transfer_apogee, moon_at_entry.radius(), moon.soi_radius)?;
        let apogee_angle = moon_angle + phase_angle;
        let departure_angle = angle::normalize(apogee_angle + PI);

        let transfer = hohmann_transfer(
            planet,
            parking_radius,
            transfer_apogee,
            launch_time,
            departure_angle,
        )?;
        let ship_at_entry = transfer.orbit.evaluate(soi_entry_time)?;

        let relative = ship_at_entry.relative_to(&moon_at_entry);
        if relative.radial_rate() >= 0.0 {
            return Err(MissionError::NoEncounter(moon.name.clone()));
        }

        let approach = HyperbolicApproach::from_relative_state(&relative, mu_moon)?;
        if approach.sense != settings.capture_sense {
            warn!(
                "requested {:?} capture at {} but the approach geometry is {:?}",
                settings.capture_sense, moon.name, approach.sense
            );
        }
        check_clearance(&approach, moon)?;
        let periapsis_time = soi_entry_time + approach.time_to_periapsis;
        debug!(
            "approach about {}: e={:.4}, r_p={:.0} m, v_inf={:.1} m/s, {:?}",
            moon.name,
            approach.eccentricity,
            approach.periapsis_radius,
            approach.v_infinity,
            approach.sense
        );

        let parking = OrbitParameters::circular(mu_planet, parking_radius, departure_angle)?;
        let parking_orbit = KeplerOrbit::new(
            Arc::clone(planet),
            parking,
            launch_time,
            request_time,
            launch_time,
        )?;

        let hyperbola = KeplerOrbit::new(
            Arc::clone(moon),
            approach.parameters(mu_moon)?,
            periapsis_time,
            soi_entry_time,
            periapsis_time,
        )?;

        let capture_end = periapsis_time + settings.capture_duration;
        let capture_params =
            OrbitParameters::circular(mu_moon, approach.periapsis_radius, approach.periapsis_angle)?;
        let capture_params = match approach.sense {
            CaptureSense::Prograde => capture_params,
            CaptureSense::Retrograde => capture_params.retrograde_planar(approach.periapsis_angle),
        };
        let capture_orbit = KeplerOrbit::new(
            Arc::clone(moon),
            capture_params,
            periapsis_time,
            periapsis_time,
            capture_end,
        )?;

        let mut plan = FlightPlan::new();
        plan.add_segment(TrajectorySegment::new(
            "Parking",
            Arc::new(parking_orbit),
            request_time,
            launch_time,
            TrajectoryType::OrbitPropagation,
            ExitCondition::TimeElapsed,
        ));
        plan.add_segment(
            TrajectorySegment::new(
                "Transfer",
                Arc::new(transfer.orbit),
                launch_time,
                soi_entry_time,
                TrajectoryType::HohmannTransfer,
                ExitCondition::EnterTargetSoi,
            )
            .with_next_body(Arc::clone(moon)),
        );
        plan.add_segment(TrajectorySegment::new(
            "Approach",
            Arc::new(hyperbola),
            soi_entry_time,
            periapsis_time,
            TrajectoryType::OrbitPropagation,
            ExitCondition::PeriapsisReached,
        ));
        plan.add_segment(
            TrajectorySegment::new(
                "Capture",
                Arc::new(capture_orbit),
                periapsis_time,
                capture_end,
                TrajectoryType::Circularize,
                ExitCondition::TimeElapsed,
            )
            .with_target_altitude(approach.periapsis_radius - moon.radius),
        );
        plan.validate()?;

        let capture_burn = capture_delta_v(mu_moon, approach.periapsis_radius, approach.v_infinity);
        info!(
            "{} -> {} plan: launch t={launch_time:.0} s, SOI entry t={soi_entry_time:.0} s, periapsis t={periapsis_time:.0} s, dv {:.1} + {:.1} m/s",
            planet.name, moon.name, transfer.dv1, capture_burn
        );

        Ok(MoonMission {
            plan,
            origin: Arc::clone(planet),
            destination: Arc::clone(moon),
            request_time,
            launch_time,
            soi_entry_time,
            periapsis_time,
            transfer_apogee,
            apogee_search,
            phase_angle,
            approach,
            injection_delta_v: transfer.dv1,
            capture_delta_v: capture_burn,
        })
    }

    /// Apogee search against one entry geometry. A failed search falls back to the
    /// moon's distance at entry.
    fn search_apogee(
        &self,
        moon: &Body,
        capture_radius: f64,
        geometry: &MoonTransferGeometry,
    ) -> (f64, Option<ApogeeSolution>) {
        match find_apogee_radius(
            capture_radius,
            geometry,
            self.settings.capture_sense,
            self.settings.search,
        ) {
            Ok(solution) => (solution.radius, Some(solution)),
            Err(err) => {
                warn!(
                    "apogee search for {} failed ({err}); using entry distance {:.0} m",
                    moon.name, geometry.target_distance
                );
                (geometry.target_distance, None)
            }
        }
    }
}

/// Transfer geometry with the moon where it actually is at `moon_state.time`.
fn entry_geometry(
    moon_state: &OrbitalState,
    parking_radius: f64,
    moon: &Body,
    mu_planet: f64,
) -> MoonTransferGeometry {
    let distance = moon_state.radius();
    let radial = moon_state.radial_rate() / distance;
    let transverse = vector::cross_z(&moon_state.position, &moon_state.velocity) / distance;
    MoonTransferGeometry {
        parking_radius,
        target_distance: distance,
        target_soi: moon.soi_radius,
        mu_primary: mu_planet,
        mu_target: moon.mu(),
        target_velocity: Some([radial, transverse]),
    }
}

fn half_transfer_period(parking_radius: f64, apogee_radius: f64, mu: f64) -> f64 {
    let semi_major = 0.5 * (parking_radius + apogee_radius);
    PI * (semi_major.powi(3) / mu).sqrt()
}

fn check_clearance(approach: &HyperbolicApproach, moon: &Body) -> Result<(), OrbitError> {
    if approach.periapsis_radius <= moon.radius {
        return Err(OrbitError::GeometryUnreachable(format!(
            "approach periapsis {:.0} m lies inside {} (radius {:.0} m)",
            approach.periapsis_radius, moon.name, moon.radius
        )));
    }
    Ok(())
}
