//! Transfer orbits and launch timing built on top of the Hohmann analytics.

use std::f64::consts::PI;
use std::sync::Arc;

use log::debug;
use logistics_core::angle;
use logistics_orbits::{Body, KeplerOrbit, OrbitParameters};

use crate::error::TransferError;
use crate::transfers::{HohmannResult, hohmann};

/// A Hohmann transfer ready to be flown: the ellipse plus its burn budget.
#[derive(Debug, Clone)]
pub struct HohmannTransfer {
    /// Transfer ellipse spanning `[start_time, start_time + duration]`.
    pub orbit: KeplerOrbit,
    pub duration: f64,
    /// Departure burn (m/s, signed).
    pub dv1: f64,
    /// Arrival burn (m/s, signed).
    pub dv2: f64,
    pub analytics: HohmannResult,
}

/// Build the transfer ellipse from a circular orbit of radius `r1` to one of radius `r2`
/// about `body`, departing at `start_time` from the polar angle `departure_angle`.
///
/// Outward transfers start at periapsis. Inward transfers are rotated half a turn so the
/// departure point is the ellipse's apoapsis.
pub fn hohmann_transfer(
    body: &Arc<Body>,
    r1: f64,
    r2: f64,
    start_time: f64,
    departure_angle: f64,
) -> Result<HohmannTransfer, TransferError> {
    let mu = body.mu();
    let analytics = hohmann(r1, r2, mu)?;

    let (argument_of_periapsis, mean_anomaly) = if r1 > r2 {
        (departure_angle + PI, PI)
    } else {
        (departure_angle, 0.0)
    };
    let params = OrbitParameters::planar(
        mu,
        analytics.semi_major_axis_m,
        analytics.eccentricity,
        argument_of_periapsis,
        mean_anomaly,
    )?;
    let orbit = KeplerOrbit::new(
        Arc::clone(body),
        params,
        start_time,
        start_time,
        start_time + analytics.tof_seconds,
    )?;

    debug!(
        "Hohmann about {}: {r1:.0} m -> {r2:.0} m, tof {:.0} s, dv {:.1} m/s",
        body.name, analytics.tof_seconds, analytics.dv_total_m_s
    );

    Ok(HohmannTransfer {
        orbit,
        duration: analytics.tof_seconds,
        dv1: analytics.dv1_m_s,
        dv2: analytics.dv2_m_s,
        analytics,
    })
}

/// Earliest time at or after `current_time` to depart `origin` so that a transfer of
/// `transfer_duration` launched from polar angle 0 arrives at apogee (angle π) together
/// with `target`.
///
/// Assumes `target` moves prograde on a near-circular orbit about `origin`.
pub fn find_next_launch_window(
    origin: &Body,
    target: &Body,
    transfer_duration: f64,
    current_time: f64,
) -> Result<f64, TransferError> {
    if !origin.is_parent_of(target) {
        return Err(TransferError::NotSatellite {
            origin: origin.name.clone(),
            target: target.name.clone(),
        });
    }
    let params = target
        .orbit
        .ok_or_else(|| TransferError::MissingOrbit(target.name.clone()))?;
    if !(transfer_duration.is_finite() && transfer_duration >= 0.0) {
        return Err(TransferError::InvalidInput(format!(
            "transfer duration must be non-negative, got {transfer_duration}"
        )));
    }

    let n = params.mean_motion;
    let current = params.mean_anomaly_at_epoch + n * (current_time - target.orbit_epoch);
    let required = PI - n * transfer_duration - params.argument_of_periapsis;
    let wait = angle::normalize(required - current) / n;

    debug!(
        "launch window for {}: required M {:.4} rad, current M {:.4} rad, wait {wait:.0} s",
        target.name,
        angle::normalize(required),
        angle::normalize(current)
    );
    Ok(current_time + wait)
}
