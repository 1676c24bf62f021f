//! Analytic estimators for impulsive transfers in the coplanar, circular limit.
//!
//! Provides the Hohmann transfer calculator returning delta-v components and time of
//! flight for two-body Keplerian motion about a central body of parameter `μ`. SI units.

use logistics_orbits::kepler::{circular_speed, vis_viva_speed};

use crate::error::TransferError;

/// Result for a Hohmann transfer between circular, coplanar orbits of radii r1 and r2.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HohmannResult {
    pub dv1_m_s: f64,      // signed: negative for inward (retro) burn
    pub dv2_m_s: f64,      // signed: negative for retro capture when arriving inward
    pub dv_total_m_s: f64, // |dv1| + |dv2|
    pub tof_seconds: f64,
    pub semi_major_axis_m: f64,
    pub eccentricity: f64,
}

/// Compute the classical Hohmann transfer between two circular coplanar orbits.
///
/// Inputs:
/// - `r1`: initial circular orbit radius (m)
/// - `r2`: target circular orbit radius (m)
/// - `mu`: gravitational parameter of central body (m^3/s^2)
pub fn hohmann(r1: f64, r2: f64, mu: f64) -> Result<HohmannResult, TransferError> {
    if !(r1 > 0.0 && r2 > 0.0 && mu > 0.0 && r1.is_finite() && r2.is_finite()) {
        return Err(TransferError::InvalidInput(format!(
            "Hohmann transfer needs positive radii and mu (r1={r1}, r2={r2}, mu={mu})"
        )));
    }

    let v1 = circular_speed(mu, r1);
    let v2 = circular_speed(mu, r2);
    let a_t = 0.5 * (r1 + r2);
    let tof = std::f64::consts::PI * (a_t.powi(3) / mu).sqrt();

    // Transfer speeds at r1 and r2 (periapsis and apoapsis for outward transfers)
    let v_t1 = vis_viva_speed(mu, r1, a_t);
    let v_t2 = vis_viva_speed(mu, r2, a_t);

    let dv1 = v_t1 - v1;
    let dv2 = v2 - v_t2;

    Ok(HohmannResult {
        dv1_m_s: dv1,
        dv2_m_s: dv2,
        dv_total_m_s: dv1.abs() + dv2.abs(),
        tof_seconds: tof,
        semi_major_axis_m: a_t,
        eccentricity: (r2 - r1).abs() / (r1 + r2),
    })
}
