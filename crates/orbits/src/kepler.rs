//! Kepler's equation in its elliptic and hyperbolic forms, anomaly conversions, and
//! the closed-form time-of-flight helpers built on them.
//!
//! All angles are radians. Solvers use Newton–Raphson with a fixed iteration cap so the
//! worst-case cost of a single call is bounded.

use std::f64::consts::PI;

use logistics_core::angle;

use crate::error::OrbitError;

/// Iteration cap for the elliptic Kepler solver.
pub const KEPLER_MAX_ITERATIONS: usize = 100;
/// Convergence threshold on the Newton step for the elliptic solver (radians).
pub const KEPLER_TOLERANCE: f64 = 1e-6;
/// Iteration cap for the hyperbolic Kepler solver.
pub const HYPERBOLIC_MAX_ITERATIONS: usize = 100;
/// Convergence threshold on the Newton step for the hyperbolic solver.
pub const HYPERBOLIC_TOLERANCE: f64 = 1e-10;

/// Mean motion `sqrt(μ / |a|³)` in rad/s.
#[inline]
pub fn mean_motion(mu: f64, semi_major_axis: f64) -> f64 {
    (mu / semi_major_axis.abs().powi(3)).sqrt()
}

/// Speed on a conic of semi-major axis `a` at radius `r`, `sqrt(μ·(2/r − 1/a))`.
///
/// Pass a negative `a` for hyperbolae.
#[inline]
pub fn vis_viva_speed(mu: f64, radius: f64, semi_major_axis: f64) -> f64 {
    (mu * (2.0 / radius - 1.0 / semi_major_axis)).max(0.0).sqrt()
}

/// Circular orbital speed `sqrt(μ/r)`.
#[inline]
pub fn circular_speed(mu: f64, radius: f64) -> f64 {
    (mu / radius).sqrt()
}

/// Solve `M = E − e·sin(E)` for the eccentric anomaly `E`.
///
/// `M` is normalised into `[0, 2π)` first. The initial guess is `M`, or `π` when
/// `e > 0.8` where starting from `M` converges poorly.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> Result<f64, OrbitError> {
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(OrbitError::domain(format!(
            "elliptic Kepler equation requires 0 <= e < 1, got {eccentricity}"
        )));
    }
    if !mean_anomaly.is_finite() {
        return Err(OrbitError::domain("mean anomaly is not finite"));
    }

    let m = angle::normalize(mean_anomaly);
    let mut e_anom = if eccentricity > 0.8 { PI } else { m };
    let mut last_step = f64::INFINITY;

    for _ in 0..KEPLER_MAX_ITERATIONS {
        let f = e_anom - eccentricity * e_anom.sin() - m;
        let df = 1.0 - eccentricity * e_anom.cos();
        let next = e_anom - f / df;
        last_step = (next - e_anom).abs();
        e_anom = next;
        if last_step < KEPLER_TOLERANCE {
            return Ok(e_anom);
        }
    }

    log::debug!("elliptic Kepler solver stalled: M={m}, e={eccentricity}, E={e_anom}");
    Err(OrbitError::Convergence {
        solver: "elliptic Kepler solver",
        iterations: KEPLER_MAX_ITERATIONS,
        last_step,
    })
}

/// Eccentric anomaly to true anomaly, `tan(ν/2) = sqrt((1+e)/(1−e))·tan(E/2)`.
///
/// Evaluated in half-angle `atan2` form so `E = π` needs no special case.
pub fn eccentric_to_true_anomaly(
    eccentric_anomaly: f64,
    eccentricity: f64,
) -> Result<f64, OrbitError> {
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(OrbitError::domain(format!(
            "eccentric anomaly is only defined for 0 <= e < 1, got {eccentricity}"
        )));
    }
    let half = 0.5 * eccentric_anomaly;
    Ok(2.0
        * ((1.0 + eccentricity).sqrt() * half.sin()).atan2((1.0 - eccentricity).sqrt() * half.cos()))
}

/// True anomaly to eccentric anomaly; inverse of [`eccentric_to_true_anomaly`].
pub fn true_to_eccentric_anomaly(true_anomaly: f64, eccentricity: f64) -> Result<f64, OrbitError> {
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(OrbitError::domain(format!(
            "eccentric anomaly is only defined for 0 <= e < 1, got {eccentricity}"
        )));
    }
    let half = 0.5 * true_anomaly;
    Ok(2.0
        * ((1.0 - eccentricity).sqrt() * half.sin()).atan2((1.0 + eccentricity).sqrt() * half.cos()))
}

/// Solve the hyperbolic Kepler equation `M = e·sinh(H) − H` for `H`.
///
/// `M` is not wrapped: hyperbolic motion is not periodic and the sign of `M` selects the
/// inbound (negative) or outbound (positive) branch.
pub fn solve_kepler_hyperbolic(mean_anomaly: f64, eccentricity: f64) -> Result<f64, OrbitError> {
    if eccentricity <= 1.0 || !eccentricity.is_finite() {
        return Err(OrbitError::domain(format!(
            "hyperbolic Kepler equation requires e > 1, got {eccentricity}"
        )));
    }
    if !mean_anomaly.is_finite() {
        return Err(OrbitError::domain("mean anomaly is not finite"));
    }

    let m = mean_anomaly;
    let mut h = if eccentricity > 1.6 {
        if m < 0.0 { m - eccentricity } else { m + eccentricity }
    } else if m.abs() < 0.1 {
        m / (eccentricity - 1.0)
    } else if m > 0.0 {
        (2.0 * m / eccentricity + 1.8).ln()
    } else {
        -(2.0 * m.abs() / eccentricity + 1.8).ln()
    };

    let mut last_step = f64::INFINITY;
    for _ in 0..HYPERBOLIC_MAX_ITERATIONS {
        let f = eccentricity * h.sinh() - h - m;
        let df = eccentricity * h.cosh() - 1.0;
        let next = h - f / df;
        last_step = (next - h).abs();
        h = next;
        if last_step < HYPERBOLIC_TOLERANCE {
            return Ok(h);
        }
    }

    log::debug!("hyperbolic Kepler solver stalled: M={m}, e={eccentricity}, H={h}");
    Err(OrbitError::Convergence {
        solver: "hyperbolic Kepler solver",
        iterations: HYPERBOLIC_MAX_ITERATIONS,
        last_step,
    })
}

/// Hyperbolic anomaly to true anomaly, `tan(ν/2) = sqrt((e+1)/(e−1))·tanh(H/2)`.
pub fn hyperbolic_to_true_anomaly(
    hyperbolic_anomaly: f64,
    eccentricity: f64,
) -> Result<f64, OrbitError> {
    if eccentricity <= 1.0 {
        return Err(OrbitError::domain(format!(
            "hyperbolic anomaly is only defined for e > 1, got {eccentricity}"
        )));
    }
    let ratio = ((eccentricity + 1.0) / (eccentricity - 1.0)).sqrt();
    Ok(2.0 * (ratio * (0.5 * hyperbolic_anomaly).tanh()).atan())
}

/// Time between periapsis and the point where a hyperbola crosses `r_boundary`.
///
/// Inverts `r = |a|(e·cosh H − 1)` (with `cosh H` clamped to at least 1), converts `H`
/// to mean anomaly and divides by the mean motion. The result is non-negative and, by
/// symmetry, equals the time from boundary entry down to periapsis.
pub fn hyperbolic_time_to_periapsis(
    semi_major_axis: f64,
    eccentricity: f64,
    mu: f64,
    r_boundary: f64,
) -> Result<f64, OrbitError> {
    if mu <= 0.0 {
        return Err(OrbitError::domain(format!("gravitational parameter must be positive, got {mu}")));
    }
    if eccentricity <= 1.0 {
        return Err(OrbitError::domain(format!("hyperbola requires e > 1, got {eccentricity}")));
    }
    if semi_major_axis == 0.0 || !semi_major_axis.is_finite() {
        return Err(OrbitError::domain("semi-major axis must be finite and non-zero"));
    }
    if r_boundary <= 0.0 {
        return Err(OrbitError::domain(format!("boundary radius must be positive, got {r_boundary}")));
    }

    let a_abs = semi_major_axis.abs();
    let cosh_h = ((r_boundary / a_abs + 1.0) / eccentricity).max(1.0);
    let h = cosh_h.acosh();
    let m = eccentricity * h.sinh() - h;
    Ok(m / mean_motion(mu, a_abs))
}

/// Time from periapsis out to radius `r` on an ellipse, assuming the outbound half
/// (`E ∈ [0, π]`). Radii outside `[r_p, r_a]` clamp to the nearer apsis.
pub fn time_from_periapsis_to_radius(
    semi_major_axis: f64,
    eccentricity: f64,
    mu: f64,
    radius: f64,
) -> Result<f64, OrbitError> {
    if mu <= 0.0 {
        return Err(OrbitError::domain(format!("gravitational parameter must be positive, got {mu}")));
    }
    if semi_major_axis <= 0.0 {
        return Err(OrbitError::domain("ellipse requires a positive semi-major axis"));
    }
    if !(eccentricity > 0.0 && eccentricity < 1.0) {
        return Err(OrbitError::domain(format!(
            "radius inversion requires 0 < e < 1, got {eccentricity}"
        )));
    }

    let cos_e = ((1.0 - radius / semi_major_axis) / eccentricity).clamp(-1.0, 1.0);
    let e_anom = cos_e.acos();
    let m = e_anom - eccentricity * e_anom.sin();
    Ok(m / mean_motion(mu, semi_major_axis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    const MU_MOON: f64 = 4.9e12;

    #[test]
    fn kepler_residual_below_tolerance_across_grid() {
        for i in 0..20 {
            let e = i as f64 * 0.05;
            for j in 0..64 {
                let m = TAU * j as f64 / 64.0;
                let ea = solve_kepler(m, e).expect("converges");
                let residual = ea - e * ea.sin() - m;
                assert!(residual.abs() < 1e-6, "e={e} M={m} residual={residual}");
            }
        }
    }

    #[test]
    fn kepler_high_eccentricity_near_periapsis() {
        let ea = solve_kepler(1e-3, 0.99).unwrap();
        assert!((ea - 0.99 * ea.sin() - 1e-3).abs() < 1e-6);
    }

    #[test]
    fn kepler_wraps_mean_anomaly() {
        let a = solve_kepler(1.0, 0.3).unwrap();
        let b = solve_kepler(1.0 + 3.0 * TAU, 0.3).unwrap();
        let c = solve_kepler(1.0 - TAU, 0.3).unwrap();
        assert_relative_eq!(a, b, epsilon = 1e-9);
        assert_relative_eq!(a, c, epsilon = 1e-9);
    }

    #[test]
    fn kepler_rejects_open_orbits() {
        assert!(matches!(solve_kepler(1.0, 1.0), Err(OrbitError::Domain(_))));
        assert!(matches!(solve_kepler(1.0, -0.1), Err(OrbitError::Domain(_))));
        assert!(matches!(solve_kepler(f64::NAN, 0.1), Err(OrbitError::Domain(_))));
    }

    #[test]
    fn anomaly_round_trip() {
        for &e in &[0.0, 0.2, 0.7, 0.95] {
            for j in 0..16 {
                let ea = -PI + TAU * (j as f64 + 0.5) / 16.0;
                let nu = eccentric_to_true_anomaly(ea, e).unwrap();
                let back = true_to_eccentric_anomaly(nu, e).unwrap();
                assert_relative_eq!(back, ea, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn circular_anomalies_coincide() {
        let nu = eccentric_to_true_anomaly(1.234, 0.0).unwrap();
        assert_relative_eq!(nu, 1.234, epsilon = 1e-14);
    }

    #[test]
    fn true_anomaly_undefined_for_hyperbola() {
        assert!(eccentric_to_true_anomaly(0.5, 1.2).is_err());
        assert!(hyperbolic_to_true_anomaly(0.5, 0.9).is_err());
    }

    #[test]
    fn hyperbolic_residual_both_branches() {
        for &e in &[1.05, 1.3, 1.59, 1.61, 2.5, 8.0] {
            for &m in &[-40.0, -3.0, -0.05, 0.0, 0.05, 0.7, 3.0, 40.0] {
                let h = solve_kepler_hyperbolic(m, e).expect("converges");
                let residual = e * h.sinh() - h - m;
                assert!(residual.abs() < 1e-8, "e={e} M={m} residual={residual}");
                assert!(h.signum() * m.signum() >= 0.0);
            }
        }
    }

    #[test]
    fn hyperbolic_true_anomaly_approaches_asymptote() {
        let e = 1.5_f64;
        let nu = hyperbolic_to_true_anomaly(30.0, e).unwrap();
        let nu_inf = (-1.0 / e).acos();
        assert_relative_eq!(nu, nu_inf, epsilon = 1e-9);
    }

    #[test]
    fn hyperbolic_time_is_symmetric_about_periapsis() {
        let a = 7.7e6;
        let e = 1.25;
        let r_soi = 6.61e7;
        let t = hyperbolic_time_to_periapsis(a, e, MU_MOON, r_soi).unwrap();
        assert!(t > 0.0);

        let n = mean_motion(MU_MOON, a);
        for sign in [1.0, -1.0] {
            let h = solve_kepler_hyperbolic(sign * n * t, e).unwrap();
            let r = a * (e * h.cosh() - 1.0);
            assert_relative_eq!(r, r_soi, max_relative = 1e-9);
            assert_eq!(h.signum(), sign);
        }
    }

    #[test]
    fn hyperbolic_time_clamps_inside_periapsis() {
        let a = 7.7e6;
        let e = 1.25;
        let rp = a * (e - 1.0);
        let t = hyperbolic_time_to_periapsis(a, e, MU_MOON, 0.5 * rp).unwrap();
        assert_eq!(t, 0.0);
    }

    #[test]
    fn elliptic_time_to_apoapsis_is_half_period() {
        let mu = 3.986e14;
        let a = 2.0e7;
        let e = 0.6;
        let t = time_from_periapsis_to_radius(a, e, mu, a * (1.0 + e)).unwrap();
        let half_period = PI / mean_motion(mu, a);
        assert_relative_eq!(t, half_period, max_relative = 1e-12);
        let at_periapsis = time_from_periapsis_to_radius(a, e, mu, a * (1.0 - e)).unwrap();
        assert!(at_periapsis.abs() < 1e-3);
    }
}
