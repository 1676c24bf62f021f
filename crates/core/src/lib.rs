//! Core units, constants, and shared primitives for the Space Logistics workspace.
//!
//! Everything in the orbital-mechanics stack works in SI units (metres, seconds,
//! kilograms, radians). Kilometres and degrees only appear at configuration and
//! display boundaries, which is what the conversion helpers below are for.

/// Physical constants expressed in SI units.
pub mod constants {
    /// Newtonian constant of gravitation (m³ kg⁻¹ s⁻²).
    pub const G: f64 = 6.674e-11;
    /// Seconds per day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Seconds per week.
    pub const SECONDS_PER_WEEK: f64 = 7.0 * SECONDS_PER_DAY;
}

/// Basic unit conversion helpers.
pub mod units {
    /// Convert kilometres to metres.
    #[inline]
    pub fn km_to_m(v: f64) -> f64 {
        v * 1_000.0
    }

    /// Convert metres to kilometres.
    #[inline]
    pub fn m_to_km(v: f64) -> f64 {
        v / 1_000.0
    }

    /// Convert metres per second to kilometres per second.
    #[inline]
    pub fn ms_to_kms(v: f64) -> f64 {
        v / 1_000.0
    }
}

/// Lightweight time utilities shared across crates.
pub mod time {
    use super::constants::SECONDS_PER_DAY;

    /// Convert days to seconds.
    #[inline]
    pub fn days_to_seconds(days: f64) -> f64 {
        days * SECONDS_PER_DAY
    }

    /// Convert seconds to days.
    #[inline]
    pub fn seconds_to_days(seconds: f64) -> f64 {
        seconds / SECONDS_PER_DAY
    }

    /// Split a duration into whole days, hours and minutes.
    pub fn split_duration(seconds: f64) -> (i64, i64, i64) {
        let total_seconds = seconds.max(0.0);
        let days = (total_seconds / SECONDS_PER_DAY).floor() as i64;
        let remaining = total_seconds - (days as f64 * SECONDS_PER_DAY);
        let hours = (remaining / 3_600.0).floor() as i64;
        let minutes = ((remaining - hours as f64 * 3_600.0) / 60.0).floor() as i64;
        (days, hours, minutes)
    }
}

/// Angle helpers.
pub mod angle {
    use std::f64::consts::TAU;

    /// Normalize an angle into `[0, 2π)`.
    #[inline]
    pub fn normalize(angle: f64) -> f64 {
        let a = angle % TAU;
        if a < 0.0 { a + TAU } else { a }
    }
}

/// Minimal vector helpers to avoid ad-hoc `[f64; 3]` math everywhere.
pub mod vector {
    /// Alias for a 3D vector in metres or m/s depending on context.
    pub type Vector3 = [f64; 3];

    /// The zero vector.
    pub const ZERO: Vector3 = [0.0, 0.0, 0.0];

    /// Euclidean norm of a vector.
    #[inline]
    pub fn norm(v: &Vector3) -> f64 {
        dot(v, v).sqrt()
    }

    /// Dot product of two vectors.
    #[inline]
    pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Cross product of two vectors.
    #[inline]
    pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    /// z-component of the cross product, i.e. the 2D cross product in the xy-plane.
    #[inline]
    pub fn cross_z(a: &Vector3, b: &Vector3) -> f64 {
        a[0] * b[1] - a[1] * b[0]
    }

    /// Vector subtraction.
    #[inline]
    pub fn sub(a: &Vector3, b: &Vector3) -> Vector3 {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    /// Scale a vector by a scalar.
    #[inline]
    pub fn scale(v: &Vector3, s: f64) -> Vector3 {
        [v[0] * s, v[1] * s, v[2] * s]
    }

    /// Polar angle of the vector's projection onto the xy-plane, in `(-π, π]`.
    #[inline]
    pub fn angle_xy(v: &Vector3) -> f64 {
        v[1].atan2(v[0])
    }

    /// Vector of the given length in the xy-plane at polar angle `angle`.
    #[inline]
    pub fn from_polar(length: f64, angle: f64) -> Vector3 {
        [length * angle.cos(), length * angle.sin(), 0.0]
    }

    /// Angle between two vectors in `[0, π]`.
    pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
        let denom = norm(a) * norm(b);
        if denom == 0.0 {
            return 0.0;
        }
        (dot(a, b) / denom).clamp(-1.0, 1.0).acos()
    }
}
