//! Core value types, constants, and shared helpers for the coast propagator workspace.

pub mod logging;
pub mod vector;

pub use logging::LogSink;
pub use vector::{M3, V3};

/// Physical constants expressed in SI units (unless stated otherwise).
pub mod constants {
    /// Earth's gravitational parameter (m³/s²).
    pub const MU_EARTH: f64 = 3.986_004_418e14;
    /// Earth's sidereal rotation period (s).
    pub const SIDEREAL_DAY_EARTH: f64 = 86_164.090_5;
    /// Machine epsilon for `f64`, re-exported for tolerance arithmetic.
    pub const EPS: f64 = f64::EPSILON;
}

/// Angle conversion and wrapping helpers.
pub mod units {
    use std::f64::consts::TAU;

    /// Convert degrees to radians.
    #[inline]
    pub fn deg_to_rad(deg: f64) -> f64 {
        deg.to_radians()
    }

    /// Convert radians to degrees.
    #[inline]
    pub fn rad_to_deg(rad: f64) -> f64 {
        rad.to_degrees()
    }

    /// Wrap an angle into `[0, 2π)`.
    #[inline]
    pub fn clamp_2pi(angle: f64) -> f64 {
        let wrapped = angle.rem_euclid(TAU);
        // rem_euclid can round up to exactly TAU for tiny negative inputs
        if wrapped >= TAU { 0.0 } else { wrapped }
    }

    /// `asin` with its argument clamped to `[-1, 1]`.
    #[inline]
    pub fn safe_asin(x: f64) -> f64 {
        x.clamp(-1.0, 1.0).asin()
    }

    /// `acos` with its argument clamped to `[-1, 1]`.
    #[inline]
    pub fn safe_acos(x: f64) -> f64 {
        x.clamp(-1.0, 1.0).acos()
    }
}
