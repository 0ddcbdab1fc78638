//! Orbit utility helpers: classical elements from Cartesian state, circular speeds, and
//! launch-plane phasing.

pub mod phasing;

use std::f64::consts::TAU;

use coast_core::V3;
use coast_core::units::clamp_2pi;
use thiserror::Error;

pub use phasing::{PhasingError, time_to_plane};

/// Below this ratio the node line (|n|/|h|) or the eccentricity vector is treated as
/// undefined and the documented fallback direction is used instead.
const DEGENERATE_TOL: f64 = 1e-12;

/// Classical orbital elements. Angles are radians; `lan`, `argp` and `tanom` lie in `[0, 2π)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerianElements {
    /// Semi-major axis (negative for hyperbolic orbits, infinite for parabolic energy).
    pub sma: f64,
    pub ecc: f64,
    /// Inclination in `[0, π]`.
    pub inc: f64,
    /// Longitude of the ascending node; 0 for equatorial orbits.
    pub lan: f64,
    /// Argument of periapsis from the node line; 0 for circular orbits.
    pub argp: f64,
    /// True anomaly from the periapsis direction (from the node line for circular orbits).
    pub tanom: f64,
}

impl KeplerianElements {
    /// Orbital period for closed orbits.
    pub fn period(&self, mu: f64) -> Option<f64> {
        orbital_period(mu, self.sma)
    }
}

/// Errors raised when the state does not define an orbit plane.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ElementsError {
    #[error("gravitational parameter must be positive and finite (got {0})")]
    InvalidMu(f64),
    #[error("position vector has zero magnitude")]
    ZeroPosition,
    #[error("angular momentum vanishes (velocity is zero or parallel to position)")]
    Rectilinear,
}

/// Convert a Cartesian state into classical orbital elements.
///
/// Equatorial orbits (node line undefined) use `lan = 0` with the +x axis as the node
/// line. Circular orbits (eccentricity vector undefined) use `argp = 0` with the node
/// line as the periapsis direction, so `tanom` becomes the argument of latitude (or the
/// true longitude when the orbit is also equatorial).
pub fn keplerian_from_state_vectors(
    mu: f64,
    r: V3,
    v: V3,
) -> Result<KeplerianElements, ElementsError> {
    if !(mu > 0.0 && mu.is_finite()) {
        return Err(ElementsError::InvalidMu(mu));
    }
    let rm = r.magnitude();
    if rm == 0.0 {
        return Err(ElementsError::ZeroPosition);
    }
    let vm = v.magnitude();
    let h = r.precise_cross(&v);
    let hm = h.magnitude();
    if hm <= 4.0 * f64::EPSILON * rm * vm {
        return Err(ElementsError::Rectilinear);
    }
    let h_hat = h / hm;

    let v2 = v.sqr_magnitude();
    let evec = (v.precise_cross(&h) - r * (mu / rm)) / mu;
    let ecc = evec.magnitude();
    let sma = 1.0 / (2.0 / rm - v2 / mu);

    let node = V3::new(-h.y, h.x, 0.0);
    let nm = node.magnitude();
    let inc = nm.atan2(h.z);

    let (node_hat, lan) = if nm > DEGENERATE_TOL * hm {
        (node / nm, clamp_2pi(node.y.atan2(node.x)))
    } else {
        (V3::X, 0.0)
    };

    let (peri_hat, argp) = if ecc > DEGENERATE_TOL {
        let e_hat = evec / ecc;
        (e_hat, signed_angle(&node_hat, &e_hat, &h_hat))
    } else {
        (node_hat, 0.0)
    };

    let tanom = signed_angle(&peri_hat, &(r / rm), &h_hat);

    Ok(KeplerianElements {
        sma,
        ecc,
        inc,
        lan,
        argp,
        tanom,
    })
}

/// Angle from `from` to `to` measured counter-clockwise about `axis`, in `[0, 2π)`.
fn signed_angle(from: &V3, to: &V3, axis: &V3) -> f64 {
    clamp_2pi(axis.dot(&from.cross(to)).atan2(from.dot(to)))
}

/// Speed of a circular orbit of the given radius.
#[inline]
pub fn circular_velocity(mu: f64, radius: f64) -> f64 {
    (mu / radius).sqrt()
}

/// Period of a closed orbit with semi-major axis `sma`; `None` for open orbits.
pub fn orbital_period(mu: f64, sma: f64) -> Option<f64> {
    if sma > 0.0 && sma.is_finite() && mu > 0.0 {
        Some(TAU * (sma * sma * sma / mu).sqrt())
    } else {
        None
    }
}
