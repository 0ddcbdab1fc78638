//! Launch-plane phasing: how long until a rotating launch site lies in a target plane.
//!
//! For a site at latitude `φ` and a plane of inclination `i`, Napier's rule for the right
//! spherical triangle formed by the equator, the orbit track and the site meridian gives
//! the site's longitude east of the ascending node as `Δλ = asin(tan φ / tan |i|)`.
//! A negative inclination selects the southerly (descending node) launch, `π − Δλ`.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use coast_core::units::{clamp_2pi, deg_to_rad, safe_asin};
use thiserror::Error;

/// Latitudes this close (radians) to ±90° are treated as the pole.
const POLE_TOL: f64 = 1e-12;

/// Slack on `|tan φ / tan i| ≤ 1` absorbing rounding of `tan` at equal angles.
const RATIO_TOL: f64 = 1e-12;

/// Domain errors of the phasing solve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhasingError {
    #[error("rotation period must be finite and non-zero (got {0})")]
    InvalidPeriod(f64),
    #[error("a site at latitude {latitude}° never reaches a plane inclined {inclination}°")]
    Unreachable { latitude: f64, inclination: f64 },
}

/// Time until a launch site passes through the plane `(lan, inc)`.
///
/// * `period`: rotation period of the body in seconds; a negative value means the
///   body rotates retrograde and the site sweeps westward.
/// * `latitude`, `celestial_longitude`: site position in degrees, longitude measured in
///   the same inertial frame as `lan`.
/// * `lan`, `inc`: target plane in degrees. Negative `inc` asks for the descending-node
///   (southerly) launch into the plane of inclination `|inc|`.
///
/// Returns seconds in `[0, |period|)`. A site at either pole is always in plane and yields
/// 0, as does an equatorial site with an equatorial target. A plane the site can never
/// reach (`|inc|` below `|latitude|`, folded about 90°) is [`PhasingError::Unreachable`].
pub fn time_to_plane(
    period: f64,
    latitude: f64,
    celestial_longitude: f64,
    lan: f64,
    inc: f64,
) -> Result<f64, PhasingError> {
    if period == 0.0 || !period.is_finite() {
        return Err(PhasingError::InvalidPeriod(period));
    }

    let lat_rad = deg_to_rad(latitude);
    let lng_rad = deg_to_rad(celestial_longitude);
    let lan_rad = deg_to_rad(lan);
    let inc_rad = deg_to_rad(inc);

    if (lat_rad.abs() - FRAC_PI_2).abs() < POLE_TOL {
        return Ok(0.0);
    }
    if lat_rad == 0.0 && inc_rad.sin().abs() < POLE_TOL {
        return Ok(0.0);
    }

    let ratio = lat_rad.tan() / inc_rad.abs().tan();
    if !(ratio.abs() <= 1.0 + RATIO_TOL) {
        return Err(PhasingError::Unreachable {
            latitude,
            inclination: inc,
        });
    }

    let mut east_of_node = safe_asin(ratio);
    if inc_rad < 0.0 {
        east_of_node = PI - east_of_node;
    }

    let sweep = if period > 0.0 {
        clamp_2pi(lan_rad + east_of_node - lng_rad)
    } else {
        clamp_2pi(lng_rad - lan_rad - east_of_node)
    };

    let delay = sweep / TAU * period.abs();
    Ok(if delay >= period.abs() { 0.0 } else { delay })
}
