use coast_propagator::core::V3;
use coast_propagator::core::constants::MU_EARTH;
use coast_propagator::orbits::{
    ElementsError, circular_velocity, keplerian_from_state_vectors, orbital_period,
};
use std::f64::consts::{FRAC_PI_2, PI};

fn assert_rel(actual: f64, expected: f64, tol: f64, what: &str) {
    let err = (actual - expected).abs() / expected.abs().max(1e-300);
    assert!(err <= tol, "{what}: {actual} vs {expected} (rel {err:e})");
}

#[test]
fn lunar_state_matches_reference_elements() {
    let r = V3::new(
        -1.455451021873417e+08,
        -3.000298697925529e+08,
        -1.586943000620733e+08,
    );
    let v = V3::new(
        9.572921091669031e+02,
        -3.895747803416348e+02,
        -2.308551508912105e+02,
    );
    let el = keplerian_from_state_vectors(MU_EARTH, r, v).expect("elements");

    assert_rel(el.sma, 3.843084377707066e+08, 1e-15, "sma");
    assert_rel(el.ecc, 5.328149353682574e-02, 1e-14, "ecc");
    assert_rel(el.inc, 4.950221141769940e-01, 1e-15, "inc");
    assert_rel(el.lan, 4.008351366616158e-02, 1e-15, "lan");
    assert_rel(el.argp, 3.486541150390846e+00, 1e-15, "argp");
    assert_rel(el.tanom, 7.853981633974483e-01, 1e-14, "tanom");
}

#[test]
fn circular_equatorial_uses_x_axis_reference() {
    let el = keplerian_from_state_vectors(1.0, V3::X, V3::Y).expect("elements");
    assert_eq!(el.sma, 1.0);
    assert_eq!(el.ecc, 0.0);
    assert_eq!(el.inc, 0.0);
    assert_eq!(el.lan, 0.0);
    assert_eq!(el.argp, 0.0);
    assert_eq!(el.tanom, 0.0);

    // true longitude a quarter turn on
    let el = keplerian_from_state_vectors(1.0, V3::Y, -V3::X).expect("elements");
    assert!((el.tanom - FRAC_PI_2).abs() < 1e-15, "{}", el.tanom);
}

#[test]
fn retrograde_equatorial_has_inclination_pi() {
    let el = keplerian_from_state_vectors(1.0, V3::X, -V3::Y).expect("elements");
    assert_eq!(el.inc, PI);
    assert_eq!(el.lan, 0.0);
}

#[test]
fn polar_circular_orbit_measures_from_node() {
    let el = keplerian_from_state_vectors(1.0, V3::X, V3::Z).expect("elements");
    assert!((el.inc - FRAC_PI_2).abs() < 1e-15);
    assert_eq!(el.lan, 0.0);
    assert_eq!(el.argp, 0.0);
    assert_eq!(el.tanom, 0.0);

    let el = keplerian_from_state_vectors(1.0, V3::Z, -V3::X).expect("elements");
    assert!((el.tanom - FRAC_PI_2).abs() < 1e-15, "{}", el.tanom);
}

#[test]
fn angles_stay_in_range_for_hyperbolic_orbits() {
    let el = keplerian_from_state_vectors(1.0, V3::new(1.0, 0.5, -0.2), V3::new(-0.3, 1.6, 0.4))
        .expect("elements");
    assert!(el.ecc > 1.0);
    assert!(el.sma < 0.0);
    assert_eq!(el.period(1.0), None);
    for angle in [el.lan, el.argp, el.tanom] {
        assert!((0.0..2.0 * PI).contains(&angle), "{angle}");
    }
}

#[test]
fn parabolic_energy_gives_infinite_sma() {
    let el = keplerian_from_state_vectors(2.0, V3::X, V3::new(0.0, 2.0, 0.0)).expect("elements");
    assert!(el.sma.is_infinite());
    assert!((el.ecc - 1.0).abs() < 1e-15);
}

#[test]
fn degenerate_states_are_rejected() {
    assert_eq!(
        keplerian_from_state_vectors(1.0, V3::ZERO, V3::Y),
        Err(ElementsError::ZeroPosition)
    );
    assert_eq!(
        keplerian_from_state_vectors(1.0, V3::X, V3::new(2.0, 0.0, 0.0)),
        Err(ElementsError::Rectilinear)
    );
    assert_eq!(
        keplerian_from_state_vectors(1.0, V3::X, V3::ZERO),
        Err(ElementsError::Rectilinear)
    );
    assert_eq!(
        keplerian_from_state_vectors(-1.0, V3::X, V3::Y),
        Err(ElementsError::InvalidMu(-1.0))
    );
}

#[test]
fn low_earth_orbit_speed_and_period() {
    let radius = 6.371e6 + 350.8e3;
    assert_rel(circular_velocity(MU_EARTH, radius), 7700.627123652554, 1e-14, "speed");
    let period = orbital_period(MU_EARTH, radius).expect("closed orbit");
    assert_rel(period, 5484.5292882805115, 1e-14, "period");
    assert_eq!(orbital_period(MU_EARTH, -radius), None);
}
