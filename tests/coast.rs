use std::sync::{Arc, Mutex};

use coast_propagator::core::{LogSink, V3};
use coast_propagator::pvg::{
    CoastIntegrator, LayoutError, Phase, PoolError, PropagationError, Solution, StateVector,
    VacuumCoast,
};
use coast_propagator::twobody::{self, TwoBodyError};
use std::f64::consts::PI;

fn initial_state() -> StateVector {
    StateVector {
        r: V3::new(1.0, 0.2, -0.1),
        v: V3::new(-0.1, 1.2, 0.3),
        pv: V3::new(0.3, -0.5, 0.8),
        pr: V3::new(-0.2, 0.1, 0.4),
        pm: 0.75,
        dv: 12.5,
    }
}

fn assert_v3_close(actual: V3, expected: V3, tol: f64, what: &str) {
    let err = (actual - expected).magnitude();
    assert!(
        err <= tol * expected.magnitude().max(1.0),
        "{what}: {actual} vs {expected} (err {err:e})"
    );
}

fn assert_state_close(actual: &StateVector, expected: &StateVector, tol: f64, what: &str) {
    assert_v3_close(actual.r, expected.r, tol, &format!("{what} r"));
    assert_v3_close(actual.v, expected.v, tol, &format!("{what} v"));
    assert_v3_close(actual.pv, expected.pv, tol, &format!("{what} pv"));
    assert_v3_close(actual.pr, expected.pr, tol, &format!("{what} pr"));
    assert_eq!(actual.pm, expected.pm, "{what} pm");
    assert_eq!(actual.dv, expected.dv, "{what} dv");
}

#[test]
fn zero_length_arc_is_identity() {
    let coast = VacuumCoast::new(1.0);
    let y0 = initial_state();
    let y = coast.integrate(&y0, &Phase::coast(0), 3.0, 3.0).expect("integrate");
    assert_eq!(y, y0);
}

#[test]
fn costates_follow_the_state_transition_matrix() {
    let coast = VacuumCoast::new(1.0);
    let y0 = initial_state();
    let y = coast.integrate(&y0, &Phase::coast(0), 0.5, 2.0).expect("integrate");
    let sol = twobody::solve_with_stm(1.0, 1.5, y0.r, y0.v).expect("solve");

    assert_eq!(y.r, sol.r);
    assert_eq!(y.v, sol.v);
    let (pv, pr) = sol.stm.apply(y0.pv, y0.pr);
    assert_eq!(y.pv, pv);
    assert_eq!(y.pr, pr);
    assert_eq!(y.pm, y0.pm);
    assert_eq!(y.dv, y0.dv);
}

#[test]
fn costates_satisfy_coast_equations() {
    // pv' = pr and pr' = G(r) pv along the arc
    let coast = VacuumCoast::new(1.0);
    let y0 = initial_state();
    let phase = Phase::coast(0);
    let (t, h) = (1.1, 1e-5);
    let y = coast.integrate(&y0, &phase, 0.0, t).expect("centre");
    let yp = coast.integrate(&y0, &phase, 0.0, t + h).expect("plus");
    let ym = coast.integrate(&y0, &phase, 0.0, t - h).expect("minus");
    let deriv = y.coast_derivative(1.0);

    assert_v3_close((yp.pv - ym.pv) / (2.0 * h), deriv.pv, 1e-8, "pv'");
    assert_v3_close((yp.pr - ym.pr) / (2.0 * h), deriv.pr, 1e-8, "pr'");
    assert_v3_close((yp.r - ym.r) / (2.0 * h), deriv.r, 1e-8, "r'");
    assert_v3_close((yp.v - ym.v) / (2.0 * h), deriv.v, 1e-8, "v'");
}

#[test]
fn backward_arc_undoes_forward_arc() {
    let coast = VacuumCoast::new(1.0);
    let y0 = initial_state();
    let phase = Phase::coast(0);
    let y1 = coast.integrate(&y0, &phase, 0.0, 4.0).expect("forward");
    let y2 = coast.integrate(&y1, &phase, 4.0, 0.0).expect("backward");
    assert_state_close(&y2, &y0, 1e-9, "round trip");
}

#[test]
fn recorded_arc_matches_direct_propagation() {
    let coast = VacuumCoast::new(1.0).with_samples_per_arc(40);
    let y0 = initial_state();
    let phase = Phase::burn(2).with_label("upper");
    let mut solution = Solution::new();

    let yf = coast
        .integrate_with_solution(&y0, &phase, 1.0, 1.0 + PI, &mut solution)
        .expect("record");

    assert_eq!(solution.len(), 1);
    assert_eq!(solution.t0(), Some(1.0));
    assert_eq!(solution.tf(), Some(1.0 + PI));
    assert_eq!(solution.phase_at(2.0).expect("phase"), &phase);
    assert_eq!(solution.segments()[0].interpolant().len(), 41);

    let direct = coast.integrate(&y0, &phase, 1.0, 1.0 + PI).expect("direct");
    assert_eq!(yf, direct);
    assert_eq!(solution.state_at(1.0).expect("start"), y0);
    assert_eq!(solution.state_at(1.0 + PI).expect("end"), yf);

    for k in 0..40 {
        let t = 1.0 + PI * (k as f64 + 0.5) / 40.0;
        let interpolated = solution.state_at(t).expect("inside");
        let exact = coast.integrate(&y0, &phase, 1.0, t).expect("direct");
        assert_state_close(&interpolated, &exact, 1e-5, &format!("t = {t}"));
    }
    assert!((solution.time_to_go(2.0).expect("time to go") - (PI - 1.0)).abs() < 1e-15);
}

#[test]
fn chained_arcs_continue_each_other() {
    let coast = VacuumCoast::new(1.0).with_samples_per_arc(8);
    let mut solution = Solution::new();
    let y0 = initial_state();
    let y1 = coast
        .integrate_with_solution(&y0, &Phase::coast(1), 0.0, 1.0, &mut solution)
        .expect("first");
    let y2 = coast
        .integrate_with_solution(&y1, &Phase::coast(2), 1.0, 2.5, &mut solution)
        .expect("second");

    assert_eq!(solution.len(), 2);
    assert_eq!(solution.phase_at(0.5).expect("first").stage, 1);
    assert_eq!(solution.phase_at(1.0).expect("joint").stage, 2);
    let direct = coast.integrate(&y0, &Phase::coast(1), 0.0, 2.5).expect("direct");
    assert_state_close(&y2, &direct, 1e-12, "chained");
}

#[test]
fn non_forward_span_is_rejected_without_recording() {
    let coast = VacuumCoast::new(1.0);
    let mut solution = Solution::new();
    for (t0, tf) in [(2.0, 2.0), (2.0, 1.0), (0.0, f64::NAN)] {
        let err = coast
            .integrate_with_solution(&initial_state(), &Phase::coast(0), t0, tf, &mut solution)
            .unwrap_err();
        assert!(matches!(err, PropagationError::InvalidSpan { .. }), "{err}");
    }
    assert!(solution.is_empty());
}

#[test]
fn solver_failure_is_logged_and_nothing_is_recorded() {
    let messages = Arc::new(Mutex::new(Vec::<String>::new()));
    let sink = {
        let messages = Arc::clone(&messages);
        LogSink::new(move |m| messages.lock().unwrap().push(m.to_string()))
    };
    let coast = VacuumCoast::new(-1.0).with_log_sink(sink);
    let mut solution = Solution::new();

    let err = coast
        .integrate_with_solution(&initial_state(), &Phase::coast(3), 0.0, 1.0, &mut solution)
        .unwrap_err();
    assert_eq!(err, PropagationError::TwoBody(TwoBodyError::InvalidMu(-1.0)));
    assert!(solution.is_empty());

    let messages = messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("stage 3"), "{}", messages[0]);
}

#[test]
fn packed_buffers_use_the_fixed_layout() {
    let coast = VacuumCoast::new(1.0);
    let y0 = initial_state();
    let mut y_in = vec![0.0; StateVector::LEN];
    y0.write_to(&mut y_in).expect("encode");
    assert_eq!(y_in[StateVector::PV + 2], 0.8);
    assert_eq!(y_in[StateVector::PM], 0.75);

    let mut y_out = vec![-7.0; StateVector::LEN + 2];
    coast
        .integrate_slices(&y_in, &mut y_out, &Phase::coast(0), 0.0, 0.9)
        .expect("integrate");

    let expected = coast.integrate(&y0, &Phase::coast(0), 0.0, 0.9).expect("direct");
    assert_eq!(StateVector::from_slice(&y_out).expect("decode"), expected);
    assert_eq!(&y_out[StateVector::LEN..], &[-7.0, -7.0]);
    assert_eq!(coast.pool().outstanding(), 0);
    assert_eq!(coast.pool().idle(), 1);
}

#[test]
fn packed_failures_leave_output_untouched_and_release_scratch() {
    let coast = VacuumCoast::new(1.0);
    let mut y_out = vec![-7.0; StateVector::LEN];

    let err = coast
        .integrate_slices(&[1.0; 5], &mut y_out, &Phase::coast(0), 0.0, 1.0)
        .unwrap_err();
    assert_eq!(
        err,
        PropagationError::Layout(LayoutError::TooShort {
            expected: StateVector::LEN,
            actual: 5,
        })
    );

    // zero position fails inside the solver after the scratch buffer is rented
    let y_in = vec![0.0; StateVector::LEN];
    let err = coast
        .integrate_slices(&y_in, &mut y_out, &Phase::coast(0), 0.0, 1.0)
        .unwrap_err();
    assert_eq!(err, PropagationError::TwoBody(TwoBodyError::InvalidState));

    assert!(y_out.iter().all(|&x| x == -7.0));
    assert_eq!(coast.pool().outstanding(), 0);
}

#[test]
fn exhausted_pool_is_an_error() {
    let coast = VacuumCoast::new(1.0).with_pool_capacity(1);
    let held = coast.pool().rent().expect("first rental");
    let mut y_in = vec![0.0; StateVector::LEN];
    initial_state().write_to(&mut y_in).expect("encode");
    let mut y_out = vec![0.0; StateVector::LEN];

    let err = coast
        .integrate_slices(&y_in, &mut y_out, &Phase::coast(0), 0.0, 1.0)
        .unwrap_err();
    assert_eq!(
        err,
        PropagationError::Pool(PoolError::Exhausted {
            capacity: 1,
            slot_len: StateVector::LEN,
        })
    );

    drop(held);
    coast
        .integrate_slices(&y_in, &mut y_out, &Phase::coast(0), 0.0, 1.0)
        .expect("slot free again");
}

#[test]
fn propagator_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<VacuumCoast>();

    let coast = Arc::new(VacuumCoast::new(1.0));
    let y0 = initial_state();
    let expected = coast.integrate(&y0, &Phase::coast(0), 0.0, 2.0).expect("direct");
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let coast = Arc::clone(&coast);
            std::thread::spawn(move || {
                let mut y_in = vec![0.0; StateVector::LEN];
                y0.write_to(&mut y_in).expect("encode");
                let mut y_out = vec![0.0; StateVector::LEN];
                coast
                    .integrate_slices(&y_in, &mut y_out, &Phase::coast(0), 0.0, 2.0)
                    .expect("integrate");
                StateVector::from_slice(&y_out).expect("decode")
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().expect("thread"), expected);
    }
    assert_eq!(coast.pool().outstanding(), 0);
}
