//! Closed-form two-body propagation in universal variables.
//!
//! [`solve_with_stm`] advances a position/velocity pair by an arbitrary (possibly
//! negative) elapsed time and returns the four 3x3 blocks of the state-transition
//! matrix. The formulation is singularity free across elliptic, parabolic and
//! hyperbolic orbits, and `dt = 0` returns the inputs with an exact identity STM.

pub mod stumpff;
pub mod universal;

use coast_core::V3;
use thiserror::Error;

pub use universal::{SolverSettings, Stm, TwoBodySolution, TwoBodySolver};

/// Failures of the analytic solver. None of them are recoverable inside the solver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TwoBodyError {
    #[error("gravitational parameter must be positive and finite (got {0})")]
    InvalidMu(f64),
    #[error("elapsed time must be finite (got {0})")]
    InvalidTime(f64),
    #[error("initial state must be finite with a non-zero position vector")]
    InvalidState,
    #[error(
        "universal-variable solve did not converge after {iterations} iterations (dt = {dt}, residual = {residual:e})"
    )]
    NoConvergence {
        iterations: usize,
        dt: f64,
        residual: f64,
    },
}

/// Propagate with default solver settings and return the state and its STM.
pub fn solve_with_stm(mu: f64, dt: f64, r0: V3, v0: V3) -> Result<TwoBodySolution, TwoBodyError> {
    TwoBodySolver::default().solve_with_stm(mu, dt, r0, v0)
}

/// Propagate with default solver settings, returning only the final state.
pub fn propagate(mu: f64, dt: f64, r0: V3, v0: V3) -> Result<(V3, V3), TwoBodyError> {
    TwoBodySolver::default().propagate(mu, dt, r0, v0)
}
