//! Vacuum-coast propagation for primer-vector guidance.
//!
//! A [`StateVector`] carries position, velocity and the costate pair of an indirect
//! optimal-control problem. [`VacuumCoast`] advances it across an unpowered arc with the
//! analytic two-body solution, mapping the costates through the state-transition matrix,
//! and can record the arc as an interpolated [`Segment`] of a [`Solution`].

pub mod coast;
pub mod interpolant;
pub mod phase;
pub mod pool;
pub mod solution;
pub mod state;

use coast_twobody::TwoBodyError;
use thiserror::Error;

pub use coast::{CoastIntegrator, DEFAULT_POOL_CAPACITY, DEFAULT_SAMPLES_PER_ARC, VacuumCoast};
pub use interpolant::{InterpolationError, Interpolant, Sample};
pub use phase::{Phase, PhaseKind};
pub use pool::{BufferPool, PoolError, PooledBuffer};
pub use solution::{Segment, Solution, SolutionError};
pub use state::StateVector;

/// Packed buffer does not match the state layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("state buffer holds {actual} values but the layout needs {expected}")]
    TooShort { expected: usize, actual: usize },
}

/// Any failure of a propagation call. The call is aborted; nothing is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    #[error("two-body solve failed: {0}")]
    TwoBody(#[from] TwoBodyError),
    #[error("scratch buffer unavailable: {0}")]
    Pool(#[from] PoolError),
    #[error("state layout mismatch: {0}")]
    Layout(#[from] LayoutError),
    #[error("interpolant construction failed: {0}")]
    Interpolation(#[from] InterpolationError),
    #[error("solution append failed: {0}")]
    Solution(#[from] SolutionError),
    #[error("recorded arcs must run forward in time (t0 = {t0}, tf = {tf})")]
    InvalidSpan { t0: f64, tf: f64 },
}
