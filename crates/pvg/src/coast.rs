//! Analytic vacuum-coast integration of state and costate.

use coast_core::LogSink;
use coast_twobody::{SolverSettings, TwoBodySolver};

use crate::{LayoutError, PropagationError};
use crate::interpolant::Interpolant;
use crate::phase::Phase;
use crate::pool::BufferPool;
use crate::solution::Solution;
use crate::state::StateVector;

/// Sub-intervals recorded per arc by [`CoastIntegrator::integrate_with_solution`].
pub const DEFAULT_SAMPLES_PER_ARC: usize = 20;

/// Scratch buffers available to concurrent callers of one propagator.
pub const DEFAULT_POOL_CAPACITY: usize = 64;

/// Propagation primitive consumed by the guidance solver.
pub trait CoastIntegrator {
    /// Advance `y0` from `t0` to `tf` (either direction).
    fn integrate(
        &self,
        y0: &StateVector,
        phase: &Phase,
        t0: f64,
        tf: f64,
    ) -> Result<StateVector, PropagationError>;

    /// Advance `y0` over `t0 < tf`, appending one sampled segment to `solution`.
    ///
    /// Nothing is appended when propagation fails.
    fn integrate_with_solution(
        &self,
        y0: &StateVector,
        phase: &Phase,
        t0: f64,
        tf: f64,
        solution: &mut Solution,
    ) -> Result<StateVector, PropagationError>;
}

/// Closed-form coast through the two-body STM.
#[derive(Debug)]
pub struct VacuumCoast {
    mu: f64,
    samples_per_arc: usize,
    solver: TwoBodySolver,
    pool: BufferPool,
    log: LogSink,
}

impl VacuumCoast {
    /// Propagator for gravitational parameter `mu` (1.0 in normalised units).
    pub fn new(mu: f64) -> Self {
        Self {
            mu,
            samples_per_arc: DEFAULT_SAMPLES_PER_ARC,
            solver: TwoBodySolver::default(),
            pool: BufferPool::new(StateVector::LEN, DEFAULT_POOL_CAPACITY),
            log: LogSink::noop(),
        }
    }

    /// Number of equal sub-intervals sampled per arc (at least one).
    pub fn with_samples_per_arc(mut self, samples: usize) -> Self {
        self.samples_per_arc = samples.max(1);
        self
    }

    pub fn with_solver_settings(mut self, settings: SolverSettings) -> Self {
        self.solver = TwoBodySolver::new(settings);
        self
    }

    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.pool = BufferPool::new(StateVector::LEN, capacity);
        self
    }

    pub fn with_log_sink(mut self, log: LogSink) -> Self {
        self.log = log;
        self
    }

    pub fn mu(&self) -> f64 {
        self.mu
    }

    pub fn samples_per_arc(&self) -> usize {
        self.samples_per_arc
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Packed-buffer form of [`CoastIntegrator::integrate`].
    ///
    /// Reads the first `StateVector::LEN` slots of `y_in` and writes the same slots of
    /// `y_out`. The result is staged in a pooled buffer, so `y_out` is only written once
    /// propagation has succeeded.
    pub fn integrate_slices(
        &self,
        y_in: &[f64],
        y_out: &mut [f64],
        phase: &Phase,
        t0: f64,
        tf: f64,
    ) -> Result<(), PropagationError> {
        let y0 = StateVector::from_slice(y_in)?;
        if y_out.len() < StateVector::LEN {
            return Err(LayoutError::TooShort {
                expected: StateVector::LEN,
                actual: y_out.len(),
            }
            .into());
        }
        let mut staged = self.pool.rent()?;

        self.integrate(&y0, phase, t0, tf)?.write_to(&mut staged)?;
        y_out[..StateVector::LEN].copy_from_slice(&staged[..StateVector::LEN]);
        Ok(())
    }
}

impl CoastIntegrator for VacuumCoast {
    fn integrate(
        &self,
        y0: &StateVector,
        phase: &Phase,
        t0: f64,
        tf: f64,
    ) -> Result<StateVector, PropagationError> {
        let sol = self
            .solver
            .solve_with_stm(self.mu, tf - t0, y0.r, y0.v)
            .inspect_err(|err| {
                self.log
                    .log(&format!("coast [{t0}, {tf}] in {phase} failed: {err}"));
            })?;

        // (pv, pr) obey the same linear map as (δr, δv); both inputs are the arc-start values.
        let (pv, pr) = sol.stm.apply(y0.pv, y0.pr);

        Ok(StateVector {
            r: sol.r,
            v: sol.v,
            pv,
            pr,
            pm: y0.pm,
            dv: y0.dv,
        })
    }

    fn integrate_with_solution(
        &self,
        y0: &StateVector,
        phase: &Phase,
        t0: f64,
        tf: f64,
        solution: &mut Solution,
    ) -> Result<StateVector, PropagationError> {
        if !(tf > t0) {
            return Err(PropagationError::InvalidSpan { t0, tf });
        }

        let n = self.samples_per_arc;
        let mut interpolant = Interpolant::with_capacity(n + 1);
        interpolant.push(t0, *y0, y0.coast_derivative(self.mu))?;

        // Every sample is propagated from the arc start rather than chained.
        let mut yf = *y0;
        for i in 1..=n {
            let t = if i == n {
                tf
            } else {
                t0 + (tf - t0) * i as f64 / n as f64
            };
            yf = self.integrate(y0, phase, t0, t)?;
            interpolant.push(t, yf, yf.coast_derivative(self.mu))?;
        }

        solution.add_segment(t0, tf, interpolant, phase.clone())?;
        log::trace!(
            target: "coast",
            "recorded {phase} over [{t0}, {tf}] with {} samples",
            n + 1
        );
        Ok(yf)
    }
}
