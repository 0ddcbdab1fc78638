//! Universal-variable Kepler propagation and the closed-form state-transition matrix.
//!
//! With `σ0 = r0·v0/√μ`, `α = 2/|r0| − |v0|²/μ` and universal functions
//! `U_k(χ) = χ^k c_k(αχ²)`, the time-of-flight equation is
//!
//! ```text
//! √μ Δt = |r0| U1 + σ0 U2 + U3
//! ```
//!
//! Its derivative with respect to `χ` is the radius `r = |r0| U0 + σ0 U1 + U2 > 0`, so the
//! residual is strictly increasing and a bracketed Newton iteration always converges.
//! On long hyperbolic spans the residual grows exponentially in `χ`, so Newton steps that
//! do not at least halve the previous step are replaced by bisection.
//! The STM blocks follow Battin, *An Introduction to the Mathematics and Methods of
//! Astrodynamics*, §9.7.

use coast_core::{M3, V3};

use crate::TwoBodyError;
use crate::stumpff::stumpff;

/// Relative step size at which the Newton iteration is considered converged.
const CONVERGENCE_TOL: f64 = 4.0 * f64::EPSILON;

/// Bracket doublings allowed before the guess is declared hopeless.
const MAX_BRACKET_EXPANSIONS: usize = 256;

/// Band of `α |r0|` around zero treated as parabolic when picking the first guess.
const PARABOLIC_BAND: f64 = 1e-12;

/// Iteration controls for the universal-variable root solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    /// Newton/bisection iterations allowed before the solve fails.
    pub max_iterations: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 200,
        }
    }
}

/// Partitioned state-transition matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stm {
    /// ∂r_f/∂r_0
    pub rr: M3,
    /// ∂r_f/∂v_0
    pub rv: M3,
    /// ∂v_f/∂r_0
    pub vr: M3,
    /// ∂v_f/∂v_0
    pub vv: M3,
}

impl Stm {
    pub const IDENTITY: Stm = Stm {
        rr: M3::IDENTITY,
        rv: M3::ZERO,
        vr: M3::ZERO,
        vv: M3::IDENTITY,
    };

    /// Map a perturbation pair `(δr, δv)` through the STM.
    #[inline]
    pub fn apply(&self, dr: V3, dv: V3) -> (V3, V3) {
        (self.rr * dr + self.rv * dv, self.vr * dr + self.vv * dv)
    }
}

/// Propagated state and its sensitivities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoBodySolution {
    pub r: V3,
    pub v: V3,
    pub stm: Stm,
}

/// Closed-form two-body propagator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoBodySolver {
    settings: SolverSettings,
}

/// Converged universal variable with the universal functions `U0..U5`.
struct Universal {
    chi: f64,
    u: [f64; 6],
}

impl TwoBodySolver {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> SolverSettings {
        self.settings
    }

    /// Propagate `(r0, v0)` by `dt` without computing sensitivities.
    pub fn propagate(&self, mu: f64, dt: f64, r0: V3, v0: V3) -> Result<(V3, V3), TwoBodyError> {
        let sol = self.solve_with_stm(mu, dt, r0, v0)?;
        Ok((sol.r, sol.v))
    }

    /// Propagate `(r0, v0)` by `dt` (negative for backward propagation) and return the
    /// final state with its state-transition matrix.
    pub fn solve_with_stm(
        &self,
        mu: f64,
        dt: f64,
        r0: V3,
        v0: V3,
    ) -> Result<TwoBodySolution, TwoBodyError> {
        if !(mu > 0.0 && mu.is_finite()) {
            return Err(TwoBodyError::InvalidMu(mu));
        }
        if !dt.is_finite() {
            return Err(TwoBodyError::InvalidTime(dt));
        }
        let r0m = r0.magnitude();
        if !(r0.is_finite() && v0.is_finite()) || r0m == 0.0 {
            return Err(TwoBodyError::InvalidState);
        }

        let sqrt_mu = mu.sqrt();
        if dt == 0.0 || sqrt_mu * dt == 0.0 {
            return Ok(TwoBodySolution {
                r: r0,
                v: v0,
                stm: Stm::IDENTITY,
            });
        }

        let sigma0 = r0.dot(&v0) / sqrt_mu;
        let alpha = 2.0 / r0m - v0.sqr_magnitude() / mu;
        let Universal { chi, u } = self.solve_universal(sqrt_mu, dt, r0m, sigma0, alpha)?;
        let [u0, u1, u2, _, u4, u5] = u;

        let r = r0m * u0 + sigma0 * u1 + u2;
        let f = 1.0 - u2 / r0m;
        let g = (r0m * u1 + sigma0 * u2) / sqrt_mu;
        let fdot = -sqrt_mu * u1 / (r * r0m);
        let gdot = 1.0 - u2 / r;

        let rf = r0 * f + v0 * g;
        let vf = r0 * fdot + v0 * gdot;

        let stm = battin_stm(mu, dt, r0, v0, rf, vf, r, chi, [f, g, fdot, gdot], u2, u4, u5);

        Ok(TwoBodySolution { r: rf, v: vf, stm })
    }

    fn solve_universal(
        &self,
        sqrt_mu: f64,
        dt: f64,
        r0m: f64,
        sigma0: f64,
        alpha: f64,
    ) -> Result<Universal, TwoBodyError> {
        let target = sqrt_mu * dt;
        // Residual of the time-of-flight equation and its slope. Overflowed evaluations
        // are mapped onto the sign they would have had, which keeps the bracket honest
        // for long hyperbolic spans.
        let residual = |chi: f64| -> (f64, f64) {
            let c = stumpff(alpha * chi * chi);
            let u1 = chi * c[1];
            let u2 = chi * chi * c[2];
            let u3 = chi * chi * chi * c[3];
            let f = r0m * u1 + sigma0 * u2 + u3 - target;
            let df = r0m * c[0] + sigma0 * u1 + u2;
            if f.is_finite() {
                (f, df)
            } else {
                (f64::INFINITY.copysign(chi), f64::NAN)
            }
        };

        let guess = initial_guess(sqrt_mu, dt, r0m, sigma0, alpha);
        let (mut lo, mut hi) = if target > 0.0 { (0.0, guess) } else { (guess, 0.0) };
        let mut expansions = 0;
        if target > 0.0 {
            while residual(hi).0 < 0.0 {
                lo = hi;
                hi *= 2.0;
                expansions += 1;
                if expansions > MAX_BRACKET_EXPANSIONS {
                    return Err(TwoBodyError::NoConvergence {
                        iterations: 0,
                        dt,
                        residual: residual(hi).0,
                    });
                }
            }
        } else {
            while residual(lo).0 > 0.0 {
                hi = lo;
                lo *= 2.0;
                expansions += 1;
                if expansions > MAX_BRACKET_EXPANSIONS {
                    return Err(TwoBodyError::NoConvergence {
                        iterations: 0,
                        dt,
                        residual: residual(lo).0,
                    });
                }
            }
        }

        let mut chi = guess.clamp(lo, hi);
        let mut step = hi - lo;
        let mut previous_step = step;
        let mut last_residual = f64::NAN;
        for _ in 0..self.settings.max_iterations {
            let (f, df) = residual(chi);
            last_residual = f;
            if f == 0.0 {
                return Ok(universal_at(chi, alpha));
            }
            if f < 0.0 {
                lo = chi;
            } else {
                hi = chi;
            }

            let newton = chi - f / df;
            let contracting = 2.0 * (newton - chi).abs() <= previous_step.abs();
            let next = if newton.is_finite() && newton > lo && newton < hi && contracting {
                newton
            } else {
                0.5 * (lo + hi)
            };
            previous_step = step;
            step = next - chi;

            let scale = next.abs().max(f64::MIN_POSITIVE);
            if (next - chi).abs() <= CONVERGENCE_TOL * scale
                || (hi - lo) <= CONVERGENCE_TOL * lo.abs().max(hi.abs())
            {
                return Ok(universal_at(next, alpha));
            }
            chi = next;
        }

        Err(TwoBodyError::NoConvergence {
            iterations: self.settings.max_iterations,
            dt,
            residual: last_residual,
        })
    }
}

/// Starting value for `χ`.
///
/// Elliptic orbits use the mean-motion estimate `√μ Δt α`. Hyperbolic orbits use the
/// logarithmic estimate (Vallado, *Fundamentals of Astrodynamics*, algorithm 8), since
/// `χ` only grows with `ln Δt` there. Anything near parabolic, or a hyperbolic estimate
/// that comes out non-finite or with the wrong sign, falls back to `√μ Δt / |r0|`.
fn initial_guess(sqrt_mu: f64, dt: f64, r0m: f64, sigma0: f64, alpha: f64) -> f64 {
    let target = sqrt_mu * dt;
    let fallback = target / r0m;
    let shape = alpha * r0m;
    if shape > PARABOLIC_BAND {
        return target * alpha;
    }
    if shape >= -PARABOLIC_BAND {
        return fallback;
    }

    let mu = sqrt_mu * sqrt_mu;
    let a = 1.0 / alpha;
    let sign = dt.signum();
    let ratio = -2.0 * mu * alpha * dt
        / (sigma0 * sqrt_mu + sign * (-mu * a).sqrt() * (1.0 - r0m * alpha));
    let guess = sign * (-a).sqrt() * ratio.ln();
    if guess.is_finite() && guess * target > 0.0 {
        guess
    } else {
        fallback
    }
}

fn universal_at(chi: f64, alpha: f64) -> Universal {
    let c = stumpff(alpha * chi * chi);
    let mut u = [0.0; 6];
    let mut chi_k = 1.0;
    for (k, slot) in u.iter_mut().enumerate() {
        *slot = chi_k * c[k];
        chi_k *= chi;
    }
    Universal { chi, u }
}

#[allow(clippy::too_many_arguments)]
fn battin_stm(
    mu: f64,
    dt: f64,
    r0: V3,
    v0: V3,
    rf: V3,
    vf: V3,
    r: f64,
    chi: f64,
    [f, g, fdot, gdot]: [f64; 4],
    u2: f64,
    u4: f64,
    u5: f64,
) -> Stm {
    let r0m = r0.magnitude();
    let r0m3 = r0m * r0m * r0m;
    let r3 = r * r * r;
    let sqrt_mu = mu.sqrt();
    let c = (3.0 * u5 - chi * u4) / sqrt_mu - dt * u2;

    let dr = rf - r0;
    let dv = vf - v0;
    let one_minus_f = 1.0 - f;

    let rr = M3::outer(&dv, &dv) * (r / mu)
        + (M3::outer(&rf, &r0) * (r0m * one_minus_f) + M3::outer(&vf, &r0) * c) * (1.0 / r0m3)
        + M3::scaled_identity(f);

    let rv = (M3::outer(&dr, &v0) - M3::outer(&dv, &r0)) * (r0m * one_minus_f / mu)
        + M3::outer(&vf, &v0) * (c / mu)
        + M3::scaled_identity(g);

    let swirl = M3::outer(&rf, &vf) - M3::outer(&vf, &rf);
    let inner = M3::IDENTITY - M3::outer(&rf, &rf) * (1.0 / (r * r))
        + M3::outer(&(swirl * rf), &dv) * (1.0 / (mu * r));
    let vr = M3::outer(&dv, &r0) * (-1.0 / (r0m * r0m)) - M3::outer(&rf, &dv) * (1.0 / (r * r))
        + inner * fdot
        - M3::outer(&rf, &r0) * (mu * c / (r3 * r0m3));

    let vv = M3::outer(&dv, &dv) * (r0m / mu)
        + (M3::outer(&rf, &r0) * (r0m * one_minus_f) - M3::outer(&rf, &v0) * c) * (1.0 / r3)
        + M3::scaled_identity(gdot);

    Stm { rr, rv, vr, vv }
}
