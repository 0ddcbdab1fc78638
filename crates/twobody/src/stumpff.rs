//! Stumpff functions `c0(ψ) … c5(ψ)` for the universal-variable formulation.
//!
//! `c_k(ψ) = Σ_j (-ψ)^j / (k + 2j)!`. Near `ψ = 0` the closed forms lose precision to
//! cancellation, so a power series is used inside [`SERIES_BAND`]; outside it the
//! trigonometric (elliptic, `ψ > 0`) or hyperbolic (`ψ < 0`) forms are used together with
//! the recurrence `c_k = 1/k! − ψ c_{k+2}`.

/// Half-width of the band around `ψ = 0` evaluated by power series.
const SERIES_BAND: f64 = 0.5;

/// Hard cap on series terms; `|ψ| < 0.5` needs well under twenty.
const MAX_SERIES_TERMS: usize = 40;

/// Number of Stumpff functions returned (`c0` through `c5`).
pub const STUMPFF_COUNT: usize = 6;

/// Evaluate `[c0, c1, c2, c3, c4, c5]` at `psi`.
pub fn stumpff(psi: f64) -> [f64; STUMPFF_COUNT] {
    if psi.abs() < SERIES_BAND {
        return stumpff_series(psi);
    }

    let (c0, c1) = if psi > 0.0 {
        let s = psi.sqrt();
        (s.cos(), s.sin() / s)
    } else {
        let s = (-psi).sqrt();
        (s.cosh(), s.sinh() / s)
    };
    let c2 = (1.0 - c0) / psi;
    let c3 = (1.0 - c1) / psi;
    let c4 = (0.5 - c2) / psi;
    let c5 = (1.0 / 6.0 - c3) / psi;
    [c0, c1, c2, c3, c4, c5]
}

fn stumpff_series(psi: f64) -> [f64; STUMPFF_COUNT] {
    let mut out = [0.0; STUMPFF_COUNT];
    let mut inv_factorial = 1.0; // 1/k!
    for (k, slot) in out.iter_mut().enumerate() {
        if k > 0 {
            inv_factorial /= k as f64;
        }
        let mut term = inv_factorial;
        let mut sum = term;
        for j in 0..MAX_SERIES_TERMS {
            let n = (k + 2 * j) as f64;
            term *= -psi / ((n + 1.0) * (n + 2.0));
            sum += term;
            if term.abs() <= f64::EPSILON * sum.abs() {
                break;
            }
        }
        *slot = sum;
    }
    out
}
