//! Cubic Hermite interpolant over sampled state vectors.
//!
//! Each sample stores the state and its time derivative, so every component is
//! reconstructed between neighbouring samples from both values and slopes. Evaluation
//! holds no cursor state; any number of queries may run in any order.

use thiserror::Error;

use crate::state::StateVector;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    #[error("interpolant has no samples")]
    Empty,
    #[error("time {t} lies outside the sampled span [{start}, {end}]")]
    OutOfRange { t: f64, start: f64, end: f64 },
    #[error("sample time {t} does not follow previous sample at {previous}")]
    NonMonotonic { t: f64, previous: f64 },
}

/// One recorded point: time, state, and state derivative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub t: f64,
    pub y: StateVector,
    pub yp: StateVector,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interpolant {
    samples: Vec<Sample>,
}

impl Interpolant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Append a sample. Times must be strictly increasing.
    pub fn push(
        &mut self,
        t: f64,
        y: StateVector,
        yp: StateVector,
    ) -> Result<(), InterpolationError> {
        if let Some(last) = self.samples.last() {
            if !(t > last.t) {
                return Err(InterpolationError::NonMonotonic {
                    t,
                    previous: last.t,
                });
            }
        }
        self.samples.push(Sample { t, y, yp });
        Ok(())
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn start(&self) -> Option<f64> {
        self.samples.first().map(|s| s.t)
    }

    pub fn end(&self) -> Option<f64> {
        self.samples.last().map(|s| s.t)
    }

    /// Interpolated state at `t`; exact at sample times.
    pub fn evaluate(&self, t: f64) -> Result<StateVector, InterpolationError> {
        let (first, last) = match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(InterpolationError::Empty),
        };
        if !(t >= first.t && t <= last.t) {
            return Err(InterpolationError::OutOfRange {
                t,
                start: first.t,
                end: last.t,
            });
        }
        if self.samples.len() == 1 {
            return Ok(first.y);
        }

        let upper = self.samples.partition_point(|s| s.t <= t);
        let k = upper.saturating_sub(1).min(self.samples.len() - 2);
        Ok(hermite(&self.samples[k], &self.samples[k + 1], t))
    }
}

fn hermite(a: &Sample, b: &Sample, t: f64) -> StateVector {
    let h = b.t - a.t;
    let s = (t - a.t) / h;
    let s2 = s * s;
    let s3 = s2 * s;

    let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
    let h10 = s3 - 2.0 * s2 + s;
    let h01 = -2.0 * s3 + 3.0 * s2;
    let h11 = s3 - s2;

    let (y0, d0) = (a.y.to_array(), a.yp.to_array());
    let (y1, d1) = (b.y.to_array(), b.yp.to_array());
    let mut out = [0.0; StateVector::LEN];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = h00 * y0[i] + h10 * h * d0[i] + h01 * y1[i] + h11 * h * d1[i];
    }
    StateVector::from_array(&out)
}
