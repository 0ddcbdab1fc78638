//! Time-indexed trajectory assembled from propagated arcs.

use coast_core::V3;
use thiserror::Error;

use crate::interpolant::{InterpolationError, Interpolant};
use crate::phase::Phase;
use crate::state::StateVector;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolutionError {
    #[error("segment span [{t0}, {tf}] is empty or reversed")]
    EmptySpan { t0: f64, tf: f64 },
    #[error("segment starting at {t0} precedes the previous segment start {previous}")]
    OutOfOrder { t0: f64, previous: f64 },
    #[error("interpolant does not cover the segment span [{t0}, {tf}]")]
    Coverage { t0: f64, tf: f64 },
    #[error("no segment covers t = {0}")]
    NotCovered(f64),
    #[error("interpolation failed: {0}")]
    Interpolation(#[from] InterpolationError),
}

/// One propagated arc: its time span, phase tag, and sampled interpolant.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    t0: f64,
    tf: f64,
    phase: Phase,
    interpolant: Interpolant,
}

impl Segment {
    pub fn t0(&self) -> f64 {
        self.t0
    }

    pub fn tf(&self) -> f64 {
        self.tf
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn interpolant(&self) -> &Interpolant {
        &self.interpolant
    }

    pub fn contains(&self, t: f64) -> bool {
        t >= self.t0 && t <= self.tf
    }

    pub fn state_at(&self, t: f64) -> Result<StateVector, InterpolationError> {
        self.interpolant.evaluate(t)
    }
}

/// Append-only list of segments ordered by start time.
///
/// Segments may overlap; a query inside an overlap is answered by the segment appended
/// last.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Solution {
    segments: Vec<Segment>,
}

impl Solution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment spanning `[t0, tf]`.
    pub fn add_segment(
        &mut self,
        t0: f64,
        tf: f64,
        interpolant: Interpolant,
        phase: Phase,
    ) -> Result<(), SolutionError> {
        if !(tf > t0) {
            return Err(SolutionError::EmptySpan { t0, tf });
        }
        if let Some(previous) = self.segments.last() {
            if t0 < previous.t0 {
                return Err(SolutionError::OutOfOrder {
                    t0,
                    previous: previous.t0,
                });
            }
        }
        match (interpolant.start(), interpolant.end()) {
            (Some(start), Some(end)) if start <= t0 && end >= tf => {}
            _ => return Err(SolutionError::Coverage { t0, tf }),
        }

        self.segments.push(Segment {
            t0,
            tf,
            phase,
            interpolant,
        });
        Ok(())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Start of the first segment.
    pub fn t0(&self) -> Option<f64> {
        self.segments.first().map(Segment::t0)
    }

    /// Latest end time of any segment.
    pub fn tf(&self) -> Option<f64> {
        self.segments.iter().map(Segment::tf).reduce(f64::max)
    }

    /// Index of the segment answering queries at `t` (last appended wins).
    pub fn segment_index(&self, t: f64) -> Option<usize> {
        self.segments.iter().rposition(|s| s.contains(t))
    }

    pub fn segment_at(&self, t: f64) -> Result<&Segment, SolutionError> {
        self.segment_index(t)
            .map(|i| &self.segments[i])
            .ok_or(SolutionError::NotCovered(t))
    }

    pub fn state_at(&self, t: f64) -> Result<StateVector, SolutionError> {
        Ok(self.segment_at(t)?.state_at(t)?)
    }

    pub fn phase_at(&self, t: f64) -> Result<&Phase, SolutionError> {
        Ok(self.segment_at(t)?.phase())
    }

    pub fn r(&self, t: f64) -> Result<V3, SolutionError> {
        Ok(self.state_at(t)?.r)
    }

    pub fn v(&self, t: f64) -> Result<V3, SolutionError> {
        Ok(self.state_at(t)?.v)
    }

    pub fn pv(&self, t: f64) -> Result<V3, SolutionError> {
        Ok(self.state_at(t)?.pv)
    }

    pub fn pr(&self, t: f64) -> Result<V3, SolutionError> {
        Ok(self.state_at(t)?.pr)
    }

    /// Time remaining from `t` to the end of the solution.
    pub fn time_to_go(&self, t: f64) -> Option<f64> {
        self.tf().map(|tf| tf - t)
    }
}
