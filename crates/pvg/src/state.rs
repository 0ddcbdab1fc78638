//! State vector layout shared by the coast propagator and the packed solver buffers.

use coast_core::{M3, V3};
use serde::{Deserialize, Serialize};

use crate::LayoutError;

/// Spacecraft state with its attached costates.
///
/// The packed form is `LEN` doubles at the fixed, disjoint offsets below.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StateVector {
    /// Position.
    pub r: V3,
    /// Velocity.
    pub v: V3,
    /// Velocity costate (primer vector).
    #[serde(default)]
    pub pv: V3,
    /// Position costate.
    #[serde(default)]
    pub pr: V3,
    /// Mass costate.
    #[serde(default)]
    pub pm: f64,
    /// Accumulated delta-v.
    #[serde(default)]
    pub dv: f64,
}

impl StateVector {
    pub const LEN: usize = 14;

    pub const R: usize = 0;
    pub const V: usize = 3;
    pub const PV: usize = 6;
    pub const PR: usize = 9;
    pub const PM: usize = 12;
    pub const DV: usize = 13;

    /// State with zero costates and no accumulated delta-v.
    pub fn from_rv(r: V3, v: V3) -> Self {
        Self {
            r,
            v,
            ..Self::default()
        }
    }

    /// Decode the first `LEN` slots of a packed buffer.
    pub fn from_slice(buf: &[f64]) -> Result<Self, LayoutError> {
        let buf = buf.get(..Self::LEN).ok_or(LayoutError::TooShort {
            expected: Self::LEN,
            actual: buf.len(),
        })?;
        Ok(Self {
            r: V3::from_slice(&buf[Self::R..]),
            v: V3::from_slice(&buf[Self::V..]),
            pv: V3::from_slice(&buf[Self::PV..]),
            pr: V3::from_slice(&buf[Self::PR..]),
            pm: buf[Self::PM],
            dv: buf[Self::DV],
        })
    }

    /// Encode into the first `LEN` slots of a packed buffer, leaving the rest untouched.
    pub fn write_to(&self, buf: &mut [f64]) -> Result<(), LayoutError> {
        let actual = buf.len();
        let buf = buf.get_mut(..Self::LEN).ok_or(LayoutError::TooShort {
            expected: Self::LEN,
            actual,
        })?;
        self.r.copy_to(&mut buf[Self::R..]);
        self.v.copy_to(&mut buf[Self::V..]);
        self.pv.copy_to(&mut buf[Self::PV..]);
        self.pr.copy_to(&mut buf[Self::PR..]);
        buf[Self::PM] = self.pm;
        buf[Self::DV] = self.dv;
        Ok(())
    }

    pub fn to_array(&self) -> [f64; Self::LEN] {
        let mut out = [0.0; Self::LEN];
        // length is fixed by the array type
        let _ = self.write_to(&mut out);
        out
    }

    pub fn from_array(a: &[f64; Self::LEN]) -> Self {
        Self {
            r: V3::from_slice(&a[Self::R..]),
            v: V3::from_slice(&a[Self::V..]),
            pv: V3::from_slice(&a[Self::PV..]),
            pr: V3::from_slice(&a[Self::PR..]),
            pm: a[Self::PM],
            dv: a[Self::DV],
        }
    }

    /// Time derivative along an unpowered two-body arc.
    ///
    /// The costate pair obeys the variational equations of the coast, `pv' = pr` and
    /// `pr' = G(r)·pv` with the gravity gradient `G = μ(3 r̂ r̂ᵀ − I)/|r|³`. Mass costate
    /// and accumulated delta-v are constant.
    pub fn coast_derivative(&self, mu: f64) -> StateVector {
        let rm = self.r.magnitude();
        let r3 = rm * rm * rm;
        let r_hat = self.r / rm;
        let gravity_gradient = (M3::outer(&r_hat, &r_hat) * 3.0 - M3::IDENTITY) * (mu / r3);
        StateVector {
            r: self.v,
            v: self.r * (-mu / r3),
            pv: self.pr,
            pr: gravity_gradient * self.pv,
            pm: 0.0,
            dv: 0.0,
        }
    }
}
