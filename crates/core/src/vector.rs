//! Fixed-size 3-vector and 3x3-matrix value types.
//!
//! Both types are `Copy` and carry no heap state. Magnitude and normalisation
//! factor out the largest component first so that vectors with components near
//! the limits of `f64` neither overflow nor underflow.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Index, IndexMut, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Cartesian 3-vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct V3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl V3 {
    pub const ZERO: V3 = V3::new(0.0, 0.0, 0.0);
    pub const X: V3 = V3::new(1.0, 0.0, 0.0);
    pub const Y: V3 = V3::new(0.0, 1.0, 0.0);
    pub const Z: V3 = V3::new(0.0, 0.0, 1.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Build a vector from the first three elements of a slice.
    ///
    /// Panics if `s` holds fewer than three elements.
    #[inline]
    pub fn from_slice(s: &[f64]) -> Self {
        Self::new(s[0], s[1], s[2])
    }

    /// Write the components into the first three slots of `out`.
    #[inline]
    pub fn copy_to(&self, out: &mut [f64]) {
        out[0] = self.x;
        out[1] = self.y;
        out[2] = self.z;
    }

    #[inline]
    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    #[inline]
    pub fn dot(&self, other: &V3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(&self, other: &V3) -> V3 {
        V3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Cross product with each component evaluated as a compensated difference of
    /// products, so nearly parallel inputs keep their low-order bits.
    pub fn precise_cross(&self, other: &V3) -> V3 {
        V3::new(
            diff_of_products(self.y, other.z, self.z, other.y),
            diff_of_products(self.z, other.x, self.x, other.z),
            diff_of_products(self.x, other.y, self.y, other.x),
        )
    }

    /// Squared Euclidean norm (not scale robust).
    #[inline]
    pub fn sqr_magnitude(&self) -> f64 {
        self.dot(self)
    }

    /// Euclidean norm, scale robust.
    pub fn magnitude(&self) -> f64 {
        let max = self.max_magnitude();
        if max == 0.0 || !max.is_finite() {
            return max;
        }
        let scaled = *self / max;
        max * scaled.sqr_magnitude().sqrt()
    }

    /// Unit vector in the same direction; the zero vector normalises to itself.
    pub fn normalized(&self) -> V3 {
        let max = self.max_magnitude();
        if max == 0.0 {
            return V3::ZERO;
        }
        let scaled = *self / max;
        scaled / scaled.sqr_magnitude().sqrt()
    }

    /// Smallest absolute component.
    #[inline]
    pub fn min_magnitude(&self) -> f64 {
        self[self.min_magnitude_index()].abs()
    }

    /// Largest absolute component.
    #[inline]
    pub fn max_magnitude(&self) -> f64 {
        self[self.max_magnitude_index()].abs()
    }

    /// Index of the smallest absolute component (first occurrence on ties).
    pub fn min_magnitude_index(&self) -> usize {
        let mut best = 0;
        for i in 1..3 {
            if self[i].abs() < self[best].abs() {
                best = i;
            }
        }
        best
    }

    /// Index of the largest absolute component (first occurrence on ties).
    pub fn max_magnitude_index(&self) -> usize {
        let mut best = 0;
        for i in 1..3 {
            if self[i].abs() > self[best].abs() {
                best = i;
            }
        }
        best
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// `a·b − c·d` via Kahan's fused-multiply-add scheme; error within 1.5 ulp.
#[inline]
fn diff_of_products(a: f64, b: f64, c: f64, d: f64) -> f64 {
    let cd = c * d;
    let err = (-c).mul_add(d, cd);
    a.mul_add(b, -cd) + err
}

impl From<[f64; 3]> for V3 {
    fn from(a: [f64; 3]) -> Self {
        V3::new(a[0], a[1], a[2])
    }
}

impl From<V3> for [f64; 3] {
    fn from(v: V3) -> Self {
        v.to_array()
    }
}

impl fmt::Display for V3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:e}, {:e}, {:e}]", self.x, self.y, self.z)
    }
}

impl Index<usize> for V3 {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("V3 index out of range: {i}"),
        }
    }
}

impl IndexMut<usize> for V3 {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        match i {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("V3 index out of range: {i}"),
        }
    }
}

impl Add for V3 {
    type Output = V3;

    #[inline]
    fn add(self, o: V3) -> V3 {
        V3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl AddAssign for V3 {
    #[inline]
    fn add_assign(&mut self, o: V3) {
        *self = *self + o;
    }
}

impl Sub for V3 {
    type Output = V3;

    #[inline]
    fn sub(self, o: V3) -> V3 {
        V3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl SubAssign for V3 {
    #[inline]
    fn sub_assign(&mut self, o: V3) {
        *self = *self - o;
    }
}

impl Neg for V3 {
    type Output = V3;

    #[inline]
    fn neg(self) -> V3 {
        V3::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for V3 {
    type Output = V3;

    #[inline]
    fn mul(self, s: f64) -> V3 {
        V3::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul<V3> for f64 {
    type Output = V3;

    #[inline]
    fn mul(self, v: V3) -> V3 {
        v * self
    }
}

impl Div<f64> for V3 {
    type Output = V3;

    #[inline]
    fn div(self, s: f64) -> V3 {
        V3::new(self.x / s, self.y / s, self.z / s)
    }
}

/// Row-major 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct M3 {
    pub rows: [[f64; 3]; 3],
}

impl M3 {
    pub const ZERO: M3 = M3 { rows: [[0.0; 3]; 3] };
    pub const IDENTITY: M3 = M3 {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    #[inline]
    pub const fn new(rows: [[f64; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Diagonal matrix `s·I`.
    #[inline]
    pub fn scaled_identity(s: f64) -> Self {
        M3::IDENTITY * s
    }

    /// Outer product `a bᵀ`.
    pub fn outer(a: &V3, b: &V3) -> Self {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = a[i] * b[j];
            }
        }
        M3 { rows }
    }

    pub fn transpose(&self) -> Self {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = self.rows[j][i];
            }
        }
        M3 { rows }
    }

    #[inline]
    pub fn row(&self, i: usize) -> V3 {
        V3::from(self.rows[i])
    }

    pub fn is_finite(&self) -> bool {
        self.rows.iter().flatten().all(|c| c.is_finite())
    }
}

impl Index<(usize, usize)> for M3 {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.rows[i][j]
    }
}

impl IndexMut<(usize, usize)> for M3 {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.rows[i][j]
    }
}

impl Mul<V3> for M3 {
    type Output = V3;

    #[inline]
    fn mul(self, v: V3) -> V3 {
        V3::new(self.row(0).dot(&v), self.row(1).dot(&v), self.row(2).dot(&v))
    }
}

impl Mul<M3> for M3 {
    type Output = M3;

    fn mul(self, o: M3) -> M3 {
        let mut rows = [[0.0; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.rows[i][k] * o.rows[k][j]).sum();
            }
        }
        M3 { rows }
    }
}

impl Mul<f64> for M3 {
    type Output = M3;

    fn mul(self, s: f64) -> M3 {
        let mut out = self;
        out.rows.iter_mut().flatten().for_each(|c| *c *= s);
        out
    }
}

impl Add for M3 {
    type Output = M3;

    fn add(self, o: M3) -> M3 {
        let mut out = self;
        for (a, b) in out.rows.iter_mut().flatten().zip(o.rows.iter().flatten()) {
            *a += b;
        }
        out
    }
}

impl Sub for M3 {
    type Output = M3;

    fn sub(self, o: M3) -> M3 {
        self + o * -1.0
    }
}

impl Neg for M3 {
    type Output = M3;

    fn neg(self) -> M3 {
        self * -1.0
    }
}
