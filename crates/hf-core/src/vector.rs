use std::ops::{Index, IndexMut, Neg};

use serde::{Deserialize, Serialize};

use crate::constants::{DIM, EPSILON};
use crate::error::{FieldError, Result};

/// Point or displacement in the 11-dimensional field space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector(pub [f64; DIM]);

impl Vector {
    pub fn zero() -> Self {
        Self([0.0; DIM])
    }

    /// Every axis set to `value`.
    pub fn splat(value: f64) -> Self {
        Self([value; DIM])
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    /// Euclidean norm. NaN/Inf components are rejected, never coerced.
    pub fn magnitude(&self) -> Result<f64> {
        if let Some(axis) = self.0.iter().position(|c| !c.is_finite()) {
            return Err(FieldError::InvalidInput(format!(
                "non-finite component {} on axis {axis}",
                self.0[axis]
            )));
        }
        let mag = self.0.iter().map(|c| c * c).sum::<f64>().sqrt();
        if !mag.is_finite() {
            return Err(FieldError::InvalidInput(format!(
                "magnitude overflowed to {mag}"
            )));
        }
        Ok(mag)
    }

    /// Per-axis `self - other`.
    pub fn delta(&self, other: &Self) -> Self {
        let mut out = [0.0; DIM];
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = self.0[k] - other.0[k];
        }
        Self(out)
    }

    /// Unit vector in the same direction. Zero vector if near-zero or non-finite.
    pub fn normalize(&self) -> Self {
        match self.magnitude() {
            Ok(mag) if mag >= EPSILON => self.scale(1.0 / mag),
            _ => Self::zero(),
        }
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self(self.0.map(|c| c * factor))
    }

    pub fn to_array(self) -> [f64; DIM] {
        self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }
}

/// Free-function form of [`Vector::magnitude`].
pub fn magnitude(v: &Vector) -> Result<f64> {
    v.magnitude()
}

/// Free-function form of [`Vector::delta`]: `a - b`.
pub fn delta(a: &Vector, b: &Vector) -> Vector {
    a.delta(b)
}

impl From<[f64; DIM]> for Vector {
    fn from(arr: [f64; DIM]) -> Self {
        Self(arr)
    }
}

impl TryFrom<&[f64]> for Vector {
    type Error = FieldError;

    fn try_from(slice: &[f64]) -> Result<Self> {
        let arr: [f64; DIM] = slice.try_into().map_err(|_| {
            FieldError::InvalidInput(format!(
                "expected {DIM} components, got {}",
                slice.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl Index<usize> for Vector {
    type Output = f64;

    fn index(&self, axis: usize) -> &f64 {
        &self.0[axis]
    }
}

impl IndexMut<usize> for Vector {
    fn index_mut(&mut self, axis: usize) -> &mut f64 {
        &mut self.0[axis]
    }
}

impl Neg for Vector {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.map(|c| -c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_magnitude_of_ones() {
        let v = Vector::splat(1.0);
        assert_relative_eq!(v.magnitude().unwrap(), 11f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_magnitude_rejects_nan_and_inf() {
        let mut v = Vector::splat(1.0);
        v[3] = f64::NAN;
        assert!(matches!(v.magnitude(), Err(FieldError::InvalidInput(_))));

        let mut w = Vector::splat(1.0);
        w[10] = f64::NEG_INFINITY;
        assert!(matches!(w.magnitude(), Err(FieldError::InvalidInput(_))));
    }

    #[test]
    fn test_magnitude_overflow_is_invalid() {
        let v = Vector::splat(f64::MAX);
        assert!(v.magnitude().is_err());
    }

    #[test]
    fn test_delta_per_axis() {
        let a = Vector::splat(2.0);
        let b = Vector::splat(1.0);
        assert_eq!(delta(&a, &b), Vector::splat(1.0));
        assert_eq!(delta(&b, &a), Vector::splat(-1.0));
    }

    #[test]
    fn test_normalize_unit_length() {
        let mut v = Vector::zero();
        v[0] = 3.0;
        v[1] = 4.0;
        let n = v.normalize();
        assert_relative_eq!(n.magnitude().unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(n[0], 0.6, epsilon = 1e-12);
        assert_relative_eq!(n[1], 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_equality_is_exact() {
        let a = Vector::splat(1.0);
        let mut b = a;
        b[5] += 1e-12;
        assert_ne!(a, b);
        assert_relative_eq!(a[5], b[5], epsilon = 1e-9);
        assert_eq!(a, Vector::splat(1.0));
    }

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(Vector::zero().normalize(), Vector::zero());
    }

    #[test]
    fn test_negation_preserves_magnitude() {
        let v = Vector::from([10.0, -10.0, 10.0, -10.0, 10.0, -10.0, 10.0, -10.0, 10.0, -10.0, 10.0]);
        assert_relative_eq!(
            v.magnitude().unwrap(),
            (-v).magnitude().unwrap(),
            epsilon = 1e-12
        );
        assert_relative_eq!(v.magnitude().unwrap(), 1100f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_try_from_slice_length() {
        let ok: &[f64] = &[0.0; 11];
        assert!(Vector::try_from(ok).is_ok());
        let short: &[f64] = &[0.0; 4];
        assert!(Vector::try_from(short).is_err());
    }
}
