//! Fuzzy-AND priority scoring shared by the registry and the reclamation stack.
//!
//! A composite score is the pointwise minimum of several normalized factors:
//! it is only high when every factor is high at once. Scores that land under
//! the confidence threshold are dampened so a single borderline snapshot
//! cannot masquerade as a confident one.

use crate::constants::{CONFIDENCE_THRESHOLD, LOW_CONFIDENCE_DAMPING};

/// Confidence gate applied after the fuzzy AND.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Confidence {
    pub threshold: f64,
    pub damping: f64,
}

impl Default for Confidence {
    fn default() -> Self {
        Self {
            threshold: CONFIDENCE_THRESHOLD,
            damping: LOW_CONFIDENCE_DAMPING,
        }
    }
}

impl Confidence {
    /// Scale `score` by the damping factor if it falls under the threshold.
    pub fn dampen(&self, score: f64) -> f64 {
        if score < self.threshold {
            score * self.damping
        } else {
            score
        }
    }

    /// Fuzzy AND of `factors`, then dampened. Factors are clamped to [0, 1].
    pub fn score(&self, factors: &[f64]) -> f64 {
        self.dampen(fuzzy_and(factors))
    }
}

/// Pointwise minimum of factors clamped to [0, 1]. NaN factors count as 0;
/// an empty factor list is 0.
pub fn fuzzy_and(factors: &[f64]) -> f64 {
    if factors.is_empty() {
        return 0.0;
    }
    factors
        .iter()
        .map(|f| if f.is_nan() { 0.0 } else { f.clamp(0.0, 1.0) })
        .fold(1.0, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fuzzy_and_is_min() {
        assert_relative_eq!(fuzzy_and(&[0.9, 0.4, 0.7]), 0.4);
        assert_relative_eq!(fuzzy_and(&[1.0]), 1.0);
    }

    #[test]
    fn test_fuzzy_and_clamps() {
        assert_relative_eq!(fuzzy_and(&[3.0, 2.0]), 1.0);
        assert_relative_eq!(fuzzy_and(&[-1.0, 0.5]), 0.0);
        assert_relative_eq!(fuzzy_and(&[f64::NAN, 0.5]), 0.0);
        assert_relative_eq!(fuzzy_and(&[]), 0.0);
    }

    #[test]
    fn test_dampen_below_threshold_only() {
        let c = Confidence::default();
        assert_relative_eq!(c.dampen(0.5), 0.4);
        assert_relative_eq!(c.dampen(0.7), 0.7);
        assert_relative_eq!(c.dampen(0.95), 0.95);
    }

    #[test]
    fn test_score_combines() {
        let c = Confidence::default();
        assert_relative_eq!(c.score(&[1.0, 0.5, 1.0]), 0.4);
        assert_relative_eq!(c.score(&[1.0, 1.0, 1.0]), 1.0);
    }
}
