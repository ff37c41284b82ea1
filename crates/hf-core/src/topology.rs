//! Delta topology: per-pair differences over an ordered literal sequence.
//!
//! Literals are raw observations, distinct from field points. Each
//! consecutive pair `(L[i-1], L[i])` yields one [`DeltaRecord`]; record 0 is
//! the anchor consumed by the interaction step.

use serde::{Deserialize, Serialize};

use crate::constants::{DIM, EPSILON, GOLDEN_ANGLE, LITERAL_CAPACITY, PHI, THIRD};
use crate::diagnostics::DiagnosticSink;
use crate::error::{FieldError, Result};
use crate::vector::Vector;

/// Difference data between two consecutive literals.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaRecord {
    pub deltas: Vector,
    pub magnitude: f64,
    /// Unit direction per axis, all zero for a near-zero delta.
    pub directions: Vector,
    pub phase: f64,
    /// Multiplicative mass correction: magnitude · ⅓ / φ.
    pub harmonic_factor: f64,
}

impl DeltaRecord {
    /// Derive the record for the step `from → to`.
    ///
    /// Fails with `InvalidInput` if either literal has a NaN/Inf component or
    /// the delta magnitude overflows.
    pub fn between(from: &Vector, to: &Vector) -> Result<Self> {
        if !from.is_finite() || !to.is_finite() {
            return Err(FieldError::InvalidInput(
                "literal has a non-finite component".into(),
            ));
        }
        let deltas = to.delta(from);
        let magnitude = deltas.magnitude()?;

        let directions = if magnitude < EPSILON {
            Vector::zero()
        } else {
            deltas.scale(1.0 / magnitude)
        };

        Ok(Self {
            deltas,
            magnitude,
            directions,
            phase: harmonic_phase(&deltas),
            harmonic_factor: magnitude * THIRD / PHI,
        })
    }
}

/// Harmonic phase: Σ δₖ · sin((k+1)·golden_angle) / (k+1).
///
/// Linear in the deltas, so it is deterministic and continuous, and zero for
/// a zero delta.
pub fn harmonic_phase(deltas: &Vector) -> f64 {
    (0..DIM)
        .map(|k| {
            let n = (k + 1) as f64;
            deltas[k] * (n * GOLDEN_ANGLE).sin() / n
        })
        .sum()
}

/// Bounded literal sequence plus the records derived from it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeltaTopology {
    literals: Vec<Vector>,
    records: Vec<DeltaRecord>,
    capacity: usize,
}

impl Default for DeltaTopology {
    fn default() -> Self {
        Self {
            literals: Vec::with_capacity(LITERAL_CAPACITY),
            records: Vec::new(),
            capacity: LITERAL_CAPACITY,
        }
    }
}

impl DeltaTopology {
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(FieldError::AllocationFailure(
                "literal capacity must be > 0".into(),
            ));
        }
        let mut literals = Vec::new();
        literals.try_reserve_exact(capacity).map_err(|e| {
            FieldError::AllocationFailure(format!("literal buffer ({capacity}): {e}"))
        })?;
        Ok(Self {
            literals,
            records: Vec::new(),
            capacity,
        })
    }

    /// Append a literal. At capacity the push is a no-op and nothing is evicted.
    pub fn push_literal(&mut self, literal: Vector) -> Result<()> {
        if self.literals.len() >= self.capacity {
            tracing::warn!(capacity = self.capacity, "literal buffer full, push ignored");
            return Err(FieldError::CapacityExceeded {
                structure: "literal buffer",
                capacity: self.capacity,
            });
        }
        self.literals.push(literal);
        Ok(())
    }

    /// Rebuild every record from the literal sequence.
    ///
    /// Pairs touching a non-finite literal are skipped and reported, so the
    /// result may hold fewer than `literal_count() - 1` records.
    pub fn recompute_topology(&mut self, sink: &mut impl DiagnosticSink) -> &[DeltaRecord] {
        self.records.clear();
        for (i, pair) in self.literals.windows(2).enumerate() {
            match DeltaRecord::between(&pair[0], &pair[1]) {
                Ok(record) => self.records.push(record),
                Err(err) => {
                    let err = match err {
                        FieldError::InvalidInput(msg) => {
                            FieldError::InvalidInput(format!("pair {i}->{}: {msg}", i + 1))
                        }
                        other => other,
                    };
                    sink.report_error(&err);
                }
            }
        }
        tracing::debug!(
            literals = self.literals.len(),
            records = self.records.len(),
            "recomputed delta topology"
        );
        &self.records
    }

    /// The first record, shared by every point during interaction.
    pub fn anchor(&self) -> Option<&DeltaRecord> {
        self.records.first()
    }

    pub fn records(&self) -> &[DeltaRecord] {
        &self.records
    }

    pub fn literals(&self) -> &[Vector] {
        &self.literals
    }

    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.literals.clear();
        self.records.clear();
    }
}
