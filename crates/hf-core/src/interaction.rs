//! Interaction step: feedback-coupled energy/mass update.
//!
//! One step moves `Idle → Scored → Interacted`:
//!
//! - **Scored**: coupling is recomputed from registry stability
//!   (`base_coupling · stability`) and the anchor delta record is available.
//! - **Interacted**: every point with priority at or above the confidence
//!   threshold is scaled by `1 + c·anchor.magnitude` (energy) and
//!   `1 + c·anchor.harmonic_factor` (mass).
//!
//! The phase is not stored; after a step the registry is ready for the next.
//! Every qualifying point shares the single anchor record regardless of how
//! many literals exist. Registry order is left alone since priority does not
//! change.

use serde::{Deserialize, Serialize};

use crate::diagnostics::DiagnosticSink;
use crate::error::{FieldError, Result};
use crate::registry::Registry;
use crate::topology::{DeltaRecord, DeltaTopology};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepPhase {
    Idle,
    Scored,
    Interacted,
}

/// Outcome of one interaction step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepReport {
    pub phase: StepPhase,
    pub coupling_factor: f64,
    pub anchor: DeltaRecord,
    /// Multiplier applied to each updated point's energy.
    pub energy_scale: f64,
    /// Multiplier applied to each updated point's mass.
    pub mass_scale: f64,
    pub updated: usize,
    /// Points below the confidence threshold.
    pub skipped: usize,
    /// Tags left unmodified because the update went non-finite.
    pub unstable: Vec<String>,
}

/// Adaptive coupling state carried between steps.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interaction {
    coupling_factor: f64,
    steps: u64,
}

impl Interaction {
    pub fn new(base_coupling: f64) -> Self {
        Self {
            coupling_factor: base_coupling,
            steps: 0,
        }
    }

    /// Coupling used by the most recent step (base coupling before any step).
    pub fn coupling_factor(&self) -> f64 {
        self.coupling_factor
    }

    /// Number of steps that reached `Interacted`.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Advance the registry by one step against the topology anchor.
    ///
    /// Fails with `InsufficientData` (leaving points and coupling untouched)
    /// when there are fewer than two literals or no pair produced a usable
    /// record.
    pub fn step(
        &mut self,
        registry: &mut Registry,
        topology: &mut DeltaTopology,
        sink: &mut impl DiagnosticSink,
    ) -> Result<StepReport> {
        let mut phase = StepPhase::Idle;
        let config = registry.config().clone();

        let c = config.base_coupling * registry.stability();

        if topology.literal_count() < 2 {
            return Err(FieldError::InsufficientData {
                literals: topology.literal_count(),
            });
        }
        topology.recompute_topology(sink);
        let anchor = *topology.anchor().ok_or(FieldError::InsufficientData {
            literals: topology.literal_count(),
        })?;

        self.coupling_factor = c;
        phase = advance(phase, StepPhase::Scored);

        let energy_scale = 1.0 + c * anchor.magnitude;
        let mass_scale = 1.0 + c * anchor.harmonic_factor;

        let mut updated = 0;
        let mut skipped = 0;
        let mut unstable = Vec::new();

        for point in registry.points_mut() {
            if point.priority < config.confidence_threshold {
                skipped += 1;
                continue;
            }
            let energy = point.energy * energy_scale;
            let mass = point.mass * mass_scale;
            if !energy.is_finite() || !mass.is_finite() {
                sink.report_error(&FieldError::NumericalInstability(format!(
                    "point '{}': energy {energy}, mass {mass}",
                    point.tag
                )));
                unstable.push(point.tag.clone());
                continue;
            }
            point.energy = energy;
            point.mass = mass;
            updated += 1;
        }

        phase = advance(phase, StepPhase::Interacted);
        self.steps += 1;

        Ok(StepReport {
            phase,
            coupling_factor: c,
            anchor,
            energy_scale,
            mass_scale,
            updated,
            skipped,
            unstable,
        })
    }
}

fn advance(from: StepPhase, to: StepPhase) -> StepPhase {
    tracing::debug!(?from, ?to, "interaction phase");
    to
}
