//! Higgs field engine.
//!
//! A bounded, priority-sorted registry of 11-dimensional field points whose
//! energy and mass evolve through a stability-coupled interaction step, fed by
//! a delta topology over raw literal observations. Alongside it, a deferred
//! reclamation stack scores retiring resources and releases them in bulk once
//! occupancy pressure is high.
//!
//! Zero I/O. Diagnostics go to a caller-supplied sink and to `tracing`.

pub mod config;
pub mod constants;
pub mod diagnostics;
pub mod error;
pub mod interaction;
pub mod reclaim;
pub mod registry;
pub mod scoring;
pub mod snapshot;
pub mod system;
pub mod topology;
pub mod vector;

pub use config::{FieldConfig, ReclaimConfig};
pub use constants::{
    BASE_COUPLING, CONFIDENCE_THRESHOLD, DIM, ENERGY_FACTOR, EPSILON, LITERAL_CAPACITY,
    MAX_RECLAIM_ENTRIES, PHI, REGISTRY_CAPACITY,
};
pub use diagnostics::{Category, Diagnostic, DiagnosticLog, DiagnosticSink, Severity};
pub use error::{FieldError, Result};
pub use interaction::{Interaction, StepPhase, StepReport};
pub use reclaim::{CascadeOutcome, ReclaimRequest, ReclamationStack, ResourcePool, ResourceReleaser};
pub use registry::{FieldPoint, Registry};
pub use scoring::{Confidence, fuzzy_and};
pub use snapshot::{FieldSnapshot, PointSnapshot};
pub use system::{FieldSystem, Injection};
pub use topology::{DeltaRecord, DeltaTopology};
pub use vector::{Vector, delta, magnitude};
