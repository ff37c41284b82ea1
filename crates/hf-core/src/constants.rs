/// Dimensionality of every field vector.
pub const DIM: usize = 11;

/// Golden ratio: (1 + √5) / 2
pub const PHI: f64 = 1.618_033_988_749_895;

/// Inverse golden ratio: 1 / φ. Scales position magnitude into energy.
pub const ENERGY_FACTOR: f64 = 0.618_033_988_749_895;

/// Golden angle in radians: 2π / φ²
pub const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653_3;

/// One third, used by the harmonic factor.
pub const THIRD: f64 = 1.0 / 3.0;

/// Numerical epsilon for near-zero comparisons
pub const EPSILON: f64 = 1e-10;

/// Maximum number of field points held by a registry.
pub const REGISTRY_CAPACITY: usize = 100;

/// Maximum number of literals held by the delta topology engine.
pub const LITERAL_CAPACITY: usize = 50;

/// Maximum tag length in bytes.
pub const MAX_TAG_LEN: usize = 31;

/// Base coupling between stability and the interaction step.
pub const BASE_COUPLING: f64 = 0.125;

/// Scores below this are dampened; points below this skip interaction.
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Multiplier applied to low-confidence scores.
pub const LOW_CONFIDENCE_DAMPING: f64 = 0.8;

/// Energy variance below this counts as a stable registry.
pub const STABILITY_TOLERANCE: f64 = 1e-6;

/// Stability signal for a low-variance registry.
pub const STABLE: f64 = 1.0;

/// Stability signal for a high-variance registry.
pub const UNSTABLE: f64 = 0.5;

/// Reference mass: a point of this mass scores 1.0 on the mass axis.
pub const MASS_REFERENCE: f64 = 2.0;

/// Maximum pending requests in a reclamation stack.
pub const MAX_RECLAIM_ENTRIES: usize = 1024;

/// Occupancy ratio above which the reclamation stack reports high pressure.
pub const PRESSURE_THRESHOLD: f64 = 0.9;

/// Pressure signal above the occupancy threshold.
pub const HIGH_PRESSURE: f64 = 0.9;

/// Pressure signal at or below the occupancy threshold.
pub const LOW_PRESSURE: f64 = 0.5;

/// Allocation size (bytes) at which the size factor saturates.
pub const SIZE_REFERENCE: usize = 1024;

/// Size factor for allocations above `SIZE_REFERENCE`.
pub const LARGE_SIZE_FACTOR: f64 = 0.9;

/// Reference factor for multiply-referenced resources.
pub const SHARED_REF_FACTOR: f64 = 0.7;

/// Reference factor for singly-referenced resources.
pub const SINGLE_REF_FACTOR: f64 = 0.3;

/// Diagnostic history retained by `DiagnosticLog`.
pub const DIAGNOSTIC_HISTORY: usize = 16;
