use uuid::Uuid;

use crate::config::{FieldConfig, ReclaimConfig};
use crate::diagnostics::{DiagnosticLog, DiagnosticSink};
use crate::error::{FieldError, Result};
use crate::interaction::{Interaction, StepReport};
use crate::reclaim::{CascadeOutcome, ReclamationStack, ResourcePool};
use crate::registry::{FieldPoint, Registry};
use crate::snapshot::{FieldSnapshot, PointSnapshot};
use crate::topology::DeltaTopology;
use crate::vector::Vector;

/// Result injected for a tagged point by [`FieldSystem::shoot_over`].
///
/// `handle` names the retained copy queued for deferred release.
#[derive(Clone, Debug, PartialEq)]
pub struct Injection {
    pub tag: String,
    pub energy: f64,
    pub mass: f64,
    pub handle: Uuid,
}

/// Owned simulation context: registry, literal topology, coupling state,
/// the injected results awaiting release, and the diagnostics they report
/// into.
///
/// Independent instances share nothing, so several simulations can run side
/// by side.
#[derive(Debug)]
pub struct FieldSystem {
    registry: Registry,
    topology: DeltaTopology,
    interaction: Interaction,
    results: ResourcePool,
    retired: ReclamationStack<Uuid>,
    diagnostics: DiagnosticLog,
}

impl FieldSystem {
    pub fn new(config: FieldConfig) -> Result<Self> {
        Self::with_reclaim(config, ReclaimConfig::default())
    }

    pub fn with_reclaim(config: FieldConfig, reclaim: ReclaimConfig) -> Result<Self> {
        config.validate()?;
        let topology = DeltaTopology::with_capacity(config.literal_capacity)?;
        let interaction = Interaction::new(config.base_coupling);
        let registry = Registry::new(config)?;
        let retired = ReclamationStack::new(reclaim)?;
        Ok(Self {
            registry,
            topology,
            interaction,
            results: ResourcePool::new(),
            retired,
            diagnostics: DiagnosticLog::default(),
        })
    }

    /// Insert a field point and record its position as a literal.
    ///
    /// A full literal buffer is reported but does not undo the insertion.
    pub fn add_point(&mut self, position: Vector, mass: f64, tag: &str) -> Result<usize> {
        let index = self.insert(position, mass, tag)?;
        if let Err(err) = self.topology.push_literal(position) {
            self.diagnostics.report_error(&err);
        }
        Ok(index)
    }

    /// Insert into the registry only.
    pub fn insert(&mut self, position: Vector, mass: f64, tag: &str) -> Result<usize> {
        self.registry
            .insert(position, mass, tag)
            .inspect_err(|err| self.diagnostics.report_error(err))
    }

    pub fn push_literal(&mut self, literal: Vector) -> Result<()> {
        self.topology
            .push_literal(literal)
            .inspect_err(|err| self.diagnostics.report_error(err))
    }

    pub fn recompute_topology(&mut self) -> usize {
        self.topology.recompute_topology(&mut self.diagnostics).len()
    }

    /// Run one interaction step.
    pub fn step(&mut self) -> Result<StepReport> {
        self.interaction
            .step(&mut self.registry, &mut self.topology, &mut self.diagnostics)
            .inspect_err(|err| self.diagnostics.report_error(err))
    }

    pub fn stability(&self) -> f64 {
        self.registry.stability()
    }

    pub fn coupling_factor(&self) -> f64 {
        self.interaction.coupling_factor()
    }

    /// Inject the current energy and mass of every interacting point tagged
    /// `tag`.
    ///
    /// Each injected result is retained and queued on the reclamation stack
    /// (point-sized, single reference). If the stack is full the result is
    /// released at once and the rejection reported.
    pub fn shoot_over(&mut self, tag: &str) -> Result<Vec<Injection>> {
        if tag.is_empty() {
            let err = FieldError::InvalidInput("shoot-over tag must not be empty".into());
            self.diagnostics.report_error(&err);
            return Err(err);
        }
        let size = std::mem::size_of::<FieldPoint>();
        let mut injections = Vec::new();
        for p in self.registry.iter().filter(|p| p.interacting && p.tag == tag) {
            let handle = self.results.allocate(size);
            if let Err(err) = self.retired.submit(handle, size, 1) {
                self.diagnostics.report_error(&err);
                self.results.release_now(&handle);
            }
            tracing::info!(tag = %p.tag, energy = p.energy, mass = p.mass, "shoot-over");
            injections.push(Injection {
                tag: p.tag.clone(),
                energy: p.energy,
                mass: p.mass,
                handle,
            });
        }
        Ok(injections)
    }

    /// Injected results still held.
    pub fn retained_results(&self) -> usize {
        self.results.live_count()
    }

    pub fn retired(&self) -> &ReclamationStack<Uuid> {
        &self.retired
    }

    /// Run a pressure-gated cascade over the retired results.
    pub fn reclaim(&mut self) -> CascadeOutcome {
        self.retired.cascade(&mut self.results, &mut self.diagnostics)
    }

    /// Tear the system down with a final cascade.
    ///
    /// Results still deferred at low pressure are freed with the system.
    pub fn shutdown(mut self) -> CascadeOutcome {
        let outcome = self.reclaim();
        tracing::info!(?outcome, points = self.registry.len(), "field system shut down");
        outcome
    }

    pub fn evict(&mut self, tag: &str) -> Option<FieldPoint> {
        self.registry.evict(tag)
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            capacity: self.registry.capacity(),
            stability: self.registry.stability(),
            coupling_factor: self.interaction.coupling_factor(),
            steps: self.interaction.steps(),
            literals: self.topology.literal_count(),
            retired: self.retired.len(),
            points: self.registry.iter().map(PointSnapshot::from).collect(),
            topology: self.topology.records().to_vec(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn topology(&self) -> &DeltaTopology {
        &self.topology
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut DiagnosticLog {
        &mut self.diagnostics
    }
}

impl Default for FieldSystem {
    fn default() -> Self {
        Self {
            registry: Registry::default(),
            topology: DeltaTopology::default(),
            interaction: Interaction::new(FieldConfig::default().base_coupling),
            results: ResourcePool::new(),
            retired: ReclamationStack::default(),
            diagnostics: DiagnosticLog::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LITERAL_CAPACITY;
    use crate::diagnostics::Severity;

    #[test]
    fn test_add_point_records_literal() {
        let mut sys = FieldSystem::default();
        sys.add_point(Vector::splat(1.0), 2.0, "a").unwrap();
        sys.add_point(Vector::splat(2.0), 2.0, "b").unwrap();
        assert_eq!(sys.topology().literal_count(), 2);
        assert_eq!(sys.recompute_topology(), 1);
    }

    #[test]
    fn test_rejected_insert_is_reported() {
        let mut sys = FieldSystem::default();
        assert!(sys.add_point(Vector::splat(1.0), 1.0, "").is_err());
        assert_eq!(sys.topology().literal_count(), 0);
        assert_eq!(sys.diagnostics().count_at_least(Severity::Error), 1);
    }

    #[test]
    fn test_full_literal_buffer_keeps_point() {
        let mut sys = FieldSystem::default();
        for i in 0..LITERAL_CAPACITY {
            sys.push_literal(Vector::splat(i as f64)).unwrap();
        }
        sys.add_point(Vector::splat(1.0), 1.0, "late").unwrap();
        assert!(sys.registry().find("late").is_some());
        assert_eq!(sys.topology().literal_count(), LITERAL_CAPACITY);
        assert_eq!(sys.diagnostics().len(), 1);
    }

    #[test]
    fn test_step_failure_is_reported() {
        let mut sys = FieldSystem::default();
        sys.insert(Vector::splat(1.0), 2.0, "solo").unwrap();
        assert!(sys.step().is_err());
        assert_eq!(sys.diagnostics().len(), 1);
    }

    #[test]
    fn test_shoot_over_matches_tag() {
        let mut sys = FieldSystem::default();
        sys.add_point(Vector::splat(1.0), 2.0, "point1").unwrap();
        sys.add_point(Vector::splat(1.0), 2.0, "point2").unwrap();
        let hits = sys.shoot_over("point1").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].mass, 2.0);
        assert!(sys.shoot_over("nobody").unwrap().is_empty());
        assert!(sys.shoot_over("").is_err());
    }

    #[test]
    fn test_shoot_over_queues_result_for_release() {
        let mut sys = FieldSystem::default();
        sys.add_point(Vector::splat(1.0), 2.0, "point1").unwrap();
        let hits = sys.shoot_over("point1").unwrap();
        assert_eq!(sys.retained_results(), 1);
        assert_eq!(sys.retired().len(), 1);
        let request = &sys.retired().requests()[0];
        assert_eq!(request.handle, hits[0].handle);
        assert_eq!(request.size, std::mem::size_of::<FieldPoint>());
        assert_eq!(request.ref_estimate, 1);
        assert_eq!(sys.snapshot().retired, 1);

        // one pending result is far below pressure
        assert_eq!(sys.reclaim(), CascadeOutcome::Deferred { pending: 1 });
        assert_eq!(sys.retained_results(), 1);
    }

    #[test]
    fn test_shutdown_sweeps_under_pressure() {
        let reclaim = ReclaimConfig {
            max_entries: 2,
            ..ReclaimConfig::default()
        };
        let mut sys = FieldSystem::with_reclaim(FieldConfig::default(), reclaim).unwrap();
        sys.add_point(Vector::splat(1.0), 2.0, "point1").unwrap();
        sys.shoot_over("point1").unwrap();
        sys.shoot_over("point1").unwrap();

        // a third injection overflows the stack and is released on the spot
        sys.shoot_over("point1").unwrap();
        assert_eq!(sys.retained_results(), 2);
        assert_eq!(sys.diagnostics().count_at_least(Severity::Error), 1);

        assert_eq!(
            sys.shutdown(),
            CascadeOutcome::Swept {
                released: 2,
                double_releases: 0
            }
        );
    }

    #[test]
    fn test_independent_instances() {
        let mut a = FieldSystem::default();
        let b = FieldSystem::default();
        a.add_point(Vector::splat(1.0), 1.0, "only-a").unwrap();
        assert_eq!(a.registry().len(), 1);
        assert!(b.registry().is_empty());
    }
}
