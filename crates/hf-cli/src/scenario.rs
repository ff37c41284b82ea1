//! TOML scenario files and the run that plays them against a fresh engine.

use std::path::Path;

use anyhow::{Context, Result};
use hf_core::{
    CascadeOutcome, DIM, Diagnostic, DiagnosticSink, FieldConfig, FieldError, FieldSnapshot,
    FieldSystem, ReclaimConfig, ReclamationStack, ResourcePool, StepReport, Vector,
};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub steps: usize,
    pub field: FieldConfig,
    pub reclaim: ReclaimConfig,
    pub points: Vec<PointSpec>,
    pub literals: Vec<LiteralSpec>,
    pub resources: Vec<ResourceSpec>,
    /// Tags to report after the final step.
    pub shoot_over: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointSpec {
    pub tag: String,
    pub position: Vec<f64>,
    pub mass: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiteralSpec {
    pub position: Vec<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResourceSpec {
    pub size: usize,
    #[serde(default = "default_refs")]
    pub refs: u32,
}

fn default_refs() -> u32 {
    1
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid scenario {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(content)?;
        scenario.field.validate()?;
        scenario.reclaim.validate()?;
        Ok(scenario)
    }

    /// The two-point demo: an alternating ±10 vector and its negation.
    pub fn demo(steps: usize) -> Self {
        let position: Vec<f64> = (0..DIM)
            .map(|k| if k % 2 == 0 { 10.0 } else { -10.0 })
            .collect();
        let negated = position.iter().map(|c| -c).collect();
        Self {
            steps,
            points: vec![
                PointSpec {
                    tag: "point1".into(),
                    position,
                    mass: 1.0,
                },
                PointSpec {
                    tag: "point2".into(),
                    position: negated,
                    mass: 2.0,
                },
            ],
            shoot_over: vec!["point1".into()],
            ..Self::default()
        }
    }

    /// `count` points with coordinates in [-10, 10) and masses in [0, 2.5).
    pub fn random(count: usize, steps: usize, rng: &mut impl Rng) -> Self {
        let points = (0..count)
            .map(|i| PointSpec {
                tag: format!("p{i}"),
                position: (0..DIM).map(|_| rng.random_range(-10.0..10.0)).collect(),
                mass: rng.random_range(0.0..2.5),
            })
            .collect();
        Self {
            steps,
            points,
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectionOutput {
    pub tag: String,
    pub energy: f64,
    pub mass: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReclaimOutput {
    pub submitted: usize,
    pub rejected: usize,
    pub pressure: f64,
    pub outcome: CascadeOutcome,
    pub live: usize,
    pub released: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    pub snapshot: FieldSnapshot,
    pub steps: Vec<StepReport>,
    pub injections: Vec<InjectionOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reclaim: Option<ReclaimOutput>,
    /// Final cascade over the injected results.
    pub teardown: CascadeOutcome,
    pub diagnostics: Vec<Diagnostic>,
}

/// Build the engine, feed the scenario, advance `steps` times.
///
/// Rejected points and failed steps are recorded as diagnostics; only
/// construction failures abort the run.
pub fn run(scenario: &Scenario) -> Result<RunOutput> {
    let mut system = FieldSystem::with_reclaim(scenario.field.clone(), scenario.reclaim.clone())
        .context("failed to build field system")?;

    for point in &scenario.points {
        let Ok(position) = Vector::try_from(point.position.as_slice()) else {
            system
                .diagnostics_mut()
                .report_error(&FieldError::InvalidInput(format!(
                    "point '{}' has {} components, expected {DIM}",
                    point.tag,
                    point.position.len()
                )));
            continue;
        };
        // rejection is already in the diagnostic log
        let _ = system.add_point(position, point.mass, &point.tag);
    }

    for entry in &scenario.literals {
        match Vector::try_from(entry.position.as_slice()) {
            Ok(literal) => {
                let _ = system.push_literal(literal);
            }
            Err(err) => system.diagnostics_mut().report_error(&err),
        }
    }

    let mut steps = Vec::with_capacity(scenario.steps);
    for _ in 0..scenario.steps {
        if let Ok(report) = system.step() {
            steps.push(report);
        }
    }

    let mut injections = Vec::new();
    for tag in &scenario.shoot_over {
        if let Ok(hits) = system.shoot_over(tag) {
            injections.extend(hits.into_iter().map(|inj| InjectionOutput {
                tag: inj.tag,
                energy: inj.energy,
                mass: inj.mass,
            }));
        }
    }

    let reclaim = if scenario.resources.is_empty() {
        None
    } else {
        Some(run_reclaim(scenario, system.diagnostics_mut())?)
    };

    let snapshot = system.snapshot();
    let diagnostics = system.diagnostics().history().cloned().collect();
    Ok(RunOutput {
        snapshot,
        steps,
        injections,
        reclaim,
        teardown: system.shutdown(),
        diagnostics,
    })
}

fn run_reclaim(scenario: &Scenario, sink: &mut impl DiagnosticSink) -> Result<ReclaimOutput> {
    let mut pool = ResourcePool::new();
    let mut stack = ReclamationStack::new(scenario.reclaim.clone())
        .context("failed to build reclamation stack")?;

    let mut submitted = 0;
    let mut rejected = 0;
    for resource in &scenario.resources {
        let handle = pool.allocate(resource.size);
        match stack.submit(handle, resource.size, resource.refs) {
            Ok(()) => submitted += 1,
            Err(err) => {
                sink.report_error(&err);
                rejected += 1;
            }
        }
    }

    let pressure = stack.pressure();
    let outcome = stack.cascade(&mut pool, sink);
    Ok(ReclaimOutput {
        submitted,
        rejected,
        pressure,
        outcome,
        live: pool.live_count(),
        released: pool.released_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    const SCENARIO: &str = r#"
steps = 2
shoot_over = ["b"]

[field]
registry_capacity = 10

[reclaim]
max_entries = 2

[[points]]
tag = "a"
position = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]
mass = 2.0

[[points]]
tag = "b"
position = [2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0, 2.0]
mass = 1.5

[[points]]
tag = "short"
position = [1.0, 2.0]
mass = 1.0

[[resources]]
size = 100
refs = 2

[[resources]]
size = 4096
"#;

    #[test]
    fn test_parse_scenario() {
        let s = Scenario::parse(SCENARIO).unwrap();
        assert_eq!(s.steps, 2);
        assert_eq!(s.field.registry_capacity, 10);
        assert_eq!(s.field.literal_capacity, hf_core::LITERAL_CAPACITY);
        assert_eq!(s.points.len(), 3);
        assert_eq!(s.resources[1].refs, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = Scenario::parse("[field]\nconfidence_threshold = 2.0\n").unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));
    }

    #[test]
    fn test_run_scenario() {
        let s = Scenario::parse(SCENARIO).unwrap();
        let out = run(&s).unwrap();
        assert_eq!(out.snapshot.points.len(), 2);
        assert_eq!(out.steps.len(), 2);
        assert_eq!(out.injections.len(), 1);
        assert_eq!(out.injections[0].tag, "b");
        // the short position is reported, not fatal
        assert!(out.diagnostics.iter().any(|d| d.message.contains("short")));

        let reclaim = out.reclaim.unwrap();
        assert_eq!(reclaim.submitted, 2);
        assert_eq!(
            reclaim.outcome,
            CascadeOutcome::Swept {
                released: 2,
                double_releases: 0
            }
        );
        assert_eq!(reclaim.live, 0);
    }

    #[test]
    fn test_demo_has_two_points() {
        let out = run(&Scenario::demo(1)).unwrap();
        assert_eq!(out.snapshot.points[0].tag, "point2");
        assert_eq!(out.steps[0].updated, 1);
        assert_eq!(out.injections.len(), 1);
        assert_eq!(out.snapshot.retired, 1);
        assert_eq!(out.teardown, CascadeOutcome::Deferred { pending: 1 });
    }

    #[test]
    fn test_random_is_seeded() {
        let a = Scenario::random(5, 0, &mut SmallRng::seed_from_u64(7));
        let b = Scenario::random(5, 0, &mut SmallRng::seed_from_u64(7));
        assert_eq!(a.points.len(), 5);
        for (x, y) in a.points.iter().zip(&b.points) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.mass, y.mass);
        }
    }
}
