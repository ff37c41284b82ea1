//! Bounded, priority-sorted registry of field points.
//!
//! Priority is a fuzzy AND of normalized energy, normalized mass, and the
//! registry's stability at insertion time. It is fixed once assigned; the
//! interaction step only mutates energy and mass, so the sort order
//! established at insertion stays valid.

use serde::{Deserialize, Serialize};

use crate::config::FieldConfig;
use crate::constants::{DIM, MAX_TAG_LEN};
use crate::error::{FieldError, Result};
use crate::vector::Vector;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldPoint {
    pub position: Vector,
    pub energy: f64,
    pub mass: f64,
    /// Interaction priority in [0, 1]. Assigned once at insertion.
    pub priority: f64,
    pub interacting: bool,
    pub tag: String,
}

/// Sorted field point storage. Highest priority first; equal priorities
/// keep insertion order.
#[derive(Clone, Debug)]
pub struct Registry {
    points: Vec<FieldPoint>,
    config: FieldConfig,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            config: FieldConfig::default(),
        }
    }
}

impl Registry {
    pub fn new(config: FieldConfig) -> Result<Self> {
        config.validate()?;
        let mut points = Vec::new();
        points
            .try_reserve_exact(config.registry_capacity)
            .map_err(|e| {
                FieldError::AllocationFailure(format!(
                    "registry ({}): {e}",
                    config.registry_capacity
                ))
            })?;
        Ok(Self { points, config })
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Insert a point and return the index it settled at.
    pub fn insert(&mut self, position: Vector, mass: f64, tag: &str) -> Result<usize> {
        if self.points.len() >= self.config.registry_capacity {
            return Err(FieldError::CapacityExceeded {
                structure: "registry",
                capacity: self.config.registry_capacity,
            });
        }
        validate_tag(tag)?;
        if !mass.is_finite() {
            return Err(FieldError::InvalidInput(format!(
                "mass for '{tag}' is {mass}"
            )));
        }
        let energy = position.magnitude()? * self.config.energy_factor;
        let priority = self.score(energy, mass);

        self.points.push(FieldPoint {
            position,
            energy,
            mass,
            priority,
            interacting: true,
            tag: tag.to_string(),
        });

        // Insertion-sort placement: bubble toward the head past strictly
        // lower priorities only, so equal priorities keep insertion order.
        let mut i = self.points.len() - 1;
        while i > 0 && self.points[i - 1].priority < self.points[i].priority {
            self.points.swap(i - 1, i);
            i -= 1;
        }

        tracing::debug!(tag, energy, mass, priority, index = i, "inserted field point");
        Ok(i)
    }

    /// Composite priority for a candidate with `energy` and `mass`.
    ///
    /// Stability is observed with the candidate included.
    fn score(&self, energy: f64, mass: f64) -> f64 {
        let energy_factor = energy / (self.config.energy_factor * DIM as f64);
        let mass_factor = mass / self.config.mass_reference;
        let stability = self.stability_of(self.energies().chain(std::iter::once(energy)));
        self.config
            .confidence()
            .score(&[energy_factor, mass_factor, stability])
    }

    /// Two-level stability signal: 1.0 when energy variance is within
    /// tolerance, else 0.5. An empty registry is stable.
    pub fn stability(&self) -> f64 {
        self.stability_of(self.energies())
    }

    fn stability_of(&self, energies: impl Iterator<Item = f64> + Clone) -> f64 {
        let variance = energy_variance(energies);
        if variance < self.config.stability_tolerance {
            crate::constants::STABLE
        } else {
            crate::constants::UNSTABLE
        }
    }

    fn energies(&self) -> impl Iterator<Item = f64> + Clone + '_ {
        self.points.iter().map(|p| p.energy)
    }

    /// Population variance of the stored energies.
    pub fn variance(&self) -> f64 {
        energy_variance(self.energies())
    }

    /// Remove the first point carrying `tag`. Remaining order is preserved.
    pub fn evict(&mut self, tag: &str) -> Option<FieldPoint> {
        let idx = self.points.iter().position(|p| p.tag == tag)?;
        let point = self.points.remove(idx);
        tracing::debug!(tag, index = idx, "evicted field point");
        Some(point)
    }

    pub fn find(&self, tag: &str) -> Option<&FieldPoint> {
        self.points.iter().find(|p| p.tag == tag)
    }

    pub fn get(&self, index: usize) -> Option<&FieldPoint> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[FieldPoint] {
        &self.points
    }

    /// Mutable access for the interaction step. Slice access cannot grow or
    /// reorder the registry.
    pub(crate) fn points_mut(&mut self) -> &mut [FieldPoint] {
        &mut self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.config.registry_capacity
    }

    pub fn is_full(&self) -> bool {
        self.points.len() >= self.config.registry_capacity
    }
}

fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() {
        return Err(FieldError::InvalidInput("tag must not be empty".into()));
    }
    if tag.len() > MAX_TAG_LEN {
        return Err(FieldError::InvalidInput(format!(
            "tag '{tag}' exceeds {MAX_TAG_LEN} bytes"
        )));
    }
    Ok(())
}

fn energy_variance(energies: impl Iterator<Item = f64> + Clone) -> f64 {
    let (sum, n) = energies
        .clone()
        .fold((0.0, 0usize), |(s, n), e| (s + e, n + 1));
    if n == 0 {
        return 0.0;
    }
    let mean = sum / n as f64;
    energies.map(|e| (e - mean) * (e - mean)).sum::<f64>() / n as f64
}
