//! Tunables for the field registry, interaction step, and reclamation stack.
//!
//! Both configs deserialize with per-field defaults, so a scenario file only
//! needs to name the knobs it changes.

use serde::{Deserialize, Serialize};

use crate::constants::{
    BASE_COUPLING, CONFIDENCE_THRESHOLD, ENERGY_FACTOR, HIGH_PRESSURE, LITERAL_CAPACITY,
    LOW_CONFIDENCE_DAMPING, LOW_PRESSURE, MASS_REFERENCE, MAX_RECLAIM_ENTRIES,
    PRESSURE_THRESHOLD, REGISTRY_CAPACITY, SIZE_REFERENCE, STABILITY_TOLERANCE,
};
use crate::error::{FieldError, Result};
use crate::scoring::Confidence;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Maximum field points in the registry.
    pub registry_capacity: usize,
    /// Maximum literals in the topology engine.
    pub literal_capacity: usize,
    /// Position magnitude → energy scale.
    pub energy_factor: f64,
    /// Coupling at full stability.
    pub base_coupling: f64,
    /// Dampening and interaction gate.
    pub confidence_threshold: f64,
    /// Multiplier for scores under the confidence threshold.
    pub damping: f64,
    /// Energy variance below which the registry is stable.
    pub stability_tolerance: f64,
    /// Mass that saturates the mass factor.
    pub mass_reference: f64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            registry_capacity: REGISTRY_CAPACITY,
            literal_capacity: LITERAL_CAPACITY,
            energy_factor: ENERGY_FACTOR,
            base_coupling: BASE_COUPLING,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            damping: LOW_CONFIDENCE_DAMPING,
            stability_tolerance: STABILITY_TOLERANCE,
            mass_reference: MASS_REFERENCE,
        }
    }
}

impl FieldConfig {
    pub fn confidence(&self) -> Confidence {
        Confidence {
            threshold: self.confidence_threshold,
            damping: self.damping,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.registry_capacity == 0 {
            return Err(FieldError::AllocationFailure(
                "registry_capacity must be > 0".into(),
            ));
        }
        if self.literal_capacity == 0 {
            return Err(FieldError::AllocationFailure(
                "literal_capacity must be > 0".into(),
            ));
        }
        check_unit("confidence_threshold", self.confidence_threshold)?;
        check_unit("damping", self.damping)?;
        check_positive("energy_factor", self.energy_factor)?;
        check_positive("mass_reference", self.mass_reference)?;
        check_positive("stability_tolerance", self.stability_tolerance)?;
        if !self.base_coupling.is_finite() || self.base_coupling < 0.0 {
            return Err(FieldError::InvalidInput(format!(
                "base_coupling must be finite and >= 0, got {}",
                self.base_coupling
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReclaimConfig {
    /// Maximum pending requests.
    pub max_entries: usize,
    /// Occupancy ratio above which pressure is high.
    pub pressure_threshold: f64,
    pub high_pressure: f64,
    pub low_pressure: f64,
    /// Allocation size that saturates the size factor.
    pub size_reference: usize,
    pub confidence_threshold: f64,
    pub damping: f64,
}

impl Default for ReclaimConfig {
    fn default() -> Self {
        Self {
            max_entries: MAX_RECLAIM_ENTRIES,
            pressure_threshold: PRESSURE_THRESHOLD,
            high_pressure: HIGH_PRESSURE,
            low_pressure: LOW_PRESSURE,
            size_reference: SIZE_REFERENCE,
            confidence_threshold: CONFIDENCE_THRESHOLD,
            damping: LOW_CONFIDENCE_DAMPING,
        }
    }
}

impl ReclaimConfig {
    pub fn confidence(&self) -> Confidence {
        Confidence {
            threshold: self.confidence_threshold,
            damping: self.damping,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(FieldError::AllocationFailure(
                "max_entries must be > 0".into(),
            ));
        }
        if self.size_reference == 0 {
            return Err(FieldError::InvalidInput("size_reference must be > 0".into()));
        }
        check_unit("pressure_threshold", self.pressure_threshold)?;
        check_unit("high_pressure", self.high_pressure)?;
        check_unit("low_pressure", self.low_pressure)?;
        check_unit("confidence_threshold", self.confidence_threshold)?;
        check_unit("damping", self.damping)?;
        if self.low_pressure >= self.high_pressure {
            return Err(FieldError::InvalidInput(format!(
                "low_pressure ({}) must be below high_pressure ({})",
                self.low_pressure, self.high_pressure
            )));
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(FieldError::InvalidInput(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(FieldError::InvalidInput(format!(
            "{name} must be finite and > 0, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(FieldConfig::default().validate().is_ok());
        assert!(ReclaimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_is_allocation_failure() {
        let cfg = FieldConfig {
            registry_capacity: 0,
            ..FieldConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(FieldError::AllocationFailure(_))
        ));
    }

    #[test]
    fn test_threshold_out_of_range() {
        let cfg = FieldConfig {
            confidence_threshold: 1.5,
            ..FieldConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(FieldError::InvalidInput(_))));

        let rc = ReclaimConfig {
            low_pressure: 0.95,
            ..ReclaimConfig::default()
        };
        assert!(rc.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let cfg: FieldConfig = serde_json::from_str(r#"{"registry_capacity": 8}"#).unwrap();
        assert_eq!(cfg.registry_capacity, 8);
        assert_eq!(cfg.literal_capacity, LITERAL_CAPACITY);
        assert_eq!(cfg.base_coupling, BASE_COUPLING);
    }
}
