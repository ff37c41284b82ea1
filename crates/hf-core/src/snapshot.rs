//! Read-only view of field state for external reporting.
//!
//! Formatting is left to the consumer; the snapshot serializes to JSON.

use serde::{Deserialize, Serialize};

use crate::registry::FieldPoint;
use crate::topology::DeltaRecord;
use crate::vector::Vector;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointSnapshot {
    pub tag: String,
    pub position: Vector,
    pub energy: f64,
    pub mass: f64,
    pub priority: f64,
    pub interacting: bool,
}

impl From<&FieldPoint> for PointSnapshot {
    fn from(p: &FieldPoint) -> Self {
        Self {
            tag: p.tag.clone(),
            position: p.position,
            energy: p.energy,
            mass: p.mass,
            priority: p.priority,
            interacting: p.interacting,
        }
    }
}

/// Wire format uses camelCase field names throughout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSnapshot {
    pub capacity: usize,
    pub stability: f64,
    pub coupling_factor: f64,
    pub steps: u64,
    pub literals: usize,
    /// Injected results awaiting deferred release.
    pub retired: usize,
    pub points: Vec<PointSnapshot>,
    pub topology: Vec<DeltaRecord>,
}

impl FieldSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::FieldSystem;

    #[test]
    fn test_wire_keys_are_camel_case() {
        let mut sys = FieldSystem::default();
        sys.add_point(Vector::splat(1.0), 2.0, "a").unwrap();
        sys.add_point(Vector::splat(3.0), 2.0, "b").unwrap();
        sys.recompute_topology();

        let value = serde_json::to_value(sys.snapshot()).unwrap();
        assert!(value.get("couplingFactor").is_some());
        assert!(value["topology"][0].get("harmonicFactor").is_some());
        assert!(value["topology"][0].get("harmonic_factor").is_none());

        fn keys_without_underscore(v: &serde_json::Value) -> bool {
            match v {
                serde_json::Value::Object(map) => map
                    .iter()
                    .all(|(k, v)| !k.contains('_') && keys_without_underscore(v)),
                serde_json::Value::Array(items) => items.iter().all(keys_without_underscore),
                _ => true,
            }
        }
        assert!(keys_without_underscore(&value));
    }
}
