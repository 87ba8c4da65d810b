use serde::{Deserialize, Serialize};

use crate::models::HazardType;

/// Ensemble hazard forecast for one administrative unit.
///
/// One peak intensity per ensemble event, in the hazard's native unit
/// (flood depth in meters, conflict event count). Produced by the external
/// hazard model; the core only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardSeries {
    pub hazard_type: HazardType,
    pub event_intensities: Vec<f64>,
}

impl HazardSeries {
    pub fn new(hazard_type: HazardType, event_intensities: Vec<f64>) -> Self {
        Self {
            hazard_type,
            event_intensities,
        }
    }

    pub fn n_events(&self) -> usize {
        self.event_intensities.len()
    }

    pub fn all_zero(&self) -> bool {
        self.event_intensities.iter().all(|&x| x == 0.0)
    }
}

/// One exposure record: an exposed population value for a named unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureRecord {
    pub name: String,
    pub value: f64,
}

/// Exposed-population data supplied by the ETL collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExposureData {
    pub records: Vec<ExposureRecord>,
}

impl ExposureData {
    pub fn new(records: Vec<ExposureRecord>) -> Self {
        Self { records }
    }

    /// Single-record convenience constructor for unit-level runs.
    pub fn single(name: impl Into<String>, value: f64) -> Self {
        Self {
            records: vec![ExposureRecord {
                name: name.into(),
                value,
            }],
        }
    }

    pub fn total_value(&self) -> f64 {
        self.records.iter().map(|r| r.value).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
