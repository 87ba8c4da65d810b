use serde::{Deserialize, Serialize};

/// Hazard types covered by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardType {
    Flood,
    Conflict,
}

impl HazardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardType::Flood => "flood",
            HazardType::Conflict => "conflict",
        }
    }

    /// Intensity unit for curves of this hazard.
    pub fn intensity_unit(&self) -> &'static str {
        match self {
            HazardType::Flood => "m",
            HazardType::Conflict => "events",
        }
    }
}

impl std::fmt::Display for HazardType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settlement classification of an administrative unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettlementType {
    Urban,
    PeriUrban,
    Rural,
}

impl SettlementType {
    /// Categorical feature code used by the vulnerability regressor.
    pub fn feature_code(&self) -> f64 {
        match self {
            SettlementType::Urban => 0.0,
            SettlementType::PeriUrban => 1.0,
            SettlementType::Rural => 2.0,
        }
    }

    /// Parse from free-text source data. Unknown values map to peri-urban,
    /// the middle of the categorical scale.
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "urban" => SettlementType::Urban,
            "rural" => SettlementType::Rural,
            _ => SettlementType::PeriUrban,
        }
    }
}

/// Per-unit conditioning data for one forecast run.
///
/// Constructed once by the data-loading collaborator and passed by
/// reference into the core; the core never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardContext {
    pub state: String,
    pub region: String,
    /// Calendar month, 1-12.
    pub month: u32,
    pub population_density: f64,
    pub poverty_rate: f64,
    pub previous_events_30d: u32,
    pub previous_events_90d: u32,
    pub distance_to_water_km: f64,
    pub elevation_m: f64,
    pub settlement: SettlementType,
    /// 0-1 scale.
    pub infrastructure_quality: f64,
    /// 0-1 scale.
    pub early_warning_coverage: f64,
}

/// Concurrent stressors that modify displacement behaviour.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CompoundingFactors {
    pub has_recent_flood: bool,
    pub has_recent_conflict: bool,
    pub has_displacement_camp: bool,
    pub is_rainy_season: bool,
    pub is_harvest_season: bool,
    pub market_access_disrupted: bool,
    pub healthcare_access_limited: bool,
}

/// Scalar vulnerability parameter with its hazard tag.
///
/// The unit depends on the hazard: half-impact flood depth in meters, or a
/// fatality count for conflict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VulnerabilityParameter {
    pub hazard_type: HazardType,
    pub value: f64,
}
