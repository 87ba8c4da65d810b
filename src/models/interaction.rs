use serde::{Deserialize, Serialize};

/// How two single-hazard impact series are merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombinationMethod {
    /// Elementwise maximum; no interaction modelling.
    SimpleMax,
    /// Convex combination weighted by normalized intensity.
    WeightedSum,
    /// Compounding + cascading interaction model.
    #[default]
    Sophisticated,
}

impl CombinationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CombinationMethod::SimpleMax => "simple_max",
            CombinationMethod::WeightedSum => "weighted_sum",
            CombinationMethod::Sophisticated => "sophisticated",
        }
    }
}

/// Audit record for one hazard combination.
///
/// Serializable to a flat JSON record for downstream export and testing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionMetrics {
    pub method: CombinationMethod,
    /// Configured interaction coefficient before context amplification.
    pub base_interaction: f64,
    /// Mean realized compounding multiplier over the series.
    pub compounding_factor: f64,
    pub cascade_flood_to_conflict: f64,
    pub cascade_conflict_to_flood: f64,
    pub max_displacement_fraction: f64,
}

impl InteractionMetrics {
    /// Metrics for a combination that models no interaction.
    pub fn neutral(method: CombinationMethod, max_displacement_fraction: f64) -> Self {
        Self {
            method,
            base_interaction: 0.0,
            compounding_factor: 1.0,
            cascade_flood_to_conflict: 0.0,
            cascade_conflict_to_flood: 0.0,
            max_displacement_fraction,
        }
    }
}
