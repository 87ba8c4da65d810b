use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Categorical confidence derived from the quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.75 {
            ConfidenceLevel::High
        } else if score >= 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
        }
    }
}

/// Aggregated statistics over one forecast run's displacement ensemble.
///
/// Built once at the end of the quality-control stage and immutable
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastMetrics {
    pub forecast_id: String,
    pub timestamp: DateTime<Utc>,
    pub lead_time_days: f64,
    pub processing_time_seconds: f64,

    pub n_samples: usize,
    pub n_ensemble_members: usize,

    pub mean_displacement: f64,
    pub median_displacement: f64,
    pub p05_displacement: f64,
    pub p95_displacement: f64,
    pub max_displacement: f64,

    // Uncertainty decomposition, shares summing to ~100.
    pub hazard_uncertainty_pct: f64,
    pub exposure_uncertainty_pct: f64,
    pub vulnerability_uncertainty_pct: f64,

    pub quality_score: f64,
    pub confidence_level: ConfidenceLevel,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}
