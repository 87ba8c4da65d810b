use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::config::VulnerabilitySettings;
use crate::error::ForecastError;
use crate::models::{HazardContext, HazardType, VulnerabilityParameter};
use crate::vulnerability::regressor::{GradientBoostedRegressor, TrainingParams};
use crate::vulnerability::scaler::FeatureScaler;

/// Feature order is fixed: training, persistence and inference all agree
/// on it by construction.
pub const FEATURE_NAMES: [&str; 9] = [
    "population_density",
    "poverty_rate",
    "previous_events_30d",
    "distance_to_water_km",
    "elevation_m",
    "infrastructure_quality",
    "early_warning_coverage",
    "month",
    "settlement_code",
];

/// Assemble the regressor feature vector from a context.
pub fn feature_vector(context: &HazardContext) -> Vec<f64> {
    vec![
        context.population_density,
        context.poverty_rate,
        context.previous_events_30d as f64,
        context.distance_to_water_km,
        context.elevation_m,
        context.infrastructure_quality,
        context.early_warning_coverage,
        context.month as f64,
        context.settlement.feature_code(),
    ]
}

/// One historical observation for offline training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSample {
    pub context: HazardContext,
    pub displacement_rate: f64,
}

/// Persisted model: regressor plus the scaler it was fitted with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityArtifact {
    pub hazard_type: HazardType,
    pub feature_names: Vec<String>,
    pub scaler: FeatureScaler,
    pub regressor: GradientBoostedRegressor,
    pub trained_at: DateTime<Utc>,
    pub n_training_samples: usize,
}

impl VulnerabilityArtifact {
    /// Offline training entry point. Never called from the forecast hot
    /// path; inference works with no artifact present.
    pub fn train(
        samples: &[TrainingSample],
        hazard_type: HazardType,
        params: &TrainingParams,
    ) -> Result<Self, ForecastError> {
        if samples.is_empty() {
            return Err(ForecastError::Training {
                message: format!("no training samples for {hazard_type}"),
            });
        }

        info!(
            hazard = %hazard_type,
            n_samples = samples.len(),
            n_estimators = params.n_estimators,
            "Training vulnerability model"
        );

        let rows: Vec<Vec<f64>> = samples.iter().map(|s| feature_vector(&s.context)).collect();
        let targets: Vec<f64> = samples.iter().map(|s| s.displacement_rate).collect();

        let scaler = FeatureScaler::fit(&rows);
        let scaled = scaler.transform_rows(&rows);
        let regressor = GradientBoostedRegressor::fit(&scaled, &targets, params)?;

        let mut ranked: Vec<(&str, f64)> = FEATURE_NAMES
            .iter()
            .copied()
            .zip(regressor.feature_importances().iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        for (name, importance) in &ranked {
            info!(hazard = %hazard_type, feature = name, importance, "Feature importance");
        }

        Ok(VulnerabilityArtifact {
            hazard_type,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            scaler,
            regressor,
            trained_at: Utc::now(),
            n_training_samples: samples.len(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ForecastError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), hazard = %self.hazard_type, "Saved vulnerability model");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ForecastError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ForecastError::ModelLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ForecastError::ModelLoad {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Estimation strategy, chosen once at construction: a learned regressor
/// when an artifact loaded, the regional lookup table otherwise.
#[derive(Debug, Clone)]
enum VulnerabilityModel {
    Learned {
        scaler: FeatureScaler,
        regressor: GradientBoostedRegressor,
    },
    RegionalDefault,
}

/// Maps a context to a scalar vulnerability parameter per hazard type.
///
/// Shared read-only across forecast units for the process lifetime.
#[derive(Debug, Clone)]
pub struct VulnerabilityEstimator {
    flood: VulnerabilityModel,
    conflict: VulnerabilityModel,
    settings: VulnerabilitySettings,
}

impl VulnerabilityEstimator {
    /// Estimator with no trained models: every query answers from the
    /// regional lookup table.
    pub fn regional(settings: VulnerabilitySettings) -> Self {
        Self {
            flood: VulnerabilityModel::RegionalDefault,
            conflict: VulnerabilityModel::RegionalDefault,
            settings,
        }
    }

    /// Load optional per-hazard artifacts. A missing or unreadable
    /// artifact downgrades that hazard to the regional default; it is
    /// never an error to the caller.
    pub fn from_artifacts(
        flood_path: Option<&Path>,
        conflict_path: Option<&Path>,
        settings: VulnerabilitySettings,
    ) -> Self {
        Self {
            flood: load_model(flood_path, HazardType::Flood),
            conflict: load_model(conflict_path, HazardType::Conflict),
            settings,
        }
    }

    /// Build directly from in-memory artifacts (useful for tests and for
    /// training pipelines that skip the filesystem).
    pub fn with_artifacts(
        flood: Option<VulnerabilityArtifact>,
        conflict: Option<VulnerabilityArtifact>,
        settings: VulnerabilitySettings,
    ) -> Self {
        let to_model = |artifact: Option<VulnerabilityArtifact>| match artifact {
            Some(a) => VulnerabilityModel::Learned {
                scaler: a.scaler,
                regressor: a.regressor,
            },
            None => VulnerabilityModel::RegionalDefault,
        };
        Self {
            flood: to_model(flood),
            conflict: to_model(conflict),
            settings,
        }
    }

    pub fn has_trained_model(&self, hazard_type: HazardType) -> bool {
        matches!(self.model(hazard_type), VulnerabilityModel::Learned { .. })
    }

    /// Estimate the vulnerability parameter for a context. Infallible:
    /// every hazard type and region string yields a finite, range-valid
    /// value.
    pub fn estimate(
        &self,
        context: &HazardContext,
        hazard_type: HazardType,
    ) -> VulnerabilityParameter {
        let value = match self.model(hazard_type) {
            VulnerabilityModel::Learned { scaler, regressor } => {
                let features = scaler.transform(&feature_vector(context));
                let raw = regressor.predict(&features);
                self.clip(raw, hazard_type)
            }
            VulnerabilityModel::RegionalDefault => {
                self.regional_default(&context.region, hazard_type)
            }
        };
        VulnerabilityParameter { hazard_type, value }
    }

    fn model(&self, hazard_type: HazardType) -> &VulnerabilityModel {
        match hazard_type {
            HazardType::Flood => &self.flood,
            HazardType::Conflict => &self.conflict,
        }
    }

    /// Clip to the hazard's physical range so a regressor extrapolating
    /// outside its training domain cannot produce unphysical parameters.
    fn clip(&self, value: f64, hazard_type: HazardType) -> f64 {
        match hazard_type {
            HazardType::Flood => value.clamp(
                self.settings.flood_param_min,
                self.settings.flood_param_max,
            ),
            HazardType::Conflict => value.clamp(
                self.settings.conflict_param_min,
                self.settings.conflict_param_max,
            ),
        }
    }

    /// Regional p50 lookup; unknown regions use the configured default
    /// region. Guaranteed to succeed for any region string.
    fn regional_default(&self, region: &str, hazard_type: HazardType) -> f64 {
        let table = match hazard_type {
            HazardType::Flood => &self.settings.flood_params,
            HazardType::Conflict => &self.settings.conflict_params,
        };
        if let Some(params) = table.get(region) {
            return params.p50;
        }
        if let Some(params) = table.get(&self.settings.default_region) {
            return params.p50;
        }
        // Both lookups missing means the configuration tables are empty;
        // answer with the midpoint of the valid range.
        warn!(region, hazard = %hazard_type, "No regional vulnerability table entry");
        match hazard_type {
            HazardType::Flood => {
                (self.settings.flood_param_min + self.settings.flood_param_max) / 2.0
            }
            HazardType::Conflict => {
                (self.settings.conflict_param_min + self.settings.conflict_param_max) / 2.0
            }
        }
    }
}

fn load_model(path: Option<&Path>, hazard_type: HazardType) -> VulnerabilityModel {
    let Some(path) = path else {
        return VulnerabilityModel::RegionalDefault;
    };
    match VulnerabilityArtifact::load(path) {
        Ok(artifact) => {
            info!(
                hazard = %hazard_type,
                path = %path.display(),
                n_samples = artifact.n_training_samples,
                "Loaded pre-trained vulnerability model"
            );
            VulnerabilityModel::Learned {
                scaler: artifact.scaler,
                regressor: artifact.regressor,
            }
        }
        Err(e) => {
            warn!(
                hazard = %hazard_type,
                path = %path.display(),
                error = %e,
                "Could not load vulnerability model, using regional defaults"
            );
            VulnerabilityModel::RegionalDefault
        }
    }
}
