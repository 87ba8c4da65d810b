use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;

use crate::models::AlertLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub forecast: ForecastSettings,
    pub vulnerability: VulnerabilitySettings,
    pub sampling: SamplingSettings,
    pub validation: ValidationSettings,
    pub alert: AlertSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSettings {
    /// Minimum flood depth producing any displacement, meters.
    pub flood_depth_threshold_m: f64,
    /// Minimum conflict fatality count producing any displacement.
    pub conflict_fatality_threshold: f64,
    pub flood_intensity_max_m: f64,
    pub flood_intensity_step_m: f64,
    pub conflict_intensity_max: f64,
    pub conflict_intensity_step: f64,
    pub displacement_alert_levels: DisplacementAlertLevels,
}

/// Displacement breakpoints (people) for the alert ladder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplacementAlertLevels {
    pub watch: f64,
    pub advisory: f64,
    pub warning: f64,
    pub emergency: f64,
}

/// Regional vulnerability quantiles: the regional-default estimator uses
/// p50 as its point estimate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RegionalParams {
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilitySettings {
    /// Half-impact flood depth quantiles (m) per geopolitical zone.
    pub flood_params: HashMap<String, RegionalParams>,
    /// Half-impact conflict fatality quantiles per geopolitical zone.
    pub conflict_params: HashMap<String, RegionalParams>,
    /// Fallback region for unknown region strings.
    pub default_region: String,
    pub flood_param_min: f64,
    pub flood_param_max: f64,
    pub conflict_param_min: f64,
    pub conflict_param_max: f64,
    /// Interaction coefficient: flood impact worsened by conflict.
    pub flood_conflict_interaction: f64,
    /// Interaction coefficient: conflict impact worsened by flood.
    pub conflict_flood_interaction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingSettings {
    pub n_samples: usize,
    /// Sigma of the multiplicative lognormal vulnerability noise.
    pub vulnerability_sigma: f64,
    /// Fixed exposure share of the uncertainty decomposition, percent.
    pub exposure_uncertainty_pct: f64,
    /// Seed for reproducible ensembles; None draws from the OS.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSettings {
    /// Displacement above this is flagged as implausible for the country.
    pub max_plausible_displacement: f64,
    /// Ceiling on the p95/p05 uncertainty ratio before warning.
    pub max_forecast_error_factor: f64,
    pub min_ensemble_size: usize,
    pub min_sample_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSettings {
    pub recipients: HashMap<AlertLevel, Vec<String>>,
    pub default_recipient: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            forecast: ForecastSettings::default(),
            vulnerability: VulnerabilitySettings::default(),
            sampling: SamplingSettings::default(),
            validation: ValidationSettings::default(),
            alert: AlertSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ForecastSettings {
    fn default() -> Self {
        ForecastSettings {
            flood_depth_threshold_m: 0.3,
            conflict_fatality_threshold: 5.0,
            flood_intensity_max_m: 6.0,
            flood_intensity_step_m: 0.05,
            conflict_intensity_max: 250.0,
            conflict_intensity_step: 2.0,
            displacement_alert_levels: DisplacementAlertLevels {
                watch: 1_000.0,
                advisory: 5_000.0,
                warning: 20_000.0,
                emergency: 50_000.0,
            },
        }
    }
}

impl Default for VulnerabilitySettings {
    fn default() -> Self {
        let flood_params = HashMap::from([
            ("North_Central".to_string(), RegionalParams { p25: 0.6, p50: 0.9, p75: 1.3 }),
            ("North_East".to_string(), RegionalParams { p25: 0.5, p50: 0.8, p75: 1.2 }),
            ("North_West".to_string(), RegionalParams { p25: 0.7, p50: 1.0, p75: 1.4 }),
            ("South_East".to_string(), RegionalParams { p25: 0.8, p50: 1.1, p75: 1.5 }),
            ("South_South".to_string(), RegionalParams { p25: 0.5, p50: 0.7, p75: 1.0 }),
            ("South_West".to_string(), RegionalParams { p25: 0.9, p50: 1.2, p75: 1.6 }),
        ]);
        let conflict_params = HashMap::from([
            ("North_Central".to_string(), RegionalParams { p25: 15.0, p50: 25.0, p75: 40.0 }),
            ("North_East".to_string(), RegionalParams { p25: 10.0, p50: 18.0, p75: 30.0 }),
            ("North_West".to_string(), RegionalParams { p25: 12.0, p50: 22.0, p75: 35.0 }),
            ("South_East".to_string(), RegionalParams { p25: 25.0, p50: 40.0, p75: 60.0 }),
            ("South_South".to_string(), RegionalParams { p25: 20.0, p50: 35.0, p75: 55.0 }),
            ("South_West".to_string(), RegionalParams { p25: 30.0, p50: 45.0, p75: 65.0 }),
        ]);
        VulnerabilitySettings {
            flood_params,
            conflict_params,
            default_region: "North_Central".to_string(),
            flood_param_min: 0.05,
            flood_param_max: 2.0,
            conflict_param_min: 5.0,
            conflict_param_max: 100.0,
            flood_conflict_interaction: 1.3,
            conflict_flood_interaction: 1.2,
        }
    }
}

impl Default for SamplingSettings {
    fn default() -> Self {
        SamplingSettings {
            n_samples: 1_000,
            vulnerability_sigma: 0.3,
            exposure_uncertainty_pct: 25.0,
            seed: None,
        }
    }
}

impl Default for ValidationSettings {
    fn default() -> Self {
        ValidationSettings {
            max_plausible_displacement: 5_000_000.0,
            max_forecast_error_factor: 10.0,
            min_ensemble_size: 5,
            min_sample_count: 100,
        }
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        let recipients = HashMap::from([
            (
                AlertLevel::Watch,
                vec!["duty-officer@ews.example.org".to_string()],
            ),
            (
                AlertLevel::Advisory,
                vec![
                    "duty-officer@ews.example.org".to_string(),
                    "state-ema@ews.example.org".to_string(),
                ],
            ),
            (
                AlertLevel::Warning,
                vec![
                    "operations@ews.example.org".to_string(),
                    "state-ema@ews.example.org".to_string(),
                    "response-teams@ews.example.org".to_string(),
                ],
            ),
            (
                AlertLevel::Emergency,
                vec![
                    "operations@ews.example.org".to_string(),
                    "director@ews.example.org".to_string(),
                    "response-teams@ews.example.org".to_string(),
                    "partners@ews.example.org".to_string(),
                ],
            ),
        ]);
        AlertSettings {
            recipients,
            default_recipient: "operations@ews.example.org".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Build settings from the environment, falling back to defaults for
    /// anything unset. Regional tables and recipient lists come from the
    /// defaults; scalar tuning knobs are env-overridable.
    pub fn new() -> Result<Self, config::ConfigError> {
        let _settings = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        let mut settings = Settings::default();

        settings.forecast.flood_depth_threshold_m =
            env_f64("FLOOD_DEPTH_THRESHOLD_M", settings.forecast.flood_depth_threshold_m);
        settings.forecast.conflict_fatality_threshold = env_f64(
            "CONFLICT_FATALITY_THRESHOLD",
            settings.forecast.conflict_fatality_threshold,
        );
        settings.forecast.displacement_alert_levels.watch =
            env_f64("ALERT_LEVEL_WATCH", settings.forecast.displacement_alert_levels.watch);
        settings.forecast.displacement_alert_levels.advisory = env_f64(
            "ALERT_LEVEL_ADVISORY",
            settings.forecast.displacement_alert_levels.advisory,
        );
        settings.forecast.displacement_alert_levels.warning = env_f64(
            "ALERT_LEVEL_WARNING",
            settings.forecast.displacement_alert_levels.warning,
        );
        settings.forecast.displacement_alert_levels.emergency = env_f64(
            "ALERT_LEVEL_EMERGENCY",
            settings.forecast.displacement_alert_levels.emergency,
        );

        settings.vulnerability.flood_conflict_interaction = env_f64(
            "FLOOD_CONFLICT_INTERACTION",
            settings.vulnerability.flood_conflict_interaction,
        );
        settings.vulnerability.conflict_flood_interaction = env_f64(
            "CONFLICT_FLOOD_INTERACTION",
            settings.vulnerability.conflict_flood_interaction,
        );

        settings.sampling.n_samples = env::var("FORECAST_N_SAMPLES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(settings.sampling.n_samples);
        settings.sampling.seed = env::var("FORECAST_SEED")
            .ok()
            .and_then(|s| s.parse().ok());

        settings.validation.max_plausible_displacement = env_f64(
            "MAX_PLAUSIBLE_DISPLACEMENT",
            settings.validation.max_plausible_displacement,
        );
        settings.validation.max_forecast_error_factor = env_f64(
            "MAX_FORECAST_ERROR_FACTOR",
            settings.validation.max_forecast_error_factor,
        );

        settings.logging.level =
            env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());

        Ok(settings)
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_regional_tables_cover_all_zones() {
        let settings = Settings::default();
        for zone in [
            "North_Central",
            "North_East",
            "North_West",
            "South_East",
            "South_South",
            "South_West",
        ] {
            assert!(settings.vulnerability.flood_params.contains_key(zone));
            assert!(settings.vulnerability.conflict_params.contains_key(zone));
        }
        assert!(settings
            .vulnerability
            .flood_params
            .contains_key(&settings.vulnerability.default_region));
    }

    #[test]
    fn test_alert_thresholds_are_ascending() {
        let levels = Settings::default().forecast.displacement_alert_levels;
        assert!(levels.watch < levels.advisory);
        assert!(levels.advisory < levels.warning);
        assert!(levels.warning < levels.emergency);
    }

    #[test]
    fn test_regional_quantiles_within_model_range() {
        let v = Settings::default().vulnerability;
        for params in v.flood_params.values() {
            assert!(params.p50 >= v.flood_param_min && params.p50 <= v.flood_param_max);
        }
        for params in v.conflict_params.values() {
            assert!(params.p50 >= v.conflict_param_min && params.p50 <= v.conflict_param_max);
        }
    }
}
