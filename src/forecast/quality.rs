use tracing::warn;

use crate::config::ValidationSettings;
use crate::models::{ExposureData, HazardSeries};
use crate::utils::math;

/// Automated quality control over a forecast run's inputs and outputs.
///
/// Hard failures return `(false, reasons)`; everything else accumulates as
/// warnings that lower the quality score without aborting the run.
#[derive(Debug, Clone)]
pub struct QualityController {
    settings: ValidationSettings,
}

impl QualityController {
    pub fn new(settings: ValidationSettings) -> Self {
        Self { settings }
    }

    pub fn validate_inputs(
        &self,
        hazards: &[HazardSeries],
        exposure: &ExposureData,
    ) -> (bool, Vec<String>) {
        let mut warnings = Vec::new();

        for hazard in hazards {
            if hazard.n_events() == 0 {
                return (
                    false,
                    vec![format!("{} hazard has no events", hazard.hazard_type)],
                );
            }
            if hazard.all_zero() {
                warnings.push(format!("{} hazard intensity is all zeros", hazard.hazard_type));
            }
            if hazard.n_events() < self.settings.min_ensemble_size {
                warnings.push(format!(
                    "Low ensemble size for {}: {}",
                    hazard.hazard_type,
                    hazard.n_events()
                ));
            }
        }

        if exposure.is_empty() {
            return (false, vec!["Exposure has no records".to_string()]);
        }
        if exposure.total_value() == 0.0 {
            return (false, vec!["Exposure values sum to zero".to_string()]);
        }

        (true, warnings)
    }

    pub fn validate_outputs(&self, samples: &[f64]) -> (bool, Vec<String>) {
        let mut warnings = Vec::new();
        let mut errors = Vec::new();

        if samples.iter().any(|s| s.is_nan()) {
            errors.push("NaN values in forecast output".to_string());
        }

        let max = samples.iter().copied().fold(0.0, f64::max);
        if max > self.settings.max_plausible_displacement {
            warnings.push(format!("Very high displacement forecast: {max:.0}"));
        }

        let p05 = math::percentile(samples, 5.0);
        let p95 = math::percentile(samples, 95.0);
        let uncertainty_ratio = p95 / (p05 + 1.0);
        if uncertainty_ratio > self.settings.max_forecast_error_factor {
            warnings.push(format!("High uncertainty: {uncertainty_ratio:.1}x range"));
        }

        if samples.len() < self.settings.min_sample_count {
            warnings.push(format!("Low sample size: {}", samples.len()));
        }

        if !errors.is_empty() {
            errors.extend(warnings);
            return (false, errors);
        }
        (true, warnings)
    }

    /// Overall quality score in [0, 1]: mean of the three component
    /// qualities minus a capped warning penalty, so a single recoverable
    /// issue cannot zero out an otherwise sound forecast.
    pub fn quality_score(
        &self,
        hazard_quality: f64,
        model_confidence: f64,
        data_completeness: f64,
        n_warnings: usize,
    ) -> f64 {
        let base = (hazard_quality + model_confidence + data_completeness) / 3.0;
        let penalty = (0.1 * n_warnings as f64).min(0.3);
        let score = (base - penalty).max(0.0);
        if score == 0.0 {
            warn!(n_warnings, "Quality score floored at zero");
        }
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::models::HazardType;

    fn controller() -> QualityController {
        QualityController::new(Settings::default().validation)
    }

    #[test]
    fn test_zero_event_hazard_fails_hard() {
        let hazards = vec![HazardSeries::new(HazardType::Flood, vec![])];
        let exposure = ExposureData::single("Benue", 100_000.0);
        let (ok, messages) = controller().validate_inputs(&hazards, &exposure);
        assert!(!ok);
        assert!(messages[0].contains("no events"));
    }

    #[test]
    fn test_zero_value_exposure_fails_with_zero_message() {
        let hazards = vec![HazardSeries::new(HazardType::Flood, vec![1.0; 10])];
        let exposure = ExposureData::new(vec![
            crate::models::ExposureRecord { name: "A".into(), value: 0.0 },
            crate::models::ExposureRecord { name: "B".into(), value: 0.0 },
        ]);
        let (ok, messages) = controller().validate_inputs(&hazards, &exposure);
        assert!(!ok);
        assert!(messages.iter().any(|m| m.to_lowercase().contains("zero")));
    }

    #[test]
    fn test_empty_exposure_fails_hard() {
        let hazards = vec![HazardSeries::new(HazardType::Conflict, vec![10.0; 10])];
        let (ok, _) = controller().validate_inputs(&hazards, &ExposureData::new(vec![]));
        assert!(!ok);
    }

    #[test]
    fn test_small_ensemble_and_zero_intensity_only_warn() {
        let hazards = vec![HazardSeries::new(HazardType::Flood, vec![0.0, 0.0, 0.0])];
        let exposure = ExposureData::single("Benue", 100_000.0);
        let (ok, warnings) = controller().validate_inputs(&hazards, &exposure);
        assert!(ok);
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_nan_in_outputs_fails_hard() {
        let samples = vec![100.0, f64::NAN, 300.0];
        let (ok, messages) = controller().validate_outputs(&samples);
        assert!(!ok);
        assert!(messages[0].contains("NaN"));
    }

    #[test]
    fn test_plausible_outputs_pass_with_warnings() {
        // Implausibly high max and a small sample set: warned, not fatal.
        let samples = vec![6_000_000.0; 50];
        let (ok, warnings) = controller().validate_outputs(&samples);
        assert!(ok);
        assert!(warnings.iter().any(|w| w.contains("Very high")));
        assert!(warnings.iter().any(|w| w.contains("Low sample size")));
    }

    #[test]
    fn test_quality_score_penalty_is_capped() {
        let c = controller();
        let clean = c.quality_score(0.8, 0.75, 0.9, 0);
        assert!((clean - (0.8 + 0.75 + 0.9) / 3.0).abs() < 1e-9);

        let few = c.quality_score(0.8, 0.75, 0.9, 2);
        assert!((clean - few - 0.2).abs() < 1e-9);

        // Penalty saturates at 0.3 no matter how many warnings pile up.
        let many = c.quality_score(0.8, 0.75, 0.9, 50);
        assert!((clean - many - 0.3).abs() < 1e-9);

        assert_eq!(c.quality_score(0.1, 0.1, 0.1, 50), 0.0);
    }
}
