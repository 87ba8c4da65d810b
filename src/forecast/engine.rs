use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::alerts::{AlertDecisionEngine, AlertDistributor, LogDistributor};
use crate::config::Settings;
use crate::error::ForecastError;
use crate::forecast::quality::QualityController;
use crate::forecast::sampler::EnsembleSampler;
use crate::impact::{HazardInteractionCombiner, ImpactCurveBuilder};
use crate::models::{
    AlertDecision, CombinationMethod, CompoundingFactors, ConfidenceLevel, ExposureData,
    ForecastMetrics, HazardContext, HazardSeries, HazardType, ImpactCurve, InteractionMetrics,
};
use crate::utils::math;
use crate::vulnerability::VulnerabilityEstimator;

/// Everything one forecast run consumes, supplied by external
/// collaborators. The engine performs no I/O of its own.
#[derive(Debug, Clone)]
pub struct ForecastInput {
    pub forecast_date: DateTime<Utc>,
    pub lead_time_days: f64,
    pub hazards: Vec<HazardSeries>,
    pub exposure: ExposureData,
    pub contexts: HashMap<String, HazardContext>,
    pub compounding: CompoundingFactors,
    pub method: CombinationMethod,
}

/// Everything one forecast run produces.
#[derive(Debug, Clone)]
pub struct ForecastOutcome {
    pub metrics: ForecastMetrics,
    pub samples: Vec<f64>,
    pub curves: Vec<ImpactCurve>,
    pub interaction: Option<InteractionMetrics>,
    pub alert: AlertDecision,
}

/// Wires the pipeline: vulnerability, curve construction, combination,
/// sampling, quality control, alert decision.
///
/// Holds only immutable configuration and the shared read-only estimator,
/// so one engine serves concurrent per-unit runs without locking.
pub struct ForecastEngine {
    estimator: VulnerabilityEstimator,
    curve_builder: ImpactCurveBuilder,
    combiner: HazardInteractionCombiner,
    quality: QualityController,
    sampler: EnsembleSampler,
    alert_engine: AlertDecisionEngine,
    distributor: Box<dyn AlertDistributor>,
}

impl ForecastEngine {
    pub fn new(settings: Settings, estimator: VulnerabilityEstimator) -> Self {
        Self {
            estimator,
            curve_builder: ImpactCurveBuilder::new(settings.forecast.clone()),
            combiner: HazardInteractionCombiner::new(settings.vulnerability.clone()),
            quality: QualityController::new(settings.validation.clone()),
            sampler: EnsembleSampler::new(settings.sampling.clone()),
            alert_engine: AlertDecisionEngine::new(
                settings.forecast.displacement_alert_levels.clone(),
                settings.alert.clone(),
            ),
            distributor: Box::new(LogDistributor),
        }
    }

    pub fn with_distributor(mut self, distributor: Box<dyn AlertDistributor>) -> Self {
        self.distributor = distributor;
        self
    }

    /// Run a complete forecast for one unit. Fatal validation failures
    /// abort before any partial result; quality warnings accumulate into
    /// the returned metrics instead.
    pub fn run(&self, input: &ForecastInput) -> Result<ForecastOutcome, ForecastError> {
        let started = Instant::now();
        let forecast_id = format!(
            "{}_{:.0}d",
            input.forecast_date.format("%Y%m%d%H"),
            input.lead_time_days
        );

        info!(
            forecast_id = %forecast_id,
            hazards = input.hazards.len(),
            units = input.contexts.len(),
            "Starting forecast"
        );

        self.check_shape(input)?;

        let (ok, mut warnings) = self.quality.validate_inputs(&input.hazards, &input.exposure);
        if !ok {
            return Err(ForecastError::input_validation(warnings));
        }
        for warning in &warnings {
            warn!(forecast_id = %forecast_id, warning = %warning, "Input quality warning");
        }

        let context = self.representative_context(input);

        // One adaptive curve per hazard, evaluated at that hazard's own
        // ensemble intensities.
        let mut curves = Vec::with_capacity(input.hazards.len());
        let mut evaluated = Vec::with_capacity(input.hazards.len());
        for hazard in &input.hazards {
            let vulnerability = self.estimator.estimate(context, hazard.hazard_type);
            let curve = self
                .curve_builder
                .build(context, &input.compounding, &vulnerability);
            let impacts = curve.evaluate(&hazard.event_intensities);
            let areas: Vec<f64> = hazard
                .event_intensities
                .iter()
                .map(|&x| curve.affected_area_at(x))
                .collect();
            evaluated.push(EvaluatedHazard {
                hazard_type: hazard.hazard_type,
                intensities: hazard.event_intensities.clone(),
                impacts,
                areas,
            });
            curves.push(curve);
        }

        let (event_impacts, event_areas, interaction) =
            self.combine_hazards(evaluated, context, input.method, &mut warnings)?;

        let samples = self
            .sampler
            .sample(&event_impacts, &event_areas, input.exposure.total_value());

        let (ok, output_messages) = self.quality.validate_outputs(&samples.displacement);
        if !ok {
            return Err(ForecastError::output_validation(output_messages));
        }
        warnings.extend(output_messages);

        let metrics = self.build_metrics(
            forecast_id.clone(),
            input,
            &samples.displacement,
            event_impacts.len(),
            (
                samples.hazard_uncertainty_pct,
                samples.exposure_uncertainty_pct,
                samples.vulnerability_uncertainty_pct,
            ),
            warnings,
            started.elapsed().as_secs_f64(),
        );

        let alert = self
            .alert_engine
            .generate(&samples.displacement, &metrics, &input.contexts);

        if alert.should_trigger {
            if let Err(e) = self.distributor.distribute(&alert) {
                error!(forecast_id = %forecast_id, error = %e, "Alert distribution failed");
            }
        } else {
            info!(
                forecast_id = %forecast_id,
                level = %alert.alert_level,
                "Alert below distribution bar"
            );
        }

        info!(
            forecast_id = %forecast_id,
            processing_seconds = metrics.processing_time_seconds,
            mean_displacement = metrics.mean_displacement,
            quality = metrics.quality_score,
            "Forecast completed"
        );

        Ok(ForecastOutcome {
            metrics,
            samples: samples.displacement,
            curves,
            interaction,
            alert,
        })
    }

    fn check_shape(&self, input: &ForecastInput) -> Result<(), ForecastError> {
        let mut messages = Vec::new();
        if input.hazards.is_empty() {
            messages.push("No hazard series supplied".to_string());
        }
        if input.hazards.len() > 2 {
            messages.push(format!(
                "At most two hazard series supported, got {}",
                input.hazards.len()
            ));
        }
        if input.hazards.len() == 2
            && input.hazards[0].hazard_type == input.hazards[1].hazard_type
        {
            messages.push(format!(
                "Duplicate hazard type: {}",
                input.hazards[0].hazard_type
            ));
        }
        if input.contexts.is_empty() {
            messages.push("No unit contexts supplied".to_string());
        }
        if messages.is_empty() {
            Ok(())
        } else {
            Err(ForecastError::input_validation(messages))
        }
    }

    /// Curve construction needs one conditioning context; use the first
    /// unit in name order so runs are deterministic.
    fn representative_context<'a>(&self, input: &'a ForecastInput) -> &'a HazardContext {
        let mut states: Vec<&String> = input.contexts.keys().collect();
        states.sort();
        &input.contexts[states[0]]
    }

    fn combine_hazards(
        &self,
        mut evaluated: Vec<EvaluatedHazard>,
        context: &HazardContext,
        method: CombinationMethod,
        warnings: &mut Vec<String>,
    ) -> Result<(Vec<f64>, Vec<f64>, Option<InteractionMetrics>), ForecastError> {
        if evaluated.len() == 1 {
            let single = evaluated.remove(0);
            return Ok((single.impacts, single.areas, None));
        }

        let conflict_idx = evaluated
            .iter()
            .position(|e| e.hazard_type == HazardType::Conflict)
            .unwrap_or(1);
        let mut conflict = evaluated.remove(conflict_idx);
        let mut flood = evaluated.remove(0);

        let common = flood.intensities.len().min(conflict.intensities.len());
        if flood.intensities.len() != conflict.intensities.len() {
            warnings.push(format!(
                "Ensemble size mismatch ({} flood, {} conflict), truncating to {}",
                flood.intensities.len(),
                conflict.intensities.len(),
                common
            ));
            flood.truncate(common);
            conflict.truncate(common);
        }

        let (combined, metrics) = self.combiner.combine(
            &flood.intensities,
            &conflict.intensities,
            &flood.impacts,
            &conflict.impacts,
            context,
            method,
        )?;

        // Area affected by either hazard bounds the combined footprint.
        let areas: Vec<f64> = flood
            .areas
            .iter()
            .zip(conflict.areas.iter())
            .map(|(&f, &c)| f.max(c))
            .collect();

        Ok((combined, areas, Some(metrics)))
    }

    #[allow(clippy::too_many_arguments)]
    fn build_metrics(
        &self,
        forecast_id: String,
        input: &ForecastInput,
        displacement: &[f64],
        n_ensemble_members: usize,
        uncertainty_pct: (f64, f64, f64),
        warnings: Vec<String>,
        processing_time_seconds: f64,
    ) -> ForecastMetrics {
        // Hazard and completeness qualities are fixed deployment
        // assumptions; model confidence improves when a trained
        // vulnerability model backs at least one hazard.
        let model_confidence = if input
            .hazards
            .iter()
            .any(|h| self.estimator.has_trained_model(h.hazard_type))
        {
            0.85
        } else {
            0.7
        };
        let quality_score =
            self.quality
                .quality_score(0.8, model_confidence, 0.9, warnings.len());

        ForecastMetrics {
            forecast_id,
            timestamp: input.forecast_date,
            lead_time_days: input.lead_time_days,
            processing_time_seconds,
            n_samples: displacement.len(),
            n_ensemble_members,
            mean_displacement: math::mean(displacement),
            median_displacement: math::median(displacement),
            p05_displacement: math::percentile(displacement, 5.0),
            p95_displacement: math::percentile(displacement, 95.0),
            max_displacement: displacement.iter().copied().fold(0.0, f64::max),
            hazard_uncertainty_pct: uncertainty_pct.0,
            exposure_uncertainty_pct: uncertainty_pct.1,
            vulnerability_uncertainty_pct: uncertainty_pct.2,
            quality_score,
            confidence_level: ConfidenceLevel::from_score(quality_score),
            warnings,
            errors: Vec::new(),
        }
    }
}

struct EvaluatedHazard {
    hazard_type: HazardType,
    intensities: Vec<f64>,
    impacts: Vec<f64>,
    areas: Vec<f64>,
}

impl EvaluatedHazard {
    fn truncate(&mut self, len: usize) {
        self.intensities.truncate(len);
        self.impacts.truncate(len);
        self.areas.truncate(len);
    }
}
