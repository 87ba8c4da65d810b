use tracing::debug;

use crate::config::VulnerabilitySettings;
use crate::error::ForecastError;
use crate::models::{CombinationMethod, HazardContext, InteractionMetrics};
use crate::utils::math;

const EPSILON: f64 = 1e-10;
const MAX_DISPLACEMENT_FRACTION: f64 = 0.95;
/// Normalized-intensity floor for the co-occurrence gate. The hard step at
/// this boundary is intentional and preserved.
const CO_OCCURRENCE_FLOOR: f64 = 0.1;

/// Merges per-event flood and conflict impact series into one combined
/// estimate, modelling compounding and cascading effects.
#[derive(Debug, Clone)]
pub struct HazardInteractionCombiner {
    settings: VulnerabilitySettings,
}

impl HazardInteractionCombiner {
    pub fn new(settings: VulnerabilitySettings) -> Self {
        Self { settings }
    }

    /// Combine two aligned series. All four inputs must share one length;
    /// impacts are displacement fractions evaluated at the paired
    /// intensities.
    pub fn combine(
        &self,
        flood_intensity: &[f64],
        conflict_intensity: &[f64],
        flood_impact: &[f64],
        conflict_impact: &[f64],
        context: &HazardContext,
        method: CombinationMethod,
    ) -> Result<(Vec<f64>, InteractionMetrics), ForecastError> {
        let n = flood_intensity.len();
        for other in [conflict_intensity.len(), flood_impact.len(), conflict_impact.len()] {
            if other != n {
                return Err(ForecastError::SeriesLengthMismatch { left: n, right: other });
            }
        }

        match method {
            CombinationMethod::SimpleMax => {
                let mut combined: Vec<f64> = flood_impact
                    .iter()
                    .zip(conflict_impact.iter())
                    .map(|(&f, &c)| f.max(c))
                    .collect();
                math::clip_in_place(&mut combined, 0.0, MAX_DISPLACEMENT_FRACTION);
                let max = max_of(&combined);
                Ok((combined, InteractionMetrics::neutral(method, max)))
            }
            CombinationMethod::WeightedSum => {
                let mut combined: Vec<f64> = (0..n)
                    .map(|i| {
                        let weight_flood = flood_intensity[i]
                            / (flood_intensity[i] + conflict_intensity[i] + EPSILON);
                        weight_flood * flood_impact[i] + (1.0 - weight_flood) * conflict_impact[i]
                    })
                    .collect();
                math::clip_in_place(&mut combined, 0.0, MAX_DISPLACEMENT_FRACTION);
                let max = max_of(&combined);
                Ok((combined, InteractionMetrics::neutral(method, max)))
            }
            CombinationMethod::Sophisticated => {
                self.sophisticated(flood_intensity, conflict_intensity, flood_impact, conflict_impact, context)
            }
        }
    }

    /// Compounding where the hazards co-occur, plus directional cascades:
    /// major floods raise resource-conflict risk, major conflict degrades
    /// flood defences.
    fn sophisticated(
        &self,
        flood_intensity: &[f64],
        conflict_intensity: &[f64],
        flood_impact: &[f64],
        conflict_impact: &[f64],
        context: &HazardContext,
    ) -> Result<(Vec<f64>, InteractionMetrics), ForecastError> {
        let n = flood_intensity.len();

        let flood_max = max_of(flood_intensity) + EPSILON;
        let conflict_max = max_of(conflict_intensity) + EPSILON;
        let flood_norm: Vec<f64> = flood_intensity.iter().map(|&x| x / flood_max).collect();
        let conflict_norm: Vec<f64> = conflict_intensity.iter().map(|&x| x / conflict_max).collect();

        // Context shapes interaction strength: weak infrastructure and
        // deep poverty both amplify compounding.
        let context_amplifier = {
            let mut amp = 1.0;
            if context.infrastructure_quality < 0.3 {
                amp *= 1.2;
            }
            if context.poverty_rate > 0.5 {
                amp *= 1.15;
            }
            amp
        };

        let mut compounding_factors = vec![1.0; n];
        let mut combined: Vec<f64> = (0..n)
            .map(|i| {
                let base = flood_impact[i].max(conflict_impact[i]);
                let co_occurring = flood_norm[i] > CO_OCCURRENCE_FLOOR
                    && conflict_norm[i] > CO_OCCURRENCE_FLOOR;
                if !co_occurring {
                    return base;
                }
                // The hazard contributing the base impact selects the
                // interaction direction.
                let coefficient = if flood_impact[i] >= conflict_impact[i] {
                    self.settings.flood_conflict_interaction
                } else {
                    self.settings.conflict_flood_interaction
                };
                let factor =
                    1.0 + (coefficient * context_amplifier - 1.0) * flood_norm[i] * conflict_norm[i];
                compounding_factors[i] = factor;
                base * factor
            })
            .collect();

        let mean_flood_norm = math::mean(&flood_norm);
        let mean_conflict_norm = math::mean(&conflict_norm);

        let cascade_flood_to_conflict = if mean_flood_norm > 0.5 {
            let prob = 0.15 * mean_flood_norm * (1.0 - context.infrastructure_quality);
            for (c, &impact) in combined.iter_mut().zip(conflict_impact.iter()) {
                *c += prob * impact * 0.3;
            }
            prob
        } else {
            0.0
        };

        let cascade_conflict_to_flood = if mean_conflict_norm > 0.5 {
            let prob = 0.10 * mean_conflict_norm;
            for (c, &impact) in combined.iter_mut().zip(flood_impact.iter()) {
                *c += prob * impact * 0.2;
            }
            prob
        } else {
            0.0
        };

        math::clip_in_place(&mut combined, 0.0, MAX_DISPLACEMENT_FRACTION);

        let metrics = InteractionMetrics {
            method: CombinationMethod::Sophisticated,
            base_interaction: self.settings.flood_conflict_interaction,
            compounding_factor: math::mean(&compounding_factors),
            cascade_flood_to_conflict,
            cascade_conflict_to_flood,
            max_displacement_fraction: max_of(&combined),
        };

        debug!(
            compounding = metrics.compounding_factor,
            cascade_fc = metrics.cascade_flood_to_conflict,
            cascade_cf = metrics.cascade_conflict_to_flood,
            "Combined multi-hazard impacts"
        );

        Ok((combined, metrics))
    }
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}
