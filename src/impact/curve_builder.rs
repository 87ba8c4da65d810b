use tracing::debug;

use crate::config::ForecastSettings;
use crate::models::{
    CompoundingFactors, HazardContext, HazardType, ImpactCurve, SettlementType,
    VulnerabilityParameter,
};
use crate::utils::math;

/// Sigmoid steepness per hazard: floods displace sharply once depth passes
/// the half-impact point, conflict displacement grows more gradually.
const FLOOD_STEEPNESS: f64 = 5.0;
const CONFLICT_STEEPNESS: f64 = 3.0;

/// Displacement fraction where the mid regime hands over to the
/// high-intensity saturation branch.
const SATURATION_FLOOR: f64 = 0.85;

const MAX_DISPLACEMENT_FRACTION: f64 = 0.95;

/// Builds a full intensity-to-impact curve from a vulnerability parameter,
/// the unit's context and its concurrent stressors.
#[derive(Debug, Clone)]
pub struct ImpactCurveBuilder {
    settings: ForecastSettings,
}

impl ImpactCurveBuilder {
    pub fn new(settings: ForecastSettings) -> Self {
        Self { settings }
    }

    pub fn build(
        &self,
        context: &HazardContext,
        compounding: &CompoundingFactors,
        vulnerability: &VulnerabilityParameter,
    ) -> ImpactCurve {
        let hazard_type = vulnerability.hazard_type;
        let (intensity, threshold) = self.intensity_grid(hazard_type);

        let adjusted = adjust_for_context(vulnerability.value, context);
        let adjusted = adjust_for_compounding(adjusted, compounding, hazard_type);

        debug!(
            hazard = %hazard_type,
            state = %context.state,
            base = vulnerability.value,
            adjusted,
            "Adjusted vulnerability parameter"
        );

        let displacement_fraction =
            build_displacement_curve(&intensity, threshold, adjusted, hazard_type, context);
        let affected_area_fraction = build_area_curve(&intensity, hazard_type, context);

        ImpactCurve {
            hazard_type,
            name: format!("{}_adaptive_{}", hazard_type, context.state),
            intensity_unit: hazard_type.intensity_unit().to_string(),
            intensity,
            displacement_fraction,
            affected_area_fraction,
        }
    }

    fn intensity_grid(&self, hazard_type: HazardType) -> (Vec<f64>, f64) {
        match hazard_type {
            HazardType::Flood => (
                math::arange(
                    0.0,
                    self.settings.flood_intensity_max_m,
                    self.settings.flood_intensity_step_m,
                ),
                self.settings.flood_depth_threshold_m,
            ),
            HazardType::Conflict => (
                math::arange(
                    0.0,
                    self.settings.conflict_intensity_max,
                    self.settings.conflict_intensity_step,
                ),
                self.settings.conflict_fatality_threshold,
            ),
        }
    }
}

/// Contextual multipliers on the half-impact parameter, composed
/// multiplicatively in a fixed order. A larger parameter means the unit
/// tolerates more intensity before displacing.
pub fn adjust_for_context(half_impact: f64, context: &HazardContext) -> f64 {
    let mut adjustment = 1.0;

    if context.infrastructure_quality < 0.3 {
        adjustment *= 0.85;
    } else if context.infrastructure_quality > 0.7 {
        adjustment *= 1.15;
    }

    if context.early_warning_coverage > 0.7 {
        adjustment *= 1.25;
    } else if context.early_warning_coverage < 0.3 {
        adjustment *= 0.9;
    }

    match context.settlement {
        SettlementType::Urban => adjustment *= 1.1,
        SettlementType::Rural => adjustment *= 0.95,
        SettlementType::PeriUrban => {}
    }

    if context.poverty_rate > 0.5 {
        adjustment *= 0.85;
    }

    half_impact * adjustment
}

/// Compounding multipliers: prior shocks and seasonal pressure lower the
/// parameter (earlier displacement), harvest season raises it.
pub fn adjust_for_compounding(
    half_impact: f64,
    compounding: &CompoundingFactors,
    hazard_type: HazardType,
) -> f64 {
    let mut adjustment = 1.0;

    if compounding.has_recent_flood {
        adjustment *= 0.8;
    }
    if compounding.has_recent_conflict {
        adjustment *= 0.75;
    }
    if compounding.has_displacement_camp {
        adjustment *= 0.7;
    }
    if compounding.is_rainy_season && hazard_type == HazardType::Flood {
        adjustment *= 0.85;
    }
    if compounding.is_harvest_season {
        adjustment *= 1.1;
    }
    if compounding.market_access_disrupted {
        adjustment *= 0.9;
    }
    if compounding.healthcare_access_limited {
        adjustment *= 0.85;
    }

    half_impact * adjustment
}

/// Three-regime displacement curve over the grid.
///
/// Base logistic sigmoid centered on the half-impact parameter, a linear
/// onset ramp between the threshold and half/2, and an asymptotic
/// saturation branch past 2x the parameter. The mid regime is ceilinged at
/// the saturation floor so both regime handovers are continuous and the
/// curve stays monotone.
fn build_displacement_curve(
    intensity: &[f64],
    threshold: f64,
    half_impact: f64,
    hazard_type: HazardType,
    context: &HazardContext,
) -> Vec<f64> {
    let steepness = match hazard_type {
        HazardType::Flood => FLOOD_STEEPNESS,
        HazardType::Conflict => CONFLICT_STEEPNESS,
    };
    let ramp_end = half_impact * 0.5;
    let saturation_start = half_impact * 2.0;

    let mut mdd: Vec<f64> = intensity
        .iter()
        .map(|&x| {
            if x < threshold {
                return 0.0;
            }
            if x > saturation_start {
                return SATURATION_FLOOR
                    + 0.14 * (1.0 - (-(x - saturation_start) / half_impact).exp());
            }

            let sigmoid = 1.0 / (1.0 + (-steepness * (x - half_impact) / half_impact).exp());
            let value = if x < ramp_end {
                // Gradual onset: ramp_end > threshold is implied by
                // threshold <= x < ramp_end.
                sigmoid * (0.5 + 0.5 * (x - threshold) / (ramp_end - threshold))
            } else {
                sigmoid
            };
            value.min(SATURATION_FLOOR)
        })
        .collect();

    // Good coverage softens early-onset impact more than late-onset.
    if context.early_warning_coverage > 0.7 {
        let max_intensity = intensity.last().copied().unwrap_or(1.0).max(f64::EPSILON);
        for (v, &x) in mdd.iter_mut().zip(intensity.iter()) {
            *v *= 0.85 + 0.15 * (x / max_intensity);
        }
    }

    math::clip_in_place(&mut mdd, 0.0, MAX_DISPLACEMENT_FRACTION);
    mdd
}

/// Affected-area curve, independent of the displacement curve. Floods are
/// localized at low depth; conflict reach depends on settlement density.
fn build_area_curve(intensity: &[f64], hazard_type: HazardType, context: &HazardContext) -> Vec<f64> {
    let mut paa: Vec<f64> = intensity
        .iter()
        .map(|&x| match hazard_type {
            HazardType::Flood => 0.3 + 0.7 * (1.0 - (-x / 0.5).exp()),
            HazardType::Conflict => {
                if context.population_density > 500.0 {
                    0.5 + 0.5 * (1.0 - (-x / 20.0).exp())
                } else {
                    0.7 + 0.3 * (1.0 - (-x / 30.0).exp())
                }
            }
        })
        .collect();
    math::clip_in_place(&mut paa, 0.1, 1.0);
    paa
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn base_context() -> HazardContext {
        HazardContext {
            state: "Benue".to_string(),
            region: "North_Central".to_string(),
            month: 9,
            population_density: 150.0,
            poverty_rate: 0.45,
            previous_events_30d: 2,
            previous_events_90d: 5,
            distance_to_water_km: 2.5,
            elevation_m: 120.0,
            settlement: SettlementType::Rural,
            infrastructure_quality: 0.35,
            early_warning_coverage: 0.55,
        }
    }

    fn builder() -> ImpactCurveBuilder {
        ImpactCurveBuilder::new(Settings::default().forecast)
    }

    fn flood_param(value: f64) -> VulnerabilityParameter {
        VulnerabilityParameter {
            hazard_type: HazardType::Flood,
            value,
        }
    }

    #[test]
    fn test_context_adjustment_applies_all_multipliers() {
        // Every contextual gate tripped: weak infrastructure, poor warning
        // coverage, rural settlement, high poverty.
        let mut ctx = base_context();
        ctx.infrastructure_quality = 0.25;
        ctx.early_warning_coverage = 0.25;
        ctx.poverty_rate = 0.55;

        let adjusted = adjust_for_context(1.5, &ctx);
        let expected = 1.5 * 0.85 * 0.9 * 0.95 * 0.85;
        assert!((adjusted - expected).abs() < 1e-9);
        assert!((adjusted - 0.9266).abs() < 1e-3);
    }

    #[test]
    fn test_context_adjustment_neutral_in_mid_band() {
        // 0.3 < infra < 0.7 and 0.3 < warning < 0.7 and poverty < 0.5
        // leave only the settlement multiplier.
        let ctx = base_context();
        let adjusted = adjust_for_context(1.5, &ctx);
        assert!((adjusted - 1.5 * 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_compounding_multipliers_compose() {
        let compounding = CompoundingFactors {
            has_recent_flood: true,
            is_rainy_season: true,
            ..Default::default()
        };
        let adjusted = adjust_for_compounding(1.0, &compounding, HazardType::Flood);
        assert!((adjusted - 0.8 * 0.85).abs() < 1e-9);

        // Rainy season only applies to flood curves.
        let adjusted = adjust_for_compounding(1.0, &compounding, HazardType::Conflict);
        assert!((adjusted - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_zero_below_threshold() {
        let curve = builder().build(&base_context(), &CompoundingFactors::default(), &flood_param(1.0));
        let threshold = Settings::default().forecast.flood_depth_threshold_m;
        for (x, mdd) in curve.intensity.iter().zip(curve.displacement_fraction.iter()) {
            if *x < threshold {
                assert_eq!(*mdd, 0.0, "nonzero displacement below threshold at {x}");
            }
        }
    }

    #[test]
    fn test_curve_monotone_and_bounded() {
        for param in [0.3, 0.9, 1.5] {
            let curve =
                builder().build(&base_context(), &CompoundingFactors::default(), &flood_param(param));
            let mut prev = 0.0_f64;
            for &mdd in &curve.displacement_fraction {
                assert!(mdd >= 0.0 && mdd <= 0.95);
                assert!(
                    mdd >= prev - 1e-9,
                    "curve decreased: {prev} -> {mdd} (param {param})"
                );
                prev = mdd;
            }
        }
    }

    #[test]
    fn test_no_jump_at_regime_boundaries() {
        let ctx = base_context();
        let curve = builder().build(&ctx, &CompoundingFactors::default(), &flood_param(1.0));
        let half = adjust_for_context(1.0, &ctx);
        let ramp_end = half * 0.5;
        let saturation_start = half * 2.0;

        // The step across each regime handover must look like a regular
        // grid step, not an artifact of whichever mask ran last.
        for boundary in [ramp_end, saturation_start] {
            for (pair_x, pair_y) in curve
                .intensity
                .windows(2)
                .zip(curve.displacement_fraction.windows(2))
            {
                if pair_x[0] <= boundary && pair_x[1] > boundary {
                    let step = (pair_y[1] - pair_y[0]).abs();
                    assert!(step < 2e-2, "jump of {step} across boundary {boundary}");
                }
            }
        }
    }

    #[test]
    fn test_high_regime_saturates_below_cap() {
        let curve = builder().build(&base_context(), &CompoundingFactors::default(), &flood_param(0.5));
        let last = *curve.displacement_fraction.last().unwrap();
        assert!(last > 0.9);
        assert!(last <= 0.95);
    }

    #[test]
    fn test_early_warning_scales_onset_more_than_tail() {
        let mut covered = base_context();
        covered.early_warning_coverage = 0.8;
        let plain = builder().build(&base_context(), &CompoundingFactors::default(), &flood_param(1.0));
        let scaled = builder().build(&covered, &CompoundingFactors::default(), &flood_param(1.0));

        // Coverage > 0.7 also shifts the parameter right (x1.25), so
        // compare the scaling factor shape on the raw curves directly:
        // early grid points shrink by more than late ones.
        let early = 10;
        let late = plain.len() - 1;
        let ratio_early = scaled.displacement_fraction[early]
            / plain.displacement_fraction[early].max(f64::EPSILON);
        let ratio_late =
            scaled.displacement_fraction[late] / plain.displacement_fraction[late].max(f64::EPSILON);
        assert!(ratio_early <= ratio_late + 1e-9);
    }

    #[test]
    fn test_area_curve_bounds_and_density_split() {
        let conflict_param = VulnerabilityParameter {
            hazard_type: HazardType::Conflict,
            value: 30.0,
        };
        let rural = builder().build(&base_context(), &CompoundingFactors::default(), &conflict_param);
        let mut dense_ctx = base_context();
        dense_ctx.population_density = 800.0;
        let dense = builder().build(&dense_ctx, &CompoundingFactors::default(), &conflict_param);

        for paa in rural
            .affected_area_fraction
            .iter()
            .chain(dense.affected_area_fraction.iter())
        {
            assert!(*paa >= 0.1 && *paa <= 1.0);
        }
        // Rural conflict starts wider-area than urban conflict.
        assert!(rural.affected_area_fraction[0] > dense.affected_area_fraction[0]);
    }

    #[test]
    fn test_grids_match_hazard_resolution() {
        let flood = builder().build(&base_context(), &CompoundingFactors::default(), &flood_param(1.0));
        assert_eq!(flood.len(), 120);
        assert_eq!(flood.intensity_unit, "m");

        let conflict_param = VulnerabilityParameter {
            hazard_type: HazardType::Conflict,
            value: 25.0,
        };
        let conflict = builder().build(&base_context(), &CompoundingFactors::default(), &conflict_param);
        assert_eq!(conflict.len(), 125);
        assert_eq!(conflict.intensity_unit, "events");
    }
}
