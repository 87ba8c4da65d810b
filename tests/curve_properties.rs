use proptest::prelude::*;

use displacement_ibf::{
    config::Settings,
    impact::{HazardInteractionCombiner, ImpactCurveBuilder},
    models::{
        CombinationMethod, CompoundingFactors, HazardContext, HazardType, SettlementType,
        VulnerabilityParameter,
    },
    vulnerability::VulnerabilityEstimator,
};

/// Property-based tests for the curve builder and combiner invariants.
/// These generate wide ranges of contexts and verify the bounds hold.

fn settlement() -> impl Strategy<Value = SettlementType> {
    prop_oneof![
        Just(SettlementType::Urban),
        Just(SettlementType::PeriUrban),
        Just(SettlementType::Rural),
    ]
}

fn context() -> impl Strategy<Value = HazardContext> {
    (
        0.0..1.0f64,
        0.0..1.0f64,
        0.0..1.0f64,
        10.0..2000.0f64,
        settlement(),
        1u32..=12,
    )
        .prop_map(
            |(infra, warning, poverty, density, settlement, month)| HazardContext {
                state: "TestState".to_string(),
                region: "North_Central".to_string(),
                month,
                population_density: density,
                poverty_rate: poverty,
                previous_events_30d: 1,
                previous_events_90d: 2,
                distance_to_water_km: 3.0,
                elevation_m: 150.0,
                settlement,
                infrastructure_quality: infra,
                early_warning_coverage: warning,
            },
        )
}

fn compounding() -> impl Strategy<Value = CompoundingFactors> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(flood, conflict, camp, rainy, harvest)| CompoundingFactors {
            has_recent_flood: flood,
            has_recent_conflict: conflict,
            has_displacement_camp: camp,
            is_rainy_season: rainy,
            is_harvest_season: harvest,
            market_access_disrupted: false,
            healthcare_access_limited: false,
        },
    )
}

proptest! {
    /// Displacement stays in [0, 0.95] and never decreases past the
    /// threshold, for any context, compounding state and parameter.
    #[test]
    fn curve_monotone_and_bounded(
        ctx in context(),
        comp in compounding(),
        param in 0.05..2.0f64,
    ) {
        let settings = Settings::default();
        let threshold = settings.forecast.flood_depth_threshold_m;
        let builder = ImpactCurveBuilder::new(settings.forecast);
        let curve = builder.build(&ctx, &comp, &VulnerabilityParameter {
            hazard_type: HazardType::Flood,
            value: param,
        });

        let mut prev = 0.0f64;
        for (x, mdd) in curve.intensity.iter().zip(curve.displacement_fraction.iter()) {
            prop_assert!(*mdd >= 0.0 && *mdd <= 0.95);
            if *x < threshold {
                prop_assert_eq!(*mdd, 0.0);
            } else {
                prop_assert!(*mdd >= prev - 1e-9);
                prev = *mdd;
            }
        }
        for paa in &curve.affected_area_fraction {
            prop_assert!(*paa >= 0.1 && *paa <= 1.0);
        }
    }

    /// Conflict curves obey the same invariants on their own grid.
    #[test]
    fn conflict_curve_bounded(
        ctx in context(),
        param in 5.0..100.0f64,
    ) {
        let settings = Settings::default();
        let threshold = settings.forecast.conflict_fatality_threshold;
        let builder = ImpactCurveBuilder::new(settings.forecast);
        let curve = builder.build(&ctx, &CompoundingFactors::default(), &VulnerabilityParameter {
            hazard_type: HazardType::Conflict,
            value: param,
        });

        for (x, mdd) in curve.intensity.iter().zip(curve.displacement_fraction.iter()) {
            prop_assert!(*mdd >= 0.0 && *mdd <= 0.95);
            if *x < threshold {
                prop_assert_eq!(*mdd, 0.0);
            }
        }
    }

    /// Combined output respects the 0.95 ceiling for every method and any
    /// pair of valid impact series.
    #[test]
    fn combination_ceiling(
        ctx in context(),
        impacts in prop::collection::vec((0.0..0.95f64, 0.0..0.95f64), 2..40),
        intensities in prop::collection::vec((0.0..6.0f64, 0.0..250.0f64), 40),
    ) {
        let n = impacts.len();
        let flood_impact: Vec<f64> = impacts.iter().map(|p| p.0).collect();
        let conflict_impact: Vec<f64> = impacts.iter().map(|p| p.1).collect();
        let flood_intensity: Vec<f64> = intensities.iter().take(n).map(|p| p.0).collect();
        let conflict_intensity: Vec<f64> = intensities.iter().take(n).map(|p| p.1).collect();

        let combiner = HazardInteractionCombiner::new(Settings::default().vulnerability);
        for method in [
            CombinationMethod::SimpleMax,
            CombinationMethod::WeightedSum,
            CombinationMethod::Sophisticated,
        ] {
            let (combined, metrics) = combiner
                .combine(
                    &flood_intensity,
                    &conflict_intensity,
                    &flood_impact,
                    &conflict_impact,
                    &ctx,
                    method,
                )
                .unwrap();
            prop_assert_eq!(combined.len(), n);
            for c in &combined {
                prop_assert!(*c >= 0.0 && *c <= 0.95);
            }
            prop_assert!(metrics.max_displacement_fraction <= 0.95);
        }
    }

    /// Sophisticated combination never falls below the elementwise max of
    /// its inputs (super-additivity in the overlap, identity elsewhere).
    #[test]
    fn sophisticated_dominates_simple_max(
        ctx in context(),
        rows in prop::collection::vec((0.1..6.0f64, 5.0..250.0f64, 0.0..0.7f64, 0.0..0.7f64), 3..30),
    ) {
        let flood_intensity: Vec<f64> = rows.iter().map(|r| r.0).collect();
        let conflict_intensity: Vec<f64> = rows.iter().map(|r| r.1).collect();
        let flood_impact: Vec<f64> = rows.iter().map(|r| r.2).collect();
        let conflict_impact: Vec<f64> = rows.iter().map(|r| r.3).collect();

        let combiner = HazardInteractionCombiner::new(Settings::default().vulnerability);
        let (combined, _) = combiner
            .combine(
                &flood_intensity,
                &conflict_intensity,
                &flood_impact,
                &conflict_impact,
                &ctx,
                CombinationMethod::Sophisticated,
            )
            .unwrap();

        for i in 0..rows.len() {
            let base = flood_impact[i].max(conflict_impact[i]).min(0.95);
            prop_assert!(combined[i] >= base - 1e-9);
        }
    }

    /// The fallback estimator returns a finite, range-valid parameter for
    /// any region string, both hazards, without a trained model.
    #[test]
    fn fallback_estimator_is_total(region in ".*") {
        let settings = Settings::default().vulnerability;
        let (flood_min, flood_max) = (settings.flood_param_min, settings.flood_param_max);
        let (conflict_min, conflict_max) =
            (settings.conflict_param_min, settings.conflict_param_max);
        let estimator = VulnerabilityEstimator::regional(settings);

        let ctx = HazardContext {
            state: "X".to_string(),
            region,
            month: 6,
            population_density: 100.0,
            poverty_rate: 0.3,
            previous_events_30d: 0,
            previous_events_90d: 0,
            distance_to_water_km: 1.0,
            elevation_m: 50.0,
            settlement: SettlementType::Urban,
            infrastructure_quality: 0.5,
            early_warning_coverage: 0.5,
        };

        let flood = estimator.estimate(&ctx, HazardType::Flood);
        prop_assert!(flood.value.is_finite());
        prop_assert!(flood.value >= flood_min && flood.value <= flood_max);

        let conflict = estimator.estimate(&ctx, HazardType::Conflict);
        prop_assert!(conflict.value.is_finite());
        prop_assert!(conflict.value >= conflict_min && conflict.value <= conflict_max);
    }
}
