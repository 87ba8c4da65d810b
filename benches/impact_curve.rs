use criterion::{black_box, criterion_group, criterion_main, Criterion};
use displacement_ibf::{
    config::Settings,
    impact::{HazardInteractionCombiner, ImpactCurveBuilder},
    models::{
        CombinationMethod, CompoundingFactors, HazardContext, HazardType, SettlementType,
        VulnerabilityParameter,
    },
};

fn test_context() -> HazardContext {
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

fn benchmark_curve_build(c: &mut Criterion) {
    let builder = ImpactCurveBuilder::new(Settings::default().forecast);
    let context = test_context();
    let compounding = CompoundingFactors {
        is_rainy_season: true,
        has_recent_flood: true,
        ..Default::default()
    };
    let vulnerability = VulnerabilityParameter {
        hazard_type: HazardType::Flood,
        value: 0.9,
    };

    c.bench_function("impact_curve_build", |b| {
        b.iter(|| {
            builder.build(
                black_box(&context),
                black_box(&compounding),
                black_box(&vulnerability),
            )
        })
    });
}

fn benchmark_sophisticated_combination(c: &mut Criterion) {
    let combiner = HazardInteractionCombiner::new(Settings::default().vulnerability);
    let context = test_context();

    let n = 500;
    let flood_intensity: Vec<f64> = (0..n).map(|i| (i as f64 / n as f64) * 5.0).collect();
    let conflict_intensity: Vec<f64> = (0..n).map(|i| (i as f64 / n as f64) * 200.0).collect();
    let flood_impact: Vec<f64> = flood_intensity.iter().map(|x| (x / 6.0).min(0.95)).collect();
    let conflict_impact: Vec<f64> = conflict_intensity
        .iter()
        .map(|x| (x / 300.0).min(0.95))
        .collect();

    c.bench_function("sophisticated_combination", |b| {
        b.iter(|| {
            combiner
                .combine(
                    black_box(&flood_intensity),
                    black_box(&conflict_intensity),
                    black_box(&flood_impact),
                    black_box(&conflict_impact),
                    black_box(&context),
                    CombinationMethod::Sophisticated,
                )
                .unwrap()
        })
    });
}

criterion_group!(benches, benchmark_curve_build, benchmark_sophisticated_combination);
criterion_main!(benches);
