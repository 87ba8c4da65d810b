use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use chrono::{Datelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;
use tracing_subscriber::EnvFilter;

use displacement_ibf::{
    config::Settings,
    forecast::{ForecastEngine, ForecastInput},
    models::{
        CombinationMethod, CompoundingFactors, ExposureData, HazardContext, HazardSeries,
        HazardType, SettlementType,
    },
    vulnerability::VulnerabilityEstimator,
};

/// Demo run over a synthetic two-hazard ensemble. Real deployments feed
/// the engine from the hazard-model and ETL collaborators instead.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let settings = Settings::new()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone())),
        )
        .init();

    info!("Starting displacement forecast engine");

    let flood_model = env::var("FLOOD_VULNERABILITY_MODEL").ok().map(PathBuf::from);
    let conflict_model = env::var("CONFLICT_VULNERABILITY_MODEL").ok().map(PathBuf::from);
    let estimator = VulnerabilityEstimator::from_artifacts(
        flood_model.as_deref(),
        conflict_model.as_deref(),
        settings.vulnerability.clone(),
    );

    let engine = ForecastEngine::new(settings, estimator);

    let mut rng = StdRng::seed_from_u64(2024);
    let flood_events: Vec<f64> = (0..30).map(|_| rng.gen_range(0.0..3.5)).collect();
    let conflict_events: Vec<f64> = (0..30).map(|_| rng.gen_range(0.0..120.0)).collect();

    let contexts = HashMap::from([
        (
            "Benue".to_string(),
            HazardContext {
                state: "Benue".to_string(),
                region: "North_Central".to_string(),
                month: Utc::now().month(),
                population_density: 150.0,
                poverty_rate: 0.45,
                previous_events_30d: 2,
                previous_events_90d: 5,
                distance_to_water_km: 2.5,
                elevation_m: 120.0,
                settlement: SettlementType::Rural,
                infrastructure_quality: 0.35,
                early_warning_coverage: 0.55,
            },
        ),
        (
            "Adamawa".to_string(),
            HazardContext {
                state: "Adamawa".to_string(),
                region: "North_East".to_string(),
                month: Utc::now().month(),
                population_density: 90.0,
                poverty_rate: 0.6,
                previous_events_30d: 3,
                previous_events_90d: 7,
                distance_to_water_km: 6.0,
                elevation_m: 250.0,
                settlement: SettlementType::PeriUrban,
                infrastructure_quality: 0.3,
                early_warning_coverage: 0.4,
            },
        ),
    ]);

    let input = ForecastInput {
        forecast_date: Utc::now(),
        lead_time_days: 2.0,
        hazards: vec![
            HazardSeries::new(HazardType::Flood, flood_events),
            HazardSeries::new(HazardType::Conflict, conflict_events),
        ],
        exposure: ExposureData::single("Benue", 450_000.0),
        contexts,
        compounding: CompoundingFactors {
            is_rainy_season: true,
            has_recent_flood: true,
            ..Default::default()
        },
        method: CombinationMethod::Sophisticated,
    };

    let outcome = engine.run(&input)?;

    println!("\n{}", "=".repeat(70));
    println!("FORECAST SUMMARY");
    println!("{}", "=".repeat(70));
    println!("Forecast ID: {}", outcome.metrics.forecast_id);
    println!("Lead Time: {} days", outcome.metrics.lead_time_days);
    println!(
        "Processing Time: {:.2}s",
        outcome.metrics.processing_time_seconds
    );
    println!(
        "\nDisplacement Estimate: {:.0} people",
        outcome.metrics.mean_displacement
    );
    println!(
        "90% Range: {:.0} - {:.0}",
        outcome.metrics.p05_displacement, outcome.metrics.p95_displacement
    );
    println!(
        "\nQuality Score: {:.2} ({} confidence)",
        outcome.metrics.quality_score,
        outcome.metrics.confidence_level.as_str()
    );
    println!(
        "Alert Level: {}",
        outcome.alert.alert_level.as_str().to_uppercase()
    );
    if let Some(interaction) = &outcome.interaction {
        println!(
            "Interaction: compounding {:.3}, cascades {:.3}/{:.3}",
            interaction.compounding_factor,
            interaction.cascade_flood_to_conflict,
            interaction.cascade_conflict_to_flood
        );
    }
    println!("{}", "=".repeat(70));

    Ok(())
}
