pub mod alerts;
pub mod config;
pub mod error;
pub mod forecast;
pub mod impact;
pub mod models;
pub mod utils;
pub mod vulnerability;

pub use alerts::{AlertDecisionEngine, AlertDistributor, LogDistributor};
pub use config::Settings;
pub use error::ForecastError;
pub use forecast::{ForecastEngine, ForecastInput, ForecastOutcome, QualityController};
pub use impact::{HazardInteractionCombiner, ImpactCurveBuilder};
pub use models::{
    AlertDecision, AlertLevel, CombinationMethod, CompoundingFactors, ConfidenceLevel,
    ExposureData, ForecastMetrics, HazardContext, HazardSeries, HazardType, ImpactCurve,
    InteractionMetrics, SettlementType, VulnerabilityParameter,
};
pub use vulnerability::VulnerabilityEstimator;
