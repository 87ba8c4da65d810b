pub mod alert;
pub mod context;
pub mod curve;
pub mod hazard;
pub mod interaction;
pub mod metrics;

pub use alert::{AlertDecision, AlertLevel};
pub use context::{
    CompoundingFactors, HazardContext, HazardType, SettlementType, VulnerabilityParameter,
};
pub use curve::ImpactCurve;
pub use hazard::{ExposureData, ExposureRecord, HazardSeries};
pub use interaction::{CombinationMethod, InteractionMetrics};
pub use metrics::{ConfidenceLevel, ForecastMetrics};
