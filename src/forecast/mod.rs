pub mod engine;
pub mod quality;
pub mod sampler;

pub use engine::{ForecastEngine, ForecastInput, ForecastOutcome};
pub use quality::QualityController;
pub use sampler::{EnsembleSampler, EnsembleSamples};
