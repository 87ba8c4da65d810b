pub mod estimator;
pub mod regressor;
pub mod scaler;

pub use estimator::{
    feature_vector, TrainingSample, VulnerabilityArtifact, VulnerabilityEstimator, FEATURE_NAMES,
};
pub use regressor::{GradientBoostedRegressor, TrainingParams};
pub use scaler::FeatureScaler;
