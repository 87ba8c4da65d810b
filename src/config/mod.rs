pub mod settings;

pub use settings::{
    AlertSettings, DisplacementAlertLevels, ForecastSettings, LoggingSettings, RegionalParams,
    SamplingSettings, Settings, ValidationSettings, VulnerabilitySettings,
};
