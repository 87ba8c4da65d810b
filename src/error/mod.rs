pub mod types;

pub use types::ForecastError;
