// Forecast pipeline error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("input validation failed: {}", .messages.join("; "))]
    InputValidation { messages: Vec<String> },

    #[error("output validation failed: {}", .messages.join("; "))]
    OutputValidation { messages: Vec<String> },

    #[error("hazard series length mismatch: {left} vs {right}")]
    SeriesLengthMismatch { left: usize, right: usize },

    #[error("model training failed: {message}")]
    Training { message: String },

    #[error("model artifact unreadable at {path}: {message}")]
    ModelLoad { path: String, message: String },

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("alert distribution failed: {message}")]
    Distribution { message: String },
}

impl ForecastError {
    pub fn input_validation(messages: Vec<String>) -> Self {
        ForecastError::InputValidation { messages }
    }

    pub fn output_validation(messages: Vec<String>) -> Self {
        ForecastError::OutputValidation { messages }
    }
}
