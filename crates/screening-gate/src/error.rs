use crate::config::ConfigError;
use crate::screening::{RunArgsError, ScreeningConfigError, StoreError, SubmissionError};
use crate::telemetry::TelemetryError;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    RunArgs(RunArgsError),
    Screening(ScreeningConfigError),
    Submission(SubmissionError),
    Store(StoreError),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::RunArgs(err) => write!(f, "run arguments error: {}", err),
            AppError::Screening(err) => write!(f, "screening configuration error: {}", err),
            AppError::Submission(err) => write!(f, "submission error: {}", err),
            AppError::Store(err) => write!(f, "store error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Json(err) => write!(f, "json error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::RunArgs(err) => Some(err),
            AppError::Screening(err) => Some(err),
            AppError::Submission(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Json(err) => Some(err),
        }
    }
}

impl AppError {
    /// Process exit code: configuration problems abort before launch with 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) | AppError::RunArgs(_) | AppError::Screening(_) => 2,
            AppError::Telemetry(_)
            | AppError::Submission(_)
            | AppError::Store(_)
            | AppError::Io(_)
            | AppError::Json(_) => 1,
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<RunArgsError> for AppError {
    fn from(value: RunArgsError) -> Self {
        Self::RunArgs(value)
    }
}

impl From<ScreeningConfigError> for AppError {
    fn from(value: ScreeningConfigError) -> Self {
        Self::Screening(value)
    }
}

impl From<SubmissionError> for AppError {
    fn from(value: SubmissionError) -> Self {
        Self::Submission(value)
    }
}

impl From<StoreError> for AppError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
