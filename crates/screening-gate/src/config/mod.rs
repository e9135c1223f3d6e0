use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of a screening run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level process configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub run: RunConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        if log_level.trim().is_empty() {
            return Err(ConfigError::EmptyLogLevel);
        }

        let args_path = match env::var("SCREENING_ARGS_PATH") {
            Ok(raw) if raw.trim().is_empty() => return Err(ConfigError::EmptyArgsPath),
            Ok(raw) => Some(PathBuf::from(raw)),
            Err(_) => None,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            run: RunConfig { args_path },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where the run arguments live when the command line does not say.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    pub args_path: Option<PathBuf>,
}

impl RunConfig {
    /// Prefer an explicit path, then the configured one.
    pub fn resolve_args_path(&self, explicit: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
        explicit
            .or_else(|| self.args_path.clone())
            .ok_or(ConfigError::MissingArgsPath)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyLogLevel,
    EmptyArgsPath,
    MissingArgsPath,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyLogLevel => write!(f, "APP_LOG_LEVEL must not be empty"),
            ConfigError::EmptyArgsPath => {
                write!(f, "SCREENING_ARGS_PATH must point to a run arguments file")
            }
            ConfigError::MissingArgsPath => {
                write!(f, "no run arguments file: pass --args or set SCREENING_ARGS_PATH")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
