use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::UnitPayload;
use super::generator::UnitDataGenerator;
use super::qualifications::QualificationRegistrar;
use super::source::ScreeningUnitSource;
use super::store::{QualificationStore, StoreError};

/// Raw run arguments as supplied by the operator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunArgs {
    #[serde(default)]
    pub blueprint: BlueprintArgs,
    #[serde(default)]
    pub task: TaskArgs,
}

impl RunArgs {
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn from_path(path: &Path) -> Result<Self, RunArgsError> {
        let raw = fs::read_to_string(path).map_err(|source| RunArgsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw).map_err(|source| RunArgsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Blueprint-scoped screening options. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlueprintArgs {
    #[serde(default)]
    pub use_screening_task: Option<bool>,
    #[serde(default)]
    pub passed_qualification_name: Option<String>,
    #[serde(default)]
    pub block_qualification: Option<String>,
    #[serde(default)]
    pub max_screening_units: Option<i64>,
}

impl BlueprintArgs {
    pub fn screening_enabled(&self) -> bool {
        self.use_screening_task.unwrap_or(false)
    }
}

/// Task-scoped options the gate cares about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskArgs {
    /// Concurrent units a worker may hold; `0` means unlimited.
    #[serde(default)]
    pub allowed_concurrent: u32,
}

/// Shape of the screening unit data handed over in shared state.
#[derive(Debug)]
pub enum ScreeningUnitData {
    /// Units are generated lazily, one payload per screening launch.
    Generator(UnitDataGenerator),
    /// No generation; screening validates whatever units the run already has.
    Disabled,
    /// An eagerly built list. Rejected: the gate needs a lazy sequence.
    Materialized(Vec<UnitPayload>),
}

/// Run-wide state shared with the gate by the task author.
#[derive(Debug, Default)]
pub struct ScreeningSharedState {
    pub generate_screening_unit_data: Option<ScreeningUnitData>,
}

impl ScreeningSharedState {
    pub fn with_generator(generator: UnitDataGenerator) -> Self {
        Self {
            generate_screening_unit_data: Some(ScreeningUnitData::Generator(generator)),
        }
    }

    pub fn without_generation() -> Self {
        Self {
            generate_screening_unit_data: Some(ScreeningUnitData::Disabled),
        }
    }
}

/// Validated screening settings, fixed for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreeningConfig {
    pub passed_qualification_name: String,
    pub failed_qualification_name: String,
    pub max_screening_units: u64,
}

impl ScreeningConfig {
    /// `Ok(None)` when screening is disabled for the run.
    pub fn from_blueprint(args: &BlueprintArgs) -> Result<Option<Self>, ScreeningConfigError> {
        if !args.screening_enabled() {
            return Ok(None);
        }

        let passed = required_name(
            args.passed_qualification_name.as_deref(),
            "passed_qualification_name",
        )?;
        let failed = required_name(args.block_qualification.as_deref(), "block_qualification")?;
        if passed == failed {
            return Err(ScreeningConfigError::DuplicateQualificationName(
                passed.to_string(),
            ));
        }

        let cap = args
            .max_screening_units
            .ok_or(ScreeningConfigError::MissingCap)?;
        let cap = u64::try_from(cap).map_err(|_| ScreeningConfigError::NegativeCap(cap))?;

        Ok(Some(Self {
            passed_qualification_name: passed.to_string(),
            failed_qualification_name: failed.to_string(),
            max_screening_units: cap,
        }))
    }

    /// Pre-launch check of the run arguments and shared state.
    ///
    /// Independent of [`ScreeningState::initialize`]; commits no resources.
    pub fn assert_valid(
        args: &RunArgs,
        shared_state: &ScreeningSharedState,
    ) -> Result<(), ScreeningConfigError> {
        let blueprint = &args.blueprint;
        if !blueprint.screening_enabled() {
            return Ok(());
        }

        if args.task.allowed_concurrent != 1 {
            return Err(ScreeningConfigError::ConcurrencyNotSequential {
                allowed: args.task.allowed_concurrent,
            });
        }
        if blueprint.passed_qualification_name.is_none() {
            return Err(ScreeningConfigError::MissingQualificationName {
                field: "passed_qualification_name",
            });
        }
        if blueprint.block_qualification.is_none() {
            return Err(ScreeningConfigError::MissingQualificationName {
                field: "block_qualification",
            });
        }
        let unit_data = shared_state
            .generate_screening_unit_data
            .as_ref()
            .ok_or(ScreeningConfigError::MissingUnitGenerator)?;
        if blueprint.max_screening_units.is_none() {
            return Err(ScreeningConfigError::MissingCap);
        }
        if let ScreeningUnitData::Materialized(_) = unit_data {
            return Err(ScreeningConfigError::GeneratorNotLazy);
        }

        Self::from_blueprint(blueprint).map(|_| ())
    }
}

fn required_name<'a>(
    value: Option<&'a str>,
    field: &'static str,
) -> Result<&'a str, ScreeningConfigError> {
    let value = value.ok_or(ScreeningConfigError::MissingQualificationName { field })?;
    if value.trim().is_empty() {
        return Err(ScreeningConfigError::EmptyQualificationName { field });
    }
    Ok(value)
}

/// Run-scoped screening state owned by the gate.
#[derive(Debug)]
pub enum ScreeningState {
    Disabled,
    Enabled {
        config: ScreeningConfig,
        source: ScreeningUnitSource,
    },
}

impl ScreeningState {
    /// Build the run state and register both qualifications with the store.
    ///
    /// A disabled run returns immediately without touching the store.
    pub fn initialize<S>(
        store: &S,
        args: &RunArgs,
        shared_state: ScreeningSharedState,
    ) -> Result<Self, ScreeningConfigError>
    where
        S: QualificationStore + ?Sized,
    {
        let Some(config) = ScreeningConfig::from_blueprint(&args.blueprint)? else {
            return Ok(Self::Disabled);
        };

        let generator = match shared_state.generate_screening_unit_data {
            Some(ScreeningUnitData::Generator(generator)) => Some(generator),
            Some(ScreeningUnitData::Disabled) | None => None,
            Some(ScreeningUnitData::Materialized(_)) => {
                return Err(ScreeningConfigError::GeneratorNotLazy)
            }
        };

        QualificationRegistrar::ensure_exists(store, &config.passed_qualification_name)?;
        QualificationRegistrar::ensure_exists(store, &config.failed_qualification_name)?;

        info!(
            passed = %config.passed_qualification_name,
            failed = %config.failed_qualification_name,
            cap = config.max_screening_units,
            generated = generator.is_some(),
            "screening enabled for run"
        );

        let source = ScreeningUnitSource::new(generator, config.max_screening_units);
        Ok(Self::Enabled { config, source })
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled { .. })
    }

    pub fn config(&self) -> Option<&ScreeningConfig> {
        match self {
            Self::Enabled { config, .. } => Some(config),
            Self::Disabled => None,
        }
    }

    pub fn source(&self) -> Option<&ScreeningUnitSource> {
        match self {
            Self::Enabled { source, .. } => Some(source),
            Self::Disabled => None,
        }
    }

    pub fn source_mut(&mut self) -> Option<&mut ScreeningUnitSource> {
        match self {
            Self::Enabled { source, .. } => Some(source),
            Self::Disabled => None,
        }
    }
}

/// Fail-fast configuration errors. Any of these aborts the run before launch.
#[derive(Debug, thiserror::Error)]
pub enum ScreeningConfigError {
    #[error(
        "screening requires task.allowed_concurrent = 1 so workers are screened before \
         moving on to more tasks (found {allowed})"
    )]
    ConcurrencyNotSequential { allowed: u32 },
    #[error("screening requires blueprint.{field} to be set")]
    MissingQualificationName { field: &'static str },
    #[error("blueprint.{field} must not be empty")]
    EmptyQualificationName { field: &'static str },
    #[error("passed and block qualifications must differ (both are `{0}`)")]
    DuplicateQualificationName(String),
    #[error("shared state must supply generate_screening_unit_data to use screening")]
    MissingUnitGenerator,
    #[error(
        "screening requires blueprint.max_screening_units to cap the screening units paid for"
    )]
    MissingCap,
    #[error("blueprint.max_screening_units must be >= 0 (found {0})")]
    NegativeCap(i64),
    #[error(
        "generate_screening_unit_data must be a lazy generator, or disabled to validate on any task"
    )]
    GeneratorNotLazy,
    #[error("failed to register screening qualifications: {0}")]
    Store(#[from] StoreError),
}

/// Failure loading run arguments from disk.
#[derive(Debug, thiserror::Error)]
pub enum RunArgsError {
    #[error("failed to read run arguments from {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("run arguments in {} are not valid JSON", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl fmt::Display for ScreeningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "passed={} failed={} cap={}",
            self.passed_qualification_name,
            self.failed_qualification_name,
            self.max_screening_units
        )
    }
}
