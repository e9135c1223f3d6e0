//! Screening gate: admits workers to production units only after they pass a
//! screening unit.
//!
//! The gate validates run configuration, hands out a capped number of lazily
//! generated screening payloads, answers whether a worker still needs
//! screening, and converts validator verdicts into pass/fail qualifications.
//! Persistence stays behind [`QualificationStore`].

pub mod config;
pub mod domain;
mod eligibility;
pub mod generator;
pub mod gate;
pub mod outcome;
pub mod qualifications;
pub mod source;
pub mod store;

#[cfg(test)]
mod tests;

pub use config::{
    BlueprintArgs, RunArgs, RunArgsError, ScreeningConfig, ScreeningConfigError,
    ScreeningSharedState, ScreeningState, ScreeningUnitData, TaskArgs,
};
pub use domain::{
    QualificationId, ScreeningOutcome, SubmittedUnit, UnitId, UnitPayload, WorkerId,
    WorkerScreeningStatus, SCREENING_UNIT_INDEX,
};
pub use eligibility::EligibilityGate;
pub use gate::{ScreeningCapable, ScreeningGate};
pub use generator::UnitDataGenerator;
pub use outcome::{
    validate_with, OutcomeRouter, ScreenValidator, SubmissionCallback, SubmissionDisposition,
    SubmissionError, SubmissionHandler, ValidatorError,
};
pub use qualifications::{QualificationComparator, QualificationRegistrar, QualificationRequirement};
pub use source::{LaunchCounter, ScreeningUnitSource};
pub use store::{QualificationStore, StoreError};
