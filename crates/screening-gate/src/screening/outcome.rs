use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::domain::{ScreeningOutcome, SubmittedUnit, UnitId, WorkerId};
use super::store::{QualificationStore, StoreError};

/// Error type a validator may return; it propagates to the submission hook.
pub type ValidatorError = Box<dyn std::error::Error + Send + Sync>;

/// Shareable form of a [`SubmissionHandler`] for "unit submitted" hooks.
pub type SubmissionCallback =
    Arc<dyn Fn(&SubmittedUnit) -> Result<SubmissionDisposition, SubmissionError> + Send + Sync>;

/// Caller-supplied judgement of a completed screening unit.
pub trait ScreenValidator: Send + Sync {
    fn validate(&self, unit: &SubmittedUnit) -> Result<ScreeningOutcome, ValidatorError>;
}

impl<F> ScreenValidator for F
where
    F: Fn(&SubmittedUnit) -> Result<ScreeningOutcome, ValidatorError> + Send + Sync,
{
    fn validate(&self, unit: &SubmittedUnit) -> Result<ScreeningOutcome, ValidatorError> {
        self(unit)
    }
}

/// Wrap a closure as a shareable validator.
pub fn validate_with<F>(validate: F) -> Arc<dyn ScreenValidator>
where
    F: Fn(&SubmittedUnit) -> Result<ScreeningOutcome, ValidatorError> + Send + Sync + 'static,
{
    Arc::new(validate)
}

/// What the submission hook did with a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "disposition", rename_all = "snake_case")]
pub enum SubmissionDisposition {
    /// Production unit, or screening is off for the run.
    Skipped,
    /// Validator had no verdict yet; nothing was granted.
    Undecided,
    Granted {
        worker: WorkerId,
        qualification: String,
        outcome: ScreeningOutcome,
    },
}

/// Errors surfaced by the submission hook. No retry happens inside the gate.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("screening validator failed for unit {unit_id}")]
    Validator {
        unit_id: UnitId,
        #[source]
        source: ValidatorError,
    },
    #[error("screening unit {0} has no assigned worker to qualify")]
    Unassigned(UnitId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

struct QualificationRouting {
    passed_qualification_name: String,
    failed_qualification_name: String,
}

/// Builds submission handlers that turn screening verdicts into qualifications.
pub struct OutcomeRouter;

impl OutcomeRouter {
    pub fn build_submission_handler<S>(
        store: Arc<S>,
        passed_qualification_name: impl Into<String>,
        failed_qualification_name: impl Into<String>,
        validate: Arc<dyn ScreenValidator>,
    ) -> SubmissionHandler
    where
        S: QualificationStore + 'static,
    {
        SubmissionHandler {
            store,
            routing: Some(QualificationRouting {
                passed_qualification_name: passed_qualification_name.into(),
                failed_qualification_name: failed_qualification_name.into(),
            }),
            validate,
        }
    }

    /// Handler for runs without screening: every unit is skipped.
    pub fn inactive_handler<S>(
        store: Arc<S>,
        validate: Arc<dyn ScreenValidator>,
    ) -> SubmissionHandler
    where
        S: QualificationStore + 'static,
    {
        SubmissionHandler {
            store,
            routing: None,
            validate,
        }
    }
}

/// Hook invoked for every submitted unit of the run.
pub struct SubmissionHandler {
    store: Arc<dyn QualificationStore>,
    routing: Option<QualificationRouting>,
    validate: Arc<dyn ScreenValidator>,
}

impl SubmissionHandler {
    pub fn on_unit_submitted(
        &self,
        unit: &SubmittedUnit,
    ) -> Result<SubmissionDisposition, SubmissionError> {
        let Some(routing) = &self.routing else {
            return Ok(SubmissionDisposition::Skipped);
        };
        if !unit.is_screening_unit() {
            return Ok(SubmissionDisposition::Skipped);
        }

        let outcome = self
            .validate
            .validate(unit)
            .map_err(|source| SubmissionError::Validator {
                unit_id: unit.unit_id.clone(),
                source,
            })?;

        let qualification = match outcome {
            ScreeningOutcome::Passed => &routing.passed_qualification_name,
            ScreeningOutcome::Failed => &routing.failed_qualification_name,
            ScreeningOutcome::Undecided => {
                debug!(unit = %unit.unit_id, "screening unit left undecided");
                return Ok(SubmissionDisposition::Undecided);
            }
        };

        let worker = unit
            .assigned_worker
            .clone()
            .ok_or_else(|| SubmissionError::Unassigned(unit.unit_id.clone()))?;
        self.store.grant_qualification(&worker, qualification)?;
        info!(
            unit = %unit.unit_id,
            worker = %worker,
            outcome = outcome.label(),
            qualification = %qualification,
            "granted screening qualification"
        );

        Ok(SubmissionDisposition::Granted {
            worker,
            qualification: qualification.clone(),
            outcome,
        })
    }

    pub fn into_callback(self) -> SubmissionCallback {
        Arc::new(move |unit: &SubmittedUnit| self.on_unit_submitted(unit))
    }
}
