use tracing::debug;

use super::config::ScreeningConfig;
use super::domain::{WorkerId, WorkerScreeningStatus};
use super::store::{QualificationStore, StoreError};

/// Decides whether a worker still has to go through screening.
pub struct EligibilityGate<'a> {
    config: &'a ScreeningConfig,
}

impl<'a> EligibilityGate<'a> {
    pub fn new(config: &'a ScreeningConfig) -> Self {
        Self { config }
    }

    /// A worker needs screening until they hold the passed qualification.
    /// Failed workers are excluded by the block requirement, not here.
    pub fn needs_screening<S>(&self, store: &S, worker: &WorkerId) -> Result<bool, StoreError>
    where
        S: QualificationStore + ?Sized,
    {
        let passed = store.has_qualification(worker, &self.config.passed_qualification_name)?;
        debug!(worker = %worker, passed, "checked screening eligibility");
        Ok(!passed)
    }

    pub fn worker_status<S>(
        &self,
        store: &S,
        worker: &WorkerId,
    ) -> Result<WorkerScreeningStatus, StoreError>
    where
        S: QualificationStore + ?Sized,
    {
        if store.has_qualification(worker, &self.config.passed_qualification_name)? {
            return Ok(WorkerScreeningStatus::Passed);
        }
        if store.has_qualification(worker, &self.config.failed_qualification_name)? {
            return Ok(WorkerScreeningStatus::Failed);
        }
        Ok(WorkerScreeningStatus::Unscreened)
    }
}
