use std::sync::Arc;

use tracing::debug;

use super::config::{
    RunArgs, ScreeningConfig, ScreeningConfigError, ScreeningSharedState, ScreeningState,
};
use super::domain::{UnitPayload, WorkerId, WorkerScreeningStatus};
use super::eligibility::EligibilityGate;
use super::outcome::{OutcomeRouter, ScreenValidator, SubmissionHandler};
use super::qualifications::{QualificationRegistrar, QualificationRequirement};
use super::source::LaunchCounter;
use super::store::{QualificationStore, StoreError};

/// Capability a task run composes in to require screening before production work.
pub trait ScreeningCapable {
    fn init_screening(
        &mut self,
        args: &RunArgs,
        shared_state: ScreeningSharedState,
    ) -> Result<(), ScreeningConfigError>;

    fn needs_screening(&self, worker: &WorkerId) -> Result<bool, StoreError>;

    fn should_generate_unit(&self) -> bool;

    fn next_screening_unit(&mut self) -> Option<UnitPayload>;

    fn build_submission_handler(&self, validate: Arc<dyn ScreenValidator>) -> SubmissionHandler;

    fn required_qualifications(&self) -> Vec<QualificationRequirement>;
}

/// Screening gate over a qualification store. Disabled until initialised.
pub struct ScreeningGate<S> {
    store: Arc<S>,
    state: ScreeningState,
}

impl<S> ScreeningGate<S>
where
    S: QualificationStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            state: ScreeningState::Disabled,
        }
    }

    /// Validation pass to run once before any run resources are committed.
    pub fn assert_valid(
        args: &RunArgs,
        shared_state: &ScreeningSharedState,
    ) -> Result<(), ScreeningConfigError> {
        ScreeningConfig::assert_valid(args, shared_state)
    }

    pub fn state(&self) -> &ScreeningState {
        &self.state
    }

    pub fn config(&self) -> Option<&ScreeningConfig> {
        self.state.config()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    /// Handle for the launch path; `None` when screening is disabled.
    pub fn launch_counter(&self) -> Option<LaunchCounter> {
        self.state.source().map(|source| source.launch_counter())
    }

    pub fn worker_status(&self, worker: &WorkerId) -> Result<WorkerScreeningStatus, StoreError> {
        match self.state.config() {
            Some(config) => {
                EligibilityGate::new(config).worker_status(self.store.as_ref(), worker)
            }
            None => Ok(WorkerScreeningStatus::Unscreened),
        }
    }

    /// Whether the worker may be offered the task at all under this gate's requirements.
    pub fn may_be_offered(&self, worker: &WorkerId) -> Result<bool, StoreError> {
        for requirement in self.required_qualifications() {
            if !requirement.check(self.store.as_ref(), worker)? {
                debug!(
                    worker = %worker,
                    qualification = %requirement.qualification_name,
                    "worker excluded by qualification requirement"
                );
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl<S> ScreeningCapable for ScreeningGate<S>
where
    S: QualificationStore + 'static,
{
    fn init_screening(
        &mut self,
        args: &RunArgs,
        shared_state: ScreeningSharedState,
    ) -> Result<(), ScreeningConfigError> {
        self.state = ScreeningState::initialize(self.store.as_ref(), args, shared_state)?;
        Ok(())
    }

    fn needs_screening(&self, worker: &WorkerId) -> Result<bool, StoreError> {
        match self.state.config() {
            Some(config) => {
                EligibilityGate::new(config).needs_screening(self.store.as_ref(), worker)
            }
            None => Ok(false),
        }
    }

    fn should_generate_unit(&self) -> bool {
        self.state
            .source()
            .map(|source| source.should_generate())
            .unwrap_or(false)
    }

    fn next_screening_unit(&mut self) -> Option<UnitPayload> {
        self.state.source_mut()?.next_unit()
    }

    fn build_submission_handler(&self, validate: Arc<dyn ScreenValidator>) -> SubmissionHandler {
        match self.state.config() {
            Some(config) => OutcomeRouter::build_submission_handler(
                Arc::clone(&self.store),
                config.passed_qualification_name.clone(),
                config.failed_qualification_name.clone(),
                validate,
            ),
            None => OutcomeRouter::inactive_handler(Arc::clone(&self.store), validate),
        }
    }

    fn required_qualifications(&self) -> Vec<QualificationRequirement> {
        match self.state.config() {
            Some(config) => {
                QualificationRegistrar::required_qualifications(&config.failed_qualification_name)
            }
            None => Vec::new(),
        }
    }
}
