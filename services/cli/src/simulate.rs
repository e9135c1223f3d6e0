use crate::infra::{shared_state, GrantRecord, InMemoryQualificationStore, UnitDataKind};
use clap::Args;
use screening_gate::config::AppConfig;
use screening_gate::error::AppError;
use screening_gate::screening::{
    validate_with, LaunchCounter, RunArgs, ScreeningCapable, ScreeningConfig, ScreeningGate,
    ScreeningOutcome, SubmissionCallback, SubmissionDisposition, SubmittedUnit, UnitId,
    UnitPayload, ValidatorError, WorkerId, SCREENING_UNIT_INDEX,
};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Args, Debug)]
pub(crate) struct SimulateArgs {
    /// Run arguments JSON file (defaults to SCREENING_ARGS_PATH)
    #[arg(long)]
    pub(crate) args: Option<PathBuf>,
    /// Number of simulated workers arriving at the task
    #[arg(long, default_value_t = 6)]
    pub(crate) workers: usize,
    /// Screening questions available to the generator
    #[arg(long, default_value_t = 10)]
    pub(crate) pool: usize,
    /// Shape of the screening unit data supplied in shared state
    #[arg(long, value_enum, default_value_t = UnitDataKind::Generator)]
    pub(crate) unit_data: UnitDataKind,
}

/// How a simulated worker answers its screening question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum WorkerBehavior {
    Correct,
    Incorrect,
    NoAnswer,
}

impl WorkerBehavior {
    fn for_index(index: usize) -> Self {
        match index % 3 {
            0 => Self::Correct,
            1 => Self::Incorrect,
            _ => Self::NoAnswer,
        }
    }

    fn answer(self, payload: &UnitPayload) -> Option<i64> {
        let key = payload.get("answer_key").and_then(|value| value.as_i64())?;
        match self {
            Self::Correct => Some(key),
            Self::Incorrect => Some(key + 1),
            Self::NoAnswer => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
enum WorkerResult {
    Excluded,
    AlreadyScreened,
    NoScreeningUnit,
    Submitted { disposition: SubmissionDisposition },
}

#[derive(Debug, Serialize)]
struct WorkerReport {
    worker: WorkerId,
    behavior: WorkerBehavior,
    #[serde(flatten)]
    result: WorkerResult,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct SimulationReport {
    screening: Option<ScreeningConfig>,
    launched: u64,
    workers: Vec<WorkerReport>,
    grants: Vec<GrantRecord>,
}

/// Task run composing the screening capability over a shared store.
struct SimulatedTaskRun {
    gate: Mutex<ScreeningGate<InMemoryQualificationStore>>,
    launches: Option<LaunchCounter>,
    on_unit_submitted: SubmissionCallback,
}

impl SimulatedTaskRun {
    fn new(gate: ScreeningGate<InMemoryQualificationStore>) -> Self {
        let launches = gate.launch_counter();
        let on_unit_submitted = gate
            .build_submission_handler(validate_with(answer_key_validator))
            .into_callback();
        Self {
            gate: Mutex::new(gate),
            launches,
            on_unit_submitted,
        }
    }

    async fn screen_worker(
        &self,
        index: usize,
        behavior: WorkerBehavior,
    ) -> Result<WorkerReport, AppError> {
        let worker = WorkerId(format!("worker-{index:03}"));

        let result = {
            let mut gate = self.gate.lock().await;
            if !gate.may_be_offered(&worker)? {
                Err(WorkerResult::Excluded)
            } else if !gate.needs_screening(&worker)? {
                Err(WorkerResult::AlreadyScreened)
            } else {
                gate.next_screening_unit().ok_or(WorkerResult::NoScreeningUnit)
            }
        };

        let result = match result {
            Ok(payload) => {
                if let Some(launches) = &self.launches {
                    let launched = launches.record_launch();
                    debug!(worker = %worker, launched, "screening unit launched");
                }
                let unit = submit_answer(&worker, payload, behavior);
                let disposition = (self.on_unit_submitted)(&unit)?;
                WorkerResult::Submitted { disposition }
            }
            Err(skipped) => skipped,
        };

        let status = self.gate.lock().await.worker_status(&worker)?;
        Ok(WorkerReport {
            worker,
            behavior,
            result,
            status: status.label(),
        })
    }
}

fn submit_answer(
    worker: &WorkerId,
    payload: UnitPayload,
    behavior: WorkerBehavior,
) -> SubmittedUnit {
    let answer = behavior.answer(&payload);
    let mut data = payload;
    if let Some(answer) = answer {
        data.insert("answer".to_string(), json!(answer));
    }
    SubmittedUnit {
        unit_id: UnitId(format!("screen-{worker}")),
        unit_index: SCREENING_UNIT_INDEX,
        assigned_worker: Some(worker.clone()),
        data,
    }
}

fn answer_key_validator(unit: &SubmittedUnit) -> Result<ScreeningOutcome, ValidatorError> {
    let key = unit
        .data
        .get("answer_key")
        .and_then(|value| value.as_i64())
        .ok_or("screening unit has no answer key")?;
    let answer = unit.data.get("answer").and_then(|value| value.as_i64());
    Ok(ScreeningOutcome::from(answer.map(|answer| answer == key)))
}

pub(crate) async fn run_simulation(args: SimulateArgs, config: &AppConfig) -> Result<(), AppError> {
    let SimulateArgs {
        args,
        workers,
        pool,
        unit_data,
    } = args;

    let path = config.run.resolve_args_path(args)?;
    let run_args = RunArgs::from_path(&path)?;
    let shared = shared_state(unit_data, pool);
    ScreeningGate::<InMemoryQualificationStore>::assert_valid(&run_args, &shared)?;

    let store = Arc::new(InMemoryQualificationStore::default());
    let mut gate = ScreeningGate::new(Arc::clone(&store));
    gate.init_screening(&run_args, shared)?;
    let screening = gate.config().cloned();

    info!(
        environment = ?config.environment,
        workers,
        pool,
        enabled = screening.is_some(),
        "starting screening simulation"
    );

    let run = Arc::new(SimulatedTaskRun::new(gate));
    let mut handles = Vec::with_capacity(workers);
    for index in 0..workers {
        let run = Arc::clone(&run);
        handles.push(tokio::spawn(async move {
            run.screen_worker(index, WorkerBehavior::for_index(index)).await
        }));
    }

    let mut reports = Vec::with_capacity(workers);
    for handle in handles {
        let report = handle
            .await
            .map_err(|err| AppError::Io(std::io::Error::other(err)))??;
        reports.push(report);
    }

    let report = SimulationReport {
        screening,
        launched: run
            .launches
            .as_ref()
            .map(|launches| launches.launched())
            .unwrap_or(0),
        workers: reports,
        grants: store.grants(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::screening_question;

    #[test]
    fn behaviors_map_to_validator_outcomes() {
        let worker = WorkerId("worker-001".to_string());
        let question = screening_question(4);

        let correct = submit_answer(&worker, question.clone(), WorkerBehavior::Correct);
        let incorrect = submit_answer(&worker, question.clone(), WorkerBehavior::Incorrect);
        let silent = submit_answer(&worker, question, WorkerBehavior::NoAnswer);

        assert_eq!(
            answer_key_validator(&correct).expect("validated"),
            ScreeningOutcome::Passed
        );
        assert_eq!(
            answer_key_validator(&incorrect).expect("validated"),
            ScreeningOutcome::Failed
        );
        assert_eq!(
            answer_key_validator(&silent).expect("validated"),
            ScreeningOutcome::Undecided
        );
    }

    #[test]
    fn validator_rejects_units_without_answer_key() {
        let mut unit = submit_answer(
            &WorkerId("worker-002".to_string()),
            screening_question(1),
            WorkerBehavior::Correct,
        );
        unit.data.remove("answer_key");

        assert!(answer_key_validator(&unit).is_err());
    }

    #[tokio::test]
    async fn simulated_run_grants_by_behavior_and_respects_cap() {
        let run_args = RunArgs::from_json_str(
            r#"{
                "blueprint": {
                    "use_screening_task": true,
                    "passed_qualification_name": "sim-passed",
                    "block_qualification": "sim-blocked",
                    "max_screening_units": 1
                },
                "task": { "allowed_concurrent": 1 }
            }"#,
        )
        .expect("run args");
        let store = Arc::new(InMemoryQualificationStore::default());
        let mut gate = ScreeningGate::new(Arc::clone(&store));
        gate.init_screening(&run_args, shared_state(UnitDataKind::Generator, 10))
            .expect("initialised");
        let run = SimulatedTaskRun::new(gate);

        let first = run
            .screen_worker(0, WorkerBehavior::Correct)
            .await
            .expect("screened");
        let second = run
            .screen_worker(1, WorkerBehavior::Incorrect)
            .await
            .expect("screened");
        let third = run
            .screen_worker(2, WorkerBehavior::Correct)
            .await
            .expect("screened");
        let again = run
            .screen_worker(0, WorkerBehavior::Correct)
            .await
            .expect("screened");

        assert_eq!(first.status, "passed");
        assert_eq!(second.status, "failed");
        assert!(matches!(third.result, WorkerResult::NoScreeningUnit));
        assert_eq!(third.status, "unscreened");
        assert!(matches!(again.result, WorkerResult::AlreadyScreened));

        let excluded = run
            .screen_worker(1, WorkerBehavior::Correct)
            .await
            .expect("screened");
        assert!(matches!(excluded.result, WorkerResult::Excluded));
        assert_eq!(store.grants().len(), 2);
    }
}
