use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::screening::config::{BlueprintArgs, RunArgs, ScreeningSharedState, TaskArgs};
use crate::screening::domain::{
    QualificationId, ScreeningOutcome, SubmittedUnit, UnitId, UnitPayload, WorkerId,
    SCREENING_UNIT_INDEX,
};
use crate::screening::generator::UnitDataGenerator;
use crate::screening::outcome::{validate_with, ScreenValidator};
use crate::screening::store::{QualificationStore, StoreError};

pub(super) const PASSED: &str = "screen-passed";
pub(super) const FAILED: &str = "screen-blocked";

pub(super) fn run_args(cap: Option<i64>) -> RunArgs {
    RunArgs {
        blueprint: BlueprintArgs {
            use_screening_task: Some(true),
            passed_qualification_name: Some(PASSED.to_string()),
            block_qualification: Some(FAILED.to_string()),
            max_screening_units: cap,
        },
        task: TaskArgs {
            allowed_concurrent: 1,
        },
    }
}

pub(super) fn payload(index: usize) -> UnitPayload {
    let mut payload = BTreeMap::new();
    payload.insert("prompt".to_string(), json!(format!("screening prompt {index}")));
    payload.insert("expected".to_string(), json!(index % 2 == 0));
    payload
}

pub(super) fn generator(count: usize) -> UnitDataGenerator {
    UnitDataGenerator::new((0..count).map(payload))
}

pub(super) fn shared_with_pool(count: usize) -> ScreeningSharedState {
    ScreeningSharedState::with_generator(generator(count))
}

pub(super) fn worker(name: &str) -> WorkerId {
    WorkerId(name.to_string())
}

pub(super) fn screening_unit(worker_name: &str) -> SubmittedUnit {
    SubmittedUnit {
        unit_id: UnitId(format!("screen-{worker_name}")),
        unit_index: SCREENING_UNIT_INDEX,
        assigned_worker: Some(worker(worker_name)),
        data: payload(0),
    }
}

pub(super) fn production_unit(worker_name: &str, index: i32) -> SubmittedUnit {
    SubmittedUnit {
        unit_id: UnitId(format!("unit-{worker_name}-{index}")),
        unit_index: index,
        assigned_worker: Some(worker(worker_name)),
        data: payload(1),
    }
}

pub(super) fn fixed_validator(outcome: ScreeningOutcome) -> Arc<dyn ScreenValidator> {
    validate_with(move |_unit: &SubmittedUnit| Ok(outcome))
}

#[derive(Default)]
pub(super) struct MemoryStore {
    qualifications: Mutex<HashMap<String, QualificationId>>,
    held: Mutex<HashMap<WorkerId, BTreeSet<String>>>,
    grants: Mutex<Vec<(WorkerId, String)>>,
    create_calls: Mutex<usize>,
}

impl MemoryStore {
    pub(super) fn with_qualifications(names: &[&str]) -> Self {
        let store = Self::default();
        for name in names {
            store
                .find_or_create_qualification(name)
                .expect("memory store create");
        }
        *store.create_calls.lock().expect("store mutex poisoned") = 0;
        store
    }

    pub(super) fn qualification_names(&self) -> BTreeSet<String> {
        self.qualifications
            .lock()
            .expect("store mutex poisoned")
            .keys()
            .cloned()
            .collect()
    }

    pub(super) fn create_calls(&self) -> usize {
        *self.create_calls.lock().expect("store mutex poisoned")
    }

    pub(super) fn grants(&self) -> Vec<(WorkerId, String)> {
        self.grants.lock().expect("store mutex poisoned").clone()
    }

    pub(super) fn held_by(&self, worker: &WorkerId) -> BTreeSet<String> {
        self.held
            .lock()
            .expect("store mutex poisoned")
            .get(worker)
            .cloned()
            .unwrap_or_default()
    }
}

impl QualificationStore for MemoryStore {
    fn find_or_create_qualification(&self, name: &str) -> Result<QualificationId, StoreError> {
        *self.create_calls.lock().expect("store mutex poisoned") += 1;
        let mut guard = self.qualifications.lock().expect("store mutex poisoned");
        let next_id = QualificationId(format!("qual-{}", guard.len() + 1));
        Ok(guard.entry(name.to_string()).or_insert(next_id).clone())
    }

    fn has_qualification(&self, worker: &WorkerId, name: &str) -> Result<bool, StoreError> {
        let guard = self.held.lock().expect("store mutex poisoned");
        Ok(guard
            .get(worker)
            .map(|names| names.contains(name))
            .unwrap_or(false))
    }

    fn grant_qualification(&self, worker: &WorkerId, name: &str) -> Result<(), StoreError> {
        if !self
            .qualifications
            .lock()
            .expect("store mutex poisoned")
            .contains_key(name)
        {
            return Err(StoreError::UnknownQualification(name.to_string()));
        }
        self.held
            .lock()
            .expect("store mutex poisoned")
            .entry(worker.clone())
            .or_default()
            .insert(name.to_string());
        self.grants
            .lock()
            .expect("store mutex poisoned")
            .push((worker.clone(), name.to_string()));
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl QualificationStore for UnavailableStore {
    fn find_or_create_qualification(&self, _name: &str) -> Result<QualificationId, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn has_qualification(&self, _worker: &WorkerId, _name: &str) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn grant_qualification(&self, _worker: &WorkerId, _name: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}
