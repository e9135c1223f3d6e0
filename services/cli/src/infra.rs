use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;
use screening_gate::screening::{
    QualificationId, QualificationStore, ScreeningSharedState, ScreeningUnitData, StoreError,
    UnitDataGenerator, UnitPayload, WorkerId,
};

/// Grant audit entry kept by the in-memory store.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct GrantRecord {
    pub(crate) worker: WorkerId,
    pub(crate) qualification: String,
    pub(crate) granted_at: DateTime<Utc>,
}

#[derive(Default)]
pub(crate) struct InMemoryQualificationStore {
    qualifications: Mutex<HashMap<String, QualificationId>>,
    held: Mutex<HashMap<WorkerId, BTreeSet<String>>>,
    grants: Mutex<Vec<GrantRecord>>,
}

impl InMemoryQualificationStore {
    pub(crate) fn grants(&self) -> Vec<GrantRecord> {
        self.grants.lock().expect("grant mutex poisoned").clone()
    }
}

impl QualificationStore for InMemoryQualificationStore {
    fn find_or_create_qualification(&self, name: &str) -> Result<QualificationId, StoreError> {
        let mut guard = self
            .qualifications
            .lock()
            .expect("qualification mutex poisoned");
        let next_id = QualificationId(format!("qual-{:04}", guard.len() + 1));
        Ok(guard.entry(name.to_string()).or_insert(next_id).clone())
    }

    fn has_qualification(&self, worker: &WorkerId, name: &str) -> Result<bool, StoreError> {
        let guard = self.held.lock().expect("holder mutex poisoned");
        Ok(guard
            .get(worker)
            .map(|names| names.contains(name))
            .unwrap_or(false))
    }

    fn grant_qualification(&self, worker: &WorkerId, name: &str) -> Result<(), StoreError> {
        if !self
            .qualifications
            .lock()
            .expect("qualification mutex poisoned")
            .contains_key(name)
        {
            return Err(StoreError::UnknownQualification(name.to_string()));
        }

        let newly_held = self
            .held
            .lock()
            .expect("holder mutex poisoned")
            .entry(worker.clone())
            .or_default()
            .insert(name.to_string());
        if newly_held {
            self.grants
                .lock()
                .expect("grant mutex poisoned")
                .push(GrantRecord {
                    worker: worker.clone(),
                    qualification: name.to_string(),
                    granted_at: Utc::now(),
                });
        }
        Ok(())
    }
}

/// How the simulated task author fills `generate_screening_unit_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum UnitDataKind {
    /// Lazily generated arithmetic questions
    #[default]
    Generator,
    /// No generation; screening validates existing units
    Disabled,
    /// An eager list of questions (rejected by validation)
    Materialized,
    /// Attribute not supplied at all
    Missing,
}

pub(crate) fn screening_question(index: usize) -> UnitPayload {
    let left = (index % 7) as i64 + 2;
    let right = (index % 5) as i64 + 3;
    let mut payload = BTreeMap::new();
    payload.insert("question".to_string(), json!(format!("{left} + {right}")));
    payload.insert("answer_key".to_string(), json!(left + right));
    payload
}

pub(crate) fn shared_state(kind: UnitDataKind, pool: usize) -> ScreeningSharedState {
    let generate_screening_unit_data = match kind {
        UnitDataKind::Generator => Some(ScreeningUnitData::Generator(UnitDataGenerator::new(
            (0..pool).map(screening_question),
        ))),
        UnitDataKind::Disabled => Some(ScreeningUnitData::Disabled),
        UnitDataKind::Materialized => Some(ScreeningUnitData::Materialized(
            (0..pool).map(screening_question).collect(),
        )),
        UnitDataKind::Missing => None,
    };
    ScreeningSharedState {
        generate_screening_unit_data,
    }
}
