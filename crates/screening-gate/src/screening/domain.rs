use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unit index carried by generated screening units.
pub const SCREENING_UNIT_INDEX: i32 = -1;

/// Content of a single work item, keyed by field name.
pub type UnitPayload = BTreeMap<String, serde_json::Value>;

/// Identifier wrapper for workers known to the qualification store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkerId(pub String);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for launched units.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitId(pub String);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store-assigned identifier for a qualification record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualificationId(pub String);

/// A unit handed back by a worker. Negative indices mark screening units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedUnit {
    pub unit_id: UnitId,
    pub unit_index: i32,
    pub assigned_worker: Option<WorkerId>,
    #[serde(default)]
    pub data: UnitPayload,
}

impl SubmittedUnit {
    pub fn is_screening_unit(&self) -> bool {
        self.unit_index < 0
    }
}

/// Verdict from a caller-supplied screening validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreeningOutcome {
    Passed,
    Failed,
    Undecided,
}

impl ScreeningOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            ScreeningOutcome::Passed => "passed",
            ScreeningOutcome::Failed => "failed",
            ScreeningOutcome::Undecided => "undecided",
        }
    }
}

impl From<Option<bool>> for ScreeningOutcome {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => ScreeningOutcome::Passed,
            Some(false) => ScreeningOutcome::Failed,
            None => ScreeningOutcome::Undecided,
        }
    }
}

/// Where a worker sits in the screening lifecycle, derived from held qualifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerScreeningStatus {
    Unscreened,
    Passed,
    Failed,
}

impl WorkerScreeningStatus {
    pub const fn label(self) -> &'static str {
        match self {
            WorkerScreeningStatus::Unscreened => "unscreened",
            WorkerScreeningStatus::Passed => "passed",
            WorkerScreeningStatus::Failed => "failed",
        }
    }
}
