use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::WorkerId;
use super::store::{QualificationStore, StoreError};

/// How a requirement compares against a worker's qualifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualificationComparator {
    Exists,
    NotExists,
}

/// Declarative entry in a task's eligibility requirement list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualificationRequirement {
    pub qualification_name: String,
    pub comparator: QualificationComparator,
    pub value: Option<serde_json::Value>,
}

impl QualificationRequirement {
    pub fn not_exists(name: impl Into<String>) -> Self {
        Self {
            qualification_name: name.into(),
            comparator: QualificationComparator::NotExists,
            value: None,
        }
    }

    /// Whether a worker that does (or does not) hold the qualification satisfies this entry.
    pub fn is_met_by(&self, held: bool) -> bool {
        match self.comparator {
            QualificationComparator::Exists => held,
            QualificationComparator::NotExists => !held,
        }
    }

    /// Evaluate this requirement for a worker against the store.
    pub fn check<S>(&self, store: &S, worker: &WorkerId) -> Result<bool, StoreError>
    where
        S: QualificationStore + ?Sized,
    {
        let held = store.has_qualification(worker, &self.qualification_name)?;
        Ok(self.is_met_by(held))
    }
}

/// Keeps the pass/fail qualifications present in the store.
pub struct QualificationRegistrar;

impl QualificationRegistrar {
    pub fn ensure_exists<S>(store: &S, name: &str) -> Result<(), StoreError>
    where
        S: QualificationStore + ?Sized,
    {
        let id = store.find_or_create_qualification(name)?;
        debug!(qualification = name, id = %id.0, "qualification registered");
        Ok(())
    }

    /// Requirement list this gate adds to a task: workers holding the failed
    /// qualification are never offered the task.
    pub fn required_qualifications(failed_name: &str) -> Vec<QualificationRequirement> {
        vec![QualificationRequirement::not_exists(failed_name)]
    }
}
