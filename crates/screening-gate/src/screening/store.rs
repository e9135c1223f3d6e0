use super::domain::{QualificationId, WorkerId};

/// Persistence boundary for qualifications and the workers holding them.
///
/// Implementations must make `find_or_create_qualification` and
/// `grant_qualification` idempotent: repeating either call is a no-op.
pub trait QualificationStore: Send + Sync {
    fn find_or_create_qualification(&self, name: &str) -> Result<QualificationId, StoreError>;
    fn has_qualification(&self, worker: &WorkerId, name: &str) -> Result<bool, StoreError>;
    fn grant_qualification(&self, worker: &WorkerId, name: &str) -> Result<(), StoreError>;
}

impl<S: QualificationStore + ?Sized> QualificationStore for std::sync::Arc<S> {
    fn find_or_create_qualification(&self, name: &str) -> Result<QualificationId, StoreError> {
        (**self).find_or_create_qualification(name)
    }

    fn has_qualification(&self, worker: &WorkerId, name: &str) -> Result<bool, StoreError> {
        (**self).has_qualification(worker, name)
    }

    fn grant_qualification(&self, worker: &WorkerId, name: &str) -> Result<(), StoreError> {
        (**self).grant_qualification(worker, name)
    }
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("worker {0} is not known to the store")]
    UnknownWorker(WorkerId),
    #[error("qualification `{0}` does not exist")]
    UnknownQualification(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
