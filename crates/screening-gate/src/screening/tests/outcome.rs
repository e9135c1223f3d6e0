use std::io;
use std::sync::Arc;

use super::common::*;
use crate::screening::domain::{ScreeningOutcome, SubmittedUnit};
use crate::screening::outcome::{
    validate_with, OutcomeRouter, SubmissionDisposition, SubmissionError, SubmissionHandler,
};

fn handler(store: &Arc<MemoryStore>, outcome: ScreeningOutcome) -> SubmissionHandler {
    OutcomeRouter::build_submission_handler(
        Arc::clone(store),
        PASSED,
        FAILED,
        fixed_validator(outcome),
    )
}

fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_qualifications(&[PASSED, FAILED]))
}

#[test]
fn production_units_are_never_validated() {
    for outcome in [
        ScreeningOutcome::Passed,
        ScreeningOutcome::Failed,
        ScreeningOutcome::Undecided,
    ] {
        let store = store();
        let handler = handler(&store, outcome);

        for index in [0, 1, 42] {
            let disposition = handler
                .on_unit_submitted(&production_unit("w-1", index))
                .expect("production units skip");
            assert_eq!(disposition, SubmissionDisposition::Skipped);
        }
        assert!(store.grants().is_empty());
    }
}

#[test]
fn validator_is_not_called_for_production_units() {
    let store = store();
    let handler = OutcomeRouter::build_submission_handler(
        Arc::clone(&store),
        PASSED,
        FAILED,
        validate_with(|unit: &SubmittedUnit| panic!("validator called for {}", unit.unit_id)),
    );

    handler
        .on_unit_submitted(&production_unit("w-1", 0))
        .expect("skipped");
}

#[test]
fn passed_outcome_grants_only_the_passed_qualification() {
    let store = store();
    let disposition = handler(&store, ScreeningOutcome::Passed)
        .on_unit_submitted(&screening_unit("w-1"))
        .expect("grant succeeds");

    assert_eq!(
        disposition,
        SubmissionDisposition::Granted {
            worker: worker("w-1"),
            qualification: PASSED.to_string(),
            outcome: ScreeningOutcome::Passed,
        }
    );
    assert_eq!(store.grants(), vec![(worker("w-1"), PASSED.to_string())]);
}

#[test]
fn failed_outcome_grants_only_the_failed_qualification() {
    let store = store();
    handler(&store, ScreeningOutcome::Failed)
        .on_unit_submitted(&screening_unit("w-2"))
        .expect("grant succeeds");

    assert_eq!(store.grants(), vec![(worker("w-2"), FAILED.to_string())]);
    assert!(store.held_by(&worker("w-2")).contains(FAILED));
}

#[test]
fn undecided_outcome_grants_nothing() {
    let store = store();
    let disposition = handler(&store, ScreeningOutcome::Undecided)
        .on_unit_submitted(&screening_unit("w-3"))
        .expect("undecided is not an error");

    assert_eq!(disposition, SubmissionDisposition::Undecided);
    assert!(store.grants().is_empty());
}

#[test]
fn validator_sees_the_submitted_unit() {
    let store = store();
    let handler = OutcomeRouter::build_submission_handler(
        Arc::clone(&store),
        PASSED,
        FAILED,
        validate_with(|unit: &SubmittedUnit| {
            let expected = unit.data.get("expected").and_then(|value| value.as_bool());
            Ok(ScreeningOutcome::from(expected))
        }),
    );

    let mut unit = screening_unit("w-4");
    unit.data.remove("expected");
    assert_eq!(
        handler.on_unit_submitted(&unit).expect("undecided"),
        SubmissionDisposition::Undecided
    );

    let unit = screening_unit("w-4");
    handler.on_unit_submitted(&unit).expect("decided");
    assert_eq!(store.grants(), vec![(worker("w-4"), PASSED.to_string())]);
}

#[test]
fn validator_errors_propagate_without_grants() {
    let store = store();
    let handler = OutcomeRouter::build_submission_handler(
        Arc::clone(&store),
        PASSED,
        FAILED,
        validate_with(|_unit: &SubmittedUnit| {
            Err(io::Error::new(io::ErrorKind::Other, "review service down").into())
        }),
    );

    match handler.on_unit_submitted(&screening_unit("w-5")) {
        Err(SubmissionError::Validator { unit_id, source }) => {
            assert_eq!(unit_id.0, "screen-w-5");
            assert!(source.to_string().contains("review service down"));
        }
        other => panic!("expected validator error, got {other:?}"),
    }
    assert!(store.grants().is_empty());
}

#[test]
fn decided_unit_without_worker_is_rejected() {
    let store = store();
    let mut unit = screening_unit("w-6");
    unit.assigned_worker = None;

    match handler(&store, ScreeningOutcome::Passed).on_unit_submitted(&unit) {
        Err(SubmissionError::Unassigned(unit_id)) => assert_eq!(unit_id, unit.unit_id),
        other => panic!("expected unassigned error, got {other:?}"),
    }
}

#[test]
fn store_failures_propagate() {
    let store = Arc::new(MemoryStore::default());
    match handler(&store, ScreeningOutcome::Failed).on_unit_submitted(&screening_unit("w-7")) {
        Err(SubmissionError::Store(_)) => {}
        other => panic!("expected store error, got {other:?}"),
    }
}

#[test]
fn repeated_submissions_grant_idempotently() {
    let store = store();
    let callback = handler(&store, ScreeningOutcome::Passed).into_callback();

    callback(&screening_unit("w-8")).expect("first grant");
    callback(&screening_unit("w-8")).expect("second grant");

    assert_eq!(store.held_by(&worker("w-8")).len(), 1);
    assert_eq!(store.grants().len(), 2);
}

#[test]
fn inactive_handler_skips_screening_units() {
    let store = store();
    let validator = fixed_validator(ScreeningOutcome::Failed);
    let handler = OutcomeRouter::inactive_handler(Arc::clone(&store), validator);

    assert_eq!(
        handler
            .on_unit_submitted(&screening_unit("w-9"))
            .expect("skipped"),
        SubmissionDisposition::Skipped
    );
    assert!(store.grants().is_empty());
}
