use std::sync::Arc;

use super::common::*;
use crate::legality::contributions::domain::{
    ContributionId, ContributionStatus, ReviewDecision, ReviewRequest,
};
use crate::legality::contributions::repository::ContributionRepository;
use crate::legality::contributions::{
    ContributionError, ContributionReviewService, RepositoryError, DEFAULT_REJECTION_REASON,
    MAX_NOTES_CHARS, MAX_REASON_CHARS, PENDING_LIST_LIMIT,
};

fn approve() -> ReviewRequest {
    ReviewRequest {
        decision: ReviewDecision::Approved,
        reason: None,
    }
}

fn reject(reason: Option<&str>) -> ReviewRequest {
    ReviewRequest {
        decision: ReviewDecision::Rejected,
        reason: reason.map(str::to_string),
    }
}

#[test]
fn submit_requires_an_identity() {
    let (service, _) = build_service();
    let error = service.submit(None, submission()).unwrap_err();
    assert!(matches!(error, ContributionError::Unauthenticated));
}

#[test]
fn submit_rejects_unknown_modifications() {
    let (service, _) = build_service();
    let mut payload = submission();
    payload.modification_id = "mod-missing".to_string();

    let error = service.submit(Some(&member()), payload).unwrap_err();
    assert!(matches!(error, ContributionError::UnknownModification(id) if id == "mod-missing"));
}

#[test]
fn submit_stores_a_trimmed_pending_contribution() {
    let (service, repository) = build_service();

    let contribution = service
        .submit(Some(&member()), submission())
        .expect("submission succeeds");

    assert_eq!(contribution.status, ContributionStatus::Pending);
    assert_eq!(contribution.submitted_by, "user-42");
    assert_eq!(contribution.approval_number.as_deref(), Some("KBA 12345"));
    assert_eq!(contribution.documents.len(), 1);
    assert!(contribution.reviewed_by.is_none());
    assert!(contribution.id.0.starts_with("contrib-"));
    assert_eq!(repository.stored(&contribution.id), Some(contribution));
}

#[test]
fn submit_caps_notes_length() {
    let (service, _) = build_service();
    let mut payload = submission();
    payload.notes = Some("x".repeat(MAX_NOTES_CHARS + 1));

    let error = service.submit(Some(&member()), payload).unwrap_err();
    assert!(matches!(error, ContributionError::NotesTooLong { .. }));
}

#[test]
fn review_requires_admin_rights() {
    let (service, repository) = build_service();
    seed_pending(&repository, "contrib-a", base_time());
    let id = ContributionId("contrib-a".to_string());

    assert!(matches!(
        service.review(None, &id, approve()).unwrap_err(),
        ContributionError::Unauthenticated
    ));
    assert!(matches!(
        service.review(Some(&member()), &id, approve()).unwrap_err(),
        ContributionError::Forbidden
    ));
    assert_eq!(
        repository.stored(&id).map(|stored| stored.status),
        Some(ContributionStatus::Pending)
    );
}

#[test]
fn approval_stamps_reviewer_and_is_final() {
    let (service, repository) = build_service();
    seed_pending(&repository, "contrib-b", base_time());
    let id = ContributionId("contrib-b".to_string());

    let outcome = service
        .review(Some(&admin()), &id, approve())
        .expect("review succeeds");
    assert_eq!(outcome.status, ContributionStatus::Approved);

    let stored = repository.stored(&id).expect("stored");
    assert_eq!(stored.reviewed_by.as_deref(), Some("admin-1"));
    assert!(stored.reviewed_at.is_some());
    assert!(stored.rejection_reason.is_none());

    let error = service
        .review(Some(&admin()), &id, reject(Some("changed my mind")))
        .unwrap_err();
    assert!(matches!(
        error,
        ContributionError::AlreadyReviewed {
            status: ContributionStatus::Approved,
            ..
        }
    ));
    assert_eq!(
        repository.stored(&id).map(|stored| stored.status),
        Some(ContributionStatus::Approved)
    );
}

#[test]
fn rejection_without_reason_uses_default() {
    let (service, repository) = build_service();
    seed_pending(&repository, "contrib-c", base_time());
    let id = ContributionId("contrib-c".to_string());

    service
        .review(Some(&admin()), &id, reject(Some("   ")))
        .expect("review succeeds");

    let stored = repository.stored(&id).expect("stored");
    assert_eq!(stored.status, ContributionStatus::Rejected);
    assert_eq!(
        stored.rejection_reason.as_deref(),
        Some(DEFAULT_REJECTION_REASON)
    );
}

#[test]
fn rejection_keeps_explicit_reason_and_caps_length() {
    let (service, repository) = build_service();
    seed_pending(&repository, "contrib-d", base_time());
    let id = ContributionId("contrib-d".to_string());

    let too_long = "a".repeat(MAX_REASON_CHARS + 1);
    let error = service
        .review(Some(&admin()), &id, reject(Some(&too_long)))
        .unwrap_err();
    assert!(matches!(error, ContributionError::ReasonTooLong { max } if max == MAX_REASON_CHARS));

    service
        .review(Some(&admin()), &id, reject(Some("Nummer passt nicht zum Teil")))
        .expect("review succeeds");
    assert_eq!(
        repository
            .stored(&id)
            .and_then(|stored| stored.rejection_reason),
        Some("Nummer passt nicht zum Teil".to_string())
    );
}

#[test]
fn review_of_missing_contribution_is_not_found() {
    let (service, _) = build_service();
    let id = ContributionId("contrib-missing".to_string());

    let error = service.review(Some(&admin()), &id, approve()).unwrap_err();
    assert!(matches!(error, ContributionError::NotFound(missing) if missing == id));
}

#[test]
fn pending_lists_newest_first_for_admins_only() {
    let (service, repository) = build_service();
    seed_pending(&repository, "contrib-old", minutes_after_base(0));
    seed_pending(&repository, "contrib-new", minutes_after_base(30));
    seed_pending(&repository, "contrib-mid", minutes_after_base(10));
    service
        .review(
            Some(&admin()),
            &ContributionId("contrib-mid".to_string()),
            approve(),
        )
        .expect("review succeeds");

    assert!(matches!(
        service.pending(Some(&member())).unwrap_err(),
        ContributionError::Forbidden
    ));

    let listings = service.pending(Some(&admin())).expect("listing succeeds");
    let ids: Vec<&str> = listings
        .iter()
        .map(|listing| listing.contribution.id.0.as_str())
        .collect();
    assert_eq!(ids, vec!["contrib-new", "contrib-old"]);
    assert_eq!(
        listings[0].vehicle.as_ref().map(|vehicle| vehicle.car_id.as_str()),
        Some("car-7")
    );
    assert_eq!(listings[0].submitter, member());
}

#[test]
fn pending_is_capped() {
    let (service, repository) = build_service();
    for index in 0..(PENDING_LIST_LIMIT as i64 + 5) {
        seed_pending(
            &repository,
            &format!("contrib-bulk-{index:03}"),
            minutes_after_base(index),
        );
    }

    let listings = service.pending(Some(&admin())).expect("listing succeeds");
    let ids: Vec<&str> = listings
        .iter()
        .map(|listing| listing.contribution.id.0.as_str())
        .collect();
    let expected: Vec<String> = (5..(PENDING_LIST_LIMIT as i64 + 5))
        .rev()
        .map(|index| format!("contrib-bulk-{index:03}"))
        .collect();

    assert_eq!(ids.len(), PENDING_LIST_LIMIT);
    assert_eq!(ids.first().copied(), Some("contrib-bulk-104"));
    assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn concurrent_reviews_settle_exactly_once() {
    let inner = MemoryRepository::with_vehicle(MODIFICATION_ID);
    seed_pending(&inner, "contrib-race", base_time());
    let repository = Arc::new(LockstepRepository::new(inner, 2));
    let service = ContributionReviewService::new(repository.clone(), Arc::new(admin_policy()));
    let id = ContributionId("contrib-race".to_string());

    let (approved, rejected) = std::thread::scope(|scope| {
        let approving = scope.spawn(|| service.review(Some(&admin()), &id, approve()));
        let rejecting =
            scope.spawn(|| service.review(Some(&admin()), &id, reject(Some("Falsche Nummer"))));
        (
            approving.join().expect("approving reviewer finishes"),
            rejecting.join().expect("rejecting reviewer finishes"),
        )
    });

    let results = [approved, rejected];
    let settled: Vec<_> = results.iter().filter_map(|result| result.as_ref().ok()).collect();
    assert_eq!(settled.len(), 1, "exactly one review may win");
    assert!(results.iter().any(|result| matches!(
        result,
        Err(ContributionError::AlreadyReviewed { status, .. }) if *status == settled[0].status
    )));

    let stored = repository.inner.stored(&id).expect("stored");
    assert_eq!(stored.status, settled[0].status);
    assert!(stored.status.is_terminal());
}

#[test]
fn stale_status_write_is_a_conflict() {
    let repository = MemoryRepository::with_vehicle(MODIFICATION_ID);
    seed_pending(&repository, "contrib-stale", base_time());
    let id = ContributionId("contrib-stale".to_string());

    let mut approved = repository.stored(&id).expect("stored");
    approved.status = ContributionStatus::Approved;
    repository
        .transition(ContributionStatus::Pending, approved.clone())
        .expect("first transition wins");

    approved.status = ContributionStatus::Rejected;
    assert!(matches!(
        repository.transition(ContributionStatus::Pending, approved),
        Err(RepositoryError::Conflict)
    ));
}

#[test]
fn repository_failures_surface() {
    let service = ContributionReviewService::new(
        Arc::new(UnavailableRepository),
        Arc::new(admin_policy()),
    );

    let error = service.submit(Some(&member()), submission()).unwrap_err();
    assert!(matches!(
        error,
        ContributionError::Repository(RepositoryError::Unavailable(_))
    ));
}
