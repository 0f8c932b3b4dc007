use std::collections::HashMap;
use std::sync::{Arc, Barrier, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::legality::contributions::domain::{
    ContributionId, ContributionListing, ContributionStatus, ContributionSubmission, Identity,
    LegalityContribution, VehicleContext,
};
use crate::legality::contributions::repository::{
    ContributionRecord, ContributionRepository, RepositoryError,
};
use crate::legality::contributions::{AllowListAdminPolicy, ContributionReviewService};
use crate::legality::domain::ApprovalType;

pub(super) const MODIFICATION_ID: &str = "mod-coilover-1";

pub(super) fn member() -> Identity {
    Identity {
        user_id: "user-42".to_string(),
        email: Some("driver@example.de".to_string()),
    }
}

pub(super) fn admin() -> Identity {
    Identity {
        user_id: "admin-1".to_string(),
        email: Some("review@drivetuning.de".to_string()),
    }
}

pub(super) fn submission() -> ContributionSubmission {
    ContributionSubmission {
        modification_id: MODIFICATION_ID.to_string(),
        approval_type: Some(ApprovalType::Abe),
        approval_number: Some("  KBA 12345 ".to_string()),
        inspection_org: Some("TÜV SÜD".to_string()),
        inspection_date: None,
        notes: Some("Gutachten liegt im Handschuhfach".to_string()),
        documents: vec!["https://files.example.de/abe.pdf".to_string(), "  ".to_string()],
    }
}

pub(super) fn pending_contribution(id: &str, created_at: DateTime<Utc>) -> LegalityContribution {
    LegalityContribution {
        id: ContributionId(id.to_string()),
        modification_id: MODIFICATION_ID.to_string(),
        submitted_by: member().user_id,
        approval_type: Some(ApprovalType::Abg),
        approval_number: Some("E1 00042".to_string()),
        inspection_org: None,
        inspection_date: None,
        notes: None,
        documents: Vec::new(),
        status: ContributionStatus::Pending,
        created_at,
        reviewed_by: None,
        reviewed_at: None,
        rejection_reason: None,
    }
}

pub(super) fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn minutes_after_base(minutes: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(minutes)
}

pub(super) fn admin_policy() -> AllowListAdminPolicy {
    AllowListAdminPolicy::new(vec![admin().user_id], Vec::<String>::new())
}

pub(super) fn build_service() -> (
    ContributionReviewService<MemoryRepository, AllowListAdminPolicy>,
    Arc<MemoryRepository>,
) {
    let repository = Arc::new(MemoryRepository::with_vehicle(MODIFICATION_ID));
    let service = ContributionReviewService::new(repository.clone(), Arc::new(admin_policy()));
    (service, repository)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<ContributionId, ContributionRecord>>>,
    vehicles: Arc<Mutex<HashMap<String, VehicleContext>>>,
}

impl MemoryRepository {
    pub(super) fn with_vehicle(modification_id: &str) -> Self {
        let repository = Self::default();
        repository
            .vehicles
            .lock()
            .expect("vehicle mutex poisoned")
            .insert(
                modification_id.to_string(),
                VehicleContext {
                    car_id: "car-7".to_string(),
                    car_label: "VW Golf GTI (2019)".to_string(),
                    part_name: "KW V3 Gewindefahrwerk".to_string(),
                },
            );
        repository
    }

    pub(super) fn stored(&self, id: &ContributionId) -> Option<LegalityContribution> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .map(|record| record.contribution.clone())
    }
}

impl ContributionRepository for MemoryRepository {
    fn insert(&self, record: ContributionRecord) -> Result<ContributionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.contribution.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.contribution.id.clone(), record.clone());
        Ok(record)
    }

    fn transition(
        &self,
        expected: ContributionStatus,
        contribution: LegalityContribution,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = guard
            .get_mut(&contribution.id)
            .ok_or(RepositoryError::NotFound)?;
        if record.contribution.status != expected {
            return Err(RepositoryError::Conflict);
        }
        record.contribution = contribution;
        Ok(())
    }

    fn fetch(&self, id: &ContributionId) -> Result<Option<LegalityContribution>, RepositoryError> {
        Ok(self.stored(id))
    }

    fn pending(&self, limit: usize) -> Result<Vec<ContributionListing>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let vehicles = self.vehicles.lock().expect("vehicle mutex poisoned");
        let mut pending: Vec<&ContributionRecord> = guard
            .values()
            .filter(|record| record.contribution.status == ContributionStatus::Pending)
            .collect();
        pending.sort_by(|left, right| {
            right
                .contribution
                .created_at
                .cmp(&left.contribution.created_at)
        });
        Ok(pending
            .into_iter()
            .take(limit)
            .map(|record| ContributionListing {
                contribution: record.contribution.clone(),
                submitter: record.submitter.clone(),
                vehicle: vehicles.get(&record.contribution.modification_id).cloned(),
            })
            .collect())
    }

    fn vehicle_context(
        &self,
        modification_id: &str,
    ) -> Result<Option<VehicleContext>, RepositoryError> {
        let vehicles = self.vehicles.lock().expect("vehicle mutex poisoned");
        Ok(vehicles.get(modification_id).cloned())
    }
}

pub(super) struct UnavailableRepository;

impl ContributionRepository for UnavailableRepository {
    fn insert(&self, _record: ContributionRecord) -> Result<ContributionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".into()))
    }

    fn transition(
        &self,
        _expected: ContributionStatus,
        _contribution: LegalityContribution,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".into()))
    }

    fn fetch(
        &self,
        _id: &ContributionId,
    ) -> Result<Option<LegalityContribution>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".into()))
    }

    fn pending(&self, _limit: usize) -> Result<Vec<ContributionListing>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".into()))
    }

    fn vehicle_context(
        &self,
        _modification_id: &str,
    ) -> Result<Option<VehicleContext>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".into()))
    }
}

/// Holds every reviewer after its read until all of them have read, so status checks race.
pub(super) struct LockstepRepository {
    pub(super) inner: MemoryRepository,
    barrier: Barrier,
}

impl LockstepRepository {
    pub(super) fn new(inner: MemoryRepository, reviewers: usize) -> Self {
        Self {
            inner,
            barrier: Barrier::new(reviewers),
        }
    }
}

impl ContributionRepository for LockstepRepository {
    fn insert(&self, record: ContributionRecord) -> Result<ContributionRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn transition(
        &self,
        expected: ContributionStatus,
        contribution: LegalityContribution,
    ) -> Result<(), RepositoryError> {
        self.inner.transition(expected, contribution)
    }

    fn fetch(&self, id: &ContributionId) -> Result<Option<LegalityContribution>, RepositoryError> {
        let fetched = self.inner.fetch(id)?;
        if fetched
            .as_ref()
            .is_some_and(|contribution| contribution.status == ContributionStatus::Pending)
        {
            self.barrier.wait();
        }
        Ok(fetched)
    }

    fn pending(&self, limit: usize) -> Result<Vec<ContributionListing>, RepositoryError> {
        self.inner.pending(limit)
    }

    fn vehicle_context(
        &self,
        modification_id: &str,
    ) -> Result<Option<VehicleContext>, RepositoryError> {
        self.inner.vehicle_context(modification_id)
    }
}

pub(super) fn seed_pending(repository: &MemoryRepository, id: &str, created_at: DateTime<Utc>) {
    repository
        .insert(ContributionRecord {
            contribution: pending_contribution(id, created_at),
            submitter: member(),
        })
        .expect("seed succeeds");
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("valid json body")
}
