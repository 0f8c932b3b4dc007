use chrono::NaiveDate;
use drivetuning::legality::contributions::{
    ContributionId, ContributionListing, ContributionRecord, ContributionRepository,
    ContributionStatus, LegalityContribution, RepositoryError, VehicleContext,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local contribution store keyed by id, with car context per modification.
#[derive(Default, Clone)]
pub(crate) struct InMemoryContributionRepository {
    records: Arc<Mutex<HashMap<ContributionId, ContributionRecord>>>,
    vehicles: Arc<Mutex<HashMap<String, VehicleContext>>>,
}

impl InMemoryContributionRepository {
    pub(crate) fn register_vehicle(
        &self,
        modification_id: impl Into<String>,
        vehicle: VehicleContext,
    ) {
        let mut guard = self.vehicles.lock().expect("vehicle mutex poisoned");
        guard.insert(modification_id.into(), vehicle);
    }

    /// Store seeded with a single demo car so local runs can exercise the review flow.
    pub(crate) fn with_demo_vehicles() -> Self {
        let repository = Self::default();
        repository.register_vehicle(
            "demo-mod-exhaust",
            VehicleContext {
                car_id: "demo-car-1".to_string(),
                car_label: "BMW M2 (2021)".to_string(),
                part_name: "Akrapovič Slip-On".to_string(),
            },
        );
        repository.register_vehicle(
            "demo-mod-coilover",
            VehicleContext {
                car_id: "demo-car-1".to_string(),
                car_label: "BMW M2 (2021)".to_string(),
                part_name: "KW V3 Gewindefahrwerk".to_string(),
            },
        );
        repository
    }
}

impl ContributionRepository for InMemoryContributionRepository {
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
        match guard.get_mut(&contribution.id) {
            Some(record) if record.contribution.status == expected => {
                record.contribution = contribution;
                Ok(())
            }
            Some(_) => Err(RepositoryError::Conflict),
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ContributionId) -> Result<Option<LegalityContribution>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).map(|record| record.contribution.clone()))
    }

    fn pending(&self, limit: usize) -> Result<Vec<ContributionListing>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let vehicles = self.vehicles.lock().expect("vehicle mutex poisoned");

        let mut listings: Vec<ContributionListing> = guard
            .values()
            .filter(|record| record.contribution.status == ContributionStatus::Pending)
            .map(|record| ContributionListing {
                contribution: record.contribution.clone(),
                submitter: record.submitter.clone(),
                vehicle: vehicles.get(&record.contribution.modification_id).cloned(),
            })
            .collect();
        listings.sort_by(|left, right| {
            right
                .contribution
                .created_at
                .cmp(&left.contribution.created_at)
        });
        listings.truncate(limit);
        Ok(listings)
    }

    fn vehicle_context(
        &self,
        modification_id: &str,
    ) -> Result<Option<VehicleContext>, RepositoryError> {
        let guard = self.vehicles.lock().expect("vehicle mutex poisoned");
        Ok(guard.get(modification_id).cloned())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
