use serde::{Deserialize, Serialize};

use super::domain::{
    ContributionId, ContributionListing, ContributionStatus, Identity, LegalityContribution,
    VehicleContext,
};

/// Contribution together with the identity that submitted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    pub contribution: LegalityContribution,
    pub submitter: Identity,
}

/// Storage abstraction so the review service can be exercised in isolation.
pub trait ContributionRepository: Send + Sync {
    fn insert(&self, record: ContributionRecord) -> Result<ContributionRecord, RepositoryError>;
    /// Replaces the stored contribution only while its status still equals `expected`.
    ///
    /// The status check and the write must be atomic (one lock or one transaction). A status
    /// mismatch yields [`RepositoryError::Conflict`] and a missing record
    /// [`RepositoryError::NotFound`].
    fn transition(
        &self,
        expected: ContributionStatus,
        contribution: LegalityContribution,
    ) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ContributionId) -> Result<Option<LegalityContribution>, RepositoryError>;
    /// The `limit` newest PENDING contributions, newest first, joined with submitter and car
    /// context. Ordering must be applied before the limit.
    fn pending(&self, limit: usize) -> Result<Vec<ContributionListing>, RepositoryError>;
    fn vehicle_context(
        &self,
        modification_id: &str,
    ) -> Result<Option<VehicleContext>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
