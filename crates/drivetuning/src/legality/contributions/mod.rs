//! Crowd-sourced legality evidence and its admin review workflow.
//!
//! Users submit evidence for a modification, which starts out PENDING. An admin, as decided by
//! the injected [`AdminPolicy`], moves it to APPROVED or REJECTED exactly once.

pub mod domain;
pub mod policy;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ContributionId, ContributionListing, ContributionStatus, ContributionSubmission, Identity,
    LegalityContribution, ReviewDecision, ReviewOutcome, ReviewRequest, VehicleContext,
};
pub use policy::{AdminPolicy, AllowListAdminPolicy};
pub use repository::{ContributionRecord, ContributionRepository, RepositoryError};
pub use router::{contribution_router, identity_from_headers};
pub use service::{
    ContributionError, ContributionReviewService, DEFAULT_REJECTION_REASON, MAX_NOTES_CHARS,
    MAX_REASON_CHARS, PENDING_LIST_LIMIT,
};
