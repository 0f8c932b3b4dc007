use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    ContributionId, ContributionListing, ContributionStatus, ContributionSubmission, Identity,
    LegalityContribution, ReviewDecision, ReviewOutcome, ReviewRequest,
};
use super::policy::AdminPolicy;
use super::repository::{ContributionRecord, ContributionRepository, RepositoryError};
use crate::legality::domain::WireLabel;

pub const PENDING_LIST_LIMIT: usize = 100;
pub const DEFAULT_REJECTION_REASON: &str = "Insufficient evidence provided";
pub const MAX_REASON_CHARS: usize = 500;
pub const MAX_NOTES_CHARS: usize = 2000;

static CONTRIBUTION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_contribution_id() -> ContributionId {
    let id = CONTRIBUTION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ContributionId(format!("contrib-{id:06}"))
}

/// Crowd-review workflow: users submit evidence, admins approve or reject it once.
pub struct ContributionReviewService<R, P> {
    repository: Arc<R>,
    policy: Arc<P>,
}

impl<R, P> ContributionReviewService<R, P>
where
    R: ContributionRepository + 'static,
    P: AdminPolicy + 'static,
{
    pub fn new(repository: Arc<R>, policy: Arc<P>) -> Self {
        Self { repository, policy }
    }

    /// Record a new PENDING contribution for an existing modification.
    pub fn submit(
        &self,
        identity: Option<&Identity>,
        submission: ContributionSubmission,
    ) -> Result<LegalityContribution, ContributionError> {
        let identity = identity.ok_or(ContributionError::Unauthenticated)?;

        let modification_id = submission.modification_id.trim().to_string();
        if modification_id.is_empty()
            || self
                .repository
                .vehicle_context(&modification_id)?
                .is_none()
        {
            return Err(ContributionError::UnknownModification(modification_id));
        }

        let notes = match non_blank(submission.notes) {
            Some(notes) if notes.chars().count() > MAX_NOTES_CHARS => {
                return Err(ContributionError::NotesTooLong {
                    max: MAX_NOTES_CHARS,
                })
            }
            other => other,
        };

        let contribution = LegalityContribution {
            id: next_contribution_id(),
            modification_id,
            submitted_by: identity.user_id.clone(),
            approval_type: submission.approval_type,
            approval_number: non_blank(submission.approval_number),
            inspection_org: non_blank(submission.inspection_org),
            inspection_date: submission.inspection_date,
            notes,
            documents: submission
                .documents
                .into_iter()
                .filter_map(|document| non_blank(Some(document)))
                .collect(),
            status: ContributionStatus::Pending,
            created_at: Utc::now(),
            reviewed_by: None,
            reviewed_at: None,
            rejection_reason: None,
        };

        let stored = self.repository.insert(ContributionRecord {
            contribution,
            submitter: identity.clone(),
        })?;

        info!(
            contribution_id = %stored.contribution.id.0,
            modification_id = %stored.contribution.modification_id,
            "legality contribution submitted"
        );
        Ok(stored.contribution)
    }

    /// Move a PENDING contribution to APPROVED or REJECTED, stamping reviewer and time.
    pub fn review(
        &self,
        identity: Option<&Identity>,
        id: &ContributionId,
        request: ReviewRequest,
    ) -> Result<ReviewOutcome, ContributionError> {
        let reviewer = self.require_admin(identity)?;

        let rejection_reason = match request.decision {
            ReviewDecision::Approved => None,
            ReviewDecision::Rejected => Some(normalized_rejection_reason(request.reason)?),
        };

        let mut contribution = self
            .repository
            .fetch(id)?
            .ok_or_else(|| ContributionError::NotFound(id.clone()))?;

        if contribution.status.is_terminal() {
            warn!(
                contribution_id = %id.0,
                status = contribution.status.label(),
                "refusing to review a contribution twice"
            );
            return Err(ContributionError::AlreadyReviewed {
                id: id.clone(),
                status: contribution.status,
            });
        }

        contribution.status = request.decision.into();
        contribution.reviewed_by = Some(reviewer.user_id.clone());
        contribution.reviewed_at = Some(Utc::now());
        contribution.rejection_reason = rejection_reason;

        let outcome = ReviewOutcome {
            id: contribution.id.clone(),
            status: contribution.status,
        };
        match self
            .repository
            .transition(ContributionStatus::Pending, contribution)
        {
            Ok(()) => {}
            Err(RepositoryError::Conflict) => {
                let status = self
                    .repository
                    .fetch(id)?
                    .map(|current| current.status)
                    .ok_or_else(|| ContributionError::NotFound(id.clone()))?;
                warn!(
                    contribution_id = %id.0,
                    status = status.label(),
                    "concurrent review already settled this contribution"
                );
                return Err(ContributionError::AlreadyReviewed {
                    id: id.clone(),
                    status,
                });
            }
            Err(error) => return Err(error.into()),
        }

        info!(
            contribution_id = %outcome.id.0,
            status = outcome.status.label(),
            reviewer = %reviewer.user_id,
            "legality contribution reviewed"
        );
        Ok(outcome)
    }

    /// Pending contributions for admins, newest first.
    pub fn pending(
        &self,
        identity: Option<&Identity>,
    ) -> Result<Vec<ContributionListing>, ContributionError> {
        self.require_admin(identity)?;

        let mut listings = self.repository.pending(PENDING_LIST_LIMIT)?;
        listings.retain(|listing| listing.contribution.status == ContributionStatus::Pending);
        listings.sort_by(|left, right| {
            right
                .contribution
                .created_at
                .cmp(&left.contribution.created_at)
        });
        listings.truncate(PENDING_LIST_LIMIT);
        Ok(listings)
    }

    fn require_admin<'a>(
        &self,
        identity: Option<&'a Identity>,
    ) -> Result<&'a Identity, ContributionError> {
        let identity = identity.ok_or(ContributionError::Unauthenticated)?;
        if self.policy.is_admin(identity) {
            Ok(identity)
        } else {
            Err(ContributionError::Forbidden)
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn normalized_rejection_reason(reason: Option<String>) -> Result<String, ContributionError> {
    match non_blank(reason) {
        None => Ok(DEFAULT_REJECTION_REASON.to_string()),
        Some(reason) if reason.chars().count() > MAX_REASON_CHARS => {
            Err(ContributionError::ReasonTooLong {
                max: MAX_REASON_CHARS,
            })
        }
        Some(reason) => Ok(reason),
    }
}

/// Error raised by the contribution review service.
#[derive(Debug, thiserror::Error)]
pub enum ContributionError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("admin privileges required")]
    Forbidden,
    #[error("contribution {0} not found")]
    NotFound(ContributionId),
    #[error("modification '{0}' does not exist")]
    UnknownModification(String),
    #[error("contribution {id} was already reviewed ({status})")]
    AlreadyReviewed {
        id: ContributionId,
        status: ContributionStatus,
    },
    #[error("rejection reason exceeds {max} characters")]
    ReasonTooLong { max: usize },
    #[error("notes exceed {max} characters")]
    NotesTooLong { max: usize },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
