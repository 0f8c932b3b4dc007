use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::legality::domain::{deserialize_lenient, ApprovalType, WireLabel};

/// Identifier wrapper for crowd-submitted contributions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContributionId(pub String);

impl fmt::Display for ContributionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authenticated caller as resolved by the session collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Review lifecycle. PENDING is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContributionStatus {
    Pending,
    Approved,
    Rejected,
}

impl WireLabel for ContributionStatus {
    const ALL: &'static [Self] = &[
        ContributionStatus::Pending,
        ContributionStatus::Approved,
        ContributionStatus::Rejected,
    ];

    fn label(self) -> &'static str {
        match self {
            ContributionStatus::Pending => "PENDING",
            ContributionStatus::Approved => "APPROVED",
            ContributionStatus::Rejected => "REJECTED",
        }
    }
}

impl fmt::Display for ContributionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ContributionStatus {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, ContributionStatus::Pending)
    }
}

/// Evidence claim as submitted by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionSubmission {
    pub modification_id: String,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub approval_type: Option<ApprovalType>,
    #[serde(default)]
    pub approval_number: Option<String>,
    #[serde(default)]
    pub inspection_org: Option<String>,
    #[serde(default)]
    pub inspection_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub documents: Vec<String>,
}

/// Stored contribution including review metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalityContribution {
    pub id: ContributionId,
    pub modification_id: String,
    pub submitted_by: String,
    pub approval_type: Option<ApprovalType>,
    pub approval_number: Option<String>,
    pub inspection_org: Option<String>,
    pub inspection_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub documents: Vec<String>,
    pub status: ContributionStatus,
    pub created_at: DateTime<Utc>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

/// Car the contribution's modification belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleContext {
    pub car_id: String,
    pub car_label: String,
    pub part_name: String,
}

/// Pending contribution joined with who sent it and which car it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionListing {
    pub contribution: LegalityContribution,
    pub submitter: Identity,
    pub vehicle: Option<VehicleContext>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl From<ReviewDecision> for ContributionStatus {
    fn from(value: ReviewDecision) -> Self {
        match value {
            ReviewDecision::Approved => ContributionStatus::Approved,
            ReviewDecision::Rejected => ContributionStatus::Rejected,
        }
    }
}

/// Admin review payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub decision: ReviewDecision,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Response body of a review transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewOutcome {
    pub id: ContributionId,
    pub status: ContributionStatus,
}
