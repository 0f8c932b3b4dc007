use serde::{Deserialize, Serialize};

use super::domain::{Modification, TuvStatus};

pub const ACTION_DOCUMENT_FIRST_MODIFICATION: &str =
    "Document at least one modification to assess TÜV readiness";
pub const ACTION_UPLOAD_APPROVALS: &str =
    "Upload ABE, ABG, EBE or Teilegutachten documents for parts marked YELLOW_ABE";
pub const ACTION_REMOVE_RACING_PARTS: &str =
    "Remove or homologate RED_RACING parts before the inspection appointment";
pub const ACTION_ALL_DOCUMENTED: &str = "All documented modifications have evidence";

const NOT_READY_BASE: i32 = 60;
const NOT_READY_PENALTY: i32 = 20;
const NEEDS_DOCS_BASE: i32 = 80;
const NEEDS_DOCS_PENALTY: i32 = 15;
const READY_SCORE: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadinessStatus {
    Ready,
    NeedsDocs,
    NotReady,
    Unknown,
}

impl ReadinessStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ReadinessStatus::Ready => "READY",
            ReadinessStatus::NeedsDocs => "NEEDS_DOCS",
            ReadinessStatus::NotReady => "NOT_READY",
            ReadinessStatus::Unknown => "UNKNOWN",
        }
    }
}

/// Modifications per traffic-light bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TuvStatusCounts {
    pub green: usize,
    pub yellow: usize,
    pub red: usize,
    pub unclassified: usize,
}

/// Car-level readiness aggregate, derived on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuvReadiness {
    pub status: ReadinessStatus,
    pub score: u8,
    pub counts: TuvStatusCounts,
    pub missing_approvals: usize,
    pub actions: Vec<String>,
}

/// Aggregates every modification of a car into a readiness classification.
pub fn tuv_readiness(modifications: &[Modification]) -> TuvReadiness {
    if modifications.is_empty() {
        return TuvReadiness {
            status: ReadinessStatus::Unknown,
            score: 0,
            counts: TuvStatusCounts::default(),
            missing_approvals: 0,
            actions: vec![ACTION_DOCUMENT_FIRST_MODIFICATION.to_string()],
        };
    }

    let mut counts = TuvStatusCounts::default();
    let mut missing_approvals = 0usize;
    let mut actions: Vec<String> = Vec::new();
    let mut push_action = |action: &str| {
        if !actions.iter().any(|existing| existing == action) {
            actions.push(action.to_string());
        }
    };

    for modification in modifications {
        match modification.tuv_status {
            Some(TuvStatus::GreenRegistered) => counts.green += 1,
            Some(TuvStatus::YellowAbe) => {
                counts.yellow += 1;
                if !modification.has_approval_evidence() {
                    missing_approvals += 1;
                    push_action(ACTION_UPLOAD_APPROVALS);
                }
            }
            // evidence never clears a racing part
            Some(TuvStatus::RedRacing) => {
                counts.red += 1;
                push_action(ACTION_REMOVE_RACING_PARTS);
            }
            None => counts.unclassified += 1,
        }
    }

    let (status, score) = if counts.red > 0 {
        let red = i32::try_from(counts.red).unwrap_or(i32::MAX);
        (
            ReadinessStatus::NotReady,
            penalized(NOT_READY_BASE, NOT_READY_PENALTY, red),
        )
    } else if missing_approvals > 0 {
        let missing = i32::try_from(missing_approvals).unwrap_or(i32::MAX);
        (
            ReadinessStatus::NeedsDocs,
            penalized(NEEDS_DOCS_BASE, NEEDS_DOCS_PENALTY, missing),
        )
    } else {
        (ReadinessStatus::Ready, READY_SCORE)
    };

    if actions.is_empty() && status == ReadinessStatus::Ready {
        actions.push(ACTION_ALL_DOCUMENTED.to_string());
    }

    TuvReadiness {
        status,
        score,
        counts,
        missing_approvals,
        actions,
    }
}

fn penalized(base: i32, penalty: i32, count: i32) -> u8 {
    base.saturating_sub(penalty.saturating_mul(count)).max(0) as u8
}
