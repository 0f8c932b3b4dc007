//! Evidence scoring.
//!
//! Two independent schemes live here: the weighted 0–100 [`evidence_score`] with tiers, and the
//! additive 0–10 [`legacy_evidence_score`] used by older listing and history views.

use serde::{Deserialize, Serialize};

use super::domain::Modification;

const PHOTO_POINTS: u8 = 30;
const MILEAGE_POINTS: u8 = 25;
const TRUSTED_APPROVAL_POINTS: u8 = 35;
const APPROVAL_SIGNAL_POINTS: u8 = 18;
const TIMESTAMP_POINTS: u8 = 10;

const GOLD_THRESHOLD: u8 = 85;
const SILVER_THRESHOLD: u8 = 70;
const BRONZE_THRESHOLD: u8 = 50;

const LEGACY_MAX: u8 = 10;

/// Boolean inputs of the weighted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceSignals {
    #[serde(default)]
    pub has_photos: bool,
    #[serde(default)]
    pub has_mileage_proof: bool,
    #[serde(default)]
    pub has_trusted_approval_doc: bool,
    #[serde(default)]
    pub has_any_approval_signal: bool,
    #[serde(default)]
    pub has_timestamp: bool,
}

impl EvidenceSignals {
    /// Derives the signals from the evidence stored against a modification.
    pub fn from_modification(modification: &Modification) -> Self {
        let has_photos = modification
            .documents
            .iter()
            .any(|document| matches_any(&document.doc_type, &["PHOTO", "IMAGE"]));

        let has_mileage_proof = modification.installed_mileage.is_some()
            || modification
                .documents
                .iter()
                .any(|document| matches_any(&document.doc_type, &["MILEAGE", "ODOMETER"]));

        let has_trusted_approval_doc = modification.approval_documents.iter().any(|document| {
            document.approval_type.is_some()
                && document
                    .document_url
                    .as_deref()
                    .is_some_and(|url| !url.trim().is_empty())
        });

        let has_approval_number = modification
            .approval_number
            .as_deref()
            .is_some_and(|number| !number.trim().is_empty())
            || modification.approval_documents.iter().any(|document| {
                document
                    .approval_number
                    .as_deref()
                    .is_some_and(|number| !number.trim().is_empty())
            });

        // tuv_status alone never counts as approval evidence
        let has_any_approval_signal = has_trusted_approval_doc
            || has_approval_number
            || modification.has_approval_evidence();

        Self {
            has_photos,
            has_mileage_proof,
            has_trusted_approval_doc,
            has_any_approval_signal,
            has_timestamp: modification.installed_at.is_some(),
        }
    }
}

fn matches_any(doc_type: &str, needles: &[&str]) -> bool {
    let upper = doc_type.trim().to_ascii_uppercase();
    needles.iter().any(|needle| upper.contains(needle))
}

/// Confidence tier, inclusive at each lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceTier {
    None,
    Bronze,
    Silver,
    Gold,
}

impl EvidenceTier {
    pub const fn for_score(score: u8) -> Self {
        if score >= GOLD_THRESHOLD {
            EvidenceTier::Gold
        } else if score >= SILVER_THRESHOLD {
            EvidenceTier::Silver
        } else if score >= BRONZE_THRESHOLD {
            EvidenceTier::Bronze
        } else {
            EvidenceTier::None
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            EvidenceTier::Gold => "GOLD",
            EvidenceTier::Silver => "SILVER",
            EvidenceTier::Bronze => "BRONZE",
            EvidenceTier::None => "NONE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceFactorKind {
    Photos,
    MileageProof,
    Approval,
    Timestamp,
}

/// One line of the score breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceFactor {
    pub factor: EvidenceFactorKind,
    pub points: u8,
    pub note: String,
}

/// Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceScore {
    pub score: u8,
    pub tier: EvidenceTier,
    pub breakdown: Vec<EvidenceFactor>,
}

/// Weighted 0–100 evidence score.
pub fn evidence_score(signals: &EvidenceSignals) -> EvidenceScore {
    let photos = if signals.has_photos { PHOTO_POINTS } else { 0 };
    let mileage = if signals.has_mileage_proof {
        MILEAGE_POINTS
    } else {
        0
    };
    let (approval, approval_note) = if signals.has_trusted_approval_doc {
        (TRUSTED_APPROVAL_POINTS, "trusted approval document on file")
    } else if signals.has_any_approval_signal {
        (APPROVAL_SIGNAL_POINTS, "approval referenced without a verified document")
    } else {
        (0, "no approval evidence")
    };
    let timestamp = if signals.has_timestamp {
        TIMESTAMP_POINTS
    } else {
        0
    };

    let total = f64::from(photos) + f64::from(mileage) + f64::from(approval) + f64::from(timestamp);
    let score = total.clamp(0.0, 100.0).round() as u8;

    let breakdown = vec![
        EvidenceFactor {
            factor: EvidenceFactorKind::Photos,
            points: photos,
            note: if signals.has_photos {
                "installation photos attached".to_string()
            } else {
                "no photos".to_string()
            },
        },
        EvidenceFactor {
            factor: EvidenceFactorKind::MileageProof,
            points: mileage,
            note: if signals.has_mileage_proof {
                "mileage at installation documented".to_string()
            } else {
                "no mileage proof".to_string()
            },
        },
        EvidenceFactor {
            factor: EvidenceFactorKind::Approval,
            points: approval,
            note: approval_note.to_string(),
        },
        EvidenceFactor {
            factor: EvidenceFactorKind::Timestamp,
            points: timestamp,
            note: if signals.has_timestamp {
                "installation date recorded".to_string()
            } else {
                "no installation date".to_string()
            },
        },
    ];

    EvidenceScore {
        score,
        tier: EvidenceTier::for_score(score),
        breakdown,
    }
}

/// Inputs of the additive 0–10 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyEvidenceInput {
    #[serde(default)]
    pub has_installed_photo: bool,
    #[serde(default)]
    pub has_installed_mileage: bool,
    #[serde(default)]
    pub has_removed_mileage: bool,
    #[serde(default)]
    pub has_price: bool,
    #[serde(default)]
    pub document_count: u32,
    #[serde(default)]
    pub has_tuv_status: bool,
}

/// Additive 0–10 evidence score. The document bonus stops at two documents.
pub fn legacy_evidence_score(input: &LegacyEvidenceInput) -> u8 {
    let mut score: u8 = 0;

    if input.has_installed_photo {
        score += 2;
    }
    if input.has_installed_mileage {
        score += 2;
    }
    if input.has_removed_mileage {
        score += 1;
    }
    if input.has_price {
        score += 1;
    }
    if input.has_tuv_status {
        score += 2;
    }
    if input.document_count >= 1 {
        score += 1;
    }
    if input.document_count >= 2 {
        score += 1;
    }

    score.min(LEGACY_MAX)
}
