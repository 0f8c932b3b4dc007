use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use super::dataset::{ReferenceCatalog, RegionalRule};
use super::domain::{ApprovalType, LegalityStatus, Modification, RuleSeverity, TuvStatus, WireLabel};
use super::evidence::{evidence_score, EvidenceScore, EvidenceSignals};
use super::references::{legal_references, ResolvedReference};
use super::regional::regional_rules;

/// Legality picture of one modification, ready to be persisted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalityAssessment {
    pub modification_id: String,
    pub status: LegalityStatus,
    pub evidence: EvidenceScore,
    pub regional_rules: Vec<RegionalRule>,
    pub references: Vec<ResolvedReference>,
    pub actions: Vec<String>,
}

/// Derives status, evidence score and remediation actions for a modification.
pub fn assess_modification(
    catalog: &ReferenceCatalog,
    modification: &Modification,
    state_id: Option<&str>,
    now: DateTime<Utc>,
) -> LegalityAssessment {
    let signals = EvidenceSignals::from_modification(modification);
    let evidence = evidence_score(&signals);

    // category-less parts are not matched against regional rules
    let rules: Vec<RegionalRule> = match modification.category {
        Some(category) => regional_rules(catalog, state_id, Some(category.label()), now)
            .into_iter()
            .cloned()
            .collect(),
        None => Vec::new(),
    };
    let has_critical_rule = rules
        .iter()
        .any(|rule| rule.severity == RuleSeverity::Critical);

    let (base_status, citation_key) = base_status(modification);
    let status = if base_status == LegalityStatus::FullyLegal && has_critical_rule {
        LegalityStatus::LegalWithRestrictions
    } else {
        base_status
    };

    let mut actions = Vec::new();
    match status {
        LegalityStatus::Illegal => actions.push(
            "Remove the part or obtain an individual approval (§ 21 StVZO)".to_string(),
        ),
        LegalityStatus::RegistrationRequired => actions.push(
            "Have the change entered into the registration documents (Eintragung)".to_string(),
        ),
        LegalityStatus::InspectionRequired => actions
            .push("Book an individual inspection with TÜV, DEKRA, GTÜ or KÜS".to_string()),
        LegalityStatus::Unknown => actions
            .push("Upload an approval document or enter the approval number".to_string()),
        LegalityStatus::LegalWithRestrictions => actions.push(
            "Carry the approval document in the car; regional enforcement is active".to_string(),
        ),
        LegalityStatus::FullyLegal => {}
    }
    if !signals.has_photos {
        actions.push("Add installation photos".to_string());
    }

    let mut references = legal_references(catalog, citation_key);
    for rule in &rules {
        for reference in legal_references(catalog, &rule.id) {
            if !references.contains(&reference) {
                references.push(reference);
            }
        }
    }

    debug!(
        modification_id = %modification.id,
        status = status.label(),
        score = evidence.score,
        regional_rules = rules.len(),
        "assessed modification legality"
    );

    LegalityAssessment {
        modification_id: modification.id.clone(),
        status,
        evidence,
        regional_rules: rules,
        references,
        actions,
    }
}

fn base_status(modification: &Modification) -> (LegalityStatus, &'static str) {
    if modification.tuv_status == Some(TuvStatus::RedRacing) {
        return (LegalityStatus::Illegal, "racing_parts");
    }
    if modification.tuv_status == Some(TuvStatus::GreenRegistered)
        || modification.has_approval(ApprovalType::Eintragung)
    {
        return (LegalityStatus::FullyLegal, "registration_update");
    }
    if modification
        .approval_types()
        .any(ApprovalType::is_type_approval)
    {
        return (LegalityStatus::FullyLegal, "operating_permit");
    }
    if modification.has_approval(ApprovalType::Teilegutachten) {
        return (LegalityStatus::RegistrationRequired, "registration_update");
    }
    if modification.has_approval(ApprovalType::Einzelabnahme) {
        return (LegalityStatus::InspectionRequired, "registration_update");
    }
    if modification.tuv_status == Some(TuvStatus::YellowAbe) {
        return (LegalityStatus::RegistrationRequired, "operating_permit");
    }
    (LegalityStatus::Unknown, "operating_permit")
}
