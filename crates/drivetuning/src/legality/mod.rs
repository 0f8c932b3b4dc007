//! Modification legality: reference data, rule matching, evidence scoring and crowd review.

pub mod assessment;
pub mod contributions;
pub mod dataset;
pub mod domain;
pub mod evidence;
pub mod readiness;
pub mod references;
pub mod regional;
pub mod router;

pub use assessment::{assess_modification, LegalityAssessment};
pub use dataset::{DatasetError, Law, LegalReference, ReferenceCatalog, RegionalRule};
pub use domain::{
    ApprovalDocument, ApprovalType, LegalityStatus, Modification, ModificationDocument,
    PartCategory, RuleSeverity, TuvStatus, WireLabel,
};
pub use evidence::{
    evidence_score, legacy_evidence_score, EvidenceScore, EvidenceSignals, EvidenceTier,
    LegacyEvidenceInput,
};
pub use readiness::{tuv_readiness, ReadinessStatus, TuvReadiness};
pub use references::{legal_references, ResolvedReference};
pub use regional::{regional_rule_report, regional_rules, RegionalRuleReport};
pub use router::legality_router;
