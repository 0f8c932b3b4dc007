use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Closed set of wire labels with a single tolerant parser.
///
/// External payloads carry these values as free-form strings; parsing trims and ignores case so
/// `" abe "` and `"ABE"` resolve to the same variant. Unknown labels yield `None`.
pub trait WireLabel: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|variant| variant.label().eq_ignore_ascii_case(trimmed))
    }
}

/// Deserializes an optional label, mapping unknown strings to `None` instead of failing.
pub fn deserialize_lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: WireLabel,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(T::parse))
}

/// Part categories used by modifications and regional rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartCategory {
    Suspension,
    Exhaust,
    Wheels,
    Brakes,
    Aero,
    Lighting,
    Ecu,
    Interior,
    Engine,
    Other,
}

impl WireLabel for PartCategory {
    const ALL: &'static [Self] = &[
        PartCategory::Suspension,
        PartCategory::Exhaust,
        PartCategory::Wheels,
        PartCategory::Brakes,
        PartCategory::Aero,
        PartCategory::Lighting,
        PartCategory::Ecu,
        PartCategory::Interior,
        PartCategory::Engine,
        PartCategory::Other,
    ];

    fn label(self) -> &'static str {
        match self {
            PartCategory::Suspension => "SUSPENSION",
            PartCategory::Exhaust => "EXHAUST",
            PartCategory::Wheels => "WHEELS",
            PartCategory::Brakes => "BRAKES",
            PartCategory::Aero => "AERO",
            PartCategory::Lighting => "LIGHTING",
            PartCategory::Ecu => "ECU",
            PartCategory::Interior => "INTERIOR",
            PartCategory::Engine => "ENGINE",
            PartCategory::Other => "OTHER",
        }
    }
}

/// Traffic-light classification recorded by the owner for each modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TuvStatus {
    GreenRegistered,
    YellowAbe,
    RedRacing,
}

impl WireLabel for TuvStatus {
    const ALL: &'static [Self] = &[
        TuvStatus::GreenRegistered,
        TuvStatus::YellowAbe,
        TuvStatus::RedRacing,
    ];

    fn label(self) -> &'static str {
        match self {
            TuvStatus::GreenRegistered => "GREEN_REGISTERED",
            TuvStatus::YellowAbe => "YELLOW_ABE",
            TuvStatus::RedRacing => "RED_RACING",
        }
    }
}

/// Derived road-legality status of a single modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegalityStatus {
    Unknown,
    FullyLegal,
    LegalWithRestrictions,
    RegistrationRequired,
    InspectionRequired,
    Illegal,
}

impl WireLabel for LegalityStatus {
    const ALL: &'static [Self] = &[
        LegalityStatus::Unknown,
        LegalityStatus::FullyLegal,
        LegalityStatus::LegalWithRestrictions,
        LegalityStatus::RegistrationRequired,
        LegalityStatus::InspectionRequired,
        LegalityStatus::Illegal,
    ];

    fn label(self) -> &'static str {
        match self {
            LegalityStatus::Unknown => "UNKNOWN",
            LegalityStatus::FullyLegal => "FULLY_LEGAL",
            LegalityStatus::LegalWithRestrictions => "LEGAL_WITH_RESTRICTIONS",
            LegalityStatus::RegistrationRequired => "REGISTRATION_REQUIRED",
            LegalityStatus::InspectionRequired => "INSPECTION_REQUIRED",
            LegalityStatus::Illegal => "ILLEGAL",
        }
    }
}

/// German type-approval and registration evidence kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalType {
    Abe,
    Abg,
    Ebe,
    Teilegutachten,
    Einzelabnahme,
    Eintragung,
}

impl WireLabel for ApprovalType {
    const ALL: &'static [Self] = &[
        ApprovalType::Abe,
        ApprovalType::Abg,
        ApprovalType::Ebe,
        ApprovalType::Teilegutachten,
        ApprovalType::Einzelabnahme,
        ApprovalType::Eintragung,
    ];

    fn label(self) -> &'static str {
        match self {
            ApprovalType::Abe => "ABE",
            ApprovalType::Abg => "ABG",
            ApprovalType::Ebe => "EBE",
            ApprovalType::Teilegutachten => "TEILEGUTACHTEN",
            ApprovalType::Einzelabnahme => "EINZELABNAHME",
            ApprovalType::Eintragung => "EINTRAGUNG",
        }
    }
}

impl ApprovalType {
    /// Type approvals that make a part road legal without an inspection visit.
    pub const fn is_type_approval(self) -> bool {
        matches!(self, ApprovalType::Abe | ApprovalType::Abg | ApprovalType::Ebe)
    }
}

/// Severity attached to a regional rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Info,
    Warning,
    Critical,
}

impl WireLabel for RuleSeverity {
    const ALL: &'static [Self] = &[
        RuleSeverity::Info,
        RuleSeverity::Warning,
        RuleSeverity::Critical,
    ];

    fn label(self) -> &'static str {
        match self {
            RuleSeverity::Info => "info",
            RuleSeverity::Warning => "warning",
            RuleSeverity::Critical => "critical",
        }
    }
}

/// Generic document attached to a modification (photos, receipts, approvals).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModificationDocument {
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl ModificationDocument {
    pub fn approval_type(&self) -> Option<ApprovalType> {
        ApprovalType::parse(&self.doc_type)
    }
}

/// Dedicated approval evidence record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalDocument {
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub approval_type: Option<ApprovalType>,
    #[serde(default)]
    pub approval_number: Option<String>,
    #[serde(default)]
    pub document_url: Option<String>,
    #[serde(default)]
    pub issued_at: Option<DateTime<Utc>>,
}

/// Part installed on a car, as handed over by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modification {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub part_name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub category: Option<PartCategory>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub tuv_status: Option<TuvStatus>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub legality_status: Option<LegalityStatus>,
    #[serde(default)]
    pub approval_number: Option<String>,
    #[serde(default)]
    pub installed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub installed_mileage: Option<u32>,
    #[serde(default)]
    pub documents: Vec<ModificationDocument>,
    #[serde(default)]
    pub approval_documents: Vec<ApprovalDocument>,
}

impl Modification {
    /// Every approval type recognized across documents and approval documents.
    pub fn approval_types(&self) -> impl Iterator<Item = ApprovalType> + '_ {
        self.approval_documents
            .iter()
            .filter_map(|document| document.approval_type)
            .chain(
                self.documents
                    .iter()
                    .filter_map(ModificationDocument::approval_type),
            )
    }

    pub fn has_approval_evidence(&self) -> bool {
        self.approval_types().next().is_some()
    }

    pub fn has_approval(&self, approval: ApprovalType) -> bool {
        self.approval_types().any(|found| found == approval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_ignores_case() {
        assert_eq!(ApprovalType::parse(" teilegutachten "), Some(ApprovalType::Teilegutachten));
        assert_eq!(TuvStatus::parse("yellow_abe"), Some(TuvStatus::YellowAbe));
        assert_eq!(RuleSeverity::parse("CRITICAL"), Some(RuleSeverity::Critical));
        assert_eq!(PartCategory::parse("ecu"), Some(PartCategory::Ecu));
        assert_eq!(ApprovalType::parse("TÜV"), None);
        assert_eq!(LegalityStatus::parse(""), None);
    }

    fn assert_labels_round_trip<T: WireLabel + PartialEq + std::fmt::Debug>() {
        let all: &'static [T] = T::ALL;
        for variant in all {
            assert_eq!(T::parse(variant.label()), Some(*variant));
            assert_eq!(T::parse(&variant.label().to_ascii_lowercase()), Some(*variant));
        }
    }

    #[test]
    fn every_label_parses_back_to_its_variant() {
        assert_labels_round_trip::<PartCategory>();
        assert_labels_round_trip::<TuvStatus>();
        assert_labels_round_trip::<LegalityStatus>();
        assert_labels_round_trip::<ApprovalType>();
        assert_labels_round_trip::<RuleSeverity>();
    }

    #[test]
    fn labels_match_serde_representation() {
        for status in LegalityStatus::ALL {
            let json = serde_json::to_value(status).expect("serializes");
            assert_eq!(json, serde_json::Value::String(status.label().to_string()));
        }
        for severity in RuleSeverity::ALL {
            let json = serde_json::to_value(severity).expect("serializes");
            assert_eq!(json, serde_json::Value::String(severity.label().to_string()));
        }
    }

    #[test]
    fn modification_tolerates_unknown_labels() {
        let modification: Modification = serde_json::from_value(serde_json::json!({
            "id": "mod-1",
            "partName": "Coilover kit",
            "category": "suspension",
            "tuvStatus": "PURPLE",
            "approvalDocuments": [{ "approvalType": "abe" }, { "approvalType": "sticker" }],
            "documents": [{ "type": "photo" }]
        }))
        .expect("payload deserializes");

        assert_eq!(modification.category, Some(PartCategory::Suspension));
        assert_eq!(modification.tuv_status, None);
        assert_eq!(modification.approval_documents[1].approval_type, None);
        assert!(modification.has_approval(ApprovalType::Abe));
    }

    #[test]
    fn approval_evidence_includes_typed_documents() {
        let modification = Modification {
            documents: vec![ModificationDocument {
                doc_type: "Eintragung".to_string(),
                url: None,
                uploaded_at: None,
            }],
            ..Modification::default()
        };
        assert!(modification.has_approval_evidence());
        assert!(modification.has_approval(ApprovalType::Eintragung));
    }
}
