use serde::Serialize;

use super::dataset::ReferenceCatalog;

/// Identifier every `regional_*` rule shares for citation purposes.
pub const REGIONAL_REFERENCE_KEY: &str = "regional";

/// Citation joined with the law it points to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedReference {
    pub law_id: String,
    pub law_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_title: Option<String>,
    pub section: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Maps `regional_*` identifiers onto the shared regional key.
pub fn normalize_rule_id(rule_id: &str) -> &str {
    let trimmed = rule_id.trim();
    if trimmed.starts_with("regional_") {
        REGIONAL_REFERENCE_KEY
    } else {
        trimmed
    }
}

/// Citations for a rule; unknown ids give an empty list and dangling law ids are skipped.
pub fn legal_references(catalog: &ReferenceCatalog, rule_id: &str) -> Vec<ResolvedReference> {
    catalog
        .references_for(normalize_rule_id(rule_id))
        .iter()
        .filter_map(|reference| {
            let law = catalog.law(&reference.law_id)?;
            Some(ResolvedReference {
                law_id: law.id.clone(),
                law_title: law.title.clone(),
                short_title: law.short_title.clone(),
                section: reference.section.clone(),
                notes: reference.notes.clone(),
                url: law.url.clone(),
            })
        })
        .collect()
}
