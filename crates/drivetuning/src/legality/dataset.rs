//! Bundled regulatory reference data.
//!
//! The catalog is parsed once during startup and shared read-only afterwards. Field names in the
//! JSON documents are part of the external contract and must stay camelCase.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::domain::RuleSeverity;

const BUNDLED_REFERENCES: &str = include_str!("../../data/legal_references.json");
const BUNDLED_REGIONAL_RULES: &str = include_str!("../../data/regional_rules.json");

/// Statute or regulation that references point to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Law {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub short_title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Citation entry as stored in the reference index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalReference {
    pub law_id: String,
    pub section: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Shape of `legal_references.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalReferenceDataset {
    #[serde(default)]
    pub laws: Vec<Law>,
    #[serde(default)]
    pub references: BTreeMap<String, Vec<LegalReference>>,
}

/// State-specific enforcement rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalRule {
    pub id: String,
    pub state_id: String,
    pub name_de: String,
    pub description_de: String,
    #[serde(default)]
    pub affected_categories: Vec<String>,
    pub severity: RuleSeverity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed {dataset} dataset: {source}")]
    Parse {
        dataset: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Immutable index over laws, citations and regional rules.
#[derive(Debug, Clone)]
pub struct ReferenceCatalog {
    laws: HashMap<String, Law>,
    references: HashMap<String, Vec<LegalReference>>,
    regional_rules: Vec<RegionalRule>,
}

impl ReferenceCatalog {
    /// Catalog built from the datasets compiled into the crate.
    pub fn bundled() -> Result<Self, DatasetError> {
        Self::from_json(BUNDLED_REFERENCES, BUNDLED_REGIONAL_RULES)
    }

    /// Reads override files where given and falls back to the bundled documents otherwise.
    pub fn from_paths(
        references: Option<&Path>,
        regional_rules: Option<&Path>,
    ) -> Result<Self, DatasetError> {
        let references = match references {
            Some(path) => read_dataset(path)?,
            None => BUNDLED_REFERENCES.to_string(),
        };
        let regional_rules = match regional_rules {
            Some(path) => read_dataset(path)?,
            None => BUNDLED_REGIONAL_RULES.to_string(),
        };
        Self::from_json(&references, &regional_rules)
    }

    pub fn from_json(references: &str, regional_rules: &str) -> Result<Self, DatasetError> {
        let dataset: LegalReferenceDataset =
            serde_json::from_str(references).map_err(|source| DatasetError::Parse {
                dataset: "legal reference",
                source,
            })?;
        let rules: Vec<RegionalRule> =
            serde_json::from_str(regional_rules).map_err(|source| DatasetError::Parse {
                dataset: "regional rule",
                source,
            })?;
        Ok(Self::from_parts(dataset, rules))
    }

    pub fn from_parts(dataset: LegalReferenceDataset, regional_rules: Vec<RegionalRule>) -> Self {
        let laws = dataset
            .laws
            .into_iter()
            .map(|law| (law.id.clone(), law))
            .collect();
        let references = dataset.references.into_iter().collect();

        Self {
            laws,
            references,
            regional_rules,
        }
    }

    pub fn law(&self, id: &str) -> Option<&Law> {
        self.laws.get(id)
    }

    pub fn law_count(&self) -> usize {
        self.laws.len()
    }

    /// Raw citations stored under an identifier, without normalization.
    pub fn references_for(&self, identifier: &str) -> &[LegalReference] {
        self.references
            .get(identifier)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn regional_rules(&self) -> &[RegionalRule] {
        &self.regional_rules
    }
}

fn read_dataset(path: &Path) -> Result<String, DatasetError> {
    fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })
}
