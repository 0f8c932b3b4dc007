use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::dataset::{ReferenceCatalog, RegionalRule};
use super::domain::RuleSeverity;

/// Rules for a state, optionally narrowed to one category, skipping expired entries.
///
/// A missing or blank state never matches anything. `validFrom` is not checked; `validUntil`
/// only excludes a rule when it parses and lies strictly before `now`.
pub fn regional_rules<'a>(
    catalog: &'a ReferenceCatalog,
    state_id: Option<&str>,
    category: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<&'a RegionalRule> {
    let Some(state_id) = state_id.map(str::trim).filter(|state| !state.is_empty()) else {
        return Vec::new();
    };
    let category = category.map(str::trim).filter(|value| !value.is_empty());

    catalog
        .regional_rules()
        .iter()
        .filter(|rule| rule.state_id.trim().eq_ignore_ascii_case(state_id))
        .filter(|rule| match category {
            Some(category) => rule
                .affected_categories
                .iter()
                .any(|affected| affected.trim().eq_ignore_ascii_case(category)),
            None => true,
        })
        .filter(|rule| !is_expired(rule, now))
        .collect()
}

fn is_expired(rule: &RegionalRule, now: DateTime<Utc>) -> bool {
    rule.valid_until
        .as_deref()
        .and_then(parse_validity)
        .map(|until| until < now)
        .unwrap_or(false)
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates (read as midnight UTC).
pub fn parse_validity(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
}

/// Aggregated view returned to HTTP callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalRuleReport {
    pub state_id: Option<String>,
    pub count: usize,
    pub critical_count: usize,
    pub warnings: Vec<String>,
    pub rules: Vec<RegionalRule>,
}

/// Collects rules across several categories, deduplicated by rule id in first-seen order.
///
/// With no categories the report covers every rule of the state.
pub fn regional_rule_report(
    catalog: &ReferenceCatalog,
    state_id: Option<&str>,
    categories: &[String],
    now: DateTime<Utc>,
) -> RegionalRuleReport {
    let state_id = state_id
        .map(str::trim)
        .filter(|state| !state.is_empty())
        .map(str::to_string);

    let mut seen = HashSet::new();
    let mut rules = Vec::new();

    let mut collect = |matched: Vec<&RegionalRule>| {
        for rule in matched {
            if seen.insert(rule.id.clone()) {
                rules.push(rule.clone());
            }
        }
    };

    if categories.is_empty() {
        collect(regional_rules(catalog, state_id.as_deref(), None, now));
    } else {
        for category in categories {
            collect(regional_rules(
                catalog,
                state_id.as_deref(),
                Some(category),
                now,
            ));
        }
    }

    let critical_count = rules
        .iter()
        .filter(|rule| rule.severity == RuleSeverity::Critical)
        .count();
    let warnings = rules
        .iter()
        .filter(|rule| rule.severity >= RuleSeverity::Warning)
        .map(|rule| format!("[{}] {}: {}", rule.state_id, rule.name_de, rule.description_de))
        .collect();

    RegionalRuleReport {
        state_id,
        count: rules.len(),
        critical_count,
        warnings,
        rules,
    }
}
