use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::assessment::assess_modification;
use super::dataset::ReferenceCatalog;
use super::domain::Modification;
use super::evidence::{evidence_score, legacy_evidence_score, EvidenceSignals, LegacyEvidenceInput};
use super::readiness::tuv_readiness;
use super::references::legal_references;
use super::regional::regional_rule_report;

/// Read-only legality endpoints backed by the shared reference catalog.
pub fn legality_router(catalog: Arc<ReferenceCatalog>) -> Router {
    Router::new()
        .route("/api/v1/legality/regional-rules", get(regional_rules_handler))
        .route("/api/v1/legality/references/:rule_id", get(references_handler))
        .route("/api/v1/legality/evidence-score", post(evidence_score_handler))
        .route(
            "/api/v1/legality/evidence-score/legacy",
            post(legacy_evidence_score_handler),
        )
        .route("/api/v1/legality/tuv-readiness", post(tuv_readiness_handler))
        .route("/api/v1/legality/assessment", post(assessment_handler))
        .with_state(catalog)
}

/// `stateId` plus categories given as repeated `category` keys, comma separated, or both.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct RegionalRuleQuery {
    pub state_id: Option<String>,
    pub categories: Vec<String>,
}

impl RegionalRuleQuery {
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "stateId" => query.state_id = Some(value),
                "category" => query.categories.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|category| !category.is_empty())
                        .map(str::to_string),
                ),
                _ => {}
            }
        }
        query
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReadinessRequest {
    #[serde(default)]
    pub modifications: Vec<Modification>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssessmentRequest {
    pub modification: Modification,
    #[serde(default)]
    pub state_id: Option<String>,
}

pub(crate) async fn regional_rules_handler(
    State(catalog): State<Arc<ReferenceCatalog>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let query = RegionalRuleQuery::from_pairs(pairs);
    let report = regional_rule_report(
        &catalog,
        query.state_id.as_deref(),
        &query.categories,
        Utc::now(),
    );
    (StatusCode::OK, Json(report)).into_response()
}

pub(crate) async fn references_handler(
    State(catalog): State<Arc<ReferenceCatalog>>,
    Path(rule_id): Path<String>,
) -> Response {
    let references = legal_references(&catalog, &rule_id);
    let payload = json!({
        "ruleId": rule_id,
        "references": references,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn evidence_score_handler(Json(signals): Json<EvidenceSignals>) -> Response {
    (StatusCode::OK, Json(evidence_score(&signals))).into_response()
}

pub(crate) async fn legacy_evidence_score_handler(
    Json(input): Json<LegacyEvidenceInput>,
) -> Response {
    let payload = json!({ "score": legacy_evidence_score(&input) });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn tuv_readiness_handler(Json(request): Json<ReadinessRequest>) -> Response {
    (StatusCode::OK, Json(tuv_readiness(&request.modifications))).into_response()
}

pub(crate) async fn assessment_handler(
    State(catalog): State<Arc<ReferenceCatalog>>,
    Json(request): Json<AssessmentRequest>,
) -> Response {
    let assessment = assess_modification(
        &catalog,
        &request.modification,
        request.state_id.as_deref(),
        Utc::now(),
    );
    (StatusCode::OK, Json(assessment)).into_response()
}
