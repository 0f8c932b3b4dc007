use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{ContributionId, ContributionSubmission, Identity, ReviewRequest};
use super::policy::AdminPolicy;
use super::repository::{ContributionRepository, RepositoryError};
use super::service::{ContributionError, ContributionReviewService};

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Router builder exposing submission and admin review endpoints.
pub fn contribution_router<R, P>(service: Arc<ContributionReviewService<R, P>>) -> Router
where
    R: ContributionRepository + 'static,
    P: AdminPolicy + 'static,
{
    Router::new()
        .route(
            "/api/v1/legality/contributions",
            post(submit_handler::<R, P>),
        )
        .route(
            "/api/v1/admin/legality/contributions",
            get(pending_handler::<R, P>),
        )
        .route(
            "/api/v1/admin/legality/contributions/:contribution_id/review",
            post(review_handler::<R, P>),
        )
        .with_state(service)
}

/// Identity forwarded by the session layer in front of this service.
pub fn identity_from_headers(headers: &HeaderMap) -> Option<Identity> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    header(USER_ID_HEADER).map(|user_id| Identity {
        user_id,
        email: header(USER_EMAIL_HEADER),
    })
}

pub(crate) async fn submit_handler<R, P>(
    State(service): State<Arc<ContributionReviewService<R, P>>>,
    headers: HeaderMap,
    axum::Json(submission): axum::Json<ContributionSubmission>,
) -> Response
where
    R: ContributionRepository + 'static,
    P: AdminPolicy + 'static,
{
    let identity = identity_from_headers(&headers);
    match service.submit(identity.as_ref(), submission) {
        Ok(contribution) => (StatusCode::ACCEPTED, axum::Json(contribution)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn pending_handler<R, P>(
    State(service): State<Arc<ContributionReviewService<R, P>>>,
    headers: HeaderMap,
) -> Response
where
    R: ContributionRepository + 'static,
    P: AdminPolicy + 'static,
{
    let identity = identity_from_headers(&headers);
    match service.pending(identity.as_ref()) {
        Ok(listings) => {
            let payload = json!({
                "count": listings.len(),
                "contributions": listings,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn review_handler<R, P>(
    State(service): State<Arc<ContributionReviewService<R, P>>>,
    headers: HeaderMap,
    Path(contribution_id): Path<String>,
    axum::Json(request): axum::Json<ReviewRequest>,
) -> Response
where
    R: ContributionRepository + 'static,
    P: AdminPolicy + 'static,
{
    let identity = identity_from_headers(&headers);
    let id = ContributionId(contribution_id);
    match service.review(identity.as_ref(), &id, request) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ContributionError) -> Response {
    let status = match &error {
        ContributionError::Unauthenticated => StatusCode::UNAUTHORIZED,
        ContributionError::Forbidden => StatusCode::FORBIDDEN,
        ContributionError::NotFound(_)
        | ContributionError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ContributionError::UnknownModification(_)
        | ContributionError::ReasonTooLong { .. }
        | ContributionError::NotesTooLong { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ContributionError::AlreadyReviewed { .. }
        | ContributionError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ContributionError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
