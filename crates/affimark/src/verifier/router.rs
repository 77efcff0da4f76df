use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::normalizer::normalize_url;
use super::playbook::PlaybookGenerator;
use super::repository::{AnalysisId, AnalysisRepository, AnalysisSummaryView, RepositoryError};
use super::service::{AnalysisRequest, VerifierService, VerifierServiceError};

const DEFAULT_RECENT_LIMIT: usize = 20;
const MAX_RECENT_LIMIT: usize = 100;

/// Router builder exposing the verifier pipeline over HTTP.
pub fn verifier_router<R, G>(service: Arc<VerifierService<R, G>>) -> Router
where
    R: AnalysisRepository + 'static,
    G: PlaybookGenerator + 'static,
{
    Router::new()
        .route("/api/v1/verifier/normalize", post(normalize_handler))
        .route(
            "/api/v1/verifier/analyses",
            post(analyze_handler::<R, G>).get(recent_handler::<R, G>),
        )
        .route(
            "/api/v1/verifier/analyses/:analysis_id",
            get(analysis_handler::<R, G>),
        )
        .route(
            "/api/v1/verifier/analyses/:analysis_id/alternatives.csv",
            get(export_handler::<R, G>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct NormalizeRequest {
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecentQuery {
    pub limit: Option<usize>,
}

fn error_response(error: VerifierServiceError, analysis_id: Option<&AnalysisId>) -> Response {
    match error {
        VerifierServiceError::InvalidRequest(message) => {
            let payload = json!({ "error": message });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        VerifierServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({
                "error": "analysis not found",
                "analysis_id": analysis_id.map(|id| id.0.clone()),
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        VerifierServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "analysis already exists" });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            tracing::error!(error = %other, "verifier request failed");
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn normalize_handler(
    axum::Json(request): axum::Json<NormalizeRequest>,
) -> Response {
    (StatusCode::OK, axum::Json(normalize_url(&request.url))).into_response()
}

pub(crate) async fn analyze_handler<R, G>(
    State(service): State<Arc<VerifierService<R, G>>>,
    axum::Json(request): axum::Json<AnalysisRequest>,
) -> Response
where
    R: AnalysisRepository + 'static,
    G: PlaybookGenerator + 'static,
{
    match service.analyze(request) {
        Ok(analysis) => (StatusCode::CREATED, axum::Json(analysis)).into_response(),
        Err(error) => error_response(error, None),
    }
}

pub(crate) async fn recent_handler<R, G>(
    State(service): State<Arc<VerifierService<R, G>>>,
    Query(query): Query<RecentQuery>,
) -> Response
where
    R: AnalysisRepository + 'static,
    G: PlaybookGenerator + 'static,
{
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, MAX_RECENT_LIMIT);
    match service.recent(limit) {
        Ok(analyses) => {
            let views: Vec<AnalysisSummaryView> =
                analyses.iter().map(|analysis| analysis.summary_view()).collect();
            (StatusCode::OK, axum::Json(views)).into_response()
        }
        Err(error) => error_response(error, None),
    }
}

pub(crate) async fn analysis_handler<R, G>(
    State(service): State<Arc<VerifierService<R, G>>>,
    Path(analysis_id): Path<String>,
) -> Response
where
    R: AnalysisRepository + 'static,
    G: PlaybookGenerator + 'static,
{
    let id = AnalysisId(analysis_id);
    match service.get(&id) {
        Ok(analysis) => (StatusCode::OK, axum::Json(analysis)).into_response(),
        Err(error) => error_response(error, Some(&id)),
    }
}

pub(crate) async fn export_handler<R, G>(
    State(service): State<Arc<VerifierService<R, G>>>,
    Path(analysis_id): Path<String>,
) -> Response
where
    R: AnalysisRepository + 'static,
    G: PlaybookGenerator + 'static,
{
    let id = AnalysisId(analysis_id);
    match service.export_alternatives(&id) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(error) => error_response(error, Some(&id)),
    }
}
