use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::config::ParsePolicy;
use crate::engine;
use crate::error::AnalysisError;
use crate::model::DynTrendModel;
use crate::report::MarketReport;
use crate::session::{Session, SessionView};

#[derive(Clone)]
pub struct AppState {
    pub model: DynTrendModel,
    pub policy: Arc<ParsePolicy>,
    pub session: Arc<Session>,
}

impl AppState {
    pub fn new(model: DynTrendModel, policy: ParsePolicy) -> Self {
        Self {
            model,
            policy: Arc::new(policy),
            session: Arc::new(Session::new()),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/analyze", post(analyze))
        .route("/session", get(session_view))
        .route("/session/reset", post(session_reset))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct AnalyzeReq {
    subject: String,
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

/// `AnalysisError` as an HTTP response: status from the taxonomy, user-facing message.
pub struct ApiError(pub AnalysisError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: self.0.kind(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeReq>,
) -> Result<Json<MarketReport>, ApiError> {
    // Dropped unresolved if the client goes away mid-request.
    let pending = state.session.begin_pending();
    let outcome = engine::run_analysis(state.model.as_ref(), &state.policy, &body.subject).await;
    pending.resolve(&outcome);
    outcome.map(Json).map_err(ApiError)
}

async fn session_view(State(state): State<AppState>) -> Json<SessionView> {
    Json(state.session.view())
}

async fn session_reset(State(state): State<AppState>) -> Json<SessionView> {
    state.session.reset();
    Json(state.session.view())
}
