use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::AppState;

mod auth;
mod dashboard;
mod public;
mod session;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let auth_router = auth::router().with_state(state.clone());
    let dashboard_router = dashboard::router(state.max_upload_bytes).with_state(state.clone());
    Router::new()
        .route("/health", get(health_live))
        .route("/health/ready", get(health_ready))
        .route("/{username}", get(public::get_public_profile))
        .nest("/auth", auth_router)
        .merge(dashboard_router)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_live(State(state): State<AppState>) -> Result<Json<HealthResponse>, HttpError> {
    let uptime = state.start_time.elapsed().as_secs();
    let response = HealthResponse {
        status: "live",
        uptime_seconds: uptime,
    };
    Ok(Json(response))
}

async fn health_ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, HttpError> {
    state
        .store
        .ping()
        .await
        .map_err(|err| {
            HttpError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                err.user_message("Store unavailable"),
            )
        })?;

    let response = ReadyResponse {
        status: "ready",
        dashboard_sessions: state.dashboards.entry_count(),
        max_upload_bytes: state.max_upload_bytes,
    };
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
struct ReadyResponse {
    status: &'static str,
    dashboard_sessions: u64,
    max_upload_bytes: usize,
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: String) -> Self {
        assert!(status != StatusCode::OK, "Error status cannot be 200");
        assert!(!message.is_empty(), "Error message cannot be empty");
        Self { status, message }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        info!("HTTP error: {}", self.message);
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}
