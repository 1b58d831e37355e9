use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use tracing::info;
use uuid::Uuid;

use crate::auth::Identity;
use crate::dashboard::{Dashboard, DashboardError};
use crate::models::dashboard::{AddCustomLinkRequest, AddSocialLinkRequest};
use crate::models::profile::ProfileFields;
use crate::state::AppState;

use super::HttpError;
use super::session::Session;

pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard_home))
        .route(
            "/dashboard/profile",
            get(get_dashboard).put(update_profile),
        )
        .route(
            "/dashboard/profile/avatar",
            post(upload_avatar).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/dashboard/profile/social-links", post(add_social_link))
        .route(
            "/dashboard/profile/social-links/{link_id}",
            delete(delete_social_link),
        )
        .route("/dashboard/profile/custom-links", post(add_custom_link))
        .route(
            "/dashboard/profile/custom-links/{link_id}",
            delete(delete_custom_link),
        )
}

async fn dashboard_home(session: Session) -> Redirect {
    match session.identity {
        Some(_) => Redirect::to("/dashboard/profile"),
        None => Redirect::to("/"),
    }
}

async fn get_dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, HttpError> {
    let (Some(token), Some(identity)) = (session.token.as_deref(), session.identity.as_ref())
    else {
        return Ok(Redirect::to("/").into_response());
    };
    let dashboard = open(&state, token, identity).await?;
    Ok(Json(dashboard.snapshot(&state.site)).into_response())
}

async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    Json(fields): Json<ProfileFields>,
) -> Result<Response, HttpError> {
    let (dashboard, identity) = attach(&state, session).await?;
    let result = dashboard
        .update_profile(state.store.as_ref(), identity.as_ref(), fields)
        .await;
    Ok(respond(&state, &dashboard, result))
}

async fn upload_avatar(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, HttpError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    let (dashboard, identity) = attach(&state, session).await?;
    let result = dashboard
        .upload_avatar(
            state.store.as_ref(),
            state.blobs.as_ref(),
            identity.as_ref(),
            body,
            &content_type,
        )
        .await;
    Ok(respond(&state, &dashboard, result))
}

async fn add_social_link(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddSocialLinkRequest>,
) -> Result<Response, HttpError> {
    let (dashboard, identity) = attach(&state, session).await?;
    let result = dashboard
        .add_social_link(
            state.store.as_ref(),
            identity.as_ref(),
            &request.platform,
            &request.url,
            request.display_name.as_deref(),
        )
        .await;
    Ok(respond(&state, &dashboard, result))
}

async fn add_custom_link(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddCustomLinkRequest>,
) -> Result<Response, HttpError> {
    let (dashboard, identity) = attach(&state, session).await?;
    let result = dashboard
        .add_custom_link(
            state.store.as_ref(),
            identity.as_ref(),
            &request.title,
            &request.url,
        )
        .await;
    Ok(respond(&state, &dashboard, result))
}

async fn delete_social_link(
    Path(link_id): Path<Uuid>,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, HttpError> {
    let (dashboard, identity) = attach(&state, session).await?;
    let result = dashboard
        .delete_social_link(state.store.as_ref(), identity.as_ref(), link_id)
        .await;
    Ok(respond(&state, &dashboard, result))
}

async fn delete_custom_link(
    Path(link_id): Path<Uuid>,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, HttpError> {
    let (dashboard, identity) = attach(&state, session).await?;
    let result = dashboard
        .delete_custom_link(state.store.as_ref(), identity.as_ref(), link_id)
        .await;
    Ok(respond(&state, &dashboard, result))
}

async fn open(
    state: &AppState,
    token: &str,
    identity: &Identity,
) -> Result<Arc<Dashboard>, HttpError> {
    state
        .dashboards
        .get_or_load(token, identity, state.store.as_ref())
        .await
        .map_err(|err| {
            HttpError::new(
                StatusCode::BAD_GATEWAY,
                err.user_message("Error loading profile"),
            )
        })
}

/// Dashboard for the session plus the identity to run operations as.
///
/// An expired session whose dashboard is still open gets the dashboard with
/// no identity, so the operation itself refuses and records the notice.
async fn attach(
    state: &AppState,
    session: Session,
) -> Result<(Arc<Dashboard>, Option<Identity>), HttpError> {
    let Some(token) = session.token else {
        return Err(unauthenticated());
    };
    match session.identity {
        Some(identity) => {
            let dashboard = open(state, &token, &identity).await?;
            Ok((dashboard, Some(identity)))
        }
        None => state
            .dashboards
            .cached(&token)
            .await
            .map(|dashboard| (dashboard, None))
            .ok_or_else(unauthenticated),
    }
}

fn unauthenticated() -> HttpError {
    HttpError::new(
        StatusCode::UNAUTHORIZED,
        DashboardError::Unauthenticated.to_string(),
    )
}

fn respond<T>(
    state: &AppState,
    dashboard: &Dashboard,
    result: Result<T, DashboardError>,
) -> Response {
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(err) => {
            info!("Dashboard operation for {} failed: {err}", dashboard.owner_id());
            status_for(err)
        }
    };
    (status, Json(dashboard.snapshot(&state.site))).into_response()
}

fn status_for(err: &DashboardError) -> StatusCode {
    match err {
        DashboardError::Unauthenticated => StatusCode::UNAUTHORIZED,
        DashboardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DashboardError::Store(_) => StatusCode::BAD_GATEWAY,
        DashboardError::Busy => StatusCode::CONFLICT,
    }
}
