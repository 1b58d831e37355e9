use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::view::NotFoundPage;
use crate::resolver::{Resolution, resolve_profile};
use crate::state::AppState;

pub async fn get_public_profile(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Response {
    match resolve_profile(Arc::clone(&state.store), &state.site, &username).await {
        Resolution::Found(view) => Json(*view).into_response(),
        Resolution::NotFound => {
            (StatusCode::NOT_FOUND, Json(NotFoundPage::default())).into_response()
        }
    }
}
