use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;

use crate::auth::{Identity, session_token};
use crate::state::AppState;

use super::HttpError;

/// Session token from the request and the identity it resolves to, if any.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
    pub identity: Option<Identity>,
}

impl FromRequestParts<AppState> for Session {
    type Rejection = HttpError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(Self::default());
        };

        let identity = state
            .auth
            .identify(&token)
            .await
            .map_err(|err| {
                HttpError::new(
                    StatusCode::BAD_GATEWAY,
                    err.user_message("Error checking session"),
                )
            })?;

        Ok(Self {
            token: Some(token),
            identity,
        })
    }
}
