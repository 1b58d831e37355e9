//! Session lookup against the external auth provider's `sessions` table.
//!
//! The only authorization decision made here is where to send a freshly
//! signed-in user; resource access is scoped by owner id elsewhere.

use async_trait::async_trait;
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::prelude::{Profile, Session};
use crate::store::StoreError;

pub const SESSION_COOKIE: &str = "session";
pub const MAX_TOKEN_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

#[async_trait]
pub trait AuthGate: Send + Sync {
    /// Identity behind a session token; `None` for unknown or expired sessions.
    async fn identify(&self, token: &str) -> Result<Option<Identity>, StoreError>;
}

#[derive(Clone)]
pub struct PgAuthGate {
    database: DatabaseConnection,
}

impl PgAuthGate {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl AuthGate for PgAuthGate {
    async fn identify(&self, token: &str) -> Result<Option<Identity>, StoreError> {
        let Some(found) = Session::find_by_id(token.to_string())
            .one(&self.database)
            .await?
        else {
            return Ok(None);
        };

        if found.expires_at.with_timezone(&Utc) <= Utc::now() {
            return Ok(None);
        }

        let role = Profile::find_by_id(found.user_id)
            .one(&self.database)
            .await?
            .map(|model| Role::parse(&model.role))
            .unwrap_or(Role::User);

        Ok(Some(Identity {
            user_id: found.user_id,
            role,
        }))
    }
}

/// Session token from `Authorization: Bearer ..` or the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    let token = bearer.or_else(|| {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.trim())
    })?;

    if token.is_empty() || token.len() > MAX_TOKEN_LEN {
        return None;
    }
    Some(token.to_string())
}

/// Landing route after sign-in.
pub fn redirect_after_auth(identity: Option<&Identity>) -> &'static str {
    match identity.map(|identity| identity.role) {
        None => "/",
        Some(Role::Admin) => "/dashboard",
        Some(Role::User) => "/dashboard/profile",
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn redirect_depends_on_role() {
        assert_eq!(redirect_after_auth(None), "/");
        assert_eq!(redirect_after_auth(Some(&identity(Role::Admin))), "/dashboard");
        assert_eq!(
            redirect_after_auth(Some(&identity(Role::User))),
            "/dashboard/profile"
        );
    }

    #[test]
    fn role_parse_defaults_to_user() {
        assert_eq!(Role::parse("ADMIN"), Role::Admin);
        assert_eq!(Role::parse("user"), Role::User);
        assert_eq!(Role::parse("superuser"), Role::User);
    }

    #[test]
    fn token_from_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc123"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; session=tok-42; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("tok-42"));
    }

    #[test]
    fn missing_or_blank_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(session_token(&headers), None);
    }
}
