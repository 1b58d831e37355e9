use axum::Router;
use axum::response::Redirect;
use axum::routing::get;

use crate::auth::redirect_after_auth;
use crate::state::AppState;

use super::session::Session;

pub fn router() -> Router<AppState> {
    Router::new().route("/redirect", get(post_auth_redirect))
}

async fn post_auth_redirect(session: Session) -> Redirect {
    Redirect::to(redirect_after_auth(session.identity.as_ref()))
}
