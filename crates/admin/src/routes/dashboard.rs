//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::error::set_sentry_user;
use crate::filters;
use crate::models::{CurrentUser, session_keys};
use crate::services::auth::AuthState;
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: CurrentUser,
    /// Whether to show the once-per-session welcome banner.
    pub welcome: bool,
}

/// Dashboard page handler.
///
/// Runs the full session check (resolving and caching the avatar) and
/// shows the welcome banner the first time this session lands here
/// authenticated.
pub async fn home(State(state): State<AppState>, session: Session) -> Response {
    match state.auth().check_session(&session).await {
        AuthState::Authenticated(user) => {
            set_sentry_user(&user.account_id, Some(user.email.as_str()));

            let already_shown: bool = session
                .get(session_keys::WELCOME_SHOWN)
                .await
                .ok()
                .flatten()
                .unwrap_or(false);

            let welcome = !already_shown;
            if welcome {
                if let Err(e) = session.insert(session_keys::WELCOME_SHOWN, true).await {
                    tracing::warn!("failed to set welcome flag: {e}");
                }
            }

            DashboardTemplate { user, welcome }.into_response()
        }
        AuthState::Anonymous => Redirect::to("/auth/login").into_response(),
    }
}
