//! OAuth provider route handlers.
//!
//! Handles the authorization-code flow for the alternate session
//! provider: login redirects to the identity provider, the callback
//! validates state, exchanges the code, and resolves the operator's
//! profile document.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::models::session_keys;
use crate::services::auth::AuthError;
use crate::services::auth::oauth::generate_random_string;
use crate::state::AppState;

/// Query parameters from the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Initiate OAuth login.
///
/// Generates state and nonce parameters, stores them in the session, and
/// redirects to the identity provider's authorization page.
///
/// # Route
///
/// `GET /auth/oauth/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let Some(oauth) = state.oauth() else {
        return Redirect::to("/auth/login").into_response();
    };

    // Generate CSRF state and replay nonce
    let oauth_state = generate_random_string(32);
    let nonce = generate_random_string(32);

    // Store in session for validation on callback
    if let Err(e) = session.insert(session_keys::OAUTH_STATE, &oauth_state).await {
        tracing::error!("failed to store OAuth state in session: {e}");
        return Redirect::to("/auth/login?error=session").into_response();
    }

    if let Err(e) = session.insert(session_keys::OAUTH_NONCE, &nonce).await {
        tracing::error!("failed to store OAuth nonce in session: {e}");
        return Redirect::to("/auth/login?error=session").into_response();
    }

    let redirect_uri = format!("{}/auth/oauth/callback", state.config().base_url);
    let auth_url = oauth.authorization_url(&redirect_uri, &oauth_state, &nonce);

    Redirect::to(&auth_url).into_response()
}

/// Handle the OAuth callback.
///
/// Validates the state parameter, exchanges the authorization code, and
/// resolves the identity to a profile document.
///
/// # Route
///
/// `GET /auth/oauth/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(oauth) = state.oauth() else {
        return Redirect::to("/auth/login").into_response();
    };

    // Check for errors reported by the provider
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("OAuth error: {error} - {description}");
        return Redirect::to("/auth/login?error=denied").into_response();
    }

    // Verify we have an authorization code
    let Some(code) = query.code else {
        tracing::warn!("OAuth callback missing code");
        return Redirect::to("/auth/login?error=invalid_state").into_response();
    };

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("OAuth callback missing state");
        return Redirect::to("/auth/login?error=invalid_state").into_response();
    };

    let stored_state: Option<String> = session
        .get(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("OAuth state mismatch");
        return Redirect::to("/auth/login?error=invalid_state").into_response();
    }

    // Clear the stored parameters (one-time use)
    let _ = session.remove::<String>(session_keys::OAUTH_STATE).await;
    let _ = session.remove::<String>(session_keys::OAUTH_NONCE).await;

    // Exchange code for tokens (redirect URI must match the login request)
    let redirect_uri = format!("{}/auth/oauth/callback", state.config().base_url);
    let token = match oauth.exchange_code(&code, &redirect_uri).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("failed to exchange OAuth code: {e}");
            return Redirect::to("/auth/login?error=failed").into_response();
        }
    };

    // Resolve the identity and complete sign-in
    let identity = match oauth.fetch_identity(&token.access_token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::error!("failed to fetch OAuth identity: {e}");
            return Redirect::to("/auth/login?error=failed").into_response();
        }
    };

    match state.auth().complete_oauth(&session, &identity).await {
        Ok(user) => {
            tracing::info!(account_id = %user.account_id, "operator authenticated via OAuth");
            Redirect::to("/").into_response()
        }
        Err(AuthError::ProfileNotFound) => {
            tracing::warn!("no profile for OAuth identity {}", identity.email);
            Redirect::to("/auth/login?error=no_profile").into_response()
        }
        Err(e) => {
            tracing::error!("OAuth completion failed: {e}");
            Redirect::to("/auth/login?error=failed").into_response()
        }
    }
}
