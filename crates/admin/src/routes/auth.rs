//! Authentication route handlers.
//!
//! Handles login, sign-up, and logout. The login action belongs to the
//! credentials provider; with `AUTH_PROVIDER=oauth` the login page shows
//! the provider button instead (see the `oauth` module).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::config::AuthProviderKind;
use crate::error::clear_sentry_user;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::services::auth::AuthError;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
    /// Render the OAuth button instead of the credentials form.
    pub oauth_enabled: bool,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignUpTemplate {
    pub error: Option<String>,
}

/// Map an error code from the redirect query to a display message.
fn error_message(code: &str) -> String {
    match code {
        "credentials" => "Invalid email or password".to_string(),
        "invalid_email" => "Invalid email address".to_string(),
        "email_taken" => "An account with this email already exists".to_string(),
        "password_too_short" => "Password must be at least 8 characters".to_string(),
        "name_required" => "Name is required".to_string(),
        "no_profile" => "No profile is linked to this identity".to_string(),
        "denied" => "Sign-in was cancelled".to_string(),
        "invalid_state" | "session" => "Session expired, please try again".to_string(),
        _ => "Sign-in failed, please try again".to_string(),
    }
}

fn success_message(code: &str) -> String {
    match code {
        "account_created" => "Account created, you can sign in now".to_string(),
        "signed_out" => "Signed out".to_string(),
        _ => code.to_string(),
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
///
/// Already-authenticated operators are sent back to the dashboard.
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        error: query.error.as_deref().map(error_message),
        success: query.success.as_deref().map(success_message),
        oauth_enabled: state.auth_provider() == AuthProviderKind::OAuth,
    }
    .into_response()
}

/// Handle login form submission (credentials provider).
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth().sign_in(&session, &form.email, &form.password).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(AuthError::InvalidEmail(_)) => {
            Redirect::to("/auth/login?error=invalid_email").into_response()
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("login rejected for {}", form.email);
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::error!("login failed: {e}");
            Redirect::to("/auth/login?error=failed").into_response()
        }
    }
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
pub async fn signup_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    SignUpTemplate {
        error: query.error.as_deref().map(error_message),
    }
}

/// Handle sign-up form submission.
///
/// Creates the account and its profile document (with an initials-based
/// avatar); the operator signs in afterwards.
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignUpForm>,
) -> Response {
    if form.name.trim().is_empty() {
        return Redirect::to("/auth/signup?error=name_required").into_response();
    }

    match state
        .auth()
        .sign_up(&form.email, &form.password, form.name.trim())
        .await
    {
        Ok(profile) => {
            tracing::info!(profile_id = %profile.id, "operator signed up");
            Redirect::to("/auth/login?success=account_created").into_response()
        }
        Err(AuthError::InvalidEmail(_)) => {
            Redirect::to("/auth/signup?error=invalid_email").into_response()
        }
        Err(AuthError::WeakPassword(_)) => {
            Redirect::to("/auth/signup?error=password_too_short").into_response()
        }
        Err(AuthError::AccountAlreadyExists) => {
            Redirect::to("/auth/signup?error=email_taken").into_response()
        }
        Err(e) => {
            tracing::error!("sign-up failed: {e}");
            Redirect::to("/auth/signup?error=failed").into_response()
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Safe to call when already logged out.
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    state.auth().sign_out(&session).await;
    clear_sentry_user();
    Redirect::to("/auth/login?success=signed_out").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_cover_known_codes() {
        assert_eq!(error_message("credentials"), "Invalid email or password");
        assert_eq!(
            error_message("email_taken"),
            "An account with this email already exists"
        );
        // Unknown codes fall back to a generic message
        assert_eq!(error_message("???"), "Sign-in failed, please try again");
    }

    #[test]
    fn test_success_messages() {
        assert_eq!(
            success_message("account_created"),
            "Account created, you can sign in now"
        );
        assert_eq!(success_message("signed_out"), "Signed out");
    }
}
