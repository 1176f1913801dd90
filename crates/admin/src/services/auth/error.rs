//! Authentication error types.

use thiserror::Error;

use crate::backend::BackendError;

use super::identity::IdentityError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] souk_core::EmailError),

    /// Invalid credentials (wrong password or unknown account).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No profile document is linked to the authenticated account.
    #[error("profile not found")]
    ProfileNotFound,

    /// An account with this email already exists.
    #[error("account already exists")]
    AccountAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// OAuth flow failed (denied, state mismatch, exchange error).
    #[error("oauth error: {0}")]
    OAuth(String),

    /// Session state missing or invalid.
    #[error("invalid session state")]
    InvalidSessionState,

    /// Cookie session store error.
    #[error("session store error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Identity blob encryption error.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// Backend API error.
    #[error("backend error: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for AuthError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Api { status: 401, .. } => Self::InvalidCredentials,
            BackendError::Api { status: 409, .. } => Self::AccountAlreadyExists,
            other => Self::Backend(other),
        }
    }
}
