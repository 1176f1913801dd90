//! Authentication service.
//!
//! Owns the per-operator session state machine:
//!
//! ```text
//! Unknown --check--> Authenticated(user) | Anonymous
//! Anonymous --sign_in ok--> Authenticated
//! Anonymous --sign_in err--> Anonymous   (error surfaced to caller only)
//! Authenticated --sign_out--> Anonymous
//! ```
//!
//! Two providers satisfy the same contract, selected by configuration at
//! startup: credentials (backend email/password sessions) and OAuth (the
//! `oauth` module). Both resolve the same profile document and leave the
//! same session keys behind.

mod error;
pub mod identity;
pub mod oauth;

pub use error::AuthError;
pub use identity::{IdentityError, IdentityVault, SealedIdentity};

use souk_core::Email;
use tower_sessions::Session;

use crate::backend::BackendClient;
use crate::backend::types::{NewProfile, ProfileDoc};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::{CurrentUser, session_keys as keys};

use oauth::OAuthIdentity;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Resolved authentication state for one operator session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No active session.
    Anonymous,
    /// An active session resolved to this operator.
    Authenticated(CurrentUser),
}

impl AuthState {
    /// The resolved operator, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    /// Whether an operator is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Authentication service.
///
/// Handles session checks, sign-in/out, sign-up, and the OAuth completion
/// path.
#[derive(Clone)]
pub struct AuthService {
    backend: BackendClient,
    vault: IdentityVault,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(backend: BackendClient, vault: IdentityVault) -> Self {
        Self { backend, vault }
    }

    // =========================================================================
    // Session Check
    // =========================================================================

    /// Resolve the authentication state of a session.
    ///
    /// Never fails: "no stored token" is normal anonymous state; a dead
    /// token or a missing profile degrades to [`AuthState::Anonymous`]
    /// (the latter with a logged error). On success the resolved operator
    /// is written back to the session.
    ///
    /// The avatar is served from the session cache when present, skipping
    /// the profile lookup entirely; the cache is only invalidated by
    /// [`Self::sign_out`].
    pub async fn check_session(&self, session: &Session) -> AuthState {
        let secret: Option<String> = session.get(keys::BACKEND_SESSION).await.ok().flatten();

        let Some(secret) = secret else {
            // OAuth sessions carry no backend token; trust the stored user.
            if let Ok(Some(user)) = session.get::<CurrentUser>(keys::CURRENT_USER).await {
                return AuthState::Authenticated(user);
            }
            return AuthState::Anonymous;
        };

        let account = match self.backend.current_account(&secret).await {
            Ok(account) => account,
            Err(e) => {
                // An expired session is normal anonymous state, not an error
                if e.is_unauthorized() {
                    tracing::debug!("stored session no longer valid");
                } else {
                    tracing::warn!("session check failed: {e}");
                }
                let _ = clear_current_user(session).await;
                return AuthState::Anonymous;
            }
        };

        let cached_avatar: Option<String> = session.get(keys::USER_AVATAR).await.ok().flatten();
        if let Some(avatar) = cached_avatar {
            let user = CurrentUser {
                account_id: account.id,
                email: account.email,
                name: account.name,
                avatar: Some(avatar),
            };
            if let Err(e) = set_current_user(session, &user).await {
                tracing::warn!("failed to store current user: {e}");
            }
            return AuthState::Authenticated(user);
        }

        match self.backend.find_profile(&account.id).await {
            Ok(Some(profile)) => {
                if let Some(avatar) = &profile.avatar {
                    if let Err(e) = session.insert(keys::USER_AVATAR, avatar).await {
                        tracing::warn!("failed to cache avatar: {e}");
                    }
                }

                // Persist the sealed identity under its fixed keys
                match self.vault.seal(account.id.as_str()) {
                    Ok(sealed) => {
                        let _ = session.insert(keys::IDENTITY, &sealed.ciphertext).await;
                        let _ = session.insert(keys::IDENTITY_NONCE, &sealed.nonce).await;
                    }
                    Err(e) => tracing::warn!("failed to seal identity: {e}"),
                }

                let user = CurrentUser {
                    account_id: account.id,
                    email: account.email,
                    name: account.name,
                    avatar: profile.avatar,
                };
                if let Err(e) = set_current_user(session, &user).await {
                    tracing::warn!("failed to store current user: {e}");
                }
                AuthState::Authenticated(user)
            }
            Ok(None) => {
                tracing::error!(account_id = %account.id, "no profile linked to account");
                let _ = clear_current_user(session).await;
                AuthState::Anonymous
            }
            Err(e) => {
                tracing::error!("profile lookup failed: {e}");
                let _ = clear_current_user(session).await;
                AuthState::Anonymous
            }
        }
    }

    // =========================================================================
    // Credentials Provider
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// On success the backend session token and the resolved operator are
    /// stored in the session; the avatar stays unresolved until the next
    /// full session check. On failure nothing in the session changes.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` for malformed emails and
    /// `AuthError::InvalidCredentials` when the backend rejects the pair.
    pub async fn sign_in(
        &self,
        session: &Session,
        email: &str,
        password: &str,
    ) -> Result<CurrentUser, AuthError> {
        let email = Email::parse(email)?;

        let token = self
            .backend
            .create_email_session(email.as_str(), password)
            .await?;

        // Resolve the account behind the fresh session for identity fields
        let account = self.backend.current_account(&token.secret).await?;

        let user = CurrentUser {
            account_id: account.id,
            email: account.email,
            name: account.name,
            avatar: None,
        };

        session.insert(keys::BACKEND_SESSION, &token.secret).await?;
        set_current_user(session, &user).await?;

        Ok(user)
    }

    /// Register a new operator: account, initials avatar, sealed internal
    /// id, and the profile document.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid,
    /// `AuthError::WeakPassword` if the password is too short, and
    /// `AuthError::AccountAlreadyExists` if the email is taken.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<ProfileDoc, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let account = self.backend.create_account(&email, password, name).await?;

        let avatar = self.backend.initials_avatar_url(name);
        let internal_id = match self.vault.seal(account.id.as_str()) {
            Ok(sealed) => Some(sealed.compact()),
            Err(e) => {
                tracing::warn!("failed to seal internal id: {e}");
                None
            }
        };

        let profile = self
            .backend
            .create_profile(&NewProfile {
                account_id: account.id.clone(),
                email: account.email.clone(),
                name: name.to_string(),
                avatar: Some(avatar),
                internal_id,
            })
            .await?;

        Ok(profile)
    }

    /// Sign out: delete the backend session, clear the cached avatar and
    /// every auth key.
    ///
    /// Idempotent - signing out an anonymous session is a no-op, and a
    /// failed backend delete is logged rather than surfaced.
    pub async fn sign_out(&self, session: &Session) {
        let secret: Option<String> = session.get(keys::BACKEND_SESSION).await.ok().flatten();

        if let Some(secret) = secret {
            if let Err(e) = self.backend.delete_session(&secret).await {
                if e.is_unauthorized() {
                    tracing::debug!("session already gone on sign out");
                } else {
                    tracing::warn!("sign out failed: {e}");
                }
            }
        }

        let _ = session.remove::<String>(keys::USER_AVATAR).await;
        let _ = session.remove::<String>(keys::IDENTITY).await;
        let _ = session.remove::<String>(keys::IDENTITY_NONCE).await;
        let _ = session.remove::<String>(keys::BACKEND_SESSION).await;
        let _ = clear_current_user(session).await;
    }

    // =========================================================================
    // OAuth Provider
    // =========================================================================

    /// Complete an OAuth sign-in: resolve the issuer identity to a profile
    /// document and store the operator in the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ProfileNotFound` when no profile matches the
    /// verified email.
    pub async fn complete_oauth(
        &self,
        session: &Session,
        oauth_identity: &OAuthIdentity,
    ) -> Result<CurrentUser, AuthError> {
        let email = Email::parse(&oauth_identity.email)?;

        let profile = self
            .backend
            .find_profile_by_email(&email)
            .await?
            .ok_or(AuthError::ProfileNotFound)?;

        if let Some(avatar) = &profile.avatar {
            session.insert(keys::USER_AVATAR, avatar).await?;
        }

        let user = CurrentUser {
            account_id: profile.account_id,
            email: profile.email,
            name: profile.name,
            avatar: profile.avatar,
        };
        set_current_user(session, &user).await?;

        Ok(user)
    }
}

/// Validate that a password meets the minimum requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use souk_core::AccountId;

    use crate::backend::BackendError;

    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password1").is_ok());
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_auth_state_helpers() {
        let anonymous = AuthState::Anonymous;
        assert!(!anonymous.is_authenticated());
        assert!(anonymous.user().is_none());

        let user = CurrentUser {
            account_id: AccountId::new("acct_1"),
            email: Email::parse("a@b.com").expect("valid email"),
            name: "Alice".to_string(),
            avatar: None,
        };
        let authed = AuthState::Authenticated(user.clone());
        assert!(authed.is_authenticated());
        assert_eq!(authed.user(), Some(&user));
    }

    #[test]
    fn test_backend_error_mapping() {
        let unauthorized = BackendError::Api {
            status: 401,
            message: "bad credentials".to_string(),
        };
        assert!(matches!(
            AuthError::from(unauthorized),
            AuthError::InvalidCredentials
        ));

        let conflict = BackendError::Api {
            status: 409,
            message: "email taken".to_string(),
        };
        assert!(matches!(
            AuthError::from(conflict),
            AuthError::AccountAlreadyExists
        ));

        let not_found = BackendError::NotFound("profile".to_string());
        assert!(matches!(AuthError::from(not_found), AuthError::Backend(_)));
    }
}
