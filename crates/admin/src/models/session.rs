//! Session-related types.
//!
//! Types stored in the operator's cookie session for authentication state.

use serde::{Deserialize, Serialize};

use souk_core::{AccountId, Email};

/// Session-stored operator identity.
///
/// The resolved user object the rest of the application reads: identity
/// fields from the backend account plus the avatar resolved from the
/// profile document (or its cache).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Backend account id.
    pub account_id: AccountId,
    /// Operator's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Avatar URL; absent until a full session check resolves it.
    pub avatar: Option<String>,
}

/// Session keys for authentication data.
///
/// Fixed well-known names; the avatar cache and the identity blob are
/// only ever read and written under these keys.
pub mod keys {
    /// Key for storing the current logged-in operator.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the backend session token.
    pub const BACKEND_SESSION: &str = "backend_session";

    /// Key for the cached avatar URL.
    pub const USER_AVATAR: &str = "user_avatar";

    /// Key for the encrypted identity blob (hex ciphertext).
    pub const IDENTITY: &str = "identity";

    /// Key for the identity blob nonce (hex).
    pub const IDENTITY_NONCE: &str = "identity_nonce";

    /// Key for the once-per-session welcome banner flag.
    pub const WELCOME_SHOWN: &str = "welcome_shown";

    /// Key for OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";

    /// Key for OAuth nonce (replay protection).
    pub const OAUTH_NONCE: &str = "oauth_nonce";
}
