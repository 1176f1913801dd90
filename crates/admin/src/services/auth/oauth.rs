//! OAuth identity-provider client.
//!
//! The alternate session provider: an OAuth 2.0 authorization-code flow
//! against an external issuer, resolved to the same profile document as
//! credentials sign-in.
//!
//! # Flow
//!
//! 1. Generate the authorization URL with `authorization_url()`
//! 2. Redirect the operator to the issuer's login page
//! 3. The issuer redirects back with an authorization code
//! 4. Exchange the code with `exchange_code()`
//! 5. Resolve the identity with `fetch_identity()`

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Deserialize;
use url::form_urlencoded;

use crate::config::OAuthConfig;

use super::AuthError;

/// Token response from the issuer.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthToken {
    /// Bearer token for userinfo calls.
    pub access_token: String,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Identity claims resolved from the issuer's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthIdentity {
    /// Verified email address.
    pub email: String,
    /// Display name claim.
    #[serde(default)]
    pub name: Option<String>,
}

/// Client for the OAuth identity provider.
#[derive(Clone)]
pub struct OAuthClient {
    inner: Arc<OAuthClientInner>,
}

struct OAuthClientInner {
    client: reqwest::Client,
    issuer_url: String,
    client_id: String,
    client_secret: String,
}

impl OAuthClient {
    /// Create a new OAuth client.
    #[must_use]
    pub fn new(config: &OAuthConfig) -> Self {
        Self {
            inner: Arc::new(OAuthClientInner {
                client: reqwest::Client::new(),
                issuer_url: config.issuer_url.clone(),
                client_id: config.client_id.clone(),
                client_secret: config.client_secret.expose_secret().to_string(),
            }),
        }
    }

    /// Generate the authorization URL for operator login.
    ///
    /// # Arguments
    ///
    /// * `redirect_uri` - The callback URL to redirect to after login
    /// * `state` - A random string stored in the session to prevent CSRF
    /// * `nonce` - A random string for replay protection
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &str, state: &str, nonce: &str) -> String {
        let params: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.inner.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", "openid email profile")
            .append_pair("state", state)
            .append_pair("nonce", nonce)
            .finish();

        format!("{}/oauth/authorize?{params}", self.inner.issuer_url)
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::OAuth` if the issuer rejects the exchange.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<OAuthToken, AuthError> {
        let response = self
            .inner
            .client
            .post(format!("{}/oauth/token", self.inner.issuer_url))
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", &self.inner.client_id),
                ("client_secret", &self.inner.client_secret),
            ])
            .send()
            .await
            .map_err(|e| AuthError::OAuth(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::OAuth(format!(
                "token exchange failed ({status}): {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json::<OAuthToken>()
            .await
            .map_err(|e| AuthError::OAuth(e.to_string()))
    }

    /// Resolve the identity behind an access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::OAuth` if the userinfo call fails.
    pub async fn fetch_identity(&self, access_token: &str) -> Result<OAuthIdentity, AuthError> {
        let response = self
            .inner
            .client
            .get(format!("{}/oauth/userinfo", self.inner.issuer_url))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::OAuth(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::OAuth(format!(
                "userinfo failed ({})",
                response.status()
            )));
        }

        response
            .json::<OAuthIdentity>()
            .await
            .map_err(|e| AuthError::OAuth(e.to_string()))
    }
}

/// Generate a cryptographically random URL-safe string for OAuth state and
/// nonce parameters.
#[must_use]
pub fn generate_random_string(length: usize) -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).unwrap_or(&b'a'))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn test_client() -> OAuthClient {
        OAuthClient::new(&OAuthConfig {
            client_id: "souk-admin".to_string(),
            client_secret: SecretString::from("shhh"),
            issuer_url: "https://id.example".to_string(),
        })
    }

    #[test]
    fn test_authorization_url() {
        let url = test_client().authorization_url(
            "https://admin.example/auth/oauth/callback",
            "st4te",
            "n0nce",
        );

        assert!(url.starts_with("https://id.example/oauth/authorize?"));
        assert!(url.contains("client_id=souk-admin"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("state=st4te"));
        assert!(url.contains("nonce=n0nce"));
        assert!(url.contains(
            "redirect_uri=https%3A%2F%2Fadmin.example%2Fauth%2Foauth%2Fcallback"
        ));
    }

    #[test]
    fn test_generate_random_string() {
        let a = generate_random_string(32);
        let b = generate_random_string(32);
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
