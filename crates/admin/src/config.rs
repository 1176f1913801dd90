//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_BASE_URL` - Public URL for the admin app
//! - `ADMIN_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `ADMIN_IDENTITY_KEY` - Key material for the encrypted identity blob
//! - `BACKEND_ENDPOINT` - Backend API endpoint (e.g. <https://backend.example/v1>)
//! - `BACKEND_PROJECT_ID` - Backend project identifier
//! - `BACKEND_API_KEY` - Backend server API key
//! - `BACKEND_DATABASE_ID` - Database id holding the collections below
//! - `BACKEND_PROFILE_COLLECTION_ID` - User profile collection id
//! - `BACKEND_CATEGORY_COLLECTION_ID` - Category collection id
//! - `BACKEND_PRODUCT_COLLECTION_ID` - Product collection id
//! - `BACKEND_STORAGE_BUCKET_ID` - Storage bucket for product images
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `AUTH_PROVIDER` - `credentials` (default) or `oauth`
//! - `OAUTH_CLIENT_ID` / `OAUTH_CLIENT_SECRET` / `OAUTH_ISSUER_URL` -
//!   required when `AUTH_PROVIDER=oauth`
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Which session provider the app uses, selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthProviderKind {
    /// Email/password sessions against the backend account API.
    #[default]
    Credentials,
    /// OAuth 2.0 authorization-code flow against an external identity
    /// provider.
    OAuth,
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin app
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Key material for the encrypted identity blob
    pub identity_key: SecretString,
    /// Which session provider to use
    pub auth_provider: AuthProviderKind,
    /// Backend API configuration
    pub backend: BackendConfig,
    /// OAuth provider configuration (present when `auth_provider` is OAuth)
    pub oauth: Option<OAuthConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Backend endpoint (e.g. `https://backend.example/v1`)
    pub endpoint: String,
    /// Project identifier sent with every request
    pub project_id: String,
    /// Server API key (server-side only)
    pub api_key: SecretString,
    /// Database id holding the collections below
    pub database_id: String,
    /// User profile collection id
    pub profile_collection_id: String,
    /// Category collection id
    pub category_collection_id: String,
    /// Product collection id
    pub product_collection_id: String,
    /// Storage bucket for product images
    pub storage_bucket_id: String,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &"[REDACTED]")
            .field("database_id", &self.database_id)
            .field("profile_collection_id", &self.profile_collection_id)
            .field("category_collection_id", &self.category_collection_id)
            .field("product_collection_id", &self.product_collection_id)
            .field("storage_bucket_id", &self.storage_bucket_id)
            .finish()
    }
}

/// OAuth identity provider configuration.
#[derive(Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: SecretString,
    /// Issuer base URL (authorize/token/userinfo endpoints hang off this)
    pub issuer_url: String,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("issuer_url", &self.issuer_url)
            .finish()
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("ADMIN_BASE_URL")?;
        let session_secret = get_validated_secret("ADMIN_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "ADMIN_SESSION_SECRET")?;
        let identity_key = get_validated_secret("ADMIN_IDENTITY_KEY")?;

        let auth_provider = parse_auth_provider(&get_env_or_default("AUTH_PROVIDER", "credentials"))?;

        let backend = BackendConfig::from_env()?;
        let oauth = match auth_provider {
            AuthProviderKind::OAuth => Some(OAuthConfig::from_env()?),
            AuthProviderKind::Credentials => None,
        };

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            identity_key,
            auth_provider,
            backend,
            oauth,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint = get_required_env("BACKEND_ENDPOINT")?;
        url::Url::parse(&endpoint).map_err(|e| {
            ConfigError::InvalidEnvVar("BACKEND_ENDPOINT".to_string(), e.to_string())
        })?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: get_required_env("BACKEND_PROJECT_ID")?,
            api_key: get_required_secret("BACKEND_API_KEY")?,
            database_id: get_required_env("BACKEND_DATABASE_ID")?,
            profile_collection_id: get_required_env("BACKEND_PROFILE_COLLECTION_ID")?,
            category_collection_id: get_required_env("BACKEND_CATEGORY_COLLECTION_ID")?,
            product_collection_id: get_required_env("BACKEND_PRODUCT_COLLECTION_ID")?,
            storage_bucket_id: get_required_env("BACKEND_STORAGE_BUCKET_ID")?,
        })
    }
}

impl OAuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let issuer_url = get_required_env("OAUTH_ISSUER_URL")?;
        url::Url::parse(&issuer_url)
            .map_err(|e| ConfigError::InvalidEnvVar("OAUTH_ISSUER_URL".to_string(), e.to_string()))?;

        Ok(Self {
            client_id: get_required_env("OAUTH_CLIENT_ID")?,
            client_secret: get_required_secret("OAUTH_CLIENT_SECRET")?,
            issuer_url: issuer_url.trim_end_matches('/').to_string(),
        })
    }
}

fn parse_auth_provider(value: &str) -> Result<AuthProviderKind, ConfigError> {
    match value {
        "credentials" => Ok(AuthProviderKind::Credentials),
        "oauth" => Ok(AuthProviderKind::OAuth),
        other => Err(ConfigError::InvalidEnvVar(
            "AUTH_PROVIDER".to_string(),
            format!("expected 'credentials' or 'oauth', got '{other}'"),
        )),
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_session_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        let result = validate_session_secret(&secret, "TEST_SESSION");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_auth_provider() {
        assert_eq!(
            parse_auth_provider("credentials").unwrap(),
            AuthProviderKind::Credentials
        );
        assert_eq!(parse_auth_provider("oauth").unwrap(), AuthProviderKind::OAuth);
        assert!(parse_auth_provider("saml").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let config = AdminConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            identity_key: SecretString::from("k".repeat(32)),
            auth_provider: AuthProviderKind::Credentials,
            backend: BackendConfig {
                endpoint: "https://backend.example/v1".to_string(),
                project_id: "souk".to_string(),
                api_key: SecretString::from("key"),
                database_id: "main".to_string(),
                profile_collection_id: "profiles".to_string(),
                category_collection_id: "categories".to_string(),
                product_collection_id: "products".to_string(),
                storage_bucket_id: "images".to_string(),
            },
            oauth: None,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }

    #[test]
    fn test_backend_config_debug_redacts_api_key() {
        let config = BackendConfig {
            endpoint: "https://backend.example/v1".to_string(),
            project_id: "souk".to_string(),
            api_key: SecretString::from("super_secret_api_key"),
            database_id: "main".to_string(),
            profile_collection_id: "profiles".to_string(),
            category_collection_id: "categories".to_string(),
            product_collection_id: "products".to_string(),
            storage_bucket_id: "images".to_string(),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("backend.example"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_key"));
    }
}
