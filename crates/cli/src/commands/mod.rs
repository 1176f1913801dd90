//! CLI command implementations.

pub mod account;
pub mod seed;

use thiserror::Error;

use souk_admin::backend::{BackendClient, BackendError};
use souk_admin::config::{AdminConfig, ConfigError};
use souk_admin::services::auth::{AuthError, AuthService, IdentityVault};

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
    #[error("invalid seed data: {0}")]
    InvalidSeedData(String),
}

/// Load configuration and build the backend client plus auth service.
pub fn bootstrap() -> Result<(BackendClient, AuthService), CliError> {
    let config = AdminConfig::from_env()?;
    let backend = BackendClient::new(&config.backend);
    let vault = IdentityVault::new(&config.identity_key);
    let auth = AuthService::new(backend.clone(), vault);
    Ok((backend, auth))
}
