//! Application state shared across handlers.

use std::sync::Arc;

use crate::backend::BackendClient;
use crate::config::{AdminConfig, AuthProviderKind};
use crate::services::auth::oauth::OAuthClient;
use crate::services::auth::{AuthService, IdentityVault};
use crate::services::catalog::CatalogService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// backend client and the service layer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backend: BackendClient,
    auth: AuthService,
    catalog: CatalogService,
    oauth: Option<OAuthClient>,
}

impl AppState {
    /// Create a new application state from configuration.
    #[must_use]
    pub fn new(config: AdminConfig) -> Self {
        let backend = BackendClient::new(&config.backend);
        let vault = IdentityVault::new(&config.identity_key);
        let auth = AuthService::new(backend.clone(), vault);
        let catalog = CatalogService::new(backend.clone());
        let oauth = config.oauth.as_ref().map(OAuthClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                auth,
                catalog,
                oauth,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API client.
    #[must_use]
    pub fn backend(&self) -> &BackendClient {
        &self.inner.backend
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the catalog service.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get the OAuth client, if the OAuth provider is configured.
    #[must_use]
    pub fn oauth(&self) -> Option<&OAuthClient> {
        self.inner.oauth.as_ref()
    }

    /// Which session provider the app runs with.
    #[must_use]
    pub fn auth_provider(&self) -> AuthProviderKind {
        self.inner.config.auth_provider
    }
}
