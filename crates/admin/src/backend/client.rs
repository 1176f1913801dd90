//! Backend API client implementation.
//!
//! Wraps `reqwest` with the backend's auth headers and response handling.
//! One client is shared across the app; it is cheaply cloneable via an
//! inner `Arc`.

use std::sync::Arc;

use reqwest::{RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::form_urlencoded;
use uuid::Uuid;

use souk_core::{AccountId, Email, FileId};

use crate::config::BackendConfig;

use super::BackendError;
use super::query::{self, Query};
use super::types::{
    Account, ApiErrorBody, CategoryDoc, DocumentList, NewProduct, NewProfile, ProductDoc,
    ProfileDoc, SessionToken, StorageFile,
};

/// Header carrying the project id.
const PROJECT_HEADER: &str = "X-Souk-Project";
/// Header carrying the server API key.
const KEY_HEADER: &str = "X-Souk-Key";
/// Header carrying an operator session token.
const SESSION_HEADER: &str = "X-Souk-Session";

/// Client for the backend document-store API.
///
/// Provides account/session operations, document create/list on the
/// configured collections, and file storage.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    database_id: String,
    profile_collection_id: String,
    category_collection_id: String,
    product_collection_id: String,
    storage_bucket_id: String,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                endpoint: config.endpoint.clone(),
                project_id: config.project_id.clone(),
                api_key: config.api_key.expose_secret().to_string(),
                database_id: config.database_id.clone(),
                profile_collection_id: config.profile_collection_id.clone(),
                category_collection_id: config.category_collection_id.clone(),
                product_collection_id: config.product_collection_id.clone(),
                storage_bucket_id: config.storage_bucket_id.clone(),
            }),
        }
    }

    /// Generate a unique client-side document id.
    #[must_use]
    pub fn unique_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.endpoint)
    }

    fn documents_url(&self, collection_id: &str) -> String {
        format!(
            "{}/databases/{}/collections/{collection_id}/documents",
            self.inner.endpoint, self.inner.database_id
        )
    }

    /// Attach the project and API-key headers every request carries.
    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(PROJECT_HEADER, &self.inner.project_id)
            .header(KEY_HEADER, &self.inner.api_key)
    }

    /// Send a request and decode the JSON response body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map_or_else(|_| body.chars().take(200).collect::<String>(), |e| e.message);
            tracing::debug!(status = %status, message = %message, "backend request failed");
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse backend response"
                );
                Err(BackendError::Parse(e))
            }
        }
    }

    /// Send a request, ignoring any response body.
    async fn send_no_content(&self, request: RequestBuilder) -> Result<(), BackendError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map_or_else(|_| body.chars().take(200).collect::<String>(), |e| e.message);
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }

    // =========================================================================
    // Account & Session Methods
    // =========================================================================

    /// Create a new account with a client-generated unique id.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already registered or the request
    /// fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn create_account(
        &self,
        email: &Email,
        password: &str,
        name: &str,
    ) -> Result<Account, BackendError> {
        let request = self
            .with_auth(self.inner.client.post(self.url("/account")))
            .json(&serde_json::json!({
                "userId": Self::unique_id(),
                "email": email,
                "password": password,
                "name": name,
            }));

        self.send(request).await
    }

    /// Create an email/password session.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request
    /// fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn create_email_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionToken, BackendError> {
        let request = self
            .with_auth(self.inner.client.post(self.url("/account/sessions/email")))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }));

        self.send(request).await
    }

    /// Fetch the account behind a session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is expired or the request fails;
    /// a 401 maps to [`BackendError::is_unauthorized`].
    #[instrument(skip(self, session_secret))]
    pub async fn current_account(&self, session_secret: &str) -> Result<Account, BackendError> {
        let request = self
            .with_auth(self.inner.client.get(self.url("/account")))
            .header(SESSION_HEADER, session_secret);

        self.send(request).await
    }

    /// Delete the session behind a token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. Deleting an already-dead
    /// session is reported by the backend as a 401; callers that want
    /// idempotent sign-out treat that as success.
    #[instrument(skip(self, session_secret))]
    pub async fn delete_session(&self, session_secret: &str) -> Result<(), BackendError> {
        let request = self
            .with_auth(
                self.inner
                    .client
                    .delete(self.url("/account/sessions/current")),
            )
            .header(SESSION_HEADER, session_secret);

        self.send_no_content(request).await
    }

    /// URL of the backend-generated initials avatar for a display name.
    #[must_use]
    pub fn initials_avatar_url(&self, name: &str) -> String {
        let encoded: String = form_urlencoded::byte_serialize(name.as_bytes()).collect();
        format!(
            "{}/avatars/initials?name={encoded}&project={}",
            self.inner.endpoint, self.inner.project_id
        )
    }

    // =========================================================================
    // Document Methods
    // =========================================================================

    async fn create_document<T, D>(&self, collection_id: &str, data: &D) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        D: serde::Serialize + Sync,
    {
        let request = self
            .with_auth(self.inner.client.post(self.documents_url(collection_id)))
            .json(&serde_json::json!({
                "documentId": Self::unique_id(),
                "data": data,
            }));

        self.send(request).await
    }

    async fn list_documents<T: DeserializeOwned>(
        &self,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList<T>, BackendError> {
        let request = self
            .with_auth(self.inner.client.get(self.documents_url(collection_id)))
            .query(&query::to_params(queries));

        self.send(request).await
    }

    /// Create a user profile document.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, profile), fields(account_id = %profile.account_id))]
    pub async fn create_profile(&self, profile: &NewProfile) -> Result<ProfileDoc, BackendError> {
        self.create_document(&self.inner.profile_collection_id, profile)
            .await
    }

    /// Find the profile document linked to an account.
    ///
    /// Returns `Ok(None)` when the lookup matches no documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn find_profile(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<ProfileDoc>, BackendError> {
        let list: DocumentList<ProfileDoc> = self
            .list_documents(
                &self.inner.profile_collection_id,
                &[Query::equal("account_id", account_id.as_str())],
            )
            .await?;

        Ok(list.documents.into_iter().next())
    }

    /// Find the profile document for an email address (OAuth sign-in path).
    ///
    /// Returns `Ok(None)` when the lookup matches no documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn find_profile_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<ProfileDoc>, BackendError> {
        let list: DocumentList<ProfileDoc> = self
            .list_documents(
                &self.inner.profile_collection_id,
                &[Query::equal("email", email.as_str())],
            )
            .await?;

        Ok(list.documents.into_iter().next())
    }

    /// Create a category document.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<CategoryDoc, BackendError> {
        self.create_document(
            &self.inner.category_collection_id,
            &serde_json::json!({ "name": name }),
        )
        .await
    }

    /// List category documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        queries: &[Query],
    ) -> Result<DocumentList<CategoryDoc>, BackendError> {
        self.list_documents(&self.inner.category_collection_id, queries)
            .await
    }

    /// Create a product document.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: &NewProduct) -> Result<ProductDoc, BackendError> {
        self.create_document(&self.inner.product_collection_id, product)
            .await
    }

    /// List product documents.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        queries: &[Query],
    ) -> Result<DocumentList<ProductDoc>, BackendError> {
        self.list_documents(&self.inner.product_collection_id, queries)
            .await
    }

    // =========================================================================
    // Storage Methods
    // =========================================================================

    /// Upload a file to the image bucket.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, bytes), fields(filename = %filename, size = bytes.len()))]
    pub async fn upload_file(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<StorageFile, BackendError> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .text("fileId", Self::unique_id())
            .part("file", part);

        let url = format!(
            "{}/storage/buckets/{}/files",
            self.inner.endpoint, self.inner.storage_bucket_id
        );
        let request = self.with_auth(self.inner.client.post(url)).multipart(form);

        self.send(request).await
    }

    /// Preview URL for a stored file.
    #[must_use]
    pub fn file_preview_url(&self, file_id: &FileId) -> String {
        format!(
            "{}/storage/buckets/{}/files/{file_id}/preview?project={}",
            self.inner.endpoint, self.inner.storage_bucket_id, self.inner.project_id
        )
    }

    /// Cheap connectivity probe for the readiness endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable.
    pub async fn ping(&self) -> Result<(), BackendError> {
        let request = self.with_auth(self.inner.client.get(self.url("/health")));
        self.send_no_content(request).await
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn test_config() -> BackendConfig {
        BackendConfig {
            endpoint: "https://backend.example/v1".to_string(),
            project_id: "souk".to_string(),
            api_key: SecretString::from("key"),
            database_id: "main".to_string(),
            profile_collection_id: "profiles".to_string(),
            category_collection_id: "categories".to_string(),
            product_collection_id: "products".to_string(),
            storage_bucket_id: "images".to_string(),
        }
    }

    #[test]
    fn test_unique_id_is_unique() {
        assert_ne!(BackendClient::unique_id(), BackendClient::unique_id());
    }

    #[test]
    fn test_file_preview_url() {
        let client = BackendClient::new(&test_config());
        let url = client.file_preview_url(&FileId::new("f_1"));
        assert_eq!(
            url,
            "https://backend.example/v1/storage/buckets/images/files/f_1/preview?project=souk"
        );
    }

    #[test]
    fn test_initials_avatar_url_encodes_name() {
        let client = BackendClient::new(&test_config());
        let url = client.initials_avatar_url("Alice Vendor");
        assert_eq!(
            url,
            "https://backend.example/v1/avatars/initials?name=Alice+Vendor&project=souk"
        );
    }
}
