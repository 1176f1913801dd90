//! Backend document-store API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth for accounts, sessions, document
//!   collections, and file storage - NO local persistence, direct API calls
//! - REST endpoints with project/API-key headers; per-operator calls carry
//!   the session token in a dedicated header
//! - List queries are encoded as JSON query objects (`query` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use souk_admin::backend::{BackendClient, Query};
//!
//! let backend = BackendClient::new(&config.backend);
//!
//! // Sign an operator in
//! let session = backend.create_email_session("op@example.com", "hunter22").await?;
//!
//! // Page through products
//! let page = backend
//!     .list_products(&[
//!         Query::limit(8),
//!         Query::order_asc(CREATED_AT_ATTR),
//!         Query::cursor_after("doc_123"),
//!     ])
//!     .await?;
//! ```

mod client;
pub mod query;
pub mod types;

pub use client::BackendClient;
pub use query::{CREATED_AT_ATTR, Query};

use thiserror::Error;

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned an error response.
    #[error("Backend error ({status}): {message}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Error message reported by the backend.
        message: String,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),
}

impl BackendError {
    /// Whether this error means the caller's session is gone or invalid.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::NotFound("product doc_123".to_string());
        assert_eq!(err.to_string(), "Not found: product doc_123");

        let err = BackendError::Api {
            status: 409,
            message: "document already exists".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Backend error (409): document already exists"
        );
    }

    #[test]
    fn test_rate_limited_error() {
        let err = BackendError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }

    #[test]
    fn test_is_unauthorized() {
        let unauthorized = BackendError::Api {
            status: 401,
            message: "missing session".to_string(),
        };
        assert!(unauthorized.is_unauthorized());

        let conflict = BackendError::Api {
            status: 409,
            message: "conflict".to_string(),
        };
        assert!(!conflict.is_unauthorized());
    }
}
