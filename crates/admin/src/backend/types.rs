//! Wire types for the backend document API.
//!
//! Documents carry the backend's system fields `$id` and `$createdAt`;
//! decimal fields travel as strings and are parsed at the edge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use souk_core::{AccountId, CategoryId, Email, FileId, Price, ProductId, ProfileId, SessionId};

/// A server-issued session.
///
/// The `secret` authenticates subsequent per-operator calls; it lives only
/// in the operator's cookie session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    /// Session id.
    #[serde(rename = "$id")]
    pub id: SessionId,
    /// Account this session belongs to.
    #[serde(rename = "userId")]
    pub account_id: AccountId,
    /// Bearer token for the session.
    pub secret: String,
    /// When the session was created.
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
}

/// An account as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Account id.
    #[serde(rename = "$id")]
    pub id: AccountId,
    /// Account email.
    pub email: Email,
    /// Display name.
    pub name: String,
}

/// A page of documents from a list query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentList<T> {
    /// Total documents matching the filters (ignoring limit).
    pub total: u64,
    /// The documents of this page, in query order.
    pub documents: Vec<T>,
}

/// A user profile document.
///
/// Created once at sign-up and read on session checks; never mutated by
/// this application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileDoc {
    /// Document id.
    #[serde(rename = "$id")]
    pub id: ProfileId,
    /// Creation timestamp.
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    /// Linked account id.
    pub account_id: AccountId,
    /// Account email.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Avatar URL (initials-generated at sign-up).
    #[serde(default)]
    pub avatar: Option<String>,
    /// Encrypted internal id (hex ciphertext), if recorded.
    #[serde(default)]
    pub internal_id: Option<String>,
}

/// A category document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDoc {
    /// Document id.
    #[serde(rename = "$id")]
    pub id: CategoryId,
    /// Creation timestamp.
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    /// Category name (unique by business rule, not enforced here).
    pub name: String,
}

/// A product document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDoc {
    /// Document id; doubles as the pagination cursor.
    #[serde(rename = "$id")]
    pub id: ProductId,
    /// Creation timestamp; the list sort key.
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    /// Product name.
    pub name: String,
    /// Reference to the product's category document.
    pub category_id: CategoryId,
    /// Brand name.
    pub brand: String,
    /// Optional storage size in GB.
    #[serde(default)]
    pub storage: Option<u32>,
    /// Color.
    pub color: String,
    /// Ordered image URLs, between 1 and 6.
    pub images: Vec<String>,
    /// Free-form description.
    pub description: String,
    /// Units in stock; positive.
    pub stock: u32,
    /// Unit price; positive, travels as a decimal string.
    pub price: Price,
    /// Account id of the listing seller.
    pub seller_id: AccountId,
}

/// Fields of a new product document, before the backend assigns system
/// fields.
#[derive(Debug, Clone, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub category_id: CategoryId,
    pub brand: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<u32>,
    pub color: String,
    pub images: Vec<String>,
    pub description: String,
    pub stock: u32,
    pub price: Price,
    pub seller_id: AccountId,
}

/// Fields of a new user profile document.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub account_id: AccountId,
    pub email: Email,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_id: Option<String>,
}

/// A stored file, as reported by the storage API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageFile {
    /// File id.
    #[serde(rename = "$id")]
    pub id: FileId,
    /// Original file name.
    pub name: String,
    /// MIME type reported by the backend.
    #[serde(default, rename = "mimeType")]
    pub mime_type: Option<String>,
}

/// Error body returned by the backend on failures.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_doc_deserialize() {
        let json = r#"{
            "$id": "doc_1",
            "$createdAt": "2026-03-01T10:00:00Z",
            "name": "Pixel 9",
            "category_id": "cat_phones",
            "brand": "Google",
            "storage": 256,
            "color": "obsidian",
            "images": ["https://files.example/a/preview"],
            "description": "A phone.",
            "stock": 12,
            "price": "799.00",
            "seller_id": "acct_7"
        }"#;

        let doc: ProductDoc = serde_json::from_str(json).expect("deserialize product");
        assert_eq!(doc.id.as_str(), "doc_1");
        assert_eq!(doc.category_id.as_str(), "cat_phones");
        assert_eq!(doc.stock, 12);
        assert_eq!(doc.price.display(), "$799.00");
    }

    #[test]
    fn test_product_doc_optional_storage_defaults() {
        let json = r#"{
            "$id": "doc_2",
            "$createdAt": "2026-03-01T10:00:00Z",
            "name": "Tote bag",
            "category_id": "cat_bags",
            "brand": "Souk",
            "color": "natural",
            "images": ["https://files.example/b/preview"],
            "description": "A bag.",
            "stock": 3,
            "price": "25.00",
            "seller_id": "acct_7"
        }"#;

        let doc: ProductDoc = serde_json::from_str(json).expect("deserialize product");
        assert!(doc.storage.is_none());
    }

    #[test]
    fn test_session_token_deserialize() {
        let json = r#"{
            "$id": "sess_1",
            "userId": "acct_7",
            "secret": "tok_abc",
            "$createdAt": "2026-03-01T10:00:00Z"
        }"#;

        let token: SessionToken = serde_json::from_str(json).expect("deserialize session");
        assert_eq!(token.account_id.as_str(), "acct_7");
        assert_eq!(token.secret, "tok_abc");
    }

    #[test]
    fn test_new_profile_skips_absent_fields() {
        let profile = NewProfile {
            account_id: AccountId::new("acct_1"),
            email: Email::parse("a@b.com").expect("valid email"),
            name: "Alice".to_string(),
            avatar: None,
            internal_id: None,
        };

        let json = serde_json::to_string(&profile).expect("serialize");
        assert!(!json.contains("avatar"));
        assert!(!json.contains("internal_id"));
    }
}
