//! List-query builder for the backend document API.
//!
//! The backend accepts list filters as JSON objects in repeated `queries[]`
//! parameters, e.g. `{"method":"equal","attribute":"account_id",
//! "values":["acct_1"]}`. This module builds exactly the filters the app
//! uses: equality on a foreign-key field, limit, creation-time ordering, and
//! cursor predicates on document ids.

use serde_json::json;

/// System attribute holding the document creation timestamp.
///
/// This is the sort key and, indirectly, what cursor predicates paginate
/// over.
pub const CREATED_AT_ATTR: &str = "$createdAt";

/// A single list-query filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Equality filter on an attribute.
    Equal {
        /// Attribute name.
        attribute: String,
        /// Value the attribute must equal.
        value: String,
    },
    /// Maximum number of documents to return.
    Limit(u32),
    /// Ascending sort by an attribute.
    OrderAsc(String),
    /// Descending sort by an attribute.
    OrderDesc(String),
    /// Return documents after the given document id.
    CursorAfter(String),
    /// Return documents before the given document id.
    CursorBefore(String),
}

impl Query {
    /// Equality filter on `attribute`.
    #[must_use]
    pub fn equal(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equal {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Limit the page size.
    #[must_use]
    pub const fn limit(limit: u32) -> Self {
        Self::Limit(limit)
    }

    /// Ascending sort by `attribute`.
    #[must_use]
    pub fn order_asc(attribute: impl Into<String>) -> Self {
        Self::OrderAsc(attribute.into())
    }

    /// Descending sort by `attribute`.
    #[must_use]
    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Self::OrderDesc(attribute.into())
    }

    /// Page boundary: documents strictly after the given id.
    #[must_use]
    pub fn cursor_after(id: impl Into<String>) -> Self {
        Self::CursorAfter(id.into())
    }

    /// Page boundary: documents strictly before the given id.
    #[must_use]
    pub fn cursor_before(id: impl Into<String>) -> Self {
        Self::CursorBefore(id.into())
    }

    /// Encode this filter in the backend's wire format.
    #[must_use]
    pub fn to_wire(&self) -> String {
        let value = match self {
            Self::Equal { attribute, value } => json!({
                "method": "equal",
                "attribute": attribute,
                "values": [value],
            }),
            Self::Limit(limit) => json!({
                "method": "limit",
                "values": [limit],
            }),
            Self::OrderAsc(attribute) => json!({
                "method": "orderAsc",
                "attribute": attribute,
            }),
            Self::OrderDesc(attribute) => json!({
                "method": "orderDesc",
                "attribute": attribute,
            }),
            Self::CursorAfter(id) => json!({
                "method": "cursorAfter",
                "values": [id],
            }),
            Self::CursorBefore(id) => json!({
                "method": "cursorBefore",
                "values": [id],
            }),
        };
        value.to_string()
    }
}

/// Encode a slice of filters as `queries[]` request parameters.
#[must_use]
pub fn to_params(queries: &[Query]) -> Vec<(&'static str, String)> {
    queries.iter().map(|q| ("queries[]", q.to_wire())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_wire_format() {
        let q = Query::equal("account_id", "acct_1");
        assert_eq!(
            q.to_wire(),
            r#"{"attribute":"account_id","method":"equal","values":["acct_1"]}"#
        );
    }

    #[test]
    fn test_limit_wire_format() {
        assert_eq!(Query::limit(8).to_wire(), r#"{"method":"limit","values":[8]}"#);
    }

    #[test]
    fn test_order_wire_format() {
        assert_eq!(
            Query::order_asc(CREATED_AT_ATTR).to_wire(),
            r#"{"attribute":"$createdAt","method":"orderAsc"}"#
        );
        assert_eq!(
            Query::order_desc(CREATED_AT_ATTR).to_wire(),
            r#"{"attribute":"$createdAt","method":"orderDesc"}"#
        );
    }

    #[test]
    fn test_cursor_wire_format() {
        assert_eq!(
            Query::cursor_after("doc_9").to_wire(),
            r#"{"method":"cursorAfter","values":["doc_9"]}"#
        );
        assert_eq!(
            Query::cursor_before("doc_2").to_wire(),
            r#"{"method":"cursorBefore","values":["doc_2"]}"#
        );
    }

    #[test]
    fn test_to_params_repeats_key() {
        let params = to_params(&[Query::limit(8), Query::order_asc(CREATED_AT_ATTR)]);
        assert_eq!(params.len(), 2);
        assert!(params.iter().all(|(k, _)| *k == "queries[]"));
    }
}
