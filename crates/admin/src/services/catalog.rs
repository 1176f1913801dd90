//! Paginated catalog fetch.
//!
//! Pages through the product collection with cursor-bounded list queries
//! (fixed page size, ascending creation time) and annotates every row with
//! its resolved category name, falling back to `"Unknown"` for dangling
//! references. The category id to name map is cached briefly and
//! invalidated when a category is created.
//!
//! Overlap policy: fetches pass through a sequence gate. A fetch arriving
//! while one is outstanding is dropped without touching the backend, and a
//! completion that is no longer the latest issued sequence is discarded,
//! so a stale response can never overwrite fresher state. Failures and
//! empty pages leave the previous snapshot in place.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use tokio::sync::RwLock;

use souk_core::{CategoryId, ProductId};

use crate::backend::types::{CategoryDoc, ProductDoc};
use crate::backend::{BackendClient, BackendError, CREATED_AT_ATTR, Query};

/// Fixed page size of the product table.
pub const PAGE_SIZE: u32 = 8;

/// Category annotation for products whose reference does not resolve.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Upper bound on categories fetched for the lookup map.
const CATEGORY_LIST_LIMIT: u32 = 100;

/// How long the category map may be served from cache.
const CATEGORY_CACHE_TTL: Duration = Duration::from_secs(60);

/// Which page to fetch relative to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// First page, no cursor.
    #[default]
    Initial,
    /// The page after the cursor.
    After,
    /// The page before the cursor.
    Before,
}

/// A product row as shown in the table, with its category resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub id: ProductId,
    pub name: String,
    /// Resolved category name, or [`UNKNOWN_CATEGORY`].
    pub category: String,
    pub brand: String,
    pub color: String,
    pub storage: Option<u32>,
    /// Display-formatted price.
    pub price: String,
    pub stock: u32,
    /// First image of the listing, if any.
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// The most recently applied page and its boundary cursors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSnapshot {
    pub rows: Vec<ProductRow>,
    /// Cursor for the previous page: the first row of this page.
    pub prev_cursor: Option<ProductId>,
    /// Cursor for the next page: the last row of this page.
    pub next_cursor: Option<ProductId>,
}

/// Sequence gate for overlapping fetches.
///
/// `begin` refuses to issue a new sequence while one is outstanding;
/// `complete` reports whether the finished sequence is still the latest
/// issued one, so stale completions can be discarded deterministically.
#[derive(Debug, Default)]
struct FetchGate {
    issued: AtomicU64,
    applied: AtomicU64,
}

/// Proof that a fetch sequence was issued.
#[derive(Debug, Clone, Copy)]
struct FetchTicket(u64);

impl FetchGate {
    /// Try to start a fetch. Returns `None` while another is outstanding.
    fn begin(&self) -> Option<FetchTicket> {
        let issued = self.issued.load(Ordering::Acquire);
        if issued != self.applied.load(Ordering::Acquire) {
            return None;
        }
        match self
            .issued
            .compare_exchange(issued, issued + 1, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Some(FetchTicket(issued + 1)),
            Err(_) => None,
        }
    }

    /// Mark a fetch finished. Returns whether it is still the latest
    /// issued sequence (stale completions get `false`).
    fn complete(&self, ticket: FetchTicket) -> bool {
        self.applied.fetch_max(ticket.0, Ordering::AcqRel);
        ticket.0 == self.issued.load(Ordering::Acquire)
    }
}

/// Paginated product table service.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    backend: BackendClient,
    categories: Cache<(), Arc<HashMap<CategoryId, String>>>,
    gate: FetchGate,
    last_page: RwLock<PageSnapshot>,
}

impl CatalogService {
    /// Create a new catalog service.
    #[must_use]
    pub fn new(backend: BackendClient) -> Self {
        let categories = Cache::builder()
            .max_capacity(1)
            .time_to_live(CATEGORY_CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner {
                backend,
                categories,
                gate: FetchGate::default(),
                last_page: RwLock::new(PageSnapshot::default()),
            }),
        }
    }

    /// The most recently applied page.
    pub async fn snapshot(&self) -> PageSnapshot {
        self.inner.last_page.read().await.clone()
    }

    /// Fetch a page of products relative to `cursor`.
    ///
    /// Infallible by contract: overlapping calls, backend failures, and
    /// empty pages all return the previous snapshot (failures are logged).
    pub async fn fetch_page(&self, cursor: Option<&str>, direction: Direction) -> PageSnapshot {
        let Some(ticket) = self.inner.gate.begin() else {
            tracing::debug!("product fetch already in flight, dropping request");
            return self.snapshot().await;
        };

        let result = self.load_page(cursor, direction).await;
        let is_latest = self.inner.gate.complete(ticket);

        match result {
            Ok(rows) if rows.is_empty() => {
                // Walked past the boundary: keep the page we have
                self.snapshot().await
            }
            Ok(rows) => {
                if !is_latest {
                    tracing::debug!("discarding stale product fetch");
                    return self.snapshot().await;
                }
                let (prev_cursor, next_cursor) = page_cursors(&rows);
                let page = PageSnapshot {
                    rows,
                    prev_cursor,
                    next_cursor,
                };
                *self.inner.last_page.write().await = page.clone();
                page
            }
            Err(e) => {
                tracing::error!("fetch products failed: {e}");
                self.snapshot().await
            }
        }
    }

    async fn load_page(
        &self,
        cursor: Option<&str>,
        direction: Direction,
    ) -> Result<Vec<ProductRow>, BackendError> {
        let mut queries = vec![Query::limit(PAGE_SIZE), Query::order_asc(CREATED_AT_ATTR)];
        if let Some(id) = cursor {
            match direction {
                Direction::After => queries.push(Query::cursor_after(id)),
                Direction::Before => queries.push(Query::cursor_before(id)),
                Direction::Initial => {}
            }
        }

        let list = self.inner.backend.list_products(&queries).await?;
        if list.documents.is_empty() {
            return Ok(vec![]);
        }

        let categories = self.category_map().await?;
        Ok(annotate(list.documents, &categories))
    }

    /// The cached category id to name map.
    async fn category_map(&self) -> Result<Arc<HashMap<CategoryId, String>>, BackendError> {
        let backend = self.inner.backend.clone();
        self.inner
            .categories
            .try_get_with((), async move {
                let list = backend
                    .list_categories(&[
                        Query::limit(CATEGORY_LIST_LIMIT),
                        Query::order_asc(CREATED_AT_ATTR),
                    ])
                    .await?;
                let map: HashMap<CategoryId, String> = list
                    .documents
                    .into_iter()
                    .map(|c| (c.id, c.name))
                    .collect();
                Ok(Arc::new(map))
            })
            .await
            .map_err(|e: Arc<BackendError>| {
                // The cache wraps loader errors in an Arc; unwrap to a
                // plain error for callers
                Arc::try_unwrap(e).unwrap_or_else(|shared| BackendError::Api {
                    status: 502,
                    message: shared.to_string(),
                })
            })
    }

    /// Categories for the product form dropdown, sorted by name.
    ///
    /// Failures are logged and yield an empty list, leaving the form
    /// usable (submission will then fail validation on the category
    /// field).
    pub async fn category_options(&self) -> Vec<(CategoryId, String)> {
        match self.category_map().await {
            Ok(map) => {
                let mut options: Vec<(CategoryId, String)> = map
                    .iter()
                    .map(|(id, name)| (id.clone(), name.clone()))
                    .collect();
                options.sort_by(|a, b| a.1.cmp(&b.1));
                options
            }
            Err(e) => {
                tracing::error!("fetch categories failed: {e}");
                Vec::new()
            }
        }
    }

    /// Full category documents for the categories index, in creation
    /// order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails (the index page has
    /// no previous state to fall back on).
    pub async fn categories_index(&self) -> Result<Vec<CategoryDoc>, BackendError> {
        let list = self
            .inner
            .backend
            .list_categories(&[
                Query::limit(CATEGORY_LIST_LIMIT),
                Query::order_asc(CREATED_AT_ATTR),
            ])
            .await?;

        Ok(list.documents)
    }

    /// Drop the cached category map (called after a category is created).
    pub async fn invalidate_categories(&self) {
        self.inner.categories.invalidate(&()).await;
    }
}

/// Annotate product documents with resolved category names.
fn annotate(documents: Vec<ProductDoc>, categories: &HashMap<CategoryId, String>) -> Vec<ProductRow> {
    documents
        .into_iter()
        .map(|doc| ProductRow {
            category: categories
                .get(&doc.category_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            image_url: doc.images.first().cloned(),
            id: doc.id,
            name: doc.name,
            brand: doc.brand,
            color: doc.color,
            storage: doc.storage,
            price: doc.price.display(),
            stock: doc.stock,
            created_at: doc.created_at,
        })
        .collect()
}

/// Boundary cursors of a page: first row backward, last row forward.
fn page_cursors(rows: &[ProductRow]) -> (Option<ProductId>, Option<ProductId>) {
    (
        rows.first().map(|r| r.id.clone()),
        rows.last().map(|r| r.id.clone()),
    )
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use souk_core::{AccountId, Price};

    use super::*;

    fn product(id: &str, category_id: &str, minute: u32) -> ProductDoc {
        ProductDoc {
            id: ProductId::new(id),
            created_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, minute, 0).unwrap(),
            name: format!("product {id}"),
            category_id: CategoryId::new(category_id),
            brand: "Souk".to_string(),
            storage: None,
            color: "black".to_string(),
            images: vec![format!("https://files.example/{id}/preview")],
            description: "test".to_string(),
            stock: 1,
            price: Price::parse("10.00").expect("valid price"),
            seller_id: AccountId::new("acct_1"),
        }
    }

    #[test]
    fn test_annotate_resolves_known_categories() {
        let mut categories = HashMap::new();
        categories.insert(CategoryId::new("cat_1"), "Phones".to_string());

        let rows = annotate(vec![product("doc_1", "cat_1", 0)], &categories);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.first().map(|r| r.category.as_str()), Some("Phones"));
    }

    #[test]
    fn test_annotate_unknown_category_never_raw_id() {
        let categories = HashMap::new();

        let rows = annotate(vec![product("doc_1", "cat_missing", 0)], &categories);
        let category = rows.first().map(|r| r.category.clone()).unwrap_or_default();
        assert_eq!(category, UNKNOWN_CATEGORY);
        assert_ne!(category, "cat_missing");
    }

    #[test]
    fn test_annotate_picks_first_image() {
        let mut doc = product("doc_1", "cat_1", 0);
        doc.images = vec!["first".to_string(), "second".to_string()];

        let rows = annotate(vec![doc], &HashMap::new());
        assert_eq!(
            rows.first().and_then(|r| r.image_url.clone()),
            Some("first".to_string())
        );
    }

    #[test]
    fn test_page_cursors_from_boundary_rows() {
        let rows = annotate(
            vec![
                product("doc_1", "cat_1", 0),
                product("doc_2", "cat_1", 1),
                product("doc_3", "cat_1", 2),
            ],
            &HashMap::new(),
        );

        let (prev, next) = page_cursors(&rows);
        assert_eq!(prev, Some(ProductId::new("doc_1")));
        assert_eq!(next, Some(ProductId::new("doc_3")));
    }

    #[test]
    fn test_page_cursors_empty() {
        let (prev, next) = page_cursors(&[]);
        assert!(prev.is_none());
        assert!(next.is_none());
    }

    #[test]
    fn test_gate_drops_overlapping_begin() {
        let gate = FetchGate::default();

        let first = gate.begin().expect("first fetch starts");
        // A second fetch while the first is outstanding must not start
        assert!(gate.begin().is_none());

        assert!(gate.complete(first));
        // Once applied, the next fetch may start
        assert!(gate.begin().is_some());
    }

    #[test]
    fn test_gate_discards_stale_completion() {
        let gate = FetchGate::default();

        let first = gate.begin().expect("first fetch starts");
        assert!(gate.complete(first));

        let second = gate.begin().expect("second fetch starts");
        // Completing the old ticket again reports stale
        assert!(!gate.complete(first));
        // The newer ticket is still the latest
        assert!(gate.complete(second));
    }
}
