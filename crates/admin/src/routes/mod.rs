//! HTTP route handlers for the admin app.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Dashboard (welcome banner once per session)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (pings the backend)
//!
//! # Products
//! GET  /products               - Paginated product table
//! GET  /products/new           - New product form
//! POST /products/new           - Create product (multipart, 1-6 images)
//!
//! # Categories
//! GET  /categories             - Category list
//! GET  /categories/new         - New category form
//! POST /categories/new         - Create category
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action (credentials provider)
//! GET  /auth/signup            - Sign-up page
//! POST /auth/signup            - Sign-up action
//! POST /auth/logout            - Logout action
//!
//! # OAuth provider (when AUTH_PROVIDER=oauth)
//! GET  /auth/oauth/login       - Redirect to the identity provider
//! GET  /auth/oauth/callback    - Handle the OAuth callback
//! ```

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod oauth;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
        // OAuth identity provider
        .route("/oauth/login", get(oauth::login))
        .route("/oauth/callback", get(oauth::callback))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/new", get(products::new_page).post(products::create))
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index))
        .route("/new", get(categories::new_page).post(categories::create))
}

/// Create all routes for the admin app.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Dashboard
        .route("/", get(dashboard::home))
        // Product routes
        .nest("/products", product_routes())
        // Category routes
        .nest("/categories", category_routes())
        // Auth routes
        .nest("/auth", auth_routes())
}
