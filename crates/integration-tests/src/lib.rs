//! Integration tests for Souk.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the admin app against a test backend project
//! cargo run -p souk-admin
//!
//! # Run integration tests against it
//! SOUK_LIVE_TESTS=1 cargo test -p souk-integration-tests
//! ```
//!
//! The tests in `tests/` drive a running admin instance over HTTP with a
//! cookie-holding client. They are skipped unless `SOUK_LIVE_TESTS` is
//! set, so `cargo test` stays green without a server.

/// Base URL for the admin app (configurable via environment).
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Whether live-server tests are enabled.
#[must_use]
pub fn live_tests_enabled() -> bool {
    std::env::var("SOUK_LIVE_TESTS").is_ok()
}

/// Create an HTTP client that holds session cookies like a browser.
///
/// # Panics
///
/// Panics if the client cannot be constructed (test-only code).
#[must_use]
pub fn browser_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}
