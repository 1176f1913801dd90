//! Integration tests for the product table.
//!
//! These tests require a running admin instance with a signed-up operator
//! (see `souk account create`) whose credentials are provided via
//! `SOUK_TEST_EMAIL` / `SOUK_TEST_PASSWORD`.
//!
//! Run with: SOUK_LIVE_TESTS=1 cargo test -p souk-integration-tests

use reqwest::{Client, StatusCode};

use souk_integration_tests::{admin_base_url, browser_client, live_tests_enabled};

fn test_credentials() -> Option<(String, String)> {
    let email = std::env::var("SOUK_TEST_EMAIL").ok()?;
    let password = std::env::var("SOUK_TEST_PASSWORD").ok()?;
    Some((email, password))
}

/// Sign the test operator in; returns the cookie-holding client.
async fn signed_in_client() -> Option<Client> {
    let (email, password) = test_credentials()?;
    let client = browser_client();

    let resp = client
        .post(format!("{}/auth/login", admin_base_url()))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("login request failed");

    assert!(resp.status().is_redirection(), "login should redirect");

    // A successful login establishes the app session cookie
    let has_session_cookie = resp
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(souk_admin::middleware::session::SESSION_COOKIE_NAME));
    assert!(has_session_cookie, "login should set the session cookie");

    Some(client)
}

#[tokio::test]
async fn test_products_page_requires_auth() {
    if !live_tests_enabled() {
        return;
    }

    let resp = browser_client()
        .get(format!("{}/products", admin_base_url()))
        .send()
        .await
        .expect("products request failed");

    assert!(resp.status().is_redirection());
}

#[tokio::test]
async fn test_products_page_renders_table() {
    if !live_tests_enabled() {
        return;
    }
    let Some(client) = signed_in_client().await else {
        return;
    };

    let resp = client
        .get(format!("{}/products", admin_base_url()))
        .send()
        .await
        .expect("products request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Products"));
    // Category cells carry resolved names, never raw document ids
    assert!(!body.contains("category_id"));
}

#[tokio::test]
async fn test_sign_out_drops_the_session() {
    if !live_tests_enabled() {
        return;
    }
    let Some(client) = signed_in_client().await else {
        return;
    };

    let resp = client
        .post(format!("{}/auth/logout", admin_base_url()))
        .send()
        .await
        .expect("logout request failed");
    assert!(resp.status().is_redirection());

    // The session (and its cached avatar) is gone: back to the login page
    let dashboard = client
        .get(format!("{}/", admin_base_url()))
        .send()
        .await
        .expect("dashboard request failed");
    assert!(dashboard.status().is_redirection());
}

#[tokio::test]
async fn test_category_form_rejects_empty_name() {
    if !live_tests_enabled() {
        return;
    }
    let Some(client) = signed_in_client().await else {
        return;
    };

    let resp = client
        .post(format!("{}/categories/new", admin_base_url()))
        .form(&[("name", "   ")])
        .send()
        .await
        .expect("category request failed");

    // Re-rendered form, not a redirect to the created page
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Category name is required"));
}
