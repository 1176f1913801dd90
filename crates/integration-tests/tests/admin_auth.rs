//! Integration tests for the auth flow.
//!
//! These tests require:
//! - A running admin instance (cargo run -p souk-admin)
//! - A reachable backend project behind it
//!
//! Run with: SOUK_LIVE_TESTS=1 cargo test -p souk-integration-tests

use reqwest::StatusCode;
use uuid::Uuid;

use souk_integration_tests::{admin_base_url, browser_client, live_tests_enabled};

#[tokio::test]
async fn test_health_endpoint() {
    if !live_tests_enabled() {
        return;
    }

    let resp = browser_client()
        .get(format!("{}/health", admin_base_url()))
        .send()
        .await
        .expect("health request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("body"), "ok");
}

#[tokio::test]
async fn test_dashboard_redirects_anonymous_to_login() {
    if !live_tests_enabled() {
        return;
    }

    let resp = browser_client()
        .get(format!("{}/", admin_base_url()))
        .send()
        .await
        .expect("dashboard request failed");

    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/auth/login");
}

#[tokio::test]
async fn test_login_with_bad_credentials_redirects_with_error() {
    if !live_tests_enabled() {
        return;
    }

    let client = browser_client();
    let email = format!("nobody-{}@example.com", Uuid::new_v4().simple());

    let resp = client
        .post(format!("{}/auth/login", admin_base_url()))
        .form(&[("email", email.as_str()), ("password", "wrong-password")])
        .send()
        .await
        .expect("login request failed");

    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(location, "/auth/login?error=credentials");

    // The failed attempt must not have produced a session
    let dashboard = client
        .get(format!("{}/", admin_base_url()))
        .send()
        .await
        .expect("dashboard request failed");
    assert!(dashboard.status().is_redirection());
}

#[tokio::test]
async fn test_login_page_renders() {
    if !live_tests_enabled() {
        return;
    }

    let resp = browser_client()
        .get(format!("{}/auth/login", admin_base_url()))
        .send()
        .await
        .expect("login page request failed");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("body");
    assert!(body.contains("Sign in"));
}
