// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Integration tests for the session lifecycle
//!
//! The tests in the first section run self-contained: they point the client
//! at an unroutable loopback port so every network call fails fast, and
//! exercise the failure discipline and persistence across manager restarts.
//!
//! The live-backend tests at the bottom are marked with #[ignore] so they
//! don't run in CI without a backend running.
//!
//! To run those:
//! 1. Start a backend (or set BUYHIGH_API_URL to a staging instance)
//! 2. Run tests with: cargo test --test session_flow -- --ignored

use buyhigh::api::ApiClient;
use buyhigh::store::CredentialStore;
use buyhigh::types::AuthUser;
use buyhigh::SessionManager;

/// Nothing listens on the discard port.
const UNREACHABLE: &str = "http://127.0.0.1:9";

fn manager_at(dir: &std::path::Path) -> SessionManager {
    SessionManager::with_parts(
        ApiClient::with_base_url(UNREACHABLE),
        CredentialStore::with_dir(dir).expect("store"),
    )
}

// =============================================================================
// Persistence Across Restarts
// =============================================================================

#[test]
fn session_survives_a_manager_restart() {
    let dir = tempfile::tempdir().unwrap();

    let store = CredentialStore::with_dir(dir.path()).unwrap();
    store
        .save_user(&AuthUser::new("42", "trader@buyhigh.io"))
        .unwrap();
    store.save_token("tok-live").unwrap();

    // First run
    let mut first = manager_at(dir.path());
    first.restore();
    assert!(first.session().is_authenticated());
    drop(first);

    // Second run against the same store
    let mut second = manager_at(dir.path());
    second.restore();
    assert!(second.session().is_authenticated());
    assert_eq!(second.session().credential.as_deref(), Some("tok-live"));
    assert_eq!(second.client().credential(), Some("tok-live"));
}

#[test]
fn corrupt_persisted_user_fails_safe_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("user.json"), "not json at all").unwrap();
    std::fs::write(dir.path().join("authToken"), "tok").unwrap();

    let mut mgr = manager_at(dir.path());
    mgr.restore();
    assert!(!mgr.session().is_authenticated());

    // The corrupt entries were discarded, so the next run starts clean
    let mut next = manager_at(dir.path());
    next.restore();
    assert!(!next.session().is_authenticated());
    let store = CredentialStore::with_dir(dir.path()).unwrap();
    assert!(store.load_token().unwrap().is_none());
}

// =============================================================================
// Failure Discipline
// =============================================================================

#[tokio::test]
async fn unreachable_backend_login_returns_false_and_clears_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut mgr = manager_at(dir.path());
    mgr.restore();

    let ok = mgr.login("a@b.com", "pw").await;

    assert!(!ok);
    assert!(!mgr.session().is_authenticated());
    assert!(mgr.session().credential.is_none());
    assert!(!mgr.session().loading);

    let store = CredentialStore::with_dir(dir.path()).unwrap();
    assert!(store.load_user().unwrap().is_none());
    assert!(store.load_token().unwrap().is_none());
}

#[tokio::test]
async fn failed_relogin_tears_down_an_authenticated_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::with_dir(dir.path()).unwrap();
    store.save_user(&AuthUser::new("42", "a@b.com")).unwrap();
    store.save_token("tok-old").unwrap();

    let mut mgr = manager_at(dir.path());
    mgr.restore();
    assert!(mgr.session().is_authenticated());

    // Re-authenticating against a dead backend must not leave the old
    // session half-alive
    let ok = mgr.login("a@b.com", "new-pw").await;
    assert!(!ok);
    assert!(!mgr.session().is_authenticated());
    assert!(mgr.client().credential().is_none());
    assert!(store.load_user().unwrap().is_none());
    assert!(store.load_token().unwrap().is_none());
}

#[tokio::test]
async fn logout_is_idempotent_even_when_the_backend_is_down() {
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::with_dir(dir.path()).unwrap();
    store.save_user(&AuthUser::new("42", "a@b.com")).unwrap();
    store.save_token("tok").unwrap();

    let mut mgr = manager_at(dir.path());
    mgr.restore();

    mgr.logout().await;
    assert!(!mgr.session().is_authenticated());
    assert!(mgr.session().credential.is_none());
    assert!(store.load_user().unwrap().is_none());

    mgr.logout().await;
    assert!(!mgr.session().is_authenticated());
    assert!(mgr.session().credential.is_none());
    assert!(!mgr.session().loading);
}

// =============================================================================
// Live Backend Tests
// =============================================================================

fn live_manager(dir: &std::path::Path) -> SessionManager {
    let base_url = std::env::var("BUYHIGH_API_URL")
        .unwrap_or_else(|_| "http://localhost:9876".to_string());
    SessionManager::with_parts(
        ApiClient::with_base_url(base_url),
        CredentialStore::with_dir(dir).expect("store"),
    )
}

#[tokio::test]
#[ignore]
async fn live_login_with_bogus_credentials_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut mgr = live_manager(dir.path());
    mgr.restore();

    let ok = mgr
        .login("definitely-not-a-user@buyhigh.io", "wrong-password")
        .await;

    assert!(!ok);
    assert!(!mgr.session().is_authenticated());
}

#[tokio::test]
#[ignore]
async fn live_login_and_logout_round_trip() {
    let email = std::env::var("BUYHIGH_TEST_EMAIL").expect("BUYHIGH_TEST_EMAIL not set");
    let password = std::env::var("BUYHIGH_TEST_PASSWORD").expect("BUYHIGH_TEST_PASSWORD not set");

    let dir = tempfile::tempdir().unwrap();
    let mut mgr = live_manager(dir.path());
    mgr.restore();

    let ok = mgr.login(&email, &password).await;
    assert!(ok);
    assert!(mgr.session().is_authenticated());

    mgr.logout().await;
    assert!(!mgr.session().is_authenticated());
}
