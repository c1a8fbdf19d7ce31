// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Session manager.
//!
//! Owns the authenticated-user state, persists and restores it across
//! process runs, and mediates between the credential store, the backend
//! auth endpoints and the rest of the application. Callers observe the
//! session only through [`SessionManager::session`], and every operation
//! leaves it in exactly one of two shapes: fully authenticated (a user,
//! optionally a credential) or fully logged out (neither). Failures never
//! escape the login operations — they resolve to `false` plus a cleared
//! session.
//!
//! # Example
//!
//! ```no_run
//! use buyhigh::session::SessionManager;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut manager = SessionManager::new()?;
//! manager.restore();
//!
//! if !manager.session().is_authenticated() {
//!     let ok = manager.login("trader@buyhigh.io", "hunter2").await;
//!     println!("signed in: {}", ok);
//! }
//! # Ok(())
//! # }
//! ```

use crate::api::{ApiClient, GoogleLoginResponse, LoginResponse};
use crate::store::CredentialStore;
use crate::token;
use crate::types::AuthUser;
use crate::utils::mask_credential;
use anyhow::Result;

/// In-memory session state exposed to the rest of the application.
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Identity of the signed-in user, if any.
    pub user: Option<AuthUser>,
    /// Bearer credential for subsequent API calls. May be absent while
    /// authenticated: some backend flows confirm success without issuing
    /// a token.
    pub credential: Option<String>,
    /// True while an authentication operation is in flight.
    pub loading: bool,
}

impl Session {
    /// True iff a user identity is held.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Mediates between persisted storage, the backend auth API and the rest of
/// the application.
///
/// Operations take `&mut self`, so the compiler enforces the
/// one-operation-in-flight contract the manager's API assumes.
pub struct SessionManager {
    client: ApiClient,
    store: CredentialStore,
    session: Session,
}

impl SessionManager {
    /// Create a manager with the default backend endpoint and store
    /// location.
    pub fn new() -> Result<Self> {
        Ok(Self::with_parts(ApiClient::new(), CredentialStore::new()?))
    }

    /// Create a manager from explicit parts.
    pub fn with_parts(client: ApiClient, store: CredentialStore) -> Self {
        Self {
            client,
            store,
            session: Session::default(),
        }
    }

    /// Current session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The API client carrying the current credential. Other subsystems
    /// compose their backend calls through this so credential attachment
    /// stays in one place.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Restore a persisted session. Called once at startup.
    ///
    /// A session is restored only when both entries are present and the
    /// user entry parses; a corrupt entry fails safe by clearing both.
    /// Never surfaces an error to the caller.
    pub fn restore(&mut self) {
        self.session.loading = true;

        let loaded = self.load_persisted();
        match loaded {
            Ok(Some((user, credential))) => {
                tracing::info!(
                    "SESSION_RESTORED | user={} token={}",
                    user.id,
                    mask_credential(&credential)
                );
                self.client.set_credential(credential.clone());
                self.session = Session {
                    user: Some(user),
                    credential: Some(credential),
                    loading: false,
                };
            }
            Ok(None) => {
                tracing::debug!("SESSION_RESTORE_EMPTY");
                self.session = Session::default();
            }
            Err(e) => {
                tracing::warn!("SESSION_RESTORE_FAILED | error={:#}", e);
                if let Err(e) = self.store.clear() {
                    tracing::warn!("SESSION_RESTORE_CLEANUP_FAILED | error={:#}", e);
                }
                self.session = Session::default();
            }
        }
    }

    fn load_persisted(&self) -> Result<Option<(AuthUser, String)>> {
        let Some(user) = self.store.load_user()? else {
            return Ok(None);
        };
        let Some(credential) = self.store.load_token()? else {
            // Partial persisted state is a valid logged-out representation;
            // leave it in place.
            return Ok(None);
        };
        Ok(Some((user, credential)))
    }

    /// Sign in with email/password credentials.
    ///
    /// Returns `true` on success. Every failure — explicit rejection,
    /// transport error, malformed response — resolves to `false` with the
    /// session and persisted state fully cleared.
    pub async fn login(&mut self, email: &str, password: &str) -> bool {
        self.session.loading = true;

        let outcome = match self.client.login(email, password).await {
            Ok(resp) if resp.success => {
                let user = user_from_login(&resp, email);
                self.complete_login(user, resp.id_token)
            }
            Ok(resp) => {
                tracing::info!(
                    "LOGIN_REJECTED | email={} message={:?}",
                    email,
                    resp.message
                );
                self.reset_to_logged_out();
                false
            }
            Err(e) => {
                tracing::warn!("LOGIN_FAILED | email={} error={:#}", email, e);
                self.reset_to_logged_out();
                false
            }
        };

        self.session.loading = false;
        outcome
    }

    /// Sign in by exchanging a Google-issued identity token for a backend
    /// session credential.
    ///
    /// The token's signature is not verified client-side; the backend is
    /// the sole verifier. Same contract as [`login`](Self::login).
    pub async fn login_with_google(&mut self, id_token: &str) -> bool {
        self.session.loading = true;

        let outcome = match self.client.google_login(id_token).await {
            Ok(resp) if resp.success => {
                let user = user_from_google(&resp);
                self.complete_login(user, resp.id_token)
            }
            Ok(_) => {
                tracing::info!("GOOGLE_LOGIN_REJECTED");
                self.reset_to_logged_out();
                false
            }
            Err(e) => {
                tracing::warn!("GOOGLE_LOGIN_FAILED | error={:#}", e);
                self.reset_to_logged_out();
                false
            }
        };

        self.session.loading = false;
        outcome
    }

    /// Sign out.
    ///
    /// The remote call is advisory: local cleanup proceeds whether or not
    /// the backend could be reached. Idempotent.
    pub async fn logout(&mut self) {
        self.session.loading = true;

        if let Err(e) = self.client.logout().await {
            tracing::warn!("LOGOUT_REMOTE_FAILED | error={:#}", e);
        }

        self.reset_to_logged_out();
        self.session.loading = false;
        tracing::info!("LOGOUT | state=unauthenticated");
    }

    /// Persist and adopt a successful login.
    ///
    /// Reaches the authenticated terminal shape, or — if persistence
    /// fails — falls back to the logged-out one. Never leaves a mix of
    /// old and new state behind.
    fn complete_login(&mut self, user: AuthUser, credential: Option<String>) -> bool {
        let persisted = self.store.save_user(&user).and_then(|()| {
            match credential.as_deref() {
                Some(token) => self.store.save_token(token),
                // Degraded success: the backend confirmed the login but
                // issued no token. A credential from a previous session
                // must not outlive it.
                None => self.store.clear_token(),
            }
        });

        if let Err(e) = persisted {
            tracing::warn!("LOGIN_PERSIST_FAILED | error={:#}", e);
            self.reset_to_logged_out();
            return false;
        }

        match credential.as_deref() {
            Some(token) => {
                self.client.set_credential(token);
                tracing::info!(
                    "LOGIN_SUCCESS | user={} token={}",
                    user.id,
                    mask_credential(token)
                );
            }
            None => {
                self.client.clear_credential();
                tracing::info!("LOGIN_SUCCESS_NO_TOKEN | user={}", user.id);
            }
        }

        self.session.user = Some(user);
        self.session.credential = credential;
        true
    }

    /// Return to the logged-out terminal shape: persisted entries removed,
    /// credential detached, in-memory session cleared.
    fn reset_to_logged_out(&mut self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!("SESSION_CLEANUP_FAILED | error={:#}", e);
        }
        self.client.clear_credential();
        self.session.user = None;
        self.session.credential = None;
    }
}

/// Build the identity record for a plain login response.
///
/// The credential payload wins over the typed email when it decodes; a
/// payload that fails to decode falls back to the input email and never
/// aborts the login.
fn user_from_login(resp: &LoginResponse, fallback_email: &str) -> AuthUser {
    let email = resp
        .id_token
        .as_deref()
        .and_then(token::email_from_token)
        .unwrap_or_else(|| fallback_email.to_string());

    AuthUser {
        id: resp
            .user_id
            .clone()
            .map(|id| id.into_string())
            .unwrap_or_default(),
        firebase_uid: resp.firebase_uid.clone(),
        email,
    }
}

/// Build the identity record for a federated login response. The backend
/// already validated the token, so its email is taken as-is.
fn user_from_google(resp: &GoogleLoginResponse) -> AuthUser {
    AuthUser {
        id: resp
            .user_id
            .clone()
            .map(|id| id.into_string())
            .unwrap_or_default(),
        firebase_uid: resp.firebase_uid.clone(),
        email: resp.email.clone().unwrap_or_default(),
    }
}
