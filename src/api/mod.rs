// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! BuyHigh backend API client.
//!
//! Wraps the REST endpoints the session manager consumes and holds the
//! bearer credential that authorizes every other outbound call the
//! application makes.
//!
//! # Example
//!
//! ```no_run
//! use buyhigh::api::ApiClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = ApiClient::new();
//! let response = client.login("trader@buyhigh.io", "hunter2").await?;
//! println!("success: {}", response.success);
//! # Ok(())
//! # }
//! ```

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Default backend endpoint.
const DEFAULT_API_URL: &str = "https://api.buyhigh.io";

/// Default timeout for API requests (in seconds).
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Error types specific to backend API operations.
#[derive(Debug, Clone)]
pub enum ApiError {
    /// Backend rejected the credentials.
    AuthRejected(String),
    /// Backend returned an unexpected status or body.
    ApiError(String),
    /// Network error.
    NetworkError(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthRejected(msg) => {
                write!(
                    f,
                    "[✗] Sign-in rejected\n\n{}\n\nPossible causes:\n  - Wrong email or password\n  - Account not registered yet\n  - Google sign-in token expired\n\nTry these fixes:\n  1. Check the email address spelling\n  2. Reset your password at https://buyhigh.io/forgot-password\n  3. For Google sign-in, request a fresh token and retry",
                    msg
                )
            }
            Self::ApiError(msg) => {
                write!(
                    f,
                    "[✗] BuyHigh API error\n\n{}\n\nPossible causes:\n  - Backend temporarily down\n  - Invalid request format\n  - Account issue\n\nTry these fixes:\n  1. Wait a moment and retry\n  2. Check https://status.buyhigh.io\n  3. Verify your account at https://buyhigh.io/profile",
                    msg
                )
            }
            Self::NetworkError(msg) => {
                write!(
                    f,
                    "[✗] Network error\n\n{}\n\nPossible causes:\n  - No internet connection\n  - DNS resolution failure\n  - Firewall blocking HTTPS\n\nTry these fixes:\n  1. Check internet connection\n  2. Verify DNS: ping api.buyhigh.io\n  3. Disable VPN temporarily",
                    msg
                )
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// `userId` arrives as a JSON number from some backend flows and a string
/// from others; both are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Num(i64),
    Text(String),
}

impl IdValue {
    pub fn into_string(self) -> String {
        match self {
            Self::Num(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

/// Response from `POST /login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, rename = "userId")]
    pub user_id: Option<IdValue>,
    #[serde(default)]
    pub firebase_uid: Option<String>,
    /// Bearer credential. Some backend flows confirm success without one.
    #[serde(default)]
    pub id_token: Option<String>,
    /// Human-readable rejection reason, when the backend supplies one.
    #[serde(default)]
    pub message: Option<String>,
}

/// Response from `POST /auth/google-login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleLoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, rename = "userId")]
    pub user_id: Option<IdValue>,
    #[serde(default)]
    pub firebase_uid: Option<String>,
    /// Email as validated by the backend against the federated token.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Client for communicating with the BuyHigh backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL for the backend API.
    base_url: String,
    /// HTTP client with configured timeouts.
    client: reqwest::Client,
    /// Bearer credential attached to authorized requests.
    credential: Option<String>,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Create a new client.
    ///
    /// Reads the backend endpoint from the `BUYHIGH_API_URL` environment
    /// variable, falling back to the production URL.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built. This should only happen if
    /// the system's TLS/SSL stack is fundamentally broken, which is
    /// acceptable for initialization code.
    pub fn new() -> Self {
        let base_url =
            std::env::var("BUYHIGH_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::with_base_url(base_url)
    }

    /// Create a new client against a specific backend endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client. This indicates a critical system configuration issue (TLS/SSL failure).");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            credential: None,
        }
    }

    /// Attach a bearer credential to all subsequent authorized requests.
    pub fn set_credential(&mut self, credential: impl Into<String>) {
        self.credential = Some(credential.into());
    }

    /// Detach the bearer credential.
    pub fn clear_credential(&mut self) {
        self.credential = None;
    }

    /// The currently attached credential, if any.
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    /// Build a request against the backend with the current credential
    /// attached as `Authorization: Bearer <credential>` when one is held.
    ///
    /// Every outbound call the application makes — not just the auth
    /// endpoints — should go through here so credential attachment stays in
    /// one place.
    pub fn authorized(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.request(method, url);
        if let Some(ref credential) = self.credential {
            request = request.header("Authorization", format!("Bearer {}", credential));
        }
        request
    }

    /// `POST /login` with email/password credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .authorized(reqwest::Method::POST, "/login")
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            // The rejection body still carries `success: false` and a
            // message; surface it as a typed rejection.
            let message = response
                .json::<LoginResponse>()
                .await
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_else(|| "Invalid email or password.".to_string());
            return Err(anyhow!(ApiError::AuthRejected(message)));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!(ApiError::ApiError(format!(
                "Login failed: HTTP {} - {}",
                status, text
            ))));
        }

        response
            .json::<LoginResponse>()
            .await
            .context("Failed to parse login response")
    }

    /// `POST /auth/google-login`, exchanging a federated identity token for
    /// the backend's own session credential.
    ///
    /// The `id_token` is treated as an opaque string: the backend is the
    /// sole verifier of its signature.
    pub async fn google_login(&self, id_token: &str) -> Result<GoogleLoginResponse> {
        let body = serde_json::json!({
            "idToken": id_token,
        });

        let response = self
            .authorized(reqwest::Method::POST, "/auth/google-login")
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(anyhow!(ApiError::AuthRejected(
                "Google sign-in token was rejected by the backend.".to_string()
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!(ApiError::ApiError(format!(
                "Google sign-in failed: HTTP {} - {}",
                status, text
            ))));
        }

        response
            .json::<GoogleLoginResponse>()
            .await
            .context("Failed to parse google-login response")
    }

    /// `POST /logout`.
    ///
    /// The response body is ignored; callers only care whether the backend
    /// was reachable, and even that is advisory — local cleanup proceeds
    /// regardless.
    pub async fn logout(&self) -> Result<()> {
        let response = self
            .authorized(reqwest::Method::POST, "/logout")
            .send()
            .await
            .map_err(classify_transport_error)?;

        if !response.status().is_success() {
            return Err(anyhow!(ApiError::ApiError(format!(
                "Logout failed: HTTP {}",
                response.status()
            ))));
        }
        Ok(())
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn classify_transport_error(e: reqwest::Error) -> anyhow::Error {
    let err = if e.is_timeout() {
        ApiError::NetworkError("Request timed out.".to_string())
    } else if e.is_connect() {
        ApiError::NetworkError(format!("Failed to connect to the BuyHigh backend: {}", e))
    } else {
        ApiError::NetworkError(format!("Network error: {}", e))
    };
    anyhow!(err)
}
