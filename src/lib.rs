// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! buyhigh - BuyHigh.io client library
//!
//! Buy high, sell low, automate the regret.
//!
//! This crate is the client-side companion to the BuyHigh.io backend: it
//! owns the authenticated session (sign-in, sign-out, restore across runs)
//! and the API plumbing every other call rides on.
//!
//! # Core Modules
//!
//! - [`session`] - Session manager: restore/login/logout lifecycle
//! - [`api`] - Backend REST client and credential injection
//! - [`store`] - Persisted credential storage under `~/.buyhigh`
//! - [`token`] - Best-effort credential payload decoding (display only)
//! - [`types`] - Canonical shared types

pub mod api;
pub mod session;
pub mod store;
pub mod token;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use api::{ApiClient, ApiError, GoogleLoginResponse, IdValue, LoginResponse};
pub use session::{Session, SessionManager};
pub use store::CredentialStore;
pub use token::{decode_claims, email_from_token, Claims};
pub use types::AuthUser;
pub use utils::mask_credential;
