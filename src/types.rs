// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Canonical types used across the BuyHigh client.
//!
//! This module provides unified type definitions to avoid duplication.

use serde::{Deserialize, Serialize};

/// Identity record surfaced by the backend at login time.
///
/// This is exactly the shape persisted under the `user` storage entry, so
/// adding a required field here invalidates sessions saved by older builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Backend user id.
    pub id: String,
    /// Firebase UID, when the backend account is linked to one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firebase_uid: Option<String>,
    /// Email shown to the user. Best-effort: may come from the credential
    /// payload rather than the backend record.
    pub email: String,
}

impl AuthUser {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            firebase_uid: None,
            email: email.into(),
        }
    }

    pub fn with_firebase_uid(mut self, uid: impl Into<String>) -> Self {
        self.firebase_uid = Some(uid.into());
        self
    }
}
