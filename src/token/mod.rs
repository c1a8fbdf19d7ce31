// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Best-effort credential payload decoding.
//!
//! The backend issues a three-part signed token; the middle part is a
//! base64url-encoded JSON object carrying identity claims. This module reads
//! that payload for display purposes only. The signature is NOT verified
//! here — verification happens server-side on every request — so nothing
//! decoded from a token may be used for an authorization decision.
//!
//! Every function in this module is total over bad input: a malformed token
//! decodes to `None`, never to an error.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Claims read from the credential payload.
///
/// Only the fields the client displays are listed; unknown claims are
/// ignored on decode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Claims {
    /// Email address the token was issued for.
    pub email: Option<String>,
    /// Subject (user id at the identity provider).
    pub sub: Option<String>,
    /// Expiration time as a unix timestamp.
    pub exp: Option<i64>,
}

impl Claims {
    /// Expiration time as a UTC timestamp, when the `exp` claim is present
    /// and in range.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

/// Decode the payload segment of a three-part signed token.
///
/// Returns `None` if the token does not have a payload segment, the segment
/// is not base64url, or the decoded bytes are not a JSON object.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let payload = token.split('.').nth(1)?;
    // Some issuers pad the segment; the url-safe alphabet never does.
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Extract the email claim from a credential, if it decodes.
pub fn email_from_token(token: &str) -> Option<String> {
    decode_claims(token).and_then(|claims| claims.email)
}
