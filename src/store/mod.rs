// Copyright (c) 2024-2025 Jesse Morgan
// Licensed under the MIT License. See LICENSE file for details.

//! Persisted credential storage.
//!
//! Two entries survive restarts, mirroring the backend's session contract:
//!
//! - `user` — JSON-encoded [`AuthUser`]
//! - `authToken` — the raw credential string
//!
//! Each entry is one file under the store directory. Absence of either file
//! is a valid "logged out" representation; in the degraded partial-login
//! case the `user` file exists without `authToken`. Writes go through a
//! temp file + atomic rename so a crash mid-write cannot leave a torn entry.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::AuthUser;

const USER_FILE: &str = "user.json";
const TOKEN_FILE: &str = "authToken";

/// File-backed key-value store for the persisted session.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    /// Directory holding the two entry files.
    store_dir: PathBuf,
}

impl CredentialStore {
    /// Create a store rooted at `~/.buyhigh`.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Self::with_dir(home.join(".buyhigh"))
    }

    /// Create a store rooted at an explicit directory.
    ///
    /// Used by tests and by callers that sandbox their state.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let store_dir = dir.into();
        if !store_dir.exists() {
            fs::create_dir_all(&store_dir)
                .context("Failed to create credential store directory")?;
        }
        Ok(Self { store_dir })
    }

    fn user_path(&self) -> PathBuf {
        self.store_dir.join(USER_FILE)
    }

    fn token_path(&self) -> PathBuf {
        self.store_dir.join(TOKEN_FILE)
    }

    /// Load the persisted user entry.
    ///
    /// `Ok(None)` means the entry is absent (a valid logged-out state);
    /// `Err` means the entry exists but is unreadable or not a valid
    /// [`AuthUser`] — the caller decides whether to fail safe.
    pub fn load_user(&self) -> Result<Option<AuthUser>> {
        let path = self.user_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).context("Failed to read user entry")?;
        let user: AuthUser =
            serde_json::from_str(&content).context("Failed to parse user entry")?;
        Ok(Some(user))
    }

    /// Persist the user entry.
    pub fn save_user(&self, user: &AuthUser) -> Result<()> {
        let content =
            serde_json::to_string_pretty(user).context("Failed to serialize user entry")?;
        write_atomic(&self.user_path(), content.as_bytes())?;
        tracing::debug!("STORE_WRITE | entry=user id={}", user.id);
        Ok(())
    }

    /// Load the persisted credential, if any.
    pub fn load_token(&self) -> Result<Option<String>> {
        let path = self.token_path();
        if !path.exists() {
            return Ok(None);
        }
        let token = fs::read_to_string(&path).context("Failed to read credential entry")?;
        let token = token.trim_end_matches('\n').to_string();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token))
    }

    /// Persist the raw credential string.
    pub fn save_token(&self, token: &str) -> Result<()> {
        write_atomic(&self.token_path(), token.as_bytes())?;
        tracing::debug!("STORE_WRITE | entry=authToken");
        Ok(())
    }

    /// Remove the persisted user entry. Removing an absent entry is not an
    /// error.
    pub fn clear_user(&self) -> Result<()> {
        remove_if_present(&self.user_path()).context("Failed to clear user entry")
    }

    /// Remove the persisted credential. Removing an absent entry is not an
    /// error.
    pub fn clear_token(&self) -> Result<()> {
        remove_if_present(&self.token_path()).context("Failed to clear credential entry")
    }

    /// Remove both entries, returning the store to the logged-out state.
    pub fn clear(&self) -> Result<()> {
        self.clear_user()?;
        self.clear_token()?;
        tracing::debug!("STORE_CLEARED");
        Ok(())
    }

    /// Directory the entries live under.
    pub fn dir(&self) -> &Path {
        &self.store_dir
    }
}

/// Write `bytes` to `path` via a temp file and atomic rename.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)
        .with_context(|| format!("Failed to write temp file {:?}", tmp))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move temp file into place at {:?}", path))?;
    Ok(())
}

fn remove_if_present(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {:?}", path))?;
    }
    Ok(())
}
