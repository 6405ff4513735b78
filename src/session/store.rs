// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistent credential storage.
//!
//! A single string value under one well-known path; the only client-side
//! persisted state. Written by the session guard and the login/logout
//! flows, read by every outbound call.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{AppError, Result};

/// File-backed store holding at most one credential.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: Arc<PathBuf>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Arc::new(path),
        }
    }

    /// Read the stored credential, if any. An unreadable or empty file
    /// counts as absent.
    pub async fn load(&self) -> Option<String> {
        match tokio::fs::read_to_string(self.path.as_ref()).await {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(_) => None,
        }
    }

    /// Store a credential, replacing any previous one.
    pub async fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Store(e.to_string()))?;
        }
        tokio::fs::write(self.path.as_ref(), token)
            .await
            .map_err(|e| AppError::Store(e.to_string()))
    }

    /// Delete the stored credential. Deleting an absent credential is not
    /// an error.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(self.path.as_ref()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Store(e.to_string())),
        }
    }
}
