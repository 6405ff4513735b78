// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer credential parsing and local expiry checks.
//!
//! The client never verifies the token signature (it does not hold the
//! signing key); it only inspects the payload segment for the embedded
//! expiry, the same way the login view does. A credential that fails to
//! parse is treated exactly like an expired one.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{AppError, Result};

/// Claims the client cares about. Everything else in the payload is
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
    /// Account email, when the issuer embeds one
    #[serde(default)]
    pub email: Option<String>,
}

/// A parsed bearer credential.
#[derive(Debug, Clone)]
pub struct Credential {
    raw: String,
    claims: Claims,
}

impl Credential {
    /// Parse a raw token string.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::InvalidCredential`] when the token is not
    /// JWT-shaped, the payload is not base64url JSON, or `exp` is missing.
    pub fn parse(raw: &str) -> Result<Self> {
        let payload = raw
            .split('.')
            .nth(1)
            .ok_or(AppError::InvalidCredential)?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AppError::InvalidCredential)?;
        let claims: Claims =
            serde_json::from_slice(&bytes).map_err(|_| AppError::InvalidCredential)?;

        Ok(Self {
            raw: raw.to_string(),
            claims,
        })
    }

    /// The embedded expiry instant.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.claims.exp, 0)
    }

    /// True while the embedded expiry is still in the future.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.claims.exp > now.timestamp()
    }

    /// Account email from the payload, if present.
    pub fn email(&self) -> Option<&str> {
        self.claims.email.as_deref()
    }

    /// The raw token string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Authorization header value.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.raw)
    }
}

/// Parse-and-check in one step: `true` iff the raw token parses and is
/// unexpired at `now`.
pub fn is_token_valid(raw: &str, now: DateTime<Utc>) -> bool {
    Credential::parse(raw).map(|c| c.is_valid_at(now)).unwrap_or(false)
}
