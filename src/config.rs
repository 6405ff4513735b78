// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything here is non-sensitive; the bearer credential itself lives in
//! the credential store, never in the environment.

use std::env;
use std::path::PathBuf;

use crate::services::reconnect::ClientClass;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (scheme + host + optional port)
    pub backend_url: String,
    /// GraphQL request/response endpoint path
    pub service_path: String,
    /// Admin login exchange endpoint path
    pub auth_path: String,
    /// Ticketing REST base path (coupon sharing)
    pub ticketing_path: String,
    /// Streaming endpoint path
    pub ws_path: String,
    /// Client class used to select reconnection tuning constants
    pub client_class: ClientClass,
    /// Caller identifier sent in streaming connection params
    pub client_id: String,
    /// Location of the stored credential (single value, well-known key)
    pub credential_path: PathBuf,
    /// Dashboard refresh period in seconds
    pub refresh_interval_secs: u64,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080".to_string(),
            service_path: "/backend/admin/service".to_string(),
            auth_path: "/backend/admin/auth/login".to_string(),
            ticketing_path: "/ticketing-service/ticketing".to_string(),
            ws_path: "/backend/ticketing/ws".to_string(),
            client_class: ClientClass::Generic,
            client_id: "ticketing-admin/0.1".to_string(),
            credential_path: PathBuf::from(".ticketing-admin/credential"),
            refresh_interval_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        Ok(Self {
            backend_url: env::var("BACKEND_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("BACKEND_URL"))?,
            service_path: env::var("SERVICE_PATH").unwrap_or(defaults.service_path),
            auth_path: env::var("AUTH_PATH").unwrap_or(defaults.auth_path),
            ticketing_path: env::var("TICKETING_PATH").unwrap_or(defaults.ticketing_path),
            ws_path: env::var("WS_PATH").unwrap_or(defaults.ws_path),
            client_class: env::var("CLIENT_CLASS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(ClientClass::Generic),
            client_id: env::var("CLIENT_ID").unwrap_or(defaults.client_id),
            credential_path: env::var("CREDENTIAL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.credential_path),
            refresh_interval_secs: env::var("REFRESH_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.refresh_interval_secs),
        })
    }

    /// Default config for tests, pointed at a caller-supplied backend.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Full URL of the GraphQL request/response endpoint.
    pub fn service_url(&self) -> String {
        format!("{}{}", self.backend_url, self.service_path)
    }

    /// Full URL of the login exchange endpoint.
    pub fn auth_url(&self) -> String {
        format!("{}{}", self.backend_url, self.auth_path)
    }

    /// Full URL of the ticketing REST base.
    pub fn ticketing_url(&self) -> String {
        format!("{}{}", self.backend_url, self.ticketing_path)
    }

    /// Full URL of the streaming endpoint.
    ///
    /// The WebSocket scheme follows the base scheme: `wss:` iff the backend
    /// is reached over `https:`.
    pub fn ws_url(&self) -> String {
        let base = if let Some(rest) = self.backend_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.backend_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.backend_url.clone()
        };
        format!("{}{}", base, self.ws_path)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
