// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Ticketing-Admin: data synchronization core for the ticketing admin console
//!
//! This crate keeps an authenticated admin session against the ticketing
//! backend, issues GraphQL queries and mutations over HTTP, holds one
//! persistent WebSocket channel for streaming operations, and maintains the
//! per-view dashboard state (events, zones, users, analytics, site lockdown).

pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use dashboard::Dashboard;
use services::{Gateway, LiveChannel};
use session::SessionGuard;

/// Shared application state.
///
/// Passed explicitly to every component; the credential store and session
/// state inside are single-writer (the guard and the login/logout flows).
pub struct AppState {
    pub config: Config,
    pub session: SessionGuard,
    pub gateway: Gateway,
    pub channel: LiveChannel,
    pub dashboard: Dashboard,
}

impl AppState {
    /// Wire up all components from configuration.
    pub fn new(config: Config) -> Self {
        let store = session::CredentialStore::new(config.credential_path.clone());
        let gateway = Gateway::new(&config, store.clone());
        let channel = LiveChannel::new(&config, store.clone());
        let session = SessionGuard::new(config.clone(), store, gateway.clone());
        let dashboard = Dashboard::new(gateway.clone());

        Self {
            config,
            session,
            gateway,
            channel,
            dashboard,
        }
    }

    /// Convenience constructor returning the shared form used by tasks.
    pub fn shared(config: Config) -> Arc<Self> {
        Arc::new(Self::new(config))
    }
}
