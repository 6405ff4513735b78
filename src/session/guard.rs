// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session guard: gates every other component on a valid credential.
//!
//! On startup it restores the session from the stored credential; while
//! running it re-checks the expiry once a second and tears the session down
//! the moment the expiry passes. All navigation between the public and
//! protected route sets happens here.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, RwLock};

use crate::config::Config;
use crate::error::Result;
use crate::services::Gateway;
use crate::session::credential::is_token_valid;
use crate::session::{Credential, CredentialStore, SessionEvent, SessionState, SessionUser};

/// Expiry re-check period.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// Login success code returned by the admin auth endpoint.
const LOGIN_SUCCESS_CODE: &str = "CODE-006";

/// The two route sets the guard navigates between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Public entry route (login view)
    Login,
    /// Protected route set
    Dashboard,
}

impl Route {
    pub fn is_public(self) -> bool {
        matches!(self, Route::Login)
    }
}

/// Guards the session: single writer of the credential store and the
/// session state (besides the login/logout flows it also owns).
#[derive(Clone)]
pub struct SessionGuard {
    config: Config,
    store: CredentialStore,
    gateway: Gateway,
    state: Arc<RwLock<SessionState>>,
    route: Arc<RwLock<Route>>,
}

impl SessionGuard {
    pub fn new(config: Config, store: CredentialStore, gateway: Gateway) -> Self {
        Self {
            config,
            store,
            gateway,
            state: Arc::new(RwLock::new(SessionState::default())),
            route: Arc::new(RwLock::new(Route::Login)),
        }
    }

    /// Startup check.
    ///
    /// Absent or expired credential: clear session state and land on the
    /// public entry route. Valid credential: mark the session authenticated
    /// and move off the public routes. Returns the route in effect.
    pub async fn initialize(&self, now: DateTime<Utc>) -> Result<Route> {
        match self.store.load().await {
            Some(raw) if is_token_valid(&raw, now) => {
                let email = Credential::parse(&raw).ok().and_then(|c| c.email().map(String::from));
                self.apply(SessionEvent::Success(SessionUser {
                    email,
                    auth_key: Some(raw),
                }))
                .await;
                self.navigate(Route::Dashboard).await;
            }
            _ => {
                // Malformed is handled identically to expired.
                self.clear_session().await?;
            }
        }
        Ok(self.current_route().await)
    }

    /// One expiry check. Invalidates the session if a stored credential
    /// has expired (or no longer parses) at `now`.
    pub async fn check_at(&self, now: DateTime<Utc>) -> Result<()> {
        if let Some(raw) = self.store.load().await {
            if !is_token_valid(&raw, now) {
                tracing::info!("credential expired, clearing session");
                self.logout().await?;
            }
        }
        Ok(())
    }

    /// Periodic expiry loop; returns when `shutdown` flips to true.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut ticker = tokio::time::interval(CHECK_INTERVAL);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_at(Utc::now()).await?;
                }
                changed = shutdown.changed() => {
                    // A dropped sender also means shutdown.
                    if changed.is_err() || *shutdown.borrow() {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Exchange a login against the admin auth endpoint.
    ///
    /// Only the exact success code stores the credential; any other code is
    /// a failed login, and a transport error surfaces the server message
    /// when one is present.
    pub async fn login(&self, email: Option<&str>, auth_key: &str) -> Result<()> {
        self.apply(SessionEvent::Start).await;

        match self.gateway.login(email, auth_key).await {
            Ok(envelope) if envelope.code == LOGIN_SUCCESS_CODE => {
                self.store.save(auth_key).await?;
                self.apply(SessionEvent::Success(SessionUser {
                    email: email.map(String::from),
                    auth_key: Some(auth_key.to_string()),
                }))
                .await;
                self.navigate(Route::Dashboard).await;
                Ok(())
            }
            Ok(_) => {
                self.apply(SessionEvent::Failure("Invalid login response".to_string()))
                    .await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "login exchange failed");
                self.apply(SessionEvent::Failure("Login failed".to_string()))
                    .await;
                Ok(())
            }
        }
    }

    /// Explicit logout: clears the stored credential, resets session state
    /// and lands on the public entry route unconditionally.
    pub async fn logout(&self) -> Result<()> {
        self.store.clear().await?;
        self.apply(SessionEvent::Clear).await;
        *self.route.write().await = Route::Login;
        Ok(())
    }

    /// Clear-and-redirect path shared by startup and expiry detection:
    /// stays put when already on a public route.
    async fn clear_session(&self) -> Result<()> {
        self.store.clear().await?;
        self.apply(SessionEvent::Clear).await;
        let mut route = self.route.write().await;
        if !route.is_public() {
            *route = Route::Login;
        }
        Ok(())
    }

    /// Move to `target` unless already there.
    async fn navigate(&self, target: Route) {
        let mut route = self.route.write().await;
        if *route != target {
            tracing::debug!(?target, "navigating");
            *route = target;
        }
    }

    async fn apply(&self, event: SessionEvent) {
        self.state.write().await.apply(event);
    }

    /// Snapshot of the current session state.
    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// Route currently in effect.
    pub async fn current_route(&self) -> Route {
        *self.route.read().await
    }

    /// Base URL this guard's gateway talks to (used for logging).
    pub fn backend_url(&self) -> &str {
        &self.config.backend_url
    }
}
