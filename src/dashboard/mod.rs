// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard state containers.
//!
//! Each container holds the last-known collection for its view and
//! recomputes any derived aggregates when the collection changes. Edits go
//! through the gateway and are followed by an unconditional refetch; the
//! last-arriving response wins.

pub mod analytics;
pub mod coupons;
pub mod events;
pub mod site;
pub mod users;
pub mod zones;

use std::time::Duration;

use chrono::{DateTime, Utc};

pub use analytics::{AnalyticsContainer, TimeRange};
pub use coupons::CouponSender;
pub use events::EventsContainer;
pub use site::SiteContainer;
pub use users::UsersContainer;
pub use zones::ZonesContainer;

use crate::services::Gateway;

/// How long a transient banner stays visible.
pub const BANNER_DISMISS: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Danger,
}

/// Transient notification with a fixed auto-dismiss deadline.
///
/// Dismissal is driven by `tick` rather than a timer task so the behavior
/// is deterministic under test.
#[derive(Debug, Clone)]
pub struct Banner {
    pub visible: bool,
    pub message: String,
    pub kind: BannerKind,
    deadline: Option<DateTime<Utc>>,
}

impl Default for Banner {
    fn default() -> Self {
        Self {
            visible: false,
            message: String::new(),
            kind: BannerKind::Info,
            deadline: None,
        }
    }
}

impl Banner {
    pub fn show(&mut self, kind: BannerKind, message: impl Into<String>, now: DateTime<Utc>) {
        self.visible = true;
        self.kind = kind;
        self.message = message.into();
        self.deadline = now.checked_add_signed(
            chrono::Duration::from_std(BANNER_DISMISS).unwrap_or(chrono::Duration::seconds(5)),
        );
    }

    /// Hide the banner once its deadline has passed. Returns `true` when a
    /// dismissal happened.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        match self.deadline {
            Some(deadline) if self.visible && now >= deadline => {
                self.visible = false;
                self.message.clear();
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// All per-view containers behind one handle.
pub struct Dashboard {
    pub analytics: AnalyticsContainer,
    pub site: SiteContainer,
    pub events: EventsContainer,
    pub zones: ZonesContainer,
    pub users: UsersContainer,
    pub coupons: CouponSender,
}

impl Dashboard {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            analytics: AnalyticsContainer::new(gateway.clone()),
            site: SiteContainer::new(gateway.clone()),
            events: EventsContainer::new(gateway.clone()),
            zones: ZonesContainer::new(gateway.clone()),
            users: UsersContainer::new(gateway.clone()),
            coupons: CouponSender::new(gateway),
        }
    }

    /// Refresh every view. Individual failures are logged, not fatal; a
    /// view that fails to refresh keeps its last-known data.
    pub async fn refresh_all(&self, now: DateTime<Utc>) {
        if let Err(e) = self.analytics.refresh_all(now).await {
            tracing::warn!(error = %e, "analytics refresh failed");
        }
        if let Err(e) = self.site.refresh().await {
            tracing::warn!(error = %e, "site config refresh failed");
        }
        if let Err(e) = self.events.refresh().await {
            tracing::warn!(error = %e, "events refresh failed");
        }
        if let Err(e) = self.zones.refresh().await {
            tracing::warn!(error = %e, "zones refresh failed");
        }
        if let Err(e) = self.users.refresh().await {
            tracing::warn!(error = %e, "users refresh failed");
        }
    }

    /// Advance banner auto-dismissal.
    pub async fn tick_banners(&self, now: DateTime<Utc>) {
        self.site.tick_banner(now).await;
        self.coupons.tick_banner(now).await;
    }
}
