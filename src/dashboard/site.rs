// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Site lockdown container.

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::dashboard::{Banner, BannerKind};
use crate::error::Result;
use crate::models::SiteConfig;
use crate::services::Gateway;

/// Last-known site configuration plus the toggle banner.
pub struct SiteContainer {
    gateway: Gateway,
    config: RwLock<SiteConfig>,
    banner: RwLock<Banner>,
}

impl SiteContainer {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            config: RwLock::new(SiteConfig::default()),
            banner: RwLock::new(Banner::default()),
        }
    }

    /// Refetch the site configuration.
    pub async fn refresh(&self) -> Result<()> {
        if let Some(config) = self.gateway.site_config().await? {
            *self.config.write().await = config;
        }
        Ok(())
    }

    /// Current configuration snapshot.
    pub async fn config(&self) -> SiteConfig {
        self.config.read().await.clone()
    }

    /// Set the scheduled enable time (milliseconds since epoch).
    pub async fn set_enabled_time(&self, enabled_time: i64) {
        self.config.write().await.enabled_time = enabled_time;
    }

    /// Flip the lockdown switch.
    ///
    /// The local flag flips immediately; the mutation then carries the new
    /// state and the scheduled time. Both the failure envelope and a
    /// transport error surface only as the failure banner.
    pub async fn toggle(&self, now: DateTime<Utc>) -> Result<()> {
        let (state, timestamp) = {
            let mut config = self.config.write().await;
            config.site_enable = !config.site_enable;
            (config.site_enable, config.enabled_time)
        };

        let outcome = self.gateway.update_site_config(state, timestamp).await;
        let mut banner = self.banner.write().await;
        match outcome {
            Ok(true) => {
                banner.show(BannerKind::Success, "Update site config success", now);
            }
            Ok(false) => {
                banner.show(BannerKind::Danger, "Update site config failed", now);
            }
            Err(e) => {
                tracing::error!(error = %e, "site config update failed");
                banner.show(BannerKind::Danger, "Update site config failed", now);
            }
        }
        Ok(())
    }

    /// Current banner snapshot.
    pub async fn banner(&self) -> Banner {
        self.banner.read().await.clone()
    }

    /// Advance banner auto-dismissal.
    pub async fn tick_banner(&self, now: DateTime<Utc>) {
        self.banner.write().await.tick(now);
    }
}
