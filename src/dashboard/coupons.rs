// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Coupon sharing (treasure-hunter view).

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::dashboard::{Banner, BannerKind};
use crate::error::Result;
use crate::services::Gateway;

/// Sends coupon batches to a recipient over the ticketing REST endpoint.
pub struct CouponSender {
    gateway: Gateway,
    banner: RwLock<Banner>,
}

impl CouponSender {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            banner: RwLock::new(Banner::default()),
        }
    }

    /// Send a coupon batch. Outcomes surface only through the banner.
    pub async fn send(&self, email: &str, coupons: &str, now: DateTime<Utc>) -> Result<()> {
        let outcome = self.gateway.share_coupon(email, coupons).await;
        let mut banner = self.banner.write().await;
        match outcome {
            Ok(true) => {
                banner.show(BannerKind::Success, "Email send successfully!!!", now);
            }
            Ok(false) => {
                banner.show(BannerKind::Danger, "Error", now);
            }
            Err(e) => {
                tracing::error!(error = %e, "coupon share failed");
                banner.show(
                    BannerKind::Danger,
                    "Failed to send email. Please try again.",
                    now,
                );
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
