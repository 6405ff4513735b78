// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Analytics container: registration buckets, gender split, age buckets.

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{AgeBucket, GenderSplit, UserCountBucket};
use crate::services::Gateway;

/// Preset ranges for the registration graph. Bounds are unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    LastHour,
    Last6Hours,
    Last24Hours,
    Last7Days,
    Last30Days,
    /// Explicit bounds, unix seconds
    Custom { start: i64, end: i64 },
}

impl TimeRange {
    /// (start, end) in unix seconds, evaluated against `now`.
    pub fn bounds(self, now: DateTime<Utc>) -> (i64, i64) {
        let end = now.timestamp();
        match self {
            TimeRange::LastHour => (end - Duration::hours(1).num_seconds(), end),
            TimeRange::Last6Hours => (end - Duration::hours(6).num_seconds(), end),
            TimeRange::Last24Hours => (end - Duration::hours(24).num_seconds(), end),
            TimeRange::Last7Days => (end - Duration::days(7).num_seconds(), end),
            TimeRange::Last30Days => (end - Duration::days(30).num_seconds(), end),
            TimeRange::Custom { start, end } => (start, end),
        }
    }
}

#[derive(Debug, Default, Clone)]
struct AnalyticsView {
    registration: Vec<UserCountBucket>,
    gender: GenderSplit,
    ages: Vec<AgeBucket>,
}

/// Chart source data for the dashboard view.
pub struct AnalyticsContainer {
    gateway: Gateway,
    range: RwLock<TimeRange>,
    view: RwLock<AnalyticsView>,
}

impl AnalyticsContainer {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            range: RwLock::new(TimeRange::Last7Days),
            view: RwLock::new(AnalyticsView::default()),
        }
    }

    /// Selected registration range.
    pub async fn range(&self) -> TimeRange {
        *self.range.read().await
    }

    /// Change the registration range and refetch its buckets.
    pub async fn set_range(&self, range: TimeRange, now: DateTime<Utc>) -> Result<()> {
        *self.range.write().await = range;
        self.refresh_registration(now).await
    }

    /// Refetch registration buckets for the selected range.
    pub async fn refresh_registration(&self, now: DateTime<Utc>) -> Result<()> {
        let (start, end) = self.range.read().await.bounds(now);
        if let Some(buckets) = self.gateway.user_count_buckets(start, end).await? {
            self.view.write().await.registration = buckets;
        }
        Ok(())
    }

    /// Refetch the gender split.
    pub async fn refresh_gender(&self) -> Result<()> {
        if let Some(split) = self.gateway.gender_split().await? {
            self.view.write().await.gender = split;
        }
        Ok(())
    }

    /// Refetch age buckets.
    pub async fn refresh_ages(&self) -> Result<()> {
        if let Some(ages) = self.gateway.age_distribution().await? {
            self.view.write().await.ages = ages;
        }
        Ok(())
    }

    /// Refetch all three charts.
    pub async fn refresh_all(&self, now: DateTime<Utc>) -> Result<()> {
        self.refresh_registration(now).await?;
        self.refresh_gender().await?;
        self.refresh_ages().await
    }

    pub async fn registration(&self) -> Vec<UserCountBucket> {
        self.view.read().await.registration.clone()
    }

    pub async fn gender(&self) -> GenderSplit {
        self.view.read().await.gender.clone()
    }

    pub async fn ages(&self) -> Vec<AgeBucket> {
        self.view.read().await.ages.clone()
    }
}
