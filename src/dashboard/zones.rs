// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Zones container with derived ticket metrics.

use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{ChartRow, TicketMetrics, ZoneConfig, ZoneDraft};
use crate::services::Gateway;

/// Last-known zone collection plus the aggregates derived from it.
pub struct ZonesContainer {
    gateway: Gateway,
    zones: RwLock<Vec<ZoneConfig>>,
    metrics: RwLock<TicketMetrics>,
}

impl ZonesContainer {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            zones: RwLock::new(Vec::new()),
            metrics: RwLock::new(TicketMetrics::default()),
        }
    }

    /// Refetch all zones and recompute the aggregates.
    pub async fn refresh(&self) -> Result<()> {
        if let Some(zones) = self.gateway.all_zones().await? {
            let metrics = TicketMetrics::from_zones(&zones);
            *self.zones.write().await = zones;
            *self.metrics.write().await = metrics;
        }
        Ok(())
    }

    /// Zones of one event, fetched fresh; does not touch the container
    /// collection (the per-event view is transient).
    pub async fn for_event(&self, event_id: &str) -> Result<Vec<ZoneConfig>> {
        Ok(self.gateway.zone_config(event_id).await?.unwrap_or_default())
    }

    /// Snapshot of the current collection.
    pub async fn list(&self) -> Vec<ZoneConfig> {
        self.zones.read().await.clone()
    }

    /// Current aggregates.
    pub async fn metrics(&self) -> TicketMetrics {
        self.metrics.read().await.clone()
    }

    /// Flattened chart rows (event totals first, then that event's zones).
    pub async fn chart_rows(&self) -> Vec<ChartRow> {
        self.metrics.read().await.chart_rows()
    }

    /// Create a zone server-side, then refetch.
    pub async fn create(&self, draft: &ZoneDraft) -> Result<()> {
        self.gateway.save_zone(None, draft).await?;
        self.refresh().await
    }

    /// Update a zone server-side, then refetch.
    pub async fn update(&self, id: &str, draft: &ZoneDraft) -> Result<()> {
        self.gateway.save_zone(Some(id), draft).await?;
        self.refresh().await
    }

    /// Delete a zone server-side, then refetch.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.gateway.delete_zone(id).await?;
        self.refresh().await
    }
}
