// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Events container.

use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{Event, EventDraft};
use crate::services::Gateway;

/// Last-known event collection for the concert-management view.
pub struct EventsContainer {
    gateway: Gateway,
    events: RwLock<Vec<Event>>,
}

impl EventsContainer {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            events: RwLock::new(Vec::new()),
        }
    }

    /// Refetch the collection. A no-data response keeps the last-known
    /// collection.
    pub async fn refresh(&self) -> Result<()> {
        if let Some(events) = self.gateway.events().await? {
            *self.events.write().await = events;
        }
        Ok(())
    }

    /// Snapshot of the current collection.
    pub async fn list(&self) -> Vec<Event> {
        self.events.read().await.clone()
    }

    pub async fn find(&self, id: &str) -> Option<Event> {
        self.events.read().await.iter().find(|e| e.id == id).cloned()
    }

    /// Create an event server-side, then refetch the authoritative list.
    pub async fn create(&self, draft: &EventDraft) -> Result<()> {
        self.gateway.save_event(None, draft).await?;
        self.refresh().await
    }

    /// Update an event server-side, then refetch.
    pub async fn update(&self, id: &str, draft: &EventDraft) -> Result<()> {
        self.gateway.save_event(Some(id), draft).await?;
        self.refresh().await
    }

    /// Delete an event server-side, then refetch.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.gateway.delete_event(id).await?;
        self.refresh().await
    }
}
