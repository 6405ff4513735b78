// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Event records as served by the admin backend.

use serde::{Deserialize, Serialize};

/// A ticketed event.
///
/// `id` is the document identity; `event_key` is the externally-visible
/// business key that zones use to correlate with their event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id")]
    pub id: String,
    pub event_name: String,
    /// Business key (distinct from the document id)
    pub event_id: String,
    pub event_date: String,
    pub event_time: String,
    pub event_description: String,
    pub event_location: String,
    pub max_ticket: u32,
    pub organizer: String,
    pub image: String,
    pub theme: String,
}

/// Fields an administrator supplies when creating or editing an event.
///
/// The document id is omitted: the server assigns it on create and the
/// caller addresses an existing document separately on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    pub event_name: String,
    pub event_id: String,
    pub event_date: String,
    pub event_time: String,
    #[serde(default)]
    pub event_description: String,
    pub event_location: String,
    pub max_ticket: u32,
    pub organizer: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub theme: String,
}
