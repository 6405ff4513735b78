// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Zone configuration records.

use serde::{Deserialize, Serialize};

/// One zone of one event.
///
/// Every field is nullable on the wire; the backend fills in what it knows.
/// `event_id_doc` is the foreign key to the owning event document, while
/// `event_id` is the event's business key used for grouping in charts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneConfig {
    pub id: Option<String>,
    pub config_name: Option<String>,
    pub event_id: Option<String>,
    pub zone_id: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub discount: Option<f64>,
    pub available: Option<bool>,
    pub max_ticket: Option<u32>,
    pub remaining_ticket: Option<u32>,
    pub sold_ticket: Option<u32>,
    pub event_date: Option<String>,
    pub event_date_string: Option<String>,
    pub event_id_doc: Option<String>,
    pub image: Option<String>,
    pub label_color: Option<String>,
    pub label_position: Option<String>,
    pub concert_ticket: Option<u32>,
}

impl ZoneConfig {
    /// Grouping key for charting: business key first, falling back to the
    /// document reference so orphaned zones still aggregate somewhere.
    pub fn event_key(&self) -> &str {
        self.event_id
            .as_deref()
            .or(self.event_id_doc.as_deref())
            .unwrap_or("unknown")
    }

    /// Display date for the owning event.
    pub fn event_date_label(&self) -> &str {
        self.event_date_string
            .as_deref()
            .or(self.event_date.as_deref())
            .unwrap_or("")
    }
}

/// Fields an administrator supplies when creating or editing a zone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDraft {
    pub zone_id: String,
    pub name: String,
    pub price: f64,
    pub discount: f64,
    pub max_ticket: u32,
    /// Owning event document id
    pub event_id_doc: String,
    #[serde(default)]
    pub label_color: String,
    #[serde(default)]
    pub label_position: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_partial_wire_payload() {
        // The backend omits fields it has no value for.
        let json = serde_json::json!({
            "eventId": "event-yogeshwari",
            "zoneId": "zoneA",
            "name": "Zone A",
            "maxTicket": 2000,
            "remainingTicket": 0,
            "soldTicket": 2000
        });

        let zone: ZoneConfig = serde_json::from_value(json).expect("zone should deserialize");
        assert_eq!(zone.event_key(), "event-yogeshwari");
        assert_eq!(zone.sold_ticket, Some(2000));
        assert!(zone.label_color.is_none());
    }

    #[test]
    fn test_event_key_falls_back_to_doc_ref() {
        let zone = ZoneConfig {
            event_id_doc: Some("67dfe5fd2c1d252daf311534".to_string()),
            ..ZoneConfig::default()
        };
        assert_eq!(zone.event_key(), "67dfe5fd2c1d252daf311534");

        assert_eq!(ZoneConfig::default().event_key(), "unknown");
    }
}
