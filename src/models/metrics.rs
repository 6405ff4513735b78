// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Derived ticket aggregates for the zone-status chart.
//!
//! Recomputed from the current zone collection on every refresh; nothing
//! here is persisted. Grouping is by event business key, then by zone key,
//! accumulating four counters at both levels.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::ZoneConfig;

/// Fallback label color when a zone carries none.
const DEFAULT_LABEL_COLOR: &str = "#8884d8";

/// The four accumulated counters.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ZoneTotals {
    pub max_ticket: u64,
    pub remaining_ticket: u64,
    pub sold_ticket: u64,
    pub concert_ticket: u64,
}

impl ZoneTotals {
    fn add(&mut self, zone: &ZoneConfig) {
        self.max_ticket += u64::from(zone.max_ticket.unwrap_or(0));
        self.remaining_ticket += u64::from(zone.remaining_ticket.unwrap_or(0));
        self.sold_ticket += u64::from(zone.sold_ticket.unwrap_or(0));
        self.concert_ticket += u64::from(zone.concert_ticket.unwrap_or(0));
    }
}

/// Accumulated counters for one zone of one event.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneBreakdown {
    pub zone_key: String,
    pub zone_name: String,
    pub price: f64,
    pub label_color: String,
    pub totals: ZoneTotals,
}

/// Accumulated counters for one event plus its per-zone breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub event_key: String,
    pub event_date: String,
    pub totals: ZoneTotals,
    pub zones: Vec<ZoneBreakdown>,
}

/// One row of the flattened chart output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ChartRow {
    pub name: String,
    pub event_key: String,
    pub event_date: String,
    pub max_ticket: u64,
    pub remaining_ticket: u64,
    pub sold_ticket: u64,
    pub concert_ticket: u64,
}

/// Grouped ticket aggregates, ready for charting.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TicketMetrics {
    pub events: Vec<EventSummary>,
}

impl TicketMetrics {
    /// Group zones by event, then by zone key, accumulating counters.
    ///
    /// Events and zones keep first-seen order so repeated runs over the
    /// same payload produce identical charts; the totals themselves are
    /// order-independent.
    pub fn from_zones(zones: &[ZoneConfig]) -> Self {
        let mut events: Vec<EventSummary> = Vec::new();
        let mut event_index: HashMap<String, usize> = HashMap::new();

        for zone in zones {
            let event_key = zone.event_key().to_string();

            let idx = *event_index.entry(event_key.clone()).or_insert_with(|| {
                events.push(EventSummary {
                    event_key: event_key.clone(),
                    event_date: zone.event_date_label().to_string(),
                    totals: ZoneTotals::default(),
                    zones: Vec::new(),
                });
                events.len() - 1
            });
            let event = &mut events[idx];

            let zone_key = zone.zone_id.clone().unwrap_or_default();
            let pos = match event.zones.iter().position(|z| z.zone_key == zone_key) {
                Some(pos) => pos,
                None => {
                    event.zones.push(ZoneBreakdown {
                        zone_key,
                        zone_name: zone.name.clone().unwrap_or_default(),
                        price: zone.price.unwrap_or(0.0),
                        label_color: zone
                            .label_color
                            .clone()
                            .unwrap_or_else(|| DEFAULT_LABEL_COLOR.to_string()),
                        totals: ZoneTotals::default(),
                    });
                    event.zones.len() - 1
                }
            };
            let breakdown = &mut event.zones[pos];

            breakdown.totals.add(zone);
            event.totals.add(zone);

            let capacity = u64::from(zone.max_ticket.unwrap_or(0));
            let accounted = u64::from(zone.remaining_ticket.unwrap_or(0))
                + u64::from(zone.sold_ticket.unwrap_or(0));
            if accounted > capacity {
                tracing::warn!(
                    event = %event.event_key,
                    zone = %breakdown.zone_key,
                    capacity,
                    accounted,
                    "zone counters exceed capacity"
                );
            }
        }

        Self { events }
    }

    /// Flatten to chart rows: each event's total row, then that event's
    /// zone rows, events in grouping order.
    pub fn chart_rows(&self) -> Vec<ChartRow> {
        let mut rows = Vec::new();

        for event in &self.events {
            rows.push(ChartRow {
                name: format!("{} (Total)", event.event_key),
                event_key: event.event_key.clone(),
                event_date: event.event_date.clone(),
                max_ticket: event.totals.max_ticket,
                remaining_ticket: event.totals.remaining_ticket,
                sold_ticket: event.totals.sold_ticket,
                concert_ticket: event.totals.concert_ticket,
            });

            for zone in &event.zones {
                rows.push(ChartRow {
                    name: format!("{} - {}", event.event_key, zone.zone_name),
                    event_key: event.event_key.clone(),
                    event_date: event.event_date.clone(),
                    max_ticket: zone.totals.max_ticket,
                    remaining_ticket: zone.totals.remaining_ticket,
                    sold_ticket: zone.totals.sold_ticket,
                    concert_ticket: zone.totals.concert_ticket,
                });
            }
        }

        rows
    }
}
