// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for epoch timestamps.

use chrono::{DateTime, Utc};

/// Current time as whole seconds since the Unix epoch.
pub fn epoch_secs(now: DateTime<Utc>) -> i64 {
    now.timestamp()
}

/// Current time as milliseconds since the Unix epoch.
///
/// The backend expresses `enabledTime` and connection timestamps in
/// milliseconds.
pub fn epoch_millis(now: DateTime<Utc>) -> i64 {
    now.timestamp_millis()
}
