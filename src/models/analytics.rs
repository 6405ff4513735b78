// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Chart source data for the registration, gender and age views.

use serde::{Deserialize, Serialize};

/// One 30-minute registration bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UserCountBucket {
    pub count: u64,
    /// Bucket start, seconds since epoch
    pub timestamp: i64,
}

/// Male/female split. The backend serializes the counters as strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenderSplit {
    #[serde(default)]
    pub male: String,
    #[serde(default)]
    pub female: String,
}

impl GenderSplit {
    /// Parsed counters; unparseable values count as zero.
    pub fn counts(&self) -> (u64, u64) {
        (
            self.male.parse().unwrap_or(0),
            self.female.parse().unwrap_or(0),
        )
    }
}

/// One age-range bucket with its share of the population.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeBucket {
    pub age_range: String,
    pub percentage: f64,
    pub count: u64,
}
