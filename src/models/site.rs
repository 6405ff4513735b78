// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Site lockdown configuration.

use serde::{Deserialize, Serialize};

/// Site-wide enable switch with its scheduled enable time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub site_enable: bool,
    /// Milliseconds since epoch
    #[serde(default)]
    pub enabled_time: i64,
    #[serde(default = "default_config_name")]
    pub config_name: String,
}

fn default_config_name() -> String {
    "site".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_enable: false,
            enabled_time: 0,
            config_name: default_config_name(),
        }
    }
}
