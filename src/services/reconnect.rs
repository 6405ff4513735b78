// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reconnection tuning per client class.
//!
//! Classes that drop connections more often (mobile browsers suspending
//! background pages) get more attempts and tighter delays. The class only
//! selects tuning constants; it is never used for authorization.

use std::str::FromStr;
use std::time::Duration;

/// Backoff growth factor per attempt.
const BACKOFF_FACTOR: f64 = 1.5;

/// Coarse categorization of the runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientClass {
    Generic,
    ChromeIos,
    SafariIos,
    /// Older or low-core hardware
    Legacy,
}

impl FromStr for ClientClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generic" | "other" => Ok(ClientClass::Generic),
            "chrome-ios" => Ok(ClientClass::ChromeIos),
            "safari-ios" => Ok(ClientClass::SafariIos),
            "legacy" => Ok(ClientClass::Legacy),
            _ => Err(()),
        }
    }
}

impl ClientClass {
    /// Tag sent in streaming connection params.
    pub fn tag(self) -> &'static str {
        match self {
            ClientClass::Generic => "other",
            ClientClass::ChromeIos => "chrome-ios",
            ClientClass::SafariIos => "safari-ios",
            ClientClass::Legacy => "legacy",
        }
    }

    /// Tuning constants for this class.
    pub fn profile(self) -> ReconnectProfile {
        match self {
            ClientClass::Generic => ReconnectProfile {
                max_attempts: 10,
                base_delay: Duration::from_millis(500),
                max_delay: Duration::from_millis(5000),
                keepalive: Duration::from_millis(15000),
                resume_delay: Duration::from_millis(500),
            },
            ClientClass::ChromeIos => ReconnectProfile {
                max_attempts: 15,
                base_delay: Duration::from_millis(300),
                max_delay: Duration::from_millis(5000),
                keepalive: Duration::from_millis(15000),
                resume_delay: Duration::from_millis(500),
            },
            ClientClass::SafariIos => ReconnectProfile {
                max_attempts: 20,
                base_delay: Duration::from_millis(200),
                max_delay: Duration::from_millis(2000),
                keepalive: Duration::from_millis(10000),
                resume_delay: Duration::from_millis(100),
            },
            ClientClass::Legacy => ReconnectProfile {
                max_attempts: 10,
                base_delay: Duration::from_millis(500),
                max_delay: Duration::from_millis(3000),
                keepalive: Duration::from_millis(20000),
                resume_delay: Duration::from_millis(500),
            },
        }
    }
}

/// Reconnection tuning constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectProfile {
    /// Attempt budget per connection lifetime
    pub max_attempts: u32,
    /// First retry delay
    pub base_delay: Duration,
    /// Delay cap
    pub max_delay: Duration,
    /// Idle ping period
    pub keepalive: Duration,
    /// Teardown-to-reconnect delay after a foreground/restore signal
    pub resume_delay: Duration,
}

impl ReconnectProfile {
    /// Delay before retry number `attempt` (zero-based): geometric growth
    /// from the base, capped at the maximum.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay.as_millis() as f64;
        let grown = base * BACKOFF_FACTOR.powi(attempt.min(64) as i32);
        let capped = grown.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}
