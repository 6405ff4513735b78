// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ticketing-Admin sync daemon
//!
//! Restores the admin session from the stored credential, keeps the live
//! channel up, and refreshes the dashboard containers on a fixed period.

use std::time::Duration;

use chrono::Utc;
use ticketing_admin::{config::Config, AppState};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(
        backend = %config.backend_url,
        client_class = ?config.client_class,
        "Starting ticketing-admin sync"
    );

    let state = AppState::shared(config);

    // Restore the session; without a valid stored credential there is
    // nothing to sync.
    let route = state.session.initialize(Utc::now()).await?;
    if route.is_public() {
        tracing::error!("no valid credential stored; log in through the admin console first");
        std::process::exit(1);
    }
    tracing::info!("session restored");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Session expiry watchdog
    {
        let state = state.clone();
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            if let Err(e) = state.session.run(shutdown).await {
                tracing::error!(error = %e, "session guard stopped");
            }
        });
    }

    // Live-update channel
    {
        let state = state.clone();
        tokio::spawn(async move {
            if let Err(e) = state.channel.run().await {
                tracing::error!(error = %e, "live channel stopped");
            }
        });
    }

    // Log channel lifecycle transitions
    {
        let mut events = state.channel.events();
        tokio::spawn(async move {
            while let Ok(event) = events.recv().await {
                tracing::debug!(?event, "channel event");
            }
        });
    }

    // Periodic dashboard refresh
    let mut ticker = tokio::time::interval(Duration::from_secs(
        state.config.refresh_interval_secs.max(1),
    ));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Utc::now();
                if state.session.current_route().await.is_public() {
                    tracing::warn!("session ended, shutting down");
                    break;
                }
                state.dashboard.refresh_all(now).await;
                state.dashboard.tick_banners(now).await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    shutdown_tx.send(true).ok();
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ticketing_admin=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
