// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live channel tests: reconnect policy, unauthorized terminal handling,
//! lifecycle-driven teardown, and subscription routing.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use common::bind_ws;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use ticketing_admin::services::reconnect::ClientClass;
use ticketing_admin::services::{ChannelEvent, LiveChannel};
use ticketing_admin::session::CredentialStore;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

const SUBSCRIPTION_DOC: &str = "subscription OnZoneChange { zoneChanged }";

fn channel_for(config: &ticketing_admin::config::Config) -> Arc<LiveChannel> {
    let store = CredentialStore::new(config.credential_path.clone());
    Arc::new(LiveChannel::new(config, store))
}

/// Collect channel events until `predicate` matches or the timeout runs out.
async fn wait_for_event(
    events: &mut tokio::sync::broadcast::Receiver<ChannelEvent>,
    timeout: Duration,
    predicate: impl Fn(&ChannelEvent) -> bool,
) -> Option<ChannelEvent> {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        match tokio::time::timeout(remaining, events.recv()).await {
            Ok(Ok(event)) if predicate(&event) => return Some(event),
            Ok(Ok(_)) => continue,
            _ => return None,
        }
    }
}

/// Accept one WebSocket connection and acknowledge its init frame,
/// returning the server-side stream.
async fn accept_and_ack(
    listener: &TcpListener,
) -> tokio_tungstenite::WebSocketStream<tokio::net::TcpStream> {
    let (stream, _) = listener.accept().await.expect("accept");
    let mut ws = tokio_tungstenite::accept_async(stream).await.expect("ws handshake");

    // First frame must be connection_init.
    let init = ws.next().await.expect("init frame").expect("init frame ok");
    let init: Value = match init {
        Message::Text(text) => serde_json::from_str(&text).expect("init json"),
        other => panic!("expected text init frame, got {:?}", other),
    };
    assert_eq!(init["type"], "connection_init");

    ws.send(Message::Text(r#"{"type":"connection_ack"}"#.to_string()))
        .await
        .expect("send ack");
    ws
}

#[tokio::test]
async fn test_connection_params_carry_identity_and_class() {
    let (listener, mut config) = bind_ws("params").await;
    config.client_class = ClientClass::ChromeIos;
    config.client_id = "admin-console-tests".to_string();

    let store = CredentialStore::new(config.credential_path.clone());
    store.clear().await.expect("clear");
    store.save("stored-token").await.expect("save");
    let channel = Arc::new(LiveChannel::new(&config, store));

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = tokio_tungstenite::accept_async(stream).await.expect("handshake");
        let init = ws.next().await.expect("init").expect("init ok");
        match init {
            Message::Text(text) => serde_json::from_str::<Value>(&text).expect("json"),
            other => panic!("expected text frame, got {:?}", other),
        }
    });

    let runner = {
        let channel = channel.clone();
        tokio::spawn(async move { channel.run().await })
    };

    let init = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server finished")
        .expect("join");

    let payload = &init["payload"];
    assert_eq!(payload["authToken"], json!("Bearer stored-token"));
    assert_eq!(payload["userAgent"], json!("admin-console-tests"));
    assert_eq!(payload["clientType"], json!("chrome-ios"));
    assert!(payload["timestamp"].as_i64().unwrap_or(0) > 0);

    runner.abort();
}

#[tokio::test]
async fn test_unauthorized_close_stops_all_retries() {
    let (listener, config) = bind_ws("unauthorized").await;
    let channel = channel_for(&config);
    let mut events = channel.events();

    let connections = Arc::new(AtomicUsize::new(0));
    let server_connections = connections.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else { break };
            server_connections.fetch_add(1, Ordering::SeqCst);
            let mut ws = match tokio_tungstenite::accept_async(stream).await {
                Ok(ws) => ws,
                Err(_) => continue,
            };
            // Reject the session the way the backend signals a bad token.
            ws.next().await;
            ws.send(Message::Close(Some(CloseFrame {
                code: CloseCode::from(4401),
                reason: "401: Unauthorized".into(),
            })))
            .await
            .ok();
        }
    });

    let runner = {
        let channel = channel.clone();
        tokio::spawn(async move { channel.run().await })
    };

    // The run loop must end on its own: unauthorized is terminal.
    let outcome = tokio::time::timeout(Duration::from_secs(5), runner)
        .await
        .expect("run must terminate")
        .expect("join");
    outcome.expect("run returns cleanly");

    let closed = wait_for_event(&mut events, Duration::from_secs(1), |e| {
        matches!(e, ChannelEvent::Closed { code: Some(4401), .. })
    })
    .await;
    assert!(closed.is_some(), "unauthorized close must be observable");

    // Zero further reconnect attempts.
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_transport_drop_triggers_reconnect() {
    let (listener, mut config) = bind_ws("reconnect").await;
    config.client_class = ClientClass::SafariIos;
    let channel = channel_for(&config);
    let mut events = channel.events();

    let connections = Arc::new(AtomicUsize::new(0));
    let server_connections = connections.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else { break };
            let n = server_connections.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 1 {
                // Drop the first connection before the handshake finishes.
                drop(stream);
                continue;
            }
            let mut ws = match tokio_tungstenite::accept_async(stream).await {
                Ok(ws) => ws,
                Err(_) => continue,
            };
            ws.next().await;
            ws.send(Message::Text(r#"{"type":"connection_ack"}"#.to_string()))
                .await
                .ok();
            // Hold the healthy connection open.
            while ws.next().await.is_some() {}
        }
    });

    let runner = {
        let channel = channel.clone();
        tokio::spawn(async move { channel.run().await })
    };

    let connected = wait_for_event(&mut events, Duration::from_secs(5), |e| {
        matches!(e, ChannelEvent::Connected)
    })
    .await;
    assert!(connected.is_some(), "channel must reconnect after a drop");
    assert!(connections.load(Ordering::SeqCst) >= 2);

    runner.abort();
}

#[tokio::test]
async fn test_attempt_budget_exhaustion_is_observable() {
    let (listener, config) = bind_ws("exhausted").await;
    // Free the port: every connect attempt is refused.
    drop(listener);

    let channel = channel_for(&config);
    let mut events = channel.events();

    let runner = {
        let channel = channel.clone();
        tokio::spawn(async move { channel.run().await })
    };

    let outcome = tokio::time::timeout(Duration::from_secs(120), runner)
        .await
        .expect("run must give up")
        .expect("join");
    outcome.expect("run returns cleanly");

    let mut connecting = 0;
    let mut exhausted = false;
    while let Ok(event) = events.try_recv() {
        match event {
            ChannelEvent::Connecting { .. } => connecting += 1,
            ChannelEvent::Exhausted => exhausted = true,
            _ => {}
        }
    }
    // Generic profile budget: ten attempts, then exhaustion.
    assert_eq!(connecting, 10);
    assert!(exhausted);
}

#[tokio::test]
async fn test_next_frames_route_to_their_subscription() {
    let (listener, config) = bind_ws("routing").await;
    let channel = channel_for(&config);

    let mut subscription = channel
        .subscribe(SUBSCRIPTION_DOC, json!({}))
        .expect("subscribe");

    tokio::spawn(async move {
        let mut ws = accept_and_ack(&listener).await;

        // The channel re-issues registered subscriptions after connecting.
        let frame = ws.next().await.expect("subscribe frame").expect("frame ok");
        let frame: Value = match frame {
            Message::Text(text) => serde_json::from_str(&text).expect("json"),
            other => panic!("expected text frame, got {:?}", other),
        };
        assert_eq!(frame["type"], "subscribe");
        let id = frame["id"].as_str().expect("id").to_string();

        let next = json!({ "type": "next", "id": id, "payload": { "zoneChanged": "zoneA" } });
        ws.send(Message::Text(next.to_string())).await.expect("send next");

        let complete = json!({ "type": "complete", "id": id });
        ws.send(Message::Text(complete.to_string()))
            .await
            .expect("send complete");

        while ws.next().await.is_some() {}
    });

    let runner = {
        let channel = channel.clone();
        tokio::spawn(async move { channel.run().await })
    };

    let payload = tokio::time::timeout(Duration::from_secs(5), subscription.receiver.recv())
        .await
        .expect("payload in time")
        .expect("payload present");
    assert_eq!(payload, json!({ "zoneChanged": "zoneA" }));

    // After the server completes the operation, the stream ends.
    let end = tokio::time::timeout(Duration::from_secs(5), subscription.receiver.recv())
        .await
        .expect("closed in time");
    assert!(end.is_none());

    runner.abort();
}

#[tokio::test]
async fn test_foreground_signal_forces_fresh_connection() {
    let (listener, mut config) = bind_ws("foreground").await;
    config.client_class = ClientClass::SafariIos;
    let channel = channel_for(&config);
    let mut events = channel.events();
    let lifecycle = channel.lifecycle_handle();

    let connections = Arc::new(AtomicUsize::new(0));
    let server_connections = connections.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else { break };
            server_connections.fetch_add(1, Ordering::SeqCst);
            let mut ws = match tokio_tungstenite::accept_async(stream).await {
                Ok(ws) => ws,
                Err(_) => continue,
            };
            ws.next().await;
            ws.send(Message::Text(r#"{"type":"connection_ack"}"#.to_string()))
                .await
                .ok();
            while ws.next().await.is_some() {}
        }
    });

    let runner = {
        let channel = channel.clone();
        tokio::spawn(async move { channel.run().await })
    };

    assert!(wait_for_event(&mut events, Duration::from_secs(5), |e| {
        matches!(e, ChannelEvent::Connected)
    })
    .await
    .is_some());

    // Returning to the foreground tears the connection down on purpose...
    lifecycle.foreground();

    // ...and a fresh one comes up after the class's resume delay.
    assert!(wait_for_event(&mut events, Duration::from_secs(5), |e| {
        matches!(e, ChannelEvent::Connected)
    })
    .await
    .is_some());
    assert!(connections.load(Ordering::SeqCst) >= 2);

    runner.abort();
}

#[tokio::test]
async fn test_background_cancels_pending_reconnect() {
    let (listener, config) = bind_ws("background").await;
    let channel = channel_for(&config);
    let mut events = channel.events();
    let lifecycle = channel.lifecycle_handle();

    let connections = Arc::new(AtomicUsize::new(0));
    let server_connections = connections.clone();
    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else { break };
            let n = server_connections.fetch_add(1, Ordering::SeqCst) + 1;
            let mut ws = match tokio_tungstenite::accept_async(stream).await {
                Ok(ws) => ws,
                Err(_) => continue,
            };
            ws.next().await;
            if n == 1 {
                // Close the first session immediately after init.
                ws.send(Message::Close(Some(CloseFrame {
                    code: CloseCode::Normal,
                    reason: "going away".into(),
                })))
                .await
                .ok();
                continue;
            }
            ws.send(Message::Text(r#"{"type":"connection_ack"}"#.to_string()))
                .await
                .ok();
            while ws.next().await.is_some() {}
        }
    });

    let runner = {
        let channel = channel.clone();
        tokio::spawn(async move { channel.run().await })
    };

    // Wait for the first close, then background before the 500ms backoff
    // (generic profile) elapses.
    assert!(wait_for_event(&mut events, Duration::from_secs(5), |e| {
        matches!(e, ChannelEvent::Closed { .. })
    })
    .await
    .is_some());
    lifecycle.background();

    // No reconnect while backgrounded.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(connections.load(Ordering::SeqCst), 1);

    // Visible again: reconnect after the resume delay.
    lifecycle.foreground();
    assert!(wait_for_event(&mut events, Duration::from_secs(5), |e| {
        matches!(e, ChannelEvent::Connected)
    })
    .await
    .is_some());
    assert_eq!(connections.load(Ordering::SeqCst), 2);

    runner.abort();
}
