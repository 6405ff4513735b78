// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live-update channel: one persistent WebSocket per authenticated session.
//!
//! Streaming operations are multiplexed over a single graphql-transport-ws
//! connection. The channel owns the whole connection lifecycle:
//! - connection params (credential, caller id, timestamp, client class)
//! - keepalive pings
//! - reconnection with capped geometric backoff, tuned per client class
//! - terminal handling of the unauthorized close signal
//! - foreground/background lifecycle signals from the host environment
//!
//! Transport failures are never surfaced to subscribers; the channel
//! retries until its attempt budget is exhausted, at which point streaming
//! data simply stops and an `Exhausted` event is observable.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use dashmap::DashMap;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::operations::OperationKind;
use crate::services::reconnect::{ClientClass, ReconnectProfile};
use crate::session::CredentialStore;
use crate::time_utils::epoch_millis;

/// Close code carried by an unauthorized disconnect.
const UNAUTHORIZED_CLOSE_CODE: u16 = 4401;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Host-delivered lifecycle signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Foreground,
    Background,
    /// Page restored from a cached navigation state
    PageRestored,
}

/// Observable channel lifecycle, for logging and tests.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    Connecting { attempt: u32 },
    Connected,
    Closed { code: Option<u16>, reason: String },
    /// Attempt budget spent; streaming has stopped.
    Exhausted,
}

/// Cloneable sender for host lifecycle signals.
#[derive(Debug, Clone)]
pub struct LifecycleHandle {
    tx: mpsc::UnboundedSender<LifecycleEvent>,
}

impl LifecycleHandle {
    pub fn foreground(&self) {
        self.tx.send(LifecycleEvent::Foreground).ok();
    }

    pub fn background(&self) {
        self.tx.send(LifecycleEvent::Background).ok();
    }

    pub fn page_restored(&self) {
        self.tx.send(LifecycleEvent::PageRestored).ok();
    }
}

/// A live streaming operation handed back to the caller.
pub struct Subscription {
    pub id: String,
    /// Streamed payloads; the channel closes when the server completes the
    /// operation.
    pub receiver: mpsc::UnboundedReceiver<Value>,
}

/// graphql-transport-ws frames.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireMessage {
    ConnectionInit {
        payload: Value,
    },
    ConnectionAck {
        #[serde(default)]
        payload: Option<Value>,
    },
    Ping {
        #[serde(default)]
        payload: Option<Value>,
    },
    Pong {
        #[serde(default)]
        payload: Option<Value>,
    },
    Subscribe {
        id: String,
        payload: Value,
    },
    Next {
        id: String,
        payload: Value,
    },
    Error {
        id: String,
        payload: Value,
    },
    Complete {
        id: String,
    },
}

/// Why an established connection ended.
enum Disconnect {
    Transport { code: Option<u16>, reason: String },
    /// Deliberate teardown after a foreground/restore signal
    Resume,
}

enum Command {
    Start(String),
    Stop(String),
}

struct SubEntry {
    payload: Value,
    tx: mpsc::UnboundedSender<Value>,
}

/// The persistent streaming channel.
pub struct LiveChannel {
    ws_url: String,
    client_id: String,
    class: ClientClass,
    store: CredentialStore,
    events_tx: broadcast::Sender<ChannelEvent>,
    lifecycle_tx: mpsc::UnboundedSender<LifecycleEvent>,
    lifecycle_rx: Mutex<Option<mpsc::UnboundedReceiver<LifecycleEvent>>>,
    command_tx: mpsc::UnboundedSender<Command>,
    command_rx: Mutex<Option<mpsc::UnboundedReceiver<Command>>>,
    subscriptions: Arc<DashMap<String, SubEntry>>,
    next_id: AtomicU64,
}

impl LiveChannel {
    pub fn new(config: &Config, store: CredentialStore) -> Self {
        let (events_tx, _) = broadcast::channel(64);
        let (lifecycle_tx, lifecycle_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        Self {
            ws_url: config.ws_url(),
            client_id: config.client_id.clone(),
            class: config.client_class,
            store,
            events_tx,
            lifecycle_tx,
            lifecycle_rx: Mutex::new(Some(lifecycle_rx)),
            command_tx,
            command_rx: Mutex::new(Some(command_rx)),
            subscriptions: Arc::new(DashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Observe connection lifecycle events.
    pub fn events(&self) -> broadcast::Receiver<ChannelEvent> {
        self.events_tx.subscribe()
    }

    /// Handle for the host environment to deliver lifecycle signals.
    pub fn lifecycle_handle(&self) -> LifecycleHandle {
        LifecycleHandle {
            tx: self.lifecycle_tx.clone(),
        }
    }

    /// Register a streaming operation.
    ///
    /// # Errors
    ///
    /// Rejects documents that are not subscriptions; request/response
    /// operations belong on the gateway.
    pub fn subscribe(&self, document: &str, variables: Value) -> Result<Subscription> {
        if !OperationKind::classify(document).is_streaming() {
            return Err(AppError::BadRequest(
                "request/response operation routed to the live channel".to_string(),
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed).to_string();
        let (tx, receiver) = mpsc::unbounded_channel();

        self.subscriptions.insert(
            id.clone(),
            SubEntry {
                payload: json!({ "query": document, "variables": variables }),
                tx,
            },
        );
        self.command_tx.send(Command::Start(id.clone())).ok();

        Ok(Subscription { id, receiver })
    }

    /// Drop a streaming operation.
    pub fn unsubscribe(&self, id: &str) {
        if self.subscriptions.remove(id).is_some() {
            self.command_tx.send(Command::Stop(id.to_string())).ok();
        }
    }

    fn emit(&self, event: ChannelEvent) {
        self.events_tx.send(event).ok();
    }

    /// Connection params sent at connect time. The class tag only selects
    /// tuning constants server-side; it carries no authorization weight.
    async fn connection_params(&self) -> Value {
        let token = self.store.load().await;
        json!({
            "authToken": token.map(|t| format!("Bearer {}", t)),
            "userAgent": self.client_id,
            "timestamp": epoch_millis(Utc::now()),
            "clientType": self.class.tag(),
        })
    }

    /// Drive the channel until the attempt budget is exhausted or an
    /// unauthorized disconnect ends the connection lifetime.
    ///
    /// # Errors
    ///
    /// Fails immediately if the channel is already running.
    pub async fn run(&self) -> Result<()> {
        let mut lifecycle_rx = self
            .lifecycle_rx
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .ok_or_else(|| AppError::Channel("channel already running".to_string()))?;
        let mut command_rx = self
            .command_rx
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .ok_or_else(|| AppError::Channel("channel already running".to_string()))?;

        let profile = self.class.profile();
        let mut failures: u32 = 0;
        let mut hidden = false;

        loop {
            self.emit(ChannelEvent::Connecting { attempt: failures });
            tracing::info!(url = %self.ws_url, attempt = failures, "connecting live channel");

            match connect_async(self.ws_url.as_str()).await {
                Ok((stream, _)) => {
                    match self
                        .drive_connection(
                            stream,
                            &profile,
                            &mut lifecycle_rx,
                            &mut command_rx,
                            &mut hidden,
                            &mut failures,
                        )
                        .await
                    {
                        Disconnect::Resume => {
                            tracing::info!("forcing fresh connection after visibility change");
                            tokio::time::sleep(profile.resume_delay).await;
                            continue;
                        }
                        Disconnect::Transport { code, reason } => {
                            tracing::warn!(?code, reason = %reason, "live channel closed");
                            self.emit(ChannelEvent::Closed {
                                code,
                                reason: reason.clone(),
                            });

                            if is_unauthorized(code, &reason) {
                                tracing::warn!("unauthorized disconnect, not retrying");
                                return Ok(());
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "live channel connect failed");
                    self.emit(ChannelEvent::Closed {
                        code: None,
                        reason: e.to_string(),
                    });
                }
            }

            failures += 1;
            if failures >= profile.max_attempts {
                tracing::warn!(attempts = failures, "reconnect attempt budget exhausted");
                self.emit(ChannelEvent::Exhausted);
                return Ok(());
            }

            self.wait_backoff(
                profile.delay_for_attempt(failures - 1),
                &profile,
                &mut lifecycle_rx,
                &mut hidden,
            )
            .await;
        }
    }

    /// Handshake and pump one established connection.
    async fn drive_connection(
        &self,
        stream: WsStream,
        profile: &ReconnectProfile,
        lifecycle_rx: &mut mpsc::UnboundedReceiver<LifecycleEvent>,
        command_rx: &mut mpsc::UnboundedReceiver<Command>,
        hidden: &mut bool,
        failures: &mut u32,
    ) -> Disconnect {
        let (mut write, mut read) = stream.split();

        let init = WireMessage::ConnectionInit {
            payload: self.connection_params().await,
        };
        if let Err(e) = send_frame(&mut write, &init).await {
            return Disconnect::Transport {
                code: None,
                reason: e.to_string(),
            };
        }

        // The server must acknowledge before any traffic flows.
        match tokio::time::timeout(profile.keepalive, wait_for_ack(&mut read, &mut write)).await {
            Ok(Ok(())) => {}
            Ok(Err(disconnect)) => return disconnect,
            Err(_) => {
                return Disconnect::Transport {
                    code: None,
                    reason: "connection ack timeout".to_string(),
                }
            }
        }

        tracing::info!("live channel connected");
        self.emit(ChannelEvent::Connected);
        *failures = 0;

        // Commands queued while disconnected are covered by the registry
        // re-send below; drop them so no operation is issued twice.
        while command_rx.try_recv().is_ok() {}

        // Streaming operations survive reconnects: re-issue every
        // registered subscription on the fresh connection. Collected first
        // so no map shard lock is held across an await.
        let frames: Vec<WireMessage> = self
            .subscriptions
            .iter()
            .map(|entry| WireMessage::Subscribe {
                id: entry.key().clone(),
                payload: entry.value().payload.clone(),
            })
            .collect();
        for frame in frames {
            if let Err(e) = send_frame(&mut write, &frame).await {
                return Disconnect::Transport {
                    code: None,
                    reason: e.to_string(),
                };
            }
        }

        let mut ping = tokio::time::interval(profile.keepalive);
        ping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ping.tick().await; // first tick completes immediately

        loop {
            tokio::select! {
                msg = read.next() => match msg {
                    None => {
                        return Disconnect::Transport {
                            code: None,
                            reason: "stream ended".to_string(),
                        }
                    }
                    Some(Err(e)) => {
                        return Disconnect::Transport {
                            code: None,
                            reason: e.to_string(),
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        let (code, reason) = match frame {
                            Some(f) => (Some(u16::from(f.code)), f.reason.to_string()),
                            None => (None, String::new()),
                        };
                        return Disconnect::Transport { code, reason };
                    }
                    Some(Ok(Message::Text(text))) => {
                        self.handle_frame(&text, &mut write).await;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        write.send(Message::Pong(data)).await.ok();
                    }
                    Some(Ok(_)) => {}
                },
                _ = ping.tick() => {
                    let frame = WireMessage::Ping { payload: None };
                    if send_frame(&mut write, &frame).await.is_err() {
                        return Disconnect::Transport {
                            code: None,
                            reason: "keepalive send failed".to_string(),
                        };
                    }
                }
                Some(command) = command_rx.recv() => {
                    let frame = match command {
                        Command::Start(id) => self
                            .subscriptions
                            .get(&id)
                            .map(|entry| WireMessage::Subscribe {
                                id: id.clone(),
                                payload: entry.payload.clone(),
                            }),
                        Command::Stop(id) => Some(WireMessage::Complete { id }),
                    };
                    if let Some(frame) = frame {
                        if send_frame(&mut write, &frame).await.is_err() {
                            return Disconnect::Transport {
                                code: None,
                                reason: "subscribe send failed".to_string(),
                            };
                        }
                    }
                }
                Some(event) = lifecycle_rx.recv() => match event {
                    LifecycleEvent::Background => {
                        tracing::debug!("host backgrounded, connection left to the transport");
                        *hidden = true;
                    }
                    LifecycleEvent::Foreground | LifecycleEvent::PageRestored => {
                        *hidden = false;
                        return Disconnect::Resume;
                    }
                },
            }
        }
    }

    /// Handle one inbound text frame.
    async fn handle_frame(&self, text: &str, write: &mut WsSink) {
        let message: WireMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "unparseable frame on live channel");
                return;
            }
        };

        match message {
            WireMessage::Next { id, payload } => {
                if let Some(entry) = self.subscriptions.get(&id) {
                    entry.tx.send(payload).ok();
                }
            }
            WireMessage::Complete { id } => {
                self.subscriptions.remove(&id);
            }
            WireMessage::Error { id, payload } => {
                tracing::warn!(subscription = %id, ?payload, "streaming operation errored");
                self.subscriptions.remove(&id);
            }
            WireMessage::Ping { .. } => {
                let frame = WireMessage::Pong { payload: None };
                send_frame(write, &frame).await.ok();
            }
            // Late acks and pongs carry no information here.
            _ => {}
        }
    }

    /// Sleep out a backoff delay, honoring lifecycle signals: a background
    /// signal cancels the pending reconnect until the host is visible
    /// again, and returning to visibility shortens the wait to the class's
    /// resume delay.
    async fn wait_backoff(
        &self,
        delay: std::time::Duration,
        profile: &ReconnectProfile,
        lifecycle_rx: &mut mpsc::UnboundedReceiver<LifecycleEvent>,
        hidden: &mut bool,
    ) {
        if *hidden {
            self.park_until_visible(lifecycle_rx, hidden).await;
            tokio::time::sleep(profile.resume_delay).await;
            return;
        }

        tracing::debug!(delay_ms = delay.as_millis() as u64, "reconnect backoff");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            Some(event) = lifecycle_rx.recv() => match event {
                LifecycleEvent::Background => {
                    *hidden = true;
                    self.park_until_visible(lifecycle_rx, hidden).await;
                    tokio::time::sleep(profile.resume_delay).await;
                }
                LifecycleEvent::Foreground | LifecycleEvent::PageRestored => {
                    tokio::time::sleep(profile.resume_delay).await;
                }
            },
        }
    }

    /// Park while backgrounded; no reconnect activity until visible.
    async fn park_until_visible(
        &self,
        lifecycle_rx: &mut mpsc::UnboundedReceiver<LifecycleEvent>,
        hidden: &mut bool,
    ) {
        tracing::debug!("reconnect suspended while backgrounded");
        while let Some(event) = lifecycle_rx.recv().await {
            match event {
                LifecycleEvent::Foreground | LifecycleEvent::PageRestored => {
                    *hidden = false;
                    return;
                }
                LifecycleEvent::Background => {}
            }
        }
        // Lifecycle sender gone; nothing will wake us again.
        *hidden = false;
    }
}

/// True when a disconnect carries the unauthorized signal.
fn is_unauthorized(code: Option<u16>, reason: &str) -> bool {
    code == Some(UNAUTHORIZED_CLOSE_CODE) || reason.contains("401")
}

async fn send_frame(write: &mut WsSink, message: &WireMessage) -> Result<()> {
    let text =
        serde_json::to_string(message).map_err(|e| AppError::Channel(e.to_string()))?;
    write
        .send(Message::Text(text))
        .await
        .map_err(|e| AppError::Channel(e.to_string()))
}

/// Read until the server acknowledges the connection.
async fn wait_for_ack(
    read: &mut WsSource,
    write: &mut WsSink,
) -> std::result::Result<(), Disconnect> {
    while let Some(msg) = read.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<WireMessage>(&text) {
                Ok(WireMessage::ConnectionAck { .. }) => return Ok(()),
                Ok(WireMessage::Ping { .. }) => {
                    let frame = WireMessage::Pong { payload: None };
                    send_frame(write, &frame).await.ok();
                }
                _ => {}
            },
            Ok(Message::Close(frame)) => {
                let (code, reason) = match frame {
                    Some(f) => (Some(u16::from(f.code)), f.reason.to_string()),
                    None => (None, String::new()),
                };
                return Err(Disconnect::Transport { code, reason });
            }
            Ok(Message::Ping(data)) => {
                write.send(Message::Pong(data)).await.ok();
            }
            Ok(_) => {}
            Err(e) => {
                return Err(Disconnect::Transport {
                    code: None,
                    reason: e.to_string(),
                })
            }
        }
    }
    Err(Disconnect::Transport {
        code: None,
        reason: "stream ended before ack".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_signal_detection() {
        assert!(is_unauthorized(Some(4401), ""));
        assert!(is_unauthorized(None, "HTTP 401 Unauthorized"));
        assert!(!is_unauthorized(Some(1000), "normal closure"));
        assert!(!is_unauthorized(None, ""));
    }

    #[test]
    fn test_wire_message_round_trip() {
        let frame: WireMessage =
            serde_json::from_str(r#"{"type":"next","id":"1","payload":{"n":1}}"#)
                .expect("next frame should parse");
        assert!(matches!(frame, WireMessage::Next { .. }));

        let init = WireMessage::ConnectionInit {
            payload: json!({ "authToken": null }),
        };
        let text = serde_json::to_string(&init).expect("should serialize");
        assert!(text.contains(r#""type":"connection_init""#));
    }

    #[test]
    fn test_request_response_rejected_by_subscribe() {
        let config = Config::test_default();
        let store = CredentialStore::new(std::env::temp_dir().join("chan-test-credential"));
        let channel = LiveChannel::new(&config, store);

        let result = channel.subscribe("query GetEvents { getEvents }", json!({}));
        assert!(matches!(result, Err(AppError::BadRequest(_))));

        let result = channel.subscribe("subscription OnZoneChange { zones }", json!({}));
        assert!(result.is_ok());
    }
}
