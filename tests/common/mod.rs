// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: scripted backend, credential minting, config.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use ticketing_admin::config::Config;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One request the scripted backend saw.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

impl RecordedRequest {
    /// GraphQL operation name, when the request carried one.
    #[allow(dead_code)]
    pub fn operation(&self) -> Option<&str> {
        self.body.get("operationName").and_then(Value::as_str)
    }
}

/// Minimal scripted HTTP backend.
///
/// Responses are keyed by GraphQL operation name (for gateway calls) or by
/// request path (for the REST sidecar). Every request is recorded for
/// assertions.
#[derive(Clone)]
pub struct ScriptedBackend {
    pub base_url: String,
    responses: Arc<Mutex<HashMap<String, (u16, Value)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedBackend {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind scripted backend");
        let addr = listener.local_addr().expect("local addr");

        let backend = Self {
            base_url: format!("http://{}", addr),
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let accept = backend.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let backend = accept.clone();
                tokio::spawn(async move {
                    backend.handle(stream).await;
                });
            }
        });

        backend
    }

    /// Script a 200 response for an operation name or path.
    #[allow(dead_code)]
    pub fn respond(&self, key: &str, body: Value) {
        self.respond_status(key, 200, body);
    }

    /// Script a response with an explicit status.
    #[allow(dead_code)]
    pub fn respond_status(&self, key: &str, status: u16, body: Value) {
        self.responses
            .lock()
            .expect("responses lock")
            .insert(key.to_string(), (status, body));
    }

    /// All recorded requests so far.
    #[allow(dead_code)]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    async fn handle(&self, mut stream: TcpStream) {
        let mut buf = Vec::new();
        let mut tmp = [0u8; 1024];

        let header_end = loop {
            let n = stream.read(&mut tmp).await.unwrap_or(0);
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&tmp[..n]);
            if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
                break pos + 4;
            }
            if buf.len() > 65536 {
                return;
            }
        };

        let header_text = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let mut lines = header_text.lines();
        let request_line = lines.next().unwrap_or_default();
        let path = request_line
            .split_whitespace()
            .nth(1)
            .unwrap_or("/")
            .to_string();

        let mut content_length = 0usize;
        let mut authorization = None;
        for line in lines {
            let lower = line.to_ascii_lowercase();
            if let Some(value) = lower.strip_prefix("content-length:") {
                content_length = value.trim().parse().unwrap_or(0);
            }
            if lower.starts_with("authorization:") {
                authorization = Some(line["authorization:".len()..].trim().to_string());
            }
        }

        let mut body_bytes = buf[header_end..].to_vec();
        while body_bytes.len() < content_length {
            let n = stream.read(&mut tmp).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            body_bytes.extend_from_slice(&tmp[..n]);
        }
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        let key = body
            .get("operationName")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| path.clone());

        self.requests
            .lock()
            .expect("requests lock")
            .push(RecordedRequest {
                path,
                authorization,
                body,
            });

        let (status, payload) = self
            .responses
            .lock()
            .expect("responses lock")
            .get(&key)
            .cloned()
            .unwrap_or((404, json!({ "error": "no scripted response" })));

        let reason = match status {
            200 => "OK",
            401 => "Unauthorized",
            404 => "Not Found",
            _ => "Status",
        };
        let body_text = payload.to_string();
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason,
            body_text.len(),
            body_text
        );
        stream.write_all(response.as_bytes()).await.ok();
        stream.shutdown().await.ok();
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Wrap an envelope the way the GraphQL endpoint nests it.
#[allow(dead_code)]
pub fn graphql_envelope(field: &str, code: &str, data: Value) -> Value {
    json!({
        "data": {
            field: {
                "code": code,
                "message": null,
                "data": data,
                "error": null,
            }
        }
    })
}

/// Mint a signed test credential expiring at `exp` (unix seconds).
#[allow(dead_code)]
pub fn mint_token(exp: i64) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims {
        exp: i64,
        email: String,
    }

    encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            exp,
            email: "admin@example.com".to_string(),
        },
        &EncodingKey::from_secret(b"test_signing_key_32_bytes_long!!"),
    )
    .expect("Failed to create test credential")
}

/// Test config wired to a scripted backend, with a unique credential path.
#[allow(dead_code)]
pub fn test_config(backend: &ScriptedBackend, name: &str) -> Config {
    let mut config = Config::test_default();
    config.backend_url = backend.base_url.clone();
    config.credential_path = std::env::temp_dir()
        .join("ticketing-admin-it")
        .join(name)
        .join("credential");
    config
}

/// Bind a listener for a scripted WebSocket backend; returns the listener
/// and a config whose streaming endpoint points at it.
#[allow(dead_code)]
pub async fn bind_ws(name: &str) -> (TcpListener, Config) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ws backend");
    let addr = listener.local_addr().expect("local addr");

    let mut config = Config::test_default();
    config.backend_url = format!("http://{}", addr);
    config.credential_path = std::env::temp_dir()
        .join("ticketing-admin-it")
        .join(name)
        .join("credential");
    (listener, config)
}
