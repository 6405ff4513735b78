// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Query/mutation gateway against the admin GraphQL endpoint.
//!
//! Handles:
//! - Request/response GraphQL calls with the uniform response envelope
//! - Bearer credential attachment when one is stored
//! - The admin REST sidecar (login exchange, coupon sharing)
//!
//! The gateway itself never interprets envelope codes; typed wrappers check
//! the one code their operation expects and treat any other code as absence
//! of data. There is no automatic retry for request/response calls.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    AgeBucket, Event, EventDraft, GenderSplit, PaginateRequest, SiteConfig, UserCountBucket,
    UserPage, ZoneConfig, ZoneDraft,
};
use crate::services::operations::{self, OperationSpec};
use crate::session::CredentialStore;

/// REST coupon-share success code.
const COUPON_SUCCESS_CODE: &str = "CODE-000";

/// Uniform response wrapper returned by every backend call.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEnvelope {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl ResponseEnvelope {
    /// Extract the payload for `op`.
    ///
    /// A code mismatch (for operations that define a success code) or a
    /// missing payload is a no-data outcome, indistinguishable from
    /// legitimately empty; it is never a typed error. Malformed payloads
    /// are errors.
    pub fn take_data<T: DeserializeOwned>(self, op: &OperationSpec) -> Result<Option<T>> {
        if let Some(expected) = op.success_code {
            if self.code != expected {
                tracing::debug!(
                    operation = op.name,
                    code = %self.code,
                    "unexpected envelope code, treating as no data"
                );
                return Ok(None);
            }
        }

        match self.data {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| AppError::Envelope(format!("{}: {}", op.name, e))),
            None => Ok(None),
        }
    }
}

/// Admin backend client.
#[derive(Clone)]
pub struct Gateway {
    http: reqwest::Client,
    service_url: String,
    auth_url: String,
    ticketing_url: String,
    store: CredentialStore,
}

impl Gateway {
    /// Create a gateway from configuration.
    pub fn new(config: &Config, store: CredentialStore) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            http,
            service_url: config.service_url(),
            auth_url: config.auth_url(),
            ticketing_url: config.ticketing_url(),
            store,
        }
    }

    /// Execute one request/response operation and return its envelope.
    ///
    /// Streaming operations are rejected; they belong on the live channel.
    pub async fn execute(&self, op: &OperationSpec, variables: Value) -> Result<ResponseEnvelope> {
        if op.kind().is_streaming() {
            return Err(AppError::BadRequest(format!(
                "streaming operation {} routed to the gateway",
                op.name
            )));
        }

        let body = json!({
            "operationName": op.name,
            "query": op.document,
            "variables": variables,
        });

        let mut request = self.http.post(&self.service_url).json(&body);
        if let Some(token) = self.store.load().await {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Api(e.to_string()))?;

        let payload: Value = self.check_response_json(response).await?;

        if let Some(errors) = payload.get("errors").and_then(Value::as_array) {
            if !errors.is_empty() {
                return Err(AppError::Envelope(format!(
                    "{}: {}",
                    op.name,
                    errors[0]
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("GraphQL error")
                )));
            }
        }

        let envelope = payload
            .get("data")
            .and_then(|data| data.get(op.field))
            .cloned()
            .ok_or_else(|| {
                AppError::Envelope(format!("{}: missing field {}", op.name, op.field))
            })?;

        serde_json::from_value(envelope)
            .map_err(|e| AppError::Envelope(format!("{}: {}", op.name, e)))
    }

    /// Execute and unwrap the payload with the operation's code rule.
    async fn fetch<T: DeserializeOwned>(
        &self,
        op: &OperationSpec,
        variables: Value,
    ) -> Result<Option<T>> {
        self.execute(op, variables).await?.take_data(op)
    }

    // ─── Typed wrappers ──────────────────────────────────────────────────────

    /// Registration counts in 30-minute buckets (unix-second bounds).
    pub async fn user_count_buckets(
        &self,
        start_time: i64,
        end_time: i64,
    ) -> Result<Option<Vec<UserCountBucket>>> {
        self.fetch(
            &operations::USER_COUNT_BUCKETS,
            json!({ "startTime": start_time, "endTime": end_time }),
        )
        .await
    }

    /// Current site lockdown configuration.
    pub async fn site_config(&self) -> Result<Option<SiteConfig>> {
        self.fetch(&operations::SITE_CONFIG, json!({})).await
    }

    /// Flip the site lockdown switch. Returns `true` iff the backend
    /// acknowledged with the update success code.
    pub async fn update_site_config(&self, state: bool, timestamp: i64) -> Result<bool> {
        let envelope = self
            .execute(
                &operations::SITE_CONFIG_UPDATE,
                json!({ "state": state, "timestamp": timestamp }),
            )
            .await?;
        Ok(envelope.code == "CODE-4003")
    }

    /// Gender split counters.
    pub async fn gender_split(&self) -> Result<Option<GenderSplit>> {
        self.fetch(&operations::GENDER_SPLIT, json!({})).await
    }

    /// Age distribution buckets.
    pub async fn age_distribution(&self) -> Result<Option<Vec<AgeBucket>>> {
        self.fetch(&operations::AGE_DISTRIBUTION, json!({})).await
    }

    /// One page of users, optionally filtered by a search term.
    pub async fn users(
        &self,
        paginate: &PaginateRequest,
        search_term: Option<&str>,
    ) -> Result<Option<UserPage>> {
        self.fetch(
            &operations::USERS,
            json!({ "paginateRequest": paginate, "searchTerm": search_term }),
        )
        .await
    }

    /// Activate or deactivate a user. The response payload is ignored;
    /// callers refetch the authoritative listing afterwards.
    pub async fn set_user_activation(&self, user_id: &str, state: bool) -> Result<()> {
        self.execute(
            &operations::USER_ACTIVATION,
            json!({ "userId": user_id, "state": state }),
        )
        .await?;
        Ok(())
    }

    /// All events.
    pub async fn events(&self) -> Result<Option<Vec<Event>>> {
        self.fetch(&operations::EVENTS, json!({})).await
    }

    /// Zones of one event.
    pub async fn zone_config(&self, event_id: &str) -> Result<Option<Vec<ZoneConfig>>> {
        self.fetch(&operations::ZONE_CONFIG, json!({ "eventId": event_id }))
            .await
    }

    /// All zones across all events.
    pub async fn all_zones(&self) -> Result<Option<Vec<ZoneConfig>>> {
        self.fetch(&operations::ALL_ZONES, json!({})).await
    }

    /// Create (`id == None`) or update an event.
    pub async fn save_event(&self, id: Option<&str>, draft: &EventDraft) -> Result<()> {
        self.execute(
            &operations::SAVE_EVENT,
            json!({ "eventId": id, "event": draft }),
        )
        .await?;
        Ok(())
    }

    /// Delete an event by document id.
    pub async fn delete_event(&self, id: &str) -> Result<()> {
        self.execute(&operations::DELETE_EVENT, json!({ "eventId": id }))
            .await?;
        Ok(())
    }

    /// Create (`id == None`) or update a zone.
    pub async fn save_zone(&self, id: Option<&str>, draft: &ZoneDraft) -> Result<()> {
        self.execute(
            &operations::SAVE_ZONE,
            json!({ "zoneId": id, "zone": draft }),
        )
        .await?;
        Ok(())
    }

    /// Delete a zone by document id.
    pub async fn delete_zone(&self, id: &str) -> Result<()> {
        self.execute(&operations::DELETE_ZONE, json!({ "zoneId": id }))
            .await?;
        Ok(())
    }

    // ─── REST sidecar ────────────────────────────────────────────────────────

    /// Login exchange: posts the credential to the admin auth endpoint and
    /// returns the raw envelope for the session guard to interpret.
    pub async fn login(&self, email: Option<&str>, auth_key: &str) -> Result<ResponseEnvelope> {
        let response = self
            .http
            .post(&self.auth_url)
            .json(&json!({ "email": email, "authKey": auth_key }))
            .send()
            .await
            .map_err(|e| AppError::Api(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Share a coupon batch with one recipient. Returns `true` iff the
    /// backend acknowledged with the send success code.
    pub async fn share_coupon(&self, email: &str, coupons: &str) -> Result<bool> {
        let url = format!("{}/sendgrid/share-coupon", self.ticketing_url);

        let mut request = self
            .http
            .post(&url)
            .json(&json!({ "email": email, "coupons": coupons }));
        if let Some(token) = self.store.load().await {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Api(e.to_string()))?;

        let envelope: ResponseEnvelope = self.check_response_json(response).await?;
        Ok(envelope.code == COUPON_SUCCESS_CODE)
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 401 {
                return Err(AppError::Unauthorized);
            }

            return Err(AppError::Api(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Api(format!("JSON parse error: {}", e)))
    }
}
