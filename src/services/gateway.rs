// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FindIt backend API client.
//!
//! Every call returns the decoded JSON body; turning it into model types is
//! left to `models::wire` so fakes only need to produce JSON.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::{ItemKind, MatchStatus, RecordMatchRequest};

/// Backend operations consumed by the client core.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// `POST /api/match`
    async fn check_similarity(&self, lost_desc: &str, found_desc: &str) -> Result<Value>;

    /// `GET /api/view-matches?userId&page&limit`
    async fn view_matches(&self, user_id: &str, page: u32, limit: u32) -> Result<Value>;

    /// `GET /api/dev/all-matches`
    async fn all_matches(&self) -> Result<Value>;

    /// `POST /api/record-match`
    async fn record_match(&self, request: &RecordMatchRequest) -> Result<Value>;

    /// `GET /api/matches/user/:userId`
    async fn user_matches(&self, user_id: &str) -> Result<Value>;

    /// `GET /match/:matchId`
    async fn match_details(&self, match_id: &str) -> Result<Value>;

    /// `PUT /update-match-status/:matchId`
    async fn update_match_status(&self, match_id: &str, status: MatchStatus) -> Result<Value>;

    /// `GET /api/matches/:itemId/:itemType`
    async fn potential_matches(&self, item_id: &str, kind: ItemKind) -> Result<Value>;

    /// `POST /api/confirm-match/:matchId`
    async fn confirm_match(&self, match_id: &str) -> Result<Value>;

    /// `GET /api/notifications/:userId?page&limit`
    async fn list_notifications(&self, user_id: &str, page: u32, limit: u32) -> Result<Value>;

    /// `GET /api/notifications/poll/:userId?lastPolled=<ms>`
    async fn poll_notifications(&self, user_id: &str, last_polled_ms: i64) -> Result<Value>;

    /// `PUT /api/notifications/:id/read`
    async fn mark_notification_read(&self, notification_id: &str) -> Result<()>;

    /// `PUT /api/notifications/:userId/read-all`
    async fn mark_all_notifications_read(&self, user_id: &str) -> Result<()>;
}

/// reqwest-backed gateway.
#[derive(Clone)]
pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    request_timeout: Duration,
    detail_timeout: Duration,
}

impl HttpGateway {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
            request_timeout: config.request_timeout,
            detail_timeout: config.detail_timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request with the given timeout and decode the JSON body.
    async fn send_json(
        &self,
        builder: reqwest::RequestBuilder,
        timeout: Duration,
    ) -> Result<Value> {
        let response = self
            .authorized(builder)
            .timeout(timeout)
            .send()
            .await
            .map_err(transport_error)?;

        self.check_response_json(response).await
    }

    /// Send a request whose body we don't care about.
    async fn send_unit(&self, builder: reqwest::RequestBuilder) -> Result<()> {
        let response = self
            .authorized(builder)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            return Ok(());
        }
        Err(status_error(response).await)
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json(&self, response: reqwest::Response) -> Result<Value> {
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(e.to_string())
            } else {
                tracing::warn!(error = %e, "Backend returned a non-JSON body");
                ClientError::Service("Invalid response format".to_string())
            }
        })
    }
}

/// Map a send failure to `Timeout` or `Network`.
fn transport_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout(e.to_string())
    } else {
        ClientError::Network(e.to_string())
    }
}

/// Build a `Service` error from a non-2xx response, preferring the
/// server's own message.
async fn status_error(response: reqwest::Response) -> ClientError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|json| {
            ["message", "error"]
                .iter()
                .find_map(|key| json.get(*key).and_then(Value::as_str).map(String::from))
        })
        .unwrap_or_else(|| format!("HTTP {}", status));

    tracing::warn!(status = status.as_u16(), message = %message, "Backend request failed");
    ClientError::Service(message)
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[async_trait]
impl RemoteGateway for HttpGateway {
    async fn check_similarity(&self, lost_desc: &str, found_desc: &str) -> Result<Value> {
        let body = serde_json::json!({
            "lost_desc": lost_desc,
            "found_desc": found_desc,
        });
        self.send_json(
            self.http.post(self.url("/api/match")).json(&body),
            self.request_timeout,
        )
        .await
    }

    async fn view_matches(&self, user_id: &str, page: u32, limit: u32) -> Result<Value> {
        let builder = self.http.get(self.url("/api/view-matches")).query(&[
            ("userId", user_id.to_string()),
            ("page", page.to_string()),
            ("limit", limit.to_string()),
        ]);
        self.send_json(builder, self.request_timeout).await
    }

    async fn all_matches(&self) -> Result<Value> {
        self.send_json(
            self.http.get(self.url("/api/dev/all-matches")),
            self.request_timeout,
        )
        .await
    }

    async fn record_match(&self, request: &RecordMatchRequest) -> Result<Value> {
        self.send_json(
            self.http.post(self.url("/api/record-match")).json(request),
            self.request_timeout,
        )
        .await
    }

    async fn user_matches(&self, user_id: &str) -> Result<Value> {
        let url = self.url(&format!("/api/matches/user/{}", segment(user_id)));
        self.send_json(self.http.get(url), self.request_timeout)
            .await
    }

    async fn match_details(&self, match_id: &str) -> Result<Value> {
        let url = self.url(&format!("/match/{}", segment(match_id)));
        self.send_json(self.http.get(url), self.detail_timeout).await
    }

    async fn update_match_status(&self, match_id: &str, status: MatchStatus) -> Result<Value> {
        let url = self.url(&format!("/update-match-status/{}", segment(match_id)));
        let body = serde_json::json!({ "status": status.as_str() });
        self.send_json(self.http.put(url).json(&body), self.request_timeout)
            .await
    }

    async fn potential_matches(&self, item_id: &str, kind: ItemKind) -> Result<Value> {
        let url = self.url(&format!(
            "/api/matches/{}/{}",
            segment(item_id),
            kind.as_str()
        ));
        self.send_json(self.http.get(url), self.detail_timeout).await
    }

    async fn confirm_match(&self, match_id: &str) -> Result<Value> {
        let url = self.url(&format!("/api/confirm-match/{}", segment(match_id)));
        let body = serde_json::json!({ "status": "confirmed" });
        self.send_json(self.http.post(url).json(&body), self.detail_timeout)
            .await
    }

    async fn list_notifications(&self, user_id: &str, page: u32, limit: u32) -> Result<Value> {
        let url = self.url(&format!("/api/notifications/{}", segment(user_id)));
        let builder = self
            .http
            .get(url)
            .query(&[("page", page.to_string()), ("limit", limit.to_string())]);
        self.send_json(builder, self.request_timeout).await
    }

    async fn poll_notifications(&self, user_id: &str, last_polled_ms: i64) -> Result<Value> {
        let url = self.url(&format!("/api/notifications/poll/{}", segment(user_id)));
        let builder = self
            .http
            .get(url)
            .query(&[("lastPolled", last_polled_ms.to_string())]);
        self.send_json(builder, self.request_timeout).await
    }

    async fn mark_notification_read(&self, notification_id: &str) -> Result<()> {
        let url = self.url(&format!(
            "/api/notifications/{}/read",
            segment(notification_id)
        ));
        self.send_unit(self.http.put(url)).await
    }

    async fn mark_all_notifications_read(&self, user_id: &str) -> Result<()> {
        let url = self.url(&format!("/api/notifications/{}/read-all", segment(user_id)));
        self.send_unit(self.http.put(url)).await
    }
}
