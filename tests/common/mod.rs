// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use findit_client::config::Config;
use findit_client::db::{KeyValueStore, MemoryStore};
use findit_client::error::{ClientError, Result};
use findit_client::models::{ItemKind, MatchStatus, RecordMatchRequest};
use findit_client::services::RemoteGateway;
use findit_client::time_utils::FixedClock;
use findit_client::FindItClient;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Backend endpoints the fake gateway can answer.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CheckSimilarity,
    ViewMatches,
    AllMatches,
    RecordMatch,
    UserMatches,
    MatchDetails,
    UpdateMatchStatus,
    PotentialMatches,
    ConfirmMatch,
    ListNotifications,
    PollNotifications,
    MarkRead,
    MarkAllRead,
}

/// Scripted backend: queued one-shot responses, then a per-endpoint default.
/// Unscripted calls fail with a network error. Every call is recorded.
#[derive(Default)]
pub struct FakeGateway {
    queued: Mutex<HashMap<Endpoint, VecDeque<(Result<Value>, Duration)>>>,
    defaults: Mutex<HashMap<Endpoint, Value>>,
    calls: Mutex<Vec<(Endpoint, String)>>,
}

#[allow(dead_code)]
impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_ok(&self, endpoint: Endpoint, body: Value) {
        self.push(endpoint, Ok(body), Duration::ZERO);
    }

    /// Queue a response that arrives only after `delay`.
    pub fn push_ok_after(&self, endpoint: Endpoint, body: Value, delay: Duration) {
        self.push(endpoint, Ok(body), delay);
    }

    pub fn push_err(&self, endpoint: Endpoint, err: ClientError) {
        self.push(endpoint, Err(err), Duration::ZERO);
    }

    fn push(&self, endpoint: Endpoint, response: Result<Value>, delay: Duration) {
        self.queued
            .lock()
            .unwrap()
            .entry(endpoint)
            .or_default()
            .push_back((response, delay));
    }

    pub fn set_default(&self, endpoint: Endpoint, body: Value) {
        self.defaults.lock().unwrap().insert(endpoint, body);
    }

    /// Number of calls made to one endpoint.
    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| *e == endpoint)
            .count()
    }

    /// Recorded arguments of each call to one endpoint, in order.
    pub fn call_args(&self, endpoint: Endpoint) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(e, _)| *e == endpoint)
            .map(|(_, args)| args.clone())
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    async fn answer(&self, endpoint: Endpoint, args: String) -> Result<Value> {
        self.calls.lock().unwrap().push((endpoint, args));

        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(&endpoint)
            .and_then(VecDeque::pop_front);
        if let Some((response, delay)) = queued {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            return response;
        }

        self.defaults
            .lock()
            .unwrap()
            .get(&endpoint)
            .cloned()
            .ok_or_else(|| ClientError::Network(format!("no response scripted for {:?}", endpoint)))
    }
}

#[async_trait]
impl RemoteGateway for FakeGateway {
    async fn check_similarity(&self, lost_desc: &str, found_desc: &str) -> Result<Value> {
        self.answer(
            Endpoint::CheckSimilarity,
            format!("{}|{}", lost_desc, found_desc),
        )
        .await
    }

    async fn view_matches(&self, user_id: &str, page: u32, limit: u32) -> Result<Value> {
        self.answer(
            Endpoint::ViewMatches,
            format!("{} page={} limit={}", user_id, page, limit),
        )
        .await
    }

    async fn all_matches(&self) -> Result<Value> {
        self.answer(Endpoint::AllMatches, String::new()).await
    }

    async fn record_match(&self, request: &RecordMatchRequest) -> Result<Value> {
        let args = serde_json::to_string(request).unwrap();
        self.answer(Endpoint::RecordMatch, args).await
    }

    async fn user_matches(&self, user_id: &str) -> Result<Value> {
        self.answer(Endpoint::UserMatches, user_id.to_string()).await
    }

    async fn match_details(&self, match_id: &str) -> Result<Value> {
        self.answer(Endpoint::MatchDetails, match_id.to_string()).await
    }

    async fn update_match_status(&self, match_id: &str, status: MatchStatus) -> Result<Value> {
        self.answer(
            Endpoint::UpdateMatchStatus,
            format!("{} {}", match_id, status.as_str()),
        )
        .await
    }

    async fn potential_matches(&self, item_id: &str, kind: ItemKind) -> Result<Value> {
        self.answer(
            Endpoint::PotentialMatches,
            format!("{} {}", item_id, kind.as_str()),
        )
        .await
    }

    async fn confirm_match(&self, match_id: &str) -> Result<Value> {
        self.answer(Endpoint::ConfirmMatch, match_id.to_string()).await
    }

    async fn list_notifications(&self, user_id: &str, page: u32, limit: u32) -> Result<Value> {
        self.answer(
            Endpoint::ListNotifications,
            format!("{} page={} limit={}", user_id, page, limit),
        )
        .await
    }

    async fn poll_notifications(&self, user_id: &str, last_polled_ms: i64) -> Result<Value> {
        self.answer(
            Endpoint::PollNotifications,
            format!("{} lastPolled={}", user_id, last_polled_ms),
        )
        .await
    }

    async fn mark_notification_read(&self, notification_id: &str) -> Result<()> {
        self.answer(Endpoint::MarkRead, notification_id.to_string())
            .await
            .map(|_| ())
    }

    async fn mark_all_notifications_read(&self, user_id: &str) -> Result<()> {
        self.answer(Endpoint::MarkAllRead, user_id.to_string())
            .await
            .map(|_| ())
    }
}

/// Fixed "now" used by every test clock.
#[allow(dead_code)]
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(base_time()))
}

/// Create a client over a fake gateway, an in-memory store and a fixed clock.
#[allow(dead_code)]
pub fn test_client(
    gateway: Arc<FakeGateway>,
    store: Arc<MemoryStore>,
    clock: Arc<FixedClock>,
) -> FindItClient {
    let store: Arc<dyn KeyValueStore> = store;
    FindItClient::with_parts(Config::default(), gateway, store, clock)
}

/// A raw match as the backend sends it.
#[allow(dead_code)]
pub fn match_json(id: &str, lost_user: &str, found_user: &str, score: f64) -> Value {
    json!({
        "_id": id,
        "lostItemId": {"_id": format!("lost-{}", id), "description": "red wallet", "location": "Library"},
        "foundItemId": {"_id": format!("found-{}", id), "description": "wallet, red"},
        "lostUserId": lost_user,
        "foundUserId": found_user,
        "similarityScore": score,
        "status": "pending",
        "createdAt": "2024-05-30T08:00:00.000Z"
    })
}

/// A raw server notification created `minute` minutes after 10:00 on 2024-05-31.
#[allow(dead_code)]
pub fn notification_json(id: &str, minute: u32, read: bool) -> Value {
    json!({
        "_id": id,
        "type": "system",
        "title": format!("Title {}", id),
        "message": format!("Message {}", id),
        "read": read,
        "createdAt": format!("2024-05-31T10:{:02}:00.000Z", minute)
    })
}
