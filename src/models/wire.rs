// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Normalization of loosely typed backend responses.
//!
//! The backend has grown several envelope shapes over time. Each one is
//! recognized here and converted to the canonical model types, so nothing
//! past this module ever looks at raw JSON.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::models::{
    ItemRef, ItemSnapshot, Match, MatchStatus, Notification, NotificationKind, SimilarityResult,
};

/// Known shapes of a match-list response.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchListEnvelope {
    /// `{status:"success", matches}` or `{status:"success", data:{matches}}`
    Success(Vec<Value>),
    /// `{matches}` or a bare array, with no status stamp
    Unstamped(Vec<Value>),
    /// `{status:"error", message}` or `{error}`
    Failure(String),
    /// Stamped as success but carrying no match array
    Empty,
}

impl MatchListEnvelope {
    /// Classify a response body. Unknown shapes are a `Service` error.
    pub fn parse(body: &Value) -> Result<Self> {
        if let Some(items) = body.as_array() {
            return Ok(MatchListEnvelope::Unstamped(items.clone()));
        }

        let Some(obj) = body.as_object() else {
            return Err(invalid_format());
        };

        if let Some(message) = failure_message(body) {
            return Ok(MatchListEnvelope::Failure(message));
        }

        let matches = obj
            .get("matches")
            .or_else(|| obj.get("data").and_then(|data| data.get("matches")))
            .and_then(Value::as_array);

        match (obj.get("status").and_then(Value::as_str), matches) {
            (Some("success"), Some(items)) => Ok(MatchListEnvelope::Success(items.clone())),
            (Some("success"), None) => Ok(MatchListEnvelope::Empty),
            (None, Some(items)) => Ok(MatchListEnvelope::Unstamped(items.clone())),
            _ => Err(invalid_format()),
        }
    }

    /// Matches from a stamped success envelope only.
    pub fn require_success(self) -> Result<Vec<Match>> {
        match self {
            MatchListEnvelope::Success(items) => normalize_matches(&items),
            MatchListEnvelope::Failure(message) => Err(ClientError::Service(message)),
            MatchListEnvelope::Unstamped(_) | MatchListEnvelope::Empty => Err(invalid_format()),
        }
    }

    /// Matches from any non-failure envelope.
    pub fn into_matches(self) -> Result<Vec<Match>> {
        match self {
            MatchListEnvelope::Success(items) | MatchListEnvelope::Unstamped(items) => {
                normalize_matches(&items)
            }
            MatchListEnvelope::Empty => Ok(Vec::new()),
            MatchListEnvelope::Failure(message) => Err(ClientError::Service(message)),
        }
    }
}

fn invalid_format() -> ClientError {
    ClientError::Service("Invalid response format".to_string())
}

/// Error text from a failure body, if the body is one.
///
/// Recognizes `{error: "..."}` and `{status: "error", message: "..."}`.
pub fn failure_message(body: &Value) -> Option<String> {
    if let Some(error) = body.get("error") {
        let message = error
            .as_str()
            .map(String::from)
            .or_else(|| body.get("message").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| error.to_string());
        return Some(message);
    }

    let status = body.get("status").and_then(Value::as_str)?;
    if status == "error" || status == "fail" {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Request failed")
            .to_string();
        return Some(message);
    }
    None
}

/// Turn an id that may be a string, number or embedded object into a string.
///
/// Objects are searched for `_id`, `id` and `$oid` in that order.
pub fn normalize_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => ["_id", "id", "$oid"]
            .iter()
            .find_map(|key| obj.get(*key).and_then(normalize_id)),
        _ => None,
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}

fn timestamp_field(value: &Value, key: &str) -> Option<DateTime<Utc>> {
    match value.get(key)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|d| d.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

fn item_ref(value: &Value) -> Option<ItemRef> {
    if value.is_object() {
        let id = normalize_id(value)?;
        return Some(ItemRef::Snapshot(ItemSnapshot {
            id,
            item_name: string_field(value, "itemName"),
            description: string_field(value, "description"),
            location: string_field(value, "location"),
            category: string_field(value, "category"),
        }));
    }
    normalize_id(value).map(ItemRef::Id)
}

/// First present key wins; the backend is inconsistent about naming.
fn first<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| value.get(*key).filter(|v| !v.is_null()))
}

/// Convert one raw match into the canonical form.
pub fn normalize_match(raw: &Value) -> Result<Match> {
    let id = first(raw, &["_id", "id"])
        .and_then(normalize_id)
        .ok_or_else(|| ClientError::Service("Match is missing an id".to_string()))?;

    let similarity_score = match first(raw, &["similarityScore", "similarity_score"])
        .and_then(Value::as_f64)
    {
        Some(score) => score.clamp(0.0, 1.0),
        None => {
            tracing::debug!(match_id = %id, "Match has no numeric score, treating as 0");
            0.0
        }
    };

    let status = raw
        .get("status")
        .and_then(Value::as_str)
        .and_then(MatchStatus::parse)
        .unwrap_or(MatchStatus::Pending);

    Ok(Match {
        id,
        lost_item: first(raw, &["lostItem", "lostItemId"]).and_then(item_ref),
        found_item: first(raw, &["foundItem", "foundItemId"]).and_then(item_ref),
        lost_user_id: raw.get("lostUserId").and_then(normalize_id),
        found_user_id: raw.get("foundUserId").and_then(normalize_id),
        similarity_score,
        status,
        created_at: timestamp_field(raw, "createdAt"),
    })
}

fn normalize_matches(items: &[Value]) -> Result<Vec<Match>> {
    items.iter().map(normalize_match).collect()
}

/// Parse a `POST /api/match` response.
pub fn parse_similarity(body: &Value) -> Result<SimilarityResult> {
    if let Some(message) = failure_message(body) {
        return Err(ClientError::Service(message));
    }

    let score = body
        .get("similarity_score")
        .and_then(Value::as_f64)
        .ok_or_else(invalid_format)?;

    Ok(SimilarityResult {
        score: score.clamp(0.0, 1.0),
        preprocessed_lost: string_field(body, "preprocessed_lost"),
        preprocessed_found: string_field(body, "preprocessed_found"),
    })
}

/// Check a `{status}` acknowledgement such as the record-match response.
pub fn require_ack(body: &Value) -> Result<()> {
    if let Some(message) = failure_message(body) {
        return Err(ClientError::Service(message));
    }
    match body.get("status").and_then(Value::as_str) {
        Some("success") => Ok(()),
        _ => Err(invalid_format()),
    }
}

/// Parse a `GET /match/:id` response.
pub fn parse_match_details(body: &Value) -> Result<Match> {
    if let Some(message) = failure_message(body) {
        return Err(ClientError::Service(message));
    }
    let raw = first(body, &["match", "data"]).ok_or_else(invalid_format)?;
    normalize_match(raw)
}

/// A page of notifications from the listing or poll endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub has_more: bool,
}

/// Parse a notification listing or poll response.
///
/// Entries without an id are dropped. Entries without a creation time get
/// `received_at`.
pub fn parse_notifications(body: &Value, received_at: DateTime<Utc>) -> Result<NotificationPage> {
    if let Some(message) = failure_message(body) {
        return Err(ClientError::Service(message));
    }

    let items = match body {
        Value::Array(items) => items,
        _ => body
            .get("notifications")
            .and_then(Value::as_array)
            .ok_or_else(invalid_format)?,
    };

    let notifications = items
        .iter()
        .filter_map(|raw| {
            let parsed = normalize_notification(raw, received_at);
            if parsed.is_none() {
                tracing::debug!(notification = %raw, "Dropping notification without id");
            }
            parsed
        })
        .collect();

    Ok(NotificationPage {
        notifications,
        has_more: body.get("hasMore").and_then(Value::as_bool).unwrap_or(false),
    })
}

/// Convert one raw server notification.
pub fn normalize_notification(raw: &Value, received_at: DateTime<Utc>) -> Option<Notification> {
    let id = first(raw, &["_id", "id"]).and_then(normalize_id)?;
    let kind = NotificationKind::from(raw.get("type").and_then(Value::as_str).unwrap_or("system"));

    let (title, message) = if kind == NotificationKind::ItemReposted {
        (
            "New Lost Item Reported".to_string(),
            format!(
                "A user has reported a lost item: {}",
                string_field(raw, "itemDescription").unwrap_or_default()
            ),
        )
    } else {
        (
            string_field(raw, "title").unwrap_or_default(),
            string_field(raw, "message").unwrap_or_default(),
        )
    };

    Some(Notification {
        id,
        kind,
        title,
        message,
        read: raw.get("read").and_then(Value::as_bool).unwrap_or(false),
        created_at: timestamp_field(raw, "createdAt").unwrap_or(received_at),
        match_id: raw.get("matchId").and_then(normalize_id),
        similarity_score: raw.get("similarityScore").and_then(Value::as_f64),
        lost_item_id: raw.get("lostItemId").and_then(normalize_id),
        found_item_id: raw.get("foundItemId").and_then(normalize_id),
        location: string_field(raw, "location"),
    })
}
