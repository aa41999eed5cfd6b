// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Notification model, including notifications synthesized from matches.

use chrono::{DateTime, Utc};

use crate::models::Match;

/// Id prefix for notifications built locally from a match.
pub const MATCH_NOTIFICATION_PREFIX: &str = "match_";

/// Notification type as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    MatchFound,
    MessageReceived,
    System,
    LostItemReport,
    LostItemRepost,
    ItemReposted,
    ItemReturned,
    Other(String),
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::MatchFound => "match_found",
            NotificationKind::MessageReceived => "message_received",
            NotificationKind::System => "system",
            NotificationKind::LostItemReport => "lost_item_report",
            NotificationKind::LostItemRepost => "lost_item_repost",
            NotificationKind::ItemReposted => "item_reposted",
            NotificationKind::ItemReturned => "item_returned",
            NotificationKind::Other(kind) => kind,
        }
    }
}

impl From<&str> for NotificationKind {
    fn from(value: &str) -> Self {
        match value {
            "match_found" => NotificationKind::MatchFound,
            "message_received" => NotificationKind::MessageReceived,
            "system" => NotificationKind::System,
            "lost_item_report" => NotificationKind::LostItemReport,
            "lost_item_repost" => NotificationKind::LostItemRepost,
            "item_reposted" => NotificationKind::ItemReposted,
            "item_returned" => NotificationKind::ItemReturned,
            other => NotificationKind::Other(other.to_string()),
        }
    }
}

/// A notification in the merged in-memory list.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub match_id: Option<String>,
    pub similarity_score: Option<f64>,
    pub lost_item_id: Option<String>,
    pub found_item_id: Option<String>,
    pub location: Option<String>,
}

impl Notification {
    /// Build the "potential match" notification for a match.
    ///
    /// Matches without a creation time are stamped with `now`.
    pub fn from_match(m: &Match, now: DateTime<Utc>) -> Self {
        let lost_location = m
            .lost_item
            .as_ref()
            .and_then(|item| item.snapshot())
            .and_then(|item| item.location.clone());

        Self {
            id: format!("{}{}", MATCH_NOTIFICATION_PREFIX, m.id),
            kind: NotificationKind::MatchFound,
            title: "Potential Match Found!".to_string(),
            message: format!(
                "Your lost item matches with a found item ({}% similarity)",
                m.similarity_percent()
            ),
            read: false,
            created_at: m.created_at.unwrap_or(now),
            match_id: Some(m.id.clone()),
            similarity_score: Some(m.similarity_score),
            lost_item_id: m.lost_item_id().map(String::from),
            found_item_id: m.found_item_id().map(String::from),
            location: lost_location,
        }
    }

    /// True for notifications that only exist on this device.
    pub fn is_synthetic(&self) -> bool {
        self.id.starts_with(MATCH_NOTIFICATION_PREFIX)
    }
}
