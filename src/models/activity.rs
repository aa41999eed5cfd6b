// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Lost/found activity model as persisted on the device.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time_utils::relative_date;

/// Whether the user lost or found the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Lost,
    Found,
}

/// Lifecycle status of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    Pending,
    Matched,
    Returned,
    Claimed,
    Unclaimed,
    Held,
    EligibleForDonation,
    Donated,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Pending => "pending",
            ActivityStatus::Matched => "matched",
            ActivityStatus::Returned => "returned",
            ActivityStatus::Claimed => "claimed",
            ActivityStatus::Unclaimed => "unclaimed",
            ActivityStatus::Held => "held",
            ActivityStatus::EligibleForDonation => "eligible_for_donation",
            ActivityStatus::Donated => "donated",
        }
    }
}

impl std::fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored activity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    /// Server id, or `local-<uuid>` until the server confirms the report
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub status: ActivityStatus,
    /// Creation time; sort key and age base for the aging policy
    pub timestamp: DateTime<Utc>,
    /// Display string derived from `timestamp`
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,
}

impl Activity {
    /// Recompute the display date against `now`.
    pub fn refresh_date(&mut self, now: DateTime<Utc>) {
        self.date = relative_date(self.timestamp, now);
    }

    /// Only found items that aged into `eligible_for_donation` can be donated.
    pub fn is_eligible_for_donation(&self) -> bool {
        self.kind == ActivityKind::Found && self.status == ActivityStatus::EligibleForDonation
    }

    pub fn is_local(&self) -> bool {
        self.id.starts_with(LOCAL_ID_PREFIX)
    }
}

/// Prefix of ids generated on the device before the server assigns one.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// A new report to mirror locally.
#[derive(Debug, Clone)]
pub struct ActivityInput {
    pub kind: ActivityKind,
    pub title: String,
    pub location: String,
    pub description: String,
    pub category: String,
    pub status: ActivityStatus,
    /// Id returned by the backend, if the report already went through
    pub server_id: Option<String>,
    pub reported_by: Option<String>,
}

impl ActivityInput {
    /// A pending report with only the required fields set.
    pub fn new(kind: ActivityKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            location: String::new(),
            description: String::new(),
            category: String::new(),
            status: ActivityStatus::Pending,
            server_id: None,
            reported_by: None,
        }
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn status(mut self, status: ActivityStatus) -> Self {
        self.status = status;
        self
    }

    pub fn server_id(mut self, id: impl Into<String>) -> Self {
        self.server_id = Some(id.into());
        self
    }
}

/// Activity list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityFilter {
    All,
    Kind(ActivityKind),
    Status(ActivityStatus),
}

impl ActivityFilter {
    pub fn matches(&self, activity: &Activity) -> bool {
        match self {
            ActivityFilter::All => true,
            ActivityFilter::Kind(kind) => activity.kind == *kind,
            ActivityFilter::Status(status) => activity.status == *status,
        }
    }
}
