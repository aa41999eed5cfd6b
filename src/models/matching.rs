// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Match model and the similarity confidence policy.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Scores at or above this are a high-confidence match.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.7;
/// Scores at or above this are moderate; below it a match cannot be recorded.
pub const MODERATE_CONFIDENCE_THRESHOLD: f64 = 0.4;

/// Server-side match status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStatus {
    Pending,
    Matched,
    Declined,
    Returned,
    Claimed,
    Unclaimed,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Matched => "matched",
            MatchStatus::Declined => "declined",
            MatchStatus::Returned => "returned",
            MatchStatus::Claimed => "claimed",
            MatchStatus::Unclaimed => "unclaimed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(MatchStatus::Pending),
            "matched" => Some(MatchStatus::Matched),
            "declined" => Some(MatchStatus::Declined),
            "returned" => Some(MatchStatus::Returned),
            "claimed" => Some(MatchStatus::Claimed),
            "unclaimed" => Some(MatchStatus::Unclaimed),
            _ => None,
        }
    }
}

/// Which side of a match an item was reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Lost,
    Found,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Lost => "lost",
            ItemKind::Found => "found",
        }
    }
}

/// Item details embedded in a populated match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemSnapshot {
    pub id: String,
    pub item_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
}

/// A match side: either a bare id or the populated item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemRef {
    Id(String),
    Snapshot(ItemSnapshot),
}

impl ItemRef {
    pub fn id(&self) -> &str {
        match self {
            ItemRef::Id(id) => id,
            ItemRef::Snapshot(item) => &item.id,
        }
    }

    pub fn snapshot(&self) -> Option<&ItemSnapshot> {
        match self {
            ItemRef::Id(_) => None,
            ItemRef::Snapshot(item) => Some(item),
        }
    }
}

/// Canonical match record after wire normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub id: String,
    pub lost_item: Option<ItemRef>,
    pub found_item: Option<ItemRef>,
    pub lost_user_id: Option<String>,
    pub found_user_id: Option<String>,
    /// Clamped to [0, 1]
    pub similarity_score: f64,
    pub status: MatchStatus,
    pub created_at: Option<DateTime<Utc>>,
}

impl Match {
    pub fn confidence(&self) -> MatchConfidence {
        match_color(self.similarity_score)
    }

    /// Score as a rounded percentage, as shown to users.
    pub fn similarity_percent(&self) -> u32 {
        similarity_percent(self.similarity_score)
    }

    /// True if the user reported either side of this match.
    pub fn involves_user(&self, user_id: &str) -> bool {
        self.lost_user_id.as_deref() == Some(user_id)
            || self.found_user_id.as_deref() == Some(user_id)
    }

    /// The other party to contact about this match.
    ///
    /// Anyone who is not the lost-item reporter talks to the lost-item
    /// reporter.
    pub fn counterpart_user_id(&self, user_id: &str) -> Option<&str> {
        let other = if self.lost_user_id.as_deref() == Some(user_id) {
            self.found_user_id.as_deref()
        } else {
            self.lost_user_id.as_deref()
        };
        other.filter(|id| !id.is_empty())
    }

    pub fn lost_item_id(&self) -> Option<&str> {
        self.lost_item.as_ref().map(ItemRef::id)
    }

    pub fn found_item_id(&self) -> Option<&str> {
        self.found_item.as_ref().map(ItemRef::id)
    }
}

/// Rounded percentage for a similarity score.
pub fn similarity_percent(score: f64) -> u32 {
    (score.clamp(0.0, 1.0) * 100.0).round() as u32
}

/// Confidence band of a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchConfidence {
    High,
    Moderate,
    Low,
}

impl MatchConfidence {
    /// Display color for score bars and badges.
    pub fn color(&self) -> &'static str {
        match self {
            MatchConfidence::High => "#28a745",
            MatchConfidence::Moderate => "#ffc107",
            MatchConfidence::Low => "#dc3545",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            MatchConfidence::High => "High probability of a match!",
            MatchConfidence::Moderate => "Moderate similarity detected.",
            MatchConfidence::Low => "Low similarity. Likely not a match.",
        }
    }

    /// Whether a match with this confidence may be recorded.
    pub fn is_recordable(&self) -> bool {
        !matches!(self, MatchConfidence::Low)
    }
}

/// Map a similarity score to its confidence band.
///
/// Used by both the similarity check and the match list so the two never
/// disagree.
pub fn match_color(score: f64) -> MatchConfidence {
    if score >= HIGH_CONFIDENCE_THRESHOLD {
        MatchConfidence::High
    } else if score >= MODERATE_CONFIDENCE_THRESHOLD {
        MatchConfidence::Moderate
    } else {
        MatchConfidence::Low
    }
}

/// Result of comparing two free-text descriptions.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityResult {
    pub score: f64,
    pub preprocessed_lost: Option<String>,
    pub preprocessed_found: Option<String>,
}

impl SimilarityResult {
    pub fn confidence(&self) -> MatchConfidence {
        match_color(self.score)
    }
}

/// Descriptions sent along with a recorded match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchDescriptions {
    pub lost: String,
    pub found: String,
}

/// Body of `POST /api/record-match`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordMatchRequest {
    pub lost_item_id: String,
    pub found_item_id: String,
    pub similarity_score: f64,
    pub lost_item_description: String,
    pub found_item_description: String,
    pub create_notifications: bool,
}

/// State of the "compare two items" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonForm {
    pub lost_description: String,
    pub found_description: String,
    pub lost_item_id: Option<String>,
    pub found_item_id: Option<String>,
    pub similarity: Option<SimilarityResult>,
}

impl ComparisonForm {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
