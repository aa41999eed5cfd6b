// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the client core.

pub mod activity;
pub mod matching;
pub mod notification;
pub mod wire;

pub use activity::{Activity, ActivityFilter, ActivityInput, ActivityKind, ActivityStatus};
pub use matching::{
    match_color, ComparisonForm, ItemKind, ItemRef, ItemSnapshot, Match, MatchConfidence,
    MatchDescriptions, MatchStatus, RecordMatchRequest, SimilarityResult,
};
pub use notification::{Notification, NotificationKind};
