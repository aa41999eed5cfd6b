// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - client business logic.

pub mod activity;
pub mod gateway;
pub mod matching;
pub mod notification;

pub use activity::{apply_aging_policy, demo_activities, ActivityStore};
pub use gateway::{HttpGateway, RemoteGateway};
pub use matching::{filter_matches_for_user, MatchClient, MatchFeed};
pub use notification::{
    Alert, LifecycleEvent, LifecycleObserver, NotificationFeed, NotificationSync, PollOutcome,
    SyncState,
};
