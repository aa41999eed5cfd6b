// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local activity store.
//!
//! Owns the persisted `user_activities` list. Every mutation is a full
//! read-modify-write of that list, done under one async lock so concurrent
//! callers never lose each other's updates. The aging policy runs on every
//! load.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;

use crate::db::{keys, KeyValueStore};
use crate::error::{ClientError, Result};
use crate::models::activity::LOCAL_ID_PREFIX;
use crate::models::{Activity, ActivityFilter, ActivityInput, ActivityKind, ActivityStatus};
use crate::time_utils::{days_between, Clock};

/// Days an unclaimed found item waits before it is held.
pub const HOLD_AFTER_DAYS: i64 = 30;
/// Days from the report until a held item may be donated.
pub const DONATION_ELIGIBLE_AFTER_DAYS: i64 = 45;

/// Apply one step of the time-based escalation policy.
///
/// `unclaimed` becomes `held` at 30 days; `held` becomes
/// `eligible_for_donation` at 45 days. Age counts from `timestamp`, which is
/// left untouched. Every other status is returned unchanged.
pub fn apply_aging_policy(activity: &Activity, now: DateTime<Utc>) -> Activity {
    let days = days_between(activity.timestamp, now);
    let mut aged = activity.clone();

    match activity.status {
        ActivityStatus::Unclaimed if days >= HOLD_AFTER_DAYS => {
            aged.status = ActivityStatus::Held;
        }
        ActivityStatus::Held if days >= DONATION_ELIGIBLE_AFTER_DAYS => {
            aged.status = ActivityStatus::EligibleForDonation;
        }
        _ => {}
    }

    aged
}

/// The fixed demo activity set shown on first launch.
pub fn demo_activities(now: DateTime<Utc>) -> Vec<Activity> {
    use ActivityKind::{Found, Lost};
    use ActivityStatus::*;

    let seed: [(&str, ActivityKind, &str, ActivityStatus, i64, &str, &str); 11] = [
        ("1", Lost, "Blue Wallet", Pending, 2, "University Library", "Accessories"),
        ("2", Found, "iPhone 13", Matched, 7, "Central Park", "Electronics"),
        ("3", Lost, "Car Keys", Pending, 3, "Shopping Mall", "Keys"),
        ("4", Found, "Laptop Bag", Matched, 5, "Coffee Shop", "Bags"),
        ("5", Lost, "Headphones", Returned, 7, "Gym", "Electronics"),
        ("6", Found, "Umbrella", Claimed, 14, "Bus Station", "Accessories"),
        ("7", Lost, "Sunglasses", Pending, 10, "Beach", "Accessories"),
        ("8", Found, "Water Bottle", Unclaimed, 21, "Park", "Other"),
        ("9", Found, "Backpack", Unclaimed, 35, "University Campus", "Bags"),
        ("10", Found, "Textbook", EligibleForDonation, 50, "Library", "Books"),
        ("11", Found, "Calculator", Donated, 60, "Math Department", "Electronics"),
    ];

    seed.into_iter()
        .map(|(id, kind, title, status, age_days, location, category)| {
            let mut activity = Activity {
                id: id.to_string(),
                kind,
                title: title.to_string(),
                location: location.to_string(),
                description: String::new(),
                category: category.to_string(),
                status,
                timestamp: now - Duration::days(age_days),
                date: String::new(),
                reported_by: None,
            };
            activity.refresh_date(now);
            activity
        })
        .collect()
}

fn sort_newest_first(activities: &mut [Activity]) {
    activities.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

fn find_mut<'a>(activities: &'a mut [Activity], id: &str) -> Result<&'a mut Activity> {
    activities
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or_else(|| ClientError::NotFound(format!("Activity {}", id)))
}

/// Explicit status change; resets the timestamp so the item moves to the top.
fn set_status(activity: &mut Activity, status: ActivityStatus, now: DateTime<Utc>) {
    activity.status = status;
    activity.timestamp = now;
    activity.refresh_date(now);
}

/// Persisted activity list with serialized mutations.
pub struct ActivityStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl ActivityStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            kv,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Read the stored list. `Ok(None)` means nothing has been stored yet.
    async fn read_stored(&self) -> Result<Option<Vec<Activity>>> {
        let Some(raw) = self.kv.get(keys::USER_ACTIVITIES).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| ClientError::Persistence(format!("Corrupt activity list: {}", e)))
    }

    async fn persist(&self, activities: &[Activity]) -> Result<()> {
        let json = serde_json::to_string(activities)
            .map_err(|e| ClientError::Persistence(format!("Failed to encode activities: {}", e)))?;
        self.kv.set(keys::USER_ACTIVITIES, &json).await
    }

    fn finish(&self, mut activities: Vec<Activity>, now: DateTime<Utc>) -> Vec<Activity> {
        for activity in &mut activities {
            activity.refresh_date(now);
        }
        sort_newest_first(&mut activities);
        activities
    }

    /// Load all activities, newest first.
    ///
    /// Seeds the demo set on first use and persists any aging escalations.
    /// Never fails: storage errors fall back to the demo set.
    pub async fn load(&self) -> Vec<Activity> {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let stored = match self.read_stored().await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read activities, showing demo set");
                let demo = demo_activities(now)
                    .iter()
                    .map(|a| apply_aging_policy(a, now))
                    .collect();
                return self.finish(demo, now);
            }
        };

        let seeded = stored.is_none();
        let original = stored.unwrap_or_else(|| demo_activities(now));

        let aged: Vec<Activity> = original
            .iter()
            .map(|a| apply_aging_policy(a, now))
            .collect();
        let escalated = aged
            .iter()
            .zip(&original)
            .filter(|(new, old)| new.status != old.status)
            .count();

        let activities = self.finish(aged, now);

        if seeded || escalated > 0 {
            tracing::info!(seeded, escalated, "Persisting activity list after load");
            if let Err(e) = self.persist(&activities).await {
                tracing::warn!(error = %e, "Failed to persist activities after load");
            }
        }

        activities
    }

    /// Run one read-modify-write cycle under the write lock.
    async fn mutate<F>(&self, op: F) -> Result<Activity>
    where
        F: FnOnce(&mut Vec<Activity>, DateTime<Utc>) -> Result<Activity>,
    {
        let _guard = self.write_lock.lock().await;
        let now = self.clock.now();

        let mut activities = self.read_stored().await?.unwrap_or_default();
        let changed = op(&mut activities, now)?;

        let activities = self.finish(activities, now);
        self.persist(&activities).await?;
        Ok(changed)
    }

    /// Mirror a newly submitted report locally.
    pub async fn add(&self, input: ActivityInput) -> Result<Activity> {
        let title = input.title.trim().to_string();
        if title.is_empty() {
            return Err(ClientError::Validation(
                "Please enter a title for the item".to_string(),
            ));
        }

        let stored = self
            .mutate(|activities, now| {
                let id = input
                    .server_id
                    .clone()
                    .unwrap_or_else(|| format!("{}{}", LOCAL_ID_PREFIX, uuid::Uuid::new_v4()));

                let mut activity = Activity {
                    id,
                    kind: input.kind,
                    title,
                    location: input.location,
                    description: input.description,
                    category: input.category,
                    status: input.status,
                    timestamp: now,
                    date: String::new(),
                    reported_by: input.reported_by,
                };
                activity.refresh_date(now);

                activities.retain(|a| a.id != activity.id);
                activities.insert(0, activity.clone());
                Ok(activity)
            })
            .await?;

        tracing::info!(id = %stored.id, kind = ?stored.kind, "Added activity");
        Ok(stored)
    }

    /// Set an activity's status. The activity moves to the top of the list.
    pub async fn update_status(&self, id: &str, status: ActivityStatus) -> Result<Activity> {
        let updated = self
            .mutate(|activities, now| {
                let activity = find_mut(activities, id)?;
                set_status(activity, status, now);
                Ok(activity.clone())
            })
            .await?;

        tracing::info!(id, status = %status, "Updated activity status");
        Ok(updated)
    }

    /// Replace a local id with the id the server assigned.
    pub async fn assign_server_id(&self, local_id: &str, server_id: &str) -> Result<Activity> {
        self.mutate(|activities, _now| {
            if local_id != server_id && activities.iter().any(|a| a.id == server_id) {
                return Err(ClientError::Validation(format!(
                    "Activity {} already exists",
                    server_id
                )));
            }
            let activity = find_mut(activities, local_id)?;
            activity.id = server_id.to_string();
            Ok(activity.clone())
        })
        .await
    }

    /// Donate a found item that has aged into donation eligibility.
    pub async fn donate(&self, id: &str) -> Result<Activity> {
        let donated = self
            .mutate(|activities, now| {
                let activity = find_mut(activities, id)?;
                if !activity.is_eligible_for_donation() {
                    return Err(ClientError::Validation(format!(
                        "{} is not eligible for donation",
                        activity.title
                    )));
                }
                set_status(activity, ActivityStatus::Donated, now);
                Ok(activity.clone())
            })
            .await?;

        tracing::info!(id, "Donated activity");
        Ok(donated)
    }

    /// Activities matching `filter`, newest first.
    pub async fn filtered(&self, filter: ActivityFilter) -> Vec<Activity> {
        self.load()
            .await
            .into_iter()
            .filter(|a| filter.matches(a))
            .collect()
    }

    /// The `n` most recent activities.
    pub async fn recent(&self, n: usize) -> Vec<Activity> {
        let mut activities = self.load().await;
        activities.truncate(n);
        activities
    }

    /// Forget every stored activity; the next load re-seeds the demo set.
    pub async fn reset(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.kv.remove(keys::USER_ACTIVITIES).await?;
        tracing::info!("Reset activity store");
        Ok(())
    }
}
