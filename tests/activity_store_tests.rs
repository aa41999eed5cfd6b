// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tests for the local activity store.

use chrono::Duration;
use findit_client::db::{keys, KeyValueStore, MemoryStore};
use findit_client::error::ClientError;
use findit_client::models::{Activity, ActivityFilter, ActivityInput, ActivityKind, ActivityStatus};
use findit_client::services::ActivityStore;
use std::sync::Arc;

mod common;
use common::{base_time, test_clock};

fn store_over(kv: Arc<MemoryStore>) -> ActivityStore {
    ActivityStore::new(kv, test_clock())
}

fn assert_sorted(activities: &[Activity]) {
    for pair in activities.windows(2) {
        assert!(
            pair[0].timestamp >= pair[1].timestamp,
            "{} listed before older {}",
            pair[1].id,
            pair[0].id
        );
    }
}

fn stored(kv: &MemoryStore) -> Vec<Activity> {
    let raw = kv.peek(keys::USER_ACTIVITIES).expect("activities persisted");
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn test_first_load_seeds_and_escalates_demo_set() {
    let kv = Arc::new(MemoryStore::new());
    let store = store_over(kv.clone());

    let activities = store.load().await;

    assert_eq!(activities.len(), 11);
    assert_sorted(&activities);
    assert_eq!(activities[0].title, "Blue Wallet");
    assert_eq!(activities[0].date, "2 days ago");

    let backpack = activities.iter().find(|a| a.title == "Backpack").unwrap();
    assert_eq!(backpack.status, ActivityStatus::Held);
    assert_eq!(backpack.date, "4/27/2024");

    let persisted = stored(&kv);
    assert_eq!(persisted.len(), 11);
    assert_eq!(
        persisted.iter().find(|a| a.id == "9").unwrap().status,
        ActivityStatus::Held
    );

    let again = store.load().await;
    assert_eq!(again, activities);
}

#[tokio::test]
async fn test_load_falls_back_to_demo_set_on_read_failure() {
    let kv = Arc::new(MemoryStore::failing());
    let store = store_over(kv.clone());

    let activities = store.load().await;

    assert_eq!(activities.len(), 11);
    assert_sorted(&activities);
    assert!(kv.peek(keys::USER_ACTIVITIES).is_none());
}

#[tokio::test]
async fn test_corrupt_data_is_not_overwritten_by_load() {
    let kv = Arc::new(MemoryStore::new());
    kv.insert_raw(keys::USER_ACTIVITIES, "{not json");
    let store = store_over(kv.clone());

    assert_eq!(store.load().await.len(), 11);
    assert_eq!(kv.peek(keys::USER_ACTIVITIES).as_deref(), Some("{not json"));

    let err = store
        .add(ActivityInput::new(ActivityKind::Lost, "Scarf"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Persistence(_)));
}

#[tokio::test]
async fn test_add_puts_new_report_first() {
    let kv = Arc::new(MemoryStore::new());
    let store = store_over(kv.clone());
    store.load().await;

    let added = store
        .add(
            ActivityInput::new(ActivityKind::Lost, "  Green Scarf ")
                .location("Cafeteria")
                .category("Clothing"),
        )
        .await
        .unwrap();

    assert!(added.is_local());
    assert_eq!(added.title, "Green Scarf");
    assert_eq!(added.date, "Just now");
    assert_eq!(added.timestamp, base_time());
    assert_eq!(added.status, ActivityStatus::Pending);

    let activities = store.load().await;
    assert_eq!(activities.len(), 12);
    assert_eq!(activities[0].id, added.id);
    assert_sorted(&activities);
}

#[tokio::test]
async fn test_add_with_server_id_replaces_existing_record() {
    let store = store_over(Arc::new(MemoryStore::new()));
    store.load().await;

    let added = store
        .add(ActivityInput::new(ActivityKind::Found, "Phone").server_id("2"))
        .await
        .unwrap();
    assert_eq!(added.id, "2");

    let activities = store.load().await;
    assert_eq!(activities.len(), 11);
    assert_eq!(activities.iter().filter(|a| a.id == "2").count(), 1);
    assert_eq!(activities[0].title, "Phone");
}

#[tokio::test]
async fn test_add_rejects_blank_title() {
    let kv = Arc::new(MemoryStore::new());
    let store = store_over(kv.clone());

    let err = store
        .add(ActivityInput::new(ActivityKind::Lost, "   "))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert!(kv.peek(keys::USER_ACTIVITIES).is_none());
}

#[tokio::test]
async fn test_update_status_moves_activity_to_top() {
    let kv = Arc::new(MemoryStore::new());
    let store = store_over(kv.clone());
    store.load().await;

    let updated = store
        .update_status("8", ActivityStatus::Claimed)
        .await
        .unwrap();
    assert_eq!(updated.status, ActivityStatus::Claimed);
    assert_eq!(updated.date, "Just now");

    let activities = store.load().await;
    assert_eq!(activities[0].id, "8");
    assert_eq!(stored(&kv)[0].status, ActivityStatus::Claimed);
}

#[tokio::test]
async fn test_update_status_unknown_id_is_not_found() {
    let kv = Arc::new(MemoryStore::new());
    let store = store_over(kv.clone());
    let before = store.load().await;

    let err = store
        .update_status("does-not-exist", ActivityStatus::Returned)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::NotFound(_)));
    assert_eq!(store.load().await, before);
}

#[tokio::test]
async fn test_write_failure_surfaces_as_persistence_error() {
    let kv = Arc::new(MemoryStore::new());
    let store = store_over(kv.clone());
    store.load().await;

    kv.set_fail_writes(true);
    let err = store
        .update_status("1", ActivityStatus::Returned)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Persistence(_)));
    assert_eq!(err.suggested_action(), findit_client::error::SuggestedAction::Retry);
}

#[tokio::test]
async fn test_assign_server_id() {
    let store = store_over(Arc::new(MemoryStore::new()));
    store.load().await;
    let local = store
        .add(ActivityInput::new(ActivityKind::Found, "Keys"))
        .await
        .unwrap();

    let confirmed = store.assign_server_id(&local.id, "srv-77").await.unwrap();
    assert_eq!(confirmed.id, "srv-77");
    assert!(!confirmed.is_local());

    let err = store.assign_server_id(&local.id, "srv-78").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));

    let err = store.assign_server_id("srv-77", "1").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn test_donate_requires_eligibility() {
    let store = store_over(Arc::new(MemoryStore::new()));
    store.load().await;

    let donated = store.donate("10").await.unwrap();
    assert_eq!(donated.status, ActivityStatus::Donated);

    let err = store.donate("9").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    let err = store.donate("1").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn test_held_item_becomes_eligible_as_time_passes() {
    let kv = Arc::new(MemoryStore::new());
    let clock = test_clock();
    let store = ActivityStore::new(kv.clone(), clock.clone());
    store.load().await;

    // Backpack is 35 days old and held; ten more days makes it 45.
    clock.advance(Duration::days(10));
    let activities = store.load().await;
    let backpack = activities.iter().find(|a| a.id == "9").unwrap();
    assert_eq!(backpack.status, ActivityStatus::EligibleForDonation);

    // Water Bottle crossed 30 days unclaimed.
    let bottle = activities.iter().find(|a| a.id == "8").unwrap();
    assert_eq!(bottle.status, ActivityStatus::Held);
}

#[tokio::test]
async fn test_filtered_and_recent() {
    let store = store_over(Arc::new(MemoryStore::new()));

    let found = store
        .filtered(ActivityFilter::Kind(ActivityKind::Found))
        .await;
    assert_eq!(found.len(), 7);
    assert!(found.iter().all(|a| a.kind == ActivityKind::Found));
    assert_sorted(&found);

    let pending = store
        .filtered(ActivityFilter::Status(ActivityStatus::Pending))
        .await;
    let titles: Vec<&str> = pending.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Blue Wallet", "Car Keys", "Sunglasses"]);

    let recent = store.recent(3).await;
    assert_eq!(recent.len(), 3);
    assert_eq!(recent[0].title, "Blue Wallet");
}

#[tokio::test]
async fn test_reset_reseeds_on_next_load() {
    let kv = Arc::new(MemoryStore::new());
    let store = store_over(kv.clone());
    store.load().await;
    store
        .add(ActivityInput::new(ActivityKind::Lost, "Scarf"))
        .await
        .unwrap();

    store.reset().await.unwrap();
    assert!(kv.get(keys::USER_ACTIVITIES).await.unwrap().is_none());

    assert_eq!(store.load().await.len(), 11);
}

#[tokio::test]
async fn test_concurrent_adds_are_not_lost() {
    let store = Arc::new(store_over(Arc::new(MemoryStore::new())));
    store.load().await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .add(ActivityInput::new(ActivityKind::Lost, format!("Item {}", i)))
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(store.load().await.len(), 21);
}
