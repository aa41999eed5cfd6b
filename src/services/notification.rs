// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notification synchronization.
//!
//! While the notification screen is focused and the app is in the
//! foreground, a background task polls the backend on a fixed interval.
//! Server notifications and notifications synthesized from the user's
//! matches are merged into one list, deduplicated by id and kept newest
//! first. Each poll that brings in unread items raises one alert.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::models::wire;
use crate::models::{Match, Notification};
use crate::services::{MatchClient, RemoteGateway};
use crate::time_utils::Clock;

/// Title of the alert raised for newly arrived notifications.
pub const ALERT_TITLE: &str = "New Notification";

/// Whether the poll timer is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Polling,
}

/// Screen focus and app foreground/background changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Focused,
    Blurred,
    Foregrounded,
    Backgrounded,
}

/// Receiver of lifecycle changes from whatever hosts the client.
pub trait LifecycleObserver: Send + Sync {
    fn on_lifecycle(&self, event: LifecycleEvent);
}

/// User-visible alert for new notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    fn new_notification(message: impl Into<String>) -> Self {
        Self {
            title: ALERT_TITLE.to_string(),
            message: message.into(),
        }
    }
}

/// Result of one merge into the feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollOutcome {
    /// Items whose id was not in the list before
    pub new_count: usize,
    /// Items that replaced an existing entry
    pub updated_count: usize,
    pub alert: Option<Alert>,
}

/// Merged notification list, newest first, one entry per id.
#[derive(Debug, Clone, Default)]
pub struct NotificationFeed {
    items: Vec<Notification>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    /// Merge incoming items and return the ones that were not present.
    ///
    /// A known id is updated in place; once read it stays read. The list is
    /// re-sorted by creation time afterwards.
    pub fn merge(&mut self, incoming: Vec<Notification>) -> (Vec<Notification>, usize) {
        let mut index: HashMap<String, usize> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();

        let mut added = Vec::new();
        let mut updated = 0;

        for notification in incoming {
            match index.get(&notification.id) {
                Some(&i) => {
                    let read = self.items[i].read || notification.read;
                    self.items[i] = notification;
                    self.items[i].read = read;
                    updated += 1;
                }
                None => {
                    index.insert(notification.id.clone(), self.items.len());
                    added.push(notification.clone());
                    self.items.push(notification);
                }
            }
        }

        self.items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        (added, updated)
    }

    /// Mark one item read. Returns false if the id is unknown.
    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.items.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for n in &mut self.items {
            n.read = true;
        }
    }
}

struct FeedState {
    feed: NotificationFeed,
    last_polled: DateTime<Utc>,
    next_page: u32,
    has_more: bool,
}

struct Shared {
    user_id: String,
    gateway: Arc<dyn RemoteGateway>,
    matches: MatchClient,
    clock: Arc<dyn Clock>,
    page_size: u32,
    state: Mutex<FeedState>,
    alerts: broadcast::Sender<Alert>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn synthesize(&self, matches: &[Match], now: DateTime<Utc>) -> Vec<Notification> {
        matches
            .iter()
            .map(|m| Notification::from_match(m, now))
            .collect()
    }

    /// Merge a batch, combining a notification fetch with a match fetch.
    ///
    /// Fails only when both fetches failed.
    fn merge_batch(
        &self,
        notifications: Result<Vec<Notification>>,
        matches: Result<Vec<Match>>,
        now: DateTime<Utc>,
    ) -> Result<(Vec<Notification>, usize)> {
        let mut incoming = Vec::new();

        match (notifications, matches) {
            (Err(notif_err), Err(match_err)) => {
                tracing::warn!(
                    user_id = %self.user_id,
                    error = %notif_err,
                    match_error = %match_err,
                    "Notification and match fetches both failed"
                );
                return Err(notif_err);
            }
            (notifications, matches) => {
                match notifications {
                    Ok(items) => incoming.extend(items),
                    Err(e) => {
                        tracing::warn!(user_id = %self.user_id, error = %e, "Notification fetch failed")
                    }
                }
                match matches {
                    Ok(items) => incoming.extend(self.synthesize(&items, now)),
                    Err(e) => {
                        tracing::warn!(user_id = %self.user_id, error = %e, "Match fetch failed")
                    }
                }
            }
        }

        Ok(self.state().feed.merge(incoming))
    }

    async fn poll_once(&self) -> Result<PollOutcome> {
        let now = self.clock.now();
        let since = std::mem::replace(&mut self.state().last_polled, now);

        let (polled, matches) = tokio::join!(
            self.gateway
                .poll_notifications(&self.user_id, since.timestamp_millis()),
            self.matches.user_matches(&self.user_id),
        );
        let polled = polled
            .and_then(|body| wire::parse_notifications(&body, now))
            .map(|page| page.notifications);

        let (added, updated_count) = self.merge_batch(polled, matches, now)?;

        let alert = added
            .iter()
            .find(|n| !n.read)
            .map(|n| Alert::new_notification(n.message.clone()));
        if let Some(alert) = &alert {
            let _ = self.alerts.send(alert.clone());
        }

        tracing::debug!(
            user_id = %self.user_id,
            new = added.len(),
            updated = updated_count,
            "Polled notifications"
        );

        Ok(PollOutcome {
            new_count: added.len(),
            updated_count,
            alert,
        })
    }

    async fn fetch_page(&self, page: u32) -> Result<wire::NotificationPage> {
        let body = self
            .gateway
            .list_notifications(&self.user_id, page, self.page_size)
            .await?;
        wire::parse_notifications(&body, self.clock.now())
    }

    async fn refresh(&self) -> Result<PollOutcome> {
        let now = self.clock.now();
        let (page, matches) = tokio::join!(
            self.fetch_page(1),
            self.matches.user_matches(&self.user_id),
        );

        let has_more = page.as_ref().map(|p| p.has_more).unwrap_or(false);
        let page_ok = page.is_ok();
        let (added, updated_count) =
            self.merge_batch(page.map(|p| p.notifications), matches, now)?;

        if page_ok {
            let mut state = self.state();
            state.next_page = 2;
            state.has_more = has_more;
        }

        Ok(PollOutcome {
            new_count: added.len(),
            updated_count,
            alert: None,
        })
    }

    async fn load_more(&self) -> Result<PollOutcome> {
        let (page_no, has_more) = {
            let state = self.state();
            (state.next_page, state.has_more)
        };
        if !has_more {
            return Ok(PollOutcome::default());
        }

        let page = self.fetch_page(page_no).await?;
        let mut state = self.state();
        let (added, updated_count) = state.feed.merge(page.notifications);
        state.next_page = page_no + 1;
        state.has_more = page.has_more;

        Ok(PollOutcome {
            new_count: added.len(),
            updated_count,
            alert: None,
        })
    }
}

struct Timer {
    shutdown: watch::Sender<()>,
    task: JoinHandle<()>,
}

impl Timer {
    fn stop(self) {
        let _ = self.shutdown.send(());
        self.task.abort();
    }
}

struct Lifecycle {
    focused: bool,
    foregrounded: bool,
    timer: Option<Timer>,
}

/// Polling notification synchronizer for one user.
///
/// Starts idle and in the foreground; polling begins once the screen is
/// focused. Dropping it stops the timer.
pub struct NotificationSync {
    shared: Arc<Shared>,
    poll_interval: Duration,
    lifecycle: Mutex<Lifecycle>,
}

impl NotificationSync {
    pub fn new(
        user_id: impl Into<String>,
        gateway: Arc<dyn RemoteGateway>,
        matches: MatchClient,
        clock: Arc<dyn Clock>,
        config: &Config,
    ) -> Self {
        let (alerts, _) = broadcast::channel(16);
        let now = clock.now();

        Self {
            shared: Arc::new(Shared {
                user_id: user_id.into(),
                gateway,
                matches,
                clock,
                page_size: config.notification_page_size.max(1),
                state: Mutex::new(FeedState {
                    feed: NotificationFeed::new(),
                    last_polled: now,
                    next_page: 1,
                    has_more: true,
                }),
                alerts,
            }),
            poll_interval: config.poll_interval,
            lifecycle: Mutex::new(Lifecycle {
                focused: false,
                foregrounded: true,
                timer: None,
            }),
        }
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn user_id(&self) -> &str {
        &self.shared.user_id
    }

    pub fn state(&self) -> SyncState {
        if self.lifecycle().timer.is_some() {
            SyncState::Polling
        } else {
            SyncState::Idle
        }
    }

    /// Subscribe to "New Notification" alerts.
    pub fn subscribe_alerts(&self) -> broadcast::Receiver<Alert> {
        self.shared.alerts.subscribe()
    }

    /// Fetch notifications newer than the last poll plus current matches.
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        self.shared.poll_once().await
    }

    /// Initial load or pull-to-refresh: page 1 plus current matches.
    pub async fn refresh(&self) -> Result<PollOutcome> {
        self.shared.refresh().await
    }

    /// Fetch the next page if the server reported more.
    pub async fn load_more(&self) -> Result<PollOutcome> {
        self.shared.load_more().await
    }

    /// Snapshot of the merged list, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.shared.state().feed.items().to_vec()
    }

    pub fn unread_count(&self) -> usize {
        self.shared.state().feed.unread_count()
    }

    /// Mark one notification read, on the server too unless it was
    /// synthesized locally from a match.
    pub async fn mark_read(&self, id: &str) -> Result<()> {
        let synthetic = {
            let state = self.shared.state();
            let n = state
                .feed
                .items()
                .iter()
                .find(|n| n.id == id)
                .ok_or_else(|| ClientError::NotFound(format!("Notification {}", id)))?;
            n.is_synthetic()
        };

        if !synthetic {
            self.shared.gateway.mark_notification_read(id).await?;
        }
        self.shared.state().feed.mark_read(id);
        Ok(())
    }

    pub async fn mark_all_read(&self) -> Result<()> {
        self.shared
            .gateway
            .mark_all_notifications_read(&self.shared.user_id)
            .await?;
        self.shared.state().feed.mark_all_read();
        Ok(())
    }

    fn start_timer(&self, lifecycle: &mut Lifecycle) {
        if lifecycle.timer.is_some() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No async runtime, notification polling not started");
            return;
        };

        let (shutdown, mut shutdown_rx) = watch::channel(());
        let shared = Arc::clone(&self.shared);
        let interval = self.poll_interval;

        let task = runtime.spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = shutdown_rx.changed() => {
                        tracing::debug!(user_id = %shared.user_id, "Notification poller shutting down");
                        return;
                    }
                }

                if let Err(e) = shared.poll_once().await {
                    tracing::warn!(user_id = %shared.user_id, error = %e, "Notification poll failed");
                }
            }
        });

        tracing::info!(user_id = %self.shared.user_id, interval_secs = interval.as_secs(), "Notification polling started");
        lifecycle.timer = Some(Timer { shutdown, task });
    }

    fn stop_timer(&self, lifecycle: &mut Lifecycle) {
        if let Some(timer) = lifecycle.timer.take() {
            timer.stop();
            tracing::info!(user_id = %self.shared.user_id, "Notification polling stopped");
        }
    }
}

impl LifecycleObserver for NotificationSync {
    fn on_lifecycle(&self, event: LifecycleEvent) {
        let mut lifecycle = self.lifecycle();
        match event {
            LifecycleEvent::Focused => lifecycle.focused = true,
            LifecycleEvent::Blurred => lifecycle.focused = false,
            LifecycleEvent::Foregrounded => lifecycle.foregrounded = true,
            LifecycleEvent::Backgrounded => lifecycle.foregrounded = false,
        }

        if lifecycle.focused && lifecycle.foregrounded {
            self.start_timer(&mut lifecycle);
        } else {
            self.stop_timer(&mut lifecycle);
        }
    }
}

impl Drop for NotificationSync {
    fn drop(&mut self) {
        let lifecycle = self.lifecycle.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(timer) = lifecycle.timer.take() {
            timer.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationKind;
    use chrono::TimeZone;

    fn notification(id: &str, minute: u32, read: bool) -> Notification {
        Notification {
            id: id.to_string(),
            kind: NotificationKind::System,
            title: String::new(),
            message: format!("message {}", id),
            read,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, minute, 0).unwrap(),
            match_id: None,
            similarity_score: None,
            lost_item_id: None,
            found_item_id: None,
            location: None,
        }
    }

    #[test]
    fn test_merge_dedupes_and_sorts() {
        let mut feed = NotificationFeed::new();
        let (added, _) = feed.merge(vec![notification("a", 1, false), notification("b", 5, false)]);
        assert_eq!(added.len(), 2);

        let (added, updated) =
            feed.merge(vec![notification("b", 5, false), notification("c", 3, false)]);
        assert_eq!(added.len(), 1);
        assert_eq!(updated, 1);

        let ids: Vec<&str> = feed.items().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_merge_keeps_local_read_flag() {
        let mut feed = NotificationFeed::new();
        feed.merge(vec![notification("a", 1, false)]);
        assert!(feed.mark_read("a"));

        let mut refreshed = notification("a", 1, false);
        refreshed.message = "edited".to_string();
        feed.merge(vec![refreshed]);

        assert_eq!(feed.len(), 1);
        assert!(feed.items()[0].read);
        assert_eq!(feed.items()[0].message, "edited");
        assert_eq!(feed.unread_count(), 0);
    }

    #[test]
    fn test_merge_dedupes_within_one_batch() {
        let mut feed = NotificationFeed::new();
        let (added, updated) =
            feed.merge(vec![notification("a", 1, false), notification("a", 1, true)]);
        assert_eq!(added.len(), 1);
        assert_eq!(updated, 1);
        assert_eq!(feed.len(), 1);
        assert!(feed.items()[0].read);
    }
}
