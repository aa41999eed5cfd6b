// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! findit-watch: headless FindIt notification watcher.
//!
//! Loads the local activity log, then keeps the user's notifications in
//! sync with the backend until interrupted, logging every alert.

use anyhow::Context;
use findit_client::{
    config::Config,
    services::{LifecycleEvent, LifecycleObserver},
    FindItClient,
};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let config = Config::from_env().context("Failed to load configuration")?;
    let user_id = config
        .user_id
        .clone()
        .context("FINDIT_USER_ID must be set")?;
    tracing::info!(api_url = %config.api_url, user_id = %user_id, "Starting findit-watch");

    let client = FindItClient::new(config)
        .await
        .context("Failed to open local storage")?;

    let activities = client.activities.load().await;
    tracing::info!(count = activities.len(), "Loaded activities");
    for activity in client.activities.recent(3).await {
        tracing::info!(
            id = %activity.id,
            title = %activity.title,
            status = %activity.status,
            date = %activity.date,
            "Recent activity"
        );
    }

    let sync = client.notification_sync(user_id.clone());
    match sync.refresh().await {
        Ok(outcome) => tracing::info!(
            count = outcome.new_count,
            unread = sync.unread_count(),
            "Loaded notifications"
        ),
        Err(e) => tracing::warn!(
            error = %e,
            action = ?e.suggested_action(),
            "{}",
            e.user_message()
        ),
    }

    let mut alerts = sync.subscribe_alerts();
    sync.on_lifecycle(LifecycleEvent::Focused);

    loop {
        tokio::select! {
            alert = alerts.recv() => match alert {
                Ok(alert) => tracing::info!(title = %alert.title, message = %alert.message, "Alert"),
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "Missed alerts"),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
        }
    }

    sync.on_lifecycle(LifecycleEvent::Backgrounded);
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("findit_client=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
