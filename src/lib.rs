// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! FindIt client core: lost-and-found reports, matches and notifications.
//!
//! This crate keeps the user's local activity log, talks to the FindIt
//! backend for similarity matching, and keeps a polled notification list in
//! sync while the notification screen is active.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use std::sync::Arc;

use config::Config;
use db::{FileStore, KeyValueStore};
use error::Result;
use services::{ActivityStore, HttpGateway, MatchClient, NotificationSync, RemoteGateway};
use time_utils::{Clock, SystemClock};

/// Shared client state.
pub struct FindItClient {
    pub config: Config,
    pub gateway: Arc<dyn RemoteGateway>,
    pub clock: Arc<dyn Clock>,
    pub activities: ActivityStore,
    pub matches: MatchClient,
}

impl FindItClient {
    /// Build a client talking to the configured backend, storing state
    /// under `config.storage_dir`.
    pub async fn new(config: Config) -> Result<Self> {
        let store = FileStore::open(&config.storage_dir).await?;
        let gateway = HttpGateway::new(&config);
        Ok(Self::with_parts(
            config,
            Arc::new(gateway),
            Arc::new(store),
            Arc::new(SystemClock),
        ))
    }

    /// Build a client from explicit parts.
    pub fn with_parts(
        config: Config,
        gateway: Arc<dyn RemoteGateway>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let activities = ActivityStore::new(store, Arc::clone(&clock));
        let matches = MatchClient::new(Arc::clone(&gateway), config.match_page_size);
        Self {
            config,
            gateway,
            clock,
            activities,
            matches,
        }
    }

    /// A notification synchronizer for `user_id`, sharing this client's
    /// gateway and match state.
    pub fn notification_sync(&self, user_id: impl Into<String>) -> NotificationSync {
        NotificationSync::new(
            user_id,
            Arc::clone(&self.gateway),
            self.matches.clone(),
            Arc::clone(&self.clock),
            &self.config,
        )
    }
}
