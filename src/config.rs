// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! Built once at process start and passed by reference to every component;
//! nothing reads ambient configuration on its own.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Port the backend listens on when only `API_HOST` is given.
pub const DEFAULT_API_PORT: &str = "5000";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL, e.g. `http://172.17.40.131:5000`
    pub api_url: String,
    /// Bearer token for authenticated endpoints (record-match)
    pub auth_token: Option<String>,
    /// Timeout for general API calls
    pub request_timeout: Duration,
    /// Timeout for match-detail style calls
    pub detail_timeout: Duration,
    /// Interval between notification polls while the screen is active
    pub poll_interval: Duration,
    /// Page size for the paginated view-matches endpoint
    pub match_page_size: u32,
    /// Page size for the notification listing endpoint
    pub notification_page_size: u32,
    /// Directory holding the on-device key-value store
    pub storage_dir: PathBuf,
    /// User the headless watcher syncs for
    pub user_id: Option<String>,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_url: "http://localhost:5000".to_string(),
            auth_token: None,
            request_timeout: Duration::from_secs(15),
            detail_timeout: Duration::from_secs(8),
            poll_interval: Duration::from_secs(15),
            match_page_size: 10,
            notification_page_size: 10,
            storage_dir: PathBuf::from(".findit"),
            user_id: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `FINDIT_API_URL` wins; otherwise the URL is assembled from `API_HOST`
    /// and `API_PORT`. Numeric settings fall back to their defaults when
    /// missing, unparseable or zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        let api_url = match env::var("FINDIT_API_URL") {
            Ok(url) => url.trim().trim_end_matches('/').to_string(),
            Err(_) => {
                let host = env::var("API_HOST").map_err(|_| ConfigError::Missing("FINDIT_API_URL"))?;
                let port = env::var("API_PORT").unwrap_or_else(|_| DEFAULT_API_PORT.to_string());
                format!("http://{}:{}", host.trim(), port.trim())
            }
        };

        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                name: "FINDIT_API_URL",
                reason: format!("expected an http(s) URL, got {:?}", api_url),
            });
        }

        Ok(Self {
            api_url,
            auth_token: env::var("FINDIT_AUTH_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            request_timeout: secs_var("FINDIT_REQUEST_TIMEOUT_SECS")
                .unwrap_or(defaults.request_timeout),
            detail_timeout: secs_var("FINDIT_DETAIL_TIMEOUT_SECS")
                .unwrap_or(defaults.detail_timeout),
            poll_interval: secs_var("FINDIT_POLL_INTERVAL_SECS").unwrap_or(defaults.poll_interval),
            match_page_size: u32_var("FINDIT_MATCH_PAGE_SIZE").unwrap_or(defaults.match_page_size),
            notification_page_size: u32_var("FINDIT_NOTIFICATION_PAGE_SIZE")
                .unwrap_or(defaults.notification_page_size),
            storage_dir: env::var("FINDIT_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            user_id: env::var("FINDIT_USER_ID")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

fn u32_var(name: &str) -> Option<u32> {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|v| *v > 0)
}

fn secs_var(name: &str) -> Option<Duration> {
    u32_var(name).map(|secs| Duration::from_secs(secs.into()))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
