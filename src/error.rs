// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with user-facing messages and retry hints.
//!
//! Every component recovers at its own boundary and hands one of these back
//! to the caller; none of them is fatal to the process.

/// What the caller should offer the user after an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestedAction {
    /// Offer a "Retry" action; the same request may succeed later.
    Retry,
    /// Connectivity problem; retry after checking the connection.
    CheckConnection,
    /// The input itself is wrong; retrying unchanged will fail again.
    FixInput,
    /// Nothing useful to offer.
    None,
}

/// Client error type shared by the activity store, match client and
/// notification sync.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Storage error: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ClientError {
    pub const EMPTY_DESCRIPTIONS: &'static str = "Please enter both descriptions";
    pub const LOW_SIMILARITY: &'static str = "The similarity score is too low to record a match.";
    pub const DESCRIPTION_ONLY: &'static str =
        "This is just a description comparison. To record a match, select items from the database.";

    /// Human-readable message suitable for an alert.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(msg) | ClientError::Service(msg) => msg.clone(),
            ClientError::Network(_) => {
                "Network connection error. Please check your internet connection.".to_string()
            }
            ClientError::Timeout(_) => {
                "Connection timed out. Server might be temporarily unavailable.".to_string()
            }
            ClientError::Persistence(_) => {
                "Could not save your changes on this device. Please try again.".to_string()
            }
            ClientError::NotFound(what) => format!("{} could not be found.", what),
        }
    }

    pub fn suggested_action(&self) -> SuggestedAction {
        match self {
            ClientError::Validation(_) => SuggestedAction::FixInput,
            ClientError::Service(_) | ClientError::Timeout(_) | ClientError::Persistence(_) => {
                SuggestedAction::Retry
            }
            ClientError::Network(_) => SuggestedAction::CheckConnection,
            ClientError::NotFound(_) => SuggestedAction::None,
        }
    }

    /// True for errors a user-initiated retry might fix.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.suggested_action(),
            SuggestedAction::Retry | SuggestedAction::CheckConnection
        )
    }

    /// True when the remote endpoint could not be reached in time or at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Timeout(_))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
