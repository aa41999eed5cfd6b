// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! On-device key-value storage.
//!
//! Values are opaque strings (JSON text in practice). Callers own their
//! keys; see [`keys`].

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::Result;

/// Storage keys as constants.
pub mod keys {
    /// JSON list of the user's lost/found activities
    pub const USER_ACTIVITIES: &str = "user_activities";
}

/// Persistent string store keyed by name.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. A missing key is `Ok(None)`, not an error.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing a missing key succeeds.
    async fn remove(&self, key: &str) -> Result<()>;
}
