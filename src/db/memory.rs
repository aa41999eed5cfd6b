// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory key-value store with failure injection, for tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::db::KeyValueStore;
use crate::error::{ClientError, Result};

/// Volatile store backed by a concurrent map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: DashMap<String, String>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every read and write fails, like an unavailable device.
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_fail_reads(true);
        store.set_fail_writes(true);
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw value, bypassing failure injection.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.clone())
    }

    /// Seed a raw value, bypassing failure injection.
    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ClientError::Persistence(format!(
                "Injected read failure for {}",
                key
            )));
        }
        Ok(self.peek(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClientError::Persistence(format!(
                "Injected write failure for {}",
                key
            )));
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClientError::Persistence(format!(
                "Injected write failure for {}",
                key
            )));
        }
        self.values.remove(key);
        Ok(())
    }
}
