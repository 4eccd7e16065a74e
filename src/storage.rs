// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Local Storage
//!
//! Offline cache for goals and sync state on top of an injected key-value store.
//!
//! - [`KeyValueStore`]: `get`/`set` of string values by key
//! - [`MemoryStore`]: in-process store for tests and one-shot runs
//! - [`FileStore`]: all keys kept in a single JSON object on disk
//! - [`GoalStore`]: goal list cached under one key
//! - [`SyncState`]: date of the last successful workout sync

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::constants::storage_keys;
use crate::logging::AppLogger;
use crate::models::Goal;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Key-value store persisted as one JSON object
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: RwLock<()>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: RwLock::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<HashMap<String, String>> {
        if !tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(HashMap::new());
        }

        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read store file: {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse store file: {}", self.path.display()))
    }

    async fn write_all(&self, values: &HashMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        let content = serde_json::to_string_pretty(values)?;
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, content)
            .await
            .with_context(|| format!("Failed to write store file: {}", temp_path.display()))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .with_context(|| format!("Failed to replace store file: {}", self.path.display()))?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.read().await;
        let values = self.read_all().await?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.write().await;
        let mut values = self.read_all().await?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values).await
    }
}

/// Goals cached as a JSON array
#[derive(Clone)]
pub struct GoalStore {
    store: Arc<dyn KeyValueStore>,
}

impl GoalStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All cached goals; empty when nothing has been saved
    pub async fn load_all(&self) -> Result<Vec<Goal>> {
        let Some(raw) = self.store.get(storage_keys::GOALS).await? else {
            return Ok(Vec::new());
        };

        let goals: Vec<Goal> = serde_json::from_str(&raw).context("Failed to decode cached goals")?;
        AppLogger::log_storage_operation("load_goals", storage_keys::GOALS, true);
        Ok(goals)
    }

    pub async fn save_all(&self, goals: &[Goal]) -> Result<()> {
        let raw = serde_json::to_string(goals)?;
        let result = self.store.set(storage_keys::GOALS, &raw).await;
        AppLogger::log_storage_operation("save_goals", storage_keys::GOALS, result.is_ok());
        result
    }

    /// First goal for `year`
    pub async fn get_by_year(&self, year: i32) -> Result<Option<Goal>> {
        Ok(self.load_all().await?.into_iter().find(|goal| goal.year() == year))
    }

    /// Goal for the year containing `now`
    pub async fn current_goal(&self, now: DateTime<Utc>) -> Result<Option<Goal>> {
        self.get_by_year(now.year()).await
    }

    /// Replace the goal with the same id, or append it
    pub async fn replace_one(&self, goal: Goal) -> Result<()> {
        let mut goals = self.load_all().await?;
        match goals.iter_mut().find(|existing| existing.id() == goal.id()) {
            Some(existing) => *existing = goal,
            None => goals.push(goal),
        }
        self.save_all(&goals).await
    }
}

/// Date of the last successful sync
#[derive(Clone)]
pub struct SyncState {
    store: Arc<dyn KeyValueStore>,
}

impl SyncState {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn last_sync_date(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.store.get(storage_keys::LAST_SYNC_DATE).await? else {
            return Ok(None);
        };

        let date = DateTime::parse_from_rfc3339(&raw)
            .with_context(|| format!("Invalid last sync date: {}", raw))?;
        Ok(Some(date.with_timezone(&Utc)))
    }

    pub async fn set_last_sync_date(&self, date: DateTime<Utc>) -> Result<()> {
        let raw = date.to_rfc3339_opts(SecondsFormat::Millis, true);
        let result = self.store.set(storage_keys::LAST_SYNC_DATE, &raw).await;
        AppLogger::log_storage_operation("set_last_sync_date", storage_keys::LAST_SYNC_DATE, result.is_ok());
        result
    }
}
