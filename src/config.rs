// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Configuration management for the fitness tracker

pub mod fitness_config;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{endpoints, env_config, limits};

pub use fitness_config::FitnessConfig;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the remote web API
    pub api_base_url: String,
    /// File backing the local key-value store
    pub storage_path: PathBuf,
    /// Window of the recent-workouts listing, in days
    pub recent_days: i64,
    /// Lookback for the first sync, in days
    pub unsynced_lookback_days: i64,
    pub request_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: endpoints::DEFAULT_API_BASE_URL.to_string(),
            storage_path: default_storage_path(),
            recent_days: limits::RECENT_WORKOUT_DAYS,
            unsynced_lookback_days: limits::UNSYNCED_LOOKBACK_DAYS,
            request_timeout_seconds: 30,
        }
    }
}

fn default_config_path() -> String {
    dirs::config_dir()
        .map(|p| p.join("fitness-tracker/config.toml"))
        .unwrap_or_else(|| "config.toml".into())
        .to_string_lossy()
        .to_string()
}

fn default_storage_path() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("fitness-tracker/store.json"))
        .unwrap_or_else(|| "fitness_tracker_store.json".into())
}

impl Config {
    /// Load from `path` (or the user config directory), falling back to the environment
    pub fn load(path: Option<String>) -> Result<Self> {
        let config_path = path.unwrap_or_else(default_config_path);

        if Path::new(&config_path).exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            toml::from_str(&content)
                .context("Failed to parse config file")
        } else {
            dotenv::dotenv().ok();
            Ok(Self::from_env())
        }
    }

    /// Defaults overridden by `FITNESS_*` environment variables
    pub fn from_env() -> Self {
        Self {
            api_base_url: env_config::api_base_url(),
            storage_path: env_config::storage_path()
                .map(PathBuf::from)
                .unwrap_or_else(default_storage_path),
            request_timeout_seconds: env_config::request_timeout_seconds(),
            ..Self::default()
        }
    }

    pub fn save(&self, path: Option<String>) -> Result<()> {
        let config_path = path.unwrap_or_else(default_config_path);

        let parent = Path::new(&config_path).parent()
            .context("Invalid config path")?;
        fs::create_dir_all(parent)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;

        Ok(())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_seconds)
    }
}
