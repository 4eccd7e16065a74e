// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Constants Module
//!
//! Application constants and environment-based configuration values.
//! This module provides both hardcoded constants and environment variable configuration.

use std::env;

/// Environment-based configuration
pub mod env_config {
    use super::env;

    /// Get remote API base URL from environment or default
    pub fn api_base_url() -> String {
        env::var("FITNESS_API_BASE_URL")
            .unwrap_or_else(|_| super::endpoints::DEFAULT_API_BASE_URL.to_string())
    }

    /// Get local storage path from environment, if overridden
    pub fn storage_path() -> Option<String> {
        env::var("FITNESS_STORAGE_PATH").ok()
    }

    /// Get HTTP request timeout from environment or default
    pub fn request_timeout_seconds() -> u64 {
        env::var("FITNESS_REQUEST_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30)
    }

    /// Get log level from environment or default
    pub fn log_level() -> String {
        env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string())
    }
}

/// Remote sync endpoint paths
pub mod endpoints {
    pub const DEFAULT_API_BASE_URL: &str = "https://fitness-tracker-one-sigma.vercel.app";
    pub const GOALS_PATH: &str = "api/goals";
    pub const WORKOUTS_PATH: &str = "api/workouts";
}

/// Goal decomposition factors
pub mod goals {
    /// Weeks counted in a goal year
    pub const WEEKS_PER_YEAR: i64 = 52;

    /// Weeks counted in a goal quarter
    pub const WEEKS_PER_QUARTER: i64 = 13;

    pub const QUARTERS_PER_YEAR: i64 = 4;

    pub const MONTHS_PER_QUARTER: u32 = 3;

    /// Fraction of the expected value below which a metric is "Behind"
    pub const SLIGHTLY_BEHIND_RATIO: f64 = 0.8;
}

/// Workout classification constants
pub mod classification {
    /// Metadata keys that may carry an explicit lifted-weight value, in lookup order
    pub const WEIGHT_METADATA_KEYS: [&str; 2] = ["HKMetadataKeyWeightLifted", "total_weight"];

    /// Estimated pounds lifted per kilocalorie for Tonal sessions
    pub const TONAL_CALORIE_MULTIPLIER: f64 = 10.0;

    /// Estimated pounds lifted per kilocalorie for every other source
    pub const DEFAULT_CALORIE_MULTIPLIER: f64 = 20.0;
}

/// Numeric limits and thresholds
pub mod limits {
    /// Window used for the "recent workouts" listing
    pub const RECENT_WORKOUT_DAYS: i64 = 30;

    /// Maximum number of samples returned for the recent listing
    pub const RECENT_WORKOUT_LIMIT: usize = 100;

    /// Lookback used when no sync has happened yet
    pub const UNSYNCED_LOOKBACK_DAYS: i64 = 7;

    /// Unit conversions
    pub const SECONDS_PER_MINUTE: f64 = 60.0;
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    pub const METERS_PER_MILE: f64 = 1609.344;
}

/// Keys used in the local key-value store
pub mod storage_keys {
    pub const GOALS: &str = "fitness_tracker_goals";
    pub const LAST_SYNC_DATE: &str = "last_sync_date";
}

/// Progress status labels shown to the user
pub mod status {
    pub const ON_TRACK: &str = "On Track";
    pub const SLIGHTLY_BEHIND: &str = "Slightly Behind";
    pub const BEHIND: &str = "Behind";
}
