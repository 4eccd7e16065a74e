// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Fitness Tracker
//!
//! Reads workouts exported from a health-data store, classifies them into canonical
//! sources and activities, syncs them to a remote web API and tracks progress against
//! annual fitness goals.
//!
//! ## Features
//!
//! - **Classification**: source names and platform activity codes mapped to a fixed
//!   set of labels, with a pluggable lifted-weight estimate for strength sessions
//! - **Goal progress**: actual versus expected weight, minutes and sessions for the
//!   current quarter and year, with sessions still needed to hit the targets
//! - **Dashboards**: totals, per-activity breakdowns and single-session records
//! - **Sync**: incremental push of new workouts and offline caching of goals
//!
//! ## Architecture
//!
//! - **Models**: workout records and goals, validated at construction
//! - **Intelligence**: pure classification, progress and aggregation functions
//! - **Providers**: workout sources and the remote API client
//! - **Storage**: key-value persistence for goals and sync state
//! - **Config**: configuration files and environment overrides
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use fitness_tracker::intelligence::{compute_progress, Period, ProgressMetric, ProgressStatus};
//! use fitness_tracker::models::GoalInput;
//!
//! let now = Utc.with_ymd_and_hms(2025, 2, 15, 0, 0, 0).unwrap();
//! let goal = GoalInput {
//!     name: "2025 Fitness Challenge".to_string(),
//!     year: 2025,
//!     annual_weight_target: 520_000.0,
//!     minutes_per_session: 45,
//!     weekly_sessions_target: 5,
//! }
//! .create_goal(now)?;
//!
//! let progress = compute_progress(&goal, &[], now);
//! assert_eq!(progress.current_quarter, 1);
//! assert_eq!(progress.sessions_needed_for_quarter, 65);
//! assert_eq!(
//!     progress.status(ProgressMetric::Minutes, Period::Quarter),
//!     ProgressStatus::Behind
//! );
//! # Ok::<(), fitness_tracker::models::ModelError>(())
//! ```

/// Common data models for workouts and goals
pub mod models;

/// Configuration management and persistence
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Workout sources and the remote API client
pub mod providers;

/// Classification, goal progress and workout statistics
pub mod intelligence;

/// Local key-value persistence
pub mod storage;

/// Workout synchronization
pub mod sync;

/// Structured logging
pub mod logging;
