// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Intelligence Module
//!
//! Pure computations over canonical workout records.
//!
//! This module includes:
//! - Activity classification of raw health-data samples
//! - Goal progress tracking for the current quarter and year
//! - Aggregated workout statistics for dashboards
//!
//! Nothing here performs I/O or reads the clock: the current time is always passed in,
//! so every function can be called repeatedly and concurrently with the same result.

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod classifier;
pub mod goal_engine;
pub mod metrics;

pub use classifier::{ActivityClassifier, CalorieMultiplierEstimator, Classification, RawActivityType, WeightEstimator};
pub use goal_engine::{compute_progress, progress_status, GoalProgress, PeriodPair, ProgressStatus};
pub use metrics::{ActivityBreakdown, WorkoutSummary};

/// Reporting period of a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Calendar quarter containing "now"
    Quarter,
    /// Calendar year containing "now"
    Year,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Quarter => write!(f, "Quarter"),
            Period::Year => write!(f, "Annual"),
        }
    }
}

/// Metric tracked against a goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMetric {
    /// Pounds lifted
    Weight,
    Minutes,
    Sessions,
}

impl ProgressMetric {
    pub const ALL: [ProgressMetric; 3] = [
        ProgressMetric::Weight,
        ProgressMetric::Minutes,
        ProgressMetric::Sessions,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ProgressMetric::Weight => "Weight Lifted",
            ProgressMetric::Minutes => "Minutes Completed",
            ProgressMetric::Sessions => "Sessions Completed",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            ProgressMetric::Weight => "lbs",
            ProgressMetric::Minutes => "min",
            ProgressMetric::Sessions => "sessions",
        }
    }
}
