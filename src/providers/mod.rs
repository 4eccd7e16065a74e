// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Workout sources and the remote sync endpoint

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub mod health_export;
pub mod remote;

/// One workout sample as recorded by the health-data store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWorkoutSample {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Duration in seconds, when the store reports it separately from start/end
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    pub source_name: String,
    /// Activity-type name or numeric code
    pub activity_type: String,
    #[serde(default)]
    pub total_distance_meters: Option<f64>,
    #[serde(default)]
    pub total_energy_kcal: Option<f64>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl RawWorkoutSample {
    /// Reported duration, falling back to the span between start and end
    pub fn elapsed_seconds(&self) -> f64 {
        self.duration_seconds
            .unwrap_or_else(|| (self.end - self.start).num_milliseconds() as f64 / 1000.0)
    }
}

/// Time window and ordering for a sample query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Oldest first when true
    pub ascending: bool,
    pub limit: Option<usize>,
}

impl SampleQuery {
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            ascending: true,
            limit: None,
        }
    }

    pub fn newest_first(mut self) -> Self {
        self.ascending = false;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a sample starting at `date` falls within the window (inclusive)
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.start <= date && date <= self.end
    }

    /// Filter, order and cap `samples` according to this query
    pub fn apply(&self, samples: impl IntoIterator<Item = RawWorkoutSample>) -> Vec<RawWorkoutSample> {
        let mut matching: Vec<_> = samples.into_iter().filter(|s| self.contains(s.start)).collect();
        if self.ascending {
            matching.sort_by_key(|s| s.start);
        } else {
            matching.sort_by_key(|s| std::cmp::Reverse(s.start));
        }
        if let Some(limit) = self.limit {
            matching.truncate(limit);
        }
        matching
    }
}

/// A store of raw workout samples
#[async_trait]
pub trait WorkoutSource: Send + Sync {
    async fn fetch_samples(&self, query: SampleQuery) -> Result<Vec<RawWorkoutSample>>;

    fn source_name(&self) -> &'static str;
}

pub fn create_source(source_type: &str, location: Option<&str>) -> Result<Box<dyn WorkoutSource>> {
    match source_type.to_lowercase().as_str() {
        "health_export" | "export" => {
            let path = location
                .ok_or_else(|| anyhow::anyhow!("The health_export source requires a file path"))?;
            Ok(Box::new(health_export::HealthExportSource::new(path)))
        }
        _ => Err(anyhow::anyhow!(
            "Unknown workout source: {}. Currently supported: health_export",
            source_type
        )),
    }
}
