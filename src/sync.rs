// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Workout synchronization from a local source to the remote API

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::constants::limits::{RECENT_WORKOUT_DAYS, RECENT_WORKOUT_LIMIT, UNSYNCED_LOOKBACK_DAYS};
use crate::intelligence::ActivityClassifier;
use crate::logging::AppLogger;
use crate::models::WorkoutRecord;
use crate::providers::remote::{RemoteClient, SyncOutcome};
use crate::providers::{RawWorkoutSample, SampleQuery, WorkoutSource};
use crate::storage::SyncState;

/// Counts from one sync run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub fetched: usize,
    pub created: usize,
    /// Already present on the server
    pub duplicates: usize,
    /// Samples that could not be turned into valid records
    pub rejected: usize,
}

pub struct SyncService {
    source: Arc<dyn WorkoutSource>,
    classifier: ActivityClassifier,
    remote: RemoteClient,
    state: SyncState,
    recent_days: i64,
    unsynced_lookback_days: i64,
}

impl SyncService {
    pub fn new(
        source: Arc<dyn WorkoutSource>,
        classifier: ActivityClassifier,
        remote: RemoteClient,
        state: SyncState,
    ) -> Self {
        Self {
            source,
            classifier,
            remote,
            state,
            recent_days: RECENT_WORKOUT_DAYS,
            unsynced_lookback_days: UNSYNCED_LOOKBACK_DAYS,
        }
    }

    /// Override the recent and first-sync lookback windows, in days
    pub fn with_windows(mut self, recent_days: i64, unsynced_lookback_days: i64) -> Self {
        self.recent_days = recent_days;
        self.unsynced_lookback_days = unsynced_lookback_days;
        self
    }

    /// Push every workout recorded since the last sync, oldest first
    ///
    /// The last sync date only advances when every push reached the server.
    pub async fn sync_unsynced(&self, now: DateTime<Utc>) -> Result<SyncReport> {
        let last_sync = self.state.last_sync_date().await?;
        let window_start = last_sync.unwrap_or(now - Duration::days(self.unsynced_lookback_days));

        let samples = self
            .source
            .fetch_samples(SampleQuery::between(window_start, now))
            .await
            .with_context(|| format!("Failed to read workouts from {}", self.source.source_name()))?;

        AppLogger::log_sync_event("started", samples.len(), true);

        let mut report = SyncReport {
            window_start,
            window_end: now,
            fetched: samples.len(),
            created: 0,
            duplicates: 0,
            rejected: 0,
        };

        for record in self.classify_all(&samples, &mut report.rejected) {
            let outcome = self.remote.sync_workout(&record).await.with_context(|| {
                format!("Failed to sync {} workout from {}", record.activity(), record.date())
            });

            match outcome {
                Ok(SyncOutcome::Created) => report.created += 1,
                Ok(SyncOutcome::AlreadyExists) => report.duplicates += 1,
                Err(e) => {
                    AppLogger::log_sync_event("failed", report.created + report.duplicates, false);
                    return Err(e);
                }
            }
        }

        self.state.set_last_sync_date(now).await?;

        info!(
            sync.created = report.created,
            sync.duplicates = report.duplicates,
            sync.rejected = report.rejected,
            "Workout sync complete"
        );
        AppLogger::log_sync_event("completed", report.created + report.duplicates, true);

        Ok(report)
    }

    /// Classified workouts from the recent window, newest first
    pub async fn recent_workouts(&self, now: DateTime<Utc>) -> Result<Vec<WorkoutRecord>> {
        let query = SampleQuery::between(now - Duration::days(self.recent_days), now)
            .newest_first()
            .with_limit(RECENT_WORKOUT_LIMIT);

        let samples = self
            .source
            .fetch_samples(query)
            .await
            .with_context(|| format!("Failed to read workouts from {}", self.source.source_name()))?;

        let mut rejected = 0;
        Ok(self.classify_all(&samples, &mut rejected))
    }

    fn classify_all(&self, samples: &[RawWorkoutSample], rejected: &mut usize) -> Vec<WorkoutRecord> {
        samples
            .iter()
            .filter_map(|sample| match self.classifier.to_record(sample) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(source.name = %sample.source_name, start = %sample.start, "Rejected workout sample: {}", e);
                    *rejected += 1;
                    None
                }
            })
            .collect()
    }
}
