// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Workout source backed by a JSON export of health-data samples
//!
//! The export is either a bare array of samples or an object with a `workouts` array.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{RawWorkoutSample, SampleQuery, WorkoutSource};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExportFile {
    Samples(Vec<RawWorkoutSample>),
    Wrapped { workouts: Vec<RawWorkoutSample> },
}

impl ExportFile {
    fn into_samples(self) -> Vec<RawWorkoutSample> {
        match self {
            ExportFile::Samples(samples) => samples,
            ExportFile::Wrapped { workouts } => workouts,
        }
    }
}

enum Backing {
    File(PathBuf),
    Memory(Vec<RawWorkoutSample>),
}

pub struct HealthExportSource {
    backing: Backing,
}

impl HealthExportSource {
    /// Source reading the export at `path` on every query
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            backing: Backing::File(path.as_ref().to_path_buf()),
        }
    }

    /// Source over samples already in memory
    pub fn from_samples(samples: Vec<RawWorkoutSample>) -> Self {
        Self {
            backing: Backing::Memory(samples),
        }
    }

    async fn load(&self) -> Result<Vec<RawWorkoutSample>> {
        match &self.backing {
            Backing::Memory(samples) => Ok(samples.clone()),
            Backing::File(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read health export: {}", path.display()))?;
                let export: ExportFile = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse health export: {}", path.display()))?;
                Ok(export.into_samples())
            }
        }
    }
}

#[async_trait]
impl WorkoutSource for HealthExportSource {
    async fn fetch_samples(&self, query: SampleQuery) -> Result<Vec<RawWorkoutSample>> {
        let samples = self.load().await?;
        let total = samples.len();
        let matching = query.apply(samples);

        debug!(
            total,
            matching = matching.len(),
            start = %query.start,
            end = %query.end,
            "Queried health export"
        );

        Ok(matching)
    }

    fn source_name(&self) -> &'static str {
        "health_export"
    }
}
