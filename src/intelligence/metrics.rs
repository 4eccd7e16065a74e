// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Workout collection statistics for dashboards

use serde::Serialize;
use std::collections::HashMap;

use crate::models::{ActivityCategory, WorkoutRecord};

/// Sessions and minutes recorded for one activity category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityBreakdown {
    pub activity: ActivityCategory,
    pub sessions: usize,
    pub minutes: i64,
}

/// Roll-up of a workout collection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
    pub total_sessions: usize,
    /// Sum of whole minutes
    pub total_minutes: i64,
    pub total_miles: f64,
    pub total_weight: f64,
    /// Record with the greatest distance; first one wins on ties
    pub longest_distance: Option<WorkoutRecord>,
    /// Record with the most weight lifted; first one wins on ties
    pub most_weight: Option<WorkoutRecord>,
    /// Per-activity totals, most minutes first
    pub breakdown: Vec<ActivityBreakdown>,
}

impl WorkoutSummary {
    pub fn from_workouts(workouts: &[WorkoutRecord]) -> Self {
        let mut breakdown: Vec<ActivityBreakdown> = Vec::new();
        let mut positions: HashMap<ActivityCategory, usize> = HashMap::new();

        for workout in workouts {
            let index = *positions.entry(workout.activity()).or_insert_with(|| {
                breakdown.push(ActivityBreakdown {
                    activity: workout.activity(),
                    sessions: 0,
                    minutes: 0,
                });
                breakdown.len() - 1
            });
            let entry = &mut breakdown[index];
            entry.sessions += 1;
            entry.minutes = entry.minutes.saturating_add(workout.whole_minutes());
        }

        // Stable, so equal totals keep first-seen order
        breakdown.sort_by(|a, b| b.minutes.cmp(&a.minutes));

        Self {
            total_sessions: workouts.len(),
            total_minutes: workouts
                .iter()
                .fold(0i64, |sum, w| sum.saturating_add(w.whole_minutes())),
            total_miles: workouts.iter().filter_map(WorkoutRecord::miles).sum(),
            total_weight: workouts.iter().filter_map(WorkoutRecord::weight).sum(),
            longest_distance: first_max_by(workouts, WorkoutRecord::miles).cloned(),
            most_weight: first_max_by(workouts, WorkoutRecord::weight).cloned(),
            breakdown,
        }
    }

    /// The `n` activities with the most minutes
    pub fn top_activities(&self, n: usize) -> &[ActivityBreakdown] {
        &self.breakdown[..n.min(self.breakdown.len())]
    }

    pub fn is_empty(&self) -> bool {
        self.total_sessions == 0
    }
}

fn first_max_by<F>(workouts: &[WorkoutRecord], field: F) -> Option<&WorkoutRecord>
where
    F: Fn(&WorkoutRecord) -> Option<f64>,
{
    let mut best: Option<(&WorkoutRecord, f64)> = None;
    for workout in workouts {
        if let Some(value) = field(workout) {
            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((workout, value)),
            }
        }
    }
    best.map(|(workout, _)| workout)
}
