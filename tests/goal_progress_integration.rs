// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Integration tests for classification, goal progress and dashboard aggregation
//!
//! Raw samples are classified into records and fed through the public progress
//! and summary APIs, the way the CLI does.

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use fitness_tracker::intelligence::{
    compute_progress, ActivityClassifier, Period, ProgressMetric, ProgressStatus, WorkoutSummary,
};
use fitness_tracker::models::{
    ActivityCategory, Goal, GoalInput, ModelError, SourceLabel, WorkoutInput, WorkoutRecord,
};
use fitness_tracker::providers::RawWorkoutSample;
use serde_json::json;
use std::collections::HashMap;

fn scenario_goal() -> Result<Goal> {
    Ok(GoalInput {
        name: "2025 Fitness Challenge".to_string(),
        year: 2025,
        annual_weight_target: 520_000.0,
        minutes_per_session: 45,
        weekly_sessions_target: 5,
    }
    .create_goal(Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap())?)
}

fn raw_sample(
    start: DateTime<Utc>,
    minutes: i64,
    source_name: &str,
    activity_type: &str,
    calories: Option<f64>,
) -> RawWorkoutSample {
    RawWorkoutSample {
        start,
        end: start + Duration::minutes(minutes),
        duration_seconds: None,
        source_name: source_name.to_string(),
        activity_type: activity_type.to_string(),
        total_distance_meters: None,
        total_energy_kcal: calories,
        metadata: HashMap::new(),
    }
}

#[test]
fn test_goal_derived_targets() -> Result<()> {
    let goal = scenario_goal()?;

    assert_eq!(goal.weekly_minutes_target(), 225);
    assert_eq!(goal.annual_minutes_target(), 11_700);
    assert_eq!(goal.quarterly_weight_target(), 130_000.0);
    assert_eq!(goal.quarterly_minutes_target(), 2_925);
    assert_eq!(goal.quarterly_sessions_target(), 65);

    Ok(())
}

#[test]
fn test_goal_with_zero_minutes_per_session_is_rejected() {
    let result = GoalInput {
        name: "Broken".to_string(),
        year: 2025,
        annual_weight_target: 1_000.0,
        minutes_per_session: 0,
        weekly_sessions_target: 5,
    }
    .create_goal(Utc::now());

    assert!(matches!(result, Err(ModelError::InvalidGoalInput(_))));
}

#[test]
fn test_zero_workouts_in_quarter() -> Result<()> {
    let goal = scenario_goal()?;
    let now = Utc.with_ymd_and_hms(2025, 5, 20, 9, 0, 0).unwrap();

    // Only last quarter's workouts exist
    let workouts = vec![WorkoutRecord::new(WorkoutInput {
        date: Utc.with_ymd_and_hms(2025, 2, 3, 7, 0, 0).unwrap(),
        source: SourceLabel::Gym,
        activity: ActivityCategory::Running,
        minutes: 30.0,
        miles: Some(3.1),
        weight: None,
        calories: Some(320.0),
    })?];

    let progress = compute_progress(&goal, &workouts, now);

    assert_eq!(progress.current_quarter, 2);
    for metric in ProgressMetric::ALL {
        assert_eq!(progress.actual(metric, Period::Quarter), 0.0);
        assert!(progress.expected(metric, Period::Quarter) > 0.0);
        assert_eq!(progress.status(metric, Period::Quarter), ProgressStatus::Behind);
    }
    assert_eq!(progress.actual_sessions.year_to_date, 1);
    assert_eq!(progress.sessions_needed_for_quarter, 65);

    Ok(())
}

#[test]
fn test_classified_samples_drive_progress() -> Result<()> {
    let classifier = ActivityClassifier::default();
    let goal = scenario_goal()?;
    let now = Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap();

    let mut tonal = raw_sample(now - Duration::days(2), 40, "Tonal", "traditionalStrengthTraining", Some(300.0));
    tonal.metadata.insert("total_weight".to_string(), json!(9_000.0));

    let samples = vec![
        raw_sample(now - Duration::days(10), 45, "My Peloton Bike", "cycling", Some(500.0)),
        raw_sample(now - Duration::days(8), 45, "Cannondale App", "mixedCardio", None),
        raw_sample(now - Duration::days(5), 50, "Other Gym", "functionalStrengthTraining", Some(200.0)),
        tonal,
        raw_sample(now - Duration::days(1), 45, "Peloton", "yoga", None),
    ];

    let workouts = samples
        .iter()
        .map(|s| classifier.to_record(s))
        .collect::<Result<Vec<_>, _>>()?;

    assert_eq!(workouts[0].source(), SourceLabel::Peloton);
    assert_eq!(workouts[0].activity(), ActivityCategory::Cycling);
    assert_eq!(workouts[1].activity(), ActivityCategory::OutdoorCycling);
    assert_eq!(workouts[2].source(), SourceLabel::Gym);
    assert_eq!(workouts[2].weight(), Some(4_000.0));
    assert_eq!(workouts[3].weight(), Some(9_000.0));

    let progress = compute_progress(&goal, &workouts, now);
    assert_eq!(progress.actual_sessions.quarter_to_date, 5);
    assert_eq!(progress.actual_minutes.quarter_to_date, 225);
    assert_eq!(progress.actual_weight_lifted.quarter_to_date, 13_000.0);

    // 14 of 90 days elapsed: 65 * 14/90 = 10.1 sessions expected
    assert_eq!(progress.expected_sessions.quarter_to_date, 10);
    assert_eq!(
        progress.status(ProgressMetric::Sessions, Period::Quarter),
        ProgressStatus::Behind
    );
    // 130000 * 14/90 = 20222 lbs expected, 13000 lifted
    assert_eq!(
        progress.status(ProgressMetric::Weight, Period::Quarter),
        ProgressStatus::Behind
    );
    // (2925 - 225) / 45 = 60
    assert_eq!(progress.sessions_needed_for_quarter, 60);

    Ok(())
}

#[test]
fn test_progress_is_deterministic() -> Result<()> {
    let goal = scenario_goal()?;
    let now = Utc.with_ymd_and_hms(2025, 8, 1, 18, 30, 0).unwrap();
    let workouts: Vec<_> = (0..50)
        .map(|i| {
            WorkoutRecord::new(WorkoutInput {
                date: now - Duration::days(i * 4),
                source: SourceLabel::Tonal,
                activity: ActivityCategory::WeightLifting,
                minutes: 35.5,
                miles: None,
                weight: Some(7_500.0),
                calories: None,
            })
        })
        .collect::<Result<_, _>>()?;

    let first = compute_progress(&goal, &workouts, now);
    let second = compute_progress(&goal, &workouts, now);
    assert_eq!(first, second);
    assert!(first.actual_sessions.quarter_to_date <= first.actual_sessions.year_to_date);
    assert!(first.sessions_needed_for_quarter >= 0);
    assert!(first.sessions_needed_for_year >= 0);

    Ok(())
}

#[test]
fn test_summary_over_workouts() -> Result<()> {
    let date = Utc.with_ymd_and_hms(2025, 1, 10, 7, 0, 0).unwrap();
    let first = WorkoutRecord::new(WorkoutInput {
        date,
        source: SourceLabel::Peloton,
        activity: ActivityCategory::Running,
        minutes: 40.0,
        miles: Some(5.0),
        weight: None,
        calories: None,
    })?;
    let second = WorkoutRecord::new(WorkoutInput {
        date: date + Duration::days(1),
        source: SourceLabel::Tonal,
        activity: ActivityCategory::WeightLifting,
        minutes: 30.0,
        miles: Some(3.0),
        weight: Some(200.0),
        calories: None,
    })?;

    let summary = WorkoutSummary::from_workouts(&[first.clone(), second.clone()]);

    assert_eq!(summary.total_miles, 8.0);
    assert_eq!(summary.total_weight, 200.0);
    assert_eq!(summary.longest_distance, Some(first));
    assert_eq!(summary.most_weight, Some(second));
    assert_eq!(summary.top_activities(1)[0].activity, ActivityCategory::Running);

    Ok(())
}
