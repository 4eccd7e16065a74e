// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Data Models
//!
//! This module contains the core data structures used throughout the fitness tracker.
//! Workout records are origin independent: the same [`WorkoutRecord`] is produced by the
//! classifier from a health-data sample and decoded from the remote API.
//!
//! ## Design Principles
//!
//! - **Validated at the boundary**: records and goals can only be built through
//!   constructors that reject negative or non-finite values
//! - **Immutable**: fields are private; a changed goal is a new [`Goal`] value
//! - **Wire compatible**: serialized field names match the remote web API
//!
//! ## Core Models
//!
//! - [`WorkoutRecord`]: One completed workout
//! - [`SourceLabel`]: Canonical origin of a workout
//! - [`ActivityCategory`]: Canonical activity category
//! - [`Goal`]: Annual fitness goal with derived quarterly/weekly targets
//! - [`GoalInput`]: User-provided base inputs for a goal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::constants::goals::{QUARTERS_PER_YEAR, WEEKS_PER_QUARTER, WEEKS_PER_YEAR};
use crate::intelligence::{Period, ProgressMetric};

/// Canonical name of the app or device a workout came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceLabel {
    Peloton,
    Tonal,
    Cannondale,
    Gym,
    /// Any source not recognized by name
    #[serde(other)]
    Other,
}

impl SourceLabel {
    /// All labels in classifier priority order
    pub const ALL: [SourceLabel; 5] = [
        SourceLabel::Peloton,
        SourceLabel::Tonal,
        SourceLabel::Cannondale,
        SourceLabel::Gym,
        SourceLabel::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceLabel::Peloton => "Peloton",
            SourceLabel::Tonal => "Tonal",
            SourceLabel::Cannondale => "Cannondale",
            SourceLabel::Gym => "Gym",
            SourceLabel::Other => "Other",
        }
    }

    /// Activities the web app offers for this source
    pub fn supported_activities(&self) -> &'static [ActivityCategory] {
        match self {
            SourceLabel::Peloton => &[
                ActivityCategory::Cycling,
                ActivityCategory::OutdoorCycling,
                ActivityCategory::WeightLifting,
                ActivityCategory::Walking,
                ActivityCategory::Running,
                ActivityCategory::Yoga,
            ],
            SourceLabel::Tonal => &[ActivityCategory::WeightLifting],
            SourceLabel::Cannondale => &[ActivityCategory::OutdoorCycling],
            SourceLabel::Gym => &[
                ActivityCategory::WeightLifting,
                ActivityCategory::Running,
                ActivityCategory::Swimming,
            ],
            SourceLabel::Other => &[ActivityCategory::Other],
        }
    }
}

impl fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SourceLabel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceLabel::ALL
            .iter()
            .copied()
            .find(|label| label.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownLabel(s.to_string()))
    }
}

/// Canonical activity category of a workout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityCategory {
    Cycling,
    #[serde(rename = "Outdoor cycling")]
    OutdoorCycling,
    Running,
    Walking,
    #[serde(rename = "Weight lifting")]
    WeightLifting,
    Yoga,
    Swimming,
    /// Fallback for activity types without a mapping
    #[serde(other)]
    Other,
}

impl ActivityCategory {
    pub const ALL: [ActivityCategory; 8] = [
        ActivityCategory::Cycling,
        ActivityCategory::OutdoorCycling,
        ActivityCategory::Running,
        ActivityCategory::Walking,
        ActivityCategory::WeightLifting,
        ActivityCategory::Yoga,
        ActivityCategory::Swimming,
        ActivityCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Cycling => "Cycling",
            ActivityCategory::OutdoorCycling => "Outdoor cycling",
            ActivityCategory::Running => "Running",
            ActivityCategory::Walking => "Walking",
            ActivityCategory::WeightLifting => "Weight lifting",
            ActivityCategory::Yoga => "Yoga",
            ActivityCategory::Swimming => "Swimming",
            ActivityCategory::Other => "Other",
        }
    }

    /// Whether records of this category carry a lifted-weight value
    pub fn is_strength(&self) -> bool {
        matches!(self, ActivityCategory::WeightLifting)
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ActivityCategory {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ModelError::UnknownLabel(s.to_string()))
    }
}

/// Field values for a new workout record, validated by [`WorkoutRecord::new`]
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutInput {
    pub date: DateTime<Utc>,
    pub source: SourceLabel,
    pub activity: ActivityCategory,
    pub minutes: f64,
    pub miles: Option<f64>,
    pub weight: Option<f64>,
    pub calories: Option<f64>,
}

/// One completed workout, independent of where it was recorded
///
/// # Examples
///
/// ```rust
/// use fitness_tracker::models::{ActivityCategory, SourceLabel, WorkoutInput, WorkoutRecord};
/// use chrono::Utc;
///
/// let record = WorkoutRecord::new(WorkoutInput {
///     date: Utc::now(),
///     source: SourceLabel::Peloton,
///     activity: ActivityCategory::Cycling,
///     minutes: 45.0,
///     miles: Some(12.4),
///     weight: None,
///     calories: Some(520.0),
/// }).unwrap();
///
/// assert_eq!(record.whole_minutes(), 45);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WorkoutRecordData")]
pub struct WorkoutRecord {
    id: String,
    date: DateTime<Utc>,
    source: SourceLabel,
    activity: ActivityCategory,
    minutes: f64,
    miles: Option<f64>,
    weight: Option<f64>,
    calories: Option<f64>,
}

/// Unvalidated serialized form of [`WorkoutRecord`]
#[derive(Debug, Deserialize)]
struct WorkoutRecordData {
    id: String,
    date: DateTime<Utc>,
    source: SourceLabel,
    activity: ActivityCategory,
    minutes: f64,
    miles: Option<f64>,
    weight: Option<f64>,
    calories: Option<f64>,
}

impl TryFrom<WorkoutRecordData> for WorkoutRecord {
    type Error = ModelError;

    fn try_from(data: WorkoutRecordData) -> Result<Self, Self::Error> {
        WorkoutRecord::with_id(
            data.id,
            WorkoutInput {
                date: data.date,
                source: data.source,
                activity: data.activity,
                minutes: data.minutes,
                miles: data.miles,
                weight: data.weight,
                calories: data.calories,
            },
        )
    }
}

impl WorkoutRecord {
    /// Create a record with a freshly generated identifier
    pub fn new(input: WorkoutInput) -> Result<Self, ModelError> {
        Self::with_id(Uuid::new_v4().to_string(), input)
    }

    /// Create a record with a known identifier
    pub fn with_id(id: String, input: WorkoutInput) -> Result<Self, ModelError> {
        if id.trim().is_empty() {
            return Err(ModelError::MalformedRecord("id must not be empty".to_string()));
        }
        check_non_negative("minutes", input.minutes)?;
        check_optional_non_negative("miles", input.miles)?;
        check_optional_non_negative("weight", input.weight)?;
        check_optional_non_negative("calories", input.calories)?;

        Ok(Self {
            id,
            date: input.date,
            source: input.source,
            activity: input.activity,
            minutes: input.minutes,
            miles: input.miles,
            weight: input.weight,
            calories: input.calories,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Start of the workout
    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn source(&self) -> SourceLabel {
        self.source
    }

    pub fn activity(&self) -> ActivityCategory {
        self.activity
    }

    /// Duration in (possibly fractional) minutes
    pub fn minutes(&self) -> f64 {
        self.minutes
    }

    /// Duration truncated to whole minutes, the unit used for totals and the wire format
    pub fn whole_minutes(&self) -> i64 {
        self.minutes.trunc() as i64
    }

    pub fn miles(&self) -> Option<f64> {
        self.miles
    }

    /// Total pounds lifted, for strength sessions
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn calories(&self) -> Option<f64> {
        self.calories
    }
}

fn check_non_negative(field: &str, value: f64) -> Result<(), ModelError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ModelError::MalformedRecord(format!(
            "{field} must be a finite non-negative number, got {value}"
        )));
    }
    Ok(())
}

fn check_optional_non_negative(field: &str, value: Option<f64>) -> Result<(), ModelError> {
    match value {
        Some(v) => check_non_negative(field, v),
        None => Ok(()),
    }
}

/// Workout as exchanged with the remote web API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiWorkout {
    #[serde(with = "iso8601")]
    pub date: DateTime<Utc>,
    pub source: SourceLabel,
    pub activity: ActivityCategory,
    pub minutes: i64,
    pub miles: Option<f64>,
    pub weight_lifted: Option<f64>,
    pub calories: Option<f64>,
}

impl From<&WorkoutRecord> for ApiWorkout {
    fn from(record: &WorkoutRecord) -> Self {
        Self {
            date: record.date,
            source: record.source,
            activity: record.activity,
            minutes: record.whole_minutes(),
            miles: record.miles,
            weight_lifted: record.weight,
            calories: record.calories,
        }
    }
}

impl ApiWorkout {
    /// Decode into a validated record; the API does not carry ids, so a new one is assigned
    pub fn into_record(self) -> Result<WorkoutRecord, ModelError> {
        if self.minutes < 0 {
            return Err(ModelError::MalformedRecord(format!(
                "minutes must be non-negative, got {}",
                self.minutes
            )));
        }
        WorkoutRecord::new(WorkoutInput {
            date: self.date,
            source: self.source,
            activity: self.activity,
            minutes: self.minutes as f64,
            miles: self.miles,
            weight: self.weight_lifted,
            calories: self.calories,
        })
    }
}

/// Base inputs for an annual goal
///
/// # Examples
///
/// ```rust
/// use fitness_tracker::models::GoalInput;
/// use chrono::Utc;
///
/// let goal = GoalInput {
///     name: "2025 Fitness Challenge".to_string(),
///     year: 2025,
///     annual_weight_target: 520_000.0,
///     minutes_per_session: 45,
///     weekly_sessions_target: 5,
/// }
/// .create_goal(Utc::now())
/// .unwrap();
///
/// assert_eq!(goal.weekly_minutes_target(), 225);
/// assert_eq!(goal.quarterly_sessions_target(), 65);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalInput {
    pub name: String,
    pub year: i32,
    /// Total pounds to lift over the year
    pub annual_weight_target: f64,
    pub minutes_per_session: i64,
    pub weekly_sessions_target: i64,
}

impl GoalInput {
    /// Reject inputs whose derived targets would be meaningless
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.name.trim().is_empty() {
            return Err(ModelError::InvalidGoalInput("name must not be empty".to_string()));
        }
        if !self.annual_weight_target.is_finite() || self.annual_weight_target < 0.0 {
            return Err(ModelError::InvalidGoalInput(format!(
                "annualWeightTarget must be a finite non-negative number, got {}",
                self.annual_weight_target
            )));
        }
        if self.minutes_per_session <= 0 {
            return Err(ModelError::InvalidGoalInput(format!(
                "minutesPerSession must be positive, got {}",
                self.minutes_per_session
            )));
        }
        if self.weekly_sessions_target < 0 {
            return Err(ModelError::InvalidGoalInput(format!(
                "weeklySessionsTarget must be non-negative, got {}",
                self.weekly_sessions_target
            )));
        }
        Ok(())
    }

    /// Build a new goal with a fresh id, timestamped `now`
    pub fn create_goal(self, now: DateTime<Utc>) -> Result<Goal, ModelError> {
        Goal::build(Uuid::new_v4().to_string(), self, now, now)
    }
}

/// Targets computed from a goal's base inputs
#[derive(Debug, Clone, Copy, PartialEq)]
struct DerivedTargets {
    weekly_minutes: i64,
    annual_minutes: i64,
    quarterly_weight: f64,
    quarterly_minutes: i64,
    quarterly_sessions: i64,
}

impl DerivedTargets {
    fn compute(input: &GoalInput) -> Result<Self, ModelError> {
        let overflow = || ModelError::InvalidGoalInput("targets are too large".to_string());

        let weekly_minutes = input
            .minutes_per_session
            .checked_mul(input.weekly_sessions_target)
            .ok_or_else(overflow)?;
        let annual_minutes = weekly_minutes.checked_mul(WEEKS_PER_YEAR).ok_or_else(overflow)?;
        let quarterly_sessions = input
            .weekly_sessions_target
            .checked_mul(WEEKS_PER_QUARTER)
            .ok_or_else(overflow)?;

        Ok(Self {
            weekly_minutes,
            annual_minutes,
            quarterly_weight: input.annual_weight_target / QUARTERS_PER_YEAR as f64,
            quarterly_minutes: annual_minutes / QUARTERS_PER_YEAR,
            quarterly_sessions,
        })
    }
}

/// A user's annual fitness goal
///
/// Derived targets are computed once from the base inputs and can't be changed
/// independently. Editing a goal produces a replacement via [`Goal::replace_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "GoalRecord")]
pub struct Goal {
    id: String,
    name: String,
    year: i32,
    annual_weight_target: f64,
    minutes_per_session: i64,
    weekly_sessions_target: i64,
    weekly_minutes_target: i64,
    annual_minutes_target: i64,
    quarterly_weight_target: f64,
    quarterly_minutes_target: i64,
    quarterly_sessions_target: i64,
    #[serde(with = "iso8601")]
    created_at: DateTime<Utc>,
    #[serde(with = "iso8601")]
    updated_at: DateTime<Utc>,
}

/// Unvalidated serialized form of [`Goal`]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoalRecord {
    id: String,
    name: String,
    year: i32,
    annual_weight_target: f64,
    minutes_per_session: i64,
    weekly_sessions_target: i64,
    weekly_minutes_target: i64,
    annual_minutes_target: i64,
    quarterly_weight_target: f64,
    quarterly_minutes_target: i64,
    quarterly_sessions_target: i64,
    #[serde(with = "iso8601")]
    created_at: DateTime<Utc>,
    #[serde(with = "iso8601")]
    updated_at: DateTime<Utc>,
}

impl TryFrom<GoalRecord> for Goal {
    type Error = ModelError;

    fn try_from(record: GoalRecord) -> Result<Self, Self::Error> {
        let goal = Goal::build(
            record.id,
            GoalInput {
                name: record.name,
                year: record.year,
                annual_weight_target: record.annual_weight_target,
                minutes_per_session: record.minutes_per_session,
                weekly_sessions_target: record.weekly_sessions_target,
            },
            record.created_at,
            record.updated_at,
        )?;

        let consistent = goal.weekly_minutes_target == record.weekly_minutes_target
            && goal.annual_minutes_target == record.annual_minutes_target
            && goal.quarterly_minutes_target == record.quarterly_minutes_target
            && goal.quarterly_sessions_target == record.quarterly_sessions_target
            && (goal.quarterly_weight_target - record.quarterly_weight_target).abs() < 1e-6;
        if !consistent {
            return Err(ModelError::InvalidGoalInput(format!(
                "derived targets of goal {} disagree with its base inputs",
                goal.id
            )));
        }

        Ok(goal)
    }
}

impl Goal {
    fn build(
        id: String,
        input: GoalInput,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, ModelError> {
        input.validate()?;
        let derived = DerivedTargets::compute(&input)?;

        Ok(Self {
            id,
            name: input.name,
            year: input.year,
            annual_weight_target: input.annual_weight_target,
            minutes_per_session: input.minutes_per_session,
            weekly_sessions_target: input.weekly_sessions_target,
            weekly_minutes_target: derived.weekly_minutes,
            annual_minutes_target: derived.annual_minutes,
            quarterly_weight_target: derived.quarterly_weight,
            quarterly_minutes_target: derived.quarterly_minutes,
            quarterly_sessions_target: derived.quarterly_sessions,
            created_at,
            updated_at,
        })
    }

    /// Replace this goal's inputs wholesale, keeping its identity and creation time
    pub fn replace_with(&self, input: GoalInput, now: DateTime<Utc>) -> Result<Goal, ModelError> {
        Goal::build(self.id.clone(), input, self.created_at, now)
    }

    /// The base inputs this goal was built from
    pub fn input(&self) -> GoalInput {
        GoalInput {
            name: self.name.clone(),
            year: self.year,
            annual_weight_target: self.annual_weight_target,
            minutes_per_session: self.minutes_per_session,
            weekly_sessions_target: self.weekly_sessions_target,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn annual_weight_target(&self) -> f64 {
        self.annual_weight_target
    }

    pub fn minutes_per_session(&self) -> i64 {
        self.minutes_per_session
    }

    pub fn weekly_sessions_target(&self) -> i64 {
        self.weekly_sessions_target
    }

    pub fn weekly_minutes_target(&self) -> i64 {
        self.weekly_minutes_target
    }

    pub fn annual_minutes_target(&self) -> i64 {
        self.annual_minutes_target
    }

    pub fn quarterly_weight_target(&self) -> f64 {
        self.quarterly_weight_target
    }

    pub fn quarterly_minutes_target(&self) -> i64 {
        self.quarterly_minutes_target
    }

    pub fn quarterly_sessions_target(&self) -> i64 {
        self.quarterly_sessions_target
    }

    /// Session target for the whole year
    pub fn annual_sessions_target(&self) -> i64 {
        self.weekly_sessions_target * WEEKS_PER_YEAR
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Target value of `metric` over a whole `period`
    pub fn target(&self, metric: ProgressMetric, period: Period) -> f64 {
        match (metric, period) {
            (ProgressMetric::Weight, Period::Quarter) => self.quarterly_weight_target,
            (ProgressMetric::Weight, Period::Year) => self.annual_weight_target,
            (ProgressMetric::Minutes, Period::Quarter) => self.quarterly_minutes_target as f64,
            (ProgressMetric::Minutes, Period::Year) => self.annual_minutes_target as f64,
            (ProgressMetric::Sessions, Period::Quarter) => self.quarterly_sessions_target as f64,
            (ProgressMetric::Sessions, Period::Year) => self.annual_sessions_target() as f64,
        }
    }
}

/// Validation errors raised when building models
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid goal input: {0}")]
    InvalidGoalInput(String),

    #[error("Malformed workout record: {0}")]
    MalformedRecord(String),

    #[error("Unknown label: {0}")]
    UnknownLabel(String),
}

/// ISO-8601 timestamps with whole-second precision, as the remote API expects
pub(crate) mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|date| date.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn sample_input() -> WorkoutInput {
        WorkoutInput {
            date: Utc.with_ymd_and_hms(2025, 1, 20, 7, 30, 0).unwrap(),
            source: SourceLabel::Tonal,
            activity: ActivityCategory::WeightLifting,
            minutes: 42.7,
            miles: None,
            weight: Some(12_500.0),
            calories: Some(310.0),
        }
    }

    fn scenario_goal_input() -> GoalInput {
        GoalInput {
            name: "2025 Fitness Challenge".to_string(),
            year: 2025,
            annual_weight_target: 520_000.0,
            minutes_per_session: 45,
            weekly_sessions_target: 5,
        }
    }

    #[test]
    fn test_workout_record_creation() {
        let record = WorkoutRecord::new(sample_input()).unwrap();
        assert!(!record.id().is_empty());
        assert_eq!(record.source(), SourceLabel::Tonal);
        assert_eq!(record.activity(), ActivityCategory::WeightLifting);
        assert_eq!(record.minutes(), 42.7);
        assert_eq!(record.whole_minutes(), 42);
        assert_eq!(record.weight(), Some(12_500.0));
    }

    #[test]
    fn test_workout_record_rejects_negative_values() {
        let mut input = sample_input();
        input.minutes = -1.0;
        assert!(matches!(
            WorkoutRecord::new(input),
            Err(ModelError::MalformedRecord(_))
        ));

        let mut input = sample_input();
        input.miles = Some(-0.5);
        assert!(matches!(
            WorkoutRecord::new(input),
            Err(ModelError::MalformedRecord(_))
        ));

        let mut input = sample_input();
        input.calories = Some(f64::NAN);
        assert!(WorkoutRecord::new(input).is_err());
    }

    #[test]
    fn test_workout_record_deserialization_is_validated() {
        let json = json!({
            "id": "abc",
            "date": "2025-01-20T07:30:00Z",
            "source": "Gym",
            "activity": "Running",
            "minutes": -3.0,
            "miles": null,
            "weight": null,
            "calories": null
        });
        assert!(serde_json::from_value::<WorkoutRecord>(json).is_err());
    }

    #[test]
    fn test_label_serialization() {
        assert_eq!(serde_json::to_string(&SourceLabel::Peloton).unwrap(), "\"Peloton\"");
        assert_eq!(
            serde_json::to_string(&ActivityCategory::OutdoorCycling).unwrap(),
            "\"Outdoor cycling\""
        );
        assert_eq!(
            serde_json::to_string(&ActivityCategory::WeightLifting).unwrap(),
            "\"Weight lifting\""
        );

        // Unknown labels from the remote side fall back to Other
        let source: SourceLabel = serde_json::from_str("\"Strava\"").unwrap();
        assert_eq!(source, SourceLabel::Other);
        let activity: ActivityCategory = serde_json::from_str("\"Rowing\"").unwrap();
        assert_eq!(activity, ActivityCategory::Other);
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("peloton".parse::<SourceLabel>().unwrap(), SourceLabel::Peloton);
        assert_eq!(
            "weight lifting".parse::<ActivityCategory>().unwrap(),
            ActivityCategory::WeightLifting
        );
        assert!("Strava".parse::<SourceLabel>().is_err());
    }

    #[test]
    fn test_supported_activities() {
        assert_eq!(SourceLabel::Peloton.supported_activities().len(), 6);
        assert_eq!(
            SourceLabel::Tonal.supported_activities(),
            &[ActivityCategory::WeightLifting]
        );
        assert_eq!(
            SourceLabel::Cannondale.supported_activities(),
            &[ActivityCategory::OutdoorCycling]
        );
    }

    #[test]
    fn test_api_workout_wire_format() {
        let record = WorkoutRecord::new(sample_input()).unwrap();
        let value = serde_json::to_value(ApiWorkout::from(&record)).unwrap();

        assert_eq!(value["date"], "2025-01-20T07:30:00Z");
        assert_eq!(value["source"], "Tonal");
        assert_eq!(value["activity"], "Weight lifting");
        assert_eq!(value["minutes"], 42);
        assert_eq!(value["weightLifted"], 12_500.0);
        assert_eq!(value["calories"], 310.0);
        assert!(value["miles"].is_null());
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_api_workout_decoding_assigns_new_id() {
        let api: ApiWorkout = serde_json::from_value(json!({
            "date": "2025-02-01T18:00:00.000Z",
            "source": "Peloton",
            "activity": "Cycling",
            "minutes": 30,
            "miles": 9.5,
            "weightLifted": null,
            "calories": 400.0
        }))
        .unwrap();

        let first = api.clone().into_record().unwrap();
        let second = api.into_record().unwrap();
        assert_ne!(first.id(), second.id());
        assert_eq!(first.minutes(), 30.0);
        assert_eq!(first.miles(), Some(9.5));
    }

    #[test]
    fn test_goal_derived_targets() {
        let goal = scenario_goal_input().create_goal(Utc::now()).unwrap();

        assert_eq!(goal.weekly_minutes_target(), 225);
        assert_eq!(goal.annual_minutes_target(), 11_700);
        assert_eq!(goal.quarterly_weight_target(), 130_000.0);
        assert_eq!(goal.quarterly_minutes_target(), 2_925);
        assert_eq!(goal.quarterly_sessions_target(), 65);
        assert_eq!(goal.annual_sessions_target(), 260);
    }

    #[test]
    fn test_goal_derived_targets_hold_for_many_inputs() {
        for minutes in 1..=120 {
            for sessions in 0..=14 {
                let goal = GoalInput {
                    name: "grid".to_string(),
                    year: 2025,
                    annual_weight_target: (minutes * 1000) as f64,
                    minutes_per_session: minutes,
                    weekly_sessions_target: sessions,
                }
                .create_goal(Utc::now())
                .unwrap();

                assert_eq!(goal.weekly_minutes_target(), minutes * sessions);
                assert_eq!(goal.annual_minutes_target(), goal.weekly_minutes_target() * 52);
                assert_eq!(goal.quarterly_minutes_target(), goal.annual_minutes_target() / 4);
                assert_eq!(goal.quarterly_sessions_target(), sessions * 13);
                assert_eq!(goal.quarterly_weight_target(), goal.annual_weight_target() / 4.0);
            }
        }
    }

    #[test]
    fn test_goal_input_validation() {
        let mut input = scenario_goal_input();
        input.minutes_per_session = 0;
        assert!(matches!(
            input.create_goal(Utc::now()),
            Err(ModelError::InvalidGoalInput(_))
        ));

        let mut input = scenario_goal_input();
        input.weekly_sessions_target = -1;
        assert!(input.create_goal(Utc::now()).is_err());

        let mut input = scenario_goal_input();
        input.annual_weight_target = -10.0;
        assert!(input.create_goal(Utc::now()).is_err());

        let mut input = scenario_goal_input();
        input.name = "   ".to_string();
        assert!(input.create_goal(Utc::now()).is_err());

        let mut input = scenario_goal_input();
        input.minutes_per_session = i64::MAX;
        assert!(input.create_goal(Utc::now()).is_err());
    }

    #[test]
    fn test_goal_replace_keeps_identity() {
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let edited = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();
        let goal = scenario_goal_input().create_goal(created).unwrap();

        let mut input = goal.input();
        input.weekly_sessions_target = 4;
        let replaced = goal.replace_with(input, edited).unwrap();

        assert_eq!(replaced.id(), goal.id());
        assert_eq!(replaced.created_at(), created);
        assert_eq!(replaced.updated_at(), edited);
        assert_eq!(replaced.weekly_minutes_target(), 180);
        assert_eq!(replaced.quarterly_sessions_target(), 52);
        // The original is untouched
        assert_eq!(goal.weekly_minutes_target(), 225);
    }

    #[test]
    fn test_goal_serialization_field_names() {
        let goal = scenario_goal_input()
            .create_goal(Utc.with_ymd_and_hms(2025, 1, 20, 12, 0, 0).unwrap())
            .unwrap();
        let value = serde_json::to_value(&goal).unwrap();

        for field in [
            "id",
            "name",
            "year",
            "annualWeightTarget",
            "minutesPerSession",
            "weeklySessionsTarget",
            "weeklyMinutesTarget",
            "annualMinutesTarget",
            "quarterlyWeightTarget",
            "quarterlyMinutesTarget",
            "quarterlySessionsTarget",
            "createdAt",
            "updatedAt",
        ] {
            assert!(value.get(field).is_some(), "missing field {field}");
        }
        assert_eq!(value["createdAt"], "2025-01-20T12:00:00Z");

        let decoded: Goal = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, goal);
    }

    #[test]
    fn test_goal_deserialization_rejects_inconsistent_targets() {
        let goal = scenario_goal_input().create_goal(Utc::now()).unwrap();
        let mut value = serde_json::to_value(&goal).unwrap();
        value["weeklyMinutesTarget"] = json!(999);

        assert!(serde_json::from_value::<Goal>(value).is_err());
    }

    #[test]
    fn test_goal_target_lookup() {
        let goal = scenario_goal_input().create_goal(Utc::now()).unwrap();
        assert_eq!(goal.target(ProgressMetric::Weight, Period::Quarter), 130_000.0);
        assert_eq!(goal.target(ProgressMetric::Minutes, Period::Year), 11_700.0);
        assert_eq!(goal.target(ProgressMetric::Sessions, Period::Year), 260.0);
    }
}
