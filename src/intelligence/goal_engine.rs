// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Goal tracking and progress monitoring engine

use chrono::{DateTime, Datelike, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::{Period, ProgressMetric};
use crate::constants::goals::{MONTHS_PER_QUARTER, SLIGHTLY_BEHIND_RATIO};
use crate::constants::status::{BEHIND, ON_TRACK, SLIGHTLY_BEHIND};
use crate::models::{Goal, WorkoutRecord};

/// A value measured over the current quarter and the current year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPair<T> {
    pub quarter_to_date: T,
    pub year_to_date: T,
}

impl<T: Copy> PeriodPair<T> {
    pub fn get(&self, period: Period) -> T {
        match period {
            Period::Quarter => self.quarter_to_date,
            Period::Year => self.year_to_date,
        }
    }
}

/// Calendar dates delimiting a reporting period, both inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl PeriodBounds {
    /// Quarter containing `now`
    pub fn quarter(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let first_month = (quarter_of(now) - 1) * MONTHS_PER_QUARTER + 1;
        let start = NaiveDate::from_ymd_opt(today.year(), first_month, 1).unwrap_or(today);
        let end = start
            .checked_add_months(Months::new(MONTHS_PER_QUARTER))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX);

        Self { start, end }
    }

    /// Calendar year containing `now`
    pub fn year(now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
        let end = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(NaiveDate::MAX);

        Self { start, end }
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        let day = date.date_naive();
        self.start <= day && day <= self.end
    }

    /// Fraction of the period elapsed at `now`, from continuous time and capped at 1
    pub fn elapsed_fraction(&self, now: DateTime<Utc>) -> f64 {
        let start = self.start.and_time(chrono::NaiveTime::MIN).and_utc();
        let Some(end) = self
            .end
            .succ_opt()
            .map(|day| day.and_time(chrono::NaiveTime::MIN).and_utc())
        else {
            return 0.0;
        };

        let total_seconds = (end - start).num_seconds() as f64;
        if total_seconds <= 0.0 {
            return 0.0;
        }
        let elapsed_seconds = (now - start).num_milliseconds() as f64 / 1000.0;

        (elapsed_seconds / total_seconds).clamp(0.0, 1.0)
    }
}

/// Quarter number (1-4) of `now`
pub fn quarter_of(now: DateTime<Utc>) -> u32 {
    (now.month() - 1) / MONTHS_PER_QUARTER + 1
}

/// Qualitative comparison of an actual value against its expected value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProgressStatus {
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Slightly Behind")]
    SlightlyBehind,
    Behind,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressStatus::OnTrack => ON_TRACK,
            ProgressStatus::SlightlyBehind => SLIGHTLY_BEHIND,
            ProgressStatus::Behind => BEHIND,
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Classify `actual` against `expected`
pub fn progress_status(actual: f64, expected: f64) -> ProgressStatus {
    if actual >= expected {
        ProgressStatus::OnTrack
    } else if actual >= expected * SLIGHTLY_BEHIND_RATIO {
        ProgressStatus::SlightlyBehind
    } else {
        ProgressStatus::Behind
    }
}

/// Actual versus expected progress towards a goal, for the quarter and year containing "now"
///
/// Expected minutes and sessions are whole numbers (truncated); expected weight is not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub current_quarter: u32,
    pub current_year: i32,
    pub actual_weight_lifted: PeriodPair<f64>,
    pub actual_minutes: PeriodPair<i64>,
    pub actual_sessions: PeriodPair<i64>,
    pub expected_weight_lifted: PeriodPair<f64>,
    pub expected_minutes: PeriodPair<i64>,
    pub expected_sessions: PeriodPair<i64>,
    pub sessions_needed_for_quarter: i64,
    pub sessions_needed_for_year: i64,
    pub days_remaining_in_quarter: i64,
}

impl GoalProgress {
    pub fn actual(&self, metric: ProgressMetric, period: Period) -> f64 {
        match metric {
            ProgressMetric::Weight => self.actual_weight_lifted.get(period),
            ProgressMetric::Minutes => self.actual_minutes.get(period) as f64,
            ProgressMetric::Sessions => self.actual_sessions.get(period) as f64,
        }
    }

    pub fn expected(&self, metric: ProgressMetric, period: Period) -> f64 {
        match metric {
            ProgressMetric::Weight => self.expected_weight_lifted.get(period),
            ProgressMetric::Minutes => self.expected_minutes.get(period) as f64,
            ProgressMetric::Sessions => self.expected_sessions.get(period) as f64,
        }
    }

    pub fn status(&self, metric: ProgressMetric, period: Period) -> ProgressStatus {
        progress_status(self.actual(metric, period), self.expected(metric, period))
    }

    pub fn sessions_needed(&self, period: Period) -> i64 {
        match period {
            Period::Quarter => self.sessions_needed_for_quarter,
            Period::Year => self.sessions_needed_for_year,
        }
    }
}

/// Totals over one subset of workouts
#[derive(Debug, Default, Clone, Copy)]
struct PeriodTotals {
    weight: f64,
    minutes: i64,
    sessions: i64,
}

impl PeriodTotals {
    fn add(mut self, record: &WorkoutRecord) -> Self {
        self.weight += record.weight().unwrap_or(0.0);
        self.minutes = self.minutes.saturating_add(record.whole_minutes());
        self.sessions += 1;
        self
    }
}

/// Compute progress of `goal` from `workouts` as of `now`
///
/// Pure: the result depends only on the arguments.
pub fn compute_progress(goal: &Goal, workouts: &[WorkoutRecord], now: DateTime<Utc>) -> GoalProgress {
    let quarter = PeriodBounds::quarter(now);
    let year = PeriodBounds::year(now);

    let quarter_totals = workouts
        .iter()
        .filter(|w| quarter.contains(w.date()))
        .fold(PeriodTotals::default(), PeriodTotals::add);
    let year_totals = workouts
        .iter()
        .filter(|w| year.contains(w.date()))
        .fold(PeriodTotals::default(), PeriodTotals::add);

    let quarter_progress = quarter.elapsed_fraction(now);
    let year_progress = year.elapsed_fraction(now);

    let expected_whole = |target: i64, fraction: f64| (target as f64 * fraction).trunc() as i64;

    let sessions_needed_for_quarter = sessions_needed(
        goal.quarterly_minutes_target(),
        quarter_totals.minutes,
        goal.minutes_per_session(),
    );
    let sessions_needed_for_year = sessions_needed(
        goal.annual_minutes_target(),
        year_totals.minutes,
        goal.minutes_per_session(),
    );

    let days_remaining_in_quarter = (quarter.end - now.date_naive()).num_days().max(0);

    debug!(
        goal.id = %goal.id(),
        quarter.progress = quarter_progress,
        year.progress = year_progress,
        quarter.sessions = quarter_totals.sessions,
        year.sessions = year_totals.sessions,
        "Computed goal progress"
    );

    GoalProgress {
        current_quarter: quarter_of(now),
        current_year: now.year(),
        actual_weight_lifted: PeriodPair {
            quarter_to_date: quarter_totals.weight,
            year_to_date: year_totals.weight,
        },
        actual_minutes: PeriodPair {
            quarter_to_date: quarter_totals.minutes,
            year_to_date: year_totals.minutes,
        },
        actual_sessions: PeriodPair {
            quarter_to_date: quarter_totals.sessions,
            year_to_date: year_totals.sessions,
        },
        expected_weight_lifted: PeriodPair {
            quarter_to_date: goal.quarterly_weight_target() * quarter_progress,
            year_to_date: goal.annual_weight_target() * year_progress,
        },
        expected_minutes: PeriodPair {
            quarter_to_date: expected_whole(goal.quarterly_minutes_target(), quarter_progress),
            year_to_date: expected_whole(goal.annual_minutes_target(), year_progress),
        },
        expected_sessions: PeriodPair {
            quarter_to_date: expected_whole(goal.quarterly_sessions_target(), quarter_progress),
            year_to_date: expected_whole(goal.annual_sessions_target(), year_progress),
        },
        sessions_needed_for_quarter,
        sessions_needed_for_year,
        days_remaining_in_quarter,
    }
}

/// Whole sessions of `minutes_per_session` still needed to reach `target_minutes`
fn sessions_needed(target_minutes: i64, actual_minutes: i64, minutes_per_session: i64) -> i64 {
    if minutes_per_session <= 0 {
        return 0;
    }
    let remaining = target_minutes.saturating_sub(actual_minutes).max(0);
    let whole = remaining / minutes_per_session;
    if remaining % minutes_per_session == 0 {
        whole
    } else {
        whole + 1
    }
}
