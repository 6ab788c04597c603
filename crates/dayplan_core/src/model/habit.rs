//! Habit record and the per-day status derivation.
//!
//! # Invariants
//! - `progress[i]` records completion of calendar day `start_date + i`.
//! - `progress.len() == duration_days`.
//! - `day_status` is a pure function of the habit and the supplied day.

use super::validation::{required, ValidationError, MAX_HABIT_DAYS, MIN_HABIT_DAYS};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type HabitId = i64;

/// Color used when a stored habit predates the color field.
pub const DEFAULT_HABIT_COLOR: &str = "#4b6cb7";

/// Derived state of one day cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// The day is still in the future and cannot be toggled.
    Pending,
    /// The day is reachable and marked done.
    Completed,
    /// The day is reachable and not marked done.
    Missed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    #[serde(alias = "duration")]
    pub duration_days: u32,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub progress: Vec<bool>,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_HABIT_COLOR.to_string()
}

impl Habit {
    /// Builds a habit with an all-false progress window starting at `start_date`.
    pub fn new(
        id: HabitId,
        name: impl Into<String>,
        duration_days: u32,
        start_date: DateTime<Utc>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            duration_days,
            start_date,
            progress: vec![false; duration_days as usize],
            color: color.into(),
        }
    }

    /// Replaces name and duration and starts progress over.
    pub fn reset(&mut self, name: String, duration_days: u32) {
        self.name = name;
        self.duration_days = duration_days;
        self.progress = vec![false; duration_days as usize];
    }

    /// Calendar day the habit starts on.
    pub fn start_day(&self) -> NaiveDate {
        self.start_date.date_naive()
    }

    /// Calendar day of cell `index`, `None` on date overflow.
    pub fn day_date(&self, index: usize) -> Option<NaiveDate> {
        self.start_day().checked_add_days(Days::new(index as u64))
    }

    /// Whether cell `index` is still ahead of `today`.
    pub fn is_future(&self, index: usize, today: NaiveDate) -> bool {
        self.day_date(index).map_or(true, |day| day > today)
    }

    /// `Pending` when the day lies after `today`, otherwise the recorded
    /// completion. Indices past the window count as not completed.
    pub fn day_status(&self, index: usize, today: NaiveDate) -> DayStatus {
        if self.is_future(index, today) {
            return DayStatus::Pending;
        }
        if self.progress.get(index).copied().unwrap_or(false) {
            DayStatus::Completed
        } else {
            DayStatus::Missed
        }
    }

    /// One status per day of the window.
    pub fn day_statuses(&self, today: NaiveDate) -> Vec<DayStatus> {
        (0..self.progress.len())
            .map(|index| self.day_status(index, today))
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.progress.iter().filter(|done| **done).count()
    }

    /// Whether `duration_days` lies in `MIN_HABIT_DAYS..=MAX_HABIT_DAYS`.
    pub fn has_valid_duration(&self) -> bool {
        (MIN_HABIT_DAYS..=MAX_HABIT_DAYS).contains(&self.duration_days)
    }

    /// Restores `progress.len() == duration_days` on records loaded from storage.
    ///
    /// Returns `true` when the record had to be repaired.
    pub fn normalize(&mut self) -> bool {
        let expected = self.duration_days as usize;
        if self.progress.len() == expected {
            return false;
        }
        self.progress.resize(expected, false);
        true
    }
}

/// Validated habit form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitInput {
    pub name: String,
    pub duration_days: u32,
}

impl HabitInput {
    /// Trims the name and checks the duration bounds.
    pub fn parse(name: &str, duration_days: u32) -> Result<Self, ValidationError> {
        let name = required("habit name", name)?;
        if !(MIN_HABIT_DAYS..=MAX_HABIT_DAYS).contains(&duration_days) {
            return Err(ValidationError::DurationOutOfRange(duration_days));
        }
        Ok(Self {
            name,
            duration_days,
        })
    }
}
