//! Habit use-case service.
//!
//! # Responsibility
//! - Own the habit collection and its edit state for one session.
//! - Apply the day-toggle policy and derive per-day status.
//!
//! # Invariants
//! - `progress.len() == duration_days` after every operation.
//! - Every loaded habit has a duration in `1..=365`.
//! - Days after today are locked: toggling them is a no-op.
//! - Editing a habit discards its progress.

use crate::clock::{next_id, Clock};
use crate::model::habit::{DayStatus, Habit, HabitId, HabitInput, DEFAULT_HABIT_COLOR};
use crate::service::ServiceResult;
use crate::store::{keys, KvStore};
use chrono::NaiveDate;
use log::{info, warn};

/// Default duration offered by the habit form.
pub const DEFAULT_HABIT_DAYS: u32 = 21;

/// Result of a day toggle request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The cell flipped; `completed` is its new value.
    Toggled { completed: bool },
    /// The day is still in the future.
    Locked,
    /// `day_index` is outside the habit window.
    OutOfRange,
    /// No habit has that id.
    NotFound,
}

pub struct HabitTracker<S: KvStore, C: Clock> {
    store: S,
    clock: C,
    habits: Vec<Habit>,
    editing: Option<HabitId>,
}

impl<S: KvStore, C: Clock> HabitTracker<S, C> {
    /// Loads the `habits` document. Records with a duration outside
    /// `1..=365` are dropped; records whose progress window disagrees with
    /// their duration are repaired.
    pub fn open(store: S, clock: C) -> Self {
        let mut habits: Vec<Habit> = store.load_or(keys::HABITS, Vec::new());
        let loaded = habits.len();
        habits.retain(Habit::has_valid_duration);
        if habits.len() < loaded {
            warn!(
                "event=habit_load module=habit status=dropped dropped={} error_code=duration_out_of_range",
                loaded - habits.len()
            );
        }
        let repaired = habits
            .iter_mut()
            .map(Habit::normalize)
            .filter(|changed| *changed)
            .count();
        if repaired > 0 {
            warn!(
                "event=habit_load module=habit status=repaired repaired={} count={}",
                repaired,
                habits.len()
            );
        }
        info!("event=habit_load module=habit status=ok count={}", habits.len());

        Self {
            store,
            clock,
            habits,
            editing: None,
        }
    }

    pub fn list(&self) -> &[Habit] {
        &self.habits
    }

    pub fn get(&self, id: HabitId) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Creates a habit starting now with an all-false progress window.
    ///
    /// # Errors
    /// - `Validation` for a blank name or a duration outside `1..=365`.
    pub fn create(&mut self, name: &str, duration_days: u32, color: &str) -> ServiceResult<Habit> {
        let input = HabitInput::parse(name, duration_days)?;
        let now = self.clock.now();
        let id = next_id(now, self.habits.iter().map(|habit| habit.id));
        let habit = Habit::new(
            id,
            input.name,
            input.duration_days,
            now,
            color_or_default(color),
        );

        self.habits.push(habit.clone());
        self.persist()?;
        info!(
            "event=habit_create module=habit status=ok id={} duration_days={}",
            id, habit.duration_days
        );
        Ok(habit)
    }

    /// Replaces name and duration and resets progress to all-false.
    ///
    /// Returns `Ok(None)` when no habit has `id`.
    pub fn update(
        &mut self,
        id: HabitId,
        name: &str,
        duration_days: u32,
    ) -> ServiceResult<Option<Habit>> {
        let input = HabitInput::parse(name, duration_days)?;
        let Some(habit) = self.habits.iter_mut().find(|habit| habit.id == id) else {
            return Ok(None);
        };
        habit.reset(input.name, input.duration_days);
        let updated = habit.clone();

        self.persist()?;
        info!(
            "event=habit_update module=habit status=ok id={} duration_days={}",
            id, updated.duration_days
        );
        Ok(Some(updated))
    }

    /// Flips one day cell unless it is locked, out of range or unknown.
    pub fn toggle_day(&mut self, id: HabitId, day_index: usize) -> ServiceResult<ToggleOutcome> {
        let today = self.clock.today();
        let Some(habit) = self.habits.iter_mut().find(|habit| habit.id == id) else {
            return Ok(ToggleOutcome::NotFound);
        };
        if day_index >= habit.progress.len() {
            return Ok(ToggleOutcome::OutOfRange);
        }
        if habit.is_future(day_index, today) {
            return Ok(ToggleOutcome::Locked);
        }

        let completed = !habit.progress[day_index];
        habit.progress[day_index] = completed;
        self.persist()?;
        info!(
            "event=habit_toggle module=habit status=ok id={} day_index={} completed={}",
            id, day_index, completed
        );
        Ok(ToggleOutcome::Toggled { completed })
    }

    /// Removes a habit and clears edit state pointing at it.
    ///
    /// Returns `Ok(false)` when no habit has `id`.
    pub fn delete(&mut self, id: HabitId) -> ServiceResult<bool> {
        let before = self.habits.len();
        self.habits.retain(|habit| habit.id != id);
        if self.habits.len() == before {
            return Ok(false);
        }
        if self.editing == Some(id) {
            self.editing = None;
        }

        self.persist()?;
        info!("event=habit_delete module=habit status=ok id={}", id);
        Ok(true)
    }

    /// Status of one day cell relative to the clock's today.
    pub fn day_status(&self, habit: &Habit, index: usize) -> DayStatus {
        habit.day_status(index, self.clock.today())
    }

    /// Marks a habit as being edited and returns it for form prefill.
    pub fn begin_edit(&mut self, id: HabitId) -> Option<&Habit> {
        let index = self.habits.iter().position(|habit| habit.id == id)?;
        self.editing = Some(id);
        self.habits.get(index)
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub fn editing(&self) -> Option<HabitId> {
        self.editing
    }

    /// Form submission: updates the habit under edit, or creates a new one.
    ///
    /// Edit state is cleared after a successful update. `color` only applies
    /// to new habits. Returns `Ok(None)` when the edited habit vanished.
    pub fn submit(
        &mut self,
        name: &str,
        duration_days: u32,
        color: &str,
    ) -> ServiceResult<Option<Habit>> {
        match self.editing {
            Some(id) => {
                let updated = self.update(id, name, duration_days)?;
                self.editing = None;
                Ok(updated)
            }
            None => self.create(name, duration_days, color).map(Some),
        }
    }

    fn persist(&self) -> ServiceResult<()> {
        self.store.save(keys::HABITS, &self.habits)?;
        Ok(())
    }
}

fn color_or_default(color: &str) -> String {
    let trimmed = color.trim();
    if trimmed.is_empty() {
        DEFAULT_HABIT_COLOR.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{HabitTracker, ToggleOutcome};
    use crate::clock::FixedClock;
    use crate::model::habit::DayStatus;
    use crate::store::{keys, KvStore, MemoryKvStore};
    use chrono::NaiveDate;

    fn day0() -> FixedClock {
        FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    }

    #[test]
    fn invalid_input_leaves_collection_untouched() {
        let store = MemoryKvStore::new();
        let mut tracker = HabitTracker::open(&store, day0());

        assert!(tracker.create("  ", 21, "").unwrap_err().is_validation());
        assert!(tracker.create("Read", 0, "").is_err());
        assert!(tracker.create("Read", 366, "").is_err());
        assert!(tracker.list().is_empty());
        assert!(store.get_raw(keys::HABITS).unwrap().is_none());
    }

    #[test]
    fn toggle_rejects_future_and_out_of_range_days() {
        let store = MemoryKvStore::new();
        let mut tracker = HabitTracker::open(&store, day0());
        let habit = tracker.create("Read", 3, "#123456").unwrap();

        assert_eq!(tracker.toggle_day(habit.id, 1).unwrap(), ToggleOutcome::Locked);
        assert_eq!(tracker.toggle_day(habit.id, 3).unwrap(), ToggleOutcome::OutOfRange);
        assert_eq!(tracker.toggle_day(habit.id + 1, 0).unwrap(), ToggleOutcome::NotFound);
        assert_eq!(
            tracker.toggle_day(habit.id, 0).unwrap(),
            ToggleOutcome::Toggled { completed: true }
        );
        assert_eq!(tracker.get(habit.id).unwrap().progress, vec![true, false, false]);
    }

    #[test]
    fn deleting_edited_habit_clears_edit_state() {
        let store = MemoryKvStore::new();
        let mut tracker = HabitTracker::open(&store, day0());
        let habit = tracker.create("Read", 3, "").unwrap();

        assert!(tracker.begin_edit(habit.id).is_some());
        assert_eq!(tracker.editing(), Some(habit.id));
        assert!(tracker.delete(habit.id).unwrap());
        assert_eq!(tracker.editing(), None);
        assert!(!tracker.delete(habit.id).unwrap());
    }

    #[test]
    fn submit_updates_habit_under_edit_then_creates() {
        let store = MemoryKvStore::new();
        let mut tracker = HabitTracker::open(&store, day0());
        let habit = tracker.create("Read", 3, "#aa0000").unwrap();
        tracker.toggle_day(habit.id, 0).unwrap();

        tracker.begin_edit(habit.id);
        let updated = tracker.submit("Read more", 5, "#ignored").unwrap().unwrap();
        assert_eq!(updated.id, habit.id);
        assert_eq!(updated.progress, vec![false; 5]);
        assert_eq!(updated.color, "#aa0000");
        assert_eq!(tracker.editing(), None);

        let created = tracker.submit("Walk", 10, "").unwrap().unwrap();
        assert_ne!(created.id, habit.id);
        assert_eq!(tracker.list().len(), 2);
    }

    #[test]
    fn day_status_follows_the_clock() {
        let store = MemoryKvStore::new();
        let mut clock = day0();
        let id = {
            let mut tracker = HabitTracker::open(&store, clock);
            tracker.create("Read", 4, "").unwrap().id
        };

        clock.advance_days(2);
        let mut tracker = HabitTracker::open(&store, clock);
        assert_eq!(
            tracker.toggle_day(id, 2).unwrap(),
            ToggleOutcome::Toggled { completed: true }
        );
        let habit = tracker.get(id).unwrap().clone();
        assert_eq!(tracker.day_status(&habit, 0), DayStatus::Missed);
        assert_eq!(tracker.day_status(&habit, 2), DayStatus::Completed);
        assert_eq!(tracker.day_status(&habit, 3), DayStatus::Pending);
    }
}
