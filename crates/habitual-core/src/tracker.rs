//! Habit tracker service.
//!
//! Owns an injected [`HabitStore`] and runs the check-in flow:
//! read the habit, evaluate it with the streak engine, persist the outcome.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, ValidationError};
use crate::habit::{normalize_name, CheckEvent, Habit, HabitId, Periodicity};
use crate::storage::HabitStore;
use crate::streak::{replay, CheckInOutcome, StreakState, StreakStatus};

/// What happened on a check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInReport {
    /// Habit as stored after the check-in.
    pub habit: Habit,
    pub outcome: CheckInOutcome,
    /// Status the habit had just before the check-in.
    pub status_before: StreakStatus,
}

impl CheckInReport {
    /// True when the check-in reset a previously running streak.
    pub fn broke_streak(&self) -> bool {
        self.outcome.applied && self.status_before == StreakStatus::Lapsed
    }
}

/// Stored streak fields compared against a replay of the check-in log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    pub habit_id: HabitId,
    pub stored: StreakState,
    pub replayed: StreakState,
    pub events: usize,
    pub consistent: bool,
}

/// Counts per periodicity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodicityBreakdown {
    pub daily: usize,
    pub weekly: usize,
}

/// Best streak holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakLeader {
    pub habit_id: HabitId,
    pub name: String,
    pub longest_streak: u32,
}

/// Overview of all habits relative to a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub date: NaiveDate,
    pub total: usize,
    pub by_periodicity: PeriodicityBreakdown,
    pub active: usize,
    pub lapsed: usize,
    pub never_checked: usize,
    pub longest: Option<StreakLeader>,
}

/// Habit tracker over any store.
pub struct Tracker<S> {
    store: S,
}

impl<S: HabitStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a habit.
    ///
    /// # Errors
    /// Fails on a blank name or an unknown periodicity.
    pub fn add_habit(&self, name: &str, periodicity: &str) -> Result<Habit> {
        let name = normalize_name(name)?;
        let periodicity: Periodicity = periodicity.parse()?;
        let id = self.store.create(&name, periodicity)?;
        info!(%id, name = %name, %periodicity, "habit created");
        Ok(self.store.get(id)?)
    }

    pub fn habit(&self, id: HabitId) -> Result<Habit> {
        Ok(self.store.get(id)?)
    }

    pub fn habits(&self) -> Result<Vec<Habit>> {
        Ok(self.store.list()?)
    }

    pub fn habits_by_periodicity(&self, periodicity: Periodicity) -> Result<Vec<Habit>> {
        Ok(self.store.list_by_periodicity(periodicity)?)
    }

    pub fn delete_habit(&self, id: HabitId) -> Result<()> {
        self.store.delete(id)?;
        info!(%id, "habit deleted");
        Ok(())
    }

    /// Check a habit in on `today`.
    ///
    /// A second check-in on the same day is reported with
    /// `outcome.applied == false` and writes nothing.
    ///
    /// # Errors
    /// `NotFound` for an unknown id; `CheckInBeforeLast` when `today` is
    /// earlier than the last recorded check-in.
    pub fn check_in(&self, id: HabitId, today: NaiveDate) -> Result<CheckInReport> {
        let habit = self.store.get(id)?;
        if let Some(last) = habit.last_checked {
            if today < last {
                return Err(ValidationError::CheckInBeforeLast { last, today }.into());
            }
        }

        let state = habit.streak_state();
        let status_before = state.status(habit.periodicity, today);
        let outcome = state.check_in(habit.periodicity, today);

        if !outcome.applied {
            debug!(%id, %today, "duplicate check-in ignored");
            return Ok(CheckInReport {
                habit,
                outcome,
                status_before,
            });
        }

        self.store.apply_check_in(id, &outcome)?;
        info!(
            %id,
            %today,
            streak = outcome.streak,
            longest = outcome.longest_streak,
            reset = status_before == StreakStatus::Lapsed,
            "check-in applied"
        );

        Ok(CheckInReport {
            habit: self.store.get(id)?,
            outcome,
            status_before,
        })
    }

    /// Check-in log of a habit, oldest first. Works for deleted habits.
    pub fn history(&self, id: HabitId) -> Result<Vec<CheckEvent>> {
        Ok(self.store.check_events(id)?)
    }

    /// Replay the check-in log and compare with the stored fields.
    pub fn verify(&self, id: HabitId) -> Result<Verification> {
        let habit = self.store.get(id)?;
        let events = self.store.check_events(id)?;
        let replayed = replay(habit.periodicity, events.iter().map(|event| event.date));
        let stored = habit.streak_state();
        let consistent = stored == replayed;
        if !consistent {
            warn!(%id, ?stored, ?replayed, "stored streak disagrees with check-in log");
        }
        Ok(Verification {
            habit_id: id,
            stored,
            replayed,
            events: events.len(),
            consistent,
        })
    }

    /// Aggregate view of every habit as of `today`.
    pub fn summary(&self, today: NaiveDate) -> Result<Summary> {
        let habits = self.store.list()?;
        let mut summary = Summary {
            date: today,
            total: habits.len(),
            by_periodicity: PeriodicityBreakdown::default(),
            active: 0,
            lapsed: 0,
            never_checked: 0,
            longest: None,
        };

        for habit in &habits {
            match habit.periodicity {
                Periodicity::Daily => summary.by_periodicity.daily += 1,
                Periodicity::Weekly => summary.by_periodicity.weekly += 1,
            }
            match habit.streak_state().status(habit.periodicity, today) {
                StreakStatus::NeverChecked => summary.never_checked += 1,
                StreakStatus::Active => summary.active += 1,
                StreakStatus::Lapsed => summary.lapsed += 1,
            }
        }

        // Ties go to the oldest habit.
        summary.longest = habits
            .iter()
            .filter(|habit| habit.longest_streak > 0)
            .fold(None::<&Habit>, |best, habit| match best {
                Some(b) if b.longest_streak >= habit.longest_streak => Some(b),
                _ => Some(habit),
            })
            .map(|habit| StreakLeader {
                habit_id: habit.id,
                name: habit.name.clone(),
                longest_streak: habit.longest_streak,
            });

        Ok(summary)
    }
}
