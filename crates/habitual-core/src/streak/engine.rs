//! Streak engine implementation.
//!
//! The engine is a pure function of a habit's streak fields and the date of
//! the incoming check-in. It never reads the clock: the caller supplies
//! `today`.
//!
//! ## State Transitions
//!
//! ```text
//! NeverChecked -> Active <-> Lapsed
//! ```
//!
//! `Lapsed` is never stored. It is observed lazily when the gap between
//! `last_checked` and `today` exceeds the periodicity's tolerance, and the
//! reset only happens inside the next check-in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::habit::Periodicity;

/// Logical state of a habit relative to a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakStatus {
    NeverChecked,
    /// Last check-in is within the tolerated window.
    Active,
    /// The next check-in would reset the streak.
    Lapsed,
}

/// Streak fields of a habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakState {
    pub streak: u32,
    pub longest_streak: u32,
    pub last_checked: Option<NaiveDate>,
}

/// Result of evaluating one check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInOutcome {
    pub streak: u32,
    pub longest_streak: u32,
    pub last_checked: Option<NaiveDate>,
    /// `false` for a same-day duplicate; the fields then equal the inputs.
    pub applied: bool,
}

impl CheckInOutcome {
    pub fn state(&self) -> StreakState {
        StreakState {
            streak: self.streak,
            longest_streak: self.longest_streak,
            last_checked: self.last_checked,
        }
    }
}

impl StreakState {
    /// State of a habit that was never checked.
    pub const fn initial() -> Self {
        Self {
            streak: 0,
            longest_streak: 0,
            last_checked: None,
        }
    }

    /// Whether a check-in on `today` would reset the streak.
    ///
    /// Strict comparison: a gap of exactly one period keeps the streak.
    pub fn is_broken(&self, periodicity: Periodicity, today: NaiveDate) -> bool {
        let Some(last) = self.last_checked else {
            return false;
        };
        match today.checked_sub_signed(periodicity.tolerance()) {
            Some(threshold) => last < threshold,
            None => false,
        }
    }

    pub fn status(&self, periodicity: Periodicity, today: NaiveDate) -> StreakStatus {
        if self.last_checked.is_none() {
            StreakStatus::NeverChecked
        } else if self.is_broken(periodicity, today) {
            StreakStatus::Lapsed
        } else {
            StreakStatus::Active
        }
    }

    /// Apply a check-in on `today`.
    pub fn check_in(&self, periodicity: Periodicity, today: NaiveDate) -> CheckInOutcome {
        if self.last_checked == Some(today) {
            return CheckInOutcome {
                streak: self.streak,
                longest_streak: self.longest_streak,
                last_checked: self.last_checked,
                applied: false,
            };
        }

        let carried = if self.is_broken(periodicity, today) {
            0
        } else {
            self.streak
        };
        let streak = carried.saturating_add(1);

        CheckInOutcome {
            streak,
            longest_streak: streak.max(self.longest_streak),
            last_checked: Some(today),
            applied: true,
        }
    }
}

/// Evaluate a check-in from raw inputs.
///
/// # Errors
/// Returns `InvalidPeriodicity` when `periodicity` is neither `daily` nor
/// `weekly`. No other input is examined in that case.
pub fn evaluate_check_in(
    periodicity: &str,
    last_checked: Option<NaiveDate>,
    streak: u32,
    longest_streak: u32,
    today: NaiveDate,
) -> Result<CheckInOutcome, ValidationError> {
    let periodicity: Periodicity = periodicity.parse()?;
    let state = StreakState {
        streak,
        longest_streak,
        last_checked,
    };
    Ok(state.check_in(periodicity, today))
}

/// Rebuild streak fields by folding check-in dates through the engine.
pub fn replay<I>(periodicity: Periodicity, dates: I) -> StreakState
where
    I: IntoIterator<Item = NaiveDate>,
{
    dates
        .into_iter()
        .fold(StreakState::initial(), |state, date| {
            state.check_in(periodicity, date).state()
        })
}
