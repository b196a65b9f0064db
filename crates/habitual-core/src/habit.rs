//! Habit domain model.
//!
//! A `Habit` carries its streak fields inline; `CheckEvent` is the
//! append-only audit record written on every applied check-in.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::streak::StreakState;

/// Identifier assigned by the store at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(pub i64);

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for HabitId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(HabitId)
            .map_err(|_| ValidationError::InvalidValue {
                field: "habit_id".into(),
                message: format!("'{s}' is not a valid habit id"),
            })
    }
}

/// Required check-in cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    Daily,
    Weekly,
}

impl Periodicity {
    pub const ALL: [Periodicity; 2] = [Periodicity::Daily, Periodicity::Weekly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Periodicity::Daily => "daily",
            Periodicity::Weekly => "weekly",
        }
    }

    /// Largest gap between two check-ins that keeps a streak alive.
    pub fn tolerance(&self) -> Duration {
        match self {
            Periodicity::Daily => Duration::days(1),
            Periodicity::Weekly => Duration::days(7),
        }
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Periodicity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Periodicity::Daily),
            "weekly" => Ok(Periodicity::Weekly),
            _ => Err(ValidationError::InvalidPeriodicity(s.to_string())),
        }
    }
}

/// One tracked recurring activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub periodicity: Periodicity,
    pub streak: u32,
    pub longest_streak: u32,
    pub last_checked: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// A freshly created habit: no check-ins, zero streaks.
    pub fn new(id: HabitId, name: String, periodicity: Periodicity, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            periodicity,
            streak: 0,
            longest_streak: 0,
            last_checked: None,
            created_at,
        }
    }

    /// The four scalar fields the streak engine works on.
    pub fn streak_state(&self) -> StreakState {
        StreakState {
            streak: self.streak,
            longest_streak: self.longest_streak,
            last_checked: self.last_checked,
        }
    }
}

/// Trim a habit name and reject blanks.
pub fn normalize_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Immutable record of one applied check-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckEvent {
    pub id: i64,
    pub habit_id: HabitId,
    pub date: NaiveDate,
}
