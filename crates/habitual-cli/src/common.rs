//! Helpers shared by the CLI commands.

use chrono::{Local, NaiveDate};
use habitual_core::{Config, Habit, HabitDb, Tracker};

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Open the tracker on the configured database.
pub fn open_tracker(config: &Config) -> Result<Tracker<HabitDb>, Box<dyn std::error::Error>> {
    Ok(Tracker::new(HabitDb::open(config)?))
}

/// Local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse `--date YYYY-MM-DD`, defaulting to today.
pub fn date_or_today(date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{raw}' (expected YYYY-MM-DD): {e}").into()),
        None => Ok(today()),
    }
}

/// One-line human readable rendering of a habit.
pub fn format_habit(habit: &Habit, config: &Config) -> String {
    let last = habit
        .last_checked
        .map(|date| config.format_date(date))
        .unwrap_or_else(|| "never".to_string());
    format!(
        "[{}] {} ({}) streak={} longest={} last={}",
        habit.id, habit.name, habit.periodicity, habit.streak, habit.longest_streak, last
    )
}
