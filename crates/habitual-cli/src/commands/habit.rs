//! Habit management commands for CLI.

use clap::Subcommand;
use habitual_core::{Config, HabitId, Periodicity};

use crate::common::{date_or_today, format_habit, open_tracker, CliResult};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Create a new habit
    Add {
        /// Habit name
        name: String,
        /// daily or weekly (default: habits.default_periodicity)
        #[arg(long, short)]
        periodicity: Option<String>,
    },
    /// List habits
    List {
        /// Only habits with this periodicity
        #[arg(long, short)]
        periodicity: Option<String>,
        /// Print JSON instead of one line per habit
        #[arg(long)]
        json: bool,
    },
    /// Show one habit as JSON
    Get {
        /// Habit ID
        id: HabitId,
    },
    /// Delete a habit (its check-in log is kept)
    Delete {
        /// Habit ID
        id: HabitId,
    },
    /// Check a habit in
    Check {
        /// Habit ID
        id: HabitId,
        /// Check-in date (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show the check-in log of a habit
    History {
        /// Habit ID
        id: HabitId,
    },
    /// Replay the check-in log and compare with the stored streak
    Verify {
        /// Habit ID
        id: HabitId,
    },
}

pub fn run(action: HabitAction) -> CliResult {
    let config = Config::load()?;
    let tracker = open_tracker(&config)?;

    match action {
        HabitAction::Add { name, periodicity } => {
            let periodicity = periodicity
                .unwrap_or_else(|| config.habits.default_periodicity.to_string());
            let habit = tracker.add_habit(&name, &periodicity)?;
            println!("Habit created: {}", habit.id);
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::List { periodicity, json } => {
            let habits = match periodicity {
                Some(p) => tracker.habits_by_periodicity(p.parse::<Periodicity>()?)?,
                None => tracker.habits()?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&habits)?);
            } else if habits.is_empty() {
                println!("No habits.");
            } else {
                for habit in &habits {
                    println!("{}", format_habit(habit, &config));
                }
            }
        }
        HabitAction::Get { id } => {
            let habit = tracker.habit(id)?;
            println!("{}", serde_json::to_string_pretty(&habit)?);
        }
        HabitAction::Delete { id } => {
            tracker.delete_habit(id)?;
            println!("Habit deleted: {id}");
        }
        HabitAction::Check { id, date } => {
            let today = date_or_today(date.as_deref())?;
            let report = tracker.check_in(id, today)?;
            let habit = &report.habit;
            if !report.outcome.applied {
                println!(
                    "Already checked in on {}. Streak: {} (longest {})",
                    config.format_date(today),
                    habit.streak,
                    habit.longest_streak
                );
            } else if report.broke_streak() {
                println!(
                    "Streak broken, starting over. Streak: {} (longest {})",
                    habit.streak, habit.longest_streak
                );
            } else {
                println!(
                    "Checked in. Streak: {} (longest {})",
                    habit.streak, habit.longest_streak
                );
            }
        }
        HabitAction::History { id } => {
            let events = tracker.history(id)?;
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        HabitAction::Verify { id } => {
            let verification = tracker.verify(id)?;
            println!("{}", serde_json::to_string_pretty(&verification)?);
            if !verification.consistent {
                return Err(format!("habit {id}: stored streak does not match its check-in log").into());
            }
        }
    }
    Ok(())
}
