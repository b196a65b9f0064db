//! Interactive numbered menu.
//!
//! Reads choices line by line until `6` or end of input. Failures of a single
//! action are printed and the menu continues.

use std::io::{self, BufRead, Write};

use chrono::NaiveDate;
use habitual_core::{Config, HabitId, HabitStore, Periodicity, Tracker};

use crate::common::{format_habit, open_tracker, today, CliResult};

const MENU: &str = "\n1. Display habits\n2. Add habit\n3. Edit habit\n4. Display daily habits\n5. Display weekly habits\n6. Exit";

pub fn run() -> CliResult {
    let config = Config::load()?;
    let tracker = open_tracker(&config)?;
    let menu = Menu::new(&tracker, &config, today);

    let stdin = io::stdin();
    let stdout = io::stdout();
    menu.run(stdin.lock(), stdout.lock())?;
    Ok(())
}

pub struct Menu<'a, S, F> {
    tracker: &'a Tracker<S>,
    config: &'a Config,
    today: F,
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> io::Result<Option<String>> {
    write!(out, "{message}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

impl<'a, S, F> Menu<'a, S, F>
where
    S: HabitStore,
    F: Fn() -> NaiveDate,
{
    pub fn new(tracker: &'a Tracker<S>, config: &'a Config, today: F) -> Self {
        Self {
            tracker,
            config,
            today,
        }
    }

    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut out: W) -> io::Result<()> {
        loop {
            writeln!(out, "{MENU}")?;
            let Some(choice) = prompt(&mut input, &mut out, "Enter your choice: ")? else {
                break;
            };
            match choice.parse::<u32>() {
                Ok(1) => self.display(&mut out, None)?,
                Ok(2) => self.add(&mut input, &mut out)?,
                Ok(3) => self.edit(&mut input, &mut out)?,
                Ok(4) => self.display(&mut out, Some(Periodicity::Daily))?,
                Ok(5) => self.display(&mut out, Some(Periodicity::Weekly))?,
                Ok(6) => break,
                Ok(_) => writeln!(out, "Invalid choice! Please try again.")?,
                Err(_) => writeln!(out, "Invalid input! Please enter a number.")?,
            }
        }
        Ok(())
    }

    fn display<W: Write>(&self, out: &mut W, periodicity: Option<Periodicity>) -> io::Result<()> {
        let habits = match periodicity {
            Some(p) => self.tracker.habits_by_periodicity(p),
            None => self.tracker.habits(),
        };
        match habits {
            Ok(habits) if habits.is_empty() => writeln!(out, "No habits."),
            Ok(habits) => {
                for habit in &habits {
                    writeln!(out, "{}", format_habit(habit, self.config))?;
                }
                Ok(())
            }
            Err(e) => writeln!(out, "Error: {e}"),
        }
    }

    fn add<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> io::Result<()> {
        let Some(name) = prompt(input, out, "Enter habit name: ")? else {
            return Ok(());
        };
        let Some(periodicity) = prompt(input, out, "Enter periodicity (daily/weekly): ")? else {
            return Ok(());
        };
        if periodicity.parse::<Periodicity>().is_err() {
            return writeln!(out, "Invalid periodicity!");
        }
        match self.tracker.add_habit(&name, &periodicity) {
            Ok(_) => writeln!(out, "Habit added successfully!"),
            Err(e) => writeln!(out, "Error: {e}"),
        }
    }

    fn edit<R: BufRead, W: Write>(&self, input: &mut R, out: &mut W) -> io::Result<()> {
        let Some(raw_id) = prompt(input, out, "Enter habit ID to edit: ")? else {
            return Ok(());
        };
        let Ok(id) = raw_id.parse::<HabitId>() else {
            return writeln!(out, "Invalid input! Please enter a valid habit ID.");
        };
        let Some(action) = prompt(input, out, "Enter action (delete/check): ")? else {
            return Ok(());
        };

        match action.to_ascii_lowercase().as_str() {
            "delete" => match self.tracker.delete_habit(id) {
                Ok(()) => writeln!(out, "Habit deleted successfully!"),
                Err(e) => writeln!(out, "Error: {e}"),
            },
            "check" => match self.tracker.check_in(id, (self.today)()) {
                Ok(report) if report.outcome.applied => writeln!(
                    out,
                    "Habit checked successfully! Streak: {} (longest {})",
                    report.habit.streak, report.habit.longest_streak
                ),
                Ok(report) => writeln!(
                    out,
                    "Already checked today. Streak: {} (longest {})",
                    report.habit.streak, report.habit.longest_streak
                ),
                Err(e) => writeln!(out, "Error: {e}"),
            },
            _ => writeln!(out, "Invalid action!"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use habitual_core::MemoryStore;
    use std::cell::Cell;
    use std::io::Cursor;

    fn run_script(tracker: &Tracker<MemoryStore>, today: NaiveDate, script: &str) -> String {
        let config = Config::default();
        let menu = Menu::new(tracker, &config, || today);
        let mut out = Vec::new();
        menu.run(Cursor::new(script.to_string()), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, d).unwrap()
    }

    #[test]
    fn add_then_display() {
        let tracker = Tracker::new(MemoryStore::new());
        let out = run_script(&tracker, day(1), "2\nRead\nDaily\n1\n6\n");
        assert!(out.contains("Habit added successfully!"));
        assert!(out.contains("[1] Read (daily) streak=0 longest=0 last=never"));
    }

    #[test]
    fn rejects_bad_choices_and_periodicity() {
        let tracker = Tracker::new(MemoryStore::new());
        let out = run_script(&tracker, day(1), "abc\n9\n2\nRead\nmonthly\n6\n");
        assert!(out.contains("Invalid input! Please enter a number."));
        assert!(out.contains("Invalid choice! Please try again."));
        assert!(out.contains("Invalid periodicity!"));
        assert!(tracker.habits().unwrap().is_empty());
    }

    #[test]
    fn edit_checks_and_deletes() {
        let tracker = Tracker::new(MemoryStore::new());
        let id = tracker.add_habit("Read", "daily").unwrap().id;

        let out = run_script(&tracker, day(1), &format!("3\n{id}\ncheck\n3\n{id}\nCHECK\n6\n"));
        assert!(out.contains("Habit checked successfully! Streak: 1 (longest 1)"));
        assert!(out.contains("Already checked today."));

        let out = run_script(&tracker, day(2), &format!("3\n{id}\nremove\n3\nxyz\n3\n{id}\ndelete\n6\n"));
        assert!(out.contains("Invalid action!"));
        assert!(out.contains("Invalid input! Please enter a valid habit ID."));
        assert!(out.contains("Habit deleted successfully!"));
        assert!(tracker.habits().unwrap().is_empty());
    }

    #[test]
    fn filtered_display_and_missing_habit() {
        let tracker = Tracker::new(MemoryStore::new());
        tracker.add_habit("Read", "daily").unwrap();
        tracker.add_habit("Walk", "weekly").unwrap();

        let out = run_script(&tracker, day(1), "5\n3\n42\ncheck\n6\n");
        assert!(out.contains("Walk (weekly)"));
        assert!(!out.contains("Read (daily)"));
        assert!(out.contains("Error: habit not found: 42"));
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let tracker = Tracker::new(MemoryStore::new());
        let out = run_script(&tracker, day(1), "2\nRead");
        assert!(out.contains("Enter periodicity"));
    }

    #[test]
    fn uses_the_supplied_clock_for_each_check_in() {
        let tracker = Tracker::new(MemoryStore::new());
        let id = tracker.add_habit("Read", "daily").unwrap().id;
        let config = Config::default();
        let clock = Cell::new(day(1));
        let menu = Menu::new(&tracker, &config, || clock.get());

        menu.run(Cursor::new(format!("3\n{id}\ncheck\n6\n")), Vec::new()).unwrap();
        clock.set(day(2));
        menu.run(Cursor::new(format!("3\n{id}\ncheck\n6\n")), Vec::new()).unwrap();

        assert_eq!(tracker.habit(id).unwrap().streak, 2);
    }
}
