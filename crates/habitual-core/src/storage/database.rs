//! SQLite-based habit storage.
//!
//! Provides persistent storage for:
//! - Habit records with their streak fields
//! - The append-only check-in log (`habit_checks`)

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::config::Config;
use super::migrations;
use super::store::HabitStore;
use crate::error::{DatabaseError, StoreError};
use crate::habit::{CheckEvent, Habit, HabitId, Periodicity};
use crate::streak::CheckInOutcome;

const DATE_FORMAT: &str = "%Y-%m-%d";

const HABIT_SELECT_SQL: &str = "SELECT
    id,
    name,
    periodicity,
    streak,
    longest_streak,
    last_checked,
    created_at
FROM habits";

/// Raw column values of a `habits` row, before domain validation.
struct HabitRow {
    id: i64,
    name: String,
    periodicity: String,
    streak: Option<i64>,
    longest_streak: Option<i64>,
    last_checked: Option<String>,
    created_at: String,
}

fn read_habit_row(row: &Row<'_>) -> Result<HabitRow, rusqlite::Error> {
    Ok(HabitRow {
        id: row.get(0)?,
        name: row.get(1)?,
        periodicity: row.get(2)?,
        streak: row.get(3)?,
        longest_streak: row.get(4)?,
        last_checked: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn corrupt(table: &'static str, message: String) -> StoreError {
    StoreError::CorruptRecord { table, message }
}

fn parse_date(table: &'static str, value: &str) -> Result<NaiveDate, StoreError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| corrupt(table, format!("bad date '{value}': {e}")))
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_count(field: &str, value: Option<i64>) -> Result<u32, StoreError> {
    u32::try_from(value.unwrap_or(0))
        .map_err(|_| corrupt("habits", format!("{field} out of range: {value:?}")))
}

impl TryFrom<HabitRow> for Habit {
    type Error = StoreError;

    fn try_from(row: HabitRow) -> Result<Self, Self::Error> {
        let periodicity: Periodicity = row
            .periodicity
            .parse()
            .map_err(|e| corrupt("habits", format!("habit {}: {e}", row.id)))?;
        let last_checked = row
            .last_checked
            .as_deref()
            .map(|value| parse_date("habits", value))
            .transpose()?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| corrupt("habits", format!("bad created_at '{}': {e}", row.created_at)))?;

        Ok(Habit {
            id: HabitId(row.id),
            name: row.name,
            periodicity,
            streak: parse_count("streak", row.streak)?,
            longest_streak: parse_count("longest_streak", row.longest_streak)?,
            last_checked,
            created_at,
        })
    }
}

/// SQLite database for habit storage.
pub struct HabitDb {
    conn: Connection,
}

impl HabitDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database file named by the configuration inside the data
    /// directory.
    ///
    /// # Errors
    /// Returns an error if the data directory is unavailable or the database
    /// cannot be opened or migrated.
    pub fn open(config: &Config) -> crate::error::Result<Self> {
        let path = config.database_path()?;
        Ok(Self::open_at(&path)?)
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "opened habit database");
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        // Check events outlive their habit, so the FK must not be enforced.
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    fn query_habits(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Habit>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, read_habit_row)?;
        let mut habits = Vec::new();
        for row in rows {
            habits.push(Habit::try_from(row?)?);
        }
        Ok(habits)
    }
}

impl HabitStore for HabitDb {
    fn create(&self, name: &str, periodicity: Periodicity) -> Result<HabitId, StoreError> {
        self.conn.execute(
            "INSERT INTO habits (name, periodicity, streak, longest_streak, last_checked, created_at)
             VALUES (?1, ?2, 0, 0, NULL, ?3)",
            params![name, periodicity.as_str(), Utc::now().to_rfc3339()],
        )?;
        let id = HabitId(self.conn.last_insert_rowid());
        debug!(%id, name, %periodicity, "inserted habit");
        Ok(id)
    }

    fn get(&self, id: HabitId) -> Result<Habit, StoreError> {
        let row = self
            .conn
            .query_row(
                &format!("{HABIT_SELECT_SQL} WHERE id = ?1"),
                params![id.0],
                read_habit_row,
            )
            .optional()?;
        match row {
            Some(row) => Habit::try_from(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn list(&self) -> Result<Vec<Habit>, StoreError> {
        self.query_habits(&format!("{HABIT_SELECT_SQL} ORDER BY id"), [])
    }

    fn list_by_periodicity(&self, periodicity: Periodicity) -> Result<Vec<Habit>, StoreError> {
        self.query_habits(
            &format!("{HABIT_SELECT_SQL} WHERE periodicity = ?1 ORDER BY id"),
            params![periodicity.as_str()],
        )
    }

    fn delete(&self, id: HabitId) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1", params![id.0])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!(%id, "deleted habit");
        Ok(())
    }

    fn apply_check_in(&self, id: HabitId, outcome: &CheckInOutcome) -> Result<(), StoreError> {
        if !outcome.applied {
            return Ok(());
        }
        let date = outcome
            .last_checked
            .ok_or(StoreError::MissingCheckInDate(id))?;
        let date = format_date(date);

        // Dropping the transaction on an early return rolls it back.
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            "UPDATE habits
             SET streak = ?1, longest_streak = ?2, last_checked = ?3
             WHERE id = ?4",
            params![outcome.streak, outcome.longest_streak, date, id.0],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        tx.execute(
            "INSERT INTO habit_checks (habit_id, date_checked) VALUES (?1, ?2)",
            params![id.0, date],
        )?;
        tx.commit()?;

        debug!(%id, streak = outcome.streak, date = %date, "persisted check-in");
        Ok(())
    }

    fn check_events(&self, id: HabitId) -> Result<Vec<CheckEvent>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, date_checked
             FROM habit_checks
             WHERE habit_id = ?1
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![id.0], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (event_id, habit_id, date) = row?;
            events.push(CheckEvent {
                id: event_id,
                habit_id: HabitId(habit_id),
                date: parse_date("habit_checks", &date)?,
            });
        }
        Ok(events)
    }
}
