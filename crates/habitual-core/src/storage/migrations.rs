//! Database schema migrations for habitual.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.
//!
//! The v1 tables keep the column layout of the first habit tracker
//! releases, so databases written by them open without conversion.

use rusqlite::{Connection, Result as SqliteResult};
use tracing::{debug, warn};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 3;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < 3 {
        migrate_v3(conn)?;
    }

    debug!(from = current_version, to = SCHEMA_VERSION, "schema up to date");
    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: habits and the check-in log.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS habits (
            id              INTEGER PRIMARY KEY,
            name            TEXT NOT NULL,
            periodicity     TEXT NOT NULL,
            streak          INTEGER DEFAULT 0,
            longest_streak  INTEGER DEFAULT 0,
            last_checked    DATE
        );

        CREATE TABLE IF NOT EXISTS habit_checks (
            id              INTEGER PRIMARY KEY,
            habit_id        INTEGER,
            date_checked    DATE NOT NULL,
            FOREIGN KEY(habit_id) REFERENCES habits(id)
        );",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: creation timestamps and a lookup index for the log.
///
/// Rows that predate the column are stamped with the migration time.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    let created_at_columns: i32 = tx.query_row(
        "SELECT COUNT(*) FROM pragma_table_info('habits') WHERE name = 'created_at'",
        [],
        |row| row.get(0),
    )?;

    if created_at_columns == 0 {
        tx.execute_batch("ALTER TABLE habits ADD COLUMN created_at TEXT NOT NULL DEFAULT '';")?;
    }

    tx.execute(
        "UPDATE habits
         SET created_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
         WHERE created_at = ''",
        [],
    )?;

    tx.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_habit_checks_habit_date
         ON habit_checks(habit_id, date_checked);
         CREATE INDEX IF NOT EXISTS idx_habits_periodicity ON habits(periodicity);",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}

/// Migration v3: habit ids are never reused, periodicity is stored lowercase.
///
/// `habit_checks` keeps the log of deleted habits, so a recycled rowid would
/// hand that log to a new habit. The table is rebuilt with `AUTOINCREMENT`,
/// keeping every id, and the sequence starts past any id the log mentions.
fn migrate_v3(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE habits_v3 (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            periodicity     TEXT NOT NULL,
            streak          INTEGER DEFAULT 0,
            longest_streak  INTEGER DEFAULT 0,
            last_checked    DATE,
            created_at      TEXT NOT NULL DEFAULT ''
        );

        INSERT INTO habits_v3 (id, name, periodicity, streak, longest_streak, last_checked, created_at)
        SELECT id, name, lower(trim(periodicity)), streak, longest_streak, last_checked, created_at
        FROM habits;

        DROP TABLE habits;
        ALTER TABLE habits_v3 RENAME TO habits;

        CREATE INDEX IF NOT EXISTS idx_habits_periodicity ON habits(periodicity);

        DELETE FROM sqlite_sequence WHERE name = 'habits';
        INSERT INTO sqlite_sequence (name, seq)
        SELECT 'habits', max(
            coalesce((SELECT max(id) FROM habits), 0),
            coalesce((SELECT max(habit_id) FROM habit_checks), 0)
        );",
    )?;

    set_schema_version(&tx, 3)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);

        conn.execute(
            "INSERT INTO habits (name, periodicity, created_at) VALUES ('Read', 'daily', '2024-01-01T00:00:00Z')",
            [],
        )
        .unwrap();
        let (streak, longest): (i64, i64) = conn
            .query_row("SELECT streak, longest_streak FROM habits", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!((streak, longest), (0, 0));
    }

    #[test]
    fn test_migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
    }

    /// A database created by the first releases has no schema_version table
    /// and no created_at column.
    #[test]
    fn test_migrate_legacy_database() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE habits (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                periodicity TEXT NOT NULL,
                streak INTEGER DEFAULT 0,
                longest_streak INTEGER DEFAULT 0,
                last_checked DATE
            );
            CREATE TABLE habit_checks (
                id INTEGER PRIMARY KEY,
                habit_id INTEGER,
                date_checked DATE NOT NULL,
                FOREIGN KEY(habit_id) REFERENCES habits(id)
            );
            INSERT INTO habits (name, periodicity, streak, longest_streak, last_checked)
            VALUES ('Walk', 'weekly', 3, 4, '2024-03-01');",
        )
        .unwrap();

        migrate(&conn).unwrap();

        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);
        let (streak, created_at): (i64, String) = conn
            .query_row("SELECT streak, created_at FROM habits WHERE name = 'Walk'", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(streak, 3);
        assert!(!created_at.is_empty());
    }

    fn legacy_tables(conn: &Connection) {
        conn.execute_batch(
            "CREATE TABLE habits (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                periodicity TEXT NOT NULL,
                streak INTEGER DEFAULT 0,
                longest_streak INTEGER DEFAULT 0,
                last_checked DATE
            );
            CREATE TABLE habit_checks (
                id INTEGER PRIMARY KEY,
                habit_id INTEGER,
                date_checked DATE NOT NULL,
                FOREIGN KEY(habit_id) REFERENCES habits(id)
            );",
        )
        .unwrap();
    }

    #[test]
    fn test_migrate_lowercases_legacy_periodicity() {
        let conn = Connection::open_in_memory().unwrap();
        legacy_tables(&conn);
        conn.execute_batch(
            "INSERT INTO habits (name, periodicity) VALUES ('Read', 'Daily');
             INSERT INTO habits (name, periodicity) VALUES ('Walk', ' WEEKLY ');",
        )
        .unwrap();

        migrate(&conn).unwrap();

        let mut stmt = conn
            .prepare("SELECT periodicity FROM habits ORDER BY id")
            .unwrap();
        let stored: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<SqliteResult<_>>()
            .unwrap();
        assert_eq!(stored, vec!["daily", "weekly"]);
    }

    #[test]
    fn test_migrate_keeps_ids_and_skips_logged_ids() {
        let conn = Connection::open_in_memory().unwrap();
        legacy_tables(&conn);
        // Habit 3 was deleted before the upgrade; its log stays behind.
        conn.execute_batch(
            "INSERT INTO habits (id, name, periodicity) VALUES (1, 'Read', 'daily');
             INSERT INTO habits (id, name, periodicity) VALUES (2, 'Walk', 'weekly');
             INSERT INTO habit_checks (habit_id, date_checked) VALUES (3, '2024-03-01');",
        )
        .unwrap();

        migrate(&conn).unwrap();

        let ids: Vec<i64> = conn
            .prepare("SELECT id FROM habits ORDER BY id")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<SqliteResult<_>>()
            .unwrap();
        assert_eq!(ids, vec![1, 2]);

        conn.execute(
            "INSERT INTO habits (name, periodicity, created_at) VALUES ('Swim', 'daily', '2024-04-01T00:00:00Z')",
            [],
        )
        .unwrap();
        assert_eq!(conn.last_insert_rowid(), 4);
    }
}
