//! Schema creation and versioned migrations.
//!
//! Applied migrations are recorded in the `log` table
//! (`operation = 'migration_applied'`, `target = <version>`), so running the
//! whole chain again is a no-op.

use crate::errors::{AppError, AppResult};
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{info, warn};

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([table], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// `table` must be a trusted identifier: PRAGMA arguments cannot be bound.
fn table_has_column(conn: &Connection, table: &str, column: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn create_users_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id          TEXT PRIMARY KEY NOT NULL,
            first_name       TEXT NOT NULL,
            last_name        TEXT NOT NULL,
            email            TEXT NOT NULL DEFAULT '',
            major            TEXT NOT NULL DEFAULT '',
            user_type        TEXT NOT NULL CHECK(user_type IN ('Tutor','Student')),
            date_joined      TEXT NOT NULL,
            date_left        TEXT,
            education_plan   INTEGER NOT NULL DEFAULT 0,
            forgot_sign_out  INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )?;
    Ok(())
}

fn create_entries_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            uuid      TEXT PRIMARY KEY NOT NULL,
            user_id   TEXT NOT NULL REFERENCES users(user_id),
            date      TEXT NOT NULL,
            time_in   TEXT NOT NULL,
            time_out  TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date);
        "#,
    )?;
    Ok(())
}

fn migration_applied(conn: &Connection, version: &str) -> AppResult<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> AppResult<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        params![version, message],
    )?;
    info!(version, "migration applied: {}", message);
    Ok(())
}

/// Databases created before the auto-sign-out sweep have no
/// `forgot_sign_out` column.
fn migrate_add_forgot_sign_out(conn: &Connection) -> AppResult<()> {
    let version = "20160301_0001_add_forgot_sign_out";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    if !table_has_column(conn, "users", "forgot_sign_out")? {
        warn!("adding 'forgot_sign_out' column to users table");
        conn.execute(
            "ALTER TABLE users ADD COLUMN forgot_sign_out INTEGER NOT NULL DEFAULT 0;",
            [],
        )
        .map_err(|e| {
            AppError::Migration(format!("Failed to add 'forgot_sign_out' column: {}", e))
        })?;
    }

    mark_applied(conn, version, "Added forgot_sign_out flag to users")
}

/// Enforce "at most one open entry per user" inside the database itself.
fn migrate_unique_open_entry(conn: &Connection) -> AppResult<()> {
    let version = "20160315_0002_unique_open_entry";

    if migration_applied(conn, version)? {
        return Ok(());
    }

    conn.execute_batch(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_entries_one_open
         ON entries(user_id) WHERE time_out IS NULL;",
    )
    .map_err(|e| {
        AppError::Migration(format!(
            "Cannot enforce one open entry per user (close duplicates first): {}",
            e
        ))
    })?;

    mark_applied(conn, version, "Unique open entry per user")
}

/// Public entry point: create missing tables and run all pending migrations.
///
/// Invoked by db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> AppResult<()> {
    ensure_log_table(conn)?;

    if !table_exists(conn, "users")? {
        create_users_table(conn)?;
        info!("created users table");
    }

    if !table_exists(conn, "entries")? {
        create_entries_table(conn)?;
        info!("created entries table");
    }

    migrate_add_forgot_sign_out(conn)?;
    migrate_unique_open_entry(conn)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_applied(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
            [],
            |r| r.get(0),
        )
        .unwrap()
    }

    #[test]
    fn fresh_database_gets_full_schema() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();

        assert!(table_exists(&conn, "users").unwrap());
        assert!(table_exists(&conn, "entries").unwrap());
        assert!(table_has_column(&conn, "users", "forgot_sign_out").unwrap());
        assert_eq!(count_applied(&conn), 2);
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        run_pending_migrations(&conn).unwrap();
        assert_eq!(count_applied(&conn), 2);
    }

    #[test]
    fn legacy_users_table_gains_flag() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (
                user_id TEXT PRIMARY KEY NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL DEFAULT '',
                major TEXT NOT NULL DEFAULT '',
                user_type TEXT NOT NULL,
                date_joined TEXT NOT NULL,
                date_left TEXT,
                education_plan INTEGER NOT NULL DEFAULT 0
            );",
        )
        .unwrap();

        run_pending_migrations(&conn).unwrap();
        assert!(table_has_column(&conn, "users", "forgot_sign_out").unwrap());
    }

    #[test]
    fn second_open_entry_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        run_pending_migrations(&conn).unwrap();
        conn.execute_batch(
            "INSERT INTO users (user_id, first_name, last_name, user_type, date_joined)
             VALUES ('888333333', 'Pippin', 'Took', 'Student', '2015-02-16');
             INSERT INTO entries (uuid, user_id, date, time_in)
             VALUES ('a', '888333333', '2016-02-17', '10:45:23');",
        )
        .unwrap();

        let dup = conn.execute(
            "INSERT INTO entries (uuid, user_id, date, time_in)
             VALUES ('b', '888333333', '2016-02-17', '11:00:00')",
            [],
        );
        assert!(dup.is_err());
    }
}
