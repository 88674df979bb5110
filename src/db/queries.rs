use crate::errors::{AppError, AppResult};
use crate::models::entry::Entry;
use crate::models::user::User;
use crate::models::user_type::UserType;
use crate::utils::date::{format_date, parse_date};
use crate::utils::time::{format_time, parse_time};
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const ENTRY_COLUMNS: &str = "uuid, user_id, date, time_in, time_out";
const USER_COLUMNS: &str = "user_id, first_name, last_name, email, major, user_type, \
                            date_joined, date_left, education_plan, forgot_sign_out";

fn conversion_error(err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(err))
}

fn date_column(row: &Row, col: &str) -> Result<NaiveDate> {
    let raw: String = row.get(col)?;
    parse_date(&raw).ok_or_else(|| conversion_error(AppError::InvalidDate(raw)))
}

fn optional_date_column(row: &Row, col: &str) -> Result<Option<NaiveDate>> {
    match row.get::<_, Option<String>>(col)? {
        Some(raw) => parse_date(&raw)
            .map(Some)
            .ok_or_else(|| conversion_error(AppError::InvalidDate(raw))),
        None => Ok(None),
    }
}

pub fn map_entry(row: &Row) -> Result<Entry> {
    let time_in_str: String = row.get("time_in")?;
    let time_in = parse_time(&time_in_str)
        .ok_or_else(|| conversion_error(AppError::InvalidTime(time_in_str.clone())))?;

    let time_out = match row.get::<_, Option<String>>("time_out")? {
        Some(raw) => Some(
            parse_time(&raw).ok_or_else(|| conversion_error(AppError::InvalidTime(raw)))?,
        ),
        None => None,
    };

    Ok(Entry {
        uuid: row.get("uuid")?,
        user_id: row.get("user_id")?,
        date: date_column(row, "date")?,
        time_in,
        time_out,
    })
}

pub fn map_user(row: &Row) -> Result<User> {
    let type_str: String = row.get("user_type")?;
    let user_type = UserType::from_db_str(&type_str)
        .ok_or_else(|| conversion_error(AppError::InvalidUserType(type_str.clone())))?;

    Ok(User {
        user_id: row.get("user_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        major: row.get("major")?,
        user_type,
        date_joined: date_column(row, "date_joined")?,
        date_left: optional_date_column(row, "date_left")?,
        education_plan: row.get("education_plan")?,
        forgot_sign_out: row.get("forgot_sign_out")?,
    })
}

// ---------------------------
// Users
// ---------------------------

pub fn load_user(conn: &Connection, user_id: &str) -> AppResult<Option<User>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"
    ))?;
    Ok(stmt.query_row([user_id], map_user).optional()?)
}

pub fn load_users(conn: &Connection) -> AppResult<Vec<User>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY last_name, first_name, user_id"
    ))?;
    let rows = stmt.query_map([], map_user)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_user(conn: &Connection, u: &User) -> AppResult<()> {
    conn.execute(
        &format!(
            "INSERT INTO users ({USER_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
        ),
        params![
            u.user_id,
            u.first_name,
            u.last_name,
            u.email,
            u.major,
            u.user_type.to_db_str(),
            format_date(u.date_joined),
            u.date_left.map(format_date),
            u.education_plan,
            u.forgot_sign_out,
        ],
    )?;
    Ok(())
}

/// Update a user (all fields except user_id). Returns the affected row count.
pub fn update_user(conn: &Connection, u: &User) -> AppResult<usize> {
    let n = conn.execute(
        "UPDATE users
         SET first_name = ?1, last_name = ?2, email = ?3, major = ?4,
             user_type = ?5, date_joined = ?6, date_left = ?7,
             education_plan = ?8, forgot_sign_out = ?9
         WHERE user_id = ?10",
        params![
            u.first_name,
            u.last_name,
            u.email,
            u.major,
            u.user_type.to_db_str(),
            format_date(u.date_joined),
            u.date_left.map(format_date),
            u.education_plan,
            u.forgot_sign_out,
            u.user_id,
        ],
    )?;
    Ok(n)
}

// ---------------------------
// Entries
// ---------------------------

fn collect_entries(conn: &Connection, sql: &str, args: impl rusqlite::Params) -> AppResult<Vec<Entry>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map(args, map_entry)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn load_entry(conn: &Connection, uuid: &str) -> AppResult<Option<Entry>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {ENTRY_COLUMNS} FROM entries WHERE uuid = ?1"
    ))?;
    Ok(stmt.query_row([uuid], map_entry).optional()?)
}

/// Every entry with no `time_out`, oldest first.
pub fn load_open_entries(conn: &Connection) -> AppResult<Vec<Entry>> {
    collect_entries(
        conn,
        &format!(
            "SELECT {ENTRY_COLUMNS} FROM entries
             WHERE time_out IS NULL
             ORDER BY date ASC, time_in ASC"
        ),
        [],
    )
}

pub fn load_open_entry_for_user(conn: &Connection, user_id: &str) -> AppResult<Option<Entry>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {ENTRY_COLUMNS} FROM entries
         WHERE user_id = ?1 AND time_out IS NULL
         LIMIT 1"
    ))?;
    Ok(stmt.query_row([user_id], map_entry).optional()?)
}

/// Entries dated within `[from, to]`, ordered by date and sign-in time.
pub fn load_entries_between(conn: &Connection, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<Entry>> {
    collect_entries(
        conn,
        &format!(
            "SELECT {ENTRY_COLUMNS} FROM entries
             WHERE date BETWEEN ?1 AND ?2
             ORDER BY date ASC, time_in ASC"
        ),
        params![format_date(from), format_date(to)],
    )
}

pub fn insert_entry(conn: &Connection, e: &Entry) -> AppResult<()> {
    conn.execute(
        &format!("INSERT INTO entries ({ENTRY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
        params![
            e.uuid,
            e.user_id,
            e.date_str(),
            format_time(e.time_in),
            e.time_out.map(format_time),
        ],
    )?;
    Ok(())
}

/// Update an entry (all fields except uuid). Returns the affected row count.
pub fn update_entry(conn: &Connection, e: &Entry) -> AppResult<usize> {
    let n = conn.execute(
        "UPDATE entries
         SET user_id = ?1, date = ?2, time_in = ?3, time_out = ?4
         WHERE uuid = ?5",
        params![
            e.user_id,
            e.date_str(),
            format_time(e.time_in),
            e.time_out.map(format_time),
            e.uuid,
        ],
    )?;
    Ok(n)
}
