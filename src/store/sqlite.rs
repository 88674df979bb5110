use super::Store;
use crate::db::initialize::init_db;
use crate::db::log::{load_log, ttlog};
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult};
use crate::models::audit::AuditRecord;
use crate::models::entry::Entry;
use crate::models::user::User;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// SQLite-backed store: `users`, `entries` and the internal `log` table.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path` and bring its schema
    /// up to date.
    pub fn open(path: &str) -> AppResult<Self> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let pool = DbPool::new(path)?;
        init_db(&pool.conn)?;
        Ok(Self { pool })
    }

    pub fn in_memory() -> AppResult<Self> {
        let pool = DbPool::in_memory()?;
        init_db(&pool.conn)?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub(crate) fn conn(&self) -> &rusqlite::Connection {
        &self.pool.conn
    }
}

impl Store for SqliteStore {
    fn user(&self, user_id: &str) -> AppResult<Option<User>> {
        queries::load_user(&self.pool.conn, user_id)
    }

    fn users(&self) -> AppResult<Vec<User>> {
        queries::load_users(&self.pool.conn)
    }

    fn add_user(&mut self, user: &User) -> AppResult<()> {
        if self.user(&user.user_id)?.is_some() {
            return Err(AppError::DuplicateUser(user.user_id.clone()));
        }
        queries::insert_user(&self.pool.conn, user)
    }

    fn update_user(&mut self, user: &User) -> AppResult<()> {
        match queries::update_user(&self.pool.conn, user)? {
            0 => Err(AppError::UserNotFound(user.user_id.clone())),
            _ => Ok(()),
        }
    }

    fn entry(&self, uuid: &str) -> AppResult<Option<Entry>> {
        queries::load_entry(&self.pool.conn, uuid)
    }

    fn add_entry(&mut self, entry: &Entry) -> AppResult<()> {
        queries::insert_entry(&self.pool.conn, entry)
    }

    fn update_entry(&mut self, entry: &Entry) -> AppResult<()> {
        match queries::update_entry(&self.pool.conn, entry)? {
            0 => Err(AppError::EntryNotFound(entry.uuid.clone())),
            _ => Ok(()),
        }
    }

    fn open_entries(&self) -> AppResult<Vec<Entry>> {
        queries::load_open_entries(&self.pool.conn)
    }

    fn entries_between(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<Entry>> {
        queries::load_entries_between(&self.pool.conn, from, to)
    }

    fn open_entry_for(&self, user_id: &str) -> AppResult<Option<Entry>> {
        queries::load_open_entry_for_user(&self.pool.conn, user_id)
    }

    fn audit(&mut self, operation: &str, target: &str, message: &str) -> AppResult<()> {
        ttlog(&self.pool.conn, operation, target, message)
    }

    fn audit_log(&self) -> AppResult<Vec<AuditRecord>> {
        load_log(&self.pool.conn)
    }

    fn files(&self) -> Vec<PathBuf> {
        self.pool.path().map(Path::to_path_buf).into_iter().collect()
    }

    fn describe(&self) -> String {
        match self.pool.path() {
            Some(p) => format!("sqlite:{}", p.display()),
            None => "sqlite::memory:".to_string(),
        }
    }
}
