//! Persistence seam between the attendance logic and its backings.
//!
//! Two interchangeable implementations exist: [`sqlite::SqliteStore`] and the
//! flat-file [`json::JsonStore`]. Every write is persisted before the call
//! returns.

pub mod json;
pub mod sqlite;

use crate::config::{Backend, Config};
use crate::errors::AppResult;
use crate::models::audit::AuditRecord;
use crate::models::entry::Entry;
use crate::models::user::User;
use chrono::NaiveDate;
use std::path::PathBuf;
use tracing::debug;

pub trait Store {
    fn user(&self, user_id: &str) -> AppResult<Option<User>>;

    /// All users, sorted by last name, first name, id.
    fn users(&self) -> AppResult<Vec<User>>;

    /// Insert a new user. Fails with `DuplicateUser` if the id is taken.
    fn add_user(&mut self, user: &User) -> AppResult<()>;

    /// Replace a stored user. Fails with `UserNotFound` if it does not exist.
    fn update_user(&mut self, user: &User) -> AppResult<()>;

    fn entry(&self, uuid: &str) -> AppResult<Option<Entry>>;

    fn add_entry(&mut self, entry: &Entry) -> AppResult<()>;

    /// Replace a stored entry. Fails with `EntryNotFound` if it does not exist.
    fn update_entry(&mut self, entry: &Entry) -> AppResult<()>;

    /// Every entry whose `time_out` is null.
    fn open_entries(&self) -> AppResult<Vec<Entry>>;

    /// Entries dated within `[from, to]`, ordered by date and `time_in`.
    fn entries_between(&self, from: NaiveDate, to: NaiveDate) -> AppResult<Vec<Entry>>;

    fn open_entry_for(&self, user_id: &str) -> AppResult<Option<Entry>> {
        Ok(self
            .open_entries()?
            .into_iter()
            .find(|e| e.user_id == user_id))
    }

    /// Record an audit line. Backings without an audit trail ignore it.
    fn audit(&mut self, _operation: &str, _target: &str, _message: &str) -> AppResult<()> {
        Ok(())
    }

    fn audit_log(&self) -> AppResult<Vec<AuditRecord>> {
        Ok(Vec::new())
    }

    /// Files holding the store's state (for backups).
    fn files(&self) -> Vec<PathBuf>;

    /// Human-readable location, e.g. for the startup banner.
    fn describe(&self) -> String;
}

/// Open the backing selected by `cfg`.
pub fn open_store(cfg: &Config) -> AppResult<Box<dyn Store>> {
    let store: Box<dyn Store> = match cfg.backend {
        Backend::Sqlite => Box::new(sqlite::SqliteStore::open(&cfg.database)?),
        Backend::Json => Box::new(json::JsonStore::open(cfg.data_file(), cfg.users_file())?),
    };
    debug!(store = %store.describe(), "store opened");
    Ok(store)
}
