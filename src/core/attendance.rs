//! Sign-in/sign-out state transitions.
//!
//! The controller keeps no state of its own: every call re-reads the store
//! and writes the result back before returning.

use crate::errors::{AppError, AppResult};
use crate::models::entry::Entry;
use crate::store::Store;
use crate::utils::time::format_elapsed;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::Regex;
use std::fmt;
use tracing::{info, warn};

/// Accepted shape of a user id, e.g. `^\d{9}$`.
pub struct UserIdFormat {
    re: Regex,
}

impl UserIdFormat {
    pub fn new(pattern: &str) -> AppResult<Self> {
        let re = Regex::new(pattern)
            .map_err(|e| AppError::Config(format!("user_id_pattern '{}': {}", pattern, e)))?;
        Ok(Self { re })
    }

    pub fn is_valid(&self, user_id: &str) -> bool {
        self.re.is_match(user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

/// Outcome of a successful `sign`.
#[derive(Debug, Clone)]
pub struct Status {
    pub direction: Direction,
    pub name: String,
    pub entry: Entry,
    /// Only set when signing out.
    pub elapsed: Option<TimeDelta>,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.direction, self.elapsed) {
            (Direction::In, _) => write!(f, "Signed in: {}", self.name),
            (Direction::Out, Some(elapsed)) => {
                write!(f, "Signed out: {} ({})", self.name, format_elapsed(elapsed))
            }
            (Direction::Out, None) => write!(f, "Signed out: {}", self.name),
        }
    }
}

pub struct Attendance;

impl Attendance {
    /// Toggle `user_id`: close their open entry if there is one, otherwise
    /// open a new entry at `now`.
    pub fn sign(
        store: &mut dyn Store,
        format: &UserIdFormat,
        user_id: &str,
        now: NaiveDateTime,
        full_name: bool,
    ) -> AppResult<Status> {
        let user_id = user_id.trim();

        if !format.is_valid(user_id) {
            return Err(AppError::InvalidUserId(user_id.to_string()));
        }

        let user = store
            .user(user_id)?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;
        let name = user.display_name(full_name);
        if !user.is_active(now.date()) {
            warn!(user_id, "signing a user who has left");
        }

        let status = match store.open_entry_for(user_id)? {
            Some(mut entry) => {
                let elapsed = entry.sign_out(now);
                store.update_entry(&entry)?;
                Status {
                    direction: Direction::Out,
                    name,
                    entry,
                    elapsed: Some(elapsed),
                }
            }
            None => {
                let entry = Entry::sign_in(user_id, now);
                store.add_entry(&entry)?;
                Status {
                    direction: Direction::In,
                    name,
                    entry,
                    elapsed: None,
                }
            }
        };

        let operation = match status.direction {
            Direction::In => "sign_in",
            Direction::Out => "sign_out",
        };
        // Best-effort: the toggle is already persisted.
        if let Err(e) = store.audit(operation, user_id, &status.to_string()) {
            warn!(user_id, error = %e, "failed to write audit line");
        }
        info!(user_id, entry = %status.entry.uuid, "{}", status);

        Ok(status)
    }

    /// Display names of everyone currently signed in, sorted.
    pub fn signed_in_names(store: &dyn Store, full_name: bool) -> AppResult<Vec<String>> {
        let mut names = Vec::new();

        for entry in store.open_entries()? {
            match store.user(&entry.user_id)? {
                Some(user) => names.push(user.display_name(full_name)),
                None => {
                    warn!(user_id = %entry.user_id, entry = %entry.uuid, "open entry for unknown user");
                    names.push(entry.user_id.clone());
                }
            }
        }

        names.sort();
        Ok(names)
    }

    /// Close every entry left open from a day before `today`.
    ///
    /// `time_out` becomes `fallback` on the entry's own date, or `time_in`
    /// when the fallback would precede it. The owner gets `forgot_sign_out`.
    /// Returns the entries that were closed; a second run closes nothing.
    pub fn auto_sign_out(
        store: &mut dyn Store,
        today: NaiveDate,
        fallback: NaiveTime,
    ) -> AppResult<Vec<Entry>> {
        let mut closed = Vec::new();

        for mut entry in store.open_entries()? {
            if entry.date >= today {
                continue;
            }

            entry.time_out = Some(fallback.max(entry.time_in));
            store.update_entry(&entry)?;

            if let Some(mut user) = store.user(&entry.user_id)?
                && !user.forgot_sign_out
            {
                user.forgot_sign_out = true;
                store.update_user(&user)?;
            }

            let message = format!(
                "Auto sign-out of {} entry dated {}",
                entry.user_id,
                entry.date_str()
            );
            if let Err(e) = store.audit("auto_sign_out", &entry.user_id, &message) {
                warn!(user_id = %entry.user_id, error = %e, "failed to write audit line");
            }
            warn!(user_id = %entry.user_id, entry = %entry.uuid, date = %entry.date, "{}", message);

            closed.push(entry);
        }

        Ok(closed)
    }
}
